//! Integrity checks for stored buckets.

use rayon::prelude::*;

use crate::{
    bucket::{Ancestors, BucketKey},
    canonical::{canonical_id, decode, ShapeId},
    collinearity::Collinearity,
    error::{Error, Result},
    geometry::{Family, Point},
    store::BucketStore,
};

/// Something wrong with one shape of a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// The identifier has a cell at a position no cell of the family maps
    /// to.
    Malformed(ShapeId),
    WrongSize { id: ShapeId, cells: usize },
    NotCanonical { id: ShapeId, canonical: ShapeId },
    Disconnected(ShapeId),
    WrongCollinearity { id: ShapeId, found: usize },
    /// A shape with more than one cell was stored without ancestors, or the
    /// seed was stored with some.
    Ancestry(ShapeId),
    BadEdge {
        id: ShapeId,
        ancestor: ShapeId,
        point: Point,
    },
}

impl core::fmt::Display for Problem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Problem::Malformed(id) => write!(f, "{id} is not a valid identifier"),
            Problem::WrongSize { id, cells } => write!(f, "{id} has {cells} cells"),
            Problem::NotCanonical { id, canonical } => {
                write!(f, "{id} is not canonical, expected {canonical}")
            }
            Problem::Disconnected(id) => write!(f, "{id} is not connected"),
            Problem::WrongCollinearity { id, found } => {
                write!(f, "{id} has collinearity {found}")
            }
            Problem::Ancestry(id) => write!(f, "{id} has the wrong amount of ancestors"),
            Problem::BadEdge { id, ancestor, point } => write!(
                f,
                "removing {:?} from {id} does not give {ancestor}",
                point.0
            ),
        }
    }
}

/// The outcome of validating one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub key: BucketKey,
    pub shapes: usize,
    pub edges: usize,
    pub problems: Vec<Problem>,
}

impl Report {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Check every shape of the stored bucket `key`.
///
/// Identifiers must be canonical, which also makes them unique within the
/// bucket. Every shape must have `n` connected cells and collinearity `k`,
/// and every ancestor edge must lead to the shape left after removing its
/// labelled cell.
pub fn validate_bucket<S>(store: &S, key: BucketKey) -> Result<Report>
where
    S: BucketStore + ?Sized,
{
    let bucket = store.require(key)?;

    let problems = bucket
        .par_iter()
        .map(|(id, ancestors)| check_shape(key, id, ancestors))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    let report = Report {
        key,
        shapes: bucket.len(),
        edges: bucket.iter().map(|(_, a)| a.len()).sum(),
        problems,
    };

    if report.is_ok() {
        tracing::info!(%key, shapes = report.shapes, edges = report.edges, "bucket is valid");
    } else {
        for problem in &report.problems {
            tracing::warn!(%key, "{problem}");
        }
    }

    Ok(report)
}

/// Validate every bucket with `n <= max_n` and `k <= k_limit`.
///
/// Buckets that were never stored, such as those above the limit of a
/// limited run or past an empty level, are skipped and reported as `None`.
pub fn validate_range<S>(
    store: &S,
    family: Family,
    collinearity: Collinearity,
    max_n: usize,
    k_limit: Option<usize>,
) -> Result<Vec<(BucketKey, Option<Report>)>>
where
    S: BucketStore + ?Sized,
{
    let mut reports = Vec::new();

    for n in 1..=max_n {
        let k_max = k_limit.map_or(n, |limit| limit.min(n));
        for k in 1..=k_max {
            let key = BucketKey::new(family, collinearity, n, k);
            match validate_bucket(store, key) {
                Ok(report) => reports.push((key, Some(report))),
                Err(Error::MissingBucket(_)) => {
                    tracing::debug!(%key, "bucket not stored, skipping");
                    reports.push((key, None));
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(reports)
}

fn check_shape(key: BucketKey, id: &ShapeId, ancestors: &Ancestors) -> Result<Vec<Problem>> {
    let family = key.family;
    let Ok(pattern) = decode(family, id) else {
        return Ok(vec![Problem::Malformed(id.clone())]);
    };
    let mut problems = Vec::new();

    if pattern.len() != key.n {
        problems.push(Problem::WrongSize {
            id: id.clone(),
            cells: pattern.len(),
        });
    }

    let canonical = canonical_id(family, &pattern)?;
    if &canonical != id {
        problems.push(Problem::NotCanonical {
            id: id.clone(),
            canonical,
        });
    }

    if !pattern.is_connected(family) {
        problems.push(Problem::Disconnected(id.clone()));
    }

    let found = key.collinearity.max_collinear(family, &pattern);
    if found != key.k {
        problems.push(Problem::WrongCollinearity {
            id: id.clone(),
            found,
        });
    }

    if (key.n == 1) != ancestors.is_empty() {
        problems.push(Problem::Ancestry(id.clone()));
    }

    for (ancestor, point) in ancestors {
        let matches = pattern.contains(point)
            && canonical_id(family, &pattern.without(point))? == *ancestor;

        if !matches {
            problems.push(Problem::BadEdge {
                id: id.clone(),
                ancestor: ancestor.clone(),
                point: *point,
            });
        }
    }

    Ok(problems)
}

#[cfg(test)]
mod test {
    use hashbrown::HashMap;

    use super::*;
    use crate::{bucket::Bucket, generator::Generator, store::MemoryStore};

    #[test]
    pub fn generated_buckets_are_valid() {
        for family in Family::ALL {
            for collinearity in Collinearity::ALL {
                let store = MemoryStore::new();
                Generator::new(&store, family, collinearity)
                    .create_range(1, 5, None)
                    .unwrap();

                for n in 1..=5 {
                    for k in 1..=n {
                        let key = BucketKey::new(family, collinearity, n, k);
                        let report = validate_bucket(&store, key).unwrap();
                        assert!(report.is_ok(), "{key}: {:?}", report.problems);
                    }
                }
            }
        }
    }

    #[test]
    pub fn problems_are_found() {
        let store = MemoryStore::new();
        let key = BucketKey::new(Family::Square, Collinearity::Plane, 3, 2);

        let mut good_edge = Ancestors::new();
        good_edge.insert("3".parse().unwrap(), Point::new(0, 0, 0));

        // Removing the corner leaves two diagonal cells.
        let mut bad_edge = Ancestors::new();
        bad_edge.insert("3".parse().unwrap(), Point::new(0, 1, 0));

        let mut shapes = HashMap::new();
        // Not canonical: the L tromino is "3-2".
        shapes.insert("2-3".parse().unwrap(), Ancestors::new());
        // A straight tromino, collinearity 3.
        shapes.insert("7".parse().unwrap(), good_edge);
        shapes.insert("3-2".parse().unwrap(), bad_edge);
        // Two separate cells.
        shapes.insert("5".parse().unwrap(), Ancestors::new());

        store.save(&Bucket::new(key, shapes)).unwrap();

        let report = validate_bucket(&store, key).unwrap();
        assert!(!report.is_ok());
        assert_eq!(report.shapes, 4);
        assert_eq!(report.edges, 2);

        let has = |f: &dyn Fn(&Problem) -> bool| report.problems.iter().any(f);
        assert!(has(&|p| matches!(p, Problem::NotCanonical { .. })));
        assert!(has(&|p| matches!(p, Problem::WrongCollinearity { found: 3, .. })));
        assert!(has(&|p| matches!(p, Problem::BadEdge { .. })));
        assert!(has(&|p| matches!(p, Problem::Disconnected(_))));
        assert!(has(&|p| matches!(p, Problem::WrongSize { cells: 2, .. })));
        assert!(has(&|p| matches!(p, Problem::Ancestry(_))));
    }

    #[test]
    pub fn malformed_hexagon_ids() {
        let store = MemoryStore::new();
        let key = BucketKey::new(Family::Hexagon, Collinearity::Plane, 1, 1);

        let mut shapes = HashMap::new();
        shapes.insert("2".parse().unwrap(), Ancestors::new());
        store.save(&Bucket::new(key, shapes)).unwrap();

        let report = validate_bucket(&store, key).unwrap();
        assert_eq!(report.problems, vec![Problem::Malformed("2".parse().unwrap())]);
    }

    #[test]
    pub fn range_skips_buckets_that_were_not_stored() {
        let store = MemoryStore::new();
        Generator::new(&store, Family::Square, Collinearity::Plane)
            .create_range(1, 5, Some(3))
            .unwrap();

        let reports = validate_range(&store, Family::Square, Collinearity::Plane, 5, None).unwrap();
        assert_eq!(reports.len(), 15);

        for (key, report) in &reports {
            match report {
                Some(report) => {
                    assert!(key.k <= 3);
                    assert!(report.is_ok(), "{key}: {:?}", report.problems);
                }
                None => assert!(key.k > 3),
            }
        }

        let limited = validate_range(&store, Family::Square, Collinearity::Plane, 5, Some(3)).unwrap();
        assert_eq!(limited.len(), 12);
        assert!(limited.iter().all(|(_, report)| report.is_some()));
    }

    #[test]
    pub fn missing_bucket() {
        let store = MemoryStore::new();
        let key = BucketKey::new(Family::Hexagon, Collinearity::Plane, 2, 2);
        assert!(matches!(validate_bucket(&store, key), Err(Error::MissingBucket(_))));
    }
}
