//! Generation buckets: all shapes of one size and collinearity, with the
//! edges back to the shapes they were grown from.

use hashbrown::HashMap;
use rayon::prelude::*;

use crate::{
    canonical::ShapeId,
    collinearity::Collinearity,
    error::{Error, Result},
    geometry::{Family, Point},
};

/// The ancestors of one shape, each labelled with the cell (in the shape's
/// canonical orientation) whose removal gives that ancestor.
pub type Ancestors = HashMap<ShapeId, Point>;

/// Identifies a bucket: shape family, collinearity policy, size `n` and
/// collinearity `k`.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct BucketKey {
    pub family: Family,
    pub collinearity: Collinearity,
    pub n: usize,
    pub k: usize,
}

impl BucketKey {
    pub fn new(family: Family, collinearity: Collinearity, n: usize, k: usize) -> Self {
        Self {
            family,
            collinearity,
            n,
            k,
        }
    }

    /// The same family and policy at a different `(n, k)`.
    pub fn at(&self, n: usize, k: usize) -> Self {
        Self { n, k, ..*self }
    }

    pub fn is_valid(&self) -> bool {
        self.n >= 1 && self.k >= 1 && self.k <= self.n
    }

    /// The header line of a stored bucket with `rows` body lines.
    pub fn header(&self, rows: usize) -> String {
        format!(
            "{},{},{},{},{}",
            self.family.name(),
            self.collinearity.name(),
            self.n,
            self.k,
            rows
        )
    }

    /// Parse a header line, returning the key and the row count it claims.
    pub fn parse_header(line: &str) -> Result<(Self, usize)> {
        let bad = || Error::InvalidIdentifier(format!("bad bucket header {line:?}"));

        let meta: Vec<&str> = line.trim().split(',').collect();
        let [family, collinearity, n, k, rows] = meta[..] else {
            return Err(bad());
        };

        let key = BucketKey {
            family: family.parse()?,
            collinearity: collinearity.parse()?,
            n: n.parse().map_err(|_| bad())?,
            k: k.parse().map_err(|_| bad())?,
        };
        let rows = rows.parse().map_err(|_| bad())?;

        Ok((key, rows))
    }
}

impl core::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} {} n={} k={}",
            self.family, self.collinearity, self.n, self.k
        )
    }
}

/// The complete set of shapes for one [`BucketKey`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    key: BucketKey,
    shapes: HashMap<ShapeId, Ancestors>,
}

impl Bucket {
    pub fn new(key: BucketKey, shapes: HashMap<ShapeId, Ancestors>) -> Self {
        Self { key, shapes }
    }

    pub fn empty(key: BucketKey) -> Self {
        Self::new(key, HashMap::new())
    }

    /// The single cell, which has no ancestors.
    pub fn seed(family: Family, collinearity: Collinearity) -> Self {
        let mut shapes = HashMap::new();
        shapes.insert(ShapeId::single(), Ancestors::new());
        Self::new(BucketKey::new(family, collinearity, 1, 1), shapes)
    }

    pub fn key(&self) -> BucketKey {
        self.key
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.shapes.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ShapeId> + '_ {
        self.shapes.keys()
    }

    pub fn ancestors(&self, id: &ShapeId) -> Option<&Ancestors> {
        self.shapes.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ShapeId, &Ancestors)> + '_ {
        self.shapes.iter()
    }

    pub fn par_iter(&self) -> impl ParallelIterator<Item = (&ShapeId, &Ancestors)> + '_ {
        self.shapes.par_iter()
    }

    pub fn into_shapes(self) -> HashMap<ShapeId, Ancestors> {
        self.shapes
    }

    /// Body lines in identifier order, ancestors in identifier order.
    ///
    /// A line reads `id ancestor:c0,c1 ...`.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        let mut ids: Vec<&ShapeId> = self.shapes.keys().collect();
        ids.sort_unstable();

        let family = self.key.family;
        ids.into_iter().map(move |id| {
            let mut line = id.to_string();

            let mut ancestors: Vec<_> = self.shapes[id].iter().collect();
            ancestors.sort_unstable();

            for (ancestor, point) in ancestors {
                line.push(' ');
                line.push_str(&ancestor.to_string());
                line.push(':');
                line.push_str(&family.format_point(*point));
            }

            line
        })
    }

    /// Parse one body line written by [`Bucket::lines`].
    pub fn parse_line(family: Family, line: &str) -> Result<(ShapeId, Ancestors)> {
        let mut tokens = line.split_whitespace();

        let id: ShapeId = tokens
            .next()
            .ok_or_else(|| Error::InvalidIdentifier("empty bucket line".to_string()))?
            .parse()?;

        let mut ancestors = Ancestors::new();
        for token in tokens {
            let (ancestor, point) = token.split_once(':').ok_or_else(|| {
                Error::InvalidIdentifier(format!("bad ancestor {token:?} in line {line:?}"))
            })?;
            ancestors.insert(ancestor.parse()?, family.parse_point(point)?);
        }

        Ok((id, ancestors))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn header_round_trip() {
        let key = BucketKey::new(Family::Hexagon, Collinearity::Lattice, 7, 3);
        let header = key.header(169);
        assert_eq!(header, "hexagon,lattice,7,3,169");
        assert_eq!(BucketKey::parse_header(&header).unwrap(), (key, 169));

        assert!(BucketKey::parse_header("hexagon,lattice,7,3").is_err());
        assert!(BucketKey::parse_header("hexagon,lattice,7,x,1").is_err());
    }

    #[test]
    pub fn seed_line() {
        let seed = Bucket::seed(Family::Square, Collinearity::Plane);
        assert_eq!(seed.lines().collect::<Vec<_>>(), vec!["1".to_string()]);
    }

    #[test]
    pub fn lines_are_sorted_and_parse_back() {
        let key = BucketKey::new(Family::Square, Collinearity::Plane, 4, 2);
        let mut shapes = HashMap::new();

        let mut ancestors = Ancestors::new();
        ancestors.insert("7".parse().unwrap(), Point::new(1, 2, 0));
        ancestors.insert("3-2".parse().unwrap(), Point::new(0, 0, 0));
        shapes.insert("7-2".parse().unwrap(), ancestors.clone());
        shapes.insert("3-3".parse().unwrap(), Ancestors::new());

        let bucket = Bucket::new(key, shapes);
        let lines: Vec<_> = bucket.lines().collect();
        assert_eq!(lines, vec!["3-3".to_string(), "7-2 3-2:0,0 7:1,2".to_string()]);

        let (id, parsed) = Bucket::parse_line(Family::Square, &lines[1]).unwrap();
        assert_eq!(id.to_string(), "7-2");
        assert_eq!(parsed, ancestors);
    }

    #[test]
    pub fn bad_lines() {
        assert!(Bucket::parse_line(Family::Square, "").is_err());
        assert!(Bucket::parse_line(Family::Square, "7-2 3-2").is_err());
        assert!(Bucket::parse_line(Family::Square, "7-2 3-2:0,0,0").is_err());
    }

    #[test]
    pub fn key_validity() {
        let key = BucketKey::new(Family::Square, Collinearity::Plane, 3, 3);
        assert!(key.is_valid());
        assert!(!key.at(3, 4).is_valid());
        assert!(!key.at(3, 0).is_valid());
        assert!(!key.at(0, 0).is_valid());
    }
}
