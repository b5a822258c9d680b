//! Reporting over stored buckets: n/k tables, flattened sequences and the
//! descendants of a bucket.

use std::collections::BTreeMap;

use crate::{
    bucket::BucketKey,
    canonical::ShapeId,
    collinearity::Collinearity,
    error::Result,
    generator::{invert, Descendants},
    geometry::Family,
    store::BucketStore,
};

/// Width of one count in [`Summary::table`].
pub const CELL_WIDTH: usize = 10;

/// The row counts of all stored buckets with `n <= max_n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    family: Family,
    collinearity: Collinearity,
    max_n: usize,
    counts: BTreeMap<(usize, usize), usize>,
}

impl Summary {
    pub fn max_n(&self) -> usize {
        self.max_n
    }

    /// The row count of `(n, k)`, or `None` if that bucket is not stored.
    pub fn get(&self, n: usize, k: usize) -> Option<usize> {
        self.counts.get(&(n, k)).copied()
    }

    /// Counts for `k = 1..=n`, for every `n`, missing buckets as zero.
    pub fn triangle(&self) -> Vec<usize> {
        (1..=self.max_n)
            .flat_map(|n| (1..=n).map(move |k| (n, k)))
            .map(|(n, k)| self.get(n, k).unwrap_or(0))
            .collect()
    }

    /// The total count of every `n`, only counting `k <= k_limit` if given.
    pub fn row_totals(&self, k_limit: Option<usize>) -> Vec<usize> {
        (1..=self.max_n)
            .map(|n| {
                let k_max = k_limit.unwrap_or(n);
                (1..=k_max).filter_map(|k| self.get(n, k)).sum()
            })
            .collect()
    }

    /// A fixed width table with one row per `n`, one column per `k` and a
    /// total column. Buckets that are not stored are left blank.
    pub fn table(&self, k_limit: Option<usize>) -> String {
        let cw = CELL_WIDTH;
        let k_max = k_limit.unwrap_or(self.max_n);
        let width = cw * k_max + 10;

        let mut out = format!(
            "{} of size (n) with (k) cells collinear on the {}\n\n",
            self.family.title(),
            self.collinearity.title()
        );

        out.push_str("   |  k\n");

        let mut header = String::from(" n | ");
        for k in 1..=k_max {
            header.push_str(&format!("{k:>cw$}"));
        }
        let header = format!("{header:<width$}{:>cw$}", "Total");

        out.push_str(&header);
        out.push('\n');
        out.push_str(&"-".repeat(header.len()));
        out.push('\n');

        for n in 1..=self.max_n {
            let mut line = format!("{n:2} | ");
            let mut total = 0;

            for k in 1..=k_max {
                match self.get(n, k) {
                    Some(count) => {
                        total += count;
                        line.push_str(&format!("{count:>cw$}"));
                    }
                    None => line.push_str(&" ".repeat(cw)),
                }
            }

            out.push_str(&format!("{line:<width$}{total:>cw$}\n"));
        }

        out
    }
}

/// Collect the row counts of every `(n, k)` with `n <= max_n`.
///
/// Only bucket headers are read.
pub fn summary<S>(store: &S, family: Family, collinearity: Collinearity, max_n: usize) -> Result<Summary>
where
    S: BucketStore + ?Sized,
{
    let mut counts = BTreeMap::new();

    for n in 1..=max_n {
        for k in 1..=n {
            let key = BucketKey::new(family, collinearity, n, k);
            if let Some(rows) = store.row_count(key)? {
                counts.insert((n, k), rows);
            }
        }
    }

    Ok(Summary {
        family,
        collinearity,
        max_n,
        counts,
    })
}

pub fn triangle<S>(store: &S, family: Family, collinearity: Collinearity, max_n: usize) -> Result<Vec<usize>>
where
    S: BucketStore + ?Sized,
{
    Ok(summary(store, family, collinearity, max_n)?.triangle())
}

pub fn row_totals<S>(
    store: &S,
    family: Family,
    collinearity: Collinearity,
    max_n: usize,
    k_limit: Option<usize>,
) -> Result<Vec<usize>>
where
    S: BucketStore + ?Sized,
{
    Ok(summary(store, family, collinearity, max_n)?.row_totals(k_limit))
}

pub fn format_table<S>(
    store: &S,
    family: Family,
    collinearity: Collinearity,
    max_n: usize,
    k_limit: Option<usize>,
) -> Result<String>
where
    S: BucketStore + ?Sized,
{
    Ok(summary(store, family, collinearity, max_n)?.table(k_limit))
}

/// Join a sequence the way OEIS lists its data.
pub fn format_sequence(values: &[usize]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The shapes of one bucket split by where their descendants land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescendantGroups {
    /// Shapes of `(n, k)` with descendants in `(n + 1, k)`.
    pub same: Descendants,
    /// Shapes of `(n, k)` with descendants in `(n + 1, k + 1)`.
    pub next: Descendants,
}

/// Group the shapes of `(n, k)` by the shapes they give rise to in
/// `(n + 1, k)` and `(n + 1, k + 1)`. All three buckets must be stored.
pub fn descendant_groups<S>(
    store: &S,
    family: Family,
    collinearity: Collinearity,
    n: usize,
    k: usize,
) -> Result<DescendantGroups>
where
    S: BucketStore + ?Sized,
{
    let key = BucketKey::new(family, collinearity, n, k);
    let shapes = store.require(key)?;

    let mut same = invert(store.require(key.at(n + 1, k))?.into_shapes());
    let mut next = invert(store.require(key.at(n + 1, k + 1))?.into_shapes());

    same.retain(|id, _| shapes.contains(id));
    next.retain(|id, _| shapes.contains(id));

    Ok(DescendantGroups { same, next })
}

/// Every stored shape with `n` cells and collinearity at most `k`, in
/// identifier order.
pub fn load_shapes_up_to_k<S>(
    store: &S,
    family: Family,
    collinearity: Collinearity,
    n: usize,
    k: usize,
) -> Result<Vec<ShapeId>>
where
    S: BucketStore + ?Sized,
{
    let mut ids = Vec::new();

    for k in 1..=k.min(n) {
        let bucket = store.require(BucketKey::new(family, collinearity, n, k))?;
        ids.extend(bucket.into_shapes().into_keys());
    }

    ids.sort_unstable();
    Ok(ids)
}
