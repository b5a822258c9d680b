//! Level by level generation of buckets.
//!
//! Bucket `(n, k)` is grown from the shapes of `(n - 1, k)`, whose
//! collinearity must not grow, and `(n - 1, k - 1)`, whose collinearity must
//! grow by exactly one. Adding a cell can only change lines through that cell,
//! so only those are measured.

use std::time::Instant;

use hashbrown::HashMap;
use indicatif::{MultiProgress, ProgressBar};
use rayon::prelude::*;

use crate::{
    bucket::{Ancestors, Bucket, BucketKey},
    canonical::{canonicalize, decode, ShapeId},
    collinearity::Collinearity,
    error::{Error, Result},
    geometry::{Family, Pattern},
    progress::{finish_bar, make_bar, unknown_bar},
    store::BucketStore,
};

/// Forward edges: for every source shape, the shapes grown from it, each
/// labelled with the added cell in the grown shape's canonical orientation.
pub type Descendants = HashMap<ShapeId, Ancestors>;

/// What [`Generator::create_bucket`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketOutcome {
    /// A complete bucket was already stored.
    Existing(usize),
    /// The bucket was computed and stored.
    Created(usize),
}

impl BucketOutcome {
    pub fn rows(&self) -> usize {
        match self {
            BucketOutcome::Existing(rows) | BucketOutcome::Created(rows) => *rows,
        }
    }
}

/// The row counts of every bucket of one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSummary {
    pub n: usize,
    /// `(k, rows)`, in increasing `k`.
    pub counts: Vec<(usize, usize)>,
}

impl LevelSummary {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, rows)| rows).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// From `(n - 1, k)`.
    Same,
    /// From `(n - 1, k - 1)`.
    Prev,
}

struct Source {
    id: ShapeId,
    pattern: Pattern,
    origin: Origin,
}

/// Creates buckets for one shape family and collinearity policy, reading
/// predecessors from and writing results to a [`BucketStore`].
pub struct Generator<S> {
    store: S,
    family: Family,
    collinearity: Collinearity,
    parallel: bool,
    progress: Option<MultiProgress>,
}

impl<S> Generator<S>
where
    S: BucketStore,
{
    pub fn new(store: S, family: Family, collinearity: Collinearity) -> Self {
        Self {
            store,
            family,
            collinearity,
            parallel: true,
            progress: None,
        }
    }

    /// Enable or disable parallel expansion. Enabled by default.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Show a progress bar per bucket in `progress`.
    pub fn progress(mut self, progress: MultiProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self, n: usize, k: usize) -> BucketKey {
        BucketKey::new(self.family, self.collinearity, n, k)
    }

    fn bar(&self, len: u64) -> ProgressBar {
        match &self.progress {
            Some(multi) => multi.add(make_bar(len)),
            None => ProgressBar::hidden(),
        }
    }

    fn spinner(&self) -> ProgressBar {
        match &self.progress {
            Some(multi) => multi.add(unknown_bar()),
            None => ProgressBar::hidden(),
        }
    }

    /// Create and store bucket `(n, k)`, unless a complete one is already
    /// stored.
    pub fn create_bucket(&self, n: usize, k: usize) -> Result<BucketOutcome> {
        let key = self.key(n, k);
        if !key.is_valid() {
            return Err(Error::OutOfRange { n, k });
        }

        if self.store.is_complete(key)? {
            let rows = self.store.row_count(key)?.unwrap_or(0);
            tracing::info!(%key, rows, "bucket already complete");
            return Ok(BucketOutcome::Existing(rows));
        }

        let bucket = self.build_bucket(key)?;
        let rows = bucket.len();
        self.store.save(&bucket)?;

        tracing::info!(%key, rows, "created bucket");
        Ok(BucketOutcome::Created(rows))
    }

    /// Compute bucket `key` from its stored predecessors, without storing it.
    fn build_bucket(&self, key: BucketKey) -> Result<Bucket> {
        if key.n == 1 {
            return Ok(Bucket::seed(key.family, key.collinearity));
        }

        let loading = self.spinner();
        loading.set_message(format!("loading predecessors of {key}..."));
        let sources = self.load_sources(key);
        loading.finish_and_clear();
        let sources = sources?;

        if sources.is_empty() {
            tracing::info!(%key, "previous buckets are empty, so none for this k");
            return Ok(Bucket::empty(key));
        }

        tracing::debug!(%key, sources = sources.len(), "expanding");

        let start = Instant::now();
        let bar = self.bar(sources.len() as u64);
        bar.set_message(format!("expanding shapes for {key}..."));

        let descendants = self.expand(&sources, key.k, &bar)?;
        let shapes = invert(descendants);

        finish_bar(&bar, start.elapsed(), shapes.len(), &key.to_string());

        Ok(Bucket::new(key, shapes))
    }

    fn load_sources(&self, key: BucketKey) -> Result<Vec<Source>> {
        let BucketKey { n, k, .. } = key;
        let mut sources = Vec::new();

        if k < n {
            self.load_predecessor(key, key.at(n - 1, k), Origin::Same, &mut sources)?;
        }

        if k > 1 {
            self.load_predecessor(key, key.at(n - 1, k - 1), Origin::Prev, &mut sources)?;
        }

        sources.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        Ok(sources)
    }

    fn load_predecessor(
        &self,
        key: BucketKey,
        predecessor: BucketKey,
        origin: Origin,
        sources: &mut Vec<Source>,
    ) -> Result<()> {
        let bucket = self
            .store
            .load(predecessor)?
            .ok_or(Error::MissingPredecessor {
                n: key.n,
                k: key.k,
                missing: predecessor,
            })?;

        for id in bucket.ids() {
            sources.push(Source {
                id: id.clone(),
                pattern: decode(self.family, id)?,
                origin,
            });
        }

        Ok(())
    }

    /// Grow every source by one cell, keeping the shapes whose collinearity
    /// ends up exactly `k`.
    fn expand(&self, sources: &[Source], k: usize, bar: &ProgressBar) -> Result<Descendants> {
        let grow = |source: &Source| {
            let grown = self.grow(source, k).map(|found| (source.id.clone(), found));
            bar.inc(1);
            grown
        };

        let grown: Vec<(ShapeId, Ancestors)> = if self.parallel {
            let chunk_size = (sources.len() / num_cpus::get()) + 1;

            sources
                .par_chunks(chunk_size)
                .map(|chunk| chunk.iter().map(&grow).collect::<Result<Vec<_>>>())
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect()
        } else {
            sources.iter().map(&grow).collect::<Result<_>>()?
        };

        Ok(grown.into_iter().filter(|(_, found)| !found.is_empty()).collect())
    }

    /// All accepted one-cell expansions of `source`.
    fn grow(&self, source: &Source, k: usize) -> Result<Ancestors> {
        let mut found = Ancestors::new();

        for p in source.pattern.iter() {
            for v in self.family.vectors() {
                let added = p.add(*v);
                if source.pattern.contains(&added) {
                    continue;
                }

                let candidate = source.pattern.with(added);
                let canonical = canonicalize(self.family, &candidate, added)?;

                let through = self.collinearity.max_collinear_through(
                    self.family,
                    &canonical.pattern,
                    canonical.marked,
                );

                let accept = match source.origin {
                    Origin::Same => through <= k,
                    Origin::Prev => through >= k,
                };

                if !accept {
                    continue;
                }

                #[cfg(feature = "diagnostics")]
                {
                    let whole = self.collinearity.max_collinear(self.family, &canonical.pattern);
                    if whole != k {
                        tracing::error!(
                            id = %canonical.id,
                            source = %source.id,
                            whole,
                            k,
                            "accepted shape has the wrong collinearity"
                        );
                    }
                }

                found.insert(canonical.id, canonical.marked);
            }
        }

        Ok(found)
    }

    /// Create every bucket with `n_from <= n <= n_to` and `k <= k_limit`,
    /// one level at a time.
    ///
    /// Buckets of one level are independent and run in parallel if enabled.
    /// A failing bucket does not stop its siblings, but stops the run before
    /// the next level. The run also stops after the first level whose
    /// buckets are all empty.
    pub fn create_range(
        &self,
        n_from: usize,
        n_to: usize,
        k_limit: Option<usize>,
    ) -> Result<Vec<LevelSummary>> {
        let mut levels = Vec::new();

        for n in n_from.max(1)..=n_to {
            let k_max = k_limit.map_or(n, |limit| limit.min(n));

            let results: Vec<(usize, Result<BucketOutcome>)> = if self.parallel {
                (1..=k_max)
                    .into_par_iter()
                    .map(|k| (k, self.create_bucket(n, k)))
                    .collect()
            } else {
                (1..=k_max).map(|k| (k, self.create_bucket(n, k))).collect()
            };

            let mut counts = Vec::with_capacity(results.len());
            let mut first_error = None;

            for (k, result) in results {
                match result {
                    Ok(outcome) => counts.push((k, outcome.rows())),
                    Err(e) => {
                        tracing::error!(
                            family = %self.family,
                            collinearity = %self.collinearity,
                            n,
                            k,
                            "failed to create bucket: {e}"
                        );
                        first_error.get_or_insert(e);
                    }
                }
            }

            if let Some(e) = first_error {
                return Err(e);
            }

            let level = LevelSummary { n, counts };
            let done = level.total() == 0;
            levels.push(level);

            if done {
                tracing::info!(n, ?k_limit, "every bucket of this level is empty, stopping");
                break;
            }
        }

        Ok(levels)
    }
}

/// Reverse forward edges into the ancestors of every grown shape.
pub fn invert(descendants: Descendants) -> HashMap<ShapeId, Ancestors> {
    let mut ancestors: HashMap<ShapeId, Ancestors> = HashMap::new();

    for (source, found) in descendants {
        for (id, point) in found {
            ancestors.entry(id).or_default().insert(source.clone(), point);
        }
    }

    ancestors
}
