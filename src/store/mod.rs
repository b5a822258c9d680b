//! Durable storage of buckets, keyed by [`BucketKey`].
//!
//! A stored bucket is only trusted when it is complete: the row count in its
//! header matches the rows actually present.

use std::path::PathBuf;

use crate::{
    bucket::{Bucket, BucketKey},
    error::{Error, Result},
};

mod compression;
pub use compression::Compression;

mod file;
pub use file::FileStore;

mod memory;
pub use memory::MemoryStore;

/// Where and how a [`FileStore`] keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub compression: Compression,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            compression: Compression::None,
        }
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}

/// A keyed store of complete buckets.
pub trait BucketStore: Sync {
    /// Load the bucket for `key`.
    ///
    /// Returns `None` if the bucket is absent or incomplete.
    fn load(&self, key: BucketKey) -> Result<Option<Bucket>>;

    /// The row count recorded for `key`, without reading the rows.
    ///
    /// The count is not checked against the stored rows, so it may come
    /// from an incomplete bucket. Use [`BucketStore::is_complete`] or
    /// [`BucketStore::load`] where that matters.
    fn row_count(&self, key: BucketKey) -> Result<Option<usize>>;

    /// Whether a complete bucket is stored for `key`.
    fn is_complete(&self, key: BucketKey) -> Result<bool>;

    /// Persist `bucket`.
    ///
    /// Fails with [`Error::AlreadyExists`](crate::Error::AlreadyExists) if a
    /// complete bucket with the same key is already stored, or is being
    /// written concurrently.
    fn save(&self, bucket: &Bucket) -> Result<()>;

    /// Load the bucket for `key`, failing with [`Error::MissingBucket`] if it
    /// is absent or incomplete.
    fn require(&self, key: BucketKey) -> Result<Bucket> {
        self.load(key)?.ok_or(Error::MissingBucket(key))
    }
}

impl<S> BucketStore for &S
where
    S: BucketStore + ?Sized,
{
    fn load(&self, key: BucketKey) -> Result<Option<Bucket>> {
        (**self).load(key)
    }

    fn row_count(&self, key: BucketKey) -> Result<Option<usize>> {
        (**self).row_count(key)
    }

    fn is_complete(&self, key: BucketKey) -> Result<bool> {
        (**self).is_complete(key)
    }

    fn save(&self, bucket: &Bucket) -> Result<()> {
        (**self).save(bucket)
    }
}
