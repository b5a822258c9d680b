//! Enumeration of free polyominoes and polyhexes by size and collinearity.
//!
//! Shapes of `n` cells whose largest set of collinear cell centres has size
//! `k` are collected in the bucket `(n, k)`. Each bucket is grown from the
//! buckets `(n - 1, k)` and `(n - 1, k - 1)` and kept in a [`BucketStore`],
//! so long runs can resume where they stopped.

#[cfg(test)]
mod test;

pub mod bucket;
pub mod canonical;
pub mod collinearity;
pub mod draw;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod progress;
pub mod report;
pub mod store;
pub mod validate;

pub use bucket::{Bucket, BucketKey};
pub use canonical::ShapeId;
pub use collinearity::Collinearity;
pub use error::{Error, Result};
pub use generator::{BucketOutcome, Generator, LevelSummary};
pub use geometry::{Family, Pattern, Point};
pub use store::{BucketStore, Compression, FileStore, MemoryStore, StoreConfig};
