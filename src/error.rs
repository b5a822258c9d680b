use thiserror::Error;

use crate::bucket::BucketKey;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while enumerating, storing or reading polyominoes.
#[derive(Debug, Error)]
pub enum Error {
    /// Input to canonicalization was empty, did not contain its marked
    /// point, or does not fit in a layout row.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// A canonical identifier or bucket line could not be parsed.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A bucket that `(n, k)` is grown from has not been computed.
    #[error("Missing predecessor {missing} required for n = {n}, k = {k}")]
    MissingPredecessor {
        n: usize,
        k: usize,
        missing: BucketKey,
    },

    /// A bucket that was asked for has not been computed.
    #[error("Bucket {0} has not been computed")]
    MissingBucket(BucketKey),

    /// The header row count of a stored bucket does not match its body.
    #[error("Bucket {key} is incomplete: header says {expected} rows, found {found}")]
    IncompleteBucket {
        key: BucketKey,
        expected: usize,
        found: usize,
    },

    #[error("No bucket exists for n = {n}, k = {k}: k must be in 1..=n")]
    OutOfRange { n: usize, k: usize },

    #[error("Bucket {0} already exists")]
    AlreadyExists(BucketKey),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
