//! Error type shared by the library builder and the sequence sources.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by library construction.
pub enum Error {
    /// I/O error from the sequence source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// k-mer length outside `1..=16`.
    #[error("invalid k-mer length {0}: must be 1..=16")]
    InvalidKmerLength(usize),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
