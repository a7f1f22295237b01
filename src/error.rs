//! Error taxonomy for key distribution and recombination

use std::path::{Path, PathBuf};

/// Failures reported by a [`CryptoProvider`](crate::provider::CryptoProvider)
///
/// These are never retried: cryptographic failures are not transient.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("key generation failed: {0}")]
    KeyGen(String),
    #[error("key split failed: {0}")]
    Split(String),
    #[error("insufficient shares: need at least {needed}, but only {got} provided")]
    ThresholdNotMet { needed: usize, got: usize },
    #[error("key combine failed: {0}")]
    Combine(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required parameter is missing or out of range
    #[error("{0}")]
    Validation(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("decode error: {0}")]
    Decode(String),
    /// Paired bundling was handed a sequence that cannot be split into pairs
    #[error("cannot pair {count} shares: paired bundling needs an even number of shares")]
    UnpairedShare { count: usize },
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed rendering secret object: {0}")]
    Render(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this error is a caller mistake reported before any side effect
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
