use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the file reader and the keyword searcher.
///
/// Every variant is terminal for the request that produced it; nothing is
/// retried.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The resolved path does not exist or is not a regular file.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The request itself is malformed (empty keyword and the like).
    #[error("{0}")]
    InvalidArgument(String),

    /// The file is larger than the configured `max_file_size`.
    #[error("File too large: {} ({size} bytes, limit {limit} bytes)", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// The file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SearchError {
    /// Short machine-readable tag, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::NotFound(_) => "not_found",
            SearchError::InvalidArgument(_) => "invalid_argument",
            SearchError::TooLarge { .. } => "too_large",
            SearchError::Io { .. } => "io",
        }
    }
}
