//! Errors raised while probing the filesystem during a search.
//!
//! None of these reach callers of the public query API: the search catches
//! them and degrades the verdict to not governed.

use std::path::PathBuf;

/// A filesystem probe that could not be answered.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to resolve absolute path for {path}: {source}")]
    Absolute {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to check for {path}: {source}")]
    Exists {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    /// The path whose probe failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ProbeError::Absolute { path, .. }
            | ProbeError::Stat { path, .. }
            | ProbeError::Exists { path, .. } => path,
        }
    }
}
