//! Decide whether a source file should go through a build-time transform.
//!
//! A file is *governed* when the nearest ancestor directory carrying a
//! transform configuration ([`classifier`]) is reached before a
//! dependency-installation root. Files inside pre-built third-party packages
//! are never governed. [`search::BoundarySearch`] performs the upward walk and
//! owns a [`cache::VerdictCache`]; [`filter::TransformFilter`] is the predicate
//! a host pipeline plugs in.

pub mod cache;
pub mod classifier;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod fs;
pub mod heuristics;
pub mod search;

pub use cache::VerdictCache;
pub use classifier::{Classifier, DirectoryReport, Reason};
pub use config::GateConfig;
pub use filter::{Decision, TransformFilter};
pub use search::{BoundarySearch, Resolution};

use serde::Serialize;

/// Whether files under a directory should be transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Governed,
    NotGoverned,
}

impl Verdict {
    pub fn is_governed(self) -> bool {
        self == Verdict::Governed
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Governed => f.write_str("governed"),
            Verdict::NotGoverned => f.write_str("not governed"),
        }
    }
}
