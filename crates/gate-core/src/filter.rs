//! The predicate a host pipeline registers to decide what to transform.
//!
//! A file is transformed only when its extension is one the transform
//! handles and the boundary search finds it governed.

use crate::config::GateConfig;
use crate::fs::{FileSystem, OsFileSystem};
use crate::search::{BoundarySearch, Resolution};
use serde::Serialize;
use std::path::Path;

/// What the host should do with a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Transform { resolution: Resolution },
    /// Extension is not handled; no search was performed.
    SkipExtension,
    Skip { resolution: Resolution },
}

impl Decision {
    pub fn should_transform(&self) -> bool {
        matches!(self, Decision::Transform { .. })
    }

    pub fn label(&self) -> &'static str {
        if self.should_transform() {
            "transform"
        } else {
            "skip"
        }
    }
}

#[derive(Debug)]
pub struct TransformFilter<F = OsFileSystem> {
    search: BoundarySearch<F>,
    extensions: Vec<String>,
}

impl TransformFilter<OsFileSystem> {
    pub fn with_config(config: &GateConfig) -> Self {
        Self::new(BoundarySearch::with_config(config), config)
    }
}

impl<F: FileSystem> TransformFilter<F> {
    pub fn new(search: BoundarySearch<F>, config: &GateConfig) -> Self {
        Self {
            search,
            extensions: config.filter.extensions.clone(),
        }
    }

    pub fn search(&self) -> &BoundarySearch<F> {
        &self.search
    }

    /// Whether `path` has one of the configured extensions (case-insensitive).
    pub fn handles_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }

    pub fn decide(&self, path: &Path) -> Decision {
        if !self.handles_extension(path) {
            return Decision::SkipExtension;
        }
        let resolution = self.search.resolve(path);
        if resolution.is_governed() {
            Decision::Transform { resolution }
        } else {
            Decision::Skip { resolution }
        }
    }

    /// Exclusion predicate: `true` means the host must not transform `path`.
    pub fn should_ignore(&self, path: &Path) -> bool {
        !self.decide(path).should_transform()
    }
}
