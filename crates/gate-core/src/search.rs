//! Boundary search: walk a file's ancestors to find what governs it.
//!
//! The walk goes strictly bottom-up and stops at the first of:
//! - a cached ancestor (checked right after the query path itself is stat'ed);
//! - a dependency-installation root such as `node_modules`, whose enclosing
//!   project must never lend its configuration to a dependency;
//! - a directory the [`Classifier`] reports as governed;
//! - the filesystem root.
//!
//! Paths are made absolute and `.`/`..` are folded lexically first.
//! Every probe failure degrades the query to not governed.

use crate::Verdict;
use crate::cache::VerdictCache;
use crate::classifier::{Classifier, Reason};
use crate::config::GateConfig;
use crate::error::ProbeError;
use crate::fs::{FileSystem, OsFileSystem};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// How a query was answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// An ancestor was already resolved by an earlier query.
    CacheHit { dir: PathBuf, verdict: Verdict },
    /// `dir` carries transform configuration.
    Governed { dir: PathBuf, reason: Reason },
    /// The walk reached dependency root `root`. `package_dir` is the
    /// top-level package folder directly inside it, cached as not governed;
    /// `None` when the query started at the dependency root itself.
    DependencyBoundary {
        root: PathBuf,
        package_dir: Option<PathBuf>,
    },
    /// No governed directory and no dependency root up to `/`. Not cached.
    RootExhausted,
    /// A probe failed; the query is treated as not governed.
    ProbeFailed { path: PathBuf, message: String },
}

impl Resolution {
    pub fn verdict(&self) -> Verdict {
        match self {
            Resolution::CacheHit { verdict, .. } => *verdict,
            Resolution::Governed { .. } => Verdict::Governed,
            Resolution::DependencyBoundary { .. }
            | Resolution::RootExhausted
            | Resolution::ProbeFailed { .. } => Verdict::NotGoverned,
        }
    }

    pub fn is_governed(&self) -> bool {
        self.verdict().is_governed()
    }

    /// The directory whose verdict decided the query, if any.
    pub fn deciding_dir(&self) -> Option<&Path> {
        match self {
            Resolution::CacheHit { dir, .. } | Resolution::Governed { dir, .. } => Some(dir),
            Resolution::DependencyBoundary { package_dir, .. } => package_dir.as_deref(),
            Resolution::RootExhausted | Resolution::ProbeFailed { .. } => None,
        }
    }
}

/// Upward search with a per-instance verdict cache.
///
/// Safe to share between threads; concurrent queries share one cache.
#[derive(Debug)]
pub struct BoundarySearch<F = OsFileSystem> {
    classifier: Classifier<F>,
    cache: VerdictCache,
    dependency_root: String,
}

impl Default for BoundarySearch<OsFileSystem> {
    fn default() -> Self {
        Self::with_config(&GateConfig::default())
    }
}

impl BoundarySearch<OsFileSystem> {
    pub fn with_config(config: &GateConfig) -> Self {
        Self::new(OsFileSystem, config)
    }
}

impl<F: FileSystem> BoundarySearch<F> {
    pub fn new(fs: F, config: &GateConfig) -> Self {
        Self {
            classifier: Classifier::new(fs, config),
            cache: VerdictCache::new(),
            dependency_root: config.boundary.dependency_root.clone(),
        }
    }

    pub fn classifier(&self) -> &Classifier<F> {
        &self.classifier
    }

    pub fn cache(&self) -> &VerdictCache {
        &self.cache
    }

    /// Whether the file at `path` is governed by a transform configuration.
    pub fn is_governed(&self, path: &Path) -> bool {
        self.resolve(path).is_governed()
    }

    /// Host-facing exclusion predicate: `true` means leave the file alone.
    pub fn should_skip_transform(&self, path: &Path) -> bool {
        !self.is_governed(path)
    }

    /// Resolve `path`, reporting how the verdict was reached.
    pub fn resolve(&self, path: &Path) -> Resolution {
        match self.try_resolve(path) {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::debug!("governance lookup for {} failed: {}", path.display(), e);
                Resolution::ProbeFailed {
                    path: e.path().to_path_buf(),
                    message: e.to_string(),
                }
            }
        }
    }

    fn try_resolve(&self, path: &Path) -> Result<Resolution, ProbeError> {
        let absolute = std::path::absolute(path).map_err(|source| ProbeError::Absolute {
            path: path.to_path_buf(),
            source,
        })?;
        let path = normalize_lexically(&absolute);

        // A missing query path must fail whether or not an ancestor is cached.
        let is_dir = self
            .classifier
            .fs()
            .is_dir(&path)
            .map_err(|source| ProbeError::Stat {
                path: path.clone(),
                source,
            })?;

        if let Some((dir, verdict)) = self.cache.lookup_ancestors(&path, &self.dependency_root) {
            tracing::debug!("cache hit for {} at {}", path.display(), dir.display());
            return Ok(Resolution::CacheHit { dir, verdict });
        }

        let start = if is_dir {
            path.as_path()
        } else {
            path.parent().unwrap_or(path.as_path())
        };

        let mut below: Option<&Path> = None;
        for dir in start.ancestors() {
            if self.is_dependency_root(dir) {
                let package_dir = below.map(Path::to_path_buf);
                if let Some(package_dir) = &package_dir {
                    self.cache.record(package_dir, Verdict::NotGoverned);
                }
                tracing::debug!(
                    "{} stopped at dependency root {}",
                    path.display(),
                    dir.display()
                );
                return Ok(Resolution::DependencyBoundary {
                    root: dir.to_path_buf(),
                    package_dir,
                });
            }

            let report = self.classifier.inspect(dir)?;
            if report.verdict.is_governed() {
                self.cache.record(dir, Verdict::Governed);
                tracing::debug!("{} governed by {}", path.display(), dir.display());
                return Ok(Resolution::Governed {
                    dir: report.dir,
                    reason: report.reason,
                });
            }
            below = Some(dir);
        }

        tracing::debug!("{} reached the filesystem root ungoverned", path.display());
        Ok(Resolution::RootExhausted)
    }

    fn is_dependency_root(&self, dir: &Path) -> bool {
        dir.file_name()
            .is_some_and(|name| name == self.dependency_root.as_str())
    }
}

/// Drop `.` and fold `..` without touching the filesystem, so that
/// `node_modules/../src` is walked (and cached) as `src`.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root.
                if out.file_name().is_some() {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
