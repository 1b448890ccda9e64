//! Per-directory classification: does this directory govern the files below it?
//!
//! Precedence inside one directory is fixed:
//! 1. package metadata is read (failures mean "no descriptor");
//! 2. a descriptor flagged by a pre-built heuristic → not governed;
//! 3. primary config file, script config file, descriptor key → governed;
//! 4. otherwise not governed.

use crate::Verdict;
use crate::config::{GateConfig, MarkerConfig, PrebuiltConfig};
use crate::descriptor::PackageDescriptor;
use crate::error::ProbeError;
use crate::fs::{FileSystem, OsFileSystem};
use crate::heuristics::{self, Heuristic};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Why a directory got its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reason {
    /// The package looks pre-built; its own config is not trusted.
    Prebuilt { heuristic: Heuristic },
    ConfigFile { file: String },
    ScriptConfigFile { file: String },
    DescriptorKey { key: String },
    NoMarkers,
}

/// Classification of a single directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryReport {
    pub dir: PathBuf,
    pub verdict: Verdict,
    pub reason: Reason,
}

impl DirectoryReport {
    fn new(dir: &Path, verdict: Verdict, reason: Reason) -> Self {
        Self {
            dir: dir.to_path_buf(),
            verdict,
            reason,
        }
    }
}

/// Inspects a directory's local configuration artifacts.
#[derive(Debug, Clone)]
pub struct Classifier<F = OsFileSystem> {
    fs: F,
    markers: MarkerConfig,
    prebuilt: PrebuiltConfig,
}

impl Classifier<OsFileSystem> {
    pub fn with_config(config: &GateConfig) -> Self {
        Self::new(OsFileSystem, config)
    }
}

impl<F: FileSystem> Classifier<F> {
    pub fn new(fs: F, config: &GateConfig) -> Self {
        Self {
            fs,
            markers: config.markers.clone(),
            prebuilt: config.prebuilt.clone(),
        }
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Verdict for `dir`. A failed probe counts as not governed.
    pub fn classify(&self, dir: &Path) -> Verdict {
        match self.inspect(dir) {
            Ok(report) => report.verdict,
            Err(e) => {
                tracing::debug!("classification of {} failed: {}", dir.display(), e);
                Verdict::NotGoverned
            }
        }
    }

    /// Verdict for `dir` together with the rule that decided it.
    ///
    /// Metadata problems never fail; only marker existence checks that cannot
    /// be answered (permission denied and the like) do.
    pub fn inspect(&self, dir: &Path) -> Result<DirectoryReport, ProbeError> {
        let descriptor = PackageDescriptor::load(&self.fs, dir, &self.markers.descriptor_file);

        if let Some(descriptor) = &descriptor
            && let Some(heuristic) = heuristics::detect_prebuilt(descriptor, &self.prebuilt)
        {
            tracing::trace!("{} looks pre-built ({})", dir.display(), heuristic);
            return Ok(DirectoryReport::new(
                dir,
                Verdict::NotGoverned,
                Reason::Prebuilt { heuristic },
            ));
        }

        if self.marker_exists(dir, &self.markers.config_file)? {
            return Ok(DirectoryReport::new(
                dir,
                Verdict::Governed,
                Reason::ConfigFile {
                    file: self.markers.config_file.clone(),
                },
            ));
        }

        if self.marker_exists(dir, &self.markers.script_config_file)? {
            return Ok(DirectoryReport::new(
                dir,
                Verdict::Governed,
                Reason::ScriptConfigFile {
                    file: self.markers.script_config_file.clone(),
                },
            ));
        }

        if descriptor.is_some_and(|d| d.has_truthy(&self.markers.descriptor_key)) {
            return Ok(DirectoryReport::new(
                dir,
                Verdict::Governed,
                Reason::DescriptorKey {
                    key: self.markers.descriptor_key.clone(),
                },
            ));
        }

        Ok(DirectoryReport::new(dir, Verdict::NotGoverned, Reason::NoMarkers))
    }

    fn marker_exists(&self, dir: &Path, name: &str) -> Result<bool, ProbeError> {
        let path = dir.join(name);
        self.fs
            .exists(&path)
            .map_err(|source| ProbeError::Exists { path, source })
    }
}
