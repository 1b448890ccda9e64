//! Configuration for marker names, the dependency boundary and the transform filter.
//!
//! Load order: `.gate/config.toml` → environment variables → defaults.

use crate::heuristics::Heuristic;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

const GATE_DIR: &str = ".gate";
const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub markers: MarkerConfig,
    pub boundary: BoundaryConfig,
    pub prebuilt: PrebuiltConfig,
    pub filter: FilterConfig,
}

/// Per-directory files and keys that mark a governed directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Primary config marker file.
    pub config_file: String,
    /// Alternate, script-form config marker file.
    pub script_config_file: String,
    /// JSON package-metadata file read for every probed directory.
    pub descriptor_file: String,
    /// Key inside the package metadata that embeds transform configuration.
    pub descriptor_key: String,
}

/// Where the upward search stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Directory name under which third-party packages are installed.
    pub dependency_root: String,
}

/// Pre-built package detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrebuiltConfig {
    /// Substring of a `_resolved` URL identifying the public registry.
    pub registry_host: String,
    /// Entry points starting with this prefix are considered build output.
    pub dist_prefix: String,
    /// Heuristics to evaluate, in order. The first match wins.
    pub heuristics: Vec<Heuristic>,
}

/// Host-side filter applied before the search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// File extensions (without the dot) the transform handles.
    pub extensions: Vec<String>,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            config_file: ".babelrc".to_string(),
            script_config_file: ".babelrc.js".to_string(),
            descriptor_file: "package.json".to_string(),
            descriptor_key: "babel".to_string(),
        }
    }
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            dependency_root: "node_modules".to_string(),
        }
    }
}

impl Default for PrebuiltConfig {
    fn default() -> Self {
        Self {
            registry_host: "npmjs.org".to_string(),
            dist_prefix: "dist/".to_string(),
            heuristics: Heuristic::ALL.to_vec(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["js".to_string(), "ts".to_string(), "tsx".to_string()],
        }
    }
}

fn env_string(var: &str, target: &mut String) {
    if let Ok(v) = std::env::var(var)
        && !v.trim().is_empty()
    {
        *target = v.trim().to_string();
    }
}

impl GateConfig {
    /// Load config from `.gate/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(GATE_DIR).join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        env_string("GATE_DEPENDENCY_ROOT", &mut config.boundary.dependency_root);
        env_string("GATE_REGISTRY_HOST", &mut config.prebuilt.registry_host);
        env_string("GATE_DESCRIPTOR_KEY", &mut config.markers.descriptor_key);
        if let Ok(v) = std::env::var("GATE_EXTENSIONS") {
            config.filter.extensions = v
                .split(',')
                .map(|ext| ext.trim().to_string())
                .filter(|ext| !ext.is_empty())
                .collect();
        }

        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Strip leading dots and lowercase extensions so `.TS` and `ts` agree.
    fn normalize(&mut self) {
        self.filter.extensions = std::mem::take(&mut self.filter.extensions)
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
    }

    /// Reject configurations that would make the search probe nonsense paths.
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("markers.config_file", &self.markers.config_file),
            ("markers.script_config_file", &self.markers.script_config_file),
            ("markers.descriptor_file", &self.markers.descriptor_file),
            ("boundary.dependency_root", &self.boundary.dependency_root),
        ];
        for (field, name) in names {
            if name.is_empty() {
                anyhow::bail!("{field} must not be empty");
            }
            if name.contains('/') || name.contains('\\') {
                anyhow::bail!("{field} must be a single file name, got {name:?}");
            }
        }
        if self.markers.descriptor_key.is_empty() {
            anyhow::bail!("markers.descriptor_key must not be empty");
        }
        if self.filter.extensions.iter().any(|ext| ext.is_empty()) {
            anyhow::bail!("filter.extensions must not contain empty entries");
        }
        Ok(())
    }
}
