//! Heuristics that flag a package directory as pre-built.
//!
//! A pre-built package ships compiled output, so its own transform config
//! (if any) must not be applied to it. None of these signals is reliable on
//! its own; they are evaluated in a fixed order and the first match wins.
//! Misclassification is possible in both directions.

use crate::config::PrebuiltConfig;
use crate::descriptor::{PackageDescriptor, is_truthy};
use serde::{Deserialize, Serialize};

/// A named pre-built check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Heuristic {
    /// npm 3/4 stamped `_npmVersion` into installed manifests.
    LegacyNpmVersion,
    /// npm 5+ records the tarball URL in `_resolved`.
    RegistryResolved,
    /// A `prepublish` script usually compiles before publishing. Catches yarn
    /// installs, which carry neither stamp above.
    PrepublishHook,
    /// `main` pointing into `dist/` is conventionally build output.
    DistMainEntry,
}

impl Heuristic {
    /// Default evaluation order.
    pub const ALL: [Heuristic; 4] = [
        Heuristic::LegacyNpmVersion,
        Heuristic::RegistryResolved,
        Heuristic::PrepublishHook,
        Heuristic::DistMainEntry,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Heuristic::LegacyNpmVersion => "legacy-npm-version",
            Heuristic::RegistryResolved => "registry-resolved",
            Heuristic::PrepublishHook => "prepublish-hook",
            Heuristic::DistMainEntry => "dist-main-entry",
        }
    }

    pub fn matches(self, descriptor: &PackageDescriptor, config: &PrebuiltConfig) -> bool {
        match self {
            Heuristic::LegacyNpmVersion => descriptor.npm_version().is_some_and(is_truthy),
            Heuristic::RegistryResolved => descriptor
                .resolved()
                .is_some_and(|url| url.contains(config.registry_host.as_str())),
            Heuristic::PrepublishHook => descriptor.has_script("prepublish"),
            Heuristic::DistMainEntry => descriptor
                .main()
                .is_some_and(|main| main.starts_with(config.dist_prefix.as_str())),
        }
    }
}

impl std::fmt::Display for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// First configured heuristic that flags `descriptor` as pre-built.
pub fn detect_prebuilt(descriptor: &PackageDescriptor, config: &PrebuiltConfig) -> Option<Heuristic> {
    config
        .heuristics
        .iter()
        .copied()
        .find(|h| h.matches(descriptor, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(json: &str) -> PackageDescriptor {
        PackageDescriptor::from_json(json).unwrap()
    }

    #[test]
    fn test_legacy_npm_version() {
        let config = PrebuiltConfig::default();
        assert!(Heuristic::LegacyNpmVersion.matches(&descriptor(r#"{"_npmVersion": "3.10.8"}"#), &config));
        assert!(!Heuristic::LegacyNpmVersion.matches(&descriptor(r#"{"_npmVersion": ""}"#), &config));
        assert!(!Heuristic::LegacyNpmVersion.matches(&descriptor("{}"), &config));
    }

    #[test]
    fn test_registry_resolved() {
        let config = PrebuiltConfig::default();
        let from_registry =
            descriptor(r#"{"_resolved": "https://registry.npmjs.org/react-chartist/-/react-chartist-0.13.1.tgz"}"#);
        let from_git = descriptor(r#"{"_resolved": "git+https://github.com/acme/widget.git#abc123"}"#);
        assert!(Heuristic::RegistryResolved.matches(&from_registry, &config));
        assert!(!Heuristic::RegistryResolved.matches(&from_git, &config));
    }

    #[test]
    fn test_registry_host_is_configurable() {
        let config = PrebuiltConfig {
            registry_host: "npm.internal.example".to_string(),
            ..PrebuiltConfig::default()
        };
        let d = descriptor(r#"{"_resolved": "https://npm.internal.example/widget-1.0.0.tgz"}"#);
        assert!(Heuristic::RegistryResolved.matches(&d, &config));
    }

    #[test]
    fn test_prepublish_hook() {
        let config = PrebuiltConfig::default();
        assert!(Heuristic::PrepublishHook.matches(
            &descriptor(r#"{"scripts": {"prepublish": "npm run build"}}"#),
            &config
        ));
        assert!(!Heuristic::PrepublishHook.matches(
            &descriptor(r#"{"scripts": {"build": "tsc"}}"#),
            &config
        ));
    }

    #[test]
    fn test_dist_main_entry() {
        let config = PrebuiltConfig::default();
        assert!(Heuristic::DistMainEntry.matches(&descriptor(r#"{"main": "dist/index.js"}"#), &config));
        assert!(!Heuristic::DistMainEntry.matches(&descriptor(r#"{"main": "./dist/index.js"}"#), &config));
        assert!(!Heuristic::DistMainEntry.matches(&descriptor(r#"{"main": "lib/distance.js"}"#), &config));
    }

    #[test]
    fn test_detect_reports_first_match_in_order() {
        let d = descriptor(r#"{"_npmVersion": "3.0.0", "main": "dist/index.js"}"#);
        let config = PrebuiltConfig::default();
        assert_eq!(detect_prebuilt(&d, &config), Some(Heuristic::LegacyNpmVersion));

        let reordered = PrebuiltConfig {
            heuristics: vec![Heuristic::DistMainEntry, Heuristic::LegacyNpmVersion],
            ..PrebuiltConfig::default()
        };
        assert_eq!(detect_prebuilt(&d, &reordered), Some(Heuristic::DistMainEntry));
    }

    #[test]
    fn test_detect_with_no_heuristics_enabled() {
        let d = descriptor(r#"{"_npmVersion": "3.0.0"}"#);
        let config = PrebuiltConfig {
            heuristics: Vec::new(),
            ..PrebuiltConfig::default()
        };
        assert_eq!(detect_prebuilt(&d, &config), None);
    }
}
