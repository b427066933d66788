use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::script::{ImportBinary, ImportFormat};
use crate::traits::FileSystem;

/// Optional YAML configuration shared by all commands
///
/// ```yaml
/// exclude:
///   - eks-cluster-sg-main
/// format: sh
/// binary: tofu
/// skip_conflicts: false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Security group names to leave out of every output
    pub exclude: Vec<String>,

    /// Import batch format
    pub format: Option<ImportFormat>,

    /// CLI named in import commands
    pub binary: Option<ImportBinary>,

    /// Drop conflicting records instead of failing the run
    pub skip_conflicts: bool,
}

impl ImportConfig {
    /// Parse configuration from YAML contents
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content).context("Failed to parse configuration")
    }

    /// Load configuration from a file
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs.read_to_string(path)?;

        Self::parse(&content).with_context(|| format!("Invalid configuration file: {:?}", path))
    }

    /// Load the file if one was given, otherwise use defaults
    pub fn load_optional(fs: &dyn FileSystem, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(fs, path),
            None => Ok(Self::default()),
        }
    }
}

/// Effective settings after merging CLI flags over the config file
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub exclude: Vec<String>,
    pub format: ImportFormat,
    pub binary: ImportBinary,
    pub skip_conflicts: bool,
}

impl Settings {
    /// Flags win over the file; exclusion lists are combined
    pub fn merge(
        config: ImportConfig,
        exclude: &[String],
        format: Option<ImportFormat>,
        binary: Option<ImportBinary>,
        skip_conflicts: bool,
    ) -> Self {
        let mut combined = config.exclude;
        combined.extend(exclude.iter().cloned());

        Self {
            exclude: combined,
            format: format.or(config.format).unwrap_or_default(),
            binary: binary.or(config.binary).unwrap_or_default(),
            skip_conflicts: skip_conflicts || config.skip_conflicts,
        }
    }
}
