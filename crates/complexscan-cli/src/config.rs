//! Configuration loading for the complexscan CLI
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file
//! (`--config`, or `complexscan.toml` in the working directory), environment
//! variables (a `.env` file is loaded into the environment at startup), then
//! the `--base-dir` and `--threads` flags.
//!
//! ```toml
//! base_dir = "/data/complex-i"
//!
//! [tools]
//! threads = 16
//! cooldown_secs = 120
//! hmmsearch_bin = "/opt/hmmer/bin/hmmsearch"
//! ```

use crate::error::{CliError, Result};
use complexscan_pipeline::{PipelineConfig, PipelinePaths, ToolSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// CLI Configuration Constants
// ============================================================================

/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "complexscan.toml";

pub const ENV_BASE_DIR: &str = "COMPLEXSCAN_BASE_DIR";
pub const ENV_THREADS: &str = "COMPLEXSCAN_THREADS";
pub const ENV_COOLDOWN_SECS: &str = "COMPLEXSCAN_COOLDOWN_SECS";

/// Contents of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Project root; the working directory when unset
    pub base_dir: Option<PathBuf>,
    pub tools: ToolSettings,
}

impl FileConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read an explicit file, or the default file when it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if !path.is_file() => {
                return Err(CliError::file_not_found(path.display().to_string()));
            },
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            },
        };

        debug!(path = %path.display(), "Loading configuration file");
        Self::from_toml(&fs::read_to_string(&path)?)
    }

    /// Apply `COMPLEXSCAN_*` variables looked up through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(base) = lookup(ENV_BASE_DIR) {
            self.base_dir = Some(PathBuf::from(base));
        }
        if let Some(threads) = lookup(ENV_THREADS) {
            self.tools.threads = parse_env(ENV_THREADS, &threads)?;
        }
        if let Some(secs) = lookup(ENV_COOLDOWN_SECS) {
            self.tools.cooldown_secs = parse_env(ENV_COOLDOWN_SECS, &secs)?;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::config(format!("{} has invalid value '{}'", name, value)))
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_dir: Option<PathBuf>,
    pub threads: Option<usize>,
}

/// Combine a file configuration, environment and flags into a validated
/// pipeline configuration
pub fn resolve(
    mut file: FileConfig,
    lookup: impl Fn(&str) -> Option<String>,
    overrides: &Overrides,
) -> Result<PipelineConfig> {
    file.apply_env(lookup)?;

    if let Some(base) = &overrides.base_dir {
        file.base_dir = Some(base.clone());
    }
    if let Some(threads) = overrides.threads {
        file.tools.threads = threads;
    }

    let base_dir = file.base_dir.unwrap_or_else(|| PathBuf::from("."));
    let config = PipelineConfig {
        paths: PipelinePaths::from_base_dir(base_dir),
        tools: file.tools,
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from every source
pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<PipelineConfig> {
    let file = FileConfig::load(config_file)?;
    resolve(file, |name| std::env::var(name).ok(), overrides)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = resolve(FileConfig::default(), env(&[]), &Overrides::default()).unwrap();
        assert_eq!(config.tools, ToolSettings::default());
        assert_eq!(config.paths, PipelinePaths::from_base_dir("."));
    }

    #[test]
    fn test_partial_tools_table() {
        let file = FileConfig::from_toml(
            r#"
            base_dir = "/srv/scan"

            [tools]
            threads = 16
            mafft_bin = "/opt/mafft/bin/mafft"
            "#,
        )
        .unwrap();
        assert_eq!(file.base_dir, Some(PathBuf::from("/srv/scan")));
        assert_eq!(file.tools.threads, 16);
        assert_eq!(file.tools.mafft_bin, "/opt/mafft/bin/mafft");
        assert_eq!(file.tools.cooldown_secs, ToolSettings::default().cooldown_secs);
    }

    #[test]
    fn test_precedence_file_env_flags() {
        let file = FileConfig::from_toml("base_dir = \"/from/file\"\n[tools]\nthreads = 2\n").unwrap();

        let from_env = resolve(
            file.clone(),
            env(&[(ENV_BASE_DIR, "/from/env"), (ENV_COOLDOWN_SECS, "5")]),
            &Overrides::default(),
        )
        .unwrap();
        assert_eq!(from_env.paths, PipelinePaths::from_base_dir("/from/env"));
        assert_eq!(from_env.tools.threads, 2);
        assert_eq!(from_env.tools.cooldown_secs, 5);

        let from_flags = resolve(
            file,
            env(&[(ENV_BASE_DIR, "/from/env"), (ENV_THREADS, "3")]),
            &Overrides {
                base_dir: Some(PathBuf::from("/from/flag")),
                threads: Some(12),
            },
        )
        .unwrap();
        assert_eq!(from_flags.paths, PipelinePaths::from_base_dir("/from/flag"));
        assert_eq!(from_flags.tools.threads, 12);
    }

    #[test]
    fn test_invalid_env_value() {
        let err = resolve(
            FileConfig::default(),
            env(&[(ENV_THREADS, "many")]),
            &Overrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let file = FileConfig::from_toml("[tools]\ncluster_min_seq_id = 1.5\n").unwrap();
        let err = resolve(file, env(&[]), &Overrides::default()).unwrap_err();
        assert!(matches!(err, CliError::Scan(_)));

        let zero_threads = Overrides {
            threads: Some(0),
            ..Default::default()
        };
        assert!(resolve(FileConfig::default(), env(&[]), &zero_threads).is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let err = FileConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_unknown_toml_is_parse_error() {
        let err = FileConfig::from_toml("[tools]\nthreads = \"eight\"\n").unwrap_err();
        assert!(matches!(err, CliError::TomlParse(_)));
    }
}
