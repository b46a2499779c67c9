//! TOML configuration for the `harvest` binary.
//!
//! ```toml
//! [input]
//! root = "./attachments"
//! include_globs = ["**/*.json"]
//! exclude_globs = ["archive/**"]
//!
//! [output]
//! dir = "./out"
//! pretty = true
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every section is optional. `harvest map` and `harvest sources` run
//! without a config file; `harvest sync` needs `input.root` to exist.

use anyhow::{bail, Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where source attachments are read from.
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_input_root")]
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            root: default_input_root(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_input_root() -> PathBuf {
    PathBuf::from("./attachments")
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*.json".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            pretty: default_pretty(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./out")
}
fn default_pretty() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"mission_harvest=debug"`.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Defaults for every section, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.input.include_globs.is_empty() {
        bail!("input.include_globs must not be empty");
    }
    for pattern in config
        .input
        .include_globs
        .iter()
        .chain(&config.input.exclude_globs)
    {
        Glob::new(pattern).with_context(|| format!("Invalid glob pattern: '{}'", pattern))?;
    }

    if config.output.dir.as_os_str().is_empty() {
        bail!("output.dir must not be empty");
    }

    EnvFilter::try_new(&config.logging.level)
        .with_context(|| format!("Invalid logging.level: '{}'", config.logging.level))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(tmp: &TempDir, body: &str) -> PathBuf {
        let path = tmp.path().join("harvest.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&write_config(&tmp, "")).unwrap();
        assert_eq!(config.input.root, PathBuf::from("./attachments"));
        assert_eq!(config.input.include_globs, vec!["**/*.json".to_string()]);
        assert_eq!(config.output.dir, PathBuf::from("./out"));
        assert!(config.output.pretty);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_sections_override_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"
[input]
root = "/data/boond"
exclude_globs = ["archive/**"]

[output]
dir = "/data/out"
pretty = false

[logging]
level = "mission_harvest=debug"
"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.input.root, PathBuf::from("/data/boond"));
        assert_eq!(config.input.exclude_globs, vec!["archive/**".to_string()]);
        assert!(!config.output.pretty);
        assert_eq!(config.logging.level, "mission_harvest=debug");
    }

    #[test]
    fn test_validation_errors() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(&write_config(&tmp, "[input]\ninclude_globs = []\n")).unwrap_err();
        assert!(err.to_string().contains("include_globs"));

        let err = load_config(&write_config(&tmp, "[input]\nexclude_globs = [\"a/[\"]\n")).unwrap_err();
        assert!(err.to_string().contains("Invalid glob"));

        assert!(load_config(&write_config(&tmp, "[input\n")).is_err());
        assert!(load_config(&tmp.path().join("missing.toml")).is_err());
    }
}
