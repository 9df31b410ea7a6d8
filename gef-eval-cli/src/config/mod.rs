//! Configuration loading

use crate::error::CliError;
use anyhow::Result;
use gef_eval_core::EvalConfig;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "gef-eval.toml";

/// Load the configuration and apply environment overrides
///
/// An explicit path must exist. Without one, `gef-eval.toml` in the working
/// directory is used if present, else the built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<EvalConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(CliError::FileNotFound(path.display().to_string()).into());
            }
            Some(path.to_path_buf())
        }
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };

    let config = match path {
        Some(path) => {
            log::debug!("reading configuration from {}", path.display());
            EvalConfig::from_file(&path)
                .map_err(|e| CliError::ConfigError(e.to_string()))?
        }
        None => EvalConfig::default(),
    };
    Ok(config.with_env_overrides())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_missing_file_fails() {
        let err = load_config(Some(Path::new("/nonexistent/gef-eval.toml"))).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_explicit_file_is_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[iterations]\ntail_bucket = 5\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.iterations.tail_bucket, 5);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[iterations]\ntail_bucket = \"eight\"\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
