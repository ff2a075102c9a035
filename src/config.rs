use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::grader::{GradingPolicy, Question};

/// The global configuration for py-diagnose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnoseConfig {
    /// Log verbosity level, used when RUST_LOG is unset
    pub log_level: String,

    /// Directory holding saved code and session statistics
    pub data_dir: PathBuf,

    /// Minimum 0-100 score counted as a pass
    pub pass_threshold: u32,

    /// Number of questions in the course, for progress reporting
    pub total_questions: u32,

    /// The exercise submissions are checked against
    pub question: Question,
}

impl Default for DiagnoseConfig {
    fn default() -> Self {
        DiagnoseConfig {
            log_level: "info".to_string(),
            data_dir: default_data_dir(),
            pass_threshold: GradingPolicy::default().pass_threshold,
            total_questions: 10,
            question: Question::default(),
        }
    }
}

impl DiagnoseConfig {
    /// Load configuration from a file
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: DiagnoseConfig = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        debug!("Loaded config with question {}", config.question.number);
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let config_str = toml::to_string(self)
            .context("Failed to serialize config to TOML")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to file: {:?}", config_path))?;

        Ok(())
    }

    /// Get the default config path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("py-diagnose").join("config.toml")
        } else {
            PathBuf::from("./config.toml")
        }
    }

    pub fn grading_policy(&self) -> GradingPolicy {
        GradingPolicy {
            pass_threshold: self.pass_threshold,
        }
    }
}

fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("py-diagnose"),
        None => PathBuf::from("./.py-diagnose"),
    }
}

/// Loads the configuration at `path`, or the default location when `None`.
///
/// A missing file at the default location is created with defaults so it can
/// be edited afterwards. An explicitly given path is never written.
pub fn init_config(path: Option<&Path>) -> Result<DiagnoseConfig> {
    if let Some(path) = path {
        return DiagnoseConfig::load(path);
    }

    let config_path = DiagnoseConfig::default_path();
    if config_path.exists() {
        let config = DiagnoseConfig::load(&config_path)?;
        info!("Loaded configuration from {:?}", config_path);
        return Ok(config);
    }

    let config = DiagnoseConfig::default();
    if let Err(e) = config.save(&config_path) {
        warn!("Failed to save default config: {}", e);
    } else {
        info!("Created default configuration at {:?}", config_path);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = DiagnoseConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, DiagnoseConfig::default());
        assert_eq!(config.pass_threshold, 85);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = DiagnoseConfig::default();
        config.pass_threshold = 70;
        config.question.number = 4;
        config.question.expected_output = vec!["one".to_string(), "two".to_string()];
        config.save(&path).unwrap();

        let loaded = DiagnoseConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.grading_policy().pass_threshold, 70);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "pass_threshold = 60\n").unwrap();

        let config = init_config(Some(&path)).unwrap();
        assert_eq!(config.pass_threshold, 60);
        assert_eq!(config.total_questions, 10);
        assert_eq!(config.question, Question::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "pass_threshold = \"high\"\n").unwrap();
        assert!(DiagnoseConfig::load(&path).is_err());
    }
}
