use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::monitor::DEFAULT_THRESHOLD;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Monitor token usage and costs for the OpenClaw CLI")]
pub struct Config {
    /// Enable debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// External CLI to query (defaults to `openclaw`)
    #[arg(long = "command", global = true)]
    pub status_command: Option<String>,

    /// Cost threshold that triggers an alert
    #[arg(short = 't', long, global = true)]
    pub threshold: Option<f64>,

    /// Path to the append-only usage log
    #[arg(short = 'l', long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Bounded wait for the status command, in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Subcommand (defaults to a full monitoring cycle)
    #[command(subcommand)]
    pub action: Option<Action>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Action {
    /// Fetch and print the current usage snapshot
    Status {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check the current cost against the threshold
    Check,
    /// Append the current usage record to the log
    Log,
    /// Recommend a model size from current input usage
    Suggest,
    /// Run one full monitoring cycle (fetch, check, log, suggest)
    Run,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Monitor settings (from config file, overridable on the command line)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// External CLI to query for status
    #[serde(default = "default_command")]
    pub command: String,

    /// Cost ceiling that raises the alert signal, currency-unit-agnostic
    #[serde(default = "default_cost_threshold")]
    pub cost_threshold: f64,

    /// Append-only usage log path
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Bounded wait for the status command, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_command() -> String {
    "openclaw".to_string()
}

fn default_cost_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_log_file() -> PathBuf {
    PathBuf::from("token_usage.log")
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            command: default_command(),
            cost_threshold: default_cost_threshold(),
            log_file: default_log_file(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file: {:?}", p))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", p));
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("clawmon/config.toml")),
            dirs::home_dir().map(|p| p.join(".clawmon.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", path));
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(command) = &cli.status_command {
            self.command = command.clone();
        }
        if let Some(threshold) = cli.threshold {
            self.cost_threshold = threshold;
        }
        if let Some(log_file) = &cli.log_file {
            self.log_file = log_file.clone();
        }
        if let Some(timeout) = cli.timeout {
            self.timeout_secs = timeout;
        }
    }

    /// Validate and normalize settings values
    ///
    /// Ensures the timeout has a minimum value and the threshold is
    /// non-negative.
    pub fn validate(&mut self) {
        const MIN_TIMEOUT_SECS: u64 = 1;

        if self.timeout_secs < MIN_TIMEOUT_SECS {
            self.timeout_secs = MIN_TIMEOUT_SECS;
        }
        if !self.cost_threshold.is_finite() || self.cost_threshold < 0.0 {
            self.cost_threshold = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.command, "openclaw");
        assert_eq!(settings.cost_threshold, 30.0);
        assert_eq!(settings.log_file, PathBuf::from("token_usage.log"));
        assert_eq!(settings.timeout_secs, 30);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            command = "otherclaw"
            cost_threshold = 12.5
            log_file = "/var/log/usage.log"
        "#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.command, "otherclaw");
        assert_eq!(settings.cost_threshold, 12.5);
        assert_eq!(settings.log_file, PathBuf::from("/var/log/usage.log"));
        // Unspecified fields fall back to defaults
        assert_eq!(settings.timeout_secs, 30);
    }

    #[test]
    fn test_merge_cli_takes_precedence() {
        let mut settings = Settings::default();
        let cli = Config {
            debug: false,
            config: None,
            status_command: Some("altclaw".to_string()),
            threshold: Some(5.0),
            log_file: None,
            timeout: Some(10),
            action: None,
        };
        settings.merge_cli(&cli);
        assert_eq!(settings.command, "altclaw");
        assert_eq!(settings.cost_threshold, 5.0);
        assert_eq!(settings.log_file, PathBuf::from("token_usage.log"));
        assert_eq!(settings.timeout_secs, 10);
    }

    #[test]
    fn test_validate_clamps_degenerate_values() {
        let mut settings = Settings {
            timeout_secs: 0,
            cost_threshold: -3.0,
            ..Settings::default()
        };
        settings.validate();
        assert_eq!(settings.timeout_secs, 1);
        assert_eq!(settings.cost_threshold, 0.0);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let settings = Settings::load(Some(&missing)).unwrap();
        assert_eq!(settings.command, "openclaw");
    }

    #[test]
    fn test_load_custom_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "cost_threshold = 99.0\n").unwrap();
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.cost_threshold, 99.0);
    }
}
