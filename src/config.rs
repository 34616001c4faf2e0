//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.salesdash.toml` files. The configuration is read once at start and
//! never changes afterwards.

use crate::ingest::DataSource;
use crate::models::{Period, Role};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".salesdash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Accounts, keyed by username.
    #[serde(default)]
    pub users: BTreeMap<String, UserEntry>,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where and how to fetch the sales dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// CSV export URL of the sales spreadsheet.
    #[serde(default)]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Reporting periods, in display order.
    #[serde(default = "default_periods")]
    pub periods: Vec<Period>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_seconds: default_timeout(),
            periods: default_periods(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_periods() -> Vec<Period> {
    vec![
        Period::new("sept24", "September"),
        Period::new("oct24", "October"),
        Period::new("nov24", "November"),
    ]
}

/// One account in the `[users]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub password: String,
    pub role: Role,
    /// Agent name in the dataset this user may see.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.source {
            self.source.url = url.clone();
        }

        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Pick the data source: a local file from the CLI wins over the URL.
    pub fn data_source(&self, args: &crate::cli::Args) -> Result<DataSource> {
        if let Some(ref local) = args.local {
            return Ok(DataSource::Local(local.clone()));
        }

        if self.source.url.is_empty() {
            bail!(
                "No data source configured. Set [source] url in {} or pass --source/--local",
                CONFIG_FILE
            );
        }

        Ok(DataSource::Remote {
            url: self.source.url.clone(),
            timeout_seconds: self.source.timeout_seconds,
        })
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let mut config = Config::default();
        config.source.url =
            "https://docs.google.com/spreadsheets/d/<sheet-id>/gviz/tq?tqx=out:csv&gid=<gid>"
                .to_string();
        config.users.insert(
            "admin".to_string(),
            UserEntry {
                password: "change-me".to_string(),
                role: Role::Admin,
                agent: None,
            },
        );
        config.users.insert(
            "thomas".to_string(),
            UserEntry {
                password: "change-me".to_string(),
                role: Role::Standard,
                agent: Some("Thomas".to_string()),
            },
        );
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.source.url.is_empty());
        assert_eq!(config.source.timeout_seconds, 30);
        assert_eq!(config.source.periods.len(), 3);
        assert_eq!(config.source.periods[0].key, "sept24");
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[source]
url = "https://example.com/sales.csv"

[[source.periods]]
key = "dec24"
label = "December"

[users.admin]
password = "admin123"
role = "admin"

[users.max]
password = "max123"
role = "user"
agent = "Max"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.source.url, "https://example.com/sales.csv");
        assert_eq!(config.source.timeout_seconds, 30);
        assert_eq!(config.source.periods, vec![Period::new("dec24", "December")]);
        assert_eq!(config.users["admin"].role, Role::Admin);
        assert_eq!(config.users["max"].role, Role::Standard);
        assert_eq!(config.users["max"].agent.as_deref(), Some("Max"));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[[source.periods]]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.users.len(), 2);
        assert_eq!(reparsed.users["thomas"].agent.as_deref(), Some("Thomas"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nurl = \"https://example.com/x.csv\"\ntimeout_seconds = 5").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.source.timeout_seconds, 5);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source\nurl = ").unwrap();
        assert!(Config::load(file.path()).is_err());
    }
}
