//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Salesdash - sales performance dashboard
///
/// Logs a user in, fetches the sales spreadsheet as CSV and shows
/// revenue-vs-target ratings: every agent for administrators, a chart and
/// summary of their own figures for agents.
///
/// Examples:
///   salesdash -u admin -p admin123 --export performance_summary.csv
///   salesdash -u thomas -p thomas123
///   salesdash -u admin -p admin123 --local ./sales.csv --format json
///   salesdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Username to log in with
    #[arg(
        short,
        long,
        env = "SALESDASH_USER",
        required_unless_present = "init_config"
    )]
    pub username: Option<String>,

    /// Password to log in with
    #[arg(
        short,
        long,
        env = "SALESDASH_PASSWORD",
        hide_env_values = true,
        required_unless_present = "init_config"
    )]
    pub password: Option<String>,

    /// CSV export URL of the sales spreadsheet
    ///
    /// Overrides [source] url from the configuration file.
    #[arg(long, value_name = "URL", env = "SALESDASH_SOURCE")]
    pub source: Option<String>,

    /// Read the sales CSV from a local file instead of the network
    #[arg(long, value_name = "FILE")]
    pub local: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .salesdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the rendered view to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Export the admin performance summary as CSV
    ///
    /// Without a value the file is named performance_summary.csv
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = crate::report::EXPORT_FILE_NAME
    )]
    pub export: Option<PathBuf>,

    /// Request timeout in seconds for the data fetch
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .salesdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the rendered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.username.as_deref().unwrap_or("").is_empty() {
            return Err("A username is required".to_string());
        }

        if self.password.is_none() {
            return Err("A password is required".to_string());
        }

        if let Some(ref url) = self.source {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Source URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref local_path) = self.local {
            if !local_path.exists() {
                return Err(format!(
                    "Local file does not exist: {}",
                    local_path.display()
                ));
            }
            if !local_path.is_file() {
                return Err(format!(
                    "Local path is not a file: {}",
                    local_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            username: Some("admin".to_string()),
            password: Some("admin123".to_string()),
            source: Some("https://example.com/sales.csv".to_string()),
            local: None,
            config: None,
            output: None,
            format: OutputFormat::Markdown,
            export: None,
            timeout: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_args() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.source = Some("ftp://example.com/sales.csv".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_requires_credentials() {
        let mut args = make_args();
        args.username = None;
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.password = None;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_local_file() {
        let mut args = make_args();
        args.local = Some(PathBuf::from("/no/such/sales.csv"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.username = None;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_flags() {
        let args = Args::try_parse_from([
            "salesdash",
            "-u",
            "thomas",
            "-p",
            "thomas123",
            "--format",
            "json",
            "--export",
            "out.csv",
        ])
        .unwrap();
        assert_eq!(args.username.as_deref(), Some("thomas"));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.export, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_export_without_value_uses_default_name() {
        let args =
            Args::try_parse_from(["salesdash", "-u", "admin", "-p", "x", "--export"]).unwrap();
        assert_eq!(args.export, Some(PathBuf::from("performance_summary.csv")));
    }
}
