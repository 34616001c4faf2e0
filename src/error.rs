//! Error types for ingestion and access control.
//!
//! Nothing in here is fatal to the process: the front-end turns every
//! error into a visible message and an empty or partial view.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure at the data-source boundary. The whole fetch yields no data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("data source {url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' is missing from the dataset")]
    MissingColumn(String),
}

/// Non-fatal advisory about a single column of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngestNotice {
    /// The column is absent; its values default to zero.
    ColumnMissing { column: String },
    /// At least one value could not be coerced; the column is unusable.
    ColumnConversion { column: String, value: String },
}

impl IngestNotice {
    /// Whether this notice should be shown as an error rather than a warning.
    pub fn is_error(&self) -> bool {
        matches!(self, IngestNotice::ColumnConversion { .. })
    }
}

impl fmt::Display for IngestNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestNotice::ColumnMissing { column } => {
                write!(f, "Column '{}' is missing in the dataset.", column)
            }
            IngestNotice::ColumnConversion { column, value } => write!(
                f,
                "Unable to convert column {} to a number (offending value '{}'). Check for invalid data.",
                column, value
            ),
        }
    }
}

/// Reasons a session may not see data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Agent name not mapped to username '{username}'. Please contact admin.")]
    UnmappedAgent { username: String },

    #[error("No data found for your account (agent '{agent_name}').")]
    NoRecords { agent_name: String },

    #[error("Please log in to access your dashboard.")]
    NotAuthenticated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_messages() {
        let missing = IngestNotice::ColumnMissing {
            column: "oct24_target".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "Column 'oct24_target' is missing in the dataset."
        );
        assert!(!missing.is_error());

        let bad = IngestNotice::ColumnConversion {
            column: "oct24_rev_gen".to_string(),
            value: "n/a".to_string(),
        };
        assert!(bad.is_error());
        assert!(bad.to_string().contains("'n/a'"));
    }

    #[test]
    fn test_access_messages() {
        assert_eq!(
            AccessError::InvalidCredentials.to_string(),
            "Invalid username or password."
        );
        assert!(AccessError::UnmappedAgent {
            username: "ghost".to_string()
        }
        .to_string()
        .contains("contact admin"));
    }
}
