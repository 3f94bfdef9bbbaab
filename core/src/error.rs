//! Error types for submission handling

use thiserror::Error;

/// Main error type for submission operations
///
/// Cell-level validation problems are not errors in this sense: they are
/// collected on the validation outcome so that every problem in a
/// submission can be reported at once.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// A table violates the rectangular-table invariant
    #[error("Invalid table: {message}")]
    InvalidTable {
        /// Error message
        message: String,
        /// Zero-based row index, if the problem is tied to one row
        row: Option<usize>,
    },

    /// A grid violates the grid invariants
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// A field schema is malformed
    #[error("Invalid schema '{schema}': {message}")]
    InvalidSchema {
        /// Schema name
        schema: String,
        /// Error message
        message: String,
    },

    /// A submission type that no schema is registered for
    #[error("Unrecognized submission type: {0}")]
    UnknownSchema(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Spreadsheet rendering or reading errors
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// Input that could not be parsed
    #[error("Failed to parse input{}: {message}", location_suffix(.location))]
    Parse {
        /// Error message
        message: String,
        /// Location in the input if available
        location: Option<String>,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Errors raised by a submission store
    #[error("Store error: {0}")]
    Store(String),
}

fn location_suffix(location: &Option<String>) -> String {
    location
        .as_deref()
        .map(|location| format!(" {location}"))
        .unwrap_or_default()
}

/// Result type alias for submission operations
pub type Result<T> = std::result::Result<T, SubmissionError>;

impl SubmissionError {
    /// Create a new invalid table error
    #[must_use]
    pub fn invalid_table(message: impl Into<String>) -> Self {
        Self::InvalidTable {
            message: message.into(),
            row: None,
        }
    }

    /// Create a new invalid table error for a specific row
    #[must_use]
    pub fn invalid_table_row(row: usize, message: impl Into<String>) -> Self {
        Self::InvalidTable {
            message: message.into(),
            row: Some(row),
        }
    }

    /// Create a new invalid grid error
    #[must_use]
    pub fn invalid_grid(message: impl Into<String>) -> Self {
        Self::InvalidGrid(message.into())
    }

    /// Create a new invalid schema error
    #[must_use]
    pub fn invalid_schema(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            schema: schema.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new workbook error
    #[must_use]
    pub fn workbook(message: impl Into<String>) -> Self {
        Self::Workbook(message.into())
    }

    /// Create a new parse error
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            location: None,
        }
    }

    /// Create a new parse error with location
    #[must_use]
    pub fn parse_at(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            location: Some(location.into()),
        }
    }

    /// Create a new store error
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

impl From<serde_json::Error> for SubmissionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for SubmissionError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<csv::Error> for SubmissionError {
    fn from(err: csv::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
