//! Error types for agroclim operations.
//!
//! Check failures (gaps, out-of-range values) are not errors: they are
//! recorded in the quality report. Errors here cover the cases where a
//! result cannot be produced at all: empty series, malformed input at the
//! loader boundary, configuration mistakes, and I/O.

use chrono::NaiveDate;
use thiserror::Error;

use crate::quality::ConfigValidationError;

/// Main error type for agroclim operations.
#[derive(Debug, Error)]
pub enum AgroclimError {
    /// The statistics engine was given no values to work with
    #[error("Insufficient data: dataset '{dataset}' has no numeric values")]
    InsufficientData { dataset: String },

    /// Records are not in chronological order
    #[error("Non-chronological input in '{dataset}': {current} follows {previous}")]
    NonChronological {
        dataset: String,
        previous: NaiveDate,
        current: NaiveDate,
    },

    /// A record lies outside the dataset's declared date range
    #[error("Record dated {date} in '{dataset}' lies outside the declared range {range}")]
    OutOfDeclaredRange {
        dataset: String,
        date: NaiveDate,
        range: String,
    },

    /// A delimited-text field could not be parsed
    #[error("Parse error in {context} at line {line}: {message}")]
    Parse {
        context: String,
        line: u64,
        message: String,
    },

    /// Configuration or threshold validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Thresholds failed validation
    #[error("Invalid thresholds: {0}")]
    Thresholds(#[from] ConfigValidationError),

    /// CSV reading or writing failed
    #[error("CSV operation failed: {context}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with AgroclimError
pub type Result<T> = std::result::Result<T, AgroclimError>;

impl AgroclimError {
    /// Creates an insufficient data error for the named dataset
    pub fn insufficient_data(dataset: impl Into<String>) -> Self {
        Self::InsufficientData {
            dataset: dataset.into(),
        }
    }

    /// Creates a parse error with line context
    pub fn parse(context: impl Into<String>, line: u64, message: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wraps a CSV error with context
    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }

    /// Wraps an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wraps a JSON error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Returns true if this error means a dataset had nothing to analyze.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
