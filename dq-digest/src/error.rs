//! Error types for the data-quality digest.
//!
//! Every stage of the pipeline returns [`Result`]. Errors carry an
//! [`ErrorKind`] so the pipeline can decide what to skip without matching on
//! concrete variants.

use std::fmt;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The coarse category of a [`DigestError`].
///
/// The pipeline branches on this value: loader kinds skip validation for one
/// dataset, `SuiteError` degrades that dataset to zero results, `RenderError`
/// skips notification and `MailError` is terminal for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The database could not be reached or refused the session.
    ConnectionFailed,
    /// The dataset query failed or returned data that could not be decoded.
    QueryFailed,
    /// Rule-set creation, batch binding or rule evaluation failed.
    SuiteError,
    /// The report could not be rendered or written.
    RenderError,
    /// The notification could not be assembled or delivered.
    MailError,
    /// Required configuration is missing or malformed.
    Configuration,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Stable lowercase label used in structured log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConnectionFailed => "connection_failed",
            ErrorKind::QueryFailed => "query_failed",
            ErrorKind::SuiteError => "suite_error",
            ErrorKind::RenderError => "render_error",
            ErrorKind::MailError => "mail_error",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for the digest pipeline.
#[derive(Error, Debug)]
pub enum DigestError {
    /// Error opening a database session.
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Error running or decoding a dataset query.
    #[error("Query failed for '{dataset}': {message}")]
    QueryFailed {
        /// Name of the dataset being loaded
        dataset: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Error from the rule engine (suite store, batch binding, evaluation).
    #[error("Suite '{suite}' failed: {message}")]
    SuiteError {
        /// Name of the rule set involved
        suite: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Error rendering or writing the report document.
    #[error("Report rendering failed: {message}")]
    RenderError {
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Error building or delivering the notification.
    #[error("Mail delivery failed: {message}")]
    MailError {
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error when a rule names a column the dataset does not have.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Security-related error.
    #[error("Security error: {0}")]
    SecurityError(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, DigestError>`.
pub type Result<T> = std::result::Result<T, DigestError>;

impl DigestError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DigestError::ConnectionFailed { .. } => ErrorKind::ConnectionFailed,
            DigestError::QueryFailed { .. } => ErrorKind::QueryFailed,
            DigestError::SuiteError { .. }
            | DigestError::DataFusion(_)
            | DigestError::Arrow(_)
            | DigestError::ColumnNotFound { .. } => ErrorKind::SuiteError,
            DigestError::RenderError { .. } => ErrorKind::RenderError,
            DigestError::MailError { .. } => ErrorKind::MailError,
            DigestError::Configuration(_) => ErrorKind::Configuration,
            DigestError::Io(_)
            | DigestError::Serialization(_)
            | DigestError::SecurityError(_)
            | DigestError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Creates a connection error with a source error.
    pub fn connection_failed(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a query error without an underlying source.
    pub fn query_failed(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueryFailed {
            dataset: dataset.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a query error with a source error.
    pub fn query_failed_with_source(
        dataset: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::QueryFailed {
            dataset: dataset.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a rule-engine error.
    pub fn suite(suite: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SuiteError {
            suite: suite.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any other error as a rule-engine error for `suite`.
    ///
    /// Errors that already are `SuiteError`s are returned unchanged.
    pub fn into_suite_error(self, suite: &str) -> Self {
        match self {
            err @ DigestError::SuiteError { .. } => err,
            other => Self::SuiteError {
                suite: suite.to_string(),
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Creates a render error with a source error.
    pub fn render(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::RenderError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a mail error, optionally with a source error.
    pub fn mail(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::MailError {
            message: message.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_query_failed_display() {
        let err = DigestError::query_failed("sales", "relation does not exist");
        assert_eq!(
            err.to_string(),
            "Query failed for 'sales': relation does not exist"
        );
        assert_eq!(err.kind(), ErrorKind::QueryFailed);
    }

    #[test]
    fn test_connection_error_keeps_source() {
        let source = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = DigestError::connection_failed("could not reach database", source);
        assert!(err.source().is_some());
        assert_eq!(err.kind(), ErrorKind::ConnectionFailed);
    }

    #[test]
    fn test_engine_errors_classify_as_suite_errors() {
        let err = DigestError::ColumnNotFound {
            column: "Total_Cost".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::SuiteError);

        let wrapped = DigestError::Internal("boom".to_string()).into_suite_error("sales_suite");
        assert_eq!(wrapped.kind(), ErrorKind::SuiteError);
        assert!(wrapped.to_string().contains("sales_suite"));
    }

    #[test]
    fn test_into_suite_error_is_idempotent() {
        let err = DigestError::suite("customer_suite", "bad rule");
        let again = err.into_suite_error("other");
        assert_eq!(again.to_string(), "Suite 'customer_suite' failed: bad rule");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ErrorKind::RenderError.to_string(), "render_error");
        assert_eq!(ErrorKind::MailError.as_str(), "mail_error");
    }
}
