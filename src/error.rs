//! Error taxonomy shared by all ingestion abilities.

use thiserror::Error;

/// Result alias used across the ability surface
pub type AbilityResult<T> = Result<T, AbilityError>;

/// Typed failures an ability invocation can surface to the dispatcher.
///
/// Every variant carries enough context (source identifier plus underlying
/// cause) for the calling agent to decide whether to retry with different
/// parameters, ask a human, or abandon the step. This crate never retries
/// on its own.
#[derive(Debug, Error)]
pub enum AbilityError {
    /// Request failed validation before any I/O was attempted
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The file path does not exist or is not readable
    #[error("source not found: {path}")]
    SourceNotFound { path: String },

    /// The file exists but is not a recognized workbook format
    #[error("unsupported format for {path}: {detail}")]
    UnsupportedFormat { path: String, detail: String },

    /// The format was recognized but the data could not be decoded
    #[error("parse error in {source_id}: {detail}")]
    ParseError { source_id: String, detail: String },

    /// A database session could not be established
    #[error("connection error for {target}: {detail}")]
    ConnectionError { target: String, detail: String },

    /// The database rejected or failed the query
    #[error("query error: {detail}")]
    QueryError { detail: String },
}

impl AbilityError {
    /// Short machine-readable tag for the variant, useful in logs and
    /// dispatcher-side routing.
    pub fn kind(&self) -> &'static str {
        match self {
            AbilityError::InvalidArgument(_) => "invalid_argument",
            AbilityError::SourceNotFound { .. } => "source_not_found",
            AbilityError::UnsupportedFormat { .. } => "unsupported_format",
            AbilityError::ParseError { .. } => "parse_error",
            AbilityError::ConnectionError { .. } => "connection_error",
            AbilityError::QueryError { .. } => "query_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_tags() {
        let err = AbilityError::SourceNotFound {
            path: "/tmp/missing.xlsx".to_string(),
        };
        assert_eq!(err.kind(), "source_not_found");
        assert!(err.to_string().contains("/tmp/missing.xlsx"));
    }

    #[test]
    fn test_connection_error_never_needs_password() {
        // ConnectionError carries a pre-redacted target string, so the
        // display path cannot leak credentials.
        let err = AbilityError::ConnectionError {
            target: "postgresql://postgres@localhost:5432/postgres".to_string(),
            detail: "connection refused".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("localhost:5432"));
        assert!(!rendered.contains(":postgres@"));
    }
}
