use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the lead store and contact workflow.
#[derive(Error, Debug)]
pub enum LeadError {
    /// A required field was missing or a value was out of range.
    /// Raised before anything is written.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Property not found: {0}")]
    PropertyNotFound(Uuid),

    #[error("Contact log not found: {0}")]
    ContactLogNotFound(Uuid),

    /// SQLite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The data source could not serve the request.
    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}

impl LeadError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for storage failures the caller may retry.
    pub fn is_data_source(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Io(_) | Self::Unavailable(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LeadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_classification() {
        assert!(LeadError::Unavailable("offline".into()).is_data_source());
        assert!(LeadError::Io(std::io::Error::other("disk")).is_data_source());
        assert!(!LeadError::validation("outcome is required").is_data_source());
        assert!(!LeadError::PropertyNotFound(Uuid::nil()).is_data_source());
    }

    #[test]
    fn test_validation_message() {
        let err = LeadError::validation("outcome is required");
        assert_eq!(err.to_string(), "Invalid input: outcome is required");
    }
}
