use thiserror::Error;
use crate::models::TodoId;

/// Result type alias for todo operations
pub type Result<T> = std::result::Result<T, TodoError>;

/// Error taxonomy for todo operations.
///
/// Every variant is rendered to the user at the operation boundary; only
/// `Configuration` is allowed to end the process, and only during startup.
/// A missing record is not an error at all, see
/// [`ItemOutcome::NotFound`](crate::repository::ItemOutcome::NotFound).
///
/// # Examples
///
/// ```rust
/// use todo_core::error::TodoError;
///
/// let conflict = TodoError::Conflict(5);
/// assert!(conflict.is_conflict());
/// assert_eq!(conflict.to_string(), "A task with id 5 already exists");
///
/// let closed = TodoError::connection_closed();
/// assert!(closed.is_connection());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// Store unreachable, connection lost or closed, or a round-trip timed out
    #[error("Connection error: {0}")]
    Connection(String),

    /// Duplicate id on create
    #[error("A task with id {0} already exists")]
    Conflict(TodoId),

    /// A row could not be mapped to a record
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Malformed command input
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid or incomplete settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Any other statement failure
    #[error("Database error: {0}")]
    Database(String),
}

/// Failure to decode a single result row.
///
/// Carried per row in list results so one bad row never hides the others.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: {reason}")]
pub struct DecodeError {
    /// One-based position of the row in the result set
    pub row: usize,
    pub reason: String,
}

impl DecodeError {
    pub fn new(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            reason: reason.into(),
        }
    }
}

impl TodoError {
    /// Error returned by every operation issued after the connection was released
    pub fn connection_closed() -> Self {
        Self::Connection("connection closed".to_string())
    }

    /// Error returned when a store round-trip exceeds its time budget
    pub fn timed_out(operation: &str, timeout: std::time::Duration) -> Self {
        Self::Connection(format!(
            "{operation} timed out after {}s",
            timeout.as_secs_f64()
        ))
    }

    /// Create a parse error for a flag that needs a value
    pub fn missing_value(flag: &str) -> Self {
        Self::Parse(format!("--{flag} requires a comma-separated list of ids"))
    }

    /// Create a parse error for a value that is not an integer id
    pub fn invalid_id(value: &str) -> Self {
        Self::Parse(format!("'{value}' is not a valid task id"))
    }

    /// Create a parse error for an empty field
    pub fn empty_field(field: &str) -> Self {
        Self::Parse(format!("{field} cannot be empty"))
    }

    /// Check if this error indicates an unreachable or released store
    pub fn is_connection(&self) -> bool {
        matches!(self, TodoError::Connection(_))
    }

    /// Check if this error indicates a duplicate id
    pub fn is_conflict(&self) -> bool {
        matches!(self, TodoError::Conflict(_))
    }

    /// Check if this error indicates malformed input
    pub fn is_parse(&self) -> bool {
        matches!(self, TodoError::Parse(_))
    }

    /// Check if this error indicates an undecodable row
    pub fn is_decode(&self) -> bool {
        matches!(self, TodoError::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_creation() {
        let error = TodoError::missing_value("done");
        assert!(error.is_parse());
        assert_eq!(
            error,
            TodoError::Parse("--done requires a comma-separated list of ids".to_string())
        );

        let error = TodoError::invalid_id("x");
        assert_eq!(error.to_string(), "Parse error: 'x' is not a valid task id");

        let error = TodoError::timed_out("list", Duration::from_secs(5));
        assert!(error.is_connection());
        assert_eq!(error.to_string(), "Connection error: list timed out after 5s");
    }

    #[test]
    fn test_decode_error_is_transparent() {
        let error: TodoError = DecodeError::new(3, "title is NULL").into();
        assert!(error.is_decode());
        assert_eq!(error.to_string(), "row 3: title is NULL");
    }

    #[test]
    fn test_error_predicates() {
        assert!(TodoError::Conflict(1).is_conflict());
        assert!(!TodoError::Conflict(1).is_connection());
        assert!(TodoError::connection_closed().is_connection());
        assert!(!TodoError::Database("x".to_string()).is_connection());
        assert!(!TodoError::Configuration("x".to_string()).is_parse());
    }
}
