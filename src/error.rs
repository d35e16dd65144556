//! Error types for extraction and record mutation
//!
//! Errors are classified by who can fix them:
//! - Retryable: model transport failures and timeouts
//! - NonRetryable: unparseable or schema-violating model output, configuration
//! - UserInput: rejected lifecycle requests (bad status, bad index, empty task)

use thiserror::Error;

use crate::db::DbError;

/// Failure of the transcript → record pipeline.
#[derive(Debug, Error)]
pub enum ExtractionError {
    // Retryable errors
    #[error("Model transport error: {0}")]
    Transport(String),

    #[error("Model call timed out after {0} seconds")]
    Timeout(u64),

    // Non-retryable errors
    #[error("Model did not return usable JSON: {0}")]
    UnparseableResponse(String),

    #[error("Extracted data failed validation: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ExtractionError {
    /// Returns true if repeating the model call could succeed.
    ///
    /// A response that arrived but could not be parsed is never retryable:
    /// the same prompt will produce the same class of output.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExtractionError::Transport(_) | ExtractionError::Timeout(_)
        )
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ExtractionError::Transport(_) => {
                "Check that the model server is running and reachable, then try again."
            }
            ExtractionError::Timeout(_) => {
                "The model took too long. Try again or raise timeoutSecs in the config."
            }
            ExtractionError::UnparseableResponse(_) => {
                "The model replied without structured output. Re-run the extraction."
            }
            ExtractionError::SchemaViolation(_) => {
                "The model output did not match the meeting schema. Try a different model."
            }
            ExtractionError::Configuration(_) => {
                "Check your configuration in ~/.meetminder/config.json"
            }
        }
    }
}

/// A value that does not match the meeting record schema.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{path}: {reason}")]
pub struct SchemaViolation {
    /// JSON path of the offending value, e.g. `action_items[2].confidence`.
    pub path: String,
    pub reason: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Rejected mutation of a stored record. The record is never touched when
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("Invalid status '{0}'. Expected one of: Backlog, To Do, In Progress, Done")]
    InvalidStatus(String),

    #[error("Action item index {index} out of range (record has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Task is required")]
    MissingTask,

    #[error("No action item with id '{0}'")]
    UnknownItem(String),

    #[error("Invalid due date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Errors surfaced by the service layer, which combines extraction,
/// storage, and lifecycle operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Transcript is empty")]
    EmptyTranscript,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),
}

impl ServiceError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Extraction(e) => e.is_retryable(),
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ServiceError::Extraction(e) => e.recovery_suggestion(),
            ServiceError::Lifecycle(_) => "Correct the request and submit it again.",
            ServiceError::Db(DbError::NotFound(_)) => {
                "Run `meetminder history` to list stored meetings."
            }
            ServiceError::Db(_) => "Check the database path and file permissions.",
            ServiceError::EmptyTranscript => "Paste a transcript or pass --file.",
            ServiceError::Config(_) => "Fix or remove ~/.meetminder/config.json.",
            ServiceError::Input(_) => "Check the file path and its contents.",
        }
    }

    fn error_type(&self) -> ErrorType {
        match self {
            ServiceError::Lifecycle(_)
            | ServiceError::EmptyTranscript
            | ServiceError::Config(_)
            | ServiceError::Input(_) => ErrorType::UserInput,
            _ if self.is_retryable() => ErrorType::Retryable,
            _ => ErrorType::NonRetryable,
        }
    }
}

/// Serializable error representation for machine-readable output
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Retryable,
    NonRetryable,
    UserInput,
}

impl From<&ServiceError> for ErrorReport {
    fn from(err: &ServiceError) -> Self {
        ErrorReport {
            message: err.to_string(),
            error_type: err.error_type(),
            can_retry: err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
