//! Structured error types for the run pipeline.
//!
//! These are designed to be displayable in both CLI and TUI contexts. Each
//! variant family maps to one way a run can terminate:
//! - `UserInputError`: the form cannot produce a request, nothing is sent
//! - `GatewayError`: the exchange with the backend failed or was rejected
//! - `SchemaError`: the backend answered with a shape we do not recognise

use thiserror::Error;

/// The form state cannot be turned into a request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UserInputError {
    #[error("a zero-month window means \"use uploaded CSV\": choose a CSV file and upload it first")]
    UploadRequired,

    #[error("no CSV file has been chosen")]
    NoFileChosen,

    #[error("file '{path}' could not be read: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("file '{file_name}' is not valid UTF-8 text")]
    NotText { file_name: String },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Failure while talking to the backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// Connection failure, non-success status without an error body, or a
    /// body that is not JSON.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The client-side timeout elapsed before a response arrived.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The server parsed the request and rejected it. The message is the
    /// server's own text, shown verbatim.
    #[error("{0}")]
    Application(String),
}

/// The response body does not match the shape its endpoint promises.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unrecognised {shape} response: {detail}")]
pub struct SchemaError {
    pub shape: &'static str,
    pub detail: String,
}

impl SchemaError {
    pub fn new(shape: &'static str, detail: impl Into<String>) -> Self {
        Self {
            shape,
            detail: detail.into(),
        }
    }
}

/// Any way a dashboard run can end without a result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] UserInputError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Coarse grouping used by the error history and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Server,
    Schema,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Schema => "schema",
        }
    }
}

impl RunError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RunError::Input(_) => ErrorCategory::Input,
            RunError::Gateway(GatewayError::Application(_)) => ErrorCategory::Server,
            RunError::Gateway(_) => ErrorCategory::Network,
            RunError::Schema(_) => ErrorCategory::Schema,
        }
    }

    /// Input problems are raised as a blocking prompt; the rest go to the
    /// status line.
    pub fn is_prompt(&self) -> bool {
        matches!(self, RunError::Input(_))
    }

    /// The text shown after the locale's error prefix.
    ///
    /// Application errors pass through untouched so the user sees exactly what
    /// the server said.
    pub fn user_message(&self) -> String {
        match self {
            RunError::Gateway(GatewayError::Application(msg)) => msg.clone(),
            other => other.to_string(),
        }
    }
}
