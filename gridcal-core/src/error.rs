//! Error types for gridcal.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A failed list/insert/patch/delete call against the remote calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// HTTP status when the failure came back from the API, `None` for transport failures.
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        RemoteError {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "Calendar request failed (HTTP {}): {}", status, self.message),
            None => write!(f, "Calendar request failed: {}", self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Errors from loading, refreshing or obtaining a credential.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No saved credential at {0}")]
    Missing(PathBuf),

    #[error("Saved credential at {path} could not be read: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Authorization failed: {0}")]
    Consent(String),

    #[error("Credential storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single event's date/time field could not be understood.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Event '{event_id}' has no {field} value")]
    Missing {
        event_id: String,
        field: &'static str,
    },

    #[error("Event '{event_id}' has an invalid {field} value '{value}'")]
    Invalid {
        event_id: String,
        field: &'static str,
        value: String,
    },
}

/// Rejections from the event edit form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("A title is required")]
    EmptyTitle,
}

/// Failure of a session controller transition. The view state is untouched when one is returned.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The change reached the calendar; only re-reading it afterwards failed.
    #[error("{change}, but the view could not be refreshed: {source}")]
    Unrefreshed {
        change: &'static str,
        source: RemoteError,
    },
}

impl SessionError {
    /// Whether the remote calendar was changed despite the error.
    pub fn change_saved(&self) -> bool {
        matches!(self, SessionError::Unrefreshed { .. })
    }
}

/// Errors from configuration and local file handling.
#[derive(Error, Debug)]
pub enum GridcalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for configuration and IO paths.
pub type GridcalResult<T> = Result<T, GridcalError>;
