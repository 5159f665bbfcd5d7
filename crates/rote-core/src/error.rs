//! Error types for rote operations.
//!
//! This module provides a structured error hierarchy with error codes,
//! suggestions for resolution, and source-chain information.

use thiserror::Error;

/// Result type alias for rote operations.
pub type RoteResult<T> = Result<T, RoteError>;

/// Main error type for all rote operations.
#[derive(Error, Debug)]
pub enum RoteError {
    /// No cards are due for review. Informational rather than a fault.
    #[error("No cards due: {message}")]
    NoCardsDue {
        message: String,
        code: ErrorCode,
        deck_id: Option<String>,
    },

    /// An operation required an active session and none exists.
    #[error("No active session: {message}")]
    NoActiveSession { message: String, code: ErrorCode },

    /// A session is already running on this orchestrator.
    #[error("Session already active: {message}")]
    SessionAlreadyActive {
        message: String,
        code: ErrorCode,
        session_id: Option<String>,
    },

    /// An answer submission is already in flight.
    #[error("Operation in progress: {message}")]
    OperationInProgress { message: String, code: ErrorCode },

    /// The session queue has no cards left to present.
    #[error("Session exhausted: {message}")]
    SessionExhausted { message: String, code: ErrorCode },

    /// The queue was given malformed input.
    #[error("Invalid queue: {message}")]
    InvalidQueue { message: String, code: ErrorCode },

    /// The remote scheduling service could not be reached or answered
    /// with a transient failure. Callers with a local fallback swallow this.
    #[error("Remote service unavailable: {message}")]
    RemoteUnavailable {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Local schedule store operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        suggestion: Option<String>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Session (SESSION_xxx)
    SessionNotActive,
    SessionAlreadyActive,
    SessionExhausted,
    SessionBusy,

    // Queue (QUEUE_xxx)
    QueueInvalid,

    // Deck (DECK_xxx)
    DeckNoCardsDue,

    // Remote service (REMOTE_xxx)
    RemoteUnavailable,
    RemoteRateLimited,

    // Validation (VAL_xxx)
    ValInvalidInput,

    // Configuration (CFG_xxx)
    ConfigurationInvalid,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SessionNotActive => "SESSION_001",
            ErrorCode::SessionAlreadyActive => "SESSION_002",
            ErrorCode::SessionExhausted => "SESSION_003",
            ErrorCode::SessionBusy => "SESSION_004",
            ErrorCode::QueueInvalid => "QUEUE_001",
            ErrorCode::DeckNoCardsDue => "DECK_001",
            ErrorCode::RemoteUnavailable => "REMOTE_001",
            ErrorCode::RemoteRateLimited => "REMOTE_002",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ConfigurationInvalid => "CFG_001",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl RoteError {
    /// Create a no-cards-due error for a deck.
    pub fn no_cards_due(deck_id: impl Into<String>) -> Self {
        let id = deck_id.into();
        Self::NoCardsDue {
            message: format!("No cards due for deck '{}'", id),
            code: ErrorCode::DeckNoCardsDue,
            deck_id: Some(id),
        }
    }

    /// Create a no-active-session error.
    pub fn no_active_session(message: impl Into<String>) -> Self {
        Self::NoActiveSession {
            message: message.into(),
            code: ErrorCode::SessionNotActive,
        }
    }

    /// Create a session-already-active error.
    pub fn session_already_active(session_id: impl Into<String>) -> Self {
        let id = session_id.into();
        Self::SessionAlreadyActive {
            message: format!("Session '{}' is still active", id),
            code: ErrorCode::SessionAlreadyActive,
            session_id: Some(id),
        }
    }

    /// Create an operation-in-progress error.
    pub fn operation_in_progress(message: impl Into<String>) -> Self {
        Self::OperationInProgress {
            message: message.into(),
            code: ErrorCode::SessionBusy,
        }
    }

    /// Create a session-exhausted error.
    pub fn session_exhausted(message: impl Into<String>) -> Self {
        Self::SessionExhausted {
            message: message.into(),
            code: ErrorCode::SessionExhausted,
        }
    }

    /// Create an invalid-queue error.
    pub fn invalid_queue(message: impl Into<String>) -> Self {
        Self::InvalidQueue {
            message: message.into(),
            code: ErrorCode::QueueInvalid,
        }
    }

    /// Create a remote-unavailable error.
    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            message: message.into(),
            code: ErrorCode::RemoteUnavailable,
            source: None,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: None,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoCardsDue { code, .. } => *code,
            Self::NoActiveSession { code, .. } => *code,
            Self::SessionAlreadyActive { code, .. } => *code,
            Self::OperationInProgress { code, .. } => *code,
            Self::SessionExhausted { code, .. } => *code,
            Self::InvalidQueue { code, .. } => *code,
            Self::RemoteUnavailable { code, .. } => *code,
            Self::Database { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::Configuration(_) => ErrorCode::ConfigurationInvalid,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::NoCardsDue { .. } => {
                Some("Come back after the next review date or add new cards to the deck")
            }
            Self::NoActiveSession { .. } => Some("Start a session before submitting answers"),
            Self::SessionAlreadyActive { .. } => {
                Some("End the active session before starting a new one")
            }
            Self::OperationInProgress { .. } => {
                Some("Wait for the in-flight answer to complete before submitting another")
            }
            Self::RemoteUnavailable { .. } => {
                Some("Check your network connection; answers are scheduled locally until it returns")
            }
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }

    /// Convert from HTTP status code (for client errors).
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            400 => Self::Validation {
                message: body.to_string(),
                code: ErrorCode::ValInvalidInput,
                suggestion: Some("Please check your request parameters".to_string()),
            },
            401 | 403 => {
                Self::Configuration(format!("Authentication rejected (HTTP {}): {}", status, body))
            }
            404 => Self::validation(format!("Unknown resource (HTTP 404): {}", body)),
            429 => Self::RemoteUnavailable {
                message: body.to_string(),
                code: ErrorCode::RemoteRateLimited,
                source: None,
            },
            500..=599 => Self::RemoteUnavailable {
                message: format!("HTTP {}: {}", status, body),
                code: ErrorCode::RemoteUnavailable,
                source: None,
            },
            _ => Self::Internal(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<rusqlite::Error> for RoteError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
