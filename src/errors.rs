//! Typed errors for the check and configure flows.
//!
//! Errors fall into two groups:
//!
//! - **Classified** conditions detected before any background work starts
//!   (`UnsupportedDocumentKind`, `UnsupportedLanguage`, `CheckInFlight`).
//!   These are shown to the user as-is.
//! - **Unexpected** failures (`EngineFailure`, `Internal`). These are written
//!   to the error log and shown with their full description.
//!
//! An empty input is not an error; it is reported as
//! [`CheckStatus::NothingToCheck`](crate::orchestrator::CheckStatus).
//!
//! # Example
//!
//! ```rust
//! use proofcheck::errors::{CheckError, ErrorCode};
//!
//! let err = CheckError::UnsupportedLanguage { code: "xx".into() };
//! assert_eq!(err.code(), ErrorCode::UNSUPPORTED_LANGUAGE);
//! assert!(!err.is_unexpected());
//! assert!(err.user_message().contains("'xx'"));
//! ```

use crate::task::TaskError;
use serde::Serialize;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Structured error code for documentation and programmatic handling.
///
/// - P001-P009: document and language errors
/// - P010-P019: background check errors
/// - P020-P029: scheduling errors
/// - P030-P039: configuration errors
/// - P099: anything not classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorCode(&'static str);

impl ErrorCode {
    /// The document is not a text document
    pub const UNSUPPORTED_DOCUMENT: ErrorCode = ErrorCode("P001");
    /// The document language is outside the supported set
    pub const UNSUPPORTED_LANGUAGE: ErrorCode = ErrorCode("P002");
    /// The rule engine raised or the worker died
    pub const ENGINE_FAILURE: ErrorCode = ErrorCode("P010");
    /// The check was abandoned after the configured timeout
    pub const TIMED_OUT: ErrorCode = ErrorCode("P011");
    /// Another check is still running
    pub const CHECK_IN_FLIGHT: ErrorCode = ErrorCode("P020");
    /// Configuration could not be read or written
    pub const CONFIG: ErrorCode = ErrorCode("P030");
    /// Unclassified failure
    pub const INTERNAL: ErrorCode = ErrorCode("P099");

    /// Get the error code string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error raised while running a check or configure command.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The active document cannot provide plain text.
    #[error("unsupported document: {reason}")]
    UnsupportedDocumentKind { reason: String },

    /// The resolved language is not in [`Language::ALL`](crate::language::Language::ALL).
    #[error("language '{code}' is not supported")]
    UnsupportedLanguage { code: String },

    /// The background check failed.
    #[error("rule engine failed: {0}")]
    EngineFailure(#[source] TaskError),

    /// The background check did not finish in time and was abandoned.
    #[error("check did not finish within {after:?}")]
    TimedOut { after: Duration },

    /// A check is already in flight.
    #[error("a check is already running")]
    CheckInFlight,

    /// Configuration could not be loaded or saved.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Anything else.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CheckError {
    /// Create an unsupported-document error.
    pub fn unsupported_document(reason: impl Into<String>) -> Self {
        Self::UnsupportedDocumentKind {
            reason: reason.into(),
        }
    }

    /// Create an unsupported-language error.
    pub fn unsupported_language(code: impl Into<String>) -> Self {
        Self::UnsupportedLanguage { code: code.into() }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedDocumentKind { .. } => ErrorCode::UNSUPPORTED_DOCUMENT,
            Self::UnsupportedLanguage { .. } => ErrorCode::UNSUPPORTED_LANGUAGE,
            Self::EngineFailure(_) => ErrorCode::ENGINE_FAILURE,
            Self::TimedOut { .. } => ErrorCode::TIMED_OUT,
            Self::CheckInFlight => ErrorCode::CHECK_IN_FLIGHT,
            Self::Config { .. } => ErrorCode::CONFIG,
            Self::Internal(_) => ErrorCode::INTERNAL,
        }
    }

    /// Whether this failure was not anticipated by the flow and belongs in
    /// the error log.
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::EngineFailure(_) | Self::Internal(_))
    }

    /// Human-readable text for the presenter's error path.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedDocumentKind { .. } => {
                "Sorry, only text documents are supported".to_string()
            }
            Self::UnsupportedLanguage { code } => {
                format!("Error: Sorry, the document language '{code}' is not supported.")
            }
            Self::TimedOut { after } => format!(
                "The check did not finish within {} seconds and was abandoned.",
                after.as_secs()
            ),
            Self::CheckInFlight => {
                "A check is already running. Please wait until it has finished.".to_string()
            }
            Self::Config { message } => format!("Configuration error: {message}"),
            Self::EngineFailure(_) | Self::Internal(_) => {
                format!("An error has occurred:\n{}", describe(self))
            }
        }
    }
}

impl From<TaskError> for CheckError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::TimedOut(after) => Self::TimedOut { after },
            other => Self::EngineFailure(other),
        }
    }
}

/// Full description of an error: its message followed by every cause.
pub fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // `{:#}` on anyhow errors already folds the chain into the message
        if !out.contains(&text) {
            out.push_str("\nCaused by: ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
