//! Error types for the source view controller.

use source_view_core::{BufferError, KeyParseError};
use thiserror::Error;

/// The parser collaborator could not produce a tree for the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse failed: {message}")]
pub struct ParseError {
    /// Parser diagnostic.
    pub message: String,
}

impl ParseError {
    /// Create a parse error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The language service could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("language service unavailable: {0}")]
pub struct CompletionAcquisitionError(pub String);

impl CompletionAcquisitionError {
    /// Create an acquisition error.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors from pushing text into the editing widget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The widget was borrowed elsewhere.
    #[error("editing widget is busy")]
    WidgetBusy,

    /// The buffer rejected the replacement.
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Errors from [`crate::SourceView::format`].
#[derive(Debug, Error)]
pub enum FormatError {
    /// The document did not parse; the buffer was left untouched.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No formatter is configured for this view.
    #[error("no formatter configured")]
    Unavailable,

    /// The view was detached before the formatted text arrived.
    #[error("source view detached")]
    Detached,

    /// The formatted text could not be applied.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Errors from the command router and binder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Nothing is registered for the dispatched command id.
    #[error("no handler registered for command `{0}`")]
    NoHandler(String),

    /// A descriptor's shortcut string could not be parsed.
    #[error("invalid shortcut `{shortcut}` for command `{id}`: {source}")]
    InvalidShortcut {
        /// Command id.
        id: String,
        /// Offending shortcut text.
        shortcut: String,
        /// Parse failure.
        #[source]
        source: KeyParseError,
    },

    /// A descriptor list could not be decoded.
    #[error("invalid command descriptors: {0}")]
    Descriptors(String),
}

/// Errors from loading or validating [`crate::SourceViewOptions`].
#[derive(Debug, Error)]
pub enum OptionsError {
    /// The autocomplete trigger is not a valid regular expression.
    #[error("invalid autocomplete trigger pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The options document is malformed.
    #[error("invalid options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from [`crate::SourceView::attach`].
#[derive(Debug, Error)]
pub enum AttachError {
    /// The options are invalid.
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// The widget was borrowed elsewhere.
    #[error("editing widget is busy")]
    WidgetBusy,
}
