//! Error types for the headless widget model.

use thiserror::Error;

/// Errors produced when addressing or editing a [`TextBuffer`](crate::TextBuffer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// A position outside the buffer.
    #[error("invalid position: line {line}, column {column}")]
    InvalidPosition {
        /// Logical line index.
        line: usize,
        /// Column in characters.
        column: usize,
    },
    /// A range whose end precedes its start, or that runs past the buffer end.
    #[error("invalid range: {start}..{end}")]
    InvalidRange {
        /// Start character offset.
        start: usize,
        /// End character offset.
        end: usize,
    },
    /// A recorded history step no longer matches the buffer contents.
    #[error("history step does not match buffer contents at offset {offset}")]
    HistoryMismatch {
        /// Character offset of the mismatching step.
        offset: usize,
    },
}

/// Error returned by a listener callback.
///
/// Listener errors are logged by the emitter and never interrupt delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    /// Create a listener error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors produced while parsing a key chord such as `"Ctrl+Shift+F"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    /// The chord string was empty.
    #[error("empty key chord")]
    Empty,
    /// A modifier segment was not recognized.
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    /// The key segment was missing or not recognized.
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

/// Error returned by a [`CompletionProvider`](crate::CompletionProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("completion failed: {0}")]
pub struct CompletionError(pub String);
