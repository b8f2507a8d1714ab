//! Shared autocompletion subsystem.
//!
//! Completion providers are installed into a [`SharedCompleters`] list, which may be shared by
//! several widgets (the list is process-wide in most hosts). Opening the autocompletion popup
//! queries every installed provider with the identifier prefix in front of the cursor.

use crate::error::CompletionError;
use crate::text::Position;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A single completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    /// Text shown in the popup.
    pub label: String,
    /// Text inserted on accept (defaults to `label`).
    pub insert_text: Option<String>,
    /// Short description (type, kind, ...).
    pub detail: Option<String>,
}

impl CompletionItem {
    /// An item that inserts its own label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            insert_text: None,
            detail: None,
        }
    }

    /// Attach a detail string.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// What a provider is asked to complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionQuery {
    /// Identifier characters directly in front of the cursor.
    pub prefix: String,
    /// Cursor position.
    pub position: Position,
    /// Full text of the cursor line.
    pub line_text: String,
    /// Full buffer text.
    pub text: String,
}

/// Source of completion items.
pub trait CompletionProvider {
    /// Compute suggestions for `query`.
    fn complete(&self, query: &CompletionQuery) -> Result<Vec<CompletionItem>, CompletionError>;
}

/// State of an open autocompletion popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPopup {
    /// Prefix the popup was opened for.
    pub prefix: String,
    /// Cursor position when the popup opened.
    pub anchor: Position,
    /// Collected suggestions, in provider order.
    pub items: Vec<CompletionItem>,
}

/// Shared handle to the list of active completion providers.
#[derive(Clone, Default)]
pub struct SharedCompleters {
    providers: Rc<RefCell<Vec<Rc<dyn CompletionProvider>>>>,
}

impl SharedCompleters {
    /// Create an empty provider list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every installed provider.
    pub fn set_providers(&self, providers: Vec<Rc<dyn CompletionProvider>>) {
        *self.providers.borrow_mut() = providers;
    }

    /// Snapshot of the installed providers.
    pub fn providers(&self) -> Vec<Rc<dyn CompletionProvider>> {
        self.providers.borrow().clone()
    }

    /// Number of installed providers.
    pub fn len(&self) -> usize {
        self.providers.borrow().len()
    }

    /// Returns `true` if no provider is installed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if both handles point at the same list.
    pub fn same_list(&self, other: &SharedCompleters) -> bool {
        Rc::ptr_eq(&self.providers, &other.providers)
    }

    /// Query every provider. The first provider error aborts the query.
    pub fn collect(&self, query: &CompletionQuery) -> Result<Vec<CompletionItem>, CompletionError> {
        let mut items = Vec::new();
        for provider in self.providers() {
            items.extend(provider.complete(query)?);
        }
        Ok(items)
    }
}

impl fmt::Debug for SharedCompleters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCompleters")
            .field("providers", &self.len())
            .finish()
    }
}

/// Identifier characters in front of `column` on `line_text`.
pub(crate) fn identifier_prefix(line_text: &str, column: usize) -> String {
    let before: Vec<char> = line_text.chars().take(column).collect();
    let start = before
        .iter()
        .rposition(|ch| !(ch.is_alphanumeric() || *ch == '_'))
        .map(|idx| idx + 1)
        .unwrap_or(0);
    before[start..].iter().collect()
}
