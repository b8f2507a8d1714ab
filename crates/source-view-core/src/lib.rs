#![warn(missing_docs)]
//! Source View Core - headless editing-widget model
//!
//! # Overview
//!
//! `source-view-core` models the text widget that a source view drives, without rendering it.
//! It assumes the host draws the buffer, markers and gutter, and forwards input back as
//! [`InputCommand`]s, key chords and gutter events.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditorWidget (input, listeners, popup)     │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Markers / Breakpoints / Keymap             │  ← Annotations & bindings
//! ├─────────────────────────────────────────────┤
//! │  UndoHistory (ChangeUnit commits)           │  ← History
//! ├─────────────────────────────────────────────┤
//! │  TextBuffer (Rope-based)                    │  ← Text storage
//! └─────────────────────────────────────────────┘
//!
//!  Document (shared, origin-tagged writes)         ← Canonical content
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use source_view_core::{ChangeOrigin, Document, DocumentInfo};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let document = Document::shared(DocumentInfo::new("main.bal", "/src", "demo"), "x = 1;");
//! let titles = Rc::new(RefCell::new(Vec::new()));
//!
//! let titles_clone = Rc::clone(&titles);
//! let _subscription = document.on_content_modified(move |event| {
//!     titles_clone.borrow_mut().push(event.title.clone());
//!     Ok(())
//! });
//!
//! document.set_content("x = 2;", ChangeOrigin::foreign("Design view edit"));
//! assert_eq!(*titles.borrow(), vec!["Design view edit".to_string()]);
//! ```
//!
//! # Module Description
//!
//! - [`text`] - Rope based line/column buffer
//! - [`history`] - undo/redo and change units
//! - [`markers`] - marker annotations
//! - [`gutter`] - breakpoints and gutter events
//! - [`keymap`] - key chords and bindings
//! - [`completion`] - shared completion provider list
//! - [`events`] - listener sets and disposer handles
//! - [`document`] - shared document model
//! - [`widget`] - the editing widget

pub mod completion;
pub mod document;
pub mod error;
pub mod events;
pub mod gutter;
pub mod history;
pub mod keymap;
pub mod markers;
pub mod text;
pub mod widget;

pub use completion::{
    CompletionItem, CompletionPopup, CompletionProvider, CompletionQuery, SharedCompleters,
};
pub use document::{ChangeOrigin, ContentModified, Document, DocumentInfo, ViewId};
pub use error::{BufferError, CompletionError, KeyParseError, ListenerError};
pub use events::{ListenerSet, Subscription};
pub use gutter::{BreakpointSet, GutterMouseDown, GutterTarget};
pub use history::{ChangeUnit, EditOrigin, ReplaceTicket, UndoHistory};
pub use keymap::{Key, KeyBinding, KeyChord, Keymap, Modifiers, Platform};
pub use markers::{Marker, MarkerId, MarkerKind, MarkerSet};
pub use text::{Position, Splice, TextBuffer, TextRange};
pub use widget::{AfterExec, CommitEvent, EditorWidget, InputCommand};
