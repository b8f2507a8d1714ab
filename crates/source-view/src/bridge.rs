//! Two-way synchronization between the editing widget and the document.
//!
//! # Flow
//!
//! ```text
//!   widget commit ──► ChangeTracker ──Forward──► on_buffer_changed ──► Document
//!                                                  (SourceModified { view })
//!
//!   Document write ──► on_document_modified ──foreign──► suppressed full replace ──► widget
//!                          │                                  (ticket armed)
//!                          └── own view id ──► ignored
//! ```
//!
//! Every write the bridge makes carries this view's [`ViewId`], and every replacement it makes
//! on behalf of a foreign write is swallowed by the tracker, so the two sides cannot ping-pong.
//!
//! # Re-entrancy
//!
//! A foreign write can arrive while the widget is in the middle of a commit (for example when
//! another document listener reacts to this view's own write-back). The widget is borrowed at
//! that point, so the content is parked and applied by [`DocumentSyncBridge::flush`] as soon
//! as the widget is free again. Only the latest parked content is kept; each one is a full
//! replacement.
//!
//! Nested writes also mean an event can arrive after a newer one: a listener that writes while
//! handling an event has its own event delivered first, and the outer emit loop then hands the
//! older event to the remaining listeners. The bridge therefore mirrors the document's current
//! content, never the event payload.

use crate::error::SyncError;
use crate::tracker::{ChangeTracker, TrackDecision};
use source_view_core::{
    BufferError, ChangeOrigin, CommitEvent, ContentModified, Document, EditorWidget,
    ListenerError, ViewId,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Keeps one widget and one document converged.
#[derive(Debug)]
pub struct DocumentSyncBridge {
    view: ViewId,
    widget: Rc<RefCell<EditorWidget>>,
    document: Rc<Document>,
    tracker: ChangeTracker,
    parked: RefCell<Option<String>>,
}

impl DocumentSyncBridge {
    /// Create a bridge for `view`. Nothing is subscribed yet.
    pub fn new(view: ViewId, widget: Rc<RefCell<EditorWidget>>, document: Rc<Document>) -> Self {
        Self {
            view,
            widget,
            document,
            tracker: ChangeTracker::new(),
            parked: RefCell::new(None),
        }
    }

    /// Identity used to tag this bridge's document writes.
    pub fn view_id(&self) -> ViewId {
        self.view
    }

    /// The synchronized widget.
    pub fn widget(&self) -> &Rc<RefCell<EditorWidget>> {
        &self.widget
    }

    /// The synchronized document.
    pub fn document(&self) -> &Rc<Document> {
        &self.document
    }

    /// The commit classifier.
    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    /// Returns `true` while a foreign update is waiting for the widget.
    pub fn has_parked_update(&self) -> bool {
        self.parked.borrow().is_some()
    }

    /// Commit listener: forward the buffer text unless the commit is suppressed.
    pub fn on_commit(&self, event: &CommitEvent) -> Result<(), ListenerError> {
        if self.tracker.track(event) == TrackDecision::Forward {
            self.on_buffer_changed(&event.text);
        }
        Ok(())
    }

    /// Write `text` into the document, tagged as coming from this view.
    ///
    /// Returns whether the document content changed.
    pub fn on_buffer_changed(&self, text: &str) -> bool {
        self.document
            .set_content(text, ChangeOrigin::SourceModified { view: self.view })
    }

    /// Document listener: mirror foreign writes into the widget.
    pub fn on_document_modified(&self, event: &ContentModified) -> Result<(), ListenerError> {
        if event.origin.is_from_view(self.view) {
            tracing::trace!(view = %self.view, version = event.version, "own write ignored");
            return Ok(());
        }

        tracing::debug!(
            view = %self.view,
            document = %self.document.name(),
            title = %event.title,
            "applying foreign document update"
        );
        // A nested write may already have superseded `event`; the document is always current.
        *self.parked.borrow_mut() = Some(self.document.content());
        self.flush()
            .map(|_| ())
            .map_err(|err| ListenerError::new(err.to_string()))
    }

    /// Apply a parked foreign update if the widget is free.
    ///
    /// Returns whether the buffer was replaced.
    pub fn flush(&self) -> Result<bool, BufferError> {
        let mut applied = false;
        loop {
            let Ok(mut widget) = self.widget.try_borrow_mut() else {
                tracing::debug!(view = %self.view, "widget busy, foreign update parked");
                return Ok(applied);
            };
            let Some(content) = self.parked.borrow_mut().take() else {
                return Ok(applied);
            };
            if widget.text() == content {
                continue;
            }
            self.replace_in(&mut widget, &content, true)?;
            applied = true;
        }
    }

    /// Replace the whole buffer with `text` as one undoable unit.
    ///
    /// With `skip_file_update` the resulting commit is not written back to the document.
    pub fn replace_content(&self, text: &str, skip_file_update: bool) -> Result<(), SyncError> {
        {
            let mut widget = self
                .widget
                .try_borrow_mut()
                .map_err(|_| SyncError::WidgetBusy)?;
            self.replace_in(&mut widget, text, skip_file_update)?;
        }
        self.flush()?;
        Ok(())
    }

    /// Full-range replacement on an already borrowed widget.
    pub fn replace_in(
        &self,
        widget: &mut EditorWidget,
        text: &str,
        skip_file_update: bool,
    ) -> Result<(), BufferError> {
        let ticket = widget.issue_ticket();
        if skip_file_update {
            self.tracker.suppress_next(ticket);
        }
        let range = widget.full_range();
        widget.replace_range(range, text, ticket).inspect_err(|_| {
            if skip_file_update {
                self.tracker.suppression().disarm();
            }
        })
    }
}
