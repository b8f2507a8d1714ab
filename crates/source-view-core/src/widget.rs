//! The headless editing widget.
//!
//! [`EditorWidget`] bundles everything a host text widget exposes to a source-view controller:
//!
//! - **Buffer**: line/column addressed text ([`TextBuffer`])
//! - **History**: undo/redo with a commit notification for every recorded [`ChangeUnit`]
//! - **Annotations**: markers and gutter breakpoints
//! - **Input**: typed commands, key bindings, focus and gutter pointer events
//! - **Autocompletion**: a handle to the shared completion provider list and the popup state
//!
//! # Commit notifications
//!
//! Every edit that reaches the buffer (typed input, programmatic replacement, undo, redo) is
//! committed as exactly one [`ChangeUnit`] and announced to [`EditorWidget::on_commit`]
//! listeners *after* the buffer has been updated. Loading text with
//! [`EditorWidget::reset_text`] is not an edit: it clears the history and emits nothing.
//!
//! # Example
//!
//! ```rust
//! use source_view_core::{EditorWidget, InputCommand, Position};
//!
//! let mut widget = EditorWidget::new("fn main() {}\n");
//! widget.set_cursor(Position::new(0, 3)).unwrap();
//! widget.execute(InputCommand::InsertText("my_".to_string())).unwrap();
//! assert_eq!(widget.text(), "fn my_main() {}\n");
//!
//! widget.execute(InputCommand::Undo).unwrap();
//! assert_eq!(widget.text(), "fn main() {}\n");
//! ```

use crate::completion::{CompletionPopup, CompletionQuery, SharedCompleters, identifier_prefix};
use crate::error::{BufferError, CompletionError, ListenerError};
use crate::events::{ListenerSet, Subscription};
use crate::gutter::{BreakpointSet, GutterMouseDown};
use crate::history::{ChangeUnit, EditOrigin, ReplaceTicket, UndoHistory};
use crate::keymap::Keymap;
use crate::markers::{Marker, MarkerId, MarkerSet};
use crate::text::{Position, Splice, TextBuffer, TextRange};
use std::cell::RefCell;

/// Input commands executed by the widget on behalf of the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// Insert text at the cursor.
    InsertText(String),
    /// Delete the character before the cursor.
    Backspace,
    /// Undo the last committed step.
    Undo,
    /// Redo the last undone step.
    Redo,
}

impl InputCommand {
    /// Stable command name.
    pub fn name(&self) -> &'static str {
        match self {
            InputCommand::InsertText(_) => "insertstring",
            InputCommand::Backspace => "backspace",
            InputCommand::Undo => "undo",
            InputCommand::Redo => "redo",
        }
    }
}

/// Notification delivered after an edit has been committed to the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEvent {
    /// The committed unit.
    pub unit: ChangeUnit,
    /// Full buffer text after the commit.
    pub text: String,
}

/// Notification delivered after an [`InputCommand`] finished executing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AfterExec {
    /// The executed command.
    pub command: InputCommand,
    /// Whether the command changed the buffer.
    pub changed: bool,
}

/// Headless editing widget.
#[derive(Debug)]
pub struct EditorWidget {
    buffer: TextBuffer,
    history: UndoHistory,
    cursor: Position,
    markers: MarkerSet,
    breakpoints: BreakpointSet,
    keymap: Keymap,
    focused: bool,
    completers: SharedCompleters,
    popup: Option<CompletionPopup>,
    next_ticket: u64,
    commit_listeners: ListenerSet<CommitEvent>,
    exec_listeners: ListenerSet<AfterExec>,
    gutter_listeners: ListenerSet<GutterMouseDown>,
}

impl EditorWidget {
    /// Create a widget with its own completion provider list.
    pub fn new(text: &str) -> Self {
        Self::with_completers(text, SharedCompleters::new())
    }

    /// Create a widget that uses an existing (possibly shared) completion provider list.
    pub fn with_completers(text: &str, completers: SharedCompleters) -> Self {
        Self {
            buffer: TextBuffer::new(text),
            history: UndoHistory::default(),
            cursor: Position::default(),
            markers: MarkerSet::new(),
            breakpoints: BreakpointSet::new(),
            keymap: Keymap::new(),
            focused: false,
            completers,
            popup: None,
            next_ticket: 0,
            commit_listeners: ListenerSet::new(),
            exec_listeners: ListenerSet::new(),
            gutter_listeners: ListenerSet::new(),
        }
    }

    // ------------------------------------------------------------------
    // Buffer
    // ------------------------------------------------------------------

    /// Full buffer text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Read-only access to the buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Number of logical lines.
    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    /// Character length of `line` without its line break.
    pub fn line_len(&self, line: usize) -> Option<usize> {
        self.buffer.line_len(line)
    }

    /// Span of the entire buffer content.
    pub fn full_range(&self) -> TextRange {
        self.buffer.full_range()
    }

    /// Current cursor position.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Move the cursor. Positions outside the buffer are rejected.
    pub fn set_cursor(&mut self, pos: Position) -> Result<(), BufferError> {
        self.buffer.char_offset(pos)?;
        self.cursor = pos;
        Ok(())
    }

    /// Load `text` as the initial content: no commit, history cleared, cursor at the start.
    pub fn reset_text(&mut self, text: &str) {
        self.buffer = TextBuffer::new(text);
        self.history.clear();
        self.cursor = Position::default();
        self.popup = None;
    }

    /// Issue a fresh correlation ticket for a programmatic replacement.
    pub fn issue_ticket(&mut self) -> ReplaceTicket {
        let ticket = ReplaceTicket::new(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);
        ticket
    }

    /// Replace `range` with `text` as one undoable unit tagged with `ticket`.
    pub fn replace_range(
        &mut self,
        range: TextRange,
        text: &str,
        ticket: ReplaceTicket,
    ) -> Result<(), BufferError> {
        let cursor_before = self.cursor_offset();
        let splice = self.buffer.replace(range, text)?;
        self.record_and_commit(splice, EditOrigin::Replace(ticket), cursor_before);
        Ok(())
    }

    /// Execute an input command and notify after-exec listeners.
    ///
    /// Returns whether the buffer changed.
    pub fn execute(&mut self, command: InputCommand) -> Result<bool, BufferError> {
        let changed = match &command {
            InputCommand::InsertText(text) => self.insert_at_cursor(text)?,
            InputCommand::Backspace => self.backspace()?,
            InputCommand::Undo => self.undo()?,
            InputCommand::Redo => self.redo()?,
        };
        self.exec_listeners.emit(&AfterExec { command, changed });
        Ok(changed)
    }

    fn insert_at_cursor(&mut self, text: &str) -> Result<bool, BufferError> {
        if text.is_empty() {
            return Ok(false);
        }
        let cursor_before = self.cursor_offset();
        let range = TextRange::new(self.cursor, self.cursor);
        let splice = self.buffer.replace(range, text)?;
        self.record_and_commit(splice, EditOrigin::User, cursor_before);
        Ok(true)
    }

    fn backspace(&mut self) -> Result<bool, BufferError> {
        let offset = self.buffer.char_offset(self.cursor)?;
        if offset == 0 {
            return Ok(false);
        }
        let start = self.buffer.position_at(offset - 1);
        let splice = self.buffer.replace(TextRange::new(start, self.cursor), "")?;
        self.record_and_commit(splice, EditOrigin::User, offset);
        Ok(true)
    }

    /// Undo the most recent step. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, BufferError> {
        let Some(step) = self.history.pop_undo() else {
            return Ok(false);
        };
        let inverse = step.inverted();
        let cursor_before = self.cursor_offset();
        if let Err(err) = self.buffer.apply(&inverse) {
            self.history.restore_undo(step);
            return Err(err);
        }
        self.history.push_redo(step);
        self.commit(inverse, EditOrigin::History, cursor_before);
        Ok(true)
    }

    /// Redo the most recently undone step. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool, BufferError> {
        let Some(step) = self.history.pop_redo() else {
            return Ok(false);
        };
        let cursor_before = self.cursor_offset();
        if let Err(err) = self.buffer.apply(&step) {
            self.history.restore_redo(step);
            return Err(err);
        }
        self.history.push_undo_replayed(step.clone());
        self.commit(step, EditOrigin::History, cursor_before);
        Ok(true)
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Change how many undo steps are retained.
    pub fn set_undo_limit(&mut self, max_undo: usize) {
        self.history.set_limit(max_undo);
    }

    fn cursor_offset(&self) -> usize {
        self.buffer.char_offset(self.cursor).unwrap_or(0)
    }

    fn record_and_commit(&mut self, splice: Splice, origin: EditOrigin, cursor_before: usize) {
        self.history.record(splice.clone());
        self.commit(splice, origin, cursor_before);
    }

    /// Remap the cursor, close the popup and announce the committed unit.
    fn commit(&mut self, splice: Splice, origin: EditOrigin, cursor_before: usize) {
        self.cursor = self
            .buffer
            .position_at(map_offset_after_splice(cursor_before, &splice));
        self.popup = None;

        let event = CommitEvent {
            unit: ChangeUnit { splice, origin },
            text: self.buffer.text(),
        };
        self.commit_listeners.emit(&event);
    }

    // ------------------------------------------------------------------
    // Markers and breakpoints
    // ------------------------------------------------------------------

    /// Attach a marker.
    pub fn add_marker(&mut self, marker: Marker) -> MarkerId {
        self.markers.add(marker)
    }

    /// Remove a marker. Returns `false` if the handle is unknown.
    pub fn remove_marker(&mut self, id: MarkerId) -> bool {
        self.markers.remove(id)
    }

    /// Currently attached markers.
    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Overwrite the breakpoint annotations.
    pub fn set_breakpoints<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = usize>,
    {
        self.breakpoints.replace(rows);
    }

    /// Annotated rows in ascending order.
    pub fn breakpoints(&self) -> Vec<usize> {
        self.breakpoints.rows()
    }

    /// Returns `true` if `row` carries a breakpoint annotation.
    pub fn has_breakpoint(&self, row: usize) -> bool {
        self.breakpoints.contains(row)
    }

    /// Annotate `row`.
    pub fn set_breakpoint(&mut self, row: usize) -> bool {
        self.breakpoints.insert(row)
    }

    /// Clear the annotation on `row`.
    pub fn clear_breakpoint(&mut self, row: usize) -> bool {
        self.breakpoints.remove(row)
    }

    // ------------------------------------------------------------------
    // Input plumbing
    // ------------------------------------------------------------------

    /// Key bindings.
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Mutable key bindings.
    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    /// Returns `true` if the widget holds input focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Give or take input focus.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Report a pointer press inside the gutter to gutter listeners.
    ///
    /// Listeners run after the borrow of `widget` is released, so they may borrow it mutably.
    /// Returns `false` when the widget is mutably borrowed and the press is dropped.
    pub fn gutter_mouse_down(widget: &RefCell<Self>, event: GutterMouseDown) -> bool {
        let listeners = match widget.try_borrow() {
            Ok(widget) => widget.gutter_events(),
            Err(_) => return false,
        };
        listeners.emit(&event);
        true
    }

    /// Handle to the gutter listener list, for emitting without holding a widget borrow.
    pub fn gutter_events(&self) -> ListenerSet<GutterMouseDown> {
        self.gutter_listeners.clone()
    }

    // ------------------------------------------------------------------
    // Autocompletion
    // ------------------------------------------------------------------

    /// The provider list this widget queries.
    pub fn completers(&self) -> &SharedCompleters {
        &self.completers
    }

    /// Query all installed providers for the prefix at the cursor and open the popup.
    ///
    /// Returns the number of suggestions; the popup stays closed when there are none.
    pub fn start_autocomplete(&mut self) -> Result<usize, CompletionError> {
        let line_text = self.buffer.line_text(self.cursor.line).unwrap_or_default();
        let query = CompletionQuery {
            prefix: identifier_prefix(&line_text, self.cursor.column),
            position: self.cursor,
            line_text,
            text: self.buffer.text(),
        };
        let items = self.completers.collect(&query)?;
        let count = items.len();
        self.popup = (count > 0).then(|| CompletionPopup {
            prefix: query.prefix,
            anchor: query.position,
            items,
        });
        Ok(count)
    }

    /// The open autocompletion popup, if any.
    pub fn popup(&self) -> Option<&CompletionPopup> {
        self.popup.as_ref()
    }

    /// Close the autocompletion popup.
    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Observe every committed edit.
    pub fn on_commit<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CommitEvent) -> Result<(), ListenerError> + 'static,
    {
        self.commit_listeners.subscribe(listener)
    }

    /// Observe executed input commands.
    pub fn on_after_exec<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AfterExec) -> Result<(), ListenerError> + 'static,
    {
        self.exec_listeners.subscribe(listener)
    }

    /// Observe gutter pointer presses.
    pub fn on_gutter_mouse_down<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&GutterMouseDown) -> Result<(), ListenerError> + 'static,
    {
        self.gutter_listeners.subscribe(listener)
    }
}

/// Where a character offset ends up after `splice` was applied.
fn map_offset_after_splice(offset: usize, splice: &Splice) -> usize {
    let end = splice.start + splice.deleted_len();
    if offset < splice.start {
        offset
    } else if offset <= end {
        splice.start + splice.inserted_len()
    } else {
        offset - splice.deleted_len() + splice.inserted_len()
    }
}
