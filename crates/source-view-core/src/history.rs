//! Undo/redo history and the change units it records.
//!
//! Every edit that reaches the buffer is committed as exactly one [`ChangeUnit`]. The unit carries
//! the applied [`Splice`] plus an [`EditOrigin`] classifying where the edit came from, so commit
//! observers can tell typed input apart from programmatic replacements and history replays.

use crate::text::Splice;
use std::collections::VecDeque;

/// Correlation id attached to a programmatic replacement.
///
/// Tickets are issued by [`EditorWidget::issue_ticket`](crate::EditorWidget::issue_ticket) and are
/// unique per widget. Commit observers use them to recognize the replacement they asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplaceTicket(u64);

impl ReplaceTicket {
    /// Create a ticket from a raw id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Where a committed edit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    /// Typed input (insert, backspace, ...).
    User,
    /// Programmatic range replacement, tagged with the ticket it was issued under.
    Replace(ReplaceTicket),
    /// Undo or redo replay.
    History,
}

/// One undoable edit, consumed by commit observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeUnit {
    /// The splice that was applied to the buffer.
    pub splice: Splice,
    /// Origin classification.
    pub origin: EditOrigin,
}

impl ChangeUnit {
    /// The replacement ticket, if this unit was a programmatic replacement.
    pub fn ticket(&self) -> Option<ReplaceTicket> {
        match self.origin {
            EditOrigin::Replace(ticket) => Some(ticket),
            EditOrigin::User | EditOrigin::History => None,
        }
    }
}

/// Linear, bounded undo/redo stacks.
#[derive(Debug)]
pub struct UndoHistory {
    undo_stack: VecDeque<Splice>,
    redo_stack: Vec<Splice>,
    max_undo: usize,
}

impl UndoHistory {
    /// Default number of retained undo steps.
    pub const DEFAULT_LIMIT: usize = 1000;

    /// Create an empty history retaining at most `max_undo` steps.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
        }
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Maximum number of retained undo steps.
    pub fn limit(&self) -> usize {
        self.max_undo
    }

    /// Change the retention limit, dropping the oldest steps if needed.
    pub fn set_limit(&mut self, max_undo: usize) {
        self.max_undo = max_undo.max(1);
        while self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
        }
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Record a fresh edit. Clears the redo stack.
    pub fn record(&mut self, splice: Splice) {
        self.redo_stack.clear();
        if self.undo_stack.len() >= self.max_undo {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(splice);
    }

    pub(crate) fn pop_undo(&mut self) -> Option<Splice> {
        self.undo_stack.pop_back()
    }

    pub(crate) fn restore_undo(&mut self, splice: Splice) {
        self.undo_stack.push_back(splice);
    }

    pub(crate) fn pop_redo(&mut self) -> Option<Splice> {
        self.redo_stack.pop()
    }

    pub(crate) fn restore_redo(&mut self, splice: Splice) {
        self.redo_stack.push(splice);
    }

    /// Move an undone step onto the redo stack.
    pub(crate) fn push_redo(&mut self, splice: Splice) {
        self.redo_stack.push(splice);
    }

    /// Move a redone step back onto the undo stack without touching the redo stack.
    pub(crate) fn push_undo_replayed(&mut self, splice: Splice) {
        if self.undo_stack.len() >= self.max_undo {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(splice);
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splice(start: usize, inserted: &str) -> Splice {
        Splice {
            start,
            deleted_text: String::new(),
            inserted_text: inserted.to_string(),
        }
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = UndoHistory::new(10);
        history.record(splice(0, "a"));
        let step = history.pop_undo().unwrap();
        history.push_redo(step);
        assert!(history.can_redo());

        history.record(splice(0, "b"));
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_limit_drops_oldest_steps() {
        let mut history = UndoHistory::new(2);
        history.record(splice(0, "a"));
        history.record(splice(1, "b"));
        history.record(splice(2, "c"));
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.pop_undo().unwrap().inserted_text, "c");
        assert_eq!(history.pop_undo().unwrap().inserted_text, "b");
        assert!(history.pop_undo().is_none());
    }
}
