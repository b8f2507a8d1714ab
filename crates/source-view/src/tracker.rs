//! Change tracking and write-back suppression.
//!
//! Every commit of the widget's history passes through a [`ChangeTracker`], which decides
//! whether the new buffer text must be written back to the document. Programmatic replacements
//! that mirror a foreign document update are swallowed through a one-shot [`SuppressionSlot`]
//! keyed by the replacement's [`ReplaceTicket`]:
//!
//! ```text
//!   arm(ticket) ──► [armed: ticket] ──next commit──► [empty]
//!                                        │
//!                      commit.ticket == ticket ? Swallow : Forward
//! ```
//!
//! The slot is cleared by whichever commit comes next, so an armed ticket can never leak onto a
//! later, unrelated edit.

use source_view_core::{ChangeUnit, CommitEvent, ReplaceTicket};
use std::cell::Cell;

/// One-shot suppression keyed by a replacement ticket.
#[derive(Debug, Default)]
pub struct SuppressionSlot {
    armed: Cell<Option<ReplaceTicket>>,
}

impl SuppressionSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Swallow the commit produced by the replacement issued under `ticket`.
    ///
    /// Arming again before a commit replaces the previous ticket.
    pub fn arm(&self, ticket: ReplaceTicket) {
        if let Some(previous) = self.armed.replace(Some(ticket)) {
            tracing::warn!(
                previous = previous.get(),
                ticket = ticket.get(),
                "suppression re-armed before a commit"
            );
        }
    }

    /// Clear the slot without consuming it.
    pub fn disarm(&self) {
        self.armed.set(None);
    }

    /// Returns `true` while a ticket is armed.
    pub fn is_armed(&self) -> bool {
        self.armed.get().is_some()
    }

    /// Consume the slot for a committed unit.
    ///
    /// Always leaves the slot empty. Returns `true` if `unit` carries the armed ticket.
    pub fn consume(&self, unit: &ChangeUnit) -> bool {
        match self.armed.take() {
            Some(ticket) => unit.ticket() == Some(ticket),
            None => false,
        }
    }
}

/// What to do with a committed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackDecision {
    /// Write the buffer text back to the document.
    Forward,
    /// The commit mirrors a document update; do nothing.
    Swallow,
}

/// Classifies history commits for the sync bridge.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    suppression: SuppressionSlot,
    forwarded: Cell<u64>,
    swallowed: Cell<u64>,
}

impl ChangeTracker {
    /// Create a tracker with an empty suppression slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The suppression slot.
    pub fn suppression(&self) -> &SuppressionSlot {
        &self.suppression
    }

    /// Swallow the commit of the replacement issued under `ticket`.
    pub fn suppress_next(&self, ticket: ReplaceTicket) {
        self.suppression.arm(ticket);
    }

    /// Classify a commit. Never fails.
    pub fn track(&self, event: &CommitEvent) -> TrackDecision {
        if self.suppression.consume(&event.unit) {
            self.swallowed.set(self.swallowed.get() + 1);
            tracing::trace!(origin = ?event.unit.origin, "commit swallowed");
            TrackDecision::Swallow
        } else {
            self.forwarded.set(self.forwarded.get() + 1);
            TrackDecision::Forward
        }
    }

    /// Commits forwarded so far.
    pub fn forwarded(&self) -> u64 {
        self.forwarded.get()
    }

    /// Commits swallowed so far.
    pub fn swallowed(&self) -> u64 {
        self.swallowed.get()
    }
}
