//! Gutter state: breakpoint annotations and gutter pointer events.

use std::collections::BTreeSet;

/// Rows (zero-based) carrying a breakpoint annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakpointSet {
    rows: BTreeSet<usize>,
}

impl BreakpointSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the set with `rows`.
    pub fn replace<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = usize>,
    {
        self.rows = rows.into_iter().collect();
    }

    /// Annotate `row`. Returns `false` if it was already annotated.
    pub fn insert(&mut self, row: usize) -> bool {
        self.rows.insert(row)
    }

    /// Clear the annotation on `row`. Returns `false` if there was none.
    pub fn remove(&mut self, row: usize) -> bool {
        self.rows.remove(&row)
    }

    /// Returns `true` if `row` is annotated.
    pub fn contains(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    /// Annotated rows in ascending order.
    pub fn rows(&self) -> Vec<usize> {
        self.rows.iter().copied().collect()
    }

    /// Number of annotated rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no row is annotated.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Which part of the gutter a pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GutterTarget {
    /// A line-number cell.
    Cell,
    /// Fold widgets, padding or any other gutter chrome.
    Other,
}

/// A pointer press inside the gutter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GutterMouseDown {
    /// Zero-based document row under the pointer.
    pub row: usize,
    /// Gutter element under the pointer.
    pub target: GutterTarget,
}

impl GutterMouseDown {
    /// A press on the line-number cell of `row`.
    pub fn on_cell(row: usize) -> Self {
        Self {
            row,
            target: GutterTarget::Cell,
        }
    }
}
