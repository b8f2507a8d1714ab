//! Marker annotations.
//!
//! Markers are UI-facing highlights anchored to a [`TextRange`] without modifying the text, such
//! as the current execution point of a debugger. The host renders them; the widget only keeps
//! track of which markers exist and hands out stable ids.

use crate::text::TextRange;
use std::collections::BTreeMap;

/// Opaque marker handle returned by [`MarkerSet::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(u64);

impl MarkerId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// How a marker is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Full-width line highlight.
    Line,
    /// Highlight limited to the covered text.
    Text,
}

/// A single marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Anchor range.
    pub range: TextRange,
    /// Host-defined style class (e.g. `"debug-point-hit"`).
    pub class: String,
    /// Drawing kind.
    pub kind: MarkerKind,
    /// Draw above the text layer instead of behind it.
    pub in_front: bool,
}

impl Marker {
    /// A front-layer line marker covering `range`.
    pub fn line(range: TextRange, class: impl Into<String>) -> Self {
        Self {
            range,
            class: class.into(),
            kind: MarkerKind::Line,
            in_front: true,
        }
    }
}

/// The markers currently attached to a widget.
#[derive(Debug, Default)]
pub struct MarkerSet {
    next_id: u64,
    markers: BTreeMap<MarkerId, Marker>,
}

impl MarkerSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a marker and return its handle. Handles are never reused.
    pub fn add(&mut self, marker: Marker) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.markers.insert(id, marker);
        id
    }

    /// Remove a marker. Returns `false` for unknown (or already removed) handles.
    pub fn remove(&mut self, id: MarkerId) -> bool {
        self.markers.remove(&id).is_some()
    }

    /// Look up a marker by handle.
    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(&id)
    }

    /// Number of attached markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns `true` if no marker is attached.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Iterate markers in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (MarkerId, &Marker)> {
        self.markers.iter().map(|(id, marker)| (*id, marker))
    }

    /// Markers carrying the given style class.
    pub fn with_class<'a>(
        &'a self,
        class: &'a str,
    ) -> impl Iterator<Item = (MarkerId, &'a Marker)> {
        self.iter().filter(move |(_, marker)| marker.class == class)
    }
}
