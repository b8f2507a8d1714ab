//! Debugger overlays: the execution marker and gutter breakpoints.
//!
//! Both overlays are derived state. They are reconciled from the host's target values by full
//! replacement, never patched incrementally.

use source_view_core::{EditorWidget, GutterMouseDown, GutterTarget, Marker, MarkerId, TextRange};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Receiver of breakpoint toggles made in the gutter.
///
/// Line numbers are 1-based.
pub trait BreakpointSink {
    /// A breakpoint was set on `line`.
    fn add_breakpoint(&self, line: usize);
    /// The breakpoint on `line` was cleared.
    fn remove_breakpoint(&self, line: usize);
}

/// A [`BreakpointSink`] built from two closures.
pub struct BreakpointCallbacks {
    add: Box<dyn Fn(usize)>,
    remove: Box<dyn Fn(usize)>,
}

impl BreakpointCallbacks {
    /// Wrap the add/remove callbacks.
    pub fn new(add: impl Fn(usize) + 'static, remove: impl Fn(usize) + 'static) -> Self {
        Self {
            add: Box::new(add),
            remove: Box::new(remove),
        }
    }
}

impl BreakpointSink for BreakpointCallbacks {
    fn add_breakpoint(&self, line: usize) {
        (self.add)(line)
    }

    fn remove_breakpoint(&self, line: usize) {
        (self.remove)(line)
    }
}

impl fmt::Debug for BreakpointCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreakpointCallbacks").finish_non_exhaustive()
    }
}

/// Exclusive owner of the single live instance of an overlay.
///
/// The handle is swapped wholesale; the previous value is handed back so its owner can remove
/// it from the widget.
#[derive(Debug)]
pub struct CurrentOverlayHandle<T> {
    current: Option<T>,
}

impl<T> CurrentOverlayHandle<T> {
    /// An empty handle.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// The live value, if any.
    pub fn get(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Install `value`, returning the previous one.
    pub fn replace(&mut self, value: T) -> Option<T> {
        self.current.replace(value)
    }

    /// Empty the handle, returning the previous value.
    pub fn take(&mut self) -> Option<T> {
        self.current.take()
    }
}

impl<T> Default for CurrentOverlayHandle<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a gutter interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointToggle {
    /// A breakpoint was added on the 0-based `row`.
    Added {
        /// Toggled row.
        row: usize,
    },
    /// The breakpoint on the 0-based `row` was removed.
    Removed {
        /// Toggled row.
        row: usize,
    },
}

/// Reconciles the execution marker and breakpoints against host state.
pub struct OverlayManager {
    marker_class: String,
    execution: RefCell<CurrentOverlayHandle<MarkerId>>,
    sink: Option<Rc<dyn BreakpointSink>>,
}

impl OverlayManager {
    /// Create a manager drawing the execution marker with `marker_class`.
    pub fn new(marker_class: impl Into<String>, sink: Option<Rc<dyn BreakpointSink>>) -> Self {
        Self {
            marker_class: marker_class.into(),
            execution: RefCell::new(CurrentOverlayHandle::new()),
            sink,
        }
    }

    /// Handle of the live execution marker.
    pub fn execution_marker(&self) -> Option<MarkerId> {
        self.execution.borrow().get().copied()
    }

    /// Move the execution marker to `target`.
    ///
    /// The old marker is always removed first. A new one covering the whole line is added when
    /// `target` is present and greater than zero.
    pub fn reconcile_execution_point(&self, widget: &mut EditorWidget, target: Option<usize>) {
        let mut handle = self.execution.borrow_mut();
        if let Some(previous) = handle.take() {
            widget.remove_marker(previous);
        }

        let Some(line) = target.filter(|line| *line > 0) else {
            return;
        };
        let Some(line_len) = widget.line_len(line) else {
            tracing::debug!(line, "execution point outside the buffer, no marker drawn");
            return;
        };
        let range = TextRange::from_coords(line, 0, line, line_len);
        handle.replace(widget.add_marker(Marker::line(range, self.marker_class.clone())));
    }

    /// Remove the execution marker, if any.
    pub fn clear_execution_point(&self, widget: &mut EditorWidget) {
        self.reconcile_execution_point(widget, None);
    }

    /// Overwrite the widget's breakpoint annotations with `target` (0-based rows).
    pub fn reconcile_breakpoints(&self, widget: &mut EditorWidget, target: &[usize]) {
        widget.set_breakpoints(target.iter().copied());
    }

    /// Toggle the breakpoint under a gutter press and report it to the sink.
    ///
    /// The widget is only borrowed while the annotation changes. The sink runs afterwards, so it
    /// may push new overlay state into the same widget.
    pub fn on_gutter_interaction(
        &self,
        widget: &RefCell<EditorWidget>,
        event: GutterMouseDown,
    ) -> Option<BreakpointToggle> {
        let toggle = {
            let Ok(mut widget) = widget.try_borrow_mut() else {
                tracing::debug!(row = event.row, "widget busy, gutter press dropped");
                return None;
            };
            self.toggle_breakpoint(&mut widget, event)?
        };
        self.report(toggle);
        Some(toggle)
    }

    /// Flip the breakpoint annotation under a gutter press without notifying the sink.
    ///
    /// Ignored unless the press hit a line-number cell of a focused widget.
    pub fn toggle_breakpoint(
        &self,
        widget: &mut EditorWidget,
        event: GutterMouseDown,
    ) -> Option<BreakpointToggle> {
        if event.target != GutterTarget::Cell || !widget.is_focused() {
            return None;
        }

        let row = event.row;
        if widget.clear_breakpoint(row) {
            Some(BreakpointToggle::Removed { row })
        } else {
            widget.set_breakpoint(row);
            Some(BreakpointToggle::Added { row })
        }
    }

    /// Tell the sink about `toggle`, using 1-based lines.
    pub fn report(&self, toggle: BreakpointToggle) {
        match toggle {
            BreakpointToggle::Added { row } => {
                tracing::debug!(line = row + 1, "breakpoint added");
                if let Some(sink) = &self.sink {
                    sink.add_breakpoint(row + 1);
                }
            }
            BreakpointToggle::Removed { row } => {
                tracing::debug!(line = row + 1, "breakpoint removed");
                if let Some(sink) = &self.sink {
                    sink.remove_breakpoint(row + 1);
                }
            }
        }
    }
}

impl fmt::Debug for OverlayManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayManager")
            .field("marker_class", &self.marker_class)
            .field("execution", &self.execution_marker())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
