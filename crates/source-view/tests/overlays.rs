use pretty_assertions::assert_eq;
use source_view::{
    BreakpointCallbacks, BreakpointSink, CommandRouter, Services, SourceView, SourceViewOptions,
    ViewProps,
};
use source_view_core::{
    Document, DocumentInfo, EditorWidget, GutterMouseDown, GutterTarget, MarkerKind, TextRange,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

const PROGRAM: &str = "import ballerina/io;\n\npublic function main() {\n    int x = 1;\n    io:println(x);\n    x += 1;\n}\n";

type Calls = Rc<RefCell<Vec<(&'static str, usize)>>>;

fn attach() -> (SourceView, Rc<RefCell<EditorWidget>>, Calls) {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let add = Rc::clone(&calls);
    let remove = Rc::clone(&calls);
    let sink = BreakpointCallbacks::new(
        move |line| add.borrow_mut().push(("add", line)),
        move |line| remove.borrow_mut().push(("remove", line)),
    );

    let widget = Rc::new(RefCell::new(EditorWidget::new("")));
    let view = SourceView::attach(
        Rc::clone(&widget),
        Document::shared(DocumentInfo::new("main.bal", "/tmp/project", "demo"), PROGRAM),
        CommandRouter::shared(Vec::new()),
        Services::default().with_breakpoint_sink(Rc::new(sink)),
        SourceViewOptions::default(),
    )
    .unwrap();
    (view, widget, calls)
}

fn paused_at(line: usize) -> ViewProps {
    ViewProps {
        parse_failed: true,
        debug_hit: Some(line),
        ..ViewProps::default()
    }
}

#[test]
fn test_execution_point_is_idempotent() {
    let (view, widget, _) = attach();

    assert!(view.update_props(&paused_at(5)).is_none());
    let first = view.overlays().execution_marker().unwrap();
    assert!(view.update_props(&paused_at(5)).is_none());
    let second = view.overlays().execution_marker().unwrap();

    let widget = widget.borrow();
    assert_eq!(widget.markers().len(), 1);
    assert_ne!(first, second);
    assert!(widget.markers().get(first).is_none());

    let marker = widget.markers().get(second).unwrap();
    assert_eq!(marker.range, TextRange::from_coords(5, 0, 5, 11));
    assert_eq!(marker.class, "debug-point-hit");
    assert_eq!(marker.kind, MarkerKind::Line);
    assert!(marker.in_front);
}

#[test]
fn test_execution_point_moves_and_clears() {
    let (view, widget, _) = attach();

    let _ = view.update_props(&paused_at(3));
    let _ = view.update_props(&paused_at(4));
    {
        let widget = widget.borrow();
        let lines: Vec<usize> = widget
            .markers()
            .with_class("debug-point-hit")
            .map(|(_, marker)| marker.range.start.line)
            .collect();
        assert_eq!(lines, vec![4]);
    }

    let _ = view.update_props(&ViewProps {
        parse_failed: true,
        ..ViewProps::default()
    });
    assert!(widget.borrow().markers().is_empty());
    assert_eq!(view.overlays().execution_marker(), None);
}

#[test]
fn test_breakpoints_are_overwritten() {
    let (view, widget, _) = attach();

    let _ = view.update_props(&ViewProps {
        parse_failed: true,
        breakpoints: vec![4, 1],
        debug_hit: None,
    });
    assert_eq!(widget.borrow().breakpoints(), vec![1, 4]);

    let _ = view.update_props(&ViewProps {
        parse_failed: true,
        breakpoints: vec![2],
        debug_hit: None,
    });
    assert_eq!(widget.borrow().breakpoints(), vec![2]);
}

#[test]
fn test_gutter_toggle_round_trips() {
    let (view, widget, calls) = attach();
    widget.borrow_mut().set_focused(true);
    let _ = view.update_props(&ViewProps {
        parse_failed: true,
        breakpoints: vec![1],
        debug_hit: None,
    });

    view.gutter_mouse_down(GutterMouseDown::on_cell(3));
    assert_eq!(widget.borrow().breakpoints(), vec![1, 3]);
    view.gutter_mouse_down(GutterMouseDown::on_cell(3));
    assert_eq!(widget.borrow().breakpoints(), vec![1]);

    assert_eq!(*calls.borrow(), vec![("add", 4), ("remove", 4)]);
}

#[test]
fn test_gutter_press_needs_focus_and_cell() {
    let (view, widget, calls) = attach();

    view.gutter_mouse_down(GutterMouseDown::on_cell(2));
    widget.borrow_mut().set_focused(true);
    view.gutter_mouse_down(GutterMouseDown {
        row: 2,
        target: GutterTarget::Other,
    });

    assert!(widget.borrow().breakpoints().is_empty());
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_detach_removes_execution_marker() {
    let (view, widget, _) = attach();
    let _ = view.update_props(&paused_at(2));
    assert_eq!(widget.borrow().markers().len(), 1);

    drop(view);
    assert!(widget.borrow().markers().is_empty());
}

#[test]
fn test_execution_point_past_last_line_is_not_drawn() {
    let (view, widget, _) = attach();
    let _ = view.update_props(&paused_at(2));
    let _ = view.update_props(&paused_at(40));

    assert!(widget.borrow().markers().is_empty());
    assert_eq!(view.overlays().execution_marker(), None);
}

#[test]
fn test_gutter_press_through_widget_api_toggles() {
    let (_view, widget, calls) = attach();
    widget.borrow_mut().set_focused(true);

    assert!(EditorWidget::gutter_mouse_down(
        &widget,
        GutterMouseDown::on_cell(1)
    ));

    assert_eq!(widget.borrow().breakpoints(), vec![1]);
    assert_eq!(*calls.borrow(), vec![("add", 2)]);
}

/// Debugger front end that mirrors every toggle back into the view, the way a host re-renders.
#[derive(Default)]
struct MirroringDebugger {
    lines: RefCell<Vec<usize>>,
    view: RefCell<Weak<SourceView>>,
}

impl MirroringDebugger {
    fn push_props(&self) {
        let Some(view) = self.view.borrow().upgrade() else {
            return;
        };
        let breakpoints = self.lines.borrow().iter().map(|line| line - 1).collect();
        let _ = view.update_props(&ViewProps {
            parse_failed: true,
            breakpoints,
            debug_hit: Some(1),
        });
    }
}

impl BreakpointSink for MirroringDebugger {
    fn add_breakpoint(&self, line: usize) {
        self.lines.borrow_mut().push(line);
        self.push_props();
    }

    fn remove_breakpoint(&self, line: usize) {
        self.lines.borrow_mut().retain(|existing| *existing != line);
        self.push_props();
    }
}

#[test]
fn test_sink_can_push_props_while_handling_a_toggle() {
    let debugger = Rc::new(MirroringDebugger::default());
    let widget = Rc::new(RefCell::new(EditorWidget::new("")));
    let view = Rc::new(
        SourceView::attach(
            Rc::clone(&widget),
            Document::shared(DocumentInfo::new("main.bal", "/tmp/project", "demo"), PROGRAM),
            CommandRouter::shared(Vec::new()),
            Services::default().with_breakpoint_sink(debugger.clone()),
            SourceViewOptions::default(),
        )
        .unwrap(),
    );
    *debugger.view.borrow_mut() = Rc::downgrade(&view);
    widget.borrow_mut().set_focused(true);

    view.gutter_mouse_down(GutterMouseDown::on_cell(4));
    assert_eq!(*debugger.lines.borrow(), vec![5]);
    assert_eq!(widget.borrow().breakpoints(), vec![4]);
    assert!(view.overlays().execution_marker().is_some());

    view.gutter_mouse_down(GutterMouseDown::on_cell(4));
    assert!(debugger.lines.borrow().is_empty());
    assert!(widget.borrow().breakpoints().is_empty());
}
