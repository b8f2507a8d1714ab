//! Headless sync example
//!
//! Attaches a source view to a shared document, edits from both sides, pauses a fake
//! debugger and formats the document through the FORMAT shortcut.

use source_view::{
    BoxFutureLocal, BreakpointCallbacks, CommandDescriptor, CommandRouter, FORMAT,
    FormatPipeline, ParseError, Services, Shortcut, SourceParser, SourceView, SourceViewOptions,
    ViewProps,
};
use source_view_core::{
    ChangeOrigin, Document, DocumentInfo, EditorWidget, GutterMouseDown, InputCommand, KeyChord,
    Modifiers, Platform, Position,
};
use std::cell::RefCell;
use std::rc::Rc;

/// "Parses" a document into its lines.
struct LineParser;

impl SourceParser for LineParser {
    type Tree = Vec<String>;

    fn parse<'a>(
        &'a self,
        document: &'a Document,
    ) -> BoxFutureLocal<'a, Result<Vec<String>, ParseError>> {
        Box::pin(async move {
            let content = document.content();
            if content.contains('\t') {
                return Err(ParseError::new("tabs are not allowed"));
            }
            Ok(content.lines().map(str::to_string).collect())
        })
    }
}

fn trim_lines(lines: &mut Vec<String>) {
    for line in lines.iter_mut() {
        line.truncate(line.trim_end().len());
    }
}

fn join_lines(lines: &Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("=== Source view sync example ===\n");

    let document = Document::shared(
        DocumentInfo::new("main.bal", "/tmp/demo", "demo"),
        "public function main() {   \n    int x = 1;  \n}\n",
    );
    let router = CommandRouter::shared(vec![CommandDescriptor::new(
        FORMAT,
        Shortcut::new("Command+Shift+F", "Ctrl+Shift+F"),
    )]);
    let breakpoints = BreakpointCallbacks::new(
        |line| println!("  debugger: add breakpoint at line {line}"),
        |line| println!("  debugger: remove breakpoint at line {line}"),
    );

    let widget = Rc::new(RefCell::new(EditorWidget::new("")));
    let view = SourceView::attach(
        Rc::clone(&widget),
        Rc::clone(&document),
        Rc::clone(&router),
        Services::default()
            .with_formatter(FormatPipeline::new(LineParser, trim_lines, join_lines))
            .with_breakpoint_sink(Rc::new(breakpoints)),
        SourceViewOptions::default().with_platform(Platform::Other),
    )
    .expect("attach source view");

    // 1. Typing in the widget is written back to the document.
    println!("1. Typing in the source view:");
    view.edit(|widget| widget.set_cursor(Position::new(1, 14)))
        .expect("widget is free")
        .expect("cursor in range");
    view.execute(InputCommand::InsertText("// one".to_string()))
        .expect("insert");
    println!("  document v{}:\n{}", document.version(), document.content());

    // 2. A foreign writer replaces the buffer in one undoable step.
    println!("2. Design view rewrites the document:");
    document.set_content(
        "public function main() {   \n    int y = 2;\t\n}\n",
        ChangeOrigin::foreign("Design view edit"),
    );
    println!("  buffer:\n{}", widget.borrow().text());

    // 3. Formatting fails on tabs and leaves everything alone.
    println!("3. Format with a tab in the source:");
    match view.format().await {
        Ok(()) => println!("  formatted"),
        Err(err) => println!("  format failed: {err}"),
    }

    // 4. Undo the foreign write, then format through the shortcut.
    println!("4. Undo, then Ctrl+Shift+F:");
    view.execute(InputCommand::Undo).expect("undo");
    let chord = KeyChord::with_char(Modifiers::CTRL | Modifiers::SHIFT, 'f');
    if let Some(outcome) = view.handle_key(chord).expect("FORMAT handler") {
        outcome.finish().await;
    }
    println!("  document v{}:\n{}", document.version(), document.content());

    // 5. Debugger overlays.
    println!("5. Debugger paused at line 1:");
    let _ = view.update_props(&ViewProps {
        parse_failed: true,
        breakpoints: vec![2],
        debug_hit: Some(1),
    });
    widget.borrow_mut().set_focused(true);
    view.gutter_mouse_down(GutterMouseDown::on_cell(0));
    {
        let widget = widget.borrow();
        println!("  breakpoints: {:?}", widget.breakpoints());
        for (_, marker) in widget.markers().with_class("debug-point-hit") {
            println!("  execution marker: {:?}", marker.range);
        }
    }

    let widget = view.detach();
    println!("\nDetached; markers left: {}", widget.borrow().markers().len());
}
