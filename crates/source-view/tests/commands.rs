use pretty_assertions::assert_eq;
use source_view::{
    CommandDescriptor, CommandError, CommandRouter, FORMAT, Services, Shortcut, SourceView,
    SourceViewOptions,
};
use source_view_core::{Document, DocumentInfo, EditorWidget, KeyChord, Modifiers, Platform};
use std::cell::RefCell;
use std::rc::Rc;

const COMMANDS: &str = r#"[
    { "id": "FORMAT", "shortcuts": { "mac": { "key": "Command+Shift+F" }, "other": { "key": "Ctrl+Shift+F" } } },
    { "id": "RUN", "shortcuts": { "mac": { "key": "Command+R" }, "other": { "key": "Ctrl+R" } } },
    { "id": "SAVE_ALL" }
]"#;

fn attach(router: &Rc<CommandRouter>) -> (SourceView, Rc<RefCell<EditorWidget>>) {
    let widget = Rc::new(RefCell::new(EditorWidget::new("")));
    let view = SourceView::attach(
        Rc::clone(&widget),
        Document::shared(DocumentInfo::new("main.bal", "/tmp/project", "demo"), "x=1;"),
        Rc::clone(router),
        Services::default(),
        SourceViewOptions::default().with_platform(Platform::Other),
    )
    .unwrap();
    (view, widget)
}

fn router() -> Rc<CommandRouter> {
    CommandRouter::shared(CommandDescriptor::list_from_json(COMMANDS).unwrap())
}

#[test]
fn test_only_commands_with_shortcuts_are_bound() {
    let router = router();
    let (view, widget) = attach(&router);

    assert_eq!(
        view.bound_commands(),
        vec![FORMAT.to_string(), "RUN".to_string()]
    );
    assert_eq!(widget.borrow().keymap().len(), 2);
    assert!(widget.borrow().keymap().get("SAVE_ALL").is_none());
}

#[test]
fn test_bound_command_without_handler_reports_error() {
    let router = router();
    let (view, _widget) = attach(&router);

    let chord = KeyChord::with_char(Modifiers::CTRL, 'r');
    assert!(matches!(
        view.handle_key(chord),
        Err(CommandError::NoHandler(id)) if id == "RUN"
    ));
}

#[test]
fn test_unbound_chord_is_ignored() {
    let router = router();
    let (view, _widget) = attach(&router);

    let chord = KeyChord::with_char(Modifiers::CTRL, 'q');
    assert!(view.handle_key(chord).unwrap().is_none());
}

#[test]
fn test_host_handler_runs_on_shortcut() {
    let router = router();
    let (view, _widget) = attach(&router);
    let runs = Rc::new(RefCell::new(0));
    let runs_clone = Rc::clone(&runs);
    let _run = router.register_handler("RUN", "debugger", move || {
        *runs_clone.borrow_mut() += 1;
        source_view::CommandOutcome::Done
    });

    let outcome = view
        .handle_key(KeyChord::with_char(Modifiers::CTRL, 'r'))
        .unwrap()
        .unwrap();

    assert!(!outcome.is_pending());
    assert_eq!(*runs.borrow(), 1);
}

#[test]
fn test_each_view_registers_and_releases_its_format_handler() {
    let router = router();
    let (left, _left_widget) = attach(&router);
    let (right, right_widget) = attach(&router);

    assert_eq!(
        router.owners(FORMAT),
        vec![left.view_id().to_string(), right.view_id().to_string()]
    );

    right.detach();
    assert_eq!(router.owners(FORMAT), vec![left.view_id().to_string()]);
    assert!(right_widget.borrow().keymap().is_empty());
}

#[test]
fn test_descriptor_without_shortcut_has_no_binding() {
    let descriptor = CommandDescriptor::unbound("SAVE_ALL");
    assert_eq!(descriptor.shortcut, Shortcut::NoShortcut);
    assert!(descriptor.binding().unwrap().is_none());
}
