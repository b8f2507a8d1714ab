use source_view_core::{
    ChangeOrigin, ContentModified, Document, DocumentInfo, ListenerError, ViewId,
};
use std::cell::RefCell;
use std::rc::Rc;

fn document(content: &str) -> Rc<Document> {
    Document::shared(DocumentInfo::new("main.bal", "/tmp/project", "demo"), content)
}

#[test]
fn test_set_content_notifies_with_origin_and_title() {
    let doc = document("a");
    let seen = Rc::new(RefCell::new(Vec::<ContentModified>::new()));
    let seen_clone = Rc::clone(&seen);
    let _subscription = doc.on_content_modified(move |event| {
        seen_clone.borrow_mut().push(event.clone());
        Ok(())
    });

    let view = ViewId::next();
    assert!(doc.set_content("b", ChangeOrigin::SourceModified { view }));
    assert!(doc.set_content("c", ChangeOrigin::foreign("Design view edit")));

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].old_content, "a");
    assert_eq!(seen[0].new_content, "b");
    assert_eq!(seen[0].title, "Modify source");
    assert!(seen[0].origin.is_from_view(view));
    assert_eq!(seen[1].title, "Design view edit");
    assert!(!seen[1].origin.is_from_view(view));
    assert_eq!(seen[1].version, 2);
    assert_eq!(doc.content(), "c");
}

#[test]
fn test_unchanged_write_is_dropped() {
    let doc = document("same");
    let calls = Rc::new(RefCell::new(0));
    let calls_clone = Rc::clone(&calls);
    let _subscription = doc.on_content_modified(move |_| {
        *calls_clone.borrow_mut() += 1;
        Ok(())
    });

    assert!(!doc.set_content("same", ChangeOrigin::foreign("reload")));
    assert_eq!(*calls.borrow(), 0);
    assert_eq!(doc.version(), 0);
}

#[test]
fn test_listener_error_does_not_break_other_listeners() {
    let doc = document("");
    let reached = Rc::new(RefCell::new(false));

    let _failing = doc.on_content_modified(|_| Err(ListenerError::new("listener exploded")));
    let reached_clone = Rc::clone(&reached);
    let _ok = doc.on_content_modified(move |_| {
        *reached_clone.borrow_mut() = true;
        Ok(())
    });

    doc.set_content("x", ChangeOrigin::foreign("reload"));
    assert!(*reached.borrow());
}

#[test]
fn test_listener_may_write_back_reentrantly() {
    let doc = document("");
    let weak = Rc::downgrade(&doc);
    let _normalizer = doc.on_content_modified(move |event| {
        if let Some(doc) = weak.upgrade()
            && event.new_content.ends_with(' ')
        {
            doc.set_content(event.new_content.trim_end(), ChangeOrigin::foreign("trim"));
        }
        Ok(())
    });

    doc.set_content("value   ", ChangeOrigin::foreign("typing"));
    assert_eq!(doc.content(), "value");
    assert_eq!(doc.version(), 2);
}

#[test]
fn test_metadata_accessors() {
    let doc = document("");
    assert_eq!(doc.name(), "main.bal");
    assert_eq!(doc.path(), "/tmp/project");
    assert_eq!(doc.package_name(), "demo");
    assert_eq!(doc.listener_count(), 0);
}
