use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use source_view_core::{
    CommitEvent, EditOrigin, EditorWidget, InputCommand, Position, TextRange,
};
use std::cell::RefCell;
use std::rc::Rc;

type CommitLog = Rc<RefCell<Vec<CommitEvent>>>;

fn record_commits(widget: &EditorWidget) -> (CommitLog, source_view_core::Subscription) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = Rc::clone(&seen);
    let subscription = widget.on_commit(move |event| {
        seen_clone.borrow_mut().push(event.clone());
        Ok(())
    });
    (seen, subscription)
}

#[test]
fn test_undo_redo_insert_text() {
    let mut widget = EditorWidget::new("");

    widget
        .execute(InputCommand::InsertText("a".to_string()))
        .unwrap();
    assert_eq!(widget.text(), "a");
    assert!(widget.can_undo());
    assert!(!widget.can_redo());

    widget.execute(InputCommand::Undo).unwrap();
    assert_eq!(widget.text(), "");
    assert!(!widget.can_undo());
    assert!(widget.can_redo());

    widget.execute(InputCommand::Redo).unwrap();
    assert_eq!(widget.text(), "a");
    assert!(widget.can_undo());
    assert!(!widget.can_redo());
}

#[test]
fn test_every_commit_is_announced_with_full_text() {
    let mut widget = EditorWidget::new("ab");
    let (seen, _subscription) = record_commits(&widget);

    widget.set_cursor(Position::new(0, 2)).unwrap();
    widget
        .execute(InputCommand::InsertText("c".to_string()))
        .unwrap();
    widget.execute(InputCommand::Backspace).unwrap();
    widget.execute(InputCommand::Undo).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].text, "abc");
    assert_eq!(seen[0].unit.origin, EditOrigin::User);
    assert_eq!(seen[1].text, "ab");
    assert_eq!(seen[2].text, "abc");
    assert_eq!(seen[2].unit.origin, EditOrigin::History);
}

#[test]
fn test_full_range_replace_is_a_single_undo_step() {
    let mut widget = EditorWidget::new("line one\nline two\n");
    let (seen, _subscription) = record_commits(&widget);

    let ticket = widget.issue_ticket();
    let range = widget.full_range();
    assert_eq!(range, TextRange::from_coords(0, 0, 2, 0));
    widget.replace_range(range, "replaced", ticket).unwrap();

    assert_eq!(widget.text(), "replaced");
    assert_eq!(widget.undo_depth(), 1);
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0].unit.ticket(), Some(ticket));

    widget.undo().unwrap();
    assert_eq!(widget.text(), "line one\nline two\n");
}

#[test]
fn test_new_edit_clears_redo() {
    let mut widget = EditorWidget::new("");
    widget
        .execute(InputCommand::InsertText("a".to_string()))
        .unwrap();
    widget.execute(InputCommand::Undo).unwrap();
    assert!(widget.can_redo());

    widget
        .execute(InputCommand::InsertText("b".to_string()))
        .unwrap();
    assert!(!widget.can_redo());
    assert_eq!(widget.text(), "b");
}

#[test]
fn test_reset_text_is_not_an_edit() {
    let mut widget = EditorWidget::new("old");
    let (seen, _subscription) = record_commits(&widget);
    widget
        .execute(InputCommand::InsertText("x".to_string()))
        .unwrap();

    widget.reset_text("fresh\ncontent");
    assert_eq!(widget.text(), "fresh\ncontent");
    assert!(!widget.can_undo());
    assert_eq!(widget.cursor(), Position::new(0, 0));
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_undo_limit_is_respected() {
    let mut widget = EditorWidget::new("");
    widget.set_undo_limit(2);
    for ch in ["a", "b", "c"] {
        widget
            .execute(InputCommand::InsertText(ch.to_string()))
            .unwrap();
    }
    assert_eq!(widget.undo_depth(), 2);
    widget.undo().unwrap();
    widget.undo().unwrap();
    assert!(!widget.undo().unwrap());
    assert_eq!(widget.text(), "a");
}

#[test]
fn test_tickets_are_unique() {
    let mut widget = EditorWidget::new("");
    let first = widget.issue_ticket();
    let second = widget.issue_ticket();
    assert_ne!(first, second);
}

#[test]
fn test_random_edits_match_snapshot_history() {
    let mut widget = EditorWidget::new("seed\n");
    let mut rng = StdRng::seed_from_u64(0x0dd_ba11);
    let alphabet: Vec<char> = "ab \n;(".chars().collect();

    let mut expected: Vec<char> = "seed\n".chars().collect();
    let mut undo: Vec<Vec<char>> = Vec::new();
    let mut redo: Vec<Vec<char>> = Vec::new();

    for step in 0..500 {
        match rng.gen_range(0..10) {
            0..=4 => {
                let offset = rng.gen_range(0..=expected.len());
                let ch = alphabet[rng.gen_range(0..alphabet.len())];
                let pos = widget.buffer().position_at(offset);
                widget.set_cursor(pos).unwrap();
                widget
                    .execute(InputCommand::InsertText(ch.to_string()))
                    .unwrap();

                undo.push(expected.clone());
                redo.clear();
                expected.insert(offset, ch);
            }
            5 | 6 => {
                let offset = rng.gen_range(0..=expected.len());
                let pos = widget.buffer().position_at(offset);
                widget.set_cursor(pos).unwrap();
                let changed = widget.execute(InputCommand::Backspace).unwrap();
                assert_eq!(changed, offset > 0, "backspace at step {step}");

                if offset > 0 {
                    undo.push(expected.clone());
                    redo.clear();
                    expected.remove(offset - 1);
                }
            }
            7 | 8 => {
                let changed = widget.execute(InputCommand::Undo).unwrap();
                assert_eq!(changed, !undo.is_empty(), "undo at step {step}");
                if let Some(previous) = undo.pop() {
                    redo.push(std::mem::replace(&mut expected, previous));
                }
            }
            _ => {
                let changed = widget.execute(InputCommand::Redo).unwrap();
                assert_eq!(changed, !redo.is_empty(), "redo at step {step}");
                if let Some(next) = redo.pop() {
                    undo.push(std::mem::replace(&mut expected, next));
                }
            }
        }

        assert_eq!(
            widget.text(),
            expected.iter().collect::<String>(),
            "diverged at step {step}"
        );
        assert_eq!(widget.undo_depth(), undo.len());
        assert_eq!(widget.redo_depth(), redo.len());
    }
}
