use source_view_core::{
    Key, KeyBinding, KeyChord, KeyParseError, Keymap, Modifiers, Platform,
};

#[test]
fn test_parse_descriptor_shortcuts() {
    let mac: KeyChord = "Command+S".parse().unwrap();
    assert_eq!(mac, KeyChord::with_char(Modifiers::COMMAND, 's'));

    let other: KeyChord = "Ctrl+S".parse().unwrap();
    assert_eq!(other, KeyChord::with_char(Modifiers::CTRL, 's'));

    let dashed: KeyChord = "ctrl-shift-f".parse().unwrap();
    assert_eq!(
        dashed,
        KeyChord::with_char(Modifiers::CTRL | Modifiers::SHIFT, 'f')
    );
}

#[test]
fn test_parse_named_and_function_keys() {
    let chord: KeyChord = "Alt+F12".parse().unwrap();
    assert_eq!(chord, KeyChord::new(Modifiers::ALT, Key::F(12)));

    let chord: KeyChord = "Option+Enter".parse().unwrap();
    assert_eq!(chord, KeyChord::new(Modifiers::ALT, Key::Enter));

    let chord: KeyChord = "Ctrl++".parse().unwrap();
    assert_eq!(chord, KeyChord::new(Modifiers::CTRL, Key::Char('+')));
}

#[test]
fn test_parse_errors() {
    assert_eq!("".parse::<KeyChord>(), Err(KeyParseError::Empty));
    assert_eq!(
        "Hyper+S".parse::<KeyChord>(),
        Err(KeyParseError::UnknownModifier("Hyper".to_string()))
    );
    assert_eq!(
        "Ctrl+F99".parse::<KeyChord>(),
        Err(KeyParseError::UnknownKey("F99".to_string()))
    );
}

#[test]
fn test_lookup_uses_platform_chord() {
    let mut keymap = Keymap::new();
    keymap.add(KeyBinding {
        name: "save".to_string(),
        mac: "Command+S".parse().unwrap(),
        other: "Ctrl+S".parse().unwrap(),
    });

    let cmd_s: KeyChord = "Command+S".parse().unwrap();
    let ctrl_s: KeyChord = "Ctrl+S".parse().unwrap();
    assert_eq!(keymap.lookup(cmd_s, Platform::Mac), Some("save"));
    assert_eq!(keymap.lookup(ctrl_s, Platform::Other), Some("save"));
    assert_eq!(keymap.lookup(ctrl_s, Platform::Mac), None);
}

#[test]
fn test_add_replaces_binding_with_same_name() {
    let mut keymap = Keymap::new();
    for key in ["Ctrl+S", "Ctrl+Shift+S"] {
        keymap.add(KeyBinding {
            name: "save".to_string(),
            mac: key.parse().unwrap(),
            other: key.parse().unwrap(),
        });
    }
    assert_eq!(keymap.len(), 1);
    let old: KeyChord = "Ctrl+S".parse().unwrap();
    assert_eq!(keymap.lookup(old, Platform::Other), None);
    assert!(keymap.remove("save"));
    assert!(keymap.is_empty());
}
