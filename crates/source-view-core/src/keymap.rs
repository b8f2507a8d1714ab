//! Key chords and widget-level key bindings.
//!
//! Chords are written the way command descriptors declare shortcuts:
//!
//! ```text
//! chord    = (modifier sep)* key
//! sep      = "+" | "-"
//! modifier = "ctrl" | "control" | "alt" | "option" | "shift" | "cmd" | "command" | "meta" | "super"
//! key      = named-key | fn-key | char
//! ```
//!
//! Modifier and key names are case-insensitive, so `"Command+S"`, `"cmd-s"` and `"CMD+S"` are the
//! same chord.

use crate::error::KeyParseError;
use bitflags::bitflags;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Modifier keys held while pressing a key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Control.
        const CTRL = 1 << 0;
        /// Alt / Option.
        const ALT = 1 << 1;
        /// Shift.
        const SHIFT = 1 << 2;
        /// Command / Meta / Super.
        const COMMAND = 1 << 3;
    }
}

/// A non-modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character, stored lowercase.
    Char(char),
    /// Function key `F1`..`F24`.
    F(u8),
    /// Enter / Return.
    Enter,
    /// Tab.
    Tab,
    /// Escape.
    Esc,
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Space bar.
    Space,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
}

impl Key {
    fn parse(name: &str) -> Result<Self, KeyParseError> {
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Ok(Key::Char(ch.to_ascii_lowercase()));
        }

        let lower = name.to_ascii_lowercase();
        let key = match lower.as_str() {
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "esc" | "escape" => Key::Esc,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "space" => Key::Space,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" => Key::PageUp,
            "pagedown" => Key::PageDown,
            "plus" => Key::Char('+'),
            "minus" => Key::Char('-'),
            other => match other.strip_prefix('f').map(str::parse::<u8>) {
                Some(Ok(n)) if (1..=24).contains(&n) => Key::F(n),
                _ => return Err(KeyParseError::UnknownKey(name.to_string())),
            },
        };
        Ok(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(ch) => write!(f, "{}", ch.to_ascii_uppercase()),
            Key::F(n) => write!(f, "F{n}"),
            Key::Enter => f.write_str("Enter"),
            Key::Tab => f.write_str("Tab"),
            Key::Esc => f.write_str("Esc"),
            Key::Backspace => f.write_str("Backspace"),
            Key::Delete => f.write_str("Delete"),
            Key::Space => f.write_str("Space"),
            Key::Up => f.write_str("Up"),
            Key::Down => f.write_str("Down"),
            Key::Left => f.write_str("Left"),
            Key::Right => f.write_str("Right"),
            Key::Home => f.write_str("Home"),
            Key::End => f.write_str("End"),
            Key::PageUp => f.write_str("PageUp"),
            Key::PageDown => f.write_str("PageDown"),
        }
    }
}

/// A key plus the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    /// Held modifiers.
    pub modifiers: Modifiers,
    /// The pressed key.
    pub key: Key,
}

impl KeyChord {
    /// Create a chord.
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }

    /// Shorthand for `modifiers` + a character key.
    pub fn with_char(modifiers: Modifiers, ch: char) -> Self {
        Self::new(modifiers, Key::Char(ch.to_ascii_lowercase()))
    }
}

fn is_separator(ch: char) -> bool {
    ch == '+' || ch == '-'
}

/// Split `"Ctrl+Shift+S"` into `("Ctrl+Shift", "S")`. A doubled trailing separator (`"Ctrl++"`)
/// names the separator key itself.
fn split_key(chord: &str) -> (&str, &str) {
    let mut tail = chord.char_indices().rev();
    match (tail.next(), tail.next()) {
        (Some((last, a)), Some((_, b))) if is_separator(a) && is_separator(b) => {
            (&chord[..last - 1], &chord[last..])
        }
        _ => match chord.rfind(is_separator) {
            Some(idx) if idx + 1 < chord.len() => (&chord[..idx], &chord[idx + 1..]),
            _ => ("", chord),
        },
    }
}

impl FromStr for KeyChord {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyParseError::Empty);
        }

        let (mods, key) = split_key(s);
        let mut modifiers = Modifiers::empty();
        for name in mods.split(is_separator).filter(|m| !m.is_empty()) {
            modifiers |= match name.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => Modifiers::CTRL,
                "alt" | "option" | "opt" => Modifiers::ALT,
                "shift" => Modifiers::SHIFT,
                "cmd" | "command" | "meta" | "super" => Modifiers::COMMAND,
                _ => return Err(KeyParseError::UnknownModifier(name.to_string())),
            };
        }

        Ok(Self {
            modifiers,
            key: Key::parse(key)?,
        })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Modifiers::CTRL, "Ctrl"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::COMMAND, "Command"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{name}-")?;
            }
        }
        write!(f, "{}", self.key)
    }
}

/// Platform family used to pick a binding's chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS.
    Mac,
    /// Everything else.
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

/// A named widget command with one chord per platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    /// Command name reported on a match.
    pub name: String,
    /// Chord used on macOS.
    pub mac: KeyChord,
    /// Chord used elsewhere.
    pub other: KeyChord,
}

impl KeyBinding {
    /// The chord for `platform`.
    pub fn chord(&self, platform: Platform) -> KeyChord {
        match platform {
            Platform::Mac => self.mac,
            Platform::Other => self.other,
        }
    }
}

/// Key binding table of a widget.
#[derive(Debug, Default)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Keymap {
    /// Create an empty keymap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding. A binding with the same name is replaced.
    pub fn add(&mut self, binding: KeyBinding) {
        self.bindings.retain(|b| b.name != binding.name);
        self.bindings.push(binding);
    }

    /// Remove the binding called `name`. Returns `false` if there was none.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.name != name);
        self.bindings.len() != before
    }

    /// Look up a binding by name.
    pub fn get(&self, name: &str) -> Option<&KeyBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// The command bound to `chord` on `platform`. Later bindings win.
    pub fn lookup(&self, chord: KeyChord, platform: Platform) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.chord(platform) == chord)
            .map(|b| b.name.as_str())
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
