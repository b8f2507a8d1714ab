//! Command descriptors, the command router and the key binder.
//!
//! The router owns the catalogue of host commands and their handlers. The binder turns every
//! descriptor that declares a shortcut into a widget key binding whose name is the command id;
//! a matching key press is dispatched back through the router. The binder never reads handler
//! state from the router.
//!
//! Descriptor lists can be loaded from JSON in the host's shape:
//!
//! ```rust
//! use source_view::{CommandDescriptor, Shortcut};
//!
//! let descriptors = CommandDescriptor::list_from_json(
//!     r#"[
//!         { "id": "FORMAT", "shortcuts": { "mac": { "key": "Command+S" }, "other": { "key": "Ctrl+S" } } },
//!         { "id": "SAVE_ALL" }
//!     ]"#,
//! )
//! .unwrap();
//!
//! assert_eq!(descriptors[1].shortcut, Shortcut::NoShortcut);
//! ```

use crate::error::CommandError;
use crate::future::BoxFutureLocal;
use serde::Deserialize;
use source_view_core::{EditorWidget, KeyBinding, KeyChord, KeyParseError, Platform, Subscription};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Id of the format-document command.
pub const FORMAT: &str = "FORMAT";

/// Platform-specific shortcut of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortcut {
    /// Key chords for macOS and for every other platform.
    HasShortcut {
        /// Chord text used on macOS, e.g. `"Command+S"`.
        mac: String,
        /// Chord text used elsewhere, e.g. `"Ctrl+S"`.
        other: String,
    },
    /// The command is not bound to a key.
    NoShortcut,
}

impl Shortcut {
    /// Shortcut with the given chord texts.
    pub fn new(mac: impl Into<String>, other: impl Into<String>) -> Self {
        Shortcut::HasShortcut {
            mac: mac.into(),
            other: other.into(),
        }
    }
}

/// A host command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDescriptor")]
pub struct CommandDescriptor {
    /// Command id used for dispatch.
    pub id: String,
    /// Key binding, if any.
    pub shortcut: Shortcut,
}

impl CommandDescriptor {
    /// A command bound to `mac` on macOS and `other` elsewhere.
    pub fn new(id: impl Into<String>, shortcut: Shortcut) -> Self {
        Self {
            id: id.into(),
            shortcut,
        }
    }

    /// A command without a key binding.
    pub fn unbound(id: impl Into<String>) -> Self {
        Self::new(id, Shortcut::NoShortcut)
    }

    /// Decode a descriptor list.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, CommandError> {
        serde_json::from_str(json).map_err(|err| CommandError::Descriptors(err.to_string()))
    }

    /// Parse the shortcut into a widget binding named after the command.
    pub fn binding(&self) -> Result<Option<KeyBinding>, CommandError> {
        let Shortcut::HasShortcut { mac, other } = &self.shortcut else {
            return Ok(None);
        };
        let parse = |text: &str| -> Result<KeyChord, CommandError> {
            text.parse()
                .map_err(|source: KeyParseError| CommandError::InvalidShortcut {
                    id: self.id.clone(),
                    shortcut: text.to_string(),
                    source,
                })
        };
        Ok(Some(KeyBinding {
            name: self.id.clone(),
            mac: parse(mac)?,
            other: parse(other)?,
        }))
    }
}

#[derive(Deserialize)]
struct RawDescriptor {
    id: String,
    #[serde(default)]
    shortcuts: Option<RawShortcuts>,
}

#[derive(Deserialize)]
struct RawShortcuts {
    mac: RawKey,
    other: RawKey,
}

#[derive(Deserialize)]
struct RawKey {
    key: String,
}

impl From<RawDescriptor> for CommandDescriptor {
    fn from(raw: RawDescriptor) -> Self {
        let shortcut = match raw.shortcuts {
            Some(shortcuts) => Shortcut::HasShortcut {
                mac: shortcuts.mac.key,
                other: shortcuts.other.key,
            },
            None => Shortcut::NoShortcut,
        };
        Self {
            id: raw.id,
            shortcut,
        }
    }
}

/// What a command handler produced.
pub enum CommandOutcome {
    /// The command finished synchronously.
    Done,
    /// The command continues asynchronously; await to completion.
    Pending(BoxFutureLocal<'static, ()>),
}

impl CommandOutcome {
    /// Wait for the command to finish.
    pub async fn finish(self) {
        if let CommandOutcome::Pending(future) = self {
            future.await;
        }
    }

    /// Returns `true` for [`CommandOutcome::Pending`].
    pub fn is_pending(&self) -> bool {
        matches!(self, CommandOutcome::Pending(_))
    }
}

impl fmt::Debug for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Done => f.write_str("Done"),
            CommandOutcome::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

type Handler = Rc<dyn Fn() -> CommandOutcome>;

struct HandlerEntry {
    key: u64,
    owner: String,
    handler: Handler,
}

type HandlerTable = HashMap<String, Vec<HandlerEntry>>;

/// Catalogue of host commands and their handlers.
pub struct CommandRouter {
    descriptors: RefCell<Vec<CommandDescriptor>>,
    handlers: Rc<RefCell<HandlerTable>>,
    next_key: Cell<u64>,
}

impl CommandRouter {
    /// Create a router for `descriptors`.
    pub fn new(descriptors: Vec<CommandDescriptor>) -> Self {
        Self {
            descriptors: RefCell::new(descriptors),
            handlers: Rc::new(RefCell::new(HashMap::new())),
            next_key: Cell::new(0),
        }
    }

    /// Create a router wrapped for sharing.
    pub fn shared(descriptors: Vec<CommandDescriptor>) -> Rc<Self> {
        Rc::new(Self::new(descriptors))
    }

    /// Known commands.
    pub fn commands(&self) -> Vec<CommandDescriptor> {
        self.descriptors.borrow().clone()
    }

    /// Add a command, replacing one with the same id.
    pub fn add_command(&self, descriptor: CommandDescriptor) {
        let mut descriptors = self.descriptors.borrow_mut();
        descriptors.retain(|d| d.id != descriptor.id);
        descriptors.push(descriptor);
    }

    /// Register `handler` for `id` on behalf of `owner`.
    ///
    /// The handler stays registered until the returned handle is dropped or disposed.
    pub fn register_handler<F>(
        &self,
        id: &str,
        owner: impl Into<String>,
        handler: F,
    ) -> Subscription
    where
        F: Fn() -> CommandOutcome + 'static,
    {
        let key = self.next_key.get();
        self.next_key.set(key.wrapping_add(1));
        self.handlers
            .borrow_mut()
            .entry(id.to_string())
            .or_default()
            .push(HandlerEntry {
                key,
                owner: owner.into(),
                handler: Rc::new(handler),
            });

        let weak = Rc::downgrade(&self.handlers);
        let id = id.to_string();
        Subscription::new(move || {
            if let Some(handlers) = weak.upgrade() {
                let mut handlers = handlers.borrow_mut();
                if let Some(entries) = handlers.get_mut(&id) {
                    entries.retain(|entry| entry.key != key);
                    if entries.is_empty() {
                        handlers.remove(&id);
                    }
                }
            }
        })
    }

    /// Number of handlers registered for `id`.
    pub fn handler_count(&self, id: &str) -> usize {
        self.handlers.borrow().get(id).map_or(0, Vec::len)
    }

    /// Owners of the handlers registered for `id`, in registration order.
    pub fn owners(&self, id: &str) -> Vec<String> {
        self.handlers
            .borrow()
            .get(id)
            .map(|entries| entries.iter().map(|entry| entry.owner.clone()).collect())
            .unwrap_or_default()
    }

    /// Run every handler registered for `id`.
    ///
    /// Asynchronous handlers are chained into one pending outcome.
    pub fn dispatch(&self, id: &str) -> Result<CommandOutcome, CommandError> {
        let snapshot: Vec<Handler> = self
            .handlers
            .borrow()
            .get(id)
            .map(|entries| entries.iter().map(|entry| Rc::clone(&entry.handler)).collect())
            .unwrap_or_default();
        if snapshot.is_empty() {
            tracing::warn!(command = id, "no handler registered");
            return Err(CommandError::NoHandler(id.to_string()));
        }

        tracing::debug!(command = id, handlers = snapshot.len(), "dispatching command");
        let mut pending: Vec<BoxFutureLocal<'static, ()>> = snapshot
            .iter()
            .filter_map(|handler| match handler() {
                CommandOutcome::Done => None,
                CommandOutcome::Pending(future) => Some(future),
            })
            .collect();

        Ok(match pending.len() {
            0 => CommandOutcome::Done,
            1 => CommandOutcome::Pending(pending.remove(0)),
            _ => CommandOutcome::Pending(Box::pin(async move {
                for future in pending {
                    future.await;
                }
            })),
        })
    }
}

impl fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRouter")
            .field("commands", &self.descriptors.borrow().len())
            .field("handlers", &self.handlers.borrow().len())
            .finish()
    }
}

/// Maps command shortcuts onto widget key bindings.
#[derive(Debug, Default)]
pub struct CommandBinder {
    bound: RefCell<Vec<String>>,
}

impl CommandBinder {
    /// Create a binder with nothing bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every descriptor with a shortcut. Returns how many bindings were added.
    ///
    /// Descriptors without a shortcut are skipped; unparsable shortcuts are logged and skipped.
    pub fn bind(&self, widget: &mut EditorWidget, descriptors: &[CommandDescriptor]) -> usize {
        let mut bound = self.bound.borrow_mut();
        let before = bound.len();
        for descriptor in descriptors {
            match descriptor.binding() {
                Ok(Some(binding)) => {
                    widget.keymap_mut().add(binding);
                    if !bound.contains(&descriptor.id) {
                        bound.push(descriptor.id.clone());
                    }
                }
                Ok(None) => {}
                Err(err) => tracing::warn!(error = %err, "command shortcut skipped"),
            }
        }
        bound.len() - before
    }

    /// Remove every binding this binder added.
    pub fn unbind_all(&self, widget: &mut EditorWidget) {
        for id in self.bound.borrow_mut().drain(..) {
            widget.keymap_mut().remove(&id);
        }
    }

    /// Command ids currently bound.
    pub fn bound(&self) -> Vec<String> {
        self.bound.borrow().clone()
    }

    /// The bound command triggered by `chord` on `platform`.
    pub fn command_for(
        &self,
        widget: &EditorWidget,
        chord: KeyChord,
        platform: Platform,
    ) -> Option<String> {
        let id = widget.keymap().lookup(chord, platform)?;
        self.bound
            .borrow()
            .iter()
            .any(|bound| bound == id)
            .then(|| id.to_string())
    }
}
