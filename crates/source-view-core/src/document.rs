//! Shared document model.
//!
//! A [`Document`] is the canonical content of one addressable source unit. It is shared (`Rc`)
//! between every consumer that views or edits it: source views, design views, file watchers and
//! so on. Each write carries a [`ChangeOrigin`] so that consumers can recognize the writes they
//! issued themselves and avoid echoing them back.

use crate::error::ListenerError;
use crate::events::{ListenerSet, Subscription};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a view attached to documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u64);

impl ViewId {
    /// Allocate a process-unique view id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// The subsystem that initiated a content change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Written by a source view from its own buffer.
    SourceModified {
        /// The writing view.
        view: ViewId,
    },
    /// Written by anything else (design view, file reload, refactoring tools, ...).
    Foreign {
        /// Free-form origin kind, used as the default change title.
        kind: String,
    },
}

impl ChangeOrigin {
    /// A foreign origin of the given kind.
    pub fn foreign(kind: impl Into<String>) -> Self {
        ChangeOrigin::Foreign { kind: kind.into() }
    }

    /// Returns `true` if this change was written by `view`.
    pub fn is_from_view(&self, view: ViewId) -> bool {
        matches!(self, ChangeOrigin::SourceModified { view: origin } if *origin == view)
    }

    fn default_title(&self) -> String {
        match self {
            ChangeOrigin::SourceModified { .. } => "Modify source".to_string(),
            ChangeOrigin::Foreign { kind } => kind.clone(),
        }
    }
}

/// Notification delivered after a document's content changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentModified {
    /// Content before the change.
    pub old_content: String,
    /// Content after the change.
    pub new_content: String,
    /// Who made the change.
    pub origin: ChangeOrigin,
    /// Human-readable change title (e.g. for a global undo stack).
    pub title: String,
    /// Document version after the change.
    pub version: u64,
}

/// Addressing metadata of a document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentInfo {
    /// File name (e.g. `"main.bal"`).
    pub name: String,
    /// Directory or full path of the file.
    pub path: String,
    /// Name of the package/module containing the file.
    pub package_name: String,
}

impl DocumentInfo {
    /// Create document metadata.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        package_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            package_name: package_name.into(),
        }
    }
}

/// Canonical, shared text content of one source unit.
pub struct Document {
    info: DocumentInfo,
    content: RefCell<String>,
    version: Cell<u64>,
    listeners: ListenerSet<ContentModified>,
}

impl Document {
    /// Create a document.
    pub fn new(info: DocumentInfo, content: impl Into<String>) -> Self {
        Self {
            info,
            content: RefCell::new(content.into()),
            version: Cell::new(0),
            listeners: ListenerSet::new(),
        }
    }

    /// Create a document wrapped for sharing.
    pub fn shared(info: DocumentInfo, content: impl Into<String>) -> Rc<Self> {
        Rc::new(Self::new(info, content))
    }

    /// Addressing metadata.
    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    /// File name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// File path.
    pub fn path(&self) -> &str {
        &self.info.path
    }

    /// Package name.
    pub fn package_name(&self) -> &str {
        &self.info.package_name
    }

    /// Current content.
    pub fn content(&self) -> String {
        self.content.borrow().clone()
    }

    /// Number of content changes so far.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Replace the content and notify listeners.
    ///
    /// Writes that do not change the content are dropped without a notification. Returns whether
    /// the content changed.
    pub fn set_content(&self, content: impl Into<String>, origin: ChangeOrigin) -> bool {
        let title = origin.default_title();
        self.set_content_titled(content, origin, title)
    }

    /// Like [`Document::set_content`], with an explicit change title.
    pub fn set_content_titled(
        &self,
        content: impl Into<String>,
        origin: ChangeOrigin,
        title: impl Into<String>,
    ) -> bool {
        let new_content = content.into();
        let old_content = {
            let mut current = self.content.borrow_mut();
            if *current == new_content {
                return false;
            }
            std::mem::replace(&mut *current, new_content.clone())
        };
        let version = self.version.get().wrapping_add(1);
        self.version.set(version);

        tracing::debug!(
            document = %self.info.name,
            version,
            origin = ?origin,
            "document content modified"
        );
        self.listeners.emit(&ContentModified {
            old_content,
            new_content,
            origin,
            title: title.into(),
            version,
        });
        true
    }

    /// Observe content changes made by any writer.
    pub fn on_content_modified<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ContentModified) -> Result<(), ListenerError> + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Number of attached content listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("info", &self.info)
            .field("version", &self.version.get())
            .field("listeners", &self.listeners)
            .finish()
    }
}
