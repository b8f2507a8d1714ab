//! Completion wiring: context-scoped providers and the typing trigger.
//!
//! # Provider installation
//!
//! Each context change (usually the active file) asks the [`LanguageServiceAccessor`] for a
//! language-service handle, builds a provider scoped to the context through a
//! [`CompleterFactory`], and installs it as the only provider of the widget's
//! [`SharedCompleters`]. Acquisition is asynchronous, so requests can overlap:
//!
//! ```text
//!   begin(ctx A) ─ seq 1 ──────────────────────────► resolve ─► stale (1 < 2), dropped
//!   begin(ctx B) ─ seq 2 ───────────► resolve ─► installed
//! ```
//!
//! Only the resolution carrying the latest issued sequence number may install its provider.
//!
//! # Typing trigger
//!
//! [`AutocompleteTrigger`] watches inserted characters and marks an autocompletion request as
//! due after a short debounce; the owner fires it from `poll`.

use crate::error::CompletionAcquisitionError;
use crate::future::BoxFutureLocal;
use regex::Regex;
use source_view_core::{
    AfterExec, CompletionError, CompletionItem, CompletionProvider, CompletionQuery, Document,
    InputCommand, SharedCompleters,
};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Identifies which completion provider to install.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CompletionContext {
    /// File name.
    pub resource_name: String,
    /// File path.
    pub resource_path: String,
    /// Package or module containing the file.
    pub container_name: String,
}

impl CompletionContext {
    /// Create a context.
    pub fn new(
        resource_name: impl Into<String>,
        resource_path: impl Into<String>,
        container_name: impl Into<String>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            resource_path: resource_path.into(),
            container_name: container_name.into(),
        }
    }

    /// The context addressing `document`.
    pub fn from_document(document: &Document) -> Self {
        Self::new(document.name(), document.path(), document.package_name())
    }
}

/// A connected language service.
pub trait LanguageService {
    /// Answer a completion query for a file identified by `context`.
    fn complete(
        &self,
        context: &CompletionContext,
        query: &CompletionQuery,
    ) -> Result<Vec<CompletionItem>, CompletionError>;
}

/// Outcome of acquiring the language service.
pub type Acquisition = Result<Rc<dyn LanguageService>, CompletionAcquisitionError>;

/// Gives access to the (usually process-wide) language service.
pub trait LanguageServiceAccessor {
    /// Resolve the service handle, connecting first if needed.
    fn get_instance(&self) -> BoxFutureLocal<'_, Acquisition>;
}

type Connector = Box<dyn Fn() -> BoxFutureLocal<'static, Acquisition>>;

/// Accessor that connects once and hands out the cached handle afterwards.
///
/// A failed connection is not cached; the next call tries again. Calls that overlap the first
/// connection each connect, and the first to finish is kept.
pub struct CachedLanguageService {
    connect: Connector,
    instance: RefCell<Option<Rc<dyn LanguageService>>>,
}

impl CachedLanguageService {
    /// Wrap a connection routine.
    pub fn new<F>(connect: F) -> Self
    where
        F: Fn() -> BoxFutureLocal<'static, Acquisition> + 'static,
    {
        Self {
            connect: Box::new(connect),
            instance: RefCell::new(None),
        }
    }

    /// Returns `true` once a connection succeeded.
    pub fn is_connected(&self) -> bool {
        self.instance.borrow().is_some()
    }
}

impl LanguageServiceAccessor for CachedLanguageService {
    fn get_instance(&self) -> BoxFutureLocal<'_, Acquisition> {
        Box::pin(async move {
            if let Some(instance) = self.instance.borrow().as_ref() {
                return Ok(Rc::clone(instance));
            }
            let instance = (self.connect)().await?;
            let mut cached = self.instance.borrow_mut();
            Ok(Rc::clone(cached.get_or_insert(instance)))
        })
    }
}

impl fmt::Debug for CachedLanguageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedLanguageService")
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Builds a completion provider from a service handle and a context.
pub trait CompleterFactory {
    /// Create a provider scoped to `context`.
    fn create(
        &self,
        service: Rc<dyn LanguageService>,
        context: &CompletionContext,
    ) -> Rc<dyn CompletionProvider>;
}

/// Default factory: forwards every query to the service with the bound context.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopedCompleterFactory;

impl CompleterFactory for ScopedCompleterFactory {
    fn create(
        &self,
        service: Rc<dyn LanguageService>,
        context: &CompletionContext,
    ) -> Rc<dyn CompletionProvider> {
        Rc::new(ScopedCompleter {
            service,
            context: context.clone(),
        })
    }
}

struct ScopedCompleter {
    service: Rc<dyn LanguageService>,
    context: CompletionContext,
}

impl CompletionProvider for ScopedCompleter {
    fn complete(&self, query: &CompletionQuery) -> Result<Vec<CompletionItem>, CompletionError> {
        self.service.complete(&self.context, query)
    }
}

/// A provider request tagged with its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Position in issue order, starting at 1.
    pub seq: u64,
    /// Context to scope the provider to.
    pub context: CompletionContext,
}

/// How a provider request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The provider was installed.
    Installed {
        /// Sequence number of the installed request.
        seq: u64,
    },
    /// A newer request was issued meanwhile; nothing changed.
    Stale {
        /// Sequence number of the dropped request.
        seq: u64,
        /// Latest issued sequence number.
        latest: u64,
    },
    /// The language service could not be acquired; nothing changed.
    Failed(CompletionAcquisitionError),
}

/// Installs context-scoped providers into a shared completer list.
pub struct CompletionBinding {
    completers: SharedCompleters,
    accessor: Rc<dyn LanguageServiceAccessor>,
    factory: Rc<dyn CompleterFactory>,
    issued: Cell<u64>,
    installed: RefCell<Option<CompletionRequest>>,
}

impl CompletionBinding {
    /// Create a binding for `completers`.
    pub fn new(
        completers: SharedCompleters,
        accessor: Rc<dyn LanguageServiceAccessor>,
        factory: Rc<dyn CompleterFactory>,
    ) -> Self {
        Self {
            completers,
            accessor,
            factory,
            issued: Cell::new(0),
            installed: RefCell::new(None),
        }
    }

    /// Issue the next sequence number for `context`.
    pub fn begin(&self, context: CompletionContext) -> CompletionRequest {
        let seq = self.issued.get() + 1;
        self.issued.set(seq);
        CompletionRequest { seq, context }
    }

    /// Latest issued sequence number (0 before the first request).
    pub fn latest_seq(&self) -> u64 {
        self.issued.get()
    }

    /// Context of the installed provider.
    pub fn installed_context(&self) -> Option<CompletionContext> {
        self.installed
            .borrow()
            .as_ref()
            .map(|request| request.context.clone())
    }

    /// Issue a request for `context` and resolve it.
    pub async fn on_context_changed(&self, context: CompletionContext) -> CompletionOutcome {
        let request = self.begin(context);
        self.resolve(request).await
    }

    /// Acquire the language service and install a provider for `request` if it is still the
    /// latest.
    pub async fn resolve(&self, request: CompletionRequest) -> CompletionOutcome {
        match self.accessor.get_instance().await {
            Ok(service) => self.install(request, service),
            Err(err) => {
                tracing::error!(
                    seq = request.seq,
                    resource = %request.context.resource_name,
                    error = %err,
                    "could not acquire language service"
                );
                CompletionOutcome::Failed(err)
            }
        }
    }

    /// Install a provider for `request` unless a newer request was issued.
    pub fn install(
        &self,
        request: CompletionRequest,
        service: Rc<dyn LanguageService>,
    ) -> CompletionOutcome {
        let latest = self.issued.get();
        if request.seq != latest {
            tracing::debug!(seq = request.seq, latest, "stale completion context dropped");
            return CompletionOutcome::Stale {
                seq: request.seq,
                latest,
            };
        }

        let provider = self.factory.create(service, &request.context);
        self.completers.set_providers(vec![provider]);
        tracing::debug!(
            seq = request.seq,
            resource = %request.context.resource_name,
            "completion provider installed"
        );
        let seq = request.seq;
        *self.installed.borrow_mut() = Some(request);
        CompletionOutcome::Installed { seq }
    }
}

impl fmt::Debug for CompletionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionBinding")
            .field("completers", &self.completers)
            .field("issued", &self.issued.get())
            .field("installed", &self.installed.borrow())
            .finish()
    }
}

/// Debounced autocompletion trigger driven by inserted characters.
#[derive(Debug)]
pub struct AutocompleteTrigger {
    pattern: Regex,
    delay: Duration,
    due: Cell<Option<Instant>>,
}

impl AutocompleteTrigger {
    /// Trigger on single inserted characters matching `pattern`, `delay` after the insert.
    pub fn new(pattern: Regex, delay: Duration) -> Self {
        Self {
            pattern,
            delay,
            due: Cell::new(None),
        }
    }

    /// Inspect an executed command observed at `now`. Returns whether a request was scheduled.
    ///
    /// A later trigger pushes the due time forward.
    pub fn observe(&self, exec: &AfterExec, now: Instant) -> bool {
        let InputCommand::InsertText(text) = &exec.command else {
            return false;
        };
        if !self.pattern.is_match(text) {
            return false;
        }
        self.due.set(Some(now + self.delay));
        true
    }

    /// When the pending request fires, if one is scheduled.
    pub fn due_at(&self) -> Option<Instant> {
        self.due.get()
    }

    /// Consume the pending request if it is due at `now`.
    pub fn take_due(&self, now: Instant) -> bool {
        match self.due.get() {
            Some(due) if due <= now => {
                self.due.set(None);
                true
            }
            _ => false,
        }
    }

    /// Drop the pending request.
    pub fn cancel(&self) {
        self.due.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(text: &str) -> AfterExec {
        AfterExec {
            command: InputCommand::InsertText(text.to_string()),
            changed: true,
        }
    }

    #[test]
    fn test_trigger_debounces() {
        let trigger = AutocompleteTrigger::new(
            Regex::new(crate::options::DEFAULT_AUTOCOMPLETE_TRIGGER).unwrap(),
            Duration::from_millis(10),
        );
        let start = Instant::now();

        assert!(trigger.observe(&insert("a"), start));
        assert!(!trigger.take_due(start + Duration::from_millis(5)));
        assert!(trigger.observe(&insert("."), start + Duration::from_millis(5)));
        assert!(!trigger.take_due(start + Duration::from_millis(12)));
        assert!(trigger.take_due(start + Duration::from_millis(15)));
        assert!(!trigger.take_due(start + Duration::from_millis(30)));
    }

    #[test]
    fn test_trigger_ignores_other_input() {
        let trigger = AutocompleteTrigger::new(
            Regex::new(crate::options::DEFAULT_AUTOCOMPLETE_TRIGGER).unwrap(),
            Duration::ZERO,
        );
        let now = Instant::now();
        assert!(!trigger.observe(&insert(" "), now));
        assert!(!trigger.observe(&insert("ab"), now));
        let undo = AfterExec {
            command: InputCommand::Undo,
            changed: true,
        };
        assert!(!trigger.observe(&undo, now));
        assert_eq!(trigger.due_at(), None);
    }

    #[test]
    fn test_context_from_document() {
        let document = Document::new(
            source_view_core::DocumentInfo::new("main.bal", "/work", "demo"),
            "",
        );
        assert_eq!(
            CompletionContext::from_document(&document),
            CompletionContext::new("main.bal", "/work", "demo")
        );
    }
}
