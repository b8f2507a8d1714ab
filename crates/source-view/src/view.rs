//! The source view controller.
//!
//! [`SourceView::attach`] wires one editing widget to one document:
//!
//! - widget commits flow through the [`ChangeTracker`](crate::ChangeTracker) into the document
//! - foreign document writes replace the buffer (suppressed)
//! - command shortcuts are bound and the FORMAT handler is registered with the router
//! - typed trigger characters schedule autocompletion, fired by [`SourceView::poll`]
//! - gutter presses toggle breakpoints
//!
//! Every registration is held as a [`Subscription`]; dropping the view (or calling
//! [`SourceView::detach`]) releases all of them exactly once. The widget and the document are
//! owned by the host and outlive the view.
//!
//! # Example
//!
//! ```rust
//! use source_view::{CommandRouter, Services, SourceView, SourceViewOptions};
//! use source_view_core::{ChangeOrigin, Document, DocumentInfo, EditorWidget, InputCommand};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let widget = Rc::new(RefCell::new(EditorWidget::new("")));
//! let document = Document::shared(DocumentInfo::new("main.bal", "/src", "demo"), "x = 1;");
//! let router = CommandRouter::shared(Vec::new());
//!
//! let view = SourceView::attach(
//!     Rc::clone(&widget),
//!     Rc::clone(&document),
//!     router,
//!     Services::default(),
//!     SourceViewOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(widget.borrow().text(), "x = 1;");
//!
//! view.execute(InputCommand::InsertText("// ".to_string())).unwrap();
//! assert_eq!(document.content(), "// x = 1;");
//!
//! document.set_content("y = 2;", ChangeOrigin::foreign("Design view edit"));
//! assert_eq!(widget.borrow().text(), "y = 2;");
//! ```

use crate::bridge::DocumentSyncBridge;
use crate::commands::{CommandBinder, CommandOutcome, CommandRouter, FORMAT};
use crate::completion::{
    AutocompleteTrigger, CompleterFactory, CompletionBinding, CompletionContext,
    CompletionOutcome, LanguageServiceAccessor, ScopedCompleterFactory,
};
use crate::error::{AttachError, CommandError, FormatError, SyncError};
use crate::format::{FormatOrchestrator, SourceFormatter};
use crate::future::BoxFutureLocal;
use crate::options::SourceViewOptions;
use crate::overlay::{BreakpointSink, OverlayManager};
use source_view_core::{
    AfterExec, CommitEvent, ContentModified, Document, EditorWidget, GutterMouseDown,
    InputCommand, KeyChord, ListenerError, Subscription, ViewId,
};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Instant;

/// Pending provider refresh returned by [`SourceView::update_props`].
pub type CompletionRefresh = BoxFutureLocal<'static, CompletionOutcome>;

/// Collaborators supplied by the host.
#[derive(Clone)]
pub struct Services {
    /// Formatter behind the FORMAT command.
    pub formatter: Option<Rc<dyn SourceFormatter>>,
    /// Language service for completion providers.
    pub language_service: Option<Rc<dyn LanguageServiceAccessor>>,
    /// Builds providers from the language service.
    pub completer_factory: Rc<dyn CompleterFactory>,
    /// Receives breakpoint toggles (1-based lines).
    pub breakpoints: Option<Rc<dyn BreakpointSink>>,
}

impl Services {
    /// Use `formatter` for FORMAT.
    pub fn with_formatter(mut self, formatter: impl SourceFormatter + 'static) -> Self {
        self.formatter = Some(Rc::new(formatter));
        self
    }

    /// Use `accessor` for completion providers.
    pub fn with_language_service(mut self, accessor: Rc<dyn LanguageServiceAccessor>) -> Self {
        self.language_service = Some(accessor);
        self
    }

    /// Use `factory` to build completion providers.
    pub fn with_completer_factory(mut self, factory: Rc<dyn CompleterFactory>) -> Self {
        self.completer_factory = factory;
        self
    }

    /// Report gutter toggles to `sink`.
    pub fn with_breakpoint_sink(mut self, sink: Rc<dyn BreakpointSink>) -> Self {
        self.breakpoints = Some(sink);
        self
    }
}

impl Default for Services {
    fn default() -> Self {
        Self {
            formatter: None,
            language_service: None,
            completer_factory: Rc::new(ScopedCompleterFactory),
            breakpoints: None,
        }
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("formatter", &self.formatter.is_some())
            .field("language_service", &self.language_service.is_some())
            .field("breakpoints", &self.breakpoints.is_some())
            .finish()
    }
}

/// Host state pushed into the view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewProps {
    /// The last parse of the document failed; completion refresh is skipped.
    pub parse_failed: bool,
    /// Target breakpoint rows (0-based).
    pub breakpoints: Vec<usize>,
    /// Current execution line, if the debugger is paused.
    pub debug_hit: Option<usize>,
}

struct ViewInner {
    options: SourceViewOptions,
    bridge: DocumentSyncBridge,
    overlays: OverlayManager,
    binder: CommandBinder,
    completion: Option<Rc<CompletionBinding>>,
    trigger: AutocompleteTrigger,
    formatter: Option<Rc<dyn SourceFormatter>>,
    detached: Cell<bool>,
}

impl ViewInner {
    fn widget(&self) -> &Rc<RefCell<EditorWidget>> {
        self.bridge.widget()
    }

    fn on_gutter(&self, event: &GutterMouseDown) -> Result<(), ListenerError> {
        if self.widget().try_borrow_mut().is_err() {
            return Err(ListenerError::new("editing widget is busy"));
        }
        self.overlays.on_gutter_interaction(self.widget(), *event);
        Ok(())
    }

    async fn format(&self) -> Result<(), FormatError> {
        let formatter = self.formatter.as_deref().ok_or(FormatError::Unavailable)?;
        let orchestrator = FormatOrchestrator::new(formatter, &self.bridge);
        let formatted = orchestrator.prepare().await?;
        if self.detached.get() {
            return Err(FormatError::Detached);
        }
        orchestrator.apply(&formatted)
    }

    fn flush(&self) {
        if let Err(err) = self.bridge.flush() {
            tracing::warn!(view = %self.bridge.view_id(), error = %err, "parked update failed");
        }
    }
}

/// Wraps `f` into a listener that is a no-op once the view is gone.
fn listener<E, F>(
    inner: &Weak<ViewInner>,
    f: F,
) -> impl Fn(&E) -> Result<(), ListenerError> + 'static
where
    E: 'static,
    F: Fn(&ViewInner, &E) -> Result<(), ListenerError> + 'static,
{
    let inner = inner.clone();
    move |event| match inner.upgrade() {
        Some(inner) => f(&*inner, event),
        None => Ok(()),
    }
}

/// Controller keeping an editing widget and a document in sync.
pub struct SourceView {
    inner: Rc<ViewInner>,
    router: Rc<CommandRouter>,
    subscriptions: Vec<Subscription>,
}

impl SourceView {
    /// Attach to `widget` and `document`.
    ///
    /// The document content is loaded into the buffer without an undo entry and without a
    /// write-back.
    pub fn attach(
        widget: Rc<RefCell<EditorWidget>>,
        document: Rc<Document>,
        router: Rc<CommandRouter>,
        services: Services,
        options: SourceViewOptions,
    ) -> Result<Self, AttachError> {
        let trigger =
            AutocompleteTrigger::new(options.trigger_pattern()?, options.autocomplete_delay());
        let Services {
            formatter,
            language_service,
            completer_factory,
            breakpoints,
        } = services;

        let binder = CommandBinder::new();
        let completers = {
            let mut widget = widget.try_borrow_mut().map_err(|_| AttachError::WidgetBusy)?;
            widget.reset_text(&document.content());
            widget.set_undo_limit(options.undo_limit);
            binder.bind(&mut widget, &router.commands());
            widget.completers().clone()
        };

        let view = ViewId::next();
        let inner = Rc::new(ViewInner {
            overlays: OverlayManager::new(options.execution_marker_class.clone(), breakpoints),
            bridge: DocumentSyncBridge::new(view, Rc::clone(&widget), Rc::clone(&document)),
            completion: language_service.map(|accessor| {
                Rc::new(CompletionBinding::new(completers, accessor, completer_factory))
            }),
            binder,
            trigger,
            formatter,
            options,
            detached: Cell::new(false),
        });

        let weak = Rc::downgrade(&inner);
        let mut subscriptions = Vec::with_capacity(5);
        {
            let widget = widget.borrow();
            subscriptions.push(widget.on_commit(listener::<CommitEvent, _>(
                &weak,
                |inner, event| inner.bridge.on_commit(event),
            )));
            subscriptions.push(widget.on_after_exec(listener::<AfterExec, _>(
                &weak,
                |inner, exec| {
                    inner.trigger.observe(exec, Instant::now());
                    Ok(())
                },
            )));
            subscriptions.push(widget.on_gutter_mouse_down(listener::<GutterMouseDown, _>(
                &weak,
                |inner, event| inner.on_gutter(event),
            )));
        }
        subscriptions.push(document.on_content_modified(listener::<ContentModified, _>(
            &weak,
            |inner, event| inner.bridge.on_document_modified(event),
        )));
        subscriptions.push(router.register_handler(
            FORMAT,
            view.to_string(),
            move || match weak.upgrade() {
                Some(inner) => CommandOutcome::Pending(Box::pin(async move {
                    if let Err(err) = inner.format().await {
                        tracing::debug!(
                            view = %inner.bridge.view_id(),
                            error = %err,
                            "FORMAT failed"
                        );
                    }
                })),
                None => CommandOutcome::Done,
            },
        ));

        tracing::debug!(view = %view, document = %document.name(), "source view attached");
        Ok(Self {
            inner,
            router,
            subscriptions,
        })
    }

    /// Release every registration and hand the widget back.
    pub fn detach(self) -> Rc<RefCell<EditorWidget>> {
        let widget = Rc::clone(self.inner.widget());
        drop(self);
        widget
    }

    /// Identity used to tag this view's document writes.
    pub fn view_id(&self) -> ViewId {
        self.inner.bridge.view_id()
    }

    /// The attached widget.
    pub fn widget(&self) -> &Rc<RefCell<EditorWidget>> {
        self.inner.widget()
    }

    /// The attached document.
    pub fn document(&self) -> &Rc<Document> {
        self.inner.bridge.document()
    }

    /// The command router.
    pub fn router(&self) -> &Rc<CommandRouter> {
        &self.router
    }

    /// Active options.
    pub fn options(&self) -> &SourceViewOptions {
        &self.inner.options
    }

    /// The sync bridge.
    pub fn bridge(&self) -> &DocumentSyncBridge {
        &self.inner.bridge
    }

    /// The overlay manager.
    pub fn overlays(&self) -> &OverlayManager {
        &self.inner.overlays
    }

    /// The completion binding, if a language service was supplied.
    pub fn completion(&self) -> Option<&CompletionBinding> {
        self.inner.completion.as_deref()
    }

    /// Command ids bound to keys.
    pub fn bound_commands(&self) -> Vec<String> {
        self.inner.binder.bound()
    }

    /// Push new host state.
    ///
    /// Overlays are reconciled immediately. Unless the last parse failed, a completion provider
    /// refresh is started and returned; it takes effect once awaited.
    #[must_use = "the completion refresh does nothing unless awaited"]
    pub fn update_props(&self, props: &ViewProps) -> Option<CompletionRefresh> {
        match self.widget().try_borrow_mut() {
            Ok(mut widget) => {
                let overlays = &self.inner.overlays;
                overlays.reconcile_execution_point(&mut widget, props.debug_hit);
                overlays.reconcile_breakpoints(&mut widget, &props.breakpoints);
            }
            Err(_) => tracing::warn!(view = %self.view_id(), "widget busy, overlays not updated"),
        }
        self.inner.flush();

        if props.parse_failed {
            tracing::debug!(view = %self.view_id(), "parse failed, completions unchanged");
            return None;
        }
        self.refresh_completions()
    }

    /// Start resolving a completion provider for the attached document.
    ///
    /// Returns `None` when no language service is configured.
    #[must_use = "the completion refresh does nothing unless awaited"]
    pub fn refresh_completions(&self) -> Option<CompletionRefresh> {
        let binding = Rc::clone(self.inner.completion.as_ref()?);
        let request = binding.begin(CompletionContext::from_document(self.document()));
        Some(Box::pin(async move { binding.resolve(request).await }))
    }

    /// Execute an input command, then apply any parked document update.
    pub fn execute(&self, command: InputCommand) -> Result<bool, SyncError> {
        let changed = {
            let mut widget = self
                .widget()
                .try_borrow_mut()
                .map_err(|_| SyncError::WidgetBusy)?;
            widget.execute(command)?
        };
        self.inner.flush();
        Ok(changed)
    }

    /// Run `f` on the widget, then apply any parked document update.
    pub fn edit<R>(&self, f: impl FnOnce(&mut EditorWidget) -> R) -> Result<R, SyncError> {
        let result = {
            let mut widget = self
                .widget()
                .try_borrow_mut()
                .map_err(|_| SyncError::WidgetBusy)?;
            f(&mut widget)
        };
        self.inner.flush();
        Ok(result)
    }

    /// Apply a parked document update, if any.
    pub fn flush(&self) {
        self.inner.flush();
    }

    /// Dispatch the command bound to `chord`.
    ///
    /// Returns `Ok(None)` when no command is bound to the chord.
    pub fn handle_key(&self, chord: KeyChord) -> Result<Option<CommandOutcome>, CommandError> {
        let command = {
            let Ok(widget) = self.widget().try_borrow() else {
                tracing::debug!(view = %self.view_id(), %chord, "widget busy, key ignored");
                return Ok(None);
            };
            self.inner
                .binder
                .command_for(&widget, chord, self.inner.options.platform)
        };
        match command {
            Some(id) => self.router.dispatch(&id).map(Some),
            None => Ok(None),
        }
    }

    /// Report a gutter press to the widget's gutter listeners.
    pub fn gutter_mouse_down(&self, event: GutterMouseDown) {
        if !EditorWidget::gutter_mouse_down(self.widget(), event) {
            tracing::debug!(view = %self.view_id(), "widget busy, gutter press ignored");
        }
    }

    /// When the pending autocompletion fires, if one is scheduled.
    pub fn autocomplete_due(&self) -> Option<Instant> {
        self.inner.trigger.due_at()
    }

    /// Open the autocompletion popup if a triggered request is due at `now`.
    ///
    /// Returns whether a request fired. Failures are logged and swallowed.
    pub fn poll(&self, now: Instant) -> bool {
        if !self.inner.trigger.take_due(now) {
            return false;
        }
        let Ok(mut widget) = self.widget().try_borrow_mut() else {
            tracing::debug!(view = %self.view_id(), "widget busy, autocompletion skipped");
            return true;
        };
        match widget.start_autocomplete() {
            Ok(items) => tracing::trace!(view = %self.view_id(), items, "autocompletion opened"),
            Err(err) => {
                tracing::debug!(view = %self.view_id(), error = %err, "autocompletion failed")
            }
        }
        true
    }

    /// Format the document and write the result back.
    pub async fn format(&self) -> Result<(), FormatError> {
        self.inner.format().await
    }
}

impl Drop for SourceView {
    fn drop(&mut self) {
        self.inner.detached.set(true);
        self.subscriptions.clear();
        self.inner.trigger.cancel();
        match self.inner.widget().try_borrow_mut() {
            Ok(mut widget) => {
                self.inner.binder.unbind_all(&mut widget);
                self.inner.overlays.clear_execution_point(&mut widget);
            }
            Err(_) => tracing::warn!(
                view = %self.view_id(),
                "widget busy during detach, key bindings left in place"
            ),
        }
        tracing::debug!(view = %self.view_id(), "source view detached");
    }
}

impl fmt::Debug for SourceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceView")
            .field("view", &self.view_id())
            .field("document", &self.document().name())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
