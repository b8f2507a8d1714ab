#![warn(missing_docs)]
//! `source-view` - source view controller for `source-view-core`.
//!
//! A [`SourceView`] keeps an [`EditorWidget`](source_view_core::EditorWidget) and a shared
//! [`Document`](source_view_core::Document) converged while other consumers (design views, file
//! reloads, refactoring tools) write to the same document. On top of the synchronization it
//! maintains the debugger overlays, installs context-scoped completion providers, binds host
//! command shortcuts and formats the document on demand.
//!
//! # Components
//!
//! - [`tracker`] - classifies history commits and owns the one-shot write-back suppression
//! - [`bridge`] - buffer → document write-back and document → buffer replacement
//! - [`overlay`] - execution marker and gutter breakpoints
//! - [`completion`] - language-service providers with a sequence guard, typing trigger
//! - [`commands`] - command descriptors, the router and the key binder
//! - [`format`] - parse / normalize / generate pipeline and its orchestration
//! - [`view`] - the controller tying everything to one widget and one document
//! - [`options`] - configuration
//!
//! The crate is single-threaded and executor-agnostic: asynchronous collaborators return
//! [`BoxFutureLocal`]s, and the host drives the futures the controller hands back.

pub mod bridge;
pub mod commands;
pub mod completion;
pub mod error;
pub mod format;
pub mod future;
pub mod options;
pub mod overlay;
pub mod tracker;
pub mod view;

pub use bridge::DocumentSyncBridge;
pub use commands::{
    CommandBinder, CommandDescriptor, CommandOutcome, CommandRouter, FORMAT, Shortcut,
};
pub use completion::{
    Acquisition, AutocompleteTrigger, CachedLanguageService, CompleterFactory, CompletionBinding,
    CompletionContext, CompletionOutcome, CompletionRequest, LanguageService,
    LanguageServiceAccessor, ScopedCompleterFactory,
};
pub use error::{
    AttachError, CommandError, CompletionAcquisitionError, FormatError, OptionsError, ParseError,
    SyncError,
};
pub use format::{
    FormatOrchestrator, FormatPipeline, SourceFormatter, SourceGenerator, SourceParser, TreePass,
};
pub use future::BoxFutureLocal;
pub use options::SourceViewOptions;
pub use overlay::{
    BreakpointCallbacks, BreakpointSink, BreakpointToggle, CurrentOverlayHandle, OverlayManager,
};
pub use tracker::{ChangeTracker, SuppressionSlot, TrackDecision};
pub use view::{CompletionRefresh, Services, SourceView, ViewProps};
