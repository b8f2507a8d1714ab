//! Format-on-demand.
//!
//! Formatting is a three-stage pipeline over a structured representation of the document:
//!
//! ```text
//!   Document ──parse (async)──► Tree ──whitespace pass──► Tree ──generate──► String
//! ```
//!
//! [`FormatPipeline`] composes the stages; [`SourceFormatter`] is its object-safe face, used by
//! the controller. The formatted text replaces the whole buffer *without* suppression, so it
//! flows back into the document like any other edit.

use crate::bridge::DocumentSyncBridge;
use crate::error::{FormatError, ParseError};
use crate::future::BoxFutureLocal;
use source_view_core::Document;
use std::fmt;

/// Parses a document into a tree.
pub trait SourceParser {
    /// Parsed representation.
    type Tree: 'static;

    /// Parse the current content of `document`.
    fn parse<'a>(
        &'a self,
        document: &'a Document,
    ) -> BoxFutureLocal<'a, Result<Self::Tree, ParseError>>;
}

/// An in-place transformation of a tree.
pub trait TreePass<T> {
    /// Transform `tree`.
    fn apply(&self, tree: &mut T);
}

impl<T, F> TreePass<T> for F
where
    F: Fn(&mut T),
{
    fn apply(&self, tree: &mut T) {
        self(tree)
    }
}

/// Serializes a tree back to source text.
pub trait SourceGenerator<T> {
    /// Produce the text of `tree`.
    fn generate(&self, tree: &T) -> String;
}

impl<T, F> SourceGenerator<T> for F
where
    F: Fn(&T) -> String,
{
    fn generate(&self, tree: &T) -> String {
        self(tree)
    }
}

/// Produces the formatted text of a document.
pub trait SourceFormatter {
    /// Format `document`. Fails only when the document does not parse.
    fn format<'a>(
        &'a self,
        document: &'a Document,
    ) -> BoxFutureLocal<'a, Result<String, ParseError>>;
}

/// Parser, whitespace normalization and generator composed into a formatter.
pub struct FormatPipeline<P: SourceParser> {
    parser: P,
    normalize: Box<dyn TreePass<P::Tree>>,
    generate: Box<dyn SourceGenerator<P::Tree>>,
}

impl<P: SourceParser> FormatPipeline<P> {
    /// Compose a pipeline.
    pub fn new(
        parser: P,
        normalize: impl TreePass<P::Tree> + 'static,
        generate: impl SourceGenerator<P::Tree> + 'static,
    ) -> Self {
        Self {
            parser,
            normalize: Box::new(normalize),
            generate: Box::new(generate),
        }
    }

    /// The parser stage.
    pub fn parser(&self) -> &P {
        &self.parser
    }
}

impl<P: SourceParser> SourceFormatter for FormatPipeline<P> {
    fn format<'a>(
        &'a self,
        document: &'a Document,
    ) -> BoxFutureLocal<'a, Result<String, ParseError>> {
        Box::pin(async move {
            let mut tree = self.parser.parse(document).await?;
            self.normalize.apply(&mut tree);
            Ok(self.generate.generate(&tree))
        })
    }
}

impl<P: SourceParser + fmt::Debug> fmt::Debug for FormatPipeline<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatPipeline")
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}

/// Runs a formatter against a bridge's document and applies the result.
pub struct FormatOrchestrator<'a> {
    formatter: &'a dyn SourceFormatter,
    bridge: &'a DocumentSyncBridge,
}

impl<'a> FormatOrchestrator<'a> {
    /// Pair a formatter with the bridge whose buffer it rewrites.
    pub fn new(formatter: &'a dyn SourceFormatter, bridge: &'a DocumentSyncBridge) -> Self {
        Self { formatter, bridge }
    }

    /// Format the document and replace the buffer, writing the result back.
    ///
    /// On a parse failure the error is logged and neither the buffer nor the document change.
    pub async fn run(&self) -> Result<(), FormatError> {
        let formatted = self.prepare().await?;
        self.apply(&formatted)
    }

    /// Produce the formatted text without touching the buffer.
    pub async fn prepare(&self) -> Result<String, FormatError> {
        let document = self.bridge.document();
        self.formatter.format(document).await.map_err(|err| {
            tracing::error!(
                view = %self.bridge.view_id(),
                document = %document.name(),
                error = %err,
                "format abandoned"
            );
            FormatError::Parse(err)
        })
    }

    /// Replace the buffer with `formatted` in one non-suppressed step.
    pub fn apply(&self, formatted: &str) -> Result<(), FormatError> {
        self.bridge.replace_content(formatted, false)?;
        tracing::debug!(
            view = %self.bridge.view_id(),
            document = %self.bridge.document().name(),
            "formatted"
        );
        Ok(())
    }
}
