//! In-process language intelligence with no JSON-RPC and no transport.
//!
//! Pure functions that operate directly on a document snapshot.
//! Uses `lsp-types` for standard data structures (Diagnostic, CompletionItem, etc.)
//! but calls them synchronously (no tower-lsp, no async).
//!
//! Any transport (stdio server, editor plugin, the CLI) wraps a
//! `LanguageService` and forwards text snapshots to it. Nothing here
//! keeps state between calls.

pub mod completion;
pub mod parser;
pub mod position;
pub mod rules;
pub mod session;

use lsp_types::{
    CompletionItem, CompletionOptions, Diagnostic, Position, ServerCapabilities,
    TextDocumentSyncCapability, TextDocumentSyncKind,
};

pub use session::{Publication, Session, Snapshot, YamlService};

/// Value of `Diagnostic::source` on every finding this engine emits.
pub const SOURCE: &str = "yaml-lsp";

/// Hover information for a position in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    /// Content to display (plain text or markdown).
    pub content: String,
    /// Optional range the hover applies to.
    pub range: Option<lsp_types::Range>,
}

/// In-process language service: pure functions, no transport.
pub trait LanguageService {
    /// Compute diagnostics for the given content.
    fn diagnostics(&self, content: &str) -> Vec<Diagnostic>;

    /// Compute completions at the given position.
    fn completions(&self, content: &str, pos: Position) -> Vec<CompletionItem>;

    /// Compute hover information at the given position.
    fn hover(&self, content: &str, pos: Position) -> Option<HoverInfo>;
}

/// Capabilities a transport should advertise on `initialize`.
pub fn capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Kind(
            TextDocumentSyncKind::INCREMENTAL,
        )),
        completion_provider: Some(CompletionOptions {
            trigger_characters: Some(vec![":".to_string(), "\"".to_string()]),
            ..Default::default()
        }),
        hover_provider: Some(lsp_types::HoverProviderCapability::Simple(true)),
        ..Default::default()
    }
}
