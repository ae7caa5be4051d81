//! yaml-lsp: validation and completion engine for YAML documents with
//! required top-level keys.
//!
//! Transport-agnostic: an editor adapter hands over text snapshots and
//! publishes the returned diagnostics and completion items.

pub mod config;
pub mod lsp;

pub use config::{EngineConfig, RequiredKey, Severity, ValueKind};
pub use lsp::{LanguageService, Publication, Snapshot, YamlService};
