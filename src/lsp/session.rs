//! Validation session: parse once per snapshot, then serve diagnostics,
//! completions and hover from that parse.
//!
//! `YamlService` owns the configuration and compiled rule set and is
//! immutable after construction, so one instance can serve any number of
//! documents, from any thread, without locks.

use lsp_types::{CompletionItem, Diagnostic, Position, Range};
use serde::Serialize;
use tracing::debug;

use super::parser::{self, ParseResult};
use super::rules::{Rule, RuleSet};
use super::{completion, position, HoverInfo, LanguageService};
use crate::config::EngineConfig;

/// An immutable text snapshot supplied by the document-lifecycle layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub uri: String,
    pub version: Option<i32>,
    pub text: String,
}

impl Snapshot {
    pub fn new(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            version: None,
            text: text.into(),
        }
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = Some(version);
        self
    }
}

/// The complete diagnostic set for one URI. Replaces, never extends,
/// whatever was published for that URI before.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Publication {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Language service for YAML documents with required top-level keys.
#[derive(Debug)]
pub struct YamlService {
    config: EngineConfig,
    rules: RuleSet,
}

impl Default for YamlService {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl YamlService {
    pub fn new(config: EngineConfig) -> Self {
        let rules = RuleSet::from_config(&config);
        Self { config, rules }
    }

    /// Append a rule after the configured ones.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Parse `text` once for a request cycle.
    pub fn session<'a>(&'a self, text: &'a str) -> Session<'a> {
        Session {
            service: self,
            text,
            parsed: parser::parse(text),
        }
    }

    /// Diagnostics for `uri`, ready to publish.
    pub fn validate(&self, uri: &str, text: &str) -> Publication {
        self.publish(&Snapshot::new(uri, text))
    }

    pub fn publish(&self, snapshot: &Snapshot) -> Publication {
        let diagnostics = self.session(&snapshot.text).diagnostics();
        debug!(
            uri = %snapshot.uri,
            version = ?snapshot.version,
            count = diagnostics.len(),
            "validated"
        );
        Publication {
            uri: snapshot.uri.clone(),
            version: snapshot.version,
            diagnostics,
        }
    }

    /// Completion candidates for `uri`. The position is accepted for
    /// transport compatibility; required-key suggestions do not depend on it.
    pub fn complete(&self, uri: &str, text: &str, pos: Position) -> Vec<CompletionItem> {
        let items = self.session(text).completions(pos);
        debug!(uri, count = items.len(), "completed");
        items
    }
}

impl LanguageService for YamlService {
    fn diagnostics(&self, content: &str) -> Vec<Diagnostic> {
        self.session(content).diagnostics()
    }

    fn completions(&self, content: &str, pos: Position) -> Vec<CompletionItem> {
        self.session(content).completions(pos)
    }

    fn hover(&self, content: &str, pos: Position) -> Option<HoverInfo> {
        self.session(content).hover(pos)
    }
}

/// One parsed snapshot, shared by every query in a request cycle.
pub struct Session<'a> {
    service: &'a YamlService,
    text: &'a str,
    parsed: ParseResult,
}

impl Session<'_> {
    pub fn parsed(&self) -> &ParseResult {
        &self.parsed
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.service.rules.run(&self.parsed, self.text)
    }

    pub fn completions(&self, _pos: Position) -> Vec<CompletionItem> {
        completion::complete(&self.service.config, &self.parsed, self.text)
    }

    /// Hover over a top-level required key shows its expected type and detail.
    pub fn hover(&self, pos: Position) -> Option<HoverInfo> {
        let lines = position::lines(self.text);
        let line = *lines.get(pos.line as usize)?;
        let required = self
            .service
            .config
            .required_keys
            .iter()
            .find(|rk| position::find_key_line(line, &rk.key).is_some())?;

        let key_len = required.key.encode_utf16().count() as u32;
        if pos.character > key_len {
            return None;
        }

        Some(HoverInfo {
            content: format!(
                "**{}** ({}, required)\n\n{}",
                required.key,
                required.kind,
                required.detail_text()
            ),
            range: Some(Range::new(
                Position::new(pos.line, 0),
                Position::new(pos.line, key_len),
            )),
        })
    }
}
