//! Rule engine and the required-key rule set.
//!
//! A syntax error yields exactly one finding and stops there. A mapping
//! root runs every rule in registration order; any other root is outside
//! the rules' domain and yields nothing.

use std::fmt;

use lsp_types::{Diagnostic, DiagnosticSeverity, Range};
use serde_yaml::Mapping;

use super::parser::{ParseResult, StructuralError};
use super::{position, SOURCE};
use crate::config::{EngineConfig, RequiredKey, ValueKind};

/// A semantic check over a mapping root. Rules never see each other's output.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, root: &Mapping, text: &str) -> Vec<Diagnostic>;
}

pub(crate) fn make_diag(range: Range, message: String, severity: DiagnosticSeverity) -> Diagnostic {
    Diagnostic {
        range,
        severity: Some(severity),
        source: Some(SOURCE.to_string()),
        message,
        ..Default::default()
    }
}

/// The single finding for a document that failed to parse.
pub fn syntax_diagnostic(err: &StructuralError, text: &str) -> Diagnostic {
    let (line, col) = err.anchor();
    make_diag(
        position::direct(text, line, col),
        format!("YAML syntax error: {err}"),
        DiagnosticSeverity::ERROR,
    )
}

/// Fails when the key is not among the root mapping's own keys.
pub struct KeyPresence {
    key: String,
    severity: DiagnosticSeverity,
}

impl KeyPresence {
    pub fn new(required: &RequiredKey) -> Self {
        Self {
            key: required.key.clone(),
            severity: required.severity.into(),
        }
    }
}

impl Rule for KeyPresence {
    fn name(&self) -> &str {
        "required-key-presence"
    }

    fn check(&self, root: &Mapping, _text: &str) -> Vec<Diagnostic> {
        if root.contains_key(self.key.as_str()) {
            return Vec::new();
        }
        vec![make_diag(
            position::origin(),
            format!("Required key '{}' is missing", self.key),
            self.severity,
        )]
    }
}

/// Fails when the key is present but bound to the wrong kind of value.
/// Silent when the key is absent, so it never doubles up with `KeyPresence`.
pub struct KeyType {
    key: String,
    kind: ValueKind,
    severity: DiagnosticSeverity,
}

impl KeyType {
    pub fn new(required: &RequiredKey) -> Self {
        Self {
            key: required.key.clone(),
            kind: required.kind,
            severity: required.severity.into(),
        }
    }
}

impl Rule for KeyType {
    fn name(&self) -> &str {
        "required-key-type"
    }

    fn check(&self, root: &Mapping, text: &str) -> Vec<Diagnostic> {
        let Some(value) = root.get(self.key.as_str()) else {
            return Vec::new();
        };
        if self.kind.matches(value) {
            return Vec::new();
        }
        vec![make_diag(
            position::key_line(text, &self.key),
            format!("Value of key '{}' must be {}", self.key, self.kind.noun()),
            self.severity,
        )]
    }
}

/// Ordered rule list. Extend with `push`; the engine itself never changes.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.name()))
            .finish()
    }
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presence then type rule per required key, in config order.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut set = Self::new();
        for required in &config.required_keys {
            set.push(KeyPresence::new(required));
            if required.kind != ValueKind::Any {
                set.push(KeyType::new(required));
            }
        }
        set
    }

    pub fn push(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run against a parse result. Findings keep rule registration order.
    pub fn run(&self, parsed: &ParseResult, text: &str) -> Vec<Diagnostic> {
        let value = match parsed {
            Ok(v) => v,
            Err(e) => return vec![syntax_diagnostic(e, text)],
        };
        let Some(root) = value.as_mapping() else {
            return Vec::new();
        };
        self.rules
            .iter()
            .flat_map(|rule| rule.check(root, text))
            .collect()
    }
}
