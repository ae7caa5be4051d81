//! Completion provider: suggests required top-level keys the document lacks.

use lsp_types::{CompletionItem, CompletionItemKind, InsertTextFormat};

use super::parser::ParseResult;
use super::position;
use crate::config::{EngineConfig, RequiredKey};

/// How key presence is decided for a parse result.
enum Presence<'a> {
    /// Mapping root: exact lookup.
    Tree(&'a serde_yaml::Mapping),
    /// Syntax error or empty document: anchored text scan.
    Text,
    /// Sequence or scalar root: not a mapping document, no suggestions.
    NotMapping,
}

fn presence(parsed: &ParseResult) -> Presence<'_> {
    match parsed {
        Ok(value) => match value.as_mapping() {
            Some(map) => Presence::Tree(map),
            None if value.is_null() => Presence::Text,
            None => Presence::NotMapping,
        },
        Err(_) => Presence::Text,
    }
}

fn candidate(required: &RequiredKey) -> CompletionItem {
    CompletionItem {
        label: required.key.clone(),
        kind: Some(CompletionItemKind::PROPERTY),
        detail: Some(required.detail_text()),
        insert_text: Some(format!("{}: ", required.key)),
        insert_text_format: Some(InsertTextFormat::PLAIN_TEXT),
        ..Default::default()
    }
}

/// One candidate per absent required key, in config order.
pub fn complete(config: &EngineConfig, parsed: &ParseResult, text: &str) -> Vec<CompletionItem> {
    let presence = presence(parsed);
    config
        .required_keys
        .iter()
        .filter(|rk| match &presence {
            Presence::Tree(map) => !map.contains_key(rk.key.as_str()),
            Presence::Text => position::find_key_line(text, &rk.key).is_none(),
            Presence::NotMapping => false,
        })
        .map(candidate)
        .collect()
}
