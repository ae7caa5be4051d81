//! Structural parser: YAML text → `serde_yaml::Value` or a positioned error.
//!
//! Never panics and never propagates: every failure becomes a
//! `StructuralError` value.

use serde_yaml::Value;
use thiserror::Error;

/// A YAML syntax failure with the parser's best-known position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StructuralError {
    pub message: String,
    /// Zero-based (line, column), if the parser reported one.
    pub position: Option<(u32, u32)>,
}

impl StructuralError {
    /// Position to anchor a diagnostic at; document origin when unknown.
    pub fn anchor(&self) -> (u32, u32) {
        self.position.unwrap_or((0, 0))
    }
}

impl From<serde_yaml::Error> for StructuralError {
    fn from(e: serde_yaml::Error) -> Self {
        // serde_yaml locations are one-based
        let position = e.location().map(|l| {
            (
                l.line().saturating_sub(1) as u32,
                l.column().saturating_sub(1) as u32,
            )
        });
        Self {
            message: e.to_string(),
            position,
        }
    }
}

pub type ParseResult = Result<Value, StructuralError>;

/// Parse a full document and resolve `<<` merge keys into own keys.
/// The root may be any shape; callers check for a mapping.
pub fn parse(text: &str) -> ParseResult {
    let mut value = serde_yaml::from_str::<Value>(text)?;
    value.apply_merge()?;
    Ok(value)
}
