//! Engine configuration: the required-key list the rules and completions run against.
//!
//! Explicit file: `--config <path>` (errors are fatal)
//! Project-level config: `.yaml-lsp/config.yaml` (safe to commit)
//!
//! Resolution: explicit path → project config → built-in default (`servername: string`).

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use lsp_types::DiagnosticSeverity;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Project-level config file, relative to the working directory.
pub const PROJECT_CONFIG_PATH: &str = ".yaml-lsp/config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("required key name must not be empty")]
    EmptyKey,

    #[error("required key listed twice: '{0}'")]
    DuplicateKey(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primitive shape a required key's value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    String,
    Number,
    Boolean,
    Sequence,
    Mapping,
    /// Presence only; no type rule is generated.
    Any,
}

impl ValueKind {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Number => value.is_number(),
            ValueKind::Boolean => value.is_bool(),
            ValueKind::Sequence => value.is_sequence(),
            ValueKind::Mapping => value.is_mapping(),
            ValueKind::Any => true,
        }
    }

    /// Noun used in messages ("must be a string").
    pub fn noun(self) -> &'static str {
        match self {
            ValueKind::String => "a string",
            ValueKind::Number => "a number",
            ValueKind::Boolean => "a boolean",
            ValueKind::Sequence => "a sequence",
            ValueKind::Mapping => "a mapping",
            ValueKind::Any => "any value",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
            ValueKind::Any => "any",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl From<Severity> for DiagnosticSeverity {
    fn from(s: Severity) -> Self {
        match s {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
        }
    }
}

/// One required top-level key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredKey {
    pub key: String,
    #[serde(rename = "type", default)]
    pub kind: ValueKind,
    #[serde(default)]
    pub severity: Severity,
    /// Human-readable description shown on completions and hover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RequiredKey {
    pub fn new(key: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            key: key.into(),
            kind,
            severity: Severity::Error,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Detail text, falling back to a generated description.
    pub fn detail_text(&self) -> String {
        self.detail
            .clone()
            .unwrap_or_else(|| format!("Required property ({})", self.kind))
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub required_keys: Vec<RequiredKey>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            required_keys: vec![RequiredKey::new("servername", ValueKind::String)
                .with_detail("Server name (string), required property")],
        }
    }
}

impl EngineConfig {
    /// Resolve config: explicit path, then project file, then defaults.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading explicit config");
            return Self::from_file(path);
        }

        let project = Path::new(PROJECT_CONFIG_PATH);
        if project.exists() {
            match Self::from_file(project) {
                Ok(config) => {
                    debug!(path = PROJECT_CONFIG_PATH, "loaded project config");
                    return Ok(config);
                }
                Err(e) => warn!("ignoring project config: {e}"),
            }
        }

        debug!("using built-in config");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for rk in &self.required_keys {
            if rk.key.trim().is_empty() {
                return Err(ConfigError::EmptyKey);
            }
            if !seen.insert(rk.key.as_str()) {
                return Err(ConfigError::DuplicateKey(rk.key.clone()));
            }
        }
        Ok(())
    }
}
