//! plait_options: Parse and render options.
//!
//! Options can be built in code or read from a JSON file such as
//!
//! ```json
//! {
//!   "parse": { "tolerant": true, "smartSemicolon": true },
//!   "render": { "mode": "pretty", "semicolons": false, "sourceMap": true }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Mode flags fixed when a parser is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    /// Treat an unsatisfied statement terminator as satisfied instead of
    /// reporting it.
    pub tolerant: bool,
    /// A newline-preceded `(` or `[` never continues the previous
    /// expression.
    pub smart_semicolon: bool,
}

impl ParseOptions {
    pub fn tolerant() -> Self {
        Self {
            tolerant: true,
            ..Self::default()
        }
    }
}

/// Output style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Minimal separators, one terminator per statement.
    #[default]
    Compact,
    /// Indented, one statement per line, comments kept.
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    pub mode: RenderMode,
    /// Emit statement terminators in pretty mode. Compact mode always does.
    pub semicolons: bool,
    pub source_map: bool,
    pub indent_width: usize,
    /// Name recorded in the source map's `sources` list.
    pub source_name: String,
    /// Name of the generated file, recorded as the source map's `file`.
    pub file: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::Compact,
            semicolons: true,
            source_map: false,
            indent_width: 4,
            source_name: "input.js".to_string(),
            file: None,
        }
    }
}

impl RenderOptions {
    pub fn compact() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            mode: RenderMode::Pretty,
            ..Self::default()
        }
    }

    pub fn with_source_map(mut self) -> Self {
        self.source_map = true;
        self
    }

    pub fn with_semicolons(mut self, semicolons: bool) -> Self {
        self.semicolons = semicolons;
        self
    }

    /// Whether statement terminators are written.
    pub fn emits_terminators(&self) -> bool {
        self.mode == RenderMode::Compact || self.semicolons
    }
}

/// The full configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaitConfig {
    pub parse: ParseOptions,
    pub render: RenderOptions,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a configuration from a JSON string.
pub fn parse_config(content: &str) -> Result<PlaitConfig, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

/// Parse a configuration file from a path.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<PlaitConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}
