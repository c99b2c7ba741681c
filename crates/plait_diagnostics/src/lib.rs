//! plait_diagnostics: Parse errors and the message catalogue.
//!
//! Errors are data. The parser records them in source order and keeps
//! going; nothing here unwinds. A batch of errors together with the source
//! it was produced from serializes to JSON for editor tooling.

use plait_core::text::{Position, Range};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A message template with a stable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticMessage {
    /// Stable code, e.g. `E1001`.
    pub code: &'static str,
    /// The message template. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A single error recorded during a parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserError {
    pub message: String,
    pub range: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ParserError {
    /// Realize a catalogue message at a range.
    pub fn new(message: &DiagnosticMessage, range: Range, args: &[&str]) -> Self {
        Self {
            message: format_message(message.message, args),
            range,
            code: Some(message.code.to_string()),
        }
    }

    /// An uncatalogued error, used by plugins with their own wording.
    pub fn custom(message: impl Into<String>, range: Range) -> Self {
        Self {
            message: message.into(),
            range,
            code: None,
        }
    }

    #[inline]
    pub fn start(&self) -> Position {
        self.range.start
    }

    #[inline]
    pub fn end(&self) -> Position {
        self.range.end
    }

    /// Whether this error carries the given catalogue code.
    pub fn has_code(&self, message: &DiagnosticMessage) -> bool {
        self.code.as_deref() == Some(message.code)
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.range.start)?;
        if let Some(ref code) = self.code {
            write!(f, "{} ", code)?;
        }
        write!(f, "{}", self.message)
    }
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
/// Placeholders are found in the template only, never in substituted text.
/// A placeholder without a matching argument is left as written.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let arg = (digits > 0 && after[digits..].starts_with('}'))
            .then(|| after[..digits].parse::<usize>().ok())
            .flatten()
            .and_then(|index| args.get(index));
        match arg {
            Some(arg) => {
                result.push_str(arg);
                rest = &after[digits + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// A batch of errors bundled with the source they refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub source: String,
    pub errors: Vec<ParserError>,
}

impl ErrorReport {
    pub fn new(source: impl Into<String>, errors: Vec<ParserError>) -> Self {
        Self {
            source: source.into(),
            errors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The source line an error starts on, for display next to the message.
    pub fn line_of(&self, error: &ParserError) -> Option<&str> {
        self.source.lines().nth(error.start().line as usize)
    }
}

// ============================================================================
// Message catalogue
// ============================================================================

pub mod messages {
    use super::DiagnosticMessage;

    macro_rules! diag {
        ($code:expr, $msg:expr) => {
            DiagnosticMessage { code: $code, message: $msg }
        };
    }

    // ========================================================================
    // Syntax errors
    // ========================================================================

    pub const EXPECTED_0_GOT_1: DiagnosticMessage = diag!("E1001", "expected {0}, got {1}");
    pub const UNEXPECTED_TOKEN_0: DiagnosticMessage = diag!("E1002", "unexpected token {0}");
    pub const MISSING_TERMINATOR_GOT_0: DiagnosticMessage =
        diag!("E1003", "expected ';' after statement, got {0}");
    pub const EXPRESSION_TOO_DEEPLY_NESTED: DiagnosticMessage =
        diag!("E1008", "expression nested too deeply");
    pub const INVALID_ASSIGNMENT_TARGET: DiagnosticMessage =
        diag!("E1010", "invalid assignment target");

    // ========================================================================
    // Lexical errors
    // ========================================================================

    pub const ILLEGAL_CHARACTER_0: DiagnosticMessage = diag!("E1004", "illegal character '{0}'");
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage =
        diag!("E1005", "unterminated string literal");
    pub const INVALID_INTEGER_LITERAL_0: DiagnosticMessage =
        diag!("E1006", "could not parse {0} as integer");
    pub const INVALID_FLOAT_LITERAL_0: DiagnosticMessage =
        diag!("E1007", "could not parse {0} as float");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!("E1009", "unterminated comment");
    pub const UNTERMINATED_TEMPLATE_LITERAL: DiagnosticMessage =
        diag!("E1011", "unterminated template literal");
}
