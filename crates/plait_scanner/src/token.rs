//! Tokens produced by the scanner.

use plait_ast::types::TokenFlags;
use plait_ast::TokenKind;
use plait_core::text::{Position, Range};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text for names, operators and numbers; the decoded value for
    /// strings; the full text for comments.
    pub literal: String,
    pub start: Position,
    /// Exclusive.
    pub end: Position,
    pub flags: TokenFlags,
    /// Source text of a string whose value kept an escape it could not
    /// decode. Re-quoting the value would change its meaning.
    pub raw: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            kind,
            literal: literal.into(),
            start,
            end,
            flags: TokenFlags::NONE,
            raw: None,
        }
    }

    /// A token that did not come from source, anchored at `at`.
    pub fn synthesized(kind: TokenKind, literal: impl Into<String>, at: Position) -> Self {
        Self {
            kind,
            literal: literal.into(),
            start: at,
            end: at,
            flags: TokenFlags::SYNTHESIZED,
            raw: None,
        }
    }

    pub fn with_flags(mut self, flags: TokenFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Same token, different kind. Used by interceptors that reclassify.
    pub fn with_kind(mut self, kind: TokenKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    #[inline]
    pub fn range(&self) -> Range {
        Range::new(self.start, self.end)
    }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    #[inline]
    pub fn has_preceding_comment(&self) -> bool {
        self.flags.contains(TokenFlags::PRECEDING_COMMENT)
    }

    #[inline]
    pub fn is_unterminated(&self) -> bool {
        self.flags.contains(TokenFlags::UNTERMINATED)
    }
}
