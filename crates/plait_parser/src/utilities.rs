//! Parser utility functions.

use plait_ast::TokenKind;

/// Whether a newline-preceded token of this kind still continues the
/// expression on the previous line, suppressing a virtual semicolon.
pub fn is_continuation_kind(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::DOT
            | TokenKind::LBRACE
            | TokenKind::LPAREN
            | TokenKind::LBRACKET
            | TokenKind::PLUS
            | TokenKind::MINUS
            | TokenKind::ASTERISK
            | TokenKind::SLASH
            | TokenKind::PERCENT
            | TokenKind::EQ
            | TokenKind::NOT_EQ
            | TokenKind::STRICT_EQ
            | TokenKind::STRICT_NOT_EQ
            | TokenKind::LT
            | TokenKind::GT
            | TokenKind::LT_EQ
            | TokenKind::GT_EQ
            | TokenKind::INSTANCEOF
            | TokenKind::AND
            | TokenKind::OR
            | TokenKind::NULLISH
    ) || kind.is_assignment_operator()
}

/// Tokens that end a statement list.
pub fn is_list_terminator(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::EOF | TokenKind::RBRACE)
}

/// Whether a token can serve as a property name after `.` or as an object
/// key: any identifier, keywords included.
pub fn is_property_name(kind: TokenKind) -> bool {
    kind == TokenKind::IDENT || kind.is_keyword()
}
