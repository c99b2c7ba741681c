//! Token kinds.
//!
//! `TokenKind` is an opaque integer with two disjoint ranges. Built-in kinds
//! sit below [`TokenKind::DYNAMIC_BASE`]; kinds allocated at runtime by a
//! tokenizer builder are handed out sequentially from that base upward.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKind(u16);

macro_rules! builtin_kinds {
    ($($name:ident = $value:expr, $text:expr;)*) => {
        impl TokenKind {
            $(pub const $name: TokenKind = TokenKind($value);)*
        }

        const BUILTIN_NAMES: &[(TokenKind, &str)] = &[
            $((TokenKind::$name, $text),)*
        ];
    };
}

builtin_kinds! {
    ILLEGAL = 0, "ILLEGAL";
    EOF = 1, "EOF";
    COMMENT = 2, "COMMENT";

    // Names and literals
    IDENT = 3, "IDENT";
    INT = 4, "INT";
    FLOAT = 5, "FLOAT";
    STRING = 6, "STRING";
    TEMPLATE = 7, "TEMPLATE";

    // Operators
    ASSIGN = 10, "=";
    PLUS = 11, "+";
    MINUS = 12, "-";
    ASTERISK = 13, "*";
    SLASH = 14, "/";
    PERCENT = 15, "%";
    POWER = 16, "**";
    BANG = 17, "!";
    TILDE = 18, "~";
    INCREMENT = 19, "++";
    DECREMENT = 20, "--";
    EQ = 21, "==";
    NOT_EQ = 22, "!=";
    STRICT_EQ = 23, "===";
    STRICT_NOT_EQ = 24, "!==";
    LT = 25, "<";
    GT = 26, ">";
    LT_EQ = 27, "<=";
    GT_EQ = 28, ">=";
    AND = 29, "&&";
    OR = 30, "||";
    NULLISH = 31, "??";
    AMPERSAND = 32, "&";
    PIPE = 33, "|";
    CARET = 34, "^";
    SHIFT_LEFT = 35, "<<";
    SHIFT_RIGHT = 36, ">>";
    UNSIGNED_SHIFT_RIGHT = 37, ">>>";

    // Compound assignment
    PLUS_ASSIGN = 40, "+=";
    MINUS_ASSIGN = 41, "-=";
    ASTERISK_ASSIGN = 42, "*=";
    SLASH_ASSIGN = 43, "/=";
    PERCENT_ASSIGN = 44, "%=";
    POWER_ASSIGN = 45, "**=";
    AMPERSAND_ASSIGN = 46, "&=";
    PIPE_ASSIGN = 47, "|=";
    CARET_ASSIGN = 48, "^=";
    SHIFT_LEFT_ASSIGN = 49, "<<=";
    SHIFT_RIGHT_ASSIGN = 50, ">>=";

    // Punctuation
    ARROW = 51, "=>";
    QUESTION = 52, "?";
    COLON = 53, ":";
    DOT = 54, ".";
    ELLIPSIS = 55, "...";
    COMMA = 56, ",";
    SEMICOLON = 57, ";";
    LPAREN = 58, "(";
    RPAREN = 59, ")";
    LBRACE = 60, "{";
    RBRACE = 61, "}";
    LBRACKET = 62, "[";
    RBRACKET = 63, "]";

    // Keywords
    LET = 70, "let";
    CONST = 71, "const";
    VAR = 72, "var";
    FUNCTION = 73, "function";
    RETURN = 74, "return";
    IF = 75, "if";
    ELSE = 76, "else";
    WHILE = 77, "while";
    FOR = 78, "for";
    BREAK = 79, "break";
    CONTINUE = 80, "continue";
    TRUE = 81, "true";
    FALSE = 82, "false";
    NULL = 83, "null";
    TYPEOF = 84, "typeof";
    VOID = 85, "void";
    DELETE = 86, "delete";
    NEW = 87, "new";
    INSTANCEOF = 88, "instanceof";
}

impl TokenKind {
    /// First value of the dynamic range.
    pub const DYNAMIC_BASE: u16 = 1000;

    /// Wrap a raw value. Used by the tokenizer's registry when allocating
    /// dynamic kinds.
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        TokenKind(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn is_dynamic(self) -> bool {
        self.0 >= Self::DYNAMIC_BASE
    }

    /// The display name of a built-in kind: the operator text for
    /// punctuation, the keyword for keywords, an upper-case tag otherwise.
    pub fn builtin_name(self) -> Option<&'static str> {
        BUILTIN_NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, name)| *name)
    }

    /// Look up a built-in kind by its display name.
    pub fn from_builtin_name(name: &str) -> Option<TokenKind> {
        BUILTIN_NAMES
            .iter()
            .find(|(_, text)| *text == name)
            .map(|(kind, _)| *kind)
    }

    pub fn from_keyword(text: &str) -> Option<TokenKind> {
        match text {
            "let" => Some(TokenKind::LET),
            "const" => Some(TokenKind::CONST),
            "var" => Some(TokenKind::VAR),
            "function" => Some(TokenKind::FUNCTION),
            "return" => Some(TokenKind::RETURN),
            "if" => Some(TokenKind::IF),
            "else" => Some(TokenKind::ELSE),
            "while" => Some(TokenKind::WHILE),
            "for" => Some(TokenKind::FOR),
            "break" => Some(TokenKind::BREAK),
            "continue" => Some(TokenKind::CONTINUE),
            "true" => Some(TokenKind::TRUE),
            "false" => Some(TokenKind::FALSE),
            "null" => Some(TokenKind::NULL),
            "typeof" => Some(TokenKind::TYPEOF),
            "void" => Some(TokenKind::VOID),
            "delete" => Some(TokenKind::DELETE),
            "new" => Some(TokenKind::NEW),
            "instanceof" => Some(TokenKind::INSTANCEOF),
            _ => None,
        }
    }

    pub fn is_keyword(self) -> bool {
        self >= TokenKind::LET && self <= TokenKind::INSTANCEOF
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::INT | TokenKind::FLOAT | TokenKind::STRING | TokenKind::TEMPLATE
        )
    }

    pub fn is_assignment_operator(self) -> bool {
        self == TokenKind::ASSIGN || self.is_compound_assignment()
    }

    pub fn is_compound_assignment(self) -> bool {
        self >= TokenKind::PLUS_ASSIGN && self <= TokenKind::SHIFT_RIGHT_ASSIGN
    }

    /// Relative binding of a built-in binary operator, loosest first:
    /// `|| ??`, `&&`, equality, relational, additive, multiplicative.
    /// `None` for every other kind, including the bitwise operators.
    pub fn binary_level(self) -> Option<u8> {
        let level = match self {
            TokenKind::OR | TokenKind::NULLISH => 1,
            TokenKind::AND => 2,
            TokenKind::EQ | TokenKind::NOT_EQ | TokenKind::STRICT_EQ | TokenKind::STRICT_NOT_EQ => 3,
            TokenKind::LT
            | TokenKind::GT
            | TokenKind::LT_EQ
            | TokenKind::GT_EQ
            | TokenKind::INSTANCEOF => 4,
            TokenKind::PLUS | TokenKind::MINUS => 5,
            TokenKind::ASTERISK | TokenKind::SLASH | TokenKind::PERCENT => 6,
            _ => return None,
        };
        Some(level)
    }

    /// Whether a token of this kind can begin a statement-level keyword form.
    pub fn starts_declaration_or_control(self) -> bool {
        matches!(
            self,
            TokenKind::LET
                | TokenKind::CONST
                | TokenKind::VAR
                | TokenKind::FUNCTION
                | TokenKind::RETURN
                | TokenKind::IF
                | TokenKind::WHILE
                | TokenKind::FOR
                | TokenKind::BREAK
                | TokenKind::CONTINUE
        )
    }
}

impl fmt::Debug for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin_name() {
            Some(name) => write!(f, "TokenKind({})", name),
            None => write!(f, "TokenKind(#{})", self.0),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin_name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "#{}", self.0),
        }
    }
}
