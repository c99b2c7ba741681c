//! The base scanner.
//!
//! Converts source text into tokens one at a time. It is also the handle
//! token interceptors receive, so everything an interceptor needs to
//! consume extra input or build its own tokens is public.

use crate::char_codes::*;
use crate::token::Token;
use plait_ast::types::TokenFlags;
use plait_ast::TokenKind;
use plait_core::text::Position;

pub struct Scanner {
    /// The source text being scanned.
    text: Vec<char>,
    /// Index of the current character.
    pos: usize,
    /// Line/column of the current character.
    line: u32,
    column: u32,
    /// Index and position where the token being scanned starts.
    token_start: usize,
    token_start_position: Position,
    /// Decoded value for string-like tokens.
    token_value: Option<String>,
    /// Flags collected for the token being scanned, including the
    /// line-break flag recorded while skipping whitespace before it.
    token_flags: TokenFlags,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            pos: 0,
            line: 0,
            column: 0,
            token_start: 0,
            token_start_position: Position::default(),
            token_value: None,
            token_flags: TokenFlags::NONE,
        }
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    /// The character under the cursor.
    #[inline]
    pub fn current_char(&self) -> Option<char> {
        self.text.get(self.pos).copied()
    }

    /// The character after the cursor.
    #[inline]
    pub fn peek_char(&self) -> Option<char> {
        self.char_at(1)
    }

    #[inline]
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(self.pos + offset).copied()
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Position of the character under the cursor.
    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Consume the current character and return it.
    pub fn bump(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.pos += 1;
        let ends_line = match ch {
            '\r' => self.current_char() != Some('\n'),
            c => is_line_break(c),
        };
        if ends_line {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Consume characters while `pred` holds and return them.
    pub fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(ch) = self.current_char() {
            if !pred(ch) {
                break;
            }
            out.push(ch);
            self.bump();
        }
        out
    }

    /// Skip whitespace, remembering whether a line break was crossed.
    pub fn skip_trivia(&mut self) {
        while let Some(ch) = self.current_char() {
            if is_line_break(ch) {
                self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                self.bump();
            } else if is_white_space_single_line(ch) {
                self.bump();
            } else {
                break;
            }
        }
    }

    // ========================================================================
    // Token assembly
    // ========================================================================

    /// Skip trivia and mark the start of a new token at the cursor.
    pub fn start_token(&mut self) {
        self.skip_trivia();
        self.token_start = self.pos;
        self.token_start_position = self.position();
        self.token_value = None;
    }

    /// Source text from the token start to the cursor.
    pub fn token_text(&self) -> String {
        self.text[self.token_start..self.pos].iter().collect()
    }

    /// Build a token spanning from the last `start_token` to the cursor.
    /// The pending flags are attached and reset.
    pub fn finish_token(&mut self, kind: TokenKind, literal: impl Into<String>) -> Token {
        let flags = std::mem::take(&mut self.token_flags);
        Token::new(kind, literal, self.token_start_position, self.position()).with_flags(flags)
    }

    /// Add flags to the token being scanned.
    pub fn add_flags(&mut self, flags: TokenFlags) {
        self.token_flags |= flags;
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    /// Scan the next token with the built-in rules.
    pub fn scan(&mut self) -> Token {
        self.start_token();
        let Some(ch) = self.current_char() else {
            return self.finish_token(TokenKind::EOF, "");
        };

        let kind = match ch {
            '(' => self.punct(1, TokenKind::LPAREN),
            ')' => self.punct(1, TokenKind::RPAREN),
            '{' => self.punct(1, TokenKind::LBRACE),
            '}' => self.punct(1, TokenKind::RBRACE),
            '[' => self.punct(1, TokenKind::LBRACKET),
            ']' => self.punct(1, TokenKind::RBRACKET),
            ';' => self.punct(1, TokenKind::SEMICOLON),
            ',' => self.punct(1, TokenKind::COMMA),
            ':' => self.punct(1, TokenKind::COLON),
            '~' => self.punct(1, TokenKind::TILDE),

            '.' => self.scan_dot(),
            '?' => self.scan_question(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '=' => self.scan_equals(),
            '!' => self.scan_exclamation(),
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_asterisk(),
            '/' => self.scan_slash(),
            '%' => self.scan_with_assign(TokenKind::PERCENT, TokenKind::PERCENT_ASSIGN),
            '^' => self.scan_with_assign(TokenKind::CARET, TokenKind::CARET_ASSIGN),
            '&' => self.scan_doubled(TokenKind::AMPERSAND, TokenKind::AND, TokenKind::AMPERSAND_ASSIGN),
            '|' => self.scan_doubled(TokenKind::PIPE, TokenKind::OR, TokenKind::PIPE_ASSIGN),

            '\'' | '"' => self.scan_string_literal(ch),
            '`' => self.scan_template_literal(),

            '0'..='9' => self.scan_number(),

            _ if is_identifier_start(ch) => self.scan_identifier(),

            _ => {
                self.bump();
                tracing::trace!(character = %ch, position = ?self.token_start_position, "illegal character");
                TokenKind::ILLEGAL
            }
        };

        let literal = match self.token_value.take() {
            Some(value) => value,
            None => self.token_text(),
        };
        let raw = (kind == TokenKind::STRING
            && self.token_flags.contains(TokenFlags::CONTAINS_INVALID_ESCAPE))
        .then(|| self.token_text());
        let mut token = self.finish_token(kind, literal);
        token.raw = raw;
        token
    }

    #[inline]
    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.bump();
        }
    }

    #[inline]
    fn punct(&mut self, len: usize, kind: TokenKind) -> TokenKind {
        self.advance_by(len);
        kind
    }

    fn scan_dot(&mut self) -> TokenKind {
        if self.char_at(1) == Some('.') && self.char_at(2) == Some('.') {
            self.punct(3, TokenKind::ELLIPSIS)
        } else if self.char_at(1).map_or(false, is_digit) {
            self.scan_number()
        } else {
            self.punct(1, TokenKind::DOT)
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        if self.char_at(1) == Some('?') {
            self.punct(2, TokenKind::NULLISH)
        } else {
            self.punct(1, TokenKind::QUESTION)
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        match (self.char_at(1), self.char_at(2)) {
            (Some('<'), Some('=')) => self.punct(3, TokenKind::SHIFT_LEFT_ASSIGN),
            (Some('<'), _) => self.punct(2, TokenKind::SHIFT_LEFT),
            (Some('='), _) => self.punct(2, TokenKind::LT_EQ),
            _ => self.punct(1, TokenKind::LT),
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        match (self.char_at(1), self.char_at(2)) {
            (Some('>'), Some('>')) => self.punct(3, TokenKind::UNSIGNED_SHIFT_RIGHT),
            (Some('>'), Some('=')) => self.punct(3, TokenKind::SHIFT_RIGHT_ASSIGN),
            (Some('>'), _) => self.punct(2, TokenKind::SHIFT_RIGHT),
            (Some('='), _) => self.punct(2, TokenKind::GT_EQ),
            _ => self.punct(1, TokenKind::GT),
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        match (self.char_at(1), self.char_at(2)) {
            (Some('='), Some('=')) => self.punct(3, TokenKind::STRICT_EQ),
            (Some('='), _) => self.punct(2, TokenKind::EQ),
            (Some('>'), _) => self.punct(2, TokenKind::ARROW),
            _ => self.punct(1, TokenKind::ASSIGN),
        }
    }

    fn scan_exclamation(&mut self) -> TokenKind {
        match (self.char_at(1), self.char_at(2)) {
            (Some('='), Some('=')) => self.punct(3, TokenKind::STRICT_NOT_EQ),
            (Some('='), _) => self.punct(2, TokenKind::NOT_EQ),
            _ => self.punct(1, TokenKind::BANG),
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        match self.char_at(1) {
            Some('+') => self.punct(2, TokenKind::INCREMENT),
            Some('=') => self.punct(2, TokenKind::PLUS_ASSIGN),
            _ => self.punct(1, TokenKind::PLUS),
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        match self.char_at(1) {
            Some('-') => self.punct(2, TokenKind::DECREMENT),
            Some('=') => self.punct(2, TokenKind::MINUS_ASSIGN),
            _ => self.punct(1, TokenKind::MINUS),
        }
    }

    fn scan_asterisk(&mut self) -> TokenKind {
        match (self.char_at(1), self.char_at(2)) {
            (Some('*'), Some('=')) => self.punct(3, TokenKind::POWER_ASSIGN),
            (Some('*'), _) => self.punct(2, TokenKind::POWER),
            (Some('='), _) => self.punct(2, TokenKind::ASTERISK_ASSIGN),
            _ => self.punct(1, TokenKind::ASTERISK),
        }
    }

    fn scan_slash(&mut self) -> TokenKind {
        match self.char_at(1) {
            Some('/') => self.scan_line_comment(),
            Some('*') => self.scan_block_comment(),
            Some('=') => self.punct(2, TokenKind::SLASH_ASSIGN),
            _ => self.punct(1, TokenKind::SLASH),
        }
    }

    /// `x` or `x=`.
    fn scan_with_assign(&mut self, single: TokenKind, assign: TokenKind) -> TokenKind {
        if self.char_at(1) == Some('=') {
            self.punct(2, assign)
        } else {
            self.punct(1, single)
        }
    }

    /// `x`, `xx` or `x=`.
    fn scan_doubled(&mut self, single: TokenKind, doubled: TokenKind, assign: TokenKind) -> TokenKind {
        let ch = self.current_char();
        if self.char_at(1) == ch {
            self.punct(2, doubled)
        } else {
            self.scan_with_assign(single, assign)
        }
    }

    fn scan_line_comment(&mut self) -> TokenKind {
        self.eat_while(|c| !is_line_break(c));
        TokenKind::COMMENT
    }

    fn scan_block_comment(&mut self) -> TokenKind {
        self.advance_by(2);
        loop {
            match self.current_char() {
                None => {
                    self.token_flags |= TokenFlags::UNTERMINATED;
                    break;
                }
                Some('*') if self.peek_char() == Some('/') => {
                    self.advance_by(2);
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        TokenKind::COMMENT
    }

    // ========================================================================
    // Strings
    // ========================================================================

    fn scan_string_literal(&mut self, quote: char) -> TokenKind {
        self.bump();
        if quote == '\'' {
            self.token_flags |= TokenFlags::SINGLE_QUOTE;
        }
        let mut result = String::new();
        loop {
            match self.current_char() {
                None => {
                    self.token_flags |= TokenFlags::UNTERMINATED;
                    break;
                }
                Some(ch) if ch == quote => {
                    self.bump();
                    break;
                }
                Some('\\') => self.scan_escape_sequence(&mut result),
                Some(ch) if is_line_break(ch) => {
                    self.token_flags |= TokenFlags::UNTERMINATED;
                    break;
                }
                Some(ch) => {
                    result.push(ch);
                    self.bump();
                }
            }
        }
        self.token_value = Some(result);
        TokenKind::STRING
    }

    /// Decode one escape sequence starting at the backslash. A sequence
    /// that does not decode is copied through as written.
    fn scan_escape_sequence(&mut self, out: &mut String) {
        self.bump();
        let Some(ch) = self.current_char() else {
            out.push('\\');
            return;
        };
        match ch {
            'n' => self.push_escape(out, '\n'),
            't' => self.push_escape(out, '\t'),
            'r' => self.push_escape(out, '\r'),
            'b' => self.push_escape(out, '\u{0008}'),
            'f' => self.push_escape(out, '\u{000C}'),
            'v' => self.push_escape(out, '\u{000B}'),
            '0' if !self.peek_char().map_or(false, is_digit) => self.push_escape(out, '\0'),
            '\\' | '\'' | '"' => self.push_escape(out, ch),
            '\r' => {
                // Line continuation.
                self.bump();
                if self.current_char() == Some('\n') {
                    self.bump();
                }
            }
            '\n' | LINE_SEPARATOR | PARAGRAPH_SEPARATOR => {
                self.bump();
            }
            'x' => match self.hex_value(1, 2) {
                Some(c) => {
                    self.advance_by(3);
                    out.push(c);
                }
                None => self.pass_through_escape(out, ch),
            },
            'u' => self.scan_unicode_escape(out),
            _ => self.pass_through_escape(out, ch),
        }
    }

    #[inline]
    fn push_escape(&mut self, out: &mut String, decoded: char) {
        self.bump();
        out.push(decoded);
    }

    /// Keep `\` and the escape letter; whatever follows is read as ordinary
    /// string content.
    fn pass_through_escape(&mut self, out: &mut String, ch: char) {
        self.token_flags |= TokenFlags::CONTAINS_INVALID_ESCAPE;
        out.push('\\');
        out.push(ch);
        self.bump();
    }

    /// `\uHHHH`, a `\uHHHH\uHHHH` surrogate pair, or `\u{H...}`.
    fn scan_unicode_escape(&mut self, out: &mut String) {
        if self.peek_char() == Some('{') {
            let mut offset = 2;
            let mut value: u32 = 0;
            let mut digits = 0;
            while let Some(c) = self.char_at(offset) {
                let Some(d) = c.to_digit(16) else { break };
                value = value.saturating_mul(16).saturating_add(d);
                digits += 1;
                offset += 1;
            }
            let closed = self.char_at(offset) == Some('}');
            let decoded = (closed && digits > 0 && value <= MAX_CODE_POINT)
                .then(|| char::from_u32(value))
                .flatten();
            match decoded {
                Some(c) => {
                    self.advance_by(offset + 1);
                    self.token_flags |= TokenFlags::EXTENDED_UNICODE_ESCAPE;
                    out.push(c);
                }
                None => self.pass_through_escape(out, 'u'),
            }
            return;
        }

        let Some(unit) = self.hex_code_unit(1) else {
            self.pass_through_escape(out, 'u');
            return;
        };
        if let Some(c) = char::from_u32(unit) {
            self.advance_by(5);
            out.push(c);
            return;
        }
        // High surrogate followed by `\u` low surrogate.
        if (0xD800..0xDC00).contains(&unit)
            && self.char_at(5) == Some('\\')
            && self.char_at(6) == Some('u')
        {
            if let Some(low) = self.hex_code_unit(7).filter(|l| (0xDC00..0xE000).contains(l)) {
                let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                if let Some(c) = char::from_u32(combined) {
                    self.advance_by(11);
                    out.push(c);
                    return;
                }
            }
        }
        self.pass_through_escape(out, 'u');
    }

    /// Four hex digits starting `offset` characters after the cursor.
    fn hex_code_unit(&self, offset: usize) -> Option<u32> {
        let mut value = 0;
        for i in 0..4 {
            value = value * 16 + self.char_at(offset + i)?.to_digit(16)?;
        }
        Some(value)
    }

    /// `count` hex digits starting `offset` characters after the cursor,
    /// as a character.
    fn hex_value(&self, offset: usize, count: usize) -> Option<char> {
        let mut value = 0;
        for i in 0..count {
            value = value * 16 + self.char_at(offset + i)?.to_digit(16)?;
        }
        char::from_u32(value)
    }

    /// Backtick strings: only the delimiter escape is recognized.
    fn scan_template_literal(&mut self) -> TokenKind {
        self.bump();
        let mut result = String::new();
        loop {
            match self.current_char() {
                None => {
                    self.token_flags |= TokenFlags::UNTERMINATED;
                    break;
                }
                Some('`') => {
                    self.bump();
                    break;
                }
                Some('\\') if self.peek_char() == Some('`') => {
                    self.advance_by(2);
                    result.push('`');
                }
                Some(ch) => {
                    result.push(ch);
                    self.bump();
                }
            }
        }
        self.token_value = Some(result);
        TokenKind::TEMPLATE
    }

    // ========================================================================
    // Numbers and names
    // ========================================================================

    fn scan_number(&mut self) -> TokenKind {
        if self.current_char() == Some('0') {
            let prefixed = match self.peek_char() {
                Some('x') | Some('X') => Some((TokenFlags::HEX_SPECIFIER, 16)),
                Some('b') | Some('B') => Some((TokenFlags::BINARY_SPECIFIER, 2)),
                Some('o') | Some('O') => Some((TokenFlags::OCTAL_SPECIFIER, 8)),
                _ => None,
            };
            if let Some((flag, radix)) = prefixed {
                self.advance_by(2);
                self.token_flags |= flag;
                self.eat_while(|c| c == '_' || c.is_digit(radix));
                return TokenKind::INT;
            }
        }

        let mut kind = TokenKind::INT;
        self.scan_digits();

        if self.current_char() == Some('.') && self.peek_char().map_or(false, is_digit) {
            self.bump();
            self.scan_digits();
            kind = TokenKind::FLOAT;
        }

        if let Some('e') | Some('E') = self.current_char() {
            let digits_at = match self.peek_char() {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if self.char_at(digits_at).map_or(false, is_digit) {
                self.advance_by(digits_at);
                self.scan_digits();
                self.token_flags |= TokenFlags::SCIENTIFIC;
                kind = TokenKind::FLOAT;
            }
        }

        kind
    }

    fn scan_digits(&mut self) {
        self.eat_while(|c| c == '_' || is_digit(c));
    }

    fn scan_identifier(&mut self) -> TokenKind {
        self.bump();
        self.eat_while(is_identifier_part);
        TokenKind::from_keyword(&self.token_text()).unwrap_or(TokenKind::IDENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        loop {
            let token = scanner.scan();
            if token.kind == TokenKind::EOF {
                return out;
            }
            out.push(token.kind);
        }
    }

    fn single(source: &str) -> Token {
        Scanner::new(source).scan()
    }

    #[test]
    fn test_scan_simple_tokens() {
        assert_eq!(
            kinds("( ) { } [ ] ; , : ~"),
            vec![
                TokenKind::LPAREN,
                TokenKind::RPAREN,
                TokenKind::LBRACE,
                TokenKind::RBRACE,
                TokenKind::LBRACKET,
                TokenKind::RBRACKET,
                TokenKind::SEMICOLON,
                TokenKind::COMMA,
                TokenKind::COLON,
                TokenKind::TILDE,
            ]
        );
    }

    #[test]
    fn test_scan_operators() {
        assert_eq!(
            kinds("+ ++ += - -- -= * ** *= **= / /= % %= === !== == != => ?? ?"),
            vec![
                TokenKind::PLUS,
                TokenKind::INCREMENT,
                TokenKind::PLUS_ASSIGN,
                TokenKind::MINUS,
                TokenKind::DECREMENT,
                TokenKind::MINUS_ASSIGN,
                TokenKind::ASTERISK,
                TokenKind::POWER,
                TokenKind::ASTERISK_ASSIGN,
                TokenKind::POWER_ASSIGN,
                TokenKind::SLASH,
                TokenKind::SLASH_ASSIGN,
                TokenKind::PERCENT,
                TokenKind::PERCENT_ASSIGN,
                TokenKind::STRICT_EQ,
                TokenKind::STRICT_NOT_EQ,
                TokenKind::EQ,
                TokenKind::NOT_EQ,
                TokenKind::ARROW,
                TokenKind::NULLISH,
                TokenKind::QUESTION,
            ]
        );
    }

    #[test]
    fn test_scan_bitwise_and_shift() {
        assert_eq!(
            kinds("& && &= | || |= ^ ^= << <<= >> >>= >>> < <= > >="),
            vec![
                TokenKind::AMPERSAND,
                TokenKind::AND,
                TokenKind::AMPERSAND_ASSIGN,
                TokenKind::PIPE,
                TokenKind::OR,
                TokenKind::PIPE_ASSIGN,
                TokenKind::CARET,
                TokenKind::CARET_ASSIGN,
                TokenKind::SHIFT_LEFT,
                TokenKind::SHIFT_LEFT_ASSIGN,
                TokenKind::SHIFT_RIGHT,
                TokenKind::SHIFT_RIGHT_ASSIGN,
                TokenKind::UNSIGNED_SHIFT_RIGHT,
                TokenKind::LT,
                TokenKind::LT_EQ,
                TokenKind::GT,
                TokenKind::GT_EQ,
            ]
        );
    }

    #[test]
    fn test_scan_identifier_and_keyword() {
        let mut scanner = Scanner::new("let x = 42;");
        assert_eq!(scanner.scan().kind, TokenKind::LET);
        let x = scanner.scan();
        assert_eq!(x.kind, TokenKind::IDENT);
        assert_eq!(x.literal, "x");
        assert_eq!(scanner.scan().kind, TokenKind::ASSIGN);
        let n = scanner.scan();
        assert_eq!(n.kind, TokenKind::INT);
        assert_eq!(n.literal, "42");
        assert_eq!(scanner.scan().kind, TokenKind::SEMICOLON);
        assert_eq!(scanner.scan().kind, TokenKind::EOF);
    }

    #[test]
    fn test_scan_unicode_identifier() {
        let token = single("größe$_1");
        assert_eq!(token.kind, TokenKind::IDENT);
        assert_eq!(token.literal, "größe$_1");
        assert_eq!(token.end.column, 8);
    }

    #[test]
    fn test_positions() {
        let mut scanner = Scanner::new("let a\n  = 1");
        let let_token = scanner.scan();
        assert_eq!(let_token.start, Position::new(0, 0));
        assert_eq!(let_token.end, Position::new(0, 3));
        let a = scanner.scan();
        assert_eq!(a.start, Position::new(0, 4));
        assert!(!a.has_preceding_line_break());
        let eq = scanner.scan();
        assert_eq!(eq.start, Position::new(1, 2));
        assert!(eq.has_preceding_line_break());
        let one = scanner.scan();
        assert!(!one.has_preceding_line_break());
    }

    #[test]
    fn test_crlf_is_one_line_break() {
        let mut scanner = Scanner::new("a\r\nb");
        scanner.scan();
        let b = scanner.scan();
        assert_eq!(b.start, Position::new(1, 0));
        assert!(b.has_preceding_line_break());
    }

    #[test]
    fn test_scan_string_literal() {
        let mut scanner = Scanner::new(r#""hello" 'world'"#);
        let hello = scanner.scan();
        assert_eq!(hello.kind, TokenKind::STRING);
        assert_eq!(hello.literal, "hello");
        assert!(!hello.flags.contains(TokenFlags::SINGLE_QUOTE));
        let world = scanner.scan();
        assert_eq!(world.literal, "world");
        assert!(world.flags.contains(TokenFlags::SINGLE_QUOTE));
    }

    #[test]
    fn test_standard_escapes() {
        assert_eq!(single(r#""a\nb\t\"\\\'""#).literal, "a\nb\t\"\\'");
        assert_eq!(single(r#""\0""#).literal, "\0");
    }

    #[test]
    fn test_hex_and_unicode_escapes() {
        assert_eq!(single(r#""\x41B\u{1F600}""#).literal, "AB\u{1F600}");
        let pair = single(r#""\uD83D\uDE00""#);
        assert_eq!(pair.literal, "\u{1F600}");
        assert!(single(r#""\u{41}""#).flags.contains(TokenFlags::EXTENDED_UNICODE_ESCAPE));
    }

    #[test]
    fn test_invalid_escapes_pass_through() {
        let too_big = single(r#""\u{110000}""#);
        assert_eq!(too_big.literal, r"\u{110000}");
        assert!(too_big.flags.contains(TokenFlags::CONTAINS_INVALID_ESCAPE));
        assert_eq!(single(r#""\xZZ""#).literal, r"\xZZ");
        assert_eq!(single(r#""\q""#).literal, r"\q");
        assert_eq!(single(r#""\uD800x""#).literal, r"\uD800x");
        assert_eq!(single(r#""\u{}""#).literal, r"\u{}");
    }

    #[test]
    fn test_raw_text_kept_only_for_undecoded_escapes() {
        assert_eq!(single(r#"'a\n\q'"#).raw.as_deref(), Some(r"'a\n\q'"));
        assert_eq!(single(r#""a\n""#).raw, None);
        assert_eq!(single("ident").raw, None);
    }

    #[test]
    fn test_line_continuation() {
        assert_eq!(single("\"a\\\nb\"").literal, "ab");
    }

    #[test]
    fn test_unterminated_string_keeps_partial_literal() {
        let mut scanner = Scanner::new("\"abc\nlet");
        let s = scanner.scan();
        assert_eq!(s.kind, TokenKind::STRING);
        assert_eq!(s.literal, "abc");
        assert!(s.is_unterminated());
        let next = scanner.scan();
        assert_eq!(next.kind, TokenKind::LET);
        assert!(next.has_preceding_line_break());

        let eof = single("'abc");
        assert_eq!(eof.literal, "abc");
        assert!(eof.is_unterminated());
    }

    #[test]
    fn test_scan_template_literal() {
        let token = single(r"`a\`b\n`");
        assert_eq!(token.kind, TokenKind::TEMPLATE);
        assert_eq!(token.literal, r"a`b\n");
        let unterminated = single("`abc");
        assert!(unterminated.is_unterminated());
        assert_eq!(unterminated.literal, "abc");
    }

    #[test]
    fn test_scan_number_formats() {
        let mut scanner = Scanner::new("42 3.14 0xff 0b1010 0o777 1_000 .5 1e10 2E-3 7.toString");
        let expected = [
            (TokenKind::INT, "42"),
            (TokenKind::FLOAT, "3.14"),
            (TokenKind::INT, "0xff"),
            (TokenKind::INT, "0b1010"),
            (TokenKind::INT, "0o777"),
            (TokenKind::INT, "1_000"),
            (TokenKind::FLOAT, ".5"),
            (TokenKind::FLOAT, "1e10"),
            (TokenKind::FLOAT, "2E-3"),
            (TokenKind::INT, "7"),
            (TokenKind::DOT, "."),
            (TokenKind::IDENT, "toString"),
        ];
        for (kind, literal) in expected {
            let token = scanner.scan();
            assert_eq!((token.kind, token.literal.as_str()), (kind, literal));
        }
    }

    #[test]
    fn test_number_flags() {
        assert!(single("0xff").flags.contains(TokenFlags::HEX_SPECIFIER));
        assert!(single("1e3").flags.contains(TokenFlags::SCIENTIFIC));
        // `e` without digits is not an exponent.
        let mut scanner = Scanner::new("1em");
        assert_eq!(scanner.scan().literal, "1");
        assert_eq!(scanner.scan().literal, "em");
    }

    #[test]
    fn test_scan_comments() {
        let mut scanner = Scanner::new("// line\nlet /* block */ x");
        let line = scanner.scan();
        assert_eq!(line.kind, TokenKind::COMMENT);
        assert_eq!(line.literal, "// line");
        let let_token = scanner.scan();
        assert_eq!(let_token.kind, TokenKind::LET);
        assert!(let_token.has_preceding_line_break());
        let block = scanner.scan();
        assert_eq!(block.kind, TokenKind::COMMENT);
        assert_eq!(block.literal, "/* block */");
        assert_eq!(scanner.scan().literal, "x");
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_end() {
        let mut scanner = Scanner::new("/* never closed\nlet x");
        let comment = scanner.scan();
        assert_eq!(comment.kind, TokenKind::COMMENT);
        assert!(comment.is_unterminated());
        assert_eq!(comment.literal, "/* never closed\nlet x");
        assert_eq!(scanner.scan().kind, TokenKind::EOF);
    }

    #[test]
    fn test_illegal_characters_do_not_stop_scanning() {
        let mut scanner = Scanner::new("a # b @");
        assert_eq!(scanner.scan().kind, TokenKind::IDENT);
        let hash = scanner.scan();
        assert_eq!(hash.kind, TokenKind::ILLEGAL);
        assert_eq!(hash.literal, "#");
        assert_eq!(scanner.scan().kind, TokenKind::IDENT);
        assert_eq!(scanner.scan().kind, TokenKind::ILLEGAL);
        assert_eq!(scanner.scan().kind, TokenKind::EOF);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut scanner = Scanner::new("  ");
        assert_eq!(scanner.scan().kind, TokenKind::EOF);
        assert_eq!(scanner.scan().kind, TokenKind::EOF);
    }
}
