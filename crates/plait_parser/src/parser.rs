//! The parser implementation.
//!
//! Statements are parsed by recursive descent and expressions by precedence
//! climbing over a two-token window (`cur` and `peek`). Every statement and
//! expression parse enters through the interceptor chains composed by the
//! builder, so plugins see the same entry points the base grammar uses.
//!
//! Convention: a parse function is entered with `cur` on the first token of
//! its construct and returns with `cur` on the last one. A function that
//! fails returns `None` after recording an error; callers propagate the
//! `None` without adding errors of their own.

use crate::builder::{ExpressionChain, StatementChain};
use crate::context::{ContextGuard, ContextType};
use crate::precedence::{infix_precedence, OperatorTable, Precedence};
use crate::utilities::{is_continuation_kind, is_list_terminator, is_property_name};
use plait_ast::node::*;
use plait_ast::types::TokenFlags;
use plait_ast::TokenKind;
use plait_core::text::{Position, Range};
use plait_diagnostics::{messages, DiagnosticMessage, ParserError};
use plait_options::ParseOptions;
use plait_scanner::{Token, Tokenizer};
use std::rc::Rc;

/// Maximum nesting of statements and expressions before the parser gives
/// up on a construct.
const MAX_RECURSION_DEPTH: u32 = 200;

pub struct Parser {
    tokenizer: Tokenizer,
    options: ParseOptions,
    operators: OperatorTable,
    statement_chain: StatementChain,
    expression_chain: ExpressionChain,
    cur: Token,
    peek: Token,
    errors: Vec<ParserError>,
    /// Comments read but not yet placed into a statement list.
    pending_comments: Vec<Comment>,
    contexts: Vec<ContextType>,
    depth: u32,
}

impl Parser {
    pub(crate) fn new(
        tokenizer: Tokenizer,
        options: ParseOptions,
        operators: OperatorTable,
        statement_chain: StatementChain,
        expression_chain: ExpressionChain,
    ) -> Self {
        let placeholder = Token::new(TokenKind::EOF, "", Position::default(), Position::default());
        let mut parser = Self {
            tokenizer,
            options,
            operators,
            statement_chain,
            expression_chain,
            cur: placeholder.clone(),
            peek: placeholder,
            errors: Vec::new(),
            pending_comments: Vec::new(),
            contexts: vec![ContextType::Global],
            depth: 0,
        };
        parser.next_token();
        parser.next_token();
        parser
    }

    /// Parse the whole input. All errors are returned alongside whatever
    /// tree could be built.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse_program(mut self) -> (Program, Vec<ParserError>) {
        let statements = self.parse_statement_list(false);
        let span = Range::new(Position::default(), self.cur.end);
        tracing::debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        (Program::new(statements, span), self.errors)
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    pub fn cur_token(&self) -> &Token {
        &self.cur
    }

    #[inline]
    pub fn peek_token(&self) -> &Token {
        &self.peek
    }

    #[inline]
    pub fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.is(kind)
    }

    #[inline]
    pub fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    /// Shift the window one token forward.
    pub fn next_token(&mut self) {
        let next = self.read_token();
        self.cur = std::mem::replace(&mut self.peek, next);
    }

    /// Pull the next significant token, setting comments aside. A token
    /// that follows a comment is flagged `PRECEDING_COMMENT`, and inherits
    /// a line break crossed before or inside the comment.
    fn read_token(&mut self) -> Token {
        let mut carried = TokenFlags::NONE;
        loop {
            let token = self.tokenizer.next_token();
            if !token.is(TokenKind::COMMENT) {
                let flags = token.flags | carried;
                return token.with_flags(flags);
            }
            let span = token.range();
            if token.is_unterminated() {
                self.error(&messages::UNTERMINATED_COMMENT, span, &[]);
            }
            carried |= TokenFlags::PRECEDING_COMMENT;
            if token.has_preceding_line_break() || span.start.line != span.end.line {
                carried |= TokenFlags::PRECEDING_LINE_BREAK;
            }
            self.pending_comments.push(Comment {
                text: token.literal,
                span,
            });
        }
    }

    /// Advance if the next token is `kind`; otherwise record "expected X,
    /// got Y" at the next token and stay put.
    pub fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek.is(kind) {
            self.next_token();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    fn peek_error(&mut self, expected: TokenKind) {
        let expected = self.describe(expected);
        let got = self.describe(self.peek.kind);
        let range = self.peek.range();
        self.error(&messages::EXPECTED_0_GOT_1, range, &[expected.as_str(), got.as_str()]);
    }

    /// Display name for a kind, including dynamic ones.
    pub fn describe(&self, kind: TokenKind) -> String {
        self.tokenizer.describe(kind)
    }

    /// The current token as an operator node.
    pub fn cur_operator(&self) -> Operator {
        Operator::new(self.cur.kind, self.cur.literal.clone(), self.cur.range())
    }

    // ========================================================================
    // Errors
    // ========================================================================

    pub fn error(&mut self, message: &DiagnosticMessage, range: Range, args: &[&str]) {
        self.errors.push(ParserError::new(message, range, args));
    }

    /// Record an error built elsewhere, e.g. a plugin's own wording.
    pub fn report(&mut self, error: ParserError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    /// Report the current token as unexpected.
    fn unexpected_token(&mut self) {
        let range = self.cur.range();
        if self.cur.is(TokenKind::ILLEGAL) {
            let literal = self.cur.literal.clone();
            self.error(&messages::ILLEGAL_CHARACTER_0, range, &[literal.as_str()]);
        } else {
            let got = self.describe(self.cur.kind);
            self.error(&messages::UNEXPECTED_TOKEN_0, range, &[got.as_str()]);
        }
    }

    /// Count one level of nesting. Returns false, with an error recorded,
    /// once the limit is reached.
    fn enter_nested(&mut self) -> bool {
        if self.depth >= MAX_RECURSION_DEPTH {
            tracing::debug!(position = ?self.cur.start, "nesting limit reached");
            let range = self.cur.range();
            self.error(&messages::EXPRESSION_TOO_DEEPLY_NESTED, range, &[]);
            return false;
        }
        self.depth += 1;
        true
    }

    // ========================================================================
    // Context stack
    // ========================================================================

    /// The innermost context.
    pub fn context(&self) -> ContextType {
        self.contexts.last().copied().unwrap_or(ContextType::Global)
    }

    /// Whether any enclosing context is a function body.
    pub fn in_function(&self) -> bool {
        self.contexts.contains(&ContextType::Function)
    }

    pub fn context_depth(&self) -> usize {
        self.contexts.len()
    }

    /// Push `context` until the returned guard is dropped.
    pub fn enter_context(&mut self, context: ContextType) -> ContextGuard<'_> {
        ContextGuard::new(self, context)
    }

    /// Run `f` with `context` pushed.
    pub fn with_context<R>(&mut self, context: ContextType, f: impl FnOnce(&mut Parser) -> R) -> R {
        let mut guard = self.enter_context(context);
        f(&mut guard)
    }

    pub(crate) fn push_context(&mut self, context: ContextType) {
        self.contexts.push(context);
    }

    pub(crate) fn pop_context(&mut self) {
        if self.contexts.len() > 1 {
            self.contexts.pop();
        }
    }

    // ========================================================================
    // Automatic semicolon insertion
    // ========================================================================

    /// Whether `token`, coming next, would continue the expression that
    /// ends at the current token. Comments are transparent here; only a
    /// crossed line break can end the expression.
    pub fn continues_expression(&self, token: &Token) -> bool {
        if !token.has_preceding_line_break() {
            return true;
        }
        if self.options.smart_semicolon
            && matches!(token.kind, TokenKind::LPAREN | TokenKind::LBRACKET)
        {
            return false;
        }
        is_continuation_kind(token.kind) || self.operators.has_infix(token.kind)
    }

    /// Finish a statement. An explicit `;` is consumed. Otherwise a virtual
    /// semicolon is inserted before end of input, `}`, a comment, or a
    /// newline that does not continue the expression. Returns false, with
    /// an error recorded unless tolerant, when none of these hold.
    pub fn expect_terminator(&mut self) -> bool {
        if self.peek.is(TokenKind::SEMICOLON) {
            self.next_token();
            return true;
        }
        if is_list_terminator(self.peek.kind) || self.peek.has_preceding_comment() {
            return true;
        }
        if self.peek.has_preceding_line_break() && !self.continues_expression(&self.peek) {
            tracing::trace!(position = ?self.peek.start, "virtual semicolon");
            return true;
        }
        if self.options.tolerant {
            return true;
        }
        let got = self.describe(self.peek.kind);
        let range = self.peek.range();
        self.error(&messages::MISSING_TERMINATOR_GOT_0, range, &[got.as_str()]);
        false
    }

    // ========================================================================
    // Statement lists and recovery
    // ========================================================================

    fn parse_statement_list(&mut self, in_block: bool) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            self.take_comments(&mut statements);
            if self.cur.is(TokenKind::EOF) || (in_block && self.cur.is(TokenKind::RBRACE)) {
                break;
            }
            let start = self.cur.start;
            match self.parse_statement() {
                Some(statement) => {
                    statements.push(statement);
                    self.next_token();
                }
                None => self.synchronize(start, in_block),
            }
        }
        statements
    }

    /// Move comments that end before the current token into `statements`.
    fn take_comments(&mut self, statements: &mut Vec<Statement>) {
        let cutoff = self.cur.start;
        let count = self
            .pending_comments
            .iter()
            .take_while(|comment| comment.span.end <= cutoff)
            .count();
        statements.extend(self.pending_comments.drain(..count).map(Statement::Comment));
    }

    /// Skip to the next statement boundary after a failed statement that
    /// began at `start`.
    fn synchronize(&mut self, start: Position, in_block: bool) {
        tracing::debug!(position = ?start, "resynchronizing after failed statement");
        loop {
            match self.cur.kind {
                TokenKind::EOF => return,
                TokenKind::RBRACE if in_block => return,
                TokenKind::SEMICOLON => {
                    self.next_token();
                    return;
                }
                _ => {}
            }
            if self.cur.start != start
                && (self.cur.has_preceding_line_break()
                    || self.cur.kind.starts_declaration_or_control())
            {
                return;
            }
            self.next_token();
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Parse one statement through the statement chain.
    pub fn parse_statement(&mut self) -> Option<Statement> {
        if !self.enter_nested() {
            return None;
        }
        let chain = Rc::clone(&self.statement_chain);
        let result = chain(self);
        self.depth -= 1;
        result
    }

    /// The built-in statement grammar, at the end of the chain.
    pub(crate) fn parse_statement_base(&mut self) -> Option<Statement> {
        match self.cur.kind {
            TokenKind::LET | TokenKind::CONST | TokenKind::VAR => self.parse_variable_statement(),
            TokenKind::FUNCTION if self.peek.is(TokenKind::IDENT) => {
                self.parse_function_declaration()
            }
            TokenKind::RETURN => self.parse_return_statement(),
            TokenKind::IF => self.parse_if_statement(),
            TokenKind::WHILE => self.parse_while_statement(),
            TokenKind::FOR => self.parse_for_statement(),
            TokenKind::LBRACE => Some(Statement::Block(self.parse_block())),
            TokenKind::BREAK => {
                let span = self.cur.range();
                self.expect_terminator();
                Some(Statement::Break(span))
            }
            TokenKind::CONTINUE => {
                let span = self.cur.range();
                self.expect_terminator();
                Some(Statement::Continue(span))
            }
            TokenKind::SEMICOLON => Some(Statement::Empty(self.cur.range())),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_variable_statement(&mut self) -> Option<Statement> {
        let mut declaration = self.parse_variable_declaration()?;
        self.expect_terminator();
        declaration.span.end = self.cur.end;
        Some(Statement::Variable(declaration))
    }

    /// `let a = 1, b` without the terminator.
    fn parse_variable_declaration(&mut self) -> Option<VariableDeclaration> {
        let start = self.cur.start;
        let Some(kind) = DeclarationKind::from_token(self.cur.kind) else {
            self.unexpected_token();
            return None;
        };
        let mut declarators = Vec::new();
        loop {
            if !self.expect_peek(TokenKind::IDENT) {
                return None;
            }
            let name = Identifier::new(self.cur.literal.clone(), self.cur.range());
            let init = if self.peek.is(TokenKind::ASSIGN) {
                self.next_token();
                self.next_token();
                Some(self.parse_expression(Precedence::LOWEST)?)
            } else {
                None
            };
            declarators.push(VariableDeclarator { name, init });
            if !self.peek.is(TokenKind::COMMA) {
                break;
            }
            self.next_token();
        }
        Some(VariableDeclaration {
            kind,
            declarators,
            span: Range::new(start, self.cur.end),
        })
    }

    fn parse_function_declaration(&mut self) -> Option<Statement> {
        let start = self.cur.start;
        let (name, params, body) = self.parse_function_parts()?;
        let Some(name) = name else {
            self.peek_error(TokenKind::IDENT);
            return None;
        };
        Some(Statement::Function(FunctionDeclaration {
            name,
            params,
            body,
            span: Range::new(start, self.cur.end),
        }))
    }

    /// `function name?(params) { body }`, entered on `function`.
    fn parse_function_parts(&mut self) -> Option<(Option<Identifier>, Vec<Identifier>, Block)> {
        let name = if self.peek.is(TokenKind::IDENT) {
            self.next_token();
            Some(Identifier::new(self.cur.literal.clone(), self.cur.range()))
        } else {
            None
        };
        if !self.expect_peek(TokenKind::LPAREN) {
            return None;
        }
        let params = self.parse_parameters()?;
        if !self.expect_peek(TokenKind::LBRACE) {
            return None;
        }
        let body = self.parse_block_in(ContextType::Function);
        Some((name, params, body))
    }

    /// Entered on `(`, leaves `cur` on `)`.
    fn parse_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut params = Vec::new();
        if self.peek.is(TokenKind::RPAREN) {
            self.next_token();
            return Some(params);
        }
        loop {
            if !self.expect_peek(TokenKind::IDENT) {
                return None;
            }
            params.push(Identifier::new(self.cur.literal.clone(), self.cur.range()));
            if !self.peek.is(TokenKind::COMMA) {
                break;
            }
            self.next_token();
        }
        if !self.expect_peek(TokenKind::RPAREN) {
            return None;
        }
        Some(params)
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let start = self.cur.start;
        let ends_here = is_list_terminator(self.peek.kind)
            || self.peek.is(TokenKind::SEMICOLON)
            || self.peek.has_preceding_line_break();
        let value = if ends_here {
            None
        } else {
            self.next_token();
            Some(self.parse_expression(Precedence::LOWEST)?)
        };
        self.expect_terminator();
        Some(Statement::Return(ReturnStatement {
            value,
            span: Range::new(start, self.cur.end),
        }))
    }

    /// `(condition)` after a keyword, leaving `cur` on `)`.
    fn parse_condition(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::LPAREN) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::LOWEST)?;
        if !self.expect_peek(TokenKind::RPAREN) {
            return None;
        }
        Some(condition)
    }

    fn parse_if_statement(&mut self) -> Option<Statement> {
        let start = self.cur.start;
        let condition = self.parse_condition()?;
        self.next_token();
        let consequence = Box::new(self.parse_statement()?);
        let alternative = if self.peek.is(TokenKind::ELSE) {
            self.next_token();
            self.next_token();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Some(Statement::If(IfStatement {
            condition,
            consequence,
            alternative,
            span: Range::new(start, self.cur.end),
        }))
    }

    fn parse_while_statement(&mut self) -> Option<Statement> {
        let start = self.cur.start;
        let condition = self.parse_condition()?;
        self.next_token();
        let body = Box::new(self.parse_statement()?);
        Some(Statement::While(WhileStatement {
            condition,
            body,
            span: Range::new(start, self.cur.end),
        }))
    }

    /// `for (init; test; update) body`
    fn parse_for_statement(&mut self) -> Option<Statement> {
        let start = self.cur.start;
        if !self.expect_peek(TokenKind::LPAREN) {
            return None;
        }

        let init = if self.peek.is(TokenKind::SEMICOLON) {
            None
        } else {
            self.next_token();
            if DeclarationKind::from_token(self.cur.kind).is_some() {
                Some(ForInit::Variable(self.parse_variable_declaration()?))
            } else {
                Some(ForInit::Expression(self.parse_expression(Precedence::LOWEST)?))
            }
        };
        if !self.expect_peek(TokenKind::SEMICOLON) {
            return None;
        }

        let test = self.parse_for_clause(TokenKind::SEMICOLON)?;
        let update = self.parse_for_clause(TokenKind::RPAREN)?;

        self.next_token();
        let body = Box::new(self.parse_statement()?);
        Some(Statement::For(ForStatement {
            init,
            test,
            update,
            body,
            span: Range::new(start, self.cur.end),
        }))
    }

    /// An optional expression followed by `close`. The outer `None` is a
    /// failure; the inner one an omitted clause.
    fn parse_for_clause(&mut self, close: TokenKind) -> Option<Option<Expression>> {
        if self.peek.is(close) {
            self.next_token();
            return Some(None);
        }
        self.next_token();
        let expression = self.parse_expression(Precedence::LOWEST)?;
        if !self.expect_peek(close) {
            return None;
        }
        Some(Some(expression))
    }

    /// Parse `{ ... }` with a `Block` context pushed.
    pub fn parse_block(&mut self) -> Block {
        self.parse_block_in(ContextType::Block)
    }

    /// Entered on `{`. A missing `}` is reported and the block is closed at
    /// end of input.
    fn parse_block_in(&mut self, context: ContextType) -> Block {
        let start = self.cur.start;
        let mut guard = self.enter_context(context);
        guard.next_token();
        let statements = guard.parse_statement_list(true);
        if !guard.cur.is(TokenKind::RBRACE) {
            let got = guard.describe(guard.cur.kind);
            let range = guard.cur.range();
            guard.error(&messages::EXPECTED_0_GOT_1, range, &["}", got.as_str()]);
        }
        Block {
            statements,
            span: Range::new(start, guard.cur.end),
        }
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let start = self.cur.start;
        let expression = self.parse_expression(Precedence::LOWEST)?;
        self.expect_terminator();
        Some(Statement::Expression(ExpressionStatement {
            expression,
            span: Range::new(start, self.cur.end),
        }))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parse an expression through the expression chain, folding operators
    /// that bind tighter than `precedence`.
    pub fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        if !self.enter_nested() {
            return None;
        }
        let chain = Rc::clone(&self.expression_chain);
        let result = chain(self, precedence);
        self.depth -= 1;
        result
    }

    /// The built-in expression grammar, at the end of the chain.
    pub(crate) fn parse_expression_base(&mut self, precedence: Precedence) -> Option<Expression> {
        let left = self.parse_prefix()?;
        self.parse_expression_tail(left, precedence)
    }

    /// The climbing loop: fold infix and postfix operators into `left`
    /// while the next one binds tighter than `precedence`.
    pub fn parse_expression_tail(
        &mut self,
        mut left: Expression,
        precedence: Precedence,
    ) -> Option<Expression> {
        loop {
            if self.peek.is(TokenKind::SEMICOLON) || !self.continues_expression(&self.peek) {
                break;
            }
            match self.operators.precedence(self.peek.kind) {
                Some(next) if next > precedence => {}
                _ => break,
            }
            self.next_token();
            left = self.parse_infix(left)?;
        }
        Some(left)
    }

    /// Binding power of the next token, if it has one.
    pub fn peek_precedence(&self) -> Option<Precedence> {
        self.operators.precedence(self.peek.kind)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        let expression = match self.cur.kind {
            TokenKind::IDENT => {
                Expression::Identifier(Identifier::new(self.cur.literal.clone(), self.cur.range()))
            }
            TokenKind::INT => self.parse_integer_literal(),
            TokenKind::FLOAT => self.parse_float_literal(),
            TokenKind::STRING => self.parse_string_literal(),
            TokenKind::TEMPLATE => {
                if self.cur.is_unterminated() {
                    let range = self.cur.range();
                    self.error(&messages::UNTERMINATED_TEMPLATE_LITERAL, range, &[]);
                }
                Expression::Template(TemplateLiteral {
                    value: self.cur.literal.clone(),
                    span: self.cur.range(),
                })
            }
            TokenKind::TRUE | TokenKind::FALSE => Expression::Boolean(BooleanLiteral {
                value: self.cur.is(TokenKind::TRUE),
                span: self.cur.range(),
            }),
            TokenKind::NULL => Expression::Null(self.cur.range()),
            TokenKind::LPAREN => return self.parse_grouped_expression(),
            TokenKind::LBRACKET => {
                let start = self.cur.start;
                let elements = self.parse_expression_list(TokenKind::RBRACKET)?;
                Expression::Array(ArrayLiteral {
                    elements,
                    span: Range::new(start, self.cur.end),
                })
            }
            TokenKind::LBRACE => return self.parse_object_literal(),
            TokenKind::FUNCTION => {
                let start = self.cur.start;
                let (name, params, body) = self.parse_function_parts()?;
                Expression::Function(FunctionLiteral {
                    name,
                    params,
                    body,
                    span: Range::new(start, self.cur.end),
                })
            }
            TokenKind::BANG
            | TokenKind::MINUS
            | TokenKind::PLUS
            | TokenKind::TILDE
            | TokenKind::INCREMENT
            | TokenKind::DECREMENT
            | TokenKind::TYPEOF
            | TokenKind::VOID
            | TokenKind::DELETE
            | TokenKind::NEW => return self.parse_prefix_expression(),
            _ => {
                self.unexpected_token();
                return None;
            }
        };
        Some(expression)
    }

    fn parse_integer_literal(&mut self) -> Expression {
        let raw = self.cur.literal.clone();
        let digits: String = raw.chars().filter(|&c| c != '_').collect();
        let flags = self.cur.flags;
        let parsed = if flags.contains(TokenFlags::HEX_SPECIFIER) {
            i64::from_str_radix(&digits[2..], 16)
        } else if flags.contains(TokenFlags::BINARY_SPECIFIER) {
            i64::from_str_radix(&digits[2..], 2)
        } else if flags.contains(TokenFlags::OCTAL_SPECIFIER) {
            i64::from_str_radix(&digits[2..], 8)
        } else {
            digits.parse::<i64>()
        };
        let span = self.cur.range();
        let value = match parsed {
            Ok(value) => value,
            Err(_) => {
                self.error(&messages::INVALID_INTEGER_LITERAL_0, span, &[raw.as_str()]);
                0
            }
        };
        Expression::Integer(IntegerLiteral { value, raw, span })
    }

    fn parse_float_literal(&mut self) -> Expression {
        let raw = self.cur.literal.clone();
        let digits: String = raw.chars().filter(|&c| c != '_').collect();
        let span = self.cur.range();
        let value = match digits.parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                self.error(&messages::INVALID_FLOAT_LITERAL_0, span, &[raw.as_str()]);
                0.0
            }
        };
        Expression::Float(FloatLiteral { value, raw, span })
    }

    fn parse_string_literal(&mut self) -> Expression {
        let span = self.cur.range();
        if self.cur.is_unterminated() {
            self.error(&messages::UNTERMINATED_STRING_LITERAL, span, &[]);
        }
        let quote = if self.cur.flags.contains(TokenFlags::SINGLE_QUOTE) {
            Quote::Single
        } else {
            Quote::Double
        };
        Expression::String(StringLiteral {
            value: self.cur.literal.clone(),
            raw: self.cur.raw.clone(),
            quote,
            span,
        })
    }

    /// `(expression)`
    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        let start = self.cur.start;
        self.next_token();
        let expression = self.parse_expression(Precedence::LOWEST)?;
        if !self.expect_peek(TokenKind::RPAREN) {
            return None;
        }
        Some(Expression::Grouped(GroupedExpression {
            expression: Box::new(expression),
            span: Range::new(start, self.cur.end),
        }))
    }

    /// Comma-separated expressions up to `close`, entered on the opening
    /// token. A trailing comma is allowed.
    fn parse_expression_list(&mut self, close: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek.is(close) {
            self.next_token();
            return Some(list);
        }
        self.next_token();
        list.push(self.parse_expression(Precedence::LOWEST)?);
        while self.peek.is(TokenKind::COMMA) {
            self.next_token();
            if self.peek.is(close) {
                break;
            }
            self.next_token();
            list.push(self.parse_expression(Precedence::LOWEST)?);
        }
        if !self.expect_peek(close) {
            return None;
        }
        Some(list)
    }

    /// `{ key: value, shorthand, [computed]: value }`. Properties stay in
    /// source order.
    fn parse_object_literal(&mut self) -> Option<Expression> {
        let start = self.cur.start;
        let mut properties = Vec::new();
        while !self.peek.is(TokenKind::RBRACE) {
            self.next_token();
            properties.push(self.parse_property()?);
            if !self.peek.is(TokenKind::RBRACE) && !self.expect_peek(TokenKind::COMMA) {
                return None;
            }
        }
        self.next_token();
        Some(Expression::Object(ObjectLiteral {
            properties,
            span: Range::new(start, self.cur.end),
        }))
    }

    fn parse_property(&mut self) -> Option<Property> {
        if self.cur.is(TokenKind::LBRACKET) {
            self.next_token();
            let key = self.parse_expression(Precedence::LOWEST)?;
            if !self.expect_peek(TokenKind::RBRACKET) || !self.expect_peek(TokenKind::COLON) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::LOWEST)?;
            return Some(Property {
                key,
                value,
                computed: true,
                shorthand: false,
            });
        }

        let key = match self.cur.kind {
            kind if is_property_name(kind) => {
                Expression::Identifier(Identifier::new(self.cur.literal.clone(), self.cur.range()))
            }
            TokenKind::STRING => self.parse_string_literal(),
            TokenKind::INT => self.parse_integer_literal(),
            TokenKind::FLOAT => self.parse_float_literal(),
            _ => {
                self.unexpected_token();
                return None;
            }
        };

        if self.cur.is(TokenKind::IDENT)
            && matches!(self.peek.kind, TokenKind::COMMA | TokenKind::RBRACE)
        {
            return Some(Property {
                value: key.clone(),
                key,
                computed: false,
                shorthand: true,
            });
        }
        if !self.expect_peek(TokenKind::COLON) {
            return None;
        }
        self.next_token();
        let value = self.parse_expression(Precedence::LOWEST)?;
        Some(Property {
            key,
            value,
            computed: false,
            shorthand: false,
        })
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let start = self.cur.start;
        let operator = self.cur_operator();
        self.next_token();
        let operand = self.parse_expression(Precedence::PREFIX)?;
        if matches!(operator.kind, TokenKind::INCREMENT | TokenKind::DECREMENT) {
            self.check_assignment_target(&operand);
        }
        Some(Expression::Prefix(PrefixExpression {
            operator,
            operand: Box::new(operand),
            span: Range::new(start, self.cur.end),
        }))
    }

    fn check_assignment_target(&mut self, target: &Expression) {
        if !target.is_assignment_target() {
            self.error(&messages::INVALID_ASSIGNMENT_TARGET, target.span(), &[]);
        }
    }

    /// Entered with `cur` on the operator that follows `left`.
    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        let start = left.span().start;
        match self.cur.kind {
            TokenKind::LPAREN => {
                let arguments = self.parse_expression_list(TokenKind::RPAREN)?;
                Some(Expression::Call(CallExpression {
                    callee: Box::new(left),
                    arguments,
                    span: Range::new(start, self.cur.end),
                }))
            }
            TokenKind::DOT => {
                if !is_property_name(self.peek.kind) {
                    self.peek_error(TokenKind::IDENT);
                    return None;
                }
                self.next_token();
                let property = Identifier::new(self.cur.literal.clone(), self.cur.range());
                Some(Expression::Member(MemberExpression {
                    object: Box::new(left),
                    property,
                    span: Range::new(start, self.cur.end),
                }))
            }
            TokenKind::LBRACKET => {
                self.next_token();
                let index = self.parse_expression(Precedence::LOWEST)?;
                if !self.expect_peek(TokenKind::RBRACKET) {
                    return None;
                }
                Some(Expression::Index(IndexExpression {
                    object: Box::new(left),
                    index: Box::new(index),
                    span: Range::new(start, self.cur.end),
                }))
            }
            TokenKind::QUESTION => {
                self.next_token();
                let consequence = self.parse_expression(Precedence::LOWEST)?;
                if !self.expect_peek(TokenKind::COLON) {
                    return None;
                }
                self.next_token();
                let alternative = self.parse_expression(Precedence::LOWEST)?;
                Some(Expression::Conditional(ConditionalExpression {
                    test: Box::new(left),
                    consequence: Box::new(consequence),
                    alternative: Box::new(alternative),
                    span: Range::new(start, self.cur.end),
                }))
            }
            TokenKind::INCREMENT | TokenKind::DECREMENT => {
                self.check_assignment_target(&left);
                let operator = self.cur_operator();
                Some(Expression::Postfix(PostfixExpression {
                    operand: Box::new(left),
                    operator,
                    span: Range::new(start, self.cur.end),
                }))
            }
            kind if kind.is_assignment_operator() => {
                self.check_assignment_target(&left);
                let operator = self.cur_operator();
                self.next_token();
                let value = self.parse_expression(Precedence::LOWEST)?;
                Some(Expression::Assign(AssignExpression {
                    target: Box::new(left),
                    operator,
                    value: Box::new(value),
                    span: Range::new(start, self.cur.end),
                }))
            }
            kind => {
                if let Some(precedence) = infix_precedence(kind) {
                    let operator = self.cur_operator();
                    self.next_token();
                    let right = self.parse_expression(precedence)?;
                    return Some(Expression::Binary(BinaryExpression {
                        left: Box::new(left),
                        operator,
                        right: Box::new(right),
                        span: Range::new(start, self.cur.end),
                    }));
                }
                if let Some((precedence, ctor)) = self.operators.infix(kind) {
                    let operator = self.cur_operator();
                    self.next_token();
                    let right = self.parse_expression(precedence)?;
                    return Some(ctor(left, operator, right));
                }
                if let Some(ctor) = self.operators.postfix(kind) {
                    let operator = self.cur_operator();
                    return Some(ctor(left, operator));
                }
                self.unexpected_token();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParserBuilder;
    use pretty_assertions::assert_eq;

    fn parse_ok(source: &str) -> Program {
        let (program, errors) = ParserBuilder::new().build(source).parse_program();
        assert!(errors.is_empty(), "unexpected errors for {:?}: {:?}", source, errors);
        program
    }

    fn parse_errors(source: &str) -> Vec<ParserError> {
        ParserBuilder::new().build(source).parse_program().1
    }

    fn only_expression(program: &Program) -> &Expression {
        match program.statements.as_slice() {
            [Statement::Expression(stmt)] => &stmt.expression,
            other => panic!("expected one expression statement, got {:?}", other),
        }
    }

    /// Parenthesized structure, for asserting grouping.
    fn shape(expr: &Expression) -> String {
        match expr {
            Expression::Identifier(id) => id.name.clone(),
            Expression::Integer(lit) => lit.raw.clone(),
            Expression::Binary(b) => {
                format!("({} {} {})", shape(&b.left), b.operator.text, shape(&b.right))
            }
            Expression::Prefix(p) => format!("({}{})", p.operator.text, shape(&p.operand)),
            Expression::Postfix(p) => format!("({}{})", shape(&p.operand), p.operator.text),
            Expression::Assign(a) => {
                format!("({} {} {})", shape(&a.target), a.operator.text, shape(&a.value))
            }
            Expression::Conditional(c) => format!(
                "({} ? {} : {})",
                shape(&c.test),
                shape(&c.consequence),
                shape(&c.alternative)
            ),
            Expression::Call(c) => {
                let args: Vec<String> = c.arguments.iter().map(shape).collect();
                format!("{}({})", shape(&c.callee), args.join(", "))
            }
            Expression::Member(m) => format!("{}.{}", shape(&m.object), m.property.name),
            Expression::Index(i) => format!("{}[{}]", shape(&i.object), shape(&i.index)),
            Expression::Grouped(g) => shape(&g.expression),
            other => format!("{:?}", other),
        }
    }

    fn expr_shape(source: &str) -> String {
        shape(only_expression(&parse_ok(source)))
    }

    // ========================================================================
    // Precedence
    // ========================================================================

    #[test]
    fn test_precedence_grouping() {
        assert_eq!(expr_shape("a + b * c"), "(a + (b * c))");
        assert_eq!(expr_shape("a * b + c"), "((a * b) + c)");
        assert_eq!(expr_shape("a - b - c"), "((a - b) - c)");
        assert_eq!(expr_shape("a || b && c"), "(a || (b && c))");
        assert_eq!(expr_shape("a == b < c"), "(a == (b < c))");
        assert_eq!(expr_shape("a ?? b || c"), "((a ?? b) || c)");
        assert_eq!(expr_shape("-a * b"), "((-a) * b)");
        assert_eq!(expr_shape("!a.b(c)"), "(!a.b(c))");
        assert_eq!(expr_shape("a instanceof b + c"), "(a instanceof (b + c))");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(expr_shape("a = b = c + 1"), "(a = (b = (c + 1)))");
        assert_eq!(expr_shape("a += b || c"), "(a += (b || c))");
    }

    #[test]
    fn test_conditional() {
        assert_eq!(expr_shape("a ? b : c ? d : e"), "(a ? b : (c ? d : e))");
        assert_eq!(expr_shape("x = a || b ? c : d"), "(x = ((a || b) ? c : d))");
    }

    #[test]
    fn test_postfix_and_member_chains() {
        assert_eq!(expr_shape("a.b[c](d)"), "a.b[c](d)");
        assert_eq!(expr_shape("a.b[c]++"), "(a.b[c]++)");
        assert_eq!(expr_shape("typeof a.b"), "(typeofa.b)");
        assert_eq!(expr_shape("new Foo(1)"), "(newFoo(1))");
        assert_eq!(expr_shape("a.delete"), "a.delete");
    }

    #[test]
    fn test_unbound_operator_ends_the_expression() {
        let errors = parse_errors("a ^ b");
        assert_eq!(errors.len(), 2);
        assert!(errors[0].has_code(&messages::MISSING_TERMINATOR_GOT_0));
        assert!(errors[1].has_code(&messages::UNEXPECTED_TOKEN_0));
    }

    // ========================================================================
    // Statements
    // ========================================================================

    #[test]
    fn test_variable_declarators() {
        let program = parse_ok("let a = 1, b; const c = 'x'");
        assert_eq!(program.statements.len(), 2);
        match &program.statements[0] {
            Statement::Variable(decl) => {
                assert_eq!(decl.kind, DeclarationKind::Let);
                assert_eq!(decl.declarators.len(), 2);
                assert_eq!(decl.declarators[1].name.name, "b");
                assert!(decl.declarators[1].init.is_none());
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_control_flow_statements() {
        let program = parse_ok(
            "if (a) { b() } else if (c) d(); else { e }\n\
             while (x < 10) x++\n\
             for (let i = 0; i < n; i++) { if (i) continue; break }\n\
             for (;;) {}",
        );
        assert_eq!(program.statements.len(), 4);
        match &program.statements[0] {
            Statement::If(stmt) => {
                assert!(matches!(stmt.alternative.as_deref(), Some(Statement::If(_))))
            }
            other => panic!("unexpected statement {:?}", other),
        }
        match &program.statements[2] {
            Statement::For(stmt) => {
                assert!(matches!(stmt.init, Some(ForInit::Variable(_))));
                assert!(stmt.test.is_some());
                assert!(stmt.update.is_some());
            }
            other => panic!("unexpected statement {:?}", other),
        }
        match &program.statements[3] {
            Statement::For(stmt) => {
                assert!(stmt.init.is_none() && stmt.test.is_none() && stmt.update.is_none())
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_return_without_value_before_newline() {
        let program = parse_ok("function f() {\n  return\n  1\n}");
        let Statement::Function(func) = &program.statements[0] else {
            panic!("expected function");
        };
        assert_eq!(func.body.statements.len(), 2);
        assert!(matches!(
            func.body.statements[0],
            Statement::Return(ReturnStatement { value: None, .. })
        ));
    }

    #[test]
    fn test_object_literal_forms() {
        let program = parse_ok("x = { a: 1, b, [c]: 2, 'd': 3, 4: 5, delete: 6, }");
        let Expression::Assign(assign) = only_expression(&program) else {
            panic!("expected assignment");
        };
        let Expression::Object(object) = assign.value.as_ref() else {
            panic!("expected object");
        };
        assert_eq!(object.properties.len(), 6);
        assert!(object.properties[1].shorthand);
        assert!(object.properties[2].computed);
        assert!(matches!(object.properties[3].key, Expression::String(_)));
        assert!(matches!(object.properties[4].key, Expression::Integer(_)));
    }

    #[test]
    fn test_integer_forms() {
        let program = parse_ok("0xff; 0b101; 0o17; 1_000");
        let values: Vec<i64> = program
            .statements
            .iter()
            .map(|s| match s {
                Statement::Expression(ExpressionStatement {
                    expression: Expression::Integer(lit),
                    ..
                }) => lit.value,
                other => panic!("unexpected statement {:?}", other),
            })
            .collect();
        assert_eq!(values, vec![255, 5, 15, 1000]);
    }

    // ========================================================================
    // ASI
    // ========================================================================

    #[test]
    fn test_newline_separates_statements() {
        let program = parse_ok("let x = 5\nlet y = 10");
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_same_line_statements_need_terminator() {
        let errors = parse_errors("let x = 1 let y = 2");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].has_code(&messages::MISSING_TERMINATOR_GOT_0));
        assert_eq!(errors[0].start(), Position::new(0, 10));
        assert_eq!(errors[0].end(), Position::new(0, 13));
    }

    #[test]
    fn test_tolerant_mode_suppresses_terminator_errors() {
        let (program, errors) = ParserBuilder::new()
            .tolerant(true)
            .build("let x = 1 let y = 2")
            .parse_program();
        assert!(errors.is_empty());
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_continuation_across_newline() {
        assert_eq!(expr_shape("a\n.b\n.c"), "a.b.c");
        assert_eq!(expr_shape("a\n+ b"), "(a + b)");
        assert_eq!(expr_shape("x\n= 1"), "(x = 1)");
    }

    #[test]
    fn test_postfix_update_does_not_cross_newline() {
        let program = parse_ok("a\n++b");
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_comment_acts_as_terminator() {
        let program = parse_ok("a /* c */ b");
        assert_eq!(program.statements.len(), 3);
        assert!(program.statements[1].is_comment());
    }

    #[test]
    fn test_comment_between_operands_keeps_expression() {
        let program = parse_ok("let x = a /* c */ + b;");
        assert_eq!(program.statements.len(), 2);
        let Statement::Variable(decl) = &program.statements[0] else {
            panic!("expected declaration");
        };
        let init = decl.declarators[0].init.as_ref().unwrap();
        assert_eq!(shape(init), "(a + b)");
        assert!(program.statements[1].is_comment());
    }

    #[test]
    fn test_line_comment_before_continuation_operator() {
        let program = parse_ok("if (a // why\n && b) {}");
        let Statement::If(stmt) = &program.statements[0] else {
            panic!("expected if");
        };
        assert_eq!(shape(&stmt.condition), "(a && b)");
    }

    #[test]
    fn test_return_value_after_block_comment() {
        let program = parse_ok("function f() { return /* answer */ 42 }");
        let Statement::Function(func) = &program.statements[0] else {
            panic!("expected function");
        };
        assert!(matches!(
            func.body.statements[0],
            Statement::Return(ReturnStatement { value: Some(_), .. })
        ));
    }

    #[test]
    fn test_comments_are_kept_before_statements() {
        let program = parse_ok("// head\nlet x = 1;\n{\n  /* inner */\n}\n// tail");
        assert_eq!(program.statements.len(), 4);
        assert!(program.statements[0].is_comment());
        let Statement::Block(block) = &program.statements[2] else {
            panic!("expected block");
        };
        assert_eq!(block.statements.len(), 1);
        assert!(block.statements[0].is_comment());
        assert!(program.statements[3].is_comment());
    }

    // ========================================================================
    // Errors and recovery
    // ========================================================================

    #[test]
    fn test_expect_peek_reports_offending_token() {
        let errors = parse_errors("let = 5;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "expected IDENT, got =");
        assert_eq!(errors[0].range, Range::new(Position::new(0, 4), Position::new(0, 5)));
    }

    #[test]
    fn test_recovery_continues_with_next_statement() {
        let (program, errors) = ParserBuilder::new()
            .build("let = 1;\nlet y = 2\nfoo(")
            .parse_program();
        assert_eq!(program.statements.len(), 1);
        assert!(matches!(program.statements[0], Statement::Variable(_)));
        assert_eq!(errors.len(), 2);
        assert!(errors[1].has_code(&messages::UNEXPECTED_TOKEN_0));
    }

    #[test]
    fn test_stray_closing_brace_at_top_level() {
        let (program, errors) = ParserBuilder::new().build("}\nx").parse_program();
        assert_eq!(errors.len(), 1);
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_unclosed_block() {
        let errors = parse_errors("function f() { return 1");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "expected }, got EOF");
    }

    #[test]
    fn test_invalid_assignment_target_still_builds() {
        let (program, errors) = ParserBuilder::new().build("1 = 2").parse_program();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].has_code(&messages::INVALID_ASSIGNMENT_TARGET));
        assert!(matches!(only_expression(&program), Expression::Assign(_)));
    }

    #[test]
    fn test_lexical_errors() {
        let errors = parse_errors("x = 'abc");
        assert!(errors[0].has_code(&messages::UNTERMINATED_STRING_LITERAL));
        let errors = parse_errors("x = 99999999999999999999");
        assert!(errors[0].has_code(&messages::INVALID_INTEGER_LITERAL_0));
        let errors = parse_errors("x = @");
        assert_eq!(errors[0].message, "illegal character '@'");
        let errors = parse_errors("x /* open");
        assert!(errors[0].has_code(&messages::UNTERMINATED_COMMENT));
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        let source = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        let errors = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(move || parse_errors(&source))
            .unwrap()
            .join()
            .unwrap();
        assert!(errors
            .iter()
            .any(|e| e.has_code(&messages::EXPRESSION_TOO_DEEPLY_NESTED)));
    }
}
