//! Parser construction.
//!
//! A [`ParserBuilder`] collects everything that changes how source is
//! parsed: mode flags, token interceptors, statement and expression
//! interceptors, and operator registrations. Nothing is shared with the
//! parsers it builds; each `build` composes fresh chains and clones the
//! operator table.
//!
//! Statement and expression interceptors nest the opposite way from token
//! interceptors: the *first* one registered is the outermost and runs
//! first, delegating inward through its continuation.

use crate::parser::Parser;
use crate::precedence::{
    infix_precedence, is_builtin_postfix, is_builtin_prefix, InfixFn, OperatorTable, PostfixFn,
    Precedence, PrefixFn,
};
use plait_ast::{Expression, Operator, Statement, TokenKind};
use plait_core::error::{BuildError, OperatorClass};
use plait_options::ParseOptions;
use plait_scanner::{NextToken, Scanner, Token, TokenizerBuilder};
use rustc_hash::FxHashSet;
use std::rc::Rc;

/// The rest of the statement chain, as seen by an interceptor.
pub type NextStatement<'a> = &'a dyn Fn(&mut Parser) -> Option<Statement>;

/// Handles "parse a statement starting at the current token", or delegates.
pub type StatementInterceptor = Rc<dyn Fn(&mut Parser, NextStatement<'_>) -> Option<Statement>>;

/// The rest of the expression chain, as seen by an interceptor.
pub type NextExpression<'a> = &'a dyn Fn(&mut Parser, Precedence) -> Option<Expression>;

/// Handles "parse an expression at precedence P", or delegates.
pub type ExpressionInterceptor =
    Rc<dyn Fn(&mut Parser, Precedence, NextExpression<'_>) -> Option<Expression>>;

pub(crate) type StatementChain = Rc<dyn Fn(&mut Parser) -> Option<Statement>>;
pub(crate) type ExpressionChain = Rc<dyn Fn(&mut Parser, Precedence) -> Option<Expression>>;

/// A bundle of registrations installed in one call.
pub trait Plugin {
    fn name(&self) -> &str;

    fn install(&self, builder: &mut ParserBuilder) -> Result<(), BuildError>;
}

#[derive(Clone, Default)]
pub struct ParserBuilder {
    options: ParseOptions,
    tokenizer: TokenizerBuilder,
    statement_interceptors: Vec<StatementInterceptor>,
    expression_interceptors: Vec<ExpressionInterceptor>,
    operators: OperatorTable,
    prefix_operators: FxHashSet<TokenKind>,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tolerant(mut self, tolerant: bool) -> Self {
        self.options.tolerant = tolerant;
        self
    }

    pub fn smart_semicolon(mut self, smart_semicolon: bool) -> Self {
        self.options.smart_semicolon = smart_semicolon;
        self
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    // ========================================================================
    // Tokens
    // ========================================================================

    /// Allocate a dynamic token kind. Idempotent by name.
    pub fn register_token_kind(&mut self, name: &str) -> Result<TokenKind, BuildError> {
        self.tokenizer.register_token_kind(name)
    }

    /// Add a token interceptor. The last one added is the outermost.
    pub fn token_interceptor<F>(&mut self, interceptor: F) -> &mut Self
    where
        F: Fn(&mut Scanner, NextToken<'_>) -> Token + 'static,
    {
        self.tokenizer.intercept(interceptor);
        self
    }

    /// Display name for a kind, including dynamic ones.
    pub fn describe(&self, kind: TokenKind) -> String {
        self.tokenizer.registry().describe(kind)
    }

    // ========================================================================
    // Interceptors
    // ========================================================================

    /// Add a statement interceptor. The first one added is the outermost.
    pub fn statement_interceptor<F>(&mut self, interceptor: F) -> &mut Self
    where
        F: Fn(&mut Parser, NextStatement<'_>) -> Option<Statement> + 'static,
    {
        self.statement_interceptors.push(Rc::new(interceptor));
        self
    }

    /// Add an expression interceptor. The first one added is the outermost.
    pub fn expression_interceptor<F>(&mut self, interceptor: F) -> &mut Self
    where
        F: Fn(&mut Parser, Precedence, NextExpression<'_>) -> Option<Expression> + 'static,
    {
        self.expression_interceptors.push(Rc::new(interceptor));
        self
    }

    // ========================================================================
    // Operators
    // ========================================================================

    /// Register a prefix operator. When the current token is `kind`, the
    /// operand is parsed at prefix precedence, `ctor` builds the node, and
    /// any trailing operators are folded in at the caller's precedence.
    pub fn register_prefix<F>(&mut self, kind: TokenKind, ctor: F) -> Result<&mut Self, BuildError>
    where
        F: Fn(Operator, Expression) -> Expression + 'static,
    {
        if is_builtin_prefix(kind) || self.prefix_operators.contains(&kind) {
            return Err(self.duplicate(kind, OperatorClass::Prefix));
        }
        tracing::debug!(kind = %self.describe(kind), "registering prefix operator");
        self.prefix_operators.insert(kind);

        let ctor: PrefixFn = Rc::new(ctor);
        Ok(self.expression_interceptor(move |parser, precedence, next| {
            if !parser.cur_is(kind) {
                return next(parser, precedence);
            }
            let operator = parser.cur_operator();
            parser.next_token();
            let operand = parser.parse_expression(Precedence::PREFIX)?;
            let node = ctor(operator, operand);
            parser.parse_expression_tail(node, precedence)
        }))
    }

    /// Register an infix operator binding at `precedence`. Operators of
    /// equal precedence group left to right.
    pub fn register_infix<F>(
        &mut self,
        kind: TokenKind,
        precedence: Precedence,
        ctor: F,
    ) -> Result<&mut Self, BuildError>
    where
        F: Fn(Expression, Operator, Expression) -> Expression + 'static,
    {
        if infix_precedence(kind).is_some()
            || is_builtin_postfix(kind)
            || self.operators.has_infix(kind)
            || self.operators.has_postfix(kind)
        {
            return Err(self.duplicate(kind, OperatorClass::Infix));
        }
        tracing::debug!(kind = %self.describe(kind), precedence = precedence.0, "registering infix operator");
        let ctor: InfixFn = Rc::new(ctor);
        self.operators.insert_infix(kind, precedence, ctor);
        Ok(self)
    }

    /// Register a postfix operator. Postfix operators bind tightest.
    pub fn register_postfix<F>(&mut self, kind: TokenKind, ctor: F) -> Result<&mut Self, BuildError>
    where
        F: Fn(Expression, Operator) -> Expression + 'static,
    {
        if is_builtin_postfix(kind)
            || infix_precedence(kind).is_some()
            || self.operators.has_postfix(kind)
            || self.operators.has_infix(kind)
        {
            return Err(self.duplicate(kind, OperatorClass::Postfix));
        }
        tracing::debug!(kind = %self.describe(kind), "registering postfix operator");
        let ctor: PostfixFn = Rc::new(ctor);
        self.operators.insert_postfix(kind, ctor);
        Ok(self)
    }

    fn duplicate(&self, kind: TokenKind, class: OperatorClass) -> BuildError {
        BuildError::DuplicateOperator {
            kind: self.describe(kind),
            class,
        }
    }

    /// Install a plugin's registrations.
    pub fn plugin(&mut self, plugin: &dyn Plugin) -> Result<&mut Self, BuildError> {
        tracing::debug!(plugin = plugin.name(), "installing plugin");
        plugin.install(self)?;
        Ok(self)
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build a single-use parser over `source`.
    pub fn build(&self, source: &str) -> Parser {
        Parser::new(
            self.tokenizer.build(source),
            self.options,
            self.operators.clone(),
            compose_statements(&self.statement_interceptors),
            compose_expressions(&self.expression_interceptors),
        )
    }
}

fn compose_statements(interceptors: &[StatementInterceptor]) -> StatementChain {
    let mut chain: StatementChain = Rc::new(|parser: &mut Parser| parser.parse_statement_base());
    for interceptor in interceptors.iter().rev() {
        let interceptor = Rc::clone(interceptor);
        let inner = chain;
        chain = Rc::new(move |parser: &mut Parser| interceptor(parser, &*inner));
    }
    chain
}

fn compose_expressions(interceptors: &[ExpressionInterceptor]) -> ExpressionChain {
    let mut chain: ExpressionChain = Rc::new(|parser: &mut Parser, precedence: Precedence| {
        parser.parse_expression_base(precedence)
    });
    for interceptor in interceptors.iter().rev() {
        let interceptor = Rc::clone(interceptor);
        let inner = chain;
        chain = Rc::new(move |parser: &mut Parser, precedence: Precedence| {
            interceptor(parser, precedence, &*inner)
        });
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use plait_ast::{BinaryExpression, PostfixExpression};
    use std::cell::RefCell;

    fn binary(left: Expression, operator: Operator, right: Expression) -> Expression {
        let span = left.span().cover(right.span());
        Expression::Binary(BinaryExpression {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span,
        })
    }

    #[test]
    fn test_builtin_infix_is_rejected() {
        let mut builder = ParserBuilder::new();
        let err = builder.register_infix(TokenKind::PLUS, Precedence::SUM, binary).err();
        assert_eq!(
            err,
            Some(BuildError::DuplicateOperator {
                kind: "+".into(),
                class: OperatorClass::Infix
            })
        );
    }

    #[test]
    fn test_second_registration_is_rejected() {
        let mut builder = ParserBuilder::new();
        builder.register_infix(TokenKind::CARET, Precedence::PRODUCT + 1, binary).unwrap();
        let err = builder
            .register_infix(TokenKind::CARET, Precedence::SUM, binary)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "duplicate infix operator registration for token `^`");
    }

    #[test]
    fn test_prefix_duplicates() {
        let mut builder = ParserBuilder::new();
        let err = builder.register_prefix(TokenKind::BANG, |_, e| e).err().unwrap();
        assert_eq!(
            err,
            BuildError::DuplicateOperator {
                kind: "!".into(),
                class: OperatorClass::Prefix
            }
        );
        let at = builder.register_token_kind("AT").unwrap();
        builder.register_prefix(at, |_, e| e).unwrap();
        let err = builder.register_prefix(at, |_, e| e).err().unwrap();
        assert_eq!(
            err,
            BuildError::DuplicateOperator {
                kind: "AT".into(),
                class: OperatorClass::Prefix
            }
        );
    }

    #[test]
    fn test_postfix_conflicts_with_infix_of_same_kind() {
        let mut builder = ParserBuilder::new();
        builder.register_infix(TokenKind::PIPE, Precedence::SUM, binary).unwrap();
        let err = builder
            .register_postfix(TokenKind::PIPE, |operand, _| operand)
            .err()
            .unwrap();
        assert_eq!(
            err,
            BuildError::DuplicateOperator {
                kind: "|".into(),
                class: OperatorClass::Postfix
            }
        );
        assert!(builder.register_postfix(TokenKind::INCREMENT, |e, _| e).is_err());
        // `!` is a built-in prefix but free in postfix position.
        builder
            .register_postfix(TokenKind::BANG, |operand, operator| {
                let span = operand.span().cover(operator.span);
                Expression::Postfix(PostfixExpression {
                    operand: Box::new(operand),
                    operator,
                    span,
                })
            })
            .unwrap();
    }

    #[test]
    fn test_first_registered_statement_interceptor_runs_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut builder = ParserBuilder::new();
        for id in ["S1", "S2", "S3"] {
            let log = Rc::clone(&log);
            builder.statement_interceptor(move |parser, next| {
                log.borrow_mut().push(id);
                next(parser)
            });
        }
        let (program, errors) = builder.build("x;").parse_program();
        assert!(errors.is_empty());
        assert_eq!(program.statements.len(), 1);
        assert_eq!(*log.borrow(), vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn test_plugin_installs_registrations() {
        struct Caret;

        impl Plugin for Caret {
            fn name(&self) -> &str {
                "caret"
            }

            fn install(&self, builder: &mut ParserBuilder) -> Result<(), BuildError> {
                builder.register_infix(TokenKind::CARET, Precedence::PRODUCT + 1, binary)?;
                Ok(())
            }
        }

        let mut builder = ParserBuilder::new();
        builder.plugin(&Caret).unwrap();
        assert!(builder.plugin(&Caret).is_err());
        let (program, errors) = builder.build("a ^ b").parse_program();
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(program.statements.len(), 1);
    }
}
