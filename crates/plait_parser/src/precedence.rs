//! Binding powers and the per-parser operator table.

use plait_ast::{Expression, Operator, TokenKind};
use rustc_hash::FxHashMap;
use std::ops::Add;
use std::rc::Rc;

/// Binding power of an operator. Higher binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precedence(pub u8);

impl Precedence {
    pub const LOWEST: Precedence = Precedence(0);
    pub const ASSIGN: Precedence = Precedence(10);
    pub const CONDITIONAL: Precedence = Precedence(20);
    /// `||` and `??`
    pub const LOGICAL_OR: Precedence = Precedence(30);
    pub const LOGICAL_AND: Precedence = Precedence(40);
    pub const EQUALS: Precedence = Precedence(50);
    /// Relational operators, including `instanceof`.
    pub const LESS_GREATER: Precedence = Precedence(60);
    pub const SUM: Precedence = Precedence(70);
    pub const PRODUCT: Precedence = Precedence(80);
    pub const PREFIX: Precedence = Precedence(90);
    pub const POSTFIX: Precedence = Precedence(100);
    pub const CALL: Precedence = Precedence(110);
    pub const MEMBER: Precedence = Precedence(120);
    /// Registered postfix operators bind here.
    pub const HIGHEST: Precedence = Precedence(130);
}

/// `Precedence::PRODUCT + 1` sits just above multiplication.
impl Add<u8> for Precedence {
    type Output = Precedence;

    fn add(self, rhs: u8) -> Precedence {
        Precedence(self.0.saturating_add(rhs))
    }
}

/// Binding power of the built-in infix forms: binary operators, assignment,
/// the conditional `?`, calls, member and index access.
///
/// The bitwise operators, `**` and the shifts are scanned but deliberately
/// unbound here, so plugins may claim them.
pub fn infix_precedence(kind: TokenKind) -> Option<Precedence> {
    let precedence = match kind {
        TokenKind::OR | TokenKind::NULLISH => Precedence::LOGICAL_OR,
        TokenKind::AND => Precedence::LOGICAL_AND,
        TokenKind::EQ | TokenKind::NOT_EQ | TokenKind::STRICT_EQ | TokenKind::STRICT_NOT_EQ => {
            Precedence::EQUALS
        }
        TokenKind::LT
        | TokenKind::GT
        | TokenKind::LT_EQ
        | TokenKind::GT_EQ
        | TokenKind::INSTANCEOF => Precedence::LESS_GREATER,
        TokenKind::PLUS | TokenKind::MINUS => Precedence::SUM,
        TokenKind::ASTERISK | TokenKind::SLASH | TokenKind::PERCENT => Precedence::PRODUCT,
        TokenKind::QUESTION => Precedence::CONDITIONAL,
        TokenKind::LPAREN => Precedence::CALL,
        TokenKind::DOT | TokenKind::LBRACKET => Precedence::MEMBER,
        kind if kind.is_assignment_operator() => Precedence::ASSIGN,
        _ => return None,
    };
    Some(precedence)
}

/// Whether `kind` is a built-in postfix operator.
pub fn is_builtin_postfix(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::INCREMENT | TokenKind::DECREMENT)
}

/// Whether `kind` can begin a primary or prefix expression without help
/// from a plugin.
pub fn is_builtin_prefix(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::IDENT
            | TokenKind::INT
            | TokenKind::FLOAT
            | TokenKind::STRING
            | TokenKind::TEMPLATE
            | TokenKind::TRUE
            | TokenKind::FALSE
            | TokenKind::NULL
            | TokenKind::LPAREN
            | TokenKind::LBRACKET
            | TokenKind::LBRACE
            | TokenKind::FUNCTION
            | TokenKind::BANG
            | TokenKind::MINUS
            | TokenKind::PLUS
            | TokenKind::TILDE
            | TokenKind::INCREMENT
            | TokenKind::DECREMENT
            | TokenKind::TYPEOF
            | TokenKind::VOID
            | TokenKind::DELETE
            | TokenKind::NEW
    )
}

// ============================================================================
// Node constructors
// ============================================================================

/// Builds the node for a registered prefix operator from the operator and
/// its operand.
pub type PrefixFn = Rc<dyn Fn(Operator, Expression) -> Expression>;

/// Builds the node for a registered infix operator.
pub type InfixFn = Rc<dyn Fn(Expression, Operator, Expression) -> Expression>;

/// Builds the node for a registered postfix operator.
pub type PostfixFn = Rc<dyn Fn(Expression, Operator) -> Expression>;

// ============================================================================
// Operator table
// ============================================================================

/// Registered infix and postfix operators layered over the built-in
/// precedences. Each parser gets its own copy.
#[derive(Clone, Default)]
pub struct OperatorTable {
    infix: FxHashMap<TokenKind, (Precedence, InfixFn)>,
    postfix: FxHashMap<TokenKind, PostfixFn>,
}

impl OperatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_infix(&mut self, kind: TokenKind, precedence: Precedence, ctor: InfixFn) {
        self.infix.insert(kind, (precedence, ctor));
    }

    pub(crate) fn insert_postfix(&mut self, kind: TokenKind, ctor: PostfixFn) {
        self.postfix.insert(kind, ctor);
    }

    /// Binding power of `kind` in infix or postfix position, if it has one.
    pub fn precedence(&self, kind: TokenKind) -> Option<Precedence> {
        if let Some(precedence) = infix_precedence(kind) {
            return Some(precedence);
        }
        if is_builtin_postfix(kind) {
            return Some(Precedence::POSTFIX);
        }
        if let Some((precedence, _)) = self.infix.get(&kind) {
            return Some(*precedence);
        }
        self.postfix.get(&kind).map(|_| Precedence::HIGHEST)
    }

    pub fn infix(&self, kind: TokenKind) -> Option<(Precedence, InfixFn)> {
        self.infix
            .get(&kind)
            .map(|(precedence, ctor)| (*precedence, Rc::clone(ctor)))
    }

    pub fn postfix(&self, kind: TokenKind) -> Option<PostfixFn> {
        self.postfix.get(&kind).map(Rc::clone)
    }

    pub fn has_infix(&self, kind: TokenKind) -> bool {
        self.infix.contains_key(&kind)
    }

    pub fn has_postfix(&self, kind: TokenKind) -> bool {
        self.postfix.contains_key(&kind)
    }
}
