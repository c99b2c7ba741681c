//! Syntax tree nodes.
//!
//! Two families, `Statement` and `Expression`, rooted at `Program`. Every
//! node records the source range it was parsed from; synthetic nodes built
//! by plugins borrow the range of the token that triggered them.

use crate::token_kind::TokenKind;
use plait_core::text::Range;

// ============================================================================
// Program
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub span: Range,
}

impl Program {
    pub fn new(statements: Vec<Statement>, span: Range) -> Self {
        Self { statements, span }
    }

    /// Statements other than preserved comments.
    pub fn significant_statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(|s| !s.is_comment())
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Variable(VariableDeclaration),
    Function(FunctionDeclaration),
    Return(ReturnStatement),
    If(IfStatement),
    While(WhileStatement),
    For(ForStatement),
    Block(Block),
    Break(Range),
    Continue(Range),
    Expression(ExpressionStatement),
    Empty(Range),
    /// A source comment, kept in place ahead of the statement that
    /// followed it.
    Comment(Comment),
}

impl Statement {
    pub fn span(&self) -> Range {
        match self {
            Statement::Variable(s) => s.span,
            Statement::Function(s) => s.span,
            Statement::Return(s) => s.span,
            Statement::If(s) => s.span,
            Statement::While(s) => s.span,
            Statement::For(s) => s.span,
            Statement::Block(s) => s.span,
            Statement::Break(span) | Statement::Continue(span) | Statement::Empty(span) => *span,
            Statement::Expression(s) => s.span,
            Statement::Comment(c) => c.span,
        }
    }

    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(self, Statement::Comment(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Let,
    Const,
    Var,
}

impl DeclarationKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclarationKind::Let => "let",
            DeclarationKind::Const => "const",
            DeclarationKind::Var => "var",
        }
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::LET => Some(DeclarationKind::Let),
            TokenKind::CONST => Some(DeclarationKind::Const),
            TokenKind::VAR => Some(DeclarationKind::Var),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub kind: DeclarationKind,
    pub declarators: Vec<VariableDeclarator>,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    pub name: Identifier,
    pub init: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: Identifier,
    pub params: Vec<Identifier>,
    pub body: Block,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub consequence: Box<Statement>,
    pub alternative: Option<Box<Statement>>,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Box<Statement>,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub test: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Box<Statement>,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Variable(VariableDeclaration),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Full comment text including its delimiters.
    pub text: String,
    pub span: Range,
}

impl Comment {
    pub fn is_line(&self) -> bool {
        self.text.starts_with("//")
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Integer(IntegerLiteral),
    Float(FloatLiteral),
    String(StringLiteral),
    Template(TemplateLiteral),
    Boolean(BooleanLiteral),
    Null(Range),
    Array(ArrayLiteral),
    Object(ObjectLiteral),
    Function(FunctionLiteral),
    Prefix(PrefixExpression),
    Binary(BinaryExpression),
    Postfix(PostfixExpression),
    Grouped(GroupedExpression),
    Call(CallExpression),
    Member(MemberExpression),
    Index(IndexExpression),
    Assign(AssignExpression),
    Conditional(ConditionalExpression),
}

impl Expression {
    pub fn span(&self) -> Range {
        match self {
            Expression::Identifier(e) => e.span,
            Expression::Integer(e) => e.span,
            Expression::Float(e) => e.span,
            Expression::String(e) => e.span,
            Expression::Template(e) => e.span,
            Expression::Boolean(e) => e.span,
            Expression::Null(span) => *span,
            Expression::Array(e) => e.span,
            Expression::Object(e) => e.span,
            Expression::Function(e) => e.span,
            Expression::Prefix(e) => e.span,
            Expression::Binary(e) => e.span,
            Expression::Postfix(e) => e.span,
            Expression::Grouped(e) => e.span,
            Expression::Call(e) => e.span,
            Expression::Member(e) => e.span,
            Expression::Index(e) => e.span,
            Expression::Assign(e) => e.span,
            Expression::Conditional(e) => e.span,
        }
    }

    /// Whether this expression may appear on the left of `=`.
    pub fn is_assignment_target(&self) -> bool {
        match self {
            Expression::Identifier(_) | Expression::Member(_) | Expression::Index(_) => true,
            Expression::Grouped(g) => g.expression.is_assignment_target(),
            _ => false,
        }
    }

    /// The leftmost sub-expression, the one whose text is rendered first.
    pub fn leftmost(&self) -> &Expression {
        match self {
            Expression::Binary(e) => e.left.leftmost(),
            Expression::Postfix(e) => e.operand.leftmost(),
            Expression::Call(e) => e.callee.leftmost(),
            Expression::Member(e) => e.object.leftmost(),
            Expression::Index(e) => e.object.leftmost(),
            Expression::Assign(e) => e.target.leftmost(),
            Expression::Conditional(e) => e.test.leftmost(),
            _ => self,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
    pub span: Range,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Range) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub value: i64,
    /// Source spelling, e.g. `0xff`.
    pub raw: String,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub value: f64,
    pub raw: String,
    pub span: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quote {
    #[default]
    Double,
    Single,
}

impl Quote {
    pub fn char(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    /// The decoded value, escapes already processed.
    pub value: String,
    /// Source text, quotes included, when an escape passed through
    /// undecoded. Rendered verbatim in place of `value`.
    pub raw: Option<String>,
    pub quote: Quote,
    pub span: Range,
}

/// A backtick-delimited raw string.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLiteral {
    pub value: String,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
    pub span: Range,
}

/// Properties are kept in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLiteral {
    pub properties: Vec<Property>,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: Expression,
    pub value: Expression,
    /// `[key]: value`
    pub computed: bool,
    /// `{ key }`
    pub shorthand: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub name: Option<Identifier>,
    pub params: Vec<Identifier>,
    pub body: Block,
    pub span: Range,
}

/// The operator token of a unary, binary or assignment expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operator {
    pub kind: TokenKind,
    pub text: String,
    pub span: Range,
}

impl Operator {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Range) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Keyword operators (`typeof`, `instanceof`, ...) need word separation.
    pub fn is_word(&self) -> bool {
        self.text.chars().next().is_some_and(|c| c.is_alphabetic())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub operator: Operator,
    pub operand: Box<Expression>,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub left: Box<Expression>,
    pub operator: Operator,
    pub right: Box<Expression>,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostfixExpression {
    pub operand: Box<Expression>,
    pub operator: Operator,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedExpression {
    pub expression: Box<Expression>,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub span: Range,
}

/// `object.property`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: Identifier,
    pub span: Range,
}

/// `object[index]`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub span: Range,
}

/// `target = value` and the compound forms (`+=`, `-=`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpression {
    pub target: Box<Expression>,
    pub operator: Operator,
    pub value: Box<Expression>,
    pub span: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    pub test: Box<Expression>,
    pub consequence: Box<Expression>,
    pub alternative: Box<Expression>,
    pub span: Range,
}
