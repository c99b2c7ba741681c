//! plait_nodebuilder: Synthetic AST node construction.
//!
//! Plugin node constructors rarely have source text for the nodes they
//! produce. `NodeBuilder` creates nodes anchored at one source range,
//! usually the operator token that triggered the rewrite, so source maps
//! still point somewhere meaningful.

use plait_ast::node::*;
use plait_ast::TokenKind;
use plait_core::text::Range;

#[derive(Debug, Clone, Copy)]
pub struct NodeBuilder {
    span: Range,
}

impl NodeBuilder {
    /// A builder whose nodes all carry `span`.
    pub fn at(span: Range) -> Self {
        Self { span }
    }

    pub fn span(&self) -> Range {
        self.span
    }

    pub fn identifier(&self, name: &str) -> Identifier {
        Identifier::new(name, self.span)
    }

    pub fn ident_expr(&self, name: &str) -> Expression {
        Expression::Identifier(self.identifier(name))
    }

    pub fn integer(&self, value: i64) -> Expression {
        Expression::Integer(IntegerLiteral {
            value,
            raw: value.to_string(),
            span: self.span,
        })
    }

    pub fn string(&self, value: &str) -> Expression {
        Expression::String(StringLiteral {
            value: value.to_string(),
            raw: None,
            quote: Quote::Double,
            span: self.span,
        })
    }

    /// `object.name`
    pub fn member(&self, object: Expression, name: &str) -> Expression {
        Expression::Member(MemberExpression {
            object: Box::new(object),
            property: self.identifier(name),
            span: self.span,
        })
    }

    /// A dotted path such as `Math.pow`.
    ///
    /// # Example
    /// ```
    /// use plait_core::text::Range;
    /// use plait_nodebuilder::NodeBuilder;
    /// let builder = NodeBuilder::at(Range::default());
    /// let path = builder.path(&["Math", "pow"]);
    /// assert!(matches!(path, plait_ast::Expression::Member(_)));
    /// ```
    pub fn path(&self, segments: &[&str]) -> Expression {
        let mut segments = segments.iter();
        let mut expr = match segments.next() {
            Some(first) => self.ident_expr(first),
            None => return Expression::Null(self.span),
        };
        for segment in segments {
            expr = self.member(expr, segment);
        }
        expr
    }

    pub fn call(&self, callee: Expression, arguments: Vec<Expression>) -> Expression {
        Expression::Call(CallExpression {
            callee: Box::new(callee),
            arguments,
            span: self.span,
        })
    }

    pub fn binary(&self, left: Expression, kind: TokenKind, text: &str, right: Expression) -> Expression {
        Expression::Binary(BinaryExpression {
            left: Box::new(left),
            operator: Operator::new(kind, text, self.span),
            right: Box::new(right),
            span: self.span,
        })
    }

    pub fn expression_statement(&self, expression: Expression) -> Statement {
        Statement::Expression(ExpressionStatement {
            expression,
            span: self.span,
        })
    }

    pub fn variable(&self, kind: DeclarationKind, name: &str, init: Option<Expression>) -> Statement {
        Statement::Variable(VariableDeclaration {
            kind,
            declarators: vec![VariableDeclarator {
                name: self.identifier(name),
                init,
            }],
            span: self.span,
        })
    }
}
