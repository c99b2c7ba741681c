//! `a ^ b` as exponentiation.

use plait_ast::{Expression, Operator, TokenKind};
use plait_core::error::BuildError;
use plait_nodebuilder::NodeBuilder;
use plait_parser::{ParserBuilder, Plugin, Precedence};

/// Parses `^` as a power operator binding just tighter than `*`, and
/// rewrites `a ^ b` to `Math.pow(a, b)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerOperator;

impl PowerOperator {
    pub const PRECEDENCE: Precedence = Precedence(Precedence::PRODUCT.0 + 1);
}

impl Plugin for PowerOperator {
    fn name(&self) -> &str {
        "power-operator"
    }

    fn install(&self, builder: &mut ParserBuilder) -> Result<(), BuildError> {
        builder.register_infix(TokenKind::CARET, Self::PRECEDENCE, math_pow)?;
        Ok(())
    }
}

/// Synthesized nodes borrow the operator's range.
fn math_pow(base: Expression, operator: Operator, exponent: Expression) -> Expression {
    let b = NodeBuilder::at(operator.span);
    b.call(
        b.path(&["Math", "pow"]),
        vec![ungroup(base), ungroup(exponent)],
    )
}

/// Call arguments never need the parentheses that grouped an operand.
fn ungroup(expression: Expression) -> Expression {
    match expression {
        Expression::Grouped(group) => ungroup(*group.expression),
        other => other,
    }
}
