//! Postfix `!` non-null assertions.

use plait_ast::{Expression, Operator, TokenKind};
use plait_core::error::BuildError;
use plait_parser::{ParserBuilder, Plugin};

/// Accepts `value!` and drops the assertion, leaving `value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonNullAssertion;

impl Plugin for NonNullAssertion {
    fn name(&self) -> &str {
        "non-null-assertion"
    }

    fn install(&self, builder: &mut ParserBuilder) -> Result<(), BuildError> {
        builder.register_postfix(TokenKind::BANG, erase)?;
        Ok(())
    }
}

fn erase(operand: Expression, _assertion: Operator) -> Expression {
    operand
}
