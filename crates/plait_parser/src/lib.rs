//! plait_parser: Extensible recursive descent parser.
//!
//! Statements are parsed by recursive descent, expressions by precedence
//! climbing. Both entry points run through interceptor chains assembled by
//! a [`ParserBuilder`], which also takes operator registrations and mode
//! flags. A parse never aborts: errors are collected and returned next to
//! the best tree that could be built.

mod builder;
mod context;
mod parser;
mod precedence;
mod utilities;

pub use builder::{
    ExpressionInterceptor, NextExpression, NextStatement, ParserBuilder, Plugin,
    StatementInterceptor,
};
pub use context::{ContextGuard, ContextType};
pub use parser::Parser;
pub use precedence::{infix_precedence, InfixFn, OperatorTable, PostfixFn, Precedence, PrefixFn};
pub use utilities::is_continuation_kind;

use plait_ast::Program;
use plait_diagnostics::ParserError;

/// Parse `source` with default options and no plugins.
pub fn parse(source: &str) -> (Program, Vec<ParserError>) {
    ParserBuilder::new().build(source).parse_program()
}
