//! Construction-time errors.
//!
//! These are returned while a tokenizer or parser builder is being
//! configured. They indicate a mistake in an extension, not malformed
//! input, so they are reported before any parse runs.

use std::fmt;
use thiserror::Error;

/// The operator classes an extension can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorClass {
    Prefix,
    Infix,
    Postfix,
}

impl fmt::Display for OperatorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorClass::Prefix => write!(f, "prefix"),
            OperatorClass::Infix => write!(f, "infix"),
            OperatorClass::Postfix => write!(f, "postfix"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The category already has an operator of a conflicting class, either
    /// built in or registered earlier.
    #[error("duplicate {class} operator registration for token `{kind}`")]
    DuplicateOperator { kind: String, class: OperatorClass },

    /// A dynamic token category tried to take the name of a built-in one.
    #[error("token name `{name}` is reserved by a built-in token kind")]
    ReservedTokenName { name: String },

    #[error("no dynamic token kinds left to allocate")]
    TokenKindSpaceExhausted,
}
