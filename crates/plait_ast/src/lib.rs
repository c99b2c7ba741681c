//! plait_ast: Token kinds and syntax tree definitions.
//!
//! The tree is fully owned: every child sits in a `Box` or `Vec` beneath the
//! `Program` root, so plugin node constructors can build and move nodes
//! freely.

pub mod node;
pub mod token_kind;
pub mod types;

pub use node::*;
pub use token_kind::TokenKind;
pub use types::*;
