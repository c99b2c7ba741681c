//! plait_scanner: Tokenizer with pluggable interception.
//!
//! [`Scanner`] turns source text into positioned [`Token`]s. A
//! [`TokenizerBuilder`] wraps it in a chain of interceptors that can
//! reclassify, replace or synthesize tokens, and allocates dynamic token
//! kinds for plugins.

mod char_codes;
mod registry;
mod scanner;
mod token;
mod tokenizer;

pub use registry::TokenKindRegistry;
pub use scanner::Scanner;
pub use token::Token;
pub use tokenizer::{tokenize, NextToken, TokenInterceptor, Tokenizer, TokenizerBuilder};
