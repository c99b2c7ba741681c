//! The parse context stack.
//!
//! The parser keeps a stack of [`ContextType`] markers, `Global` at the
//! bottom. Function bodies push `Function` and blocks push `Block`.
//! [`ContextGuard`] pops its marker when dropped, so the stack is restored
//! on every exit path out of a body, including a failed parse.

use crate::parser::Parser;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextType {
    Global,
    Function,
    Block,
}

/// A pushed context marker. Derefs to the parser.
pub struct ContextGuard<'p> {
    parser: &'p mut Parser,
}

impl<'p> ContextGuard<'p> {
    pub(crate) fn new(parser: &'p mut Parser, context: ContextType) -> Self {
        parser.push_context(context);
        Self { parser }
    }
}

impl Deref for ContextGuard<'_> {
    type Target = Parser;

    fn deref(&self) -> &Parser {
        self.parser
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut Parser {
        self.parser
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.parser.pop_context();
    }
}
