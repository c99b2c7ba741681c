//! Interceptor chains around the scanner.
//!
//! A [`TokenizerBuilder`] collects interceptors in registration order and
//! composes them once per [`Tokenizer`]. The last interceptor registered is
//! the outermost: it is asked for every token first and decides whether to
//! delegate inward to the rest of the chain, which ends at
//! [`Scanner::scan`].

use crate::registry::TokenKindRegistry;
use crate::scanner::Scanner;
use crate::token::Token;
use plait_ast::TokenKind;
use plait_core::error::BuildError;
use std::rc::Rc;

/// The rest of the chain, as seen by an interceptor.
pub type NextToken<'a> = &'a dyn Fn(&mut Scanner) -> Token;

/// An interceptor: given the scanner and the rest of the chain, produce
/// the next token.
pub type TokenInterceptor = Rc<dyn Fn(&mut Scanner, NextToken<'_>) -> Token>;

type TokenSource = Box<dyn Fn(&mut Scanner) -> Token>;

#[derive(Clone, Default)]
pub struct TokenizerBuilder {
    interceptors: Vec<TokenInterceptor>,
    registry: TokenKindRegistry,
}

impl TokenizerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interceptor. It wraps every interceptor added before it.
    pub fn intercept<F>(&mut self, interceptor: F) -> &mut Self
    where
        F: Fn(&mut Scanner, NextToken<'_>) -> Token + 'static,
    {
        self.interceptors.push(Rc::new(interceptor));
        self
    }

    /// Allocate a dynamic token kind for `name`. Registering the same name
    /// again returns the same kind.
    pub fn register_token_kind(&mut self, name: &str) -> Result<TokenKind, BuildError> {
        self.registry.register(name)
    }

    pub fn registry(&self) -> &TokenKindRegistry {
        &self.registry
    }

    pub fn interceptor_count(&self) -> usize {
        self.interceptors.len()
    }

    /// Build a tokenizer over `source` with the chain composed so far.
    pub fn build(&self, source: &str) -> Tokenizer {
        Tokenizer {
            scanner: Scanner::new(source),
            source: compose(&self.interceptors),
            registry: self.registry.clone(),
            finished: false,
        }
    }
}

fn compose(interceptors: &[TokenInterceptor]) -> TokenSource {
    let mut source: TokenSource = Box::new(|scanner: &mut Scanner| scanner.scan());
    for interceptor in interceptors {
        let interceptor = Rc::clone(interceptor);
        let inner = source;
        source = Box::new(move |scanner: &mut Scanner| interceptor(scanner, &*inner));
    }
    source
}

/// A scanner plus its composed interceptor chain.
pub struct Tokenizer {
    scanner: Scanner,
    source: TokenSource,
    registry: TokenKindRegistry,
    finished: bool,
}

impl Tokenizer {
    /// A tokenizer with no interceptors.
    pub fn new(source: &str) -> Self {
        TokenizerBuilder::new().build(source)
    }

    /// Run the chain once.
    pub fn next_token(&mut self) -> Token {
        (self.source)(&mut self.scanner)
    }

    pub fn registry(&self) -> &TokenKindRegistry {
        &self.registry
    }

    /// Display name for a kind, including dynamic ones.
    pub fn describe(&self, kind: TokenKind) -> String {
        self.registry.describe(kind)
    }
}

/// Yields tokens up to and including the first `EOF`.
impl Iterator for Tokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        self.finished = token.kind == TokenKind::EOF;
        Some(token)
    }
}

/// Tokenize `source` with the built-in rules, ending with `EOF`.
pub fn tokenize(source: &str) -> Vec<Token> {
    Tokenizer::new(source).collect()
}
