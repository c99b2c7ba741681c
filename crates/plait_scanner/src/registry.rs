//! Dynamic token kind allocation.

use indexmap::IndexMap;
use plait_ast::TokenKind;
use plait_core::error::BuildError;

/// Names of dynamically registered token kinds, in allocation order.
///
/// The n-th registered name gets `TokenKind::DYNAMIC_BASE + n`, so the
/// kind doubles as an index back into the map.
#[derive(Debug, Clone, Default)]
pub struct TokenKindRegistry {
    names: IndexMap<String, TokenKind>,
}

impl TokenKindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a kind for `name`, or return the one already allocated.
    pub fn register(&mut self, name: &str) -> Result<TokenKind, BuildError> {
        if let Some(kind) = self.names.get(name) {
            return Ok(*kind);
        }
        if TokenKind::from_builtin_name(name).is_some() {
            return Err(BuildError::ReservedTokenName {
                name: name.to_string(),
            });
        }
        let raw = usize::from(TokenKind::DYNAMIC_BASE) + self.names.len();
        let raw = u16::try_from(raw).map_err(|_| BuildError::TokenKindSpaceExhausted)?;
        let kind = TokenKind::from_raw(raw);
        self.names.insert(name.to_string(), kind);
        tracing::debug!(name, kind = raw, "registered token kind");
        Ok(kind)
    }

    pub fn lookup(&self, name: &str) -> Option<TokenKind> {
        self.names
            .get(name)
            .copied()
            .or_else(|| TokenKind::from_builtin_name(name))
    }

    /// Display name of any kind, built-in or dynamic.
    pub fn name(&self, kind: TokenKind) -> Option<&str> {
        if let Some(name) = kind.builtin_name() {
            return Some(name);
        }
        let index = kind.raw().checked_sub(TokenKind::DYNAMIC_BASE)?;
        self.names
            .get_index(usize::from(index))
            .map(|(name, _)| name.as_str())
    }

    /// Like [`name`](Self::name), falling back to the raw number.
    pub fn describe(&self, kind: TokenKind) -> String {
        match self.name(kind) {
            Some(name) => name.to_string(),
            None => kind.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TokenKind)> {
        self.names.iter().map(|(name, kind)| (name.as_str(), *kind))
    }
}
