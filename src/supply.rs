//! Enumerable supply: the append-only mint-order index.

use crate::error::{RegistryError, Result};
use crate::TokenId;

/// Receives every id the hierarchy store mints, in mint order.
pub trait MintHook {
    fn on_mint(&mut self, id: TokenId);
}

/// Ordered record of every minted token.
///
/// Entries are only ever appended: position `i` names the `i`-th mint for the
/// lifetime of the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SupplyIndex {
    ids: Vec<TokenId>,
}

impl SupplyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of minted tokens.
    #[inline]
    pub fn total_supply(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Id minted at position `index`.
    pub fn token_by_index(&self, index: usize) -> Result<TokenId> {
        self.ids
            .get(index)
            .copied()
            .ok_or(RegistryError::IndexOutOfRange {
                index,
                total_supply: self.ids.len(),
            })
    }

    /// Ids in mint order.
    pub fn iter(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.ids.iter().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[TokenId] {
        &self.ids
    }
}

impl MintHook for SupplyIndex {
    #[inline]
    fn on_mint(&mut self, id: TokenId) {
        self.ids.push(id);
    }
}
