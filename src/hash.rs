//! Token id derivation.
//!
//! A cell's id is Keccak-256 of its path bytes, read as a big-endian `U256`.
//! Ids depend on nothing but the path, so they are stable across registries,
//! mint orders and restarts.

use alloy_primitives::keccak256;

use crate::alphabet::GeohashPath;
use crate::TokenId;

/// Id of a validated path.
#[inline]
pub fn id_of(path: &GeohashPath) -> TokenId {
    TokenId::from_be_bytes(keccak256(path.as_bytes()).0)
}

/// A path and its precomputed id, usable in `const` position.
///
/// Produced by the `cell_id!` and `cells!` macros.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StaticCell {
    pub path: &'static str,
    pub id: TokenId,
}

impl StaticCell {
    pub const fn new(path: &'static str, id: TokenId) -> Self {
        Self { path, id }
    }

    #[inline]
    pub const fn depth(&self) -> usize {
        self.path.len()
    }
}
