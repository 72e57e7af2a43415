//! URI resolution: human-readable geohash text ↔ token id.
//!
//! Lookups never mutate and accept arbitrary input. A string that is not a
//! geohash and a geohash that was never minted fail with the same
//! [`RegistryError::NotFoundOrInvalid`].

use crate::alphabet::{validate, GeohashPath};
use crate::error::{RegistryError, Result};
use crate::hash::id_of;
use crate::store::HierarchyStore;
use crate::TokenId;

/// Geohash text → minted token id.
pub fn token_by_uri(store: &HierarchyStore, uri: &str) -> Result<TokenId> {
    let path = validate(uri).map_err(|_| RegistryError::NotFoundOrInvalid)?;
    let id = id_of(&path);
    if store.exists(id) {
        Ok(id)
    } else {
        Err(RegistryError::NotFoundOrInvalid)
    }
}

/// Minted token id → geohash text.
pub fn token_uri(store: &HierarchyStore, id: TokenId) -> Result<&GeohashPath> {
    store.path_of(id).ok_or(RegistryError::NotFoundOrInvalid)
}
