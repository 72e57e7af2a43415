//! Thread-shared registry handle: one writer, many readers.

use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::alphabet::Symbol;
use crate::error::Result;
use crate::policy::MintAuthority;
use crate::registry::GeohashRegistry;
use crate::store::Cell;
use crate::TokenId;

/// Cloneable handle to a registry behind a read-write lock.
///
/// Mints take the write lock, so they are applied one at a time in a single
/// total order. Queries take the read lock and run concurrently against a
/// consistent state.
#[derive(Clone, Debug)]
pub struct SharedRegistry {
    inner: Arc<RwLock<GeohashRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: GeohashRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Hold the read lock for several queries against one state.
    pub fn read(&self) -> RwLockReadGuard<'_, GeohashRegistry> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, GeohashRegistry> {
        self.inner.write()
    }

    pub fn total_supply(&self) -> usize {
        self.inner.read().total_supply()
    }

    pub fn token_by_index(&self, index: usize) -> Result<TokenId> {
        self.inner.read().token_by_index(index)
    }

    pub fn token_by_uri(&self, uri: &str) -> Result<TokenId> {
        self.inner.read().token_by_uri(uri)
    }

    pub fn exists(&self, id: TokenId) -> bool {
        self.inner.read().exists(id)
    }

    pub fn mint_child<A>(
        &self,
        parent_id: TokenId,
        symbol: Symbol,
        owner: Address,
        authority: &A,
    ) -> Result<Cell>
    where
        A: MintAuthority + ?Sized,
    {
        self.inner
            .write()
            .mint_child(parent_id, symbol, owner, authority)
    }

    pub fn mint_path<A>(&self, path: &str, owner: Address, authority: &A) -> Result<Cell>
    where
        A: MintAuthority + ?Sized,
    {
        self.inner.write().mint_path(path, owner, authority)
    }
}

impl From<GeohashRegistry> for SharedRegistry {
    fn from(registry: GeohashRegistry) -> Self {
        Self::new(registry)
    }
}
