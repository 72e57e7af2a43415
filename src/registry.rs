//! Geohash registry: the public face over store, supply index and resolver.

use alloy_primitives::Address;

use crate::alphabet::{validate, GeohashPath, Symbol};
use crate::error::Result;
use crate::policy::MintAuthority;
use crate::resolver;
use crate::snapshot::Snapshot;
use crate::store::{Cell, HierarchyStore};
use crate::supply::SupplyIndex;
use crate::TokenId;

/// Registry of minted geohash cells.
///
/// Provides:
/// - Genesis population of the 32 top-level cells at construction
/// - Child minting under existing cells, with an injected authority
/// - Mint-order enumeration (`total_supply`, `token_by_index`)
/// - Geohash text ↔ id lookup (`token_by_uri`, `token_uri`)
///
/// Mutation goes through `&mut self`; wrap it in
/// [`SharedRegistry`](crate::SharedRegistry) to share it between threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeohashRegistry {
    name: String,
    symbol: String,
    store: HierarchyStore,
    supply: SupplyIndex,
}

impl GeohashRegistry {
    /// Construct a registry and mint the genesis cells to `initial_owner`.
    ///
    /// `name` and `symbol` are display metadata and are never interpreted.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, initial_owner: Address) -> Self {
        Self::with_store(name, symbol, HierarchyStore::new(), initial_owner)
    }

    /// Like [`new`](Self::new), with a precision limit for child mints.
    pub fn with_max_precision(
        name: impl Into<String>,
        symbol: impl Into<String>,
        initial_owner: Address,
        max_precision: usize,
    ) -> Self {
        let store = HierarchyStore::new().with_max_precision(max_precision);
        Self::with_store(name, symbol, store, initial_owner)
    }

    fn with_store(
        name: impl Into<String>,
        symbol: impl Into<String>,
        mut store: HierarchyStore,
        initial_owner: Address,
    ) -> Self {
        let mut supply = SupplyIndex::new();
        // A fresh store has never run genesis, so this cannot fail.
        if let Err(err) = store.mint_genesis(initial_owner, &mut supply) {
            tracing::error!(%err, "genesis failed on a fresh store");
        }
        Self {
            name: name.into(),
            symbol: symbol.into(),
            store,
            supply,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[inline]
    pub fn max_precision(&self) -> Option<usize> {
        self.store.max_precision()
    }

    // -------------------------------------------------------------------------
    // Enumeration
    // -------------------------------------------------------------------------

    /// Number of minted cells, genesis included.
    #[inline]
    pub fn total_supply(&self) -> usize {
        self.supply.total_supply()
    }

    /// Id minted at `index`. Indices `0..32` are the genesis cells in alphabet order.
    #[inline]
    pub fn token_by_index(&self, index: usize) -> Result<TokenId> {
        self.supply.token_by_index(index)
    }

    /// Minted cells in mint order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.supply.iter().filter_map(|id| self.store.get(id))
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// Geohash text → id. Invalid and unminted input fail alike.
    #[inline]
    pub fn token_by_uri(&self, uri: &str) -> Result<TokenId> {
        resolver::token_by_uri(&self.store, uri)
    }

    /// Id → geohash text.
    #[inline]
    pub fn token_uri(&self, id: TokenId) -> Result<&GeohashPath> {
        resolver::token_uri(&self.store, id)
    }

    #[inline]
    pub fn exists(&self, id: TokenId) -> bool {
        self.store.exists(id)
    }

    #[inline]
    pub fn get(&self, id: TokenId) -> Option<&Cell> {
        self.store.get(id)
    }

    #[inline]
    pub fn path_of(&self, id: TokenId) -> Option<&GeohashPath> {
        self.store.path_of(id)
    }

    #[inline]
    pub fn owner_of(&self, id: TokenId) -> Option<Address> {
        self.store.owner_of(id)
    }

    // -------------------------------------------------------------------------
    // Minting
    // -------------------------------------------------------------------------

    /// Always fails once constructed; genesis runs in [`new`](Self::new).
    pub fn mint_genesis(&mut self, owner: Address) -> Result<()> {
        self.store.mint_genesis(owner, &mut self.supply)
    }

    /// Mint the cell `symbol` under `parent_id`.
    pub fn mint_child<A>(
        &mut self,
        parent_id: TokenId,
        symbol: Symbol,
        owner: Address,
        authority: &A,
    ) -> Result<Cell>
    where
        A: MintAuthority + ?Sized,
    {
        self.store
            .mint_child(parent_id, symbol, owner, authority, &mut self.supply)
    }

    /// Mint the cell at `path`, creating missing ancestors first.
    pub fn mint_path<A>(&mut self, path: &str, owner: Address, authority: &A) -> Result<Cell>
    where
        A: MintAuthority + ?Sized,
    {
        let path = validate(path)?;
        self.store.mint_path(&path, owner, authority, &mut self.supply)
    }

    /// Record the owner assigned by the external ownership ledger.
    pub fn set_owner(&mut self, id: TokenId, owner: Address) -> Result<Address> {
        self.store.set_owner(id, owner)
    }

    // -------------------------------------------------------------------------
    // Hierarchy
    // -------------------------------------------------------------------------

    #[inline]
    pub fn parent_of(&self, id: TokenId) -> Option<TokenId> {
        self.store.parent_of(id)
    }

    #[inline]
    pub fn children_of(&self, id: TokenId) -> Vec<TokenId> {
        self.store.children_of(id)
    }

    /// Check if `candidate` lies inside (or is) `ancestor`.
    ///
    /// Returns `None` if either id is not minted.
    ///
    /// ```text
    /// registry.is_descendant_of(id("9q8"), id("9"))  → Some(true)
    /// registry.is_descendant_of(id("9"),   id("9q")) → Some(false)
    /// registry.is_descendant_of(unknown,   id("9"))  → None
    /// ```
    #[inline]
    pub fn is_descendant_of(&self, candidate: TokenId, ancestor: TokenId) -> Option<bool> {
        self.store.is_descendant_of(candidate, ancestor)
    }

    /// Collect all minted cells inside `ancestor` (including itself), in mint order.
    ///
    /// Not O(1), iterates the supply index. Use `is_descendant_of` for single checks.
    pub fn descendants_of(&self, ancestor: TokenId) -> Vec<TokenId> {
        let Some(prefix) = self.store.path_of(ancestor) else {
            return Vec::new();
        };
        self.cells()
            .filter(|c| c.path.starts_with(prefix))
            .map(|c| c.id)
            .collect()
    }

    /// Capture the registry for persistence.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}

// =============================================================================
// Tests
// =============================================================================
