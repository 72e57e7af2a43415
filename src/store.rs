//! Hierarchy store: the cell arena and its subdivision rules.
//!
//! Cells are kept in a flat map keyed by token id. There are no parent or
//! child pointers: parentage is the path prefix, and a child's id is simply
//! the hash of the parent path plus one symbol.

use std::collections::HashMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::alphabet::{GeohashPath, Symbol};
use crate::error::{RegistryError, Result};
use crate::hash::id_of;
use crate::policy::MintAuthority;
use crate::supply::MintHook;
use crate::TokenId;

/// A minted grid cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub id: TokenId,
    pub path: GeohashPath,
    pub owner: Address,
}

/// Existing cells, indexed by id.
///
/// Invariants, established at mint time:
/// - `cell.id == id_of(&cell.path)` for every cell
/// - every cell of depth > 1 has its parent in the store
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HierarchyStore {
    cells: HashMap<TokenId, Cell>,
    initialized: bool,
    max_precision: Option<usize>,
}

impl HierarchyStore {
    /// An empty store. Genesis has not run yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how deep child mints may go. Genesis cells are always depth 1.
    pub fn with_max_precision(mut self, max: usize) -> Self {
        self.max_precision = Some(max);
        self
    }

    #[inline]
    pub fn max_precision(&self) -> Option<usize> {
        self.max_precision
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// O(1) membership.
    #[inline]
    pub fn exists(&self, id: TokenId) -> bool {
        self.cells.contains_key(&id)
    }

    #[inline]
    pub fn get(&self, id: TokenId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    /// Id → path.
    #[inline]
    pub fn path_of(&self, id: TokenId) -> Option<&GeohashPath> {
        self.cells.get(&id).map(|c| &c.path)
    }

    #[inline]
    pub fn owner_of(&self, id: TokenId) -> Option<Address> {
        self.cells.get(&id).map(|c| c.owner)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Mint the 32 depth-1 cells in alphabet order, all owned by `owner`.
    ///
    /// Runs once per store.
    pub fn mint_genesis(&mut self, owner: Address, hook: &mut impl MintHook) -> Result<()> {
        if self.initialized {
            return Err(RegistryError::AlreadyInitialized);
        }

        let root = GeohashPath::root();
        for symbol in Symbol::ALL {
            self.insert(root.child(symbol), owner, hook);
        }
        self.initialized = true;

        tracing::info!(%owner, cells = Symbol::ALL.len(), "minted genesis cells");
        Ok(())
    }

    /// Mint the cell `symbol` under `parent_id`.
    ///
    /// Checked in order: parent exists, precision limit, child not yet minted,
    /// `authority` accepts the parent. Nothing is written unless all pass.
    pub fn mint_child<A>(
        &mut self,
        parent_id: TokenId,
        symbol: Symbol,
        owner: Address,
        authority: &A,
        hook: &mut impl MintHook,
    ) -> Result<Cell>
    where
        A: MintAuthority + ?Sized,
    {
        let parent = self
            .cells
            .get(&parent_id)
            .ok_or(RegistryError::ParentNotFound(parent_id))?;

        let path = parent.path.child(symbol);
        self.check_precision(&path)?;

        let id = id_of(&path);
        if self.cells.contains_key(&id) {
            return Err(RegistryError::AlreadyMinted(id));
        }

        authority.authorize(parent)?;

        Ok(self.insert(path, owner, hook).clone())
    }

    /// Mint `path` together with any missing ancestors, shallowest first.
    ///
    /// The authority is asked once, about the deepest ancestor that already
    /// exists. Fails without writing anything if `path` is the root, is
    /// already minted, exceeds the precision limit, or has no existing
    /// ancestor below the root.
    pub fn mint_path<A>(
        &mut self,
        path: &GeohashPath,
        owner: Address,
        authority: &A,
        hook: &mut impl MintHook,
    ) -> Result<Cell>
    where
        A: MintAuthority + ?Sized,
    {
        let parent = path.parent().ok_or(RegistryError::RootNotMintable)?;
        self.check_precision(path)?;

        let id = id_of(path);
        if self.cells.contains_key(&id) {
            return Err(RegistryError::AlreadyMinted(id));
        }

        // Ancestors exist as an unbroken chain from depth 1, so the deepest
        // existing prefix splits existing from missing.
        let anchor = path
            .prefixes()
            .take(path.depth() - 1)
            .filter_map(|prefix| self.cells.get(&id_of(&prefix)))
            .last()
            .ok_or_else(|| RegistryError::ParentNotFound(id_of(&parent)))?;

        authority.authorize(anchor)?;

        let first_missing = anchor.path.depth();
        let missing: Vec<GeohashPath> = path.prefixes().skip(first_missing).collect();
        let mut minted = None;
        for prefix in missing {
            minted = Some(self.insert(prefix, owner, hook).clone());
        }
        // `missing` always ends with `path` itself.
        minted.ok_or(RegistryError::AlreadyMinted(id))
    }

    /// Record a new owner for an existing cell, returning the previous one.
    ///
    /// Called by the external ownership ledger after it settles a transfer.
    pub fn set_owner(&mut self, id: TokenId, owner: Address) -> Result<Address> {
        let cell = self
            .cells
            .get_mut(&id)
            .ok_or(RegistryError::NotFoundOrInvalid)?;
        Ok(std::mem::replace(&mut cell.owner, owner))
    }

    /// Id of the enclosing cell. `None` for genesis cells and unknown ids.
    pub fn parent_of(&self, id: TokenId) -> Option<TokenId> {
        let parent = self.path_of(id)?.parent()?;
        (!parent.is_root()).then(|| id_of(&parent))
    }

    /// Minted children of `id`, in alphabet order.
    ///
    /// Probes the 32 candidate ids rather than scanning the store.
    pub fn children_of(&self, id: TokenId) -> Vec<TokenId> {
        let Some(path) = self.path_of(id) else {
            return Vec::new();
        };
        Symbol::ALL
            .iter()
            .map(|&symbol| id_of(&path.child(symbol)))
            .filter(|child| self.exists(*child))
            .collect()
    }

    /// Check if `candidate` lies inside (or is) `ancestor`.
    ///
    /// Returns `None` if either id is not minted.
    pub fn is_descendant_of(&self, candidate: TokenId, ancestor: TokenId) -> Option<bool> {
        let candidate = self.path_of(candidate)?;
        let ancestor = self.path_of(ancestor)?;
        Some(candidate.starts_with(ancestor))
    }

    /// All cells, in no particular order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    fn check_precision(&self, path: &GeohashPath) -> Result<()> {
        if let Some(max) = self.max_precision
            && path.depth() > max
        {
            return Err(RegistryError::PrecisionExceeded {
                depth: path.depth(),
                max,
            });
        }
        Ok(())
    }

    fn insert(&mut self, path: GeohashPath, owner: Address, hook: &mut impl MintHook) -> &Cell {
        let id = id_of(&path);
        tracing::debug!(%path, %id, %owner, "minted cell");
        hook.on_mint(id);
        self.cells.entry(id).or_insert(Cell { id, path, owner })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::validate;
    use crate::policy::{ParentOwner, Unrestricted};

    impl MintHook for Vec<TokenId> {
        fn on_mint(&mut self, id: TokenId) {
            self.push(id);
        }
    }

    const OWNER: Address = Address::repeat_byte(0x11);

    fn genesis_store() -> (HierarchyStore, Vec<TokenId>) {
        let mut store = HierarchyStore::new();
        let mut minted = Vec::new();
        store.mint_genesis(OWNER, &mut minted).unwrap();
        (store, minted)
    }

    fn id(path: &str) -> TokenId {
        id_of(&validate(path).unwrap())
    }

    fn sym(c: char) -> Symbol {
        Symbol::from_char(c).unwrap()
    }

    #[test]
    fn genesis_mints_every_symbol_in_order() {
        let (store, minted) = genesis_store();

        assert_eq!(store.len(), 32);
        assert!(store.is_initialized());
        for (symbol, minted_id) in Symbol::ALL.iter().zip(&minted) {
            let path = GeohashPath::root().child(*symbol);
            assert_eq!(*minted_id, id_of(&path));
            assert_eq!(store.path_of(*minted_id), Some(&path));
            assert_eq!(store.owner_of(*minted_id), Some(OWNER));
        }
    }

    #[test]
    fn genesis_runs_once() {
        let (mut store, mut minted) = genesis_store();
        assert_eq!(
            store.mint_genesis(OWNER, &mut minted),
            Err(RegistryError::AlreadyInitialized)
        );
        assert_eq!(minted.len(), 32);
    }

    #[test]
    fn mint_child_extends_parent_path() {
        let (mut store, mut minted) = genesis_store();
        let alice = Address::repeat_byte(0xA1);

        let cell = store
            .mint_child(id("9"), sym('q'), alice, &Unrestricted, &mut minted)
            .unwrap();

        assert_eq!(cell.path.as_str(), "9q");
        assert_eq!(cell.id, id("9q"));
        assert_eq!(cell.owner, alice);
        assert!(store.exists(cell.id));
        assert_eq!(minted.last(), Some(&cell.id));
    }

    #[test]
    fn mint_child_requires_parent() {
        let (mut store, mut minted) = genesis_store();
        assert_eq!(
            store.mint_child(id("9q"), sym('8'), OWNER, &Unrestricted, &mut minted),
            Err(RegistryError::ParentNotFound(id("9q")))
        );
        assert_eq!(minted.len(), 32);
    }

    #[test]
    fn mint_child_rejects_duplicates() {
        let (mut store, mut minted) = genesis_store();
        store
            .mint_child(id("9"), sym('q'), OWNER, &Unrestricted, &mut minted)
            .unwrap();
        assert_eq!(
            store.mint_child(id("9"), sym('q'), OWNER, &Unrestricted, &mut minted),
            Err(RegistryError::AlreadyMinted(id("9q")))
        );
        assert_eq!(minted.len(), 33);
    }

    #[test]
    fn mint_child_consults_authority() {
        let (mut store, mut minted) = genesis_store();
        let mallory = Address::repeat_byte(0x66);

        let err = store
            .mint_child(id("u"), sym('4'), mallory, &ParentOwner::new(mallory), &mut minted)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::Unauthorized {
                parent: id("u"),
                caller: mallory
            }
        );
        assert!(!store.exists(id("u4")));

        assert!(
            store
                .mint_child(id("u"), sym('4'), mallory, &ParentOwner::new(OWNER), &mut minted)
                .is_ok()
        );
    }

    #[test]
    fn precision_limit_applies_to_children() {
        let mut store = HierarchyStore::new().with_max_precision(2);
        let mut minted = Vec::new();
        store.mint_genesis(OWNER, &mut minted).unwrap();

        store
            .mint_child(id("9"), sym('q'), OWNER, &Unrestricted, &mut minted)
            .unwrap();
        assert_eq!(
            store.mint_child(id("9q"), sym('8'), OWNER, &Unrestricted, &mut minted),
            Err(RegistryError::PrecisionExceeded { depth: 3, max: 2 })
        );
    }

    #[test]
    fn mint_path_creates_missing_ancestors() {
        let (mut store, mut minted) = genesis_store();

        let cell = store
            .mint_path(&validate("9q8y").unwrap(), OWNER, &Unrestricted, &mut minted)
            .unwrap();

        assert_eq!(cell.path.as_str(), "9q8y");
        assert_eq!(&minted[32..], &[id("9q"), id("9q8"), id("9q8y")]);

        // Fills only the gap below an existing ancestor
        store
            .mint_path(&validate("9q8yz").unwrap(), OWNER, &Unrestricted, &mut minted)
            .unwrap();
        assert_eq!(&minted[35..], &[id("9q8yz")]);
    }

    #[test]
    fn mint_path_failures_write_nothing() {
        let (mut store, mut minted) = genesis_store();

        assert_eq!(
            store.mint_path(&GeohashPath::root(), OWNER, &Unrestricted, &mut minted),
            Err(RegistryError::RootNotMintable)
        );
        assert_eq!(
            store.mint_path(&validate("9").unwrap(), OWNER, &Unrestricted, &mut minted),
            Err(RegistryError::AlreadyMinted(id("9")))
        );

        let stranger = Address::repeat_byte(0x77);
        assert!(
            store
                .mint_path(&validate("9q8").unwrap(), stranger, &ParentOwner::new(stranger), &mut minted)
                .is_err()
        );
        assert!(!store.exists(id("9q")));
        assert_eq!(minted.len(), 32);
    }

    #[test]
    fn mint_path_without_genesis_has_no_anchor() {
        let mut store = HierarchyStore::new();
        let mut minted = Vec::new();
        assert_eq!(
            store.mint_path(&validate("9q").unwrap(), OWNER, &Unrestricted, &mut minted),
            Err(RegistryError::ParentNotFound(id("9")))
        );
        assert!(minted.is_empty());
    }

    #[test]
    fn hierarchy_queries() {
        let (mut store, mut minted) = genesis_store();
        for path in ["9q", "9r", "9q8"] {
            store
                .mint_path(&validate(path).unwrap(), OWNER, &Unrestricted, &mut minted)
                .unwrap();
        }

        assert_eq!(store.parent_of(id("9q8")), Some(id("9q")));
        assert_eq!(store.parent_of(id("9")), None);
        assert_eq!(store.parent_of(id("zz")), None);

        assert_eq!(store.children_of(id("9")), vec![id("9q"), id("9r")]);
        assert!(store.children_of(id("9q8")).is_empty());

        assert_eq!(store.is_descendant_of(id("9q8"), id("9")), Some(true));
        assert_eq!(store.is_descendant_of(id("9q8"), id("9q8")), Some(true));
        assert_eq!(store.is_descendant_of(id("9"), id("9q")), Some(false));
        assert_eq!(store.is_descendant_of(id("9r"), id("9q")), Some(false));
        assert_eq!(store.is_descendant_of(id("kk"), id("9")), None);
    }

    #[test]
    fn set_owner_records_transfer() {
        let (mut store, _) = genesis_store();
        let bob = Address::repeat_byte(0xB0);

        assert_eq!(store.set_owner(id("s"), bob), Ok(OWNER));
        assert_eq!(store.owner_of(id("s")), Some(bob));
        assert_eq!(
            store.set_owner(id("s0"), bob),
            Err(RegistryError::NotFoundOrInvalid)
        );
    }
}
