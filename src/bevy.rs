//! Bevy integration for the geohash registry.
//!
//! Provides:
//! - `GeohashPlugin`: builder-pattern plugin that constructs the registry as a Resource
//! - `CellSet`: component holding the cells an entity occupies, with O(1) membership
//!
//! # Example
//!
//! ```ignore
//! use bevy::prelude::*;
//! use geohash_registry::bevy::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(GeohashPlugin::new("Geohash", "GEO", owner).with_seed(["9q8yy"]))
//!         .add_systems(Startup, spawn_entities)
//!         .run();
//! }
//!
//! fn spawn_entities(mut commands: Commands, registry: Res<GeohashRegistry>) {
//!     let cell = registry.token_by_uri("9q8yy").unwrap();
//!     commands.spawn(CellSet::single(cell));
//! }
//! ```

use alloy_primitives::Address;
use bevy::prelude::*;
use std::collections::HashSet;

use crate::{policy::Unrestricted, registry::GeohashRegistry, TokenId};

// =============================================================================
// Plugin
// =============================================================================

/// Bevy plugin for the geohash registry.
///
/// Use the builder pattern to configure:
///
/// ```ignore
/// App::new()
///     .add_plugins(
///         GeohashPlugin::new("Geohash", "GEO", owner)
///             .with_max_precision(9)
///             .with_seed(["9q8yy", "u4pru"])
///     )
/// ```
pub struct GeohashPlugin {
    name: String,
    symbol: String,
    initial_owner: Address,
    max_precision: Option<usize>,
    seed: Vec<String>,
}

impl GeohashPlugin {
    /// Create a plugin that mints only the genesis cells.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, initial_owner: Address) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            initial_owner,
            max_precision: None,
            seed: Vec::new(),
        }
    }

    /// Limit how deep child mints may go.
    pub fn with_max_precision(mut self, max: usize) -> Self {
        self.max_precision = Some(max);
        self
    }

    /// Cells to mint (with their ancestors) to the initial owner at startup.
    pub fn with_seed<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed.extend(paths.into_iter().map(Into::into));
        self
    }

    fn build_registry(&self) -> GeohashRegistry {
        let mut registry = match self.max_precision {
            Some(max) => GeohashRegistry::with_max_precision(
                &self.name,
                &self.symbol,
                self.initial_owner,
                max,
            ),
            None => GeohashRegistry::new(&self.name, &self.symbol, self.initial_owner),
        };
        for path in &self.seed {
            if let Err(err) = registry.mint_path(path, self.initial_owner, &Unrestricted) {
                tracing::warn!(%path, %err, "skipping seed cell");
            }
        }
        registry
    }
}

impl Plugin for GeohashPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.build_registry());
    }
}

// =============================================================================
// CellSet Component
// =============================================================================

/// The cells an entity occupies or claims.
///
/// Provides O(1) membership checks via `HashSet`. Subtree queries need the
/// registry, since ids carry no hierarchy of their own.
///
/// # Example
///
/// ```ignore
/// fn system(query: Query<&CellSet>, registry: Res<GeohashRegistry>) {
///     let bay_area = registry.token_by_uri("9q").unwrap();
///     for cells in query.iter() {
///         if cells.has_within(&registry, bay_area) {
///             // Entity touches the 9q cell
///         }
///     }
/// }
/// ```
#[derive(Component, Clone, Debug, Default, PartialEq, Eq)]
pub struct CellSet {
    cells: HashSet<TokenId>,
}

impl CellSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn single(id: TokenId) -> Self {
        let mut cells = HashSet::new();
        cells.insert(id);
        Self { cells }
    }

    /// Builder method: add a cell and return self.
    #[inline]
    pub fn with(mut self, id: TokenId) -> Self {
        self.cells.insert(id);
        self
    }

    /// Returns `true` if the cell was newly inserted.
    #[inline]
    pub fn insert(&mut self, id: TokenId) -> bool {
        self.cells.insert(id)
    }

    /// Returns `true` if the cell was present.
    #[inline]
    pub fn remove(&mut self, id: TokenId) -> bool {
        self.cells.remove(&id)
    }

    #[inline]
    pub fn has(&self, id: TokenId) -> bool {
        self.cells.contains(&id)
    }

    /// Check if any held cell lies inside `ancestor`.
    ///
    /// O(n) in the number of held cells.
    pub fn has_within(&self, registry: &GeohashRegistry, ancestor: TokenId) -> bool {
        self.cells
            .iter()
            .any(|&id| registry.is_descendant_of(id, ancestor) == Some(true))
    }

    /// Held cells that lie inside `ancestor`.
    pub fn within<'a>(
        &'a self,
        registry: &'a GeohashRegistry,
        ancestor: TokenId,
    ) -> impl Iterator<Item = TokenId> + 'a {
        self.cells
            .iter()
            .copied()
            .filter(move |&id| registry.is_descendant_of(id, ancestor) == Some(true))
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.cells.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

impl FromIterator<TokenId> for CellSet {
    fn from_iter<T: IntoIterator<Item = TokenId>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl Extend<TokenId> for CellSet {
    fn extend<T: IntoIterator<Item = TokenId>>(&mut self, iter: T) {
        self.cells.extend(iter);
    }
}

// =============================================================================
// Resource impl for GeohashRegistry
// =============================================================================

impl Resource for GeohashRegistry {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> TokenId {
        TokenId::from(n)
    }

    #[test]
    fn cell_set_builder() {
        let set = CellSet::new().with(id(1)).with(id(2)).with(id(3));

        assert_eq!(set.len(), 3);
        assert!(set.has(id(1)));
        assert!(set.has(id(3)));
        assert!(!set.has(id(4)));
    }

    #[test]
    fn cell_set_insert_remove() {
        let mut set = CellSet::new();

        assert!(set.insert(id(1)));
        assert!(!set.insert(id(1))); // duplicate
        assert_eq!(set.len(), 1);

        assert!(set.remove(id(1)));
        assert!(!set.remove(id(1))); // already removed
        assert!(set.is_empty());
    }

    #[test]
    fn cell_set_from_iter_and_extend() {
        let mut set: CellSet = [id(1), id(2)].into_iter().collect();
        set.extend([id(3)]);
        assert_eq!(set.len(), 3);
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn cell_set_subtree_queries() {
        let mut registry = GeohashRegistry::new("Geohash", "GEO", Address::ZERO);
        let leaf = registry
            .mint_path("9q8yy", Address::ZERO, &Unrestricted)
            .unwrap()
            .id;
        let other = registry.token_by_uri("u").unwrap();
        let set = CellSet::single(leaf).with(other);

        let bay = registry.token_by_uri("9q").unwrap();
        assert!(set.has_within(&registry, bay));
        assert_eq!(set.within(&registry, bay).collect::<Vec<_>>(), vec![leaf]);

        let europe = registry.token_by_uri("g").unwrap();
        assert!(!set.has_within(&registry, europe));
    }

    #[test]
    fn plugin_inserts_seeded_registry() {
        let mut app = App::new();
        app.add_plugins(
            GeohashPlugin::new("Geohash", "GEO", Address::ZERO)
                .with_max_precision(4)
                .with_seed(["9q8y", "u4pruy"]),
        );

        let registry = app.world().resource::<GeohashRegistry>();
        assert_eq!(registry.max_precision(), Some(4));
        // 9q, 9q8, 9q8y minted; u4pruy exceeds the limit and is skipped
        assert_eq!(registry.total_supply(), 35);
        assert!(registry.token_by_uri("u4").is_err());
    }
}
