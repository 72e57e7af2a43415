//! # Geohash Cell Registry (geohash-registry)
//!
//! Assigns unique, ownable, enumerable tokens to geohash grid cells.
//!
//! ## Design
//!
//! A token id is Keccak-256 of the cell's geohash text, read as a big-endian
//! `U256`. The id is a pure function of the path, so it can be computed
//! anywhere, even at compile time, without asking the registry.
//!
//! ```text
//!                       (root, never minted)
//!        ┌──────┬──────┬─────┴─────┬──────┬──────┐
//!        0      1      …           9      …      z        32 genesis cells
//!                             ┌────┴────┐
//!                             9q   …    9r                children: parent + 1 symbol
//!                             │
//!                             9q8
//! ```
//!
//! The 32 genesis cells are minted at construction in alphabet order, so
//! `token_by_index(0..32)` enumerates them. Every later mint appends one id
//! to the supply index and needs its parent to exist already.
//!
//! ```ignore
//! use geohash_registry::{GeohashRegistry, Unrestricted, cell_id};
//!
//! let mut registry = GeohashRegistry::new("Geohash", "GEO", owner);
//! assert_eq!(registry.total_supply(), 32);
//! assert_eq!(registry.token_by_uri("0")?, cell_id!("0"));
//!
//! registry.mint_path("9q8yy", owner, &Unrestricted)?;
//! ```

// Lets the macros' `::geohash_registry` paths resolve inside this crate too.
extern crate self as geohash_registry;

pub mod alphabet;
pub mod bevy;
pub mod config;
pub mod error;
pub mod geo;
pub mod hash;
pub mod policy;
pub mod registry;
pub mod resolver;
pub mod shared;
pub mod snapshot;
pub mod store;
pub mod supply;

pub use alloy_primitives::{Address, U256};
pub use alphabet::{validate, GeohashPath, InvalidSymbol, Symbol, ALPHABET, FANOUT};
pub use config::RegistryConfig;
pub use error::{ConfigError, RegistryError, Result, SnapshotError};
pub use geo::{bounds, encode, BoundingBox, GeoError, MAX_PRECISION};
pub use geohash_registry_macro::{cell_id, cells};
pub use hash::{id_of, StaticCell};
pub use policy::{MintAuthority, ParentOwner, Unrestricted};
pub use registry::GeohashRegistry;
pub use shared::SharedRegistry;
pub use snapshot::{Snapshot, SnapshotCell};
pub use store::{Cell, HierarchyStore};
pub use supply::{MintHook, SupplyIndex};

/// Token identifier: Keccak-256 of the cell path as a big-endian 256-bit integer.
pub type TokenId = U256;
