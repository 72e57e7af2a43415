//! Snapshot persistence: a TOML record of every cell in mint order.
//!
//! ```toml
//! name = "Geohash"
//! symbol = "GEO"
//! generated_at = "2026-01-01T00:00:00Z"
//!
//! [[cells]]
//! path = "0"
//! owner = "0x0E0E0E0E0E0E0E0E0E0E0E0E0E0E0E0E0E0E0E0E"
//! ```
//!
//! Restoring replays the mints instead of trusting the file, so a restored
//! registry satisfies the same invariants as one built by hand: ids are
//! recomputed from paths and every child mint needs its parent.

use std::path::Path;

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alphabet::{GeohashPath, Symbol, FANOUT};
use crate::error::{RegistryError, SnapshotError};
use crate::hash::id_of;
use crate::policy::Unrestricted;
use crate::registry::GeohashRegistry;

/// Serializable registry state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_precision: Option<usize>,
    /// Every minted cell, in mint order.
    #[serde(default)]
    pub cells: Vec<SnapshotCell>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCell {
    pub path: GeohashPath,
    pub owner: Address,
}

impl Snapshot {
    pub fn capture(registry: &GeohashRegistry) -> Self {
        Self {
            name: registry.name().to_string(),
            symbol: registry.symbol().to_string(),
            generated_at: Utc::now(),
            max_precision: registry.max_precision(),
            cells: registry
                .cells()
                .map(|c| SnapshotCell {
                    path: c.path.clone(),
                    owner: c.owner,
                })
                .collect(),
        }
    }

    /// Rebuild a registry by replaying the recorded mints.
    ///
    /// The first 32 entries must be the genesis cells in alphabet order.
    pub fn restore(&self) -> Result<GeohashRegistry, SnapshotError> {
        self.check_genesis()?;

        let initial_owner = self.cells[0].owner;
        let mut registry = match self.max_precision {
            Some(max) => GeohashRegistry::with_max_precision(
                &self.name,
                &self.symbol,
                initial_owner,
                max,
            ),
            None => GeohashRegistry::new(&self.name, &self.symbol, initial_owner),
        };

        let (genesis, children) = self.cells.split_at(FANOUT);
        for cell in genesis.iter().filter(|c| c.owner != initial_owner) {
            registry
                .set_owner(id_of(&cell.path), cell.owner)
                .map_err(|source| replay_error(cell, source))?;
        }

        for cell in children {
            let step = match (cell.path.parent(), cell.path.last_symbol()) {
                (Some(parent), Some(symbol)) if !parent.is_root() => {
                    registry.mint_child(id_of(&parent), symbol, cell.owner, &Unrestricted)
                }
                // A second depth-1 entry repeats a genesis cell.
                (Some(_), Some(_)) => Err(RegistryError::AlreadyMinted(id_of(&cell.path))),
                _ => Err(RegistryError::RootNotMintable),
            };
            step.map_err(|source| replay_error(cell, source))?;
        }

        tracing::info!(
            name = %self.name,
            cells = registry.total_supply(),
            generated_at = %self.generated_at,
            "restored registry from snapshot"
        );
        Ok(registry)
    }

    fn check_genesis(&self) -> Result<(), SnapshotError> {
        let root = GeohashPath::root();
        for (index, symbol) in Symbol::ALL.iter().enumerate() {
            let expected = root.child(*symbol);
            let found = self.cells.get(index).map(|c| &c.path);
            if found != Some(&expected) {
                return Err(SnapshotError::GenesisMismatch {
                    index,
                    expected: expected.to_string(),
                    found: found.map(ToString::to_string).unwrap_or_default(),
                });
            }
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, SnapshotError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SnapshotError> {
        Ok(toml::from_str(content)?)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

fn replay_error(cell: &SnapshotCell, source: RegistryError) -> SnapshotError {
    SnapshotError::Replay {
        path: cell.path.to_string(),
        source,
    }
}
