//! Error types for registry operations.

use std::path::PathBuf;

use alloy_primitives::Address;

use crate::alphabet::InvalidSymbol;
use crate::TokenId;

/// Errors from minting, enumeration and lookup.
///
/// Every variant is reported before any state changes, so a failed call
/// leaves the registry exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    InvalidSymbol(#[from] InvalidSymbol),

    /// The input is either not a geohash or names a cell that was never minted.
    /// The two cases are deliberately indistinguishable.
    #[error("URI nonexistent token")]
    NotFoundOrInvalid,

    #[error("index {index} out of range (total supply {total_supply})")]
    IndexOutOfRange { index: usize, total_supply: usize },

    #[error("genesis cells already minted")]
    AlreadyInitialized,

    #[error("parent token {0} does not exist")]
    ParentNotFound(TokenId),

    #[error("token {0} already minted")]
    AlreadyMinted(TokenId),

    #[error("{caller} may not mint under token {parent}")]
    Unauthorized { parent: TokenId, caller: Address },

    #[error("cell depth {depth} exceeds maximum precision {max}")]
    PrecisionExceeded { depth: usize, max: usize },

    #[error("the root cell cannot be minted")]
    RootNotMintable,
}

/// Errors from reading, writing or replaying a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("snapshot entry {index} should be genesis cell '{expected}', found '{found}'")]
    GenesisMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("snapshot replay failed at '{path}': {source}")]
    Replay {
        path: String,
        #[source]
        source: RegistryError,
    },
}

/// Errors from loading a registry configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("failed to mint seed cell '{path}': {source}")]
    Seed {
        path: String,
        #[source]
        source: RegistryError,
    },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
