//! TOML configuration for building a registry.
//!
//! ```toml
//! name = "Geohash"
//! symbol = "GEO"
//! initial_owner = "0x0E0E0E0E0E0E0E0E0E0E0E0E0E0E0E0E0E0E0E0E"
//! max_precision = 12
//! snapshot = "cells.toml"
//!
//! [seed]
//! paths = ["9q8yy", "u4pru"]
//! ```

use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use serde::Deserialize;

use crate::alphabet::{validate, GeohashPath};
use crate::error::{ConfigError, RegistryError};
use crate::policy::Unrestricted;
use crate::registry::GeohashRegistry;
use crate::snapshot::Snapshot;

/// Parsed and validated registry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Display name (defaults to "Geohash")
    pub name: String,
    /// Display symbol (defaults to "GEO")
    pub symbol: String,
    /// Owner of the genesis cells and of seed cells
    pub initial_owner: Address,
    /// Deepest cell child mints may create
    pub max_precision: Option<usize>,
    /// Snapshot file to restore from when it exists
    pub snapshot: Option<PathBuf>,
    /// Cells minted on a fresh registry, in order
    pub seed: Vec<GeohashPath>,
}

/// Raw TOML structure.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRegistryConfig {
    name: Option<String>,
    symbol: Option<String>,
    initial_owner: String,
    max_precision: Option<usize>,
    snapshot: Option<PathBuf>,
    #[serde(default)]
    seed: RawSeed,
}

#[derive(Debug, Default, Deserialize)]
struct RawSeed {
    #[serde(default)]
    paths: Vec<String>,
}

impl RegistryConfig {
    /// Parse from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawRegistryConfig = toml::from_str(content)?;

        let initial_owner: Address = raw.initial_owner.parse().map_err(|e| {
            ConfigError::Validation(format!(
                "invalid initial_owner '{}': {}",
                raw.initial_owner, e
            ))
        })?;

        if raw.max_precision == Some(0) {
            return Err(ConfigError::Validation(
                "max_precision must be at least 1".into(),
            ));
        }

        let mut seed = Vec::with_capacity(raw.seed.paths.len());
        for text in &raw.seed.paths {
            let path = validate(text)
                .map_err(|e| ConfigError::Validation(format!("seed path '{}': {}", text, e)))?;
            if path.depth() < 2 {
                return Err(ConfigError::Validation(format!(
                    "seed path '{}' must be below a genesis cell",
                    text
                )));
            }
            if let Some(max) = raw.max_precision
                && path.depth() > max
            {
                return Err(ConfigError::Validation(format!(
                    "seed path '{}' is deeper than max_precision ({})",
                    text, max
                )));
            }
            seed.push(path);
        }

        Ok(Self {
            name: raw.name.unwrap_or_else(|| "Geohash".to_string()),
            symbol: raw.symbol.unwrap_or_else(|| "GEO".to_string()),
            initial_owner,
            max_precision: raw.max_precision,
            snapshot: raw.snapshot,
            seed,
        })
    }

    /// Restore from the snapshot file if it exists, otherwise construct a
    /// fresh registry and mint the seed cells.
    pub fn build(&self) -> Result<GeohashRegistry, ConfigError> {
        if let Some(path) = &self.snapshot
            && path.exists()
        {
            return Ok(Snapshot::read_from(path)?.restore()?);
        }

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
            match registry.mint_path(path.as_str(), self.initial_owner, &Unrestricted) {
                Ok(_) => {}
                Err(RegistryError::AlreadyMinted(_)) => {
                    tracing::warn!(%path, "seed cell already minted, skipping");
                }
                Err(source) => {
                    return Err(ConfigError::Seed {
                        path: path.to_string(),
                        source,
                    });
                }
            }
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "0x0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e";

    #[test]
    fn parse_minimal_config() {
        let config = RegistryConfig::from_str(&format!("initial_owner = \"{OWNER}\"")).unwrap();
        assert_eq!(config.name, "Geohash");
        assert_eq!(config.symbol, "GEO");
        assert_eq!(config.initial_owner, Address::repeat_byte(0x0E));
        assert_eq!(config.max_precision, None);
        assert!(config.seed.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let config = RegistryConfig::from_str(&format!(
            r#"
name = "Cells"
symbol = "CEL"
initial_owner = "{OWNER}"
max_precision = 6
snapshot = "cells.toml"

[seed]
paths = ["9q8yy", "u4pru"]
"#
        ))
        .unwrap();

        assert_eq!(config.name, "Cells");
        assert_eq!(config.symbol, "CEL");
        assert_eq!(config.max_precision, Some(6));
        assert_eq!(config.snapshot, Some(PathBuf::from("cells.toml")));
        assert_eq!(config.seed.len(), 2);
    }

    #[test]
    fn rejects_invalid_values() {
        let cases = [
            "initial_owner = \"not-an-address\"".to_string(),
            format!("initial_owner = \"{OWNER}\"\nmax_precision = 0"),
            format!("initial_owner = \"{OWNER}\"\n[seed]\npaths = [\"9qa\"]"),
            format!("initial_owner = \"{OWNER}\"\n[seed]\npaths = [\"9\"]"),
            format!("initial_owner = \"{OWNER}\"\nmax_precision = 2\n[seed]\npaths = [\"9q8\"]"),
        ];
        for case in &cases {
            assert!(
                matches!(RegistryConfig::from_str(case), Err(ConfigError::Validation(_))),
                "should reject: {case}"
            );
        }

        assert!(matches!(
            RegistryConfig::from_str("name = \"x\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            RegistryConfig::from_str(&format!("initial_owner = \"{OWNER}\"\ncolour = 1")),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn build_mints_seed_cells() {
        let config = RegistryConfig::from_str(&format!(
            "initial_owner = \"{OWNER}\"\n[seed]\npaths = [\"9q8\", \"9q\", \"dr5r\"]"
        ))
        .unwrap();
        let registry = config.build().unwrap();

        // 9q, 9q8, dr, dr5, dr5r; the explicit "9q" is already there
        assert_eq!(registry.total_supply(), 32 + 5);
        assert!(registry.token_by_uri("9q8").is_ok());
        assert!(registry.token_by_uri("dr5r").is_ok());
    }
}
