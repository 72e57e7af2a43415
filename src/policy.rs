//! Mint authorization, injected into child minting by the caller.

use alloy_primitives::Address;

use crate::error::{RegistryError, Result};
use crate::store::Cell;

/// Decides whether a new cell may be minted under an existing one.
///
/// The store only checks existence; who may subdivide a cell is the caller's
/// policy.
pub trait MintAuthority {
    fn authorize(&self, parent: &Cell) -> Result<()>;
}

/// Allows every mint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unrestricted;

impl MintAuthority for Unrestricted {
    #[inline]
    fn authorize(&self, _parent: &Cell) -> Result<()> {
        Ok(())
    }
}

/// Allows a mint only when `caller` owns the parent cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParentOwner {
    pub caller: Address,
}

impl ParentOwner {
    pub const fn new(caller: Address) -> Self {
        Self { caller }
    }
}

impl MintAuthority for ParentOwner {
    fn authorize(&self, parent: &Cell) -> Result<()> {
        if parent.owner == self.caller {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized {
                parent: parent.id,
                caller: self.caller,
            })
        }
    }
}

impl<F> MintAuthority for F
where
    F: Fn(&Cell) -> Result<()>,
{
    fn authorize(&self, parent: &Cell) -> Result<()> {
        self(parent)
    }
}
