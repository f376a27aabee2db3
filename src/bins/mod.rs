//! Bins are the nodes of the functional hierarchy
//!
//! Every bin is identified by its [`BinCode`] and stored in the arena of the
//! [`crate::Tree`] under a [`BinId`]. The public representation of a bin is
//! [`Bin`], a lightweight view that borrows from the tree.
use core::fmt::Debug;
use std::fmt::Display;

mod bin;
mod bincode;
pub(crate) mod internal;

pub use bin::{Ancestors, Bin, Children};
pub use bincode::BinCode;

/// The child bins of a bin
pub type BinChildren = Vec<BinId>;

/// The position of a bin inside the [`crate::Tree`] arena
///
/// A parent is always inserted before its children, so the `BinId` of a
/// parent is strictly smaller than the `BinId` of each of its children.
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BinId {
    inner: u32,
}

impl BinId {
    /// The root bin is always the first bin in the arena
    pub fn root() -> Self {
        Self { inner: 0 }
    }

    /// Returns the arena index
    pub fn to_usize(&self) -> usize {
        self.inner as usize
    }

    pub(crate) fn from_index(idx: usize) -> Self {
        Self {
            inner: u32::try_from(idx).expect("the arena holds fewer than u32::MAX bins"),
        }
    }
}

impl From<u32> for BinId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl Debug for BinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BinId({})", self.inner)
    }
}

impl Display for BinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
