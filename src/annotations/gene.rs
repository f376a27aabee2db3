use core::fmt::Debug;
use std::collections::hash_set;
use std::collections::HashSet;
use std::fmt::Display;

use crate::annotations::GeneIndex;

/// A set of genes
///
/// The set does not contain the identifiers themselves, but only their [`GeneId`]s.
/// Currently implemented using [`HashSet`] but any other implementation
/// should work as well given that each [`GeneId`] must appear only once
/// and it provides an iterator of [`GeneId`]
pub type Genes = HashSet<GeneId>;

/// A unique numerical handle for an identifier in the [`GeneIndex`]
///
/// `GeneId`s are only valid for the [`crate::Tree`] that created them.
#[derive(Clone, Copy, Default, Debug, Hash, PartialEq, PartialOrd, Eq, Ord)]
pub struct GeneId {
    inner: u32,
}

impl GeneId {
    /// Returns the index of the identifier in the [`GeneIndex`]
    pub fn as_u32(&self) -> u32 {
        self.inner
    }

    pub(crate) fn to_usize(self) -> usize {
        self.inner as usize
    }
}

impl From<u32> for GeneId {
    fn from(inner: u32) -> Self {
        GeneId { inner }
    }
}

impl Display for GeneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GeneId:{}", self.inner)
    }
}

/// Iterates the (lower-cased) identifiers of a set of [`Genes`]
pub struct GeneIterator<'a> {
    genes: hash_set::Iter<'a, GeneId>,
    index: &'a GeneIndex,
}

impl<'a> GeneIterator<'a> {
    pub(crate) fn new(genes: &'a Genes, index: &'a GeneIndex) -> Self {
        GeneIterator {
            genes: genes.iter(),
            index,
        }
    }
}

impl<'a> Iterator for GeneIterator<'a> {
    type Item = &'a str;
    fn next(&mut self) -> Option<Self::Item> {
        self.genes.next().map(|id| self.index.name(*id))
    }
}
