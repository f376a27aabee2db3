use std::collections::HashMap;

use smallvec::SmallVec;

use crate::annotations::GeneId;
use crate::bins::BinId;
use crate::normalize_identifier;
use crate::DEFAULT_NUM_GENES;

/// The bins an identifier is annotated to
///
/// Most identifiers belong to very few bins, so the list is kept inline.
pub type GeneBins = SmallVec<[BinId; 4]>;

/// Index of all identifiers of the mapping
///
/// Maps every lower-cased identifier to its [`GeneId`] and every
/// [`GeneId`] to the bins it is directly annotated to. The index is
/// populated while the [`crate::Tree`] is built and read-only afterwards.
#[derive(Debug)]
pub struct GeneIndex {
    ids: HashMap<String, GeneId>,
    names: Vec<String>,
    bins: Vec<GeneBins>,
}

impl Default for GeneIndex {
    fn default() -> Self {
        Self {
            ids: HashMap::with_capacity(DEFAULT_NUM_GENES),
            names: Vec::with_capacity(DEFAULT_NUM_GENES),
            bins: Vec::with_capacity(DEFAULT_NUM_GENES),
        }
    }
}

impl GeneIndex {
    /// Registers the identifier for the bin and returns its [`GeneId`]
    ///
    /// Registering the same identifier-bin pair again is a no-op.
    pub(crate) fn insert(&mut self, identifier: &str, bin: BinId) -> GeneId {
        let key = normalize_identifier(identifier);
        let id = match self.ids.get(&key) {
            Some(id) => *id,
            None => {
                let id = GeneId::from(
                    u32::try_from(self.names.len()).expect("fewer than u32::MAX identifiers"),
                );
                self.names.push(key.clone());
                self.bins.push(GeneBins::new());
                self.ids.insert(key, id);
                id
            }
        };
        let bins = &mut self.bins[id.to_usize()];
        if !bins.contains(&bin) {
            bins.push(bin);
        }
        id
    }

    /// Returns the [`GeneId`] of the identifier, ignoring case
    ///
    /// Returns `None` if the identifier is not part of the mapping
    pub fn get(&self, identifier: &str) -> Option<GeneId> {
        self.ids.get(&normalize_identifier(identifier)).copied()
    }

    /// Returns the lower-cased identifier of the [`GeneId`]
    ///
    /// # Panics
    ///
    /// Panics if the [`GeneId`] was not created by this index
    pub fn name(&self, id: GeneId) -> &str {
        &self.names[id.to_usize()]
    }

    /// Returns the bins the identifier is directly annotated to
    ///
    /// # Panics
    ///
    /// Panics if the [`GeneId`] was not created by this index
    pub fn bins(&self, id: GeneId) -> &[BinId] {
        &self.bins[id.to_usize()]
    }

    /// Returns the number of distinct identifiers
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no identifier was registered
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn insert_is_case_insensitive() {
        let mut index = GeneIndex::default();
        let a = index.insert("AT1G01010", BinId::from(1));
        let b = index.insert("at1g01010", BinId::from(2));
        assert_eq!(a, b);
        assert_eq!(index.len(), 1);
        assert_eq!(index.name(a), "at1g01010");
        assert_eq!(index.bins(a), &[BinId::from(1), BinId::from(2)]);
    }

    #[test]
    fn repeated_pairs_are_ignored() {
        let mut index = GeneIndex::default();
        let a = index.insert("geneA", BinId::from(3));
        index.insert("GENEA", BinId::from(3));
        assert_eq!(index.bins(a).len(), 1);
    }

    #[test]
    fn lookup() {
        let mut index = GeneIndex::default();
        index.insert("geneA", BinId::from(1));
        assert!(index.get("GeneA").is_some());
        assert!(index.get(" genea ").is_some());
        assert!(index.get("geneZ").is_none());
    }
}
