use std::collections::HashMap;

use crate::bins::internal::BinInternal;
use crate::bins::{BinCode, BinId};
use crate::DEFAULT_NUM_BINS;

/// Owns all bins of the tree, addressed by their position
pub(crate) struct Arena {
    bins: Vec<BinInternal>,
    codes: HashMap<BinCode, BinId>,
}

impl Arena {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Returns the `BinId` the next inserted bin will receive
    pub fn next_id(&self) -> BinId {
        BinId::from_index(self.bins.len())
    }

    /// Appends the bin
    ///
    /// The caller must create the bin with [`Arena::next_id`]
    pub fn insert(&mut self, bin: BinInternal) -> BinId {
        let id = bin.id();
        debug_assert_eq!(id, self.next_id());
        self.codes.insert(bin.code().clone(), id);
        self.bins.push(bin);
        id
    }

    pub fn get(&self, id: BinId) -> Option<&BinInternal> {
        self.bins.get(id.to_usize())
    }

    pub fn get_unchecked(&self, id: BinId) -> &BinInternal {
        &self.bins[id.to_usize()]
    }

    pub fn get_unchecked_mut(&mut self, id: BinId) -> &mut BinInternal {
        &mut self.bins[id.to_usize()]
    }

    pub fn id_of(&self, code: &str) -> Option<BinId> {
        self.codes.get(code).copied()
    }

    pub fn values(&self) -> std::slice::Iter<'_, BinInternal> {
        self.bins.iter()
    }

    pub fn values_mut(&mut self) -> std::slice::IterMut<'_, BinInternal> {
        self.bins.iter_mut()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            bins: Vec::with_capacity(DEFAULT_NUM_BINS),
            codes: HashMap::with_capacity(DEFAULT_NUM_BINS),
        }
    }
}
