use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::bins::BinId;
use crate::expression::{Expression, ExpressionMap, ExpressionSets};
use crate::{normalize_identifier, Tree};

/// The expression data of one analysis, attached to the bins of a [`Tree`]
///
/// Each bin has one [`ExpressionMap`] that holds the identifiers assigned
/// to the bin and all its descendants. The tree itself is never modified, so
/// any number of overlays can share one tree.
///
/// # Examples
///
/// ```
/// use binenrich::{Expression, ExpressionOverlay, Tree};
/// use binenrich::expression::Membership;
///
/// let tree = Tree::from_file("tests/mapping.tsv").unwrap();
/// let mut overlay = ExpressionOverlay::new(&tree);
///
/// overlay.assign(["AT1G01020"], Expression::Up);
/// overlay.assign(["AT2G01010"], Expression::Down);
/// overlay.assign(["AT1G01030", "geneZ"], Expression::Undetermined);
///
/// let photosynthesis = tree.bin_by_code("1").unwrap();
/// let map = overlay.get(photosynthesis.id());
/// assert_eq!(map.count(Membership::Up), 1);
/// assert_eq!(map.count(Membership::Detected), 2);
///
/// assert_eq!(overlay.root().count(Membership::Detected), 3);
/// assert!(overlay.unmapped().contains("genez"));
/// ```
#[derive(Debug, Clone)]
pub struct ExpressionOverlay<'a> {
    tree: &'a Tree,
    maps: Vec<ExpressionMap>,
    unmapped: BTreeSet<String>,
}

impl<'a> ExpressionOverlay<'a> {
    /// Creates an empty overlay for the tree
    pub fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            maps: vec![ExpressionMap::default(); tree.len()],
            unmapped: BTreeSet::new(),
        }
    }

    /// Creates an overlay and assigns all categories of the `sets`
    pub fn from_sets(tree: &'a Tree, sets: &ExpressionSets) -> Self {
        let mut overlay = Self::new(tree);
        for expression in Expression::ALL {
            overlay.assign(sets.get(expression), expression);
        }
        overlay
    }

    /// Returns the [`Tree`] of the overlay
    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// Assigns the identifiers to the `expression` category
    ///
    /// Every identifier is added to all bins it is annotated to and to all
    /// their ancestors. Identifiers that are not part of the mapping are
    /// recorded in [`ExpressionOverlay::unmapped`]. Assigning an identifier
    /// again is a no-op.
    ///
    /// The identifiers of different categories must be disjoint. This is
    /// not checked here, use [`ExpressionSets`] to ensure it.
    ///
    /// Returns the number of identifiers that were found in the mapping
    pub fn assign<I, S>(&mut self, identifiers: I, expression: Expression) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index = self.tree.gene_index();
        let mut mapped = 0;
        for identifier in identifiers {
            let identifier = identifier.as_ref();
            let Some(gene) = index.get(identifier) else {
                trace!("Unmapped identifier {}", identifier);
                self.unmapped.insert(normalize_identifier(identifier));
                continue;
            };
            mapped += 1;
            for bin in index.bins(gene) {
                let mut current = Some(*bin);
                while let Some(id) = current {
                    if !self.maps[id.to_usize()].insert(gene, expression) {
                        // all ancestors hold the identifier already
                        break;
                    }
                    current = self.tree.get_unchecked(id).parent();
                }
            }
        }
        debug!("Assigned {} identifiers as {}", mapped, expression);
        mapped
    }

    /// Returns the [`ExpressionMap`] of the bin
    ///
    /// # Panics
    ///
    /// Panics if the [`BinId`] does not belong to the overlay's tree
    pub fn get(&self, id: BinId) -> &ExpressionMap {
        &self.maps[id.to_usize()]
    }

    /// Returns the [`ExpressionMap`] of the root bin
    pub fn root(&self) -> &ExpressionMap {
        self.get(BinId::root())
    }

    /// Returns the lower-cased identifiers that matched no bin
    pub fn unmapped(&self) -> &BTreeSet<String> {
        &self.unmapped
    }

    /// Removes all assigned and unmapped identifiers
    ///
    /// Use this to re-use the overlay for another, independent analysis.
    pub fn clear(&mut self) {
        for map in &mut self.maps {
            map.clear();
        }
        self.unmapped.clear();
    }
}
