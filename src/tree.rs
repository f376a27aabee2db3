use core::fmt::Debug;
use std::path::Path;

use crate::annotations::GeneIndex;
use crate::bins::internal::BinInternal;
use crate::bins::{Bin, BinId};
use crate::parser;
use crate::parser::MappingRecord;
use crate::EnrichResult;

mod arena;
mod builder;
use arena::Arena;
pub use builder::TreeBuilder;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `Tree` is the functional hierarchy of bins and the identifiers annotated to them
///
/// The [`Tree`] holds all [`Bin`]s and the [`GeneIndex`] that links every
/// identifier to the bins it belongs to. Once built, the tree is immutable.
/// Expression data of an analysis is kept separately in an
/// [`crate::ExpressionOverlay`], so that a single tree can serve any number
/// of independent analyses, even concurrently.
///
/// # Examples
///
/// ```
/// use binenrich::Tree;
///
/// let tree = Tree::from_file("tests/mapping.tsv").unwrap();
///
/// assert_eq!(tree.len(), 9);
/// assert_eq!(tree.root().name(), "root");
///
/// let bin = tree.bin_by_code("2.1").unwrap();
/// assert_eq!(bin.name(), "Cell wall.cellulose synthesis");
///
/// // identifiers can be annotated to several bins
/// let codes: Vec<&str> = tree
///     .bins_of_gene("AT1G01010")
///     .map(|bin| bin.code().as_str())
///     .collect();
/// assert_eq!(codes, vec!["1.1.1", "2.2"]);
/// ```
///
/// # Layout
///
/// The analysis pipeline around the tree:
///
/// ```mermaid
/// graph LR
///     MAP["mapping.tsv"] --> TREE["Tree"]
///     SETS["ExpressionSets<br>up / down / undetermined"] --> OVERLAY
///     TREE --> OVERLAY["ExpressionOverlay"]
///     OVERLAY --> TEST["Fisher exact test<br>per bin and family"]
///     TEST --> FDR["Benjamini-Hochberg<br>per family"]
///     FDR --> RANK["ranked Report"]
/// ```
pub struct Tree {
    bins: Arena,
    genes: GeneIndex,
}

impl Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tree with {} bins and {} identifiers",
            self.bins.len(),
            self.genes.len()
        )
    }
}

impl Default for Tree {
    fn default() -> Self {
        TreeBuilder::new().build()
    }
}

/// Public API of the Tree
impl Tree {
    pub(crate) fn new(bins: Arena, genes: GeneIndex) -> Self {
        Self { bins, genes }
    }

    /// Returns a [`TreeBuilder`] that contains only the root bin
    pub fn builder() -> TreeBuilder {
        TreeBuilder::new()
    }

    /// Builds the tree from a tab-separated mapping file
    ///
    /// See [`parser::mapping`] for the expected format.
    ///
    /// # Errors
    ///
    /// - [`crate::EnrichError::CannotOpenFile`] if the file cannot be read
    /// - [`crate::EnrichError::InvalidInput`] if a row has too few columns
    /// - [`crate::EnrichError::MissingParent`] if a bin appears before its parent
    pub fn from_file<P: AsRef<Path>>(path: P) -> EnrichResult<Self> {
        let records = parser::mapping::read_file(path)?;
        Self::from_records(&records)
    }

    /// Builds the tree from mapping records, in strict ancestor order
    ///
    /// # Errors
    ///
    /// - [`crate::EnrichError::InvalidCode`] for malformed codes
    /// - [`crate::EnrichError::MissingParent`] if a bin appears before its parent
    ///
    /// # Examples
    ///
    /// ```
    /// use binenrich::Tree;
    /// use binenrich::parser::MappingRecord;
    ///
    /// let records = vec![
    ///     MappingRecord::new("1", "A", "", ""),
    ///     MappingRecord::new("1.1", "A.a", "geneA", ""),
    ///     MappingRecord::new("1.2", "A.b", "geneB", ""),
    /// ];
    /// let tree = Tree::from_records(&records).unwrap();
    /// assert_eq!(tree.len(), 4);
    /// assert_eq!(tree.gene_index().len(), 2);
    /// ```
    pub fn from_records<'a, I: IntoIterator<Item = &'a MappingRecord>>(
        records: I,
    ) -> EnrichResult<Self> {
        let mut builder = TreeBuilder::new();
        builder.add_records(records)?;
        Ok(builder.build())
    }

    /// Returns the number of bins, including the root
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Returns `true` if the tree contains only the root bin
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Returns the root bin
    pub fn root(&self) -> Bin<'_> {
        Bin::new(self, self.get_unchecked(BinId::root()))
    }

    /// Returns the [`Bin`] of the given [`BinId`]
    pub fn bin(&self, id: BinId) -> Option<Bin<'_>> {
        self.bins.get(id).map(|bin| Bin::new(self, bin))
    }

    /// Returns the [`Bin`] with the given code, e.g. `1.1.2`
    pub fn bin_by_code(&self, code: &str) -> Option<Bin<'_>> {
        self.bins.id_of(code.trim()).and_then(|id| self.bin(id))
    }

    /// Returns an Iterator of all [`Bin`]s, parents before children
    pub fn bins(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Returns the index of all annotated identifiers
    pub fn gene_index(&self) -> &GeneIndex {
        &self.genes
    }

    /// Returns the bins the identifier is directly annotated to
    ///
    /// The lookup ignores case. Unknown identifiers yield an empty iterator.
    pub fn bins_of_gene(&self, identifier: &str) -> impl Iterator<Item = Bin<'_>> {
        let ids: &[BinId] = match self.genes.get(identifier) {
            Some(gene) => self.genes.bins(gene),
            None => &[],
        };
        ids.iter().map(|id| Bin::new(self, self.get_unchecked(*id)))
    }

    /// Returns the [`BinId`]s of all bins in depth-first pre-order
    ///
    /// The traversal starts at the root and visits children in code order.
    /// Every bin is visited exactly once.
    pub fn preorder(&self) -> Vec<BinId> {
        let mut res = Vec::with_capacity(self.len());
        let mut stack = vec![BinId::root()];
        while let Some(id) = stack.pop() {
            res.push(id);
            // reversed, so that the first child is popped next
            stack.extend(self.get_unchecked(id).children().iter().rev());
        }
        res
    }
}

/// Crate-only functions for dealing with the internal representation
impl Tree {
    /// Returns the `BinInternal` with the given `BinId`
    ///
    /// # Panics
    ///
    /// This method will panic if the `BinId` does not belong to this tree
    pub(crate) fn get_unchecked(&self, id: BinId) -> &BinInternal {
        self.bins.get_unchecked(id)
    }
}

/// Iterates all [`Bin`]s of the [`Tree`] in arena order
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, BinInternal>,
    tree: &'a Tree,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Bin<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|bin| Bin::new(self.tree, bin))
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = Bin<'a>;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.bins.values(),
            tree: self,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn small_tree() -> Tree {
        let records = vec![
            MappingRecord::new("1", "A", "", ""),
            MappingRecord::new("1.1", "A.a", "geneA", ""),
            MappingRecord::new("1.2", "A.b", "geneB", ""),
            MappingRecord::new("2", "B", "geneA", ""),
        ];
        Tree::from_records(&records).unwrap()
    }

    #[test]
    fn preorder_visits_every_bin_once() {
        let tree = small_tree();
        let order: Vec<String> = tree
            .preorder()
            .into_iter()
            .map(|id| tree.bin(id).unwrap().code().to_string())
            .collect();
        assert_eq!(order, vec!["0", "1", "1.1", "1.2", "2"]);
    }

    #[test]
    fn gene_lookup() {
        let tree = small_tree();
        assert_eq!(tree.bins_of_gene("GENEA").count(), 2);
        assert_eq!(tree.bins_of_gene("geneB").count(), 1);
        assert_eq!(tree.bins_of_gene("geneZ").count(), 0);
    }

    #[test]
    fn ancestors() {
        let tree = small_tree();
        let bin = tree.bin_by_code("1.2").unwrap();
        let codes: Vec<&str> = bin.ancestors().map(|b| b.code().as_str()).collect();
        assert_eq!(codes, vec!["1", "0"]);
        assert_eq!(tree.root().ancestors().count(), 0);
    }

    #[test]
    fn default_tree_has_root_only() {
        let tree = Tree::default();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
        assert!(tree.root().is_root());
    }

    #[test]
    fn failed_load_produces_no_tree() {
        let records = vec![
            MappingRecord::new("1", "A", "", ""),
            MappingRecord::new("2.1", "B.a", "geneA", ""),
        ];
        assert!(Tree::from_records(&records).is_err());
    }
}
