use crate::annotations::{GeneIterator, Genes};
use crate::bins::internal::BinInternal;
use crate::bins::{BinCode, BinId};
use crate::Tree;

/// The `Bin` represents a single node of the functional hierarchy
///
/// It borrows all data from the [`Tree`] and is cheap to copy.
///
/// # Examples
///
/// ```
/// use binenrich::Tree;
///
/// let tree = Tree::from_file("tests/mapping.tsv").unwrap();
/// let bin = tree.bin_by_code("1.1.1").unwrap();
///
/// assert_eq!(bin.name(), "Photosynthesis.light reaction.photosystem II");
/// assert_eq!(bin.parent().unwrap().code(), &"1.1");
/// assert_eq!(bin.genes().count(), 2);
/// assert_eq!(bin.ancestors().count(), 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Bin<'a> {
    internal: &'a BinInternal,
    tree: &'a Tree,
}

impl<'a> Bin<'a> {
    pub(crate) fn new(tree: &'a Tree, internal: &'a BinInternal) -> Bin<'a> {
        Bin { internal, tree }
    }

    /// Returns the arena [`BinId`]
    pub fn id(&self) -> BinId {
        self.internal.id()
    }

    /// Returns the hierarchical [`BinCode`], e.g. `1.1.2`
    pub fn code(&self) -> &'a BinCode {
        self.internal.code()
    }

    /// Returns the name of the bin
    pub fn name(&self) -> &'a str {
        self.internal.name()
    }

    /// Returns the description of the bin
    pub fn description(&self) -> &'a str {
        self.internal.description()
    }

    /// Returns the identifier of the row that created the bin, if any
    pub fn annotation(&self) -> Option<&'a str> {
        self.internal.annotation()
    }

    /// Returns `true` for the root bin
    pub fn is_root(&self) -> bool {
        self.internal.parent().is_none()
    }

    /// Returns `true` if the bin was synthesized from a descendant's code
    /// and never appeared as its own mapping row
    pub fn is_placeholder(&self) -> bool {
        self.internal.is_placeholder()
    }

    /// Returns the parent bin, `None` for the root
    pub fn parent(&self) -> Option<Bin<'a>> {
        self.internal
            .parent()
            .map(|id| Bin::new(self.tree, self.tree.get_unchecked(id)))
    }

    /// Returns an iterator of the direct children
    pub fn children(&self) -> Children<'a> {
        Children {
            inner: self.internal.children().iter(),
            tree: self.tree,
        }
    }

    /// Returns an iterator of all ancestors, nearest first, ending with the root
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors {
            next: self.internal.parent(),
            tree: self.tree,
        }
    }

    /// Returns the identifiers that are directly annotated to the bin
    pub fn gene_ids(&self) -> &'a Genes {
        self.internal.genes()
    }

    /// Returns an iterator of the directly annotated identifiers
    pub fn genes(&self) -> GeneIterator<'a> {
        GeneIterator::new(self.internal.genes(), self.tree.gene_index())
    }
}

impl PartialEq for Bin<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.internal == other.internal
    }
}

/// Iterates the direct children of a [`Bin`]
pub struct Children<'a> {
    inner: std::slice::Iter<'a, BinId>,
    tree: &'a Tree,
}

impl<'a> Iterator for Children<'a> {
    type Item = Bin<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|id| Bin::new(self.tree, self.tree.get_unchecked(*id)))
    }
}

/// Walks the parent chain of a [`Bin`] up to the root
pub struct Ancestors<'a> {
    next: Option<BinId>,
    tree: &'a Tree,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Bin<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        let bin = self.tree.get_unchecked(self.next?);
        self.next = bin.parent();
        Some(Bin::new(self.tree, bin))
    }
}
