use tracing::{debug, info, trace};

use crate::annotations::GeneIndex;
use crate::bins::internal::BinInternal;
use crate::bins::{BinChildren, BinCode, BinId};
use crate::parser::MappingRecord;
use crate::tree::arena::Arena;
use crate::{EnrichError, EnrichResult, Tree};

/// Builds a [`Tree`] from mapping records
///
/// Records must be added in hierarchical order: the parent of a bin must
/// be registered before the first record of the bin itself. Violations
/// are rejected with [`EnrichError::MissingParent`], unless
/// [`TreeBuilder::implicit_ancestors`] is enabled. In that case, missing
/// ancestors are created from the code as placeholder bins and receive
/// their name and description once their own record shows up.
///
/// # Examples
///
/// ```
/// use binenrich::TreeBuilder;
/// use binenrich::parser::MappingRecord;
///
/// let mut builder = TreeBuilder::new();
/// builder.add_record(&MappingRecord::new("1", "Photosynthesis", "", "")).unwrap();
/// builder.add_record(&MappingRecord::new("1.1", "Light reaction", "AT1G01010", "")).unwrap();
///
/// // "2" was never registered
/// assert!(builder.add_record(&MappingRecord::new("2.1", "Pectin", "AT2G01010", "")).is_err());
///
/// let tree = builder.build();
/// assert_eq!(tree.len(), 3);
/// ```
pub struct TreeBuilder {
    arena: Arena,
    genes: GeneIndex,
    implicit_ancestors: bool,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        let mut arena = Arena::default();
        arena.insert(BinInternal::root());
        Self {
            arena,
            genes: GeneIndex::default(),
            implicit_ancestors: false,
        }
    }
}

impl TreeBuilder {
    /// Creates a builder that contains only the root bin
    pub fn new() -> Self {
        Self::default()
    }

    /// Create missing ancestors from the bin code instead of failing
    #[must_use]
    pub fn implicit_ancestors(mut self, enabled: bool) -> Self {
        self.implicit_ancestors = enabled;
        self
    }

    /// Adds a single mapping record
    ///
    /// The bin is created on its first record, subsequent records with the
    /// same code only add their identifier. Returns the [`BinId`] of the bin.
    ///
    /// # Errors
    ///
    /// - [`EnrichError::InvalidCode`] if the code is empty or malformed
    /// - [`EnrichError::MissingParent`] if the parent bin is not yet registered
    pub fn add_record(&mut self, record: &MappingRecord) -> EnrichResult<BinId> {
        let code = BinCode::try_from(record.code())?;

        let id = match self.arena.id_of(code.as_str()) {
            Some(id) => {
                let bin = self.arena.get_unchecked_mut(id);
                if bin.is_placeholder() {
                    trace!("Backfilling placeholder bin {}", code);
                    bin.backfill(record.name(), record.identifier(), record.description());
                }
                id
            }
            None => {
                let parent_code = code
                    .parent()
                    .ok_or_else(|| EnrichError::InvalidCode(code.to_string()))?;
                let parent = match self.arena.id_of(parent_code.as_str()) {
                    Some(parent) => parent,
                    None if self.implicit_ancestors => self.add_placeholders(&parent_code),
                    None => {
                        return Err(EnrichError::MissingParent {
                            code: code.to_string(),
                            parent: parent_code.to_string(),
                        })
                    }
                };
                let bin = BinInternal::new(
                    self.arena.next_id(),
                    code,
                    record.name(),
                    record.identifier(),
                    record.description(),
                    Some(parent),
                );
                self.insert_bin(bin, parent)
            }
        };

        if !record.identifier().is_empty() {
            let gene = self.genes.insert(record.identifier(), id);
            self.arena.get_unchecked_mut(id).add_gene(gene);
        }
        Ok(id)
    }

    /// Adds all records in order
    ///
    /// # Errors
    ///
    /// Stops at the first record that cannot be added, see [`TreeBuilder::add_record`]
    pub fn add_records<'a, I: IntoIterator<Item = &'a MappingRecord>>(
        &mut self,
        records: I,
    ) -> EnrichResult<()> {
        for record in records {
            self.add_record(record)?;
        }
        Ok(())
    }

    /// Finalizes the [`Tree`]
    ///
    /// Children of every bin are ordered by their [`BinCode`] so that
    /// traversals are independent of the record order.
    pub fn build(mut self) -> Tree {
        let sorted: Vec<BinChildren> = self
            .arena
            .values()
            .map(|bin| {
                let mut children = bin.children().clone();
                children.sort_by(|a, b| {
                    self.arena
                        .get_unchecked(*a)
                        .code()
                        .cmp(self.arena.get_unchecked(*b).code())
                });
                children
            })
            .collect();
        for (bin, children) in self.arena.values_mut().zip(sorted) {
            *bin.children_mut() = children;
        }
        info!(
            "Built tree with {} bins and {} identifiers",
            self.arena.len(),
            self.genes.len()
        );
        Tree::new(self.arena, self.genes)
    }

    /// Creates the bin for `code` and all its missing ancestors
    ///
    /// Returns the [`BinId`] of the bin with the given `code`
    fn add_placeholders(&mut self, code: &BinCode) -> BinId {
        let mut missing = vec![code.clone()];
        let mut parent = loop {
            let current = missing.last().and_then(BinCode::parent);
            match current {
                Some(current) => match self.arena.id_of(current.as_str()) {
                    Some(id) => break id,
                    None => missing.push(current),
                },
                None => break BinId::root(),
            }
        };
        for code in missing.into_iter().rev() {
            debug!("Creating placeholder bin {}", code);
            let bin = BinInternal::placeholder(self.arena.next_id(), code, Some(parent));
            parent = self.insert_bin(bin, parent);
        }
        parent
    }

    fn insert_bin(&mut self, bin: BinInternal, parent: BinId) -> BinId {
        let id = self.arena.insert(bin);
        self.arena.get_unchecked_mut(parent).add_child(id);
        id
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(code: &str, identifier: &str) -> MappingRecord {
        MappingRecord::new(code, &format!("bin {code}"), identifier, "")
    }

    #[test]
    fn strict_mode_rejects_missing_parent() {
        let mut builder = TreeBuilder::new();
        builder.add_record(&record("1", "")).unwrap();
        match builder.add_record(&record("1.2.3", "geneA")) {
            Err(EnrichError::MissingParent { code, parent }) => {
                assert_eq!(code, "1.2.3");
                assert_eq!(parent, "1.2");
            }
            other => panic!("expected MissingParent, got {other:?}"),
        }
    }

    #[test]
    fn implicit_ancestors_are_created() {
        let mut builder = TreeBuilder::new().implicit_ancestors(true);
        builder.add_record(&record("1.2.3", "geneA")).unwrap();
        let tree = builder.build();
        assert_eq!(tree.len(), 4);

        let bin = tree.bin_by_code("1.2").unwrap();
        assert!(bin.is_placeholder());
        assert_eq!(bin.name(), "1.2");
        assert_eq!(bin.parent().unwrap().code(), &"1");
        assert_eq!(tree.bin_by_code("1.2.3").unwrap().parent().unwrap(), bin);
    }

    #[test]
    fn placeholders_are_backfilled() {
        let mut builder = TreeBuilder::new().implicit_ancestors(true);
        builder.add_record(&record("1.2", "geneA")).unwrap();
        builder
            .add_record(&MappingRecord::new("1", "Photosynthesis", "", "light"))
            .unwrap();
        let tree = builder.build();
        let bin = tree.bin_by_code("1").unwrap();
        assert!(!bin.is_placeholder());
        assert_eq!(bin.name(), "Photosynthesis");
        assert_eq!(bin.description(), "light");
    }

    #[test]
    fn recurring_codes_add_genes() {
        let mut builder = TreeBuilder::new();
        let a = builder.add_record(&record("1", "geneA")).unwrap();
        let b = builder.add_record(&record("1", "geneB")).unwrap();
        assert_eq!(a, b);
        let tree = builder.build();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.bin(a).unwrap().genes().count(), 2);
        assert_eq!(tree.bin(a).unwrap().annotation(), Some("geneA"));
    }

    #[test]
    fn root_code_attaches_to_root() {
        let mut builder = TreeBuilder::new();
        let id = builder.add_record(&record("0", "geneA")).unwrap();
        assert_eq!(id, BinId::root());
        let tree = builder.build();
        assert_eq!(tree.root().genes().count(), 1);
    }

    #[test]
    fn children_are_sorted_by_code() {
        let mut builder = TreeBuilder::new();
        for code in ["10", "2", "1", "2.10", "2.9"] {
            builder.add_record(&record(code, "")).unwrap();
        }
        let tree = builder.build();
        let top: Vec<&str> = tree.root().children().map(|b| b.code().as_str()).collect();
        assert_eq!(top, vec!["1", "2", "10"]);
        let second: Vec<&str> = tree
            .bin_by_code("2")
            .unwrap()
            .children()
            .map(|b| b.code().as_str())
            .collect();
        assert_eq!(second, vec!["2.9", "2.10"]);
    }

    #[test]
    fn parents_precede_children_in_arena() {
        let mut builder = TreeBuilder::new().implicit_ancestors(true);
        builder.add_record(&record("3.1.1", "geneA")).unwrap();
        builder.add_record(&record("1", "geneB")).unwrap();
        let tree = builder.build();
        for bin in tree.bins() {
            if let Some(parent) = bin.parent() {
                assert!(parent.id() < bin.id());
            }
        }
    }
}
