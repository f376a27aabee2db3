use tracing::trace;

use crate::bins::Bin;
use crate::enrichment::{Contrast, Counts, EnrichmentResult, TestFamily};
use crate::expression::{Membership, Memberships};
use crate::stats::{fisher_exact, ContingencyTable};
use crate::ExpressionOverlay;

/// Builds the contingency tables and runs the tests of all bins of an overlay
///
/// The derived identifier sets of the root bin are built once, on
/// construction, and shared by the tests of all bins and families.
///
/// # Examples
///
/// ```
/// use binenrich::{Expression, ExpressionOverlay, Tree, TestFamily};
/// use binenrich::enrichment::{BinTester, Contrast};
///
/// let tree = Tree::from_file("tests/mapping.tsv").unwrap();
/// let mut overlay = ExpressionOverlay::new(&tree);
/// overlay.assign(["AT1G01010", "AT1G01020"], Expression::Up);
/// overlay.assign(["AT1G01030", "AT3G01010"], Expression::Undetermined);
///
/// let tester = BinTester::new(&overlay);
/// for bin in &tree {
///     let result = tester.test(&bin, &[TestFamily::DIFF]);
///     assert_eq!(result.get(Contrast::Diff).is_some(), !bin.is_root());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BinTester<'a> {
    overlay: &'a ExpressionOverlay<'a>,
    root: Memberships<'a>,
}

impl<'a> BinTester<'a> {
    /// Constructs a new `BinTester` for the overlay
    pub fn new(overlay: &'a ExpressionOverlay<'a>) -> Self {
        Self {
            overlay,
            root: overlay.root().memberships(),
        }
    }

    /// Builds the contingency table of the bin for the [`Contrast`]
    ///
    /// See [`contingency_table`]
    pub fn table(&self, bin: &Bin, contrast: Contrast) -> ContingencyTable {
        let own = self.overlay.get(bin.id()).memberships();
        self.table_of(bin, &own, contrast)
    }

    fn table_of(&self, bin: &Bin, own: &Memberships, contrast: Contrast) -> ContingencyTable {
        match contrast {
            Contrast::Diff => versus_rest(own, &self.root, Membership::Diff),
            Contrast::Up => versus_rest(own, &self.root, Membership::Up),
            Contrast::Down => versus_rest(own, &self.root, Membership::Down),
            Contrast::Bias => ContingencyTable::new(
                own.count(Membership::Up),
                own.count(Membership::Down),
                self.root.count_outside(own, Membership::Up),
                self.root.count_outside(own, Membership::Down),
            ),
            Contrast::Peers => match bin.parent() {
                Some(parent) if !parent.is_root() => {
                    let parent = self.overlay.get(parent.id()).memberships();
                    versus_rest(own, &parent, Membership::Diff)
                }
                _ => versus_rest(own, &self.root, Membership::Diff),
            },
        }
    }

    /// Tests the bin for every family
    ///
    /// The root bin is not tested, its result only holds the counts.
    pub fn test(&self, bin: &Bin, families: &[TestFamily]) -> EnrichmentResult {
        let own = self.overlay.get(bin.id()).memberships();
        let mut result = EnrichmentResult::new(bin.id(), counts(&own));
        if bin.is_root() {
            return result;
        }
        for family in families {
            let table = self.table_of(bin, &own, family.contrast());
            let fisher = fisher_exact(&table, family.alternative());
            trace!(
                "Bin {} {}: {} p={}",
                bin.code(),
                family,
                table,
                fisher.pvalue()
            );
            result.push(*family, fisher);
        }
        result
    }
}

/// Builds the contingency table of the bin for the [`Contrast`]
///
/// The reference of all contrasts except [`Contrast::Peers`] is the root
/// bin without the identifiers of the bin itself. [`Contrast::Peers`] uses
/// the parent bin instead.
///
/// | Contrast | first row (bin)           | second row (reference)                  |
/// |----------|---------------------------|-----------------------------------------|
/// | Diff     | diff, detected - diff     | other diff, other detected - other diff |
/// | Bias     | up, down                  | other up, other down                    |
/// | Up       | up, detected - up         | other up, other detected - other up     |
/// | Down     | down, detected - down     | other down, other detected - other down |
///
/// This derives the sets of the root bin on every call, use a
/// [`BinTester`] to build the tables of many bins.
///
/// # Examples
///
/// ```
/// use binenrich::{Expression, ExpressionOverlay, Tree};
/// use binenrich::enrichment::{contingency_table, Contrast};
///
/// let tree = Tree::from_file("tests/mapping.tsv").unwrap();
/// let mut overlay = ExpressionOverlay::new(&tree);
/// overlay.assign(["AT1G01010", "AT1G01020"], Expression::Up);
/// overlay.assign(["AT2G01010"], Expression::Down);
/// overlay.assign(["AT1G01030", "AT2G01020", "AT3G01010"], Expression::Undetermined);
///
/// let bin = tree.bin_by_code("1.1").unwrap();
/// let table = contingency_table(&overlay, &bin, Contrast::Diff);
/// assert_eq!(table.cells(), [2, 0, 1, 3]);
///
/// let table = contingency_table(&overlay, &bin, Contrast::Bias);
/// assert_eq!(table.cells(), [2, 0, 0, 1]);
/// ```
pub fn contingency_table(
    overlay: &ExpressionOverlay,
    bin: &Bin,
    contrast: Contrast,
) -> ContingencyTable {
    BinTester::new(overlay).table(bin, contrast)
}

/// `[[x, detected - x], [other x, other detected - other x]]`
fn versus_rest(
    own: &Memberships,
    reference: &Memberships,
    membership: Membership,
) -> ContingencyTable {
    let selected = own.count(membership);
    let detected = own.count(Membership::Detected);
    let other_selected = reference.count_outside(own, membership);
    let other_detected = reference.count_outside(own, Membership::Detected);
    ContingencyTable::new(
        selected,
        detected.saturating_sub(selected),
        other_selected,
        other_detected.saturating_sub(other_selected),
    )
}

/// Returns the raw counts of the bin
fn counts(sets: &Memberships) -> Counts {
    Counts {
        up: sets.count(Membership::Up),
        down: sets.count(Membership::Down),
        diff: sets.count(Membership::Diff),
        detected: sets.count(Membership::Detected),
    }
}

/// Tests the bin for every family
///
/// The root bin is not tested, its result only holds the counts.
/// Use a [`BinTester`] to test many bins of the same overlay.
pub fn test_bin(overlay: &ExpressionOverlay, bin: &Bin, families: &[TestFamily]) -> EnrichmentResult {
    BinTester::new(overlay).test(bin, families)
}
