//! Expression outcomes of identifiers and their propagation through the tree
//!
//! - [`ExpressionSets`] holds the disjoint identifier sets of a single analysis
//! - [`ExpressionOverlay`] attaches these sets to the bins of a [`crate::Tree`]
//! - [`ExpressionMap`] holds the identifiers of one bin, per [`Expression`]
use std::borrow::Cow;
use std::fmt::Display;

use crate::annotations::{GeneId, Genes};

mod overlay;
mod sets;

pub use overlay::ExpressionOverlay;
pub use sets::ExpressionSets;

/// The outcome category of an identifier in the differential expression analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Expression {
    /// Significantly up-regulated
    Up,
    /// Significantly down-regulated
    Down,
    /// Significantly changed, without information about the direction
    Diff,
    /// Detected, but not significantly changed
    Undetermined,
}

impl Expression {
    /// All categories, in assignment order
    pub const ALL: [Expression; 4] = [
        Expression::Up,
        Expression::Down,
        Expression::Diff,
        Expression::Undetermined,
    ];
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Expression::Up => "up",
            Expression::Down => "down",
            Expression::Diff => "diff",
            Expression::Undetermined => "undetermined",
        };
        write!(f, "{name}")
    }
}

/// The identifier sets that are compared in contingency tables
///
/// `Diff` and `Detected` are derived from the assigned categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Up-regulated identifiers
    Up,
    /// Down-regulated identifiers
    Down,
    /// All changed identifiers: up ∪ down ∪ unsigned diff
    Diff,
    /// All identifiers: diff ∪ undetermined
    Detected,
}

/// The identifiers of a single bin, grouped by [`Expression`]
///
/// Contains the identifiers assigned to the bin itself and to all of its descendants.
#[derive(Debug, Default, Clone)]
pub struct ExpressionMap {
    up: Genes,
    down: Genes,
    diff: Genes,
    undetermined: Genes,
}

impl ExpressionMap {
    /// Returns the identifiers of one assigned category
    pub fn get(&self, expression: Expression) -> &Genes {
        match expression {
            Expression::Up => &self.up,
            Expression::Down => &self.down,
            Expression::Diff => &self.diff,
            Expression::Undetermined => &self.undetermined,
        }
    }

    fn get_mut(&mut self, expression: Expression) -> &mut Genes {
        match expression {
            Expression::Up => &mut self.up,
            Expression::Down => &mut self.down,
            Expression::Diff => &mut self.diff,
            Expression::Undetermined => &mut self.undetermined,
        }
    }

    /// Adds the identifier to the category
    ///
    /// Returns whether the identifier was newly inserted
    pub(crate) fn insert(&mut self, gene: GeneId, expression: Expression) -> bool {
        self.get_mut(expression).insert(gene)
    }

    /// Returns the up-regulated identifiers
    pub fn up(&self) -> &Genes {
        &self.up
    }

    /// Returns the down-regulated identifiers
    pub fn down(&self) -> &Genes {
        &self.down
    }

    /// Returns the identifiers that are changed without direction
    pub fn unsigned(&self) -> &Genes {
        &self.diff
    }

    /// Returns the unchanged identifiers
    pub fn undetermined(&self) -> &Genes {
        &self.undetermined
    }

    /// Returns all changed identifiers (up ∪ down ∪ unsigned)
    pub fn diff(&self) -> Genes {
        self.up
            .iter()
            .chain(self.down.iter())
            .chain(self.diff.iter())
            .copied()
            .collect()
    }

    /// Returns all detected identifiers (diff ∪ undetermined)
    pub fn detected(&self) -> Genes {
        let mut res = self.diff();
        res.extend(self.undetermined.iter().copied());
        res
    }

    /// Returns the identifiers of the [`Membership`] set
    pub fn membership(&self, membership: Membership) -> Cow<'_, Genes> {
        match membership {
            Membership::Up => Cow::Borrowed(&self.up),
            Membership::Down => Cow::Borrowed(&self.down),
            Membership::Diff => Cow::Owned(self.diff()),
            Membership::Detected => Cow::Owned(self.detected()),
        }
    }

    /// Returns the size of the [`Membership`] set
    pub fn count(&self, membership: Membership) -> u64 {
        len_u64(&self.membership(membership))
    }

    /// Returns the number of identifiers in `self` that are not in `other`
    ///
    /// This is a true set difference `|self.X − other.X|`.
    ///
    /// Both maps derive their `Diff` and `Detected` sets on every call. Use
    /// [`Memberships`] when comparing many bins to the same reference.
    pub fn count_outside(&self, other: &ExpressionMap, membership: Membership) -> u64 {
        Memberships::new(self).count_outside(&Memberships::new(other), membership)
    }

    /// Derives all [`Membership`] sets at once
    pub fn memberships(&self) -> Memberships<'_> {
        Memberships::new(self)
    }

    /// Returns `true` if no identifier is assigned
    pub fn is_empty(&self) -> bool {
        Expression::ALL.iter().all(|e| self.get(*e).is_empty())
    }

    /// Removes all identifiers
    pub fn clear(&mut self) {
        for expression in Expression::ALL {
            self.get_mut(expression).clear();
        }
    }
}

/// All [`Membership`] sets of an [`ExpressionMap`]
///
/// The derived `Diff` and `Detected` sets are built once on construction.
///
/// # Examples
///
/// ```
/// use binenrich::{Expression, ExpressionOverlay, Tree};
/// use binenrich::expression::Membership;
///
/// let tree = Tree::from_file("tests/mapping.tsv").unwrap();
/// let mut overlay = ExpressionOverlay::new(&tree);
/// overlay.assign(["AT1G01010"], Expression::Up);
/// overlay.assign(["AT2G01010"], Expression::Down);
/// overlay.assign(["AT3G01010"], Expression::Undetermined);
///
/// let root = overlay.root().memberships();
/// let bin = overlay.get(tree.bin_by_code("1").unwrap().id()).memberships();
/// assert_eq!(root.count(Membership::Detected), 3);
/// assert_eq!(root.count_outside(&bin, Membership::Diff), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Memberships<'a> {
    up: &'a Genes,
    down: &'a Genes,
    diff: Genes,
    detected: Genes,
}

impl<'a> Memberships<'a> {
    /// Derives the sets of the map
    pub fn new(map: &'a ExpressionMap) -> Self {
        let diff = map.diff();
        let mut detected = diff.clone();
        detected.extend(map.undetermined.iter().copied());
        Self {
            up: &map.up,
            down: &map.down,
            diff,
            detected,
        }
    }

    /// Returns the identifiers of the [`Membership`] set
    pub fn get(&self, membership: Membership) -> &Genes {
        match membership {
            Membership::Up => self.up,
            Membership::Down => self.down,
            Membership::Diff => &self.diff,
            Membership::Detected => &self.detected,
        }
    }

    /// Returns the size of the [`Membership`] set
    pub fn count(&self, membership: Membership) -> u64 {
        len_u64(self.get(membership))
    }

    /// Returns the number of identifiers in `self` that are not in `other`
    pub fn count_outside(&self, other: &Memberships, membership: Membership) -> u64 {
        let other = other.get(membership);
        let outside = self
            .get(membership)
            .iter()
            .filter(|gene| !other.contains(gene))
            .count();
        u64::try_from(outside).expect("set sizes fit into u64")
    }
}

fn len_u64(genes: &Genes) -> u64 {
    u64::try_from(genes.len()).expect("set sizes fit into u64")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn derived_sets() {
        let mut map = ExpressionMap::default();
        map.insert(1u32.into(), Expression::Up);
        map.insert(2u32.into(), Expression::Down);
        map.insert(3u32.into(), Expression::Undetermined);
        map.insert(4u32.into(), Expression::Diff);

        assert_eq!(map.count(Membership::Up), 1);
        assert_eq!(map.count(Membership::Down), 1);
        assert_eq!(map.count(Membership::Diff), 3);
        assert_eq!(map.count(Membership::Detected), 4);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut map = ExpressionMap::default();
        assert!(map.insert(1u32.into(), Expression::Up));
        assert!(!map.insert(1u32.into(), Expression::Up));
        assert_eq!(map.count(Membership::Detected), 1);
    }

    #[test]
    fn set_difference() {
        let mut root = ExpressionMap::default();
        let mut bin = ExpressionMap::default();
        for id in 0u32..5 {
            root.insert(id.into(), Expression::Up);
        }
        bin.insert(1u32.into(), Expression::Up);
        bin.insert(2u32.into(), Expression::Up);
        // not part of root, must not reduce the difference
        bin.insert(9u32.into(), Expression::Up);

        assert_eq!(root.count_outside(&bin, Membership::Up), 3);
        assert_eq!(root.count_outside(&bin, Membership::Detected), 3);
        assert_eq!(root.count_outside(&bin, Membership::Down), 0);
    }

    #[test]
    fn memberships_match_the_map() {
        let mut root = ExpressionMap::default();
        let mut bin = ExpressionMap::default();
        for id in 0u32..4 {
            root.insert(id.into(), Expression::Up);
            root.insert((id + 10).into(), Expression::Undetermined);
        }
        root.insert(20u32.into(), Expression::Diff);
        bin.insert(1u32.into(), Expression::Up);
        bin.insert(10u32.into(), Expression::Undetermined);
        bin.insert(20u32.into(), Expression::Diff);

        let root_sets = root.memberships();
        let bin_sets = bin.memberships();
        for membership in [
            Membership::Up,
            Membership::Down,
            Membership::Diff,
            Membership::Detected,
        ] {
            assert_eq!(root_sets.count(membership), root.count(membership));
            assert_eq!(
                root_sets.count_outside(&bin_sets, membership),
                root.count_outside(&bin, membership)
            );
        }
        assert_eq!(root_sets.count_outside(&bin_sets, Membership::Diff), 3);
        assert_eq!(root_sets.count_outside(&bin_sets, Membership::Detected), 6);
    }

    #[test]
    fn clear() {
        let mut map = ExpressionMap::default();
        map.insert(1u32.into(), Expression::Up);
        map.insert(2u32.into(), Expression::Undetermined);
        assert!(!map.is_empty());
        map.clear();
        assert!(map.is_empty());
    }
}
