//! Enrichment tests of all bins of a [`crate::Tree`]
//!
//! Every bin is compared against the rest of the tree with one Fisher's
//! exact test per [`TestFamily`]. A family defines which identifier sets
//! are contrasted ([`Contrast`]) and which [`Alternative`] hypothesis is
//! tested. The p-values of each family are corrected independently
//! with the Benjamini-Hochberg procedure and the results are ranked
//! for reporting.
//!
//! Most users will run the whole pipeline through [`crate::Analysis`]. The
//! individual steps are available here for callers who want to inspect or
//! modify intermediate results:
//!
//! 1. [`calculate_enrichment`]
//! 2. [`fdr_correction`]
//! 3. [`rank`]

use std::fmt::Display;

use crate::bins::BinId;
use crate::stats::{Alternative, FisherResult};
use crate::{EnrichError, EnrichResult, DEFAULT_ALPHA};

mod orchestrator;
mod ranking;
mod tester;

pub use orchestrator::{calculate_enrichment, fdr_correction};
pub use ranking::{rank, BiasDirection, Record};
pub use tester::{contingency_table, test_bin, BinTester};

/// The identifier sets that are compared in a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Contrast {
    /// Changed vs unchanged identifiers, bin vs rest of the tree
    Diff,
    /// Up- vs down-regulated identifiers, bin vs rest of the tree
    Bias,
    /// Up-regulated vs all other identifiers, bin vs rest of the tree
    Up,
    /// Down-regulated vs all other identifiers, bin vs rest of the tree
    Down,
    /// Changed vs unchanged identifiers, bin vs its siblings
    ///
    /// The reference are all identifiers of the parent bin that are
    /// not part of the bin itself.
    Peers,
}

impl Display for Contrast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Contrast::Diff => "diff",
            Contrast::Bias => "bias",
            Contrast::Up => "up",
            Contrast::Down => "down",
            Contrast::Peers => "peers",
        };
        write!(f, "{name}")
    }
}

/// A family of tests, one per bin, that is corrected for multiple testing as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestFamily {
    contrast: Contrast,
    alternative: Alternative,
}

impl TestFamily {
    /// Is the bin enriched for changed identifiers
    pub const DIFF: TestFamily = TestFamily::new(Contrast::Diff, Alternative::TwoSided);
    /// Are the changed identifiers of the bin biased towards one direction
    pub const BIAS: TestFamily = TestFamily::new(Contrast::Bias, Alternative::TwoSided);
    /// Is the bin enriched for up-regulated identifiers
    pub const UP: TestFamily = TestFamily::new(Contrast::Up, Alternative::Greater);
    /// Is the bin enriched for down-regulated identifiers
    pub const DOWN: TestFamily = TestFamily::new(Contrast::Down, Alternative::Greater);
    /// Is the bin enriched for changed identifiers, compared to its siblings
    pub const PEERS: TestFamily = TestFamily::new(Contrast::Peers, Alternative::TwoSided);

    /// Constructs a new `TestFamily`
    pub const fn new(contrast: Contrast, alternative: Alternative) -> Self {
        Self {
            contrast,
            alternative,
        }
    }

    /// The contrasted identifier sets
    pub fn contrast(&self) -> Contrast {
        self.contrast
    }

    /// The alternative hypothesis
    pub fn alternative(&self) -> Alternative {
        self.alternative
    }
}

impl Display for TestFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.contrast, self.alternative)
    }
}

/// The order of the reported records
///
/// The root bin is always reported first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    /// Enriched bins first, then ascending diff q-value, then bin code
    #[default]
    Significance,
    /// Ascending diff q-value, then bin code
    QValue,
}

/// Settings of an enrichment analysis
///
/// # Examples
///
/// ```
/// use binenrich::{EnrichmentConfig, Ranking, TestFamily};
///
/// let config = EnrichmentConfig::default();
/// assert_eq!(config.alpha(), 0.05);
/// assert_eq!(config.families(), &[TestFamily::DIFF, TestFamily::BIAS]);
///
/// let config = EnrichmentConfig::extended()
///     .with_alpha(0.01)
///     .with_ranking(Ranking::QValue);
/// assert_eq!(config.families().len(), 5);
/// assert!(config.validate().is_ok());
///
/// // the diff family is required for ranking
/// let config = EnrichmentConfig::default().with_families(vec![TestFamily::BIAS]);
/// assert!(config.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentConfig {
    alpha: f64,
    families: Vec<TestFamily>,
    ranking: Ranking,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            families: vec![TestFamily::DIFF, TestFamily::BIAS],
            ranking: Ranking::default(),
        }
    }
}

impl EnrichmentConfig {
    /// All available test families: diff, bias, up, down and peers
    pub fn extended() -> Self {
        Self {
            families: vec![
                TestFamily::DIFF,
                TestFamily::BIAS,
                TestFamily::UP,
                TestFamily::DOWN,
                TestFamily::PEERS,
            ],
            ..Default::default()
        }
    }

    /// Sets the significance threshold for the q-values
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the test families
    #[must_use]
    pub fn with_families(mut self, families: Vec<TestFamily>) -> Self {
        self.families = families;
        self
    }

    /// Sets the order of the reported records
    #[must_use]
    pub fn with_ranking(mut self, ranking: Ranking) -> Self {
        self.ranking = ranking;
        self
    }

    /// The significance threshold for the q-values
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The test families
    pub fn families(&self) -> &[TestFamily] {
        &self.families
    }

    /// The order of the reported records
    pub fn ranking(&self) -> Ranking {
        self.ranking
    }

    /// Checks that the settings can be used for an analysis
    ///
    /// # Errors
    ///
    /// [`EnrichError::InvalidConfig`] if
    /// - `alpha` is not within `(0, 1)`
    /// - there is no family with [`Contrast::Diff`]
    /// - two families share the same [`Contrast`]
    pub fn validate(&self) -> EnrichResult<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(EnrichError::InvalidConfig(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if !self
            .families
            .iter()
            .any(|family| family.contrast() == Contrast::Diff)
        {
            return Err(EnrichError::InvalidConfig(
                "the diff test family is required".to_string(),
            ));
        }
        for (idx, family) in self.families.iter().enumerate() {
            if self.families[idx + 1..]
                .iter()
                .any(|other| other.contrast() == family.contrast())
            {
                return Err(EnrichError::InvalidConfig(format!(
                    "duplicate test family {}",
                    family.contrast()
                )));
            }
        }
        Ok(())
    }
}

/// The raw sizes of the identifier sets of a bin
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    /// Up-regulated identifiers
    pub up: u64,
    /// Down-regulated identifiers
    pub down: u64,
    /// All changed identifiers
    pub diff: u64,
    /// All identifiers
    pub detected: u64,
}

/// The test results of a single bin
///
/// The root bin is never tested, its result holds only the [`Counts`].
#[derive(Debug, Clone)]
pub struct EnrichmentResult {
    bin: BinId,
    counts: Counts,
    tests: Vec<(TestFamily, FisherResult)>,
}

impl EnrichmentResult {
    pub(crate) fn new(bin: BinId, counts: Counts) -> Self {
        Self {
            bin,
            counts,
            tests: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, family: TestFamily, result: FisherResult) {
        self.tests.push((family, result));
    }

    /// The [`BinId`] of the tested bin
    pub fn bin(&self) -> BinId {
        self.bin
    }

    /// The raw identifier counts of the bin
    pub fn counts(&self) -> Counts {
        self.counts
    }

    /// Returns `true` if no test was performed
    pub fn is_untested(&self) -> bool {
        self.tests.is_empty()
    }

    /// Returns the result of the family with the given [`Contrast`]
    pub fn get(&self, contrast: Contrast) -> Option<&FisherResult> {
        self.tests
            .iter()
            .find(|(family, _)| family.contrast() == contrast)
            .map(|(_, result)| result)
    }

    pub(crate) fn get_mut(&mut self, contrast: Contrast) -> Option<&mut FisherResult> {
        self.tests
            .iter_mut()
            .find(|(family, _)| family.contrast() == contrast)
            .map(|(_, result)| result)
    }

    /// Iterates all performed tests
    pub fn iter(&self) -> std::slice::Iter<'_, (TestFamily, FisherResult)> {
        self.tests.iter()
    }
}
