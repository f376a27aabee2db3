//! Statistical tests for the enrichment of bins
//!
//! Every bin is tested with Fisher's exact test on a 2x2 [`ContingencyTable`].
//! The p-values of all bins are then corrected for multiple testing with
//! the Benjamini-Hochberg procedure, see [`fdr`].
//!
//! # Examples
//!
//! ```
//! use binenrich::stats::{fisher_exact, Alternative, ContingencyTable};
//!
//! let table = ContingencyTable::new(8, 2, 1, 5);
//! let result = fisher_exact(&table, Alternative::TwoSided);
//!
//! assert!((result.pvalue() - 0.034_965).abs() < 1e-5);
//! assert!((result.enrichment() - 20f64.log2()).abs() < 1e-12);
//! assert!(result.qvalue().is_none());
//! ```

use std::fmt::Display;

pub mod fdr;
mod fisher;

pub use fisher::fisher_exact;

/// A 2x2 contingency table `[[a, b], [c, d]]`
///
/// The first row holds the observations of the tested bin, the second
/// row the observations of the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContingencyTable {
    a: u64,
    b: u64,
    c: u64,
    d: u64,
}

impl ContingencyTable {
    /// Constructs a new table `[[a, b], [c, d]]`
    pub fn new(a: u64, b: u64, c: u64, d: u64) -> Self {
        Self { a, b, c, d }
    }

    /// Returns the cells as `[a, b, c, d]`
    pub fn cells(&self) -> [u64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Returns the totals of the two rows
    pub fn row_totals(&self) -> [u64; 2] {
        [self.a + self.b, self.c + self.d]
    }

    /// Returns the totals of the two columns
    pub fn column_totals(&self) -> [u64; 2] {
        [self.a + self.c, self.b + self.d]
    }

    /// Returns the sum of all cells
    pub fn total(&self) -> u64 {
        self.a + self.b + self.c + self.d
    }

    /// Returns `true` if any row or column sums to zero
    ///
    /// Such tables carry no information, their p-value is always `1`.
    pub fn is_degenerate(&self) -> bool {
        self.row_totals().contains(&0) || self.column_totals().contains(&0)
    }

    /// Returns the sample odds ratio `(a * d) / (b * c)`
    ///
    /// - `0.0` for degenerate tables and if `a * d == 0`
    /// - `f64::INFINITY` if `b * c == 0`
    ///
    /// ```
    /// use binenrich::stats::ContingencyTable;
    ///
    /// assert_eq!(ContingencyTable::new(2, 1, 1, 2).odds_ratio(), 4.0);
    /// assert_eq!(ContingencyTable::new(2, 0, 1, 2).odds_ratio(), f64::INFINITY);
    /// assert_eq!(ContingencyTable::new(0, 1, 1, 2).odds_ratio(), 0.0);
    /// assert_eq!(ContingencyTable::new(0, 0, 1, 2).odds_ratio(), 0.0);
    /// ```
    pub fn odds_ratio(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let numerator = f64_from_u64(self.a) * f64_from_u64(self.d);
        let denominator = f64_from_u64(self.b) * f64_from_u64(self.c);
        if denominator == 0.0 {
            f64::INFINITY
        } else {
            numerator / denominator
        }
    }
}

impl Display for ContingencyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[[{}, {}], [{}, {}]]", self.a, self.b, self.c, self.d)
    }
}

/// The alternative hypothesis of the exact test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alternative {
    /// The odds ratio differs from 1
    TwoSided,
    /// The odds ratio is larger than 1
    Greater,
}

impl Display for Alternative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alternative::TwoSided => write!(f, "two-sided"),
            Alternative::Greater => write!(f, "greater"),
        }
    }
}

/// The outcome of a single Fisher's exact test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FisherResult {
    pvalue: f64,
    enrichment: f64,
    qvalue: Option<f64>,
}

impl FisherResult {
    /// Constructs a new result, without q-value
    pub fn new(pvalue: f64, enrichment: f64) -> Self {
        Self {
            pvalue,
            enrichment,
            qvalue: None,
        }
    }

    /// Returns the raw p-value
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }

    /// Returns the log2 of the odds ratio
    ///
    /// This is `-inf` if the odds ratio is `0` and `inf` if it is infinite.
    pub fn enrichment(&self) -> f64 {
        self.enrichment
    }

    /// Returns the multiple testing corrected p-value
    ///
    /// `None` until the correction has been performed
    pub fn qvalue(&self) -> Option<f64> {
        self.qvalue
    }

    pub(crate) fn set_qvalue(&mut self, qvalue: f64) {
        debug_assert!(self.qvalue.is_none(), "q-value must only be set once");
        self.qvalue = Some(qvalue);
    }
}

/// We have to frequently do divisions starting with u64 values
/// and need to return f64 values. To ensure some kind of safety
/// we use this method to panic in case of overflows.
pub(crate) fn f64_from_u64(n: u64) -> f64 {
    let intermediate: u32 = n
        .try_into()
        .expect("cannot safely create f64 from large u64");
    intermediate.into()
}

pub(crate) fn f64_from_usize(n: usize) -> f64 {
    let intermediate: u32 = n
        .try_into()
        .expect("cannot safely create f64 from large usize");
    intermediate.into()
}
