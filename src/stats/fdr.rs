//! Multiple testing correction
//!
//! The Benjamini-Hochberg procedure controls the false discovery rate of a
//! family of tests. This implementation follows the variant used by
//! Bioconductor enrichment tools:
//!
//! - tied p-values share one rank
//! - the rank only increases when the p-value changes (dense ranking)
//! - there is no running minimum over larger ranks
//!
//! As a consequence, the q-values are not monotone in the p-values. A smaller
//! p-value can get a larger q-value, and q-values can be larger than the ones
//! of the textbook procedure.
use tracing::debug;

use crate::stats::f64_from_usize;

/// Calculates the q-values of a family of p-values
///
/// The q-values are returned in the order of the input.
/// `q = p * N / rank`, capped at `1.0`.
///
/// # Examples
///
/// ```
/// use binenrich::stats::fdr::benjamini_hochberg;
///
/// let qvalues = benjamini_hochberg(&[0.04, 0.01, 0.20, 0.01]);
///
/// assert!((qvalues[0] - 0.08).abs() < 1e-12);
/// assert!((qvalues[1] - 0.04).abs() < 1e-12);
/// assert!((qvalues[2] - 0.8 / 3.0).abs() < 1e-12);
/// assert!((qvalues[3] - 0.04).abs() < 1e-12);
/// ```
pub fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..pvalues.len()).collect();
    // stable sort keeps the caller's order for ties
    order.sort_by(|a, b| pvalues[*a].total_cmp(&pvalues[*b]));

    let total = f64_from_usize(pvalues.len());
    let mut qvalues = vec![1.0; pvalues.len()];
    let mut rank = 0usize;
    let mut previous: Option<f64> = None;
    for idx in order {
        let pvalue = pvalues[idx];
        if previous != Some(pvalue) {
            rank += 1;
            previous = Some(pvalue);
        }
        qvalues[idx] = (pvalue * total / f64_from_usize(rank)).min(1.0);
    }
    debug!("Corrected {} p-values in {} ranks", pvalues.len(), rank);
    qvalues
}
