//! Fisher's exact test on 2x2 contingency tables
//!
//! The conditional distribution of `a` for fixed margins is hypergeometric:
//!
//! - population: all observations of the table
//! - successes: the total of the first row
//! - draws: the total of the first column
//!
//! The probabilities are calculated from the logarithm of the mass function.
//! The binomial coefficients of the plain mass function overflow `f64` for
//! a few thousand observations.
use statrs::distribution::{Discrete, Hypergeometric};
use tracing::{trace, warn};

use crate::stats::{Alternative, ContingencyTable, FisherResult};

/// Relative tolerance when comparing probabilities of the two-sided test
const RELATIVE_ERROR: f64 = 1e-7;

/// Calculates the p-value and log2 odds ratio of the table
///
/// - [`Alternative::TwoSided`]: sums the probabilities of all tables that
///   are at most as likely as the observed one
/// - [`Alternative::Greater`]: sums the probabilities of all tables with
///   `a` or more observations in the first cell
///
/// Degenerate tables (a row or column total of `0`) are not tested,
/// they have a p-value of `1` and an enrichment of `-inf`.
///
/// # Examples
///
/// ```
/// use binenrich::stats::{fisher_exact, Alternative, ContingencyTable};
///
/// let table = ContingencyTable::new(3, 1, 1, 3);
/// assert!((fisher_exact(&table, Alternative::TwoSided).pvalue() - 0.485_714).abs() < 1e-5);
/// assert!((fisher_exact(&table, Alternative::Greater).pvalue() - 0.242_857).abs() < 1e-5);
///
/// let empty = ContingencyTable::new(0, 0, 4, 12);
/// let result = fisher_exact(&empty, Alternative::TwoSided);
/// assert_eq!(result.pvalue(), 1.0);
/// assert_eq!(result.enrichment(), f64::NEG_INFINITY);
/// ```
pub fn fisher_exact(table: &ContingencyTable, alternative: Alternative) -> FisherResult {
    let enrichment = table.odds_ratio().log2();
    if table.is_degenerate() {
        trace!("Degenerate table {}", table);
        return FisherResult::new(1.0, enrichment);
    }

    let [a, _, _, _] = table.cells();
    let [row1, row2] = table.row_totals();
    let [col1, _] = table.column_totals();

    let hyper = match Hypergeometric::new(table.total(), row1, col1) {
        Ok(hyper) => hyper,
        Err(err) => {
            warn!("Unable to test {}: {}", table, err);
            return FisherResult::new(1.0, enrichment);
        }
    };

    // possible values of `a` for the fixed margins
    let min = col1.saturating_sub(row2);
    let max = row1.min(col1);

    let pvalue = match alternative {
        Alternative::Greater => (a..=max).map(|k| hyper.ln_pmf(k).exp()).sum::<f64>(),
        Alternative::TwoSided => {
            let observed = hyper.ln_pmf(a) + RELATIVE_ERROR.ln_1p();
            (min..=max)
                .map(|k| hyper.ln_pmf(k))
                .filter(|ln_p| *ln_p <= observed)
                .map(f64::exp)
                .sum::<f64>()
        }
    };
    debug_assert!(pvalue.is_finite(), "invalid p-value for {table}");
    // rounding errors of the sum can exceed 1
    FisherResult::new(pvalue.min(1.0), enrichment)
}

#[cfg(test)]
mod test {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn relative_close(a: f64, b: f64) -> bool {
        ((a - b) / b).abs() < 1e-4
    }

    #[test]
    fn two_sided() {
        // [[8, 2], [1, 5]], see R: fisher.test(matrix(c(8, 1, 2, 5), 2))
        let res = fisher_exact(&ContingencyTable::new(8, 2, 1, 5), Alternative::TwoSided);
        assert!(close(res.pvalue(), 400.0 / 11440.0));
    }

    #[test]
    fn greater() {
        // P(a >= 8) = (270 + 10) / 11440
        let res = fisher_exact(&ContingencyTable::new(8, 2, 1, 5), Alternative::Greater);
        assert!(close(res.pvalue(), 280.0 / 11440.0));

        // depleted tables are not significant
        let res = fisher_exact(&ContingencyTable::new(1, 5, 8, 2), Alternative::Greater);
        assert!(res.pvalue() > 0.99);
        assert!(res.enrichment() < 0.0);
    }

    #[test]
    fn symmetric_table() {
        let res = fisher_exact(&ContingencyTable::new(2, 2, 2, 2), Alternative::TwoSided);
        assert!(close(res.pvalue(), 1.0));
        assert_eq!(res.enrichment(), 0.0);
    }

    #[test]
    fn infinite_enrichment() {
        let res = fisher_exact(&ContingencyTable::new(3, 0, 1, 4), Alternative::TwoSided);
        assert_eq!(res.enrichment(), f64::INFINITY);
        assert!(res.pvalue() < 1.0);
    }

    #[test]
    fn zero_enrichment() {
        let res = fisher_exact(&ContingencyTable::new(0, 3, 4, 1), Alternative::TwoSided);
        assert_eq!(res.enrichment(), f64::NEG_INFINITY);
    }

    #[test]
    fn degenerate_tables() {
        for table in [
            ContingencyTable::new(0, 0, 3, 4),
            ContingencyTable::new(3, 4, 0, 0),
            ContingencyTable::new(0, 3, 0, 4),
            ContingencyTable::new(3, 0, 4, 0),
        ] {
            for alternative in [Alternative::TwoSided, Alternative::Greater] {
                let res = fisher_exact(&table, alternative);
                assert_eq!(res.pvalue(), 1.0);
                assert_eq!(res.enrichment(), f64::NEG_INFINITY);
            }
        }
    }

    #[test]
    fn pvalues_are_probabilities() {
        for a in 0..6 {
            for b in 0..6 {
                let table = ContingencyTable::new(a, b, 5 - a.min(5), 7);
                for alternative in [Alternative::TwoSided, Alternative::Greater] {
                    let p = fisher_exact(&table, alternative).pvalue();
                    assert!((0.0..=1.0).contains(&p), "{table}: {p}");
                }
            }
        }
    }

    #[test]
    fn large_population() {
        // 4 309 observations, the plain binomial coefficients overflow
        let table = ContingencyTable::new(7, 2, 300, 4000);
        let two_sided = fisher_exact(&table, Alternative::TwoSided).pvalue();
        let greater = fisher_exact(&table, Alternative::Greater).pvalue();
        assert!(relative_close(two_sided, 2.7744e-7), "{two_sided}");
        assert!(relative_close(greater, 2.7744e-7), "{greater}");
    }

    #[test]
    fn moderate_enrichment_in_large_tables() {
        let table = ContingencyTable::new(10, 90, 100, 2000);
        let two_sided = fisher_exact(&table, Alternative::TwoSided).pvalue();
        let greater = fisher_exact(&table, Alternative::Greater).pvalue();
        assert!(relative_close(two_sided, 3.03513e-2), "{two_sided}");
        assert!(relative_close(greater, 2.51119e-2), "{greater}");
    }

    #[test]
    fn expected_counts_in_large_tables() {
        // the bin has exactly the background rate
        let table = ContingencyTable::new(15, 135, 285, 2565);
        for alternative in [Alternative::TwoSided, Alternative::Greater] {
            let p = fisher_exact(&table, alternative).pvalue();
            assert!(p.is_sign_positive(), "{p}");
            assert!(p > 0.4 && p <= 1.0, "{p}");
        }
        assert!(close(
            fisher_exact(&table, Alternative::TwoSided).pvalue(),
            1.0
        ));
    }
}
