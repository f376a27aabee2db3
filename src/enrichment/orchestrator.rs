use tracing::{debug, info};

use crate::bins::Bin;
use crate::enrichment::tester::BinTester;
use crate::enrichment::{EnrichmentResult, TestFamily};
use crate::stats::fdr::benjamini_hochberg;
use crate::ExpressionOverlay;

/// Tests every bin of the overlay's tree
///
/// The bins are visited in depth-first pre-order, starting at the root,
/// with children in code order. The root bin comes first and is never
/// tested. All other bins are tested, regardless of their size.
///
/// The returned results have no q-values yet, see [`fdr_correction`].
///
/// # Examples
///
/// ```
/// use binenrich::{Expression, ExpressionOverlay, Tree, TestFamily};
/// use binenrich::enrichment::{calculate_enrichment, Contrast};
///
/// let tree = Tree::from_file("tests/mapping.tsv").unwrap();
/// let mut overlay = ExpressionOverlay::new(&tree);
/// overlay.assign(["AT1G01010"], Expression::Up);
/// overlay.assign(["AT1G01030", "AT3G01010"], Expression::Undetermined);
///
/// let results = calculate_enrichment(&overlay, &[TestFamily::DIFF]);
/// assert_eq!(results.len(), tree.len());
/// assert!(results[0].is_untested());
/// assert!(results[1..].iter().all(|res| res.get(Contrast::Diff).is_some()));
/// ```
pub fn calculate_enrichment(
    overlay: &ExpressionOverlay,
    families: &[TestFamily],
) -> Vec<EnrichmentResult> {
    let tree = overlay.tree();
    info!(
        "Calculate enrichment for {} bins and {} test families",
        tree.len() - 1,
        families.len()
    );
    let tester = BinTester::new(overlay);
    tree.preorder()
        .into_iter()
        .map(|id| tester.test(&Bin::new(tree, tree.get_unchecked(id)), families))
        .collect()
}

/// Applies the Benjamini-Hochberg correction to every family
///
/// Each family is corrected independently over all tested bins. Untested
/// results, i.e. the root bin, are ignored.
///
/// # Examples
///
/// ```
/// use binenrich::{Expression, ExpressionOverlay, Tree, TestFamily};
/// use binenrich::enrichment::{calculate_enrichment, fdr_correction, Contrast};
///
/// let tree = Tree::from_file("tests/mapping.tsv").unwrap();
/// let mut overlay = ExpressionOverlay::new(&tree);
/// overlay.assign(["AT1G01010"], Expression::Up);
/// overlay.assign(["AT1G01030", "AT3G01010"], Expression::Undetermined);
///
/// let families = [TestFamily::DIFF, TestFamily::BIAS];
/// let mut results = calculate_enrichment(&overlay, &families);
/// fdr_correction(&mut results, &families);
///
/// for result in &results[1..] {
///     let diff = result.get(Contrast::Diff).unwrap();
///     assert!(diff.qvalue().unwrap() >= diff.pvalue());
/// }
/// ```
pub fn fdr_correction(results: &mut [EnrichmentResult], families: &[TestFamily]) {
    info!("Apply FDR correction");
    for family in families {
        let contrast = family.contrast();
        let mut tested: Vec<&mut EnrichmentResult> = results
            .iter_mut()
            .filter(|result| result.get(contrast).is_some())
            .collect();
        let pvalues: Vec<f64> = tested
            .iter()
            .filter_map(|result| result.get(contrast))
            .map(|fisher| fisher.pvalue())
            .collect();
        let qvalues = benjamini_hochberg(&pvalues);
        for (result, qvalue) in tested.iter_mut().zip(qvalues) {
            if let Some(fisher) = result.get_mut(contrast) {
                fisher.set_qvalue(qvalue);
            }
        }
        debug!("Corrected {} p-values of {}", pvalues.len(), family);
    }
}
