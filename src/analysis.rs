//! The complete enrichment pipeline
//!
//! [`Analysis`] combines all steps of an enrichment analysis:
//!
//! 1. assign the [`ExpressionSets`] to an [`ExpressionOverlay`]
//! 2. test every bin for every [`crate::TestFamily`]
//! 3. correct the p-values of every family for multiple testing
//! 4. rank the results
use tracing::{info, warn};

use crate::enrichment::{calculate_enrichment, fdr_correction, rank, Record};
use crate::expression::Expression;
use crate::{EnrichError, EnrichResult, EnrichmentConfig, ExpressionOverlay, ExpressionSets, Tree};

/// An enrichment analysis on a [`Tree`]
///
/// The analysis does not modify the tree and can be run any number of
/// times with different expression data.
///
/// # Examples
///
/// ```
/// use binenrich::{Analysis, EnrichmentConfig, ExpressionSets, Tree};
/// use binenrich::enrichment::Contrast;
///
/// let tree = Tree::from_file("tests/mapping.tsv").unwrap();
/// let analysis = Analysis::new(&tree, EnrichmentConfig::extended());
///
/// let sets = ExpressionSets::unsigned(
///     ["AT1G01010", "AT1G01020"],
///     ["AT1G01030", "AT2G01010", "AT2G01020", "AT3G01010"],
/// ).unwrap();
/// let report = analysis.run(&sets).unwrap();
///
/// assert_eq!(report.records().len(), tree.len());
/// for record in report.records().iter().skip(1) {
///     assert!(record.qvalue(Contrast::Diff).is_some());
///     assert!(record.qvalue(Contrast::Peers).is_some());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Analysis<'a> {
    tree: &'a Tree,
    config: EnrichmentConfig,
}

impl<'a> Analysis<'a> {
    /// Constructs a new `Analysis`
    pub fn new(tree: &'a Tree, config: EnrichmentConfig) -> Self {
        Self { tree, config }
    }

    /// The settings of the analysis
    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    /// Runs the analysis for the expression data
    ///
    /// # Errors
    ///
    /// [`EnrichError::InvalidConfig`] if the [`EnrichmentConfig`] is invalid
    pub fn run(&self, sets: &ExpressionSets) -> EnrichResult<Report<'a>> {
        let mut overlay = ExpressionOverlay::new(self.tree);
        for expression in Expression::ALL {
            let identifiers = sets.get(expression);
            let mapped = overlay.assign(identifiers, expression);
            info!(
                "{} of {} {} identifiers are part of the mapping",
                mapped,
                identifiers.len(),
                expression
            );
        }
        self.run_overlay(&overlay)
    }

    /// Runs the analysis on a populated [`ExpressionOverlay`]
    ///
    /// Use this if the overlay was populated manually, with
    /// [`ExpressionOverlay::assign`].
    ///
    /// # Errors
    ///
    /// - [`EnrichError::InvalidConfig`] if the [`EnrichmentConfig`] is invalid
    /// - [`EnrichError::InvalidInput`] if the overlay belongs to a different [`Tree`]
    pub fn run_overlay(&self, overlay: &ExpressionOverlay) -> EnrichResult<Report<'a>> {
        self.config.validate()?;
        if !std::ptr::eq(self.tree, overlay.tree()) {
            return Err(EnrichError::InvalidInput(
                "the overlay belongs to a different tree".to_string(),
            ));
        }

        let unmapped: Vec<String> = overlay.unmapped().iter().cloned().collect();
        if !unmapped.is_empty() {
            warn!(
                "{} identifiers were not found in the mapping: {}",
                unmapped.len(),
                unmapped.join(",")
            );
        }

        let mut results = calculate_enrichment(overlay, self.config.families());
        fdr_correction(&mut results, self.config.families());
        let records = rank(self.tree, results, &self.config);
        Ok(Report { records, unmapped })
    }
}

/// The ranked results of an [`Analysis`]
#[derive(Debug, Clone)]
pub struct Report<'a> {
    records: Vec<Record<'a>>,
    unmapped: Vec<String>,
}

impl<'a> Report<'a> {
    /// The ranked records, starting with the root bin
    pub fn records(&self) -> &[Record<'a>] {
        &self.records
    }

    /// The lower-cased identifiers that are not part of the mapping, sorted
    pub fn unmapped(&self) -> &[String] {
        &self.unmapped
    }

    /// Returns the record of the bin with the code
    pub fn get(&self, code: &str) -> Option<&Record<'a>> {
        self.records.iter().find(|rec| rec.code() == &code)
    }

    /// Iterates all records that are significantly enriched
    pub fn enriched(&self) -> impl Iterator<Item = &Record<'a>> {
        self.records.iter().filter(|rec| rec.is_enriched())
    }
}

impl<'a> IntoIterator for Report<'a> {
    type Item = Record<'a>;
    type IntoIter = std::vec::IntoIter<Record<'a>>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::enrichment::{BiasDirection, Contrast, Counts};
    use crate::parser::MappingRecord;
    use crate::Ranking;

    fn sets() -> ExpressionSets {
        ExpressionSets::directional(
            ["AT1G01010", "AT1G01020"],
            ["AT2G01010"],
            ["AT1G01030", "AT2G01020", "AT3G01010", "geneZ"],
        )
        .unwrap()
    }

    #[test]
    fn full_pipeline() {
        let tree = Tree::from_file("tests/mapping.tsv").unwrap();
        let report = Analysis::new(&tree, EnrichmentConfig::default())
            .run(&sets())
            .unwrap();

        assert_eq!(report.records().len(), 9);
        let root = &report.records()[0];
        assert!(root.is_root());
        assert_eq!(
            root.counts(),
            Counts {
                up: 2,
                down: 1,
                diff: 3,
                detected: 6
            }
        );
        assert_eq!(report.unmapped(), &["genez".to_string()]);

        let photosystem = report.get("1.1.1").unwrap();
        assert_eq!(photosystem.counts().up, 2);
        assert!(photosystem.enrichment(Contrast::Diff).unwrap() > 0.0);
        for record in report.records() {
            if let Some(q) = record.qvalue(Contrast::Diff) {
                assert!(q <= 1.0);
                assert!(q >= record.pvalue(Contrast::Diff).unwrap());
            }
        }
    }

    #[test]
    fn records_are_sorted_by_qvalue() {
        let tree = Tree::from_file("tests/mapping.tsv").unwrap();
        let config = EnrichmentConfig::default().with_ranking(Ranking::QValue);
        let report = Analysis::new(&tree, config).run(&sets()).unwrap();

        let qvalues: Vec<f64> = report
            .records()
            .iter()
            .skip(1)
            .map(|rec| rec.qvalue(Contrast::Diff).unwrap())
            .collect();
        assert!(qvalues.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn nothing_is_significant_in_tiny_trees() {
        let tree = Tree::from_file("tests/mapping.tsv").unwrap();
        let report = Analysis::new(&tree, EnrichmentConfig::default())
            .run(&sets())
            .unwrap();
        assert_eq!(report.enriched().count(), 0);
        assert!(report
            .records()
            .iter()
            .all(|rec| rec.bias() == BiasDirection::None));
    }

    #[test]
    fn invalid_config() {
        let tree = Tree::from_file("tests/mapping.tsv").unwrap();
        let config = EnrichmentConfig::default().with_alpha(2.0);
        assert!(matches!(
            Analysis::new(&tree, config).run(&sets()),
            Err(EnrichError::InvalidConfig(_))
        ));
    }

    #[test]
    fn manual_overlay() {
        let tree = Tree::from_file("tests/mapping.tsv").unwrap();
        let mut overlay = ExpressionOverlay::new(&tree);
        overlay.assign(["AT1G01010"], Expression::Up);
        overlay.assign(["AT3G01010", "foo"], Expression::Undetermined);

        let report = Analysis::new(&tree, EnrichmentConfig::default())
            .run_overlay(&overlay)
            .unwrap();
        assert_eq!(report.unmapped(), &["foo".to_string()]);
        assert_eq!(report.get("3").unwrap().counts().detected, 1);
    }

    #[test]
    fn overlay_of_another_tree() {
        let tree = Tree::from_file("tests/mapping.tsv").unwrap();
        let other = Tree::from_file("tests/mapping.tsv").unwrap();
        let overlay = ExpressionOverlay::new(&other);
        assert!(matches!(
            Analysis::new(&tree, EnrichmentConfig::default()).run_overlay(&overlay),
            Err(EnrichError::InvalidInput(_))
        ));
    }

    #[test]
    fn same_report_for_sets_and_overlay() {
        let tree = Tree::from_file("tests/mapping.tsv").unwrap();
        let analysis = Analysis::new(&tree, EnrichmentConfig::extended());
        let sets = sets();
        let overlay = ExpressionOverlay::from_sets(&tree, &sets);

        let a = analysis.run(&sets).unwrap();
        let b = analysis.run_overlay(&overlay).unwrap();
        let codes = |report: &Report| -> Vec<String> {
            report.records().iter().map(|rec| rec.code().to_string()).collect()
        };
        assert_eq!(codes(&a), codes(&b));
    }

    /// Identifiers `g<bin>_<idx>`, `genes` per top level bin
    fn large_tree(bins: usize, genes: usize) -> Tree {
        let mut records = Vec::new();
        for bin in 1..=bins {
            let code = bin.to_string();
            for idx in 0..genes {
                records.push(MappingRecord::new(
                    &code,
                    &format!("Bin {bin}"),
                    &format!("g{bin}_{idx}"),
                    "",
                ));
            }
        }
        Tree::from_records(&records).unwrap()
    }

    /// Every 10th identifier is up, every 30th (offset 5) down
    fn uniform_sets(bins: usize, genes: usize) -> ExpressionSets {
        let mut up = Vec::new();
        let mut down = Vec::new();
        let mut background = Vec::new();
        for bin in 1..=bins {
            for idx in 0..genes {
                let id = format!("g{bin}_{idx}");
                if idx % 10 == 0 {
                    up.push(id);
                } else if idx % 30 == 5 {
                    down.push(id);
                } else {
                    background.push(id);
                }
            }
        }
        ExpressionSets::directional(up, down, background).unwrap()
    }

    fn assert_valid_pvalues(report: &Report) {
        for record in report.records().iter().skip(1) {
            for (_, fisher) in record.result().iter() {
                let p = fisher.pvalue();
                let q = fisher.qvalue().unwrap();
                assert!(!p.is_nan() && p.is_sign_positive(), "{}: {p}", record.code());
                assert!(p > 0.0 && p <= 1.0, "{}: {p}", record.code());
                assert!(q >= p && q <= 1.0, "{}: {p} {q}", record.code());
            }
        }
    }

    #[test]
    fn background_rate_is_not_significant_in_large_trees() {
        let tree = large_tree(20, 150);
        let report = Analysis::new(&tree, EnrichmentConfig::extended())
            .run(&uniform_sets(20, 150))
            .unwrap();

        let root = &report.records()[0];
        assert_eq!(root.counts().detected, 3000);
        assert_eq!(root.counts().diff, 400);
        assert_valid_pvalues(&report);

        // every bin has exactly the background rate
        for record in report.records().iter().skip(1) {
            assert_eq!(record.counts().up, 15);
            assert_eq!(record.counts().down, 5);
            assert!(record.pvalue(Contrast::Diff).unwrap() > 0.99);
            assert!(record.pvalue(Contrast::Bias).unwrap() > 0.99);
            assert!(!record.is_enriched());
            assert_eq!(record.bias(), BiasDirection::None);
        }
        assert_eq!(report.enriched().count(), 0);
    }

    #[test]
    fn enriched_bin_in_large_tree() {
        let mut records = Vec::new();
        for bin in 1..=20 {
            for idx in 0..150 {
                records.push(MappingRecord::new(
                    &bin.to_string(),
                    "Uniform",
                    &format!("g{bin}_{idx}"),
                    "",
                ));
            }
        }
        for idx in 0..100 {
            records.push(MappingRecord::new("21", "Enriched", &format!("h{idx}"), ""));
        }
        let tree = Tree::from_records(&records).unwrap();

        let uniform = uniform_sets(20, 150);
        let mut up: Vec<String> = uniform.get(Expression::Up).iter().cloned().collect();
        let down: Vec<String> = uniform.get(Expression::Down).iter().cloned().collect();
        let mut background: Vec<String> =
            uniform.get(Expression::Undetermined).iter().cloned().collect();
        for idx in 0..100 {
            if idx < 60 {
                up.push(format!("h{idx}"));
            } else {
                background.push(format!("h{idx}"));
            }
        }
        let sets = ExpressionSets::directional(up, down, background).unwrap();

        let report = Analysis::new(&tree, EnrichmentConfig::default())
            .run(&sets)
            .unwrap();
        assert_valid_pvalues(&report);

        let enriched: Vec<&str> = report.enriched().map(|rec| rec.code().as_str()).collect();
        assert_eq!(enriched, vec!["21"]);
        let top = &report.records()[1];
        assert_eq!(top.code().as_str(), "21");
        assert!(top.pvalue(Contrast::Diff).unwrap() < 1e-20);
        assert!(top.enrichment(Contrast::Diff).unwrap() > 0.0);
        assert_eq!(top.bias(), BiasDirection::Up);
    }
}
