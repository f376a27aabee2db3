use std::cmp::Ordering;
use std::fmt::Display;

use tracing::debug;

use crate::bins::{Bin, BinCode};
use crate::enrichment::{Contrast, Counts, EnrichmentConfig, EnrichmentResult, Ranking};
use crate::stats::FisherResult;
use crate::Tree;

/// The direction of a significant bias test
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiasDirection {
    /// More up-regulated identifiers than expected
    Up,
    /// More down-regulated identifiers than expected
    Down,
    /// No significant bias, or the bias was not tested
    #[default]
    None,
}

impl Display for BiasDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BiasDirection::Up => write!(f, "up"),
            BiasDirection::Down => write!(f, "down"),
            BiasDirection::None => write!(f, "none"),
        }
    }
}

/// A single reported bin with its test results and labels
#[derive(Debug, Clone)]
pub struct Record<'a> {
    bin: Bin<'a>,
    result: EnrichmentResult,
    enriched: bool,
    bias: BiasDirection,
}

impl<'a> Record<'a> {
    fn new(bin: Bin<'a>, result: EnrichmentResult, alpha: f64) -> Self {
        let enriched = result
            .get(Contrast::Diff)
            .map_or(false, |fisher| is_significant(fisher, alpha) && fisher.enrichment() > 0.0);
        let bias = match result.get(Contrast::Bias) {
            Some(fisher) if is_significant(fisher, alpha) => {
                if fisher.enrichment() > 0.0 {
                    BiasDirection::Up
                } else {
                    BiasDirection::Down
                }
            }
            _ => BiasDirection::None,
        };
        Self {
            bin,
            result,
            enriched,
            bias,
        }
    }

    /// The reported [`Bin`]
    pub fn bin(&self) -> Bin<'a> {
        self.bin
    }

    /// The code of the bin
    pub fn code(&self) -> &'a BinCode {
        self.bin.code()
    }

    /// The name of the bin
    pub fn name(&self) -> &'a str {
        self.bin.name()
    }

    /// Returns `true` for the root bin
    pub fn is_root(&self) -> bool {
        self.bin.is_root()
    }

    /// The raw identifier counts of the bin
    pub fn counts(&self) -> Counts {
        self.result.counts()
    }

    /// The test results of the bin
    pub fn result(&self) -> &EnrichmentResult {
        &self.result
    }

    /// The log2 enrichment of the family with the given [`Contrast`]
    pub fn enrichment(&self, contrast: Contrast) -> Option<f64> {
        self.result.get(contrast).map(FisherResult::enrichment)
    }

    /// The raw p-value of the family with the given [`Contrast`]
    pub fn pvalue(&self, contrast: Contrast) -> Option<f64> {
        self.result.get(contrast).map(FisherResult::pvalue)
    }

    /// The q-value of the family with the given [`Contrast`]
    pub fn qvalue(&self, contrast: Contrast) -> Option<f64> {
        self.result.get(contrast).and_then(FisherResult::qvalue)
    }

    /// Returns `true` if the bin is significantly enriched for changed identifiers
    pub fn is_enriched(&self) -> bool {
        self.enriched
    }

    /// The direction of a significant bias
    pub fn bias(&self) -> BiasDirection {
        self.bias
    }

    fn diff_qvalue(&self) -> f64 {
        self.qvalue(Contrast::Diff).unwrap_or(1.0)
    }
}

fn is_significant(fisher: &FisherResult, alpha: f64) -> bool {
    fisher.qvalue().map_or(false, |q| q <= alpha)
}

/// Orders the results for reporting and adds the significance labels
///
/// The root bin is always first. The order of the other bins depends on
/// [`EnrichmentConfig::ranking`], ties are broken by the bin code.
///
/// # Panics
///
/// Panics if a result belongs to a different [`Tree`]
pub fn rank<'a>(
    tree: &'a Tree,
    results: Vec<EnrichmentResult>,
    config: &EnrichmentConfig,
) -> Vec<Record<'a>> {
    let mut records: Vec<Record> = results
        .into_iter()
        .map(|result| {
            let bin = Bin::new(tree, tree.get_unchecked(result.bin()));
            Record::new(bin, result, config.alpha())
        })
        .collect();

    records.sort_by(|a, b| compare(a, b, config.ranking()));
    debug!(
        "Ranked {} records, {} enriched",
        records.len(),
        records.iter().filter(|rec| rec.is_enriched()).count()
    );
    records
}

fn compare(a: &Record, b: &Record, ranking: Ranking) -> Ordering {
    b.is_root()
        .cmp(&a.is_root())
        .then_with(|| match ranking {
            Ranking::Significance => b.is_enriched().cmp(&a.is_enriched()),
            Ranking::QValue => Ordering::Equal,
        })
        .then_with(|| a.diff_qvalue().total_cmp(&b.diff_qvalue()))
        .then_with(|| a.code().cmp(b.code()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bins::BinId;
    use crate::parser::MappingRecord;

    fn tree() -> Tree {
        let records = vec![
            MappingRecord::new("1", "A", "", ""),
            MappingRecord::new("2", "B", "", ""),
            MappingRecord::new("3", "C", "", ""),
            MappingRecord::new("10", "D", "", ""),
        ];
        Tree::from_records(&records).unwrap()
    }

    fn result(tree: &Tree, code: &str, qvalue: f64, enrichment: f64) -> EnrichmentResult {
        let mut result =
            EnrichmentResult::new(tree.bin_by_code(code).unwrap().id(), Counts::default());
        let mut diff = FisherResult::new(qvalue, enrichment);
        diff.set_qvalue(qvalue);
        result.push(crate::TestFamily::DIFF, diff);
        let mut bias = FisherResult::new(qvalue, -enrichment);
        bias.set_qvalue(qvalue);
        result.push(crate::TestFamily::BIAS, bias);
        result
    }

    fn codes<'a>(records: &'a [Record]) -> Vec<&'a str> {
        records.iter().map(|rec| rec.code().as_str()).collect()
    }

    fn results(tree: &Tree) -> Vec<EnrichmentResult> {
        vec![
            result(tree, "1", 0.01, -1.0),
            result(tree, "2", 0.2, 2.0),
            result(tree, "3", 0.04, 1.5),
            EnrichmentResult::new(BinId::root(), Counts::default()),
            result(tree, "10", 0.04, 0.5),
        ]
    }

    #[test]
    fn significance_ranking() {
        let tree = tree();
        let records = rank(&tree, results(&tree), &EnrichmentConfig::default());
        // enriched first, then q-value, then code
        assert_eq!(codes(&records), vec!["0", "3", "10", "1", "2"]);
        assert!(records[1].is_enriched());
        assert!(records[2].is_enriched());
        // significant, but depleted
        assert!(!records[3].is_enriched());
    }

    #[test]
    fn qvalue_ranking() {
        let tree = tree();
        let config = EnrichmentConfig::default().with_ranking(Ranking::QValue);
        let records = rank(&tree, results(&tree), &config);
        assert_eq!(codes(&records), vec!["0", "1", "3", "10", "2"]);
    }

    #[test]
    fn bias_direction() {
        let tree = tree();
        let records = rank(&tree, results(&tree), &EnrichmentConfig::default());
        let bias = |code: &str| {
            records
                .iter()
                .find(|rec| rec.code() == &code)
                .map(Record::bias)
                .unwrap()
        };
        assert_eq!(bias("0"), BiasDirection::None);
        assert_eq!(bias("1"), BiasDirection::Up);
        assert_eq!(bias("3"), BiasDirection::Down);
        assert_eq!(bias("2"), BiasDirection::None);
    }

    #[test]
    fn root_has_no_labels() {
        let tree = tree();
        let records = rank(&tree, results(&tree), &EnrichmentConfig::default());
        assert!(records[0].is_root());
        assert!(!records[0].is_enriched());
        assert!(records[0].qvalue(Contrast::Diff).is_none());
    }
}
