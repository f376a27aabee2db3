//! Enrichment analysis of differentially expressed genes in hierarchical
//! functional annotations, such as MapMan / Mercator bins.
//!
//! The crate loads a bin hierarchy from a mapping table into a [`Tree`],
//! overlays the expression outcome of every identifier (up, down,
//! undetermined) onto the bins and all their ancestors and tests every bin
//! with Fisher's exact test. P-values are corrected with the
//! Benjamini-Hochberg procedure per test family and the final records
//! are ranked for reporting.
//!
//! # Examples
//!
//! ```
//! use binenrich::{Analysis, EnrichmentConfig, ExpressionSets, Tree};
//!
//! let tree = Tree::from_file("tests/mapping.tsv").unwrap();
//!
//! let sets = ExpressionSets::directional(
//!     ["AT1G01010", "AT1G01020"],
//!     ["AT2G01010"],
//!     ["AT1G01030", "AT2G01020", "AT3G01010", "geneZ"],
//! ).unwrap();
//!
//! let report = Analysis::new(&tree, EnrichmentConfig::default()).run(&sets).unwrap();
//!
//! // the root bin is always reported first
//! assert_eq!(report.records()[0].code().as_str(), "0");
//! assert_eq!(report.unmapped(), &["genez".to_string()]);
//! ```
use thiserror::Error;

pub mod analysis;
pub mod annotations;
pub mod bins;
pub mod enrichment;
pub mod expression;
pub mod parser;
pub mod stats;
mod tree;

pub use analysis::{Analysis, Report};
pub use bins::{Bin, BinCode, BinId};
pub use enrichment::{EnrichmentConfig, Ranking, TestFamily};
pub use expression::{Expression, ExpressionOverlay, ExpressionSets};
pub use tree::{Tree, TreeBuilder};

/// Code of the implicit root bin that every hierarchy starts from
pub const ROOT_CODE: &str = "0";
/// Default significance threshold for labeling and ranking
pub const DEFAULT_ALPHA: f64 = 0.05;

const DEFAULT_NUM_BINS: usize = 2_000;
const DEFAULT_NUM_GENES: usize = 30_000;
const DEFAULT_NUM_CHILDREN: usize = 8;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("parent bin {parent} of {code} is not registered")]
    MissingParent { code: String, parent: String },
    #[error("invalid bin code: '{0}'")]
    InvalidCode(String),
    #[error("invalid input data: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
}

/// Shortcut for `Result<T, EnrichError>`
pub type EnrichResult<T> = Result<T, EnrichError>;

/// Lower-cases identifiers so that lookups are case-insensitive
pub(crate) fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}
