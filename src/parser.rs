//! Parsing of the input files
//!
//! - [`mapping`]: the tab-separated bin mapping (e.g. MapMan / Mercator output)
//! - [`identifiers`]: plain identifier lists, one identifier per line
//!
//! Result files of differential expression tools are not parsed here,
//! callers hand over the resulting identifier sets as [`crate::ExpressionSets`].

pub mod identifiers;
pub mod mapping;

pub use mapping::MappingRecord;
