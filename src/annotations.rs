//! Genes (or transcripts, proteins) are annotated to bins
//!
//! The relation between identifiers and bins is many-to-many: an identifier
//! can be annotated to zero, one or multiple bins and a bin holds any number
//! of identifiers.
//!
//! Identifiers are interned into a [`GeneIndex`] when the [`crate::Tree`] is
//! built. Every identifier receives a numerical [`GeneId`] and all sets of
//! identifiers ([`Genes`]) store only these ids. Lookups are
//! case-insensitive, the index stores lower-cased identifiers.

mod gene;
mod index;

pub use gene::{GeneId, GeneIterator, Genes};
pub use index::{GeneBins, GeneIndex};
