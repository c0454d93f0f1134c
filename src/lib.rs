//! Alignment-free classification of candidate sequences against a library of
//! transposable-element (repeat family) references.
//!
//! - Every reference is indexed twice: its overlapping forward k-mers and the
//!   reverse complement of the same windows (O(1) rolling RC), each collapsed
//!   into a table of distinct 2-bit keys after a 4-pass radix sort.
//! - A candidate is reduced to its non-overlapping k-mers; the reference and
//!   strand with the most exact key hits wins if it covers at least half of
//!   them.
//! - Homopolymer k-mers are never indexed nor queried.
//!
//! The [`ReferenceLibrary`] is built once by [`build_library`] and is
//! read-only afterwards; [`classify`] only borrows it.

mod builder;
mod classify;
pub mod encode;
mod error;
mod index;
mod radix;
mod source;

pub use builder::{BuildConfig, Reference, ReferenceLibrary, build_library};
pub use classify::{
    Classification, Classifier, Orientation, RefHits, Scoreboard, classify, count_hits, score,
};
pub use encode::{Kmer, Strand, extract_overlapping, extract_sampled, is_low_complexity};
pub use error::{Error, Result};
pub use index::SequenceIndex;
pub use radix::radix_sort_kmers;
pub use source::{FastaSource, MemorySource, SeqRecord, SequenceSource};
