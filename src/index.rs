//! SequenceIndex: per-reference, per-strand table of distinct k-mer keys.
//!
//! Built once from the overlapping k-mers of a single reference: extract,
//! radix sort, collapse runs of equal keys. Immutable afterwards.

use rustc_hash::FxHashMap;

use crate::encode::{Kmer, Strand, extract_overlapping};
use crate::radix::radix_sort_kmers;

/// Distinct `key -> origin` table for one reference in one orientation.
#[derive(Clone, Debug, Default)]
pub struct SequenceIndex {
    table: FxHashMap<u32, u32>,
}

impl SequenceIndex {
    /// Index the `strand` k-mers of `bases`, tagged with `seq_id`.
    /// A sequence with no valid k-mer yields an empty index, which never matches.
    pub fn build(bases: &[u8], seq_id: u32, k: usize, strand: Strand) -> Self {
        Self::from_kmers(extract_overlapping(bases, k, seq_id, strand))
    }

    /// Collapse an arbitrary batch of k-mers into an index.
    ///
    /// Within a run of equal keys the origin of the first record in input
    /// order wins (the radix sort is stable). Indices built by
    /// [`SequenceIndex::build`] only ever see one origin, and mixed origins
    /// in a run trip a debug assertion.
    pub fn from_kmers(mut kmers: Vec<Kmer>) -> Self {
        if kmers.is_empty() {
            return Self::default();
        }
        radix_sort_kmers(&mut kmers);

        let n_keys = 1 + kmers.windows(2).filter(|w| w[0].key != w[1].key).count();
        let mut table = FxHashMap::default();
        table.reserve(n_keys);

        for run in kmers.chunk_by(|a, b| a.key == b.key) {
            let head = run[0];
            debug_assert!(
                run.iter().all(|m| m.origin == head.origin),
                "k-mer run for key {:#x} spans several sequences",
                head.key
            );
            let prev = table.insert(head.key, head.origin);
            debug_assert!(prev.is_none(), "sorted runs must be maximal");
        }

        Self { table }
    }

    /// Whether `key` occurs in the indexed sequence.
    #[inline]
    pub fn contains(&self, key: u32) -> bool {
        self.table.contains_key(&key)
    }

    /// Origin stored for `key`, if present.
    #[inline]
    pub fn origin(&self, key: u32) -> Option<u32> {
        self.table.get(&key).copied()
    }

    /// Number of distinct keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Distinct keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.table.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_kmer;

    #[test]
    fn repeated_kmer_is_stored_once() {
        // ACGT appears three times.
        let idx = SequenceIndex::build(b"ACGTTACGTTACGT", 4, 4, Strand::Forward);
        let key = encode_kmer(b"ACGT").unwrap();
        assert!(idx.contains(key));
        assert_eq!(idx.origin(key), Some(4));
        assert_eq!(idx.keys().filter(|&k| k == key).count(), 1);
        // Distinct 4-mers: ACGT CGTT GTTA TTAC TACG
        assert_eq!(idx.len(), 5);
    }

    #[test]
    fn empty_when_no_valid_kmer() {
        assert!(SequenceIndex::build(b"ACG", 0, 4, Strand::Forward).is_empty());
        assert!(SequenceIndex::build(b"NNNNNNNN", 0, 4, Strand::Reverse).is_empty());
        assert!(SequenceIndex::build(b"AAAAAAAA", 0, 4, Strand::Forward).is_empty());
        assert!(!SequenceIndex::default().contains(0));
    }

    #[test]
    fn reverse_index_holds_reverse_complement_keys() {
        let idx = SequenceIndex::build(b"AACGG", 1, 5, Strand::Reverse);
        assert_eq!(idx.len(), 1);
        assert!(idx.contains(encode_kmer(b"CCGTT").unwrap()));
        assert!(!idx.contains(encode_kmer(b"AACGG").unwrap()));
    }

    #[test]
    fn duplicate_keys_collapse_with_their_origin() {
        let kmers = vec![
            Kmer { key: 9, origin: 2 },
            Kmer { key: 3, origin: 2 },
            Kmer { key: 9, origin: 2 },
        ];
        let idx = SequenceIndex::from_kmers(kmers);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.origin(9), Some(2));
        assert_eq!(idx.origin(3), Some(2));
        assert_eq!(idx.origin(4), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "spans several sequences")]
    fn mixed_origins_are_a_caller_defect() {
        let kmers = vec![Kmer { key: 9, origin: 0 }, Kmer { key: 9, origin: 1 }];
        let _ = SequenceIndex::from_kmers(kmers);
    }
}
