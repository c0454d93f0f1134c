//! Reference library: one forward and one reverse-complement index per
//! reference sequence, addressed by ordinal.

use crate::encode::{MAX_K, extract_both};
use crate::error::{Error, Result};
use crate::index::SequenceIndex;
use crate::source::SequenceSource;

/// Build-time configuration.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    k: usize,
    min_ref_len: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            k: 11,
            min_ref_len: 0,
        }
    }
}

impl BuildConfig {
    /// K-mer length (1..=16).
    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
    /// References shorter than this keep their ordinal but are left unindexed.
    pub fn min_ref_len(mut self, n: usize) -> Self {
        self.min_ref_len = n;
        self
    }

    pub fn kmer_len(&self) -> usize {
        self.k
    }

    /// Reject k outside `1..=16`.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 || self.k > MAX_K {
            return Err(Error::InvalidKmerLength(self.k));
        }
        Ok(())
    }
}

/// One indexed reference.
#[derive(Clone, Debug)]
pub struct Reference {
    pub name: String,
    pub len: usize,
    pub forward: SequenceIndex,
    pub reverse: SequenceIndex,
}

/// Ordered, immutable set of indexed references.
#[derive(Clone, Debug)]
pub struct ReferenceLibrary {
    k: usize,
    refs: Vec<Reference>,
}

impl ReferenceLibrary {
    /// Empty library for `k`.
    pub fn new(k: usize) -> Result<Self> {
        BuildConfig::default().k(k).validate()?;
        Ok(Self {
            k,
            refs: Vec::new(),
        })
    }

    /// K-mer length every index in the library was built with.
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Reference at `ordinal`.
    pub fn get(&self, ordinal: usize) -> Option<&Reference> {
        self.refs.get(ordinal)
    }

    /// Display name of the reference at `ordinal`.
    pub fn name(&self, ordinal: usize) -> Option<&str> {
        self.refs.get(ordinal).map(|r| r.name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.refs.iter().map(|r| r.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
        self.refs.iter()
    }

    /// Index `bases` under the next ordinal and return that ordinal.
    pub fn push(&mut self, name: impl Into<String>, bases: &[u8]) -> usize {
        let seq_id = self.refs.len();
        self.push_reference(name.into(), bases, true);
        seq_id
    }

    fn push_reference(&mut self, name: String, bases: &[u8], index: bool) {
        let seq_id = self.refs.len() as u32;
        let (forward, reverse) = if index {
            // One scan feeds both strands.
            let (fwd, rev) = extract_both(bases, self.k, seq_id);
            (SequenceIndex::from_kmers(fwd), SequenceIndex::from_kmers(rev))
        } else {
            (SequenceIndex::default(), SequenceIndex::default())
        };
        if !index {
            log::warn!(
                "reference #{seq_id} '{name}' ({} bp) is below the minimum length, left unindexed",
                bases.len()
            );
        } else if forward.is_empty() {
            log::warn!(
                "reference #{seq_id} '{name}' ({} bp) has no informative {}-mers",
                bases.len(),
                self.k
            );
        } else {
            log::debug!(
                "indexed reference #{seq_id} '{name}': {} bp, {} forward / {} reverse keys",
                bases.len(),
                forward.len(),
                reverse.len()
            );
        }
        self.refs.push(Reference {
            name,
            len: bases.len(),
            forward,
            reverse,
        });
    }
}

impl<'a> IntoIterator for &'a ReferenceLibrary {
    type Item = &'a Reference;
    type IntoIter = std::slice::Iter<'a, Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.iter()
    }
}

/// Build the library from every record of `source`, in order.
///
/// The source is rewound first. Ordinals follow record order starting at 0.
/// I/O errors from the source abort the build.
pub fn build_library<S: SequenceSource + ?Sized>(
    source: &mut S,
    cfg: &BuildConfig,
) -> Result<ReferenceLibrary> {
    cfg.validate()?;
    let mut lib = ReferenceLibrary::new(cfg.k)?;

    source.rewind()?;
    while let Some(rec) = source.next_record()? {
        let index = rec.bases.len() >= cfg.min_ref_len;
        lib.push_reference(rec.name, &rec.bases, index);
    }

    log::info!(
        "built reference library: {} sequences, k={}",
        lib.len(),
        lib.k
    );
    Ok(lib)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_kmer;
    use crate::source::{MemorySource, SeqRecord};
    use std::io;

    #[test]
    fn ordinals_follow_source_order() {
        let mut src = MemorySource::new(vec![
            SeqRecord::new("L1", "ACGTTGCAAGTC"),
            SeqRecord::new("Alu", "GGCCTTAAGCAT"),
        ]);
        let lib = build_library(&mut src, &BuildConfig::default().k(4)).unwrap();
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.k(), 4);
        assert_eq!(lib.name(0), Some("L1"));
        assert_eq!(lib.name(1), Some("Alu"));
        assert_eq!(lib.name(2), None);

        let key = encode_kmer(b"GGCC").unwrap();
        let alu = lib.get(1).unwrap();
        assert_eq!(alu.forward.origin(key), Some(1));
        assert!(!lib.get(0).unwrap().forward.contains(key));
    }

    #[test]
    fn rewinds_a_partially_read_source() {
        let mut src = MemorySource::new(vec![
            SeqRecord::new("a", "ACGTTGCA"),
            SeqRecord::new("b", "TTGACCAG"),
        ]);
        src.next_record().unwrap();
        let lib = build_library(&mut src, &BuildConfig::default().k(3)).unwrap();
        assert_eq!(lib.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn short_references_keep_their_ordinal() {
        let mut src = MemorySource::new(vec![
            SeqRecord::new("tiny", "ACGTAC"),
            SeqRecord::new("full", "ACGTACGGATCA"),
        ]);
        let cfg = BuildConfig::default().k(3).min_ref_len(10);
        let lib = build_library(&mut src, &cfg).unwrap();
        assert!(lib.get(0).unwrap().forward.is_empty());
        assert!(lib.get(0).unwrap().reverse.is_empty());
        assert!(!lib.get(1).unwrap().forward.is_empty());
        assert_eq!(lib.name(1), Some("full"));
    }

    #[test]
    fn invalid_k_is_rejected() {
        let mut src = MemorySource::default();
        for k in [0, 17] {
            let err = build_library(&mut src, &BuildConfig::default().k(k)).unwrap_err();
            assert!(matches!(err, Error::InvalidKmerLength(got) if got == k));
        }
        assert!(ReferenceLibrary::new(16).is_ok());
    }

    struct Broken;

    impl SequenceSource for Broken {
        fn rewind(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn next_record(&mut self) -> io::Result<Option<SeqRecord>> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated"))
        }
    }

    #[test]
    fn source_errors_propagate() {
        let err = build_library(&mut Broken, &BuildConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn library_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReferenceLibrary>();
    }

    #[test]
    fn indices_match_single_strand_builds() {
        let bases = b"TTGACCGATNACGGATCCATGAAAAAAAGT";
        let mut lib = ReferenceLibrary::new(5).unwrap();
        lib.push("x", bases);
        let r = lib.get(0).unwrap();
        let fwd = SequenceIndex::build(bases, 0, 5, crate::encode::Strand::Forward);
        let rev = SequenceIndex::build(bases, 0, 5, crate::encode::Strand::Reverse);
        assert_eq!(r.forward.len(), fwd.len());
        assert!(fwd.keys().all(|k| r.forward.contains(k)));
        assert_eq!(r.reverse.len(), rev.len());
        assert!(rev.keys().all(|k| r.reverse.contains(k)));
    }

    #[test]
    fn push_assigns_next_ordinal() {
        let mut lib = ReferenceLibrary::new(5).unwrap();
        assert_eq!(lib.push("x", b"ACGTTGCAAG"), 0);
        assert_eq!(lib.push("y", b"TTGACCAGTA"), 1);
        assert_eq!(lib.iter().count(), 2);
    }
}
