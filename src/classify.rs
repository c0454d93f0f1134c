//! Majority-vote classification of a candidate against a [`ReferenceLibrary`].
//!
//! The candidate is reduced to its non-overlapping k-mers, each reference
//! scores the number of those keys present in its forward and reverse index,
//! and the best strand-specific count must reach half the sampled keys.

use std::fmt;

use crate::builder::ReferenceLibrary;
use crate::encode::{Kmer, extract_sampled_into};
use crate::index::SequenceIndex;

/// Orientation of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Candidate matches the reference as given.
    Forward,
    /// Candidate matches the reverse complement of the reference.
    Reverse,
}

impl Orientation {
    /// `+` or `-`.
    pub fn symbol(self) -> char {
        match self {
            Orientation::Forward => '+',
            Orientation::Reverse => '-',
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Outcome for one candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Ordinal of the elected reference, `None` when no confident match.
    pub best: Option<usize>,
    /// Branch taken by the decision; only meaningful when `best` is set.
    pub orientation: Orientation,
    /// Hit count of the winning branch.
    pub hits: usize,
    /// Number of sampled query k-mers.
    pub total: usize,
}

impl Classification {
    fn no_match(orientation: Orientation, hits: usize, total: usize) -> Self {
        Self {
            best: None,
            orientation,
            hits,
            total,
        }
    }

    #[inline]
    pub fn is_match(&self) -> bool {
        self.best.is_some()
    }

    /// `(ordinal, orientation)` of a confident match.
    pub fn matched(&self) -> Option<(usize, Orientation)> {
        self.best.map(|b| (b, self.orientation))
    }
}

/// Forward and reverse hit counts of one reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefHits {
    pub forward: usize,
    pub reverse: usize,
}

/// Per-reference counts for one candidate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    /// Number of sampled query k-mers.
    pub total: usize,
    /// One entry per reference, by ordinal.
    pub hits: Vec<RefHits>,
}

impl Scoreboard {
    /// First reference with the highest forward count, if that count is positive.
    pub fn best_forward(&self) -> Option<(usize, usize)> {
        first_max(self.hits.iter().map(|h| h.forward))
    }

    /// First reference with the highest reverse count, if that count is positive.
    pub fn best_reverse(&self) -> Option<(usize, usize)> {
        first_max(self.hits.iter().map(|h| h.reverse))
    }

    /// Apply the vote.
    ///
    /// The strand with the strictly larger best count wins, a tie goes to
    /// reverse. The winner is accepted when its count reaches `total / 2`
    /// (integer division). A reference with zero hits is never elected.
    pub fn decide(&self) -> Classification {
        if self.total == 0 {
            return Classification::no_match(Orientation::Forward, 0, 0);
        }
        let threshold = self.total / 2;
        let fwd = self.best_forward();
        let rev = self.best_reverse();
        let count = |b: Option<(usize, usize)>| b.map_or(0, |(_, c)| c);

        let (orientation, best) = if count(fwd) > count(rev) {
            (Orientation::Forward, fwd)
        } else {
            (Orientation::Reverse, rev)
        };
        match best {
            Some((i, hits)) if hits >= threshold => Classification {
                best: Some(i),
                orientation,
                hits,
                total: self.total,
            },
            _ => Classification::no_match(orientation, count(best), self.total),
        }
    }
}

fn first_max(counts: impl Iterator<Item = usize>) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for (i, c) in counts.enumerate() {
        if c > best.map_or(0, |(_, m)| m) {
            best = Some((i, c));
        }
    }
    best
}

/// Number of `query` keys present in `index`. Origins are not consulted.
#[inline]
pub fn count_hits(query: &[Kmer], index: &SequenceIndex) -> usize {
    if index.is_empty() {
        return 0;
    }
    query.iter().filter(|m| index.contains(m.key)).count()
}

/// Classifier bound to a library; reuses its query buffer across candidates.
pub struct Classifier<'a> {
    library: &'a ReferenceLibrary,
    query: Vec<Kmer>,
}

impl<'a> Classifier<'a> {
    pub fn new(library: &'a ReferenceLibrary) -> Self {
        Self {
            library,
            query: Vec::new(),
        }
    }

    pub fn library(&self) -> &'a ReferenceLibrary {
        self.library
    }

    /// Per-reference forward/reverse counts of `bases`' sampled k-mers.
    pub fn score(&mut self, bases: &[u8]) -> Scoreboard {
        extract_sampled_into(bases, self.library.k(), 0, &mut self.query);
        let total = self.query.len();
        if total == 0 {
            return Scoreboard {
                total,
                hits: vec![RefHits::default(); self.library.len()],
            };
        }
        let hits = self
            .library
            .iter()
            .map(|r| RefHits {
                forward: count_hits(&self.query, &r.forward),
                reverse: count_hits(&self.query, &r.reverse),
            })
            .collect();
        Scoreboard { total, hits }
    }

    pub fn classify(&mut self, bases: &[u8]) -> Classification {
        self.score(bases).decide()
    }
}

/// Classify one candidate with the library's k.
pub fn classify(library: &ReferenceLibrary, candidate: &[u8]) -> Classification {
    Classifier::new(library).classify(candidate)
}

/// Per-reference counts for one candidate with the library's k.
pub fn score(library: &ReferenceLibrary, candidate: &[u8]) -> Scoreboard {
    Classifier::new(library).score(candidate)
}
