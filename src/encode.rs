//! K-mer encoding: 2-bit mapping, rolling reverse complement, homopolymer filter.
//!
//! Conventions
//! - Keys are **LSB-aligned**: the lower `2k` bits hold the window, the most
//!   recent base sits in the lowest two bits, higher bits are zero.
//! - `k` is limited to `1..=16` so a key always fits a `u32`.
//! - Only upper-case `A/C/G/T` are valid. Anything else (soft-masked bases,
//!   `N`, gaps, IUPAC codes) breaks the current window.

/// Largest supported k-mer length.
pub const MAX_K: usize = 16;

/// Value stored in [`BASE_LUT`] for bytes that are not `A/C/G/T`.
pub const AMBIGUOUS: u8 = 4;

/// 256-entry LUT: ASCII → 2-bit (A=0, C=1, G=2, T=3), [`AMBIGUOUS`] otherwise.
pub static BASE_LUT: [u8; 256] = {
    let mut t = [AMBIGUOUS; 256];
    t[b'A' as usize] = 0;
    t[b'C' as usize] = 1;
    t[b'G' as usize] = 2;
    t[b'T' as usize] = 3;
    t
};

/// 2-bit encoding via LUT. `None` if ambiguous.
#[inline]
pub fn map_base(b: u8) -> Option<u8> {
    let v = BASE_LUT[b as usize];
    if v < AMBIGUOUS { Some(v) } else { None }
}

/// Strand a key was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strand {
    /// Window as it appears in the sequence.
    Forward,
    /// Reverse complement of the window.
    Reverse,
}

/// Packed k-mer record: 2-bit key plus the ordinal of the sequence it came from.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub struct Kmer {
    /// LSB-aligned key, lower `2k` bits used.
    pub key: u32,
    /// Ordinal of the originating sequence.
    pub origin: u32,
}

/// Mask covering the lower `2k` bits.
#[inline]
pub fn key_mask(k: usize) -> u32 {
    if k >= MAX_K {
        u32::MAX
    } else {
        (1u32 << (2 * k)) - 1
    }
}

#[inline]
fn check_k(k: usize) {
    assert!((1..=MAX_K).contains(&k), "k must be 1..=16, got {k}");
}

/// True iff all `k` 2-bit fields of `key` hold the same base (AAAA…, CCCC…, …).
#[inline]
pub fn is_low_complexity(key: u32, k: usize) -> bool {
    // 0x5555_5555 repeats `01` in every field; multiplying by the lowest base
    // replicates it across the whole word.
    let homopolymer = (key & 0b11).wrapping_mul(0x5555_5555) & key_mask(k);
    key == homopolymer
}

/// Encode a window to an **LSB-aligned** key. `None` if `k>16`, empty, or ambiguous.
#[inline]
pub fn encode_kmer(window: &[u8]) -> Option<u32> {
    let k = window.len();
    if k == 0 || k > MAX_K {
        return None;
    }
    let mut code: u32 = 0;
    for &b in window {
        code = (code << 2) | map_base(b)? as u32;
    }
    Some(code)
}

/// Reverse-complement an **LSB-aligned** key (lower `2k` bits used).
#[inline]
pub fn revcomp_key(key: u32, k: usize) -> u32 {
    debug_assert!(k <= MAX_K);
    let mut rc: u32 = 0;
    for i in 0..k {
        let comp = ((key >> (i * 2)) & 0b11) ^ 0b11;
        rc |= comp << ((k - 1 - i) * 2);
    }
    rc
}

/// Reverse complement of a base sequence. Ambiguous bytes become `N`.
pub fn reverse_complement(bases: &[u8]) -> Vec<u8> {
    bases
        .iter()
        .rev()
        .map(|&b| match map_base(b) {
            Some(v) => b"TGCA"[v as usize],
            None => b'N',
        })
        .collect()
}

/// One complete window seen by [`KmerScan`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    /// Index of the last base of the window.
    pub end: usize,
    /// Forward key.
    pub fwd: u32,
    /// Reverse-complement key of the same window.
    pub rc: u32,
}

/// Rolling scan over a sequence with a forward and a reverse-complement
/// accumulator updated in O(1) per base. Yields every complete window
/// (stride 1); an ambiguous base restarts accumulation.
pub struct KmerScan<'a> {
    seq: &'a [u8],
    i: usize,
    k: usize,
    mask: u32,
    shift: u32,
    fwd: u32,
    rc: u32,
    len: usize,
}

impl<'a> KmerScan<'a> {
    /// Panics if `k` is outside `1..=16`.
    pub fn new(seq: &'a [u8], k: usize) -> Self {
        check_k(k);
        Self {
            seq,
            i: 0,
            k,
            mask: key_mask(k),
            shift: 2 * (k as u32 - 1),
            fwd: 0,
            rc: 0,
            len: 0,
        }
    }
}

impl Iterator for KmerScan<'_> {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        while self.i < self.seq.len() {
            let i = self.i;
            self.i += 1;
            let Some(v) = map_base(self.seq[i]) else {
                self.fwd = 0;
                self.rc = 0;
                self.len = 0;
                continue;
            };
            let v = v as u32;
            self.fwd = ((self.fwd << 2) | v) & self.mask;
            self.rc = (self.rc >> 2) | ((v ^ 0b11) << self.shift);
            self.len += 1;
            if self.len >= self.k {
                return Some(Window {
                    end: i,
                    fwd: self.fwd,
                    rc: self.rc,
                });
            }
        }
        None
    }
}

/// Overlapping (stride 1) k-mers of one strand, tagged with `origin`.
/// Low-complexity keys are dropped.
pub fn extract_overlapping(bases: &[u8], k: usize, origin: u32, strand: Strand) -> Vec<Kmer> {
    check_k(k);
    let mut out = Vec::with_capacity(bases.len().saturating_sub(k - 1));
    for w in KmerScan::new(bases, k) {
        let key = match strand {
            Strand::Forward => w.fwd,
            Strand::Reverse => w.rc,
        };
        if !is_low_complexity(key, k) {
            out.push(Kmer { key, origin });
        }
    }
    out
}

/// Both strands from a single scan: `(forward, reverse_complement)`.
pub fn extract_both(bases: &[u8], k: usize, origin: u32) -> (Vec<Kmer>, Vec<Kmer>) {
    check_k(k);
    let cap = bases.len().saturating_sub(k - 1);
    let mut fwd = Vec::with_capacity(cap);
    let mut rev = Vec::with_capacity(cap);
    for w in KmerScan::new(bases, k) {
        // A homopolymer's reverse complement is a homopolymer, the filter
        // agrees on both keys.
        if is_low_complexity(w.fwd, k) {
            continue;
        }
        fwd.push(Kmer { key: w.fwd, origin });
        rev.push(Kmer { key: w.rc, origin });
    }
    (fwd, rev)
}

/// Non-overlapping forward k-mers: a key is emitted each time `k` consecutive
/// valid bases have accumulated, then the counter restarts. Ambiguous bases
/// restart it too, so partial windows never straddle a gap.
pub fn extract_sampled(bases: &[u8], k: usize, origin: u32) -> Vec<Kmer> {
    check_k(k);
    let mut out = Vec::with_capacity(bases.len() / k + 1);
    extract_sampled_into(bases, k, origin, &mut out);
    out
}

/// Like [`extract_sampled`], but fills a caller-owned buffer (cleared first).
pub fn extract_sampled_into(bases: &[u8], k: usize, origin: u32, out: &mut Vec<Kmer>) {
    check_k(k);
    out.clear();
    let mask = key_mask(k);
    let mut key: u32 = 0;
    let mut len = 0usize;
    for &b in bases {
        let Some(v) = map_base(b) else {
            len = 0;
            continue;
        };
        key = ((key << 2) | v as u32) & mask;
        len += 1;
        if len == k {
            if !is_low_complexity(key, k) {
                out.push(Kmer { key, origin });
            }
            len = 0;
        }
    }
}
