//! LSD radix sort for [`Kmer`] records keyed by their 32-bit `key`.
//! 8-bit passes, 4 rounds. Stable via counting + prefix sums, so equal keys
//! keep their input order and the `origin` always travels with its key.

use crate::encode::Kmer;

/// Sort `kmers` ascending by key.
/// One scratch buffer is allocated and ping-ponged across passes.
pub fn radix_sort_kmers(kmers: &mut [Kmer]) {
    let n = kmers.len();
    if n <= 1 {
        return;
    }

    let mut tmp = vec![Kmer::default(); n];
    // Which buffer currently holds the data.
    let mut in_tmp = false;

    for pass in 0..4 {
        let shift = pass * 8;
        let (src, dst): (&[Kmer], &mut [Kmer]) = if in_tmp {
            (tmp.as_slice(), &mut *kmers)
        } else {
            (&*kmers, tmp.as_mut_slice())
        };

        let mut counts = [0usize; 256];
        for m in src.iter() {
            counts[((m.key >> shift) & 0xFF) as usize] += 1;
        }
        // Constant byte: this pass would not move anything.
        if counts.iter().any(|&c| c == n) {
            continue;
        }

        // Prefix sums -> positions
        let mut sum = 0usize;
        for c in counts.iter_mut() {
            let n_b = *c;
            *c = sum;
            sum += n_b;
        }

        // Scatter (stable)
        for m in src.iter() {
            let b = ((m.key >> shift) & 0xFF) as usize;
            dst[counts[b]] = *m;
            counts[b] += 1;
        }
        in_tmp = !in_tmp;
    }

    if in_tmp {
        kmers.copy_from_slice(&tmp);
    }
}
