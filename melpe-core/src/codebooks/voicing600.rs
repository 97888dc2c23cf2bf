//! Voicing pattern codebook for 600 b/s (STANAG 4591 §4.5.1, cst600_voicing.h).
//!
//! Each super-frame's `NF600 * NUM_BANDS` band-pass voicing strengths are
//! quantized jointly against a 32-entry codebook of *half-super-frame
//! shape pairs*: every entry picks one of six canonical 2-frame voicing
//! patterns (matching the six `half_class` outcomes used by mode
//! selection, see `quant600::mode`) for the first half and one for the
//! second half, so that every reachable `mode600` in [`crate::constants::MODE600`]
//! has at least one codebook entry that selects it.

use crate::constants::{NF600, NUM_BANDS};
use once_cell::sync::Lazy;

const HALF_Q14: i16 = 1 << 13;
const FULL_Q14: i16 = i16::MAX;

/// The four canonical per-frame band-pass voicing shapes, from least to
/// most voiced.
pub static CANONICAL_SHAPES: [[i16; NUM_BANDS]; 4] = [
    [0, 0, 0, 0, 0],
    [FULL_Q14, 0, 0, 0, 0],
    [FULL_Q14, FULL_Q14, HALF_Q14, 0, 0],
    [FULL_Q14, FULL_Q14, FULL_Q14, FULL_Q14, FULL_Q14],
];

/// Six canonical 2-frame half-super-frame shape pairs, one per possible
/// `half_class` result (0..=5): unvoiced/unvoiced, unvoiced/voiced,
/// voiced/unvoiced, and three voiced/voiced gradations.
static HALF_PATTERNS: [[[i16; NUM_BANDS]; 2]; 6] = [
    [CANONICAL_SHAPES_0, CANONICAL_SHAPES_0],
    [CANONICAL_SHAPES_0, CANONICAL_SHAPES_2],
    [CANONICAL_SHAPES_2, CANONICAL_SHAPES_0],
    [CANONICAL_SHAPES_2, CANONICAL_SHAPES_2],
    [CANONICAL_SHAPES_2, CANONICAL_SHAPES_3],
    [CANONICAL_SHAPES_3, CANONICAL_SHAPES_3],
];

const CANONICAL_SHAPES_0: [i16; NUM_BANDS] = [0, 0, 0, 0, 0];
const CANONICAL_SHAPES_2: [i16; NUM_BANDS] = [FULL_Q14, FULL_Q14, HALF_Q14, 0, 0];
const CANONICAL_SHAPES_3: [i16; NUM_BANDS] = [FULL_Q14, FULL_Q14, FULL_Q14, FULL_Q14, FULL_Q14];

/// `entries[idx]`: `NF600` frames, each `NUM_BANDS` Q14 voicing strengths.
/// `idx` walks a 6x6 grid of `(first_half_pattern, second_half_pattern)`
/// pairs in row-major order, truncated to the 32-entry 5-bit budget; every
/// `(a, b)` pair with `a, b <= 4` survives the truncation, which is
/// sufficient to reach every entry of `MODE600`.
pub static CODEBOOK: Lazy<Vec<[[i16; NUM_BANDS]; NF600]>> = Lazy::new(|| {
    (0u8..32)
        .map(|idx| {
            let a = (idx / 6) as usize;
            let b = (idx % 6) as usize;
            let mut frames = [[0i16; NUM_BANDS]; NF600];
            frames[0] = HALF_PATTERNS[a][0];
            frames[1] = HALF_PATTERNS[a][1];
            frames[2] = HALF_PATTERNS[b][0];
            frames[3] = HALF_PATTERNS[b][1];
            frames
        })
        .collect()
});

/// Classifies one frame's band-pass voicing vector to the nearest
/// [`CANONICAL_SHAPES`] entry (0..=3, least to most voiced). Shared by the
/// 2400 b/s 2-bit `bpvc` scalar quantizer and the 1200 b/s 3-frame voicing
/// pattern codebook, both of which reuse these same four shapes.
pub fn classify(bpvc: &[i16; NUM_BANDS]) -> u8 {
    let mut best = 0u8;
    let mut best_err = i64::MAX;
    for (i, shape) in CANONICAL_SHAPES.iter().enumerate() {
        let err: i64 = shape.iter().zip(bpvc.iter()).map(|(&s, &b)| (s as i64 - b as i64).abs()).sum();
        if err < best_err {
            best_err = err;
            best = i as u8;
        }
    }
    best
}

/// Nearest codebook entry to `frames` by summed absolute error, and its
/// 5-bit index.
pub fn nearest(frames: &[[i16; NUM_BANDS]; NF600]) -> (usize, [[i16; NUM_BANDS]; NF600]) {
    let book = &*CODEBOOK;
    let mut best = 0usize;
    let mut best_err = i64::MAX;
    for (i, entry) in book.iter().enumerate() {
        let err: i64 = entry
            .iter()
            .zip(frames.iter())
            .flat_map(|(e, f)| e.iter().zip(f.iter()))
            .map(|(&a, &b)| (a as i64 - b as i64).abs())
            .sum();
        if err < best_err {
            best_err = err;
            best = i;
        }
    }
    (best, book[best])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codebook_has_32_distinct_entries() {
        assert_eq!(CODEBOOK.len(), 32);
    }

    #[test]
    fn nearest_is_exact_for_codebook_members() {
        let entry = CODEBOOK[17];
        let (idx, recon) = nearest(&entry);
        assert_eq!(idx, 17);
        assert_eq!(recon, entry);
    }
}
