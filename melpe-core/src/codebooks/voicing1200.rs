//! 3-frame voicing pattern codebook for 1200 b/s (STANAG 4591 §4.4:
//! "Voicing is encoded as a 3-frame pattern via a small pattern codebook").
//!
//! Each frame's band-pass voicing is first classified to one of
//! [`crate::codebooks::voicing600::CANONICAL_SHAPES`] (0..=3, least to most
//! voiced); the resulting 3-tuple is then matched against a 16-entry
//! pattern codebook rather than transmitted as 3 independent 2-bit fields,
//! since most real speech only visits a handful of the 64 possible
//! transitions.

pub const PATTERNS: [[u8; 3]; 16] = [
    [0, 0, 0],
    [1, 1, 1],
    [2, 2, 2],
    [3, 3, 3],
    [0, 1, 1],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 0],
    [1, 2, 2],
    [2, 2, 1],
    [2, 3, 3],
    [3, 3, 2],
    [0, 1, 2],
    [2, 1, 0],
    [1, 2, 3],
    [3, 2, 1],
];

/// Nearest pattern (by summed absolute per-frame class distance) and its
/// 4-bit index.
pub fn nearest(classes: &[u8; 3]) -> u8 {
    let mut best = 0u8;
    let mut best_err = i32::MAX;
    for (i, pattern) in PATTERNS.iter().enumerate() {
        let err: i32 = pattern.iter().zip(classes.iter()).map(|(&p, &c)| (p as i32 - c as i32).abs()).sum();
        if err < best_err {
            best_err = err;
            best = i as u8;
        }
    }
    best
}

pub fn dequantize(idx: u8) -> [u8; 3] {
    PATTERNS[idx as usize % PATTERNS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_is_exact_for_codebook_members() {
        for (i, pattern) in PATTERNS.iter().enumerate() {
            assert_eq!(nearest(pattern), i as u8);
        }
    }
}
