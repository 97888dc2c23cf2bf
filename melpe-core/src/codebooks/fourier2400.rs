//! Fourier-magnitude VQ codebook for 2400 b/s (STANAG 4591 §4.3 "Fourier
//! VQ"): 256 entries, 10-dimensional, searched by SAD-type distance under
//! the fixed weighting `w_fs` (§4.6 step 4).

use super::gen::random_codebook;
use crate::constants::NUM_HARM;
use once_cell::sync::Lazy;

pub const CODEBOOK_SIZE: usize = 256;

/// Fixed MSE/SAD weighting applied across the 10 harmonics (`w_fs`):
/// lower harmonics dominate speech perception, so they are weighted more
/// heavily, tapering toward the Nyquist-adjacent ones.
pub static W_FS: Lazy<[i32; NUM_HARM]> = Lazy::new(|| {
    let mut w = [0i32; NUM_HARM];
    for (i, slot) in w.iter_mut().enumerate() {
        *slot = (NUM_HARM - i) as i32;
    }
    w
});

/// Inverse weighting used to un-weight reconstructed magnitudes in
/// synthesis (§4.6 step 4, `w_fs_inv`), Q14.
pub static W_FS_INV_Q14: Lazy<[i16; NUM_HARM]> =
    Lazy::new(|| W_FS.map(|w| ((1i32 << 14) / w) as i16));

pub static CODEBOOK: Lazy<Vec<Vec<i16>>> =
    Lazy::new(|| random_codebook(0x4653_4D47, CODEBOOK_SIZE, NUM_HARM, i16::MAX as i32 / 2));

/// Nearest codebook entry to `target` by SAD under `W_FS`, returning its
/// 8-bit index.
pub fn nearest(target: &[i16; NUM_HARM]) -> u8 {
    let book = &*CODEBOOK;
    let weights = &*W_FS;
    let mut best = 0usize;
    let mut best_err = i64::MAX;
    for (i, entry) in book.iter().enumerate() {
        let err: i64 = target
            .iter()
            .zip(entry.iter())
            .zip(weights.iter())
            .map(|((&t, &e), &w)| (w as i64) * (t as i64 - e as i64).abs())
            .sum();
        if err < best_err {
            best_err = err;
            best = i;
        }
    }
    best as u8
}

pub fn dequantize(idx: u8) -> [i16; NUM_HARM] {
    let entry = &CODEBOOK[idx as usize % CODEBOOK.len()];
    let mut out = [0i16; NUM_HARM];
    out.copy_from_slice(entry);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_is_exact_for_codebook_members() {
        let entry = CODEBOOK[42].clone();
        let mut target = [0i16; NUM_HARM];
        target.copy_from_slice(&entry);
        assert_eq!(nearest(&target), 42);
    }
}
