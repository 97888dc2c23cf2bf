//! Gain MSVQ/VQ pools for 600 b/s (STANAG 4591 §4.5.3, cst600_gain.h).
//!
//! A super-frame's 8 sub-frame gains (`NF600 * NUM_GAINFR`) are quantized
//! as one vector, using one of three pools selected by `ICBKGAIN[mode600]`:
//! a 2-stage `(128, 64)` MSVQ, a 2-stage `(64, 32)` MSVQ, or a single-stage
//! 512-entry VQ.

use super::gen::random_codebook;
use crate::constants::{GAIN_MAX_DB_Q8, GAIN_MIN_DB_Q8, NF600, NUM_GAINFR};
use once_cell::sync::Lazy;

/// Dimension of one super-frame's gain vector.
pub const GAIN_DIM: usize = NF600 * NUM_GAINFR;

fn build(seed: u32, levels: usize) -> Vec<Vec<i16>> {
    let spread = ((GAIN_MAX_DB_Q8 - GAIN_MIN_DB_Q8) / 2) as i32;
    random_codebook(seed, levels, GAIN_DIM, spread)
}

/// `MSVQ(7, 6)`: stage sizes 128, 64 (`ICBKGAIN == 0`).
pub static MSVQ_128_64: Lazy<[Vec<Vec<i16>>; 2]> =
    Lazy::new(|| [build(0x4741_494E, 128), build(0x4741_494F, 64)]);
/// `MSVQ(6, 5)`: stage sizes 64, 32 (`ICBKGAIN == 1`).
pub static MSVQ_64_32: Lazy<[Vec<Vec<i16>>; 2]> =
    Lazy::new(|| [build(0x4741_4950, 64), build(0x4741_4951, 32)]);
/// `VQ(9)`: single stage, 512 entries (`ICBKGAIN == 2`, mode 5 only).
pub static VQ_512: Lazy<Vec<Vec<i16>>> = Lazy::new(|| build(0x4741_4952, 512));
