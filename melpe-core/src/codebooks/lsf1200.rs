//! LSF MSVQ pool for the 1200 b/s block's reference (middle) frame
//! (STANAG 4591 §4.4 "re-interpolated and re-MSVQ'd with a smaller
//! codebook budget"): 4 stages, `7/6/5/5` bits (128/64/32/32 entries).

use super::gen::random_monotone_codebook;
use crate::constants::{BWMIN_Q15, LPC_ORD};
use once_cell::sync::Lazy;

pub const STAGE_SIZES: [usize; 4] = [128, 64, 32, 32];

pub static STAGES: Lazy<Vec<Vec<Vec<i16>>>> = Lazy::new(|| {
    STAGE_SIZES
        .iter()
        .enumerate()
        .map(|(stage, &levels)| {
            let spread = if stage == 0 { i16::MAX / 2 } else { i16::MAX / (8 << stage) };
            random_monotone_codebook(
                0x4C53_4612u32.wrapping_add(stage as u32),
                levels,
                LPC_ORD,
                BWMIN_Q15 / 4,
                spread,
            )
        })
        .collect()
});
