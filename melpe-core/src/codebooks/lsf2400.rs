//! LSF MSVQ pool for 2400 b/s (STANAG 4591 §4.3 "MSVQ (LSFs)").
//!
//! Four residual stages, `7/6/6/6` bits (128/64/64/64 entries), each a
//! 10-dimensional codeword in the same Q15 domain as [`crate::frame::FrameModel::lsf`].

use super::gen::random_monotone_codebook;
use crate::constants::{BWMIN_Q15, LPC_ORD};
use once_cell::sync::Lazy;

/// Stage sizes matching [`crate::constants::LSF_MSVQ_STAGE_BITS_2400`].
pub const STAGE_SIZES: [usize; 4] = [128, 64, 64, 64];

pub static STAGES: Lazy<Vec<Vec<Vec<i16>>>> = Lazy::new(|| {
    STAGE_SIZES
        .iter()
        .enumerate()
        .map(|(stage, &levels)| {
            let spread = if stage == 0 { i16::MAX / 2 } else { i16::MAX / (8 << stage) };
            random_monotone_codebook(
                0x4C53_4600u32.wrapping_add(stage as u32),
                levels,
                LPC_ORD,
                BWMIN_Q15 / 4,
                spread,
            )
        })
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_shapes_match_bit_allocation() {
        for (stage, &levels) in STAGE_SIZES.iter().enumerate() {
            assert_eq!(STAGES[stage].len(), levels);
            assert_eq!(STAGES[stage][0].len(), LPC_ORD);
        }
    }
}
