//! LSF MSVQ quantization for 600 b/s super-frames (STANAG 4591 §4.5.2).
//!
//! Two independent M-best searches run on 20-dimensional vectors: frames
//! {0,1} concatenated, and frames {2,3} concatenated. Stage count and pool
//! are selected by `mode600` via [`crate::codebooks::lsf600::pool_for_mode`].

use crate::codebooks::lsf600::{self, PoolKind};
use crate::codebooks::msvq;
use crate::constants::{L_SHIFT_ST1, L_SHIFT_STN, LPC_ORD, MBEST_LSF_600};
use crate::fxmath::{l_shl, l_shr, saturate};
use crate::frame::{enforce_lsf_bounds, FrameModel};

/// Per-stage bit widths for a pool (all stage sizes are powers of two).
pub fn stage_bit_widths(kind: PoolKind) -> Vec<u8> {
    let pool = kind.pool();
    pool.iter().map(|stage| (stage.len() as u32).trailing_zeros() as u8).collect()
}

/// Quantizes one LSF pair (two concatenated 10-dim LSF vectors) against
/// the pool selected for `(mode, pair)`.
///
/// Per spec.md §4.5.2, stage 1 searches `(input − mean) << L_SHIFT_ST1`
/// (the pool's mean vector, §4.5.2's "stage mean vector"); its residual is
/// brought back to the unshifted domain and re-shifted by `L_SHIFT_STN`
/// for the remaining stages to search, mirroring `var600_msvq.c` /
/// `cst600_msvq.h`'s two-domain scaling.
pub fn quantize_pair(mode: u8, pair: usize, a: &[i16; LPC_ORD], b: &[i16; LPC_ORD]) -> Vec<u16> {
    let kind = lsf600::pool_for_mode(mode, pair);
    let pool = kind.pool();
    let mean = kind.mean();
    let target: Vec<i16> = a.iter().chain(b.iter()).copied().collect();

    let centered: Vec<i16> =
        target.iter().zip(mean.iter()).map(|(&t, &m)| saturate(l_shl(t as i32 - m as i32, L_SHIFT_ST1))).collect();
    let weights = vec![1i32; centered.len()];
    let stage1 = msvq::search(&centered, &weights, &pool[..1], MBEST_LSF_600);

    let residual_st1: Vec<i32> =
        centered.iter().zip(stage1.reconstructed.iter()).map(|(&c, &r)| c as i32 - r).collect();
    let stage_n_target: Vec<i16> =
        residual_st1.iter().map(|&r| saturate(l_shl(l_shr(r, L_SHIFT_ST1), L_SHIFT_STN))).collect();

    let mut indices = stage1.indices;
    if pool.len() > 1 {
        let later = msvq::search(&stage_n_target, &weights, &pool[1..], MBEST_LSF_600);
        indices.extend(later.indices);
    }
    indices
}

/// Reconstructs one LSF pair from its MSVQ indices, returning two separate
/// 10-dim, bound-enforced LSF vectors. Undoes the stage-1/later-stage
/// domain shifts and adds the mean vector back, mirroring
/// [`quantize_pair`].
pub fn dequantize_pair(mode: u8, pair: usize, indices: &[u16]) -> ([i16; LPC_ORD], [i16; LPC_ORD]) {
    let kind = lsf600::pool_for_mode(mode, pair);
    let pool = kind.pool();
    let mean = kind.mean();

    let stage1_recon = msvq::reconstruct(&indices[..1], &pool[..1]);
    let later_recon = if indices.len() > 1 && pool.len() > 1 {
        msvq::reconstruct(&indices[1..], &pool[1..])
    } else {
        vec![0i32; stage1_recon.len()]
    };

    let dim = stage1_recon.len();
    let mut combined = vec![0i16; dim];
    for i in 0..dim {
        let from_st1 = l_shr(stage1_recon[i], L_SHIFT_ST1);
        let from_stn = l_shr(later_recon[i], L_SHIFT_STN);
        combined[i] = saturate(mean[i] as i32 + from_st1 + from_stn);
    }

    let mut a = [0i16; LPC_ORD];
    let mut b = [0i16; LPC_ORD];
    a.copy_from_slice(&combined[..LPC_ORD]);
    b.copy_from_slice(&combined[LPC_ORD..]);
    enforce_lsf_bounds(&mut a);
    enforce_lsf_bounds(&mut b);
    (a, b)
}

/// Quantizes both LSF pairs of a super-frame, returning the per-pair
/// indices padded to 4 stages (unused trailing slots are 0).
pub fn quantize_super_frame(mode: u8, frames: &[FrameModel; 4]) -> [[u8; 4]; 2] {
    let mut out = [[0u8; 4]; 2];
    for (pair, out_slot) in out.iter_mut().enumerate() {
        let indices = quantize_pair(mode, pair, &frames[pair * 2].lsf, &frames[pair * 2 + 1].lsf);
        for (dst, &src) in out_slot.iter_mut().zip(indices.iter()) {
            *dst = src as u8;
        }
    }
    out
}

/// Reconstructs all 4 frames' LSFs from a super-frame's packed indices.
pub fn dequantize_super_frame(mode: u8, lsf_iq: &[[u8; 4]; 2]) -> [[i16; LPC_ORD]; 4] {
    let mut out = [[0i16; LPC_ORD]; 4];
    for pair in 0..2 {
        let n_stages = stage_bit_widths(lsf600::pool_for_mode(mode, pair)).len();
        let indices: Vec<u16> = lsf_iq[pair][..n_stages].iter().map(|&i| i as u16).collect();
        let (a, b) = dequantize_pair(mode, pair, &indices);
        out[pair * 2] = a;
        out[pair * 2 + 1] = b;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_widths_sum_matches_mode_table() {
        for mode in 0..crate::constants::NMODE600 {
            let total: u32 = (0..2)
                .map(|pair| stage_bit_widths(lsf600::pool_for_mode(mode as u8, pair)).iter().map(|&w| w as u32).sum::<u32>())
                .sum();
            let expected: u32 = crate::constants::MODE600_LSF_STAGE_BITS[mode].iter().map(|&w| w as u32).sum();
            assert_eq!(total, expected, "mode {mode}");
        }
    }

    #[test]
    fn quantize_dequantize_round_trip_is_well_formed() {
        let frames = [
            FrameModel::silence(),
            FrameModel::silence(),
            FrameModel::silence(),
            FrameModel::silence(),
        ];
        for mode in 0..crate::constants::NMODE600 as u8 {
            let packed = quantize_super_frame(mode, &frames);
            let lsfs = dequantize_super_frame(mode, &packed);
            for lsf in lsfs.iter() {
                for i in 0..LPC_ORD - 1 {
                    assert!(lsf[i + 1] - lsf[i] >= crate::constants::BWMIN_Q15);
                }
            }
        }
    }
}
