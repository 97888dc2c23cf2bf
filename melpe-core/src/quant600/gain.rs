//! Gain quantization for 600 b/s super-frames (STANAG 4591 §4.5.4).
//!
//! The super-frame's 8 sub-frame gains (`NF600 * NUM_GAINFR`) are
//! quantized as one vector against a mode-selected pool: `MSVQ(7,6)` for
//! modes 0-1, `MSVQ(6,5)` for modes 2-4, `VQ(9)` for mode 5.

use crate::codebooks::gain600::{GAIN_DIM, MSVQ_128_64, MSVQ_64_32, VQ_512};
use crate::codebooks::msvq;
use crate::constants::{ICBKGAIN, MBEST_GAIN_600, NF600, NUM_GAINFR};
use crate::frame::FrameModel;

/// Which pool `ICBKGAIN[mode]` selects.
fn pools(mode: u8) -> Vec<Vec<Vec<i16>>> {
    match ICBKGAIN[mode as usize] {
        0 => MSVQ_128_64.to_vec(),
        1 => MSVQ_64_32.to_vec(),
        _ => vec![VQ_512.clone()],
    }
}

fn gain_vector(frames: &[FrameModel; NF600]) -> Vec<i16> {
    frames.iter().flat_map(|f| f.gain).collect()
}

/// Encodes the super-frame's 8-entry gain vector for `mode`.
pub fn quantize(mode: u8, frames: &[FrameModel; NF600]) -> [u16; 2] {
    let target = gain_vector(frames);
    debug_assert_eq!(target.len(), GAIN_DIM);
    let weights = vec![1i32; GAIN_DIM];
    let stages = pools(mode);
    let result = msvq::search(&target, &weights, &stages, MBEST_GAIN_600);
    let mut out = [0u16; 2];
    for (dst, &src) in out.iter_mut().zip(result.indices.iter()) {
        *dst = src;
    }
    out
}

/// Reconstructs the 8 sub-frame gains for `mode`, clamped into range.
pub fn dequantize(mode: u8, gain_iq: &[u16; 2]) -> [i16; NF600 * NUM_GAINFR] {
    let stages = pools(mode);
    let indices: Vec<u16> = gain_iq[..stages.len()].to_vec();
    let reconstructed = msvq::reconstruct(&indices, &stages);
    let mut out = [0i16; NF600 * NUM_GAINFR];
    for (dst, &src) in out.iter_mut().zip(reconstructed.iter()) {
        *dst = src.clamp(
            crate::constants::GAIN_MIN_DB_Q8 as i32,
            crate::constants::GAIN_MAX_DB_Q8 as i32,
        ) as i16;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_in_range_for_every_mode() {
        let frames = [
            FrameModel::silence(),
            FrameModel::silence(),
            FrameModel::silence(),
            FrameModel::silence(),
        ];
        for mode in 0..crate::constants::NMODE600 as u8 {
            let iq = quantize(mode, &frames);
            let gains = dequantize(mode, &iq);
            for &g in gains.iter() {
                assert!(g >= crate::constants::GAIN_MIN_DB_Q8 && g <= crate::constants::GAIN_MAX_DB_Q8);
            }
        }
    }
}
