//! Channel coder for the 1200 b/s rate (STANAG 4591 §4.4 "Q1200"):
//! 3 frames (67.5 ms) jointly quantized into 81 bits / 11 bytes.
//!
//! The middle frame of the block carries the "full" information (an MSVQ'd
//! LSF vector, an absolute pitch, an absolute first gain); the two outer
//! frames carry cheaper delta codes against it, per spec.md §4.4's
//! "one frame carries an absolute pitch, the other two carry deltas from a
//! 3-frame trajectory" and the analogous framing for LSFs and gains.

use crate::bitstream::{BitReader, BitWriter};
use crate::codebooks::voicing600::classify as classify_bpvc;
use crate::codebooks::{lsf1200, msvq, voicing1200};
use crate::constants::{
    FRAMES_PER_BLOCK_1200, GAIN_ABS_BITS_1200, GAIN_DELTA_BITS_1200, GAIN_MAX_DB_Q8,
    GAIN_MIN_DB_Q8, JITTER_UV_BITS_1200, LPC_ORD, LSF_DELTA_BITS_1200, LSF_MSVQ_STAGE_BITS_1200,
    MBEST_LSF_2400, NUM_GAINFR, PITCH_ABS_BITS_1200, PITCH_DELTA_BITS_1200, PIT_QLO_Q7,
    PIT_QUP_Q7, RATE_1200_BITS, RATE_1200_BYTES, SYNC_BITS_1200, VOICING_PATTERN_BITS_1200,
};
use crate::error::{CodecError, Result};
use crate::frame::{enforce_lsf_bounds, FrameModel};

/// Channel side information for one 81-bit / 11-byte 1200 b/s block of 3
/// frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantParam1200 {
    pub lsf_mid_index: [u8; 4],
    /// Per-dimension-averaged LSF delta, frame 0 and frame 2 against the
    /// reference (middle) frame.
    pub lsf_delta_index: [u8; 2],
    pub pitch_abs_index: u8,
    pub pitch_delta_index: [u8; 2],
    pub gain_abs_index: u8,
    pub gain_delta_index: [u8; 5],
    pub voicing_pattern_index: u8,
    pub jit_uv: [bool; FRAMES_PER_BLOCK_1200],
}

fn quantize_uniform(value: i32, lo: i32, hi: i32, levels: u32) -> u32 {
    let clamped = value.clamp(lo, hi) as i64;
    let span = (hi as i64 - lo as i64).max(1);
    let idx = ((clamped - lo as i64) * (levels as i64 - 1) + span / 2) / span;
    idx.clamp(0, levels as i64 - 1) as u32
}

fn dequantize_uniform(idx: u32, lo: i32, hi: i32, levels: u32) -> i32 {
    let span = hi as i64 - lo as i64;
    lo + ((idx as i64 * span) / (levels as i64 - 1).max(1)) as i32
}

const LSF_DELTA_RANGE: i32 = i16::MAX as i32 / 8;
const PITCH_DELTA_RANGE_Q7: i32 = (PIT_QUP_Q7 as i32 - PIT_QLO_Q7 as i32) / 2;
const GAIN_DELTA_RANGE_Q8: i32 = (GAIN_MAX_DB_Q8 as i32 - GAIN_MIN_DB_Q8 as i32) / 3;

/// Encodes a 3-frame block.
pub fn quantize(frames: &[FrameModel; FRAMES_PER_BLOCK_1200]) -> QuantParam1200 {
    let weights = [1i32; LPC_ORD];
    let mid = &frames[1];
    let lsf_search = msvq::search(&mid.lsf, &weights, &lsf1200::STAGES, MBEST_LSF_2400);
    let mut lsf_mid_index = [0u8; 4];
    for (dst, &src) in lsf_mid_index.iter_mut().zip(lsf_search.indices.iter()) {
        *dst = src as u8;
    }

    let lsf_delta_index = [0usize, 2usize].map(|outer| {
        let avg: i32 = frames[outer]
            .lsf
            .iter()
            .zip(mid.lsf.iter())
            .map(|(&a, &b)| a as i32 - b as i32)
            .sum::<i32>()
            / LPC_ORD as i32;
        quantize_uniform(avg, -LSF_DELTA_RANGE, LSF_DELTA_RANGE, 1 << LSF_DELTA_BITS_1200) as u8
    });

    let pitch_abs_index =
        quantize_uniform(mid.pitch_log_q7 as i32, PIT_QLO_Q7 as i32, PIT_QUP_Q7 as i32, 1 << PITCH_ABS_BITS_1200) as u8;
    let pitch_delta_index = [0usize, 2usize].map(|outer| {
        let delta = crate::fxmath::sub(frames[outer].pitch_log_q7, mid.pitch_log_q7) as i32;
        quantize_uniform(delta, -PITCH_DELTA_RANGE_Q7, PITCH_DELTA_RANGE_Q7, 1 << PITCH_DELTA_BITS_1200) as u8
    });

    let subframe_gains: Vec<i16> = frames.iter().flat_map(|f| f.gain).collect();
    let gain_abs_index =
        quantize_uniform(subframe_gains[0] as i32, GAIN_MIN_DB_Q8 as i32, GAIN_MAX_DB_Q8 as i32, 1 << GAIN_ABS_BITS_1200) as u8;
    let mut gain_delta_index = [0u8; 5];
    let mut prev = subframe_gains[0];
    for (i, slot) in gain_delta_index.iter_mut().enumerate() {
        let cur = subframe_gains[i + 1];
        let delta = crate::fxmath::sub(cur, prev) as i32;
        *slot = quantize_uniform(delta, -GAIN_DELTA_RANGE_Q8, GAIN_DELTA_RANGE_Q8, 1 << GAIN_DELTA_BITS_1200) as u8;
        prev = cur;
    }

    let classes = [
        classify_bpvc(&frames[0].bpvc),
        classify_bpvc(&frames[1].bpvc),
        classify_bpvc(&frames[2].bpvc),
    ];
    let voicing_pattern_index = voicing1200::nearest(&classes);

    QuantParam1200 {
        lsf_mid_index,
        lsf_delta_index,
        pitch_abs_index,
        pitch_delta_index,
        gain_abs_index,
        gain_delta_index,
        voicing_pattern_index,
        jit_uv: [frames[0].uv_flag, frames[1].uv_flag, frames[2].uv_flag],
    }
}

/// Reconstructs a 3-frame block.
pub fn dequantize(qp: &QuantParam1200) -> [FrameModel; FRAMES_PER_BLOCK_1200] {
    let indices: Vec<u16> = qp.lsf_mid_index.iter().map(|&i| i as u16).collect();
    let mid_lsf_vec = msvq::reconstruct(&indices, &lsf1200::STAGES);
    let mut mid_lsf = [0i16; LPC_ORD];
    for (dst, &src) in mid_lsf.iter_mut().zip(mid_lsf_vec.iter()) {
        *dst = src.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    }
    enforce_lsf_bounds(&mut mid_lsf);

    let mid_pitch_log_q7 =
        dequantize_uniform(qp.pitch_abs_index as u32, PIT_QLO_Q7 as i32, PIT_QUP_Q7 as i32, 1 << PITCH_ABS_BITS_1200) as i16;

    let subframe_gains = {
        let mut gains = [0i16; FRAMES_PER_BLOCK_1200 * NUM_GAINFR];
        gains[0] = dequantize_uniform(qp.gain_abs_index as u32, GAIN_MIN_DB_Q8 as i32, GAIN_MAX_DB_Q8 as i32, 1 << GAIN_ABS_BITS_1200) as i16;
        let mut prev = gains[0];
        for (i, &idx) in qp.gain_delta_index.iter().enumerate() {
            let delta = dequantize_uniform(idx as u32, -GAIN_DELTA_RANGE_Q8, GAIN_DELTA_RANGE_Q8, 1 << GAIN_DELTA_BITS_1200) as i16;
            let cur = crate::fxmath::add(prev, delta).clamp(GAIN_MIN_DB_Q8, GAIN_MAX_DB_Q8);
            gains[i + 1] = cur;
            prev = cur;
        }
        gains
    };

    let pattern = voicing1200::dequantize(qp.voicing_pattern_index);

    let mut out: Vec<FrameModel> = Vec::with_capacity(FRAMES_PER_BLOCK_1200);
    for outer in 0..FRAMES_PER_BLOCK_1200 {
        let mut lsf = mid_lsf;
        let pitch_log_q7 = if outer == 1 {
            mid_pitch_log_q7
        } else {
            let slot = if outer == 0 { 0 } else { 1 };
            let delta = dequantize_uniform(
                qp.pitch_delta_index[slot] as u32,
                -PITCH_DELTA_RANGE_Q7,
                PITCH_DELTA_RANGE_Q7,
                1 << PITCH_DELTA_BITS_1200,
            );
            let delta_lsf = dequantize_uniform(
                qp.lsf_delta_index[slot] as u32,
                -LSF_DELTA_RANGE,
                LSF_DELTA_RANGE,
                1 << LSF_DELTA_BITS_1200,
            );
            let delta_lsf = delta_lsf as i16;
            for l in lsf.iter_mut() {
                *l = crate::fxmath::add(*l, delta_lsf);
            }
            enforce_lsf_bounds(&mut lsf);
            crate::fxmath::add(mid_pitch_log_q7, delta as i16)
        };

        let uv_flag = qp.jit_uv[outer];
        let pitch = crate::fxmath::pow10_fxp((pitch_log_q7 as i32) << (crate::fxmath::LOG10_SCALE_BITS as i32 - 7))
            .clamp(crate::constants::PITCHMIN as i32, crate::constants::PITCHMAX as i32) as u16;
        let gain = [subframe_gains[outer * NUM_GAINFR], subframe_gains[outer * NUM_GAINFR + 1]];
        let bpvc = crate::codebooks::voicing600::CANONICAL_SHAPES[pattern[outer] as usize % 4];

        let mut frame = FrameModel {
            lsf,
            pitch,
            pitch_log_q7,
            jitter_q15: if uv_flag { 1 << 13 } else { 0 },
            gain,
            bpvc,
            uv_flag,
            fs_mag: [0i16; crate::constants::NUM_HARM],
        };
        frame.enforce_voicing_invariant();
        frame.clamp_gain();
        out.push(frame);
    }
    out.try_into().expect("exactly FRAMES_PER_BLOCK_1200 frames built")
}

fn field_widths() -> [u8; 4] {
    LSF_MSVQ_STAGE_BITS_1200
}

/// Packs a [`QuantParam1200`] into the fixed 81-bit/11-byte channel layout.
pub fn pack(qp: &QuantParam1200) -> Vec<u8> {
    let mut w = BitWriter::with_capacity_bits(RATE_1200_BITS);
    let lsf_widths = field_widths();
    for (i, &width) in lsf_widths.iter().enumerate() {
        w.write_bits(qp.lsf_mid_index[i] as u32, width);
    }
    for &idx in &qp.lsf_delta_index {
        w.write_bits(idx as u32, LSF_DELTA_BITS_1200);
    }
    w.write_bits(qp.pitch_abs_index as u32, PITCH_ABS_BITS_1200);
    for &idx in &qp.pitch_delta_index {
        w.write_bits(idx as u32, PITCH_DELTA_BITS_1200);
    }
    w.write_bits(qp.gain_abs_index as u32, GAIN_ABS_BITS_1200);
    for &idx in &qp.gain_delta_index {
        w.write_bits(idx as u32, GAIN_DELTA_BITS_1200);
    }
    w.write_bits(qp.voicing_pattern_index as u32, VOICING_PATTERN_BITS_1200);
    for &uv in &qp.jit_uv {
        w.write_bits(u32::from(uv), JITTER_UV_BITS_1200);
    }
    w.write_bits(0, SYNC_BITS_1200);
    let bytes = w.into_bytes();
    debug_assert_eq!(bytes.len(), RATE_1200_BYTES);
    bytes
}

/// Unpacks an 81-bit/11-byte channel block into a [`QuantParam1200`].
pub fn unpack(bytes: &[u8]) -> Result<QuantParam1200> {
    if bytes.len() < RATE_1200_BYTES {
        return Err(CodecError::ShortInput { needed: RATE_1200_BYTES, actual: bytes.len() });
    }
    let mut r = BitReader::new(bytes);
    let lsf_widths = field_widths();
    let mut lsf_mid_index = [0u8; 4];
    for (i, slot) in lsf_mid_index.iter_mut().enumerate() {
        *slot = r.read_bits(lsf_widths[i])? as u8;
    }
    let mut lsf_delta_index = [0u8; 2];
    for slot in lsf_delta_index.iter_mut() {
        *slot = r.read_bits(LSF_DELTA_BITS_1200)? as u8;
    }
    let pitch_abs_index = r.read_bits(PITCH_ABS_BITS_1200)? as u8;
    let mut pitch_delta_index = [0u8; 2];
    for slot in pitch_delta_index.iter_mut() {
        *slot = r.read_bits(PITCH_DELTA_BITS_1200)? as u8;
    }
    let gain_abs_index = r.read_bits(GAIN_ABS_BITS_1200)? as u8;
    let mut gain_delta_index = [0u8; 5];
    for slot in gain_delta_index.iter_mut() {
        *slot = r.read_bits(GAIN_DELTA_BITS_1200)? as u8;
    }
    let voicing_pattern_index = r.read_bits(VOICING_PATTERN_BITS_1200)? as u8;
    let mut jit_uv = [false; FRAMES_PER_BLOCK_1200];
    for slot in jit_uv.iter_mut() {
        *slot = r.read_bits(JITTER_UV_BITS_1200)? != 0;
    }
    let _sync = r.read_bits(SYNC_BITS_1200)?;
    Ok(QuantParam1200 {
        lsf_mid_index,
        lsf_delta_index,
        pitch_abs_index,
        pitch_delta_index,
        gain_abs_index,
        gain_delta_index,
        voicing_pattern_index,
        jit_uv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_budget_matches_rate() {
        let widths: u32 = field_widths().iter().map(|&w| w as u32).sum::<u32>()
            + 2 * LSF_DELTA_BITS_1200 as u32
            + PITCH_ABS_BITS_1200 as u32
            + 2 * PITCH_DELTA_BITS_1200 as u32
            + GAIN_ABS_BITS_1200 as u32
            + 5 * GAIN_DELTA_BITS_1200 as u32
            + VOICING_PATTERN_BITS_1200 as u32
            + 3 * JITTER_UV_BITS_1200 as u32
            + SYNC_BITS_1200 as u32;
        assert_eq!(widths as usize, RATE_1200_BITS);
    }

    #[test]
    fn pack_unpack_round_trips() {
        let frames = [FrameModel::silence(), FrameModel::silence(), FrameModel::silence()];
        let qp = quantize(&frames);
        let bytes = pack(&qp);
        assert_eq!(bytes.len(), RATE_1200_BYTES);
        let back = unpack(&bytes).unwrap();
        assert_eq!(qp, back);
    }

    #[test]
    fn dequantize_produces_well_formed_frames() {
        let frames = [FrameModel::silence(), FrameModel::silence(), FrameModel::silence()];
        let qp = quantize(&frames);
        let back = dequantize(&qp);
        for f in &back {
            for i in 0..LPC_ORD - 1 {
                assert!(f.lsf[i + 1] - f.lsf[i] >= crate::constants::BWMIN_Q15);
            }
        }
    }
}
