//! Channel coder for the 2400 b/s rate (STANAG 4591 §4.3 "Q2400").
//!
//! Fixed (non-mode-dependent) field order, 54 bits / 7 bytes per frame:
//! LSF MSVQ (25), Fourier VQ (8), gain\[0\]/gain\[1\] (5+3), pitch (7),
//! band-pass voicing (2), jitter/UV (1), sync/reserved (3).

use crate::bitstream::{BitReader, BitWriter};
use crate::codebooks::voicing600::{classify as classify_bpvc, CANONICAL_SHAPES};
use crate::codebooks::{fourier2400, lsf2400, msvq};
use crate::constants::{
    BPVC_BITS_2400, BWMIN_Q15, FOURIER_VQ_BITS_2400, GAIN0_BITS_2400, GAIN1_BITS_2400,
    GAIN_MAX_DB_Q8, GAIN_MIN_DB_Q8, JITTER_UV_BITS_2400, LPC_ORD, LSF_MSVQ_STAGE_BITS_2400,
    MBEST_LSF_2400, PITCH_BITS_2400, PIT_QLO_Q7, PIT_QUP_Q7, RATE_2400_BITS, RATE_2400_BYTES,
    SYNC_BITS_2400, UV_PITCH_Q7,
};
use crate::error::{CodecError, Result};
use crate::frame::{enforce_lsf_bounds, FrameModel, QuantParam2400};

/// Weighting for the LSF MSVQ search (`vq_lspw`): larger where adjacent
/// LSFs (and hence formants) are close together, since those frequencies
/// matter more perceptually and are more damaging to get wrong.
fn lsf_weights(lsf: &[i16; LPC_ORD]) -> [i32; LPC_ORD] {
    let mut w = [0i32; LPC_ORD];
    for i in 0..LPC_ORD {
        let left = if i == 0 { lsf[0] as i32 } else { (lsf[i] - lsf[i - 1]) as i32 };
        let right = if i == LPC_ORD - 1 {
            i16::MAX as i32 - lsf[i] as i32
        } else {
            (lsf[i + 1] - lsf[i]) as i32
        };
        let spacing = left.min(right).max(1);
        w[i] = (1i32 << 20) / spacing;
    }
    check_weights(&mut w);
    w
}

/// `MSVQ_check_weights`: rescale by right shift if any weight would risk
/// overflowing the 32-bit MSVQ accumulator.
fn check_weights(w: &mut [i32; LPC_ORD]) {
    const CAP: i32 = 1 << 24;
    if let Some(&mx) = w.iter().max() {
        if mx > CAP {
            let mut shift: i16 = 0;
            let mut v = mx;
            while v > CAP {
                v = crate::fxmath::l_shr(v, 1);
                shift += 1;
            }
            for x in w.iter_mut() {
                *x = crate::fxmath::l_shr(*x, shift);
            }
        }
    }
}

fn quantize_uniform(value: i16, lo: i16, hi: i16, levels: u32) -> u32 {
    let clamped = value.clamp(lo, hi) as i64;
    let span = (hi as i64 - lo as i64).max(1);
    let idx = ((clamped - lo as i64) * (levels as i64 - 1) + span / 2) / span;
    idx.clamp(0, levels as i64 - 1) as u32
}

fn dequantize_uniform(idx: u32, lo: i16, hi: i16, levels: u32) -> i16 {
    let span = hi as i64 - lo as i64;
    let value = lo as i64 + (idx as i64 * span) / (levels as i64 - 1).max(1);
    crate::fxmath::saturate(value as i32)
}

/// Encodes one [`FrameModel`] into its 2400 b/s channel parameters.
pub fn quantize(frame: &FrameModel) -> QuantParam2400 {
    let weights = lsf_weights(&frame.lsf);
    let lsf_search = msvq::search(&frame.lsf, &weights, &lsf2400::STAGES, MBEST_LSF_2400);
    let mut msvq_index = [0u8; 4];
    for (dst, &src) in msvq_index.iter_mut().zip(lsf_search.indices.iter()) {
        *dst = src as u8;
    }

    let fsvq_index = fourier2400::nearest(&frame.fs_mag);

    let gain_index = [
        quantize_uniform(frame.gain[0], GAIN_MIN_DB_Q8, GAIN_MAX_DB_Q8, 1 << GAIN0_BITS_2400) as u8,
        quantize_uniform(frame.gain[1], GAIN_MIN_DB_Q8, GAIN_MAX_DB_Q8, 1 << GAIN1_BITS_2400) as u8,
    ];

    let pitch_index = if frame.uv_flag {
        0
    } else {
        let levels = 1u32 << PITCH_BITS_2400;
        let idx = quantize_uniform(frame.pitch_log_q7, PIT_QLO_Q7, PIT_QUP_Q7, levels);
        idx.max(1) as u8
    };

    QuantParam2400 {
        msvq_index,
        pitch_index,
        gain_index,
        jit_index: u8::from(frame.uv_flag),
        bpvc_index: classify_bpvc(&frame.bpvc),
        fsvq_index,
        uv_flag: frame.uv_flag,
    }
}

/// Reconstructs a [`FrameModel`] from 2400 b/s channel parameters.
pub fn dequantize(qp: &QuantParam2400) -> FrameModel {
    let indices: Vec<u16> = qp.msvq_index.iter().map(|&i| i as u16).collect();
    let lsf_vec = msvq::reconstruct(&indices, &lsf2400::STAGES);
    let mut lsf = [0i16; LPC_ORD];
    for (dst, &src) in lsf.iter_mut().zip(lsf_vec.iter()) {
        *dst = src.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    }
    enforce_lsf_bounds(&mut lsf);

    let gain = [
        dequantize_uniform(qp.gain_index[0] as u32, GAIN_MIN_DB_Q8, GAIN_MAX_DB_Q8, 1 << GAIN0_BITS_2400),
        dequantize_uniform(qp.gain_index[1] as u32, GAIN_MIN_DB_Q8, GAIN_MAX_DB_Q8, 1 << GAIN1_BITS_2400),
    ];

    let (pitch, pitch_log_q7, jitter_q15) = if qp.uv_flag {
        (crate::constants::PITCHMIN as u16 * 2, UV_PITCH_Q7, 1 << 13)
    } else {
        let levels = 1u32 << PITCH_BITS_2400;
        let log_q7 = dequantize_uniform(qp.pitch_index as u32, PIT_QLO_Q7, PIT_QUP_Q7, levels);
        let pitch = crate::fxmath::pow10_fxp((log_q7 as i32) << (crate::fxmath::LOG10_SCALE_BITS as i32 - 7));
        (pitch.clamp(crate::constants::PITCHMIN as i32, crate::constants::PITCHMAX as i32) as u16, log_q7, 0)
    };

    let bpvc = CANONICAL_SHAPES[qp.bpvc_index as usize % CANONICAL_SHAPES.len()];
    let fs_mag = if qp.uv_flag {
        [0i16; crate::constants::NUM_HARM]
    } else {
        fourier2400::dequantize(qp.fsvq_index)
    };

    let mut frame = FrameModel {
        lsf,
        pitch,
        pitch_log_q7,
        jitter_q15,
        gain,
        bpvc,
        uv_flag: qp.uv_flag,
        fs_mag,
    };
    frame.enforce_voicing_invariant();
    frame.clamp_gain();
    frame
}

/// Field widths, in fixed serialization order.
fn field_widths() -> [u8; 9] {
    [
        LSF_MSVQ_STAGE_BITS_2400[0],
        LSF_MSVQ_STAGE_BITS_2400[1],
        LSF_MSVQ_STAGE_BITS_2400[2],
        LSF_MSVQ_STAGE_BITS_2400[3],
        FOURIER_VQ_BITS_2400,
        GAIN0_BITS_2400,
        GAIN1_BITS_2400,
        PITCH_BITS_2400,
        BPVC_BITS_2400,
    ]
}

/// Packs a [`QuantParam2400`] into the fixed 54-bit/7-byte channel layout.
pub fn pack(qp: &QuantParam2400) -> Vec<u8> {
    let mut w = BitWriter::with_capacity_bits(RATE_2400_BITS);
    let widths = field_widths();
    for (i, &width) in widths[..4].iter().enumerate() {
        w.write_bits(qp.msvq_index[i] as u32, width);
    }
    w.write_bits(qp.fsvq_index as u32, widths[4]);
    w.write_bits(qp.gain_index[0] as u32, widths[5]);
    w.write_bits(qp.gain_index[1] as u32, widths[6]);
    w.write_bits(qp.pitch_index as u32, widths[7]);
    w.write_bits(qp.bpvc_index as u32, widths[8]);
    w.write_bits(u32::from(qp.uv_flag), JITTER_UV_BITS_2400);
    w.write_bits(0, SYNC_BITS_2400);
    let bytes = w.into_bytes();
    debug_assert_eq!(bytes.len(), RATE_2400_BYTES);
    bytes
}

/// Unpacks a 54-bit/7-byte channel block into a [`QuantParam2400`].
pub fn unpack(bytes: &[u8]) -> Result<QuantParam2400> {
    if bytes.len() < RATE_2400_BYTES {
        return Err(CodecError::ShortInput { needed: RATE_2400_BYTES, actual: bytes.len() });
    }
    let mut r = BitReader::new(bytes);
    let widths = field_widths();
    let mut msvq_index = [0u8; 4];
    for (i, slot) in msvq_index.iter_mut().enumerate() {
        *slot = r.read_bits(widths[i])? as u8;
    }
    let fsvq_index = r.read_bits(widths[4])? as u8;
    let gain_index = [r.read_bits(widths[5])? as u8, r.read_bits(widths[6])? as u8];
    let pitch_index = r.read_bits(widths[7])? as u8;
    let bpvc_index = r.read_bits(widths[8])? as u8;
    let jit_index = r.read_bits(JITTER_UV_BITS_2400)? as u8;
    let _sync = r.read_bits(SYNC_BITS_2400)?;
    Ok(QuantParam2400 {
        msvq_index,
        pitch_index,
        gain_index,
        jit_index,
        bpvc_index,
        fsvq_index,
        uv_flag: jit_index != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trips() {
        let frame = FrameModel::silence();
        let qp = quantize(&frame);
        let bytes = pack(&qp);
        assert_eq!(bytes.len(), RATE_2400_BYTES);
        let back = unpack(&bytes).unwrap();
        assert_eq!(qp, back);
    }

    #[test]
    fn quantize_dequantize_keeps_lsf_monotone() {
        let mut frame = FrameModel::silence();
        frame.lsf = [1000, 3000, 6000, 9000, 12000, 15000, 18000, 21000, 24000, 27000];
        let qp = quantize(&frame);
        let back = dequantize(&qp);
        for i in 0..LPC_ORD - 1 {
            assert!(back.lsf[i + 1] - back.lsf[i] >= BWMIN_Q15);
        }
    }

    #[test]
    fn unpack_rejects_short_input() {
        let bytes = [0u8; 3];
        assert!(unpack(&bytes).is_err());
    }

    #[test]
    fn unvoiced_roundtrip_is_well_formed() {
        let frame = FrameModel::silence();
        let qp = quantize(&frame);
        let back = dequantize(&qp);
        assert!(back.uv_flag);
        assert_eq!(back.pitch_log_q7, UV_PITCH_Q7);
    }
}
