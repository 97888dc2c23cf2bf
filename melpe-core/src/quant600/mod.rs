//! Channel coder for the 600 b/s rate (STANAG 4591 §4.5 "Q600"): the
//! hardest sub-spec, a 4-frame (90 ms) super-frame packed into 54 bits / 7
//! bytes with a mode-dependent bit allocation and bit order.

pub mod gain;
pub mod lsf;
pub mod mode;
pub mod pitch;

use crate::codebooks::lsf600::pool_for_mode;
use crate::codebooks::{bitorder600, voicing600};
use crate::constants::{NBITS1GAIN, NBITS2GAIN, NBITS600, NBYTES600, NF600, NMODE600};
use crate::error::{CodecError, Result};
use crate::frame::{FrameModel, SuperFrame600};

fn push_field(bits: &mut Vec<bool>, value: u32, width: u8) {
    for i in (0..width).rev() {
        bits.push((value >> i) & 1 != 0);
    }
}

fn pop_field(bits: &[bool; NBITS600], pos: &mut usize, width: u8) -> u32 {
    let mut v = 0u32;
    for _ in 0..width {
        v = (v << 1) | u32::from(bits[*pos]);
        *pos += 1;
    }
    v
}

/// Per-mode pitch field width, matching [`crate::constants::MODE600_PITCH_BITS`].
fn pitch_field_widths(mode: u8) -> Vec<u8> {
    match mode {
        0 => vec![],
        1 => vec![6],
        _ => vec![5, 2, 1],
    }
}

/// Quantizes 4 consecutive [`FrameModel`]s into one [`SuperFrame600`].
///
/// `prev_f0_hz` is the previous super-frame's held/trajectory-ending f0,
/// used as the trajectory start point for modes 2-5 (§4.5.3).
pub fn quantize(frames: &[FrameModel; NF600], prev_f0_hz: f32) -> SuperFrame600 {
    let voicing = mode::quantize(frames);
    let lsf_iq = lsf::quantize_super_frame(voicing.mode, frames);

    let (lag0_iq, lag0_lq, lag0_tq) = match voicing.mode {
        0 => (0, 3, 0),
        1 => {
            let avg_f0: f32 =
                frames.iter().map(|f| pitch::f0_from_lag(f.pitch)).sum::<f32>() / NF600 as f32;
            (pitch::quantize_mode1(avg_f0), 3, 0)
        }
        _ => {
            let target: Vec<f32> = frames.iter().map(|f| pitch::f0_from_lag(f.pitch)).collect();
            let target: [f32; NF600] = target.try_into().expect("NF600 frames");
            let result = pitch::quantize_trajectory(prev_f0_hz, &target);
            (result.iq, result.lq, result.tq)
        }
    };

    let gain_iq = gain::quantize(voicing.mode, frames);

    SuperFrame600 {
        mode: voicing.mode,
        voicing_iq: voicing.voicing_iq,
        iclass: voicing.iclass,
        lsf_iq,
        lag0_iq,
        lag0_lq,
        lag0_tq,
        gain_iq,
    }
}

/// Reconstructs 4 [`FrameModel`]s and the super-frame's ending f0 (for the
/// next super-frame's trajectory start) from a [`SuperFrame600`].
pub fn dequantize(sf: &SuperFrame600, prev_f0_hz: f32) -> ([FrameModel; NF600], f32) {
    let lsfs = lsf::dequantize_super_frame(sf.mode, &sf.lsf_iq);
    let bpvc = voicing600::CODEBOOK[sf.voicing_iq as usize % voicing600::CODEBOOK.len()];
    let gains = gain::dequantize(sf.mode, &sf.gain_iq);

    let f0_traj = match sf.mode {
        0 => [prev_f0_hz; NF600],
        1 => pitch::dequantize_mode1(sf.lag0_iq),
        _ => pitch::dequantize_trajectory(prev_f0_hz, sf.lag0_iq, sf.lag0_lq, sf.lag0_tq),
    };

    let mut frames: Vec<FrameModel> = Vec::with_capacity(NF600);
    for i in 0..NF600 {
        let pitch = (crate::constants::SAMPLE_RATE as f32 / f0_traj[i].max(1.0)).round() as u16;
        let pitch = pitch.clamp(crate::constants::PITCHMIN as u16, crate::constants::PITCHMAX as u16);
        let log_q7 = ((pitch as f64).log10() * 128.0).round() as i16;
        let mut frame = FrameModel {
            lsf: lsfs[i],
            pitch,
            pitch_log_q7: log_q7,
            jitter_q15: if sf.mode == 0 { 1 << 13 } else { 0 },
            gain: [gains[i * 2], gains[i * 2 + 1]],
            bpvc: bpvc[i],
            uv_flag: false,
            fs_mag: [0i16; crate::constants::NUM_HARM],
        };
        frame.enforce_voicing_invariant();
        frame.clamp_gain();
        if frame.uv_flag {
            frame.fs_mag = [0i16; crate::constants::NUM_HARM];
        }
        frames.push(frame);
    }
    let last_f0 = f0_traj[NF600 - 1];
    (frames.try_into().expect("exactly NF600 frames built"), last_f0)
}

/// Packs a [`SuperFrame600`] into its mode-dependent 54-bit/7-byte layout
/// (§4.5.5: serialize in field order, then permute so the voicing field
/// sits at channel bits `0..5`).
pub fn pack(sf: &SuperFrame600) -> Vec<u8> {
    let mut bits: Vec<bool> = Vec::with_capacity(NBITS600);
    push_field(&mut bits, sf.voicing_iq as u32, crate::constants::NBIT_VOICING);

    for pair in 0..2 {
        let widths = lsf::stage_bit_widths(pool_for_mode(sf.mode, pair));
        for (i, &w) in widths.iter().enumerate() {
            push_field(&mut bits, sf.lsf_iq[pair][i] as u32, w);
        }
    }

    let pitch_widths = pitch_field_widths(sf.mode);
    let pitch_values = [sf.lag0_iq as u32, sf.lag0_lq as u32, sf.lag0_tq as u32];
    for (w, v) in pitch_widths.iter().zip(pitch_values.iter()) {
        push_field(&mut bits, *v, *w);
    }

    let gain_widths = [NBITS1GAIN[sf.mode as usize], NBITS2GAIN[sf.mode as usize]];
    for (i, &w) in gain_widths.iter().enumerate() {
        if w > 0 {
            push_field(&mut bits, sf.gain_iq[i] as u32, w);
        }
    }

    debug_assert_eq!(bits.len(), NBITS600, "mode {} serialized to the wrong bit count", sf.mode);
    let mut serialized = [false; NBITS600];
    serialized.copy_from_slice(&bits);
    let permuted = bitorder600::apply(sf.mode, &serialized);

    let mut bytes = vec![0u8; NBYTES600];
    for (i, &bit) in permuted.iter().enumerate() {
        if bit {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    bytes
}

/// Unpacks a 54-bit/7-byte channel block into a [`SuperFrame600`].
///
/// The voicing field sits at fixed channel bits `0..5` regardless of mode
/// (§6), so `mode600` (needed to undo the rest of the permutation) can be
/// derived before the permutation itself is reversed.
pub fn unpack(bytes: &[u8]) -> Result<SuperFrame600> {
    if bytes.len() < NBYTES600 {
        return Err(CodecError::ShortInput { needed: NBYTES600, actual: bytes.len() });
    }
    let mut channel = [false; NBITS600];
    for (i, bit) in channel.iter_mut().enumerate() {
        *bit = (bytes[i / 8] >> (7 - (i % 8))) & 1 != 0;
    }
    let mut voicing_iq = 0u32;
    for &b in &channel[..crate::constants::NBIT_VOICING as usize] {
        voicing_iq = (voicing_iq << 1) | u32::from(b);
    }
    let (_, _, mode) = mode::dequantize(voicing_iq as u8);
    if mode as usize >= NMODE600 {
        return Err(CodecError::invariant("decoded mode600 out of range"));
    }

    let serialized = bitorder600::undo(mode, &channel);
    let mut pos = 0usize;
    let voicing_iq = pop_field(&serialized, &mut pos, crate::constants::NBIT_VOICING) as u8;

    let mut lsf_iq = [[0u8; 4]; 2];
    for (pair, slot) in lsf_iq.iter_mut().enumerate() {
        let widths = lsf::stage_bit_widths(pool_for_mode(mode, pair));
        for (i, &w) in widths.iter().enumerate() {
            slot[i] = pop_field(&serialized, &mut pos, w) as u8;
        }
    }

    let pitch_widths = pitch_field_widths(mode);
    let mut pitch_values = [0u32; 3];
    for (v, &w) in pitch_values.iter_mut().zip(pitch_widths.iter()) {
        *v = pop_field(&serialized, &mut pos, w);
    }
    let (lag0_iq, lag0_lq, lag0_tq) = if pitch_widths.is_empty() {
        (0, 3, 0)
    } else if pitch_widths.len() == 1 {
        (pitch_values[0] as u8, 3, 0)
    } else {
        (pitch_values[0] as u8, pitch_values[1] as u8, pitch_values[2] as u8)
    };

    let gain_widths = [NBITS1GAIN[mode as usize], NBITS2GAIN[mode as usize]];
    let mut gain_iq = [0u16; 2];
    for (i, &w) in gain_widths.iter().enumerate() {
        if w > 0 {
            gain_iq[i] = pop_field(&serialized, &mut pos, w) as u16;
        }
    }

    Ok(SuperFrame600 {
        mode,
        voicing_iq,
        iclass: {
            let (_, iclass, _) = mode::dequantize(voicing_iq);
            iclass
        },
        lsf_iq,
        lag0_iq,
        lag0_lq,
        lag0_tq,
        gain_iq,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trips_for_silence() {
        let frames = [
            FrameModel::silence(),
            FrameModel::silence(),
            FrameModel::silence(),
            FrameModel::silence(),
        ];
        let sf = quantize(&frames, 100.0);
        let bytes = pack(&sf);
        assert_eq!(bytes.len(), NBYTES600);
        let back = unpack(&bytes).unwrap();
        assert_eq!(sf.mode, back.mode);
        assert_eq!(sf.voicing_iq, back.voicing_iq);
        assert_eq!(sf.lsf_iq, back.lsf_iq);
        assert_eq!(sf.gain_iq, back.gain_iq);
    }

    #[test]
    fn dequantize_produces_well_formed_frames() {
        let frames = [
            FrameModel::silence(),
            FrameModel::silence(),
            FrameModel::silence(),
            FrameModel::silence(),
        ];
        let sf = quantize(&frames, 100.0);
        let (decoded, _) = dequantize(&sf, 100.0);
        for f in decoded.iter() {
            for i in 0..crate::constants::LPC_ORD - 1 {
                assert!(f.lsf[i + 1] - f.lsf[i] >= crate::constants::BWMIN_Q15);
            }
        }
    }

    #[test]
    fn unpack_rejects_short_input() {
        assert!(unpack(&[0u8; 3]).is_err());
    }
}
