//! The per-frame parametric model and its channel-side-info counterparts
//! (STANAG 4591 §3 "Data Model").
//!
//! `FrameModel` is produced by the [`crate::analysis`] module or by
//! inverse-quantization, mutated in place by a quantizer's round-trip, and
//! never mutated by [`crate::synth`]. Both encoder and decoder keep a
//! shallow copy as `prev_par` for inter-frame prediction and BFI
//! concealment, matching the Lifecycle paragraph of the spec.

use crate::constants::{
    BWMIN_Q15, GAIN_MAX_DB_Q8, GAIN_MIN_DB_Q8, LPC_ORD, NUM_BANDS, NUM_GAINFR, NUM_HARM,
    UV_PITCH_Q7,
};

/// One 22.5 ms analysis frame's worth of MELPe parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameModel {
    /// Line spectral frequencies, Q15, strictly increasing and separated
    /// by at least [`BWMIN_Q15`].
    pub lsf: [i16; LPC_ORD],
    /// Pitch period in samples (clamped to `[PITCHMIN, PITCHMAX]`); also
    /// cached in Q7 log10 domain for quantization (`pitch_log_q7`).
    pub pitch: u16,
    /// `log10(pitch)` in Q7, the domain MSVQ/scalar quantizers operate in.
    pub pitch_log_q7: i16,
    /// Jitter fraction, Q15, in `[0, 0.25]` (0 for voiced, up to 0.25 for
    /// unvoiced at the lower rates).
    pub jitter_q15: i16,
    /// Two sub-frame gains, Q8 log-domain dB, bounded to
    /// `[GAIN_MIN_DB_Q8, GAIN_MAX_DB_Q8]`.
    pub gain: [i16; NUM_GAINFR],
    /// Five band-pass voicing strengths, Q14 in `[0, 1]`. Band 0 governs
    /// primary voicing.
    pub bpvc: [i16; NUM_BANDS],
    /// `bpvc[0] <= 0.5 (Q14)` implies this is `true`.
    pub uv_flag: bool,
    /// Ten Fourier harmonic magnitudes, Q13, weighted by fixed MSE weights.
    pub fs_mag: [i16; NUM_HARM],
}

impl FrameModel {
    /// The "silent, well-formed" frame used before any real analysis has
    /// run and as the synthesis fallback for erasures with no history.
    pub fn silence() -> Self {
        Self {
            lsf: default_lsf(),
            pitch: 50,
            pitch_log_q7: UV_PITCH_Q7,
            jitter_q15: 0,
            gain: [GAIN_MIN_DB_Q8; NUM_GAINFR],
            bpvc: [0; NUM_BANDS],
            uv_flag: true,
            fs_mag: [0; NUM_HARM],
        }
    }

    /// Enforce `lsf[i+1] - lsf[i] >= BWMIN_Q15` for all `i`, mutating in
    /// place. Called after every quantize/inverse-quantize and every
    /// interpolation step, per the §3 invariant.
    pub fn enforce_lsf_separation(&mut self) {
        enforce_lsf_bounds(&mut self.lsf);
    }

    /// Enforce the `uv_flag == (bpvc[0] <= 0.5 Q14)` invariant and, when
    /// unvoiced, zero the higher bands (§3, §4.2 step 4).
    pub fn enforce_voicing_invariant(&mut self) {
        const HALF_Q14: i16 = 1 << 13;
        self.uv_flag = self.bpvc[0] <= HALF_Q14;
        if self.uv_flag {
            for b in &mut self.bpvc[1..] {
                *b = 0;
            }
        } else {
            // bands 1..3 all unvoiced implies band 4 unvoiced too.
            if self.bpvc[1..4].iter().all(|&b| b <= HALF_Q14) {
                self.bpvc[4] = 0;
            }
        }
    }

    /// Clamp gain to `[GAIN_MIN_DB_Q8, GAIN_MAX_DB_Q8]`.
    pub fn clamp_gain(&mut self) {
        for g in &mut self.gain {
            *g = (*g).clamp(GAIN_MIN_DB_Q8, GAIN_MAX_DB_Q8);
        }
    }
}

fn default_lsf() -> [i16; LPC_ORD] {
    // Evenly spaced points in (0, pi), Q15 (pi maps to i16::MAX + 1
    // conceptually; we keep strictly inside (0, PI) as the invariant
    // requires).
    let mut lsf = [0i16; LPC_ORD];
    let step = (MAX_LSF_Q15 as i32) / (LPC_ORD as i32 + 1);
    for (i, l) in lsf.iter_mut().enumerate() {
        *l = (step * (i as i32 + 1)) as i16;
    }
    lsf
}

const MAX_LSF_Q15: i16 = i16::MAX;

/// Shared LSF bound enforcement used by analysis, quantization, and
/// interpolation alike.
pub fn enforce_lsf_bounds(lsf: &mut [i16; LPC_ORD]) {
    let before = *lsf;
    if lsf[0] < BWMIN_Q15 {
        lsf[0] = BWMIN_Q15;
    }
    for i in 1..LPC_ORD {
        if lsf[i] < lsf[i - 1] + BWMIN_Q15 {
            lsf[i] = lsf[i - 1] + BWMIN_Q15;
        }
    }
    let ceiling = MAX_LSF_Q15 - BWMIN_Q15;
    if lsf[LPC_ORD - 1] > ceiling {
        lsf[LPC_ORD - 1] = ceiling;
        for i in (0..LPC_ORD - 1).rev() {
            if lsf[i] > lsf[i + 1] - BWMIN_Q15 {
                lsf[i] = lsf[i + 1] - BWMIN_Q15;
            }
        }
    }
    if *lsf != before {
        tracing::warn!("LSF separation invariant engaged, input was {:?}", before);
    }
}

/// Channel side information for one 2400 b/s frame (STANAG 4591 §3
/// "QuantParam").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantParam2400 {
    /// 7/6/6/6-bit LSF MSVQ codewords.
    pub msvq_index: [u8; 4],
    pub pitch_index: u8,
    pub gain_index: [u8; 2],
    pub jit_index: u8,
    pub bpvc_index: u8,
    pub fsvq_index: u8,
    pub uv_flag: bool,
}

impl Default for QuantParam2400 {
    fn default() -> Self {
        Self {
            msvq_index: [0; 4],
            pitch_index: 0,
            gain_index: [0; 2],
            jit_index: 0,
            bpvc_index: 0,
            fsvq_index: 0,
            uv_flag: true,
        }
    }
}

/// Channel side information for one 54-bit / 7-byte 600 b/s super-frame
/// of 4 frames (STANAG 4591 §3 "SuperFrame600").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperFrame600 {
    /// Encoding mode, `0..=5` (UU, UV, VU, VV-low/med/high), selected from
    /// `MODE600[iclass[0]][iclass[1]]`.
    pub mode: u8,
    /// 5-bit index into the 32-entry 4-frame voicing pattern codebook.
    pub voicing_iq: u8,
    /// Coarse voicing class (0..=5) of each half-super-frame.
    pub iclass: [u8; 2],
    /// MSVQ stage indices for the two concatenated LSF pairs; unused
    /// trailing stages (3-stage pools) are left at 0.
    pub lsf_iq: [[u8; 4]; 2],
    /// Pitch lag codebook index.
    pub lag0_iq: u8,
    /// Pitch trajectory transition location, `0..=3` (`3` means "no
    /// transition").
    pub lag0_lq: u8,
    /// Pitch trajectory type, `0` (first-type/direct) or `1`
    /// (second-type/constant).
    pub lag0_tq: u8,
    /// Gain MSVQ/VQ stage indices; the second slot is unused for the
    /// single-stage `VQ(9)` pool (mode 5).
    pub gain_iq: [u16; 2],
}

impl Default for SuperFrame600 {
    fn default() -> Self {
        Self {
            mode: 0,
            voicing_iq: 0,
            iclass: [0; 2],
            lsf_iq: [[0; 4]; 2],
            lag0_iq: 0,
            lag0_lq: 3,
            lag0_tq: 0,
            gain_iq: [0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_frame_is_well_formed() {
        let f = FrameModel::silence();
        for i in 0..LPC_ORD - 1 {
            assert!(f.lsf[i + 1] - f.lsf[i] >= BWMIN_Q15);
        }
        assert!(f.uv_flag);
    }

    #[test]
    fn enforce_lsf_bounds_fixes_collisions() {
        let mut lsf = [100i16; LPC_ORD];
        enforce_lsf_bounds(&mut lsf);
        for i in 0..LPC_ORD - 1 {
            assert!(lsf[i + 1] - lsf[i] >= BWMIN_Q15);
        }
    }

    #[test]
    fn voicing_invariant_holds() {
        let mut f = FrameModel::silence();
        f.bpvc = [20000, 5000, 5000, 5000, 5000];
        f.enforce_voicing_invariant();
        assert!(!f.uv_flag);

        f.bpvc = [100, 5000, 5000, 5000, 5000];
        f.enforce_voicing_invariant();
        assert!(f.uv_flag);
        assert!(f.bpvc[1..].iter().all(|&b| b == 0));
    }
}
