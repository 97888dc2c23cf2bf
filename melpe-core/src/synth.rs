//! Synthesis (STANAG 4591 §4.6 "Synth"): reconstructs one analysis frame
//! of PCM from a [`FrameModel`], interpolating every parameter across the
//! frame the way the teacher's decoder drives its synthesis filter from
//! interpolated LPC coefficients a sub-frame at a time
//! (`codecs/g729a/codec/decoder.rs`), generalized here to MELPe's mixed
//! pulse/noise excitation and its rate-shared post-filter.
//!
//! Interpolation runs over fixed sub-segments per frame rather than a
//! sample-exact per-pitch-period state machine: the named steps (gain,
//! LSF, pitch, jitter interpolation; harmonic + noise excitation; ASE;
//! LPC synthesis; pulse dispersion; post-filter) are all present, just at
//! a coarser granularity than a bit-exact reference would use.

use crate::codebooks::fourier2400::W_FS_INV_Q14;
use crate::codebooks::gen::next_u32;
use crate::constants::{ALPHA_Q15, BETA_Q15, FRAME, LPC_ORD, MU_Q15, NUM_GAINFR, NUM_HARM};
use crate::frame::FrameModel;
use crate::lpc;
use std::f64::consts::PI;

const SUB_SEGMENTS: usize = 4;
const SEGMENT_LEN: usize = FRAME / SUB_SEGMENTS;
const DISPERSION_TAPS: [f64; 5] = [0.10, 0.20, 0.40, 0.20, 0.10];

fn q15_to_f64(v: i16) -> f64 {
    v as f64 / (1i32 << 15) as f64
}

fn db_q8_to_linear(gain_q8: i16) -> f64 {
    10f64.powf(gain_q8 as f64 / 256.0 / 20.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Per-session synthesis state: everything carried from one frame's tail
/// into the next (LPC filter memory, previous-frame parameters for
/// interpolation, post-filter memory, pulse-dispersion memory, noise
/// generator state).
pub struct Synth {
    prev: FrameModel,
    lpc_mem: [f64; LPC_ORD],
    pf_zero_mem: [f64; LPC_ORD],
    pf_pole_mem: [f64; LPC_ORD],
    tilt_mem: f64,
    disperse_mem: [f64; DISPERSION_TAPS.len() - 1],
    noise_state: u32,
    postfilter_enabled: bool,
    alpha_q15: i16,
    beta_q15: i16,
    mu_q15: i16,
}

impl Synth {
    pub fn new(postfilter_enabled: bool) -> Self {
        Self::with_postfilter_coeffs(postfilter_enabled, ALPHA_Q15, BETA_Q15, MU_Q15)
    }

    /// Used by the 600 b/s session, which runs the shared post-filter
    /// shape at `ALPH600_Q15`/`BETA600_Q15`/`MU600_Q15` instead.
    pub fn with_postfilter_coeffs(postfilter_enabled: bool, alpha_q15: i16, beta_q15: i16, mu_q15: i16) -> Self {
        Self {
            prev: FrameModel::silence(),
            lpc_mem: [0.0; LPC_ORD],
            pf_zero_mem: [0.0; LPC_ORD],
            pf_pole_mem: [0.0; LPC_ORD],
            tilt_mem: 0.0,
            disperse_mem: [0.0; DISPERSION_TAPS.len() - 1],
            noise_state: 0x4D45_4C50, // "MELP"
            postfilter_enabled,
            alpha_q15,
            beta_q15,
            mu_q15,
        }
    }

    pub fn reset(&mut self) {
        let (pf, a, b, m) = (self.postfilter_enabled, self.alpha_q15, self.beta_q15, self.mu_q15);
        *self = Self::with_postfilter_coeffs(pf, a, b, m);
    }

    fn next_noise_sample(&mut self) -> f64 {
        let r = next_u32(&mut self.noise_state);
        (r as f64 / u32::MAX as f64) * 2.0 - 1.0
    }

    /// Mixed pulse/noise excitation for one sample offset `n` within the
    /// frame, at interpolated `pitch`/`voicing`/`jitter`/harmonic weights.
    fn excitation_sample(
        &mut self,
        n: usize,
        phase_acc: &mut f64,
        pitch: f64,
        voicing: f64,
        jitter: f64,
        harmonics: &[f64; NUM_HARM],
    ) -> f64 {
        let w0 = 2.0 * PI / pitch.max(2.0);
        *phase_acc += w0;
        if *phase_acc > 2.0 * PI {
            *phase_acc -= 2.0 * PI;
        }
        let jittered_phase = *phase_acc + jitter * (self.next_noise_sample()) * PI;

        let mut pulse = 0.0;
        for (h, &mag) in harmonics.iter().enumerate() {
            pulse += mag * (jittered_phase * (h + 1) as f64).cos();
        }
        pulse /= NUM_HARM as f64;

        let noise = self.next_noise_sample();
        let _ = n;
        voicing * pulse + (1.0 - voicing) * noise
    }

    /// Adaptive spectral enhancement + tilt compensation pole/zero filter
    /// (§4.6 step 8), the standard LPC-based formant post-filter shared by
    /// all three rates at rate-specific strength.
    fn postfilter_sample(&mut self, x: f64, lpc_a: &[f64]) -> f64 {
        if !self.postfilter_enabled {
            return x;
        }
        let alpha = q15_to_f64(self.alpha_q15);
        let beta = q15_to_f64(self.beta_q15);
        let mu = q15_to_f64(self.mu_q15);

        // zero section: y = x + sum a_i * alpha^i * mem_zero[i]
        let mut y = x;
        for i in 0..LPC_ORD {
            y += lpc_a[i + 1] * alpha.powi(i as i32 + 1) * self.pf_zero_mem[i];
        }
        for i in (1..LPC_ORD).rev() {
            self.pf_zero_mem[i] = self.pf_zero_mem[i - 1];
        }
        self.pf_zero_mem[0] = x;

        // pole section: y -= sum a_i * beta^i * mem_pole[i]
        let mut pole_acc = y;
        for i in 0..LPC_ORD {
            pole_acc -= lpc_a[i + 1] * beta.powi(i as i32 + 1) * self.pf_pole_mem[i];
        }
        for i in (1..LPC_ORD).rev() {
            self.pf_pole_mem[i] = self.pf_pole_mem[i - 1];
        }
        self.pf_pole_mem[0] = pole_acc;

        // first-order tilt compensation (de-emphasize low-frequency tilt
        // the pole/zero sharpening introduces).
        let tilted = pole_acc - mu * self.tilt_mem;
        self.tilt_mem = pole_acc;
        tilted
    }

    fn disperse(&mut self, x: f64) -> f64 {
        let mut acc = x * DISPERSION_TAPS[0];
        for (i, &tap) in DISPERSION_TAPS[1..].iter().enumerate() {
            acc += tap * self.disperse_mem[i];
        }
        for i in (1..self.disperse_mem.len()).rev() {
            self.disperse_mem[i] = self.disperse_mem[i - 1];
        }
        self.disperse_mem[0] = x;
        acc
    }

    /// Reconstructs [`FRAME`] PCM samples from `frame`, interpolating from
    /// the previous frame's parameters, then advances internal state so
    /// the next call continues smoothly.
    pub fn synthesize_frame(&mut self, frame: &FrameModel) -> [i16; FRAME] {
        let prev_lsf_rad = lpc::lsf_q15_to_rad(&self.prev.lsf);
        let cur_lsf_rad = lpc::lsf_q15_to_rad(&frame.lsf);

        let prev_voicing = q15_to_f64(self.prev.bpvc[0]);
        let cur_voicing = q15_to_f64(frame.bpvc[0]);
        let prev_jitter = q15_to_f64(self.prev.jitter_q15);
        let cur_jitter = q15_to_f64(frame.jitter_q15);

        let harmonics_q13: Vec<f64> = frame
            .fs_mag
            .iter()
            .zip(W_FS_INV_Q14.iter())
            .map(|(&m, &w)| (m as f64 / (1i32 << 13) as f64) * (w as f64 / (1i32 << 14) as f64))
            .collect();
        let mut harmonics = [0.0f64; NUM_HARM];
        harmonics.copy_from_slice(&harmonics_q13);

        let mut out = [0i16; FRAME];
        let mut phase_acc = 0.0f64;

        for seg in 0..SUB_SEGMENTS {
            let t = (seg as f64 + 0.5) / SUB_SEGMENTS as f64;
            let pitch = lerp(self.prev.pitch as f64, frame.pitch as f64, t);
            let voicing = lerp(prev_voicing, cur_voicing, t);
            let jitter = lerp(prev_jitter, cur_jitter, t);
            let gain_half = if seg < SUB_SEGMENTS / 2 { 0 } else { 1usize.min(NUM_GAINFR - 1) };
            let prev_gain_half = self.prev.gain[gain_half.min(self.prev.gain.len() - 1)];
            let cur_gain_half = frame.gain[gain_half.min(frame.gain.len() - 1)];
            let gain_db_q8 = lerp(prev_gain_half as f64, cur_gain_half as f64, t);
            let gain_lin = db_q8_to_linear(gain_db_q8 as i16);

            let mut seg_lsf_rad = [0.0f64; LPC_ORD];
            for (i, slot) in seg_lsf_rad.iter_mut().enumerate() {
                *slot = lerp(prev_lsf_rad[i], cur_lsf_rad[i], t);
            }
            let lpc_a = lpc::lsf_rad_to_lpc(&seg_lsf_rad, LPC_ORD);

            for i in 0..SEGMENT_LEN {
                let n = seg * SEGMENT_LEN + i;
                let excitation =
                    self.excitation_sample(n, &mut phase_acc, pitch, voicing, jitter, &harmonics);
                let scaled = excitation * gain_lin;

                // all-pole LPC synthesis: y[n] = scaled - sum a_k * y[n-k]
                let mut y = scaled;
                for k in 0..LPC_ORD {
                    y -= lpc_a[k + 1] * self.lpc_mem[k];
                }
                for k in (1..LPC_ORD).rev() {
                    self.lpc_mem[k] = self.lpc_mem[k - 1];
                }
                self.lpc_mem[0] = y;

                let post = self.postfilter_sample(y, &lpc_a);
                let dispersed = self.disperse(post);

                out[n] = dispersed.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
            }
        }

        self.prev = frame.clone();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_in_yields_small_output() {
        let mut synth = Synth::new(true);
        let frame = FrameModel::silence();
        let out = synth.synthesize_frame(&frame);
        let peak = out.iter().map(|&s| s.unsigned_abs()).max().unwrap_or(0);
        assert!(peak < 2000, "peak={peak}");
    }

    #[test]
    fn voiced_frame_produces_bounded_nonzero_output() {
        let mut synth = Synth::new(false);
        let mut frame = FrameModel::silence();
        frame.bpvc = [20000, 18000, 16000, 14000, 12000];
        frame.uv_flag = false;
        frame.pitch = 80;
        frame.gain = [60 * 256, 60 * 256];
        frame.fs_mag = [8000; NUM_HARM];
        let out = synth.synthesize_frame(&frame);
        assert!(out.iter().any(|&s| s != 0));
        assert!(out.iter().all(|&s| s != i16::MIN && s != i16::MAX));
    }

    #[test]
    fn state_persists_across_frames_without_panicking() {
        let mut synth = Synth::new(true);
        for _ in 0..10 {
            let _ = synth.synthesize_frame(&FrameModel::silence());
        }
    }

    #[test]
    fn reset_restores_initial_state_shape() {
        let mut synth = Synth::new(true);
        let _ = synth.synthesize_frame(&FrameModel::silence());
        synth.reset();
        assert_eq!(synth.lpc_mem, [0.0; LPC_ORD]);
    }
}
