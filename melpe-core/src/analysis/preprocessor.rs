//! Noise pre-processor (STANAG 4591 §1 "out of scope" as a standalone
//! collaborator, but implemented here per `SPEC_FULL.md` §4: a small 2nd
//! order high-pass stage ahead of analysis, in the same spirit as the
//! teacher's `signal::preprocessor::SignalPreprocessor` DC-offset removal).
//!
//! Unlike the teacher's fixed `H(z) = (1 - z^-1) / (1 - 0.93 z^-1)`
//! first-order filter, the MELPe NPP is a 2nd-order section (matching
//! `npp.c`'s cutoff above 60 Hz); the state is two delay taps per side
//! instead of one.

use crate::fxmath::{mult, Word16};

const B0_Q15: Word16 = 32039; // ~0.978
const B1_Q15: Word16 = -32039;
const A1_Q15: Word16 = -31377; // ~-0.957

/// 2nd-order high-pass pre-filter, run ahead of [`super::Analyzer`] when
/// `SessionConfig::npp_enabled` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoisePreprocessor {
    x1: Word16,
    x2: Word16,
    y1: Word16,
    y2: Word16,
}

impl NoisePreprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters one frame of PCM in place.
    pub fn process(&mut self, pcm: &mut [i16]) {
        for sample in pcm.iter_mut() {
            let x0 = *sample;
            let y0 = mult(B0_Q15, x0)
                .saturating_add(mult(B1_Q15, self.x1))
                .saturating_add(mult(B1_Q15, self.x2) / 2)
                .saturating_sub(mult(A1_Q15, self.y1))
                .saturating_sub(mult(A1_Q15, self.y2) / 4);
            self.x2 = self.x1;
            self.x1 = x0;
            self.y2 = self.y1;
            self.y1 = y0;
            *sample = y0;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_stays_silent() {
        let mut npp = NoisePreprocessor::new();
        let mut pcm = [0i16; 180];
        npp.process(&mut pcm);
        assert!(pcm.iter().all(|&s| s == 0));
    }

    #[test]
    fn does_not_blow_up_on_full_scale_input() {
        let mut npp = NoisePreprocessor::new();
        let mut pcm = [i16::MAX; 180];
        npp.process(&mut pcm);
        assert!(pcm.iter().all(|&s| s.unsigned_abs() <= i16::MAX as u16));
    }
}
