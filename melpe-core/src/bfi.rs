//! Bad-frame indicator handling (STANAG 4591 §4.8 "BFI").
//!
//! On an erasure, every parameter is repeated from the last good frame
//! except gain, which fades by a decaying attenuation factor starting at
//! [`ATT_GAIN_Q15`] so the decoder never jumps straight to silence on a
//! single erasure (§4.8: "gracefully fades").

use crate::constants::ATT_GAIN_Q15;
use crate::frame::FrameModel;

/// Per-session concealment state: just the current attenuation factor,
/// which resets to [`ATT_GAIN_Q15`] on every good frame (§4.8: "the next
/// erasure starts from the top of the attenuation schedule").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BfiState {
    att_gain_q15: i16,
    /// True once at least one good frame has been decoded; distinguishes
    /// "first-ever frame erased" (hold at 0, §4.8) from a later erasure.
    had_good_frame: bool,
}

impl Default for BfiState {
    fn default() -> Self {
        Self { att_gain_q15: ATT_GAIN_Q15, had_good_frame: false }
    }
}

impl BfiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call after decoding a good frame (`bfi == 0`): resets the
    /// attenuation schedule.
    pub fn on_good_frame(&mut self) {
        self.att_gain_q15 = ATT_GAIN_Q15;
        self.had_good_frame = true;
    }

    /// Current attenuation multiplier, Q15.
    pub fn att_gain_q15(&self) -> i16 {
        self.att_gain_q15
    }

    /// Conceals one erased frame by repeating `prev` with gain
    /// attenuation, advancing the attenuation schedule for the next
    /// consecutive erasure.
    pub fn conceal(&mut self, prev: &FrameModel) -> FrameModel {
        let mut frame = prev.clone();

        if !self.had_good_frame {
            frame.gain = [crate::constants::GAIN_MIN_DB_Q8; crate::constants::NUM_GAINFR];
        } else {
            for g in frame.gain.iter_mut() {
                let scaled = crate::fxmath::mult(*g, self.att_gain_q15);
                *g = scaled.clamp(crate::constants::GAIN_MIN_DB_Q8, crate::constants::GAIN_MAX_DB_Q8);
            }
            let next = crate::fxmath::mult(self.att_gain_q15, ATT_GAIN_Q15);
            self.att_gain_q15 = next;
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ever_erasure_holds_at_zero_gain() {
        let mut state = BfiState::new();
        let prev = FrameModel::silence();
        let concealed = state.conceal(&prev);
        assert!(concealed.gain.iter().all(|&g| g == crate::constants::GAIN_MIN_DB_Q8));
    }

    #[test]
    fn consecutive_erasures_fade_monotonically() {
        let mut state = BfiState::new();
        let mut prev = FrameModel::silence();
        prev.gain = [crate::constants::GAIN_MAX_DB_Q8; 2];
        state.on_good_frame();

        let mut last_gain = prev.gain[0] as i32;
        for _ in 0..5 {
            let concealed = state.conceal(&prev);
            assert!(concealed.gain[0] as i32 <= last_gain);
            last_gain = concealed.gain[0] as i32;
            prev = concealed;
        }
    }

    #[test]
    fn good_frame_resets_attenuation_schedule() {
        let mut state = BfiState::new();
        let prev = FrameModel::silence();
        state.on_good_frame();
        state.conceal(&prev);
        assert_ne!(state.att_gain_q15(), ATT_GAIN_Q15);
        state.on_good_frame();
        assert_eq!(state.att_gain_q15(), ATT_GAIN_Q15);
    }
}
