//! Pitch trajectory quantization for 600 b/s super-frames (STANAG 4591
//! §4.5.3).
//!
//! Modes 2-5 fit four trajectory hypotheses (direct, first-type,
//! second-type, constant) against the super-frame's 4-point f0 trajectory
//! and keep the minimum-error one; mode 1 sends one direct 6-bit code;
//! mode 0 holds the previous super-frame's pitch (no bits at all).

use crate::codebooks::pitch600::{dequantize, grid32, grid64, lag_to_f0, quantize as grid_quantize};
use crate::constants::NF600;

/// `(iq, lq, tq)` for one super-frame, plus the resulting per-frame f0
/// trajectory in Hz (already re-quantized to codebook members, per
/// §4.5.3's closing sentence).
pub struct PitchResult {
    pub iq: u8,
    pub lq: u8,
    pub tq: u8,
    pub f0_hz: [f32; NF600],
}

fn build_trajectory(prev: f32, target: f32, lq: u8, tq: u8) -> [f32; NF600] {
    let mut t = [0.0f32; NF600];
    match (lq, tq) {
        (3, 0) => {
            for (i, slot) in t.iter_mut().enumerate() {
                let frac = (i + 1) as f32 / NF600 as f32;
                *slot = prev + (target - prev) * frac;
            }
        }
        (3, 1) => t = [target; NF600],
        (l, 0) if l < 3 => {
            for (i, slot) in t.iter_mut().enumerate() {
                *slot = if (i as u8) >= l { target } else { prev };
            }
        }
        (l, _) if l < 3 => {
            for (i, slot) in t.iter_mut().enumerate() {
                if (i as u8) <= l {
                    let frac = (i + 1) as f32 / (l as f32 + 1.0);
                    *slot = prev + (target - prev) * frac;
                } else {
                    *slot = target;
                }
            }
        }
        _ => t = [target; NF600],
    }
    t
}

fn sse(a: &[f32; NF600], b: &[f32; NF600]) -> f32 {
    a.iter().zip(b.iter()).map(|(&x, &y)| (x - y) * (x - y)).sum()
}

/// Mode 1's single 6-bit direct code (mixed-voiced, no trajectory).
pub fn quantize_mode1(target_f0: f32) -> u8 {
    grid_quantize(&grid64(), target_f0)
}

pub fn dequantize_mode1(iq: u8) -> [f32; NF600] {
    [dequantize(&grid64(), iq); NF600]
}

/// Modes 2-5's full hypothesis search.
pub fn quantize_trajectory(prev_f0: f32, target_f0: &[f32; NF600]) -> PitchResult {
    let grid = grid32();
    let mut best: Option<(u8, u8, u8, f32)> = None;
    for (iq, &cbk_f0) in grid.iter().enumerate() {
        for lq in 0..4u8 {
            for tq in 0..2u8 {
                let traj = build_trajectory(prev_f0, cbk_f0, lq, tq);
                let cost = sse(&traj, target_f0);
                if best.map(|(_, _, _, c)| cost < c).unwrap_or(true) {
                    best = Some((iq as u8, lq, tq, cost));
                }
            }
        }
    }
    let (iq, lq, tq, _) = best.expect("grid32 is non-empty");
    PitchResult { iq, lq, tq, f0_hz: dequantize_trajectory(prev_f0, iq, lq, tq) }
}

/// Decoder-side: rebuild the trajectory from `(iq, lq, tq)` and re-snap
/// every frame's f0 onto the 32-entry codebook so the final values are
/// codebook members only, exactly as §4.5.3 requires.
pub fn dequantize_trajectory(prev_f0: f32, iq: u8, lq: u8, tq: u8) -> [f32; NF600] {
    let grid = grid32();
    let cbk_f0 = dequantize(&grid, iq);
    let traj = build_trajectory(prev_f0, cbk_f0, lq, tq);
    let mut out = [0.0f32; NF600];
    for (dst, &f0) in out.iter_mut().zip(traj.iter()) {
        let snapped_idx = grid_quantize(&grid, f0);
        *dst = dequantize(&grid, snapped_idx);
    }
    out
}

pub fn f0_from_lag(lag: u16) -> f32 {
    lag_to_f0(lag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_trajectory_is_cheap_to_recover() {
        let target = [120.0f32; NF600];
        let result = quantize_trajectory(120.0, &target);
        for &f in result.f0_hz.iter() {
            assert!((f - 120.0).abs() < 10.0);
        }
    }

    #[test]
    fn mode1_round_trip_holds_constant_f0() {
        let iq = quantize_mode1(150.0);
        let traj = dequantize_mode1(iq);
        for &f in traj.iter() {
            assert!((f - 150.0).abs() < 10.0);
        }
    }
}
