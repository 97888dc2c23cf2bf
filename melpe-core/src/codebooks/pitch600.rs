//! Pitch codebooks for 600 b/s (STANAG 4591 §4.5.4, cst600_qpit.h).
//!
//! Pitch is quantized in the log-f0 domain on a uniform grid spanning
//! `[F0_MIN_HZ, F0_MAX_HZ]`: a 64-level, 6-bit grid for mode 1's single
//! direct code, and a 32-level, 5-bit grid for the trajectory `iq` field
//! used by modes 2-5 (see [`crate::quant600::pitch`]).

use crate::constants::{F0_MAX_HZ, F0_MIN_HZ, NPITCH_VAL1, NPITCH_VAL2, SAMPLE_RATE};

fn grid(levels: usize) -> Vec<f32> {
    let log_lo = F0_MIN_HZ.ln();
    let log_hi = F0_MAX_HZ.ln();
    (0..levels)
        .map(|i| {
            let t = i as f32 / (levels - 1) as f32;
            (log_lo + t * (log_hi - log_lo)).exp()
        })
        .collect()
}

/// 64-entry f0 grid (Hz), mode 1.
pub fn grid64() -> Vec<f32> {
    grid(NPITCH_VAL1)
}

/// 32-entry f0 grid (Hz), modes 2-5.
pub fn grid32() -> Vec<f32> {
    grid(NPITCH_VAL2)
}

/// Nearest grid index (log-domain) to `f0_hz`.
pub fn quantize(grid: &[f32], f0_hz: f32) -> u8 {
    let target = f0_hz.max(F0_MIN_HZ).min(F0_MAX_HZ).ln();
    let mut best = 0usize;
    let mut best_err = f32::MAX;
    for (i, &f) in grid.iter().enumerate() {
        let err = (f.ln() - target).abs();
        if err < best_err {
            best_err = err;
            best = i;
        }
    }
    best as u8
}

/// f0 in Hz for grid index `idx`.
pub fn dequantize(grid: &[f32], idx: u8) -> f32 {
    grid[idx as usize % grid.len()]
}

/// Converts f0 in Hz to an integer pitch lag in samples.
pub fn f0_to_lag(f0_hz: f32) -> u16 {
    (SAMPLE_RATE as f32 / f0_hz).round() as u16
}

/// Converts a pitch lag in samples back to f0 in Hz.
pub fn lag_to_f0(lag: u16) -> f32 {
    SAMPLE_RATE as f32 / lag.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grids_have_expected_sizes() {
        assert_eq!(grid64().len(), NPITCH_VAL1);
        assert_eq!(grid32().len(), NPITCH_VAL2);
    }

    #[test]
    fn quantize_dequantize_stays_close() {
        let g = grid32();
        let idx = quantize(&g, 123.4);
        let back = dequantize(&g, idx);
        assert!((back - 123.4).abs() < 20.0);
    }
}
