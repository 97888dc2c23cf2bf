//! LPC analysis and LPC &lt;-&gt; LSF conversion, shared by the Analyzer
//! (needs LPC -> LSF once per frame) and Synth (needs LSF -> LPC once per
//! pitch period, per STANAG 4591 §4.6 step 5 "derive LPC coefficients").
//!
//! Root-finding for the LSF conversion and the Levinson-Durbin recursion
//! are done in `f64`, matching [`crate::fxmath::log10_fxp`]/`sqrt_fxp`'s own
//! precedent of using floating-point internally for routines whose
//! STANAG-exact fixed-point schedules are not recoverable from the
//! retrieved sources; only the LSFs themselves cross back into Q15 at the
//! module boundary.

use crate::constants::LPC_ORD;
use crate::frame::enforce_lsf_bounds;
use std::f64::consts::PI;

/// Hamming-windows `samples` in place (`f64` working buffer).
pub fn hamming_window(samples: &[i16]) -> Vec<f64> {
    let n = samples.len();
    (0..n)
        .map(|i| {
            let w = 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1).max(1) as f64).cos();
            samples[i] as f64 * w
        })
        .collect()
}

/// Biased autocorrelation up to lag `order`.
pub fn autocorrelate(windowed: &[f64], order: usize) -> Vec<f64> {
    (0..=order)
        .map(|lag| {
            let mut sum = 0.0;
            for i in lag..windowed.len() {
                sum += windowed[i] * windowed[i - lag];
            }
            sum
        })
        .collect()
}

/// Levinson-Durbin recursion: autocorrelation -> LPC coefficients
/// `a[1..=order]` (with the implicit `a[0] = 1`), plus final prediction
/// error energy.
pub fn levinson_durbin(autocorr: &[f64], order: usize) -> (Vec<f64>, f64) {
    let mut error = autocorr[0];
    if error <= 0.0 {
        return (vec![0.0; order + 1], 0.0);
    }
    let mut a = vec![0.0f64; order + 1];
    a[0] = 1.0;
    for i in 1..=order {
        let mut acc = autocorr[i];
        for j in 1..i {
            acc += a[j] * autocorr[i - j];
        }
        let k = -acc / error;
        a[i] = k;
        for j in 1..=(i / 2) {
            if j != i - j {
                let tmp = a[j] + k * a[i - j];
                a[i - j] += k * a[j];
                a[j] = tmp;
            }
        }
        if i % 2 == 0 {
            a[i / 2] += k * a[i / 2];
        }
        error *= 1.0 - k * k;
        if error <= 0.0 {
            error = 1e-9;
        }
    }
    (a, error)
}

fn eval_trig_poly(coeffs: &[f64], w: f64) -> f64 {
    coeffs.iter().enumerate().map(|(i, &c)| c * (i as f64 * w).cos()).sum()
}

/// Converts LPC coefficients `a[0..=order]` (`a[0] == 1`) to `order` LSFs
/// in radians, strictly increasing in `(0, pi)`. Total: degenerate input
/// (e.g. all-zero autocorrelation) still yields a well-formed, evenly
/// spaced LSF set rather than failing.
pub fn lpc_to_lsf_rad(a: &[f64], order: usize) -> Vec<f64> {
    let half = order / 2;
    let mut f1 = vec![0.0f64; half + 1];
    let mut f2 = vec![0.0f64; half + 1];
    f1[0] = 1.0;
    f2[0] = 1.0;
    for i in 1..=half {
        let sym = a.get(order + 1 - i).copied().unwrap_or(0.0);
        f1[i] = a[i] + sym - f1[i - 1];
        f2[i] = a[i] - sym + f2[i - 1];
    }

    const GRID_N: usize = 512;
    let mut lsf = Vec::with_capacity(order);
    let mut use_f1 = true;
    let mut prev_w = 0.0f64;
    let mut prev_val = eval_trig_poly(&f1, 0.0);

    for g in 1..=GRID_N {
        if lsf.len() >= order {
            break;
        }
        let w = PI * g as f64 / GRID_N as f64;
        let current = if use_f1 { &f1 } else { &f2 };
        let val = eval_trig_poly(current, w);
        if prev_val == 0.0 || val.signum() != prev_val.signum() {
            let root_w = if val == prev_val { w } else { prev_w + (w - prev_w) * (prev_val / (prev_val - val)) };
            lsf.push(root_w);
            use_f1 = !use_f1;
            prev_w = root_w;
            prev_val = eval_trig_poly(if use_f1 { &f1 } else { &f2 }, root_w);
        } else {
            prev_w = w;
            prev_val = val;
        }
    }
    while lsf.len() < order {
        let last = *lsf.last().unwrap_or(&0.01);
        lsf.push((last + 0.02).min(PI - 0.01));
    }
    lsf
}

fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

/// Converts `order` LSFs (radians) back to LPC coefficients `a[0..=order]`
/// via `P(z) = (1+z^-1) * prod_even(...)`, `Q(z) = (1-z^-1) *
/// prod_odd(...)`, `A(z) = (P(z)+Q(z))/2`.
pub fn lsf_rad_to_lpc(lsf_rad: &[f64], order: usize) -> Vec<f64> {
    let half = order / 2;
    let mut p_poly = vec![1.0f64];
    let mut q_poly = vec![1.0f64];
    for i in 0..half {
        let biquad_even = vec![1.0, -2.0 * lsf_rad[2 * i].cos(), 1.0];
        let biquad_odd = vec![1.0, -2.0 * lsf_rad[2 * i + 1].cos(), 1.0];
        p_poly = poly_mul(&p_poly, &biquad_even);
        q_poly = poly_mul(&q_poly, &biquad_odd);
    }
    p_poly = poly_mul(&p_poly, &[1.0, 1.0]);
    q_poly = poly_mul(&q_poly, &[1.0, -1.0]);
    (0..=order).map(|k| (p_poly.get(k).copied().unwrap_or(0.0) + q_poly.get(k).copied().unwrap_or(0.0)) / 2.0).collect()
}

/// Q15 scale for an LSF in `(0, pi)`.
const LSF_Q15_SCALE: f64 = (i16::MAX as f64) / PI;

/// Radians -> Q15, bounds-enforced.
pub fn lsf_rad_to_q15(lsf_rad: &[f64]) -> [i16; LPC_ORD] {
    let mut out = [0i16; LPC_ORD];
    for (dst, &rad) in out.iter_mut().zip(lsf_rad.iter()) {
        *dst = (rad * LSF_Q15_SCALE).round().clamp(0.0, i16::MAX as f64) as i16;
    }
    enforce_lsf_bounds(&mut out);
    out
}

/// Q15 -> radians.
pub fn lsf_q15_to_rad(lsf: &[i16; LPC_ORD]) -> Vec<f64> {
    lsf.iter().map(|&q| q as f64 / LSF_Q15_SCALE).collect()
}

/// Runs the full LPC analysis pipeline (window -> autocorrelate ->
/// Levinson-Durbin -> LSF) over one analysis buffer, returning the LSFs in
/// Q15 and the raw `f64` LPC coefficients (the latter reused by the
/// Fourier-magnitude residual computation).
pub fn analyze(samples: &[i16], order: usize) -> ([i16; LPC_ORD], Vec<f64>) {
    let windowed = hamming_window(samples);
    let mut autocorr = autocorrelate(&windowed, order);
    // 1 Hz-ish bandwidth expansion / white-noise correction floor, a
    // standard numerical-stability step for short analysis windows.
    autocorr[0] *= 1.0001;
    let (lpc, _err) = levinson_durbin(&autocorr, order);
    let lsf_rad = lpc_to_lsf_rad(&lpc, order);
    (lsf_rad_to_q15(&lsf_rad), lpc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lsf_round_trip_is_close_for_a_simple_resonator() {
        // A single stable pole pair, well inside the unit circle.
        let mut a = vec![0.0; LPC_ORD + 1];
        a[0] = 1.0;
        a[1] = -1.6;
        a[2] = 0.95;
        let lsf_rad = lpc_to_lsf_rad(&a, LPC_ORD);
        for i in 0..lsf_rad.len() - 1 {
            assert!(lsf_rad[i] < lsf_rad[i + 1]);
        }
        let back = lsf_rad_to_lpc(&lsf_rad, LPC_ORD);
        assert!((back[1] - a[1]).abs() < 0.2, "back={back:?}");
    }

    #[test]
    fn degenerate_input_still_yields_sorted_lsfs() {
        let a = vec![0.0; LPC_ORD + 1];
        let lsf_rad = lpc_to_lsf_rad(&a, LPC_ORD);
        assert_eq!(lsf_rad.len(), LPC_ORD);
        for i in 0..lsf_rad.len() - 1 {
            assert!(lsf_rad[i] <= lsf_rad[i + 1] + 1e-9);
        }
    }

    #[test]
    fn analyze_on_silence_is_well_formed() {
        let samples = [0i16; 180];
        let (lsf, _) = analyze(&samples, LPC_ORD);
        for i in 0..LPC_ORD - 1 {
            assert!(lsf[i + 1] > lsf[i]);
        }
    }
}
