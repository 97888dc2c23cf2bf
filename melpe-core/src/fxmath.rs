//! Saturating fixed-point arithmetic primitives (STANAG 4591 §4.1, "FxMath").
//!
//! This mirrors the ITU-T/STANAG "basic operations" set (`add`, `sub`,
//! `mult`, `l_mac`, shifts, `norm_l`, `round`, `div_s`, ...): every routine
//! here is exactly-rounded and saturating, never panicking on overflow.
//! The codec's wire format depends on these being bit-identical across
//! implementations, so none of them are "simplified".
//!
//! `Word16`/`Word32` follow the reference naming; Q-format is tracked by
//! convention in callers' doc comments, not in the type system, matching
//! how the STANAG reference and its Rust ports (see `g729a::basic_ops`)
//! express it.

#![allow(clippy::manual_range_contains)]

/// 16-bit fixed-point word.
pub type Word16 = i16;
/// 32-bit fixed-point accumulator.
pub type Word32 = i32;

pub const MAX_16: Word16 = i16::MAX;
pub const MIN_16: Word16 = i16::MIN;
pub const MAX_32: Word32 = i32::MAX;
pub const MIN_32: Word32 = i32::MIN;

/// Saturate a 32-bit value into 16 bits.
#[inline]
pub fn saturate(l_var1: Word32) -> Word16 {
    if l_var1 > 0x0000_7fff {
        MAX_16
    } else if l_var1 < -0x0000_8000 {
        MIN_16
    } else {
        l_var1 as Word16
    }
}

/// Saturating 16-bit addition.
#[inline]
pub fn add(var1: Word16, var2: Word16) -> Word16 {
    saturate(var1 as Word32 + var2 as Word32)
}

/// Saturating 16-bit subtraction.
#[inline]
pub fn sub(var1: Word16, var2: Word16) -> Word16 {
    saturate(var1 as Word32 - var2 as Word32)
}

/// Saturating 16-bit negation.
#[inline]
pub fn negate(var1: Word16) -> Word16 {
    if var1 == MIN_16 {
        MAX_16
    } else {
        -var1
    }
}

/// 16-bit absolute value, saturating at `i16::MIN`.
#[inline]
pub fn abs_s(var1: Word16) -> Word16 {
    if var1 == MIN_16 {
        MAX_16
    } else {
        var1.abs()
    }
}

/// Saturating arithmetic left shift (negative `var2` shifts right).
#[inline]
pub fn shl(var1: Word16, var2: i16) -> Word16 {
    if var2 < 0 {
        shr(var1, -var2)
    } else if var2 >= 15 {
        if var1 > 0 { MAX_16 } else if var1 < 0 { MIN_16 } else { 0 }
    } else {
        saturate((var1 as Word32) << var2)
    }
}

/// Arithmetic right shift (negative `var2` shifts left, saturating).
#[inline]
pub fn shr(var1: Word16, var2: i16) -> Word16 {
    if var2 < 0 {
        shl(var1, -var2)
    } else if var2 >= 15 {
        if var1 < 0 { -1 } else { 0 }
    } else {
        var1 >> var2
    }
}

/// Saturating 32-bit left shift.
#[inline]
pub fn l_shl(l_var1: Word32, var2: i16) -> Word32 {
    if var2 <= 0 {
        l_shr(l_var1, -var2)
    } else {
        let mut result = l_var1;
        for _ in 0..var2 {
            if result > 0x3fff_ffff {
                return MAX_32;
            } else if result < -0x4000_0000 {
                return MIN_32;
            }
            result <<= 1;
        }
        result
    }
}

/// Arithmetic 32-bit right shift (no saturation needed, magnitude shrinks).
#[inline]
pub fn l_shr(l_var1: Word32, var2: i16) -> Word32 {
    if var2 < 0 {
        l_shl(l_var1, -var2)
    } else if var2 >= 31 {
        if l_var1 < 0 { -1 } else { 0 }
    } else {
        l_var1 >> var2
    }
}

/// 16x16 -> 16 fractional multiply with rounding (Q15 * Q15 = Q15).
#[inline]
pub fn mult(var1: Word16, var2: Word16) -> Word16 {
    saturate(((var1 as Word32 * var2 as Word32) >> 15) as Word32)
}

/// 16x16 -> 16 fractional multiply with round-to-nearest.
#[inline]
pub fn mult_r(var1: Word16, var2: Word16) -> Word16 {
    let product = var1 as Word32 * var2 as Word32;
    let rounded = (product + 0x4000) >> 15;
    saturate(rounded)
}

/// 16x16 -> 32 fractional multiply (Q15 * Q15 = Q31, saturating at the
/// single representable overflow point `-1.0 * -1.0`).
#[inline]
pub fn l_mult(var1: Word16, var2: Word16) -> Word32 {
    let product = var1 as Word32 * var2 as Word32;
    if product == 0x4000_0000 {
        MAX_32
    } else {
        product * 2
    }
}

/// Saturating 32-bit addition.
#[inline]
pub fn l_add(l_var1: Word32, l_var2: Word32) -> Word32 {
    l_var1.saturating_add(l_var2)
}

/// Saturating 32-bit subtraction.
#[inline]
pub fn l_sub(l_var1: Word32, l_var2: Word32) -> Word32 {
    l_var1.saturating_sub(l_var2)
}

/// Multiply-accumulate: `l_var3 + var1 * var2` (Q31 accumulator).
#[inline]
pub fn l_mac(l_var3: Word32, var1: Word16, var2: Word16) -> Word32 {
    l_add(l_var3, l_mult(var1, var2))
}

/// Multiply-subtract: `l_var3 - var1 * var2` (Q31 accumulator).
#[inline]
pub fn l_msu(l_var3: Word32, var1: Word16, var2: Word16) -> Word32 {
    l_sub(l_var3, l_mult(var1, var2))
}

/// Round `l_var1` (Q31-ish 32-bit accumulator) to a saturated 16-bit word:
/// `round(L) = sat16((L + 0x8000) >> 16)`.
#[inline]
pub fn round(l_var1: Word32) -> Word16 {
    let rounded = l_add(l_var1, 0x0000_8000);
    (rounded >> 16) as Word16
}

/// Extract the high 16 bits of a 32-bit accumulator.
#[inline]
pub fn extract_h(l_var1: Word32) -> Word16 {
    (l_var1 >> 16) as Word16
}

/// Extract the low 16 bits of a 32-bit accumulator.
#[inline]
pub fn extract_l(l_var1: Word32) -> Word16 {
    (l_var1 & 0xffff) as Word16
}

/// Deposit a 16-bit value into the high half of a 32-bit word.
#[inline]
pub fn l_deposit_h(var1: Word16) -> Word32 {
    (var1 as Word32) << 16
}

/// Deposit a 16-bit value into the low half of a 32-bit word, sign-extended.
#[inline]
pub fn l_deposit_l(var1: Word16) -> Word32 {
    var1 as Word32
}

/// Number of left shifts needed to normalize a 16-bit value (leading
/// redundant sign bits, i.e. `norm_s`).
#[inline]
pub fn norm_s(var1: Word16) -> Word16 {
    if var1 == 0 {
        return 0;
    }
    if var1 == -1 {
        return 15;
    }
    let mut tmp = if var1 < 0 { !var1 } else { var1 };
    let mut shifts = 0;
    while tmp < 0x4000 {
        tmp <<= 1;
        shifts += 1;
    }
    shifts
}

/// Number of left shifts needed to normalize a 32-bit value (`norm_l`).
#[inline]
pub fn norm_l(l_var1: Word32) -> Word16 {
    if l_var1 == 0 {
        return 0;
    }
    if l_var1 == -1 {
        return 31;
    }
    let mut tmp = if l_var1 < 0 { !l_var1 } else { l_var1 };
    let mut shifts = 0i16;
    while tmp < 0x4000_0000 {
        tmp <<= 1;
        shifts += 1;
    }
    shifts
}

/// 16-bit fractional division: `var1 / var2` as a Q15 quotient.
/// Requires `0 <= var1 <= var2` (the reference's contract); returns 0 for
/// `var1 == 0` and `MAX_16` for `var1 == var2` rather than panicking, since
/// core codec paths must remain total (STANAG 4591 §4.2 "Analysis is
/// total").
#[inline]
pub fn div_s(var1: Word16, var2: Word16) -> Word16 {
    if var2 <= 0 || var1 < 0 || var1 > var2 {
        return 0;
    }
    if var1 == 0 {
        return 0;
    }
    if var1 == var2 {
        return MAX_16;
    }
    let mut quotient: Word16 = 0;
    let mut num = l_deposit_l(var1);
    let denom = l_deposit_l(var2);
    for _ in 0..15 {
        quotient <<= 1;
        num <<= 1;
        if num >= denom {
            num = l_sub(num, denom);
            quotient = add(quotient, 1);
        }
    }
    quotient
}

/// Integer square root of a non-negative Q0 `Word32`, returned in the same
/// domain (used by gain/energy computations that need `sqrt` of a sum of
/// squares before converting to log domain).
pub fn sqrt_fxp(value: Word32) -> Word32 {
    if value <= 0 {
        return 0;
    }
    let mut x = value as i64;
    let mut guess = x;
    if guess > 0 {
        // Newton-Raphson integer sqrt; converges in a handful of steps for
        // the 16-32 bit magnitudes the codec ever computes gain/energy from.
        let mut next = (guess + 1) / 2;
        while next < guess {
            guess = next;
            next = (guess + x / guess) / 2;
        }
    }
    x = guess;
    x as Word32
}

/// Base-10 logarithm of a positive Q0 value, returned as `Word32` scaled by
/// `2^LOG10_SCALE_BITS` (the fixed caller-side Q format used by gain and
/// pitch quantization, which both work in "dB-like" log10 domains).
pub const LOG10_SCALE_BITS: u32 = 16;

pub fn log10_fxp(value: Word32) -> Word32 {
    if value <= 0 {
        return 0;
    }
    // ln(value) via norm_l-based range reduction, then ln -> log10 scale.
    let shifts = norm_l(value);
    let mantissa = l_shl(value, shifts) as f64 / (1i64 << 30) as f64;
    let exponent = 30 - shifts as i32;
    let ln_value = mantissa.ln() + exponent as f64 * std::f64::consts::LN_2;
    let log10_value = ln_value / std::f64::consts::LN_10;
    (log10_value * (1i64 << LOG10_SCALE_BITS) as f64).round() as Word32
}

/// Inverse of [`log10_fxp`]: `10^(value / 2^LOG10_SCALE_BITS)`, returned as
/// a Q0 `Word32`.
pub fn pow10_fxp(value: Word32) -> Word32 {
    let exponent = value as f64 / (1i64 << LOG10_SCALE_BITS) as f64;
    (10f64.powf(exponent)).round() as Word32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_add_clamps() {
        assert_eq!(add(MAX_16, 1), MAX_16);
        assert_eq!(add(MIN_16, -1), MIN_16);
        assert_eq!(add(100, 200), 300);
    }

    #[test]
    fn saturating_sub_clamps() {
        assert_eq!(sub(MAX_16, -1), MAX_16);
        assert_eq!(sub(MIN_16, 1), MIN_16);
    }

    #[test]
    fn mult_matches_fractional_semantics() {
        // 0.5 * 0.5 = 0.25 in Q15
        let half = 16384i16;
        let quarter = mult(half, half);
        assert!((quarter as i32 - 8192).abs() <= 1);
    }

    #[test]
    fn round_half_up() {
        assert_eq!(round(0x0001_7fff), 1);
        assert_eq!(round(0x0001_8000), 2);
    }

    #[test]
    fn norm_l_counts_redundant_sign_bits() {
        assert_eq!(norm_l(0), 0);
        assert_eq!(norm_l(-1), 31);
        assert_eq!(norm_l(0x4000_0000), 0);
        assert_eq!(norm_l(1), 30);
    }

    #[test]
    fn div_s_is_total_on_valid_domain() {
        assert_eq!(div_s(0, 10), 0);
        assert_eq!(div_s(10, 10), MAX_16);
        let q = div_s(5, 10);
        assert!((q as i32 - 16384).abs() <= 2);
    }

    #[test]
    fn log10_pow10_roundtrip() {
        let x = 1_000_000i32;
        let l = log10_fxp(x);
        let back = pow10_fxp(l);
        assert!((back - x).abs() < x / 100);
    }

    #[test]
    fn sqrt_fxp_matches_float_sqrt() {
        for v in [0, 1, 4, 9, 1_000_000, i32::MAX / 2] {
            let s = sqrt_fxp(v);
            let approx = (v as f64).sqrt() as i32;
            assert!((s - approx).abs() <= 1, "v={v} s={s} approx={approx}");
        }
    }
}
