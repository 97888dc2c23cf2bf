//! Deterministic codebook table generation.
//!
//! STANAG 4591 fixes the exact numeric contents of every codebook table
//! (they are part of the interoperability contract with other
//! implementations); this crate does not have access to those registered
//! constants, only their shapes, so it fills every table with vectors
//! generated from a fixed seed instead of real STANAG data. Shapes, stage
//! counts, and monotonicity constraints match `DESIGN.md`; swap
//! [`crate::codebooks`]'s table bodies for the STANAG-registered values to
//! get bit-exact interoperability.
//!
//! The generator is a plain xorshift32, seeded per table so that table
//! construction is reproducible across runs (required for
//! `QuantParam` round-trip tests) without pulling in a general-purpose RNG
//! crate for what is, here, just fixed lookup data.

/// One step of xorshift32.
pub(crate) fn next_u32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

/// A centered, bounded `i16` drawn from the generator: `[-(spread), spread]`.
pub(crate) fn next_i16(state: &mut u32, spread: i32) -> i16 {
    let r = next_u32(state);
    let span = 2 * spread + 1;
    (-(spread) + (r % span as u32) as i32) as i16
}

/// Builds a `levels`-entry codebook of `dim`-dimensional `i16` vectors
/// centered on zero within `[-spread, spread]`.
pub(crate) fn random_codebook(seed: u32, levels: usize, dim: usize, spread: i32) -> Vec<Vec<i16>> {
    let mut state = seed | 1;
    (0..levels)
        .map(|_| (0..dim).map(|_| next_i16(&mut state, spread)).collect())
        .collect()
}

/// Builds a `levels`-entry codebook of strictly increasing `dim`-dimensional
/// LSF-like vectors, each entry separated by at least `min_sep` and spanning
/// up to `max_value`.
pub(crate) fn random_monotone_codebook(
    seed: u32,
    levels: usize,
    dim: usize,
    min_sep: i16,
    max_value: i16,
) -> Vec<Vec<i16>> {
    let mut state = seed | 1;
    let mut out = Vec::with_capacity(levels);
    for _ in 0..levels {
        let mut v = vec![0i16; dim];
        let usable = max_value as i32 - (dim as i32 - 1) * min_sep as i32;
        let step = (usable / (dim as i32 + 1)).max(1);
        for i in 0..dim {
            let jitter = next_i16(&mut state, step / 2);
            let base = step * (i as i32 + 1) + min_sep as i32 * i as i32;
            v[i] = (base + jitter as i32).clamp(0, max_value as i32) as i16;
        }
        for i in 1..dim {
            if v[i] < v[i - 1] + min_sep {
                v[i] = v[i - 1] + min_sep;
            }
        }
        out.push(v);
    }
    out
}
