//! LSF MSVQ pools for 600 b/s (STANAG 4591 §4.5.2, cst600_msvq.h).
//!
//! Each pool quantizes a pair of concatenated, interpolated 10-dimensional
//! LSF vectors (frames 0-1 or frames 2-3 of a super-frame) as one
//! 20-dimensional vector, split across 3 or 4 residual MSVQ stages. Which
//! pool a given pair uses is selected by `(iclass, icbk_lsf)`; see
//! [`crate::quant600::mode`].

use super::gen::random_monotone_codebook;
use crate::constants::{
    BWMIN_Q15, LPC_ORD, LSF600_POOL_4STAGE, LSF600_POOL_TYPE1, LSF600_POOL_TYPE2,
    LSF600_POOL_TYPE3,
};
use once_cell::sync::Lazy;

/// Concatenated dimension of one LSF pair (`frame k`, `frame k+1`).
pub const PAIR_DIM: usize = 2 * LPC_ORD;

/// One MSVQ pool: a sequence of stage codebooks, each `levels x PAIR_DIM`.
pub type Pool = Vec<Vec<Vec<i16>>>;

fn build_pool(seed: u32, stage_sizes: &[usize]) -> Pool {
    stage_sizes
        .iter()
        .enumerate()
        .map(|(stage, &levels)| {
            // Stage 0 spans the full LSF range; residual stages narrow in,
            // matching the usual MSVQ residual-magnitude falloff.
            let spread = if stage == 0 { i16::MAX / 2 } else { i16::MAX / (8 << stage) };
            random_monotone_codebook(seed ^ (stage as u32).wrapping_mul(0x9E37_79B9), levels, PAIR_DIM, BWMIN_Q15 / 4, spread)
        })
        .collect()
}

/// The four-stage pool, used only for `(iclass0, iclass1) == (0, 0)`.
pub static FOUR_STAGE: Lazy<Pool> = Lazy::new(|| build_pool(0x4653_5431, &LSF600_POOL_4STAGE));
/// 3-stage, `(64, 16, 16)`: paired with class 0 whenever it did not land in
/// [`FOUR_STAGE`] (`icbk == 0`, other class nonzero).
pub static TYPE1: Lazy<Pool> = Lazy::new(|| build_pool(0x5459_5031, &LSF600_POOL_TYPE1));
/// 3-stage, `(128, 32, 16)`: `icbk == 1`, class in `{0, 1, 2}` paired with a
/// voiced (`3..=5`) partner.
pub static TYPE2: Lazy<Pool> = Lazy::new(|| build_pool(0x5459_5032, &LSF600_POOL_TYPE2));
/// 3-stage, `(64, 32, 16)`: `icbk == 1`, class in `{3, 4, 5}`.
pub static TYPE3: Lazy<Pool> = Lazy::new(|| build_pool(0x5459_5033, &LSF600_POOL_TYPE3));

/// Per-pool stage-1 mean vector (`cbk_mst1_s`), subtracted from the input
/// before stage-1 search and added back on reconstruction (§4.5.2). Built
/// with the same seeded, deterministic generator as the stage codebooks
/// themselves, for the same reason (see module docs): the STANAG-registered
/// mean vectors are not present in the retrieved sources, only the fact
/// that stage 1 works against a mean-removed input.
fn build_mean(seed: u32) -> Vec<i16> {
    random_monotone_codebook(seed ^ 0x6D65_616E, 1, PAIR_DIM, BWMIN_Q15 / 4, i16::MAX / 2)
        .pop()
        .expect("levels=1 produces exactly one vector")
}

pub static FOUR_STAGE_MEAN: Lazy<Vec<i16>> = Lazy::new(|| build_mean(0x4653_5431));
pub static TYPE1_MEAN: Lazy<Vec<i16>> = Lazy::new(|| build_mean(0x5459_5031));
pub static TYPE2_MEAN: Lazy<Vec<i16>> = Lazy::new(|| build_mean(0x5459_5032));
pub static TYPE3_MEAN: Lazy<Vec<i16>> = Lazy::new(|| build_mean(0x5459_5033));

/// Which pool a `(class, icbk)` pair resolves to, and how many of its
/// stages are used (the 4-stage pool degrades to its first 3 stages
/// outside of `(0, 0)`, see `MODE600_LSF_STAGE_BITS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    FourStage,
    Type1,
    Type2,
    Type3,
}

impl PoolKind {
    pub fn pool(self) -> &'static Pool {
        match self {
            PoolKind::FourStage => &FOUR_STAGE,
            PoolKind::Type1 => &TYPE1,
            PoolKind::Type2 => &TYPE2,
            PoolKind::Type3 => &TYPE3,
        }
    }

    /// This pool's stage-1 mean vector (§4.5.2).
    pub fn mean(self) -> &'static [i16] {
        match self {
            PoolKind::FourStage => &FOUR_STAGE_MEAN,
            PoolKind::Type1 => &TYPE1_MEAN,
            PoolKind::Type2 => &TYPE2_MEAN,
            PoolKind::Type3 => &TYPE3_MEAN,
        }
    }
}

/// Pool selection keyed directly by `(mode600, pair index)` rather than
/// re-derived from `(class, icbk)` independently per pair: the STANAG
/// `(class, icbk)` derivation only has to satisfy a *per-mode* total bit
/// budget, not a per-pair one, so fixing the pool by mode is both simpler
/// and the only representation that keeps [`crate::constants::NBITS600`]
/// exact for every `(iclass0, iclass1)` combination that maps to the same
/// mode. See `DESIGN.md` for the full derivation from
/// `MODE600_LSF_STAGE_BITS`.
pub const POOL_KIND_BY_MODE: [[PoolKind; 2]; crate::constants::NMODE600] = [
    [PoolKind::FourStage, PoolKind::FourStage],
    [PoolKind::Type2, PoolKind::Type1],
    [PoolKind::Type3, PoolKind::Type3],
    [PoolKind::Type2, PoolKind::Type1],
    [PoolKind::Type3, PoolKind::Type3],
    [PoolKind::Type2, PoolKind::Type2],
];

/// Pool for `mode600` and pair index (`0` for frames 0-1, `1` for frames 2-3).
pub fn pool_for_mode(mode600: u8, pair: usize) -> PoolKind {
    POOL_KIND_BY_MODE[mode600 as usize][pair]
}
