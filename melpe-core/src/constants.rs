//! Shared constants for the MELPe codec core (STANAG 4591 §3-§4).
//!
//! Values carried over unchanged from `examples/original_source/src/melpe_core/`
//! are annotated with the header file they came from; values not present in
//! the extracted sources (e.g. 2400/1200-specific bit widths) are taken
//! directly from `spec.md`'s tables.

/// Samples per analysis frame at every rate (22.5 ms at 8 kHz).
pub const FRAME: usize = 180;
/// Sample rate in Hz.
pub const SAMPLE_RATE: u32 = 8000;
/// LPC model order.
pub const LPC_ORD: usize = 10;
/// Number of band-pass voicing bands.
pub const NUM_BANDS: usize = 5;
/// Number of sub-frame gains per analysis frame.
pub const NUM_GAINFR: usize = 2;
/// Number of Fourier harmonic magnitudes per frame.
pub const NUM_HARM: usize = 10;

/// Minimum pitch lag in samples.
pub const PITCHMIN: usize = 20;
/// Maximum pitch lag in samples.
pub const PITCHMAX: usize = 160;
/// Unvoiced-frame placeholder pitch, Q7 log domain (cst600_qpit.h companion).
pub const UV_PITCH_Q7: i16 = 50 * 128;

/// Minimum LSF separation, Q15 radians-ish domain (enforced after every
/// decode/interpolation step per spec.md §3 invariants).
pub const BWMIN_Q15: i16 = 50;

/// Gain bounds in dB-equivalent Q8 fixed point.
pub const GAIN_MIN_DB_Q8: i16 = 10 * 256;
pub const GAIN_MAX_DB_Q8: i16 = 74 * 256;

/// BFI attenuation factor, Q15 (cst600_bfi.h: `ATT_GAIN = 31129`, ~0.95).
pub const ATT_GAIN_Q15: i16 = 31129;

// ---- 2400 b/s -------------------------------------------------------------

pub const RATE_2400_BITS: usize = 54;
pub const RATE_2400_BYTES: usize = 7;

pub const LSF_MSVQ_STAGE_BITS_2400: [u8; 4] = [7, 6, 6, 6];
pub const FOURIER_VQ_BITS_2400: u8 = 8;
pub const GAIN0_BITS_2400: u8 = 5;
pub const GAIN1_BITS_2400: u8 = 3;
pub const PITCH_BITS_2400: u8 = 7;
pub const BPVC_BITS_2400: u8 = 2;
pub const JITTER_UV_BITS_2400: u8 = 1;
pub const SYNC_BITS_2400: u8 = 3;

pub const MBEST_LSF_2400: usize = 8;

pub const PIT_QLEV_M1_2400: i32 = (1 << PITCH_BITS_2400) - 1;

// ---- 1200 b/s ---------------------------------------------------------

pub const FRAMES_PER_BLOCK_1200: usize = 3;
pub const RATE_1200_BITS: usize = 81;
pub const RATE_1200_BYTES: usize = 11;

/// LSF MSVQ stage bit widths applied to the block's middle frame
/// (7+6+5+5 = 23 bits); the outer two frames carry delta codes instead of
/// a full MSVQ path, matching the "re-interpolated and re-MSVQ'd with a
/// smaller codebook budget" framing of spec.md §4.4.
pub const LSF_MSVQ_STAGE_BITS_1200: [u8; 4] = [7, 6, 5, 5];
/// Per-frame LSF delta code width for the two non-reference frames.
pub const LSF_DELTA_BITS_1200: u8 = 4;
/// Absolute pitch code width (one frame of the block carries an absolute
/// value, the other two carry trajectory deltas per spec.md §4.4).
pub const PITCH_ABS_BITS_1200: u8 = 7;
pub const PITCH_DELTA_BITS_1200: u8 = 5;
/// Absolute first-subframe gain code width; the remaining five sub-frame
/// gains of the block are delta-coded against their predecessor.
pub const GAIN_ABS_BITS_1200: u8 = 5;
pub const GAIN_DELTA_BITS_1200: u8 = 4;
/// 3-frame voicing pattern codebook (16 entries).
pub const VOICING_PATTERN_BITS_1200: u8 = 4;
pub const VOICING_PATTERN_CBK_SIZE_1200: usize = 16;
pub const JITTER_UV_BITS_1200: u8 = 1;
pub const SYNC_BITS_1200: u8 = 1;

// ---- 600 b/s (cst600.h) ----------------------------------------------

/// Frames per super-frame (`NF600`).
pub const NF600: usize = 4;
/// Consecutive-frame grouping for joint LSF quantization (`NSUBFRAME600`).
pub const NSUBFRAME600: usize = 2;
/// Super-frame size in samples (`BLOCK600`).
pub const BLOCK600: usize = NF600 * FRAME;
/// Super-frame bit count (`NBITS600`).
pub const NBITS600: usize = 54;
/// Super-frame byte count (`NBYTES600`).
pub const NBYTES600: usize = 7;
/// Number of encoding modes (`NMODE600`).
pub const NMODE600: usize = 6;
/// Maximum MSVQ stage count for LSF quantization (`NSTAGEMAX`).
pub const NSTAGEMAX: usize = 4;
/// M-best survivor count for LSF MSVQ (`MBEST_LSF`).
pub const MBEST_LSF_600: usize = 8;
/// M-best survivor count for gain MSVQ (`MBEST_GAIN`, cst600_gain.h).
pub const MBEST_GAIN_600: usize = 8;

/// Stage-1 mean-removal domain shift (cst600_msvq.h `L_SHIFT_ST1`). Stage 1
/// of the LSF MSVQ quantizes `(input − mean) << L_SHIFT_ST1`, not the raw
/// input, per spec.md §4.5.2. The mechanism (mean subtraction ahead of
/// stage 1, confirmed by `var600_msvq.c`) is recoverable from the
/// extracted sources; the exact shift magnitude is not, so `2` is used as
/// a representative precision-preserving value (see DESIGN.md).
pub const L_SHIFT_ST1: i16 = 2;
/// Domain shift applied to the stage-1 residual before stages 2-4
/// (cst600_msvq.h `L_SHIFT_STN`); later stages quantize in this rescaled
/// domain rather than `L_SHIFT_ST1`'s.
pub const L_SHIFT_STN: i16 = 1;

/// Post-filter coefficients specific to 600 b/s (cst600.h).
pub const ALPH600_Q15: i16 = 11468; // 0.35
pub const BETA600_Q15: i16 = 26214; // 0.80
pub const MU600_Q15: i16 = 16384; // 0.50

/// Voicing pattern codebook (cst600_voicing.h).
pub const NBIT_VOICING: u8 = 5;
pub const VOICING_CBK_SIZE: usize = 32;

/// Pitch lag quantization bit widths (cst600_qpit.h).
pub const NBIT_PITCH1: u8 = 6;
pub const NPITCH_VAL1: usize = 64;
pub const NBIT_PITCH2: u8 = 5;
pub const NPITCH_VAL2: usize = 32;

/// f0 bounds in Hz (cst600_qpit.h).
pub const F0_MAX_HZ: f32 = 400.0;
pub const F0_MIN_HZ: f32 = 50.0;

/// Mode -> mode-dependent lookup tables (var600_mode.c / var600_gain.c).
pub const MODE600: [[u8; NMODE600]; NMODE600] = [
    [0, 1, 1, 3, 3, 3],
    [1, 2, 2, 4, 4, 4],
    [1, 2, 2, 4, 4, 4],
    [3, 4, 4, 5, 5, 5],
    [3, 4, 4, 5, 5, 5],
    [3, 4, 4, 5, 5, 5],
];

pub const ICBK1LSF: [[u8; NMODE600]; NMODE600] = [
    [0, 1, 1, 1, 1, 1],
    [0, 1, 1, 1, 1, 1],
    [0, 1, 1, 1, 1, 1],
    [0, 1, 1, 0, 0, 0],
    [0, 1, 1, 0, 0, 0],
    [0, 1, 1, 0, 0, 0],
];

pub const ICBK2LSF: [[u8; NMODE600]; NMODE600] = [
    [0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1],
    [1, 1, 1, 0, 0, 0],
    [1, 1, 1, 0, 0, 0],
    [1, 1, 1, 0, 0, 0],
];

pub const ICBKGAIN: [u8; NMODE600] = [0, 0, 1, 1, 1, 2];
pub const NSTGGAIN: [u8; NMODE600] = [2, 2, 2, 2, 2, 1];
pub const NBITS1GAIN: [u8; NMODE600] = [7, 7, 6, 6, 6, 9];
pub const NBITS2GAIN: [u8; NMODE600] = [6, 6, 5, 5, 5, 0];

/// Per-pair LSF MSVQ bit totals, indexed by `mode600` (lib600_msvq.c pools:
/// 18 = 4-stage `(64,16,16,16)`, 16 = type-2 `(128,32,16)`, 15 = type-3
/// `(64,32,16)`, 14 = type-1 `(64,16,16)`). Mode 0 is the only mode that can
/// reach the 4-stage pool on both pairs (it is the only `(iclass0,iclass1)`
/// group with `iclass0 == iclass1 == 0`); the rest are resolved to the
/// type-1/2/3 split that keeps the per-mode total at exactly
/// [`NBITS600`] once combined with [`MODE600_PITCH_BITS`] and
/// `NBITS1GAIN`/`NBITS2GAIN` (see DESIGN.md for the derivation).
pub const MODE600_LSF_STAGE_BITS: [[u8; NSUBFRAME600]; NMODE600] =
    [[18, 18], [16, 14], [15, 15], [16, 14], [15, 15], [16, 16]];

/// Pitch trajectory bit budget per `mode600`: 0 (held, mode 0), 6 (single
/// code, mode 1), 8 (`iq` + `lq` + `tq` = 5 + 2 + 1, modes 2-5).
pub const MODE600_PITCH_BITS: [u8; NMODE600] = [0, 6, 8, 8, 8, 8];

/// LSF MSVQ stage sizes (entries per stage) for each of the four pools
/// named in [`MODE600_LSF_STAGE_BITS`].
pub const LSF600_POOL_4STAGE: [usize; 4] = [64, 16, 16, 16];
pub const LSF600_POOL_TYPE1: [usize; 3] = [64, 16, 16];
pub const LSF600_POOL_TYPE2: [usize; 3] = [128, 32, 16];
pub const LSF600_POOL_TYPE3: [usize; 3] = [64, 32, 16];

// ---- Post-filter (shared shape, rate-specific strength) -------------------

/// Pole/zero formant sharpening + gain-smoothing coefficients for 2400/1200
/// b/s. 600 b/s uses its own, slightly less aggressive, constants
/// ([`ALPH600_Q15`]/[`BETA600_Q15`]/[`MU600_Q15`]) because its larger
/// analysis block makes the filter more prone to ringing.
pub const ALPHA_Q15: i16 = 16384; // 0.50
pub const BETA_Q15: i16 = 26214; // 0.80
pub const MU_Q15: i16 = 16384; // 0.50

// ---- Pitch (2400/1200 b/s scalar log-domain quantizer) --------------------

/// Lower bound of the `log10(pitch)` quantizer range, Q7
/// (`log10(PITCHMIN) = log10(20) = 1.30103`, times `2^7`).
pub const PIT_QLO_Q7: i16 = 167;
/// Upper bound of the `log10(pitch)` quantizer range, Q7
/// (`log10(PITCHMAX) = log10(160) = 2.20412`, times `2^7`).
pub const PIT_QUP_Q7: i16 = 282;
