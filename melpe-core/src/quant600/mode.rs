//! Voicing quantization and mode selection (STANAG 4591 §4.5.1).

use crate::codebooks::voicing600::{classify, nearest};
use crate::constants::{MODE600, NF600, NUM_BANDS};
use crate::frame::FrameModel;

/// Classifies one half-super-frame (2 frames) into a coarse voicing class
/// `0..=5` (UU, UV, VU, VV-low/med/high), from each frame's canonical
/// shape index (`0..=3`, least to most voiced; `>=2` counts as voiced).
fn half_class(shapes: [u8; 2]) -> u8 {
    let voiced0 = shapes[0] >= 2;
    let voiced1 = shapes[1] >= 2;
    match (voiced0, voiced1) {
        (false, false) => 0,
        (false, true) => 1,
        (true, false) => 2,
        (true, true) => match shapes[0] as u16 + shapes[1] as u16 {
            4 => 3,
            5 => 4,
            _ => 5,
        },
    }
}

/// Result of §4.5.1's voicing quantization: the 5-bit codebook index, the
/// reloaded per-frame `bpvc` values (step 2: "reload each frame's `bpvc`
/// from the codebook entry"), the two half-super-frame classes, and the
/// resulting `mode600`.
pub struct VoicingResult {
    pub voicing_iq: u8,
    pub reloaded_bpvc: [[i16; NUM_BANDS]; NF600],
    pub iclass: [u8; 2],
    pub mode: u8,
}

/// Runs §4.5.1 steps 1-4 over one super-frame's 4 frames.
pub fn quantize(frames: &[FrameModel; NF600]) -> VoicingResult {
    let mut bpvc = [[0i16; NUM_BANDS]; NF600];
    for (dst, f) in bpvc.iter_mut().zip(frames.iter()) {
        *dst = f.bpvc;
    }
    let (voicing_iq, reloaded_bpvc) = nearest(&bpvc);

    let shapes: Vec<u8> = reloaded_bpvc.iter().map(classify).collect();
    let iclass = [half_class([shapes[0], shapes[1]]), half_class([shapes[2], shapes[3]])];
    let mode = MODE600[iclass[0] as usize][iclass[1] as usize];

    VoicingResult { voicing_iq: voicing_iq as u8, reloaded_bpvc, iclass, mode }
}

/// Decoder-side mirror: reload `bpvc` and `mode600` straight from the
/// transmitted 5-bit index (no search needed).
pub fn dequantize(voicing_iq: u8) -> ([[i16; NUM_BANDS]; NF600], [u8; 2], u8) {
    let book = &*crate::codebooks::voicing600::CODEBOOK;
    let reloaded_bpvc = book[voicing_iq as usize % book.len()];
    let shapes: Vec<u8> = reloaded_bpvc.iter().map(classify).collect();
    let iclass = [half_class([shapes[0], shapes[1]]), half_class([shapes[2], shapes[3]])];
    let mode = MODE600[iclass[0] as usize][iclass[1] as usize];
    (reloaded_bpvc, iclass, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_unvoiced_selects_mode_zero() {
        let frames = [
            FrameModel::silence(),
            FrameModel::silence(),
            FrameModel::silence(),
            FrameModel::silence(),
        ];
        let result = quantize(&frames);
        assert_eq!(result.mode, 0);
        assert_eq!(result.iclass, [0, 0]);
    }

    #[test]
    fn quantize_then_dequantize_agree() {
        let mut frames = [FrameModel::silence(), FrameModel::silence(), FrameModel::silence(), FrameModel::silence()];
        for f in frames.iter_mut().take(2) {
            f.bpvc = [16000, 16000, 16000, 16000, 16000];
        }
        let result = quantize(&frames);
        let (bpvc, iclass, mode) = dequantize(result.voicing_iq);
        assert_eq!(bpvc, result.reloaded_bpvc);
        assert_eq!(iclass, result.iclass);
        assert_eq!(mode, result.mode);
    }
}
