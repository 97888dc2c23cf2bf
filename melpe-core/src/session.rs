//! Streaming encoder/decoder session API (STANAG 4591 §4.9 "StreamingAPI").
//!
//! `Encoder`/`Decoder` own everything needed to process one channel at a
//! time: the analyzer or synthesizer, per-rate "previous frame" state for
//! prediction and concealment, and (600 b/s only) the pitch-trajectory
//! continuation point. Neither type holds global or thread-shared state,
//! mirroring the teacher's per-call `G729AEncoder`/`G729ADecoder` session
//! objects.

use crate::analysis::Analyzer;
use crate::bfi::BfiState;
use crate::bitstream::{repack_6_to_8, repack_8_to_6};
use crate::config::{ChannelDensity, Rate, Role, SessionConfig};
use crate::constants::{
    ALPH600_Q15, ALPHA_Q15, BETA600_Q15, BETA_Q15, FRAME, MU600_Q15, MU_Q15, NBITS600,
    RATE_1200_BITS, RATE_2400_BITS,
};
use crate::error::{CodecError, Result};
use crate::frame::FrameModel;
use crate::synth::Synth;
use crate::{quant1200, quant2400, quant600};

fn channel_bits(rate: Rate) -> usize {
    match rate {
        Rate::Rate2400 => RATE_2400_BITS,
        Rate::Rate1200 => RATE_1200_BITS,
        Rate::Rate600 => NBITS600,
    }
}

fn postfilter_coeffs(rate: Rate) -> (i16, i16, i16) {
    match rate {
        Rate::Rate600 => (ALPH600_Q15, BETA600_Q15, MU600_Q15),
        _ => (ALPHA_Q15, BETA_Q15, MU_Q15),
    }
}

/// Analysis + quantization: PCM in, one channel block out per call.
pub struct Encoder {
    config: SessionConfig,
    analyzer: Analyzer,
    prev_par: FrameModel,
    prev_f0_hz: f32,
}

impl Encoder {
    pub fn new(config: SessionConfig) -> Result<Self> {
        if config.role() != Role::Encoder {
            return Err(CodecError::config("Encoder requires a Role::Encoder SessionConfig"));
        }
        Ok(Self {
            analyzer: Analyzer::new(config.npp_enabled()),
            config,
            prev_par: FrameModel::silence(),
            prev_f0_hz: 100.0,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Resets all per-session state (pitch/voicing history, trajectory
    /// continuation) as if a fresh `Encoder` had been constructed.
    pub fn reset(&mut self) {
        self.analyzer.reset();
        self.prev_par = FrameModel::silence();
        self.prev_f0_hz = 100.0;
    }

    fn analyze_frames(&mut self, pcm: &[i16], count: usize) -> Vec<FrameModel> {
        pcm.chunks(FRAME)
            .take(count)
            .map(|chunk| {
                let mut buf = [0i16; FRAME];
                buf.copy_from_slice(chunk);
                self.analyzer.analyze_frame(&buf)
            })
            .collect()
    }

    fn maybe_repack(&self, bytes: Vec<u8>) -> Vec<u8> {
        match self.config.channel_density() {
            ChannelDensity::Packed8 => bytes,
            ChannelDensity::Packed6 => repack_8_to_6(&bytes, channel_bits(self.config.rate())),
        }
    }

    /// Encodes one channel block's worth of PCM (`Rate::samples_per_block`
    /// samples) into its channel byte representation.
    pub fn encode_block(&mut self, pcm: &[i16]) -> Result<Vec<u8>> {
        let needed = self.config.rate().samples_per_block();
        if pcm.len() < needed {
            return Err(CodecError::ShortInput { needed, actual: pcm.len() });
        }

        let bytes = match self.config.rate() {
            Rate::Rate2400 => {
                let frames = self.analyze_frames(pcm, 1);
                let qp = quant2400::quantize(&frames[0]);
                self.prev_par = frames[0].clone();
                quant2400::pack(&qp)
            }
            Rate::Rate1200 => {
                let frames = self.analyze_frames(pcm, 3);
                let frames: [FrameModel; 3] = frames.try_into().expect("3 analyzed frames");
                let qp = quant1200::quantize(&frames);
                self.prev_par = frames[2].clone();
                quant1200::pack(&qp)
            }
            Rate::Rate600 => {
                let frames = self.analyze_frames(pcm, 4);
                let frames: [FrameModel; 4] = frames.try_into().expect("4 analyzed frames");
                let sf = quant600::quantize(&frames, self.prev_f0_hz);
                self.prev_f0_hz = crate::constants::SAMPLE_RATE as f32 / (frames[3].pitch.max(1) as f32);
                self.prev_par = frames[3].clone();
                quant600::pack(&sf)
            }
        };

        Ok(self.maybe_repack(bytes))
    }
}

/// Inverse quantization + synthesis: channel bytes in, PCM out per call,
/// plus a frame-erasure path for BFI concealment.
pub struct Decoder {
    config: SessionConfig,
    synth: Synth,
    bfi: BfiState,
    prev_par: FrameModel,
    prev_f0_hz: f32,
}

impl Decoder {
    pub fn new(config: SessionConfig) -> Result<Self> {
        if config.role() != Role::Decoder {
            return Err(CodecError::config("Decoder requires a Role::Decoder SessionConfig"));
        }
        let (alpha, beta, mu) = postfilter_coeffs(config.rate());
        Ok(Self {
            synth: Synth::with_postfilter_coeffs(config.postfilter_enabled(), alpha, beta, mu),
            bfi: BfiState::new(),
            config,
            prev_par: FrameModel::silence(),
            prev_f0_hz: 100.0,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.synth.reset();
        self.bfi = BfiState::new();
        self.prev_par = FrameModel::silence();
        self.prev_f0_hz = 100.0;
    }

    fn unpacked_bytes<'a>(&self, bytes: &'a [u8], owned: &'a mut Vec<u8>) -> &'a [u8] {
        match self.config.channel_density() {
            ChannelDensity::Packed8 => bytes,
            ChannelDensity::Packed6 => {
                *owned = repack_6_to_8(bytes, channel_bits(self.config.rate()));
                owned
            }
        }
    }

    /// Decodes one channel block into PCM. A malformed/short block is
    /// reported as [`CodecError::ShortInput`]; the session's concealment
    /// state is left untouched so the caller can retry with
    /// [`Decoder::decode_frame_erasure`] instead.
    pub fn decode_block(&mut self, bytes: &[u8]) -> Result<Vec<i16>> {
        let needed = self.config.channel_bytes();
        if bytes.len() < needed {
            return Err(CodecError::ShortInput { needed, actual: bytes.len() });
        }
        let mut owned = Vec::new();
        let repacked = self.unpacked_bytes(bytes, &mut owned);

        let mut pcm = Vec::with_capacity(self.config.rate().samples_per_block());
        match self.config.rate() {
            Rate::Rate2400 => {
                let qp = quant2400::unpack(repacked)?;
                let frame = quant2400::dequantize(&qp);
                pcm.extend_from_slice(&self.synth.synthesize_frame(&frame));
                self.prev_par = frame;
            }
            Rate::Rate1200 => {
                let qp = quant1200::unpack(repacked)?;
                let frames = quant1200::dequantize(&qp);
                for f in &frames {
                    pcm.extend_from_slice(&self.synth.synthesize_frame(f));
                }
                self.prev_par = frames[2].clone();
            }
            Rate::Rate600 => {
                let sf = quant600::unpack(repacked)?;
                let (frames, last_f0) = quant600::dequantize(&sf, self.prev_f0_hz);
                for f in &frames {
                    pcm.extend_from_slice(&self.synth.synthesize_frame(f));
                }
                self.prev_f0_hz = last_f0;
                self.prev_par = frames[3].clone();
            }
        }
        self.bfi.on_good_frame();
        Ok(pcm)
    }

    /// Conceals one erased channel block (§4.8 "BFI"): repeats `prev_par`
    /// with decaying gain instead of decoding real channel bits.
    pub fn decode_frame_erasure(&mut self) -> Vec<i16> {
        let concealed = self.bfi.conceal(&self.prev_par);
        let frames_per_block = self.config.rate().frames_per_block();
        let mut pcm = Vec::with_capacity(self.config.rate().samples_per_block());
        for _ in 0..frames_per_block {
            pcm.extend_from_slice(&self.synth.synthesize_frame(&concealed));
        }
        self.prev_par = concealed;
        pcm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq_hz: f64, len: usize) -> Vec<i16> {
        (0..len)
            .map(|n| {
                (8000.0
                    * (2.0 * std::f64::consts::PI * freq_hz * n as f64
                        / crate::constants::SAMPLE_RATE as f64)
                        .sin()) as i16
            })
            .collect()
    }

    #[test]
    fn encode_then_decode_2400_round_trip_preserves_length() {
        let enc_cfg = SessionConfig::encoder(Rate::Rate2400, ChannelDensity::Packed8).unwrap();
        let dec_cfg = SessionConfig::decoder(Rate::Rate2400, ChannelDensity::Packed8).unwrap();
        let mut encoder = Encoder::new(enc_cfg).unwrap();
        let mut decoder = Decoder::new(dec_cfg).unwrap();

        let pcm = tone(150.0, FRAME);
        let bytes = encoder.encode_block(&pcm).unwrap();
        assert_eq!(bytes.len(), crate::constants::RATE_2400_BYTES);
        let out = decoder.decode_block(&bytes).unwrap();
        assert_eq!(out.len(), FRAME);
    }

    #[test]
    fn encode_then_decode_1200_round_trip_preserves_length() {
        let enc_cfg = SessionConfig::encoder(Rate::Rate1200, ChannelDensity::Packed8).unwrap();
        let dec_cfg = SessionConfig::decoder(Rate::Rate1200, ChannelDensity::Packed8).unwrap();
        let mut encoder = Encoder::new(enc_cfg).unwrap();
        let mut decoder = Decoder::new(dec_cfg).unwrap();

        let pcm = tone(150.0, FRAME * 3);
        let bytes = encoder.encode_block(&pcm).unwrap();
        assert_eq!(bytes.len(), crate::constants::RATE_1200_BYTES);
        let out = decoder.decode_block(&bytes).unwrap();
        assert_eq!(out.len(), FRAME * 3);
    }

    #[test]
    fn encode_then_decode_600_round_trip_preserves_length() {
        let enc_cfg = SessionConfig::encoder(Rate::Rate600, ChannelDensity::Packed8).unwrap();
        let dec_cfg = SessionConfig::decoder(Rate::Rate600, ChannelDensity::Packed8).unwrap();
        let mut encoder = Encoder::new(enc_cfg).unwrap();
        let mut decoder = Decoder::new(dec_cfg).unwrap();

        let pcm = tone(150.0, FRAME * 4);
        let bytes = encoder.encode_block(&pcm).unwrap();
        assert_eq!(bytes.len(), crate::constants::NBYTES600);
        let out = decoder.decode_block(&bytes).unwrap();
        assert_eq!(out.len(), FRAME * 4);
    }

    #[test]
    fn packed6_round_trips_through_the_bit_repacker() {
        let enc_cfg = SessionConfig::encoder(Rate::Rate600, ChannelDensity::Packed6).unwrap();
        let dec_cfg = SessionConfig::decoder(Rate::Rate600, ChannelDensity::Packed6).unwrap();
        let mut encoder = Encoder::new(enc_cfg).unwrap();
        let mut decoder = Decoder::new(dec_cfg).unwrap();

        let pcm = tone(150.0, FRAME * 4);
        let bytes = encoder.encode_block(&pcm).unwrap();
        assert_eq!(bytes.len(), encoder.config().channel_bytes());
        let out = decoder.decode_block(&bytes).unwrap();
        assert_eq!(out.len(), FRAME * 4);
    }

    #[test]
    fn frame_erasure_fades_instead_of_erroring() {
        let dec_cfg = SessionConfig::decoder(Rate::Rate2400, ChannelDensity::Packed8).unwrap();
        let mut decoder = Decoder::new(dec_cfg).unwrap();
        let first = decoder.decode_frame_erasure();
        assert_eq!(first.len(), FRAME);
        let second = decoder.decode_frame_erasure();
        assert_eq!(second.len(), FRAME);
    }

    #[test]
    fn short_block_is_reported_not_panicked() {
        let enc_cfg = SessionConfig::encoder(Rate::Rate2400, ChannelDensity::Packed8).unwrap();
        let mut encoder = Encoder::new(enc_cfg).unwrap();
        let err = encoder.encode_block(&[0i16; 10]).unwrap_err();
        assert!(matches!(err, CodecError::ShortInput { .. }));
    }
}
