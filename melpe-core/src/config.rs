//! Session configuration (STANAG 4591 §6 "External Interfaces").
//!
//! A [`SessionConfig`] is validated once, at construction, so that
//! [`crate::session::Encoder`] and [`crate::session::Decoder`] can assume a
//! well-formed rate/channel-density combination for their entire lifetime.

use crate::constants::{
    FRAME, FRAMES_PER_BLOCK_1200, NBYTES600, NF600, RATE_1200_BYTES, RATE_2400_BYTES,
};
use crate::error::{CodecError, Result};

/// The three bit rates STANAG 4591 defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rate {
    /// 2400 b/s, one 180-sample frame per channel block.
    Rate2400,
    /// 1200 b/s, a 3-frame (540-sample) block per channel block.
    Rate1200,
    /// 600 b/s, a 4-frame (720-sample) super-frame per channel block.
    Rate600,
}

impl Rate {
    /// PCM samples consumed (encoder) or produced (decoder) per channel
    /// block, at 8 kHz.
    pub fn samples_per_block(self) -> usize {
        match self {
            Rate::Rate2400 => FRAME,
            Rate::Rate1200 => FRAME * FRAMES_PER_BLOCK_1200,
            Rate::Rate600 => FRAME * NF600,
        }
    }

    /// Analysis frames packed into a single channel block.
    pub fn frames_per_block(self) -> usize {
        match self {
            Rate::Rate2400 => 1,
            Rate::Rate1200 => FRAMES_PER_BLOCK_1200,
            Rate::Rate600 => NF600,
        }
    }

    /// Channel bytes per block for the default (8-bit word) channel
    /// density.
    pub fn default_channel_bytes(self) -> usize {
        match self {
            Rate::Rate2400 => RATE_2400_BYTES,
            Rate::Rate1200 => RATE_1200_BYTES,
            Rate::Rate600 => NBYTES600,
        }
    }

    /// Nominal bits per second, used only for diagnostics.
    pub fn bits_per_second(self) -> u32 {
        match self {
            Rate::Rate2400 => 2400,
            Rate::Rate1200 => 1200,
            Rate::Rate600 => 600,
        }
    }
}

/// Channel word packing density. STANAG 4591 allows packing the same bit
/// stream into 6-bit or 8-bit words; 600 b/s additionally defines a 56-bit
/// (7-byte, 8-bit words with 2 bits unused) layout alongside the packed
/// 54-bit layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelDensity {
    /// Bit-packed, 8 bits per channel word (the default).
    Packed8,
    /// Bit-packed, 6 bits per channel word (legacy STANAG modem framing).
    Packed6,
}

/// Whether a session encodes or decodes. Kept as an explicit field (rather
/// than inferring it from which methods get called) so construction-time
/// validation can reject rate/role combinations that make no sense, such
/// as asking a decoder-only session to run noise preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Analysis + quantization, PCM in, bitstream out.
    Encoder,
    /// Inverse quantization + synthesis, bitstream in, PCM out.
    Decoder,
}

/// Validated configuration for one [`crate::session::Encoder`] or
/// [`crate::session::Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    rate: Rate,
    role: Role,
    channel_density: ChannelDensity,
    npp_enabled: bool,
    postfilter_enabled: bool,
}

impl SessionConfig {
    /// Build a configuration, rejecting combinations that are structurally
    /// invalid rather than merely inadvisable.
    ///
    /// - `npp_enabled` only makes sense for an [`Role::Encoder`] (the noise
    ///   preprocessor runs ahead of analysis).
    /// - `postfilter_enabled` only makes sense for a [`Role::Decoder`].
    pub fn new(
        rate: Rate,
        role: Role,
        channel_density: ChannelDensity,
        npp_enabled: bool,
        postfilter_enabled: bool,
    ) -> Result<Self> {
        if role == Role::Decoder && npp_enabled {
            return Err(CodecError::config(
                "noise preprocessing only applies to an encoder session",
            ));
        }
        if role == Role::Encoder && postfilter_enabled {
            return Err(CodecError::config(
                "post-filtering only applies to a decoder session",
            ));
        }
        Ok(Self {
            rate,
            role,
            channel_density,
            npp_enabled,
            postfilter_enabled,
        })
    }

    /// Convenience constructor for an encoder with the NPP on by default.
    pub fn encoder(rate: Rate, channel_density: ChannelDensity) -> Result<Self> {
        Self::new(rate, Role::Encoder, channel_density, true, false)
    }

    /// Convenience constructor for a decoder with the post-filter on by
    /// default.
    pub fn decoder(rate: Rate, channel_density: ChannelDensity) -> Result<Self> {
        Self::new(rate, Role::Decoder, channel_density, false, true)
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn channel_density(&self) -> ChannelDensity {
        self.channel_density
    }

    pub fn npp_enabled(&self) -> bool {
        self.npp_enabled
    }

    pub fn postfilter_enabled(&self) -> bool {
        self.postfilter_enabled
    }

    /// Channel bytes per block for `Packed8`; for `Packed6` the same bit
    /// count is repacked into 6-bit words by [`crate::bitstream`], which
    /// changes the byte count.
    pub fn channel_bytes(&self) -> usize {
        match self.channel_density {
            ChannelDensity::Packed8 => self.rate.default_channel_bytes(),
            ChannelDensity::Packed6 => {
                let bits = self.rate.default_channel_bytes() * 8;
                (bits + 5) / 6
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoder_rejects_postfilter() {
        let err = SessionConfig::new(
            Rate::Rate2400,
            Role::Encoder,
            ChannelDensity::Packed8,
            true,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::Config { .. }));
    }

    #[test]
    fn decoder_rejects_npp() {
        let err = SessionConfig::new(
            Rate::Rate600,
            Role::Decoder,
            ChannelDensity::Packed8,
            true,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::Config { .. }));
    }

    #[test]
    fn block_sizes_match_rate() {
        assert_eq!(Rate::Rate2400.samples_per_block(), FRAME);
        assert_eq!(Rate::Rate1200.samples_per_block(), FRAME * 3);
        assert_eq!(Rate::Rate600.samples_per_block(), FRAME * 4);
    }

    #[test]
    fn packed6_byte_count_covers_all_bits() {
        let cfg = SessionConfig::encoder(Rate::Rate600, ChannelDensity::Packed6).unwrap();
        assert_eq!(cfg.channel_bytes(), 9); // ceil(54 / 6) == 9 six-bit words
    }
}
