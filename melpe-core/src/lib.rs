//! MELPe (STANAG 4591) mixed-excitation linear prediction speech codec
//! core: analysis, quantization, synthesis, and the streaming session API.
//!
//! This crate has no I/O of its own (PCM buffers and channel bytes in,
//! the same back out); [`melpe-cli`](https://docs.rs/melpe-cli) wraps it
//! with file/WAV handling and a command-line surface.
//!
//! ```
//! use melpe_core::config::{ChannelDensity, Rate, SessionConfig};
//! use melpe_core::session::{Decoder, Encoder};
//!
//! let enc_cfg = SessionConfig::encoder(Rate::Rate2400, ChannelDensity::Packed8).unwrap();
//! let dec_cfg = SessionConfig::decoder(Rate::Rate2400, ChannelDensity::Packed8).unwrap();
//! let mut encoder = Encoder::new(enc_cfg).unwrap();
//! let mut decoder = Decoder::new(dec_cfg).unwrap();
//!
//! let silence = vec![0i16; Rate::Rate2400.samples_per_block()];
//! let channel_bytes = encoder.encode_block(&silence).unwrap();
//! let pcm_out = decoder.decode_block(&channel_bytes).unwrap();
//! assert_eq!(pcm_out.len(), silence.len());
//! ```

pub mod analysis;
pub mod bfi;
pub mod bitstream;
pub mod codebooks;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod fxmath;
pub mod lpc;
pub mod quant1200;
pub mod quant2400;
pub mod quant600;
pub mod session;
pub mod synth;

pub use config::{ChannelDensity, Rate, Role, SessionConfig};
pub use error::{CodecError, Result};
pub use frame::FrameModel;
pub use session::{Decoder, Encoder};
