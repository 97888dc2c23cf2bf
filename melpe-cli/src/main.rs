//! Command-line front-end for the MELPe codec, in the same shape as the
//! teacher's own small codec demo binaries (`media-core/src/bin/g711_demo.rs`):
//! a `clap` derive `Args`, a file read up front, a mode dispatch, and a
//! single file write at the end.

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use melpe_core::config::{ChannelDensity, Rate, SessionConfig};
use melpe_core::session::{Decoder, Encoder};

mod wav;

/// MELPe (STANAG 4591) speech codec command-line front-end.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bit rate: 2400, 1200, or 600.
    #[arg(short, long, default_value = "2400")]
    rate: String,

    /// Mode: C (combined round-trip), A (analysis/encode only),
    /// S (synthesis/decode only), U (transcode up a rate), D (transcode
    /// down a rate).
    #[arg(short, long, default_value = "C")]
    mode: String,

    /// Input file.
    #[arg(short, long)]
    input: PathBuf,

    /// Output file.
    #[arg(short, long)]
    output: PathBuf,

    /// Bypass the noise pre-processor on encode.
    #[arg(short = 'p', long)]
    no_npp: bool,

    /// Channel bit density: 06 (6-bit words), 54 or 56 (8-bit words).
    #[arg(short = 'b', long, default_value = "54")]
    bit_density: String,

    /// Quiet: suppress progress/stats logging.
    #[arg(short, long)]
    quiet: bool,

    /// Treat input/output PCM as a minimal mono 8kHz/16-bit WAV container
    /// instead of headerless raw samples.
    #[arg(long)]
    wav: bool,
}

fn parse_rate(s: &str) -> Result<Rate, Box<dyn std::error::Error>> {
    match s {
        "2400" => Ok(Rate::Rate2400),
        "1200" => Ok(Rate::Rate1200),
        "600" => Ok(Rate::Rate600),
        other => Err(format!("unsupported rate '{other}', expected 2400, 1200, or 600").into()),
    }
}

/// `06` selects the legacy 6-bit modem word packing; `54`/`56` are both
/// names in use for the 8-bit word packing (the 600 b/s channel block is
/// 54 meaningful bits housed in a 56-bit/7-byte container), so both select
/// the same [`ChannelDensity::Packed8`].
fn parse_density(s: &str) -> Result<ChannelDensity, Box<dyn std::error::Error>> {
    match s {
        "06" => Ok(ChannelDensity::Packed6),
        "54" | "56" => Ok(ChannelDensity::Packed8),
        other => Err(format!("unsupported bit density '{other}', expected 06, 54, or 56").into()),
    }
}

fn rate_up(rate: Rate) -> Result<Rate, Box<dyn std::error::Error>> {
    match rate {
        Rate::Rate600 => Ok(Rate::Rate1200),
        Rate::Rate1200 => Ok(Rate::Rate2400),
        Rate::Rate2400 => Err("already at the highest supported rate".into()),
    }
}

fn rate_down(rate: Rate) -> Result<Rate, Box<dyn std::error::Error>> {
    match rate {
        Rate::Rate2400 => Ok(Rate::Rate1200),
        Rate::Rate1200 => Ok(Rate::Rate600),
        Rate::Rate600 => Err("already at the lowest supported rate".into()),
    }
}

fn read_input(path: &PathBuf, as_wav: bool) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut file = File::open(path)?;
    let mut raw = Vec::new();
    file.read_to_end(&mut raw)?;
    if as_wav {
        Ok(wav::strip_header(&raw)?)
    } else {
        Ok(raw)
    }
}

fn write_output(path: &PathBuf, data: &[u8], as_wav: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(path)?;
    if as_wav {
        file.write_all(&wav::with_header(data))?;
    } else {
        file.write_all(data)?;
    }
    Ok(())
}

fn bytes_to_pcm(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect()
}

fn pcm_to_bytes(pcm: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pcm.len() * 2);
    for &s in pcm {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

fn encode_all(rate: Rate, density: ChannelDensity, npp_enabled: bool, pcm: &[i16]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let cfg = SessionConfig::new(rate, melpe_core::config::Role::Encoder, density, npp_enabled, false)?;
    let mut encoder = Encoder::new(cfg)?;
    let block_samples = rate.samples_per_block();
    let mut out = Vec::new();
    let mut offset = 0;
    while offset + block_samples <= pcm.len() {
        out.extend(encoder.encode_block(&pcm[offset..offset + block_samples])?);
        offset += block_samples;
    }
    Ok(out)
}

fn decode_all(rate: Rate, density: ChannelDensity, postfilter_enabled: bool, channel: &[u8]) -> Result<Vec<i16>, Box<dyn std::error::Error>> {
    let cfg = SessionConfig::new(rate, melpe_core::config::Role::Decoder, density, false, postfilter_enabled)?;
    let mut decoder = Decoder::new(cfg)?;
    let block_bytes = cfg.channel_bytes();
    let mut out = Vec::new();
    let mut offset = 0;
    while offset + block_bytes <= channel.len() {
        out.extend(decoder.decode_block(&channel[offset..offset + block_bytes])?);
        offset += block_bytes;
    }
    Ok(out)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if !args.quiet {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    let rate = parse_rate(&args.rate)?;
    let density = parse_density(&args.bit_density)?;
    let npp_enabled = !args.no_npp;

    let mode = args.mode.to_uppercase();
    let input_is_pcm = matches!(mode.as_str(), "C" | "A");
    let output_is_pcm = matches!(mode.as_str(), "C" | "S");

    let start = Instant::now();
    let input_raw = read_input(&args.input, args.wav && input_is_pcm)?;

    let output_raw = match mode.as_str() {
        "C" => {
            let pcm = bytes_to_pcm(&input_raw);
            let channel = encode_all(rate, density, npp_enabled, &pcm)?;
            let pcm_out = decode_all(rate, density, true, &channel)?;
            pcm_to_bytes(&pcm_out)
        }
        "A" => {
            let pcm = bytes_to_pcm(&input_raw);
            encode_all(rate, density, npp_enabled, &pcm)?
        }
        "S" => {
            let pcm_out = decode_all(rate, density, true, &input_raw)?;
            pcm_to_bytes(&pcm_out)
        }
        "U" => {
            let target = rate_up(rate)?;
            let pcm = decode_all(rate, density, true, &input_raw)?;
            encode_all(target, density, npp_enabled, &pcm)?
        }
        "D" => {
            let target = rate_down(rate)?;
            let pcm = decode_all(rate, density, true, &input_raw)?;
            encode_all(target, density, npp_enabled, &pcm)?
        }
        other => return Err(format!("unsupported mode '{other}', expected C, A, S, U, or D").into()),
    };

    write_output(&args.output, &output_raw, args.wav && output_is_pcm)?;

    if !args.quiet {
        let elapsed = start.elapsed();
        eprintln!(
            "melpe: mode={} rate={} in={}B out={}B elapsed={:.2?}",
            mode,
            rate.bits_per_second(),
            input_raw.len(),
            output_raw.len(),
            elapsed
        );
    }

    Ok(())
}
