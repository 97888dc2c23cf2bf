//! Minimal mono 8kHz/16-bit RIFF/WAVE container support for the `--wav`
//! flag. This is intentionally not a general WAV parser/writer: it only
//! round-trips the one PCM shape the codec itself handles, matching the
//! "WAV framing ... is out of scope" boundary the core crate draws around
//! itself.

use std::error::Error;

const SAMPLE_RATE: u32 = 8000;
const BITS_PER_SAMPLE: u16 = 16;
const CHANNELS: u16 = 1;

fn riff_err(details: &str) -> Box<dyn Error> {
    format!("malformed WAV input: {details}").into()
}

/// Strips a RIFF/WAVE header off `bytes`, returning the raw little-endian
/// PCM payload of the `data` chunk. Tolerates (and skips) any chunks other
/// than `fmt ` and `data` that appear before the PCM payload.
pub fn strip_header(bytes: &[u8]) -> Result<Vec<u8>, Box<dyn Error>> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(riff_err("missing RIFF/WAVE marker"));
    }
    let mut offset = 12;
    while offset + 8 <= bytes.len() {
        let chunk_id = &bytes[offset..offset + 4];
        let chunk_len = u32::from_le_bytes([
            bytes[offset + 4],
            bytes[offset + 5],
            bytes[offset + 6],
            bytes[offset + 7],
        ]) as usize;
        let body_start = offset + 8;
        let body_end = body_start + chunk_len;
        if body_end > bytes.len() {
            return Err(riff_err("chunk length runs past end of file"));
        }
        if chunk_id == b"data" {
            return Ok(bytes[body_start..body_end].to_vec());
        }
        // Chunks are padded to an even byte boundary.
        offset = body_end + (chunk_len % 2);
    }
    Err(riff_err("no data chunk found"))
}

/// Wraps raw little-endian PCM `data` in a minimal mono 8kHz/16-bit
/// RIFF/WAVE header.
pub fn with_header(data: &[u8]) -> Vec<u8> {
    let byte_rate = SAMPLE_RATE * CHANNELS as u32 * (BITS_PER_SAMPLE as u32 / 8);
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let data_len = data.len() as u32;
    let riff_len = 36 + data_len;

    let mut out = Vec::with_capacity(44 + data.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_len.to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM format tag
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(data);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips_payload() {
        let pcm: Vec<u8> = (0..64u8).collect();
        let wav = with_header(&pcm);
        let back = strip_header(&wav).unwrap();
        assert_eq!(back, pcm);
    }

    #[test]
    fn rejects_non_riff_input() {
        let err = strip_header(b"not a wav file at all").unwrap_err();
        assert!(err.to_string().contains("malformed WAV"));
    }

    #[test]
    fn skips_unrelated_chunks_before_data() {
        let mut file = Vec::new();
        file.extend_from_slice(b"RIFF");
        file.extend_from_slice(&0u32.to_le_bytes()); // filled below
        file.extend_from_slice(b"WAVE");
        file.extend_from_slice(b"fmt ");
        file.extend_from_slice(&16u32.to_le_bytes());
        file.extend_from_slice(&[0u8; 16]);
        file.extend_from_slice(b"LIST");
        file.extend_from_slice(&4u32.to_le_bytes());
        file.extend_from_slice(b"INFO");
        file.extend_from_slice(b"data");
        file.extend_from_slice(&4u32.to_le_bytes());
        file.extend_from_slice(&[1, 2, 3, 4]);
        let riff_len = (file.len() - 8) as u32;
        file[4..8].copy_from_slice(&riff_len.to_le_bytes());

        let payload = strip_header(&file).unwrap();
        assert_eq!(payload, vec![1, 2, 3, 4]);
    }
}
