//! Minimal RIFF/WAVE writer for the mix output.
//!
//! The byte layout is part of the crate's external contract: a canonical
//! 44-byte header followed by interleaved 16-bit signed little-endian PCM,
//! frame-major.

/// Canonical header length for a single fmt + data chunk WAV file.
pub const WAV_HEADER_LEN: usize = 44;

const PCM_FORMAT_TAG: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Encode interleaved f32 samples into a complete in-memory WAV file.
///
/// Samples are clamped to [-1.0, 1.0] before scaling. Negative values scale
/// by 0x8000 and positive by 0x7FFF, matching the asymmetric signed 16-bit
/// range.
pub fn encode_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let byte_rate = sample_rate * channels as u32 * 2;
    let block_align = channels * 2;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT_TAG.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for &sample in samples {
        out.extend_from_slice(&pcm16_from_f32(sample).to_le_bytes());
    }

    out
}

/// Scale a [-1, 1] float to the signed 16-bit domain.
fn pcm16_from_f32(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 0x8000 as f32) as i16
    } else {
        (s * 0x7FFF as f32) as i16
    }
}
