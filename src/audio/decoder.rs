use std::io::{Cursor, ErrorKind};

use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, formats::FormatOptions, io::MediaSourceStream,
    probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};
use thiserror::Error;

use super::resample::resample_stereo;

/// Malformed or unsupported audio bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unrecognized audio container: {0}")]
    Probe(#[source] symphonia::core::errors::Error),
    #[error("clip contains no default audio track")]
    NoTrack,
    #[error("track is missing a sample rate")]
    NoSampleRate,
    #[error("no decoder for codec: {0}")]
    Codec(#[source] symphonia::core::errors::Error),
    #[error("failed to read audio packet: {0}")]
    Packet(#[source] symphonia::core::errors::Error),
    #[error("failed to decode audio packet: {0}")]
    Decode(#[source] symphonia::core::errors::Error),
    #[error("clip produced no samples")]
    Empty,
}

/// Decoded clip data with channel information.
#[derive(Debug, Clone)]
pub struct DecodedClip {
    /// Interleaved stereo samples [L0, R0, L1, R1, ...]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (always 2 for stereo output)
    pub channels: u16,
}

impl DecodedClip {
    /// Number of stereo frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }
}

/// Decode in-memory clip bytes to stereo interleaved samples at `target_rate`.
///
/// All audio comes out as stereo: mono sources are duplicated to both
/// channels, and sources with more than two channels keep the first two.
/// `extension` is a probe hint (usually taken from the clip URL).
pub fn decode_clip_bytes(
    bytes: Vec<u8>,
    extension: Option<&str>,
    target_rate: u32,
) -> Result<DecodedClip, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(&hint, mss, &FormatOptions::default(), &Default::default())
        .map_err(DecodeError::Probe)?;
    let mut format = probed.format;

    let track = format.default_track().ok_or(DecodeError::NoTrack)?;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::NoSampleRate)?;

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(DecodeError::Codec)?;

    // Output is always stereo interleaved
    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(err))
                if err.kind() == ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(DecodeError::Packet(err)),
        };

        let audio_buffer = decoder.decode(&packet).map_err(DecodeError::Decode)?;
        let spec = *audio_buffer.spec();
        let mut sample_buffer = SampleBuffer::<f32>::new(audio_buffer.capacity() as u64, spec);
        sample_buffer.copy_interleaved_ref(audio_buffer);

        let src_channels = spec.channels.count();
        if src_channels == 0 {
            continue;
        }
        let interleaved = sample_buffer.samples();
        let frames = interleaved.len() / src_channels;

        for frame_idx in 0..frames {
            let base = frame_idx * src_channels;

            // Duplicate mono, take the first two channels of anything wider
            let (left, right) = if src_channels == 1 {
                let s = interleaved[base];
                (s, s)
            } else {
                (interleaved[base], interleaved[base + 1])
            };

            samples.push(left);
            samples.push(right);
        }
    }

    if samples.is_empty() {
        return Err(DecodeError::Empty);
    }

    let (samples, sample_rate) = if sample_rate != target_rate {
        (resample_stereo(&samples, sample_rate, target_rate), target_rate)
    } else {
        (samples, sample_rate)
    };

    Ok(DecodedClip {
        samples,
        sample_rate,
        channels: 2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::encode_wav;

    #[test]
    fn decodes_wav_bytes_to_stereo() {
        let frames = 1000usize;
        let samples: Vec<f32> = (0..frames * 2).map(|_| 0.25).collect();
        let bytes = encode_wav(&samples, 44_100, 2);

        let clip = decode_clip_bytes(bytes, Some("wav"), 44_100).expect("decode");
        assert_eq!(clip.channels, 2);
        assert_eq!(clip.sample_rate, 44_100);
        assert_eq!(clip.frames(), frames);
        // 16-bit quantization keeps us within a couple of LSBs of the source
        for &s in &clip.samples {
            assert!((s - 0.25).abs() < 2.0 / 32768.0);
        }
    }

    #[test]
    fn resamples_to_target_rate() {
        let samples: Vec<f32> = (0..2000).map(|_| 0.1).collect();
        let bytes = encode_wav(&samples, 22_050, 2);

        let clip = decode_clip_bytes(bytes, Some("wav"), 44_100).expect("decode");
        assert_eq!(clip.sample_rate, 44_100);
        // Doubled rate doubles the frame count
        assert!((clip.frames() as f64 / 1000.0 - 2.0).abs() < 0.01);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(decode_clip_bytes(vec![0u8; 64], Some("mp3"), 44_100).is_err());
    }
}
