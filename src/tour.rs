//! Tour mix engine.
//!
//! Overlays the primary recording of each visited sector into one
//! fixed-length stereo buffer: clips start two seconds apart, contribute at
//! most ten seconds each, ride a volume curve that peaks mid-tour, and the
//! whole mix gets a fade-in/fade-out envelope before WAV encoding.
//!
//! Fetch and decode of the individual clips run as independently spawned
//! tasks awaited jointly, so wall-clock cost tracks the slowest clip rather
//! than the sum. A clip that fails to fetch or decode is skipped and the mix
//! degrades; only a tour with no usable clip at all fails.

use std::f64::consts::PI;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::audio::decoder::{decode_clip_bytes, DecodeError, DecodedClip};
use crate::audio::wav::encode_wav;
use crate::models::SectorPoint;

/// Minimum number of visited sectors with a usable clip.
pub const MIN_TOUR_SECTORS: usize = 2;

/// Mix geometry. `Default` matches the production tour mix.
#[derive(Debug, Clone)]
pub struct MixSettings {
    /// Engine sample rate in Hz.
    pub sample_rate: u32,
    /// Total output length in seconds, independent of clip count.
    pub mix_seconds: f64,
    /// Spacing between successive clip start offsets.
    pub clip_spacing_seconds: f64,
    /// Cap on each clip's contribution.
    pub clip_cap_seconds: f64,
    /// Linear ramp 0 -> 1 at the start of the mix.
    pub fade_in_seconds: f64,
    /// Linear ramp 1 -> 0 at the end of the mix.
    pub fade_out_seconds: f64,
}

impl Default for MixSettings {
    fn default() -> Self {
        MixSettings {
            sample_rate: 44_100,
            mix_seconds: 30.0,
            clip_spacing_seconds: 2.0,
            clip_cap_seconds: 10.0,
            fade_in_seconds: 1.0,
            fade_out_seconds: 2.0,
        }
    }
}

/// Output channel count. The engine always mixes to stereo.
pub const MIX_CHANNELS: u16 = 2;

/// A rendered tour mix: complete WAV bytes plus bookkeeping.
#[derive(Debug, Clone)]
pub struct TourMix {
    /// RIFF/WAVE file contents, ready for playback or download.
    pub wav: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_seconds: f64,
    /// Clips that made it into the mix.
    pub clips_mixed: usize,
    /// Clips skipped after fetch or decode failures.
    pub clips_skipped: usize,
}

impl TourMix {
    /// MIME type of the `wav` payload.
    pub const MIME_TYPE: &'static str = "audio/wav";
}

/// Network/HTTP failure retrieving a clip.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("clip unavailable: {0}")]
    Unavailable(String),
}

/// Why a single clip dropped out of the mix.
#[derive(Debug, Error)]
pub enum ClipError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("decode task aborted: {0}")]
    TaskAborted(String),
}

/// Tour-level failure: no blob is produced.
#[derive(Debug, Error)]
pub enum MixError {
    #[error("tour has {0} sector(s) with audio; at least {MIN_TOUR_SECTORS} required")]
    NotEnoughSectors(usize),
    #[error("no clip could be fetched and decoded")]
    NoValidAudio,
}

/// Source of raw clip bytes. Production fetches over HTTP; tests inject
/// in-memory fixtures.
#[async_trait]
pub trait ClipSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// `ClipSource` backed by a shared `reqwest::Client`.
pub struct HttpClipSource {
    client: reqwest::Client,
}

impl HttpClipSource {
    pub fn new(client: reqwest::Client) -> Self {
        HttpClipSource { client }
    }
}

impl Default for HttpClipSource {
    fn default() -> Self {
        HttpClipSource::new(reqwest::Client::new())
    }
}

#[async_trait]
impl ClipSource for HttpClipSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }
}

/// Per-clip volume: `0.2 + 0.3 * sin((i / N) * PI)`, a smooth curve that
/// starts quiet, peaks mid-tour, and eases back down.
pub fn clip_gain(index: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    0.2 + 0.3 * ((index as f64 / total as f64) * PI).sin() as f32
}

/// Apply the global fade envelope in place to an interleaved stereo buffer.
///
/// Linear 0 -> 1 over `fade_in` seconds, flat, then linear 1 -> 0 over the
/// final `fade_out` seconds. A silent buffer stays exactly silent.
pub fn apply_envelope(samples: &mut [f32], sample_rate: u32, fade_in: f64, fade_out: f64) {
    let frames = samples.len() / MIX_CHANNELS as usize;
    if frames == 0 || sample_rate == 0 {
        return;
    }
    let total_seconds = frames as f64 / sample_rate as f64;

    for frame in 0..frames {
        let t = frame as f64 / sample_rate as f64;
        let gain = if fade_in > 0.0 && t < fade_in {
            t / fade_in
        } else if fade_out > 0.0 && t > total_seconds - fade_out {
            (total_seconds - t) / fade_out
        } else {
            1.0
        };
        let gain = gain.clamp(0.0, 1.0) as f32;

        let base = frame * MIX_CHANNELS as usize;
        samples[base] *= gain;
        samples[base + 1] *= gain;
    }
}

/// Render the mix for an ordered list of visited sectors.
///
/// Only the first clip of each sector is used. Requires at least
/// [`MIN_TOUR_SECTORS`] sectors carrying a clip; per-clip failures degrade
/// the mix instead of failing it. Must run inside a tokio runtime.
pub async fn render_tour_mix(
    source: Arc<dyn ClipSource>,
    visited: &[SectorPoint],
    settings: &MixSettings,
) -> Result<TourMix, MixError> {
    let candidates: Vec<(usize, String, String)> = visited
        .iter()
        .enumerate()
        .filter_map(|(index, sector)| {
            sector
                .primary_clip()
                .map(|clip| (index, sector.name.clone(), clip.url.clone()))
        })
        .collect();

    if candidates.len() < MIN_TOUR_SECTORS {
        return Err(MixError::NotEnoughSectors(candidates.len()));
    }

    let total = visited.len();
    let sample_rate = settings.sample_rate;

    // Fire every fetch+decode up front; decode runs on the blocking pool.
    let tasks: Vec<(usize, String, JoinHandle<Result<DecodedClip, ClipError>>)> = candidates
        .into_iter()
        .map(|(index, name, url)| {
            let source = Arc::clone(&source);
            let handle = tokio::spawn(async move {
                let bytes = source.fetch(&url).await.map_err(ClipError::Fetch)?;
                let extension = url_extension(&url);
                let decoded = tokio::task::spawn_blocking(move || {
                    decode_clip_bytes(bytes, extension.as_deref(), sample_rate)
                })
                .await
                .map_err(|e| ClipError::TaskAborted(e.to_string()))?;
                Ok(decoded?)
            });
            (index, name, handle)
        })
        .collect();

    let total_frames = (settings.mix_seconds * sample_rate as f64) as usize;
    let cap_frames = (settings.clip_cap_seconds * sample_rate as f64) as usize;
    let mut buffer = vec![0.0f32; total_frames * MIX_CHANNELS as usize];

    let mut clips_mixed = 0usize;
    let mut clips_skipped = 0usize;

    for (index, name, handle) in tasks {
        let result = match handle.await {
            Ok(result) => result,
            Err(join_err) => Err(ClipError::TaskAborted(join_err.to_string())),
        };

        let clip = match result {
            Ok(clip) => clip,
            Err(err) => {
                warn!("skipping clip for sector `{}`: {}", name, err);
                clips_skipped += 1;
                continue;
            }
        };

        let offset_frames =
            (index as f64 * settings.clip_spacing_seconds * sample_rate as f64) as usize;
        if offset_frames >= total_frames {
            debug!(
                "clip for sector `{}` starts past the end of the mix window",
                name
            );
            clips_skipped += 1;
            continue;
        }

        let duration = clip
            .frames()
            .min(cap_frames)
            .min(total_frames - offset_frames);
        let gain = clip_gain(index, total);
        debug!(
            "mixing `{}` at frame {} for {} frames (gain {:.3})",
            name, offset_frames, duration, gain
        );

        for frame in 0..duration {
            let src = frame * 2;
            let dst = (offset_frames + frame) * 2;
            buffer[dst] += clip.samples[src] * gain;
            buffer[dst + 1] += clip.samples[src + 1] * gain;
        }
        clips_mixed += 1;
    }

    if clips_mixed == 0 {
        return Err(MixError::NoValidAudio);
    }

    apply_envelope(
        &mut buffer,
        sample_rate,
        settings.fade_in_seconds,
        settings.fade_out_seconds,
    );

    let wav = encode_wav(&buffer, sample_rate, MIX_CHANNELS);
    info!(
        "tour mix rendered: {} clip(s) mixed, {} skipped, {:.0}s at {} Hz",
        clips_mixed, clips_skipped, settings.mix_seconds, sample_rate
    );

    Ok(TourMix {
        wav,
        sample_rate,
        channels: MIX_CHANNELS,
        duration_seconds: settings.mix_seconds,
        clips_mixed,
        clips_skipped,
    })
}

/// File extension of a clip URL, ignoring query and fragment. Used as a
/// decoder probe hint.
fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 4 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
