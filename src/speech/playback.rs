//! Audio playback to speakers
//!
//! Plays cloud-synthesized MP3 audio through the default output device.
//! Tests and headless deployments substitute their own [`AudioSink`].

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};
use tokio_util::sync::CancellationToken;

use crate::speech::output::AudioSink;
use crate::{Error, Result};

/// Sample rate for playback (matches common TTS output)
const PLAYBACK_SAMPLE_RATE: u32 = 24000;

/// Plays MP3 audio on the default output device
pub struct CpalSink {
    config: StreamConfig,
}

impl CpalSink {
    /// Create a new playback sink
    ///
    /// # Errors
    ///
    /// Returns error if no suitable output device or configuration exists
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        // Prefer the fewest channels that support our rate; mono skips the
        // fan-out in the stream callback
        let rate = SampleRate(PLAYBACK_SAMPLE_RATE);
        let mut candidates: Vec<_> = device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .filter(|c| c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
            .collect();
        candidates.sort_by_key(cpal::SupportedStreamConfigRange::channels);

        let config = candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?
            .with_sample_rate(rate)
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = PLAYBACK_SAMPLE_RATE,
            channels = config.channels,
            "audio playback initialized"
        );

        Ok(Self { config })
    }
}

#[async_trait]
impl AudioSink for CpalSink {
    async fn play(&self, audio: &[u8], cancel: &CancellationToken) -> Result<()> {
        let samples = decode_mp3(audio)?;
        if samples.is_empty() {
            return Ok(());
        }

        let config = self.config.clone();
        let cancel = cancel.clone();

        // cpal streams are not Send; build and drop the stream on a
        // blocking thread
        tokio::task::spawn_blocking(move || play_samples_blocking(&config, samples, &cancel))
            .await
            .map_err(|e| Error::Audio(format!("playback task failed: {e}")))?
    }
}

/// Play samples to the default device, polling for completion or cancellation
fn play_samples_blocking(
    config: &StreamConfig,
    samples: Vec<f32>,
    cancel: &CancellationToken,
) -> Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::Audio("no output device".to_string()))?;

    let channels = usize::from(config.channels);
    let sample_count = samples.len();

    let samples = Arc::new(samples);
    let position = Arc::new(Mutex::new(0usize));
    let finished = Arc::new(Mutex::new(false));

    let samples_cb = Arc::clone(&samples);
    let position_cb = Arc::clone(&position);
    let finished_cb = Arc::clone(&finished);

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let Ok(mut pos) = position_cb.lock() else {
                    return;
                };

                for frame in data.chunks_mut(channels) {
                    let sample = if *pos < samples_cb.len() {
                        samples_cb[*pos]
                    } else {
                        if let Ok(mut done) = finished_cb.lock() {
                            *done = true;
                        }
                        0.0
                    };

                    for out in frame.iter_mut() {
                        *out = sample;
                    }

                    if *pos < samples_cb.len() {
                        *pos += 1;
                    }
                }
            },
            |err| {
                tracing::error!(error = %err, "audio playback error");
            },
            None,
        )
        .map_err(|e| Error::Audio(e.to_string()))?;

    stream.play().map_err(|e| Error::Audio(e.to_string()))?;

    let duration_ms = (sample_count as u64).saturating_mul(1000) / u64::from(PLAYBACK_SAMPLE_RATE);
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(duration_ms + 500);

    loop {
        if cancel.is_cancelled() {
            tracing::debug!("playback canceled");
            break;
        }
        if finished.lock().map(|done| *done).unwrap_or(true) {
            break;
        }
        if start.elapsed() > timeout {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }

    drop(stream);
    tracing::debug!(samples = sample_count, "playback finished");

    Ok(())
}

/// Decode MP3 bytes to mono f32 samples, downmixing multi-channel frames
fn decode_mp3(mp3_data: &[u8]) -> Result<Vec<f32>> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();

    loop {
        let frame = match decoder.next_frame() {
            Ok(frame) => frame,
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        };

        let channels = frame.channels.max(1);
        samples.extend(frame.data.chunks(channels).map(|interleaved| {
            let sum: f32 = interleaved.iter().map(|&s| f32::from(s)).sum();
            #[allow(clippy::cast_precision_loss)]
            let width = interleaved.len() as f32;
            sum / (width * 32768.0)
        }));
    }

    Ok(samples)
}
