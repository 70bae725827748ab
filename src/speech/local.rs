//! Local/offline speech synthesis
//!
//! Fallback path when the cloud provider is unavailable. The trait mirrors
//! platform synthesis engines: text plus locale in, completion out, with
//! interruption reported as a distinct (successful) outcome.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// How a local utterance finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalOutcome {
    /// Spoke the whole text
    Completed,
    /// Canceled mid-utterance; treated as success, not failure
    Interrupted,
}

/// Platform-provided offline synthesis engine
#[async_trait]
pub trait LocalSynthesizer: Send + Sync {
    /// Speak text in the given locale, honoring cancellation
    ///
    /// # Errors
    ///
    /// Returns error only on genuine engine failure; cancellation yields
    /// [`LocalOutcome::Interrupted`].
    async fn speak(
        &self,
        text: &str,
        locale: &str,
        cancel: &CancellationToken,
    ) -> Result<LocalOutcome>;
}

/// Local synthesis via the `espeak` command-line engine
///
/// Present on most Linux systems; rate/pitch/volume map directly to espeak
/// flags.
pub struct EspeakLocal {
    program: String,
    rate: u32,
    pitch: u32,
    volume: u32,
}

impl EspeakLocal {
    /// Create with the given program name and prosody settings
    #[must_use]
    pub fn new(program: impl Into<String>, rate: u32, pitch: u32, volume: u32) -> Self {
        Self {
            program: program.into(),
            rate,
            pitch,
            volume,
        }
    }
}

impl Default for EspeakLocal {
    fn default() -> Self {
        Self::new("espeak", 175, 50, 100)
    }
}

#[async_trait]
impl LocalSynthesizer for EspeakLocal {
    async fn speak(
        &self,
        text: &str,
        locale: &str,
        cancel: &CancellationToken,
    ) -> Result<LocalOutcome> {
        // espeak voice codes are lowercase ("en-us")
        let voice = locale.to_lowercase();

        tracing::debug!(%voice, chars = text.len(), "local synthesis started");

        let mut child = tokio::process::Command::new(&self.program)
            .arg("-v")
            .arg(&voice)
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-p")
            .arg(self.pitch.to_string())
            .arg("-a")
            .arg(self.volume.to_string())
            .arg(text)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Synthesis(format!("failed to launch {}: {e}", self.program)))?;

        tokio::select! {
            status = child.wait() => {
                let status = status?;
                if status.success() {
                    tracing::debug!("local synthesis complete");
                    Ok(LocalOutcome::Completed)
                } else {
                    Err(Error::Synthesis(format!(
                        "{} exited with {status}",
                        self.program
                    )))
                }
            }
            () = cancel.cancelled() => {
                if let Err(e) = child.kill().await {
                    tracing::debug!(error = %e, "failed to kill local synthesis process");
                }
                tracing::debug!("local synthesis interrupted");
                Ok(LocalOutcome::Interrupted)
            }
        }
    }
}
