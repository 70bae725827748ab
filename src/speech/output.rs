//! Speech output control
//!
//! Turns reply text into audible speech. The cloud provider is preferred;
//! synthesized audio is cached by content so repeated prompts skip
//! regeneration. Any cloud failure falls back to the local engine with a
//! bounded number of attempts. At most one utterance is audible at a time;
//! a new `speak` cancels whatever is in flight.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use lru::LruCache;
use tokio_util::sync::CancellationToken;

use crate::speech::local::{LocalOutcome, LocalSynthesizer};
use crate::speech::locale_for;
use crate::{Error, Result};

/// Maximum local fallback attempts per `speak` call
pub const MAX_FALLBACK_ATTEMPTS: u32 = 2;

/// Default capacity of the synthesized-audio cache
pub const DEFAULT_CACHE_ENTRIES: usize = 32;

/// One synthesis request to the cloud provider
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    pub language: Option<String>,
}

/// Cloud text-to-speech provider
#[async_trait]
pub trait CloudSynthesizer: Send + Sync {
    /// Synthesize text to compressed audio bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] when credentials are missing, or a
    /// transient error on provider failure
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>>;
}

/// Plays synthesized audio; cancellation stops playback early
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Play audio to completion or cancellation
    ///
    /// Cancellation is not an error; implementations return `Ok` when
    /// interrupted.
    ///
    /// # Errors
    ///
    /// Returns error on device or decode failure
    async fn play(&self, audio: &[u8], cancel: &CancellationToken) -> Result<()>;
}

/// Output voice configuration
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Cloud voice identifier
    pub voice_id: String,
    /// Speech language code (e.g. "en"); `None` lets the provider decide
    pub language: Option<String>,
    /// Whether to try the cloud provider before the local engine
    pub prefer_cloud: bool,
    /// Synthesized-audio cache capacity
    pub cache_entries: usize,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            voice_id: String::new(),
            language: None,
            prefer_cloud: true,
            cache_entries: DEFAULT_CACHE_ENTRIES,
        }
    }
}

/// Drives speech output through cloud synthesis with local fallback
pub struct SpeechOutputController {
    cloud: Arc<dyn CloudSynthesizer>,
    local: Arc<dyn LocalSynthesizer>,
    sink: Arc<dyn AudioSink>,
    options: OutputOptions,
    /// Audio bytes keyed by `voice:language:text`
    cache: Mutex<LruCache<String, Arc<Vec<u8>>>>,
    /// Token for the in-flight utterance; replaced (and canceled) per `speak`
    current: Mutex<CancellationToken>,
    /// Serializes audible output so utterances never overlap
    audible: tokio::sync::Mutex<()>,
    /// Sticky: once the cloud reports missing credentials, stop trying it
    cloud_unconfigured: AtomicBool,
    generating: AtomicBool,
    speaking: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl SpeechOutputController {
    /// Create a controller over the given providers and sink
    #[must_use]
    pub fn new(
        cloud: Arc<dyn CloudSynthesizer>,
        local: Arc<dyn LocalSynthesizer>,
        sink: Arc<dyn AudioSink>,
        options: OutputOptions,
    ) -> Self {
        let capacity =
            NonZeroUsize::new(options.cache_entries).unwrap_or(NonZeroUsize::MIN);

        Self {
            cloud,
            local,
            sink,
            options,
            cache: Mutex::new(LruCache::new(capacity)),
            current: Mutex::new(CancellationToken::new()),
            audible: tokio::sync::Mutex::new(()),
            cloud_unconfigured: AtomicBool::new(false),
            generating: AtomicBool::new(false),
            speaking: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Speak the given text, canceling any in-flight utterance first
    ///
    /// Text is sanitized before synthesis; text that sanitizes to nothing is
    /// a no-op. Returns `Ok` when the utterance completed, was interrupted by
    /// a newer `speak`/`stop`, or succeeded through the local fallback.
    ///
    /// # Errors
    ///
    /// Returns error only when both the cloud path and every local fallback
    /// attempt failed; the message is also recorded in [`last_error`].
    ///
    /// [`last_error`]: Self::last_error
    pub async fn speak(&self, text: &str) -> Result<()> {
        let clean = sanitize(text);
        if clean.is_empty() {
            tracing::debug!("nothing to speak after sanitizing");
            return Ok(());
        }

        // Replace the in-flight token; canceling it unwinds cloud playback
        // and kills the local engine, releasing the audible lock
        let token = {
            let mut current = lock(&self.current);
            current.cancel();
            let token = CancellationToken::new();
            *current = token.clone();
            token
        };

        let _audible = self.audible.lock().await;
        if token.is_cancelled() {
            return Ok(());
        }

        *lock(&self.last_error) = None;

        if self.options.prefer_cloud && !self.cloud_unconfigured.load(Ordering::SeqCst) {
            match self.speak_cloud(&clean, &token).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_not_configured() => {
                    self.cloud_unconfigured.store(true, Ordering::SeqCst);
                    tracing::warn!(error = %e, "cloud synthesis not configured, using local engine from now on");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cloud synthesis failed, falling back to local engine");
                }
            }
            if token.is_cancelled() {
                return Ok(());
            }
        }

        self.speak_local(&clean, &token).await
    }

    /// Stop any in-flight utterance; safe to call when nothing is playing
    pub fn stop(&self) {
        lock(&self.current).cancel();
    }

    /// Whether cloud synthesis is in progress
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    /// Whether audio is currently audible
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// The failure message from the last fully-exhausted `speak`, if any
    ///
    /// Cleared at the start of each `speak`; set only when the fallback chain
    /// is exhausted, never for interruptions or recovered failures.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        lock(&self.last_error).clone()
    }

    /// Cloud path: cache lookup, synthesize on miss, play through the sink
    async fn speak_cloud(&self, text: &str, token: &CancellationToken) -> Result<()> {
        let key = format!(
            "{}:{}:{text}",
            self.options.voice_id,
            self.options.language.as_deref().unwrap_or("")
        );

        let cached = lock(&self.cache).get(&key).cloned();
        let audio = if let Some(audio) = cached {
            tracing::debug!(chars = text.len(), "audio cache hit");
            audio
        } else {
            let request = SynthesisRequest {
                text: text.to_string(),
                voice_id: self.options.voice_id.clone(),
                language: self.options.language.clone(),
            };

            // Race synthesis against cancellation so a canceled utterance
            // never holds the audible lock for a slow provider round-trip
            self.generating.store(true, Ordering::SeqCst);
            let synthesized = tokio::select! {
                result = self.cloud.synthesize(&request) => result,
                () = token.cancelled() => {
                    self.generating.store(false, Ordering::SeqCst);
                    tracing::debug!("cloud synthesis canceled");
                    return Ok(());
                }
            };
            self.generating.store(false, Ordering::SeqCst);

            let audio = Arc::new(synthesized?);
            lock(&self.cache).put(key, Arc::clone(&audio));
            audio
        };

        if token.is_cancelled() {
            return Ok(());
        }

        self.speaking.store(true, Ordering::SeqCst);
        let played = self.sink.play(&audio, token).await;
        self.speaking.store(false, Ordering::SeqCst);
        played
    }

    /// Local fallback: bounded attempts, interruption counts as success
    async fn speak_local(&self, text: &str, token: &CancellationToken) -> Result<()> {
        let locale = locale_for(self.options.language.as_deref().unwrap_or("en"));
        let mut last_failure = None;

        for attempt in 1..=MAX_FALLBACK_ATTEMPTS {
            if token.is_cancelled() {
                return Ok(());
            }

            self.speaking.store(true, Ordering::SeqCst);
            let outcome = self.local.speak(text, &locale, token).await;
            self.speaking.store(false, Ordering::SeqCst);

            match outcome {
                Ok(LocalOutcome::Completed) => {
                    tracing::debug!(attempt, "local synthesis complete");
                    return Ok(());
                }
                Ok(LocalOutcome::Interrupted) => {
                    tracing::debug!(attempt, "local synthesis interrupted");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "local synthesis attempt failed");
                    last_failure = Some(e.to_string());
                }
            }
        }

        let message =
            last_failure.unwrap_or_else(|| "local synthesis failed".to_string());
        *lock(&self.last_error) = Some(message.clone());
        tracing::error!(error = %message, "speech output exhausted all providers");
        Err(Error::Synthesis(message))
    }
}

/// Lock a mutex, recovering from poisoning
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Strip text down to speakable content
///
/// Keeps letters, digits, whitespace, and sentence punctuation; collapses
/// whitespace runs; trims. Markup and emoji never reach the synthesizer.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let filtered: String = text
        .chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(c, '.' | ',' | '!' | '?' | '\'' | '-' | ':')
        })
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}
