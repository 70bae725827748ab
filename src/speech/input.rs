//! Speech input control
//!
//! Wraps a continuous recognizer behind a two-state machine (idle or
//! listening). Recognition and transcript handling are decoupled: finalized
//! chunks are fed into the transcript debouncer and the consumer reads the
//! debounced output.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::speech::debounce::DebounceHandle;
use crate::speech::locale_for;
use crate::Result;

/// Settle delay between stop and restart when switching language mid-session
pub const LANGUAGE_SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Events emitted by a continuous recognizer
#[derive(Debug, Clone, PartialEq)]
pub enum RecognizerEvent {
    /// Recognition session began
    Started,
    /// A transcript chunk; `is_final` marks a finalized utterance chunk
    Transcript {
        text: String,
        confidence: f32,
        is_final: bool,
    },
    /// Recognition session ended normally
    Ended,
    /// Recognizer failure; the controller returns to idle
    Error(String),
}

/// Platform-provided continuous speech recognizer
///
/// Implementations emit [`RecognizerEvent`]s on the channel handed to
/// [`SpeechInputController::new`].
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Begin continuous recognition for the given locale
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer cannot start
    async fn start(&self, locale: &str) -> Result<()>;

    /// Stop recognition; must be safe to call when not running
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer fails to stop cleanly
    async fn stop(&self) -> Result<()>;
}

/// Manages listening state and routes finalized transcripts to the debouncer
pub struct SpeechInputController {
    recognizer: Arc<dyn Recognizer>,
    listening: Arc<AtomicBool>,
    language: String,
    settle_delay: Duration,
    debounce: DebounceHandle,
    pump: JoinHandle<()>,
}

impl SpeechInputController {
    /// Create a controller for a recognizer emitting on `events`
    ///
    /// Finalized transcript chunks are forwarded to `debounce`; the consumer
    /// reads the debounced receiver returned by
    /// [`debounced`](crate::speech::debounce::debounced).
    #[must_use]
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        events: mpsc::Receiver<RecognizerEvent>,
        debounce: DebounceHandle,
        language: impl Into<String>,
    ) -> Self {
        let listening = Arc::new(AtomicBool::new(false));
        let pump = tokio::spawn(pump_events(events, debounce.clone(), Arc::clone(&listening)));

        Self {
            recognizer,
            listening,
            language: language.into(),
            settle_delay: LANGUAGE_SETTLE_DELAY,
            debounce,
            pump,
        }
    }

    /// Begin continuous recognition; no-op when already listening
    ///
    /// Clears the dedupe memory so the first utterance of the new session is
    /// always processed.
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer cannot start
    pub async fn start_listening(&self) -> Result<()> {
        if self.listening.swap(true, Ordering::SeqCst) {
            tracing::debug!("already listening");
            return Ok(());
        }

        self.debounce.reset().await;

        let locale = locale_for(&self.language);
        if let Err(e) = self.recognizer.start(&locale).await {
            self.listening.store(false, Ordering::SeqCst);
            return Err(e);
        }

        tracing::info!(language = %self.language, %locale, "listening started");
        Ok(())
    }

    /// Stop recognition; safe to call when idle
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer fails to stop cleanly
    pub async fn stop_listening(&self) -> Result<()> {
        if !self.listening.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        self.recognizer.stop().await?;
        tracing::info!("listening stopped");
        Ok(())
    }

    /// Switch recognition language
    ///
    /// When listening, the recognizer is stopped, reconfigured, and restarted
    /// after a short settle delay so the switch takes effect mid-session.
    /// When idle, only the configuration changes.
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer fails to restart
    pub async fn set_language(&mut self, language: impl Into<String>) -> Result<()> {
        self.language = language.into();

        if !self.listening.load(Ordering::SeqCst) {
            tracing::debug!(language = %self.language, "language set while idle");
            return Ok(());
        }

        self.recognizer.stop().await?;
        tokio::time::sleep(self.settle_delay).await;

        let locale = locale_for(&self.language);
        if let Err(e) = self.recognizer.start(&locale).await {
            self.listening.store(false, Ordering::SeqCst);
            return Err(e);
        }

        tracing::info!(language = %self.language, %locale, "recognition restarted");
        Ok(())
    }

    /// Whether the controller is currently listening
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// The configured recognition language
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Drop for SpeechInputController {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Forward finalized transcripts into the debouncer
///
/// Recognizer errors force the idle state; there is no automatic restart.
async fn pump_events(
    mut events: mpsc::Receiver<RecognizerEvent>,
    debounce: DebounceHandle,
    listening: Arc<AtomicBool>,
) {
    while let Some(event) = events.recv().await {
        match event {
            RecognizerEvent::Started => {
                tracing::debug!("recognizer session started");
            }
            RecognizerEvent::Transcript {
                text,
                confidence,
                is_final,
            } => {
                if !is_final {
                    continue;
                }
                tracing::debug!(transcript = %text, confidence, "finalized chunk");
                debounce.update(text).await;
            }
            RecognizerEvent::Ended => {
                tracing::debug!("recognizer session ended");
            }
            RecognizerEvent::Error(message) => {
                tracing::warn!(error = %message, "recognizer error, returning to idle");
                listening.store(false, Ordering::SeqCst);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Recognizer fake that records start/stop calls and locales
    struct FakeRecognizer {
        starts: AtomicUsize,
        stops: AtomicUsize,
        last_locale: std::sync::Mutex<Option<String>>,
    }

    impl FakeRecognizer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
                last_locale: std::sync::Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl Recognizer for FakeRecognizer {
        async fn start(&self, locale: &str) -> Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            *self.last_locale.lock().unwrap() = Some(locale.to_string());
            Ok(())
        }

        async fn stop(&self) -> Result<()> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn controller(
        recognizer: Arc<FakeRecognizer>,
    ) -> (SpeechInputController, mpsc::Sender<RecognizerEvent>, mpsc::Receiver<String>) {
        let (event_tx, event_rx) = mpsc::channel(16);
        let (debounce, debounced_rx) =
            crate::speech::debounce::debounced(Duration::from_millis(100));
        let ctrl = SpeechInputController::new(recognizer, event_rx, debounce, "en");
        (ctrl, event_tx, debounced_rx)
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let recognizer = FakeRecognizer::new();
        let (ctrl, _tx, _rx) = controller(Arc::clone(&recognizer));

        ctrl.start_listening().await.unwrap();
        ctrl.start_listening().await.unwrap();

        assert!(ctrl.is_listening());
        assert_eq!(recognizer.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_safe_when_idle() {
        let recognizer = FakeRecognizer::new();
        let (ctrl, _tx, _rx) = controller(Arc::clone(&recognizer));

        ctrl.stop_listening().await.unwrap();
        assert_eq!(recognizer.stops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_set_language_idle_does_not_restart() {
        let recognizer = FakeRecognizer::new();
        let (mut ctrl, _tx, _rx) = controller(Arc::clone(&recognizer));

        ctrl.set_language("es").await.unwrap();

        assert_eq!(ctrl.language(), "es");
        assert_eq!(recognizer.starts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_language_while_listening_restarts() {
        let recognizer = FakeRecognizer::new();
        let (mut ctrl, _tx, _rx) = controller(Arc::clone(&recognizer));

        ctrl.start_listening().await.unwrap();
        ctrl.set_language("fr").await.unwrap();

        assert!(ctrl.is_listening());
        assert_eq!(recognizer.stops.load(Ordering::SeqCst), 1);
        assert_eq!(recognizer.starts.load(Ordering::SeqCst), 2);
        assert_eq!(
            recognizer.last_locale.lock().unwrap().as_deref(),
            Some("fr-FR")
        );
    }

    #[tokio::test]
    async fn test_recognizer_error_forces_idle() {
        let recognizer = FakeRecognizer::new();
        let (ctrl, tx, _rx) = controller(Arc::clone(&recognizer));

        ctrl.start_listening().await.unwrap();
        tx.send(RecognizerEvent::Error("microphone lost".to_string()))
            .await
            .unwrap();

        // Give the pump task a chance to run
        for _ in 0..10 {
            if !ctrl.is_listening() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(!ctrl.is_listening());
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_final_chunks_reach_debouncer() {
        let recognizer = FakeRecognizer::new();
        let (ctrl, tx, mut rx) = controller(recognizer);

        ctrl.start_listening().await.unwrap();
        tx.send(RecognizerEvent::Transcript {
            text: "show me".to_string(),
            confidence: 0.4,
            is_final: false,
        })
        .await
        .unwrap();
        tx.send(RecognizerEvent::Transcript {
            text: "show me pasta".to_string(),
            confidence: 0.9,
            is_final: true,
        })
        .await
        .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.recv().await.as_deref(), Some("show me pasta"));
    }
}
