//! Speech pipeline integration tests
//!
//! Exercises input debouncing and output fallback/mutual-exclusion without
//! audio hardware, using in-memory providers and sinks.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_test::assert_ok;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use ladle_voice::speech::{
    AudioSink, CloudSynthesizer, LocalOutcome, LocalSynthesizer, OutputOptions, Recognizer,
    RecognizerEvent, SpeechInputController, SpeechOutputController, SynthesisRequest, debounced,
};
use ladle_voice::{Error, Result};

/// Cloud provider that echoes the request text as audio bytes
struct EchoCloud {
    calls: AtomicUsize,
    fail: bool,
}

impl EchoCloud {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail,
        })
    }
}

#[async_trait]
impl CloudSynthesizer for EchoCloud {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(Error::Synthesis("cloud outage".to_string()))
        } else {
            Ok(request.text.clone().into_bytes())
        }
    }
}

/// Local engine that records utterances and honors cancellation
struct CountingLocal {
    calls: AtomicUsize,
}

impl CountingLocal {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LocalSynthesizer for CountingLocal {
    async fn speak(
        &self,
        _text: &str,
        _locale: &str,
        cancel: &CancellationToken,
    ) -> Result<LocalOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            () = tokio::time::sleep(Duration::from_millis(50)) => Ok(LocalOutcome::Completed),
            () = cancel.cancelled() => Ok(LocalOutcome::Interrupted),
        }
    }
}

/// Sink that tracks how many playbacks overlap
struct OverlapSink {
    active: AtomicUsize,
    max_active: AtomicUsize,
    completed: AtomicUsize,
    hold: Duration,
}

impl OverlapSink {
    fn new(hold: Duration) -> Arc<Self> {
        Arc::new(Self {
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            hold,
        })
    }
}

#[async_trait]
impl AudioSink for OverlapSink {
    async fn play(&self, _audio: &[u8], cancel: &CancellationToken) -> Result<()> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        tokio::select! {
            () = tokio::time::sleep(self.hold) => {
                self.completed.fetch_add(1, Ordering::SeqCst);
            }
            () = cancel.cancelled() => {}
        }

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

fn options() -> OutputOptions {
    OutputOptions {
        voice_id: "voice".to_string(),
        language: Some("en".to_string()),
        prefer_cloud: true,
        cache_entries: 8,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_back_to_back_speaks_never_overlap() {
    let sink = OverlapSink::new(Duration::from_millis(300));
    let ctrl = Arc::new(SpeechOutputController::new(
        EchoCloud::new(false) as _,
        CountingLocal::new() as _,
        Arc::clone(&sink) as _,
        options(),
    ));

    let first = {
        let ctrl = Arc::clone(&ctrl);
        tokio::spawn(async move { ctrl.speak("Step 1: dice the onions").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The second call must cancel the first before becoming audible
    ctrl.speak("Step 2: heat the pan").await.unwrap();
    first.await.unwrap().unwrap();

    assert_eq!(sink.max_active.load(Ordering::SeqCst), 1);
    // The first playback was canceled, only the second ran to completion
    assert_eq!(sink.completed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cloud_outage_recovers_through_local_engine() {
    let cloud = EchoCloud::new(true);
    let local = CountingLocal::new();
    let ctrl = SpeechOutputController::new(
        Arc::clone(&cloud) as _,
        Arc::clone(&local) as _,
        OverlapSink::new(Duration::from_millis(10)) as _,
        options(),
    );

    tokio_test::assert_ok!(ctrl.speak("Here are three pasta recipes").await);

    assert_eq!(cloud.calls.load(Ordering::SeqCst), 1);
    assert_eq!(local.calls.load(Ordering::SeqCst), 1);
    // Fallback succeeded, so no terminal error is recorded
    assert!(ctrl.last_error().is_none());
}

#[tokio::test]
async fn test_exhaustion_clears_busy_flags_and_sets_last_error() {
    /// Local engine that always fails
    struct BrokenLocal;

    #[async_trait]
    impl LocalSynthesizer for BrokenLocal {
        async fn speak(
            &self,
            _text: &str,
            _locale: &str,
            _cancel: &CancellationToken,
        ) -> Result<LocalOutcome> {
            Err(Error::Synthesis("no engine".to_string()))
        }
    }

    let ctrl = SpeechOutputController::new(
        EchoCloud::new(true) as _,
        Arc::new(BrokenLocal) as _,
        OverlapSink::new(Duration::from_millis(10)) as _,
        options(),
    );

    assert!(ctrl.speak("hello").await.is_err());
    assert!(ctrl.last_error().is_some());
    assert!(!ctrl.is_speaking());
    assert!(!ctrl.is_generating());
}

/// Recognizer fake for driving the input controller
struct ScriptedRecognizer;

#[async_trait]
impl Recognizer for ScriptedRecognizer {
    async fn start(&self, _locale: &str) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_input_pipeline_debounces_chunk_bursts() {
    let (event_tx, event_rx) = mpsc::channel(16);
    let (debounce, mut transcripts) = debounced(Duration::from_millis(1000));
    let input = SpeechInputController::new(
        Arc::new(ScriptedRecognizer),
        event_rx,
        debounce,
        "en",
    );

    input.start_listening().await.unwrap();

    // The recognizer finalizes a growing transcript in a burst
    for text in ["show", "show me", "show me pasta recipes"] {
        event_tx
            .send(RecognizerEvent::Transcript {
                text: text.to_string(),
                confidence: 0.9,
                is_final: true,
            })
            .await
            .unwrap();
    }

    tokio::time::sleep(Duration::from_millis(1100)).await;

    // Only the last value of the burst comes out, exactly once
    assert_eq!(transcripts.recv().await.as_deref(), Some("show me pasta recipes"));
    assert!(transcripts.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_reemitted_transcript_processed_at_most_once() {
    let (event_tx, event_rx) = mpsc::channel(16);
    let (debounce, mut transcripts) = debounced(Duration::from_millis(1000));
    let input = SpeechInputController::new(
        Arc::new(ScriptedRecognizer),
        event_rx,
        debounce,
        "en",
    );

    input.start_listening().await.unwrap();

    let chunk = RecognizerEvent::Transcript {
        text: "quick vegetarian dinner".to_string(),
        confidence: 0.9,
        is_final: true,
    };

    event_tx.send(chunk.clone()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(
        transcripts.recv().await.as_deref(),
        Some("quick vegetarian dinner")
    );

    // The recognizer re-emits the identical final transcript
    event_tx.send(chunk).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(transcripts.try_recv().is_err());
}
