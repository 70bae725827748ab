//! Transcript debouncing
//!
//! The recognizer re-emits finalized chunks as a burst; downstream wants
//! only the final transcript of the burst, exactly once. This utility takes
//! a stream of updates and emits the last value after a quiet period,
//! suppressing a value identical to the one last emitted.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

/// Quiet period before a transcript is considered final
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

enum Msg {
    Update(String),
    Reset,
}

/// Sending half: feed raw transcript updates in
#[derive(Clone)]
pub struct DebounceHandle {
    tx: mpsc::Sender<Msg>,
}

impl DebounceHandle {
    /// Record a new transcript value, restarting the quiet period
    pub async fn update(&self, value: String) {
        if self.tx.send(Msg::Update(value)).await.is_err() {
            tracing::debug!("debounce task gone, dropping transcript update");
        }
    }

    /// Forget the last emitted value so the next utterance is always
    /// processed, even if identical (call when a new listening session starts)
    pub async fn reset(&self) {
        let _ = self.tx.send(Msg::Reset).await;
    }
}

/// Spawn a debounce task; emitted values arrive on the returned receiver
///
/// The task exits when every [`DebounceHandle`] is dropped or the receiver
/// is closed. A value still inside its quiet period at that point is
/// discarded, never emitted early.
#[must_use]
pub fn debounced(quiet_period: Duration) -> (DebounceHandle, mpsc::Receiver<String>) {
    let (tx, mut rx) = mpsc::channel::<Msg>(32);
    let (out_tx, out_rx) = mpsc::channel::<String>(16);

    tokio::spawn(async move {
        let mut pending: Option<String> = None;
        let mut last_emitted: Option<String> = None;
        let deadline = tokio::time::sleep(quiet_period);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(Msg::Update(value)) => {
                        pending = Some(value);
                        deadline.as_mut().reset(Instant::now() + quiet_period);
                    }
                    Some(Msg::Reset) => {
                        pending = None;
                        last_emitted = None;
                    }
                    None => break,
                },
                () = &mut deadline, if pending.is_some() => {
                    let value = pending.take().unwrap_or_default();
                    if last_emitted.as_ref() == Some(&value) {
                        tracing::debug!("suppressing repeated transcript");
                        continue;
                    }
                    last_emitted = Some(value.clone());
                    if out_tx.send(value).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    (DebounceHandle { tx }, out_rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_emits_only_last_value_after_quiet_period() {
        let (handle, mut rx) = debounced(DEFAULT_QUIET_PERIOD);

        handle.update("show".to_string()).await;
        handle.update("show me".to_string()).await;
        handle.update("show me pasta".to_string()).await;

        tokio::time::sleep(DEFAULT_QUIET_PERIOD + Duration::from_millis(50)).await;

        assert_eq!(rx.recv().await.as_deref(), Some("show me pasta"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_restarts_quiet_period() {
        let (handle, mut rx) = debounced(DEFAULT_QUIET_PERIOD);

        handle.update("first".to_string()).await;
        tokio::time::sleep(DEFAULT_QUIET_PERIOD - Duration::from_millis(100)).await;
        handle.update("second".to_string()).await;

        // The original deadline has passed but was restarted
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(DEFAULT_QUIET_PERIOD).await;
        assert_eq!(rx.recv().await.as_deref(), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_transcript_processed_at_most_once() {
        let (handle, mut rx) = debounced(DEFAULT_QUIET_PERIOD);

        handle.update("pasta tonight".to_string()).await;
        tokio::time::sleep(DEFAULT_QUIET_PERIOD + Duration::from_millis(50)).await;
        assert_eq!(rx.recv().await.as_deref(), Some("pasta tonight"));

        // Recognizer re-emits the same final transcript
        handle.update("pasta tonight".to_string()).await;
        tokio::time::sleep(DEFAULT_QUIET_PERIOD + Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_value_discarded_when_handles_close() {
        let (handle, mut rx) = debounced(DEFAULT_QUIET_PERIOD);

        handle.update("half an utter".to_string()).await;
        drop(handle);

        // Quiet period never elapsed, so nothing comes out
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_dedupe_memory() {
        let (handle, mut rx) = debounced(DEFAULT_QUIET_PERIOD);

        handle.update("pasta tonight".to_string()).await;
        tokio::time::sleep(DEFAULT_QUIET_PERIOD + Duration::from_millis(50)).await;
        assert_eq!(rx.recv().await.as_deref(), Some("pasta tonight"));

        // New listening session: same utterance must be processed again
        handle.reset().await;
        handle.update("pasta tonight".to_string()).await;
        tokio::time::sleep(DEFAULT_QUIET_PERIOD + Duration::from_millis(50)).await;
        assert_eq!(rx.recv().await.as_deref(), Some("pasta tonight"));
    }
}
