//! Per-session sliding-window message buffer.
//!
//! Each session key owns an ordered list of pending messages and at most one
//! live timer. Every arrival restarts the timer with the full window, so a
//! session only flushes once it has been quiet for a whole window. A flush
//! joins the pending messages, clears them, and hands the combined string to
//! the caller's [`FlushHandler`] outside the lock.
//!
//! ```text
//! EMPTY ──enqueue──▶ ACCUMULATING ──timer──▶ FLUSHING ──done──▶ EMPTY
//!                        ▲   │                   │
//!                        └───┘ enqueue           └─ enqueue ─▶ ACCUMULATING
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::dispatch::FlushHandler;

/// Quiet period used when the caller does not pass one.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(2);

/// Joins buffered messages unless configured otherwise.
pub const DEFAULT_SEPARATOR: &str = "\n";

/// Construction-time settings for a [`MessageBuffer`].
#[derive(Debug, Clone)]
pub struct BufferConfig {
    pub default_window: Duration,
    pub separator: String,
}

impl BufferConfig {
    pub fn new(default_window: Duration) -> Self {
        Self {
            default_window,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

/// A message waiting for its session's quiet period.
#[derive(Debug, Clone)]
struct PendingMessage {
    text: String,
    received_at: DateTime<Utc>,
}

impl PendingMessage {
    fn new(text: String) -> Self {
        Self {
            text,
            received_at: Utc::now(),
        }
    }
}

/// Handle to a scheduled flush. Aborting a finished task is a no-op.
struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

impl PendingTimer {
    fn is_live(&self) -> bool {
        !self.handle.is_finished()
    }

    fn cancel(self) {
        self.handle.abort();
    }
}

#[derive(Default)]
struct SessionBuffer {
    messages: Vec<PendingMessage>,
    timer: Option<PendingTimer>,
    /// Generation of the timer whose dispatch is in flight.
    flushing: Option<u64>,
    /// Set when a timer fired while a flush was still in flight; the batch is
    /// flushed as soon as that flush completes.
    deferred: Option<Arc<dyn FlushHandler>>,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<String, SessionBuffer>,
    next_generation: u64,
}

impl Sessions {
    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

/// Debouncing buffer shared by every request handler.
///
/// Cloning is cheap and every clone operates on the same session map.
#[derive(Clone)]
pub struct MessageBuffer {
    config: Arc<BufferConfig>,
    sessions: Arc<Mutex<Sessions>>,
}

impl MessageBuffer {
    pub fn new(config: BufferConfig) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(Mutex::new(Sessions::default())),
        }
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Buffers `message` for `session_key` and restarts the session's timer.
    ///
    /// `window` falls back to the configured default. The handler passed by
    /// the most recent call is the one invoked when the timer fires. Returns
    /// the number of messages now pending for the session.
    pub async fn enqueue(
        &self,
        session_key: &str,
        message: impl Into<String>,
        handler: Arc<dyn FlushHandler>,
        window: Option<Duration>,
    ) -> usize {
        let window = window.unwrap_or(self.config.default_window);
        let message = message.into();

        let mut sessions = self.sessions.lock().await;
        let generation = sessions.next_generation();
        let state = sessions.entries.entry(session_key.to_string()).or_default();

        debug!(
            session_key,
            preview = %preview(&message, 50),
            pending = state.messages.len() + 1,
            "Message buffered"
        );
        state.messages.push(PendingMessage::new(message));

        if let Some(timer) = state.timer.take() {
            if timer.is_live() {
                debug!(session_key, "Cancelled existing debounce timer");
            }
            timer.cancel();
        }
        // The new timer carries any batch that was waiting on an in-flight flush.
        state.deferred = None;
        state.timer = Some(self.arm(session_key, generation, window, handler));

        debug!(session_key, ?window, "Debounce timer started");
        state.messages.len()
    }

    /// Stops the scheduled flush for `session_key`, keeping its messages.
    ///
    /// Returns `false` when there was nothing left to cancel, including when
    /// the timer already fired and its flush is under way.
    pub async fn cancel_pending(&self, session_key: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        let Some(state) = sessions.entries.get_mut(session_key) else {
            return false;
        };

        let mut cancelled = state.deferred.take().is_some();
        if let Some(timer) = state.timer.take() {
            cancelled |= timer.is_live();
            timer.cancel();
        }

        if cancelled {
            debug!(session_key, "Cancelled pending flush");
        }
        cancelled
    }

    /// Number of messages accumulated and not yet flushed.
    pub async fn get_pending_count(&self, session_key: &str) -> usize {
        let sessions = self.sessions.lock().await;
        sessions
            .entries
            .get(session_key)
            .map_or(0, |state| state.messages.len())
    }

    /// Whether a dispatch callback is currently running for the session.
    pub async fn is_flushing(&self, session_key: &str) -> bool {
        let sessions = self.sessions.lock().await;
        sessions
            .entries
            .get(session_key)
            .is_some_and(|state| state.flushing.is_some())
    }

    /// Cancels any timer and drops the session's unflushed messages.
    ///
    /// While a dispatch is in flight the entry stays behind, emptied, so the
    /// next round still waits for that dispatch to finish.
    pub async fn cleanup_session(&self, session_key: &str) {
        let mut sessions = self.sessions.lock().await;
        let Some(state) = sessions.entries.get_mut(session_key) else {
            return;
        };

        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
        state.deferred = None;
        let discarded = std::mem::take(&mut state.messages).len();
        let in_flight = state.flushing.is_some();
        if !in_flight {
            sessions.entries.remove(session_key);
        }

        debug!(session_key, discarded, in_flight, "Cleaned up session buffer");
    }

    fn arm(
        &self,
        session_key: &str,
        generation: u64,
        window: Duration,
        handler: Arc<dyn FlushHandler>,
    ) -> PendingTimer {
        let buffer = self.clone();
        let session_key = session_key.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            buffer.flush(&session_key, generation, handler).await;
        });
        PendingTimer { generation, handle }
    }

    async fn flush(&self, session_key: &str, generation: u64, handler: Arc<dyn FlushHandler>) {
        let combined = {
            let mut sessions = self.sessions.lock().await;
            let Some(state) = sessions.entries.get_mut(session_key) else {
                warn!(session_key, "No buffer found for session");
                return;
            };

            // A newer enqueue or a cancel replaced this timer while it was waking up.
            if state.timer.as_ref().map(|t| t.generation) != Some(generation) {
                debug!(session_key, generation, "Stale debounce timer ignored");
                return;
            }
            state.timer = None;

            if state.messages.is_empty() {
                warn!(session_key, "No messages to flush");
                return;
            }

            if state.flushing.is_some() {
                warn!(
                    session_key,
                    pending = state.messages.len(),
                    "Flush already in progress, deferring batch"
                );
                state.deferred = Some(handler);
                return;
            }

            state.flushing = Some(generation);
            let count = state.messages.len();
            let waited_ms = state
                .messages
                .first()
                .map_or(0, |m| (Utc::now() - m.received_at).num_milliseconds());
            let combined = state
                .messages
                .drain(..)
                .map(|m| m.text)
                .collect::<Vec<_>>()
                .join(&self.config.separator);

            info!(
                session_key,
                message_count = count,
                waited_ms,
                "Flushing buffered messages"
            );
            debug!(session_key, combined = %preview(&combined, 100), "Combined message");
            combined
        };

        match AssertUnwindSafe(handler.dispatch(session_key, combined))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => debug!(session_key, "Dispatch completed"),
            Ok(Err(e)) => error!(session_key, error = %e, "Dispatch callback failed"),
            Err(panic) => error!(
                session_key,
                panic = %panic_message(panic.as_ref()),
                "Dispatch callback panicked"
            ),
        }

        self.finish(session_key, generation).await;
    }

    /// Releases the session for the flush started by timer `token`.
    async fn finish(&self, session_key: &str, token: u64) {
        let mut sessions = self.sessions.lock().await;
        let generation = sessions.next_generation();
        let Some(state) = sessions.entries.get_mut(session_key) else {
            return;
        };
        if state.flushing != Some(token) {
            warn!(session_key, token, "Flush finished for a superseded round");
            return;
        }
        state.flushing = None;

        if let Some(handler) = state.deferred.take() {
            if state.timer.is_none() && !state.messages.is_empty() {
                debug!(session_key, "Flushing deferred batch");
                state.timer = Some(self.arm(session_key, generation, Duration::ZERO, handler));
            }
        }

        if state.messages.is_empty() && state.timer.is_none() {
            sessions.entries.remove(session_key);
        }
    }
}

impl std::fmt::Debug for MessageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBuffer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::debounce::DispatchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use tokio::time::{sleep, Instant};

    #[derive(Default)]
    struct Recorder {
        calls: StdMutex<Vec<(String, String, Instant)>>,
        delay: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl Recorder {
        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                ..Default::default()
            })
        }

        fn messages(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, m, _)| m.clone())
                .collect()
        }

        fn calls_for(&self, key: &str) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(k, _, _)| k == key)
                .map(|(_, m, _)| m.clone())
                .collect()
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().iter().map(|(_, _, t)| *t).collect()
        }
    }

    #[async_trait]
    impl FlushHandler for Recorder {
        async fn dispatch(&self, session_key: &str, combined: String) -> Result<(), DispatchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls
                .lock()
                .unwrap()
                .push((session_key.to_string(), combined, Instant::now()));
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl FlushHandler for Failing {
        async fn dispatch(&self, _session_key: &str, _combined: String) -> Result<(), DispatchError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(DispatchError::new("agent unavailable"))
        }
    }

    struct Panicking;

    #[async_trait]
    impl FlushHandler for Panicking {
        async fn dispatch(&self, _session_key: &str, _combined: String) -> Result<(), DispatchError> {
            panic!("handler exploded");
        }
    }

    fn buffer(window_ms: u64) -> MessageBuffer {
        MessageBuffer::new(BufferConfig::new(Duration::from_millis(window_ms)))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn single_message_flushes_after_window() {
        let buffer = buffer(100);
        let recorder = Arc::new(Recorder::default());
        let start = Instant::now();

        buffer.enqueue("s1", "Hello", recorder.clone(), Some(ms(100))).await;
        sleep(ms(150)).await;

        assert_eq!(recorder.messages(), vec!["Hello"]);
        assert!(recorder.call_times()[0] >= start + ms(100));
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_messages_are_combined_in_arrival_order() {
        let buffer = buffer(200);
        let recorder = Arc::new(Recorder::default());

        buffer.enqueue("s2", "Hello", recorder.clone(), None).await;
        sleep(ms(50)).await;
        buffer.enqueue("s2", "How", recorder.clone(), None).await;
        sleep(ms(50)).await;
        buffer.enqueue("s2", "are you?", recorder.clone(), None).await;
        sleep(ms(300)).await;

        assert_eq!(recorder.messages(), vec!["Hello\nHow\nare you?"]);
    }

    #[tokio::test(start_paused = true)]
    async fn each_arrival_restarts_the_window() {
        let buffer = buffer(200);
        let recorder = Arc::new(Recorder::default());
        let start = Instant::now();

        buffer.enqueue("s3", "First", recorder.clone(), None).await;
        sleep(ms(150)).await;
        buffer.enqueue("s3", "Second", recorder.clone(), None).await;

        sleep(ms(100)).await;
        assert!(recorder.messages().is_empty(), "flushed before the window restarted");

        sleep(ms(200)).await;
        assert_eq!(recorder.messages(), vec!["First\nSecond"]);
        assert!(recorder.call_times()[0] >= start + ms(350));
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_flush_independently() {
        let buffer = buffer(100);
        let recorder = Arc::new(Recorder::default());

        buffer.enqueue("alice", "a1", recorder.clone(), None).await;
        buffer.enqueue("bob", "b1", recorder.clone(), None).await;
        sleep(ms(20)).await;
        buffer.enqueue("alice", "a2", recorder.clone(), None).await;
        buffer.enqueue("bob", "b2", recorder.clone(), None).await;
        sleep(ms(200)).await;

        assert_eq!(recorder.calls_for("alice"), vec!["a1\na2"]);
        assert_eq!(recorder.calls_for("bob"), vec!["b1\nb2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_separator_joins_messages() {
        let buffer =
            MessageBuffer::new(BufferConfig::new(ms(100)).with_separator(" | "));
        let recorder = Arc::new(Recorder::default());

        for part in ["Part1", "Part2", "Part3"] {
            buffer.enqueue("s4", part, recorder.clone(), None).await;
        }
        sleep(ms(150)).await;

        assert_eq!(recorder.messages(), vec!["Part1 | Part2 | Part3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_count_tracks_lifecycle() {
        let buffer = buffer(100);
        let recorder = Arc::new(Recorder::default());

        assert_eq!(buffer.get_pending_count("s5").await, 0);
        assert_eq!(buffer.enqueue("s5", "one", recorder.clone(), None).await, 1);
        assert_eq!(buffer.get_pending_count("s5").await, 1);
        buffer.enqueue("s5", "two", recorder.clone(), None).await;
        assert_eq!(buffer.get_pending_count("s5").await, 2);

        sleep(ms(150)).await;

        assert_eq!(recorder.messages().len(), 1);
        assert_eq!(buffer.get_pending_count("s5").await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_flush_and_keeps_messages() {
        let buffer = buffer(100);
        let recorder = Arc::new(Recorder::default());

        buffer.enqueue("s6", "Hello", recorder.clone(), None).await;
        assert!(buffer.cancel_pending("s6").await);
        sleep(ms(200)).await;

        assert!(recorder.messages().is_empty());
        assert!(!buffer.cancel_pending("s6").await);
        assert_eq!(buffer.get_pending_count("s6").await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_flush_returns_false() {
        let buffer = buffer(50);
        let recorder = Arc::new(Recorder::default());

        buffer.enqueue("s7", "Hello", recorder.clone(), None).await;
        sleep(ms(100)).await;

        assert!(!buffer.cancel_pending("s7").await);
        assert!(!buffer.cancel_pending("never-seen").await);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_messages_flush_with_the_next_arrival() {
        let buffer = buffer(100);
        let recorder = Arc::new(Recorder::default());

        buffer.enqueue("s8", "kept", recorder.clone(), None).await;
        buffer.cancel_pending("s8").await;
        sleep(ms(200)).await;
        buffer.enqueue("s8", "later", recorder.clone(), None).await;
        sleep(ms(150)).await;

        assert_eq!(recorder.messages(), vec!["kept\nlater"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_discards_pending_messages() {
        let buffer = buffer(100);
        let recorder = Arc::new(Recorder::default());

        buffer.enqueue("s9", "dropped", recorder.clone(), None).await;
        buffer.cleanup_session("s9").await;
        sleep(ms(200)).await;

        assert!(recorder.messages().is_empty());
        assert_eq!(buffer.get_pending_count("s9").await, 0);
        assert!(!buffer.cancel_pending("s9").await);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_messages_are_joined_like_any_other() {
        let buffer = buffer(100);
        let recorder = Arc::new(Recorder::default());

        buffer.enqueue("s10", "", recorder.clone(), None).await;
        buffer.enqueue("s10", "x", recorder.clone(), None).await;
        sleep(ms(150)).await;

        assert_eq!(recorder.messages(), vec!["\nx"]);
    }

    #[tokio::test(start_paused = true)]
    async fn latest_window_wins() {
        let buffer = buffer(1_000);
        let recorder = Arc::new(Recorder::default());
        let start = Instant::now();

        buffer.enqueue("s11", "slow", recorder.clone(), Some(ms(1_000))).await;
        buffer.enqueue("s11", "fast", recorder.clone(), Some(ms(100))).await;
        sleep(ms(200)).await;

        assert_eq!(recorder.messages(), vec!["slow\nfast"]);
        assert!(recorder.call_times()[0] < start + ms(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_handler_does_not_poison_session() {
        let buffer = buffer(50);
        let failing = Arc::new(Failing {
            attempts: AtomicUsize::new(0),
        });
        let recorder = Arc::new(Recorder::default());

        buffer.enqueue("s12", "boom", failing.clone(), None).await;
        sleep(ms(100)).await;
        assert_eq!(failing.attempts.load(Ordering::SeqCst), 1);
        assert!(!buffer.is_flushing("s12").await);

        buffer.enqueue("s12", "retry", recorder.clone(), None).await;
        sleep(ms(100)).await;
        assert_eq!(recorder.messages(), vec!["retry"]);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_handler_is_contained() {
        let buffer = buffer(50);
        let recorder = Arc::new(Recorder::default());

        buffer.enqueue("s13", "boom", Arc::new(Panicking), None).await;
        sleep(ms(100)).await;
        assert!(!buffer.is_flushing("s13").await);

        buffer.enqueue("s13", "after", recorder.clone(), None).await;
        sleep(ms(100)).await;
        assert_eq!(recorder.messages(), vec!["after"]);
    }

    #[tokio::test(start_paused = true)]
    async fn messages_during_flush_start_a_new_round() {
        let buffer = buffer(100);
        let recorder = Recorder::slow(ms(50));

        buffer.enqueue("s14", "first", recorder.clone(), None).await;
        sleep(ms(120)).await;
        assert!(buffer.is_flushing("s14").await);

        buffer.enqueue("s14", "second", recorder.clone(), None).await;
        assert_eq!(buffer.get_pending_count("s14").await, 1);
        sleep(ms(300)).await;

        assert_eq!(recorder.messages(), vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_ready_during_slow_flush_is_deferred_not_dropped() {
        let buffer = buffer(100);
        let recorder = Recorder::slow(ms(500));
        let start = Instant::now();

        buffer.enqueue("s15", "A", recorder.clone(), None).await;
        sleep(ms(150)).await;
        buffer.enqueue("s15", "B", recorder.clone(), None).await;

        // B's window elapses at ~250ms while A is still dispatching.
        sleep(ms(200)).await;
        assert_eq!(recorder.messages(), vec!["A"]);
        assert_eq!(buffer.get_pending_count("s15").await, 1);

        sleep(ms(1_000)).await;
        assert_eq!(recorder.messages(), vec!["A", "B"]);
        assert_eq!(recorder.max_in_flight.load(Ordering::SeqCst), 1);
        assert!(recorder.call_times()[1] >= start + ms(600));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_a_deferred_flush() {
        let buffer = buffer(100);
        let recorder = Recorder::slow(ms(500));

        buffer.enqueue("s16", "A", recorder.clone(), None).await;
        sleep(ms(150)).await;
        buffer.enqueue("s16", "B", recorder.clone(), None).await;
        sleep(ms(200)).await;

        assert!(buffer.cancel_pending("s16").await);
        sleep(ms(1_000)).await;

        assert_eq!(recorder.messages(), vec!["A"]);
        assert_eq!(buffer.get_pending_count("s16").await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_during_flush_keeps_one_dispatch_in_flight() {
        let buffer = buffer(100);
        let recorder = Recorder::slow(ms(500));

        buffer.enqueue("s17", "A", recorder.clone(), None).await;
        sleep(ms(120)).await;
        assert!(buffer.is_flushing("s17").await);

        buffer.cleanup_session("s17").await;
        assert!(buffer.is_flushing("s17").await);
        assert_eq!(buffer.get_pending_count("s17").await, 0);

        buffer.enqueue("s17", "B", recorder.clone(), None).await;
        sleep(ms(150)).await;
        assert_eq!(recorder.messages(), vec!["A"]);

        // A ends at ~620ms and B follows it; B is still running at 700ms.
        sleep(ms(430)).await;
        assert_eq!(recorder.messages(), vec!["A", "B"]);
        assert!(buffer.is_flushing("s17").await);

        sleep(ms(1_000)).await;
        assert_eq!(recorder.max_in_flight.load(Ordering::SeqCst), 1);
        assert!(!buffer.is_flushing("s17").await);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_during_flush_discards_deferred_batch() {
        let buffer = buffer(100);
        let recorder = Recorder::slow(ms(500));

        buffer.enqueue("s18", "A", recorder.clone(), None).await;
        sleep(ms(150)).await;
        buffer.enqueue("s18", "B", recorder.clone(), None).await;
        sleep(ms(200)).await;
        assert_eq!(buffer.get_pending_count("s18").await, 1);

        buffer.cleanup_session("s18").await;
        sleep(ms(1_000)).await;

        assert_eq!(recorder.messages(), vec!["A"]);
        assert!(!buffer.is_flushing("s18").await);
        assert_eq!(buffer.get_pending_count("s18").await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn no_dispatch_after_cleanup() {
        let buffer = buffer(100);
        let recorder = Arc::new(Recorder::default());

        buffer.enqueue("s19", "one", recorder.clone(), None).await;
        buffer.enqueue("s19", "two", recorder.clone(), None).await;
        sleep(ms(99)).await;
        buffer.cleanup_session("s19").await;
        sleep(ms(500)).await;

        assert!(recorder.messages().is_empty());
        assert!(!buffer.is_flushing("s19").await);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_window_does_not_overflow() {
        let buffer = buffer(100);
        let recorder = Arc::new(Recorder::default());

        let window = Duration::from_secs(u64::MAX / 4);
        assert_eq!(buffer.enqueue("s20", "later", recorder.clone(), Some(window)).await, 1);
        sleep(ms(1_000)).await;

        assert!(recorder.messages().is_empty());
        assert!(buffer.cancel_pending("s20").await);
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("héllo wörld", 5), "héllo...");
        assert_eq!(preview("short", 50), "short");
    }

    #[test]
    fn default_config_uses_newline_and_two_seconds() {
        let config = BufferConfig::default();
        assert_eq!(config.default_window, Duration::from_secs(2));
        assert_eq!(config.separator, "\n");
    }
}
