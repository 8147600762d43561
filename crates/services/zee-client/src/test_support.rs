//! Helpers shared by unit and integration tests.

use std::sync::{Arc, Mutex, PoisonError};

use crate::stream::{ChatEvent, ChatHandler};
use crate::types::chat::ChatStreamChunk;

/// Restores a process environment variable when dropped.
///
/// Tests that touch the environment must also be `#[serial(env)]`, since
/// `set_var`/`remove_var` race with concurrent readers.
pub struct EnvGuard {
    key: &'static str,
    saved: Option<String>,
}

impl EnvGuard {
    /// Sets `key` to `val` for the lifetime of the guard.
    #[must_use]
    pub fn set(key: &'static str, val: &str) -> Self {
        let saved = std::env::var(key).ok();
        // SAFETY: callers serialize env access with `#[serial(env)]`.
        unsafe { std::env::set_var(key, val) };
        Self { key, saved }
    }

    /// Unsets `key` for the lifetime of the guard.
    #[must_use]
    pub fn remove(key: &'static str) -> Self {
        let saved = std::env::var(key).ok();
        // SAFETY: callers serialize env access with `#[serial(env)]`.
        unsafe { std::env::remove_var(key) };
        Self { key, saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: see constructors.
        unsafe {
            match self.saved.take() {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }
}

/// A [`ChatHandler`] that records every callback, cloneable so the test keeps
/// a view while the stream task owns the handler.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<ChatEvent>>>,
}

impl Recorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event seen so far.
    #[must_use]
    pub fn events(&self) -> Vec<ChatEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Only the chunk payloads, in delivery order.
    #[must_use]
    pub fn chunks(&self) -> Vec<ChatStreamChunk> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ChatEvent::Chunk(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Only the error messages, in delivery order.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ChatEvent::Error(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Number of completion callbacks received.
    #[must_use]
    pub fn done_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ChatEvent::Done(_)))
            .count()
    }
}

impl ChatHandler for Recorder {
    fn on_chunk(&mut self, chunk: ChatStreamChunk) {
        self.push(ChatEvent::Chunk(chunk));
    }

    fn on_done(&mut self, signal: crate::stream::DoneSignal) {
        self.push(ChatEvent::Done(signal));
    }

    fn on_error(&mut self, message: String) {
        self.push(ChatEvent::Error(message));
    }
}

impl Recorder {
    fn push(&self, event: ChatEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Renders `data:` lines the way the backend frames them (`data: ...\n\n`).
#[must_use]
pub fn sse_body(payloads: &[serde_json::Value]) -> String {
    payloads
        .iter()
        .map(|p| format!("data: {p}\n\n"))
        .collect()
}
