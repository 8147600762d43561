//! Line-oriented decoding of `text/event-stream` bodies.
//!
//! The backend frames every event as a single `data: <json>` line. Only the
//! `data: ` prefix is meaningful; blank separator lines, comments and any
//! other field are ignored.

use std::pin::Pin;

use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;

use crate::error::ZeeError;

/// Prefix of a significant line, including the single space
pub const DATA_PREFIX: &str = "data: ";

/// Incremental bytes-to-lines decoder.
///
/// Carries two kinds of remainder across [`push`](Self::push) calls: the bytes
/// of a UTF-8 sequence cut by a frame boundary, and the text of a line that
/// has not seen its `\n` yet.
#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
    buffer: String,
}

impl LineDecoder {
    /// Create a new decoder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame of bytes and return every line it completed.
    ///
    /// Returned lines have the `\n` (and a preceding `\r`) stripped.
    pub fn push(&mut self, frame: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(frame);
        self.decode_pending();

        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        complete
            .split_terminator('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect()
    }

    /// Flush at end of stream, returning the trailing unterminated line, if any.
    ///
    /// Bytes of an unfinished UTF-8 sequence become U+FFFD.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            self.buffer.push_str(&String::from_utf8_lossy(&tail));
        }
        let mut line = std::mem::take(&mut self.buffer);
        if line.ends_with('\r') {
            line.pop();
        }
        (!line.is_empty()).then_some(line)
    }

    fn decode_pending(&mut self) {
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        // Truncated sequence at the end: wait for the next frame.
                        None => {
                            self.pending.drain(..valid);
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Parse a complete line as a `data:` event.
///
/// Returns `None` for lines without the prefix and for payloads that do not
/// decode as `T`; a corrupt event is skipped rather than failing the stream.
pub fn parse_data_line<T: DeserializeOwned>(line: &str) -> Option<T> {
    let payload = line.strip_prefix(DATA_PREFIX)?;
    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!(error = %e, payload, "skipping malformed stream event");
            None
        }
    }
}

/// Type alias for typed event streams decoded from a response body
pub type EventStream<T> = Pin<Box<dyn Stream<Item = Result<T, ZeeError>> + Send + 'static>>;

/// Decode a streaming response into typed `data:` events.
///
/// Used for endpoints without cancellation semantics (model pulls). The stream
/// owns the response and closes the connection when dropped.
#[must_use]
pub fn event_stream_from_response<T>(response: reqwest::Response) -> EventStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let bytes = response.bytes_stream();

    let events = futures::stream::unfold(
        (Box::pin(bytes), LineDecoder::new(), false),
        |(mut body, mut decoder, finished)| async move {
            if finished {
                return None;
            }
            match body.next().await {
                Some(Ok(frame)) => {
                    let parsed: Vec<Result<T, ZeeError>> = decoder
                        .push(&frame)
                        .iter()
                        .filter_map(|line| parse_data_line(line))
                        .map(Ok)
                        .collect();
                    Some((parsed, (body, decoder, false)))
                }
                Some(Err(e)) => Some((vec![Err(ZeeError::Reqwest(e))], (body, decoder, true))),
                None => {
                    let tail: Vec<Result<T, ZeeError>> = decoder
                        .finish()
                        .and_then(|line| parse_data_line(&line))
                        .map(Ok)
                        .into_iter()
                        .collect();
                    Some((tail, (body, decoder, true)))
                }
            }
        },
    )
    .flat_map(futures::stream::iter);

    Box::pin(events)
}
