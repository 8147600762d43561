//! Streaming chat consumer.
//!
//! Turns the `POST /api/chat` event stream into ordered handler callbacks and
//! exposes a cancellation handle to the caller.

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::api_error_message;
use crate::sse::{LineDecoder, parse_data_line};
use crate::types::chat::{ChatStreamChunk, ChunkKind};

/// Message passed to the error callback when the backend rejects a chat request
/// without saying why
pub const CHAT_REQUEST_FAILED: &str = "Chat request failed";

/// Which condition triggered a completion callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneSignal {
    /// A chunk arrived with `done: true`
    Chunk,
    /// The body ended. Always the last callback of a stream that was not
    /// cancelled and did not fail.
    EndOfStream,
}

/// How a chat stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The backend closed the body normally
    Completed,
    /// The caller cancelled; no error was reported
    Cancelled,
    /// The request was rejected or the transport failed
    Failed(String),
}

/// Receiver of chat stream callbacks.
///
/// Callbacks run synchronously on the stream task, in arrival order.
/// `on_done` may run twice for one stream: once for a `done: true` chunk and
/// once at end of stream.
pub trait ChatHandler: Send + 'static {
    /// A parsed event arrived
    fn on_chunk(&mut self, chunk: ChatStreamChunk);
    /// Generation completed
    fn on_done(&mut self, signal: DoneSignal);
    /// The request was rejected or the connection failed
    fn on_error(&mut self, message: String);
}

/// All callbacks folded into one value, for channel- and closure-based handlers
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// See [`ChatHandler::on_chunk`]
    Chunk(ChatStreamChunk),
    /// See [`ChatHandler::on_done`]
    Done(DoneSignal),
    /// See [`ChatHandler::on_error`]
    Error(String),
}

impl<F> ChatHandler for F
where
    F: FnMut(ChatEvent) + Send + 'static,
{
    fn on_chunk(&mut self, chunk: ChatStreamChunk) {
        self(ChatEvent::Chunk(chunk));
    }

    fn on_done(&mut self, signal: DoneSignal) {
        self(ChatEvent::Done(signal));
    }

    fn on_error(&mut self, message: String) {
        self(ChatEvent::Error(message));
    }
}

/// A handler that forwards every callback to a UI loop over a channel.
///
/// A closed receiver is ignored; the stream keeps draining until it ends.
pub fn forward_to(tx: mpsc::UnboundedSender<ChatEvent>) -> impl ChatHandler {
    move |event: ChatEvent| {
        let _ = tx.send(event);
    }
}

/// Handle to an in-flight chat stream.
///
/// Dropping the handle detaches the stream; it keeps running until the
/// backend closes it. Call [`cancel`](Self::cancel) to abort.
#[derive(Debug)]
pub struct ChatStream {
    cancel: CancellationToken,
    task: JoinHandle<StreamOutcome>,
}

impl ChatStream {
    pub(crate) fn spawn<H: ChatHandler>(request: reqwest::RequestBuilder, handler: H) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(request, cancel.clone(), handler));
        Self { cancel, task }
    }

    /// A stream that reports `message` through `on_error` without sending anything.
    pub(crate) fn rejected<H: ChatHandler>(message: String, mut handler: H) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move { fail(&token, &mut handler, message) });
        Self { cancel, task }
    }

    /// Abort the request. No further callbacks are delivered.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that aborts this stream when cancelled (e.g. from a signal handler)
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// True once the stream task has returned
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the stream to end
    pub async fn join(self) -> StreamOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => StreamOutcome::Cancelled,
            Err(e) => StreamOutcome::Failed(format!("stream task failed: {e}")),
        }
    }
}

async fn run<H: ChatHandler>(
    request: reqwest::RequestBuilder,
    cancel: CancellationToken,
    mut handler: H,
) -> StreamOutcome {
    let sent = tokio::select! {
        biased;
        () = cancel.cancelled() => return StreamOutcome::Cancelled,
        sent = request.send() => sent,
    };

    let response = match sent {
        Ok(response) => response,
        Err(e) => return fail(&cancel, &mut handler, e.to_string()),
    };

    let status = response.status();
    if !status.is_success() {
        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return StreamOutcome::Cancelled,
            body = response.bytes() => body.unwrap_or_default(),
        };
        let message = api_error_message(&body, CHAT_REQUEST_FAILED);
        tracing::debug!(status = status.as_u16(), %message, "chat request rejected");
        return fail(&cancel, &mut handler, message);
    }

    drive(response.bytes_stream(), &cancel, &mut handler).await
}

fn fail<H: ChatHandler>(cancel: &CancellationToken, handler: &mut H, message: String) -> StreamOutcome {
    // An aborted transport surfaces as an error; it is not one.
    if cancel.is_cancelled() {
        return StreamOutcome::Cancelled;
    }
    handler.on_error(message.clone());
    StreamOutcome::Failed(message)
}

/// Consume a chat event body, dispatching each `data:` line to `handler`.
///
/// Generic over the frame source so any byte stream (a live response body, a
/// replayed capture) goes through the same decoding path.
pub async fn drive<S, B, E, H>(body: S, cancel: &CancellationToken, handler: &mut H) -> StreamOutcome
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
    H: ChatHandler,
{
    let mut body = std::pin::pin!(body);
    let mut decoder = LineDecoder::new();
    let mut delivered = 0usize;

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => return StreamOutcome::Cancelled,
            next = body.next() => next,
        };

        match next {
            Some(Ok(frame)) => {
                for line in decoder.push(frame.as_ref()) {
                    if cancel.is_cancelled() {
                        return StreamOutcome::Cancelled;
                    }
                    if let Some(chunk) = parse_data_line::<ChatStreamChunk>(&line) {
                        delivered += 1;
                        dispatch(handler, chunk);
                    }
                }
            }
            Some(Err(e)) => return fail(cancel, handler, e.to_string()),
            None => break,
        }
    }

    if let Some(chunk) = decoder
        .finish()
        .and_then(|line| parse_data_line::<ChatStreamChunk>(&line))
    {
        delivered += 1;
        warn_on_error(&chunk);
        handler.on_chunk(chunk);
    }

    tracing::info!(events = delivered, "chat stream finished");
    handler.on_done(DoneSignal::EndOfStream);
    StreamOutcome::Completed
}

fn dispatch<H: ChatHandler>(handler: &mut H, chunk: ChatStreamChunk) {
    let done = chunk.done;
    warn_on_error(&chunk);
    handler.on_chunk(chunk);
    if done {
        handler.on_done(DoneSignal::Chunk);
    }
}

fn warn_on_error(chunk: &ChatStreamChunk) {
    if let ChunkKind::Error { message } = &chunk.kind {
        tracing::warn!(%message, "backend reported a generation error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Recorder;
    use std::convert::Infallible;

    fn frames(parts: &[&str]) -> impl Stream<Item = Result<Vec<u8>, Infallible>> {
        let owned: Vec<Result<Vec<u8>, Infallible>> = parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        futures::stream::iter(owned)
    }

    #[tokio::test]
    async fn chunk_split_across_frames_is_delivered_once() {
        let mut rec = Recorder::new();
        let cancel = CancellationToken::new();
        let outcome = drive(
            frames(&["data: {\"type\":\"chunk\",\"content\":\"Hel", "lo\"}\n"]),
            &cancel,
            &mut rec,
        )
        .await;

        assert_eq!(outcome, StreamOutcome::Completed);
        let chunks = rec.chunks();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text(), Some("Hello"));
        assert_eq!(rec.events().last(), Some(&ChatEvent::Done(DoneSignal::EndOfStream)));
    }

    #[tokio::test]
    async fn done_chunk_fires_completion_before_end_of_stream() {
        let mut rec = Recorder::new();
        let cancel = CancellationToken::new();
        drive(
            frames(&[
                "data: {\"type\":\"chunk\",\"content\":\"hi\"}\n\n",
                "data: {\"type\":\"chunk\",\"content\":\"\",\"done\":true,\"total_tokens\":5}\n\n",
            ]),
            &cancel,
            &mut rec,
        )
        .await;

        let events = rec.events();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[1], ChatEvent::Chunk(ref c) if c.done));
        assert_eq!(events[2], ChatEvent::Done(DoneSignal::Chunk));
        assert_eq!(events[3], ChatEvent::Done(DoneSignal::EndOfStream));
    }

    #[tokio::test]
    async fn trailing_line_without_newline_is_parsed() {
        let mut rec = Recorder::new();
        let cancel = CancellationToken::new();
        drive(
            frames(&["data: {\"type\":\"init\",\"conversation_id\":\"c1\"}\n", "data: {\"type\":\"chunk\",\"content\":\"end\"}"]),
            &cancel,
            &mut rec,
        )
        .await;

        let chunks = rec.chunks();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text(), Some("end"));
        assert_eq!(rec.done_count(), 1);
    }

    #[tokio::test]
    async fn non_data_and_malformed_lines_are_ignored() {
        let mut rec = Recorder::new();
        let cancel = CancellationToken::new();
        let outcome = drive(
            frames(&[
                ": comment\n",
                "event: chunk\n",
                "data: {broken\n",
                "data:{\"type\":\"chunk\",\"content\":\"no space\"}\n",
                "data: {\"type\":\"chunk\",\"content\":\"ok\"}\n",
            ]),
            &cancel,
            &mut rec,
        )
        .await;

        assert_eq!(outcome, StreamOutcome::Completed);
        assert_eq!(rec.chunks().len(), 1);
        assert!(rec.errors().is_empty());
    }

    #[tokio::test]
    async fn transport_error_reports_and_stops() {
        let mut rec = Recorder::new();
        let cancel = CancellationToken::new();
        let body = futures::stream::iter(vec![
            Ok(b"data: {\"type\":\"chunk\",\"content\":\"a\"}\n".to_vec()),
            Err("connection reset"),
            Ok(b"data: {\"type\":\"chunk\",\"content\":\"b\"}\n".to_vec()),
        ]);
        let outcome = drive(body, &cancel, &mut rec).await;

        assert_eq!(outcome, StreamOutcome::Failed("connection reset".into()));
        assert_eq!(rec.chunks().len(), 1);
        assert_eq!(rec.errors(), vec!["connection reset".to_string()]);
        assert_eq!(rec.done_count(), 0);
    }

    #[tokio::test]
    async fn cancelled_before_read_delivers_nothing() {
        let mut rec = Recorder::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = drive(
            frames(&["data: {\"type\":\"chunk\",\"content\":\"a\"}\n"]),
            &cancel,
            &mut rec,
        )
        .await;

        assert_eq!(outcome, StreamOutcome::Cancelled);
        assert!(rec.events().is_empty());
    }

    #[tokio::test]
    async fn error_after_cancel_is_suppressed() {
        let mut rec = Recorder::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(
            fail(&cancel, &mut rec, "aborted".into()),
            StreamOutcome::Cancelled
        );
        assert!(rec.errors().is_empty());
    }

    #[tokio::test]
    async fn closure_handler_sees_events() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&seen);
        let mut handler = move |event: ChatEvent| sink.lock().unwrap().push(event);
        let cancel = CancellationToken::new();
        drive(
            frames(&["data: {\"type\":\"error\",\"error\":\"boom\"}\n"]),
            &cancel,
            &mut handler,
        )
        .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(matches!(
            &seen[0],
            ChatEvent::Chunk(c) if c.kind == ChunkKind::Error { message: "boom".into() }
        ));
    }

    #[tokio::test]
    async fn channel_handler_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handler = forward_to(tx);
        let cancel = CancellationToken::new();
        drive(
            frames(&["data: {\"type\":\"chunk\",\"content\":\"x\"}\n"]),
            &cancel,
            &mut handler,
        )
        .await;
        drop(handler);

        assert!(matches!(rx.recv().await, Some(ChatEvent::Chunk(_))));
        assert_eq!(rx.recv().await, Some(ChatEvent::Done(DoneSignal::EndOfStream)));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn bytes_arriving_after_cancel_are_dropped() {
        let (tx, rx) = futures::channel::mpsc::unbounded::<Result<Vec<u8>, Infallible>>();
        let rec = Recorder::new();
        let cancel = CancellationToken::new();

        let task = {
            let mut rec = rec.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { drive(rx, &cancel, &mut rec).await })
        };

        tx.unbounded_send(Ok(b"data: {\"type\":\"chunk\",\"content\":\"a\"}\n".to_vec()))
            .unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while rec.chunks().is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        cancel.cancel();
        tx.unbounded_send(Ok(
            b"data: {\"type\":\"chunk\",\"content\":\"b\",\"done\":true}\n".to_vec(),
        ))
        .unwrap();
        drop(tx);

        assert_eq!(task.await.unwrap(), StreamOutcome::Cancelled);
        let chunks = rec.chunks();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text(), Some("a"));
        assert!(rec.errors().is_empty());
        assert_eq!(rec.done_count(), 0);
    }

    struct WarnCounter(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn error_event_is_logged_mid_stream_and_on_final_line() {
        use tracing_subscriber::layer::SubscriberExt;

        let warnings = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let subscriber =
            tracing_subscriber::registry().with(WarnCounter(std::sync::Arc::clone(&warnings)));
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut rec = Recorder::new();
        let cancel = CancellationToken::new();
        drive(
            frames(&[
                "data: {\"type\":\"error\",\"error\":\"first\"}\n",
                "data: {\"type\":\"error\",\"error\":\"last\",\"done\":true}",
            ]),
            &cancel,
            &mut rec,
        )
        .await;

        assert_eq!(warnings.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(rec.chunks().len(), 2);
        // The final unterminated line completes through end of stream only
        assert_eq!(rec.done_count(), 1);
    }
}
