//! Message flow of one chat surface.
//!
//! An assistant reply lives in transient state while it streams and becomes
//! a [`Message`] only when the stream completes or is stopped. A stopped reply
//! carries [`STOPPED_MARKER`] so it cannot be mistaken for a complete one.

use chrono::Utc;

use crate::types::{ChatStreamChunk, ChunkKind, GenerationMetrics, Message, Role};

/// Appended to a reply the user stopped mid-stream
pub const STOPPED_MARKER: &str = "\n\n*[Response stopped]*";

/// Something the chat surface should react to after a chunk
#[derive(Debug, Clone, PartialEq)]
pub enum TurnUpdate {
    /// The backend created (or confirmed) the conversation
    ConversationAssigned(String),
    /// New reply text to render
    Delta(String),
    /// The backend reported a generation error
    Failed(String),
    /// The reply completed
    Finished(Message),
}

/// Messages of one conversation plus the reply being streamed
#[derive(Debug, Clone)]
pub struct ChatSession {
    model: String,
    conversation_id: Option<String>,
    messages: Vec<Message>,
    streaming: Option<String>,
    metrics: Option<GenerationMetrics>,
    error: Option<String>,
}

impl ChatSession {
    /// A new, empty session answering with `model`
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            conversation_id: None,
            messages: Vec::new(),
            streaming: None,
            metrics: None,
            error: None,
        }
    }

    /// Resume an existing conversation with its stored history
    #[must_use]
    pub fn resume(model: impl Into<String>, conversation_id: impl Into<String>, history: Vec<Message>) -> Self {
        Self {
            conversation_id: Some(conversation_id.into()),
            messages: history,
            ..Self::new(model)
        }
    }

    /// Switch the model used for following turns
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Append the user's message and open an empty streaming reply.
    ///
    /// Returns the message as it should be sent (trimmed).
    pub fn begin_turn(&mut self, text: &str) -> &Message {
        self.error = None;
        self.metrics = None;
        self.streaming = Some(String::new());
        let message = self.message(Role::User, text.trim().to_string());
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Fold one stream event into the session
    pub fn apply_chunk(&mut self, chunk: &ChatStreamChunk) -> Vec<TurnUpdate> {
        let mut updates = Vec::new();

        match &chunk.kind {
            ChunkKind::Init { conversation_id } => {
                self.conversation_id = Some(conversation_id.clone());
                updates.push(TurnUpdate::ConversationAssigned(conversation_id.clone()));
            }
            ChunkKind::Chunk { content } => {
                if !content.is_empty()
                    && let Some(reply) = self.streaming.as_mut()
                {
                    reply.push_str(content);
                    updates.push(TurnUpdate::Delta(content.clone()));
                }
            }
            ChunkKind::Error { message } => {
                self.fail(message.clone());
                updates.push(TurnUpdate::Failed(message.clone()));
            }
        }

        if chunk.metrics.is_some() {
            self.metrics = chunk.metrics;
        }

        if chunk.done
            && let Some(message) = self.finish()
        {
            updates.push(TurnUpdate::Finished(message));
        }

        updates
    }

    /// Complete the streaming reply.
    ///
    /// Returns `None` when there is no reply in flight, so a second completion
    /// signal for the same stream is a no-op.
    pub fn finish(&mut self) -> Option<Message> {
        let content = self.streaming.take()?;
        let metrics = self.metrics.take().unwrap_or_default();

        let mut message = self.message(Role::Assistant, content);
        message.model = Some(self.model.clone());
        message.tokens_used = metrics.total_tokens;
        message.duration = metrics.duration;
        self.messages.push(message.clone());
        Some(message)
    }

    /// Finalize a reply the user cancelled.
    ///
    /// Partial text is kept with [`STOPPED_MARKER`] appended; an empty reply
    /// is discarded.
    pub fn stop(&mut self) -> Option<Message> {
        self.metrics = None;
        let content = self.streaming.take().filter(|c| !c.is_empty())?;

        let mut message = self.message(Role::Assistant, content + STOPPED_MARKER);
        message.model = Some(self.model.clone());
        self.messages.push(message.clone());
        Some(message)
    }

    /// Drop the streaming reply and record an inline error
    pub fn fail(&mut self, message: String) {
        self.streaming = None;
        self.metrics = None;
        self.error = Some(message);
    }

    /// Completed messages, oldest first
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Text streamed so far for the reply in flight
    #[must_use]
    pub fn streaming_content(&self) -> Option<&str> {
        self.streaming.as_deref()
    }

    /// Whether a reply is in flight
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.streaming.is_some()
    }

    /// Conversation id, once the backend assigned one
    #[must_use]
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Last error of the current turn
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Model used for the next turn
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn message(&self, role: Role, content: String) -> Message {
        Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: self.conversation_id.clone().unwrap_or_default(),
            role,
            content,
            model: None,
            tokens_used: None,
            duration: None,
            created_at: Utc::now(),
        }
    }
}
