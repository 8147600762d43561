use reqwest::Method;

use crate::{
    client::Client,
    config::Config,
    stream::{ChatHandler, ChatStream},
    types::chat::ChatRequest,
};

/// API resource for the `/api/chat` endpoint
pub struct Chat<'c, C: Config> {
    client: &'c Client<C>,
}

impl<'c, C: Config> Chat<'c, C> {
    /// Creates a new Chat resource
    #[must_use]
    pub const fn new(client: &'c Client<C>) -> Self {
        Self { client }
    }

    /// Start a streaming chat turn.
    ///
    /// Returns immediately; the request runs on a spawned task and every
    /// callback goes to `handler`. Must be called from within a tokio runtime.
    pub fn stream<H: ChatHandler>(&self, req: ChatRequest, handler: H) -> ChatStream {
        tracing::debug!(
            model = %req.model,
            conversation = req.conversation_id.as_deref().unwrap_or("new"),
            "starting chat stream"
        );
        match self.client.request(Method::POST, "/api/chat") {
            Ok(builder) => ChatStream::spawn(builder.json(&req), handler),
            Err(e) => ChatStream::rejected(e.to_string(), handler),
        }
    }
}

impl<C: Config> crate::Client<C> {
    /// Returns the Chat API resource
    #[must_use]
    pub const fn chat(&self) -> Chat<'_, C> {
        Chat::new(self)
    }
}
