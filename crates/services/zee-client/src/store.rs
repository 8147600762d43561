//! Client-side application state.
//!
//! [`AppStore`] is owned by whoever drives the chat surface and changes only
//! through [`AppStore::apply`]. Background work (the directory poller) sends
//! [`StoreAction`]s over a channel instead of touching the store directly.

use crate::types::{Conversation, Model};

/// A state transition of [`AppStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    /// Replace the model list
    SetModels(Vec<Model>),
    /// Select a model by name
    SelectModel(String),
    /// Set the system prompt sent with each turn
    SetSystemPrompt(String),
    /// Replace the conversation list
    SetConversations(Vec<Conversation>),
    /// Focus a conversation, or none for a new chat
    SetActiveConversation(Option<String>),
    /// Insert a conversation at the top of the list
    AddConversation(Conversation),
    /// Remove a conversation by id
    RemoveConversation(String),
    /// Mark a chat stream as in flight or idle
    SetStreaming(bool),
    /// Result of one directory poll
    DirectoryRefreshed {
        /// Models available on the backend
        models: Vec<Model>,
        /// Conversations, most recent first
        conversations: Vec<Conversation>,
    },
}

/// State shared by the chat surface
#[derive(Debug, Clone, Default)]
pub struct AppStore {
    models: Vec<Model>,
    selected_model: Option<String>,
    system_prompt: String,
    conversations: Vec<Conversation>,
    active_conversation_id: Option<String>,
    is_streaming: bool,
}

impl AppStore {
    /// Empty store: no model selected, nothing streaming
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action
    pub fn apply(&mut self, action: StoreAction) {
        match action {
            StoreAction::SetModels(models) => self.models = models,
            StoreAction::SelectModel(name) => {
                self.selected_model = (!name.is_empty()).then_some(name);
            }
            StoreAction::SetSystemPrompt(prompt) => self.system_prompt = prompt,
            StoreAction::SetConversations(conversations) => self.conversations = conversations,
            StoreAction::SetActiveConversation(id) => self.active_conversation_id = id,
            StoreAction::AddConversation(conversation) => {
                self.conversations.insert(0, conversation);
            }
            StoreAction::RemoveConversation(id) => {
                self.conversations.retain(|c| c.id != id);
                if self.active_conversation_id.as_deref() == Some(id.as_str()) {
                    self.active_conversation_id = None;
                }
            }
            StoreAction::SetStreaming(streaming) => self.is_streaming = streaming,
            StoreAction::DirectoryRefreshed {
                models,
                conversations,
            } => {
                self.models = models;
                self.conversations = conversations;
                if self.selected_model.is_none()
                    && let Some(first) = self.models.first()
                {
                    tracing::debug!(model = %first.name, "auto-selecting first model");
                    self.selected_model = Some(first.name.clone());
                }
            }
        }
    }

    /// Whether `input` may be sent now.
    ///
    /// Requires non-blank input, a selected model and no stream in flight.
    #[must_use]
    pub fn can_send(&self, input: &str) -> bool {
        !input.trim().is_empty() && self.selected_model.is_some() && !self.is_streaming
    }

    /// Available models
    #[must_use]
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Selected model name
    #[must_use]
    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    /// System prompt; empty means the backend default
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Known conversations, most recent first
    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Focused conversation
    #[must_use]
    pub fn active_conversation_id(&self) -> Option<&str> {
        self.active_conversation_id.as_deref()
    }

    /// Whether a chat stream is in flight
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.is_streaming
    }
}
