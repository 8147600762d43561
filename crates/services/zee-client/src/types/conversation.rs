use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted thread of messages exchanged with one model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    /// Backend-assigned id
    pub id: String,
    /// Display title (auto-generated after the first reply)
    pub title: String,
    /// Model the conversation was started with
    #[serde(default)]
    pub model: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last activity time
    pub updated_at: DateTime<Utc>,
}

/// Author of a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the user
    User,
    /// Generated by the model
    Assistant,
    /// System prompt
    System,
}

/// A single chat message; never mutated once created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Message id
    pub id: String,
    /// Owning conversation (empty for a local message sent before `init`)
    #[serde(default)]
    pub conversation_id: String,
    /// Author
    pub role: Role,
    /// Full text
    pub content: String,
    /// Model that produced an assistant message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Tokens consumed producing the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    /// Generation time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Response of `GET /api/conversations/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationDetail {
    /// The conversation record
    pub conversation: Conversation,
    /// Messages in chronological order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateConversationRequest<'a> {
    pub model: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenameConversationRequest<'a> {
    pub title: &'a str,
}

/// Treats an explicit JSON `null` list like a missing one.
pub(crate) fn null_as_empty<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(de)?.unwrap_or_default())
}
