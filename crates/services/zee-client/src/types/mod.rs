//! Request and response types for the Zee backend

/// Chat request body and stream chunk events
pub mod chat;
/// Conversation and message records
pub mod conversation;
/// Locally installed models and pull progress
pub mod model;
/// Health and stats payloads
pub mod system;

pub use chat::{ChatRequest, ChatStreamChunk, ChunkKind, GenerationMetrics, GenerationOptions};
pub use conversation::{Conversation, ConversationDetail, Message, Role};
pub use model::{Model, ModelDetails, PullProgress};
pub use system::HealthStatus;
