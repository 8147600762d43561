//! Chat request body and the events streamed back by `POST /api/chat`.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ChatRequest {
    /// Existing conversation; `None` asks the backend to create one
    pub conversation_id: Option<String>,
    /// Model identifier, e.g. `gemma3:4b`
    pub model: String,
    /// The user's message
    pub message: String,
    /// Optional system-prompt override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Optional sampling parameters forwarded to the model server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerationOptions>,
}

impl ChatRequest {
    /// Starts a request in a new conversation
    #[must_use]
    pub fn new(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Continues an existing conversation (or starts one when `None`)
    #[must_use]
    pub fn with_conversation(mut self, id: Option<String>) -> Self {
        self.conversation_id = id;
        self
    }

    /// Overrides the system prompt; blank prompts are dropped
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.system_prompt = (!prompt.trim().is_empty()).then_some(prompt);
        self
    }

    /// Sets sampling parameters
    #[must_use]
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Sampling parameters understood by Ollama-compatible servers
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling cutoff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    /// RNG seed for reproducible output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

/// One event from the chat stream.
///
/// The payload is tagged by `type`; `done` and the aggregate metrics are
/// orthogonal to the tag and usually ride on the last `chunk` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawChunk")]
pub struct ChatStreamChunk {
    /// What this event carries
    pub kind: ChunkKind,
    /// Set on the event that ends generation
    pub done: bool,
    /// Token and timing totals, present on the final event
    pub metrics: Option<GenerationMetrics>,
}

/// Payload of a [`ChatStreamChunk`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkKind {
    /// Server-assigned conversation id (sent first)
    Init {
        /// Id of the conversation the reply belongs to
        conversation_id: String,
    },
    /// Incremental text fragment
    Chunk {
        /// The fragment; may be empty on the final event
        content: String,
    },
    /// Generation failed on the backend
    Error {
        /// Human-readable failure
        message: String,
    },
}

/// Aggregate numbers reported alongside `done = true`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationMetrics {
    /// Prompt plus completion tokens
    pub total_tokens: Option<u64>,
    /// Completion tokens only
    pub eval_count: Option<u64>,
    /// Wall-clock generation time in seconds
    pub duration: Option<f64>,
}

impl ChatStreamChunk {
    /// Text fragment of a `chunk` event
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ChunkKind::Chunk { content } => Some(content),
            ChunkKind::Init { .. } | ChunkKind::Error { .. } => None,
        }
    }

    /// Conversation id announced by an `init` event
    #[must_use]
    pub fn conversation_id(&self) -> Option<&str> {
        match &self.kind {
            ChunkKind::Init { conversation_id } => Some(conversation_id),
            ChunkKind::Chunk { .. } | ChunkKind::Error { .. } => None,
        }
    }
}

const UNKNOWN_STREAM_ERROR: &str = "Unknown error";

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    Init,
    Chunk,
    Error,
}

#[derive(Deserialize)]
struct RawChunk {
    #[serde(rename = "type")]
    kind: RawKind,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    conversation_id: Option<String>,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    total_tokens: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawChunk> for ChatStreamChunk {
    type Error = String;

    fn try_from(raw: RawChunk) -> Result<Self, Self::Error> {
        let kind = match raw.kind {
            RawKind::Init => ChunkKind::Init {
                conversation_id: raw
                    .conversation_id
                    .filter(|id| !id.is_empty())
                    .ok_or("init event without conversation_id")?,
            },
            RawKind::Chunk => ChunkKind::Chunk {
                content: raw.content.unwrap_or_default(),
            },
            RawKind::Error => ChunkKind::Error {
                message: raw
                    .error
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| UNKNOWN_STREAM_ERROR.into()),
            },
        };

        let metrics = (raw.total_tokens.is_some()
            || raw.eval_count.is_some()
            || raw.duration.is_some())
        .then_some(GenerationMetrics {
            total_tokens: raw.total_tokens,
            eval_count: raw.eval_count,
            duration: raw.duration,
        });

        Ok(Self {
            kind,
            done: raw.done.unwrap_or(false),
            metrics,
        })
    }
}
