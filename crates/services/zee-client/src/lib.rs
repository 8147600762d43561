#![deny(missing_docs)]

//! Async client for the Zee chat backend.
//!
//! Typed REST resources for models, conversations and stats, plus a
//! cancellable streaming consumer for `POST /api/chat`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use zee_client::{ChatEvent, ChatRequest, Client};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new();
//!
//! let stream = client.chat().stream(
//!     ChatRequest::new("gemma3", "Hello!"),
//!     |event: ChatEvent| {
//!         if let ChatEvent::Chunk(chunk) = event {
//!             print!("{}", chunk.text().unwrap_or_default());
//!         }
//!     },
//! );
//!
//! let outcome = stream.join().await;
//! println!("\n{outcome:?}");
//! # Ok(())
//! # }
//! ```

/// HTTP client implementation
pub mod client;
/// Configuration types for the client
pub mod config;
/// Conversation/model directory refresh
pub mod directory;
/// Error types
pub mod error;
/// Display helpers for sizes, durations and timestamps
pub mod format;
/// API resource implementations
pub mod resources;
/// Chat-surface message flow
pub mod session;
/// Line-oriented server-sent events decoding
pub mod sse;
/// Client-side application state
pub mod store;
/// Streaming chat consumer
pub mod stream;
/// Test support utilities (for use in tests)
#[doc(hidden)]
pub mod test_support;
/// Request and response types
pub mod types;

pub use crate::client::Client;
pub use crate::config::ZeeConfig;
pub use crate::error::{ApiErrorObject, ZeeError};
pub use crate::session::{ChatSession, TurnUpdate};
pub use crate::store::{AppStore, StoreAction};
pub use crate::stream::{ChatEvent, ChatHandler, ChatStream, DoneSignal, StreamOutcome};
pub use crate::types::chat::{ChatRequest, ChatStreamChunk, ChunkKind, GenerationMetrics};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::types::*;
    pub use crate::{AppStore, ChatEvent, ChatSession, Client, StoreAction, ZeeConfig};
}
