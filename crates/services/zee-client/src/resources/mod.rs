//! API resource implementations for the Zee client

/// Chat streaming resource
pub mod chat;
/// Conversations API resource
pub mod conversations;
/// Health check resource
pub mod health;
/// Models API resource
pub mod models;
/// Usage stats resource
pub mod stats;

pub use chat::Chat;
pub use conversations::Conversations;
pub use health::Health;
pub use models::Models;
pub use stats::Stats;
