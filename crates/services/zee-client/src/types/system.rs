use serde::{Deserialize, Serialize};

/// Response of `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// `healthy`, or `degraded` when the model server is unreachable
    pub status: String,
    /// Whether the backend can reach its model server
    #[serde(default)]
    pub ollama: bool,
    /// Backend version string
    #[serde(default)]
    pub version: String,
}

impl HealthStatus {
    /// True when the backend reports itself fully healthy
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" && self.ollama
    }
}
