use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::conversation::null_as_empty;

/// A model installed on the backend's model server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Model {
    /// Name used to select the model, e.g. `gemma3:4b`
    pub name: String,
    /// Model tag as reported by the server
    #[serde(default)]
    pub model: String,
    /// Last modification time
    pub modified_at: DateTime<Utc>,
    /// On-disk size in bytes
    #[serde(default)]
    pub size: u64,
    /// Content digest
    #[serde(default)]
    pub digest: String,
    /// Architecture details
    #[serde(default)]
    pub details: ModelDetails,
}

/// Architecture details of a [`Model`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelDetails {
    /// Base model, if derived
    #[serde(default)]
    pub parent_model: String,
    /// Weights format (e.g. `gguf`)
    #[serde(default)]
    pub format: String,
    /// Primary family
    #[serde(default)]
    pub family: String,
    /// All families
    #[serde(default, deserialize_with = "null_as_empty")]
    pub families: Vec<String>,
    /// Parameter count, e.g. `4.3B`
    #[serde(default)]
    pub parameter_size: String,
    /// Quantization, e.g. `Q4_K_M`
    #[serde(default)]
    pub quantization_level: String,
}

/// One progress event of `POST /api/models/pull`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullProgress {
    /// Phase description (`pulling manifest`, `success`, ...)
    #[serde(default)]
    pub status: String,
    /// Layer being downloaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Layer size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Bytes downloaded so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<u64>,
    /// Failure reported by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PullProgress {
    /// Completed fraction of the current layer, when sizes are known
    #[must_use]
    pub fn fraction(&self) -> Option<f64> {
        match (self.completed, self.total) {
            (Some(done), Some(total)) if total > 0 => Some(done as f64 / total as f64),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub models: Vec<Model>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PullRequest<'a> {
    pub name: &'a str,
}
