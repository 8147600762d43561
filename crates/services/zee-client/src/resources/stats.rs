use crate::{client::Client, config::Config, error::ZeeError};

/// API resource for the `/api/stats` endpoint
pub struct Stats<'c, C: Config> {
    client: &'c Client<C>,
}

impl<'c, C: Config> Stats<'c, C> {
    /// Creates a new Stats resource
    #[must_use]
    pub const fn new(client: &'c Client<C>) -> Self {
        Self { client }
    }

    /// Fetch backend usage statistics.
    ///
    /// The payload shape is backend-defined, so it is returned as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn get(&self) -> Result<serde_json::Value, ZeeError> {
        self.client.get("/api/stats", "Failed to fetch stats").await
    }
}

impl<C: Config> crate::Client<C> {
    /// Returns the Stats API resource
    #[must_use]
    pub const fn stats(&self) -> Stats<'_, C> {
        Stats::new(self)
    }
}
