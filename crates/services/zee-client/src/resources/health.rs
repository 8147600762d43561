use crate::{client::Client, config::Config, error::ZeeError, types::system::HealthStatus};

/// API resource for the `/api/health` endpoint
pub struct Health<'c, C: Config> {
    client: &'c Client<C>,
}

impl<'c, C: Config> Health<'c, C> {
    /// Creates a new Health resource
    #[must_use]
    pub const fn new(client: &'c Client<C>) -> Self {
        Self { client }
    }

    /// Query backend health
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or answers non-2xx.
    pub async fn check(&self) -> Result<HealthStatus, ZeeError> {
        self.client.get("/api/health", "Health check failed").await
    }
}

impl<C: Config> crate::Client<C> {
    /// Returns the Health API resource
    #[must_use]
    pub const fn health(&self) -> Health<'_, C> {
        Health::new(self)
    }
}
