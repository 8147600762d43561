use futures::StreamExt;
use reqwest::Method;

use crate::{
    client::Client,
    config::Config,
    error::ZeeError,
    sse::{EventStream, event_stream_from_response},
    types::model::{Model, ModelList, PullProgress, PullRequest},
};

/// API resource for the `/api/models` endpoints
pub struct Models<'c, C: Config> {
    client: &'c Client<C>,
}

impl<'c, C: Config> Models<'c, C> {
    /// Creates a new Models resource
    #[must_use]
    pub const fn new(client: &'c Client<C>) -> Self {
        Self { client }
    }

    /// List installed models
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn list(&self) -> Result<Vec<Model>, ZeeError> {
        let list: ModelList = self.client.get("/api/models", "Failed to fetch models").await?;
        Ok(list.models)
    }

    /// Delete a model by name
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn delete(&self, name: &str) -> Result<(), ZeeError> {
        let path = format!("/api/models/{}", urlencoding::encode(name));
        self.client.delete_empty(&path, "Failed to delete model").await
    }

    /// Pull a model, streaming download progress.
    ///
    /// The returned stream yields one item per progress event. A progress
    /// event carrying `error` is yielded as [`ZeeError::Stream`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected before streaming starts.
    pub async fn pull(&self, name: &str) -> Result<EventStream<PullProgress>, ZeeError> {
        let req = self
            .client
            .request(Method::POST, "/api/models/pull")?
            .json(&PullRequest { name });
        let response = self.client.send_streaming(req, "Failed to pull model").await?;

        let progress = event_stream_from_response::<PullProgress>(response).map(|item| {
            item.and_then(|p| match p.error {
                Some(message) => Err(ZeeError::Stream(message)),
                None => Ok(p),
            })
        });
        Ok(Box::pin(progress))
    }
}

impl<C: Config> crate::Client<C> {
    /// Returns the Models API resource
    #[must_use]
    pub const fn models(&self) -> Models<'_, C> {
        Models::new(self)
    }
}
