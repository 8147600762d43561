use crate::{
    client::Client,
    config::Config,
    error::ZeeError,
    types::conversation::{
        Conversation, ConversationDetail, ConversationList, CreateConversationRequest, Message,
        MessageList, RenameConversationRequest,
    },
};

/// API resource for the `/api/conversations` endpoints
pub struct Conversations<'c, C: Config> {
    client: &'c Client<C>,
}

impl<'c, C: Config> Conversations<'c, C> {
    /// Creates a new Conversations resource
    #[must_use]
    pub const fn new(client: &'c Client<C>) -> Self {
        Self { client }
    }

    /// List conversations, most recent first
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn list(&self) -> Result<Vec<Conversation>, ZeeError> {
        let list: ConversationList = self
            .client
            .get("/api/conversations", "Failed to fetch conversations")
            .await?;
        Ok(list.conversations)
    }

    /// Create an empty conversation bound to `model`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn create(&self, model: &str) -> Result<Conversation, ZeeError> {
        self.client
            .post(
                "/api/conversations",
                &CreateConversationRequest { model },
                "Failed to create conversation",
            )
            .await
    }

    /// Fetch a conversation together with its messages
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn get(&self, id: &str) -> Result<ConversationDetail, ZeeError> {
        self.client
            .get(&conversation_path(id), "Failed to fetch conversation")
            .await
    }

    /// Fetch only the messages of a conversation
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn messages(&self, id: &str) -> Result<Vec<Message>, ZeeError> {
        let path = format!("{}/messages", conversation_path(id));
        let list: MessageList = self.client.get(&path, "Failed to fetch messages").await?;
        Ok(list.messages)
    }

    /// Set a conversation's title
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn rename(&self, id: &str, title: &str) -> Result<(), ZeeError> {
        self.client
            .patch_empty(
                &conversation_path(id),
                &RenameConversationRequest { title },
                "Failed to update conversation",
            )
            .await
    }

    /// Delete a conversation and its messages
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn delete(&self, id: &str) -> Result<(), ZeeError> {
        self.client
            .delete_empty(&conversation_path(id), "Failed to delete conversation")
            .await
    }
}

fn conversation_path(id: &str) -> String {
    format!("/api/conversations/{}", urlencoding::encode(id))
}

impl<C: Config> crate::Client<C> {
    /// Returns the Conversations API resource
    #[must_use]
    pub const fn conversations(&self) -> Conversations<'_, C> {
        Conversations::new(self)
    }
}
