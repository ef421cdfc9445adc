use async_trait::async_trait;

use crate::i18n::Language;
use crate::models::{ConversationId, ConversationSummary, FetchedConversation, SendReply};
use crate::utils::Result;

/// Network side of a conversation. Every call is a single attempt and keeps no
/// state between calls; failures come back as `GuichetError` values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationGateway: Send + Sync {
    /// Full history of one conversation
    async fn fetch(&self, conversation_id: &ConversationId) -> Result<FetchedConversation>;

    /// Post a user message; creates the conversation when `conversation_id` is `None`
    async fn send(
        &self,
        text: &str,
        conversation_id: Option<ConversationId>,
        language: Option<Language>,
    ) -> Result<SendReply>;

    /// Conversations of the signed-in user, most recent first
    async fn list(&self) -> Result<Vec<ConversationSummary>>;
}
