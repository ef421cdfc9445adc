use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::traits::ConversationGateway;
use super::wire::{
    ConversationsResponse, ErrorBody, HistoryResponse, SendRequest, SendResponse,
};
use crate::auth::SessionProvider;
use crate::constants::{ROUTE_CONVERSATION, ROUTE_CONVERSATIONS, ROUTE_SEND_MESSAGE};
use crate::i18n::Language;
use crate::models::{ConversationId, ConversationSummary, FetchedConversation, SendReply};
use crate::utils::{GuichetError, Result};

/// Chat API client over reqwest
pub struct HttpGateway {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionProvider>,
}

impl HttpGateway {
    /// Create a gateway for `base_url`; the session provider is asked for a
    /// bearer token on every request
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GuichetError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self
            .session
            .bearer_token()
            .ok_or_else(|| GuichetError::Unauthorized("no session token".to_string()))?;
        Ok(request.bearer_auth(token))
    }
}

/// Map a non-success response onto the error taxonomy
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_string()
            } else {
                body
            }
        });

    if status == StatusCode::UNAUTHORIZED {
        Err(GuichetError::Unauthorized(message))
    } else {
        Err(GuichetError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ConversationGateway for HttpGateway {
    async fn fetch(&self, conversation_id: &ConversationId) -> Result<FetchedConversation> {
        let url = format!("{}/{}", self.url(ROUTE_CONVERSATION), conversation_id);
        debug!("GET {}", url);

        let response = self.authorize(self.client.get(&url))?.send().await?;
        let history: HistoryResponse = check_status(response).await?.json().await?;
        Ok(history.into())
    }

    async fn send(
        &self,
        text: &str,
        conversation_id: Option<ConversationId>,
        language: Option<Language>,
    ) -> Result<SendReply> {
        let url = self.url(ROUTE_SEND_MESSAGE);
        debug!("POST {} (conversation: {:?})", url, conversation_id);

        let body = SendRequest {
            message: text,
            conversation_id: conversation_id.as_ref(),
            language,
        };
        let response = self
            .authorize(self.client.post(&url).json(&body))?
            .send()
            .await?;
        let reply: SendResponse = check_status(response).await?.json().await?;
        Ok(reply.into())
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>> {
        let url = self.url(ROUTE_CONVERSATIONS);
        debug!("GET {}", url);

        let response = self.authorize(self.client.get(&url))?.send().await?;
        let listing: ConversationsResponse = check_status(response).await?.json().await?;
        Ok(listing.conversations.into_iter().map(Into::into).collect())
    }
}
