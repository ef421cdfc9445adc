// JSON shapes of the chat API. Kept private to the gateway; everything
// leaves this module as crate::models types.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::i18n::Language;
use crate::models::{
    ConversationId, ConversationSummary, FetchedConversation, Message, MessageId, MessageRole,
    SendReply, Source,
};

#[derive(Debug, Serialize)]
pub(super) struct SendRequest<'a> {
    pub message: &'a str,
    pub conversation_id: Option<&'a ConversationId>,
    pub language: Option<Language>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SendResponse {
    #[serde(default)]
    conversation_id: Option<ConversationId>,
    response: String,
    #[serde(default)]
    sources: Option<Vec<Source>>,
    #[serde(default)]
    language: Option<String>,
}

impl From<SendResponse> for SendReply {
    fn from(wire: SendResponse) -> Self {
        Self {
            conversation_id: wire.conversation_id,
            reply: wire.response,
            sources: wire.sources.unwrap_or_default(),
            language: wire.language.as_deref().and_then(Language::from_code),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ConversationsResponse {
    #[serde(default)]
    pub conversations: Vec<ConversationRecord>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ConversationRecord {
    id: ConversationId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    message_count: Option<usize>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl From<ConversationRecord> for ConversationSummary {
    fn from(wire: ConversationRecord) -> Self {
        let title = wire
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("Conversation {}", wire.id));
        Self {
            id: wire.id,
            title,
            language: wire.language.as_deref().and_then(Language::from_code),
            message_count: wire.message_count,
            updated_at: wire.updated_at.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryResponse {
    #[serde(default)]
    conversation: Option<ConversationMeta>,
    #[serde(default)]
    messages: Vec<MessageRecord>,
}

#[derive(Debug, Deserialize)]
struct ConversationMeta {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRecord {
    #[serde(default)]
    id: Option<Value>,
    role: MessageRole,
    content: String,
    #[serde(default)]
    metadata: Option<MessageMetadata>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MessageMetadata {
    #[serde(default)]
    sources: Option<Vec<Source>>,
}

impl From<HistoryResponse> for FetchedConversation {
    fn from(wire: HistoryResponse) -> Self {
        let messages = wire
            .messages
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_message(index))
            .collect();
        let (title, language) = match wire.conversation {
            Some(meta) => (
                meta.title,
                meta.language.as_deref().and_then(Language::from_code),
            ),
            None => (None, None),
        };
        Self {
            messages,
            language,
            title,
        }
    }
}

impl MessageRecord {
    fn into_message(self, index: usize) -> Message {
        let id = match self.id {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            // History entries are always server-side; synthesize a stable remote key
            _ => format!("#{}", index),
        };
        let sources = self
            .metadata
            .and_then(|m| m.sources)
            .unwrap_or_default();
        let created_at = self
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);

        Message {
            id: MessageId::Remote(id),
            role: self.role,
            content: self.content,
            created_at,
            error: false,
            sources,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub error: String,
}

/// Accept RFC 3339 as well as the naive UTC `isoformat()` the backend emits
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
