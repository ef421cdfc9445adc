use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::i18n::Language;

/// Server-issued conversation identifier.
///
/// The backend hands out integers, but the client treats the value as opaque and
/// keeps its string form. Ids that are canonical integers go back on the wire as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<i64> for ConversationId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for ConversationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Only canonical integers: "007" or "+5" stay strings
        match self.0.parse::<i64>() {
            Ok(n) if n.to_string() == self.0 => serializer.serialize_i64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for ConversationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self::from(n),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Identity of a message in the open conversation.
///
/// Optimistic entries carry a client counter, confirmed entries the server id.
/// The two variants never compare equal, whatever their payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum MessageId {
    Local(u64),
    Remote(String),
}

impl MessageId {
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(n) => write!(f, "local-{}", n),
            Self::Remote(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A reference document the assistant cited
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Source {
    /// Title, falling back to the category
    pub fn label(&self) -> Option<&str> {
        self.title.as_deref().or(self.category.as_deref())
    }
}

/// One entry of a conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Only ever set on assistant entries standing in for a failed reply
    pub error: bool,
    pub sources: Vec<Source>,
}

impl Message {
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: MessageRole::User,
            content: content.into(),
            created_at: Utc::now(),
            error: false,
            sources: Vec::new(),
        }
    }

    pub fn assistant(id: MessageId, content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            id,
            role: MessageRole::Assistant,
            content: content.into(),
            created_at: Utc::now(),
            error: false,
            sources,
        }
    }

    /// Assistant-role placeholder for a reply that never came
    pub fn failure(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            error: true,
            ..Self::assistant(id, content, Vec::new())
        }
    }
}

/// Row of the conversation list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub language: Option<Language>,
    pub message_count: Option<usize>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Full history of one conversation as returned by the server
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedConversation {
    pub messages: Vec<Message>,
    /// Language the conversation was started in, if the server stored one
    pub language: Option<Language>,
    pub title: Option<String>,
}

/// The assistant's answer to one message
#[derive(Debug, Clone, PartialEq)]
pub struct SendReply {
    pub conversation_id: Option<ConversationId>,
    pub reply: String,
    pub sources: Vec<Source>,
    pub language: Option<Language>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_id_accepts_numbers_and_strings() {
        let from_int: ConversationId = serde_json::from_str("42").unwrap();
        let from_text: ConversationId = serde_json::from_str("\"c1\"").unwrap();
        assert_eq!(from_int.as_str(), "42");
        assert_eq!(from_text.as_str(), "c1");
    }

    #[test]
    fn test_conversation_id_serializes_numeric_as_number() {
        assert_eq!(serde_json::to_string(&ConversationId::from(7_i64)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&ConversationId::from("c1")).unwrap(), "\"c1\"");
    }

    #[test]
    fn test_padded_numeric_id_round_trips_as_string() {
        for raw in ["007", "+5", "-0"] {
            let id = ConversationId::from(raw);
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", raw));
            let back: ConversationId = serde_json::from_str(&json).unwrap();
            assert_eq!(back, id);
        }
        assert_eq!(serde_json::to_string(&ConversationId::from("-3")).unwrap(), "-3");
    }

    #[test]
    fn test_local_and_remote_ids_never_collide() {
        assert_ne!(MessageId::Local(1), MessageId::Remote("1".into()));
        assert!(MessageId::Local(1).is_local());
        assert_eq!(MessageId::Local(3).to_string(), "local-3");
    }

    #[test]
    fn test_source_label_falls_back_to_category() {
        let titled = Source {
            title: Some("Passeport".into()),
            category: Some("identite".into()),
        };
        let untitled = Source {
            title: None,
            category: Some("etat-civil".into()),
        };
        assert_eq!(titled.label(), Some("Passeport"));
        assert_eq!(untitled.label(), Some("etat-civil"));
        assert_eq!(Source::default().label(), None);
    }

    #[test]
    fn test_failure_is_flagged_assistant() {
        let msg = Message::failure(MessageId::Local(2), "oops");
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.error);
        assert!(msg.sources.is_empty());
    }
}
