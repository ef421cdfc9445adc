use crate::i18n::Language;
use crate::models::{ConversationId, Message};

/// Change notifications published by the session controller
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The active conversation identity changed (selection sync for the list view)
    ConversationChanged(Option<ConversationId>),
    MessageAppended(Message),
    /// The whole message sequence was swapped (history load or reset)
    MessagesReplaced { count: usize },
    PendingChanged(bool),
    LanguageChanged(Language),
    /// History could not be loaded; the previous view is left as it was
    LoadFailed {
        conversation_id: ConversationId,
        reason: String,
    },
    ListFailed { reason: String },
}
