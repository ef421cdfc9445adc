use serde::Serialize;

use crate::i18n::{strings, Language, Strings};
use crate::models::{ConversationId, Message, MessageId};

/// Read-only copy of the live session, handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub conversation_id: Option<ConversationId>,
    pub messages: Vec<Message>,
    pub language: Language,
    pub pending: bool,
}

impl SessionSnapshot {
    /// Computed from the language, never stored
    pub fn is_rtl(&self) -> bool {
        self.language.is_rtl()
    }

    pub fn strings(&self) -> &'static Strings {
        strings(self.language)
    }
}

/// Handle on one outstanding network operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Ticket {
    /// Session generation the operation was started against
    pub epoch: u64,
    pub op: u64,
}

/// Mutable session model, only ever touched under the controller's lock
#[derive(Debug)]
pub(super) struct SessionState {
    pub conversation_id: Option<ConversationId>,
    pub messages: Vec<Message>,
    pub language: Language,
    /// Bumped whenever the session is replaced
    pub epoch: u64,
    /// Operation that currently owns the pending flag
    pub in_flight: Option<u64>,
    /// Most recent history load; older loads of the same conversation lose
    latest_load: Option<u64>,
    next_op: u64,
    next_local_id: u64,
}

impl SessionState {
    pub fn new(language: Language) -> Self {
        Self {
            conversation_id: None,
            messages: Vec::new(),
            language,
            epoch: 0,
            in_flight: None,
            latest_load: None,
            next_op: 0,
            next_local_id: 0,
        }
    }

    pub fn pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a new session generation; responses to older ones become stale
    pub fn replace(&mut self) {
        self.epoch += 1;
    }

    /// Register a network operation and make it the owner of `pending`
    pub fn begin(&mut self) -> Ticket {
        self.next_op += 1;
        self.in_flight = Some(self.next_op);
        Ticket {
            epoch: self.epoch,
            op: self.next_op,
        }
    }

    /// `begin` for a history load, which supersedes earlier loads
    pub fn begin_load(&mut self) -> Ticket {
        let ticket = self.begin();
        self.latest_load = Some(ticket.op);
        ticket
    }

    pub fn is_latest_load(&self, ticket: Ticket) -> bool {
        self.latest_load == Some(ticket.op)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.epoch == ticket.epoch
    }

    /// Release `pending` if `ticket` still owns it. Returns whether it changed.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if self.in_flight == Some(ticket.op) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Client-side identity for optimistic and locally built entries.
    /// Never reset, so ids stay unique across session replacements.
    pub fn next_local_id(&mut self) -> MessageId {
        self.next_local_id += 1;
        MessageId::Local(self.next_local_id)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            conversation_id: self.conversation_id.clone(),
            messages: self.messages.clone(),
            language: self.language,
            pending: self.pending(),
        }
    }
}
