use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::events::SessionEvent;
use super::state::{SessionSnapshot, SessionState};
use crate::constants::SESSION_EVENT_CAPACITY;
use crate::gateway::ConversationGateway;
use crate::i18n::{strings, Language};
use crate::models::{ConversationId, ConversationSummary, Message};

/// How a `send_message` call ended
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Blank input, nothing happened
    Ignored,
    /// The assistant's reply was appended
    Delivered(Message),
    /// The gateway failed; this error-flagged entry was appended instead
    Failed(Message),
    /// The session was replaced while the request was out; the response was dropped
    Discarded,
}

/// How an `open_conversation` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Fetch failed, previous messages kept
    Failed,
    /// Superseded by a later open or reset
    Discarded,
}

/// Owner of the live conversation session.
///
/// All operations take `&self` and run on one logical execution context. State
/// sits behind a short lock that is never held across the gateway await, so the
/// only suspension point of each operation is the network call itself. A
/// response is applied only if the session it was issued for is still current.
pub struct SessionController {
    gateway: Arc<dyn ConversationGateway>,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(gateway: Arc<dyn ConversationGateway>, language: Language) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self {
            gateway,
            state: Mutex::new(SessionState::new(language)),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().snapshot()
    }

    pub fn language(&self) -> Language {
        self.state.lock().language
    }

    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.state.lock().conversation_id.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state.lock().pending()
    }

    /// Run `f` under the lock, then publish whatever events it queued
    fn update<R>(&self, f: impl FnOnce(&mut SessionState, &mut Vec<SessionEvent>) -> R) -> R {
        let mut queued = Vec::new();
        let result = {
            let mut state = self.state.lock();
            f(&mut state, &mut queued)
        };
        for event in queued {
            // No subscribers is fine
            let _ = self.events.send(event);
        }
        result
    }

    /// Replace the session with the server-side history of `conversation_id`.
    ///
    /// The active id switches immediately so the list view can follow the
    /// selection. Messages are only swapped once the fetch succeeds; a failed
    /// fetch leaves them untouched and is reported through `LoadFailed`.
    pub async fn open_conversation(&self, conversation_id: ConversationId) -> LoadOutcome {
        let ticket = self.update(|state, events| {
            // Reloading the open conversation keeps its in-flight replies
            if state.conversation_id.as_ref() != Some(&conversation_id) {
                state.replace();
                state.conversation_id = Some(conversation_id.clone());
                events.push(SessionEvent::ConversationChanged(Some(conversation_id.clone())));
            }
            let was_pending = state.pending();
            let ticket = state.begin_load();
            if !was_pending {
                events.push(SessionEvent::PendingChanged(true));
            }
            ticket
        });

        let result = self.gateway.fetch(&conversation_id).await;

        self.update(|state, events| {
            if !state.is_current(ticket) || !state.is_latest_load(ticket) {
                debug!("Dropping stale history for conversation {}", conversation_id);
                return LoadOutcome::Discarded;
            }

            let outcome = match result {
                Ok(fetched) => {
                    let count = fetched.messages.len();
                    state.messages = fetched.messages;
                    events.push(SessionEvent::MessagesReplaced { count });
                    if let Some(language) = fetched.language {
                        if language != state.language {
                            state.language = language;
                            events.push(SessionEvent::LanguageChanged(language));
                        }
                    }
                    debug!("Loaded {} messages for conversation {}", count, conversation_id);
                    LoadOutcome::Loaded
                }
                Err(e) => {
                    warn!("Failed to load conversation {}: {}", conversation_id, e);
                    events.push(SessionEvent::LoadFailed {
                        conversation_id: conversation_id.clone(),
                        reason: e.to_string(),
                    });
                    LoadOutcome::Failed
                }
            };

            if state.finish(ticket) {
                events.push(SessionEvent::PendingChanged(false));
            }
            outcome
        })
    }

    /// Drop the open conversation and start from an empty, unsaved one.
    /// The language is kept. No network call.
    pub fn start_new_conversation(&self) {
        self.update(|state, events| {
            state.replace();
            if state.conversation_id.take().is_some() {
                events.push(SessionEvent::ConversationChanged(None));
            }
            if !state.messages.is_empty() {
                state.messages.clear();
                events.push(SessionEvent::MessagesReplaced { count: 0 });
            }
            // Whatever was in flight now belongs to a dead session
            if state.in_flight.take().is_some() {
                events.push(SessionEvent::PendingChanged(false));
            }
        });
    }

    /// Send `text` to the assistant.
    ///
    /// The user's entry is appended before the request goes out and is never
    /// touched afterwards. Exactly one assistant entry follows it: the reply,
    /// or an error-flagged entry worded in the language active when the
    /// failure is processed.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let (ticket, conversation_id, language) = self.update(|state, events| {
            let id = state.next_local_id();
            let message = Message::user(id, text);
            state.messages.push(message.clone());
            events.push(SessionEvent::MessageAppended(message));

            let was_pending = state.pending();
            let ticket = state.begin();
            if !was_pending {
                events.push(SessionEvent::PendingChanged(true));
            }
            (ticket, state.conversation_id.clone(), state.language)
        });

        let result = self
            .gateway
            .send(text, conversation_id, Some(language))
            .await;

        self.update(|state, events| {
            if !state.is_current(ticket) {
                debug!("Dropping reply for a session that is no longer open");
                return SendOutcome::Discarded;
            }

            let outcome = match result {
                Ok(reply) => {
                    if let Some(assigned) = reply.conversation_id {
                        match &state.conversation_id {
                            None => {
                                info!("Conversation created: {}", assigned);
                                state.conversation_id = Some(assigned.clone());
                                events.push(SessionEvent::ConversationChanged(Some(assigned)));
                            }
                            Some(current) if *current != assigned => {
                                warn!(
                                    "Server answered for conversation {} while {} is open; keeping {}",
                                    assigned, current, current
                                );
                            }
                            Some(_) => {}
                        }
                    }
                    let id = state.next_local_id();
                    let message = Message::assistant(id, reply.reply, reply.sources);
                    state.messages.push(message.clone());
                    events.push(SessionEvent::MessageAppended(message.clone()));
                    SendOutcome::Delivered(message)
                }
                Err(e) => {
                    error!("Failed to send message: {}", e);
                    // Current language, not the one the request went out with
                    let id = state.next_local_id();
                    let message = Message::failure(id, strings(state.language).error);
                    state.messages.push(message.clone());
                    events.push(SessionEvent::MessageAppended(message.clone()));
                    SendOutcome::Failed(message)
                }
            };

            if state.finish(ticket) {
                events.push(SessionEvent::PendingChanged(false));
            }
            outcome
        })
    }

    /// Switch the interface language. Unknown codes are rejected and leave the
    /// session untouched. Returns whether `code` was accepted.
    pub fn set_language(&self, code: &str) -> bool {
        let Some(language) = Language::from_code(code) else {
            debug!("Rejected unsupported language code {:?}", code);
            return false;
        };

        self.update(|state, events| {
            if state.language != language {
                state.language = language;
                events.push(SessionEvent::LanguageChanged(language));
            }
        });
        true
    }

    /// Conversations for the list view. Failures are logged and yield an
    /// empty list; the session itself is never affected.
    pub async fn list_conversations(&self) -> Vec<ConversationSummary> {
        match self.gateway.list().await {
            Ok(conversations) => conversations,
            Err(e) => {
                warn!("Failed to load conversations: {}", e);
                let _ = self.events.send(SessionEvent::ListFailed {
                    reason: e.to_string(),
                });
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockConversationGateway;
    use crate::models::{
        ConversationId, FetchedConversation, MessageId, MessageRole, SendReply, Source,
    };
    use crate::utils::{GuichetError, Result};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::{HashMap, VecDeque};
    use tokio::sync::{oneshot, Notify};

    /// Gateway whose responses are released by the test, one channel per call
    #[derive(Default)]
    struct GatedGateway {
        sends: Mutex<VecDeque<oneshot::Receiver<Result<SendReply>>>>,
        fetches: Mutex<HashMap<String, VecDeque<oneshot::Receiver<Result<FetchedConversation>>>>>,
        sent: Mutex<Vec<(String, Option<ConversationId>, Option<Language>)>>,
        called: Notify,
    }

    impl GatedGateway {
        fn queue_send(&self) -> oneshot::Sender<Result<SendReply>> {
            let (tx, rx) = oneshot::channel();
            self.sends.lock().push_back(rx);
            tx
        }

        fn queue_fetch(&self, id: &str) -> oneshot::Sender<Result<FetchedConversation>> {
            let (tx, rx) = oneshot::channel();
            self.fetches
                .lock()
                .entry(id.to_string())
                .or_default()
                .push_back(rx);
            tx
        }
    }

    fn dropped<T>(_: oneshot::error::RecvError) -> Result<T> {
        Err(GuichetError::Transport("response channel dropped".into()))
    }

    #[async_trait]
    impl ConversationGateway for GatedGateway {
        async fn fetch(&self, conversation_id: &ConversationId) -> Result<FetchedConversation> {
            let rx = self
                .fetches
                .lock()
                .get_mut(conversation_id.as_str())
                .and_then(VecDeque::pop_front)
                .expect("unexpected fetch");
            self.called.notify_one();
            rx.await.unwrap_or_else(dropped)
        }

        async fn send(
            &self,
            text: &str,
            conversation_id: Option<ConversationId>,
            language: Option<Language>,
        ) -> Result<SendReply> {
            let rx = self.sends.lock().pop_front().expect("unexpected send");
            self.sent
                .lock()
                .push((text.to_string(), conversation_id, language));
            self.called.notify_one();
            rx.await.unwrap_or_else(dropped)
        }

        async fn list(&self) -> Result<Vec<ConversationSummary>> {
            Ok(Vec::new())
        }
    }

    fn reply(id: &str, text: &str, sources: Vec<Source>) -> SendReply {
        SendReply {
            conversation_id: Some(ConversationId::from(id)),
            reply: text.to_string(),
            sources,
            language: None,
        }
    }

    fn history(texts: &[(&str, MessageRole)], language: Option<Language>) -> FetchedConversation {
        let messages = texts
            .iter()
            .enumerate()
            .map(|(i, (content, role))| {
                let id = MessageId::Remote(format!("{}", i + 1));
                match role {
                    MessageRole::User => Message::user(id, *content),
                    MessageRole::Assistant => Message::assistant(id, *content, Vec::new()),
                }
            })
            .collect();
        FetchedConversation {
            messages,
            language,
            title: None,
        }
    }

    fn gated() -> (Arc<GatedGateway>, SessionController) {
        let gateway = Arc::new(GatedGateway::default());
        let controller = SessionController::new(gateway.clone(), Language::Fr);
        (gateway, controller)
    }

    #[tokio::test]
    async fn test_passport_scenario() {
        let (gateway, controller) = gated();

        let first = gateway.queue_send();
        let (outcome, _) = tokio::join!(
            controller.send_message("Quels documents pour un passeport ?"),
            async {
                gateway.called.notified().await;
                let snap = controller.snapshot();
                assert_eq!(snap.messages.len(), 1);
                assert_eq!(snap.messages[0].role, MessageRole::User);
                assert!(snap.messages[0].id.is_local());
                assert!(snap.pending);
                first
                    .send(Ok(reply(
                        "c1",
                        "Il faut...",
                        vec![Source {
                            title: Some("Passeport".into()),
                            category: None,
                        }],
                    )))
                    .unwrap();
            }
        );

        assert!(matches!(outcome, SendOutcome::Delivered(_)));
        let snap = controller.snapshot();
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.messages[1].role, MessageRole::Assistant);
        assert_eq!(snap.messages[1].sources.len(), 1);
        assert_eq!(snap.conversation_id, Some(ConversationId::from("c1")));
        assert!(!snap.pending);

        let second = gateway.queue_send();
        second.send(Ok(reply("c1", "Je vous en prie.", Vec::new()))).unwrap();
        controller.send_message("Merci").await;

        let snap = controller.snapshot();
        let contents: Vec<&str> = snap.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                "Quels documents pour un passeport ?",
                "Il faut...",
                "Merci",
                "Je vous en prie."
            ]
        );

        let sent = gateway.sent.lock();
        assert_eq!(sent[0].1, None);
        assert_eq!(sent[1].1, Some(ConversationId::from("c1")));
        assert_eq!(sent[1].2, Some(Language::Fr));
    }

    #[tokio::test]
    async fn test_failure_appends_one_error_entry() {
        let (gateway, controller) = gated();
        let tx = gateway.queue_send();
        tx.send(Err(GuichetError::Rejected {
            status: 500,
            message: "boom".into(),
        }))
        .unwrap();

        let outcome = controller.send_message("Bonjour").await;

        let snap = controller.snapshot();
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.messages[0].content, "Bonjour");
        assert!(!snap.messages[0].error);
        assert!(snap.messages[1].error);
        assert_eq!(snap.messages[1].role, MessageRole::Assistant);
        assert_eq!(snap.messages[1].content, strings(Language::Fr).error);
        assert_eq!(snap.conversation_id, None);
        assert!(!snap.pending);
        assert!(matches!(outcome, SendOutcome::Failed(m) if m.error));
    }

    #[tokio::test]
    async fn test_error_text_uses_language_at_resolution() {
        let (gateway, controller) = gated();
        let tx = gateway.queue_send();

        tokio::join!(controller.send_message("Salam"), async {
            gateway.called.notified().await;
            assert!(controller.set_language("ar"));
            tx.send(Err(GuichetError::Transport("timeout".into()))).unwrap();
        });

        let snap = controller.snapshot();
        assert_eq!(snap.language, Language::Ar);
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.messages[0].content, "Salam");
        assert_eq!(snap.messages[1].content, strings(Language::Ar).error);
        // The request itself still went out in French
        assert_eq!(gateway.sent.lock()[0].2, Some(Language::Fr));
    }

    #[tokio::test]
    async fn test_stale_history_is_discarded() {
        let (gateway, controller) = gated();
        let a = gateway.queue_fetch("A");
        let b = gateway.queue_fetch("B");

        let (outcome_a, outcome_b, _) = tokio::join!(
            controller.open_conversation(ConversationId::from("A")),
            controller.open_conversation(ConversationId::from("B")),
            async {
                // Both calls are already out once this branch is first polled
                gateway.called.notified().await;
                b.send(Ok(history(
                    &[("B question", MessageRole::User), ("B answer", MessageRole::Assistant)],
                    Some(Language::En),
                )))
                .unwrap();
                tokio::task::yield_now().await;
                a.send(Ok(history(&[("A question", MessageRole::User)], Some(Language::Ar))))
                    .unwrap();
            }
        );

        assert_eq!(outcome_a, LoadOutcome::Discarded);
        assert_eq!(outcome_b, LoadOutcome::Loaded);

        let snap = controller.snapshot();
        assert_eq!(snap.conversation_id, Some(ConversationId::from("B")));
        assert_eq!(snap.language, Language::En);
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.messages[0].content, "B question");
        assert!(!snap.pending);
    }

    #[tokio::test]
    async fn test_stale_history_does_not_clear_pending_of_newer_load() {
        let (gateway, controller) = gated();
        let a = gateway.queue_fetch("A");
        let b = gateway.queue_fetch("B");

        tokio::join!(
            controller.open_conversation(ConversationId::from("A")),
            controller.open_conversation(ConversationId::from("B")),
            async {
                // Both calls are already out once this branch is first polled
                gateway.called.notified().await;
                a.send(Ok(history(&[("A", MessageRole::User)], None))).unwrap();
                tokio::task::yield_now().await;
                tokio::task::yield_now().await;
                // A resolved, B still out
                assert!(controller.is_pending());
                assert!(controller.snapshot().messages.is_empty());
                b.send(Ok(history(&[("B", MessageRole::User)], None))).unwrap();
            }
        );

        assert!(!controller.is_pending());
        assert_eq!(controller.snapshot().messages[0].content, "B");
    }

    #[tokio::test]
    async fn test_reloading_open_conversation_keeps_pending_reply() {
        let (gateway, controller) = gated();
        gateway
            .queue_fetch("5")
            .send(Ok(history(&[], None)))
            .unwrap();
        controller.open_conversation(ConversationId::from("5")).await;

        let mut events = controller.subscribe();
        let send_tx = gateway.queue_send();
        let fetch_tx = gateway.queue_fetch("5");

        let (sent, loaded, _) = tokio::join!(
            controller.send_message("Question"),
            controller.open_conversation(ConversationId::from("5")),
            async {
                // Both calls are already out once this branch is first polled
                gateway.called.notified().await;
                send_tx.send(Ok(reply("5", "Answer", Vec::new()))).unwrap();
                tokio::task::yield_now().await;
                fetch_tx
                    .send(Err(GuichetError::Transport("offline".into())))
                    .unwrap();
            }
        );

        assert!(matches!(sent, SendOutcome::Delivered(_)));
        assert_eq!(loaded, LoadOutcome::Failed);

        let snap = controller.snapshot();
        let contents: Vec<&str> = snap.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Question", "Answer"]);
        assert_eq!(snap.conversation_id, Some(ConversationId::from("5")));
        assert!(!snap.pending);

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert!(!seen
            .iter()
            .any(|e| matches!(e, SessionEvent::ConversationChanged(_))));
    }

    #[tokio::test]
    async fn test_older_reload_of_same_conversation_loses() {
        let (gateway, controller) = gated();
        let first = gateway.queue_fetch("5");
        let second = gateway.queue_fetch("5");

        let (outcome_first, outcome_second, _) = tokio::join!(
            controller.open_conversation(ConversationId::from("5")),
            controller.open_conversation(ConversationId::from("5")),
            async {
                gateway.called.notified().await;
                second
                    .send(Ok(history(&[("Fresh", MessageRole::User)], None)))
                    .unwrap();
                tokio::task::yield_now().await;
                first
                    .send(Ok(history(&[("Old", MessageRole::User)], None)))
                    .unwrap();
            }
        );

        assert_eq!(outcome_first, LoadOutcome::Discarded);
        assert_eq!(outcome_second, LoadOutcome::Loaded);
        assert_eq!(controller.snapshot().messages[0].content, "Fresh");
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_messages() {
        let (gateway, controller) = gated();
        gateway
            .queue_fetch("1")
            .send(Ok(history(
                &[("Carte", MessageRole::User), ("Voici", MessageRole::Assistant)],
                None,
            )))
            .unwrap();
        controller.open_conversation(ConversationId::from("1")).await;

        let mut events = controller.subscribe();
        gateway
            .queue_fetch("2")
            .send(Err(GuichetError::Transport("offline".into())))
            .unwrap();
        let outcome = controller.open_conversation(ConversationId::from("2")).await;

        assert_eq!(outcome, LoadOutcome::Failed);
        let snap = controller.snapshot();
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.conversation_id, Some(ConversationId::from("2")));
        assert!(!snap.pending);

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert!(seen.contains(&SessionEvent::ConversationChanged(Some(ConversationId::from("2")))));
        assert!(seen
            .iter()
            .any(|e| matches!(e, SessionEvent::LoadFailed { conversation_id, .. } if conversation_id.as_str() == "2")));
    }

    #[tokio::test]
    async fn test_reply_after_new_conversation_is_discarded() {
        let (gateway, controller) = gated();
        let tx = gateway.queue_send();

        let (outcome, _) = tokio::join!(controller.send_message("Bonjour"), async {
            gateway.called.notified().await;
            controller.start_new_conversation();
            tx.send(Ok(reply("c9", "Bonjour !", Vec::new()))).unwrap();
        });

        assert_eq!(outcome, SendOutcome::Discarded);
        let snap = controller.snapshot();
        assert!(snap.messages.is_empty());
        assert_eq!(snap.conversation_id, None);
        assert!(!snap.pending);
    }

    #[tokio::test]
    async fn test_reply_for_old_session_does_not_leak_into_opened_one() {
        let (gateway, controller) = gated();
        let send_tx = gateway.queue_send();
        let fetch_tx = gateway.queue_fetch("7");

        tokio::join!(
            controller.send_message("Question"),
            controller.open_conversation(ConversationId::from("7")),
            async {
                // Both calls are already out once this branch is first polled
                gateway.called.notified().await;
                send_tx.send(Ok(reply("c1", "Late answer", Vec::new()))).unwrap();
                tokio::task::yield_now().await;
                fetch_tx
                    .send(Ok(history(&[("Old", MessageRole::User)], None)))
                    .unwrap();
            }
        );

        let snap = controller.snapshot();
        assert_eq!(snap.conversation_id, Some(ConversationId::from("7")));
        let contents: Vec<&str> = snap.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Old"]);
    }

    #[tokio::test]
    async fn test_adoption_only_from_absent_id() {
        let (gateway, controller) = gated();
        gateway
            .queue_fetch("5")
            .send(Ok(history(&[], None)))
            .unwrap();
        controller.open_conversation(ConversationId::from("5")).await;

        gateway
            .queue_send()
            .send(Ok(reply("6", "Réponse", Vec::new())))
            .unwrap();
        controller.send_message("Question").await;

        assert_eq!(controller.conversation_id(), Some(ConversationId::from("5")));
        assert_eq!(controller.snapshot().messages.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_text_never_reaches_gateway() {
        let mut gateway = MockConversationGateway::new();
        gateway.expect_send().times(0);
        let controller = SessionController::new(Arc::new(gateway), Language::Fr);

        assert_eq!(controller.send_message("").await, SendOutcome::Ignored);
        assert_eq!(controller.send_message("   \n\t").await, SendOutcome::Ignored);
        assert!(controller.snapshot().messages.is_empty());
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn test_text_is_trimmed_before_sending() {
        let mut gateway = MockConversationGateway::new();
        gateway
            .expect_send()
            .times(1)
            .returning(|text, conversation_id, language| {
                assert_eq!(text.to_string(), "Bonjour");
                assert_eq!(conversation_id, None);
                assert_eq!(language, Some(Language::En));
                Ok(SendReply {
                    conversation_id: Some(ConversationId::from("1")),
                    reply: "Hello".into(),
                    sources: Vec::new(),
                    language: Some(Language::En),
                })
            });
        let controller = SessionController::new(Arc::new(gateway), Language::En);

        controller.send_message("  Bonjour \n").await;
        assert_eq!(controller.snapshot().messages[0].content, "Bonjour");
    }

    #[tokio::test]
    async fn test_start_new_conversation_resets_without_network() {
        let mut gateway = MockConversationGateway::new();
        gateway.expect_fetch().times(0);
        gateway.expect_list().times(0);
        gateway.expect_send().times(1).returning(|_, _, _| {
            Ok(SendReply {
                conversation_id: Some(ConversationId::from("3")),
                reply: "ok".into(),
                sources: Vec::new(),
                language: None,
            })
        });
        let controller = SessionController::new(Arc::new(gateway), Language::Am);

        controller.send_message("Azul").await;
        assert_eq!(controller.snapshot().messages.len(), 2);

        controller.start_new_conversation();
        let snap = controller.snapshot();
        assert!(snap.messages.is_empty());
        assert_eq!(snap.conversation_id, None);
        assert_eq!(snap.language, Language::Am);

        // Idempotent
        controller.start_new_conversation();
        assert_eq!(controller.snapshot(), snap);
    }

    #[tokio::test]
    async fn test_unknown_language_is_rejected() {
        let gateway = MockConversationGateway::new();
        let controller = SessionController::new(Arc::new(gateway), Language::Fr);
        let mut events = controller.subscribe();

        assert!(!controller.set_language("es"));
        assert!(!controller.set_language(""));
        assert_eq!(controller.language(), Language::Fr);
        assert!(events.try_recv().is_err());

        assert!(controller.set_language("am"));
        assert!(controller.snapshot().is_rtl());
        assert_eq!(events.try_recv().unwrap(), SessionEvent::LanguageChanged(Language::Am));
    }

    #[tokio::test]
    async fn test_list_failure_yields_empty_list() {
        let mut gateway = MockConversationGateway::new();
        gateway
            .expect_list()
            .times(1)
            .returning(|| Err(GuichetError::Unauthorized("expired".into())));
        let controller = SessionController::new(Arc::new(gateway), Language::Fr);
        let mut events = controller.subscribe();

        assert!(controller.list_conversations().await.is_empty());
        assert!(matches!(events.try_recv().unwrap(), SessionEvent::ListFailed { .. }));
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn test_identity_adoption_is_announced() {
        let (gateway, controller) = gated();
        let mut events = controller.subscribe();
        gateway
            .queue_send()
            .send(Ok(reply("c1", "Il faut...", Vec::new())))
            .unwrap();

        controller.send_message("Passeport").await;

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert!(matches!(seen[0], SessionEvent::MessageAppended(ref m) if m.role == MessageRole::User));
        assert_eq!(seen[1], SessionEvent::PendingChanged(true));
        assert_eq!(
            seen[2],
            SessionEvent::ConversationChanged(Some(ConversationId::from("c1")))
        );
        assert!(matches!(seen[3], SessionEvent::MessageAppended(ref m) if m.role == MessageRole::Assistant));
        assert_eq!(seen[4], SessionEvent::PendingChanged(false));
        assert_eq!(controller.snapshot().messages[1].id, MessageId::Local(2));
    }
}
