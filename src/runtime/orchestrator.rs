use anyhow::{bail, Result};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::{
    app::Config,
    auth::{AuthClient, TokenStore},
    cli::{handle_command, open_gateway, Cli},
    i18n::{strings, Language},
    models::{ConversationId, ConversationSummary, MessageRole},
    session::{SessionController, SessionEvent},
    utils::{log_status, GuichetError},
};

use super::render;

/// A line typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Send(String),
    New,
    Open(String),
    Lang(String),
    List,
    Help,
    Quit,
    Unknown(String),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Send(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match (name, arg) {
            ("new", _) => Self::New,
            ("open", id) if !id.is_empty() => Self::Open(id.to_string()),
            ("lang", code) if !code.is_empty() => Self::Lang(code.to_string()),
            ("list", _) => Self::List,
            ("help", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

const HELP: &str = "\
  /new          start a new conversation
  /open <id>    reopen a saved conversation
  /lang <code>  switch language (fr, ar, am, en)
  /list         list saved conversations
  /help         show this help
  /quit         leave";

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args and loaded configuration
    pub fn new(cli: Cli, config: Config) -> Self {
        Self { cli, config }
    }

    /// Run the orchestrator
    pub async fn run(self) -> Result<()> {
        // Handle subcommands
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.config).await? {
                return Ok(()); // Command handled, exit
            }
            // Continue to chat for Commands::Chat
        }

        let language = self.startup_language().await?;
        let controller = SessionController::new(open_gateway(&self.config)?, language);
        let mut events = controller.subscribe();

        println!("{}", strings(language).app_title.bold());

        match &self.cli.conversation {
            Some(id) => {
                controller.open_conversation(ConversationId::from(id.as_str())).await;
                drain_events(&controller, &mut events);
            }
            None => println!("{}\n", render::welcome(language)),
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print_prompt(controller.language());
            let Some(line) = lines.next_line().await? else {
                break;
            };

            match ConsoleCommand::parse(&line) {
                ConsoleCommand::Send(text) if text.is_empty() => continue,
                ConsoleCommand::Send(text) => {
                    println!("{}", render::thinking_line(controller.language()));
                    controller.send_message(&text).await;
                }
                ConsoleCommand::New => {
                    controller.start_new_conversation();
                }
                ConsoleCommand::Open(id) => {
                    println!("{}", strings(controller.language()).loading.dimmed());
                    controller.open_conversation(ConversationId::from(id.as_str())).await;
                }
                ConsoleCommand::Lang(code) => {
                    if !controller.set_language(&code) {
                        let supported: Vec<&str> = Language::ALL.iter().map(|l| l.code()).collect();
                        println!("Unsupported language '{}' ({})", code, supported.join(", "));
                    }
                }
                ConsoleCommand::List => {
                    let conversations = controller.list_conversations().await;
                    print_conversations(&conversations, controller.language());
                }
                ConsoleCommand::Help => println!("{}", HELP),
                ConsoleCommand::Quit => break,
                ConsoleCommand::Unknown(line) => {
                    println!("Unknown command: {} (try /help)", line);
                }
            }

            drain_events(&controller, &mut events);
        }

        Ok(())
    }

    /// `--language`, else the account's preferred language, else the config
    async fn startup_language(&self) -> Result<Language> {
        let store = TokenStore::new(self.config.token_path()?);
        let Some(token) = store.load() else {
            bail!("Not signed in. Run `guichet login` first.");
        };

        if let Some(code) = &self.cli.language {
            return Ok(code.parse::<Language>()?);
        }

        let auth = AuthClient::new(&self.config.server.base_url, self.config.server.timeout())?;
        match auth.current_user(&token).await {
            Ok(user) => {
                log_status(format!("Signed in as {}", user.display_name()));
                Ok(user.language().unwrap_or(self.config.ui.language))
            }
            Err(GuichetError::Unauthorized(_)) => {
                bail!("Session expired. Run `guichet login` again.")
            }
            Err(e) => {
                tracing::warn!("Could not fetch profile: {}", e);
                Ok(self.config.ui.language)
            }
        }
    }
}

fn print_prompt(language: Language) {
    use std::io::Write;

    print!("{} ", format!("{} >", strings(language).you).blue());
    let _ = std::io::stdout().flush();
}

fn print_conversations(conversations: &[ConversationSummary], language: Language) {
    let text = strings(language);
    println!("{}:", text.conversations.bold());
    if conversations.is_empty() {
        println!("  {}", text.no_conversations.dimmed());
    }
    for conversation in conversations {
        println!("{}", render::format_summary(conversation));
    }
}

/// Print whatever changed since the last drain
fn drain_events(controller: &SessionController, events: &mut broadcast::Receiver<SessionEvent>) {
    loop {
        let language = controller.language();
        match events.try_recv() {
            // Typed by the user, already on screen
            Ok(SessionEvent::MessageAppended(message)) if message.role == MessageRole::User => {}
            Ok(SessionEvent::MessageAppended(message)) => {
                println!("{}\n", render::format_message(&message, language));
            }
            Ok(SessionEvent::MessagesReplaced { .. }) => {
                let snapshot = controller.snapshot();
                println!("{}\n", render::format_transcript(&snapshot.messages, snapshot.language));
            }
            Ok(SessionEvent::ConversationChanged(Some(id))) => {
                println!("{}", format!("# {}", id).dimmed());
            }
            Ok(SessionEvent::ConversationChanged(None)) => {
                println!("{}", strings(language).new_conversation.dimmed());
            }
            Ok(SessionEvent::LanguageChanged(language)) => {
                println!("{}", language.native_name().bold());
            }
            Ok(SessionEvent::LoadFailed { .. }) => {
                println!("{}", strings(language).load_failed.red());
            }
            Ok(SessionEvent::ListFailed { reason }) => {
                println!("{}", reason.red());
            }
            Ok(SessionEvent::PendingChanged(_)) => {}
            Err(TryRecvError::Lagged(_)) => {
                let snapshot = controller.snapshot();
                println!("{}\n", render::format_transcript(&snapshot.messages, snapshot.language));
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
