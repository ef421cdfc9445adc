use anyhow::{bail, Context, Result};
use colored::Colorize;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    app::{get_config_dir, init_config, Config},
    auth::{AuthClient, LoginOutcome, Registration, TokenStore},
    constants::{CONFIG_FILE_NAME, ROUTE_HEALTH, STATUS_CHECK_TIMEOUT_SECS},
    i18n::Language,
    gateway::{ConversationGateway, HttpGateway},
    models::ConversationId,
    runtime::render,
};

use super::Commands;

/// Chat gateway authenticated through the token file
pub fn open_gateway(config: &Config) -> Result<Arc<HttpGateway>> {
    let store = TokenStore::new(config.token_path()?);
    let gateway = HttpGateway::new(
        &config.server.base_url,
        config.server.timeout(),
        Arc::new(store),
    )?;
    Ok(Arc::new(gateway))
}

/// Handle CLI subcommands
pub async fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing Guichet configuration...");
            init_config()?;
            println!("Configuration initialized successfully!");
            Ok(true)
        }
        Commands::Login {
            email,
            password,
            demo,
        } => {
            login(config, email.as_deref(), password.as_deref(), *demo).await?;
            Ok(true)
        }
        Commands::Register {
            email,
            username,
            password,
            first_name,
            last_name,
            preferred_language,
        } => {
            let preferred_language = match preferred_language {
                Some(code) => code.parse::<Language>()?,
                None => config.ui.language,
            };
            let registration = Registration {
                email: email.clone(),
                username: username.clone(),
                password: password.clone(),
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                preferred_language,
            };
            register(config, &registration).await?;
            Ok(true)
        }
        Commands::Logout => {
            let store = TokenStore::new(config.token_path()?);
            store.clear()?;
            println!("Signed out.");
            Ok(true)
        }
        Commands::Whoami => {
            whoami(config).await?;
            Ok(true)
        }
        Commands::Conversations => {
            list_conversations(config).await?;
            Ok(true)
        }
        Commands::Show { id } => {
            show_conversation(config, id).await?;
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Status => {
            show_status(config).await?;
            Ok(true)
        }
        Commands::Chat => Ok(false), // Continue to chat interface
    }
}

async fn login(
    config: &Config,
    email: Option<&str>,
    password: Option<&str>,
    demo: bool,
) -> Result<()> {
    let (email, password) = if demo {
        config
            .demo
            .credentials()
            .context("Demo mode is not enabled (set [demo] enabled, email and password)")?
    } else {
        match (email, password) {
            (Some(email), Some(password)) => (email, password),
            _ => bail!("Both --email and --password are required (or use --demo)"),
        }
    };

    let client = AuthClient::new(&config.server.base_url, config.server.timeout())?;
    let outcome = client.login(email, password).await?;
    store_session(config, &outcome, email)
}

async fn register(config: &Config, registration: &Registration) -> Result<()> {
    let client = AuthClient::new(&config.server.base_url, config.server.timeout())?;
    let outcome = client.register(registration).await?;
    store_session(config, &outcome, &registration.email)
}

/// Persist the token and greet the account
fn store_session(config: &Config, outcome: &LoginOutcome, email: &str) -> Result<()> {
    let store = TokenStore::new(config.token_path()?);
    store.save(&outcome.token)?;

    let name = outcome
        .user
        .as_ref()
        .map(|u| u.display_name())
        .unwrap_or_else(|| email.to_string());
    println!("Signed in as {}", name.green());
    if let Some(language) = outcome.user.as_ref().and_then(|u| u.language()) {
        println!("  Preferred language: {}", language.native_name());
    }
    Ok(())
}

async fn whoami(config: &Config) -> Result<()> {
    let store = TokenStore::new(config.token_path()?);
    let Some(token) = store.load() else {
        bail!("Not signed in. Run `guichet login` first.");
    };

    let client = AuthClient::new(&config.server.base_url, config.server.timeout())?;
    let user = client.current_user(&token).await?;

    println!("{}", user.display_name().bold());
    if let Some(email) = &user.email {
        println!("  Email: {}", email);
    }
    if let Some(language) = user.language() {
        println!("  Language: {} ({})", language.native_name(), language.code());
    }
    Ok(())
}

/// List saved conversations
async fn list_conversations(config: &Config) -> Result<()> {
    let gateway = open_gateway(config)?;
    let conversations = gateway.list().await?;

    let text = crate::i18n::strings(config.ui.language);
    println!("{}:", text.conversations);
    if conversations.is_empty() {
        println!("  {}", text.no_conversations.dimmed());
        println!("  {}", text.create_new_to_start.dimmed());
    }
    for conversation in &conversations {
        println!("{}", render::format_summary(conversation));
    }
    Ok(())
}

async fn show_conversation(config: &Config, id: &str) -> Result<()> {
    let gateway = open_gateway(config)?;
    let fetched = gateway.fetch(&ConversationId::from(id)).await?;

    let language = fetched.language.unwrap_or(config.ui.language);
    if let Some(title) = &fetched.title {
        println!("{}\n", title.bold());
    }
    println!("{}", render::format_transcript(&fetched.messages, language));
    Ok(())
}

/// Show version information
pub fn show_version() {
    println!("Guichet v{}", env!("CARGO_PKG_VERSION"));
    println!("   Multilingual assistant for public-administration procedures");
}

#[derive(Debug, PartialEq, Eq)]
enum ServerHealth {
    Healthy,
    Unhealthy(u16),
    Unreachable,
}

/// Ask the backend's health endpoint
async fn server_health(base_url: &str) -> Result<ServerHealth> {
    let client = Client::builder()
        .timeout(Duration::from_secs(STATUS_CHECK_TIMEOUT_SECS))
        .build()?;
    let url = format!("{}{}", base_url.trim_end_matches('/'), ROUTE_HEALTH);

    Ok(match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => ServerHealth::Healthy,
        Ok(response) => ServerHealth::Unhealthy(response.status().as_u16()),
        Err(_) => ServerHealth::Unreachable,
    })
}

/// Show server and configuration status
async fn show_status(config: &Config) -> Result<()> {
    println!("Guichet Status:");
    println!();

    // Check server
    match server_health(&config.server.base_url).await? {
        ServerHealth::Healthy => println!("  [OK] Server: {} (healthy)", config.server.base_url),
        ServerHealth::Unhealthy(status) => println!(
            "  [WARNING] Server: {} answered HTTP {} on {}",
            config.server.base_url, status, ROUTE_HEALTH
        ),
        ServerHealth::Unreachable => {
            println!("  [ERROR] Server: {} unreachable", config.server.base_url)
        }
    }

    // Check configuration
    let config_path = get_config_dir()?.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!("  [OK] Configuration: {}", config_path.display());
    } else {
        println!("  [WARNING] Configuration: Not found (using defaults)");
    }

    // Check session
    let store = TokenStore::new(config.token_path()?);
    if store.load().is_some() {
        println!("  [OK] Session: token at {}", store.path().display());
    } else {
        println!("  [WARNING] Session: not signed in");
    }

    println!(
        "  Language: {} ({})",
        config.ui.language.native_name(),
        config.ui.language.code()
    );
    if config.demo.credentials().is_some() {
        println!("  Demo mode: enabled");
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_health_uses_dedicated_route() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/", server.uri());
        assert_eq!(server_health(&base).await.unwrap(), ServerHealth::Healthy);
    }

    #[tokio::test]
    async fn test_health_reports_failing_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert_eq!(
            server_health(&server.uri()).await.unwrap(),
            ServerHealth::Unhealthy(503)
        );
    }

    #[tokio::test]
    async fn test_health_unreachable_server() {
        assert_eq!(
            server_health("http://127.0.0.1:9").await.unwrap(),
            ServerHealth::Unreachable
        );
    }
}
