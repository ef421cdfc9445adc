use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::constants::{ROUTE_CURRENT_USER, ROUTE_LOGIN, ROUTE_REGISTER};
use crate::gateway::check_status;
use crate::i18n::Language;
use crate::utils::{GuichetError, Result};

/// Account as the server describes it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub preferred_language: Option<String>,
}

impl UserProfile {
    /// Preferred interface language, when the server stored a supported one
    pub fn language(&self) -> Option<Language> {
        self.preferred_language.as_deref().and_then(Language::from_code)
    }

    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self
                .username
                .clone()
                .or_else(|| self.email.clone())
                .unwrap_or_else(|| "?".to_string()),
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: Option<UserProfile>,
}

/// New account details
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub preferred_language: Language,
}

/// Login and registration answer with the same shape
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
}

impl LoginResponse {
    fn into_outcome(self) -> Result<LoginOutcome> {
        let token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GuichetError::Decode("response has no access_token".to_string()))?;
        Ok(LoginOutcome {
            token,
            user: self.user,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CurrentUserResponse {
    user: UserProfile,
}

/// Credentials endpoint client. Token persistence is the caller's business
/// (see `TokenStore`).
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GuichetError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchange email and password for a bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let url = format!("{}{}", self.base_url, ROUTE_LOGIN);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: LoginResponse = check_status(response).await?.json().await?;

        let outcome = body.into_outcome()?;
        info!("Signed in as {}", email);
        Ok(outcome)
    }

    /// Create an account; the server signs it in right away
    pub async fn register(&self, registration: &Registration) -> Result<LoginOutcome> {
        let url = format!("{}{}", self.base_url, ROUTE_REGISTER);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(registration).send().await?;
        let body: LoginResponse = check_status(response).await?.json().await?;

        let outcome = body.into_outcome()?;
        info!("Registered {}", registration.email);
        Ok(outcome)
    }

    /// Profile behind `token`; fails with `Unauthorized` when it expired
    pub async fn current_user(&self, token: &str) -> Result<UserProfile> {
        let url = format!("{}{}", self.base_url, ROUTE_CURRENT_USER);
        debug!("GET {}", url);

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let body: CurrentUserResponse = check_status(response).await?.json().await?;
        Ok(body.user)
    }
}
