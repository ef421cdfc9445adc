use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_API_URL, ENV_PREFIX, HTTP_REQUEST_TIMEOUT_SECS, LOCAL_CONFIG_PATH,
    TOKEN_FILE_NAME,
};
use crate::i18n::Language;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Assistant server
    #[serde(default)]
    pub server: ServerConfig,

    /// Interface settings
    #[serde(default)]
    pub ui: UiConfig,

    /// Where the bearer token lives
    #[serde(default)]
    pub auth: AuthConfig,

    /// Guest account for demonstrations
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Assistant server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL, without the `/api` suffix
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// UI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Language a fresh session starts in
    pub language: Language,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token file; defaults to `token` in the config directory
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

/// Demo mode. Disabled unless the operator turns it on and supplies the
/// guest credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    pub enabled: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl DemoConfig {
    /// Guest credentials, only when demo mode is fully configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if !self.enabled {
            return None;
        }
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        }
    }
}

impl Config {
    /// Resolved location of the bearer token file
    pub fn token_path(&self) -> Result<PathBuf> {
        match &self.auth.token_file {
            Some(path) => Ok(path.clone()),
            None => Ok(get_config_dir()?.join(TOKEN_FILE_NAME)),
        }
    }
}

/// Load configuration from multiple sources.
///
/// Later layers win: defaults, global file, `.guichet/config.toml`, the file
/// given with `--config`, then `GUICHET_` environment variables.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut files = vec![get_config_dir()?.join(CONFIG_FILE_NAME), PathBuf::from(LOCAL_CONFIG_PATH)];

    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        files.push(path.to_path_buf());
    }

    layered(files)
        .extract()
        .context("Failed to load configuration")
}

/// Defaults, then every existing file in order, then the environment
fn layered(files: impl IntoIterator<Item = PathBuf>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for file in files {
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }
    }

    // GUICHET_SERVER__BASE_URL -> server.base_url
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "guichet") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("guichet");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join(CONFIG_FILE_NAME),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
pub fn init_config() -> Result<PathBuf> {
    let config_file = get_config_dir()?.join(CONFIG_FILE_NAME);

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
        println!("Created default configuration at: {}", config_file.display());
    } else {
        println!("Configuration already present at: {}", config_file.display());
    }

    Ok(config_file)
}
