/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const STATUS_CHECK_TIMEOUT_SECS: u64 = 3;

// API routes
pub const ROUTE_SEND_MESSAGE: &str = "/api/chat/message";
pub const ROUTE_CONVERSATIONS: &str = "/api/chat/conversations";
pub const ROUTE_CONVERSATION: &str = "/api/chat/conversation";
pub const ROUTE_LOGIN: &str = "/api/auth/login";
pub const ROUTE_REGISTER: &str = "/api/auth/register";
pub const ROUTE_CURRENT_USER: &str = "/api/auth/me";
pub const ROUTE_HEALTH: &str = "/api/health";

// Session events
pub const SESSION_EVENT_CAPACITY: usize = 64;

// Files
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOCAL_CONFIG_PATH: &str = ".guichet/config.toml";
pub const TOKEN_FILE_NAME: &str = "token";
pub const ENV_PREFIX: &str = "GUICHET_";

// Console
pub const TITLE_PREVIEW_CHARS: usize = 50;
