pub mod app;
pub mod auth;
pub mod cli;
pub mod constants;
pub mod gateway;
pub mod i18n;
pub mod models;
pub mod runtime;
pub mod session;
pub mod utils;

pub use app::{load_config, Config};
pub use gateway::{ConversationGateway, HttpGateway};
pub use i18n::Language;
pub use session::{SessionController, SessionEvent, SessionSnapshot};
pub use utils::GuichetError;
