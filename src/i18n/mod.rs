// Gateway module for i18n - follows the Train Station Pattern
// All external access must go through this gateway

mod language;
mod strings;

pub use language::Language;
pub use strings::{strings, Strings};
