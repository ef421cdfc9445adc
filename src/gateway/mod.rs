// Gateway module for the chat API - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod http;
mod traits;
mod wire;

// Public re-exports - the ONLY way to access gateway functionality
pub use http::HttpGateway;
pub use traits::ConversationGateway;

pub(crate) use http::check_status;

#[cfg(test)]
pub use traits::MockConversationGateway;
