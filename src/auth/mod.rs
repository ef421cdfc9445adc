/// Authentication collaborator - Gateway
mod client;
mod provider;

pub use client::{AuthClient, LoginOutcome, Registration, UserProfile};
pub use provider::{SessionProvider, StaticToken, TokenStore};
