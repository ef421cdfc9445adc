// Gateway module for the conversation session - follows the Train Station Pattern

mod controller;
mod events;
mod state;

pub use controller::{LoadOutcome, SendOutcome, SessionController};
pub use events::SessionEvent;
pub use state::SessionSnapshot;
