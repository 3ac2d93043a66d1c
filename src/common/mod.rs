pub mod commands;
pub mod error;
pub mod events;
pub mod types;

pub use commands::NetworkCommand;
pub use error::ChatError;
pub use events::{DiscoveredPeer, GossipMessage, InboundEvent};
pub use types::{DisplayMessage, IncomingPost, UserType, WirePayload};
