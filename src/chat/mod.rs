pub mod inbound;
pub mod normalizer;
pub mod relay;

pub use relay::{ChatRoomRelay, default_nick};
