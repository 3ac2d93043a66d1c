pub mod arbiter;
pub mod behavior;
pub mod handle;
pub mod node;
pub mod transport;

pub use behavior::room_topic;
pub use handle::NetworkHandle;
pub use node::{MeshNode, NodeChannels};
