use tokio::sync::oneshot;

use super::error::ChatError;
use super::events::DiscoveredPeer;

pub type Reply = oneshot::Sender<Result<(), ChatError>>;

/// Requests handed to the task that owns the swarm.
#[derive(Debug)]
pub enum NetworkCommand {
    /// Publish raw bytes on the room topic.
    Publish { data: Vec<u8>, reply: Reply },
    /// Dial a discovered peer unless already connected or dialing.
    Dial { peer: DiscoveredPeer, reply: Reply },
}
