use libp2p::PeerId;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::common::{ChatError, GossipMessage, InboundEvent};
use crate::network::NetworkHandle;

const ANONYMOUS_NICK: &str = "anonymous";

/// Framing every publish on the room carries. Field names match what other
/// nodes already put on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RoomEnvelope {
    message: String,
    #[serde(rename = "SenderID")]
    sender_id: String,
    sender_nick: String,
}

/// Publishing side of the chat room. Cheap to clone; shared by the HTTP
/// bridge and the terminal.
#[derive(Debug, Clone)]
pub struct ChatRoomRelay {
    network: NetworkHandle,
    self_id: String,
    nick: String,
    room: String,
}

/// Inbound side of the room. Owned by exactly one consumer.
#[derive(Debug)]
pub struct RelayInbound {
    deliveries: mpsc::UnboundedReceiver<GossipMessage>,
    local_peer_id: PeerId,
}

impl ChatRoomRelay {
    pub fn join(
        network: NetworkHandle,
        deliveries: mpsc::UnboundedReceiver<GossipMessage>,
        local_peer_id: PeerId,
        nick: impl Into<String>,
        room: impl Into<String>,
    ) -> (Self, RelayInbound) {
        let relay = Self {
            network,
            self_id: local_peer_id.to_string(),
            nick: nick.into(),
            room: room.into(),
        };
        log::info!("Joined room `{}` as {}", relay.room, relay.nick);
        let inbound = RelayInbound {
            deliveries,
            local_peer_id,
        };
        (relay, inbound)
    }

    /// Wraps `data` in the room envelope and hands it to the overlay. No retry.
    pub async fn publish(&self, data: &[u8]) -> Result<(), ChatError> {
        let envelope = RoomEnvelope {
            message: String::from_utf8_lossy(data).into_owned(),
            sender_id: self.self_id.clone(),
            sender_nick: self.nick.clone(),
        };
        let bytes = serde_json::to_vec(&envelope)
            .map_err(|err| ChatError::PublishFailed(format!("envelope encode: {err}")))?;
        self.network.publish(bytes).await
    }
}

impl RelayInbound {
    /// Next event in delivery order; `None` once the network task is gone.
    pub async fn recv(&mut self) -> Option<InboundEvent> {
        loop {
            let delivery = self.deliveries.recv().await?;
            // The envelope's SenderID is self-reported; only the signed source counts.
            if delivery.source == Some(self.local_peer_id) {
                continue;
            }
            match serde_json::from_slice::<RoomEnvelope>(&delivery.data) {
                Ok(envelope) => {
                    return Some(InboundEvent {
                        sender_nick: envelope.sender_nick,
                        data: envelope.message.into_bytes(),
                    });
                }
                Err(_) => {
                    let sender_nick = delivery
                        .source
                        .map(|id| short_id(&id))
                        .unwrap_or_else(|| ANONYMOUS_NICK.to_string());
                    return Some(InboundEvent {
                        sender_nick,
                        data: delivery.data,
                    });
                }
            }
        }
    }
}

/// Nickname used when none is configured.
pub fn default_nick(peer_id: &PeerId) -> String {
    format!("node-{}", short_id(peer_id))
}

fn short_id(peer_id: &PeerId) -> String {
    let id = peer_id.to_string();
    let start = id.len().saturating_sub(6);
    id[start..].to_string()
}
