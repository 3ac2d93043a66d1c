use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use libp2p::gossipsub::{self, IdentTopic};
use libp2p::mdns;
use libp2p::swarm::NetworkBehaviour;
use libp2p::{PeerId, identity};

use crate::common::ChatError;

const TOPIC_PREFIX: &str = "chat-room";

#[derive(NetworkBehaviour)]
pub struct ChatBehavior {
    pub gossipsub: gossipsub::Behaviour,
    pub mdns: mdns::tokio::Behaviour,
}

/// Topic for a room. A non-empty discovery scope isolates nodes that share a
/// LAN but not a scope token.
pub fn room_topic(room: &str, scope: &str) -> IdentTopic {
    if scope.is_empty() {
        IdentTopic::new(format!("{TOPIC_PREFIX}:{room}"))
    } else {
        IdentTopic::new(format!("{TOPIC_PREFIX}:{scope}:{room}"))
    }
}

/// Signed messages carry a per-publisher sequence number, so repeating the
/// same text yields a fresh id while forwarded copies still deduplicate.
fn message_id(message: &gossipsub::Message) -> gossipsub::MessageId {
    let mut hasher = DefaultHasher::new();
    message.source.hash(&mut hasher);
    message.sequence_number.hash(&mut hasher);
    message.data.hash(&mut hasher);
    gossipsub::MessageId::from(hasher.finish().to_string())
}

pub fn build_behavior(
    local_key: &identity::Keypair,
    local_peer_id: PeerId,
    topic: &IdentTopic,
) -> Result<ChatBehavior, ChatError> {
    let gossipsub_config = gossipsub::ConfigBuilder::default()
        .heartbeat_interval(Duration::from_secs(1))
        .validation_mode(gossipsub::ValidationMode::Strict)
        .message_id_fn(message_id)
        .build()
        .map_err(|err| ChatError::Network(format!("gossipsub config: {err}")))?;

    let mut gossipsub = gossipsub::Behaviour::new(
        gossipsub::MessageAuthenticity::Signed(local_key.clone()),
        gossipsub_config,
    )
    .map_err(|err| ChatError::Network(format!("gossipsub: {err}")))?;

    gossipsub
        .subscribe(topic)
        .map_err(|err| ChatError::Network(format!("subscribe {topic}: {err}")))?;

    let mdns = mdns::tokio::Behaviour::new(mdns::Config::default(), local_peer_id)
        .map_err(|err| ChatError::Network(format!("mdns: {err}")))?;

    Ok(ChatBehavior { gossipsub, mdns })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_without_scope() {
        assert_eq!(room_topic("chat-room", "").to_string(), "chat-room:chat-room");
    }

    #[test]
    fn scope_separates_topics() {
        let a = room_topic("relief", "sector-7");
        let b = room_topic("relief", "sector-9");
        assert_eq!(a.to_string(), "chat-room:sector-7:relief");
        assert_ne!(a.hash(), b.hash());
    }

    fn signed_message(data: &[u8], sequence_number: u64, source: PeerId) -> gossipsub::Message {
        gossipsub::Message {
            source: Some(source),
            data: data.to_vec(),
            sequence_number: Some(sequence_number),
            topic: room_topic("relief", "").hash(),
        }
    }

    #[test]
    fn repeated_text_gets_a_new_id() {
        let source = identity::Keypair::generate_ed25519().public().to_peer_id();
        let first = signed_message(b"need water", 1, source);
        let second = signed_message(b"need water", 2, source);
        assert_ne!(message_id(&first), message_id(&second));
    }

    #[test]
    fn forwarded_copy_keeps_its_id() {
        let source = identity::Keypair::generate_ed25519().public().to_peer_id();
        let original = signed_message(b"need water", 7, source);
        assert_eq!(message_id(&original), message_id(&original.clone()));
    }

    #[test]
    fn same_sequence_from_other_publishers_differs() {
        let a = identity::Keypair::generate_ed25519().public().to_peer_id();
        let b = identity::Keypair::generate_ed25519().public().to_peer_id();
        assert_ne!(
            message_id(&signed_message(b"ok", 1, a)),
            message_id(&signed_message(b"ok", 1, b))
        );
    }
}
