use libp2p::{Multiaddr, PeerId};

/// A peer announced by mDNS, with every address seen in one announcement.
#[derive(Debug, Clone)]
pub struct DiscoveredPeer {
    pub id: PeerId,
    pub addresses: Vec<Multiaddr>,
}

/// Raw gossipsub delivery for the room topic.
#[derive(Debug, Clone)]
pub struct GossipMessage {
    pub source: Option<PeerId>,
    pub data: Vec<u8>,
}

/// Room-level inbound event, after the envelope is unwrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub sender_nick: String,
    pub data: Vec<u8>,
}
