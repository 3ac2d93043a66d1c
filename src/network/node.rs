use std::collections::HashMap;
use std::time::Duration;

use futures::StreamExt;
use libp2p::gossipsub::{self, IdentTopic};
use libp2p::swarm::dial_opts::{DialOpts, PeerCondition};
use libp2p::swarm::{Config as SwarmConfig, DialError, SwarmEvent};
use libp2p::{Multiaddr, PeerId, Swarm, identity, mdns};
use tokio::sync::mpsc;

use crate::common::{ChatError, DiscoveredPeer, GossipMessage, NetworkCommand};

use super::behavior::{ChatBehavior, ChatBehaviorEvent, build_behavior};
use super::handle::NetworkHandle;
use super::transport::build_transport;

const IDLE_CONNECTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Receiving ends and handle produced alongside a [`MeshNode`].
pub struct NodeChannels {
    pub local_peer_id: PeerId,
    pub handle: NetworkHandle,
    pub discovered: mpsc::UnboundedReceiver<DiscoveredPeer>,
    pub inbound: mpsc::UnboundedReceiver<GossipMessage>,
}

/// Owns the swarm. Everything else talks to it through channels.
pub struct MeshNode {
    swarm: Swarm<ChatBehavior>,
    topic: IdentTopic,
    command_receiver: mpsc::UnboundedReceiver<NetworkCommand>,
    discovery_sender: mpsc::UnboundedSender<DiscoveredPeer>,
    inbound_sender: mpsc::UnboundedSender<GossipMessage>,
}

impl MeshNode {
    pub fn new(port: u16, topic: IdentTopic) -> Result<(Self, NodeChannels), ChatError> {
        let local_key = identity::Keypair::generate_ed25519();
        let local_peer_id = PeerId::from(local_key.public());
        log::info!("Local PeerID: {local_peer_id}");

        let transport = build_transport(&local_key)?;
        let behavior = build_behavior(&local_key, local_peer_id, &topic)?;

        let mut swarm = Swarm::new(
            transport,
            behavior,
            local_peer_id,
            SwarmConfig::with_tokio_executor().with_idle_connection_timeout(IDLE_CONNECTION_TIMEOUT),
        );

        let listen_addr: Multiaddr = format!("/ip4/0.0.0.0/tcp/{port}")
            .parse()
            .map_err(|err| ChatError::Network(format!("listen address: {err}")))?;
        swarm
            .listen_on(listen_addr)
            .map_err(|err| ChatError::Network(format!("listen on tcp/{port}: {err}")))?;

        let (command_sender, command_receiver) = mpsc::unbounded_channel();
        let (discovery_sender, discovered) = mpsc::unbounded_channel();
        let (inbound_sender, inbound) = mpsc::unbounded_channel();

        let node = Self {
            swarm,
            topic,
            command_receiver,
            discovery_sender,
            inbound_sender,
        };
        let channels = NodeChannels {
            local_peer_id,
            handle: NetworkHandle::new(command_sender),
            discovered,
            inbound,
        };
        Ok((node, channels))
    }

    pub async fn run(mut self) {
        log::info!("Network event loop started on topic {}", self.topic);

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command),
                        None => break,
                    }
                }
                event = self.swarm.select_next_some() => {
                    self.handle_swarm_event(event);
                }
            }
        }

        log::info!("Network event loop stopped");
    }

    fn handle_command(&mut self, command: NetworkCommand) {
        match command {
            NetworkCommand::Publish { data, reply } => {
                let result = self
                    .swarm
                    .behaviour_mut()
                    .gossipsub
                    .publish(self.topic.clone(), data)
                    .map(|_| ())
                    .map_err(|err| ChatError::PublishFailed(err.to_string()));
                let _ = reply.send(result);
            }
            NetworkCommand::Dial { peer, reply } => {
                let _ = reply.send(self.dial(peer));
            }
        }
    }

    fn dial(&mut self, peer: DiscoveredPeer) -> Result<(), ChatError> {
        let opts = DialOpts::peer_id(peer.id)
            .addresses(peer.addresses)
            .condition(PeerCondition::DisconnectedAndNotDialing)
            .build();

        match self.swarm.dial(opts) {
            Ok(()) => Ok(()),
            // Already connected or a dial is in flight.
            Err(DialError::DialPeerConditionFalse(_)) => Ok(()),
            Err(err) => Err(ChatError::ConnectFailed(format!("{}: {err}", peer.id))),
        }
    }

    fn handle_swarm_event(&mut self, event: SwarmEvent<ChatBehaviorEvent>) {
        match event {
            SwarmEvent::Behaviour(ChatBehaviorEvent::Gossipsub(gossipsub::Event::Message {
                message,
                ..
            })) => {
                let delivery = GossipMessage {
                    source: message.source,
                    data: message.data,
                };
                if self.inbound_sender.send(delivery).is_err() {
                    log::debug!("Inbound consumer gone; dropping gossip message");
                }
            }
            SwarmEvent::Behaviour(ChatBehaviorEvent::Mdns(mdns::Event::Discovered(list))) => {
                for peer in group_by_peer(list) {
                    log::debug!("mDNS discovered {} at {:?}", peer.id, peer.addresses);
                    if self.discovery_sender.send(peer).is_err() {
                        log::debug!("Arbitrator gone; dropping discovery");
                    }
                }
            }
            SwarmEvent::Behaviour(ChatBehaviorEvent::Mdns(mdns::Event::Expired(list))) => {
                for (peer_id, addr) in list {
                    log::debug!("mDNS record expired for {peer_id} at {addr}");
                }
            }
            SwarmEvent::ConnectionEstablished {
                peer_id, endpoint, ..
            } => {
                log::info!(
                    "Connected to {peer_id} at {}",
                    endpoint.get_remote_address()
                );
            }
            SwarmEvent::ConnectionClosed { peer_id, cause, .. } => {
                log::info!("Connection to {peer_id} closed ({cause:?})");
            }
            SwarmEvent::OutgoingConnectionError { peer_id, error, .. } => {
                let target = peer_id.map(|id| id.to_string()).unwrap_or_default();
                log::warn!("{}", ChatError::ConnectFailed(format!("{target}: {error}")));
            }
            SwarmEvent::NewListenAddr { address, .. } => {
                log::info!("Listening on {address}");
            }
            _ => {}
        }
    }
}

/// mDNS reports one entry per address; collapse them into one record per peer
/// while keeping first-seen order.
fn group_by_peer(list: Vec<(PeerId, Multiaddr)>) -> Vec<DiscoveredPeer> {
    let mut index: HashMap<PeerId, usize> = HashMap::new();
    let mut peers: Vec<DiscoveredPeer> = Vec::new();
    for (id, addr) in list {
        match index.get(&id) {
            Some(&slot) => peers[slot].addresses.push(addr),
            None => {
                index.insert(id, peers.len());
                peers.push(DiscoveredPeer {
                    id,
                    addresses: vec![addr],
                });
            }
        }
    }
    peers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer_id() -> PeerId {
        identity::Keypair::generate_ed25519().public().to_peer_id()
    }

    #[test]
    fn groups_addresses_per_peer() {
        let a = peer_id();
        let b = peer_id();
        let a1: Multiaddr = "/ip4/192.168.1.10/tcp/4001".parse().unwrap();
        let a2: Multiaddr = "/ip4/10.0.0.4/tcp/4001".parse().unwrap();
        let b1: Multiaddr = "/ip4/192.168.1.11/tcp/4002".parse().unwrap();

        let grouped = group_by_peer(vec![(a, a1.clone()), (b, b1.clone()), (a, a2.clone())]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].id, a);
        assert_eq!(grouped[0].addresses, vec![a1, a2]);
        assert_eq!(grouped[1].id, b);
        assert_eq!(grouped[1].addresses, vec![b1]);
    }

    fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    #[tokio::test]
    async fn identical_payloads_are_all_delivered() {
        use tokio::time::{sleep, timeout};

        let topic = crate::network::room_topic("relief", "repeat-test");
        let port = free_port();
        let (receiver, receiver_channels) = MeshNode::new(port, topic.clone()).unwrap();
        let (sender, sender_channels) = MeshNode::new(0, topic).unwrap();
        tokio::spawn(receiver.run());
        tokio::spawn(sender.run());

        let NodeChannels {
            local_peer_id: receiver_id,
            mut inbound,
            ..
        } = receiver_channels;
        let handle = sender_channels.handle;
        handle
            .dial(DiscoveredPeer {
                id: receiver_id,
                addresses: vec![format!("/ip4/127.0.0.1/tcp/{port}").parse().unwrap()],
            })
            .await
            .unwrap();

        // Publishing succeeds once the sender has seen the receiver's subscription.
        timeout(Duration::from_secs(20), async {
            while handle.publish(b"warmup".to_vec()).await.is_err() {
                sleep(Duration::from_millis(200)).await;
            }
        })
        .await
        .expect("peers never joined the room");

        handle.publish(b"same".to_vec()).await.unwrap();
        sleep(Duration::from_millis(500)).await;
        handle.publish(b"same".to_vec()).await.unwrap();

        let mut received = Vec::new();
        for _ in 0..3 {
            let delivery = timeout(Duration::from_secs(10), inbound.recv())
                .await
                .expect("delivery timed out")
                .unwrap();
            assert_eq!(delivery.source, Some(sender_channels.local_peer_id));
            received.push(delivery.data);
        }
        assert_eq!(
            received,
            vec![b"warmup".to_vec(), b"same".to_vec(), b"same".to_vec()]
        );
    }
}
