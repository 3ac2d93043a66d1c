//! Decides which side of a discovered pair opens the connection.
//!
//! Both nodes see each other through mDNS at roughly the same time. Only the
//! node whose identity orders after the other dials, so a pair never races two
//! connections against each other.

use libp2p::PeerId;
use tokio::sync::mpsc;

use crate::common::DiscoveredPeer;

use super::handle::NetworkHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectDecision {
    Initiate,
    Skip,
}

/// Skip when the remote orders after us (or is us); otherwise dial.
pub fn decide<I: Ord>(local: &I, remote: &I) -> ConnectDecision {
    if remote >= local {
        ConnectDecision::Skip
    } else {
        ConnectDecision::Initiate
    }
}

/// Consumes discovery records until the channel closes. Dial failures are
/// logged and never retried here; the next announcement re-triggers the
/// decision.
pub async fn run(
    local_peer_id: PeerId,
    mut discovered: mpsc::UnboundedReceiver<DiscoveredPeer>,
    network: NetworkHandle,
) {
    while let Some(peer) = discovered.recv().await {
        match decide(&local_peer_id, &peer.id) {
            ConnectDecision::Skip => {
                log::debug!(
                    "Found peer {} ordered after us; waiting for it to connect",
                    peer.id
                );
            }
            ConnectDecision::Initiate => {
                let id = peer.id;
                log::info!("Discovered new peer via mDNS: {id} {:?}", peer.addresses);
                match network.dial(peer).await {
                    Ok(()) => log::debug!("Dial to {id} initiated"),
                    Err(err) => log::warn!("{err}"),
                }
            }
        }
    }

    log::info!("Discovery stream closed; arbitrator stopping");
}
