use libp2p::core::muxing::StreamMuxerBox;
use libp2p::core::transport::Boxed;
use libp2p::core::upgrade::Version;
use libp2p::{PeerId, Transport, identity, noise, tcp, yamux};

use crate::common::ChatError;

/// TCP with noise for the secure channel and yamux for multiplexing.
pub fn build_transport(
    local_key: &identity::Keypair,
) -> Result<Boxed<(PeerId, StreamMuxerBox)>, ChatError> {
    let noise_config = noise::Config::new(local_key)
        .map_err(|err| ChatError::Network(format!("noise setup: {err}")))?;

    Ok(tcp::tokio::Transport::new(tcp::Config::default().nodelay(true))
        .upgrade(Version::V1)
        .authenticate(noise_config)
        .multiplex(yamux::Config::default())
        .boxed())
}
