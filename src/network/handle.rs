use tokio::sync::{mpsc, oneshot};

use crate::common::commands::Reply;
use crate::common::{ChatError, DiscoveredPeer, NetworkCommand};

/// Cloneable front door to the swarm task.
#[derive(Debug, Clone)]
pub struct NetworkHandle {
    commands: mpsc::UnboundedSender<NetworkCommand>,
}

impl NetworkHandle {
    pub fn new(commands: mpsc::UnboundedSender<NetworkCommand>) -> Self {
        Self { commands }
    }

    pub async fn publish(&self, data: Vec<u8>) -> Result<(), ChatError> {
        self.request(|reply| NetworkCommand::Publish { data, reply })
            .await
            .map_err(|err| match err {
                ChatError::PublishFailed(_) => err,
                other => ChatError::PublishFailed(other.to_string()),
            })
    }

    pub async fn dial(&self, peer: DiscoveredPeer) -> Result<(), ChatError> {
        self.request(|reply| NetworkCommand::Dial { peer, reply })
            .await
            .map_err(|err| match err {
                ChatError::ConnectFailed(_) => err,
                other => ChatError::ConnectFailed(other.to_string()),
            })
    }

    async fn request(
        &self,
        command: impl FnOnce(Reply) -> NetworkCommand,
    ) -> Result<(), ChatError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .map_err(|_| ChatError::Network("network task is gone".into()))?;
        reply_rx
            .await
            .map_err(|_| ChatError::Network("network task dropped the request".into()))?
    }
}
