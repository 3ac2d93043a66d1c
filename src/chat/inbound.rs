use crate::common::ChatError;
use crate::storage::{AuditLog, MessageStore};

use super::normalizer;
use super::relay::RelayInbound;

/// Drains the room for the life of the process. Undecodable or empty messages
/// are skipped; an audit log write failure ends the loop with
/// [`ChatError::FatalIo`].
pub async fn run(
    mut inbound: RelayInbound,
    store: MessageStore,
    mut audit: AuditLog,
) -> Result<(), ChatError> {
    while let Some(event) = inbound.recv().await {
        let message = match normalizer::from_wire(&event.data, &event.sender_nick) {
            Ok(message) => message,
            Err(err) => {
                log::warn!("Dropping message from {}: {err}", event.sender_nick);
                continue;
            }
        };

        store.append(message.clone());
        let line = audit.record(&message).await?;
        log::info!("{}", line.trim_end());
        log::debug!("{} messages stored", store.len());
    }

    log::info!("Inbound stream closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use libp2p::identity;
    use tokio::sync::mpsc;

    use super::*;
    use crate::chat::ChatRoomRelay;
    use crate::common::{GossipMessage, UserType};
    use crate::network::NetworkHandle;

    #[tokio::test]
    async fn stores_and_audits_every_valid_message() {
        let path = std::env::temp_dir().join(format!(
            "disasternet-inbound-{}-{}.txt",
            std::process::id(),
            chrono::Local::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let audit = AuditLog::open(&path).await.unwrap();
        let store = MessageStore::new();

        let (command_tx, _command_rx) = mpsc::unbounded_channel();
        let (delivery_tx, delivery_rx) = mpsc::unbounded_channel();
        let local = identity::Keypair::generate_ed25519().public().to_peer_id();
        let (_relay, inbound) = ChatRoomRelay::join(
            NetworkHandle::new(command_tx),
            delivery_rx,
            local,
            "me",
            "chat-room",
        );

        let structured = normalizer::to_wire("Shelter open at the stadium", UserType::Team).unwrap();
        for data in [structured, Vec::new(), b"plain hello".to_vec()] {
            delivery_tx.send(GossipMessage { source: None, data }).unwrap();
        }
        drop(delivery_tx);

        run(inbound, store.clone(), audit).await.unwrap();

        let messages = store.snapshot();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, "NDRF Team");
        assert_eq!(messages[1].user_type, UserType::Unknown);
        assert_eq!(messages[1].sender, "anonymous");

        let audit_text = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(audit_text.lines().count(), 2);
        assert!(audit_text.contains("from NDRF Team (team): Shelter open at the stadium"));
        let _ = tokio::fs::remove_file(&path).await;
    }
}
