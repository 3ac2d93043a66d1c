use std::io::BufRead;

use libp2p::PeerId;
use tokio::sync::mpsc;

use crate::chat::ChatRoomRelay;
use crate::common::ChatError;

/// Stdin lines, read on a dedicated OS thread.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (line_tx, line_rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if line_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        log::error!("Failed to read terminal input: {err}");
                        break;
                    }
                }
            }
        });
    if let Err(err) = spawned {
        log::error!("Failed to start terminal reader: {err}");
    }
    line_rx
}

/// Publishes each typed line as plain text. Returns when input ends; the node
/// keeps running without a terminal.
pub async fn run(
    relay: ChatRoomRelay,
    local_peer_id: PeerId,
    mut lines: mpsc::UnboundedReceiver<String>,
) {
    log::info!("Sending test message...");
    if let Err(err) = relay.publish(format!("Hello from {local_peer_id}").as_bytes()).await {
        log::warn!("Error publishing greeting: {err}");
    }

    while let Some(line) = lines.recv().await {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        if let Err(err) = publish_line(&relay, line).await {
            log::error!("Giving up on message: {err}");
        }
    }

    log::info!("Terminal input closed");
}

// TODO: distinguish a partitioned overlay (InsufficientPeers) from a transient
// failure before retrying.
/// One retry, no backoff.
pub async fn publish_line(relay: &ChatRoomRelay, line: &str) -> Result<(), ChatError> {
    match relay.publish(line.as_bytes()).await {
        Ok(()) => Ok(()),
        Err(err) => {
            log::warn!("Sending message failed ({err}), trying again...");
            relay.publish(line.as_bytes()).await
        }
    }
}
