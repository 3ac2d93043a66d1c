mod bridge;
mod chat;
mod common;
mod config;
mod network;
mod storage;
mod terminal;

use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use dotenvy::dotenv;
use tokio::signal;

use bridge::BridgeState;
use chat::ChatRoomRelay;
use config::NodeConfig;
use network::{MeshNode, NodeChannels, arbiter};
use storage::{AuditLog, MessageStore};

#[derive(Parser)]
#[command(
    name = "disasternet",
    version,
    about = "Serverless mesh chat node for disaster-response coordination"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// libp2p listen port (any free port when unset)
    #[arg(long)]
    port: Option<u16>,
    /// Nickname shown to peers; generated when empty
    #[arg(long)]
    nick: Option<String>,
    /// Name of the chat room to join
    #[arg(long)]
    room: Option<String>,
    /// Run the local HTTP bridge
    #[arg(long)]
    enable_http: bool,
    #[arg(long, value_name = "PORT")]
    http_port: Option<u16>,
    /// Discovery scope; only nodes with the same token share a room
    #[arg(long = "same-string", value_name = "TOKEN")]
    same_string: Option<String>,
    /// Audit log of received messages
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn apply(self, mut config: NodeConfig) -> NodeConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(nick) = self.nick {
            config.nick = Some(nick);
        }
        if let Some(room) = self.room {
            config.room = room;
        }
        if self.enable_http {
            config.enable_http = true;
        }
        if let Some(http_port) = self.http_port {
            config.http_port = http_port;
        }
        if let Some(scope) = self.same_string {
            config.discovery_scope = scope;
        }
        if let Some(log_file) = self.log_file {
            config.log_file = log_file;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config_path = cli.config.clone();
    let settings = cli.apply(config::load_config(&config_path));

    // Without an audit trail the node does not start.
    let audit = AuditLog::open(&settings.log_file).await?;
    log::info!("Recording received messages to {}", audit.path().display());

    let store = MessageStore::new();

    let topic = network::room_topic(&settings.room, &settings.discovery_scope);
    let (node, channels) = MeshNode::new(settings.port, topic)?;
    let NodeChannels {
        local_peer_id,
        handle,
        discovered,
        inbound,
    } = channels;
    tokio::spawn(node.run());

    let nick = settings
        .nick
        .clone()
        .filter(|nick| !nick.is_empty())
        .unwrap_or_else(|| chat::default_nick(&local_peer_id));
    let (relay, relay_inbound) = ChatRoomRelay::join(
        handle.clone(),
        inbound,
        local_peer_id,
        nick,
        settings.room.clone(),
    );

    tokio::spawn(arbiter::run(local_peer_id, discovered, handle));

    let http_bridge = settings.enable_http.then(|| {
        let addr = SocketAddr::from(([0, 0, 0, 0], settings.http_port));
        let state = BridgeState {
            store: store.clone(),
            relay: relay.clone(),
        };
        (addr, state)
    });
    let http = async move {
        match http_bridge {
            Some((addr, state)) => bridge::serve(addr, state).await,
            None => std::future::pending().await,
        }
    };

    tokio::spawn(terminal::run(
        relay,
        local_peer_id,
        terminal::spawn_stdin_reader(),
    ));

    let log_view = store.clone();
    tokio::select! {
        result = chat::inbound::run(relay_inbound, store, audit) => {
            if let Err(err) = result {
                log::error!("Inbound loop stopped: {err}");
                return Err(err.into());
            }
        }
        result = http => {
            if let Err(err) = result {
                log::error!("HTTP bridge stopped: {err}");
                return Err(err.into());
            }
        }
        _ = signal::ctrl_c() => {
            log::info!("Received shutdown signal, stopping node...");
        }
    }

    if !log_view.is_empty() {
        log::info!("Discarding {} in-memory messages", log_view.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let file = NodeConfig {
            room: "from-file".to_string(),
            http_port: 8080,
            ..NodeConfig::default()
        };
        let cli = Cli::parse_from([
            "disasternet",
            "--room",
            "flood-relief",
            "--enable-http",
            "--same-string",
            "sector-7",
        ]);

        let config = cli.apply(file);
        assert_eq!(config.room, "flood-relief");
        assert!(config.enable_http);
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.discovery_scope, "sector-7");
        assert_eq!(config.nick, None);
    }

    #[test]
    fn defaults_without_flags() {
        let cli = Cli::parse_from(["disasternet"]);
        assert_eq!(cli.config, config::DEFAULT_CONFIG_PATH);
        assert_eq!(cli.apply(NodeConfig::default()), NodeConfig::default());
    }
}
