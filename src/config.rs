use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/node.json";
pub const DEFAULT_ROOM: &str = "chat-room";
pub const DEFAULT_HTTP_PORT: u16 = 3001;
pub const DEFAULT_LOG_FILE: &str = "logs.txt";

/// Node settings. Every field may be omitted from the JSON file; command-line
/// flags override whatever the file says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// libp2p listen port, 0 for any.
    pub port: u16,
    /// Generated from the peer id when absent.
    pub nick: Option<String>,
    pub room: String,
    pub enable_http: bool,
    pub http_port: u16,
    /// Nodes only share a room when their scope tokens match.
    pub discovery_scope: String,
    pub log_file: PathBuf,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            port: 0,
            nick: None,
            room: DEFAULT_ROOM.to_string(),
            enable_http: false,
            http_port: DEFAULT_HTTP_PORT,
            discovery_scope: String::new(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> NodeConfig {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<NodeConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                NodeConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            NodeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("disasternet-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = load_config(temp_path("does-not-exist"));
        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.room, "chat-room");
        assert_eq!(config.http_port, 3001);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_path("partial");
        fs::write(&path, r#"{"room":"flood-relief","enable_http":true}"#).unwrap();

        let config = load_config(&path);
        assert_eq!(config.room, "flood-relief");
        assert!(config.enable_http);
        assert_eq!(config.log_file, PathBuf::from("logs.txt"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let path = temp_path("malformed");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_config(&path), NodeConfig::default());
        let _ = fs::remove_file(&path);
    }
}
