use anyhow::{Context, Result};
use lacemesh_protocol::{
    random_peer_short_id, random_peer_uid, PeerName, PeerShortId, PeerUid, PEER_NAME_SIZE,
};
use lacemesh_routing::Peer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub node: NodeConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(skip)]
    config_file_path: PathBuf,
}

/// Identity of the local peer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: PeerName,
    pub nickname: String,
    pub uid: PeerUid,
    pub short_id: PeerShortId,
}

impl NodeConfig {
    /// Mint a fresh identity
    ///
    /// The name is random with the locally administered bit set, so it cannot
    /// clash with a hardware-derived name.
    pub fn generate(nickname: impl Into<String>) -> Self {
        let mut bytes: [u8; PEER_NAME_SIZE] = rand::random();
        bytes[0] = (bytes[0] & 0xfe) | 0x02;

        NodeConfig {
            name: PeerName::from_bin(&bytes),
            nickname: nickname.into(),
            uid: random_peer_uid(),
            short_id: random_peer_short_id(),
        }
    }

    /// Local peer record for this identity
    pub fn to_peer(&self, version: u64) -> Peer {
        Peer::new(self.name, self.nickname.clone(), self.uid, version, self.short_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Only route over established connections confirmed by both ends
    #[serde(default = "default_require_established_symmetric")]
    pub require_established_symmetric: bool,
}

fn default_require_established_symmetric() -> bool {
    true
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            require_established_symmetric: default_require_established_symmetric(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(Self::default_config_path);

        if !config_path.exists() {
            anyhow::bail!(
                "Configuration file not found: {}\nRun `lacenode init` to create a new configuration",
                config_path.display()
            );
        }

        let contents =
            fs::read_to_string(&config_path).context("Failed to read configuration file")?;

        let mut config: Config =
            serde_yaml::from_str(&contents).context("Failed to parse configuration file")?;

        config.config_file_path = config_path;

        Ok(config)
    }

    /// Load configuration if the file exists
    ///
    /// A missing file yields `None`; a file that exists but cannot be read or
    /// parsed is still an error.
    pub fn load_if_exists(config_path: Option<PathBuf>) -> Result<Option<Self>> {
        let config_path = config_path.unwrap_or_else(Self::default_config_path);
        if !config_path.exists() {
            return Ok(None);
        }
        Self::load(Some(config_path)).map(Some)
    }

    /// Create and save a new default configuration with a fresh identity
    pub fn create_default(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(Self::default_config_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let node = NodeConfig::generate("");
        let config = Config {
            node: NodeConfig {
                nickname: format!("lace-{}", hex_suffix(&node.name)),
                ..node
            },
            routing: RoutingConfig::default(),
            logging: LoggingConfig::default(),
            config_file_path: config_path,
        };

        config.save()?;

        Ok(config)
    }

    /// Write this configuration back to its file
    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(&self.config_file_path, yaml).with_context(|| {
            format!(
                "Failed to write configuration file {}",
                self.config_file_path.display()
            )
        })?;
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_file_path
    }

    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lacenode")
            .join("config.yaml")
    }
}

/// Last three octets of a name, without separators
fn hex_suffix(name: &PeerName) -> String {
    name.to_bin()[PEER_NAME_SIZE - 3..]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_identity() {
        let node = NodeConfig::generate("test");

        assert_eq!(node.name.to_bin()[0] & 0x03, 0x02);
        assert!(!node.uid.is_placeholder());
        assert!(node.short_id.as_u16() <= PeerShortId::MAX);
        assert_eq!(node.nickname, "test");
    }

    #[test]
    fn test_to_peer() {
        let node = NodeConfig::generate("local");
        let peer = node.to_peer(3);

        assert_eq!(peer.name(), node.name);
        assert_eq!(peer.uid(), node.uid);
        assert_eq!(peer.short_id(), Some(node.short_id));
        assert_eq!(peer.version(), 3);
    }

    #[test]
    fn test_routing_defaults_when_sections_missing() {
        let yaml = "node:\n  name: \"02:00:00:00:00:01\"\n  nickname: one\n  uid: 17\n  short_id: 5\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert!(config.routing.require_established_symmetric);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.node.uid.as_u64(), 17);
    }

    #[test]
    fn test_hex_suffix() {
        let name: PeerName = "02:42:ac:11:00:02".parse().unwrap();
        assert_eq!(hex_suffix(&name), "110002");
    }
}
