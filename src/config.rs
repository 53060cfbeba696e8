//! Configuration surface.
//!
//! The playable token address and the oracle coordinator key are supplied
//! externally. Unset or placeholder values fail fast with a configuration
//! error instead of letting a call go out against an invalid address.

use crate::{
    chain::Address,
    error::GameError,
    wallet,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::Path;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => wallet::MAINNET_CHAIN_ID,
            Network::Testnet => wallet::TESTNET_CHAIN_ID,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Hex address of the playable token contract.
    pub playable_token: Option<String>,
    /// Hex key hash identifying the oracle coordinator.
    pub oracle_key: Option<String>,
    #[serde(default)]
    pub network: Network,
}

fn is_placeholder(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty()
        || trimmed.starts_with('<')
        || trimmed.to_uppercase().contains("YOUR_")
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, GameError> {
        serde_json::from_str(raw)
            .map_err(|e| GameError::Configuration(format!("invalid config: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, GameError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GameError::Configuration(format!(
                "cannot read config {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }

    /// The configured playable token, or a configuration error with a
    /// remediation hint.
    pub fn playable_token(&self) -> Result<Address, GameError> {
        let raw = self.playable_token.as_deref().unwrap_or("");
        if is_placeholder(raw) {
            return Err(GameError::Configuration(
                "playable token address is not configured; set `playable_token` in the config file"
                    .to_string(),
            ));
        }
        let address = Address::from_hex(raw).map_err(|e| {
            GameError::Configuration(format!("invalid `playable_token`: {e}"))
        })?;
        if address.is_placeholder() {
            return Err(GameError::Configuration(
                "`playable_token` is the zero address; deploy or configure a real token"
                    .to_string(),
            ));
        }
        Ok(address)
    }

    pub fn oracle_key(&self) -> Result<String, GameError> {
        let raw = self.oracle_key.as_deref().unwrap_or("");
        if is_placeholder(raw) {
            return Err(GameError::Configuration(
                "oracle key is not configured; set `oracle_key` in the config file"
                    .to_string(),
            ));
        }
        Ok(raw.trim().to_string())
    }
}
