//! Wallet session boundary.
//!
//! Tracks the connected account and network and invalidates in-flight
//! assumptions whenever the provider reports an account or network change.
//! Provider discovery and connect prompts are the host UI's problem.

use crate::{
    chain::Address,
    error::GameError,
};

pub const MAINNET_CHAIN_ID: u64 = 56;
pub const TESTNET_CHAIN_ID: u64 = 97;

pub fn is_supported_chain(chain_id: u64) -> bool {
    chain_id == MAINNET_CHAIN_ID || chain_id == TESTNET_CHAIN_ID
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalletSession {
    account: Option<Address>,
    chain_id: Option<u64>,
    epoch: u64,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, account: Address, chain_id: u64) {
        tracing::info!(%account, chain_id, "wallet connected");
        self.account = Some(account);
        self.chain_id = Some(chain_id);
        self.epoch += 1;
    }

    pub fn disconnect(&mut self) {
        self.account = None;
        self.chain_id = None;
        self.epoch += 1;
    }

    /// Provider notification: the selected accounts changed. Always bumps
    /// the epoch; anything keyed to the previous address is stale.
    pub fn on_accounts_changed(&mut self, accounts: &[Address]) {
        self.account = accounts.first().copied();
        self.epoch += 1;
        tracing::info!(account = ?self.account, "wallet accounts changed");
    }

    /// Provider notification: the network changed.
    pub fn on_chain_changed(&mut self, chain_id: u64) {
        self.chain_id = Some(chain_id);
        self.epoch += 1;
        if !is_supported_chain(chain_id) {
            tracing::warn!(chain_id, "connected to an unsupported network");
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    /// Monotonic counter bumped on every account/network change. Holders of
    /// session-derived state compare epochs to detect staleness.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn require_account(&self) -> Result<Address, GameError> {
        self.account.ok_or_else(|| {
            GameError::Configuration("no wallet connected".to_string())
        })
    }

    pub fn require_supported_network(&self) -> Result<u64, GameError> {
        match self.chain_id {
            Some(chain_id) if is_supported_chain(chain_id) => Ok(chain_id),
            Some(chain_id) => Err(GameError::Configuration(format!(
                "network {chain_id} is unsupported; switch to {MAINNET_CHAIN_ID} or {TESTNET_CHAIN_ID}"
            ))),
            None => Err(GameError::Configuration(
                "no network selected; connect a wallet first".to_string(),
            )),
        }
    }
}
