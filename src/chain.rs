//! Chain access layer.
//!
//! The factory and per-token bet contracts are external collaborators; this
//! module defines the thin interface the coordinator consumes and the types
//! that cross it. Amounts cross as fixed-point integers (see
//! [`crate::units`]).

use crate::{
    error::ChainError,
    units::Amount,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    future::Future,
};
use tokio::sync::broadcast;

pub mod memory;

#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    /// The all-zero address doubles as the "not configured" placeholder.
    pub fn is_placeholder(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn from_hex(raw: &str) -> Result<Self, ChainError> {
        let cleaned = raw.trim().trim_start_matches("0x");
        let bytes = hex::decode(cleaned)
            .map_err(|e| ChainError::Transport(format!("invalid address '{raw}': {e}")))?;
        let bytes: [u8; 20] = bytes.try_into().map_err(|_| {
            ChainError::Transport(format!("invalid address '{raw}': wrong length"))
        })?;
        Ok(Address(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// Correlation id linking a bet submission to its eventual oracle result.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RequestId(pub [u8; 32]);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// A playable token as listed by the factory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub creator: Address,
}

/// Raw bet state as stored by the token contract. `random_number` and
/// `payout` are only meaningful once `fulfilled` is set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BetRecord {
    pub request_id: RequestId,
    pub player: Address,
    pub amount: Amount,
    pub fulfilled: bool,
    pub random_number: u64,
    pub payout: Amount,
}

/// Bet-lifecycle events emitted by a token contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BetEvent {
    Placed {
        request_id: RequestId,
        player: Address,
        amount: Amount,
    },
    Resolved {
        request_id: RequestId,
        player: Address,
        random_number: u64,
        payout: Amount,
    },
}

/// A live event subscription scoped to one token contract.
pub struct Subscription {
    pub(crate) id: u64,
    pub(crate) token: Address,
    pub(crate) events: broadcast::Receiver<BetEvent>,
}

impl Subscription {
    pub fn token(&self) -> Address {
        self.token
    }

    /// Waits for the next event. Returns `None` once the channel is closed.
    /// Lagged deliveries are skipped; the polling fallback covers the gap.
    pub async fn next(&mut self) -> Option<BetEvent> {
        loop {
            match self.events.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(token = %self.token, skipped, "event subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking drain of any already-delivered event.
    pub fn try_next(&mut self) -> Option<BetEvent> {
        loop {
            match self.events.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(token = %self.token, skipped, "event subscription lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("token", &self.token)
            .finish()
    }
}

/// Access to the token factory and per-token bet contracts. The handle is
/// bound to a signer; reads may name any player explicitly.
pub trait ChainAccess {
    /// Submits a bet and returns the oracle request id assigned on-chain.
    fn submit_bet(
        &self,
        token: &Address,
        amount: Amount,
    ) -> impl Future<Output = Result<RequestId, ChainError>>;

    fn bet_details(
        &self,
        token: &Address,
        request_id: &RequestId,
    ) -> impl Future<Output = Result<BetRecord, ChainError>>;

    /// Request ids for all of a player's bets, oldest first.
    fn player_bet_ids(
        &self,
        token: &Address,
        player: &Address,
    ) -> impl Future<Output = Result<Vec<RequestId>, ChainError>>;

    fn subscribe(
        &self,
        token: &Address,
    ) -> impl Future<Output = Result<Subscription, ChainError>>;

    fn unsubscribe(&self, subscription: Subscription);

    fn minimum_bet(
        &self,
        token: &Address,
    ) -> impl Future<Output = Result<Amount, ChainError>>;

    fn house_edge_bps(
        &self,
        token: &Address,
    ) -> impl Future<Output = Result<u16, ChainError>>;

    fn balance_of(
        &self,
        token: &Address,
        player: &Address,
    ) -> impl Future<Output = Result<Amount, ChainError>>;

    /// All tokens deployed through the factory, oldest first.
    fn list_tokens(&self) -> impl Future<Output = Result<Vec<TokenInfo>, ChainError>>;
}
