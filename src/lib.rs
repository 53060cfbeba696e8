//! Client library for a token-launch and on-chain dice-game platform.
//!
//! The heart of the crate is [`coordinator::GameCoordinator`], which places
//! bets through the [`chain::ChainAccess`] layer and reconciles the oracle's
//! asynchronous results arriving via events or polling, exactly once.

pub mod chain;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod payout;
pub mod registry;
pub mod stats;
pub mod test_helpers;
pub mod units;
pub mod wallet;

pub use chain::{
    Address,
    ChainAccess,
    RequestId,
    TokenInfo,
};
pub use coordinator::{
    Bet,
    GameCoordinator,
};
pub use error::{
    ChainError,
    GameError,
};
pub use stats::GameStats;
pub use units::Amount;
