//! Aggregate game statistics.
//!
//! `GameStats` is a view derived on demand from the coordinator's tracked
//! bets; it is never persisted or updated incrementally, so duplicate result
//! delivery cannot double-count.

use crate::{
    coordinator::Bet,
    units::Amount,
};
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GameStats {
    /// All bets ever placed by the player, pending included.
    pub total_bets: u64,
    /// Sum of payouts over fulfilled winning bets.
    pub total_winnings: Amount,
    /// Sum of stakes over fulfilled non-winning bets (a refund counts its
    /// stake here; only `payout > amount` is a win).
    pub total_losses: Amount,
    /// Wins over fulfilled bets, as a percentage. Exactly 0 with no
    /// fulfilled bets.
    pub win_rate: f64,
    /// Read from the contract, not computed locally.
    pub minimum_bet: Amount,
    /// Read from the contract, in basis points.
    pub house_edge_bps: u16,
}

impl GameStats {
    pub fn zeroed(minimum_bet: Amount, house_edge_bps: u16) -> Self {
        Self {
            minimum_bet,
            house_edge_bps,
            ..Self::default()
        }
    }

    pub fn from_bets<'a, I>(bets: I, minimum_bet: Amount, house_edge_bps: u16) -> Self
    where
        I: IntoIterator<Item = &'a Bet>,
    {
        let mut total_bets = 0u64;
        let mut fulfilled = 0u64;
        let mut wins = 0u64;
        let mut total_winnings = Amount::ZERO;
        let mut total_losses = Amount::ZERO;
        for bet in bets {
            total_bets += 1;
            if !bet.fulfilled {
                continue;
            }
            fulfilled += 1;
            let payout = bet.payout.unwrap_or(Amount::ZERO);
            if payout > bet.amount {
                wins += 1;
                total_winnings = total_winnings.saturating_add(payout);
            } else {
                total_losses = total_losses.saturating_add(bet.amount);
            }
        }
        let win_rate = if fulfilled == 0 {
            0.0
        } else {
            wins as f64 / fulfilled as f64 * 100.0
        };
        Self {
            total_bets,
            total_winnings,
            total_losses,
            win_rate,
            minimum_bet,
            house_edge_bps,
        }
    }
}
