//! Client-side mirror of the contract's payout rule.
//!
//! The oracle's random number is reduced modulo 10_000 into a roll, and the
//! roll selects a payout tier. This mirrors the on-chain `calculate_payout`
//! exactly; tests assert agreement at every tier boundary.

use crate::units::Amount;

pub const ROLL_MODULUS: u64 = 10_000;

/// A payout multiplier expressed as a rational so the 1.5x tier stays exact
/// under fixed-point integer amounts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PayoutTier {
    pub multiplier_num: u32,
    pub multiplier_den: u32,
    pub label: &'static str,
}

impl PayoutTier {
    const fn new(multiplier_num: u32, multiplier_den: u32, label: &'static str) -> Self {
        Self {
            multiplier_num,
            multiplier_den,
            label,
        }
    }

    pub fn is_win(&self) -> bool {
        self.multiplier_num > self.multiplier_den
    }
}

pub const TOTAL_LOSS: PayoutTier = PayoutTier::new(0, 1, "total loss");
pub const REFUND: PayoutTier = PayoutTier::new(1, 1, "refund");
pub const WIN_1_5X: PayoutTier = PayoutTier::new(3, 2, "1.5x win");
pub const WIN_3X: PayoutTier = PayoutTier::new(3, 1, "3x win");
pub const WIN_10X: PayoutTier = PayoutTier::new(10, 1, "10x win");
pub const JACKPOT: PayoutTier = PayoutTier::new(50, 1, "jackpot");

/// Maps an oracle random number to its payout tier.
pub fn payout_tier(random_number: u64) -> PayoutTier {
    match random_number % ROLL_MODULUS {
        0..2_500 => TOTAL_LOSS,
        2_500..5_000 => REFUND,
        5_000..8_000 => WIN_1_5X,
        8_000..9_500 => WIN_3X,
        9_500..9_900 => WIN_10X,
        _ => JACKPOT,
    }
}

/// Computes the payout for a bet, multiplying before dividing so the 1.5x
/// tier is `amount * 3 / 2` with no rounding drift.
pub fn payout_amount(bet_amount: Amount, random_number: u64) -> Amount {
    let tier = payout_tier(random_number);
    let scaled = bet_amount.0.saturating_mul(tier.multiplier_num as u128);
    Amount(scaled / tier.multiplier_den as u128)
}
