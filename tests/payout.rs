#![allow(non_snake_case)]

use proptest::prelude::*;
use rollhouse::{
    chain::memory::calculate_payout,
    payout::{
        self,
        JACKPOT,
        PayoutTier,
        REFUND,
        TOTAL_LOSS,
        WIN_1_5X,
        WIN_3X,
        WIN_10X,
        payout_amount,
        payout_tier,
    },
    test_helpers::TestContext,
    units::Amount,
};

const TIER_BOUNDARIES: &[(u64, PayoutTier)] = &[
    (0, TOTAL_LOSS),
    (2_499, TOTAL_LOSS),
    (2_500, REFUND),
    (4_999, REFUND),
    (5_000, WIN_1_5X),
    (7_999, WIN_1_5X),
    (8_000, WIN_3X),
    (9_499, WIN_3X),
    (9_500, WIN_10X),
    (9_899, WIN_10X),
    (9_900, JACKPOT),
    (9_999, JACKPOT),
];

#[test]
fn payout_tier__boundary_rolls_select_the_right_tier() {
    for &(roll, expected) in TIER_BOUNDARIES {
        assert_eq!(payout_tier(roll), expected, "roll {roll}");
    }
}

#[test]
fn payout_tier__random_number_is_reduced_modulo_10_000() {
    assert_eq!(payout_tier(payout::ROLL_MODULUS), TOTAL_LOSS);
    assert_eq!(payout_tier(123_459_999), JACKPOT);
    assert_eq!(payout_tier(10_000 + 5_000), WIN_1_5X);
}

#[test]
fn payout_amount__multiplies_before_dividing() {
    // 1.5x of 10 is exactly 15, not 10 * 1 from a truncated multiplier
    assert_eq!(payout_amount(Amount(10), 6_000), Amount(15));
    // odd amounts truncate on the final division only
    assert_eq!(payout_amount(Amount(5), 6_000), Amount(7));
    assert_eq!(payout_amount(Amount(100), 9_999), Amount(5_000));
    assert_eq!(payout_amount(Amount(100), 0), Amount::ZERO);
    assert_eq!(payout_amount(Amount(100), 2_500), Amount(100));
}

proptest! {
    // the client-side mirror must agree with the contract rule everywhere
    #[test]
    fn payout_amount__agrees_with_the_contract_rule(
        amount in any::<u128>(),
        random_number in any::<u64>(),
    ) {
        prop_assert_eq!(
            payout_amount(Amount(amount), random_number),
            calculate_payout(Amount(amount), random_number),
        );
    }

    #[test]
    fn payout_tier__win_flag_matches_the_payout_comparison(
        amount in 2u128..=u128::MAX / 50,
        random_number in any::<u64>(),
    ) {
        let tier = payout_tier(random_number);
        let payout = payout_amount(Amount(amount), random_number);
        prop_assert_eq!(tier.is_win(), payout > Amount(amount));
    }
}

#[tokio::test]
async fn payout__settled_bets_match_the_contract_at_every_boundary() {
    let ctx = TestContext::new();
    let mut coordinator = ctx.coordinator();
    coordinator.initialize(ctx.token.clone()).await.unwrap();

    for &(roll, _) in TIER_BOUNDARIES {
        let request_id = coordinator.place_bet(Amount(100)).await.unwrap();
        ctx.chain
            .resolve(&ctx.token.address, &request_id, roll)
            .unwrap();
        coordinator.pump_events().await;
        let bet = coordinator.bet(&request_id).unwrap();
        assert_eq!(
            bet.payout,
            Some(calculate_payout(Amount(100), roll)),
            "roll {roll}"
        );
        assert_eq!(bet.tier(), Some(payout_tier(roll)), "roll {roll}");
    }
}
