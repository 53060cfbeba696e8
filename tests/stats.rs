#![allow(non_snake_case)]

use chrono::Utc;
use rollhouse::{
    chain::{
        Address,
        ChainAccess,
        RequestId,
        TokenInfo,
    },
    coordinator::Bet,
    error::GameError,
    stats::GameStats,
    test_helpers::{
        HOUSE_EDGE_BPS,
        MINIMUM_BET,
        TestContext,
    },
    units::Amount,
};

fn bet(id: u8, amount: u128, outcome: Option<(u64, u128)>) -> Bet {
    Bet {
        request_id: RequestId([id; 32]),
        player: Address([0xA1; 20]),
        amount: Amount(amount),
        placed_at: Utc::now(),
        fulfilled: outcome.is_some(),
        random_number: outcome.map(|(roll, _)| roll),
        payout: outcome.map(|(_, payout)| Amount(payout)),
    }
}

#[test]
fn from_bets__win_rate_is_exactly_zero_with_no_fulfilled_bets() {
    let pending = [bet(1, 100, None), bet(2, 100, None)];
    let stats = GameStats::from_bets(&pending, MINIMUM_BET, HOUSE_EDGE_BPS);
    assert_eq!(stats.total_bets, 2);
    assert_eq!(stats.win_rate, 0.0);
    assert_eq!(stats.total_winnings, Amount::ZERO);
    assert_eq!(stats.total_losses, Amount::ZERO);
}

#[test]
fn from_bets__splits_winnings_and_losses_by_payout_versus_stake() {
    // one total loss and one 1.5x win
    let bets = [
        bet(1, 10, Some((0, 0))),
        bet(2, 10, Some((6_000, 15))),
    ];
    let stats = GameStats::from_bets(&bets, MINIMUM_BET, HOUSE_EDGE_BPS);
    assert_eq!(stats.total_bets, 2);
    assert_eq!(stats.total_winnings, Amount(15));
    assert_eq!(stats.total_losses, Amount(10));
    assert_eq!(stats.win_rate, 50.0);
}

#[test]
fn from_bets__refund_counts_as_a_loss_of_its_stake() {
    // payout == stake is not a win
    let bets = [bet(1, 40, Some((2_500, 40)))];
    let stats = GameStats::from_bets(&bets, MINIMUM_BET, HOUSE_EDGE_BPS);
    assert_eq!(stats.total_winnings, Amount::ZERO);
    assert_eq!(stats.total_losses, Amount(40));
    assert_eq!(stats.win_rate, 0.0);
}

#[test]
fn from_bets__pending_bets_count_toward_totals_only() {
    let bets = [
        bet(1, 10, Some((9_999, 500))),
        bet(2, 10, None),
    ];
    let stats = GameStats::from_bets(&bets, MINIMUM_BET, HOUSE_EDGE_BPS);
    assert_eq!(stats.total_bets, 2);
    // the pending bet is excluded from the win-rate denominator
    assert_eq!(stats.win_rate, 100.0);
    assert_eq!(stats.total_losses, Amount::ZERO);
}

#[tokio::test]
async fn initialize__reads_minimum_bet_and_house_edge_from_the_contract() {
    let ctx = TestContext::new();
    let mut coordinator = ctx.coordinator();

    coordinator.initialize(ctx.token.clone()).await.unwrap();

    let stats = coordinator.stats().unwrap();
    assert_eq!(stats.minimum_bet, MINIMUM_BET);
    assert_eq!(stats.house_edge_bps, HOUSE_EDGE_BPS);
    assert_eq!(stats, &GameStats::zeroed(MINIMUM_BET, HOUSE_EDGE_BPS));
}

#[tokio::test]
async fn initialize__loads_history_from_a_previous_session() {
    let ctx = TestContext::new();

    // given bets settled before this coordinator existed
    let previous_session = ctx.alice_chain();
    let won = previous_session
        .submit_bet(&ctx.token.address, Amount(100))
        .await
        .unwrap();
    ctx.chain.resolve(&ctx.token.address, &won, 8_000).unwrap();
    let still_pending = previous_session
        .submit_bet(&ctx.token.address, Amount(50))
        .await
        .unwrap();

    // when
    let mut coordinator = ctx.coordinator();
    coordinator.initialize(ctx.token.clone()).await.unwrap();

    // then
    let stats = coordinator.stats().unwrap();
    assert_eq!(stats.total_bets, 2);
    assert_eq!(stats.total_winnings, Amount(300));
    assert_eq!(stats.win_rate, 100.0);
    assert!(coordinator.bet(&won).unwrap().fulfilled);
    assert!(!coordinator.bet(&still_pending).unwrap().fulfilled);
}

#[tokio::test]
async fn initialize__unreachable_contract_fails_but_leaves_renderable_stats() {
    let ctx = TestContext::new();
    let mut coordinator = ctx.coordinator();
    let phantom = TokenInfo {
        address: Address([0xEE; 20]),
        symbol: "GHOST".to_string(),
        name: "Never Deployed".to_string(),
        decimals: 9,
        creator: ctx.owner(),
    };

    // when
    let result = coordinator.initialize(phantom).await;

    // then
    assert!(matches!(result, Err(GameError::Configuration(_))));
    assert_eq!(coordinator.stats(), Some(&GameStats::default()));
    assert!(coordinator.active_token().is_none());
}

#[tokio::test]
async fn stats__are_recomputed_from_scratch_after_each_resolution() {
    let ctx = TestContext::new();
    let mut coordinator = ctx.coordinator();
    coordinator.initialize(ctx.token.clone()).await.unwrap();

    let first = coordinator.place_bet(Amount(100)).await.unwrap();
    ctx.chain.resolve(&ctx.token.address, &first, 0).unwrap();
    coordinator.pump_events().await;
    let second = coordinator.place_bet(Amount(100)).await.unwrap();
    ctx.chain
        .resolve(&ctx.token.address, &second, 9_999)
        .unwrap();
    coordinator.pump_events().await;

    let stats = coordinator.stats().unwrap();
    assert_eq!(stats.total_bets, 2);
    assert_eq!(stats.total_winnings, Amount(5_000));
    assert_eq!(stats.total_losses, Amount(100));
    assert_eq!(stats.win_rate, 50.0);
    // contract parameters survive the recomputation
    assert_eq!(stats.minimum_bet, MINIMUM_BET);
    assert_eq!(stats.house_edge_bps, HOUSE_EDGE_BPS);
}
