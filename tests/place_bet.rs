#![allow(non_snake_case)]

use rollhouse::{
    error::{
        ChainError,
        GameError,
    },
    test_helpers::{
        MINIMUM_BET,
        STARTING_BALANCE,
        TestContext,
    },
    units::Amount,
};

#[tokio::test]
async fn place_bet__returns_request_id_and_tracks_pending_bet() {
    let ctx = TestContext::new();
    let mut coordinator = ctx.coordinator();
    coordinator.initialize(ctx.token.clone()).await.unwrap();

    // when
    let request_id = coordinator.place_bet(Amount(100)).await.unwrap();

    // then
    let bet = coordinator.bet(&request_id).unwrap();
    assert!(!bet.fulfilled);
    assert_eq!(bet.amount, Amount(100));
    assert_eq!(bet.player, ctx.alice());
    assert_eq!(coordinator.stats().unwrap().total_bets, 1);
}

#[tokio::test]
async fn place_bet__zero_amount_fails_before_any_chain_call() {
    let ctx = TestContext::new();
    let mut coordinator = ctx.coordinator();
    coordinator.initialize(ctx.token.clone()).await.unwrap();
    let calls_before = ctx.chain.call_count();

    // when
    let result = coordinator.place_bet(Amount::ZERO).await;

    // then
    assert!(matches!(result, Err(GameError::BelowMinimumBet { .. })));
    assert_eq!(ctx.chain.call_count(), calls_before);
}

#[tokio::test]
async fn place_bet__below_minimum_fails_with_minimum_in_error() {
    let ctx = TestContext::new();
    let mut coordinator = ctx.coordinator();
    coordinator.initialize(ctx.token.clone()).await.unwrap();

    // when
    let result = coordinator.place_bet(Amount(5)).await;

    // then
    assert_eq!(
        result,
        Err(GameError::BelowMinimumBet {
            amount: Amount(5),
            minimum: MINIMUM_BET,
        })
    );
}

#[tokio::test]
async fn place_bet__exceeding_balance_fails_with_insufficient_balance() {
    let ctx = TestContext::new();
    let mut coordinator = ctx.coordinator();
    coordinator.initialize(ctx.token.clone()).await.unwrap();
    let requested = Amount(STARTING_BALANCE.0 + 1);

    // when
    let result = coordinator.place_bet(requested).await;

    // then
    assert_eq!(
        result,
        Err(GameError::InsufficientBalance {
            available: STARTING_BALANCE,
            requested,
        })
    );
}

#[tokio::test]
async fn place_bet__user_rejection_surfaces_distinctly() {
    let ctx = TestContext::new();
    let mut coordinator = ctx.coordinator();
    coordinator.initialize(ctx.token.clone()).await.unwrap();
    ctx.chain.reject_next_submission(ChainError::UserRejected);

    // when
    let result = coordinator.place_bet(Amount(100)).await;

    // then
    assert_eq!(result, Err(GameError::UserRejected));
    // nothing tracked for a bet that never made it on-chain
    assert_eq!(coordinator.stats().unwrap().total_bets, 0);
}

#[tokio::test]
async fn place_bet__contract_revert_surfaces_reason_verbatim() {
    let ctx = TestContext::new();
    let mut coordinator = ctx.coordinator();
    coordinator.initialize(ctx.token.clone()).await.unwrap();
    ctx.chain.reject_next_submission(ChainError::ContractRejected(
        "bonding curve: trading not open".to_string(),
    ));

    // when
    let result = coordinator.place_bet(Amount(100)).await;

    // then
    assert_eq!(
        result,
        Err(GameError::SubmissionRejected(
            "bonding curve: trading not open".to_string()
        ))
    );
}

#[tokio::test]
async fn place_bet__without_initialize_fails_with_configuration_error() {
    let ctx = TestContext::new();
    let mut coordinator = ctx.coordinator();

    // when
    let result = coordinator.place_bet(Amount(100)).await;

    // then
    assert!(matches!(result, Err(GameError::Configuration(_))));
}
