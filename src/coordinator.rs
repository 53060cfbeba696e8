//! Bet lifecycle coordinator.
//!
//! Owns the in-flight and resolved bets for one playable token. Results can
//! arrive through two channels racing in wall-clock time: the contract event
//! subscription, and the polling fallback inside [`GameCoordinator::await_result`].
//! Both funnel into [`GameCoordinator::reconcile`], whose idempotency guard
//! (the `fulfilled` flag) is the whole correctness story; there is no lock
//! because everything runs on one cooperative task and each reconciliation
//! completes between suspension points.

use crate::{
    chain::{
        Address,
        BetEvent,
        BetRecord,
        ChainAccess,
        RequestId,
        Subscription,
        TokenInfo,
    },
    error::{
        ChainError,
        GameError,
    },
    payout::{
        PayoutTier,
        payout_tier,
    },
    stats::GameStats,
    units::Amount,
};
use chrono::{
    DateTime,
    Utc,
};
use std::{
    collections::HashMap,
    pin::pin,
    time::Duration,
};
use tokio::time::{
    self,
    Instant,
};

/// How often the polling fallback re-reads a pending bet.
pub const POLL_INTERVAL: Duration = Duration::from_millis(3_000);
/// Default deadline for [`GameCoordinator::await_result`].
pub const RESOLUTION_TIMEOUT: Duration = Duration::from_millis(120_000);

/// One wagering attempt, keyed by its oracle request id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bet {
    pub request_id: RequestId,
    pub player: Address,
    pub amount: Amount,
    pub placed_at: DateTime<Utc>,
    pub fulfilled: bool,
    pub random_number: Option<u64>,
    pub payout: Option<Amount>,
}

impl Bet {
    fn pending(request_id: RequestId, player: Address, amount: Amount) -> Self {
        Self {
            request_id,
            player,
            amount,
            placed_at: Utc::now(),
            fulfilled: false,
            random_number: None,
            payout: None,
        }
    }

    fn from_record(record: &BetRecord) -> Self {
        Self {
            request_id: record.request_id,
            player: record.player,
            amount: record.amount,
            placed_at: Utc::now(),
            fulfilled: record.fulfilled,
            random_number: record.fulfilled.then_some(record.random_number),
            payout: record.fulfilled.then_some(record.payout),
        }
    }

    pub fn won(&self) -> bool {
        matches!(self.payout, Some(payout) if payout > self.amount)
    }

    pub fn tier(&self) -> Option<PayoutTier> {
        self.random_number.map(payout_tier)
    }
}

enum Wake {
    Deadline,
    Event(BetEvent),
    Poll,
}

/// One coordinator per (player, token) session. Switching tokens requires
/// `cleanup()` then `initialize(..)`; instances never share mutable state.
pub struct GameCoordinator<C: ChainAccess> {
    chain: C,
    player: Address,
    active_token: Option<TokenInfo>,
    tracked_bets: HashMap<RequestId, Bet>,
    stats: Option<GameStats>,
    subscription: Option<Subscription>,
    poll_interval: Duration,
}

impl<C: ChainAccess> GameCoordinator<C> {
    pub fn new(chain: C, player: Address) -> Self {
        Self {
            chain,
            player,
            active_token: None,
            tracked_bets: HashMap::new(),
            stats: None,
            subscription: None,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn player(&self) -> Address {
        self.player
    }

    pub fn active_token(&self) -> Option<&TokenInfo> {
        self.active_token.as_ref()
    }

    pub fn stats(&self) -> Option<&GameStats> {
        self.stats.as_ref()
    }

    pub fn bet(&self, request_id: &RequestId) -> Option<&Bet> {
        self.tracked_bets.get(request_id)
    }

    /// Tracked bets, newest first.
    pub fn bets(&self) -> Vec<&Bet> {
        let mut bets: Vec<&Bet> = self.tracked_bets.values().collect();
        bets.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        bets
    }

    /// Resets tracked state, loads the player's bet history for `token`,
    /// computes initial stats, and opens the event subscription.
    ///
    /// On an unreachable or unconfigured contract this fails with
    /// `Configuration`, but leaves `stats` at safe zero defaults so a caller
    /// can still render.
    pub async fn initialize(&mut self, token: TokenInfo) -> Result<(), GameError> {
        self.cleanup();
        match self.try_initialize(token).await {
            Ok(()) => Ok(()),
            Err(error) => {
                self.active_token = None;
                self.tracked_bets.clear();
                self.stats = Some(GameStats::default());
                Err(error)
            }
        }
    }

    async fn try_initialize(&mut self, token: TokenInfo) -> Result<(), GameError> {
        if token.address.is_placeholder() {
            return Err(GameError::Configuration(format!(
                "token '{}' has a placeholder contract address; configure `playable_token` first",
                token.symbol
            )));
        }
        let configuration = |error: ChainError| {
            GameError::Configuration(format!(
                "token contract {} is unreachable: {error}",
                token.address
            ))
        };
        let minimum_bet = self
            .chain
            .minimum_bet(&token.address)
            .await
            .map_err(configuration)?;
        let house_edge_bps = self
            .chain
            .house_edge_bps(&token.address)
            .await
            .map_err(configuration)?;

        let ids = self
            .chain
            .player_bet_ids(&token.address, &self.player)
            .await
            .map_err(configuration)?;
        for id in ids {
            let record = self
                .chain
                .bet_details(&token.address, &id)
                .await
                .map_err(configuration)?;
            self.tracked_bets.insert(id, Bet::from_record(&record));
        }

        let subscription = self
            .chain
            .subscribe(&token.address)
            .await
            .map_err(configuration)?;
        self.subscription = Some(subscription);
        self.stats = Some(GameStats::from_bets(
            self.tracked_bets.values(),
            minimum_bet,
            house_edge_bps,
        ));
        tracing::info!(
            token = %token.address,
            symbol = %token.symbol,
            history = self.tracked_bets.len(),
            "coordinator initialized"
        );
        self.active_token = Some(token);
        Ok(())
    }

    /// Submits a bet and starts tracking it as pending. Local guards run
    /// before any chain call; chain rejections are mapped to their distinct
    /// error variants so the presenter can show a precise message.
    pub async fn place_bet(&mut self, amount: Amount) -> Result<RequestId, GameError> {
        let token = self.require_token()?.address;
        let minimum = self
            .stats
            .as_ref()
            .map(|s| s.minimum_bet)
            .unwrap_or(Amount::ZERO);
        if amount.is_zero() {
            return Err(GameError::BelowMinimumBet { amount, minimum });
        }
        if amount < minimum {
            return Err(GameError::BelowMinimumBet { amount, minimum });
        }
        let balance = self.chain.balance_of(&token, &self.player).await?;
        if amount > balance {
            return Err(GameError::InsufficientBalance {
                available: balance,
                requested: amount,
            });
        }
        let request_id =
            self.chain
                .submit_bet(&token, amount)
                .await
                .map_err(|error| match error {
                    ChainError::UserRejected => GameError::UserRejected,
                    ChainError::InsufficientFunds {
                        available,
                        requested,
                    } => GameError::InsufficientBalance {
                        available,
                        requested,
                    },
                    ChainError::ContractRejected(reason) => {
                        GameError::SubmissionRejected(reason)
                    }
                    other => GameError::SubmissionRejected(other.to_string()),
                })?;
        tracing::info!(%request_id, %amount, "bet submitted");
        self.tracked_bets
            .insert(request_id, Bet::pending(request_id, self.player, amount));
        self.recompute_stats();
        Ok(request_id)
    }

    /// Waits for a bet's oracle result with the default two-minute deadline.
    pub async fn await_result(
        &mut self,
        request_id: RequestId,
    ) -> Result<Bet, GameError> {
        self.await_result_within(request_id, RESOLUTION_TIMEOUT).await
    }

    /// Races the polling fallback, the event subscription, and a deadline.
    ///
    /// On timeout the bet remains tracked as pending; the subscription stays
    /// live and may still resolve it later. Transient poll errors are logged
    /// and retried at the next interval.
    pub async fn await_result_within(
        &mut self,
        request_id: RequestId,
        timeout: Duration,
    ) -> Result<Bet, GameError> {
        let token = self.require_token()?.address;
        if let Some(bet) = self.tracked_bets.get(&request_id) {
            if bet.fulfilled {
                return Ok(bet.clone());
            }
        }

        let mut deadline = pin!(time::sleep(timeout));
        let mut ticker = time::interval_at(
            Instant::now() + self.poll_interval,
            self.poll_interval,
        );
        loop {
            let wake = tokio::select! {
                _ = &mut deadline => Wake::Deadline,
                event = Self::next_event(&mut self.subscription) => Wake::Event(event),
                _ = ticker.tick() => Wake::Poll,
            };
            match wake {
                Wake::Deadline => {
                    tracing::warn!(
                        %request_id,
                        timeout_ms = timeout.as_millis() as u64,
                        "no oracle result before deadline; bet stays pending"
                    );
                    return Err(GameError::ResolutionTimeout {
                        request_id,
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                Wake::Event(event) => {
                    self.handle_event(event).await;
                }
                Wake::Poll => match self.chain.bet_details(&token, &request_id).await {
                    Ok(record) if record.fulfilled => {
                        return Ok(self.reconcile(&record));
                    }
                    Ok(_) => {
                        tracing::debug!(%request_id, "bet still pending");
                    }
                    Err(error) => {
                        tracing::debug!(
                            %request_id,
                            %error,
                            "poll failed; retrying at next interval"
                        );
                    }
                },
            }
            if let Some(bet) = self.tracked_bets.get(&request_id) {
                if bet.fulfilled {
                    return Ok(bet.clone());
                }
            }
        }
    }

    async fn next_event(subscription: &mut Option<Subscription>) -> BetEvent {
        match subscription {
            Some(subscription) => match subscription.next().await {
                Some(event) => event,
                // channel closed: park so the other select arms keep running
                None => std::future::pending().await,
            },
            None => std::future::pending().await,
        }
    }

    /// Drains any events delivered since the last call, outside of an
    /// `await_result` race. Presenters call this on their render tick.
    pub async fn pump_events(&mut self) {
        let mut events = Vec::new();
        if let Some(subscription) = &mut self.subscription {
            while let Some(event) = subscription.try_next() {
                events.push(event);
            }
        }
        for event in events {
            self.handle_event(event).await;
        }
    }

    async fn handle_event(&mut self, event: BetEvent) {
        match event {
            BetEvent::Placed {
                request_id,
                player,
                amount,
            } => {
                if player != self.player {
                    return;
                }
                // a bet placed through another session for this player
                if !self.tracked_bets.contains_key(&request_id) {
                    tracing::debug!(%request_id, "adopting externally placed bet");
                    self.tracked_bets
                        .insert(request_id, Bet::pending(request_id, player, amount));
                    self.recompute_stats();
                }
            }
            BetEvent::Resolved {
                request_id, player, ..
            } => {
                if player != self.player {
                    return;
                }
                let Some(token) = self.active_token.as_ref().map(|t| t.address) else {
                    return;
                };
                match self.chain.bet_details(&token, &request_id).await {
                    Ok(record) => {
                        self.reconcile(&record);
                    }
                    Err(error) => {
                        tracing::debug!(
                            %request_id,
                            %error,
                            "failed to fetch details for resolved bet; polling will catch up"
                        );
                    }
                }
            }
        }
    }

    /// Merges a chain-side bet record into tracked state exactly once.
    ///
    /// Called from both the event path and the polling path. Already
    /// fulfilled bets are a silent no-op returning the stored result, so a
    /// second delivery never double-counts statistics. Records for unknown
    /// request ids (bets from a previous session) are adopted rather than
    /// discarded.
    pub fn reconcile(&mut self, record: &BetRecord) -> Bet {
        if let Some(existing) = self.tracked_bets.get_mut(&record.request_id) {
            if existing.fulfilled {
                tracing::debug!(
                    request_id = %record.request_id,
                    "duplicate result delivery ignored"
                );
                return existing.clone();
            }
            if !record.fulfilled {
                return existing.clone();
            }
            existing.fulfilled = true;
            existing.random_number = Some(record.random_number);
            existing.payout = Some(record.payout);
            let bet = existing.clone();
            tracing::info!(
                request_id = %record.request_id,
                random_number = record.random_number,
                payout = %record.payout,
                won = bet.won(),
                tier = bet.tier().map(|t| t.label).unwrap_or(""),
                "bet resolved"
            );
            self.recompute_stats();
            return bet;
        }
        tracing::info!(
            request_id = %record.request_id,
            fulfilled = record.fulfilled,
            "result for untracked bet; adopting"
        );
        let bet = Bet::from_record(record);
        self.tracked_bets.insert(record.request_id, bet.clone());
        self.recompute_stats();
        bet
    }

    /// Releases the event subscription and clears tracked state. Safe to
    /// call repeatedly; required before switching tokens so stale listeners
    /// cannot reconcile bets into the wrong token's statistics.
    pub fn cleanup(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            tracing::debug!(token = %subscription.token(), "releasing event subscription");
            self.chain.unsubscribe(subscription);
        }
        self.tracked_bets.clear();
        self.stats = None;
        self.active_token = None;
    }

    fn require_token(&self) -> Result<&TokenInfo, GameError> {
        self.active_token.as_ref().ok_or_else(|| {
            GameError::Configuration(
                "no active token; call initialize() with a configured token first"
                    .to_string(),
            )
        })
    }

    fn recompute_stats(&mut self) {
        let (minimum_bet, house_edge_bps) = self
            .stats
            .as_ref()
            .map(|s| (s.minimum_bet, s.house_edge_bps))
            .unwrap_or((Amount::ZERO, 0));
        self.stats = Some(GameStats::from_bets(
            self.tracked_bets.values(),
            minimum_bet,
            house_edge_bps,
        ));
    }
}
