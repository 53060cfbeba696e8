//! In-memory chain backend.
//!
//! Stands in for the factory and token contracts in tests and the demo
//! binary: balances, bet storage, and the VRF request queue live behind an
//! `Arc<Mutex<..>>` so a test's oracle driver and the coordinator can share
//! one chain through cloned handles. The lock is never held across an await.

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
    error::ChainError,
    units::Amount,
};
use sha2::{
    Digest,
    Sha256,
};
use std::{
    collections::{
        HashMap,
        HashSet,
        VecDeque,
    },
    sync::{
        Arc,
        Mutex,
    },
};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// The authoritative on-chain payout rule. The client mirrors this in
/// [`crate::payout`]; tests assert the two agree at every tier boundary.
pub fn calculate_payout(bet_amount: Amount, random_number: u64) -> Amount {
    let roll = random_number % 10_000;
    if roll < 2_500 {
        Amount::ZERO
    } else if roll < 5_000 {
        bet_amount
    } else if roll < 8_000 {
        Amount(bet_amount.0.saturating_mul(3) / 2)
    } else if roll < 9_500 {
        Amount(bet_amount.0.saturating_mul(3))
    } else if roll < 9_900 {
        Amount(bet_amount.0.saturating_mul(10))
    } else {
        Amount(bet_amount.0.saturating_mul(50))
    }
}

struct TokenState {
    info: TokenInfo,
    minimum_bet: Amount,
    house_edge_bps: u16,
    balances: HashMap<Address, Amount>,
    bets: HashMap<RequestId, BetRecord>,
    // chronological submission order, for player_bet_ids
    bet_order: Vec<(Address, RequestId)>,
    pending: VecDeque<RequestId>,
    events: broadcast::Sender<BetEvent>,
}

#[derive(Default)]
struct ChainState {
    tokens: HashMap<Address, TokenState>,
    token_order: Vec<Address>,
    nonce: u64,
    next_subscription_id: u64,
    active_subscriptions: HashSet<u64>,
    calls: u64,
    reject_next_submit: Option<ChainError>,
    fail_next_details: u32,
}

/// A handle onto the in-memory chain, bound to a signing address. Clones
/// share the same underlying state.
#[derive(Clone)]
pub struct MemoryChain {
    inner: Arc<Mutex<ChainState>>,
    signer: Address,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChainState::default())),
            signer: Address::ZERO,
        }
    }

    /// A handle onto the same chain signing as `signer`.
    pub fn with_signer(&self, signer: Address) -> Self {
        Self {
            inner: self.inner.clone(),
            signer,
        }
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn create_token(
        &self,
        symbol: &str,
        name: &str,
        decimals: u8,
        minimum_bet: Amount,
        house_edge_bps: u16,
    ) -> TokenInfo {
        let mut state = self.inner.lock().expect("chain state poisoned");
        state.nonce += 1;
        let mut hasher = Sha256::new();
        hasher.update(symbol.as_bytes());
        hasher.update(state.nonce.to_be_bytes());
        let digest = hasher.finalize();
        let mut address = [0u8; 20];
        address.copy_from_slice(&digest[..20]);
        let info = TokenInfo {
            address: Address(address),
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            creator: self.signer,
        };
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        state.tokens.insert(
            info.address,
            TokenState {
                info: info.clone(),
                minimum_bet,
                house_edge_bps,
                balances: HashMap::new(),
                bets: HashMap::new(),
                bet_order: Vec::new(),
                pending: VecDeque::new(),
                events,
            },
        );
        state.token_order.push(info.address);
        info
    }

    pub fn fund(&self, token: &Address, player: &Address, amount: Amount) {
        let mut state = self.inner.lock().expect("chain state poisoned");
        if let Some(token) = state.tokens.get_mut(token) {
            let balance = token.balances.entry(*player).or_default();
            *balance = balance.saturating_add(amount);
        }
    }

    /// Fulfills a pending request with the given oracle number, credits the
    /// payout, and emits a `Resolved` event.
    pub fn resolve(
        &self,
        token: &Address,
        request_id: &RequestId,
        random_number: u64,
    ) -> Result<BetRecord, ChainError> {
        self.fulfill(token, request_id, random_number, true)
    }

    /// Fulfills a request without emitting the event, simulating a delivery
    /// gap that only the polling fallback can cover.
    pub fn resolve_quietly(
        &self,
        token: &Address,
        request_id: &RequestId,
        random_number: u64,
    ) -> Result<BetRecord, ChainError> {
        self.fulfill(token, request_id, random_number, false)
    }

    fn fulfill(
        &self,
        token: &Address,
        request_id: &RequestId,
        random_number: u64,
        emit_event: bool,
    ) -> Result<BetRecord, ChainError> {
        let mut state = self.inner.lock().expect("chain state poisoned");
        let token_state = state
            .tokens
            .get_mut(token)
            .ok_or(ChainError::UnknownToken(*token))?;
        let record = token_state
            .bets
            .get_mut(request_id)
            .ok_or(ChainError::UnknownRequest(*request_id))?;
        if record.fulfilled {
            return Err(ChainError::ContractRejected(format!(
                "request {request_id} already fulfilled"
            )));
        }
        record.fulfilled = true;
        record.random_number = random_number;
        record.payout = calculate_payout(record.amount, random_number);
        let record = record.clone();
        token_state.pending.retain(|id| id != request_id);
        if record.payout > Amount::ZERO {
            let balance = token_state.balances.entry(record.player).or_default();
            *balance = balance.saturating_add(record.payout);
        }
        if emit_event {
            let _ = token_state.events.send(BetEvent::Resolved {
                request_id: record.request_id,
                player: record.player,
                random_number,
                payout: record.payout,
            });
        }
        Ok(record)
    }

    pub fn pending_requests(&self, token: &Address) -> Vec<RequestId> {
        let state = self.inner.lock().expect("chain state poisoned");
        state
            .tokens
            .get(token)
            .map(|t| t.pending.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Fails the next submission with the given error (user cancellation,
    /// on-chain revert, ...).
    pub fn reject_next_submission(&self, error: ChainError) {
        let mut state = self.inner.lock().expect("chain state poisoned");
        state.reject_next_submit = Some(error);
    }

    /// Fails the next `times` detail lookups with a transport error.
    pub fn fail_details(&self, times: u32) {
        let mut state = self.inner.lock().expect("chain state poisoned");
        state.fail_next_details = times;
    }

    /// Total chain-layer invocations observed, across all trait methods.
    pub fn call_count(&self) -> u64 {
        self.inner.lock().expect("chain state poisoned").calls
    }

    pub fn active_subscriptions(&self) -> usize {
        let state = self.inner.lock().expect("chain state poisoned");
        state.active_subscriptions.len()
    }
}

impl Default for MemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainAccess for MemoryChain {
    async fn submit_bet(
        &self,
        token: &Address,
        amount: Amount,
    ) -> Result<RequestId, ChainError> {
        let mut state = self.inner.lock().expect("chain state poisoned");
        state.calls += 1;
        if let Some(error) = state.reject_next_submit.take() {
            return Err(error);
        }
        let nonce = {
            state.nonce += 1;
            state.nonce
        };
        let signer = self.signer;
        let token_state = state
            .tokens
            .get_mut(token)
            .ok_or(ChainError::UnknownToken(*token))?;
        if amount < token_state.minimum_bet {
            return Err(ChainError::ContractRejected(format!(
                "bet {amount} below contract minimum {}",
                token_state.minimum_bet
            )));
        }
        let balance = token_state.balances.entry(signer).or_default();
        if *balance < amount {
            return Err(ChainError::InsufficientFunds {
                available: *balance,
                requested: amount,
            });
        }
        *balance = balance.saturating_sub(amount);

        let mut hasher = Sha256::new();
        hasher.update(token.0);
        hasher.update(signer.0);
        hasher.update(nonce.to_be_bytes());
        let request_id = RequestId(hasher.finalize().into());

        token_state.bets.insert(
            request_id,
            BetRecord {
                request_id,
                player: signer,
                amount,
                fulfilled: false,
                random_number: 0,
                payout: Amount::ZERO,
            },
        );
        token_state.bet_order.push((signer, request_id));
        token_state.pending.push_back(request_id);
        let _ = token_state.events.send(BetEvent::Placed {
            request_id,
            player: signer,
            amount,
        });
        Ok(request_id)
    }

    async fn bet_details(
        &self,
        token: &Address,
        request_id: &RequestId,
    ) -> Result<BetRecord, ChainError> {
        let mut state = self.inner.lock().expect("chain state poisoned");
        state.calls += 1;
        if state.fail_next_details > 0 {
            state.fail_next_details -= 1;
            return Err(ChainError::Transport(
                "rpc temporarily unavailable".to_string(),
            ));
        }
        state
            .tokens
            .get(token)
            .ok_or(ChainError::UnknownToken(*token))?
            .bets
            .get(request_id)
            .cloned()
            .ok_or(ChainError::UnknownRequest(*request_id))
    }

    async fn player_bet_ids(
        &self,
        token: &Address,
        player: &Address,
    ) -> Result<Vec<RequestId>, ChainError> {
        let mut state = self.inner.lock().expect("chain state poisoned");
        state.calls += 1;
        let token_state = state
            .tokens
            .get(token)
            .ok_or(ChainError::UnknownToken(*token))?;
        Ok(token_state
            .bet_order
            .iter()
            .filter(|(owner, _)| owner == player)
            .map(|(_, id)| *id)
            .collect())
    }

    async fn subscribe(&self, token: &Address) -> Result<Subscription, ChainError> {
        let mut state = self.inner.lock().expect("chain state poisoned");
        state.calls += 1;
        state.next_subscription_id += 1;
        let id = state.next_subscription_id;
        let token_state = state
            .tokens
            .get(token)
            .ok_or(ChainError::UnknownToken(*token))?;
        let events = token_state.events.subscribe();
        state.active_subscriptions.insert(id);
        Ok(Subscription {
            id,
            token: *token,
            events,
        })
    }

    fn unsubscribe(&self, subscription: Subscription) {
        let mut state = self.inner.lock().expect("chain state poisoned");
        state.active_subscriptions.remove(&subscription.id);
    }

    async fn minimum_bet(&self, token: &Address) -> Result<Amount, ChainError> {
        let mut state = self.inner.lock().expect("chain state poisoned");
        state.calls += 1;
        state
            .tokens
            .get(token)
            .map(|t| t.minimum_bet)
            .ok_or(ChainError::UnknownToken(*token))
    }

    async fn house_edge_bps(&self, token: &Address) -> Result<u16, ChainError> {
        let mut state = self.inner.lock().expect("chain state poisoned");
        state.calls += 1;
        state
            .tokens
            .get(token)
            .map(|t| t.house_edge_bps)
            .ok_or(ChainError::UnknownToken(*token))
    }

    async fn balance_of(
        &self,
        token: &Address,
        player: &Address,
    ) -> Result<Amount, ChainError> {
        let mut state = self.inner.lock().expect("chain state poisoned");
        state.calls += 1;
        let token_state = state
            .tokens
            .get(token)
            .ok_or(ChainError::UnknownToken(*token))?;
        Ok(token_state.balances.get(player).copied().unwrap_or_default())
    }

    async fn list_tokens(&self) -> Result<Vec<TokenInfo>, ChainError> {
        let mut state = self.inner.lock().expect("chain state poisoned");
        state.calls += 1;
        Ok(state
            .token_order
            .iter()
            .filter_map(|address| state.tokens.get(address))
            .map(|t| t.info.clone())
            .collect())
    }
}
