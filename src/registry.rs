//! Cached view of the factory's token list.
//!
//! Owned, explicitly-scoped state with an explicit refresh/invalidate
//! contract; callers decide when a stale list is acceptable.

use crate::{
    chain::{
        Address,
        ChainAccess,
        TokenInfo,
    },
    error::GameError,
};

pub struct TokenRegistry<C: ChainAccess> {
    chain: C,
    cached: Option<Vec<TokenInfo>>,
}

impl<C: ChainAccess> TokenRegistry<C> {
    pub fn new(chain: C) -> Self {
        Self {
            chain,
            cached: None,
        }
    }

    /// The token list, fetched from the factory on first use and cached
    /// until [`TokenRegistry::invalidate`] or [`TokenRegistry::refresh`].
    pub async fn tokens(&mut self) -> Result<&[TokenInfo], GameError> {
        if self.cached.is_none() {
            return self.refresh().await;
        }
        Ok(self.cached.as_deref().unwrap_or_default())
    }

    /// Drops the cache and re-reads the factory listing.
    pub async fn refresh(&mut self) -> Result<&[TokenInfo], GameError> {
        let tokens = self.chain.list_tokens().await?;
        tracing::debug!(count = tokens.len(), "token list refreshed");
        self.cached = Some(tokens);
        Ok(self.cached.as_deref().unwrap_or_default())
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub async fn token_by_address(
        &mut self,
        address: &Address,
    ) -> Result<Option<TokenInfo>, GameError> {
        let tokens = self.tokens().await?;
        Ok(tokens.iter().find(|t| t.address == *address).cloned())
    }
}
