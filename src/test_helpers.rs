//! Shared fixtures for integration tests and the demo binary.

use crate::{
    chain::{
        Address,
        TokenInfo,
        memory::MemoryChain,
    },
    coordinator::GameCoordinator,
    units::Amount,
};

pub const STARTING_BALANCE: Amount = Amount(1_000_000_000);
pub const MINIMUM_BET: Amount = Amount(10);
pub const HOUSE_EDGE_BPS: u16 = 250;

pub struct TestContext {
    pub chain: MemoryChain,
    pub token: TokenInfo,
    alice: Address,
    owner: Address,
}

impl TestContext {
    pub fn new() -> Self {
        let owner = Address([0x0B; 20]);
        let alice = Address([0xA1; 20]);
        let chain = MemoryChain::new().with_signer(owner);
        let token =
            chain.create_token("DICE", "Rollhouse Dice", 9, MINIMUM_BET, HOUSE_EDGE_BPS);
        chain.fund(&token.address, &alice, STARTING_BALANCE);
        chain.fund(&token.address, &owner, STARTING_BALANCE);
        Self {
            chain,
            token,
            alice,
            owner,
        }
    }

    pub fn alice(&self) -> Address {
        self.alice
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// A chain handle signing as alice.
    pub fn alice_chain(&self) -> MemoryChain {
        self.chain.with_signer(self.alice)
    }

    /// A fresh coordinator for alice, not yet initialized.
    pub fn coordinator(&self) -> GameCoordinator<MemoryChain> {
        GameCoordinator::new(self.alice_chain(), self.alice)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
