//! Mock chain reader for tests
//!
//! Reads return whatever was programmed; anything left unset reverts,
//! which makes per-field degradation straightforward to exercise.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{ChainReader, ReadOutcome};
use crate::core::{Address, Wad};

#[derive(Default)]
struct MockState {
    supplies: HashMap<Address, Wad>,
    balances: HashMap<(Address, Address), Wad>,
    prices: HashMap<Address, Wad>,
    reserves: HashMap<Address, (Wad, Wad)>,
    staked: HashMap<Address, Wad>,
    reward_rates: HashMap<Address, Wad>,
    period_finishes: HashMap<Address, i64>,
}

/// Programmable in-memory [`ChainReader`].
#[derive(Default)]
pub struct MockChainReader {
    state: RwLock<MockState>,
}

impl MockChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_total_supply(&self, token: Address, value: Wad) {
        self.write().supplies.insert(token, value);
    }

    pub fn set_balance(&self, token: Address, holder: Address, value: Wad) {
        self.write().balances.insert((token, holder), value);
    }

    /// Make subsequent balance reads revert again.
    pub fn clear_balance(&self, token: Address, holder: Address) {
        self.write().balances.remove(&(token, holder));
    }

    pub fn set_price(&self, token: Address, value: Wad) {
        self.write().prices.insert(token, value);
    }

    pub fn set_reserves(&self, pool: Address, reserve_0: Wad, reserve_1: Wad) {
        self.write().reserves.insert(pool, (reserve_0, reserve_1));
    }

    pub fn set_staked_total(&self, pool: Address, value: Wad) {
        self.write().staked.insert(pool, value);
    }

    pub fn set_reward_rate(&self, pool: Address, value: Wad) {
        self.write().reward_rates.insert(pool, value);
    }

    pub fn set_period_finish(&self, pool: Address, value: i64) {
        self.write().period_finishes.insert(pool, value);
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MockState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MockState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }
}

fn outcome<T: Copy>(value: Option<&T>) -> ReadOutcome<T> {
    match value {
        Some(v) => ReadOutcome::Value(*v),
        None => ReadOutcome::Reverted,
    }
}

impl ChainReader for MockChainReader {
    fn total_supply(&self, token: Address) -> ReadOutcome<Wad> {
        outcome(self.read().supplies.get(&token))
    }

    fn balance_of(&self, token: Address, holder: Address) -> ReadOutcome<Wad> {
        outcome(self.read().balances.get(&(token, holder)))
    }

    fn oracle_price(&self, _oracle: Address, token: Address) -> ReadOutcome<Wad> {
        outcome(self.read().prices.get(&token))
    }

    fn pool_reserves(&self, pool: Address) -> ReadOutcome<(Wad, Wad)> {
        outcome(self.read().reserves.get(&pool))
    }

    fn staked_total(&self, pool: Address) -> ReadOutcome<Wad> {
        outcome(self.read().staked.get(&pool))
    }

    fn reward_rate(&self, pool: Address) -> ReadOutcome<Wad> {
        outcome(self.read().reward_rates.get(&pool))
    }

    fn reward_period_finish(&self, pool: Address) -> ReadOutcome<i64> {
        outcome(self.read().period_finishes.get(&pool))
    }
}
