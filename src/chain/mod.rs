//! External chain reads
//!
//! Every read is a synchronous value-or-revert call. A revert is not an
//! error: the caller degrades the specific dependent field to zero and
//! continues, so one failing getter never aborts an event.

pub mod mock;
pub mod rpc;

pub use mock::MockChainReader;
pub use rpc::RpcChainReader;

use crate::core::{Address, Wad};

/// Result of one external read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome<T> {
    Value(T),
    Reverted,
}

impl<T> ReadOutcome<T> {
    pub fn value_or(self, default: T) -> T {
        match self {
            ReadOutcome::Value(v) => v,
            ReadOutcome::Reverted => default,
        }
    }

    pub fn is_reverted(&self) -> bool {
        matches!(self, ReadOutcome::Reverted)
    }
}

impl ReadOutcome<Wad> {
    /// Degrade a reverted read to zero.
    pub fn or_zero(self) -> Wad {
        self.value_or(Wad::ZERO)
    }
}

/// Current on-chain values the snapshot recompute depends on.
pub trait ChainReader: Send + Sync {
    /// ERC-20 `totalSupply()` of `token`.
    fn total_supply(&self, token: Address) -> ReadOutcome<Wad>;

    /// ERC-20 `balanceOf(holder)` on `token`.
    fn balance_of(&self, token: Address, holder: Address) -> ReadOutcome<Wad>;

    /// USD price of `token` from the protocol oracle.
    fn oracle_price(&self, oracle: Address, token: Address) -> ReadOutcome<Wad>;

    /// Current `(reserve_0, reserve_1)` of an AMM pool.
    fn pool_reserves(&self, pool: Address) -> ReadOutcome<(Wad, Wad)>;

    /// Total amount staked in a staking pool.
    fn staked_total(&self, pool: Address) -> ReadOutcome<Wad>;

    /// Current reward emission rate of a staking pool.
    fn reward_rate(&self, pool: Address) -> ReadOutcome<Wad>;

    /// End of the current reward period of a staking pool.
    fn reward_period_finish(&self, pool: Address) -> ReadOutcome<i64>;
}
