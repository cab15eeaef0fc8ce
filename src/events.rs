//! Decoded protocol events and the source that delivers them
//!
//! Decoding happens upstream; the indexer consumes already-typed payloads
//! in strict source order. All "now" comes from the envelope timestamp;
//! the core never reads wall-clock time.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::core::{Address, Wad};

/// One decoded event with its chain position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub block_number: u64,
    pub log_index: u32,
    /// Block timestamp, seconds.
    pub timestamp: i64,
    pub payload: EventPayload,
}

/// Decoded event payloads the indexer reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    /// ERC-20 transfer on any registered token.
    Transfer {
        token: Address,
        from: Address,
        to: Address,
        amount: Wad,
    },
    /// Swap through an AMM pool.
    Swap {
        pool: Address,
        token_in: Address,
        token_out: Address,
        amount_in: Wad,
        amount_out: Wad,
    },
    /// Mint/burn of pool liquidity.
    LiquidityChange {
        pool: Address,
        token_0: Address,
        token_1: Address,
    },
    /// Withdrawal from a collateral reserve.
    ReserveWithdraw { token: Address, amount: Wad },
    /// Price oracle pushed a new USD price for `token`.
    OraclePrice { token: Address, price: Wad },
    /// Token manager registered a collateral token.
    CollateralRegistered { token: Address, underlying: Address },
    /// Token manager registered a debt token.
    DebtRegistered { token: Address, underlying: Address },
    /// Deposit into a staking pool.
    StakingDeposit {
        pool: Address,
        staking_token: Address,
        amount: Wad,
    },
    /// Withdrawal from a staking pool.
    StakingWithdraw {
        pool: Address,
        staking_token: Address,
        amount: Wad,
    },
    /// Reward schedule notified on a staking pool.
    RewardNotified {
        pool: Address,
        reward_token: Address,
        amount: Wad,
    },
}

/// Ordered event delivery. `None` means the source is exhausted.
pub trait EventSource {
    fn next_event(&mut self) -> Result<Option<EventEnvelope>>;
}

/// JSONL-backed replay source: one `EventEnvelope` per line, in chain
/// order. Stands in for the live decoding layer.
pub struct FileEventSource {
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl FileEventSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open events file {}", path.display()))?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }
}

impl EventSource for FileEventSource {
    fn next_event(&mut self) -> Result<Option<EventEnvelope>> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let envelope: EventEnvelope = serde_json::from_str(&line)
                .with_context(|| format!("malformed event on line {}", self.line_number))?;
            return Ok(Some(envelope));
        }
        Ok(None)
    }
}
