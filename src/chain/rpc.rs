//! Lightweight JSON-RPC chain reader
//!
//! A minimal `eth_call` client that implements only the getters the
//! snapshot recompute needs, avoiding a full node-client dependency
//! chain. Any transport or execution failure surfaces as a revert and is
//! degraded by the caller; the reader itself never aborts an event.

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{ChainReader, ReadOutcome};
use crate::core::{Address, Wad};

// Function selectors for the getters the indexer calls.
const SEL_TOTAL_SUPPLY: &str = "18160ddd"; // totalSupply()
const SEL_BALANCE_OF: &str = "70a08231"; // balanceOf(address)
const SEL_GET_PRICE: &str = "41976e09"; // getPrice(address)
const SEL_GET_RESERVES: &str = "0902f1ac"; // getReserves()
const SEL_REWARD_RATE: &str = "7b0a47ee"; // rewardRate()
const SEL_PERIOD_FINISH: &str = "ebe2b12b"; // periodFinish()

/// RPC response wrapper
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

/// RPC error structure
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i32,
    message: String,
}

/// JSON-RPC backed [`ChainReader`]
pub struct RpcChainReader {
    url: String,
    agent: ureq::Agent,
}

impl RpcChainReader {
    pub fn new(url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_read(Duration::from_secs(10))
            .timeout_write(Duration::from_secs(10))
            .build();
        Self {
            url: url.into(),
            agent,
        }
    }

    /// Issue one `eth_call` and return the raw hex result, mapping every
    /// failure mode (transport, RPC error, execution revert) to
    /// `Reverted`.
    fn eth_call(&self, to: Address, data: String) -> ReadOutcome<String> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{"to": to.to_string(), "data": data}, "latest"],
        });

        let response = match self.agent.post(&self.url).send_json(body) {
            Ok(r) => r,
            Err(e) => {
                debug!("eth_call transport failure for {}: {}", to, e);
                return ReadOutcome::Reverted;
            }
        };

        let parsed: RpcResponse = match response.into_json() {
            Ok(p) => p,
            Err(e) => {
                debug!("eth_call malformed response for {}: {}", to, e);
                return ReadOutcome::Reverted;
            }
        };

        if let Some(error) = parsed.error {
            debug!(
                "eth_call reverted for {}: code {} ({})",
                to, error.code, error.message
            );
            return ReadOutcome::Reverted;
        }

        match parsed.result {
            Some(hex) if hex.len() > 2 => ReadOutcome::Value(hex),
            _ => ReadOutcome::Reverted,
        }
    }

    fn call_wad(&self, to: Address, data: String) -> ReadOutcome<Wad> {
        match self.eth_call(to, data) {
            ReadOutcome::Value(hex) => match decode_word(&hex, 0) {
                Some(raw) => ReadOutcome::Value(Wad::from_raw(raw)),
                None => ReadOutcome::Reverted,
            },
            ReadOutcome::Reverted => ReadOutcome::Reverted,
        }
    }
}

/// Hex-encode a selector plus ABI-padded address arguments.
fn encode_call(selector: &str, args: &[Address]) -> String {
    let mut data = String::with_capacity(2 + 8 + args.len() * 64);
    data.push_str("0x");
    data.push_str(selector);
    for arg in args {
        data.push_str(&"0".repeat(24));
        for b in arg.as_bytes() {
            data.push_str(&format!("{:02x}", b));
        }
    }
    data
}

/// Decode the `word`-th 32-byte word of an ABI-encoded result into i128.
/// Values beyond i128 range are out of the protocol's domain and read as
/// a revert upstream (None).
fn decode_word(hex: &str, word: usize) -> Option<i128> {
    let hex = hex.strip_prefix("0x")?;
    let start = word * 64;
    let end = start + 64;
    if hex.len() < end {
        return None;
    }
    let slice = &hex[start..end];
    // High bytes must be zero for the value to fit.
    if !slice[..32].bytes().all(|b| b == b'0') {
        return None;
    }
    i128::from_str_radix(&slice[32..], 16).ok()
}

impl ChainReader for RpcChainReader {
    fn total_supply(&self, token: Address) -> ReadOutcome<Wad> {
        self.call_wad(token, encode_call(SEL_TOTAL_SUPPLY, &[]))
    }

    fn balance_of(&self, token: Address, holder: Address) -> ReadOutcome<Wad> {
        self.call_wad(token, encode_call(SEL_BALANCE_OF, &[holder]))
    }

    fn oracle_price(&self, oracle: Address, token: Address) -> ReadOutcome<Wad> {
        self.call_wad(oracle, encode_call(SEL_GET_PRICE, &[token]))
    }

    fn pool_reserves(&self, pool: Address) -> ReadOutcome<(Wad, Wad)> {
        match self.eth_call(pool, encode_call(SEL_GET_RESERVES, &[])) {
            ReadOutcome::Value(hex) => {
                match (decode_word(&hex, 0), decode_word(&hex, 1)) {
                    (Some(r0), Some(r1)) => {
                        ReadOutcome::Value((Wad::from_raw(r0), Wad::from_raw(r1)))
                    }
                    _ => ReadOutcome::Reverted,
                }
            }
            ReadOutcome::Reverted => ReadOutcome::Reverted,
        }
    }

    fn staked_total(&self, pool: Address) -> ReadOutcome<Wad> {
        self.call_wad(pool, encode_call(SEL_TOTAL_SUPPLY, &[]))
    }

    fn reward_rate(&self, pool: Address) -> ReadOutcome<Wad> {
        self.call_wad(pool, encode_call(SEL_REWARD_RATE, &[]))
    }

    fn reward_period_finish(&self, pool: Address) -> ReadOutcome<i64> {
        match self.eth_call(pool, encode_call(SEL_PERIOD_FINISH, &[])) {
            ReadOutcome::Value(hex) => match decode_word(&hex, 0) {
                Some(ts) if ts <= i64::MAX as i128 => ReadOutcome::Value(ts as i64),
                _ => ReadOutcome::Reverted,
            },
            ReadOutcome::Reverted => ReadOutcome::Reverted,
        }
    }
}
