//! Pool registry snapshot recomputation

use super::SnapshotContext;
use crate::aggregates::{daily, rolling};
use crate::chain::ReadOutcome;
use crate::core::{Address, DailySeries, IndexerResult, SeriesId, SeriesKind, Wad};
use crate::models::{Pool, PoolLiquidity};

/// Recompute a pool's reserves and TVL, refresh its per-token liquidity
/// rows, and extend the protocol TVL average and daily ledger.
pub fn recompute_pool(
    ctx: &SnapshotContext<'_>,
    pool: Address,
    token_0: Address,
    token_1: Address,
    event_time: i64,
) -> IndexerResult<Pool> {
    let protocol_snapshot = ctx.protocol_config()?;

    let (reserve_0, reserve_1) = match ctx.reader.pool_reserves(pool) {
        ReadOutcome::Value(reserves) => reserves,
        ReadOutcome::Reverted => (Wad::ZERO, Wad::ZERO),
    };
    let price_0 = ctx
        .reader
        .oracle_price(protocol_snapshot.price_oracle, token_0)
        .or_zero();
    let price_1 = ctx
        .reader
        .oracle_price(protocol_snapshot.price_oracle, token_1)
        .or_zero();
    let tvl_usd = reserve_0.mul_wad(price_0) + reserve_1.mul_wad(price_1);

    let entry = Pool {
        address: pool,
        token_0,
        token_1,
        reserve_0,
        reserve_1,
        tvl_usd,
        updated_at: event_time,
    };
    ctx.store.put_pool(&entry)?;

    for (token, liquidity) in [(token_0, reserve_0), (token_1, reserve_1)] {
        ctx.store.put_pool_liquidity(&PoolLiquidity {
            pool,
            token,
            liquidity,
            updated_at: event_time,
        })?;
    }

    // Protocol-wide TVL, including this pool's fresh value, feeds both
    // the rolling average and the daily high-watermark ledger.
    let total_tvl: Wad = ctx.store.pools()?.iter().map(|p| p.tvl_usd).sum();
    let tvl_series = SeriesId::new(SeriesKind::Tvl, Address::ZERO);
    rolling::observe(ctx.store, tvl_series, event_time, total_tvl)?;

    let mut protocol = ctx.protocol_config()?;
    daily::observe_daily(
        ctx.store,
        &mut protocol,
        DailySeries::TvlUsd,
        event_time,
        total_tvl,
    )?;
    ctx.store.put_protocol_config(&protocol)?;

    Ok(entry)
}
