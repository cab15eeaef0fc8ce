//! Staking registry snapshot recomputation

use super::SnapshotContext;
use crate::aggregates::rolling;
use crate::core::{Address, IndexerResult, SeriesId, SeriesKind, Wad};
use crate::models::{StakingPool, StakingPoolReward};

/// Recompute a staking pool's metrics. `deposit` carries the amount of a
/// deposit event; withdrawals and reward notifications pass `None` so
/// only deposits feed the volume window.
pub fn recompute_staking_pool(
    ctx: &SnapshotContext<'_>,
    pool: Address,
    staking_token: Address,
    deposit: Option<Wad>,
    event_time: i64,
) -> IndexerResult<StakingPool> {
    let prior = ctx.store.staking_pool(pool)?;

    let total_staked = ctx.reader.staked_total(pool).or_zero();
    let deposit_series = prior
        .as_ref()
        .map(|p| p.deposit_series)
        .unwrap_or_else(|| SeriesId::new(SeriesKind::StakingDeposit, pool));
    let deposit_volume_total = prior
        .as_ref()
        .map(|p| p.deposit_volume_total)
        .unwrap_or(Wad::ZERO)
        + deposit.unwrap_or(Wad::ZERO);

    let (_, deposit_average) = rolling::observe(
        ctx.store,
        deposit_series,
        event_time,
        deposit_volume_total,
    )?;

    let entry = StakingPool {
        address: pool,
        staking_token,
        total_staked,
        deposit_volume_total,
        deposit_series,
        deposit_average,
        updated_at: event_time,
    };
    ctx.store.put_staking_pool(&entry)?;
    Ok(entry)
}

/// Recompute the reward schedule row for `(pool, reward_token)`.
pub fn recompute_staking_reward(
    ctx: &SnapshotContext<'_>,
    pool: Address,
    reward_token: Address,
    event_time: i64,
) -> IndexerResult<StakingPoolReward> {
    let reward_rate = ctx.reader.reward_rate(pool).or_zero();
    let period_finish = ctx.reader.reward_period_finish(pool).value_or(0);

    let row = StakingPoolReward {
        pool,
        reward_token,
        reward_rate,
        period_finish,
        updated_at: event_time,
    };
    ctx.store.put_staking_reward(&row)?;
    Ok(row)
}
