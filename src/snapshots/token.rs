//! Token registry snapshot recomputation

use tracing::debug;

use super::SnapshotContext;
use crate::aggregates::{daily, rolling};
use crate::core::{Address, DailySeries, IndexerResult, SeriesId, SeriesKind, Wad};
use crate::models::{CollateralTokenMeta, DebtTokenMeta, TokenMeta};

/// Recompute the base registry entry for `token`.
pub fn recompute_token(
    ctx: &SnapshotContext<'_>,
    token: Address,
    event_time: i64,
) -> IndexerResult<TokenMeta> {
    let protocol = ctx.protocol_config()?;

    let price_usd = ctx.reader.oracle_price(protocol.price_oracle, token).or_zero();
    let total_supply = ctx.reader.total_supply(token).or_zero();

    let supply_series = SeriesId::new(SeriesKind::TotalSupply, token);
    let (_, supply_average) = rolling::observe(ctx.store, supply_series, event_time, total_supply)?;

    let meta = TokenMeta {
        address: token,
        price_usd,
        total_supply,
        supply_series,
        supply_average,
        updated_at: event_time,
    };
    ctx.store.put_token(&meta)?;
    Ok(meta)
}

/// Create the collateral registry entry for `token` if it is new, then
/// recompute it.
pub fn register_collateral(
    ctx: &SnapshotContext<'_>,
    token: Address,
    underlying: Address,
    event_time: i64,
) -> IndexerResult<()> {
    if ctx.store.collateral_token(token)?.is_none() {
        let meta = CollateralTokenMeta {
            address: token,
            underlying,
            total_reserve: Wad::ZERO,
            reserve_usd: Wad::ZERO,
            price_usd: Wad::ZERO,
            reserve_series: SeriesId::new(SeriesKind::CollateralReserve, token),
            reserve_average: Wad::ZERO,
            updated_at: event_time,
        };
        ctx.store.put_collateral_token(&meta)?;
        debug!("registered collateral token {}", token);
    }
    recompute_collateral(ctx, token, event_time)?;
    Ok(())
}

/// Create the debt registry entry for `token` if it is new, then
/// recompute it.
pub fn register_debt(
    ctx: &SnapshotContext<'_>,
    token: Address,
    underlying: Address,
    event_time: i64,
) -> IndexerResult<()> {
    if ctx.store.debt_token(token)?.is_none() {
        let meta = DebtTokenMeta {
            address: token,
            underlying,
            total_minted: Wad::ZERO,
            minted_usd: Wad::ZERO,
            price_usd: Wad::ZERO,
            debt_series: SeriesId::new(SeriesKind::DebtReserve, token),
            debt_average: Wad::ZERO,
            updated_at: event_time,
        };
        ctx.store.put_debt_token(&meta)?;
        debug!("registered debt token {}", token);
    }
    recompute_debt(ctx, token, event_time)?;
    Ok(())
}

/// Recompute a collateral token's composite metrics and extend the
/// protocol reserve-USD daily ledger. Returns `None` for tokens outside
/// the collateral registry.
pub fn recompute_collateral(
    ctx: &SnapshotContext<'_>,
    token: Address,
    event_time: i64,
) -> IndexerResult<Option<CollateralTokenMeta>> {
    let Some(prior) = ctx.store.collateral_token(token)? else {
        return Ok(None);
    };
    let mut protocol = ctx.protocol_config()?;

    // Each read degrades independently on revert.
    let total_reserve = ctx.reader.balance_of(prior.underlying, token).or_zero();
    let price_usd = ctx
        .reader
        .oracle_price(protocol.price_oracle, prior.underlying)
        .or_zero();
    let reserve_usd = total_reserve.mul_wad(price_usd);

    let (_, reserve_average) =
        rolling::observe(ctx.store, prior.reserve_series, event_time, total_reserve)?;

    let meta = CollateralTokenMeta {
        total_reserve,
        reserve_usd,
        price_usd,
        reserve_average,
        updated_at: event_time,
        ..prior
    };
    ctx.store.put_collateral_token(&meta)?;

    // Protocol-wide reserve history, including this token's fresh value.
    let total: Wad = ctx
        .store
        .collateral_tokens()?
        .iter()
        .map(|t| t.reserve_usd)
        .sum();
    daily::observe_daily(
        ctx.store,
        &mut protocol,
        DailySeries::ReserveUsd,
        event_time,
        total,
    )?;
    ctx.store.put_protocol_config(&protocol)?;

    Ok(Some(meta))
}

/// Recompute a debt token's composite metrics and extend the protocol
/// minted-USD daily ledger. Returns `None` for tokens outside the debt
/// registry.
pub fn recompute_debt(
    ctx: &SnapshotContext<'_>,
    token: Address,
    event_time: i64,
) -> IndexerResult<Option<DebtTokenMeta>> {
    let Some(prior) = ctx.store.debt_token(token)? else {
        return Ok(None);
    };
    let mut protocol = ctx.protocol_config()?;

    let total_minted = ctx.reader.total_supply(token).or_zero();
    let price_usd = ctx
        .reader
        .oracle_price(protocol.price_oracle, prior.underlying)
        .or_zero();
    let minted_usd = total_minted.mul_wad(price_usd);

    let (_, debt_average) =
        rolling::observe(ctx.store, prior.debt_series, event_time, total_minted)?;

    let meta = DebtTokenMeta {
        total_minted,
        minted_usd,
        price_usd,
        debt_average,
        updated_at: event_time,
        ..prior
    };
    ctx.store.put_debt_token(&meta)?;

    let total: Wad = ctx.store.debt_tokens()?.iter().map(|t| t.minted_usd).sum();
    daily::observe_daily(
        ctx.store,
        &mut protocol,
        DailySeries::MintedUsd,
        event_time,
        total,
    )?;
    ctx.store.put_protocol_config(&protocol)?;

    Ok(Some(meta))
}
