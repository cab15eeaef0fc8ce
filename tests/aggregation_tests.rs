//! Aggregation engine integration tests against persistent storage

use anyhow::Result;
use meridian_indexer::aggregates::{candles, daily, rolling, TradeObservation};
use meridian_indexer::core::{Address, DailySeries, SeriesId, SeriesKind, Wad};
use meridian_indexer::database::{RocksDbStore, StoreManager};
use meridian_indexer::models::{
    ProtocolConfig, Resolution, BUCKET_SPAN_SECS, DAY_SPAN_SECS, WINDOW,
};
use std::sync::Arc;
use tempfile::TempDir;

fn create_test_store() -> Result<(StoreManager, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db = RocksDbStore::open_at(temp_dir.path())?;
    Ok((StoreManager::new(Arc::new(db)), temp_dir))
}

fn token(tail: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = tail;
    Address(bytes)
}

const T0: i64 = 1_700_000_000;

#[tokio::test]
async fn test_rolling_mean_persists_across_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let series = SeriesId::new(SeriesKind::TotalSupply, token(1));

    {
        let store = StoreManager::new(Arc::new(RocksDbStore::open_at(temp_dir.path())?));
        rolling::observe(&store, series, T0, Wad::from_units(10))?;
        rolling::observe(&store, series, T0 + BUCKET_SPAN_SECS, Wad::from_units(20))?;
    }

    // The series continues where the previous process left off.
    let store = StoreManager::new(Arc::new(RocksDbStore::open_at(temp_dir.path())?));
    let (index, mean) =
        rolling::observe(&store, series, T0 + 2 * BUCKET_SPAN_SECS, Wad::from_units(30))?;
    assert_eq!(index, 3);
    assert_eq!(mean, Wad::from_units(20));

    Ok(())
}

#[tokio::test]
async fn test_rolling_gap_fill_advances_index_by_gap_size() -> Result<()> {
    let (store, _temp_dir) = create_test_store()?;
    let series = SeriesId::new(SeriesKind::CollateralReserve, token(2));

    rolling::observe(&store, series, T0, Wad::from_units(7))?;
    let (index, _) = rolling::observe(
        &store,
        series,
        T0 + 5 * BUCKET_SPAN_SECS,
        Wad::from_units(11),
    )?;
    assert_eq!(index, 6);

    // Exactly four carry-forward buckets plus one carrying the new value.
    for i in 2..=5u64 {
        assert_eq!(
            store.rolling_bucket(series, i)?.unwrap().value,
            Wad::from_units(7)
        );
    }
    assert_eq!(
        store.rolling_bucket(series, 6)?.unwrap().value,
        Wad::from_units(11)
    );

    Ok(())
}

#[tokio::test]
async fn test_rolling_window_eviction_formula() -> Result<()> {
    let (store, _temp_dir) = create_test_store()?;
    let series = SeriesId::new(SeriesKind::DebtReserve, token(3));
    let v0 = Wad::from_raw(1_000_000_000_000_000_001);
    let v1 = Wad::from_raw(12_345);

    for k in 0..WINDOW {
        rolling::observe(&store, series, T0 + k as i64 * BUCKET_SPAN_SECS, v0)?;
    }
    let (index, mean) = rolling::observe(
        &store,
        series,
        T0 + WINDOW as i64 * BUCKET_SPAN_SECS,
        v1,
    )?;

    assert_eq!(index, WINDOW + 1);
    // v0 - v0/720 + v1/720 with each division truncated independently,
    // not the simplified fraction.
    assert_eq!(mean, v0 + v1.div_int(WINDOW) - v0.div_int(WINDOW));

    Ok(())
}

#[tokio::test]
async fn test_candle_flat_fill_over_idle_spans() -> Result<()> {
    let (store, _temp_dir) = create_test_store()?;
    let instrument = token(4);
    let span = Resolution::H1.duration_secs();

    let trade = TradeObservation {
        trade_price: Some(Wad::from_units(100)),
        oracle_price: Some(Wad::from_units(101)),
        volume: Some(Wad::from_units(9)),
    };
    candles::observe_trade(&store, instrument, T0, trade)?;

    // No trades for three spans.
    let next = TradeObservation {
        trade_price: Some(Wad::from_units(105)),
        ..Default::default()
    };
    candles::observe_trade(&store, instrument, T0 + 3 * span, next)?;

    let history = store.candles(instrument, Resolution::H1)?;
    assert_eq!(history.len(), 3);

    // The first closed row is the real bucket.
    assert_eq!(history[0].volume, Wad::from_units(9));
    assert_eq!(history[0].close_oracle, Wad::from_units(101));

    // The two fills are flat at the previous close with zero volume.
    for row in &history[1..] {
        assert_eq!(row.open, Wad::from_units(100));
        assert_eq!(row.high, Wad::from_units(100));
        assert_eq!(row.low, Wad::from_units(100));
        assert_eq!(row.close, Wad::from_units(100));
        assert_eq!(row.volume, Wad::ZERO);
        assert_eq!(row.close_oracle, Wad::from_units(101));
    }

    // The open bucket continues from that close.
    let singleton = store.candle_singleton(instrument, Resolution::H1)?.unwrap();
    assert_eq!(singleton.timestamp, T0 + 3 * span);
    assert_eq!(singleton.open, Wad::from_units(100));
    assert_eq!(singleton.close, Wad::from_units(105));

    Ok(())
}

#[tokio::test]
async fn test_candle_invariant_high_low_brackets_open_close() -> Result<()> {
    let (store, _temp_dir) = create_test_store()?;
    let instrument = token(5);

    let prices = [100u64, 140, 90, 125, 80, 130];
    for (i, units) in prices.iter().enumerate() {
        let obs = TradeObservation {
            trade_price: Some(Wad::from_units(*units)),
            ..Default::default()
        };
        candles::observe_trade(&store, instrument, T0 + i as i64, obs)?;
    }

    let s = store.candle_singleton(instrument, Resolution::H1)?.unwrap();
    assert!(s.high >= s.open.max(s.close));
    assert!(s.low <= s.open.min(s.close));
    assert_eq!(s.high, Wad::from_units(140));
    assert_eq!(s.low, Wad::from_units(80));

    Ok(())
}

#[tokio::test]
async fn test_daily_ledger_high_watermark_and_rollover() -> Result<()> {
    let (store, _temp_dir) = create_test_store()?;
    let mut config = ProtocolConfig::with_defaults(
        token(1),
        token(2),
        token(3),
        token(4),
        token(5),
    );
    let series = DailySeries::ReserveUsd;

    daily::observe_daily(&store, &mut config, series, T0, Wad::from_units(100))?;
    // Lower value within the day does not overwrite.
    daily::observe_daily(&store, &mut config, series, T0 + 10, Wad::from_units(50))?;
    assert_eq!(
        store.daily_chunk(series, 0)?.unwrap().value,
        Wad::from_units(100)
    );
    // Higher value does.
    daily::observe_daily(&store, &mut config, series, T0 + 20, Wad::from_units(120))?;
    assert_eq!(
        store.daily_chunk(series, 0)?.unwrap().value,
        Wad::from_units(120)
    );
    // After the day elapses a new chunk appears regardless of magnitude.
    daily::observe_daily(
        &store,
        &mut config,
        series,
        T0 + DAY_SPAN_SECS + 5,
        Wad::from_units(1),
    )?;
    assert_eq!(config.reserve_history_index, 1);
    assert_eq!(
        store.daily_chunk(series, 1)?.unwrap().value,
        Wad::from_units(1)
    );

    Ok(())
}
