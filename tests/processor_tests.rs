//! Processor integration tests: event routing end to end

use anyhow::Result;
use meridian_indexer::chain::MockChainReader;
use meridian_indexer::core::{Address, IndexerError, Wad};
use meridian_indexer::database::{MemoryStore, StoreManager};
use meridian_indexer::events::{EventEnvelope, EventPayload};
use meridian_indexer::models::Resolution;
use meridian_indexer::processors::ProcessorRegistry;
use meridian_indexer::snapshots::ProtocolDefaults;
use std::sync::Arc;

fn addr(tail: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = tail;
    Address(bytes)
}

fn defaults() -> ProtocolDefaults {
    ProtocolDefaults {
        price_oracle: addr(0x01),
        pool_registry: addr(0x02),
        staking_registry: addr(0x03),
        token_manager: addr(0x04),
        numeraire: addr(0x05),
    }
}

fn setup() -> (StoreManager, Arc<MockChainReader>, ProcessorRegistry) {
    let store = StoreManager::new(Arc::new(MemoryStore::new()));
    let reader = Arc::new(MockChainReader::new());
    let registry = ProcessorRegistry::new(store.clone(), reader.clone(), defaults());
    (store, reader, registry)
}

fn envelope(block: u64, log: u32, timestamp: i64, payload: EventPayload) -> EventEnvelope {
    EventEnvelope {
        block_number: block,
        log_index: log,
        timestamp,
        payload,
    }
}

const T0: i64 = 1_700_000_000;

#[tokio::test]
async fn test_transfer_creates_token_snapshot() -> Result<()> {
    let (store, reader, mut registry) = setup();
    let instrument = addr(0xaa);
    reader.set_total_supply(instrument, Wad::from_units(9_000));
    reader.set_price(instrument, Wad::from_units(2));

    registry
        .process_event(&envelope(
            1,
            0,
            T0,
            EventPayload::Transfer {
                token: instrument,
                from: Address::ZERO,
                to: addr(0xfe),
                amount: Wad::from_units(5),
            },
        ))
        .await?;

    let meta = store.token(instrument)?.unwrap();
    assert_eq!(meta.total_supply, Wad::from_units(9_000));
    assert_eq!(meta.price_usd, Wad::from_units(2));
    assert_eq!(meta.updated_at, T0);

    Ok(())
}

#[tokio::test]
async fn test_swap_prices_candle_against_numeraire() -> Result<()> {
    let (store, reader, mut registry) = setup();
    let numeraire = addr(0x05);
    let instrument = addr(0xaa);
    let pool = addr(0xbb);
    reader.set_reserves(pool, Wad::from_units(100), Wad::from_units(50));

    // Buy 2 tokens for 300 numeraire: price 150, volume 300.
    registry
        .process_event(&envelope(
            1,
            0,
            T0,
            EventPayload::Swap {
                pool,
                token_in: numeraire,
                token_out: instrument,
                amount_in: Wad::from_units(300),
                amount_out: Wad::from_units(2),
            },
        ))
        .await?;

    let singleton = store.candle_singleton(instrument, Resolution::M1)?.unwrap();
    assert_eq!(singleton.open, Wad::from_units(150));
    assert_eq!(singleton.close, Wad::from_units(150));
    assert_eq!(singleton.volume, Wad::from_units(300));

    // The pool registry entry was refreshed from reads.
    let entry = store.pool(pool)?.unwrap();
    assert_eq!(entry.reserve_0, Wad::from_units(100));
    assert_eq!(entry.reserve_1, Wad::from_units(50));

    Ok(())
}

#[tokio::test]
async fn test_swap_between_unpriced_tokens_skips_candles() -> Result<()> {
    let (store, reader, mut registry) = setup();
    let pool = addr(0xbb);
    let (token_a, token_b) = (addr(0xac), addr(0xad));
    reader.set_reserves(pool, Wad::from_units(1), Wad::from_units(1));

    registry
        .process_event(&envelope(
            1,
            0,
            T0,
            EventPayload::Swap {
                pool,
                token_in: token_a,
                token_out: token_b,
                amount_in: Wad::from_units(10),
                amount_out: Wad::from_units(10),
            },
        ))
        .await?;

    assert!(store.candle_singleton(token_a, Resolution::M1)?.is_none());
    assert!(store.candle_singleton(token_b, Resolution::M1)?.is_none());
    assert!(store.pool(pool)?.is_some());

    Ok(())
}

#[tokio::test]
async fn test_oracle_update_feeds_oracle_track_only() -> Result<()> {
    let (store, _reader, mut registry) = setup();
    let instrument = addr(0xaa);

    registry
        .process_event(&envelope(
            1,
            0,
            T0,
            EventPayload::OraclePrice {
                token: instrument,
                price: Wad::from_units(42),
            },
        ))
        .await?;

    let singleton = store.candle_singleton(instrument, Resolution::H1)?.unwrap();
    assert_eq!(singleton.close_oracle, Wad::from_units(42));
    assert_eq!(singleton.close, Wad::ZERO);
    assert_eq!(singleton.volume, Wad::ZERO);

    Ok(())
}

#[tokio::test]
async fn test_reserve_withdraw_requires_registration() -> Result<()> {
    let (_store, _reader, mut registry) = setup();

    let err = registry
        .process_event(&envelope(
            1,
            0,
            T0,
            EventPayload::ReserveWithdraw {
                token: addr(0xaa),
                amount: Wad::from_units(1),
            },
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, IndexerError::MissingEntity { .. }));

    Ok(())
}

#[tokio::test]
async fn test_collateral_lifecycle_through_events() -> Result<()> {
    let (store, reader, mut registry) = setup();
    let collateral = addr(0xaa);
    let underlying = addr(0xab);
    reader.set_price(underlying, Wad::from_units(2_000));
    reader.set_balance(underlying, collateral, Wad::from_units(10));

    registry
        .process_event(&envelope(
            1,
            0,
            T0,
            EventPayload::CollateralRegistered {
                token: collateral,
                underlying,
            },
        ))
        .await?;

    // A later withdrawal re-reads the shrunken reserve.
    reader.set_balance(underlying, collateral, Wad::from_units(6));
    registry
        .process_event(&envelope(
            2,
            0,
            T0 + 60,
            EventPayload::ReserveWithdraw {
                token: collateral,
                amount: Wad::from_units(4),
            },
        ))
        .await?;

    let meta = store.collateral_token(collateral)?.unwrap();
    assert_eq!(meta.total_reserve, Wad::from_units(6));
    assert_eq!(meta.reserve_usd, Wad::from_units(12_000));

    // The daily ledger keeps the day's high watermark.
    let chunk = store
        .daily_chunk(meridian_indexer::core::DailySeries::ReserveUsd, 0)?
        .unwrap();
    assert_eq!(chunk.value, Wad::from_units(20_000));

    Ok(())
}

#[tokio::test]
async fn test_staking_events_update_registry() -> Result<()> {
    let (store, reader, mut registry) = setup();
    let pool = addr(0xda);
    let staking_token = addr(0xdb);
    let reward_token = addr(0xdc);
    reader.set_staked_total(pool, Wad::from_units(100));
    reader.set_reward_rate(pool, Wad::from_units(3));
    reader.set_period_finish(pool, T0 + 604_800);

    registry
        .process_event(&envelope(
            1,
            0,
            T0,
            EventPayload::StakingDeposit {
                pool,
                staking_token,
                amount: Wad::from_units(100),
            },
        ))
        .await?;
    registry
        .process_event(&envelope(
            2,
            0,
            T0 + 30,
            EventPayload::RewardNotified {
                pool,
                reward_token,
                amount: Wad::from_units(1_000),
            },
        ))
        .await?;

    let entry = store.staking_pool(pool)?.unwrap();
    assert_eq!(entry.total_staked, Wad::from_units(100));
    assert_eq!(entry.deposit_volume_total, Wad::from_units(100));

    let reward = store.staking_reward(pool, reward_token)?.unwrap();
    assert_eq!(reward.reward_rate, Wad::from_units(3));
    assert_eq!(reward.period_finish, T0 + 604_800);

    Ok(())
}

#[tokio::test]
async fn test_event_time_regression_is_fatal() -> Result<()> {
    let (_store, _reader, mut registry) = setup();
    let instrument = addr(0xaa);

    registry
        .process_event(&envelope(
            2,
            0,
            T0,
            EventPayload::OraclePrice {
                token: instrument,
                price: Wad::ONE,
            },
        ))
        .await?;

    let err = registry
        .process_event(&envelope(
            1,
            0,
            T0 - 1,
            EventPayload::OraclePrice {
                token: instrument,
                price: Wad::ONE,
            },
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, IndexerError::TimeRegression { .. }));

    Ok(())
}

#[tokio::test]
async fn test_replaying_an_event_is_idempotent() -> Result<()> {
    let (store, reader, mut registry) = setup();
    let instrument = addr(0xaa);
    reader.set_total_supply(instrument, Wad::from_units(9_000));
    reader.set_price(instrument, Wad::from_units(2));

    let event = envelope(
        1,
        0,
        T0,
        EventPayload::Transfer {
            token: instrument,
            from: Address::ZERO,
            to: addr(0xfe),
            amount: Wad::from_units(5),
        },
    );

    registry.process_event(&event).await?;
    let first = store.token(instrument)?.unwrap();
    let first_average = store.rolling_average(first.supply_series)?.unwrap();

    // At-least-once delivery: the retried event recomputes to the same
    // state.
    registry.process_event(&event).await?;

    assert_eq!(store.token(instrument)?.unwrap(), first);
    assert_eq!(
        store.rolling_average(first.supply_series)?.unwrap(),
        first_average
    );

    Ok(())
}
