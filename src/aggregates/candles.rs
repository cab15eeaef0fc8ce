//! Multi-resolution candle ledger
//!
//! Every observation fans out to all configured resolutions
//! independently. An instrument with no activity across one or more spans
//! still produces a gapless history: rollover synthesizes flat
//! zero-volume candles carrying the previous close, trading storage for
//! query simplicity downstream.

use tracing::trace;

use crate::core::{Address, IndexerResult, Wad};
use crate::database::StoreManager;
use crate::models::{Candle, CandleSingleton, Resolution};

/// One observation against an instrument's candles. A call site may
/// supply any subset: price updates and volume updates arrive
/// independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeObservation {
    pub trade_price: Option<Wad>,
    pub oracle_price: Option<Wad>,
    pub volume: Option<Wad>,
}

/// Fold one observation into every resolution of `instrument`.
pub fn observe_trade(
    store: &StoreManager,
    instrument: Address,
    event_time: i64,
    observation: TradeObservation,
) -> IndexerResult<()> {
    for resolution in Resolution::ALL {
        observe_at_resolution(store, instrument, resolution, event_time, observation)?;
    }
    Ok(())
}

fn observe_at_resolution(
    store: &StoreManager,
    instrument: Address,
    resolution: Resolution,
    event_time: i64,
    observation: TradeObservation,
) -> IndexerResult<()> {
    let span = resolution.duration_secs();

    let Some(mut singleton) = store.candle_singleton(instrument, resolution)? else {
        // First sight of the instrument at this resolution.
        let mut singleton = CandleSingleton::opened_at(
            instrument,
            resolution,
            event_time,
            observation.trade_price.unwrap_or(Wad::ZERO),
            observation.oracle_price.unwrap_or(Wad::ZERO),
        );
        if let Some(volume) = observation.volume {
            singleton.volume = volume;
        }
        store.put_candle_singleton(&singleton)?;
        trace!(%instrument, %resolution, "candle series created");
        return Ok(());
    };

    let rolled = event_time - singleton.timestamp >= span;

    // Cascading rollover: archive the open bucket, then one flat
    // zero-volume candle per fully elapsed span. Both price tracks share
    // the singleton's clock.
    while event_time - singleton.timestamp >= span {
        store.push_candle(&Candle::from_singleton(&singleton))?;
        singleton.timestamp += span;
        singleton.open = singleton.close;
        singleton.high = singleton.close;
        singleton.low = singleton.close;
        singleton.open_oracle = singleton.close_oracle;
        singleton.high_oracle = singleton.close_oracle;
        singleton.low_oracle = singleton.close_oracle;
        singleton.volume = Wad::ZERO;
    }

    if let Some(price) = observation.trade_price {
        singleton.low = singleton.low.min(price);
        singleton.high = singleton.high.max(price);
        singleton.close = price;
    }
    if let Some(price) = observation.oracle_price {
        singleton.low_oracle = singleton.low_oracle.min(price);
        singleton.high_oracle = singleton.high_oracle.max(price);
        singleton.close_oracle = price;
    }
    if let Some(volume) = observation.volume {
        // A freshly rolled bucket was reset to zero, so the delta is the
        // bucket's whole volume; otherwise it accumulates.
        if rolled {
            singleton.volume = volume;
        } else {
            singleton.volume += volume;
        }
    }

    store.put_candle_singleton(&singleton)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use std::sync::Arc;

    fn store() -> StoreManager {
        StoreManager::new(Arc::new(MemoryStore::new()))
    }

    fn token() -> Address {
        "0x00000000000000000000000000000000000000aa".parse().unwrap()
    }

    const T0: i64 = 1_700_000_000;

    fn price_obs(units: u64) -> TradeObservation {
        TradeObservation {
            trade_price: Some(Wad::from_units(units)),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_observation_opens_all_resolutions() {
        let store = store();
        observe_trade(&store, token(), T0, price_obs(100)).unwrap();
        for resolution in Resolution::ALL {
            let s = store.candle_singleton(token(), resolution).unwrap().unwrap();
            assert_eq!(s.timestamp, T0);
            assert_eq!(s.open, Wad::from_units(100));
            assert_eq!(s.close, Wad::from_units(100));
            assert_eq!(s.volume, Wad::ZERO);
        }
    }

    #[test]
    fn test_in_span_update_clamps_high_low() {
        let store = store();
        observe_trade(&store, token(), T0, price_obs(100)).unwrap();
        observe_trade(&store, token(), T0 + 5, price_obs(130)).unwrap();
        observe_trade(&store, token(), T0 + 10, price_obs(90)).unwrap();

        let s = store.candle_singleton(token(), Resolution::H1).unwrap().unwrap();
        assert_eq!(s.open, Wad::from_units(100));
        assert_eq!(s.high, Wad::from_units(130));
        assert_eq!(s.low, Wad::from_units(90));
        assert_eq!(s.close, Wad::from_units(90));
    }

    #[test]
    fn test_volume_accumulates_within_span() {
        let store = store();
        let obs = TradeObservation {
            volume: Some(Wad::from_units(3)),
            ..Default::default()
        };
        observe_trade(&store, token(), T0, obs).unwrap();
        observe_trade(&store, token(), T0 + 5, obs).unwrap();
        let s = store.candle_singleton(token(), Resolution::H1).unwrap().unwrap();
        assert_eq!(s.volume, Wad::from_units(6));
    }

    #[test]
    fn test_rollover_emits_flat_fill_candles() {
        let store = store();
        observe_trade(&store, token(), T0, price_obs(100)).unwrap();
        // Next observation lands three 1-minute spans later.
        let span = Resolution::M1.duration_secs();
        observe_trade(&store, token(), T0 + 3 * span, price_obs(120)).unwrap();

        let history = store.candles(token(), Resolution::M1).unwrap();
        assert_eq!(history.len(), 3);
        // First closed candle is the real bucket; the following two are
        // flat zero-volume fills carrying the close.
        for row in &history {
            assert_eq!(row.open, Wad::from_units(100));
            assert_eq!(row.high, Wad::from_units(100));
            assert_eq!(row.low, Wad::from_units(100));
            assert_eq!(row.close, Wad::from_units(100));
            assert_eq!(row.volume, Wad::ZERO);
        }
        assert_eq!(history[0].timestamp, T0);
        assert_eq!(history[1].timestamp, T0 + span);
        assert_eq!(history[2].timestamp, T0 + 2 * span);

        // The new open bucket continues from that close.
        let s = store.candle_singleton(token(), Resolution::M1).unwrap().unwrap();
        assert_eq!(s.timestamp, T0 + 3 * span);
        assert_eq!(s.open, Wad::from_units(100));
        assert_eq!(s.close, Wad::from_units(120));
        assert_eq!(s.high, Wad::from_units(120));
        assert_eq!(s.low, Wad::from_units(100));
    }

    #[test]
    fn test_resolutions_roll_over_independently() {
        let store = store();
        observe_trade(&store, token(), T0, price_obs(100)).unwrap();
        // One hour later: 1m and 10m have rolled, 6h has not.
        observe_trade(&store, token(), T0 + 3_600, price_obs(110)).unwrap();

        assert_eq!(store.candles(token(), Resolution::M1).unwrap().len(), 60);
        assert_eq!(store.candles(token(), Resolution::M10).unwrap().len(), 6);
        assert_eq!(store.candles(token(), Resolution::H1).unwrap().len(), 1);
        assert!(store.candles(token(), Resolution::H6).unwrap().is_empty());
    }

    #[test]
    fn test_volume_only_after_rollover_sets_not_adds() {
        let store = store();
        let trade = TradeObservation {
            trade_price: Some(Wad::from_units(100)),
            volume: Some(Wad::from_units(50)),
            ..Default::default()
        };
        observe_trade(&store, token(), T0, trade).unwrap();

        let span = Resolution::H1.duration_secs();
        let volume_only = TradeObservation {
            volume: Some(Wad::from_units(7)),
            ..Default::default()
        };
        observe_trade(&store, token(), T0 + span, volume_only).unwrap();

        let s = store.candle_singleton(token(), Resolution::H1).unwrap().unwrap();
        assert_eq!(s.volume, Wad::from_units(7));
        // Price carried from the previous close.
        assert_eq!(s.open, Wad::from_units(100));
        assert_eq!(s.close, Wad::from_units(100));
    }

    #[test]
    fn test_oracle_track_updates_without_volume() {
        let store = store();
        let oracle = TradeObservation {
            oracle_price: Some(Wad::from_units(100)),
            ..Default::default()
        };
        observe_trade(&store, token(), T0, oracle).unwrap();
        let higher = TradeObservation {
            oracle_price: Some(Wad::from_units(140)),
            ..Default::default()
        };
        observe_trade(&store, token(), T0 + 5, higher).unwrap();

        let s = store.candle_singleton(token(), Resolution::H1).unwrap().unwrap();
        assert_eq!(s.high_oracle, Wad::from_units(140));
        assert_eq!(s.close_oracle, Wad::from_units(140));
        assert_eq!(s.volume, Wad::ZERO);
        // Trade track untouched.
        assert_eq!(s.close, Wad::ZERO);
    }
}
