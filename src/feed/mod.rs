//! Feed event vocabulary and dispatch
//!
//! The price/WebSocket feed is an external collaborator; this module owns
//! the typed event set it pushes and the glue that applies each event to a
//! [`TokenViewStore`]. The network client itself (connect, resubscribe,
//! backoff) lives outside the crate and consumes the staleness predicate
//! exposed here.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::store::TokenViewStore;
use crate::types::{now_ms, Candle, ConnectionStatus, TokenInfo, TokenTrade};

/// Feed decode error
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid feed event: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Events pushed by the real-time feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum FeedEvent {
    /// Price tick for the viewed token
    #[serde(rename = "price_tick")]
    PriceTick {
        price: f64,
        #[serde(default)]
        market_cap: Option<f64>,
        ts: i64,
    },
    /// Executed trade on the viewed token
    #[serde(rename = "trade")]
    Trade { data: TokenTrade },
    /// In-progress or closing candle for the subscribed timeframe
    #[serde(rename = "candle_update")]
    CandleUpdate { data: Candle },
    /// Finalized candle for the subscribed timeframe
    #[serde(rename = "candle_closed")]
    CandleClosed { data: Candle },
    /// Refreshed token metadata snapshot
    #[serde(rename = "token_info")]
    TokenInfo { data: TokenInfo },
    /// Keep-alive
    #[serde(rename = "heartbeat")]
    Heartbeat { ts: i64 },
    /// Connection status asserted by the feed client
    #[serde(rename = "status")]
    Status { status: ConnectionStatus },
}

/// Decode a feed event from its JSON wire form
pub fn parse_feed_event(json: &str) -> Result<FeedEvent, FeedError> {
    Ok(serde_json::from_str(json)?)
}

/// Apply a feed event to the store
///
/// Every event stamps the heartbeat; staleness detection only cares that
/// the feed said *something*.
pub fn apply_feed_event(store: &mut TokenViewStore, event: FeedEvent) {
    apply_feed_event_at(store, event, now_ms());
}

pub fn apply_feed_event_at(store: &mut TokenViewStore, event: FeedEvent, now_ms: i64) {
    store.update_ws_heartbeat_at(now_ms);
    match event {
        FeedEvent::PriceTick {
            price, market_cap, ..
        } => store.update_price(price, market_cap),
        FeedEvent::Trade { data } => store.add_trade(data),
        FeedEvent::CandleUpdate { data } => store.update_candle(data),
        FeedEvent::CandleClosed { data } => store.add_completed_candle(data),
        FeedEvent::TokenInfo { data } => store.set_token_info(Some(data)),
        FeedEvent::Heartbeat { ts } => {
            debug!(ts, "feed heartbeat");
        }
        FeedEvent::Status { status } => store.set_ws_status(status),
    }
}

/// Whether the feed has been silent past the staleness threshold
///
/// A store that never saw a message is stale; reconnect logic treats that
/// the same as a dropped connection.
pub fn is_feed_stale(store: &TokenViewStore, now_ms: i64, timeout_ms: i64) -> bool {
    let last = store.last_message_ms();
    last == 0 || now_ms - last >= timeout_ms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderSide, TradeVenue};

    #[test]
    fn test_parse_price_tick() {
        let event = parse_feed_event(
            r#"{"type":"price_tick","price":0.0042,"market_cap":4200000.0,"ts":1700000000000}"#,
        )
        .unwrap();
        match event {
            FeedEvent::PriceTick {
                price, market_cap, ..
            } => {
                assert_eq!(price, 0.0042);
                assert_eq!(market_cap, Some(4_200_000.0));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_price_tick_without_market_cap() {
        let event =
            parse_feed_event(r#"{"type":"price_tick","price":1.5,"ts":1700000000000}"#).unwrap();
        assert!(matches!(
            event,
            FeedEvent::PriceTick {
                market_cap: None,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_trade() {
        let json = r#"{
            "type": "trade",
            "data": {
                "signature": "sig1",
                "timestamp": 1700000000000,
                "side": "buy",
                "token_amount": 1000.0,
                "quote_amount": 5.0,
                "price": 0.005,
                "market_cap": 5000000.0,
                "trader": "trader1",
                "venue": "pump"
            }
        }"#;
        match parse_feed_event(json).unwrap() {
            FeedEvent::Trade { data } => {
                assert_eq!(data.signature, "sig1");
                assert_eq!(data.side, OrderSide::Buy);
                assert_eq!(data.venue, TradeVenue::Pump);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_candle_update() {
        let json = r#"{
            "type": "candle_update",
            "data": {
                "time": 1700000040,
                "open": 1.0, "high": 1.2, "low": 0.9, "close": 1.1,
                "volume": 300.0, "trade_count": 12, "is_closed": false
            }
        }"#;
        match parse_feed_event(json).unwrap() {
            FeedEvent::CandleUpdate { data } => {
                assert_eq!(data.time, 1_700_000_040);
                assert!(!data.is_closed);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        assert!(parse_feed_event(r#"{"type":"orderbook","data":{}}"#).is_err());
        assert!(parse_feed_event("not json").is_err());
    }

    #[test]
    fn test_dispatch_matches_direct_action() {
        let mut via_feed = TokenViewStore::default();
        let mut direct = TokenViewStore::default();
        let now = 1_700_000_000_000;

        apply_feed_event_at(
            &mut via_feed,
            FeedEvent::PriceTick {
                price: 2.5,
                market_cap: Some(2.5e6),
                ts: now,
            },
            now,
        );
        direct.update_price(2.5, Some(2.5e6));

        assert_eq!(via_feed.current_price(), direct.current_price());
        assert_eq!(via_feed.market_cap(), direct.market_cap());
    }

    #[test]
    fn test_dispatch_candle_close_clears_current() {
        let mut store = TokenViewStore::default();
        let now = 1_700_000_000_000;
        let mut candle = Candle {
            time: 100,
            open: 1.0,
            high: 1.2,
            low: 0.9,
            close: 1.1,
            volume: 10.0,
            trade_count: 3,
            is_closed: false,
        };
        apply_feed_event_at(
            &mut store,
            FeedEvent::CandleUpdate {
                data: candle.clone(),
            },
            now,
        );
        assert!(store.current_candle().is_some());

        candle.is_closed = true;
        candle.close = 1.15;
        apply_feed_event_at(&mut store, FeedEvent::CandleUpdate { data: candle }, now);
        assert!(store.current_candle().is_none());
        assert_eq!(store.current_price(), 1.15);
    }

    #[test]
    fn test_status_event_sets_connection() {
        let mut store = TokenViewStore::default();
        apply_feed_event_at(
            &mut store,
            FeedEvent::Status {
                status: ConnectionStatus::Connected,
            },
            1,
        );
        assert_eq!(store.ws_status(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_every_event_stamps_heartbeat() {
        let mut store = TokenViewStore::default();
        assert_eq!(store.last_message_ms(), 0);

        apply_feed_event_at(&mut store, FeedEvent::Heartbeat { ts: 42 }, 1_000);
        assert_eq!(store.last_message_ms(), 1_000);

        apply_feed_event_at(
            &mut store,
            FeedEvent::PriceTick {
                price: 1.0,
                market_cap: None,
                ts: 43,
            },
            2_000,
        );
        assert_eq!(store.last_message_ms(), 2_000);
    }

    #[test]
    fn test_staleness_threshold() {
        let mut store = TokenViewStore::default();
        // Never heard from the feed: stale
        assert!(is_feed_stale(&store, 10_000, 15_000));

        store.update_ws_heartbeat_at(10_000);
        assert!(!is_feed_stale(&store, 20_000, 15_000));
        assert!(is_feed_stale(&store, 25_000, 15_000));
    }
}
