//! Read-only projections over the token view store
//!
//! Selectors never mutate; UI widgets call them after an update
//! notification to derive what they render.

use crate::types::{Candle, ConnectionStatus};

use super::TokenViewStore;

/// Naive P&L over the visible candle window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisiblePnl {
    /// Last close minus first open, in the chart's denomination
    pub absolute: f64,
    /// Absolute P&L as a percentage of the first open
    pub percent: f64,
}

/// Latest candle: the in-progress candle if one exists, else the history tail
pub fn select_latest_candle(store: &TokenViewStore) -> Option<&Candle> {
    store.current_candle().or_else(|| store.candles().last())
}

/// Last close minus first open across the candle buffer
///
/// Naive by design: the window is whatever history the store holds, not a
/// session-anchored range. Returns None with no candle data at all.
pub fn select_visible_pnl(store: &TokenViewStore) -> Option<VisiblePnl> {
    let latest = select_latest_candle(store)?;
    let first = store.candles().first().unwrap_or(latest);

    let absolute = latest.close - first.open;
    let percent = if first.open != 0.0 {
        (absolute / first.open) * 100.0
    } else {
        0.0
    };
    Some(VisiblePnl { absolute, percent })
}

/// Whether the feed connection is up
pub fn select_is_connected(store: &TokenViewStore) -> bool {
    store.ws_status() == ConnectionStatus::Connected
}

/// Whether any order is still in a non-terminal state
pub fn select_has_pending_orders(store: &TokenViewStore) -> bool {
    store.pending_orders().iter().any(|o| !o.status.is_terminal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderSide, OrderStatus, OrderType, PendingOrder};

    fn make_candle(time: i64, open: f64, close: f64, is_closed: bool) -> Candle {
        Candle {
            time,
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 10.0,
            trade_count: 1,
            is_closed,
        }
    }

    #[test]
    fn test_latest_candle_prefers_in_progress() {
        let mut store = TokenViewStore::default();
        store.update_candle(make_candle(100, 1.0, 2.0, true));
        assert_eq!(select_latest_candle(&store).unwrap().time, 100);

        store.update_candle(make_candle(160, 2.0, 2.5, false));
        let latest = select_latest_candle(&store).unwrap();
        assert_eq!(latest.time, 160);
        assert!(!latest.is_closed);
    }

    #[test]
    fn test_latest_candle_none_when_empty() {
        let store = TokenViewStore::default();
        assert!(select_latest_candle(&store).is_none());
    }

    #[test]
    fn test_visible_pnl_last_close_minus_first_open() {
        let mut store = TokenViewStore::default();
        store.update_candle(make_candle(100, 2.0, 2.2, true));
        store.update_candle(make_candle(160, 2.2, 2.6, true));
        store.update_candle(make_candle(220, 2.6, 3.0, false));

        let pnl = select_visible_pnl(&store).unwrap();
        assert!((pnl.absolute - 1.0).abs() < 1e-12);
        assert!((pnl.percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_visible_pnl_zero_open_has_zero_percent() {
        let mut store = TokenViewStore::default();
        store.update_candle(make_candle(100, 0.0, 0.5, false));

        let pnl = select_visible_pnl(&store).unwrap();
        assert_eq!(pnl.absolute, 0.5);
        assert_eq!(pnl.percent, 0.0);
    }

    #[test]
    fn test_visible_pnl_none_without_candles() {
        let store = TokenViewStore::default();
        assert!(select_visible_pnl(&store).is_none());
    }

    #[test]
    fn test_is_connected() {
        let mut store = TokenViewStore::default();
        assert!(!select_is_connected(&store));
        store.set_ws_status(ConnectionStatus::Connected);
        assert!(select_is_connected(&store));
        store.set_ws_status(ConnectionStatus::Error);
        assert!(!select_is_connected(&store));
    }

    #[test]
    fn test_has_pending_orders_ignores_terminal() {
        let mut store = TokenViewStore::default();
        assert!(!select_has_pending_orders(&store));

        let mut order = PendingOrder::new(OrderType::Market, OrderSide::Buy, 1.0, None);
        order.id = "o1".to_string();
        store.add_pending_order(order);
        assert!(select_has_pending_orders(&store));

        store.update_order_status("o1", OrderStatus::Filled, Some("tx123"), None);
        assert!(!select_has_pending_orders(&store));
    }
}
