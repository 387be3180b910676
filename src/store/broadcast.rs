//! Store Update Broadcaster
//!
//! Explicit observer channel for the token view store. UI widgets (chart,
//! trade tape, order panel) subscribe and re-read the store when an update
//! that concerns them arrives.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::types::{
    Candle, ConnectionStatus, PendingOrder, Position, Timeframe, TokenTrade,
};

/// Update notifications emitted after each store mutation
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreUpdate {
    /// Current token switched (None = view cleared)
    TokenChanged { address: Option<String> },
    /// Token metadata replaced
    TokenInfoUpdated,
    /// Price tick applied
    PriceUpdated { price: f64, market_cap: f64 },
    /// Candle history replaced wholesale
    CandlesReplaced { count: usize },
    /// Single candle updated or appended
    CandleUpdated(Candle),
    /// Completed candle appended
    CandleClosed(Candle),
    /// Chart timeframe switched, candle state cleared
    TimeframeChanged(Timeframe),
    /// Trade prepended to the recent-trades tape
    TradeAdded(TokenTrade),
    /// Recent-trades tape replaced wholesale
    TradesReplaced { count: usize },
    /// Feed connection status changed
    ConnectionChanged(ConnectionStatus),
    /// Quote cached with its expiry stamp
    QuoteCached { valid_until_ms: i64 },
    /// Quote cleared or invalidated
    QuoteCleared,
    /// Order added or its status recorded
    OrderUpserted(PendingOrder),
    /// Order removed from the list
    OrderRemoved { id: String },
    /// All orders cleared
    OrdersCleared,
    /// Position upserted for a token
    PositionUpserted(Position),
    /// Position removed for a token
    PositionRemoved { token_address: String },
    /// Optimistic balance adjustment applied or rolled back
    BalanceAdjusted { total_delta: f64 },
    /// Full store reset
    Reset,
}

/// Channel for broadcasting store updates to all subscribers
#[derive(Debug, Clone)]
pub struct StoreBroadcaster {
    tx: broadcast::Sender<StoreUpdate>,
}

impl StoreBroadcaster {
    /// Create a new broadcaster with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to receive store updates
    pub fn subscribe(&self) -> broadcast::Receiver<StoreUpdate> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Broadcast an update to all subscribers
    pub fn publish(&self, update: StoreUpdate) {
        // Ignore send errors (no receivers is fine)
        let _ = self.tx.send(update);
    }
}

impl Default for StoreBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}
