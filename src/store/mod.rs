//! Token View State Store
//!
//! Single source of truth for one live token view: price ticks, OHLCV
//! candles, recent trades, a short-lived swap quote, pending orders and
//! positions. All mutations are synchronous last-write-wins updates applied
//! in callback order; the store performs no I/O and no action can fail.
//! Feed disconnects, quote failures and order errors are recorded as data
//! (status/error fields) by the external collaborators that observe them.

pub mod broadcast;
pub mod selectors;

pub use broadcast::{StoreBroadcaster, StoreUpdate};

use std::collections::VecDeque;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::types::{
    now_ms, Candle, ConnectionStatus, OrderStatus, PendingOrder, Position, SwapQuote, Timeframe,
    TokenInfo, TokenTrade,
};

/// State store for the currently-viewed token
///
/// Token-scoped state (info, price, candles, trades, quote) is cleared when
/// the current token changes; orders and positions survive token switches.
#[derive(Debug)]
pub struct TokenViewStore {
    // Limits (from config, fixed for the store's lifetime)
    max_candles: usize,
    max_recent_trades: usize,
    quote_ttl_ms: i64,
    default_timeframe: Timeframe,

    // Token-scoped state
    token_address: Option<String>,
    token_info: Option<TokenInfo>,
    current_price: f64,
    market_cap: f64,
    price_change_24h: f64,
    timeframe: Timeframe,
    candles: Vec<Candle>,
    current_candle: Option<Candle>,
    recent_trades: VecDeque<TokenTrade>,
    cached_quote: Option<SwapQuote>,
    quote_expires_at_ms: i64,

    // Cross-token state
    ws_status: ConnectionStatus,
    last_message_ms: i64,
    pending_orders: Vec<PendingOrder>,
    positions: Vec<Position>,
    optimistic_balance_delta: f64,

    broadcaster: StoreBroadcaster,
}

impl TokenViewStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            max_candles: config.store.max_candles,
            max_recent_trades: config.store.max_recent_trades,
            quote_ttl_ms: config.store.quote_ttl_ms,
            default_timeframe: config.default_timeframe(),
            token_address: None,
            token_info: None,
            current_price: 0.0,
            market_cap: 0.0,
            price_change_24h: 0.0,
            timeframe: config.default_timeframe(),
            candles: Vec::new(),
            current_candle: None,
            recent_trades: VecDeque::new(),
            cached_quote: None,
            quote_expires_at_ms: 0,
            ws_status: ConnectionStatus::default(),
            last_message_ms: 0,
            pending_orders: Vec::new(),
            positions: Vec::new(),
            optimistic_balance_delta: 0.0,
            broadcaster: StoreBroadcaster::new(config.feed.broadcast_capacity),
        }
    }

    /// Subscribe to update notifications
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StoreUpdate> {
        self.broadcaster.subscribe()
    }

    // ── Read access ──────────────────────────────────────────────

    pub fn token_address(&self) -> Option<&str> {
        self.token_address.as_deref()
    }

    pub fn token_info(&self) -> Option<&TokenInfo> {
        self.token_info.as_ref()
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn market_cap(&self) -> f64 {
        self.market_cap
    }

    pub fn price_change_24h(&self) -> f64 {
        self.price_change_24h
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn current_candle(&self) -> Option<&Candle> {
        self.current_candle.as_ref()
    }

    pub fn recent_trades(&self) -> &VecDeque<TokenTrade> {
        &self.recent_trades
    }

    pub fn cached_quote(&self) -> Option<&SwapQuote> {
        self.cached_quote.as_ref()
    }

    pub fn quote_expires_at_ms(&self) -> i64 {
        self.quote_expires_at_ms
    }

    pub fn ws_status(&self) -> ConnectionStatus {
        self.ws_status
    }

    /// Timestamp of the last feed message, in milliseconds (0 = never)
    pub fn last_message_ms(&self) -> i64 {
        self.last_message_ms
    }

    pub fn pending_orders(&self) -> &[PendingOrder] {
        &self.pending_orders
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn optimistic_balance_delta(&self) -> f64 {
        self.optimistic_balance_delta
    }

    // ── Token selection ──────────────────────────────────────────

    /// Switch the viewed token
    ///
    /// Clears all token-scoped state (including any cached quote) when the
    /// address actually changes; a repeat of the current address is a no-op.
    pub fn set_token(&mut self, address: Option<&str>) {
        if self.token_address.as_deref() == address {
            return;
        }
        debug!(
            from = ?self.token_address,
            to = ?address,
            "switching token"
        );
        self.token_address = address.map(str::to_string);
        self.clear_token_scoped_state();
        self.broadcaster.publish(StoreUpdate::TokenChanged {
            address: self.token_address.clone(),
        });
    }

    /// Replace token metadata and seed price fields from it
    ///
    /// Fields the indexer did not return keep their previous values; a
    /// present zero is applied as-is (zero-price tokens are real during
    /// bonding-curve launches).
    pub fn set_token_info(&mut self, info: Option<TokenInfo>) {
        if let Some(ref info) = info {
            self.current_price = info.price.unwrap_or(self.current_price);
            self.market_cap = info.market_cap.unwrap_or(self.market_cap);
            self.price_change_24h = info.price_change_24h.unwrap_or(self.price_change_24h);
        }
        self.token_info = info;
        self.broadcaster.publish(StoreUpdate::TokenInfoUpdated);
    }

    /// Apply a price tick; market cap only updates when explicitly provided
    pub fn update_price(&mut self, price: f64, market_cap: Option<f64>) {
        self.current_price = price;
        if let Some(mc) = market_cap {
            self.market_cap = mc;
        }
        self.broadcaster.publish(StoreUpdate::PriceUpdated {
            price: self.current_price,
            market_cap: self.market_cap,
        });
    }

    // ── Candles ──────────────────────────────────────────────────

    /// Bulk-replace candle history; caller is responsible for ordering
    pub fn set_candles(&mut self, candles: Vec<Candle>) {
        self.candles = candles;
        self.broadcaster.publish(StoreUpdate::CandlesReplaced {
            count: self.candles.len(),
        });
    }

    /// Apply a live candle update from the feed
    ///
    /// A candle matching the tail bucket replaces it in place, a strictly
    /// newer one appends (trimmed to the candle cap). Older-than-tail input
    /// leaves the history untouched but still drives the current-candle and
    /// price channels.
    ///
    /// Both `current_price` and `market_cap` mirror the candle close: the
    /// chart is market-cap-denominated, so the feed's candle stream carries
    /// the market cap on the close channel. Intentional, not a bug.
    pub fn update_candle(&mut self, candle: Candle) {
        match self.candles.last().map(|c| c.time) {
            Some(tail_time) if tail_time == candle.time => {
                if let Some(last) = self.candles.last_mut() {
                    *last = candle.clone();
                }
            }
            Some(tail_time) if candle.time > tail_time => {
                self.candles.push(candle.clone());
                self.trim_candles();
            }
            Some(tail_time) => {
                debug!(
                    candle_time = candle.time,
                    tail_time,
                    "ignoring out-of-order candle for history"
                );
            }
            None => {
                self.candles.push(candle.clone());
            }
        }

        self.current_price = candle.close;
        self.market_cap = candle.close;
        self.current_candle = if candle.is_closed {
            None
        } else {
            Some(candle.clone())
        };
        self.broadcaster.publish(StoreUpdate::CandleUpdated(candle));
    }

    /// Append a completed candle, ignoring anything not strictly newer than
    /// the tail
    pub fn add_completed_candle(&mut self, mut candle: Candle) {
        if let Some(last) = self.candles.last() {
            if candle.time <= last.time {
                debug!(
                    candle_time = candle.time,
                    tail_time = last.time,
                    "ignoring stale completed candle"
                );
                return;
            }
        }
        candle.is_closed = true;
        self.candles.push(candle.clone());
        self.trim_candles();
        self.broadcaster.publish(StoreUpdate::CandleClosed(candle));
    }

    /// Switch chart timeframe and clear candle state; the caller is expected
    /// to resubscribe and refetch history for the new bucket size
    pub fn set_timeframe(&mut self, timeframe: Timeframe) {
        self.timeframe = timeframe;
        self.candles.clear();
        self.current_candle = None;
        self.broadcaster
            .publish(StoreUpdate::TimeframeChanged(timeframe));
    }

    fn trim_candles(&mut self) {
        if self.candles.len() > self.max_candles {
            let excess = self.candles.len() - self.max_candles;
            self.candles.drain(..excess);
        }
    }

    // ── Recent trades ────────────────────────────────────────────

    /// Prepend a trade to the tape, most-recent-first, capped
    pub fn add_trade(&mut self, trade: TokenTrade) {
        self.recent_trades.push_front(trade.clone());
        while self.recent_trades.len() > self.max_recent_trades {
            self.recent_trades.pop_back();
        }
        self.broadcaster.publish(StoreUpdate::TradeAdded(trade));
    }

    /// Bulk-replace the trade tape (e.g., from a history fetch)
    pub fn set_recent_trades(&mut self, trades: Vec<TokenTrade>) {
        self.recent_trades = trades.into_iter().collect();
        self.recent_trades.truncate(self.max_recent_trades);
        self.broadcaster.publish(StoreUpdate::TradesReplaced {
            count: self.recent_trades.len(),
        });
    }

    // ── Feed connection ──────────────────────────────────────────

    pub fn set_ws_status(&mut self, status: ConnectionStatus) {
        if self.ws_status != status {
            debug!(from = %self.ws_status, to = %status, "feed status change");
        }
        self.ws_status = status;
        self.broadcaster
            .publish(StoreUpdate::ConnectionChanged(status));
    }

    /// Stamp the last-message time; staleness detection over this stamp
    /// lives with the feed client, not here
    pub fn update_ws_heartbeat(&mut self) {
        self.update_ws_heartbeat_at(now_ms());
    }

    pub fn update_ws_heartbeat_at(&mut self, now_ms: i64) {
        self.last_message_ms = now_ms;
    }

    // ── Quote cache ──────────────────────────────────────────────

    /// Cache a routing quote, stamping its expiry at now + TTL
    pub fn set_cached_quote(&mut self, quote: Option<SwapQuote>) {
        self.set_cached_quote_at(quote, now_ms());
    }

    pub fn set_cached_quote_at(&mut self, quote: Option<SwapQuote>, now_ms: i64) {
        match quote {
            Some(q) => {
                self.quote_expires_at_ms = now_ms + self.quote_ttl_ms;
                self.cached_quote = Some(q);
                self.broadcaster.publish(StoreUpdate::QuoteCached {
                    valid_until_ms: self.quote_expires_at_ms,
                });
            }
            None => {
                self.cached_quote = None;
                self.quote_expires_at_ms = 0;
                self.broadcaster.publish(StoreUpdate::QuoteCleared);
            }
        }
    }

    /// Whether the cached quote is still inside its validity window
    pub fn is_quote_valid(&self) -> bool {
        self.is_quote_valid_at(now_ms())
    }

    pub fn is_quote_valid_at(&self, now_ms: i64) -> bool {
        self.cached_quote.is_some() && now_ms < self.quote_expires_at_ms
    }

    // ── Pending orders ───────────────────────────────────────────

    pub fn add_pending_order(&mut self, order: PendingOrder) {
        debug!(id = %order.id, order_type = %order.order_type, side = %order.side, "order added");
        self.pending_orders.push(order.clone());
        self.broadcaster.publish(StoreUpdate::OrderUpserted(order));
    }

    /// Record a status asserted by the order-submission service
    ///
    /// No legal-transition graph is enforced here; unknown ids are a no-op.
    pub fn update_order_status(
        &mut self,
        id: &str,
        status: OrderStatus,
        tx_signature: Option<&str>,
        error: Option<&str>,
    ) {
        let Some(order) = self.pending_orders.iter_mut().find(|o| o.id == id) else {
            warn!(id, %status, "status update for unknown order");
            return;
        };
        order.status = status;
        if let Some(sig) = tx_signature {
            order.tx_signature = Some(sig.to_string());
        }
        if let Some(err) = error {
            order.error = Some(err.to_string());
        }
        let order = order.clone();
        debug!(id, %status, "order status recorded");
        self.broadcaster.publish(StoreUpdate::OrderUpserted(order));
    }

    pub fn remove_pending_order(&mut self, id: &str) {
        let before = self.pending_orders.len();
        self.pending_orders.retain(|o| o.id != id);
        if self.pending_orders.len() < before {
            self.broadcaster
                .publish(StoreUpdate::OrderRemoved { id: id.to_string() });
        }
    }

    pub fn clear_pending_orders(&mut self) {
        self.pending_orders.clear();
        self.broadcaster.publish(StoreUpdate::OrdersCleared);
    }

    // ── Positions ────────────────────────────────────────────────

    /// Upsert the position for a token address (at most one per token)
    pub fn update_position(&mut self, position: Position) {
        self.positions
            .retain(|p| p.token_address != position.token_address);
        self.positions.push(position.clone());
        self.broadcaster
            .publish(StoreUpdate::PositionUpserted(position));
    }

    pub fn remove_position(&mut self, token_address: &str) {
        let before = self.positions.len();
        self.positions.retain(|p| p.token_address != token_address);
        if self.positions.len() < before {
            self.broadcaster.publish(StoreUpdate::PositionRemoved {
                token_address: token_address.to_string(),
            });
        }
    }

    // ── Optimistic balance ───────────────────────────────────────

    /// Apply a speculative balance adjustment for an in-flight trade
    ///
    /// Contract: at most one optimistic adjustment may be outstanding at a
    /// time, because rollback zeroes the accumulator rather than subtracting
    /// a specific delta.
    pub fn apply_optimistic_balance(&mut self, delta: f64) {
        self.optimistic_balance_delta += delta;
        self.broadcaster.publish(StoreUpdate::BalanceAdjusted {
            total_delta: self.optimistic_balance_delta,
        });
    }

    /// Discard any outstanding optimistic adjustment unconditionally
    pub fn rollback_optimistic_balance(&mut self) {
        self.optimistic_balance_delta = 0.0;
        self.broadcaster
            .publish(StoreUpdate::BalanceAdjusted { total_delta: 0.0 });
    }

    // ── Resets ───────────────────────────────────────────────────

    /// Restore the full initial state (limits and subscribers survive)
    pub fn reset(&mut self) {
        self.token_address = None;
        self.clear_token_scoped_state();
        self.timeframe = self.default_timeframe;
        self.ws_status = ConnectionStatus::default();
        self.last_message_ms = 0;
        self.pending_orders.clear();
        self.positions.clear();
        self.optimistic_balance_delta = 0.0;
        self.broadcaster.publish(StoreUpdate::Reset);
    }

    /// Clear candles/trades/quote for a feed resubscription to the same
    /// token, keeping identity, metadata, orders and positions
    pub fn reset_for_new_token(&mut self) {
        self.candles.clear();
        self.current_candle = None;
        self.recent_trades.clear();
        self.cached_quote = None;
        self.quote_expires_at_ms = 0;
        self.broadcaster
            .publish(StoreUpdate::CandlesReplaced { count: 0 });
        self.broadcaster
            .publish(StoreUpdate::TradesReplaced { count: 0 });
        self.broadcaster.publish(StoreUpdate::QuoteCleared);
    }

    fn clear_token_scoped_state(&mut self) {
        self.token_info = None;
        self.current_price = 0.0;
        self.market_cap = 0.0;
        self.price_change_24h = 0.0;
        self.candles.clear();
        self.current_candle = None;
        self.recent_trades.clear();
        self.cached_quote = None;
        self.quote_expires_at_ms = 0;
    }
}

impl Default for TokenViewStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}
