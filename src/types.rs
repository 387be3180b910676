//! Core types used throughout TokenView
//!
//! Defines the data model for the live token view: token metadata, OHLCV
//! candles, trade ticks, swap-route quotes, pending orders and positions.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Current timestamp in milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Supported candle timeframes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    Sec1,
    Sec15,
    Min1,
    Min5,
    Min15,
    Hour1,
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Min1
    }
}

impl Timeframe {
    /// Get bucket duration in seconds
    pub fn duration_secs(&self) -> u64 {
        match self {
            Timeframe::Sec1 => 1,
            Timeframe::Sec15 => 15,
            Timeframe::Min1 => 60,
            Timeframe::Min5 => 5 * 60,
            Timeframe::Min15 => 15 * 60,
            Timeframe::Hour1 => 60 * 60,
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "1s" => Some(Timeframe::Sec1),
            "15s" => Some(Timeframe::Sec15),
            "1m" | "1min" => Some(Timeframe::Min1),
            "5m" | "5min" => Some(Timeframe::Min5),
            "15m" | "15min" => Some(Timeframe::Min15),
            "1h" | "1hour" => Some(Timeframe::Hour1),
            _ => None,
        }
    }

    /// Align a unix-seconds timestamp down to the start of its bucket
    pub fn bucket_start(&self, ts_secs: i64) -> i64 {
        let d = self.duration_secs() as i64;
        ts_secs - ts_secs.rem_euclid(d)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Sec1 => write!(f, "1s"),
            Timeframe::Sec15 => write!(f, "15s"),
            Timeframe::Min1 => write!(f, "1m"),
            Timeframe::Min5 => write!(f, "5m"),
            Timeframe::Min15 => write!(f, "15m"),
            Timeframe::Hour1 => write!(f, "1h"),
        }
    }
}

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    StopLoss,
    TakeProfit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "market"),
            OrderType::Limit => write!(f, "limit"),
            OrderType::StopLoss => write!(f, "stop_loss"),
            OrderType::TakeProfit => write!(f, "take_profit"),
        }
    }
}

/// Pending order lifecycle status
///
/// The store records whatever status callers assert; the
/// pending -> submitted -> {filled|cancelled|failed} ordering is enforced by
/// the order-submission service, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Submitted,
    Filled,
    Cancelled,
    Failed,
}

impl OrderStatus {
    /// Terminal statuses never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Failed
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Submitted => write!(f, "submitted"),
            OrderStatus::Filled => write!(f, "filled"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Feed connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        ConnectionStatus::Disconnected
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}

/// Venue a trade tick originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeVenue {
    Pump,
    Raydium,
    Jupiter,
    Unknown,
}

impl Default for TradeVenue {
    fn default() -> Self {
        TradeVenue::Unknown
    }
}

impl fmt::Display for TradeVenue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeVenue::Pump => write!(f, "pump"),
            TradeVenue::Raydium => write!(f, "raydium"),
            TradeVenue::Jupiter => write!(f, "jupiter"),
            TradeVenue::Unknown => write!(f, "unknown"),
        }
    }
}

/// Token metadata snapshot
///
/// Fetched wholesale when a token is selected and replaced on the next fetch.
/// Price-like fields are optional so a legitimate zero price is
/// distinguishable from a field the indexer did not return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Mint address
    pub address: String,
    /// Ticker symbol
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Token decimals
    pub decimals: u8,
    /// Circulating supply
    pub supply: f64,
    /// Last known price in quote currency
    pub price: Option<f64>,
    /// 24h price change in percent
    pub price_change_24h: Option<f64>,
    /// Market capitalization
    pub market_cap: Option<f64>,
    /// Pool liquidity
    pub liquidity: f64,
    /// 24h traded volume
    pub volume_24h: f64,
    /// Holder count
    pub holder_count: u64,
    /// Creation timestamp in milliseconds
    pub created_at: i64,
}

/// OHLCV candle for one timeframe bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start time (unix seconds, unique per timeframe)
    pub time: i64,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume in quote currency
    pub volume: f64,
    /// Number of trades in the bucket
    pub trade_count: u64,
    /// Whether the bucket is finished
    pub is_closed: bool,
}

/// Trade tick from the feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenTrade {
    /// Transaction signature (unique id)
    pub signature: String,
    /// Timestamp in milliseconds
    pub timestamp: i64,
    /// Buy or sell
    pub side: OrderSide,
    /// Amount in token units
    pub token_amount: f64,
    /// Amount in quote currency
    pub quote_amount: f64,
    /// Execution price
    pub price: f64,
    /// Market cap at time of trade
    pub market_cap: f64,
    /// Trader wallet address
    pub trader: String,
    /// Source venue
    #[serde(default)]
    pub venue: TradeVenue,
}

/// One hop of a swap route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    /// AMM or aggregator label
    pub venue: String,
    /// Input amount in base units
    pub in_amount: u64,
    /// Output amount in base units
    pub out_amount: u64,
    /// Fee amount in base units
    pub fee_amount: u64,
}

/// Swap-routing quote
///
/// Short-lived: the routing service reprices every second, so a quote is
/// only usable within the store's quote TTL window after it was cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapQuote {
    /// Input mint address
    pub input_mint: String,
    /// Output mint address
    pub output_mint: String,
    /// Input amount in base units
    pub in_amount: u64,
    /// Output amount in base units
    pub out_amount: u64,
    /// Price impact in percent
    pub price_impact_pct: f64,
    /// Slippage tolerance in basis points
    pub slippage_bps: u16,
    /// Route hops
    pub route_plan: Vec<RouteStep>,
}

/// User-initiated trade intent tracked through submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOrder {
    /// Unique order id
    pub id: String,
    /// Order type
    pub order_type: OrderType,
    /// Buy or sell
    pub side: OrderSide,
    /// Amount in token units
    pub amount: f64,
    /// Limit/trigger price, if the type carries one
    pub price: Option<f64>,
    /// Current lifecycle status
    pub status: OrderStatus,
    /// Creation timestamp in milliseconds
    pub created_at: i64,
    /// Transaction signature once submitted
    pub tx_signature: Option<String>,
    /// Error message if submission failed
    pub error: Option<String>,
}

impl PendingOrder {
    /// New pending order with a fresh uuid and the current timestamp
    pub fn new(order_type: OrderType, side: OrderSide, amount: f64, price: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            order_type,
            side,
            amount,
            price,
            status: OrderStatus::Pending,
            created_at: now_ms(),
            tx_signature: None,
            error: None,
        }
    }
}

/// Open position, at most one per token address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Token mint address (upsert key)
    pub token_address: String,
    /// Amount held in token units
    pub amount: f64,
    /// Average entry price
    pub avg_entry_price: f64,
    /// Last marked price
    pub current_price: f64,
    /// Unrealized P&L in quote currency
    pub unrealized_pnl: f64,
    /// Unrealized P&L in percent
    pub unrealized_pnl_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_parse_and_display() {
        assert_eq!(Timeframe::from_str("1m"), Some(Timeframe::Min1));
        assert_eq!(Timeframe::from_str("15M"), Some(Timeframe::Min15));
        assert_eq!(Timeframe::from_str("1h"), Some(Timeframe::Hour1));
        assert_eq!(Timeframe::from_str("2d"), None);
        assert_eq!(Timeframe::Sec15.to_string(), "15s");
    }

    #[test]
    fn test_timeframe_bucket_start() {
        assert_eq!(Timeframe::Min1.bucket_start(125), 120);
        assert_eq!(Timeframe::Min5.bucket_start(301), 300);
        assert_eq!(Timeframe::Hour1.bucket_start(3600), 3600);
    }

    #[test]
    fn test_order_status_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Submitted.is_terminal());
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
    }

    #[test]
    fn test_pending_order_defaults() {
        let order = PendingOrder::new(OrderType::Market, OrderSide::Buy, 10.0, None);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.tx_signature.is_none());
        assert!(order.error.is_none());
        assert!(!order.id.is_empty());
    }
}
