//! TokenView Library
//!
//! In-memory state store for a live token view: price ticks, OHLCV candles,
//! recent trades, a short-lived swap quote, pending orders and positions.

pub mod config;
pub mod feed;
pub mod store;
pub mod types;

pub use store::{StoreBroadcaster, StoreUpdate, TokenViewStore};
