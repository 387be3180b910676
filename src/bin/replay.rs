//! Synthetic feed replay
//!
//! Usage: cargo run --bin replay
//!
//! Drives a token view store from a generated feed session and logs the
//! resulting state. Useful for eyeballing candle/trade bookkeeping and the
//! update broadcast without a live feed connection.

use tokenview::config::StoreConfig;
use tokenview::feed::{apply_feed_event, FeedEvent};
use tokenview::store::selectors;
use tokenview::types::{
    now_ms, Candle, ConnectionStatus, OrderSide, OrderType, PendingOrder, TokenTrade, TradeVenue,
};
use tokenview::TokenViewStore;
use tracing::info;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = StoreConfig::load()?;
    info!("config: {}", config);

    let mut store = TokenViewStore::new(&config);
    let mut updates = store.subscribe();

    store.set_token(Some("TokenViewDemo1111111111111111111111111111"));
    apply_feed_event(
        &mut store,
        FeedEvent::Status {
            status: ConnectionStatus::Connected,
        },
    );

    // Walk a price from 1.0 across a few candle buckets
    let tf_secs = config.default_timeframe().duration_secs() as i64;
    let start = now_ms() / 1000 - 10 * tf_secs;
    let mut price = 1.0;
    for bucket in 0..10 {
        let time = config.default_timeframe().bucket_start(start + bucket * tf_secs);
        let open = price;
        for step in 0..4 {
            price *= 1.0 + 0.003 * ((bucket + step) % 3) as f64 - 0.002;
            let is_closed = step == 3;
            apply_feed_event(
                &mut store,
                FeedEvent::CandleUpdate {
                    data: Candle {
                        time,
                        open,
                        high: open.max(price),
                        low: open.min(price),
                        close: price,
                        volume: 250.0 + 25.0 * step as f64,
                        trade_count: (step + 1) as u64,
                        is_closed,
                    },
                },
            );
        }
        apply_feed_event(
            &mut store,
            FeedEvent::Trade {
                data: TokenTrade {
                    signature: format!("replay-sig-{bucket}"),
                    timestamp: (start + bucket * tf_secs) * 1000,
                    side: if bucket % 2 == 0 {
                        OrderSide::Buy
                    } else {
                        OrderSide::Sell
                    },
                    token_amount: 1_000.0,
                    quote_amount: price * 1_000.0,
                    price,
                    market_cap: price * 1_000_000_000.0,
                    trader: "replay-wallet".to_string(),
                    venue: TradeVenue::Pump,
                },
            },
        );
    }

    // One order through its lifecycle
    let order = PendingOrder::new(OrderType::Market, OrderSide::Buy, 5_000.0, None);
    let order_id = order.id.clone();
    store.add_pending_order(order);
    store.update_order_status(
        &order_id,
        tokenview::types::OrderStatus::Submitted,
        None,
        None,
    );
    store.update_order_status(
        &order_id,
        tokenview::types::OrderStatus::Filled,
        Some("replay-tx-1"),
        None,
    );

    info!(
        candles = store.candles().len(),
        trades = store.recent_trades().len(),
        price = store.current_price(),
        "replay complete"
    );
    if let Some(pnl) = selectors::select_visible_pnl(&store) {
        info!(
            absolute = format!("{:+.6}", pnl.absolute),
            percent = format!("{:+.2}%", pnl.percent),
            "visible window P&L"
        );
    }
    info!(
        connected = selectors::select_is_connected(&store),
        pending_orders = selectors::select_has_pending_orders(&store),
        "final flags"
    );

    // Drain the broadcast backlog to show what subscribers saw
    let mut received = 0usize;
    while let Ok(update) = updates.try_recv() {
        received += 1;
        tracing::debug!(?update, "store update");
    }
    info!(received, "broadcast updates observed");

    Ok(())
}
