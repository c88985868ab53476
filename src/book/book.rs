//! Per-symbol order book: two trackers, statistics, and the processing
//! pipeline.
//!
//! Each book is mutated by exactly one worker thread; the scheduler routes
//! every order for a symbol to the same worker, so nothing in here takes a
//! lock. Exclusivity is expressed in the type system: all mutation goes
//! through `&mut self`, and the registry wraps each book in a mutex that only
//! the owning worker ever locks (uncontended by the scheduling invariant).

use super::tracker::OrderTracker;
use super::trade::{ExecutionReport, TradeListener};
use crate::orders::{Order, OrderId, OrderStatus, Price, Quantity, Side, Symbol};
use crate::pipeline::{Pipeline, ProcessingContext};
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

/// Counters tracked per book. Thread-confined alongside the book, so plain
/// fields suffice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookStats {
    /// Orders handed to `process_order`.
    pub orders_added: u64,
    /// Orders cancelled through `cancel_order`.
    pub orders_cancelled: u64,
    /// Incoming orders that finished `Fulfilled`.
    pub orders_fulfilled: u64,
    /// Sum of open quantities of all processed orders.
    pub total_volume: u64,
    /// Individual executions produced by matching.
    pub total_trades: u64,
    /// Price of the most recent execution.
    pub last_trade_price: Option<Price>,
}

impl BookStats {
    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = BookStats::default();
    }
}

impl fmt::Display for BookStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ orders_added={}, orders_cancelled={}, orders_fulfilled={}, total_volume={}, total_trades={} }}",
            self.orders_added,
            self.orders_cancelled,
            self.orders_fulfilled,
            self.total_volume,
            self.total_trades
        )
    }
}

/// Aggregate view of one price level, used in depth snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelSnapshot {
    /// Level price.
    pub price: Price,
    /// Total open quantity resting at the level.
    pub quantity: Quantity,
    /// Number of resting orders at the level.
    pub order_count: u64,
}

/// Point-in-time depth view of a book, best prices first on both sides.
#[derive(Debug, Clone, Serialize)]
pub struct BookSnapshot {
    /// Symbol of the book.
    pub symbol: Symbol,
    /// Bid levels, highest price first.
    pub bids: Vec<LevelSnapshot>,
    /// Ask levels, lowest price first.
    pub asks: Vec<LevelSnapshot>,
}

/// One symbol's order book.
pub struct OrderBook {
    symbol: Symbol,
    bids: OrderTracker,
    asks: OrderTracker,
    stats: BookStats,
    pipeline: Pipeline,
    trade_listener: Option<TradeListener>,
}

impl OrderBook {
    /// Create an empty book for `symbol` with the standard pipeline.
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: OrderTracker::new(Side::Buy),
            asks: OrderTracker::new(Side::Sell),
            stats: BookStats::default(),
            pipeline: Pipeline::standard(),
            trade_listener: None,
        }
    }

    /// Symbol this book trades.
    #[inline]
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Statistics accumulated so far.
    pub fn stats(&self) -> &BookStats {
        &self.stats
    }

    /// Reset the statistics counters.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Install a callback invoked after every processed order.
    pub fn set_trade_listener(&mut self, listener: TradeListener) {
        self.trade_listener = Some(listener);
    }

    /// Tracker for one side of the book.
    pub fn tracker(&self, side: Side) -> &OrderTracker {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Highest resting bid price.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Lowest resting ask price.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Depth snapshot with levels in best-first order on both sides.
    pub fn snapshot(&self) -> BookSnapshot {
        let collect = |tracker: &OrderTracker| {
            tracker
                .levels()
                .map(|level| LevelSnapshot {
                    price: level.price(),
                    quantity: level.total_quantity(),
                    order_count: level.order_count(),
                })
                .collect()
        };
        BookSnapshot {
            symbol: self.symbol.clone(),
            bids: collect(&self.bids),
            asks: collect(&self.asks),
        }
    }

    /// Process one incoming order: run it through the pipeline against the
    /// opposite side, then rest the remainder or consume the order.
    ///
    /// Must be called on the book's owning worker thread; no lock is taken
    /// here.
    pub fn process_order(&mut self, mut order: Order) -> ExecutionReport {
        self.stats.orders_added += 1;
        self.stats.total_volume += order.open_quantity();
        trace!(
            symbol = %self.symbol,
            order_id = order.id(),
            side = %order.side(),
            quantity = order.open_quantity(),
            "processing order"
        );

        let opposite_tracker = match order.side() {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };

        let mut ctx = ProcessingContext::new(&mut order, opposite_tracker);
        self.pipeline.process(&mut ctx);
        let matches = std::mem::take(&mut ctx.matches);
        let abort_reason = ctx.abort_reason.take();
        drop(ctx);

        // An aborted run must never rest the order (its condition was not
        // trustworthy); it finalizes to a terminal status instead.
        if abort_reason.is_some() && !order.status().is_terminal() {
            debug!(
                symbol = %self.symbol,
                order_id = order.id(),
                reason = abort_reason.as_deref().unwrap_or(""),
                "pipeline aborted, cancelling order"
            );
            order.set_status(OrderStatus::Cancelled);
        }

        self.stats.total_trades += matches.trades.len() as u64;
        if let Some(last) = matches.trades.last() {
            self.stats.last_trade_price = Some(last.price);
        }
        if order.status() == OrderStatus::Fulfilled {
            self.stats.orders_fulfilled += 1;
        }

        let report = ExecutionReport {
            order_id: order.id(),
            symbol: self.symbol.clone(),
            side: order.side(),
            status: order.status(),
            open_quantity: order.open_quantity(),
            executed_quantity: matches.executed_quantity(),
            trades: matches.trades,
            abort_reason,
        };

        if !order.status().is_terminal() {
            let tracker = match order.side() {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            tracker.add_order(order);
        }

        if let Some(listener) = &self.trade_listener {
            listener(&report);
        }

        report
    }

    /// Cancel a resting order by id, searching both sides.
    ///
    /// Returns the removed order with its status settled to `Cancelled` (or
    /// `PartialFillCancelled` when it had fills).
    pub fn cancel_order(&mut self, order_id: OrderId) -> Option<Order> {
        let mut order = self
            .bids
            .remove_order(order_id)
            .or_else(|| self.asks.remove_order(order_id))?;

        let status = if order.open_quantity() < order.quantity() {
            OrderStatus::PartialFillCancelled
        } else {
            OrderStatus::Cancelled
        };
        order.set_status(status);
        self.stats.orders_cancelled += 1;
        debug!(symbol = %self.symbol, order_id, status = %status, "order cancelled");
        Some(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{NoOpValidator, TimeInForce};

    fn limit(id: u64, side: Side, quantity: u64, price: i64) -> Order {
        Order::limit_with(
            id,
            side,
            quantity,
            "TSLA".into(),
            price,
            &NoOpValidator,
            TimeInForce::DAY,
        )
        .unwrap()
    }

    fn market(id: u64, side: Side, quantity: u64) -> Order {
        Order::market_with(id, side, quantity, "TSLA".into(), &NoOpValidator, TimeInForce::DAY)
            .unwrap()
    }

    #[test]
    fn test_limit_crossing_rests_remainder() {
        let mut book = OrderBook::new("TSLA");
        book.process_order(limit(2, Side::Sell, 50, 17_400));
        let report = book.process_order(limit(1, Side::Buy, 100, 17_500));

        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].resting_order_id, 2);
        assert_eq!(report.trades[0].quantity, 50);
        assert_eq!(report.trades[0].price, 17_400);
        assert_eq!(report.status, OrderStatus::PartiallyFilled);
        assert_eq!(report.open_quantity, 50);
        assert_eq!(book.best_bid(), Some(17_500));
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn test_market_with_no_liquidity_cancels() {
        let mut book = OrderBook::new("TSLA");
        let report = book.process_order(market(20, Side::Buy, 50));

        assert!(report.trades.is_empty());
        assert_eq!(report.status, OrderStatus::Cancelled);
        assert_eq!(report.open_quantity, 50);
        assert_eq!(book.tracker(Side::Buy).order_count(), 0);
    }

    #[test]
    fn test_market_partial_fill_cancels_remainder() {
        let mut book = OrderBook::new("TSLA");
        book.process_order(limit(1, Side::Sell, 30, 100));
        let report = book.process_order(market(2, Side::Buy, 50));

        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].quantity, 30);
        assert_eq!(report.status, OrderStatus::PartialFillCancelled);
        assert_eq!(report.open_quantity, 20);
    }

    #[test]
    fn test_aborted_order_never_rests() {
        let mut book = OrderBook::new("TSLA");
        // Zero-price limit sneaks past the no-op validator; the pipeline's
        // validation stage aborts it and the book must not rest it.
        let report = book.process_order(limit(1, Side::Buy, 10, 0));

        assert_eq!(report.status, OrderStatus::Cancelled);
        assert!(report.abort_reason.as_deref().unwrap().contains("Invalid limit price"));
        assert_eq!(book.tracker(Side::Buy).order_count(), 0);
    }

    #[test]
    fn test_stats_accumulate() {
        let mut book = OrderBook::new("TSLA");
        book.process_order(limit(1, Side::Sell, 50, 100));
        book.process_order(limit(2, Side::Buy, 50, 100));

        let stats = book.stats();
        assert_eq!(stats.orders_added, 2);
        assert_eq!(stats.total_volume, 100);
        assert_eq!(stats.total_trades, 1);
        assert_eq!(stats.orders_fulfilled, 1);
        assert_eq!(stats.last_trade_price, Some(100));
    }

    #[test]
    fn test_cancel_resting_order() {
        let mut book = OrderBook::new("TSLA");
        book.process_order(limit(1, Side::Sell, 50, 100));

        let cancelled = book.cancel_order(1).unwrap();
        assert_eq!(cancelled.status(), OrderStatus::Cancelled);
        assert_eq!(book.best_ask(), None);
        assert_eq!(book.stats().orders_cancelled, 1);
        assert!(book.cancel_order(1).is_none());
    }

    #[test]
    fn test_cancel_partially_filled_order() {
        let mut book = OrderBook::new("TSLA");
        book.process_order(limit(1, Side::Sell, 50, 100));
        book.process_order(limit(2, Side::Buy, 20, 100));

        let cancelled = book.cancel_order(1).unwrap();
        assert_eq!(cancelled.status(), OrderStatus::PartialFillCancelled);
        assert_eq!(cancelled.open_quantity(), 30);
    }

    #[test]
    fn test_trade_listener_sees_reports() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU64, Ordering};

        let seen = Arc::new(AtomicU64::new(0));
        let seen_in_listener = Arc::clone(&seen);

        let mut book = OrderBook::new("TSLA");
        book.set_trade_listener(Arc::new(move |report: &ExecutionReport| {
            seen_in_listener.fetch_add(report.executed_quantity, Ordering::Relaxed);
        }));

        book.process_order(limit(1, Side::Sell, 50, 100));
        book.process_order(limit(2, Side::Buy, 20, 100));
        assert_eq!(seen.load(Ordering::Relaxed), 20);
    }

    #[test]
    fn test_snapshot_orders_levels_best_first() {
        let mut book = OrderBook::new("TSLA");
        book.process_order(limit(1, Side::Sell, 10, 102));
        book.process_order(limit(2, Side::Sell, 10, 101));
        book.process_order(limit(3, Side::Buy, 10, 99));
        book.process_order(limit(4, Side::Buy, 10, 98));

        let snapshot = book.snapshot();
        assert_eq!(snapshot.symbol, "TSLA");
        assert_eq!(snapshot.asks[0].price, 101);
        assert_eq!(snapshot.asks[1].price, 102);
        assert_eq!(snapshot.bids[0].price, 99);
        assert_eq!(snapshot.bids[1].price, 98);
        // Snapshots serialize for logging and diagnostics.
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"symbol\":\"TSLA\""));
    }
}
