//! Trade records produced by matching, and the per-order execution report.

use crate::orders::{OrderId, OrderStatus, Price, Quantity, Side, Symbol};
use serde::Serialize;
use std::sync::Arc;

/// One execution against a resting order: which order was hit, how much, and
/// at what price (always the resting level's price).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchedTrade {
    /// The resting (passive) order that was filled.
    pub resting_order_id: OrderId,
    /// Units exchanged in this execution.
    pub quantity: Quantity,
    /// Execution price, i.e. the price of the level that was hit.
    pub price: Price,
}

/// Aggregate of all executions produced by one matching attempt, plus the
/// resting orders it fully consumed (their locator entries must be dropped).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchResult {
    /// Executions in the order they occurred.
    pub trades: Vec<MatchedTrade>,
    /// Resting orders that were completely filled and left their level.
    pub filled_order_ids: Vec<OrderId>,
}

impl MatchResult {
    /// Total quantity executed across all trades.
    pub fn executed_quantity(&self) -> Quantity {
        self.trades.iter().map(|t| t.quantity).sum()
    }

    /// True when the attempt produced no executions.
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Fold another result (e.g. from the next price level) into this one.
    pub fn merge(&mut self, other: MatchResult) {
        self.trades.extend(other.trades);
        self.filled_order_ids.extend(other.filled_order_ids);
    }
}

/// Outcome of processing one incoming order through the book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    /// The incoming order's identifier.
    pub order_id: OrderId,
    /// Symbol of the book that processed the order.
    pub symbol: Symbol,
    /// Side of the incoming order.
    pub side: Side,
    /// Status after finalization.
    pub status: OrderStatus,
    /// Quantity left unfilled after the attempt.
    pub open_quantity: Quantity,
    /// Quantity executed during the attempt.
    pub executed_quantity: Quantity,
    /// Executions in the order they occurred.
    pub trades: Vec<MatchedTrade>,
    /// Reason the pipeline aborted, when it did.
    pub abort_reason: Option<String>,
}

/// Callback invoked by a book after each processed order; shared across
/// threads, so it must be `Send + Sync`.
pub type TradeListener = Arc<dyn Fn(&ExecutionReport) + Send + Sync>;
