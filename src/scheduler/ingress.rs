//! Ingress: parse raw order descriptors and hand the orders to the book
//! scheduler.
//!
//! Ingress workers are interchangeable, so incoming messages are spread over
//! the pool round-robin. Parsing and validation happen on the ingress worker;
//! a malformed or invalid message is logged and dropped there, never reaching
//! a book.

use super::book_scheduler::OrderBookScheduler;
use super::core::{SchedulerCore, SchedulerError};
use super::worker::WorkerId;
use crate::orders::{InvalidOrder, Order, OrderId, Price, Quantity, Side, TimeInForce};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Parse a semicolon-delimited `key=value` order descriptor.
///
/// Recognized keys: `id`, `side` (`BUY`/`SELL`), `qty`, `symbol`, `type`
/// (`LIMIT` builds a limit order, anything else a market order), and `price`
/// (required for `LIMIT`). Unknown keys are ignored; missing or malformed
/// required keys yield an [`InvalidOrder`].
pub fn parse_order_message(message: &str) -> Result<Order, InvalidOrder> {
    let mut fields: HashMap<&str, &str> = HashMap::new();
    for pair in message.split(';') {
        if let Some((key, value)) = pair.split_once('=') {
            fields.insert(key.trim(), value.trim());
        }
    }

    let required = |key: &str| {
        fields
            .get(key)
            .copied()
            .ok_or_else(|| InvalidOrder::new(format!("missing required field: {key}")))
    };

    let id: OrderId = required("id")?
        .parse()
        .map_err(|_| InvalidOrder::new("field 'id' is not an unsigned integer"))?;
    let side: Side = required("side")?.parse().map_err(InvalidOrder::new)?;
    let quantity: Quantity = required("qty")?
        .parse()
        .map_err(|_| InvalidOrder::new("field 'qty' is not an unsigned integer"))?;
    let symbol = required("symbol")?.to_string();

    if fields.get("type").copied() == Some("LIMIT") {
        let price: Price = required("price")?
            .parse()
            .map_err(|_| InvalidOrder::new("field 'price' is not an integer"))?;
        Order::limit(id, side, quantity, symbol, price, TimeInForce::DAY)
    } else {
        Order::market(id, side, quantity, symbol, TimeInForce::DAY)
    }
}

/// Round-robin pool of ingress workers feeding an [`OrderBookScheduler`].
pub struct IngressScheduler {
    core: SchedulerCore,
    worker_prefix: String,
    worker_count: usize,
    next_worker: AtomicUsize,
    book_scheduler: Arc<OrderBookScheduler>,
}

impl IngressScheduler {
    /// Create the ingress pool: `count` workers named `prefix_0..`.
    pub fn new(
        prefix: &str,
        count: usize,
        book_scheduler: Arc<OrderBookScheduler>,
    ) -> Result<Self, SchedulerError> {
        let core = SchedulerCore::new();
        core.create_workers(prefix, count)?;
        Ok(Self {
            core,
            worker_prefix: prefix.to_string(),
            worker_count: count,
            next_worker: AtomicUsize::new(0),
            book_scheduler,
        })
    }

    /// Start the ingress worker threads.
    pub fn start(&self) {
        self.core.start();
    }

    /// Stop the ingress workers, draining queued messages first.
    pub fn shutdown(&self) {
        self.core.shutdown();
    }

    /// The worker that takes the next message.
    fn next_worker_id(&self) -> WorkerId {
        let index = self.next_worker.fetch_add(1, Ordering::Relaxed) % self.worker_count;
        format!("{}_{}", self.worker_prefix, index)
    }

    /// Accept one raw order descriptor.
    ///
    /// The chosen worker parses and validates the message, constructs the
    /// order, and forwards it to the book scheduler. Parse failures and
    /// routing failures are contained in the task: logged, then dropped.
    pub fn process_incoming(&self, message: &str) -> Result<(), SchedulerError> {
        let worker_id = self.next_worker_id();
        let message = message.to_string();
        let book_scheduler = Arc::clone(&self.book_scheduler);

        self.core.submit_to(
            &worker_id,
            move |token| {
                if token.is_cancelled() {
                    return;
                }
                match parse_order_message(&message) {
                    Ok(order) => {
                        if let Err(err) = book_scheduler.process_order(order) {
                            warn!(%err, "order submission failed");
                        }
                    }
                    Err(err) => {
                        warn!(%err, message, "rejecting malformed order message");
                    }
                }
            },
            "parse and delegate order",
        )?;
        Ok(())
    }
}
