//! Routes each order to the worker that owns its symbol's book.
//!
//! The symbol → worker assignment is static for the lifetime of the
//! scheduler (rebalancing decisions belong to the assignment manager). The
//! guarantee that matters: every task for a given symbol lands on the same
//! worker queue, so each book is mutated by exactly one thread and needs no
//! internal locking.

use super::core::{SchedulerCore, SchedulerError};
use super::worker::WorkerId;
use crate::book::OrderBookRegistry;
use crate::orders::{Order, Symbol};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Scheduler owning the book-worker pool and the symbol assignment table.
pub struct OrderBookScheduler {
    core: SchedulerCore,
    assignments: DashMap<Symbol, WorkerId>,
    registry: Arc<OrderBookRegistry>,
}

impl OrderBookScheduler {
    /// Create the scheduler with `count` workers named `prefix_0..` and an
    /// initial symbol assignment table.
    ///
    /// # Errors
    /// [`SchedulerError::WorkerAlreadyExists`] if worker creation collides
    /// (a startup bug).
    pub fn new(
        prefix: &str,
        count: usize,
        assignments: HashMap<Symbol, WorkerId>,
        registry: Arc<OrderBookRegistry>,
    ) -> Result<Self, SchedulerError> {
        let core = SchedulerCore::new();
        core.create_workers(prefix, count)?;
        Ok(Self {
            core,
            assignments: assignments.into_iter().collect(),
            registry,
        })
    }

    /// Like [`Self::new`], bound to the process-wide book registry.
    pub fn with_global_registry(
        prefix: &str,
        count: usize,
        assignments: HashMap<Symbol, WorkerId>,
    ) -> Result<Self, SchedulerError> {
        Self::new(prefix, count, assignments, OrderBookRegistry::global())
    }

    /// Start the worker threads.
    pub fn start(&self) {
        self.core.start();
    }

    /// Stop the workers, draining queued orders first.
    pub fn shutdown(&self) {
        self.core.shutdown();
    }

    /// The registry this scheduler resolves books from.
    pub fn registry(&self) -> &Arc<OrderBookRegistry> {
        &self.registry
    }

    /// Assign a symbol to a worker. Fails when the worker does not exist.
    pub fn assign(&self, symbol: impl Into<Symbol>, worker_id: &str) -> Result<(), SchedulerError> {
        if !self.core.has_worker(worker_id) {
            return Err(SchedulerError::WorkerNotFound {
                worker_id: worker_id.to_string(),
            });
        }
        let symbol = symbol.into();
        debug!(%symbol, worker = worker_id, "symbol assigned");
        self.assignments.insert(symbol, worker_id.to_string());
        Ok(())
    }

    /// The worker owning `symbol`.
    ///
    /// # Errors
    /// [`SchedulerError::NoWorkerForSymbol`] when the symbol is unassigned.
    pub fn worker_for(&self, symbol: &str) -> Result<WorkerId, SchedulerError> {
        self.assignments
            .get(symbol)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SchedulerError::NoWorkerForSymbol {
                symbol: symbol.to_string(),
            })
    }

    /// Enqueue `order` for processing on its symbol's worker.
    ///
    /// The task takes ownership of the order, resolves the book through the
    /// registry on the worker thread, and contains any processing outcome
    /// there; nothing propagates out of the worker.
    pub fn process_order(&self, order: Order) -> Result<(), SchedulerError> {
        let worker_id = self.worker_for(order.symbol())?;
        let registry = Arc::clone(&self.registry);
        let description = format!("process order {} for {}", order.id(), order.symbol());

        self.core.submit_to(
            &worker_id,
            move |token| {
                if token.is_cancelled() {
                    return;
                }
                let book = registry.get_or_create(order.symbol());
                let report = book.lock().process_order(order);
                if report.executed_quantity > 0 {
                    debug!(
                        symbol = %report.symbol,
                        order_id = report.order_id,
                        executed = report.executed_quantity,
                        status = %report.status,
                        trades = report.trades.len(),
                        "order executed"
                    );
                }
                if let Some(reason) = &report.abort_reason {
                    warn!(
                        symbol = %report.symbol,
                        order_id = report.order_id,
                        reason,
                        "order aborted by pipeline"
                    );
                }
            },
            description,
        )?;
        Ok(())
    }
}
