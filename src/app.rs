//! Application wiring: configuration, schedulers, metrics, and shutdown.

use crate::book::{ExecutionReport, OrderBookRegistry};
use crate::config::EngineConfig;
use crate::metrics::{LiveMetricsProducer, MetricsError};
use crate::orders::{Order, Side, TimeInForce};
use crate::rebalance::{RebalanceConfig, ThreadAssignmentManager};
use crate::scheduler::{IngressScheduler, OrderBookScheduler, SchedulerError};
use crossbeam::channel::{Receiver, Sender, unbounded};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{info, warn};

/// Worker pool settings for the ingress side; the XML config only covers the
/// book workers.
const INGRESS_WORKER_PREFIX: &str = "Injector";
const INGRESS_WORKER_COUNT: usize = 2;

/// Symbols seeded into the assignment table at startup.
const DEFAULT_SYMBOLS: [&str; 4] = ["TSLA", "AAPL", "MSFT", "AMZN"];

/// Owns and wires every long-running component of the engine.
pub struct Application {
    config: EngineConfig,
    book_scheduler: Option<Arc<OrderBookScheduler>>,
    ingress: Option<Arc<IngressScheduler>>,
    assignment_manager: Option<Arc<ThreadAssignmentManager>>,
    metrics_producer: Option<LiveMetricsProducer>,
    trade_router: Option<JoinHandle<()>>,
    trade_router_stop: Arc<AtomicBool>,
}

impl Application {
    /// Build an application from a validated configuration. Nothing runs
    /// until [`Self::start`].
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            book_scheduler: None,
            ingress: None,
            assignment_manager: None,
            metrics_producer: None,
            trade_router: None,
            trade_router_stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start all schedulers and worker threads.
    ///
    /// # Errors
    /// Scheduler construction errors (duplicate workers) are startup bugs and
    /// surface here; the caller treats them as fatal.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        let registry = OrderBookRegistry::global();
        self.start_trade_router(&registry);

        // Seed the static symbol table by spreading the default symbols over
        // the configured workers.
        let mut assignments = HashMap::new();
        for (index, symbol) in DEFAULT_SYMBOLS.iter().enumerate() {
            let worker = format!(
                "{}_{}",
                self.config.worker_prefix,
                index % self.config.worker_count
            );
            assignments.insert(symbol.to_string(), worker);
        }

        let book_scheduler = Arc::new(OrderBookScheduler::new(
            &self.config.worker_prefix,
            self.config.worker_count,
            assignments,
            registry,
        )?);
        book_scheduler.start();
        info!(
            workers = self.config.worker_count,
            prefix = %self.config.worker_prefix,
            "order book scheduler started"
        );

        let ingress = Arc::new(IngressScheduler::new(
            INGRESS_WORKER_PREFIX,
            INGRESS_WORKER_COUNT,
            Arc::clone(&book_scheduler),
        )?);
        ingress.start();

        let assignment_manager =
            ThreadAssignmentManager::new(Arc::clone(&book_scheduler), RebalanceConfig::default());
        assignment_manager.start();

        self.book_scheduler = Some(book_scheduler);
        self.ingress = Some(ingress);
        self.assignment_manager = Some(assignment_manager);
        info!("application started");
        Ok(())
    }

    /// Start replaying a metrics CSV file into the assignment manager.
    pub fn start_metrics(&mut self, path: &str) -> Result<(), MetricsError> {
        let Some(manager) = &self.assignment_manager else {
            warn!("metrics requested before start; ignoring");
            return Ok(());
        };
        let mut producer = LiveMetricsProducer::new(Arc::clone(manager));
        producer.start_from_file(path)?;
        self.metrics_producer = Some(producer);
        Ok(())
    }

    /// Route a raw order descriptor through ingress.
    pub fn submit_order_text(&self, message: &str) -> Result<(), SchedulerError> {
        match &self.ingress {
            Some(ingress) => ingress.process_incoming(message),
            None => Ok(()),
        }
    }

    /// Route an already constructed order to its book worker.
    pub fn submit_order(&self, order: Order) -> Result<(), SchedulerError> {
        match &self.book_scheduler {
            Some(scheduler) => scheduler.process_order(order),
            None => Ok(()),
        }
    }

    /// Map an extra symbol onto one of the configured book workers.
    pub fn assign_symbol(&self, symbol: &str, worker_index: usize) -> Result<(), SchedulerError> {
        let Some(scheduler) = &self.book_scheduler else {
            return Ok(());
        };
        let worker = format!(
            "{}_{}",
            self.config.worker_prefix,
            worker_index % self.config.worker_count
        );
        scheduler.assign(symbol, &worker)
    }

    /// Submit a pair of crossing demo orders, mirroring a quick manual check.
    pub fn simulate(&self) -> Result<(), SchedulerError> {
        let sell = Order::limit(2, Side::Sell, 50, "TSLA".into(), 17_400, TimeInForce::DAY)
            .expect("demo order is valid");
        let buy = Order::limit(1, Side::Buy, 150, "TSLA".into(), 17_500, TimeInForce::DAY)
            .expect("demo order is valid");
        self.submit_order(sell)?;
        self.submit_order(buy)?;
        Ok(())
    }

    /// Gracefully stop everything: producers first, then the schedulers
    /// (draining their queues), then the trade router.
    pub fn shutdown(&mut self) {
        info!("application shutting down");

        if let Some(mut producer) = self.metrics_producer.take() {
            producer.stop();
        }
        if let Some(manager) = self.assignment_manager.take() {
            manager.shutdown();
        }
        if let Some(ingress) = self.ingress.take() {
            ingress.shutdown();
        }
        if let Some(scheduler) = self.book_scheduler.take() {
            scheduler.shutdown();
        }

        self.trade_router_stop.store(true, Ordering::Release);
        if let Some(router) = self.trade_router.take() {
            let _ = router.join();
        }
        info!("application shut down");
    }

    /// Install a registry-wide trade listener feeding a channel, and spawn
    /// the consumer thread that logs executions centrally.
    fn start_trade_router(&mut self, registry: &Arc<OrderBookRegistry>) {
        if self.trade_router.is_some() {
            return;
        }
        self.trade_router_stop.store(false, Ordering::Release);

        let (sender, receiver): (Sender<ExecutionReport>, Receiver<ExecutionReport>) = unbounded();
        registry.set_default_trade_listener(Arc::new(move |report: &ExecutionReport| {
            let _ = sender.send(report.clone());
        }));

        let stop = Arc::clone(&self.trade_router_stop);
        let spawned = std::thread::Builder::new()
            .name("trade-router".to_string())
            .spawn(move || {
                // The sending side lives in the process-wide registry, so the
                // channel never closes on its own; poll the stop flag instead.
                loop {
                    match receiver.recv_timeout(Duration::from_millis(200)) {
                        Ok(report) => log_report(&report),
                        Err(crossbeam::channel::RecvTimeoutError::Timeout) => {
                            if stop.load(Ordering::Acquire) {
                                return;
                            }
                        }
                        Err(crossbeam::channel::RecvTimeoutError::Disconnected) => return,
                    }
                }
            });
        if let Ok(handle) = spawned {
            self.trade_router = Some(handle);
        }
    }
}

fn log_report(report: &ExecutionReport) {
    if report.trades.is_empty() {
        return;
    }
    info!(
        symbol = %report.symbol,
        order_id = report.order_id,
        executed = report.executed_quantity,
        status = %report.status,
        "trades executed"
    );
    for trade in &report.trades {
        info!(
            resting_order_id = trade.resting_order_id,
            quantity = trade.quantity,
            price = trade.price,
            "  trade"
        );
    }
}
