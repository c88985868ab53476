//! Load tracking for symbol → worker rebalancing.
//!
//! The assignment manager runs one background thread that folds incoming
//! per-symbol metric samples into short- and long-horizon EWMAs and wakes on
//! a fixed interval to consider moving symbols between workers. The transfer
//! step itself is a deliberate stub: the interesting contract here is
//! [`ThreadAssignmentManager::submit_sample`] and the load bookkeeping, not
//! the migration mechanics.

use crate::orders::Symbol;
use crate::scheduler::OrderBookScheduler;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// One observation of a symbol's activity, as fed by the metrics producer.
#[derive(Debug, Clone)]
pub struct MetricSample {
    /// The observed symbol.
    pub symbol: Symbol,
    /// Executions per second over the sample window.
    pub trades_per_second: f64,
    /// Mean order size over the sample window.
    pub avg_order_size: f64,
    /// When the sample was taken.
    pub timestamp: Instant,
}

impl MetricSample {
    /// Build a sample stamped with the current instant.
    pub fn now(symbol: impl Into<Symbol>, trades_per_second: f64, avg_order_size: f64) -> Self {
        Self {
            symbol: symbol.into(),
            trades_per_second,
            avg_order_size,
            timestamp: Instant::now(),
        }
    }
}

/// Tuning knobs for the rebalance loop.
#[derive(Debug, Clone)]
pub struct RebalanceConfig {
    /// How often the rebalance tick fires.
    pub rebalance_interval: Duration,
    /// Smoothing factor of the short-horizon EWMA.
    pub short_alpha: f64,
    /// Smoothing factor of the long-horizon EWMA.
    pub long_alpha: f64,
    /// Weight of the short EWMA in the final load score.
    pub short_long_mix: f64,
    /// Required relative improvement before a move is worth it.
    pub min_move_improvement_pct: f64,
    /// Cooldown between moves of the same symbol.
    pub symbol_cooldown: Duration,
    /// Symbols below this load are ignored entirely.
    pub min_load_to_consider: f64,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            rebalance_interval: Duration::from_secs(30),
            short_alpha: 0.3,
            long_alpha: 0.02,
            short_long_mix: 0.6,
            min_move_improvement_pct: 10.0,
            symbol_cooldown: Duration::from_secs(60),
            min_load_to_consider: 0.01,
        }
    }
}

#[derive(Debug, Default)]
struct SymbolState {
    last_sample: Option<MetricSample>,
    pending: bool,
    short_ewma: f64,
    long_ewma: f64,
    load_score: f64,
}

/// Tracks per-symbol load and periodically evaluates the assignment table.
pub struct ThreadAssignmentManager {
    scheduler: Arc<OrderBookScheduler>,
    config: RebalanceConfig,
    states: Mutex<HashMap<Symbol, SymbolState>>,
    wake: Condvar,
    stop: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadAssignmentManager {
    /// Create a manager bound to the scheduler whose assignments it may move.
    pub fn new(scheduler: Arc<OrderBookScheduler>, config: RebalanceConfig) -> Arc<Self> {
        Arc::new(Self {
            scheduler,
            config,
            states: Mutex::new(HashMap::new()),
            wake: Condvar::new(),
            stop: AtomicBool::new(false),
            handle: Mutex::new(None),
        })
    }

    /// Launch the background thread. Idempotent.
    pub fn start(self: &Arc<Self>) {
        let mut handle = self.handle.lock();
        if handle.is_some() {
            return;
        }
        self.stop.store(false, Ordering::Release);
        let manager = Arc::clone(self);
        let spawned = std::thread::Builder::new()
            .name("assignment-manager".to_string())
            .spawn(move || manager.run());
        if let Ok(join_handle) = spawned {
            *handle = Some(join_handle);
        }
    }

    /// Stop the background thread and join it.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Release);
        self.wake.notify_all();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// Record a metric sample for its symbol. Thread-safe; called by the
    /// metrics producer.
    pub fn submit_sample(&self, sample: MetricSample) {
        let mut states = self.states.lock();
        let state = states.entry(sample.symbol.clone()).or_default();
        state.last_sample = Some(sample);
        state.pending = true;
        self.wake.notify_all();
    }

    /// Current load score per symbol, highest first.
    pub fn load_scores(&self) -> Vec<(Symbol, f64)> {
        let states = self.states.lock();
        let mut scores: Vec<(Symbol, f64)> = states
            .iter()
            .map(|(symbol, state)| (symbol.clone(), state.load_score))
            .collect();
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores
    }

    fn run(&self) {
        let mut next_rebalance = Instant::now() + self.config.rebalance_interval;

        loop {
            let mut states = self.states.lock();
            while !self.stop.load(Ordering::Acquire)
                && !states.values().any(|s| s.pending)
                && Instant::now() < next_rebalance
            {
                let timeout = next_rebalance.saturating_duration_since(Instant::now());
                if self.wake.wait_for(&mut states, timeout).timed_out() {
                    break;
                }
            }

            if self.stop.load(Ordering::Acquire) {
                return;
            }

            for state in states.values_mut() {
                if !state.pending {
                    continue;
                }
                Self::update_ewma(&self.config, state);
                state.pending = false;
            }

            if Instant::now() >= next_rebalance {
                let snapshot: Vec<(Symbol, f64)> = states
                    .iter()
                    .map(|(symbol, state)| (symbol.clone(), state.load_score))
                    .collect();
                drop(states);
                self.perform_rebalance(&snapshot);
                next_rebalance = Instant::now() + self.config.rebalance_interval;
            }
        }
    }

    /// Fold the latest sample into the symbol's EWMAs and load score.
    fn update_ewma(config: &RebalanceConfig, state: &mut SymbolState) {
        let Some(sample) = &state.last_sample else {
            return;
        };
        // Collapse the sample into one scalar; trade rate dominates size.
        let observed = 2.0 * sample.trades_per_second + sample.avg_order_size / 1024.0;

        if state.short_ewma == 0.0 && state.long_ewma == 0.0 {
            state.short_ewma = observed;
            state.long_ewma = observed;
        } else {
            state.short_ewma =
                config.short_alpha * observed + (1.0 - config.short_alpha) * state.short_ewma;
            state.long_ewma =
                config.long_alpha * observed + (1.0 - config.long_alpha) * state.long_ewma;
        }
        state.load_score = config.short_long_mix * state.short_ewma
            + (1.0 - config.short_long_mix) * state.long_ewma;
    }

    /// Evaluate the load snapshot. Moving symbols between workers is out of
    /// scope; this logs what a move pass would look at.
    fn perform_rebalance(&self, snapshot: &[(Symbol, f64)]) {
        let candidates: Vec<&(Symbol, f64)> = snapshot
            .iter()
            .filter(|(_, load)| *load >= self.config.min_load_to_consider)
            .collect();
        if candidates.is_empty() {
            return;
        }
        for (symbol, load) in &candidates {
            let worker = self.scheduler.worker_for(symbol).ok();
            debug!(%symbol, load, ?worker, "rebalance candidate");
        }
        info!(candidates = candidates.len(), "rebalance pass evaluated");
    }
}
