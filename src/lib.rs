//! # Matchbook — Concurrent Limit-Order Matching Engine
//!
//! A multi-symbol limit-order matching engine built around thread confinement:
//! every symbol's order book is mutated by exactly one dedicated worker
//! thread, so the matching hot path takes no locks at all. Orders are matched
//! by strict price–time priority through a staged processing pipeline.
//!
//! ## Key Ideas
//!
//! - **One book, one thread**: the [`scheduler::OrderBookScheduler`] routes
//!   every order for a symbol to the same worker queue. Books never
//!   synchronize internally; exclusivity is a scheduling invariant, expressed
//!   in the API as `&mut self`.
//!
//! - **Price–time priority**: each side of a book is a sorted map of
//!   [`book::PriceLevel`]s, and each level is a FIFO queue. Best price wins;
//!   within a price, earliest arrival wins.
//!
//! - **Staged pipeline**: an incoming order flows through
//!   prepare-condition → TIF-adjust → validate → execute → finalize
//!   ([`pipeline::Pipeline`]). Stages are stateless and share one mutable
//!   context.
//!
//! - **Strategy-driven semantics**: order types (LIMIT, MARKET) and
//!   time-in-force policies (DAY/GTC, IOC, AON, FOK) are stateless
//!   [`strategies`] singletons that parameterize matching through a single
//!   [`book::Condition`] value. The matching core knows nothing about them.
//!
//! - **All-or-nothing is atomic**: AON and FOK orders dry-run available
//!   liquidity before committing, so a failed attempt leaves the opposite
//!   side of the book byte-for-byte untouched.
//!
//! ## Architecture
//!
//! ```text
//! raw text ──► IngressScheduler (round-robin pool)
//!                  │ parse + validate + construct Order
//!                  ▼
//!              OrderBookScheduler (symbol → worker, static table)
//!                  │ enqueue on the symbol's owning worker
//!                  ▼
//!              OrderBook::process_order       (thread-confined)
//!                  │ pipeline: prepare → tif → validate → execute → finalize
//!                  ▼
//!              OrderTracker::match_order ──► PriceLevel::match_incoming
//!                  │                              (FIFO fills)
//!                  ▼
//!              rest remainder on own side, or consume the order
//! ```
//!
//! Books are created lazily through the process-wide
//! [`book::OrderBookRegistry`] (read-mostly, double-checked creation). The
//! external collaborators — XML configuration ([`config`]), the CSV metrics
//! producer ([`metrics`]), and the load rebalancer ([`rebalance`]) — feed and
//! observe the core without ever touching a book directly.
//!
//! ## Ordering Guarantees
//!
//! - Within one symbol: processing order equals submission order (one worker,
//!   FIFO queue).
//! - Across symbols: none.
//! - Within one price level: time priority, FIFO by admission.
//!
//! ## Quick Start
//!
//! ```
//! use matchbook::orders::{Order, Side, TimeInForce};
//! use matchbook::book::OrderBook;
//!
//! let mut book = OrderBook::new("TSLA");
//! let sell = Order::limit(2, Side::Sell, 50, "TSLA".into(), 17_400, TimeInForce::DAY).unwrap();
//! let buy = Order::limit(1, Side::Buy, 100, "TSLA".into(), 17_500, TimeInForce::DAY).unwrap();
//!
//! book.process_order(sell);
//! let report = book.process_order(buy);
//! assert_eq!(report.trades.len(), 1);
//! assert_eq!(report.trades[0].price, 17_400);
//! assert_eq!(report.open_quantity, 50);
//! ```

pub mod app;
pub mod book;
pub mod config;
pub mod metrics;
pub mod orders;
pub mod pipeline;
pub mod prelude;
pub mod rebalance;
pub mod scheduler;
pub mod strategies;

pub use book::{
    BookSnapshot, BookStats, Condition, DEPTH_UNLIMITED, ExecutionReport, LevelSnapshot,
    MatchResult, MatchedTrade, OrderBook, OrderBookRegistry, OrderTracker, PriceLevel, SharedBook,
    TradeListener,
};
pub use config::{ConfigError, EngineConfig};
pub use metrics::{LiveMetricsProducer, MetricsError};
pub use orders::{
    InvalidOrder, Order, OrderId, OrderStatus, OrderType, PRICE_MAX, Price, Quantity, Side, Symbol,
    TimeInForce, Validator, ValidatorChain, set_default_validator,
};
pub use rebalance::{MetricSample, RebalanceConfig, ThreadAssignmentManager};
pub use scheduler::{
    CancelToken, IngressScheduler, OrderBookScheduler, SchedulerCore, SchedulerError, Worker,
    WorkerId,
};
