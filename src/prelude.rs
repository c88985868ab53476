//! Convenience re-exports for the common path: build orders, process them
//! through a book or the schedulers, inspect the results.
//!
//! ```
//! use matchbook::prelude::*;
//! ```

pub use crate::book::{
    BookSnapshot, BookStats, Condition, ExecutionReport, MatchedTrade, OrderBook,
    OrderBookRegistry, TradeListener,
};
pub use crate::config::EngineConfig;
pub use crate::orders::{
    InvalidOrder, Order, OrderId, OrderStatus, OrderType, Price, Quantity, Side, Symbol,
    TimeInForce, ValidatorChain, set_default_validator,
};
pub use crate::scheduler::{IngressScheduler, OrderBookScheduler, SchedulerError};
