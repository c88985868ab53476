//! Scalar aliases and enumerations shared across the engine.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Price in ticks. Signed so that spreads and deltas stay in the same domain.
pub type Price = i64;

/// Quantity of units in an order or a fill.
pub type Quantity = u64;

/// Unique order identifier, assigned by the submitter.
pub type OrderId = u64;

/// Ticker symbol identifying one order book.
pub type Symbol = String;

/// Symbolic upper price bound used by BUY market orders ("match at any price").
pub const PRICE_MAX: Price = Price::MAX;

/// The side of an order or of one tracker of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bid side
    Buy,
    /// Ask side
    Sell,
}

impl Side {
    /// Returns the matching side: an incoming order trades against the
    /// opposite side of the book.
    #[inline]
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

/// Order type. Only `Limit` and `Market` are matched by the engine; stop
/// variants carry a trigger price and are accepted structurally but never
/// matched (a trigger-price observer lives outside this crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderType {
    /// Execute at any available price.
    #[default]
    Market,
    /// Execute at `price` or better.
    Limit,
    /// Becomes a market order once the stop price triggers.
    Stop,
    /// Becomes a limit order once the stop price triggers.
    StopLimit,
}

impl OrderType {
    /// True for the variants that carry a limit price.
    #[inline]
    pub fn has_limit_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit)
    }

    /// True for the variants that carry a stop price.
    #[inline]
    pub fn has_stop_price(&self) -> bool {
        matches!(self, OrderType::Stop | OrderType::StopLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Stop => write!(f, "STOP"),
            OrderType::StopLimit => write!(f, "STOP_LIMIT"),
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            "STOP" => Ok(OrderType::Stop),
            "STOP_LIMIT" => Ok(OrderType::StopLimit),
            other => Err(format!("unknown order type: {other}")),
        }
    }
}

/// Lifecycle state of an order.
///
/// Progression is monotonic: `Pending` → (`PartiallyFilled`)? → terminal.
/// An order with open quantity remaining is `Pending` or `PartiallyFilled`;
/// every other status is terminal and the order leaves the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Accepted, no fills yet; rests on the book if the type allows it.
    Pending,
    /// Cancelled without any fill.
    Cancelled,
    /// Fully executed.
    Fulfilled,
    /// Partially executed; the remainder stays active on the book.
    PartiallyFilled,
    /// Partially executed, remainder cancelled (IOC, market orders).
    PartialFillCancelled,
}

impl OrderStatus {
    /// A terminal order never re-enters the book.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending | OrderStatus::PartiallyFilled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
            OrderStatus::Fulfilled => write!(f, "FULFILLED"),
            OrderStatus::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            OrderStatus::PartialFillCancelled => write!(f, "PARTIAL_FILL_CANCELLED"),
        }
    }
}

bitflags! {
    /// Time-in-force policy, encoded as a flag set so that composite policies
    /// stay cheap to test: `FILL_OR_KILL == ALL_OR_NONE | IMMEDIATE_OR_CANCEL`.
    ///
    /// The empty set is `DAY`, the default policy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TimeInForce: u32 {
        /// Execute the full quantity or nothing.
        const ALL_OR_NONE = 1;
        /// Whatever does not fill immediately is cancelled.
        const IMMEDIATE_OR_CANCEL = 1 << 1;
        /// Full immediate execution or cancel: AON and IOC combined.
        const FILL_OR_KILL = Self::ALL_OR_NONE.bits() | Self::IMMEDIATE_OR_CANCEL.bits();
        /// Active until explicitly cancelled.
        const GOOD_TILL_CANCELED = 1 << 2;
    }
}

impl TimeInForce {
    /// Valid for the trading day; the default policy (no flags set).
    pub const DAY: TimeInForce = TimeInForce::empty();
}

impl Default for TimeInForce {
    fn default() -> Self {
        TimeInForce::DAY
    }
}
