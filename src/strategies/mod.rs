//! Order-type and time-in-force strategies.
//!
//! Two stateless strategy families parameterize the pipeline: type strategies
//! build the base matching [`Condition`] from the order type, and TIF
//! strategies tighten it and settle the order's post-match status. Keeping
//! both out of the tracker means new behaviors never touch the matching core.
//!
//! All strategies are zero-sized singletons resolved through
//! [`type_strategy`] / [`tif_strategy`]; they carry no state, so sharing them
//! across book workers is free.

use crate::book::tracker::{Condition, DEPTH_UNLIMITED};
use crate::orders::{Order, OrderStatus, OrderType, PRICE_MAX, Quantity, Side, TimeInForce};

/// Builds the matching condition for an order type and settles any
/// type-specific final status.
pub trait TypeStrategy: Send + Sync {
    /// Produce the base condition for a matching attempt.
    fn prepare_condition(&self, order: &Order) -> Condition;

    /// Override the status set by the TIF strategy where the type demands it.
    ///
    /// Runs after [`TifStrategy::finalize`]; the default keeps the TIF result.
    fn finalize(&self, order: &mut Order) {
        let _ = order;
    }
}

/// Generic starting point: match the order's open quantity, any depth.
fn base_condition(order: &Order) -> Condition {
    Condition {
        quantity: order.open_quantity(),
        price_limit: 0,
        depth_limit: DEPTH_UNLIMITED,
        all_or_none: false,
    }
}

/// Limit orders match at the order's price or better.
pub struct LimitStrategy;

impl TypeStrategy for LimitStrategy {
    fn prepare_condition(&self, order: &Order) -> Condition {
        let mut condition = base_condition(order);
        condition.price_limit = order.price();
        condition
    }
}

/// Market orders carry no price of their own; the symbolic bounds (`PRICE_MAX`
/// for buys, zero for sells) tell the tracker not to restrict by price.
pub struct MarketStrategy;

impl TypeStrategy for MarketStrategy {
    fn prepare_condition(&self, order: &Order) -> Condition {
        let mut condition = base_condition(order);
        condition.price_limit = match order.side() {
            Side::Buy => PRICE_MAX,
            Side::Sell => 0,
        };
        condition
    }

    /// A market order never rests: whatever the TIF left active is cancelled.
    fn finalize(&self, order: &mut Order) {
        match order.status() {
            OrderStatus::Pending => order.set_status(OrderStatus::Cancelled),
            OrderStatus::PartiallyFilled => order.set_status(OrderStatus::PartialFillCancelled),
            _ => {}
        }
    }
}

/// Adjusts the matching condition and settles the order's status according to
/// its time-in-force policy.
pub trait TifStrategy: Send + Sync {
    /// Optional hook to restrict the condition (e.g. IOC caps depth).
    fn adjust_condition(&self, condition: &mut Condition, order: &Order) {
        let _ = (condition, order);
    }

    /// Settle open quantity and status from the unfilled remainder.
    fn finalize(&self, order: &mut Order, remaining: Quantity);
}

/// Good-till-cancelled (and DAY, which behaves identically here): the
/// remainder stays on the book.
pub struct GtcStrategy;

impl TifStrategy for GtcStrategy {
    fn finalize(&self, order: &mut Order, remaining: Quantity) {
        order.set_open_quantity(remaining);
        if remaining == 0 {
            order.set_status(OrderStatus::Fulfilled);
        } else if remaining == order.quantity() {
            // Nothing filled at all: still pending, not partially filled.
            order.set_status(OrderStatus::Pending);
        } else {
            order.set_status(OrderStatus::PartiallyFilled);
        }
    }
}

/// Immediate-or-cancel: fill what one price level offers, cancel the rest.
pub struct IocStrategy;

impl TifStrategy for IocStrategy {
    fn adjust_condition(&self, condition: &mut Condition, _order: &Order) {
        condition.depth_limit = 1;
    }

    fn finalize(&self, order: &mut Order, remaining: Quantity) {
        order.set_open_quantity(remaining);
        if remaining == 0 {
            order.set_status(OrderStatus::Fulfilled);
        } else {
            order.set_status(OrderStatus::Cancelled);
        }
    }
}

/// All-or-none: execute only when the entire quantity can fill; otherwise the
/// order stays pending and the opposite side is left untouched.
pub struct AonStrategy;

impl TifStrategy for AonStrategy {
    fn adjust_condition(&self, condition: &mut Condition, _order: &Order) {
        condition.all_or_none = true;
    }

    fn finalize(&self, order: &mut Order, remaining: Quantity) {
        order.set_open_quantity(remaining);
        if remaining == 0 {
            order.set_status(OrderStatus::Fulfilled);
        } else {
            order.set_status(OrderStatus::Pending);
        }
    }
}

/// Fill-or-kill: complete immediate execution or cancellation, never partial.
pub struct FokStrategy;

impl TifStrategy for FokStrategy {
    fn adjust_condition(&self, condition: &mut Condition, _order: &Order) {
        condition.all_or_none = true;
    }

    fn finalize(&self, order: &mut Order, remaining: Quantity) {
        order.set_open_quantity(remaining);
        if remaining == 0 {
            order.set_status(OrderStatus::Fulfilled);
        } else {
            order.set_status(OrderStatus::Cancelled);
        }
    }
}

static LIMIT: LimitStrategy = LimitStrategy;
static MARKET: MarketStrategy = MarketStrategy;
static GTC: GtcStrategy = GtcStrategy;
static DAY: GtcStrategy = GtcStrategy;
static IOC: IocStrategy = IocStrategy;
static AON: AonStrategy = AonStrategy;
static FOK: FokStrategy = FokStrategy;

/// Strategy singleton for an order type.
///
/// Stop variants have no matching semantics of their own and fall back to the
/// default (market) strategy, which guarantees they never rest on the book.
pub fn type_strategy(order_type: OrderType) -> &'static dyn TypeStrategy {
    match order_type {
        OrderType::Limit => &LIMIT,
        OrderType::Market => &MARKET,
        OrderType::Stop | OrderType::StopLimit => &MARKET,
    }
}

/// Strategy singleton for a time-in-force policy.
///
/// Matches exact flag sets (FOK before its components); anything unrecognized
/// falls back to the DAY default.
pub fn tif_strategy(time_in_force: TimeInForce) -> &'static dyn TifStrategy {
    match time_in_force {
        t if t == TimeInForce::FILL_OR_KILL => &FOK,
        t if t == TimeInForce::IMMEDIATE_OR_CANCEL => &IOC,
        t if t == TimeInForce::ALL_OR_NONE => &AON,
        t if t == TimeInForce::GOOD_TILL_CANCELED => &GTC,
        _ => &DAY,
    }
}
