//! The order entity and its validated factories.

use super::types::{OrderId, OrderStatus, OrderType, Price, Quantity, Side, Symbol, TimeInForce};
use super::validation::{InvalidOrder, Validator, default_validator};
use serde::Serialize;

/// A single submitted trading intent.
///
/// Orders are created only through the factories below, which run the
/// process-wide default validator (or an explicitly supplied one) before the
/// order exists anywhere else. After creation an order is exclusively owned
/// by one container at a time: it moves from the ingress task into the book
/// worker, through the pipeline, and either into a price level (resting) or
/// out of the system (terminal). It is never aliased.
///
/// Invariants maintained by the matching engine:
/// - `open_quantity <= quantity`
/// - `open_quantity > 0` iff the status is `Pending` or `PartiallyFilled`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    id: OrderId,
    side: Side,
    quantity: Quantity,
    open_quantity: Quantity,
    symbol: Symbol,
    status: OrderStatus,
    order_type: OrderType,
    /// Limit price; meaningful for LIMIT and STOP_LIMIT only.
    price: Price,
    /// Trigger price; meaningful for STOP and STOP_LIMIT only.
    stop_price: Price,
    time_in_force: TimeInForce,
}

impl Order {
    /// Create a LIMIT order validated by the process-wide default validator.
    pub fn limit(
        id: OrderId,
        side: Side,
        quantity: Quantity,
        symbol: Symbol,
        limit_price: Price,
        time_in_force: TimeInForce,
    ) -> Result<Order, InvalidOrder> {
        Self::limit_with(
            id,
            side,
            quantity,
            symbol,
            limit_price,
            default_validator().as_ref(),
            time_in_force,
        )
    }

    /// Create a LIMIT order validated by an explicit validator.
    pub fn limit_with(
        id: OrderId,
        side: Side,
        quantity: Quantity,
        symbol: Symbol,
        limit_price: Price,
        validator: &dyn Validator,
        time_in_force: TimeInForce,
    ) -> Result<Order, InvalidOrder> {
        Self::make_and_validate(
            id,
            side,
            quantity,
            symbol,
            OrderType::Limit,
            limit_price,
            0,
            time_in_force,
            validator,
        )
    }

    /// Create a MARKET order validated by the process-wide default validator.
    pub fn market(
        id: OrderId,
        side: Side,
        quantity: Quantity,
        symbol: Symbol,
        time_in_force: TimeInForce,
    ) -> Result<Order, InvalidOrder> {
        Self::market_with(
            id,
            side,
            quantity,
            symbol,
            default_validator().as_ref(),
            time_in_force,
        )
    }

    /// Create a MARKET order validated by an explicit validator.
    pub fn market_with(
        id: OrderId,
        side: Side,
        quantity: Quantity,
        symbol: Symbol,
        validator: &dyn Validator,
        time_in_force: TimeInForce,
    ) -> Result<Order, InvalidOrder> {
        Self::make_and_validate(
            id,
            side,
            quantity,
            symbol,
            OrderType::Market,
            0,
            0,
            time_in_force,
            validator,
        )
    }

    /// Create a STOP order validated by the process-wide default validator.
    pub fn stop(
        id: OrderId,
        side: Side,
        quantity: Quantity,
        symbol: Symbol,
        stop_price: Price,
        time_in_force: TimeInForce,
    ) -> Result<Order, InvalidOrder> {
        Self::stop_with(
            id,
            side,
            quantity,
            symbol,
            stop_price,
            default_validator().as_ref(),
            time_in_force,
        )
    }

    /// Create a STOP order validated by an explicit validator.
    pub fn stop_with(
        id: OrderId,
        side: Side,
        quantity: Quantity,
        symbol: Symbol,
        stop_price: Price,
        validator: &dyn Validator,
        time_in_force: TimeInForce,
    ) -> Result<Order, InvalidOrder> {
        Self::make_and_validate(
            id,
            side,
            quantity,
            symbol,
            OrderType::Stop,
            0,
            stop_price,
            time_in_force,
            validator,
        )
    }

    /// Create a STOP_LIMIT order validated by the process-wide default validator.
    pub fn stop_limit(
        id: OrderId,
        side: Side,
        quantity: Quantity,
        symbol: Symbol,
        limit_price: Price,
        stop_price: Price,
        time_in_force: TimeInForce,
    ) -> Result<Order, InvalidOrder> {
        Self::stop_limit_with(
            id,
            side,
            quantity,
            symbol,
            limit_price,
            stop_price,
            default_validator().as_ref(),
            time_in_force,
        )
    }

    /// Create a STOP_LIMIT order validated by an explicit validator.
    #[allow(clippy::too_many_arguments)]
    pub fn stop_limit_with(
        id: OrderId,
        side: Side,
        quantity: Quantity,
        symbol: Symbol,
        limit_price: Price,
        stop_price: Price,
        validator: &dyn Validator,
        time_in_force: TimeInForce,
    ) -> Result<Order, InvalidOrder> {
        Self::make_and_validate(
            id,
            side,
            quantity,
            symbol,
            OrderType::StopLimit,
            limit_price,
            stop_price,
            time_in_force,
            validator,
        )
    }

    /// Centralized construction point: instantiate, then validate.
    #[allow(clippy::too_many_arguments)]
    fn make_and_validate(
        id: OrderId,
        side: Side,
        quantity: Quantity,
        symbol: Symbol,
        order_type: OrderType,
        price: Price,
        stop_price: Price,
        time_in_force: TimeInForce,
        validator: &dyn Validator,
    ) -> Result<Order, InvalidOrder> {
        let order = Order {
            id,
            side,
            quantity,
            open_quantity: quantity,
            symbol,
            status: OrderStatus::Pending,
            order_type,
            price,
            stop_price,
            time_in_force,
        };
        validator.validate(&order)?;
        Ok(order)
    }

    /// Submitter-assigned identifier.
    #[inline]
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Side of this order.
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// The side this order trades against.
    #[inline]
    pub fn opposite_side(&self) -> Side {
        self.side.opposite()
    }

    /// Originally submitted quantity.
    #[inline]
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Quantity still unfilled.
    #[inline]
    pub fn open_quantity(&self) -> Quantity {
        self.open_quantity
    }

    /// Symbol this order trades.
    #[inline]
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Current lifecycle status.
    #[inline]
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Order type.
    #[inline]
    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Limit price (LIMIT / STOP_LIMIT), zero otherwise.
    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Trigger price (STOP / STOP_LIMIT), zero otherwise.
    #[inline]
    pub fn stop_price(&self) -> Price {
        self.stop_price
    }

    /// Time-in-force policy.
    #[inline]
    pub fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }

    /// Overwrite the unfilled quantity. Callers keep the status in step.
    #[inline]
    pub fn set_open_quantity(&mut self, open_quantity: Quantity) {
        self.open_quantity = open_quantity;
    }

    /// Overwrite the lifecycle status.
    #[inline]
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }
}
