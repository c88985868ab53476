//! A single price point on one side of the book.
//!
//! Each level owns the resting orders at its price in strict FIFO order and
//! keeps two aggregates in step with them: the total open quantity (the
//! liquidity at this price) and the order count. Levels are thread-confined
//! along with the book that owns them, so no synchronization happens here.

use super::trade::{MatchResult, MatchedTrade};
use crate::orders::{Order, OrderId, OrderStatus, Price, Quantity};
use std::collections::VecDeque;

/// FIFO queue of resting orders sharing one price.
#[derive(Debug)]
pub struct PriceLevel {
    price: Price,
    orders: VecDeque<Order>,
    total_quantity: Quantity,
    order_count: u64,
}

impl PriceLevel {
    /// Create an empty level for `price`.
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_quantity: 0,
            order_count: 0,
        }
    }

    /// Price this level represents.
    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Sum of the open quantities of all resting orders here.
    #[inline]
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Number of resting orders here.
    #[inline]
    pub fn order_count(&self) -> u64 {
        self.order_count
    }

    /// True when no orders rest at this price.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Earliest resting order, if any.
    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Iterate resting orders in time priority.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Append an order at the tail (lowest time priority at this price).
    pub fn add(&mut self, order: Order) {
        self.total_quantity += order.open_quantity();
        self.order_count += 1;
        self.orders.push_back(order);
    }

    /// Remove a resting order by id, keeping the aggregates in step.
    pub fn remove(&mut self, order_id: OrderId) -> Option<Order> {
        let position = self.orders.iter().position(|o| o.id() == order_id)?;
        let order = self.orders.remove(position)?;
        self.total_quantity -= order.open_quantity();
        self.order_count -= 1;
        Some(order)
    }

    /// Overwrite the open quantity of a resting order, adjusting the level
    /// aggregate by the delta.
    pub fn update_open_quantity(&mut self, order_id: OrderId, new_quantity: Quantity) -> bool {
        let Some(order) = self.orders.iter_mut().find(|o| o.id() == order_id) else {
            return false;
        };
        let old = order.open_quantity();
        order.set_open_quantity(new_quantity);
        self.total_quantity = self.total_quantity - old + new_quantity;
        true
    }

    /// Match up to `incoming_quantity` units against the resting orders at
    /// this price, head-first.
    ///
    /// `incoming_quantity` is in/out: it is decremented by the filled amount.
    /// Fully consumed resting orders become `Fulfilled` and leave the level;
    /// a partially consumed head becomes `PartiallyFilled` and stays, which by
    /// construction means the incoming quantity is exhausted.
    pub fn match_incoming(&mut self, incoming_quantity: &mut Quantity) -> MatchResult {
        let mut result = MatchResult::default();

        while *incoming_quantity > 0 {
            let Some(resting) = self.orders.front_mut() else {
                break;
            };

            let available = resting.open_quantity();
            let fill = available.min(*incoming_quantity);

            *incoming_quantity -= fill;
            self.total_quantity -= fill;

            result.trades.push(MatchedTrade {
                resting_order_id: resting.id(),
                quantity: fill,
                price: self.price,
            });

            if fill == available {
                resting.set_open_quantity(0);
                resting.set_status(OrderStatus::Fulfilled);
                result.filled_order_ids.push(resting.id());
                self.orders.pop_front();
                self.order_count -= 1;
            } else {
                resting.set_open_quantity(available - fill);
                resting.set_status(OrderStatus::PartiallyFilled);
                // The incoming side is exhausted whenever the resting head survives.
                break;
            }
        }

        result
    }
}
