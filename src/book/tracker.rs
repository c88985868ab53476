//! One side of an order book: sorted price levels plus an order locator.
//!
//! The tracker executes matches described by a [`Condition`] and knows nothing
//! about order types or time-in-force. Higher layers decide *what* to match
//! (by building the condition); the tracker decides *how* to walk the levels.

use super::price_level::PriceLevel;
use super::trade::MatchResult;
use crate::orders::{Order, OrderId, Price, Quantity, Side};
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// Depth limit meaning "walk as many levels as it takes".
pub const DEPTH_UNLIMITED: usize = usize::MAX;

/// Parameters of a single matching attempt.
///
/// Built by the type strategy from the incoming order, then adjusted by its
/// time-in-force strategy. `quantity` is decremented in place as fills occur,
/// so after the attempt it holds the unfilled remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Condition {
    /// Target quantity to match; updated to the remaining quantity.
    pub quantity: Quantity,
    /// Price bound for eligible levels (side-aware, see
    /// [`OrderTracker::match_order`]).
    pub price_limit: Price,
    /// Maximum number of distinct price levels this attempt may consume.
    pub depth_limit: usize,
    /// When set, the attempt must fill `quantity` completely or not at all;
    /// the execution stage dry-runs availability before committing.
    pub all_or_none: bool,
}

/// Sorted price levels and the order locator for one side of a book.
///
/// Level ordering is side-aware: the BUY side yields its highest price first,
/// the SELL side its lowest, so a best-first walk is just map iteration.
#[derive(Debug)]
pub struct OrderTracker {
    side: Side,
    levels: BTreeMap<Price, PriceLevel>,
    locator: HashMap<OrderId, Price>,
}

impl OrderTracker {
    /// Create an empty tracker for `side`.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            locator: HashMap::new(),
        }
    }

    /// The side this tracker represents.
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Number of price levels currently held.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Number of resting orders across all levels.
    pub fn order_count(&self) -> u64 {
        self.levels.values().map(PriceLevel::order_count).sum()
    }

    /// Total open quantity across all levels.
    pub fn total_quantity(&self) -> Quantity {
        self.levels.values().map(PriceLevel::total_quantity).sum()
    }

    /// True when an order with this id rests on this side.
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.locator.contains_key(&order_id)
    }

    /// Best price on this side: highest bid or lowest ask.
    pub fn best_price(&self) -> Option<Price> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    /// Iterate levels in best-first order.
    pub fn levels(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.values().rev()),
            Side::Sell => Box::new(self.levels.values()),
        }
    }

    /// Whether a level at `level_price` may trade under `price_limit`.
    ///
    /// This tracker holds the *resting* side, so the rule inverts per side:
    /// a SELL level is eligible while it asks no more than the buyer's limit;
    /// a BUY level is eligible while it bids no less than the seller's limit.
    #[inline]
    fn price_eligible(side: Side, level_price: Price, price_limit: Price) -> bool {
        match side {
            Side::Sell => level_price <= price_limit,
            Side::Buy => level_price >= price_limit,
        }
    }

    /// Add a resting order to its price level, creating the level on demand.
    ///
    /// Stop orders are keyed by their trigger price. A duplicate order id is
    /// ignored without error; the book is already tracking that order.
    pub fn add_order(&mut self, order: Order) {
        let id = order.id();
        if self.locator.contains_key(&id) {
            trace!(order_id = id, "duplicate order id ignored");
            return;
        }

        let key = if order.order_type().has_stop_price() {
            order.stop_price()
        } else {
            order.price()
        };

        self.levels
            .entry(key)
            .or_insert_with(|| PriceLevel::new(key))
            .add(order);
        self.locator.insert(id, key);
    }

    /// Remove a resting order by id, pruning its level if that empties it.
    pub fn remove_order(&mut self, order_id: OrderId) -> Option<Order> {
        let price = self.locator.remove(&order_id)?;
        let level = self.levels.get_mut(&price)?;
        let order = level.remove(order_id);
        if level.is_empty() {
            self.levels.remove(&price);
        }
        order
    }

    /// Execute the match described by `condition` against this side.
    ///
    /// Walks levels best-first while quantity remains, the consumed-level
    /// count stays under `depth_limit`, and level prices stay eligible.
    /// `condition.quantity` is decremented in place; levels emptied by the
    /// match are pruned afterwards, as are locator entries of fully filled
    /// resting orders.
    pub fn match_order(&mut self, condition: &mut Condition) -> MatchResult {
        let side = self.side;
        let mut result = MatchResult::default();
        let mut depth = 0usize;
        let mut emptied: Vec<Price> = Vec::new();

        let level_iter: Box<dyn Iterator<Item = (&Price, &mut PriceLevel)> + '_> = match side {
            Side::Buy => Box::new(self.levels.iter_mut().rev()),
            Side::Sell => Box::new(self.levels.iter_mut()),
        };

        for (&price, level) in level_iter {
            if condition.quantity == 0 || depth >= condition.depth_limit {
                break;
            }
            if !Self::price_eligible(side, price, condition.price_limit) {
                break;
            }
            if level.is_empty() {
                emptied.push(price);
                depth += 1;
                continue;
            }

            let level_result = level.match_incoming(&mut condition.quantity);
            if level.is_empty() {
                emptied.push(price);
            }
            result.merge(level_result);
            depth += 1;
        }

        for price in emptied {
            self.levels.remove(&price);
        }
        for filled_id in &result.filled_order_ids {
            self.locator.remove(filled_id);
        }

        result
    }

    /// Dry-run of [`Self::match_order`]: the quantity that *would* fill under
    /// `condition`, without touching any resting order.
    ///
    /// Used to enforce all-or-nothing semantics; the walk applies the same
    /// price and depth constraints as the real match and stops early once the
    /// target quantity is reachable.
    pub fn available_quantity(&self, condition: &Condition) -> Quantity {
        let mut available: Quantity = 0;
        let mut depth = 0usize;

        for level in self.levels() {
            if available >= condition.quantity || depth >= condition.depth_limit {
                break;
            }
            if !Self::price_eligible(self.side, level.price(), condition.price_limit) {
                break;
            }
            available = available.saturating_add(level.total_quantity());
            depth += 1;
        }

        available.min(condition.quantity)
    }
}
