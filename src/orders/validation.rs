//! Order validation: a chain of small rules run before an order is born.
//!
//! Factories never hand out an [`Order`](super::Order) that failed its
//! validator, so downstream code can rely on structural invariants (positive
//! quantity, required prices present) without re-checking them.

use super::order::Order;
use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

/// Rejection produced by a validator or by the ingress parser.
///
/// Carried as data, not as a panic: an invalid order is an expected event at
/// the system boundary and is logged and dropped there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid order: {reason}")]
pub struct InvalidOrder {
    /// Human-readable reason for the rejection.
    pub reason: String,
}

impl InvalidOrder {
    /// Build a rejection from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A single validation rule over a candidate order.
pub trait Validator: Send + Sync {
    /// Accept the order or reject it with a reason.
    fn validate(&self, order: &Order) -> Result<(), InvalidOrder>;
}

/// Ordered chain of validators; runs members in insertion order and
/// short-circuits on the first failure.
#[derive(Default)]
pub struct ValidatorChain {
    chain: Vec<Box<dyn Validator>>,
}

impl ValidatorChain {
    /// An empty chain that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain shipped with the engine: quantity, limit-price and
    /// stop-price rules, in that order.
    pub fn standard() -> Self {
        let mut chain = Self::new();
        chain.add(Box::new(QuantityValidator));
        chain.add(Box::new(LimitPriceRequiredValidator));
        chain.add(Box::new(StopPriceRequiredValidator));
        chain
    }

    /// Append a validator to the end of the chain.
    pub fn add(&mut self, validator: Box<dyn Validator>) {
        self.chain.push(validator);
    }

    /// Number of validators in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// True when the chain has no members.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

impl Validator for ValidatorChain {
    fn validate(&self, order: &Order) -> Result<(), InvalidOrder> {
        for validator in &self.chain {
            validator.validate(order)?;
        }
        Ok(())
    }
}

/// Accepts every order. The default until [`set_default_validator`] is called.
pub struct NoOpValidator;

impl Validator for NoOpValidator {
    fn validate(&self, _order: &Order) -> Result<(), InvalidOrder> {
        Ok(())
    }
}

/// Rejects non-positive quantities.
pub struct QuantityValidator;

impl Validator for QuantityValidator {
    fn validate(&self, order: &Order) -> Result<(), InvalidOrder> {
        if order.quantity() == 0 {
            return Err(InvalidOrder::new("Quantity must be > 0"));
        }
        Ok(())
    }
}

/// Requires a positive limit price on LIMIT and STOP_LIMIT orders.
pub struct LimitPriceRequiredValidator;

impl Validator for LimitPriceRequiredValidator {
    fn validate(&self, order: &Order) -> Result<(), InvalidOrder> {
        if order.order_type().has_limit_price() && order.price() <= 0 {
            return Err(InvalidOrder::new("Limit/stop-limit requires limit price > 0"));
        }
        Ok(())
    }
}

/// Requires a positive stop price on STOP and STOP_LIMIT orders.
pub struct StopPriceRequiredValidator;

impl Validator for StopPriceRequiredValidator {
    fn validate(&self, order: &Order) -> Result<(), InvalidOrder> {
        if order.order_type().has_stop_price() && order.stop_price() <= 0 {
            return Err(InvalidOrder::new("Stop/stop-limit requires stop price > 0"));
        }
        Ok(())
    }
}

static DEFAULT_VALIDATOR: LazyLock<RwLock<Arc<dyn Validator>>> =
    LazyLock::new(|| RwLock::new(Arc::new(NoOpValidator)));

/// Install the process-wide default validator used by the plain factories.
///
/// Call once during startup, before orders are created from multiple threads.
pub fn set_default_validator(validator: Arc<dyn Validator>) {
    *DEFAULT_VALIDATOR.write() = validator;
}

/// The currently installed default validator.
pub fn default_validator() -> Arc<dyn Validator> {
    DEFAULT_VALIDATOR.read().clone()
}
