//! Order entity, scalar types, and the validation chain.

mod order;
mod types;
mod validation;

pub use order::Order;
pub use types::{
    OrderId, OrderStatus, OrderType, PRICE_MAX, Price, Quantity, Side, Symbol, TimeInForce,
};
pub use validation::{
    InvalidOrder, LimitPriceRequiredValidator, NoOpValidator, QuantityValidator,
    StopPriceRequiredValidator, Validator, ValidatorChain, default_validator,
    set_default_validator,
};
