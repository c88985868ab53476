//! Property tests for the quantified invariants of the matching engine.

use matchbook::OrderBook;
use matchbook::orders::{Order, OrderStatus, Side, TimeInForce, ValidatorChain};
use proptest::prelude::*;
use std::collections::HashSet;

fn limit_tif(id: u64, side: Side, quantity: u64, price: i64, tif: TimeInForce) -> Order {
    Order::limit_with(
        id,
        side,
        quantity,
        "PROP".into(),
        price,
        &ValidatorChain::standard(),
        tif,
    )
    .unwrap()
}

fn limit(id: u64, side: Side, quantity: u64, price: i64) -> Order {
    limit_tif(id, side, quantity, price, TimeInForce::DAY)
}

/// Seed a book with resting orders on `side`, ids 1000, 1001, ...
fn seed(book: &mut OrderBook, side: Side, resting: &[(u64, i64)]) {
    for (index, (quantity, price)) in resting.iter().enumerate() {
        book.process_order(limit(1_000 + index as u64, side, *quantity, *price));
    }
}

proptest! {
    /// Σ trade quantities + final open quantity == original quantity.
    #[test]
    fn quantity_is_conserved(
        resting in prop::collection::vec((1u64..100, 95i64..105), 0..12),
        quantity in 1u64..500,
        price in 90i64..110,
    ) {
        let mut book = OrderBook::new("PROP");
        seed(&mut book, Side::Sell, &resting);

        let report = book.process_order(limit(1, Side::Buy, quantity, price));

        let traded: u64 = report.trades.iter().map(|t| t.quantity).sum();
        prop_assert_eq!(traded, report.executed_quantity);
        prop_assert_eq!(report.executed_quantity + report.open_quantity, quantity);
    }

    /// No BUY trade above the buyer's limit.
    #[test]
    fn buy_trades_respect_the_price_limit(
        resting in prop::collection::vec((1u64..100, 95i64..105), 1..12),
        quantity in 1u64..500,
        price in 90i64..110,
    ) {
        let mut book = OrderBook::new("PROP");
        seed(&mut book, Side::Sell, &resting);

        let report = book.process_order(limit(1, Side::Buy, quantity, price));
        for trade in &report.trades {
            prop_assert!(trade.price <= price);
        }
    }

    /// No SELL trade below the seller's limit.
    #[test]
    fn sell_trades_respect_the_price_limit(
        resting in prop::collection::vec((1u64..100, 95i64..105), 1..12),
        quantity in 1u64..500,
        price in 90i64..110,
    ) {
        let mut book = OrderBook::new("PROP");
        seed(&mut book, Side::Buy, &resting);

        let report = book.process_order(limit(1, Side::Sell, quantity, price));
        for trade in &report.trades {
            prop_assert!(trade.price >= price);
        }
    }

    /// Within one price level, fills happen in insertion order. Resting ids
    /// ascend with insertion, so trade ids must ascend too.
    #[test]
    fn fills_within_a_level_are_fifo(
        quantities in prop::collection::vec(1u64..50, 2..10),
        incoming in 1u64..400,
    ) {
        let mut book = OrderBook::new("PROP");
        let resting: Vec<(u64, i64)> = quantities.iter().map(|q| (*q, 100)).collect();
        seed(&mut book, Side::Sell, &resting);

        let report = book.process_order(limit(1, Side::Buy, incoming, 100));
        let ids: Vec<u64> = report.trades.iter().map(|t| t.resting_order_id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        prop_assert_eq!(ids, sorted);
    }

    /// An IOC order consumes at most one distinct price level.
    #[test]
    fn ioc_touches_at_most_one_level(
        resting in prop::collection::vec((1u64..100, 95i64..105), 1..12),
        quantity in 1u64..500,
        price in 90i64..110,
    ) {
        let mut book = OrderBook::new("PROP");
        seed(&mut book, Side::Sell, &resting);

        let report = book.process_order(limit_tif(
            1,
            Side::Buy,
            quantity,
            price,
            TimeInForce::IMMEDIATE_OR_CANCEL,
        ));
        let prices: HashSet<i64> = report.trades.iter().map(|t| t.price).collect();
        prop_assert!(prices.len() <= 1);
        // IOC never rests.
        prop_assert_eq!(book.tracker(Side::Buy).order_count(), 0);
    }

    /// AON/FOK either fill completely or leave the opposite side untouched.
    #[test]
    fn all_or_none_is_atomic(
        resting in prop::collection::vec((1u64..100, 95i64..105), 0..12),
        quantity in 1u64..500,
        price in 90i64..110,
        kill in proptest::bool::ANY,
    ) {
        let mut book = OrderBook::new("PROP");
        seed(&mut book, Side::Sell, &resting);
        let before = book.tracker(Side::Sell).total_quantity();

        let tif = if kill {
            TimeInForce::FILL_OR_KILL
        } else {
            TimeInForce::ALL_OR_NONE
        };
        let report = book.process_order(limit_tif(1, Side::Buy, quantity, price, tif));

        if report.status == OrderStatus::Fulfilled {
            prop_assert_eq!(report.executed_quantity, quantity);
            prop_assert_eq!(book.tracker(Side::Sell).total_quantity(), before - quantity);
        } else {
            prop_assert!(report.trades.is_empty());
            prop_assert_eq!(book.tracker(Side::Sell).total_quantity(), before);
        }
    }

    /// Status never regresses: a terminal report means the order left the
    /// book; an active report means it rests on its own side.
    #[test]
    fn terminal_orders_never_rest(
        resting in prop::collection::vec((1u64..100, 95i64..105), 0..8),
        quantity in 1u64..300,
        price in 90i64..110,
    ) {
        let mut book = OrderBook::new("PROP");
        seed(&mut book, Side::Sell, &resting);

        let report = book.process_order(limit(1, Side::Buy, quantity, price));
        let rests = book.tracker(Side::Buy).contains_order(1);
        prop_assert_eq!(rests, !report.status.is_terminal());
    }
}
