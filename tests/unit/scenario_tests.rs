//! End-to-end matching scenarios driven through `OrderBook::process_order`.

use matchbook::orders::{Order, OrderStatus, Side, TimeInForce, ValidatorChain};
use matchbook::{OrderBook, Validator};

fn limit(id: u64, side: Side, quantity: u64, price: i64) -> Order {
    limit_tif(id, side, quantity, price, TimeInForce::DAY)
}

fn limit_tif(id: u64, side: Side, quantity: u64, price: i64, tif: TimeInForce) -> Order {
    Order::limit_with(
        id,
        side,
        quantity,
        "TSLA".into(),
        price,
        &ValidatorChain::standard(),
        tif,
    )
    .unwrap()
}

fn market(id: u64, side: Side, quantity: u64) -> Order {
    Order::market_with(
        id,
        side,
        quantity,
        "TSLA".into(),
        &ValidatorChain::standard(),
        TimeInForce::DAY,
    )
    .unwrap()
}

#[test]
fn full_crossing_limit() {
    let mut book = OrderBook::new("TSLA");
    book.process_order(limit(2, Side::Sell, 50, 17_400));
    let report = book.process_order(limit(1, Side::Buy, 100, 17_500));

    assert_eq!(report.trades.len(), 1);
    assert_eq!(report.trades[0].resting_order_id, 2);
    assert_eq!(report.trades[0].quantity, 50);
    assert_eq!(report.trades[0].price, 17_400);

    // The buyer's remainder rests on the bid side at its own limit.
    assert_eq!(report.status, OrderStatus::PartiallyFilled);
    assert_eq!(report.open_quantity, 50);
    assert_eq!(book.best_bid(), Some(17_500));
    assert_eq!(book.tracker(Side::Sell).order_count(), 0);
}

#[test]
fn partial_fill_rests_remainder_of_resting_order() {
    let mut book = OrderBook::new("TSLA");
    book.process_order(limit(10, Side::Sell, 100, 100));
    let report = book.process_order(limit(11, Side::Buy, 40, 100));

    assert_eq!(report.trades.len(), 1);
    assert_eq!(report.trades[0].resting_order_id, 10);
    assert_eq!(report.trades[0].quantity, 40);
    assert_eq!(report.trades[0].price, 100);
    assert_eq!(report.status, OrderStatus::Fulfilled);

    let asks = book.tracker(Side::Sell);
    assert!(asks.contains_order(10));
    assert_eq!(asks.total_quantity(), 60);
}

#[test]
fn market_with_no_liquidity_is_cancelled() {
    let mut book = OrderBook::new("TSLA");
    let report = book.process_order(market(20, Side::Buy, 50));

    assert!(report.trades.is_empty());
    assert_eq!(report.status, OrderStatus::Cancelled);
    assert_eq!(report.open_quantity, 50);
}

#[test]
fn market_partial_fill_cancels_remainder() {
    let mut book = OrderBook::new("TSLA");
    book.process_order(limit(30, Side::Sell, 30, 100));
    let report = book.process_order(market(31, Side::Buy, 50));

    assert_eq!(report.trades.len(), 1);
    assert_eq!(report.trades[0].quantity, 30);
    assert_eq!(report.trades[0].price, 100);
    assert_eq!(report.status, OrderStatus::PartialFillCancelled);
    assert_eq!(report.open_quantity, 20);
    assert_eq!(book.tracker(Side::Buy).order_count(), 0);
}

#[test]
fn ioc_consumes_at_most_one_price_level() {
    let mut book = OrderBook::new("TSLA");
    book.process_order(limit(40, Side::Sell, 10, 100));
    book.process_order(limit(41, Side::Sell, 10, 101));

    let report = book.process_order(limit_tif(
        42,
        Side::Buy,
        25,
        101,
        TimeInForce::IMMEDIATE_OR_CANCEL,
    ));

    // Price 101 was eligible but the depth limit stopped the walk after the
    // first level.
    assert_eq!(report.trades.len(), 1);
    assert_eq!(report.trades[0].price, 100);
    assert_eq!(report.trades[0].quantity, 10);
    assert_eq!(report.status, OrderStatus::Cancelled);
    assert_eq!(report.open_quantity, 15);

    assert_eq!(book.tracker(Side::Sell).total_quantity(), 10);
    assert_eq!(book.tracker(Side::Buy).order_count(), 0);
}

#[test]
fn ioc_full_fill_within_one_level() {
    let mut book = OrderBook::new("TSLA");
    book.process_order(limit(40, Side::Sell, 25, 100));

    let report = book.process_order(limit_tif(
        41,
        Side::Buy,
        20,
        100,
        TimeInForce::IMMEDIATE_OR_CANCEL,
    ));
    assert_eq!(report.status, OrderStatus::Fulfilled);
    assert_eq!(report.open_quantity, 0);
}

#[test]
fn fok_leaves_book_unchanged_when_unfillable() {
    let mut book = OrderBook::new("TSLA");
    book.process_order(limit(50, Side::Sell, 20, 100));

    let report = book.process_order(limit_tif(51, Side::Buy, 50, 100, TimeInForce::FILL_OR_KILL));

    assert!(report.trades.is_empty());
    assert_eq!(report.status, OrderStatus::Cancelled);
    assert_eq!(report.open_quantity, 50);

    // The resting side is untouched, not partially consumed and rolled back.
    let asks = book.tracker(Side::Sell);
    assert_eq!(asks.total_quantity(), 20);
    assert!(asks.contains_order(50));
    assert_eq!(book.tracker(Side::Buy).order_count(), 0);
}

#[test]
fn fok_fills_completely_when_liquidity_suffices() {
    let mut book = OrderBook::new("TSLA");
    book.process_order(limit(50, Side::Sell, 30, 100));
    book.process_order(limit(51, Side::Sell, 30, 101));

    let report = book.process_order(limit_tif(52, Side::Buy, 50, 101, TimeInForce::FILL_OR_KILL));

    assert_eq!(report.status, OrderStatus::Fulfilled);
    assert_eq!(report.executed_quantity, 50);
    assert_eq!(report.trades.len(), 2);
    assert_eq!(book.tracker(Side::Sell).total_quantity(), 10);
}

#[test]
fn aon_rests_until_fully_fillable() {
    let mut book = OrderBook::new("TSLA");
    book.process_order(limit(60, Side::Sell, 20, 100));

    let report = book.process_order(limit_tif(61, Side::Buy, 50, 100, TimeInForce::ALL_OR_NONE));

    // Not fillable in full: no fills, the order rests pending.
    assert!(report.trades.is_empty());
    assert_eq!(report.status, OrderStatus::Pending);
    assert!(book.tracker(Side::Buy).contains_order(61));
    assert_eq!(book.tracker(Side::Sell).total_quantity(), 20);
}

#[test]
fn aon_fills_when_liquidity_suffices() {
    let mut book = OrderBook::new("TSLA");
    book.process_order(limit(60, Side::Sell, 60, 100));

    let report = book.process_order(limit_tif(61, Side::Buy, 50, 100, TimeInForce::ALL_OR_NONE));
    assert_eq!(report.status, OrderStatus::Fulfilled);
    assert_eq!(report.executed_quantity, 50);
}

#[test]
fn price_time_priority_within_a_level() {
    let mut book = OrderBook::new("TSLA");
    book.process_order(limit(100, Side::Sell, 10, 100)); // A
    book.process_order(limit(101, Side::Sell, 10, 100)); // B

    let report = book.process_order(limit(102, Side::Buy, 15, 100));

    assert_eq!(report.trades.len(), 2);
    assert_eq!(report.trades[0].resting_order_id, 100);
    assert_eq!(report.trades[0].quantity, 10);
    assert_eq!(report.trades[1].resting_order_id, 101);
    assert_eq!(report.trades[1].quantity, 5);

    let asks = book.tracker(Side::Sell);
    assert!(asks.contains_order(101));
    assert_eq!(asks.total_quantity(), 5);
}

#[test]
fn factory_rejects_zero_limit_price() {
    let err = Order::limit_with(
        1,
        Side::Buy,
        10,
        "TSLA".into(),
        0,
        &ValidatorChain::standard(),
        TimeInForce::DAY,
    )
    .unwrap_err();
    assert!(err.reason.contains("limit price"));
}

#[test]
fn duplicate_resting_id_is_dropped_silently() {
    let mut book = OrderBook::new("TSLA");
    book.process_order(limit(1, Side::Sell, 10, 100));
    book.process_order(limit(1, Side::Sell, 99, 105));

    // Both went through processing, but only the first instance rests.
    assert_eq!(book.stats().orders_added, 2);
    let asks = book.tracker(Side::Sell);
    assert_eq!(asks.order_count(), 1);
    assert_eq!(asks.total_quantity(), 10);
}

#[test]
fn stop_orders_never_rest() {
    let mut book = OrderBook::new("TSLA");
    let stop = Order::stop_with(
        70,
        Side::Sell,
        10,
        "TSLA".into(),
        95,
        &ValidatorChain::standard(),
        TimeInForce::DAY,
    )
    .unwrap();
    let report = book.process_order(stop);

    // Stop matching is not implemented; the default strategy path finalizes
    // them terminally instead of resting an untriggered order.
    assert!(report.status.is_terminal());
    assert_eq!(book.tracker(Side::Sell).order_count(), 0);
    assert_eq!(book.tracker(Side::Buy).order_count(), 0);
}

#[test]
fn status_progression_is_monotonic() {
    let mut book = OrderBook::new("TSLA");
    book.process_order(limit(80, Side::Sell, 100, 100));

    // First partial fill: Pending -> PartiallyFilled.
    book.process_order(limit(81, Side::Buy, 40, 100));
    let resting_status = book
        .tracker(Side::Sell)
        .levels()
        .next()
        .and_then(|level| level.front())
        .map(|order| order.status());
    assert_eq!(resting_status, Some(OrderStatus::PartiallyFilled));

    // Second fill completes it: PartiallyFilled -> Fulfilled, and it leaves
    // the book (a terminal status never re-enters).
    let report = book.process_order(limit(82, Side::Buy, 60, 100));
    assert_eq!(report.status, OrderStatus::Fulfilled);
    assert_eq!(book.tracker(Side::Sell).order_count(), 0);
}

#[test]
fn explicit_validator_chain_matches_default_behavior() {
    // A custom chain with only the quantity rule accepts a zero-price limit;
    // the pipeline still aborts it before matching.
    let mut chain = ValidatorChain::new();
    chain.add(Box::new(matchbook::orders::QuantityValidator));
    let order =
        Order::limit_with(1, Side::Buy, 10, "TSLA".into(), 0, &chain, TimeInForce::DAY).unwrap();
    assert!(chain.validate(&order).is_ok());

    let mut book = OrderBook::new("TSLA");
    let report = book.process_order(order);
    assert_eq!(report.status, OrderStatus::Cancelled);
    assert!(report.abort_reason.unwrap().contains("Invalid limit price"));
}
