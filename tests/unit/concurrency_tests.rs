//! Concurrency contracts: registry identity, thread confinement, and
//! per-symbol ordering through the schedulers.

use dashmap::DashMap;
use matchbook::book::{ExecutionReport, OrderBookRegistry};
use matchbook::orders::{Order, Side, TimeInForce, ValidatorChain};
use matchbook::scheduler::OrderBookScheduler;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;

fn limit(id: u64, symbol: &str, side: Side, quantity: u64, price: i64) -> Order {
    Order::limit_with(
        id,
        side,
        quantity,
        symbol.into(),
        price,
        &ValidatorChain::standard(),
        TimeInForce::DAY,
    )
    .unwrap()
}

#[test]
fn registry_get_or_create_is_idempotent_across_threads() {
    let registry = Arc::new(OrderBookRegistry::new());
    let mut handles = Vec::new();

    for _ in 0..16 {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            let book = registry.get_or_create("RACE");
            Arc::as_ptr(&book) as usize
        }));
    }

    let pointers: HashSet<usize> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    // Every thread observed the same book instance.
    assert_eq!(pointers.len(), 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn each_book_is_mutated_by_exactly_one_thread() {
    let registry = Arc::new(OrderBookRegistry::new());

    // Record, per symbol, the ids of the threads observed inside
    // `process_order` (the listener runs on the processing thread).
    let observed: Arc<DashMap<String, HashSet<thread::ThreadId>>> = Arc::new(DashMap::new());
    let observed_in_listener = Arc::clone(&observed);
    registry.set_default_trade_listener(Arc::new(move |report: &ExecutionReport| {
        observed_in_listener
            .entry(report.symbol.clone())
            .or_default()
            .insert(thread::current().id());
    }));

    let mut assignments = HashMap::new();
    assignments.insert("AAA".to_string(), "CF_Worker_0".to_string());
    assignments.insert("BBB".to_string(), "CF_Worker_1".to_string());
    assignments.insert("CCC".to_string(), "CF_Worker_0".to_string());
    let scheduler = Arc::new(
        OrderBookScheduler::new("CF_Worker", 2, assignments, Arc::clone(&registry)).unwrap(),
    );
    scheduler.start();

    // Hammer all symbols from several submitter threads.
    let mut submitters = Vec::new();
    for submitter in 0..4u64 {
        let scheduler = Arc::clone(&scheduler);
        submitters.push(thread::spawn(move || {
            for index in 0..50u64 {
                let id = submitter * 1_000 + index;
                for symbol in ["AAA", "BBB", "CCC"] {
                    let side = if index % 2 == 0 { Side::Sell } else { Side::Buy };
                    scheduler
                        .process_order(limit(id, symbol, side, 10, 100))
                        .unwrap();
                }
            }
        }));
    }
    for submitter in submitters {
        submitter.join().unwrap();
    }
    scheduler.shutdown();

    for entry in observed.iter() {
        assert_eq!(
            entry.value().len(),
            1,
            "symbol {} was touched by more than one thread",
            entry.key()
        );
    }
    assert_eq!(observed.len(), 3);
}

#[test]
fn processing_order_matches_submission_order_per_symbol() {
    let registry = Arc::new(OrderBookRegistry::new());

    let processed: Arc<DashMap<String, Vec<u64>>> = Arc::new(DashMap::new());
    let processed_in_listener = Arc::clone(&processed);
    registry.set_default_trade_listener(Arc::new(move |report: &ExecutionReport| {
        processed_in_listener
            .entry(report.symbol.clone())
            .or_default()
            .push(report.order_id);
    }));

    let mut assignments = HashMap::new();
    assignments.insert("SEQ".to_string(), "SQ_Worker_0".to_string());
    let scheduler =
        OrderBookScheduler::new("SQ_Worker", 1, assignments, Arc::clone(&registry)).unwrap();
    scheduler.start();

    // Non-crossing sells at distinct prices: every order rests, none match.
    for id in 0..200u64 {
        scheduler
            .process_order(limit(id, "SEQ", Side::Sell, 10, 1_000 + id as i64))
            .unwrap();
    }
    scheduler.shutdown();

    let sequence = processed.get("SEQ").unwrap();
    assert_eq!(sequence.len(), 200);
    assert_eq!(*sequence, (0..200).collect::<Vec<u64>>());

    let book = registry.get("SEQ").unwrap();
    assert_eq!(book.lock().tracker(Side::Sell).order_count(), 200);
}

#[test]
fn books_on_the_same_worker_stay_independent() {
    let registry = Arc::new(OrderBookRegistry::new());
    let mut assignments = HashMap::new();
    assignments.insert("ONE".to_string(), "SH_Worker_0".to_string());
    assignments.insert("TWO".to_string(), "SH_Worker_0".to_string());
    let scheduler =
        OrderBookScheduler::new("SH_Worker", 1, assignments, Arc::clone(&registry)).unwrap();
    scheduler.start();

    scheduler
        .process_order(limit(1, "ONE", Side::Sell, 50, 100))
        .unwrap();
    scheduler
        .process_order(limit(2, "TWO", Side::Buy, 50, 100))
        .unwrap();
    scheduler.shutdown();

    // Orders in different symbols never cross, even on a shared worker.
    let one = registry.get("ONE").unwrap();
    let two = registry.get("TWO").unwrap();
    assert_eq!(one.lock().stats().total_trades, 0);
    assert_eq!(two.lock().stats().total_trades, 0);
    assert_eq!(one.lock().best_ask(), Some(100));
    assert_eq!(two.lock().best_bid(), Some(100));
}
