//! Process-wide symbol → order book registry with double-checked creation.

use super::book::OrderBook;
use super::trade::TradeListener;
use crate::orders::Symbol;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// A book as the registry hands it out: behind a mutex that only the owning
/// worker locks. The scheduler routes all of a symbol's work to one worker,
/// so the lock is uncontended; it exists to express exclusive access to the
/// type system, not to coordinate threads.
pub type SharedBook = Mutex<OrderBook>;

/// Lazily populated mapping from symbol to its order book.
///
/// Reads take a shared lock; a miss escalates to the exclusive lock and
/// re-checks before creating, so concurrent callers always converge on the
/// same book instance.
#[derive(Default)]
pub struct OrderBookRegistry {
    books: RwLock<HashMap<Symbol, Arc<SharedBook>>>,
    default_listener: RwLock<Option<TradeListener>>,
}

static GLOBAL: LazyLock<Arc<OrderBookRegistry>> =
    LazyLock::new(|| Arc::new(OrderBookRegistry::new()));

impl OrderBookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by the schedulers.
    pub fn global() -> Arc<OrderBookRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Install a trade listener attached to every book this registry creates
    /// from now on.
    pub fn set_default_trade_listener(&self, listener: TradeListener) {
        *self.default_listener.write() = Some(listener);
    }

    /// Look up the book for `symbol`, if it exists.
    pub fn get(&self, symbol: &str) -> Option<Arc<SharedBook>> {
        self.books.read().get(symbol).cloned()
    }

    /// Look up or create the book for `symbol`.
    pub fn get_or_create(&self, symbol: &str) -> Arc<SharedBook> {
        // Fast path: shared lock.
        if let Some(book) = self.get(symbol) {
            return book;
        }

        // Slow path: exclusive lock, re-check (another thread may have
        // created the book between the two locks), then create.
        let mut books = self.books.write();
        if let Some(book) = books.get(symbol) {
            return Arc::clone(book);
        }

        debug!(symbol, "creating order book");
        let mut book = OrderBook::new(symbol);
        if let Some(listener) = self.default_listener.read().clone() {
            book.set_trade_listener(listener);
        }
        let shared = Arc::new(Mutex::new(book));
        books.insert(symbol.to_string(), Arc::clone(&shared));
        shared
    }

    /// True when a book exists for `symbol`.
    pub fn contains(&self, symbol: &str) -> bool {
        self.books.read().contains_key(symbol)
    }

    /// Evict the book for `symbol`. The caller is responsible for ensuring no
    /// worker still routes orders to it.
    pub fn remove(&self, symbol: &str) -> Option<Arc<SharedBook>> {
        self.books.write().remove(symbol)
    }

    /// Evict every book.
    pub fn clear(&self) {
        self.books.write().clear();
    }

    /// Number of registered books.
    pub fn len(&self) -> usize {
        self.books.read().len()
    }

    /// True when no book is registered.
    pub fn is_empty(&self) -> bool {
        self.books.read().is_empty()
    }
}
