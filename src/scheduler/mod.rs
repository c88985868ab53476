//! Worker threads and the two schedulers built on them: symbol-affine book
//! workers and round-robin ingress workers.

mod book_scheduler;
mod core;
mod ingress;
mod task;
mod worker;

pub use book_scheduler::OrderBookScheduler;
pub use core::{SchedulerCore, SchedulerError};
pub use ingress::{IngressScheduler, parse_order_message};
pub use task::{CancelToken, Task, TaskFn};
pub use worker::{Worker, WorkerId};
