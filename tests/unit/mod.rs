//! Integration test suites.

mod concurrency_tests;
mod invariant_tests;
mod scenario_tests;
