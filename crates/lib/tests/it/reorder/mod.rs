//! Optimistic reorder tests
//!
//! - scenarios: the list-move and position outcomes after persisting and refetching
//! - failures: write and read failures against a fault-injecting backend
//! - concurrency: overlapping reorders and independent collections

mod concurrency;
mod scenarios;
