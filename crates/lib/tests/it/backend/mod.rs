//! Backend tests
//!
//! Contract tests for every `ContentBackend` implementation plus the
//! JSON persistence of the in-memory backend.

mod basic_operations;
mod save_load;
#[cfg(feature = "sqlite")]
mod sqlite_parity;
