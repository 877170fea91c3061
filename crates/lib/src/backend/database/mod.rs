//! Database-style backend implementations
//!
//! - [`InMemory`]: records in a map, saved to and loaded from a JSON file.
//! - [`SqlxBackend`]: SQLite or PostgreSQL through sqlx (features `sqlite`, `postgres`).

mod in_memory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;

pub use in_memory::InMemory;
#[cfg(feature = "postgres")]
pub use sql::Postgres;
#[cfg(feature = "sqlite")]
pub use sql::Sqlite;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub use sql::{DbKind, SqlxBackend};
