//! SQL-based content backends.
//!
//! - **SQLite** (feature: `sqlite`): embedded database file
//! - **PostgreSQL** (feature: `postgres`): shared database server
//!
//! Both run through sqlx's `AnyPool`. Queries use `$N` placeholders, which
//! both dialects accept; the only dialect-specific statements live in
//! [`schema`].

/// Schema definition and version check.
pub mod schema;
mod storage;

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;

use crate::Result;
use crate::backend::ContentBackend;
use crate::backend::errors::BackendError;
use crate::clock::{Clock, SystemClock};
use crate::entity::{CollectionScope, Fields, ItemId, NewRecord, Position, Record};

/// Extension trait for sqlx Result types to attach a context message.
pub(crate) trait SqlxResultExt<T> {
    fn sql_context(self, context: &str) -> Result<T>;
}

impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn sql_context(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            BackendError::SqlxError {
                reason: format!("{context}: {e}"),
                source: Some(e),
            }
            .into()
        })
    }
}

/// Database backend kind for SQL dialect selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Sqlite,
    Postgres,
}

/// SQL-based backend implementing [`ContentBackend`] using sqlx.
pub struct SqlxBackend {
    pool: AnyPool,
    kind: DbKind,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SqlxBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlxBackend")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl SqlxBackend {
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn kind(&self) -> DbKind {
        self.kind
    }

    pub fn is_sqlite(&self) -> bool {
        self.kind == DbKind::Sqlite
    }

    pub fn is_postgres(&self) -> bool {
        self.kind == DbKind::Postgres
    }

    /// Replace the clock used to stamp records.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn now_millis(&self) -> i64 {
        i64::try_from(self.clock.now_millis()).unwrap_or(i64::MAX)
    }

    async fn from_pool(pool: AnyPool, kind: DbKind) -> Result<Self> {
        let backend = Self {
            pool,
            kind,
            clock: Arc::new(SystemClock),
        };
        schema::initialize(&backend).await?;
        Ok(backend)
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(feature = "sqlite")]
impl SqlxBackend {
    /// Open a SQLite database file, creating it and the schema if needed.
    pub async fn open_sqlite<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        // mode=rwc: read-write-create
        let url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        Self::connect_sqlite(&url).await
    }

    /// Connect to a SQLite database using a connection URL.
    pub async fn connect_sqlite(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let is_in_memory = url.contains("mode=memory");

        // An in-memory SQLite database disappears when its last connection
        // closes, so keep one connection alive for the pool's lifetime.
        let pool = if is_in_memory {
            AnyPoolOptions::new()
                .max_connections(5)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(url)
                .await
                .sql_context("Failed to connect to SQLite")?
        } else {
            AnyPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await
                .sql_context("Failed to connect to SQLite")?
        };

        if is_in_memory {
            sqlx::query("PRAGMA busy_timeout = 5000;")
                .execute(&pool)
                .await
                .sql_context("Failed to configure SQLite")?;
        } else {
            sqlx::query(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )
            .execute(&pool)
            .await
            .sql_context("Failed to configure SQLite")?;
        }

        Self::from_pool(pool, DbKind::Sqlite).await
    }

    /// Create an in-memory SQLite database that lives as long as this backend.
    pub async fn sqlite_in_memory() -> Result<Self> {
        // Shared cache so every pooled connection sees the same database; a
        // unique name so separate backends never share one.
        let unique_id = uuid::Uuid::new_v4();
        let url = format!("sqlite:file:mem_{unique_id}?mode=memory&cache=shared");
        Self::connect_sqlite(&url).await
    }
}

#[cfg(feature = "postgres")]
impl SqlxBackend {
    /// Connect to a PostgreSQL database using a connection URL.
    pub async fn connect_postgres(url: &str) -> Result<Self> {
        Self::connect_postgres_with_schema(url, None).await
    }

    /// Connect to PostgreSQL inside a fresh schema so parallel tests never collide.
    pub async fn connect_postgres_isolated(url: &str) -> Result<Self> {
        // Schema names must start with a letter and be lowercase.
        let unique_id = uuid::Uuid::new_v4().simple().to_string();
        Self::connect_postgres_with_schema(url, Some(format!("test_{unique_id}"))).await
    }

    async fn connect_postgres_with_schema(url: &str, schema_name: Option<String>) -> Result<Self> {
        use sqlx::Executor;
        use std::time::Duration;

        sqlx::any::install_default_drivers();

        if let Some(ref schema) = schema_name {
            let temp_pool = AnyPoolOptions::new()
                .max_connections(1)
                .connect(url)
                .await
                .sql_context("Failed to connect to PostgreSQL")?;
            sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"))
                .execute(&temp_pool)
                .await
                .sql_context(&format!("Failed to create schema {schema}"))?;
            temp_pool.close().await;
        }

        let is_isolated = schema_name.is_some();
        let mut pool_options = AnyPoolOptions::new();
        if is_isolated {
            pool_options = pool_options
                .max_connections(2)
                .acquire_timeout(Duration::from_secs(30));
        } else {
            pool_options = pool_options.max_connections(5);
        }

        let pool = pool_options
            .after_connect(move |conn, _meta| {
                let schema = schema_name.clone();
                Box::pin(async move {
                    if let Some(ref s) = schema {
                        let set_path = format!("SET search_path TO {s}");
                        conn.execute(set_path.as_str()).await?;
                    }
                    Ok(())
                })
            })
            .connect(url)
            .await
            .sql_context("Failed to connect to PostgreSQL")?;

        Self::from_pool(pool, DbKind::Postgres).await
    }
}

#[async_trait]
impl ContentBackend for SqlxBackend {
    async fn fetch_collection(&self, scope: &CollectionScope) -> Result<Vec<Record>> {
        storage::fetch_collection(self, scope).await
    }

    async fn get_item(&self, id: &ItemId) -> Result<Record> {
        storage::get_item(self, id).await
    }

    async fn create_item(&self, new: NewRecord) -> Result<Record> {
        storage::create_item(self, new).await
    }

    async fn write_position(&self, id: &ItemId, position: Position) -> Result<()> {
        storage::write_position(self, id, position).await
    }

    async fn update_fields(&self, id: &ItemId, fields: Fields) -> Result<Record> {
        storage::update_fields(self, id, fields).await
    }

    async fn delete_item(&self, id: &ItemId) -> Result<()> {
        storage::delete_item(self, id).await
    }

    async fn count(&self, scope: &CollectionScope) -> Result<usize> {
        storage::count(self, scope).await
    }

    fn kind_label(&self) -> &'static str {
        match self.kind {
            DbKind::Sqlite => "sqlite",
            DbKind::Postgres => "postgres",
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(feature = "sqlite")]
/// Convenience type alias for SQLite backend using sqlx.
pub type Sqlite = SqlxBackend;

#[cfg(feature = "postgres")]
/// Convenience type alias for PostgreSQL backend using sqlx.
pub type Postgres = SqlxBackend;
