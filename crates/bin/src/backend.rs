//! Backend creation and utility functions.

use std::path::PathBuf;
use std::sync::Arc;

use kindred::backend::ContentBackend;
use kindred::backend::database::{InMemory, SqlxBackend};
use kindred::constants::{CONTENT_FILE, SQLITE_FILE};

use crate::cli::{Backend, BackendArgs};

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

/// Directory holding the backend's files.
pub fn data_dir(args: &BackendArgs) -> PathBuf {
    args.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

/// Human-readable description of the configured backend
pub fn backend_label(args: &BackendArgs) -> String {
    match args.backend {
        Backend::Sqlite => format!("sqlite ({})", data_dir(args).join(SQLITE_FILE).display()),
        Backend::Postgres => match &args.postgres_url {
            Some(url) => format!("postgres ({})", redact_postgres_url(url)),
            None => "postgres".to_string(),
        },
        Backend::Inmemory => format!("inmemory ({})", data_dir(args).join(CONTENT_FILE).display()),
    }
}

/// Create the appropriate backend based on configuration
pub async fn create_backend(
    args: &BackendArgs,
) -> Result<Arc<dyn ContentBackend>, Box<dyn std::error::Error>> {
    let data_dir = data_dir(args);

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    match args.backend {
        Backend::Sqlite => {
            let db_path = data_dir.join(SQLITE_FILE);
            tracing::info!("Using SQLite backend at {}", db_path.display());
            Ok(Arc::new(SqlxBackend::open_sqlite(&db_path).await?))
        }
        Backend::Postgres => {
            let url = args
                .postgres_url
                .as_ref()
                .ok_or("PostgreSQL backend requires --postgres-url or KINDRED_POSTGRES_URL")?;

            let display_url = redact_postgres_url(url);
            tracing::info!("Connecting to PostgreSQL backend at {}", display_url);

            match SqlxBackend::connect_postgres(url).await {
                Ok(backend) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(Arc::new(backend))
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {}: {}", display_url, e).into())
                }
            }
        }
        Backend::Inmemory => {
            let json_path = data_dir.join(CONTENT_FILE);
            tracing::info!(
                "Using in-memory backend with persistence at {}",
                json_path.display()
            );
            if !tokio::fs::try_exists(&json_path).await? {
                tracing::info!("Starting with empty content");
                return Ok(Arc::new(InMemory::new()));
            }
            let backend = InMemory::load_from_file(&json_path).await?;
            tracing::info!("Loaded existing content from {}", json_path.display());
            Ok(Arc::new(backend))
        }
    }
}
