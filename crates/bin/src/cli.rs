//! CLI argument definitions for the Kindred binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Storage backend type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// SQLite database (default)
    Sqlite,
    /// PostgreSQL database (shared server)
    Postgres,
    /// In-memory with JSON persistence (development)
    Inmemory,
}

/// Kindred donation site server
#[derive(Parser, Debug)]
#[command(name = "kindred")]
#[command(about = "Kindred: donation site with an in-place visual editor")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Kindred web server
    Serve(ServeArgs),
    /// Check health of a running Kindred server
    Health(HealthArgs),
    /// Show the backend and how many items each collection holds
    Info(InfoArgs),
}

/// Storage selection shared by commands that open the content store
#[derive(clap::Args, Debug, Clone)]
pub struct BackendArgs {
    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "KINDRED_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores kindred.db
    /// For InMemory: stores kindred.json
    #[arg(short = 'D', long, env = "KINDRED_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "KINDRED_POSTGRES_URL")]
    pub postgres_url: Option<String>,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "KINDRED_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "KINDRED_HOST")]
    pub host: String,

    #[command(flatten)]
    pub backend_config: BackendArgs,

    /// Directory uploaded images are written to (defaults to <data-dir>/assets)
    #[arg(long, env = "KINDRED_ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Public URL prefix under which assets are served
    #[arg(long, default_value = "/assets", env = "KINDRED_PUBLIC_URL")]
    pub public_base_url: String,

    /// Argon2 PHC hash of the admin password. Without it the admin area is disabled.
    #[arg(long, env = "KINDRED_ADMIN_PASSWORD_HASH", hide_env_values = true)]
    pub admin_password_hash: Option<String>,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            backend_config: BackendArgs {
                backend: Backend::Sqlite,
                data_dir: None,
                postgres_url: None,
            },
            assets_dir: None,
            public_base_url: "/assets".to_string(),
            admin_password_hash: None,
        }
    }
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "KINDRED_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the info command
#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub backend_config: BackendArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
