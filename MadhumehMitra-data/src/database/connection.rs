//! Database connection module for Madhumeh Mitra
//!
//! The app keeps everything in a single SQLite file. When the file cannot be
//! opened the pool falls back to an in-memory database so the session keeps
//! working without durability.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;

/// Default directory for the database file
const DEFAULT_DATA_DIR: &str = "data";

/// Default database file name inside the data directory
const DEFAULT_DB_FILE: &str = "madhumeh_mitra.db";

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// SQLite connection pool error
    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    /// Configuration value could not be parsed
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),
}

impl From<String> for DatabaseError {
    fn from(error: String) -> Self {
        DatabaseError::MigrationError(error)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub sqlite_path: PathBuf,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from(DEFAULT_DATA_DIR).join(DEFAULT_DB_FILE),
            max_connections: 4,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a database configuration from environment variables
    ///
    /// Reads `DB_SQLITE_PATH` (or `DATA_DIR`), `DB_MAX_CONNECTIONS` and `DB_TIMEOUT_SECONDS`.
    pub fn from_env() -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let sqlite_path = match env::var("DB_SQLITE_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => {
                let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
                PathBuf::from(data_dir).join(DEFAULT_DB_FILE)
            }
        };

        let max_connections = parse_env("DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let timeout_seconds = parse_env("DB_TIMEOUT_SECONDS", defaults.timeout_seconds)?;

        info!(
            "Database configuration: path={}, max_connections={}, timeout={}s",
            sqlite_path.display(),
            max_connections,
            timeout_seconds
        );

        Ok(Self {
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, DatabaseError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| DatabaseError::ConfigError(format!("{} must be a number, got '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}

/// Pooled SQLite connections
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: Arc<r2d2::Pool<SqliteConnectionManager>>,
    in_memory: bool,
}

impl DatabasePool {
    /// Borrow a connection from the pool
    pub fn get(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, r2d2::Error> {
        self.pool.get()
    }

    /// Whether this pool is the non-durable in-memory fallback
    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Describe the current connection for logs
    pub fn connection_info(&self) -> String {
        let state = self.pool.state();
        let kind = if self.in_memory {
            "SQLite in-memory database".to_string()
        } else {
            "SQLite database".to_string()
        };
        format!(
            "{} (connections: active={}, idle={})",
            kind, state.connections, state.idle_connections
        )
    }
}

/// Open the SQLite pool described by `config` and run migrations.
///
/// Falls back to an in-memory database when the file or its directory cannot be used.
pub fn open_database_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let sqlite_path = &config.sqlite_path;
    info!("Initializing SQLite database at: {}", sqlite_path.display());

    if let Some(parent) = Path::new(sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Failed to create directory: {}, falling back to in-memory database", e);
                return open_in_memory_pool();
            }
        }
    }

    let manager = SqliteConnectionManager::file(sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    let pool = match r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)
    {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to create SQLite connection pool: {}", e);
            warn!("Falling back to in-memory SQLite database");
            return open_in_memory_pool();
        }
    };

    {
        let conn = pool.get()?;
        run_sqlite_migrations(&conn)?;
    }

    info!("SQLite connection pool created successfully");
    Ok(DatabasePool {
        pool: Arc::new(pool),
        in_memory: false,
    })
}

/// Open a single-connection in-memory database.
///
/// Each SQLite `:memory:` connection is its own database, so the pool is capped at one.
pub fn open_in_memory_pool() -> Result<DatabasePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let manager = SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder().max_size(1).build(manager)?;

    {
        let conn = pool.get()?;
        run_sqlite_migrations(&conn)?;
    }

    info!("In-memory SQLite database initialized successfully");
    Ok(DatabasePool {
        pool: Arc::new(pool),
        in_memory: true,
    })
}
