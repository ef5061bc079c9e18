//! # Ledger Database Handle
//!
//! Opens the shop's SQLite file and hands out repositories and the ledger
//! store, all sharing one pool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Who Uses the Pool                                │
//! │                                                                         │
//! │  DbConfig ──► Database::new ──► migrations ──► SqlitePool               │
//! │                                                    │                    │
//! │            ┌───────────────────────┬───────────────┴──────┐             │
//! │            ▼                       ▼                      ▼             │
//! │   users() / items()          history()             ledger()            │
//! │   registration, info         coin history          engine units        │
//! │   (short read txs)           (plain reads)         (write lock first)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode and Writers
//! WAL lets readers run alongside the single writer. Writers queue on the
//! database write lock; `busy_timeout` bounds how long a writer waits
//! before the unit fails with `TransactionFailed`.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::ledger::SqliteLedger;
use crate::migrations;
use crate::repository::history::HistoryRepository;
use crate::repository::item::ItemRepository;
use crate::repository::user::UserRepository;

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// DbConfig
// =============================================================================

/// Pool and SQLite settings for the ledger database.
///
/// ```rust,ignore
/// let config = DbConfig::new("./merch.db")
///     .max_connections(10)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first open
    pub database_path: PathBuf,

    /// Pool ceiling (default 5)
    pub max_connections: u32,

    /// Connections kept open while idle (default 1)
    pub min_connections: u32,

    /// Wait for a free pooled connection (default 30s)
    pub connect_timeout: Duration,

    /// Idle connections are closed after this (default 10m)
    pub idle_timeout: Duration,

    /// Wait for the database write lock (default 5s)
    pub busy_timeout: Duration,

    /// Apply pending migrations when opening (default true)
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Private in-memory database for tests.
    ///
    /// Each connection to `:memory:` is its own database, so the pool is
    /// capped at one connection and concurrent units queue on it.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    /// SQLite options shared by every pooled connection.
    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
        } else {
            SqliteConnectOptions::from_str(&format!("sqlite://{}", self.database_path.display()))
                .map(|o| o.create_if_missing(true).journal_mode(SqliteJournalMode::Wal))
        }
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        // Foreign keys are off by default in SQLite
        Ok(options
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the ledger database. Clones share one pool.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./merch.db")).await?;
/// let user = db.users().get_by_username("alice").await?;
/// let engine = TransferEngine::new(db.ledger(), EngineConfig::default());
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (or creates) the database and applies migrations when the
    /// config asks for it.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening ledger database");

        let options = config.connect_options()?;
        debug!(
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            in_memory = config.is_in_memory(),
            "SQLite options ready"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "Ledger pool open");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn items(&self) -> ItemRepository {
        ItemRepository::new(self.pool.clone())
    }

    pub fn history(&self) -> HistoryRepository {
        HistoryRepository::new(self.pool.clone())
    }

    /// Ledger store the engines open their units of work on.
    pub fn ledger(&self) -> SqliteLedger {
        SqliteLedger::new(self.pool.clone())
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        info!("Closing ledger pool");
        self.pool.close().await;
    }

    /// True if a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_open_creates_file_and_migrates() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fresh.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();

        assert!(path.exists());
        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert!(total >= 2);
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_builder() {
        let config = DbConfig::new("/tmp/shop.db")
            .max_connections(12)
            .min_connections(3)
            .busy_timeout(Duration::from_millis(250));

        assert_eq!(config.max_connections, 12);
        assert_eq!(config.min_connections, 3);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
