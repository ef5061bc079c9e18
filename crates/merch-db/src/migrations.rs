//! Embedded schema and catalog migrations.
//!
//! Files live in the workspace `migrations/sqlite/` directory and are
//! compiled into the binary:
//!
//! ```text
//! 001_initial_schema.sql   users, wallets, items, inventory, coin_transfers
//! 002_seed_catalog.sql     the ten catalog items and their prices
//! ```
//!
//! Applied files are recorded in `_sqlx_migrations`. Add a new numbered file
//! for every schema change; applied files must stay byte-identical or the
//! checksum check fails at startup.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every pending migration. A no-op on an up-to-date database.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying migrations");
    MIGRATOR.run(pool).await?;
    info!("Ledger schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await?;

    Ok((MIGRATOR.migrations.len(), applied as usize))
}
