//! # History Repository
//!
//! Read views over the append-only `coin_transfers` table.
//!
//! ```text
//!   coin_transfers                    alice's view
//!   ─────────────────────────         ──────────────────────────
//!   alice → bob    100          ──►   sent:     [bob 100]
//!   carol → alice   40          ──►   received: [carol 40]
//! ```
//!
//! Each committed transfer is one entry; entries are not aggregated per
//! counterpart. Order is commit order.

use merch_core::{CoinHistory, Coins, ReceivedCoins, SentCoins, UserId};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct CounterpartRecord {
    username: String,
    amount: i64,
}

pub(crate) async fn fetch_received(
    conn: &mut SqliteConnection,
    user: UserId,
) -> DbResult<Vec<ReceivedCoins>> {
    let rows = sqlx::query_as::<_, CounterpartRecord>(
        r#"
        SELECT u.username, t.amount
        FROM coin_transfers t
        JOIN users u ON u.id = t.from_user_id
        WHERE t.to_user_id = ?1
        ORDER BY t.id
        "#,
    )
    .bind(user)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ReceivedCoins {
            from_user: r.username,
            amount: Coins::new(r.amount),
        })
        .collect())
}

pub(crate) async fn fetch_sent(
    conn: &mut SqliteConnection,
    user: UserId,
) -> DbResult<Vec<SentCoins>> {
    let rows = sqlx::query_as::<_, CounterpartRecord>(
        r#"
        SELECT u.username, t.amount
        FROM coin_transfers t
        JOIN users u ON u.id = t.to_user_id
        WHERE t.from_user_id = ?1
        ORDER BY t.id
        "#,
    )
    .bind(user)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| SentCoins {
            to_user: r.username,
            amount: Coins::new(r.amount),
        })
        .collect())
}

/// Repository for coin history reads.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
}

impl HistoryRepository {
    /// Creates a new HistoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        HistoryRepository { pool }
    }

    /// Transfers the user received, oldest first.
    pub async fn received(&self, user: UserId) -> DbResult<Vec<ReceivedCoins>> {
        let mut conn = self.pool.acquire().await?;
        fetch_received(&mut conn, user).await
    }

    /// Transfers the user sent, oldest first.
    pub async fn sent(&self, user: UserId) -> DbResult<Vec<SentCoins>> {
        let mut conn = self.pool.acquire().await?;
        fetch_sent(&mut conn, user).await
    }

    /// Both directions, read on one connection.
    pub async fn for_user(&self, user: UserId) -> DbResult<CoinHistory> {
        debug!(user_id = %user, "Loading coin history");

        let mut conn = self.pool.acquire().await?;
        let received = fetch_received(&mut conn, user).await?;
        let sent = fetch_sent(&mut conn, user).await?;

        Ok(CoinHistory { received, sent })
    }

    /// Total number of history records.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coin_transfers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Sum of all wallet balances. Constant across transfers.
    pub async fn total_supply(&self) -> DbResult<Coins> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(balance), 0) FROM wallets")
            .fetch_one(&self.pool)
            .await?;

        Ok(Coins::new(total))
    }
}
