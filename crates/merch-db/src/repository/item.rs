//! # Item Repository
//!
//! Catalog reads and per-user inventory listing.
//!
//! The catalog is provisioned by migration and never written at runtime.
//! Inventory rows are only written by the purchase unit of work
//! (`SqliteUnit::upsert_inventory`).

use merch_core::{Coins, InventoryItem, Item, ItemId, UserId};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Database row for `items`.
#[derive(Debug, FromRow)]
pub(crate) struct ItemRecord {
    pub id: i64,
    pub name: String,
    pub price: i64,
}

impl From<ItemRecord> for Item {
    fn from(r: ItemRecord) -> Self {
        Item {
            id: ItemId(r.id),
            name: r.name,
            price: Coins::new(r.price),
        }
    }
}

#[derive(Debug, FromRow)]
struct InventoryRecord {
    name: String,
    quantity: i64,
}

/// Lists a user's inventory on an already-held connection.
///
/// Ordered by item name so responses are stable.
pub(crate) async fn fetch_inventory(
    conn: &mut SqliteConnection,
    user: UserId,
) -> DbResult<Vec<InventoryItem>> {
    let rows = sqlx::query_as::<_, InventoryRecord>(
        r#"
        SELECT i.name, inv.quantity
        FROM inventory inv
        JOIN items i ON i.id = inv.item_id
        WHERE inv.user_id = ?1
        ORDER BY i.name
        "#,
    )
    .bind(user)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| InventoryItem {
            item_type: r.name,
            quantity: r.quantity,
        })
        .collect())
}

/// Repository for catalog and inventory reads.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Returns the whole catalog, cheapest first.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRecord>(
            "SELECT id, name, price FROM items ORDER BY price, name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    /// Looks up an item by its unique name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Item>> {
        debug!(name = %name, "Looking up item");

        let row = sqlx::query_as::<_, ItemRecord>(
            "SELECT id, name, price FROM items WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Item::from))
    }

    /// Lists what a user owns.
    pub async fn inventory_for(&self, user: UserId) -> DbResult<Vec<InventoryItem>> {
        debug!(user_id = %user, "Listing inventory");

        let mut conn = self.pool.acquire().await?;
        fetch_inventory(&mut conn, user).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_catalog_is_seeded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let items = db.items().list().await.unwrap();
        assert_eq!(items.len(), 10);

        let hoody = db.items().get_by_name("pink-hoody").await.unwrap().unwrap();
        assert_eq!(hoody.price.amount(), 500);

        let pen = db.items().get_by_name("pen").await.unwrap().unwrap();
        assert_eq!(pen.price.amount(), 10);
    }

    #[tokio::test]
    async fn test_unknown_item_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.items().get_by_name("spaceship").await.unwrap().is_none());
    }
}
