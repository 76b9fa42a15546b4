use std::{
    fs,
    num::NonZeroU32,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::{
    domain::{InventoryItem, ItemName},
    error::StoreError,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use tracing::debug;

use crate::InventoryStore;

/// Document collection persisted in SQLite. Listing follows insertion order; an
/// overwrite keeps the document's original position.
#[derive(Clone)]
pub struct SqliteInventoryStore {
    pool: Pool<Sqlite>,
    collection: String,
}

impl SqliteInventoryStore {
    pub async fn new(database_url: &str, collection: impl Into<String>) -> Result<Self> {
        let pool = open_pool(database_url).await?;
        Ok(Self::with_pool(pool, collection))
    }

    /// Shares an already migrated pool; used by the service to serve many collections.
    pub fn with_pool(pool: Pool<Sqlite>, collection: impl Into<String>) -> Self {
        Self {
            pool,
            collection: collection.into(),
        }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

/// Opens (creating if missing) the SQLite database and ensures the documents table.
pub async fn open_pool(database_url: &str) -> Result<Pool<Sqlite>> {
    ensure_sqlite_parent_dir_exists(database_url)?;

    let connect_options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid sqlite url '{database_url}'"))?
        .create_if_missing(true);

    // Every connection to `sqlite::memory:` is its own database, so keep exactly one alive.
    let pool_options = if database_url.starts_with("sqlite::memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options
        .connect_with(connect_options)
        .await
        .with_context(|| format!("failed to open sqlite database '{database_url}'"))?;
    ensure_documents_table(&pool).await?;
    Ok(pool)
}

pub async fn health_check(pool: &Pool<Sqlite>) -> Result<()> {
    let _: i64 = sqlx::query_scalar("SELECT 1")
        .fetch_one(pool)
        .await
        .context("sqlite ping failed")?;
    Ok(())
}

async fn ensure_documents_table(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id         TEXT NOT NULL,
            quantity   INTEGER NOT NULL CHECK (quantity >= 1),
            PRIMARY KEY (collection, id)
        )
        "#,
    )
    .execute(pool)
    .await
    .context("failed to ensure documents table exists")?;
    Ok(())
}

fn item_from_row(row: &SqliteRow) -> Result<InventoryItem, StoreError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| StoreError::unavailable_from("failed to decode document id", e))?;
    let raw_quantity: i64 = row
        .try_get("quantity")
        .map_err(|e| StoreError::unavailable_from("failed to decode document quantity", e))?;

    let quantity = u32::try_from(raw_quantity)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| StoreError::Malformed {
            key: id.clone(),
            reason: format!("quantity {raw_quantity} is not a positive count"),
        })?;
    let name = ItemName::parse(id.clone()).map_err(|e| StoreError::Malformed {
        key: id,
        reason: e.to_string(),
    })?;
    Ok(InventoryItem::new(name, quantity))
}

#[async_trait]
impl InventoryStore for SqliteInventoryStore {
    async fn list(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, quantity FROM documents WHERE collection = ? ORDER BY rowid",
        )
        .bind(self.collection.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::unavailable_from("failed to list documents", e))?;

        rows.iter().map(item_from_row).collect()
    }

    async fn get(&self, name: &ItemName) -> Result<Option<InventoryItem>, StoreError> {
        let row = sqlx::query("SELECT id, quantity FROM documents WHERE collection = ? AND id = ?")
            .bind(self.collection.as_str())
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable_from("failed to read document", e))?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn put(&self, name: &ItemName, quantity: NonZeroU32) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO documents (collection, id, quantity) VALUES (?, ?, ?)
             ON CONFLICT(collection, id) DO UPDATE SET quantity=excluded.quantity",
        )
        .bind(self.collection.as_str())
        .bind(name.as_str())
        .bind(i64::from(quantity.get()))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::unavailable_from("failed to write document", e))?;
        debug!(collection = %self.collection, item = %name, quantity = quantity.get(), "document written");
        Ok(())
    }

    async fn delete(&self, name: &ItemName) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(self.collection.as_str())
            .bind(name.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable_from("failed to delete document", e))?;
        debug!(
            collection = %self.collection,
            item = %name,
            existed = result.rows_affected() > 0,
            "document deleted"
        );
        Ok(())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

pub(crate) fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}
