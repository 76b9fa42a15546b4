use shared::{
    domain::ItemName,
    error::{ApiError, ErrorCode, StoreError},
    protocol::{DocumentSnapshot, ItemFields},
};
use sqlx::{Pool, Sqlite};
use storage::{InventoryStore, SqliteInventoryStore};
use tracing::error;

const MAX_COLLECTION_BYTES: usize = 64;

#[derive(Clone)]
pub struct ApiContext {
    pub pool: Pool<Sqlite>,
}

impl ApiContext {
    fn collection(&self, collection: &str) -> Result<SqliteInventoryStore, ApiError> {
        validate_collection(collection)?;
        Ok(SqliteInventoryStore::with_pool(self.pool.clone(), collection))
    }
}

fn validate_collection(collection: &str) -> Result<(), ApiError> {
    let valid = !collection.is_empty()
        && collection.len() <= MAX_COLLECTION_BYTES
        && collection
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(ApiError::new(
            ErrorCode::Validation,
            format!("invalid collection name {collection:?}"),
        ))
    }
}

fn document_id(id: String) -> Result<ItemName, ApiError> {
    ItemName::parse(id).map_err(|e| store_failure(&e))
}

fn store_failure(err: &StoreError) -> ApiError {
    if matches!(err, StoreError::Unavailable { .. } | StoreError::Malformed { .. }) {
        error!(error = %err, "document store operation failed");
    }
    ApiError::from(err)
}

pub async fn list_documents(
    ctx: &ApiContext,
    collection: &str,
) -> Result<Vec<DocumentSnapshot>, ApiError> {
    let store = ctx.collection(collection)?;
    let items = store.list().await.map_err(|e| store_failure(&e))?;
    Ok(items.into_iter().map(DocumentSnapshot::from).collect())
}

pub async fn get_document(
    ctx: &ApiContext,
    collection: &str,
    id: String,
) -> Result<DocumentSnapshot, ApiError> {
    let store = ctx.collection(collection)?;
    let name = document_id(id)?;
    store
        .get(&name)
        .await
        .map_err(|e| store_failure(&e))?
        .map(DocumentSnapshot::from)
        .ok_or_else(|| {
            ApiError::new(
                ErrorCode::NotFound,
                format!("no document {:?} in {collection}", name.as_str()),
            )
        })
}

/// Replaces the whole document body.
pub async fn put_document(
    ctx: &ApiContext,
    collection: &str,
    id: String,
    fields: ItemFields,
) -> Result<DocumentSnapshot, ApiError> {
    let store = ctx.collection(collection)?;
    let name = document_id(id)?;
    store
        .put(&name, fields.quantity)
        .await
        .map_err(|e| store_failure(&e))?;
    Ok(DocumentSnapshot { id: name, fields })
}

/// Deleting a missing document succeeds.
pub async fn delete_document(
    ctx: &ApiContext,
    collection: &str,
    id: String,
) -> Result<(), ApiError> {
    let store = ctx.collection(collection)?;
    let name = document_id(id)?;
    store.delete(&name).await.map_err(|e| store_failure(&e))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
