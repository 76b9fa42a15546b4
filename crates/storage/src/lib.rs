use std::num::NonZeroU32;

use async_trait::async_trait;
use shared::{
    domain::{InventoryItem, ItemName},
    error::StoreError,
};

mod memory;
mod sqlite;

pub use memory::MemoryInventoryStore;
pub use sqlite::{health_check, open_pool, SqliteInventoryStore};

/// A keyed document collection holding one `{ quantity }` document per item.
///
/// Every method is a single round trip. Nothing here coordinates concurrent callers:
/// a `get` followed by a `put` from two callers can lose an update.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Every document in the collection, in the store's listing order.
    async fn list(&self) -> Result<Vec<InventoryItem>, StoreError>;

    /// The document keyed by `name`, or `None` when absent.
    async fn get(&self, name: &ItemName) -> Result<Option<InventoryItem>, StoreError>;

    /// Creates or overwrites the document keyed by `name`.
    ///
    /// The whole document is replaced. Should documents ever carry more than a quantity,
    /// this must become a merge or sibling fields will be dropped.
    async fn put(&self, name: &ItemName, quantity: NonZeroU32) -> Result<(), StoreError>;

    /// Removes the document keyed by `name`. Missing keys are not an error.
    async fn delete(&self, name: &ItemName) -> Result<(), StoreError>;
}

#[async_trait]
impl<T> InventoryStore for std::sync::Arc<T>
where
    T: InventoryStore + ?Sized,
{
    async fn list(&self) -> Result<Vec<InventoryItem>, StoreError> {
        (**self).list().await
    }

    async fn get(&self, name: &ItemName) -> Result<Option<InventoryItem>, StoreError> {
        (**self).get(name).await
    }

    async fn put(&self, name: &ItemName, quantity: NonZeroU32) -> Result<(), StoreError> {
        (**self).put(name, quantity).await
    }

    async fn delete(&self, name: &ItemName) -> Result<(), StoreError> {
        (**self).delete(name).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
