use std::{num::NonZeroU32, sync::Arc};

use async_trait::async_trait;
use shared::{
    domain::{InventoryItem, ItemName},
    error::StoreError,
};
use tokio::sync::RwLock;

use crate::InventoryStore;

/// Process-local collection. Keeps insertion order; an overwrite stays in place.
#[derive(Clone, Default)]
pub struct MemoryInventoryStore {
    documents: Arc<RwLock<Vec<InventoryItem>>>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let mut documents: Vec<InventoryItem> = Vec::new();
        for item in items {
            match documents.iter_mut().find(|doc| doc.name == item.name) {
                Some(existing) => existing.quantity = item.quantity,
                None => documents.push(item),
            }
        }
        Self {
            documents: Arc::new(RwLock::new(documents)),
        }
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn list(&self) -> Result<Vec<InventoryItem>, StoreError> {
        Ok(self.documents.read().await.clone())
    }

    async fn get(&self, name: &ItemName) -> Result<Option<InventoryItem>, StoreError> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .find(|doc| &doc.name == name)
            .cloned())
    }

    async fn put(&self, name: &ItemName, quantity: NonZeroU32) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|doc| &doc.name == name) {
            Some(existing) => existing.quantity = quantity,
            None => documents.push(InventoryItem::new(name.clone(), quantity)),
        }
        Ok(())
    }

    async fn delete(&self, name: &ItemName) -> Result<(), StoreError> {
        self.documents.write().await.retain(|doc| &doc.name != name);
        Ok(())
    }
}
