//! Wire shapes of the document-store HTTP API.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::domain::{InventoryItem, ItemName};

/// Body of an inventory document. A write replaces the whole body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFields {
    pub quantity: NonZeroU32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub id: ItemName,
    pub fields: ItemFields,
}

impl From<InventoryItem> for DocumentSnapshot {
    fn from(item: InventoryItem) -> Self {
        Self {
            id: item.name,
            fields: ItemFields {
                quantity: item.quantity,
            },
        }
    }
}

impl From<DocumentSnapshot> for InventoryItem {
    fn from(doc: DocumentSnapshot) -> Self {
        InventoryItem::new(doc.id, doc.fields.quantity)
    }
}
