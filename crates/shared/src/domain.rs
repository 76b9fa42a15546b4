use std::{fmt, num::NonZeroU32};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub const DEFAULT_COLLECTION: &str = "inventory";

const MAX_KEY_BYTES: usize = 1500;

/// Document key of an inventory item. Case is preserved exactly as entered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

impl ItemName {
    /// Validates `raw` against the document store's identifier rules.
    pub fn parse(raw: impl Into<String>) -> Result<Self, StoreError> {
        let raw = raw.into();
        if let Some(reason) = key_violation(&raw) {
            return Err(StoreError::InvalidKey { key: raw, reason });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name as rendered in lists: first character upper-cased, the rest untouched.
    pub fn display_name(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

fn key_violation(raw: &str) -> Option<&'static str> {
    if raw.is_empty() {
        Some("name must not be empty")
    } else if raw.contains('/') {
        Some("name must not contain '/'")
    } else if raw == "." || raw == ".." {
        Some("name must not be '.' or '..'")
    } else if raw.len() > 4 && raw.starts_with("__") && raw.ends_with("__") {
        Some("names of the form __name__ are reserved")
    } else if raw.len() > MAX_KEY_BYTES {
        Some("name exceeds 1500 bytes")
    } else {
        None
    }
}

impl TryFrom<String> for ItemName {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ItemName> for String {
    fn from(value: ItemName) -> Self {
        value.0
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One stored document. A quantity of zero is never stored; the document is deleted instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: ItemName,
    pub quantity: NonZeroU32,
}

impl InventoryItem {
    pub fn new(name: ItemName, quantity: NonZeroU32) -> Self {
        Self { name, quantity }
    }
}
