use std::{fmt, num::NonZeroU32};

use shared::{
    domain::{InventoryItem, ItemName},
    error::StoreError,
};
use storage::InventoryStore;
use thiserror::Error;
use tracing::{info, warn};

use crate::{dialog::AddDialog, filter::filter_items};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryAction {
    Load,
    Add,
    Remove,
}

impl fmt::Display for InventoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::Add => "add",
            Self::Remove => "remove",
        })
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    /// The chain aborted before the mirror was touched.
    #[error("{action} failed, state unchanged: {source}")]
    ActionFailed {
        action: InventoryAction,
        #[source]
        source: StoreError,
    },
    /// The store accepted the mutation but the follow-up listing failed.
    #[error("{action} applied but refresh failed, list may be stale: {source}")]
    RefreshFailed {
        action: InventoryAction,
        #[source]
        source: StoreError,
    },
}

impl ControllerError {
    pub fn action(&self) -> InventoryAction {
        match self {
            Self::ActionFailed { action, .. } | Self::RefreshFailed { action, .. } => *action,
        }
    }

    pub fn store_error(&self) -> &StoreError {
        match self {
            Self::ActionFailed { source, .. } | Self::RefreshFailed { source, .. } => source,
        }
    }

    pub fn is_invalid_key(&self) -> bool {
        matches!(self.store_error(), StoreError::InvalidKey { .. })
    }
}

/// Mirrors an inventory collection and applies user actions to it.
///
/// Every mutation is a read-then-write against the store followed by a full re-list.
/// The read and the write are separate round trips, so two controllers working on the
/// same key can lose an update.
pub struct InventoryController<S> {
    store: S,
    mirror: Vec<InventoryItem>,
    search_query: String,
    dialog: AddDialog,
}

impl<S: InventoryStore> InventoryController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            mirror: Vec::new(),
            search_query: String::new(),
            dialog: AddDialog::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn mirror(&self) -> &[InventoryItem] {
        &self.mirror
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn dialog(&self) -> &AddDialog {
        &self.dialog
    }

    /// Initial population of the mirror.
    pub async fn load(&mut self) -> Result<(), ControllerError> {
        self.refresh().await.map_err(|source| {
            warn!(%source, "initial inventory load failed");
            ControllerError::ActionFailed {
                action: InventoryAction::Load,
                source,
            }
        })
    }

    /// Replaces the mirror with a fresh listing, even when the listing is empty.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.mirror = self.store.list().await?;
        Ok(())
    }

    pub async fn add_item(&mut self, name: &str) -> Result<(), ControllerError> {
        let action = InventoryAction::Add;
        let name = ItemName::parse(name).map_err(|source| action_failed(action, source))?;

        let current = self
            .store
            .get(&name)
            .await
            .map_err(|source| action_failed(action, source))?;
        let quantity = match current {
            Some(item) => item.quantity.checked_add(1).ok_or_else(|| {
                action_failed(
                    action,
                    StoreError::Malformed {
                        key: name.to_string(),
                        reason: "quantity would overflow".to_string(),
                    },
                )
            })?,
            None => NonZeroU32::MIN,
        };
        self.store
            .put(&name, quantity)
            .await
            .map_err(|source| action_failed(action, source))?;
        info!(item = %name, quantity = quantity.get(), "item added");

        self.refresh_after(action).await
    }

    pub async fn remove_item(&mut self, name: &str) -> Result<(), ControllerError> {
        let action = InventoryAction::Remove;
        let name = ItemName::parse(name).map_err(|source| action_failed(action, source))?;

        let current = self
            .store
            .get(&name)
            .await
            .map_err(|source| action_failed(action, source))?;
        match current {
            None => info!(item = %name, "remove of absent item ignored"),
            Some(item) => match NonZeroU32::new(item.quantity.get() - 1) {
                None => {
                    self.store
                        .delete(&name)
                        .await
                        .map_err(|source| action_failed(action, source))?;
                    info!(item = %name, "item removed");
                }
                Some(quantity) => {
                    self.store
                        .put(&name, quantity)
                        .await
                        .map_err(|source| action_failed(action, source))?;
                    info!(item = %name, quantity = quantity.get(), "item decremented");
                }
            },
        }

        self.refresh_after(action).await
    }

    /// Stores the query verbatim. Never touches the store.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn filtered_view(&self) -> Vec<&InventoryItem> {
        filter_items(&self.mirror, &self.search_query)
    }

    pub fn search(&mut self, query: impl Into<String>) -> Vec<&InventoryItem> {
        self.set_search_query(query);
        self.filtered_view()
    }

    pub fn open_add_dialog(&mut self) {
        self.dialog.open();
    }

    pub fn close_add_dialog(&mut self) {
        self.dialog.close();
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.dialog.set_draft(draft);
    }

    /// Adds the drafted name, then clears the draft and closes the dialog.
    /// If the store never took the write, the dialog stays as it was so the draft can
    /// be corrected; a write that landed closes it even when the refresh failed.
    pub async fn submit_add(&mut self) -> Result<(), ControllerError> {
        let draft = self.dialog.draft().to_string();
        let result = self.add_item(&draft).await;
        if !matches!(result, Err(ControllerError::ActionFailed { .. })) {
            self.dialog.complete_submit();
        }
        result
    }

    async fn refresh_after(&mut self, action: InventoryAction) -> Result<(), ControllerError> {
        self.refresh().await.map_err(|source| {
            warn!(%action, %source, "refresh after mutation failed");
            ControllerError::RefreshFailed { action, source }
        })
    }
}

fn action_failed(action: InventoryAction, source: StoreError) -> ControllerError {
    warn!(%action, %source, "inventory action failed");
    ControllerError::ActionFailed { action, source }
}
