use std::num::NonZeroU32;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{InventoryItem, ItemName},
    error::{ApiError, ErrorCode, StoreError},
    protocol::{DocumentSnapshot, ItemFields},
};
use storage::InventoryStore;
use tracing::debug;
use url::Url;

/// Remote collection reached over the document-store HTTP API.
///
/// Each trait method issues exactly one request. Timeouts are whatever the supplied
/// `reqwest::Client` was built with.
#[derive(Clone)]
pub struct HttpInventoryStore {
    http: Client,
    base_url: Url,
    collection: String,
}

impl HttpInventoryStore {
    pub fn new(server_url: &str, collection: impl Into<String>) -> Result<Self> {
        Self::with_client(Client::new(), server_url, collection)
    }

    pub fn with_client(
        http: Client,
        server_url: &str,
        collection: impl Into<String>,
    ) -> Result<Self> {
        let base_url = Url::parse(server_url)
            .with_context(|| format!("invalid document store url '{server_url}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("document store url '{server_url}' cannot carry a path");
        }
        let collection = collection.into();
        if collection.is_empty() || collection.contains('/') {
            bail!("invalid collection name '{collection}'");
        }
        Ok(Self {
            http,
            base_url,
            collection,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn collection_url(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["collections", self.collection.as_str(), "documents"]);
        }
        url
    }

    fn document_url(&self, name: &ItemName) -> Url {
        let mut url = self.collection_url();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(name.as_str());
        }
        url
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<Response, StoreError> {
        request
            .send()
            .await
            .map_err(|e| StoreError::unavailable_from(format!("{what}: request failed"), e))
    }
}

async fn rejection(response: Response, key: &str) -> StoreError {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    match serde_json::from_slice::<ApiError>(&body) {
        Ok(api) if api.code == ErrorCode::Validation => StoreError::InvalidKey {
            key: key.to_string(),
            reason: "rejected by the document store",
        },
        Ok(api) => StoreError::unavailable(format!("{status}: {}", api.message)),
        Err(_) => StoreError::unavailable(format!("{status}: unexpected response")),
    }
}

async fn decode_body<T: serde::de::DeserializeOwned>(
    response: Response,
    key: &str,
) -> Result<T, StoreError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| StoreError::unavailable_from("failed to read response body", e))?;
    serde_json::from_slice(&body).map_err(|e| StoreError::Malformed {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl InventoryStore for HttpInventoryStore {
    async fn list(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let response = self
            .send(self.http.get(self.collection_url()), "list")
            .await?;
        if !response.status().is_success() {
            return Err(rejection(response, &self.collection).await);
        }
        let documents: Vec<DocumentSnapshot> = decode_body(response, &self.collection).await?;
        debug!(collection = %self.collection, count = documents.len(), "listed documents");
        Ok(documents.into_iter().map(InventoryItem::from).collect())
    }

    async fn get(&self, name: &ItemName) -> Result<Option<InventoryItem>, StoreError> {
        let response = self
            .send(self.http.get(self.document_url(name)), "get")
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(rejection(response, name.as_str()).await);
        }
        let document: DocumentSnapshot = decode_body(response, name.as_str()).await?;
        if &document.id != name {
            return Err(StoreError::Malformed {
                key: name.to_string(),
                reason: format!("store answered with document {:?}", document.id.as_str()),
            });
        }
        Ok(Some(document.into()))
    }

    async fn put(&self, name: &ItemName, quantity: NonZeroU32) -> Result<(), StoreError> {
        let request = self
            .http
            .put(self.document_url(name))
            .json(&ItemFields { quantity });
        let response = self.send(request, "put").await?;
        if !response.status().is_success() {
            return Err(rejection(response, name.as_str()).await);
        }
        debug!(collection = %self.collection, item = %name, quantity = quantity.get(), "document written");
        Ok(())
    }

    async fn delete(&self, name: &ItemName) -> Result<(), StoreError> {
        let response = self
            .send(self.http.delete(self.document_url(name)), "delete")
            .await?;
        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(rejection(response, name.as_str()).await);
        }
        debug!(collection = %self.collection, item = %name, "document deleted");
        Ok(())
    }
}
