//! Organization-scoped CRUD over an Edge collection

use super::client::{EdgeRequest, EdgeTransport};
use super::normalizer::{default_normalizers, EntityNormalizer};
use crate::error::{AppError, Result};
use serde_json::Value;
use std::sync::Arc;

/// Generic remote entity controller.
///
/// Works on raw JSON under `organizations/{organization}/{collection}`; the
/// bound controllers in `crate::entity::controller` layer a concrete entity
/// type on top.
#[derive(Clone)]
pub struct EntityController {
    organization: String,
    transport: Arc<dyn EdgeTransport>,
    normalizers: Vec<Arc<dyn EntityNormalizer>>,
}

impl EntityController {
    pub fn new(
        organization: impl Into<String>,
        transport: Arc<dyn EdgeTransport>,
        normalizers: Vec<Arc<dyn EntityNormalizer>>,
    ) -> Result<Self> {
        let organization = organization.into();
        if organization.trim().is_empty() {
            return Err(AppError::Validation(
                "Organization must not be empty".to_string(),
            ));
        }

        let normalizers = if normalizers.is_empty() {
            default_normalizers()
        } else {
            normalizers
        };

        Ok(Self {
            organization,
            transport,
            normalizers,
        })
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// `organizations/{organization}/{collection}`
    pub fn collection_path(&self, collection: &str) -> String {
        format!(
            "organizations/{}/{}",
            urlencoding::encode(&self.organization),
            collection.trim_matches('/')
        )
    }

    fn entity_path(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_path(collection), urlencoding::encode(id))
    }

    pub async fn create(&self, collection: &str, entity: Value) -> Result<Value> {
        let request = EdgeRequest::post(self.collection_path(collection), self.to_wire(entity));
        let response = self.transport.request(request).await?;
        Ok(self.from_wire(response))
    }

    pub async fn load(&self, collection: &str, id: &str) -> Result<Value> {
        let request = EdgeRequest::get(self.entity_path(collection, id));
        let response = self.transport.request(request).await?;
        Ok(self.from_wire(response))
    }

    pub async fn update(&self, collection: &str, id: &str, entity: Value) -> Result<Value> {
        let request = EdgeRequest::put(self.entity_path(collection, id), self.to_wire(entity));
        let response = self.transport.request(request).await?;
        Ok(self.from_wire(response))
    }

    /// Delete an entity; Edge answers with the deleted representation.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<Value> {
        let request = EdgeRequest::delete(self.entity_path(collection, id));
        let response = self.transport.request(request).await?;
        Ok(self.from_wire(response))
    }

    /// List expanded entities. `list_key` is the wrapper property Edge uses
    /// for the collection (`apiProduct`, `app`).
    pub async fn list(&self, collection: &str, list_key: &str) -> Result<Vec<Value>> {
        let request =
            EdgeRequest::get(self.collection_path(collection)).with_query("expand", "true");
        let response = self.transport.request(request).await?;

        let items = match response {
            Value::Array(items) => items,
            Value::Object(mut wrapper) => match wrapper.remove(list_key) {
                Some(Value::Array(items)) => items,
                Some(other) => {
                    return Err(AppError::Edge(format!(
                        "Unexpected {} list in response for {}: {}",
                        list_key, collection, other
                    )))
                }
                None => {
                    return Err(AppError::Edge(format!(
                        "List response for {} has no {} property",
                        collection, list_key
                    )))
                }
            },
            Value::Null => Vec::new(),
            other => {
                return Err(AppError::Edge(format!(
                    "Unexpected list response for {}: {}",
                    collection, other
                )))
            }
        };

        Ok(items.into_iter().map(|item| self.from_wire(item)).collect())
    }

    /// List entity ids only.
    pub async fn list_ids(&self, collection: &str) -> Result<Vec<String>> {
        let request = EdgeRequest::get(self.collection_path(collection));
        let response = self.transport.request(request).await?;
        Ok(serde_json::from_value(response)?)
    }

    fn to_wire(&self, mut value: Value) -> Value {
        for normalizer in self.normalizers.iter().rev() {
            normalizer.normalize(&mut value);
        }
        value
    }

    fn from_wire(&self, mut value: Value) -> Value {
        for normalizer in &self.normalizers {
            normalizer.denormalize(&mut value);
        }
        value
    }
}
