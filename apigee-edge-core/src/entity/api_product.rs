//! API product entity

use super::{EdgeEntity, EntityClass, EntityDefinition};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;

/// Attribute Edge uses to publish a product's visibility.
pub const ACCESS_ATTRIBUTE: &str = "access";

/// How keys requesting a product get approved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalType {
    #[default]
    Auto,
    Manual,
}

/// Contract every API-product-shaped entity fulfils.
pub trait ApiProductEntity: EdgeEntity {
    fn name(&self) -> &str;
    fn display_name(&self) -> &str;
    fn description(&self) -> Option<&str>;
    fn approval_type(&self) -> ApprovalType;
    fn api_resources(&self) -> &[String];
    fn environments(&self) -> &[String];
    fn proxies(&self) -> &[String];
    fn scopes(&self) -> &[String];
    fn attributes(&self) -> &BTreeMap<String, String>;

    /// Products without an `access` attribute are public.
    fn is_public(&self) -> bool {
        self.attributes()
            .get(ACCESS_ATTRIBUTE)
            .map(|access| access.eq_ignore_ascii_case("public"))
            .unwrap_or(true)
    }
}

/// Default API product representation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProduct {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub approval_type: ApprovalType,
    #[serde(default)]
    pub api_resources: Vec<String>,
    #[serde(default)]
    pub environments: Vec<String>,
    #[serde(default)]
    pub proxies: Vec<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl ApiProduct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl EdgeEntity for ApiProduct {
    fn entity_type_id(&self) -> &'static str {
        Self::ENTITY_TYPE_ID
    }

    fn id(&self) -> Option<String> {
        if self.name.is_empty() {
            None
        } else {
            Some(self.name.clone())
        }
    }

    fn label(&self) -> String {
        self.display_name().to_string()
    }

    fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EntityDefinition for ApiProduct {
    const ENTITY_TYPE_ID: &'static str = "api_product";

    fn entity_class() -> EntityClass {
        EntityClass::builder::<Self>().api_product().build()
    }
}

impl ApiProductEntity for ApiProduct {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn approval_type(&self) -> ApprovalType {
        self.approval_type
    }

    fn api_resources(&self) -> &[String] {
        &self.api_resources
    }

    fn environments(&self) -> &[String] {
        &self.environments
    }

    fn proxies(&self) -> &[String] {
        &self.proxies
    }

    fn scopes(&self) -> &[String] {
        &self.scopes
    }

    fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_edge_product() {
        let product: ApiProduct = serde_json::from_value(json!({
            "name": "premium",
            "displayName": "Premium",
            "approvalType": "manual",
            "environments": ["prod"],
            "proxies": ["weather"],
            "attributes": {"access": "private"},
            "createdAt": 1_536_000_000_000_i64
        }))
        .unwrap();

        assert_eq!(product.display_name(), "Premium");
        assert_eq!(product.approval_type, ApprovalType::Manual);
        assert_eq!(product.environments, vec!["prod".to_string()]);
        assert!(!product.is_public());
        assert_eq!(
            product.created_at.map(|at| at.timestamp_millis()),
            Some(1_536_000_000_000)
        );
    }

    #[test]
    fn test_display_name_falls_back_to_name() {
        let product = ApiProduct::new("basic");
        assert_eq!(product.display_name(), "basic");
        assert_eq!(product.label(), "basic");
        assert!(product.is_public());
    }

    #[test]
    fn test_unsaved_product_has_no_id() {
        assert_eq!(ApiProduct::default().id(), None);
        assert_eq!(ApiProduct::new("basic").id(), Some("basic".to_string()));
    }

    #[test]
    fn test_to_value_omits_unset_fields() {
        let value = ApiProduct::new("basic").to_value().unwrap();
        assert_eq!(value["name"], "basic");
        assert_eq!(value["approvalType"], "auto");
        assert!(value.get("displayName").is_none());
        assert!(value.get("createdAt").is_none());
    }
}
