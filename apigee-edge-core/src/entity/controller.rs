//! Controllers bound to a concrete local entity class
//!
//! Both controllers wrap the generic [`EntityController`] and refuse to be
//! built for an entity class that does not fulfil their entity contract.

use super::{ApiProductEntity, Capability, DeveloperAppEntity, EntityClass};
use crate::edge::{EdgeTransport, EntityController, EntityNormalizer};
use crate::error::{AppError, Result};
use serde_json::Value;
use std::sync::Arc;

const API_PRODUCTS: &str = "apiproducts";
const API_PRODUCT_LIST_KEY: &str = "apiProduct";
const APPS: &str = "apps";
const APP_LIST_KEY: &str = "app";

/// API product controller bound to an `ApiProductEntity` class
#[derive(Clone)]
pub struct ApiProductController {
    inner: EntityController,
    entity_class: EntityClass,
}

impl std::fmt::Debug for ApiProductController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiProductController")
            .field("organization", &self.inner.organization())
            .field("entity_class", &self.entity_class)
            .finish()
    }
}

impl ApiProductController {
    /// Bind a controller to `entity_class`.
    ///
    /// Fails with [`AppError::InvalidBinding`] when the class does not
    /// implement `ApiProductEntity`. No request is sent.
    pub fn new(
        organization: impl Into<String>,
        client: Arc<dyn EdgeTransport>,
        normalizers: Vec<Arc<dyn EntityNormalizer>>,
        entity_class: EntityClass,
    ) -> Result<Self> {
        let inner = EntityController::new(organization, client, normalizers)?;
        entity_class.require(Capability::ApiProduct)?;

        Ok(Self {
            inner,
            entity_class,
        })
    }

    /// The class responses are materialized into.
    pub fn entity_class(&self) -> &EntityClass {
        &self.entity_class
    }

    pub fn organization(&self) -> &str {
        self.inner.organization()
    }

    pub async fn create(&self, entity: &dyn ApiProductEntity) -> Result<Box<dyn ApiProductEntity>> {
        self.entity_class.ensure_instance(entity.as_any())?;
        let created = self.inner.create(API_PRODUCTS, entity.to_value()?).await?;
        self.materialize(created)
    }

    pub async fn load(&self, name: &str) -> Result<Box<dyn ApiProductEntity>> {
        let value = self.inner.load(API_PRODUCTS, name).await?;
        self.materialize(value)
    }

    pub async fn update(&self, entity: &dyn ApiProductEntity) -> Result<Box<dyn ApiProductEntity>> {
        self.entity_class.ensure_instance(entity.as_any())?;
        let name = entity
            .id()
            .ok_or_else(|| AppError::Validation("API product has no name".to_string()))?;
        let updated = self
            .inner
            .update(API_PRODUCTS, &name, entity.to_value()?)
            .await?;
        self.materialize(updated)
    }

    pub async fn delete(&self, name: &str) -> Result<Box<dyn ApiProductEntity>> {
        let deleted = self.inner.delete(API_PRODUCTS, name).await?;
        self.materialize(deleted)
    }

    pub async fn list(&self) -> Result<Vec<Box<dyn ApiProductEntity>>> {
        self.inner
            .list(API_PRODUCTS, API_PRODUCT_LIST_KEY)
            .await?
            .into_iter()
            .map(|value| self.materialize(value))
            .collect()
    }

    pub async fn list_ids(&self) -> Result<Vec<String>> {
        self.inner.list_ids(API_PRODUCTS).await
    }

    fn materialize(&self, value: Value) -> Result<Box<dyn ApiProductEntity>> {
        self.entity_class.materialize_api_product(value)
    }
}

/// Developer app controller bound to a `DeveloperAppEntity` class
#[derive(Clone)]
pub struct DeveloperAppController {
    inner: EntityController,
    entity_class: EntityClass,
}

impl std::fmt::Debug for DeveloperAppController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeveloperAppController")
            .field("organization", &self.inner.organization())
            .field("entity_class", &self.entity_class)
            .finish()
    }
}

impl DeveloperAppController {
    /// Bind a controller to `entity_class`.
    ///
    /// Fails with [`AppError::InvalidBinding`] when the class does not
    /// implement `DeveloperAppEntity`.
    pub fn new(
        organization: impl Into<String>,
        client: Arc<dyn EdgeTransport>,
        normalizers: Vec<Arc<dyn EntityNormalizer>>,
        entity_class: EntityClass,
    ) -> Result<Self> {
        let inner = EntityController::new(organization, client, normalizers)?;
        entity_class.require(Capability::DeveloperApp)?;

        Ok(Self {
            inner,
            entity_class,
        })
    }

    pub fn entity_class(&self) -> &EntityClass {
        &self.entity_class
    }

    pub fn organization(&self) -> &str {
        self.inner.organization()
    }

    /// Apps live under their developer: `developers/{developer}/apps`.
    fn developer_apps(developer: &str) -> String {
        format!("developers/{}/{}", urlencoding::encode(developer), APPS)
    }

    pub async fn create(
        &self,
        developer: &str,
        app: &dyn DeveloperAppEntity,
    ) -> Result<Box<dyn DeveloperAppEntity>> {
        self.entity_class.ensure_instance(app.as_any())?;
        let created = self
            .inner
            .create(&Self::developer_apps(developer), app.to_value()?)
            .await?;
        self.materialize(created)
    }

    pub async fn load(&self, developer: &str, name: &str) -> Result<Box<dyn DeveloperAppEntity>> {
        let value = self
            .inner
            .load(&Self::developer_apps(developer), name)
            .await?;
        self.materialize(value)
    }

    /// Load an app by its organization-wide app id.
    pub async fn load_by_app_id(&self, app_id: &str) -> Result<Box<dyn DeveloperAppEntity>> {
        let value = self.inner.load(APPS, app_id).await?;
        self.materialize(value)
    }

    /// Update an app; Edge addresses apps by name within the developer.
    pub async fn update(
        &self,
        developer: &str,
        app: &dyn DeveloperAppEntity,
    ) -> Result<Box<dyn DeveloperAppEntity>> {
        self.entity_class.ensure_instance(app.as_any())?;
        if app.name().is_empty() {
            return Err(AppError::Validation("Developer app has no name".to_string()));
        }
        let updated = self
            .inner
            .update(&Self::developer_apps(developer), app.name(), app.to_value()?)
            .await?;
        self.materialize(updated)
    }

    pub async fn delete(&self, developer: &str, name: &str) -> Result<Box<dyn DeveloperAppEntity>> {
        let deleted = self
            .inner
            .delete(&Self::developer_apps(developer), name)
            .await?;
        self.materialize(deleted)
    }

    /// Apps of one developer, expanded.
    pub async fn list(&self, developer: &str) -> Result<Vec<Box<dyn DeveloperAppEntity>>> {
        self.inner
            .list(&Self::developer_apps(developer), APP_LIST_KEY)
            .await?
            .into_iter()
            .map(|value| self.materialize(value))
            .collect()
    }

    /// App names of one developer.
    pub async fn list_ids(&self, developer: &str) -> Result<Vec<String>> {
        self.inner.list_ids(&Self::developer_apps(developer)).await
    }

    /// Every app of the organization, expanded.
    pub async fn list_all(&self) -> Result<Vec<Box<dyn DeveloperAppEntity>>> {
        self.inner
            .list(APPS, APP_LIST_KEY)
            .await?
            .into_iter()
            .map(|value| self.materialize(value))
            .collect()
    }

    fn materialize(&self, value: Value) -> Result<Box<dyn DeveloperAppEntity>> {
        self.entity_class.materialize_developer_app(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::client::MockEdgeTransport;
    use crate::edge::EdgeRequest;
    use crate::entity::{ApiProduct, DeveloperApp};
    use mockall::predicate::eq;
    use serde_json::json;

    fn idle_transport() -> Arc<dyn EdgeTransport> {
        // No expectations: any request fails the test.
        Arc::new(MockEdgeTransport::new())
    }

    #[test]
    fn test_api_product_controller_binds_capable_class() {
        let class = EntityClass::of::<ApiProduct>();
        let controller =
            ApiProductController::new("test", idle_transport(), vec![], class).unwrap();

        assert_eq!(controller.entity_class(), &class);
        assert_eq!(controller.organization(), "test");
    }

    #[test]
    fn test_api_product_controller_rejects_developer_app_class() {
        let result = ApiProductController::new(
            "test",
            idle_transport(),
            vec![],
            EntityClass::of::<DeveloperApp>(),
        );

        match result {
            Err(AppError::InvalidBinding { required, .. }) => {
                assert_eq!(required, "ApiProductEntity")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_developer_app_controller_rejects_api_product_class() {
        let result = DeveloperAppController::new(
            "test",
            idle_transport(),
            vec![],
            EntityClass::of::<ApiProduct>(),
        );
        assert!(matches!(
            result,
            Err(AppError::InvalidBinding {
                required: "DeveloperAppEntity",
                ..
            })
        ));
    }

    #[test]
    fn test_class_without_capabilities_rejected() {
        let bare = EntityClass::builder::<ApiProduct>().build();
        let result = ApiProductController::new("test", idle_transport(), vec![], bare);
        assert!(matches!(result, Err(AppError::InvalidBinding { .. })));
    }

    #[tokio::test]
    async fn test_load_materializes_bound_class() {
        let mut transport = MockEdgeTransport::new();
        transport
            .expect_request()
            .with(eq(EdgeRequest::get("organizations/test/apiproducts/premium")))
            .times(1)
            .returning(|_| {
                Ok(json!({
                    "name": "premium",
                    "displayName": "Premium",
                    "attributes": [{"name": "access", "value": "private"}]
                }))
            });

        let controller = ApiProductController::new(
            "test",
            Arc::new(transport),
            vec![],
            EntityClass::of::<ApiProduct>(),
        )
        .unwrap();
        let product = controller.load("premium").await.unwrap();

        assert!(product.as_any().is::<ApiProduct>());
        assert_eq!(product.display_name(), "Premium");
        assert!(!product.is_public());
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_instance() {
        #[derive(Debug)]
        struct OtherProduct {
            name: String,
        }

        impl crate::entity::EdgeEntity for OtherProduct {
            fn entity_type_id(&self) -> &'static str {
                "other_product"
            }
            fn id(&self) -> Option<String> {
                Some(self.name.clone())
            }
            fn label(&self) -> String {
                self.name.clone()
            }
            fn to_value(&self) -> Result<Value> {
                Ok(json!({"name": self.name}))
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        impl ApiProductEntity for OtherProduct {
            fn name(&self) -> &str {
                &self.name
            }
            fn display_name(&self) -> &str {
                &self.name
            }
            fn description(&self) -> Option<&str> {
                None
            }
            fn approval_type(&self) -> crate::entity::ApprovalType {
                crate::entity::ApprovalType::Auto
            }
            fn api_resources(&self) -> &[String] {
                &[]
            }
            fn environments(&self) -> &[String] {
                &[]
            }
            fn proxies(&self) -> &[String] {
                &[]
            }
            fn scopes(&self) -> &[String] {
                &[]
            }
            fn attributes(&self) -> &std::collections::BTreeMap<String, String> {
                unimplemented!()
            }
        }

        let controller = ApiProductController::new(
            "test",
            idle_transport(),
            vec![],
            EntityClass::of::<ApiProduct>(),
        )
        .unwrap();
        let other = OtherProduct {
            name: "premium".to_string(),
        };

        let result = controller.create(&other).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_developer_app_crud_paths() {
        let mut transport = MockEdgeTransport::new();
        transport
            .expect_request()
            .withf(|request| {
                request.method == reqwest::Method::POST
                    && request.path == "organizations/test/developers/dev%40example.com/apps"
            })
            .times(1)
            .returning(|request| {
                let mut body = request.body.unwrap_or(Value::Null);
                body["appId"] = json!("app-1");
                Ok(body)
            });
        transport
            .expect_request()
            .with(eq(EdgeRequest::get("organizations/test/apps/app-1")))
            .times(1)
            .returning(|_| Ok(json!({"appId": "app-1", "name": "weather-app"})));

        let controller = DeveloperAppController::new(
            "test",
            Arc::new(transport),
            vec![],
            EntityClass::of::<DeveloperApp>(),
        )
        .unwrap();

        let created = controller
            .create("dev@example.com", &DeveloperApp::new("weather-app"))
            .await
            .unwrap();
        assert_eq!(created.app_id(), Some("app-1"));

        let loaded = controller.load_by_app_id("app-1").await.unwrap();
        assert_eq!(loaded.name(), "weather-app");
    }

    #[tokio::test]
    async fn test_list_all_apps() {
        let mut transport = MockEdgeTransport::new();
        transport
            .expect_request()
            .withf(|request| request.path == "organizations/test/apps")
            .times(1)
            .returning(|_| {
                Ok(json!({"app": [
                    {
                        "appId": "a",
                        "name": "one",
                        "attributes": [{"name": "DisplayName", "value": "One"}]
                    },
                    {"appId": "b", "name": "two"}
                ]}))
            });

        let controller = DeveloperAppController::new(
            "test",
            Arc::new(transport),
            vec![],
            EntityClass::of::<DeveloperApp>(),
        )
        .unwrap();
        let apps = controller.list_all().await.unwrap();

        let names: Vec<&str> = apps.iter().map(|app| app.display_name()).collect();
        assert_eq!(names, vec!["One", "two"]);
    }
}
