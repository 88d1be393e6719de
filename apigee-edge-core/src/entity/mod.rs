//! Local entity types backed by Apigee Edge resources
//!
//! An [`EntityClass`] is the runtime handle to a concrete entity type. It
//! records which entity contracts the type fulfils, each together with a
//! typed materializer, so a controller can check at construction time that
//! the class it was handed can actually stand in for its resource kind.

pub mod api_product;
pub mod controller;
pub mod developer_app;

pub use api_product::{ApiProduct, ApiProductEntity, ApprovalType};
pub use controller::{ApiProductController, DeveloperAppController};
pub use developer_app::{
    AppCredential, AppStatus, CreateDeveloperAppInput, CredentialProduct, DeveloperApp,
    DeveloperAppEntity,
};

use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Behaviour shared by every locally addressable Edge entity.
pub trait EdgeEntity: Any + fmt::Debug + Send + Sync {
    /// Entity type id, e.g. `developer_app`.
    fn entity_type_id(&self) -> &'static str;

    /// Remote identifier, if the entity has been saved.
    fn id(&self) -> Option<String>;

    /// Human readable label.
    fn label(&self) -> String;

    /// Local JSON representation, as handed to the normalizers on write.
    fn to_value(&self) -> Result<Value>;

    fn as_any(&self) -> &dyn Any;
}

/// Entity types that can describe their own [`EntityClass`].
pub trait EntityDefinition: EdgeEntity + Sized {
    const ENTITY_TYPE_ID: &'static str;

    fn entity_class() -> EntityClass;
}

/// Resource-kind contracts an entity class may fulfil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ApiProduct,
    DeveloperApp,
}

impl Capability {
    /// Name of the trait backing this capability.
    pub fn interface_name(self) -> &'static str {
        match self {
            Capability::ApiProduct => "ApiProductEntity",
            Capability::DeveloperApp => "DeveloperAppEntity",
        }
    }
}

type ApiProductMaterializer = fn(Value) -> Result<Box<dyn ApiProductEntity>>;
type DeveloperAppMaterializer = fn(Value) -> Result<Box<dyn DeveloperAppEntity>>;

/// Runtime reference to a concrete entity type.
#[derive(Clone, Copy)]
pub struct EntityClass {
    name: &'static str,
    type_id: TypeId,
    entity_type_id: &'static str,
    api_product: Option<ApiProductMaterializer>,
    developer_app: Option<DeveloperAppMaterializer>,
}

impl EntityClass {
    /// Start describing the class of `T`. Capabilities are added through the
    /// builder and are only available when `T` implements the matching trait.
    pub fn builder<T: EntityDefinition>() -> EntityClassBuilder<T> {
        EntityClassBuilder {
            class: EntityClass {
                name: std::any::type_name::<T>(),
                type_id: TypeId::of::<T>(),
                entity_type_id: T::ENTITY_TYPE_ID,
                api_product: None,
                developer_app: None,
            },
            _marker: PhantomData,
        }
    }

    /// The class `T` declares for itself.
    pub fn of<T: EntityDefinition>() -> Self {
        T::entity_class()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn entity_type_id(&self) -> &'static str {
        self.entity_type_id
    }

    /// Whether this class refers to `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub fn implements(&self, capability: Capability) -> bool {
        match capability {
            Capability::ApiProduct => self.api_product.is_some(),
            Capability::DeveloperApp => self.developer_app.is_some(),
        }
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        [Capability::ApiProduct, Capability::DeveloperApp]
            .into_iter()
            .filter(|capability| self.implements(*capability))
            .collect()
    }

    /// Fail with [`AppError::InvalidBinding`] unless the class fulfils `capability`.
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.implements(capability) {
            Ok(())
        } else {
            Err(self.invalid_binding(capability))
        }
    }

    pub(crate) fn materialize_api_product(
        &self,
        value: Value,
    ) -> Result<Box<dyn ApiProductEntity>> {
        let materialize = self
            .api_product
            .ok_or_else(|| self.invalid_binding(Capability::ApiProduct))?;
        materialize(value)
    }

    pub(crate) fn materialize_developer_app(
        &self,
        value: Value,
    ) -> Result<Box<dyn DeveloperAppEntity>> {
        let materialize = self
            .developer_app
            .ok_or_else(|| self.invalid_binding(Capability::DeveloperApp))?;
        materialize(value)
    }

    /// Reject entities of another class before they are written.
    pub(crate) fn ensure_instance(&self, entity: &dyn Any) -> Result<()> {
        if entity.type_id() == self.type_id {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Expected an entity of class {}",
                self.name
            )))
        }
    }

    fn invalid_binding(&self, capability: Capability) -> AppError {
        AppError::InvalidBinding {
            entity_class: self.name.to_string(),
            required: capability.interface_name(),
        }
    }
}

impl PartialEq for EntityClass {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.capabilities() == other.capabilities()
    }
}

impl Eq for EntityClass {}

impl fmt::Debug for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityClass")
            .field("name", &self.name)
            .field("entity_type_id", &self.entity_type_id)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// Builder returned by [`EntityClass::builder`].
pub struct EntityClassBuilder<T> {
    class: EntityClass,
    _marker: PhantomData<fn() -> T>,
}

impl<T: EntityDefinition> EntityClassBuilder<T> {
    pub fn build(self) -> EntityClass {
        self.class
    }
}

impl<T> EntityClassBuilder<T>
where
    T: EntityDefinition + ApiProductEntity + DeserializeOwned,
{
    pub fn api_product(mut self) -> Self {
        self.class.api_product = Some(materialize_api_product::<T> as ApiProductMaterializer);
        self
    }
}

impl<T> EntityClassBuilder<T>
where
    T: EntityDefinition + DeveloperAppEntity + DeserializeOwned,
{
    pub fn developer_app(mut self) -> Self {
        self.class.developer_app =
            Some(materialize_developer_app::<T> as DeveloperAppMaterializer);
        self
    }
}

fn materialize_api_product<T>(value: Value) -> Result<Box<dyn ApiProductEntity>>
where
    T: ApiProductEntity + DeserializeOwned,
{
    Ok(Box::new(serde_json::from_value::<T>(value)?))
}

fn materialize_developer_app<T>(value: Value) -> Result<Box<dyn DeveloperAppEntity>>
where
    T: DeveloperAppEntity + DeserializeOwned,
{
    Ok(Box::new(serde_json::from_value::<T>(value)?))
}

/// Entity classes addressable by configuration name.
#[derive(Debug, Clone, Default)]
pub struct EntityClassRegistry {
    classes: HashMap<String, EntityClass>,
}

impl EntityClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `api_product` and `developer_app` classes.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ApiProduct::ENTITY_TYPE_ID, EntityClass::of::<ApiProduct>());
        registry.register(DeveloperApp::ENTITY_TYPE_ID, EntityClass::of::<DeveloperApp>());
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, class: EntityClass) {
        self.classes.insert(name.into(), class);
    }

    pub fn resolve(&self, name: &str) -> Result<EntityClass> {
        self.classes
            .get(name)
            .copied()
            .ok_or_else(|| AppError::NotFound(format!("Unknown entity class: {}", name)))
    }
}
