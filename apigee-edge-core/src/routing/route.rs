//! Route entries and the requirements they carry

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::mem::discriminant;

/// Request handlers a route can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    EntityView,
    DeveloperAppViewForDeveloper,
    DeveloperAppListForDeveloper,
}

/// Standalone (non entity) forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    AppAnalytics,
    DeveloperAppAnalyticsForDeveloper,
}

/// What serves a route. Exactly one kind of handler per route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum RouteHandler {
    Controller(ControllerKind),
    /// Entity form operation, `<entity type>.<operation>`.
    EntityForm(String),
    Form(FormKind),
    /// Listing of all entities of a type.
    EntityList(String),
}

impl RouteHandler {
    pub fn entity_form(entity_type_id: &str, operation: &str) -> Self {
        RouteHandler::EntityForm(format!("{}.{}", entity_type_id, operation))
    }

    /// The operation part of an entity form handler.
    pub fn form_operation(&self) -> Option<&str> {
        match self {
            RouteHandler::EntityForm(form) => form.rsplit_once('.').map(|(_, op)| op),
            _ => None,
        }
    }
}

/// Operations an entity access check can be about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityOperation {
    View,
    Update,
    Delete,
    Analytics,
}

impl EntityOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityOperation::View => "view",
            EntityOperation::Update => "update",
            EntityOperation::Delete => "delete",
            EntityOperation::Analytics => "analytics",
        }
    }
}

impl fmt::Display for EntityOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named custom access checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomAccessCheck {
    /// May the account list the apps of the developer in the path.
    MyApps,
}

/// A set of alternative permissions; holding any one of them is enough.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Permissions {
    pub any_of: Vec<String>,
}

impl Permissions {
    pub fn new(permission: impl Into<String>) -> Self {
        Self {
            any_of: vec![permission.into()],
        }
    }

    /// Add an alternative. Duplicates are ignored.
    pub fn or(mut self, permission: impl Into<String>) -> Self {
        self.push_alternative(permission);
        self
    }

    pub fn push_alternative(&mut self, permission: impl Into<String>) {
        let permission = permission.into();
        if !self.any_of.contains(&permission) {
            self.any_of.push(permission);
        }
    }

    pub fn is_granted_by<F>(&self, has_permission: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        self.any_of.iter().any(|permission| has_permission(permission))
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.any_of.join("+"))
    }
}

/// One access requirement of a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessCheck {
    Permission(Permissions),
    EntityCreateAccess {
        entity_type_id: String,
    },
    EntityAccess {
        entity_type_id: String,
        operation: EntityOperation,
    },
    CustomAccess {
        check: CustomAccessCheck,
    },
    /// Owner-aware access to a developer app.
    DeveloperAppAccess {
        operation: EntityOperation,
    },
}

/// Title callbacks of entity and app routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleKind {
    View,
    Add,
    Edit,
    Delete,
    Analytics,
}

/// How a route's title is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TitleProvider {
    Entity(TitleKind),
    App(TitleKind),
    /// A named title function.
    Named(String),
    Static(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteOptions {
    /// Load the entity from Edge, bypassing any cached copy.
    pub load_unchanged_entity: bool,
    pub admin_route: bool,
}

/// One generated route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub path: String,
    pub handler: RouteHandler,
    pub title: TitleProvider,
    pub defaults: BTreeMap<String, String>,
    pub requirements: BTreeMap<String, String>,
    pub access: Vec<AccessCheck>,
    pub options: RouteOptions,
}

impl RouteEntry {
    pub fn new(path: impl Into<String>, handler: RouteHandler, title: TitleProvider) -> Self {
        Self {
            path: path.into(),
            handler,
            title,
            defaults: BTreeMap::new(),
            requirements: BTreeMap::new(),
            access: Vec::new(),
            options: RouteOptions::default(),
        }
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn with_requirement(
        mut self,
        parameter: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        self.requirements.insert(parameter.into(), pattern.into());
        self
    }

    pub fn with_access(mut self, check: AccessCheck) -> Self {
        self.set_access(check);
        self
    }

    /// Set a check, replacing an existing check of the same kind.
    pub fn set_access(&mut self, check: AccessCheck) {
        match self
            .access
            .iter_mut()
            .find(|existing| discriminant(&**existing) == discriminant(&check))
        {
            Some(existing) => *existing = check,
            None => self.access.push(check),
        }
    }

    pub fn permission(&self) -> Option<&Permissions> {
        self.access.iter().find_map(|check| match check {
            AccessCheck::Permission(permissions) => Some(permissions),
            _ => None,
        })
    }

    pub fn permission_mut(&mut self) -> Option<&mut Permissions> {
        self.access.iter_mut().find_map(|check| match check {
            AccessCheck::Permission(permissions) => Some(permissions),
            _ => None,
        })
    }

    pub fn entity_type_id(&self) -> Option<&str> {
        self.defaults.get("entity_type_id").map(String::as_str)
    }

    /// Placeholder names in path order.
    pub fn parameters(&self) -> Vec<&str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
            .collect()
    }
}
