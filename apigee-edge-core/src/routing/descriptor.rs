//! Entity type descriptors and their link templates

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Link template names understood by the route providers.
pub mod link {
    pub const CANONICAL: &str = "canonical";
    pub const COLLECTION: &str = "collection";
    pub const ADD_FORM: &str = "add-form";
    pub const EDIT_FORM: &str = "edit-form";
    pub const DELETE_FORM: &str = "delete-form";
    pub const ANALYTICS: &str = "analytics";

    pub const COLLECTION_BY_DEVELOPER: &str = "collection-by-developer";
    pub const CANONICAL_BY_DEVELOPER: &str = "canonical-by-developer";
    pub const ADD_FORM_FOR_DEVELOPER: &str = "add-form-for-developer";
    pub const EDIT_FORM_FOR_DEVELOPER: &str = "edit-form-for-developer";
    pub const DELETE_FORM_FOR_DEVELOPER: &str = "delete-form-for-developer";
    pub const ANALYTICS_FOR_DEVELOPER: &str = "analytics-for-developer";

    /// The owner-scoped templates, in route generation order.
    pub const FOR_DEVELOPER: [&str; 6] = [
        COLLECTION_BY_DEVELOPER,
        CANONICAL_BY_DEVELOPER,
        ADD_FORM_FOR_DEVELOPER,
        EDIT_FORM_FOR_DEVELOPER,
        DELETE_FORM_FOR_DEVELOPER,
        ANALYTICS_FOR_DEVELOPER,
    ];
}

/// Placeholder naming the owning user in a path.
pub const OWNER_PARAMETER: &str = "user";

/// Placeholder naming an app within its developer in a path.
pub const APP_PARAMETER: &str = "app";

/// Describes one entity type: its id, label and optional link templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeDescriptor {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_label: Option<String>,
    #[serde(default)]
    pub link_templates: BTreeMap<String, String>,
}

impl EntityTypeDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            collection_label: None,
            link_templates: BTreeMap::new(),
        }
    }

    pub fn with_link_template(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.link_templates.insert(name.into(), path.into());
        self
    }

    pub fn without_link_template(mut self, name: &str) -> Self {
        self.link_templates.remove(name);
        self
    }

    /// A template only counts when its pattern is non-empty.
    pub fn has_link_template(&self, name: &str) -> bool {
        self.link_template(name).is_some()
    }

    pub fn link_template(&self, name: &str) -> Option<&str> {
        self.link_templates
            .get(name)
            .map(String::as_str)
            .filter(|path| !path.is_empty())
    }

    pub fn collection_label(&self) -> String {
        self.collection_label
            .clone()
            .unwrap_or_else(|| format!("{}s", self.label))
    }

    /// `administer <id>`
    pub fn admin_permission(&self) -> String {
        format!("administer {}", self.id)
    }

    /// `access <id> overview`
    pub fn overview_permission(&self) -> String {
        format!("access {} overview", self.id)
    }

    /// Whether `path` contains the `{user}` placeholder.
    pub fn path_references_owner(path: &str) -> bool {
        path.contains(&format!("{{{}}}", OWNER_PARAMETER))
    }
}

/// Descriptor of the built-in developer app entity type.
pub fn developer_app_descriptor() -> EntityTypeDescriptor {
    EntityTypeDescriptor::new("developer_app", "Developer App")
        .with_link_template(link::CANONICAL, "/developer-apps/{developer_app}")
        .with_link_template(link::COLLECTION, "/admin/content/developer-apps")
        .with_link_template(link::ADD_FORM, "/developer-apps/add")
        .with_link_template(link::EDIT_FORM, "/developer-apps/{developer_app}/edit")
        .with_link_template(link::DELETE_FORM, "/developer-apps/{developer_app}/delete")
        .with_link_template(link::ANALYTICS, "/developer-apps/{developer_app}/analytics")
        .with_link_template(link::COLLECTION_BY_DEVELOPER, "/user/{user}/apps")
        .with_link_template(link::CANONICAL_BY_DEVELOPER, "/user/{user}/apps/{app}")
        .with_link_template(link::ADD_FORM_FOR_DEVELOPER, "/user/{user}/create-app")
        .with_link_template(link::EDIT_FORM_FOR_DEVELOPER, "/user/{user}/apps/{app}/edit")
        .with_link_template(link::DELETE_FORM_FOR_DEVELOPER, "/user/{user}/apps/{app}/delete")
        .with_link_template(
            link::ANALYTICS_FOR_DEVELOPER,
            "/user/{user}/apps/{app}/analytics",
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_template_is_absent() {
        let descriptor = EntityTypeDescriptor::new("developer_app", "Developer App")
            .with_link_template(link::CANONICAL, "");
        assert!(!descriptor.has_link_template(link::CANONICAL));
        assert_eq!(descriptor.link_template(link::CANONICAL), None);
    }

    #[test]
    fn test_permissions() {
        let descriptor = developer_app_descriptor();
        assert_eq!(descriptor.admin_permission(), "administer developer_app");
        assert_eq!(
            descriptor.overview_permission(),
            "access developer_app overview"
        );
    }

    #[test]
    fn test_path_references_owner() {
        assert!(EntityTypeDescriptor::path_references_owner("/user/{user}/apps"));
        assert!(!EntityTypeDescriptor::path_references_owner("/users/apps"));
        assert!(!EntityTypeDescriptor::path_references_owner("/user/{username}/apps"));
    }

    #[test]
    fn test_default_descriptor_declares_all_owner_templates() {
        let descriptor = developer_app_descriptor();
        for name in link::FOR_DEVELOPER {
            assert!(descriptor.has_link_template(name), "missing {}", name);
        }
        assert_eq!(descriptor.collection_label(), "Developer Apps");
    }

    #[test]
    fn test_deserialize_descriptor() {
        let descriptor: EntityTypeDescriptor = serde_json::from_value(json!({
            "id": "team_app",
            "label": "Team App",
            "link_templates": {"collection-by-developer": "/teams/{team}/apps"}
        }))
        .unwrap();

        assert_eq!(descriptor.id, "team_app");
        assert_eq!(
            descriptor.link_template(link::COLLECTION_BY_DEVELOPER),
            Some("/teams/{team}/apps")
        );
        assert!(!descriptor.has_link_template(link::CANONICAL));
    }
}
