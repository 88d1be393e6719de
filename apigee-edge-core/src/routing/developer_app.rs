//! Developer app routes, including the routes scoped to one developer

use super::descriptor::{link, EntityTypeDescriptor, OWNER_PARAMETER};
use super::provider::{route_name, AppRouteProvider, RouteProvider};
use super::route::{
    AccessCheck, ControllerKind, CustomAccessCheck, EntityOperation, FormKind, Permissions,
    RouteEntry, RouteHandler, TitleKind, TitleProvider,
};
use super::table::RouteTable;
use tracing::info;

/// Numeric user id constraint for `{user}`.
pub const OWNER_REQUIREMENT: &str = r"\d+";

/// Title function of the "my apps" listing.
pub const MY_APPS_TITLE: &str = "my_developer_apps_title";

/// Route provider for developer apps.
///
/// Restricts the generic add form to administrators, lets overview
/// permission holders see the collection and adds a route for each
/// developer-scoped link template the entity type declares.
#[derive(Debug, Clone)]
pub struct DeveloperAppRouteProvider<B = AppRouteProvider> {
    base: B,
}

impl Default for DeveloperAppRouteProvider {
    fn default() -> Self {
        Self::new(AppRouteProvider::default())
    }
}

impl<B: RouteProvider> DeveloperAppRouteProvider<B> {
    pub fn new(base: B) -> Self {
        Self { base }
    }

    fn adjust_base_routes(table: &mut RouteTable, descriptor: &EntityTypeDescriptor) {
        if let Some(add_form) = table.get_mut(&route_name(&descriptor.id, "add_form")) {
            add_form.set_access(AccessCheck::Permission(Permissions::new(
                descriptor.admin_permission(),
            )));
        }

        if let Some(collection) = table.get_mut(&route_name(&descriptor.id, "collection")) {
            match collection.permission_mut() {
                Some(permissions) => permissions.push_alternative(descriptor.overview_permission()),
                None => collection.set_access(AccessCheck::Permission(
                    Permissions::new(descriptor.admin_permission())
                        .or(descriptor.overview_permission()),
                )),
            }
        }
    }

    /// Entry for an owner-scoped template, `None` when it is not declared.
    fn owner_route(
        descriptor: &EntityTypeDescriptor,
        template: &str,
        handler: RouteHandler,
        title: TitleProvider,
        access: AccessCheck,
    ) -> Option<RouteEntry> {
        let path = descriptor.link_template(template)?;
        let mut entry = RouteEntry::new(path, handler, title)
            .with_default("entity_type_id", &descriptor.id)
            .with_access(access);
        if EntityTypeDescriptor::path_references_owner(path) {
            entry = entry.with_requirement(OWNER_PARAMETER, OWNER_REQUIREMENT);
        }
        Some(entry)
    }

    pub fn collection_route_by_developer(
        &self,
        descriptor: &EntityTypeDescriptor,
    ) -> Option<RouteEntry> {
        Self::owner_route(
            descriptor,
            link::COLLECTION_BY_DEVELOPER,
            RouteHandler::Controller(ControllerKind::DeveloperAppListForDeveloper),
            TitleProvider::Named(MY_APPS_TITLE.to_string()),
            AccessCheck::CustomAccess {
                check: CustomAccessCheck::MyApps,
            },
        )
    }

    pub fn canonical_route_by_developer(
        &self,
        descriptor: &EntityTypeDescriptor,
    ) -> Option<RouteEntry> {
        Self::owner_route(
            descriptor,
            link::CANONICAL_BY_DEVELOPER,
            RouteHandler::Controller(ControllerKind::DeveloperAppViewForDeveloper),
            TitleProvider::App(TitleKind::View),
            AccessCheck::DeveloperAppAccess {
                operation: EntityOperation::View,
            },
        )
    }

    pub fn add_form_route_for_developer(
        &self,
        descriptor: &EntityTypeDescriptor,
    ) -> Option<RouteEntry> {
        Self::owner_route(
            descriptor,
            link::ADD_FORM_FOR_DEVELOPER,
            RouteHandler::entity_form(&descriptor.id, "add_for_developer"),
            TitleProvider::App(TitleKind::Add),
            AccessCheck::EntityCreateAccess {
                entity_type_id: descriptor.id.clone(),
            },
        )
    }

    pub fn edit_form_route_for_developer(
        &self,
        descriptor: &EntityTypeDescriptor,
    ) -> Option<RouteEntry> {
        let mut entry = Self::owner_route(
            descriptor,
            link::EDIT_FORM_FOR_DEVELOPER,
            RouteHandler::entity_form(&descriptor.id, "edit_for_developer"),
            TitleProvider::App(TitleKind::Edit),
            AccessCheck::DeveloperAppAccess {
                operation: EntityOperation::Update,
            },
        )?;
        // Edit forms must never start from a cached copy.
        entry.options.load_unchanged_entity = true;
        Some(entry)
    }

    pub fn delete_form_route_for_developer(
        &self,
        descriptor: &EntityTypeDescriptor,
    ) -> Option<RouteEntry> {
        Self::owner_route(
            descriptor,
            link::DELETE_FORM_FOR_DEVELOPER,
            RouteHandler::entity_form(&descriptor.id, "delete_for_developer"),
            TitleProvider::App(TitleKind::Delete),
            AccessCheck::DeveloperAppAccess {
                operation: EntityOperation::Delete,
            },
        )
    }

    pub fn analytics_route_for_developer(
        &self,
        descriptor: &EntityTypeDescriptor,
    ) -> Option<RouteEntry> {
        Self::owner_route(
            descriptor,
            link::ANALYTICS_FOR_DEVELOPER,
            RouteHandler::Form(FormKind::DeveloperAppAnalyticsForDeveloper),
            TitleProvider::App(TitleKind::Analytics),
            AccessCheck::DeveloperAppAccess {
                operation: EntityOperation::Analytics,
            },
        )
    }
}

impl<B: RouteProvider> RouteProvider for DeveloperAppRouteProvider<B> {
    fn routes(&self, descriptor: &EntityTypeDescriptor) -> RouteTable {
        let mut table = self.base.routes(descriptor);
        Self::adjust_base_routes(&mut table, descriptor);

        let owner_routes = [
            (
                "collection_by_developer",
                self.collection_route_by_developer(descriptor),
            ),
            (
                "canonical_by_developer",
                self.canonical_route_by_developer(descriptor),
            ),
            (
                "add_form_for_developer",
                self.add_form_route_for_developer(descriptor),
            ),
            (
                "edit_form_for_developer",
                self.edit_form_route_for_developer(descriptor),
            ),
            (
                "delete_form_for_developer",
                self.delete_form_route_for_developer(descriptor),
            ),
            (
                "analytics_for_developer",
                self.analytics_route_for_developer(descriptor),
            ),
        ];

        let mut added = 0;
        for (suffix, entry) in owner_routes {
            if let Some(entry) = entry {
                table.add(route_name(&descriptor.id, suffix), entry);
                added += 1;
            }
        }

        info!(
            entity_type_id = %descriptor.id,
            routes = table.len(),
            developer_routes = added,
            "Built entity routes"
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::descriptor::developer_app_descriptor;

    fn provider() -> DeveloperAppRouteProvider {
        DeveloperAppRouteProvider::default()
    }

    #[test]
    fn test_add_form_is_admin_only() {
        let table = provider().routes(&developer_app_descriptor());
        let add_form = table.get("entity.developer_app.add_form").unwrap();

        assert_eq!(
            add_form.permission(),
            Some(&Permissions::new("administer developer_app"))
        );
        // The generic create access check stays in place.
        assert!(add_form.access.contains(&AccessCheck::EntityCreateAccess {
            entity_type_id: "developer_app".to_string()
        }));
    }

    #[test]
    fn test_collection_accepts_overview_permission() {
        let table = provider().routes(&developer_app_descriptor());
        let collection = table.get("entity.developer_app.collection").unwrap();

        assert_eq!(
            collection.permission().map(|p| p.to_string()),
            Some("administer developer_app+access developer_app overview".to_string())
        );
    }

    #[test]
    fn test_edit_route_loads_unchanged_entity() {
        let table = provider().routes(&developer_app_descriptor());
        let edit = table
            .get("entity.developer_app.edit_form_for_developer")
            .unwrap();

        assert!(edit.options.load_unchanged_entity);
        assert_eq!(edit.requirements.get("user").map(String::as_str), Some(r"\d+"));
        assert_eq!(
            edit.access,
            vec![AccessCheck::DeveloperAppAccess {
                operation: EntityOperation::Update
            }]
        );
    }

    #[test]
    fn test_owner_route_without_user_placeholder() {
        let descriptor = EntityTypeDescriptor::new("developer_app", "Developer App")
            .with_link_template(link::COLLECTION_BY_DEVELOPER, "/my-apps");
        let table = provider().routes(&descriptor);
        let collection = table
            .get("entity.developer_app.collection_by_developer")
            .unwrap();

        assert!(collection.requirements.is_empty());
        assert_eq!(table.len(), 1);
    }
}
