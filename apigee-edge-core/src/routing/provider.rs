//! Base route providers
//!
//! Providers compose: a specialised provider wraps a base provider, asks it
//! for its table, then adjusts and extends that table.

use super::descriptor::{link, EntityTypeDescriptor};
use super::route::{
    AccessCheck, ControllerKind, EntityOperation, FormKind, Permissions, RouteEntry, RouteHandler,
    TitleKind, TitleProvider,
};
use super::table::RouteTable;

/// Produces the routes of an entity type.
pub trait RouteProvider: Send + Sync {
    fn routes(&self, descriptor: &EntityTypeDescriptor) -> RouteTable;
}

/// `entity.<type>.<suffix>`
pub fn route_name(entity_type_id: &str, suffix: &str) -> String {
    format!("entity.{}.{}", entity_type_id, suffix)
}

/// Canonical, collection and add/edit/delete form routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRouteProvider;

impl DefaultRouteProvider {
    pub fn canonical_route(&self, descriptor: &EntityTypeDescriptor) -> Option<RouteEntry> {
        let path = descriptor.link_template(link::CANONICAL)?;
        Some(
            RouteEntry::new(
                path,
                RouteHandler::Controller(ControllerKind::EntityView),
                TitleProvider::Entity(TitleKind::View),
            )
            .with_default("entity_type_id", &descriptor.id)
            .with_access(AccessCheck::EntityAccess {
                entity_type_id: descriptor.id.clone(),
                operation: EntityOperation::View,
            }),
        )
    }

    pub fn collection_route(&self, descriptor: &EntityTypeDescriptor) -> Option<RouteEntry> {
        let path = descriptor.link_template(link::COLLECTION)?;
        let mut entry = RouteEntry::new(
            path,
            RouteHandler::EntityList(descriptor.id.clone()),
            TitleProvider::Static(descriptor.collection_label()),
        )
        .with_default("entity_type_id", &descriptor.id)
        .with_access(AccessCheck::Permission(Permissions::new(
            descriptor.admin_permission(),
        )));
        entry.options.admin_route = true;
        Some(entry)
    }

    pub fn add_form_route(&self, descriptor: &EntityTypeDescriptor) -> Option<RouteEntry> {
        let path = descriptor.link_template(link::ADD_FORM)?;
        let mut entry = RouteEntry::new(
            path,
            RouteHandler::entity_form(&descriptor.id, "add"),
            TitleProvider::Entity(TitleKind::Add),
        )
        .with_default("entity_type_id", &descriptor.id)
        .with_access(AccessCheck::EntityCreateAccess {
            entity_type_id: descriptor.id.clone(),
        });
        entry.options.admin_route = true;
        Some(entry)
    }

    pub fn edit_form_route(&self, descriptor: &EntityTypeDescriptor) -> Option<RouteEntry> {
        self.entity_form_route(
            descriptor,
            link::EDIT_FORM,
            "edit",
            TitleKind::Edit,
            EntityOperation::Update,
        )
    }

    pub fn delete_form_route(&self, descriptor: &EntityTypeDescriptor) -> Option<RouteEntry> {
        self.entity_form_route(
            descriptor,
            link::DELETE_FORM,
            "delete",
            TitleKind::Delete,
            EntityOperation::Delete,
        )
    }

    fn entity_form_route(
        &self,
        descriptor: &EntityTypeDescriptor,
        template: &str,
        operation: &str,
        title: TitleKind,
        access: EntityOperation,
    ) -> Option<RouteEntry> {
        let path = descriptor.link_template(template)?;
        let mut entry = RouteEntry::new(
            path,
            RouteHandler::entity_form(&descriptor.id, operation),
            TitleProvider::Entity(title),
        )
        .with_default("entity_type_id", &descriptor.id)
        .with_access(AccessCheck::EntityAccess {
            entity_type_id: descriptor.id.clone(),
            operation: access,
        });
        entry.options.admin_route = true;
        Some(entry)
    }
}

impl RouteProvider for DefaultRouteProvider {
    fn routes(&self, descriptor: &EntityTypeDescriptor) -> RouteTable {
        let mut table = RouteTable::new();
        let routes = [
            ("canonical", self.canonical_route(descriptor)),
            ("collection", self.collection_route(descriptor)),
            ("add_form", self.add_form_route(descriptor)),
            ("edit_form", self.edit_form_route(descriptor)),
            ("delete_form", self.delete_form_route(descriptor)),
        ];
        for (suffix, entry) in routes {
            if let Some(entry) = entry {
                table.add(route_name(&descriptor.id, suffix), entry);
            }
        }
        table
    }
}

/// Adds the app analytics route on top of a base provider.
#[derive(Debug, Clone, Default)]
pub struct AppRouteProvider<B = DefaultRouteProvider> {
    base: B,
}

impl<B: RouteProvider> AppRouteProvider<B> {
    pub fn new(base: B) -> Self {
        Self { base }
    }

    pub fn analytics_route(&self, descriptor: &EntityTypeDescriptor) -> Option<RouteEntry> {
        let path = descriptor.link_template(link::ANALYTICS)?;
        Some(
            RouteEntry::new(
                path,
                RouteHandler::Form(FormKind::AppAnalytics),
                TitleProvider::App(TitleKind::Analytics),
            )
            .with_default("entity_type_id", &descriptor.id)
            .with_access(AccessCheck::EntityAccess {
                entity_type_id: descriptor.id.clone(),
                operation: EntityOperation::Analytics,
            }),
        )
    }
}

impl<B: RouteProvider> RouteProvider for AppRouteProvider<B> {
    fn routes(&self, descriptor: &EntityTypeDescriptor) -> RouteTable {
        let mut table = self.base.routes(descriptor);
        if let Some(entry) = self.analytics_route(descriptor) {
            table.add(route_name(&descriptor.id, "analytics"), entry);
        }
        table
    }
}
