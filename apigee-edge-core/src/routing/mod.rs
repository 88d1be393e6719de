//! Route generation for Edge entity types
//!
//! An [`EntityTypeDescriptor`] lists the link templates of an entity type.
//! Route providers turn a descriptor into a [`RouteTable`]: the generic
//! providers emit canonical, collection and form routes, and
//! [`DeveloperAppRouteProvider`] adds the developer-scoped routes for the
//! templates the type declares.

pub mod descriptor;
pub mod developer_app;
pub mod provider;
pub mod route;
pub mod table;
pub mod title;

pub use descriptor::{
    developer_app_descriptor, link, EntityTypeDescriptor, APP_PARAMETER, OWNER_PARAMETER,
};
pub use developer_app::DeveloperAppRouteProvider;
pub use provider::{route_name, AppRouteProvider, DefaultRouteProvider, RouteProvider};
pub use route::{
    AccessCheck, ControllerKind, CustomAccessCheck, EntityOperation, FormKind, Permissions,
    RouteEntry, RouteHandler, RouteOptions, TitleKind, TitleProvider,
};
pub use table::RouteTable;
pub use title::TitleContext;
