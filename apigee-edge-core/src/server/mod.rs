//! Server initialization and routing

use crate::api::{self, entity_route::MountedRoute};
use crate::config::Config;
use crate::directory::{DeveloperDirectory, InMemoryDeveloperDirectory};
use crate::edge::{default_normalizers, EdgeClient, EdgeTransport};
use crate::entity::{ApiProductController, DeveloperAppController, EntityClassRegistry};
use crate::routing::{
    developer_app_descriptor, DeveloperAppRouteProvider, EntityTypeDescriptor, RouteProvider,
    RouteTable,
};
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub api_product_controller: Arc<ApiProductController>,
    pub developer_app_controller: Arc<DeveloperAppController>,
    pub developer_directory: Arc<dyn DeveloperDirectory>,
    pub descriptor: Arc<EntityTypeDescriptor>,
    pub route_table: Arc<RouteTable>,
    pub mounted_routes: Arc<Vec<Arc<MountedRoute>>>,
    pub prometheus_handle: Option<PrometheusHandle>,
}

/// Build the application state with the built-in entity classes.
pub fn build_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> Result<AppState> {
    build_state_with_registry(
        config,
        &EntityClassRegistry::with_defaults(),
        prometheus_handle,
    )
}

/// Build the application state, resolving the configured entity classes in
/// `registry`. A class that cannot back its controller aborts startup.
pub fn build_state_with_registry(
    config: Config,
    registry: &EntityClassRegistry,
    prometheus_handle: Option<PrometheusHandle>,
) -> Result<AppState> {
    let transport: Arc<dyn EdgeTransport> = Arc::new(
        EdgeClient::new(config.edge.clone()).context("Failed to create Apigee Edge client")?,
    );

    let api_product_class = registry
        .resolve(&config.entity_classes.api_product)
        .context("Failed to resolve the API product entity class")?;
    let api_product_controller = ApiProductController::new(
        config.edge.organization.clone(),
        transport.clone(),
        default_normalizers(),
        api_product_class,
    )
    .context("Failed to bind the API product controller")?;

    let developer_app_class = registry
        .resolve(&config.entity_classes.developer_app)
        .context("Failed to resolve the developer app entity class")?;
    let developer_app_controller = DeveloperAppController::new(
        config.edge.organization.clone(),
        transport,
        default_normalizers(),
        developer_app_class,
    )
    .context("Failed to bind the developer app controller")?;

    info!(
        organization = %config.edge.organization,
        api_product_class = api_product_controller.entity_class().name(),
        developer_app_class = developer_app_controller.entity_class().name(),
        "Bound Edge entity controllers"
    );

    let descriptor = developer_app_descriptor();
    let provider: DeveloperAppRouteProvider = DeveloperAppRouteProvider::default();
    let route_table = provider.routes(&descriptor);
    let mounted_routes = mount_routes(&route_table, &descriptor)?;

    let developer_directory: Arc<dyn DeveloperDirectory> = Arc::new(
        InMemoryDeveloperDirectory::new(config.developer_directory.clone()),
    );

    Ok(AppState {
        config: Arc::new(config),
        api_product_controller: Arc::new(api_product_controller),
        developer_app_controller: Arc::new(developer_app_controller),
        developer_directory,
        descriptor: Arc::new(descriptor),
        route_table: Arc::new(route_table),
        mounted_routes: Arc::new(mounted_routes),
        prometheus_handle,
    })
}

/// Prepare every route of `table` for serving. Two routes may not share a path.
pub fn mount_routes(
    table: &RouteTable,
    descriptor: &EntityTypeDescriptor,
) -> Result<Vec<Arc<MountedRoute>>> {
    let mut paths = HashSet::new();
    table
        .iter()
        .map(|(name, entry)| {
            if !paths.insert(entry.path.clone()) {
                anyhow::bail!("Route {} reuses path {}", name, entry.path);
            }
            Ok(Arc::new(MountedRoute::new(
                name,
                entry.clone(),
                descriptor.label.clone(),
            )?))
        })
        .collect()
}

/// Build the HTTP router
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(api::health::health))
        .route(
            "/api/v1/api-products",
            get(api::api_product::list_api_products),
        )
        .route(
            "/api/v1/api-products/{name}",
            get(api::api_product::get_api_product),
        );

    if state.prometheus_handle.is_some() {
        router = router.route("/metrics", get(api::metrics::metrics_handler));
    }

    for route in state.mounted_routes.iter() {
        router = router.route(
            &route.entry.path,
            api::entity_route::method_router(route.clone()),
        );
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config, prometheus_handle: Option<PrometheusHandle>) -> Result<()> {
    let http_addr = config.http_addr();
    let state = build_state(config, prometheus_handle)?;
    info!(routes = state.route_table.len(), "Route table ready");

    let app = build_router(state);
    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
