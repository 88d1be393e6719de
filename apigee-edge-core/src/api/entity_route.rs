//! Handlers behind the generated developer app routes
//!
//! Each route table entry is mounted on its own path. A request is checked
//! against the entry's parameter requirements and access checks before it is
//! dispatched on the entry's handler.

use crate::api::{account_from_headers, RouteResponse};
use crate::entity::developer_app::{DISPLAY_NAME_ATTRIBUTE, NOTES_ATTRIBUTE};
use crate::entity::{CreateDeveloperAppInput, DeveloperAppEntity};
use crate::error::{AppError, Result};
use crate::policy::{check_route_access, AccessContext};
use crate::routing::{
    title, ControllerKind, RouteEntry, RouteHandler, TitleContext, APP_PARAMETER, OWNER_PARAMETER,
};
use crate::server::AppState;
use crate::telemetry::metrics::record_http_request;
use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json,
};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

/// A route table entry prepared for serving.
#[derive(Debug)]
pub struct MountedRoute {
    pub name: String,
    pub entry: RouteEntry,
    pub entity_type_label: String,
    requirements: Vec<(String, Regex)>,
}

impl MountedRoute {
    pub fn new(
        name: impl Into<String>,
        entry: RouteEntry,
        entity_type_label: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let name = name.into();
        if !entry.path.starts_with('/') {
            anyhow::bail!("Route {} has a relative path: {}", name, entry.path);
        }

        let requirements = entry
            .requirements
            .iter()
            .map(|(parameter, pattern)| {
                let regex = Regex::new(&format!("^(?:{})$", pattern)).with_context(|| {
                    format!("Invalid requirement for {} on route {}", parameter, name)
                })?;
                Ok((parameter.clone(), regex))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            name,
            entry,
            entity_type_label: entity_type_label.into(),
            requirements,
        })
    }

    /// Whether every constrained parameter is present and matches.
    pub fn matches(&self, params: &HashMap<String, String>) -> bool {
        self.requirements.iter().all(|(parameter, regex)| {
            params
                .get(parameter)
                .map(|value| regex.is_match(value))
                .unwrap_or(false)
        })
    }

    fn accepts_post(&self) -> bool {
        matches!(self.entry.handler, RouteHandler::EntityForm(_))
    }
}

/// Build the axum method router serving `route`.
pub fn method_router(route: Arc<MountedRoute>) -> MethodRouter<AppState> {
    let accepts_post = route.accepts_post();

    if route.entry.parameters().is_empty() {
        let handler = move |State(state): State<AppState>,
                            method: Method,
                            headers: HeaderMap,
                            body: Bytes| {
            let route = route.clone();
            async move { handle_route(state, route, HashMap::new(), method, headers, body).await }
        };
        let router = get(handler.clone());
        if accepts_post {
            router.post(handler)
        } else {
            router
        }
    } else {
        let handler = move |State(state): State<AppState>,
                            Path(params): Path<HashMap<String, String>>,
                            method: Method,
                            headers: HeaderMap,
                            body: Bytes| {
            let route = route.clone();
            async move { handle_route(state, route, params, method, headers, body).await }
        };
        let router = get(handler.clone());
        if accepts_post {
            router.post(handler)
        } else {
            router
        }
    }
}

/// Serve one request on a mounted route.
pub async fn handle_route(
    state: AppState,
    route: Arc<MountedRoute>,
    params: HashMap<String, String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let response = match dispatch(&state, &route, &params, &method, &headers, &body).await {
        Ok(json) => json.into_response(),
        Err(e) => e.into_response(),
    };
    record_http_request(&route.name, response.status().as_u16());
    response
}

async fn dispatch(
    state: &AppState,
    route: &MountedRoute,
    params: &HashMap<String, String>,
    method: &Method,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Json<RouteResponse>> {
    if !route.matches(params) {
        return Err(AppError::NotFound(format!(
            "No route found for {}",
            route.entry.path
        )));
    }

    let account = account_from_headers(headers)?;
    let owner = params
        .get(OWNER_PARAMETER)
        .map(|uid| uid.parse::<u64>())
        .transpose()
        .map_err(|_| AppError::NotFound(format!("No route found for {}", route.entry.path)))?;
    let ctx = AccessContext { owner };
    check_route_access(&account, &route.entry, &ctx)?;

    let developer = match owner {
        Some(uid) => Some(
            state
                .developer_directory
                .developer_email(uid)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("User {} has no developer account", uid))
                })?,
        ),
        None => None,
    };

    let mut title_ctx = TitleContext {
        entity_type_label: route.entity_type_label.clone(),
        entity_label: None,
        owner_name: developer.clone(),
        viewer_is_owner: ctx.is_owner(&account),
    };

    let data = match &route.entry.handler {
        RouteHandler::Controller(ControllerKind::EntityView)
        | RouteHandler::Controller(ControllerKind::DeveloperAppViewForDeveloper) => {
            let app = load_app(state, route, params, developer.as_deref()).await?;
            title_ctx.entity_label = Some(app.label());
            app.to_value()?
        }
        RouteHandler::Controller(ControllerKind::DeveloperAppListForDeveloper) => {
            let developer = require_developer(developer.as_deref())?;
            apps_to_value(state.developer_app_controller.list(developer).await?)?
        }
        RouteHandler::EntityList(_) => {
            apps_to_value(state.developer_app_controller.list_all().await?)?
        }
        RouteHandler::EntityForm(_) => {
            entity_form(
                state,
                route,
                params,
                developer.as_deref(),
                method,
                body,
                &mut title_ctx,
            )
            .await?
        }
        RouteHandler::Form(form) => {
            let app = load_app(state, route, params, developer.as_deref()).await?;
            title_ctx.entity_label = Some(app.label());
            json!({
                "form": form,
                "method": "GET",
                "fields": ["metric", "environment", "since", "until"],
                "metrics": ["message_count", "total_response_time", "error_count"],
                "app": app.to_value()?,
            })
        }
    };

    Ok(Json(RouteResponse {
        route: route.name.clone(),
        title: title::resolve(&route.entry.title, &title_ctx),
        data,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormOperation {
    Add,
    Edit,
    Delete,
}

impl FormOperation {
    fn of(handler: &RouteHandler) -> Result<Self> {
        match handler.form_operation() {
            Some(op) if op.starts_with("add") => Ok(FormOperation::Add),
            Some(op) if op.starts_with("edit") => Ok(FormOperation::Edit),
            Some(op) if op.starts_with("delete") => Ok(FormOperation::Delete),
            other => Err(AppError::Internal(anyhow::anyhow!(
                "Unsupported entity form operation: {:?}",
                other
            ))),
        }
    }
}

async fn entity_form(
    state: &AppState,
    route: &MountedRoute,
    params: &HashMap<String, String>,
    developer: Option<&str>,
    method: &Method,
    body: &Bytes,
    title_ctx: &mut TitleContext,
) -> Result<Value> {
    let operation = FormOperation::of(&route.entry.handler)?;
    let submitted = *method == Method::POST;
    let controller = &state.developer_app_controller;

    match operation {
        FormOperation::Add if !submitted => Ok(form_descriptor(route, developer.is_none(), None)),
        FormOperation::Add => {
            let input: CreateDeveloperAppInput = parse_body(body)?;
            input.validate()?;
            let owner = match developer {
                Some(developer) => developer.to_string(),
                None => input.developer.clone().ok_or_else(|| {
                    AppError::BadRequest("A developer is required".to_string())
                })?,
            };
            let app = input.into_app();
            let created = controller.create(&owner, &app).await?;
            title_ctx.entity_label = Some(created.label());
            created.to_value()
        }
        FormOperation::Edit => {
            let app = load_app(state, route, params, developer).await?;
            title_ctx.entity_label = Some(app.label());
            if !submitted {
                return Ok(form_descriptor(route, false, Some(app.to_value()?)));
            }

            let input: CreateDeveloperAppInput = parse_body(body)?;
            input.validate()?;
            if input.name != app.name() {
                return Err(AppError::BadRequest(
                    "The app name cannot be changed".to_string(),
                ));
            }
            let owner = app_developer(developer, app.as_ref())?;
            let edited = controller
                .entity_class()
                .materialize_developer_app(apply_edit(app.to_value()?, input))?;
            let updated = controller.update(&owner, edited.as_ref()).await?;
            updated.to_value()
        }
        FormOperation::Delete => {
            let app = load_app(state, route, params, developer).await?;
            title_ctx.entity_label = Some(app.label());
            if !submitted {
                return Ok(json!({
                    "form": route.entry.handler,
                    "method": "POST",
                    "confirm": format!(
                        "Are you sure you want to delete the {} app?",
                        app.label()
                    ),
                    "entity": app.to_value()?,
                }));
            }

            let owner = app_developer(developer, app.as_ref())?;
            let deleted = controller.delete(&owner, app.name()).await?;
            deleted.to_value()
        }
    }
}

/// Load the app a route points at: by name under the developer in the path,
/// or by app id for the generic entity routes.
async fn load_app(
    state: &AppState,
    route: &MountedRoute,
    params: &HashMap<String, String>,
    developer: Option<&str>,
) -> Result<Box<dyn DeveloperAppEntity>> {
    debug!(
        route = %route.name,
        load_unchanged_entity = route.entry.options.load_unchanged_entity,
        "Loading developer app from Edge"
    );

    if let (Some(developer), Some(app)) = (developer, params.get(APP_PARAMETER)) {
        return state.developer_app_controller.load(developer, app).await;
    }

    let entity_type_id = route.entry.entity_type_id().unwrap_or_default();
    match params.get(entity_type_id) {
        Some(app_id) => state.developer_app_controller.load_by_app_id(app_id).await,
        None => Err(AppError::BadRequest(format!(
            "Route {} does not identify an app",
            route.name
        ))),
    }
}

fn require_developer(developer: Option<&str>) -> Result<&str> {
    developer.ok_or_else(|| AppError::BadRequest("A developer is required".to_string()))
}

/// Developer to address an app under; Edge accepts the developer id too.
fn app_developer(developer: Option<&str>, app: &dyn DeveloperAppEntity) -> Result<String> {
    developer
        .or_else(|| app.developer_id())
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest("The app has no developer".to_string()))
}

fn apps_to_value(apps: Vec<Box<dyn DeveloperAppEntity>>) -> Result<Value> {
    let apps = apps
        .iter()
        .map(|app| app.to_value())
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Array(apps))
}

fn form_descriptor(route: &MountedRoute, with_developer: bool, entity: Option<Value>) -> Value {
    let mut fields = vec![
        "name",
        "display_name",
        "description",
        "callback_url",
        "api_products",
    ];
    if with_developer {
        fields.push("developer");
    }
    json!({
        "form": route.entry.handler,
        "method": "POST",
        "fields": fields,
        "entity": entity,
    })
}

fn apply_edit(mut app: Value, input: CreateDeveloperAppInput) -> Value {
    if let Some(callback_url) = input.callback_url {
        app["callbackUrl"] = json!(callback_url);
    }
    if !input.api_products.is_empty() {
        app["apiProducts"] = json!(input.api_products);
    }
    if let Some(display_name) = input.display_name {
        app["attributes"][DISPLAY_NAME_ATTRIBUTE] = json!(display_name);
    }
    if let Some(description) = input.description {
        app["attributes"][NOTES_ATTRIBUTE] = json!(description);
    }
    app
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Request body is required".to_string()));
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{
        developer_app_descriptor, DeveloperAppRouteProvider, RouteProvider, RouteTable,
    };

    fn table() -> RouteTable {
        let provider: DeveloperAppRouteProvider = DeveloperAppRouteProvider::default();
        provider.routes(&developer_app_descriptor())
    }

    fn mounted(name: &str) -> MountedRoute {
        let entry = table().get(name).cloned().unwrap();
        MountedRoute::new(name, entry, "Developer App").unwrap()
    }

    #[test]
    fn test_requirements_are_anchored() {
        let route = mounted("entity.developer_app.canonical_by_developer");
        let params = |user: &str| {
            HashMap::from([
                ("user".to_string(), user.to_string()),
                ("app".to_string(), "weather".to_string()),
            ])
        };

        assert!(route.matches(&params("42")));
        assert!(!route.matches(&params("42a")));
        assert!(!route.matches(&params("a42")));
        assert!(!route.matches(&HashMap::new()));
    }

    #[test]
    fn test_route_without_requirements_matches() {
        let route = mounted("entity.developer_app.collection");
        assert!(route.matches(&HashMap::new()));
        assert!(!route.accepts_post());
    }

    #[test]
    fn test_relative_path_rejected() {
        let mut entry = table()
            .get("entity.developer_app.collection")
            .cloned()
            .unwrap();
        entry.path = "admin/apps".to_string();
        assert!(MountedRoute::new("broken", entry, "Developer App").is_err());
    }

    #[test]
    fn test_form_operation() {
        let table = table();
        let operation = |name: &str| FormOperation::of(&table.get(name).unwrap().handler).ok();

        assert_eq!(
            operation("entity.developer_app.add_form_for_developer"),
            Some(FormOperation::Add)
        );
        assert_eq!(
            operation("entity.developer_app.edit_form"),
            Some(FormOperation::Edit)
        );
        assert_eq!(
            operation("entity.developer_app.delete_form_for_developer"),
            Some(FormOperation::Delete)
        );
        assert_eq!(operation("entity.developer_app.canonical"), None);
    }

    #[test]
    fn test_apply_edit() {
        let app = json!({"name": "weather", "attributes": {"DisplayName": "Old"}});
        let input = CreateDeveloperAppInput {
            name: "weather".to_string(),
            display_name: Some("New".to_string()),
            description: None,
            callback_url: Some("https://example.com/cb".to_string()),
            api_products: vec![],
            developer: None,
        };

        let edited = apply_edit(app, input);

        assert_eq!(edited["attributes"]["DisplayName"], "New");
        assert_eq!(edited["callbackUrl"], "https://example.com/cb");
        assert!(edited.get("apiProducts").is_none());
    }
}
