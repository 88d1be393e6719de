//! Bound controllers against a mock Edge backend

mod common;

use apigee_edge_core::edge::{default_normalizers, EdgeClient, EdgeTransport};
use apigee_edge_core::entity::{
    ApiProduct, ApiProductController, ApiProductEntity, DeveloperApp, DeveloperAppController,
    DeveloperAppEntity, EdgeEntity, EntityClass,
};
use apigee_edge_core::AppError;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{basic_auth, body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(mock_server: &MockServer) -> Arc<dyn EdgeTransport> {
    Arc::new(EdgeClient::new(common::edge_config(mock_server)).unwrap())
}

fn api_product_controller(mock_server: &MockServer) -> ApiProductController {
    ApiProductController::new(
        common::ORGANIZATION,
        transport(mock_server),
        Vec::new(),
        EntityClass::of::<ApiProduct>(),
    )
    .unwrap()
}

fn developer_app_controller(mock_server: &MockServer) -> DeveloperAppController {
    DeveloperAppController::new(
        common::ORGANIZATION,
        transport(mock_server),
        default_normalizers(),
        EntityClass::of::<DeveloperApp>(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_capable_class_is_bound() {
    let mock_server = MockServer::start().await;
    let controller = api_product_controller(&mock_server);

    assert_eq!(controller.entity_class(), &EntityClass::of::<ApiProduct>());
    assert!(controller.entity_class().is::<ApiProduct>());
    assert_eq!(controller.organization(), common::ORGANIZATION);
}

#[tokio::test]
async fn test_incapable_class_is_rejected() {
    let mock_server = MockServer::start().await;

    let result = ApiProductController::new(
        common::ORGANIZATION,
        transport(&mock_server),
        Vec::new(),
        EntityClass::of::<DeveloperApp>(),
    );
    match result {
        Err(AppError::InvalidBinding { required, .. }) => {
            assert_eq!(required, "ApiProductEntity");
        }
        other => panic!("expected InvalidBinding, got {:?}", other),
    }

    let result = DeveloperAppController::new(
        common::ORGANIZATION,
        transport(&mock_server),
        Vec::new(),
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

#[tokio::test]
async fn test_binding_sends_no_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let _ = api_product_controller(&mock_server);
    let _ = developer_app_controller(&mock_server);
}

#[tokio::test]
async fn test_load_api_product() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations/test-org/apiproducts/premium"))
        .and(basic_auth("admin@example.com", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "premium",
            "displayName": "Premium",
            "approvalType": "manual",
            "environments": ["prod"],
            "attributes": [{"name": "access", "value": "private"}]
        })))
        .mount(&mock_server)
        .await;

    let product = api_product_controller(&mock_server)
        .load("premium")
        .await
        .unwrap();

    assert_eq!(product.name(), "premium");
    assert_eq!(product.environments(), ["prod".to_string()]);
    assert!(!product.is_public());
}

#[tokio::test]
async fn test_list_api_products() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations/test-org/apiproducts"))
        .and(query_param("expand", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "apiProduct": [{"name": "basic"}, {"name": "premium"}]
        })))
        .mount(&mock_server)
        .await;

    let products = api_product_controller(&mock_server).list().await.unwrap();
    let names: Vec<&str> = products.iter().map(|product| product.name()).collect();

    assert_eq!(names, vec!["basic", "premium"]);
}

#[tokio::test]
async fn test_create_developer_app() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(
            r"^/v1/organizations/test-org/developers/dev(%40|@)example\.com/apps$",
        ))
        .and(body_partial_json(json!({
            "name": "weather",
            "attributes": [{"name": "DisplayName", "value": "Weather"}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "appId": "a1b2",
            "name": "weather",
            "developerId": "d-1",
            "status": "approved",
            "attributes": [{"name": "DisplayName", "value": "Weather"}],
            "credentials": [{
                "consumerKey": "key",
                "consumerSecret": "secret",
                "status": "approved",
                "apiProducts": [{"apiproduct": "basic", "status": "approved"}],
                "expiresAt": -1
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut app = DeveloperApp::new("weather");
    app.attributes
        .insert("DisplayName".to_string(), "Weather".to_string());

    let created = developer_app_controller(&mock_server)
        .create(common::DEVELOPER_EMAIL, &app)
        .await
        .unwrap();

    assert_eq!(created.app_id(), Some("a1b2"));
    assert_eq!(created.developer_id(), Some("d-1"));
    assert_eq!(DeveloperAppEntity::display_name(&*created), "Weather");
    assert_eq!(created.credentials().len(), 1);
}

#[tokio::test]
async fn test_developer_app_conflict() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "developer.service.AppAlreadyExists",
            "message": "App with name weather already exists"
        })))
        .mount(&mock_server)
        .await;

    let result = developer_app_controller(&mock_server)
        .create(common::DEVELOPER_EMAIL, &DeveloperApp::new("weather"))
        .await;

    match result {
        Err(AppError::Conflict(message)) => {
            assert_eq!(message, "App with name weather already exists");
        }
        other => panic!("expected Conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_load_app_by_id() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations/test-org/apps/a1b2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "appId": "a1b2",
            "name": "weather",
            "status": "revoked"
        })))
        .mount(&mock_server)
        .await;

    let app = developer_app_controller(&mock_server)
        .load_by_app_id("a1b2")
        .await
        .unwrap();

    assert_eq!(app.name(), "weather");
    assert_eq!(app.id(), Some("a1b2".to_string()));
}

#[tokio::test]
async fn test_list_developer_app_names() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(
            r"^/v1/organizations/test-org/developers/dev(%40|@)example\.com/apps$",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["weather", "maps"])))
        .mount(&mock_server)
        .await;

    let names = developer_app_controller(&mock_server)
        .list_ids(common::DEVELOPER_EMAIL)
        .await
        .unwrap();

    assert_eq!(names, vec!["weather", "maps"]);
}
