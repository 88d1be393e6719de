//! Developer app entity

use super::{EdgeEntity, EntityClass, EntityDefinition};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use validator::Validate;

/// Attribute holding the human readable app name.
pub const DISPLAY_NAME_ATTRIBUTE: &str = "DisplayName";

/// Attribute holding the app description.
pub const NOTES_ATTRIBUTE: &str = "Notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    #[default]
    Approved,
    Pending,
    Revoked,
}

/// An API product a credential grants access to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialProduct {
    pub apiproduct: String,
    pub status: String,
}

/// A consumer key/secret pair issued for an app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppCredential {
    pub consumer_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_secret: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub api_products: Vec<CredentialProduct>,
    /// Epoch millis, `-1` for keys that never expire.
    #[serde(default)]
    pub expires_at: i64,
}

/// Contract every developer-app-shaped entity fulfils.
pub trait DeveloperAppEntity: EdgeEntity {
    fn app_id(&self) -> Option<&str>;
    fn name(&self) -> &str;
    fn developer_id(&self) -> Option<&str>;
    fn status(&self) -> AppStatus;
    fn callback_url(&self) -> Option<&str>;
    fn attributes(&self) -> &BTreeMap<String, String>;
    fn credentials(&self) -> &[AppCredential];

    fn display_name(&self) -> &str {
        self.attributes()
            .get(DISPLAY_NAME_ATTRIBUTE)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.name())
    }
}

/// Default developer app representation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperApp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_id: Option<String>,
    #[serde(default)]
    pub status: AppStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Products requested on create; Edge reports them per credential afterwards.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api_products: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<AppCredential>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl DeveloperApp {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl EdgeEntity for DeveloperApp {
    fn entity_type_id(&self) -> &'static str {
        Self::ENTITY_TYPE_ID
    }

    fn id(&self) -> Option<String> {
        self.app_id.clone()
    }

    fn label(&self) -> String {
        self.display_name().to_string()
    }

    fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EntityDefinition for DeveloperApp {
    const ENTITY_TYPE_ID: &'static str = "developer_app";

    fn entity_class() -> EntityClass {
        EntityClass::builder::<Self>().developer_app().build()
    }
}

impl DeveloperAppEntity for DeveloperApp {
    fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn developer_id(&self) -> Option<&str> {
        self.developer_id.as_deref()
    }

    fn status(&self) -> AppStatus {
        self.status
    }

    fn callback_url(&self) -> Option<&str> {
        self.callback_url.as_deref()
    }

    fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    fn credentials(&self) -> &[AppCredential] {
        &self.credentials
    }
}

/// Input for creating or updating a developer app through an owner form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDeveloperAppInput {
    #[validate(length(min = 1, max = 255), custom(function = "validate_app_name"))]
    pub name: String,
    #[validate(length(max = 255))]
    pub display_name: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub api_products: Vec<String>,
    /// Owning developer, for forms without a developer in the path.
    #[validate(email)]
    pub developer: Option<String>,
}

impl CreateDeveloperAppInput {
    /// Build the app this input describes.
    pub fn into_app(self) -> DeveloperApp {
        let mut app = DeveloperApp::new(self.name);
        app.callback_url = self.callback_url;
        app.api_products = self.api_products;
        if let Some(display_name) = self.display_name {
            app.attributes
                .insert(DISPLAY_NAME_ATTRIBUTE.to_string(), display_name);
        }
        if let Some(description) = self.description {
            app.attributes.insert(NOTES_ATTRIBUTE.to_string(), description);
        }
        app
    }
}

/// Validate app machine name (letters, digits, `_`, `-`, `.`, spaces)
fn validate_app_name(name: &str) -> std::result::Result<(), validator::ValidationError> {
    if APP_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_app_name"))
    }
}

// Regex for app name validation
lazy_static::lazy_static! {
    pub static ref APP_NAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9_.\- ]+$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_edge_app() {
        let app: DeveloperApp = serde_json::from_value(json!({
            "appId": "6e1a3c2f",
            "name": "weather-app",
            "developerId": "dev-1",
            "status": "approved",
            "callbackUrl": "https://example.com/cb",
            "attributes": {"DisplayName": "Weather"},
            "credentials": [{
                "consumerKey": "key",
                "consumerSecret": "secret",
                "status": "approved",
                "apiProducts": [{"apiproduct": "premium", "status": "approved"}],
                "expiresAt": -1
            }],
            "createdAt": 1_536_000_000_000_i64
        }))
        .unwrap();

        assert_eq!(app.id(), Some("6e1a3c2f".to_string()));
        assert_eq!(app.display_name(), "Weather");
        assert_eq!(app.credentials[0].api_products[0].apiproduct, "premium");
        assert_eq!(app.credentials[0].expires_at, -1);
    }

    #[test]
    fn test_display_name_falls_back_to_name() {
        let app = DeveloperApp::new("weather-app");
        assert_eq!(app.display_name(), "weather-app");
        assert_eq!(app.id(), None);
    }

    #[test]
    fn test_app_name_regex() {
        assert!(APP_NAME_REGEX.is_match("weather-app"));
        assert!(APP_NAME_REGEX.is_match("My App 2.0"));
        assert!(!APP_NAME_REGEX.is_match("app/with/slash"));
        assert!(!APP_NAME_REGEX.is_match("<script>"));
    }

    #[test]
    fn test_create_input_validation() {
        let valid = CreateDeveloperAppInput {
            name: "weather-app".to_string(),
            display_name: Some("Weather".to_string()),
            description: None,
            callback_url: Some("https://example.com/callback".to_string()),
            api_products: vec!["premium".to_string()],
            developer: Some("dev@example.com".to_string()),
        };
        assert!(valid.validate().is_ok());

        let invalid = CreateDeveloperAppInput {
            name: "bad/name".to_string(),
            callback_url: Some("not a url".to_string()),
            ..valid.clone()
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_create_input_into_app() {
        let app = CreateDeveloperAppInput {
            name: "weather-app".to_string(),
            display_name: Some("Weather".to_string()),
            description: Some("Forecasts".to_string()),
            callback_url: None,
            api_products: vec!["premium".to_string()],
            developer: None,
        }
        .into_app();

        assert_eq!(app.name, "weather-app");
        assert_eq!(app.api_products, vec!["premium".to_string()]);
        assert_eq!(app.attributes.get(NOTES_ATTRIBUTE).map(String::as_str), Some("Forecasts"));
        assert_eq!(app.label(), "Weather");
    }
}
