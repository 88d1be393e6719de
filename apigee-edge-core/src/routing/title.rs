//! Route title resolution

use super::developer_app::MY_APPS_TITLE;
use super::route::{TitleKind, TitleProvider};

/// What a title callback can see about the current request.
#[derive(Debug, Clone, Default)]
pub struct TitleContext {
    pub entity_type_label: String,
    /// Label of the routed entity, if the route has one.
    pub entity_label: Option<String>,
    /// Display name of the developer in the path.
    pub owner_name: Option<String>,
    /// Whether the current account is that developer.
    pub viewer_is_owner: bool,
}

pub fn resolve(provider: &TitleProvider, ctx: &TitleContext) -> String {
    match provider {
        TitleProvider::Entity(kind) | TitleProvider::App(kind) => kind_title(*kind, ctx),
        TitleProvider::Named(name) if name == MY_APPS_TITLE => my_apps_title(ctx),
        TitleProvider::Named(name) => name.clone(),
        TitleProvider::Static(title) => title.clone(),
    }
}

fn kind_title(kind: TitleKind, ctx: &TitleContext) -> String {
    let entity = ctx
        .entity_label
        .as_deref()
        .unwrap_or(&ctx.entity_type_label);
    match kind {
        TitleKind::View => entity.to_string(),
        TitleKind::Add => format!("Add {}", ctx.entity_type_label),
        TitleKind::Edit => format!("Edit {}", entity),
        TitleKind::Delete => format!("Delete {}", entity),
        TitleKind::Analytics => format!("Analytics of {}", entity),
    }
}

fn my_apps_title(ctx: &TitleContext) -> String {
    match (&ctx.owner_name, ctx.viewer_is_owner) {
        (Some(owner), false) => format!("Apps of {}", owner),
        _ => "My apps".to_string(),
    }
}
