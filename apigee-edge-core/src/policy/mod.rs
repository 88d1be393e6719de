//! Route access policy.
//!
//! Every [`AccessCheck`] on a route must pass. Permission names follow the
//! `administer <type>`, `create <type>`, `<op> any <type>` and
//! `<op> own <type>` scheme.

use crate::error::AppError;
use crate::routing::{AccessCheck, CustomAccessCheck, EntityOperation, RouteEntry};
use std::collections::BTreeSet;
use tracing::debug;

pub type PolicyResult<T> = std::result::Result<T, AppError>;

/// The account a request is made for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    /// `0` for anonymous requests.
    pub uid: u64,
    pub name: String,
    pub permissions: BTreeSet<String>,
}

impl Account {
    pub fn new(uid: u64, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
            permissions: BTreeSet::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.uid == 0
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Request facts the checks depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessContext {
    /// User id of the developer owning the routed app (or app listing).
    pub owner: Option<u64>,
}

impl AccessContext {
    pub fn owned_by(owner: u64) -> Self {
        Self { owner: Some(owner) }
    }

    pub fn is_owner(&self, account: &Account) -> bool {
        !account.is_anonymous() && self.owner == Some(account.uid)
    }
}

/// Evaluate all access checks of `entry`.
pub fn check_route_access(
    account: &Account,
    entry: &RouteEntry,
    ctx: &AccessContext,
) -> PolicyResult<()> {
    let entity_type_id = entry.entity_type_id().unwrap_or_default();

    for check in &entry.access {
        let granted = match check {
            AccessCheck::Permission(permissions) => {
                permissions.is_granted_by(|permission| account.has_permission(permission))
            }
            AccessCheck::EntityCreateAccess { entity_type_id } => {
                has_create_access(account, ctx, entity_type_id)
            }
            AccessCheck::EntityAccess {
                entity_type_id,
                operation,
            } => has_operation_access(account, ctx, entity_type_id, *operation),
            AccessCheck::DeveloperAppAccess { operation } => {
                has_operation_access(account, ctx, entity_type_id, *operation)
            }
            AccessCheck::CustomAccess {
                check: CustomAccessCheck::MyApps,
            } => has_operation_access(account, ctx, entity_type_id, EntityOperation::View),
        };

        if !granted {
            debug!(
                uid = account.uid,
                path = %entry.path,
                check = ?check,
                "Route access denied"
            );
            return Err(AppError::Forbidden(format!(
                "Access denied to {}",
                entry.path
            )));
        }
    }

    Ok(())
}

fn has_admin_permission(account: &Account, entity_type_id: &str) -> bool {
    account.has_permission(&format!("administer {}", entity_type_id))
}

/// On owner-scoped routes only the owner may create for themselves.
fn has_create_access(account: &Account, ctx: &AccessContext, entity_type_id: &str) -> bool {
    has_admin_permission(account, entity_type_id)
        || (account.has_permission(&format!("create {}", entity_type_id))
            && (ctx.owner.is_none() || ctx.is_owner(account)))
}

fn has_operation_access(
    account: &Account,
    ctx: &AccessContext,
    entity_type_id: &str,
    operation: EntityOperation,
) -> bool {
    has_admin_permission(account, entity_type_id)
        || account.has_permission(&format!("{} any {}", operation, entity_type_id))
        || (ctx.is_owner(account)
            && account.has_permission(&format!("{} own {}", operation, entity_type_id)))
}
