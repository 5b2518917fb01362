//! Role and permission model for the back-office team.
//!
//! Authentication and session handling live in the presentation layer; the
//! core only needs to know who is acting and what their role allows, so it
//! can refuse mutations the role does not cover.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Capabilities checked at service entry points.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ProductView,
    ProductEdit,
    ProductDelete,
    CustomerView,
    CustomerEdit,
    CustomerDelete,
    OrderView,
    OrderCreate,
    OrderChange,
    OrderDelete,
    MovementView,
}

/// Back-office roles. Admin holds every permission; a sales user gets the
/// restricted set: read the catalog, manage customers (no delete), and
/// create orders without being able to confirm or cancel them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SalesUser,
}

impl Role {
    pub fn allows(&self, permission: Permission) -> bool {
        match self {
            Role::Admin => true,
            Role::SalesUser => matches!(
                permission,
                Permission::ProductView
                    | Permission::CustomerView
                    | Permission::CustomerEdit
                    | Permission::OrderView
                    | Permission::OrderCreate
                    | Permission::MovementView
            ),
        }
    }
}

/// The acting user, as handed in by the presentation layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Actor {
    /// Stable account id; `None` for system-initiated actions.
    pub user_id: Option<Uuid>,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: Some(user_id),
            username: username.into(),
            role,
        }
    }

    /// Fails with `Forbidden` unless the actor's role covers `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), ServiceError> {
        if self.role.allows(permission) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "user '{}' lacks permission {:?}",
                self.username, permission
            )))
        }
    }
}
