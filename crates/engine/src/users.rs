//! Users table and the permission model.
//!
//! The engine consults role and permission flags before authorizing
//! operations. Admins implicitly hold every permission; everyone else is
//! governed by the per-user flags.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    User,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::User => "user",
        }
    }
}

impl TryFrom<&str> for UserRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "user" => Ok(Self::User),
            other => Err(EngineError::Validation(format!("invalid role: {other}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Checkout,
    Approve,
    ManageItems,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Approve => "approve",
            Self::ManageItems => "manage_items",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub role: String,
    pub team: Option<String>,
    pub can_checkout: bool,
    pub can_approve: bool,
    pub can_manage_items: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn grants(&self, permission: Permission) -> bool {
        if UserRole::try_from(self.role.as_str()) == Ok(UserRole::Admin) {
            return true;
        }
        match permission {
            Permission::Checkout => self.can_checkout,
            Permission::Approve => self.can_approve,
            Permission::ManageItems => self.can_manage_items,
        }
    }
}
