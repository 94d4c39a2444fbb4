//! Users entity for the Basic-auth middleware.
//!
//! Permission checks live in the engine; the server only authenticates the
//! row and forwards the username.

use sea_orm::entity::prelude::*;

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
