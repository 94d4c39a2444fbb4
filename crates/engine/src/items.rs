//! Item primitives.
//!
//! An `Item` is a checkoutable piece of stock. `available_quantity` is a
//! derived counter: `total_quantity` minus the quantities held by open
//! transactions. Only the engine's reserve/release operations may write it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Active,
    Inactive,
    Maintenance,
    Retired,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Maintenance => "maintenance",
            Self::Retired => "retired",
        }
    }
}

impl TryFrom<&str> for ItemStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "maintenance" => Ok(Self::Maintenance),
            "retired" => Ok(Self::Retired),
            other => Err(EngineError::Validation(format!(
                "invalid item status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub total_quantity: i64,
    pub available_quantity: i64,
    pub is_checkoutable: bool,
    pub requires_approval: bool,
    pub status: ItemStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(
        name: String,
        category: Option<String>,
        total_quantity: i64,
        is_checkoutable: bool,
        requires_approval: bool,
        created_by: String,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if total_quantity < 0 {
            return Err(EngineError::Validation(
                "total_quantity must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            category,
            total_quantity,
            available_quantity: total_quantity,
            is_checkoutable,
            requires_approval,
            status: ItemStatus::Active,
            created_by,
            created_at,
        })
    }

    /// Quantity currently held by open transactions.
    pub fn reserved_quantity(&self) -> i64 {
        self.total_quantity - self.available_quantity
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub total_quantity: i64,
    pub available_quantity: i64,
    pub is_checkoutable: bool,
    pub requires_approval: bool,
    pub status: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Item> for ActiveModel {
    fn from(item: &Item) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            name: ActiveValue::Set(item.name.clone()),
            category: ActiveValue::Set(item.category.clone()),
            total_quantity: ActiveValue::Set(item.total_quantity),
            available_quantity: ActiveValue::Set(item.available_quantity),
            is_checkoutable: ActiveValue::Set(item.is_checkoutable),
            requires_approval: ActiveValue::Set(item.requires_approval),
            status: ActiveValue::Set(item.status.as_str().to_string()),
            created_by: ActiveValue::Set(item.created_by.clone()),
            created_at: ActiveValue::Set(item.created_at),
        }
    }
}

impl TryFrom<Model> for Item {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("item not exists".to_string()))?,
            name: model.name,
            category: model.category,
            total_quantity: model.total_quantity,
            available_quantity: model.available_quantity,
            is_checkoutable: model.is_checkoutable,
            requires_approval: model.requires_approval,
            status: ItemStatus::try_from(model.status.as_str())?,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
