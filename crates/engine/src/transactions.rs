//! Transaction primitives.
//!
//! A `Transaction` records one checkout of an item by a user and the state it
//! moved through. `pending` and `active` hold a quantity reservation; the
//! terminal states (`returned`, `cancelled`, `rejected`) have released it and
//! are kept as history, never deleted.
//!
//! `overdue` is a computed status: it is reported for `active` transactions
//! past their expected return date but never written to storage.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Checkout,
    Return,
    Reserve,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Return => "return",
            Self::Reserve => "reserve",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "checkout" => Ok(Self::Checkout),
            "return" => Ok(Self::Return),
            "reserve" => Ok(Self::Reserve),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Active,
    Overdue,
    Returned,
    Cancelled,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Overdue => "overdue",
            Self::Returned => "returned",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
        }
    }

    /// Open transactions still hold a quantity reservation.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Active | Self::Overdue)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Returned | Self::Cancelled | Self::Rejected)
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "overdue" => Ok(Self::Overdue),
            "returned" => Ok(Self::Returned),
            "cancelled" => Ok(Self::Cancelled),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::Validation(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

/// Human-readable transaction number: date plus a per-day sequence.
pub fn transaction_number(date: DateTime<Utc>, sequence: u64) -> String {
    format!("CO-{}-{:04}", date.format("%Y%m%d"), sequence)
}

/// Prefix shared by all transaction numbers issued on `date`.
pub fn transaction_number_prefix(date: DateTime<Utc>) -> String {
    format!("CO-{}-", date.format("%Y%m%d"))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub tx_number: String,
    pub item_id: Uuid,
    pub user_id: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub quantity: i64,
    pub checkout_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub purpose: Option<String>,
    pub destination: Option<String>,
    pub notes: Option<String>,
    pub approved_by: Option<String>,
    pub approval_notes: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tx_number: String,
        item_id: Uuid,
        user_id: String,
        kind: TransactionKind,
        status: TransactionStatus,
        quantity: i64,
        checkout_date: DateTime<Utc>,
        expected_return_date: DateTime<Utc>,
        purpose: Option<String>,
        destination: Option<String>,
        notes: Option<String>,
    ) -> ResultEngine<Self> {
        if quantity < 1 {
            return Err(EngineError::Validation("quantity must be >= 1".to_string()));
        }
        if expected_return_date <= checkout_date {
            return Err(EngineError::Validation(
                "expected_return_date must be after checkout_date".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            tx_number,
            item_id,
            user_id,
            kind,
            status,
            quantity,
            checkout_date,
            expected_return_date,
            actual_return_date: None,
            purpose,
            destination,
            notes,
            approved_by: None,
            approval_notes: None,
            approved_at: None,
            created_at: checkout_date,
        })
    }

    pub fn is_effectively_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == TransactionStatus::Active && self.expected_return_date < now
    }

    /// The status as seen by callers, with `overdue` derived at read time.
    pub fn effective_status(&self, now: DateTime<Utc>) -> TransactionStatus {
        if self.is_effectively_overdue(now) {
            TransactionStatus::Overdue
        } else {
            self.status
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tx_number: String,
    pub item_id: String,
    pub user_id: String,
    pub kind: String,
    pub status: String,
    pub quantity: i64,
    pub checkout_date: DateTimeUtc,
    pub expected_return_date: DateTimeUtc,
    pub actual_return_date: Option<DateTimeUtc>,
    pub purpose: Option<String>,
    pub destination: Option<String>,
    pub notes: Option<String>,
    pub approved_by: Option<String>,
    pub approval_notes: Option<String>,
    pub approved_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Items,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            tx_number: ActiveValue::Set(tx.tx_number.clone()),
            item_id: ActiveValue::Set(tx.item_id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            quantity: ActiveValue::Set(tx.quantity),
            checkout_date: ActiveValue::Set(tx.checkout_date),
            expected_return_date: ActiveValue::Set(tx.expected_return_date),
            actual_return_date: ActiveValue::Set(tx.actual_return_date),
            purpose: ActiveValue::Set(tx.purpose.clone()),
            destination: ActiveValue::Set(tx.destination.clone()),
            notes: ActiveValue::Set(tx.notes.clone()),
            approved_by: ActiveValue::Set(tx.approved_by.clone()),
            approval_notes: ActiveValue::Set(tx.approval_notes.clone()),
            approved_at: ActiveValue::Set(tx.approved_at),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?,
            tx_number: model.tx_number,
            item_id: Uuid::parse_str(&model.item_id)
                .map_err(|_| EngineError::KeyNotFound("item not exists".to_string()))?,
            user_id: model.user_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            quantity: model.quantity,
            checkout_date: model.checkout_date,
            expected_return_date: model.expected_return_date,
            actual_return_date: model.actual_return_date,
            purpose: model.purpose,
            destination: model.destination,
            notes: model.notes,
            approved_by: model.approved_by,
            approval_notes: model.approval_notes,
            approved_at: model.approved_at,
            created_at: model.created_at,
        })
    }
}
