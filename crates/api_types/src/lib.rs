use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod item {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ItemStatus {
        Active,
        Inactive,
        Maintenance,
        Retired,
    }

    /// Request body for creating an item.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        pub name: String,
        pub category: Option<String>,
        pub total_quantity: i64,
        /// Defaults to `true`.
        pub is_checkoutable: Option<bool>,
        /// Defaults to `false`.
        pub requires_approval: Option<bool>,
    }

    /// Request body for updating an item. Absent fields are left unchanged.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemUpdate {
        pub name: Option<String>,
        pub category: Option<String>,
        pub total_quantity: Option<i64>,
        pub is_checkoutable: Option<bool>,
        pub requires_approval: Option<bool>,
    }

    /// Request body for changing the item lifecycle status.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemStatusUpdate {
        pub status: ItemStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: Uuid,
        pub name: String,
        pub category: Option<String>,
        pub total_quantity: i64,
        pub available_quantity: i64,
        pub is_checkoutable: bool,
        pub requires_approval: bool,
        pub status: ItemStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemListResponse {
        pub items: Vec<ItemView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Checkout,
        Return,
        Reserve,
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

    /// Request body for a single-item checkout.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CheckoutNew {
        pub item_id: Uuid,
        pub quantity: i64,
        /// Optional: if absent, server uses now().
        pub checkout_date: Option<DateTime<Utc>>,
        pub expected_return_date: DateTime<Utc>,
        pub purpose: Option<String>,
        pub destination: Option<String>,
        pub notes: Option<String>,
    }

    /// One line of a multi-item checkout.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CheckoutLineNew {
        pub item_id: Uuid,
        pub quantity: i64,
    }

    /// Request body for a multi-item checkout. All-or-nothing.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BulkCheckoutNew {
        pub lines: Vec<CheckoutLineNew>,
        /// Optional: if absent, server uses now().
        pub checkout_date: Option<DateTime<Utc>>,
        pub expected_return_date: DateTime<Utc>,
        pub purpose: Option<String>,
        pub destination: Option<String>,
        pub notes: Option<String>,
    }

    /// Request body for approving or rejecting a pending checkout.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ApprovalDecision {
        pub notes: Option<String>,
    }

    /// Request body for recording a return.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReturnNew {
        /// Optional: if absent, server uses now().
        pub returned_at: Option<DateTime<Utc>>,
    }

    /// Request body for extending an active checkout.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExtendNew {
        pub expected_return_date: DateTime<Utc>,
    }

    /// Query parameters for listing transactions.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub status: Option<TransactionStatus>,
        pub kind: Option<TransactionKind>,
        pub item_id: Option<Uuid>,
        pub user_id: Option<String>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub tx_number: String,
        pub item_id: Uuid,
        pub user_id: String,
        pub kind: TransactionKind,
        /// Derived: an active transaction past its expected return date is
        /// reported as `overdue`.
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
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BulkCheckoutResponse {
        pub transactions: Vec<TransactionView>,
    }
}
