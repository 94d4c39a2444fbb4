//! Command structs for engine operations.
//!
//! These types group parameters for write operations (checkout, bulk
//! checkout, item management), keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Create a checkout transaction for a single item.
#[derive(Clone, Debug)]
pub struct CheckoutCmd {
    pub item_id: Uuid,
    pub user_id: String,
    pub quantity: i64,
    pub checkout_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub purpose: Option<String>,
    pub destination: Option<String>,
    pub notes: Option<String>,
}

impl CheckoutCmd {
    #[must_use]
    pub fn new(
        item_id: Uuid,
        user_id: impl Into<String>,
        quantity: i64,
        checkout_date: DateTime<Utc>,
        expected_return_date: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id,
            user_id: user_id.into(),
            quantity,
            checkout_date,
            expected_return_date,
            purpose: None,
            destination: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    #[must_use]
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One item line of a multi-item checkout.
#[derive(Clone, Debug)]
pub struct CheckoutLine {
    pub item_id: Uuid,
    pub quantity: i64,
}

/// Create one checkout transaction per item, all-or-nothing.
#[derive(Clone, Debug)]
pub struct BulkCheckoutCmd {
    pub user_id: String,
    pub lines: Vec<CheckoutLine>,
    pub checkout_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub purpose: Option<String>,
    pub destination: Option<String>,
    pub notes: Option<String>,
}

impl BulkCheckoutCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        lines: Vec<CheckoutLine>,
        checkout_date: DateTime<Utc>,
        expected_return_date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            lines,
            checkout_date,
            expected_return_date,
            purpose: None,
            destination: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    #[must_use]
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Create a new item.
#[derive(Clone, Debug)]
pub struct NewItemCmd {
    pub user_id: String,
    pub name: String,
    pub category: Option<String>,
    pub total_quantity: i64,
    pub is_checkoutable: bool,
    pub requires_approval: bool,
}

impl NewItemCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, total_quantity: i64) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            category: None,
            total_quantity,
            is_checkoutable: true,
            requires_approval: false,
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn is_checkoutable(mut self, is_checkoutable: bool) -> Self {
        self.is_checkoutable = is_checkoutable;
        self
    }

    #[must_use]
    pub fn requires_approval(mut self, requires_approval: bool) -> Self {
        self.requires_approval = requires_approval;
        self
    }
}

/// Update an existing item. `None` fields are left unchanged.
#[derive(Clone, Debug)]
pub struct UpdateItemCmd {
    pub item_id: Uuid,
    pub user_id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub total_quantity: Option<i64>,
    pub is_checkoutable: Option<bool>,
    pub requires_approval: Option<bool>,
}

impl UpdateItemCmd {
    #[must_use]
    pub fn new(item_id: Uuid, user_id: impl Into<String>) -> Self {
        Self {
            item_id,
            user_id: user_id.into(),
            name: None,
            category: None,
            total_quantity: None,
            is_checkoutable: None,
            requires_approval: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn total_quantity(mut self, total_quantity: i64) -> Self {
        self.total_quantity = Some(total_quantity);
        self
    }

    #[must_use]
    pub fn is_checkoutable(mut self, is_checkoutable: bool) -> Self {
        self.is_checkoutable = Some(is_checkoutable);
        self
    }

    #[must_use]
    pub fn requires_approval(mut self, requires_approval: bool) -> Self {
        self.requires_approval = Some(requires_approval);
        self
    }
}
