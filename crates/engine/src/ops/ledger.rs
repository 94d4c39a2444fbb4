//! Item availability ledger.
//!
//! `available_quantity` is the only concurrently-contended field in the
//! system. Every mutation goes through `reserve`/`release`, each a single
//! guarded UPDATE: the check and the decrement happen in one statement, so
//! two concurrent reservations can never both succeed on the last unit.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, items};

use super::Engine;

impl Engine {
    /// Atomically checks `available_quantity >= quantity` and decrements it.
    pub(super) async fn reserve(
        &self,
        db_tx: &DatabaseTransaction,
        item_id: Uuid,
        quantity: i64,
    ) -> ResultEngine<()> {
        let result = items::Entity::update_many()
            .col_expr(
                items::Column::AvailableQuantity,
                Expr::col(items::Column::AvailableQuantity).sub(quantity),
            )
            .filter(items::Column::Id.eq(item_id.to_string()))
            .filter(items::Column::AvailableQuantity.gte(quantity))
            .exec(db_tx)
            .await?;

        if result.rows_affected == 1 {
            return Ok(());
        }

        let model = self.require_item(db_tx, item_id).await?;
        Err(EngineError::InsufficientQuantity {
            requested: quantity,
            available: model.available_quantity,
        })
    }

    /// Increments `available_quantity`, guarded so it never exceeds
    /// `total_quantity`. A guard failure on an existing item means a
    /// reservation was double-released somewhere: fatal, logged loudly,
    /// never silently clamped.
    pub(super) async fn release(
        &self,
        db_tx: &DatabaseTransaction,
        item_id: Uuid,
        quantity: i64,
    ) -> ResultEngine<()> {
        let result = items::Entity::update_many()
            .col_expr(
                items::Column::AvailableQuantity,
                Expr::col(items::Column::AvailableQuantity).add(quantity),
            )
            .filter(items::Column::Id.eq(item_id.to_string()))
            .filter(
                Expr::col(items::Column::AvailableQuantity)
                    .lte(Expr::col(items::Column::TotalQuantity).sub(quantity)),
            )
            .exec(db_tx)
            .await?;

        if result.rows_affected == 1 {
            return Ok(());
        }

        let model = self.require_item(db_tx, item_id).await?;
        tracing::error!(
            item_id = %item_id,
            quantity,
            available_quantity = model.available_quantity,
            total_quantity = model.total_quantity,
            "release would push available_quantity past total_quantity"
        );
        Err(EngineError::InvariantViolation(format!(
            "releasing {quantity} on item {item_id} would exceed total_quantity"
        )))
    }
}
