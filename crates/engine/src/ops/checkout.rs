//! Checkout/approval/return transaction lifecycle.
//!
//! Reservation happens at request time, not at approval time: concurrent
//! requests for the same limited stock are serialized by the ledger and an
//! item cannot be over-promised while approvals are pending.
//!
//! Transition table:
//!
//! | from    | event   | to        | quantity    |
//! |---------|---------|-----------|-------------|
//! | —       | create  | pending*  | reserved    |
//! | —       | create  | active    | reserved    |
//! | pending | approve | active    | kept        |
//! | pending | reject  | rejected  | released    |
//! | pending | cancel  | cancelled | released    |
//! | active  | return  | returned  | released    |
//!
//! (*) when the item requires approval. `overdue` is derived at read time
//! from active transactions past their expected return date; `return` covers
//! it.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    BulkCheckoutCmd, CheckoutCmd, EngineError, NotifyEvent, Permission, ResultEngine, Transaction,
    TransactionKind, TransactionStatus, items::ItemStatus, transactions,
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Create a checkout transaction, reserving the requested quantity.
    ///
    /// The transaction starts `pending` when the item requires approval and
    /// `active` otherwise. Fails with `InsufficientQuantity` without any state
    /// mutation when the item cannot cover the request.
    pub async fn checkout(&self, cmd: CheckoutCmd) -> ResultEngine<Transaction> {
        let tx = with_tx!(self, |db_tx| {
            self.create_checkout(&db_tx, &cmd).await
        })?;
        self.emit(NotifyEvent::Created, &tx);
        Ok(tx)
    }

    /// Create one checkout transaction per line, all-or-nothing.
    ///
    /// Every line runs inside a single DB transaction; if any item lacks
    /// sufficient quantity the whole request rolls back, so a requester never
    /// ends up with part of a multi-item kit.
    pub async fn bulk_checkout(&self, cmd: BulkCheckoutCmd) -> ResultEngine<Vec<Transaction>> {
        if cmd.lines.is_empty() {
            return Err(EngineError::Validation(
                "bulk checkout requires at least one item".to_string(),
            ));
        }

        let txs = with_tx!(self, |db_tx| {
            let mut out = Vec::with_capacity(cmd.lines.len());
            for line in &cmd.lines {
                let single = CheckoutCmd {
                    item_id: line.item_id,
                    user_id: cmd.user_id.clone(),
                    quantity: line.quantity,
                    checkout_date: cmd.checkout_date,
                    expected_return_date: cmd.expected_return_date,
                    purpose: cmd.purpose.clone(),
                    destination: cmd.destination.clone(),
                    notes: cmd.notes.clone(),
                };
                out.push(self.create_checkout(&db_tx, &single).await?);
            }
            Ok::<_, EngineError>(out)
        })?;

        for tx in &txs {
            self.emit(NotifyEvent::Created, tx);
        }
        Ok(txs)
    }

    async fn create_checkout(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &CheckoutCmd,
    ) -> ResultEngine<Transaction> {
        self.require_user_with(db_tx, &cmd.user_id, Permission::Checkout)
            .await?;

        let item_model = self.require_item(db_tx, cmd.item_id).await?;
        let item_status = ItemStatus::try_from(item_model.status.as_str())?;
        if item_status != ItemStatus::Active {
            return Err(EngineError::Validation(format!(
                "item \"{}\" is {}",
                item_model.name,
                item_status.as_str()
            )));
        }
        if !item_model.is_checkoutable {
            return Err(EngineError::Validation(format!(
                "item \"{}\" is not checkoutable",
                item_model.name
            )));
        }

        let status = if item_model.requires_approval {
            TransactionStatus::Pending
        } else {
            TransactionStatus::Active
        };

        let tx_number = self.next_tx_number(db_tx, cmd.checkout_date).await?;
        let tx = Transaction::new(
            tx_number,
            cmd.item_id,
            cmd.user_id.clone(),
            TransactionKind::Checkout,
            status,
            cmd.quantity,
            cmd.checkout_date,
            cmd.expected_return_date,
            normalize_optional_text(cmd.purpose.as_deref()),
            normalize_optional_text(cmd.destination.as_deref()),
            normalize_optional_text(cmd.notes.as_deref()),
        )?;

        self.reserve(db_tx, cmd.item_id, cmd.quantity).await?;
        transactions::ActiveModel::from(&tx).insert(db_tx).await?;

        Ok(tx)
    }

    /// Per-day sequence, computed inside the DB transaction so two creates
    /// cannot race for the same number.
    async fn next_tx_number(
        &self,
        db_tx: &DatabaseTransaction,
        date: DateTime<Utc>,
    ) -> ResultEngine<String> {
        let prefix = transactions::transaction_number_prefix(date);
        let issued_today = transactions::Entity::find()
            .filter(transactions::Column::TxNumber.starts_with(&prefix))
            .count(db_tx)
            .await?;
        Ok(transactions::transaction_number(date, issued_today + 1))
    }

    /// Approve a pending transaction. The reservation made at creation time
    /// is kept, so the item counters do not move. Approver and requester
    /// must be different users.
    pub async fn approve(
        &self,
        transaction_id: Uuid,
        approver_id: &str,
        notes: Option<&str>,
    ) -> ResultEngine<Transaction> {
        let tx = with_tx!(self, |db_tx| {
            self.require_user_with(&db_tx, approver_id, Permission::Approve)
                .await?;
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            if model.user_id == approver_id {
                return Err(EngineError::Forbidden(
                    "a checkout cannot be approved by its requester".to_string(),
                ));
            }
            require_status(&model, &[TransactionStatus::Pending], "approve")?;

            let updated = transactions::ActiveModel {
                id: ActiveValue::Set(model.id),
                status: ActiveValue::Set(TransactionStatus::Active.as_str().to_string()),
                approved_by: ActiveValue::Set(Some(approver_id.to_string())),
                approval_notes: ActiveValue::Set(normalize_optional_text(notes)),
                approved_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Transaction::try_from(updated)
        })?;
        self.emit(NotifyEvent::Approved, &tx);
        Ok(tx)
    }

    /// Reject a pending transaction, releasing its reservation.
    pub async fn reject(
        &self,
        transaction_id: Uuid,
        approver_id: &str,
        notes: Option<&str>,
    ) -> ResultEngine<Transaction> {
        let tx = with_tx!(self, |db_tx| {
            self.require_user_with(&db_tx, approver_id, Permission::Approve)
                .await?;
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            require_status(&model, &[TransactionStatus::Pending], "reject")?;

            let item_id = parse_item_id(&model)?;
            self.release(&db_tx, item_id, model.quantity).await?;

            let updated = transactions::ActiveModel {
                id: ActiveValue::Set(model.id),
                status: ActiveValue::Set(TransactionStatus::Rejected.as_str().to_string()),
                approved_by: ActiveValue::Set(Some(approver_id.to_string())),
                approval_notes: ActiveValue::Set(normalize_optional_text(notes)),
                approved_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Transaction::try_from(updated)
        })?;
        self.emit(NotifyEvent::Rejected, &tx);
        Ok(tx)
    }

    /// Cancel a pending transaction. Only the requester may cancel.
    pub async fn cancel(
        &self,
        transaction_id: Uuid,
        requester_id: &str,
    ) -> ResultEngine<Transaction> {
        let tx = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, requester_id).await?;
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            if model.user_id != requester_id {
                return Err(EngineError::Forbidden(
                    "only the requester may cancel a checkout".to_string(),
                ));
            }
            require_status(&model, &[TransactionStatus::Pending], "cancel")?;

            let item_id = parse_item_id(&model)?;
            self.release(&db_tx, item_id, model.quantity).await?;

            let updated = transactions::ActiveModel {
                id: ActiveValue::Set(model.id),
                status: ActiveValue::Set(TransactionStatus::Cancelled.as_str().to_string()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Transaction::try_from(updated)
        })?;
        self.emit(NotifyEvent::Cancelled, &tx);
        Ok(tx)
    }

    /// Return an active (or effectively overdue) checkout, releasing its
    /// reservation exactly once. A second return fails with
    /// `InvalidStateTransition`.
    pub async fn return_item(
        &self,
        transaction_id: Uuid,
        user_id: &str,
        returned_at: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let tx = with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            if model.user_id != user_id && !user.grants(Permission::Approve) {
                return Err(EngineError::Forbidden(
                    "only the requester or an approver may record a return".to_string(),
                ));
            }
            require_status(
                &model,
                &[TransactionStatus::Active, TransactionStatus::Overdue],
                "return",
            )?;

            let item_id = parse_item_id(&model)?;
            self.release(&db_tx, item_id, model.quantity).await?;

            let updated = transactions::ActiveModel {
                id: ActiveValue::Set(model.id),
                status: ActiveValue::Set(TransactionStatus::Returned.as_str().to_string()),
                actual_return_date: ActiveValue::Set(Some(returned_at)),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Transaction::try_from(updated)
        })?;
        self.emit(NotifyEvent::Returned, &tx);
        Ok(tx)
    }

    /// Push out the expected return date of an active checkout.
    pub async fn extend(
        &self,
        transaction_id: Uuid,
        user_id: &str,
        new_expected_return_date: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            if model.user_id != user_id && !user.grants(Permission::Approve) {
                return Err(EngineError::Forbidden(
                    "only the requester or an approver may extend a checkout".to_string(),
                ));
            }
            require_status(
                &model,
                &[TransactionStatus::Active, TransactionStatus::Overdue],
                "extend",
            )?;
            if new_expected_return_date <= model.expected_return_date {
                return Err(EngineError::Validation(
                    "new expected_return_date must be later than the current one".to_string(),
                ));
            }

            let updated = transactions::ActiveModel {
                id: ActiveValue::Set(model.id),
                expected_return_date: ActiveValue::Set(new_expected_return_date),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Transaction::try_from(updated)
        })
    }
}

fn require_status(
    model: &transactions::Model,
    allowed: &[TransactionStatus],
    event: &str,
) -> ResultEngine<()> {
    let status = TransactionStatus::try_from(model.status.as_str())?;
    if !allowed.contains(&status) {
        return Err(EngineError::InvalidStateTransition(format!(
            "cannot {event} transaction {} in status {}",
            model.tx_number,
            status.as_str()
        )));
    }
    Ok(())
}

fn parse_item_id(model: &transactions::Model) -> ResultEngine<Uuid> {
    Uuid::parse_str(&model.item_id)
        .map_err(|_| EngineError::KeyNotFound("item not exists".to_string()))
}
