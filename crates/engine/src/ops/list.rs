//! Read-side queries over transactions.
//!
//! Overdue is a read-time property: the stored status stays `active` and the
//! sweep below is a pure filter, so reporting needs no extra mutation.

use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{ResultEngine, Transaction, TransactionKind, TransactionStatus, transactions};

use super::Engine;

const DEFAULT_LIST_LIMIT: u64 = 50;

/// Filter for transaction listings.
///
/// `status: Some(Overdue)` selects active transactions past their expected
/// return date; `Some(Active)` excludes them, keeping both views consistent
/// with the derived representation.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub status: Option<TransactionStatus>,
    pub kind: Option<TransactionKind>,
    pub item_id: Option<Uuid>,
    pub user_id: Option<String>,
    pub limit: Option<u64>,
}

impl Engine {
    /// Return a single transaction with its derived status.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let model = self
            .require_transaction(&self.database, transaction_id)
            .await?;
        let mut tx = Transaction::try_from(model)?;
        tx.status = tx.effective_status(Utc::now());
        Ok(tx)
    }

    /// List transactions, newest first.
    pub async fn list_transactions(
        &self,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        let now = Utc::now();
        let mut query = transactions::Entity::find()
            .order_by_desc(transactions::Column::CreatedAt)
            .limit(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT));

        match filter.status {
            Some(TransactionStatus::Overdue) => {
                query = query
                    .filter(
                        transactions::Column::Status.eq(TransactionStatus::Active.as_str()),
                    )
                    .filter(transactions::Column::ExpectedReturnDate.lt(now));
            }
            Some(TransactionStatus::Active) => {
                query = query
                    .filter(
                        transactions::Column::Status.eq(TransactionStatus::Active.as_str()),
                    )
                    .filter(transactions::Column::ExpectedReturnDate.gte(now));
            }
            Some(status) => {
                query = query.filter(transactions::Column::Status.eq(status.as_str()));
            }
            None => {}
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(item_id) = filter.item_id {
            query = query.filter(transactions::Column::ItemId.eq(item_id.to_string()));
        }
        if let Some(user_id) = filter.user_id.as_deref() {
            query = query.filter(transactions::Column::UserId.eq(user_id.to_string()));
        }

        let models = query.all(&self.database).await?;
        models
            .into_iter()
            .map(|model| {
                let mut tx = Transaction::try_from(model)?;
                tx.status = tx.effective_status(now);
                Ok(tx)
            })
            .collect()
    }

    /// The overdue sweep: active transactions past their expected return
    /// date as of `now`, oldest due date first.
    pub async fn list_overdue(&self, now: DateTime<Utc>) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::Status.eq(TransactionStatus::Active.as_str()))
            .filter(transactions::Column::ExpectedReturnDate.lt(now))
            .order_by_asc(transactions::Column::ExpectedReturnDate)
            .all(&self.database)
            .await?;

        models
            .into_iter()
            .map(|model| {
                let mut tx = Transaction::try_from(model)?;
                tx.status = TransactionStatus::Overdue;
                Ok(tx)
            })
            .collect()
    }
}
