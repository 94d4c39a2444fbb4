//! Item management operations.
//!
//! All of these require the manage-items permission. `available_quantity` is
//! never written directly here except when re-deriving it from a changed
//! `total_quantity`, which keeps the open reservations intact.

use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Item, ItemStatus, NewItemCmd, Permission, ResultEngine, TransactionStatus,
    UpdateItemCmd, items, transactions,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Create a new item. Its full quantity starts available.
    pub async fn new_item(&self, cmd: NewItemCmd) -> ResultEngine<Item> {
        with_tx!(self, |db_tx| {
            self.require_user_with(&db_tx, &cmd.user_id, Permission::ManageItems)
                .await?;
            let name = normalize_required_name(&cmd.name, "item")?;
            let existing = items::Entity::find()
                .filter(items::Column::Name.eq(name.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(name));
            }

            let item = Item::new(
                name,
                normalize_optional_text(cmd.category.as_deref()),
                cmd.total_quantity,
                cmd.is_checkoutable,
                cmd.requires_approval,
                cmd.user_id.clone(),
                chrono::Utc::now(),
            )?;
            items::ActiveModel::from(&item).insert(&db_tx).await?;
            Ok(item)
        })
    }

    /// Update item fields. A `total_quantity` change re-derives
    /// `available_quantity` so open reservations stay accounted for.
    pub async fn update_item(&self, cmd: UpdateItemCmd) -> ResultEngine<Item> {
        with_tx!(self, |db_tx| {
            self.require_user_with(&db_tx, &cmd.user_id, Permission::ManageItems)
                .await?;
            let model = self.require_item(&db_tx, cmd.item_id).await?;

            // sea-orm rejects an update that sets only the primary key.
            if cmd.name.is_none()
                && cmd.category.is_none()
                && cmd.total_quantity.is_none()
                && cmd.is_checkoutable.is_none()
                && cmd.requires_approval.is_none()
            {
                return Item::try_from(model);
            }

            let mut active = items::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                ..Default::default()
            };
            if let Some(name) = cmd.name.as_deref() {
                active.name = ActiveValue::Set(normalize_required_name(name, "item")?);
            }
            if let Some(category) = cmd.category.as_deref() {
                active.category = ActiveValue::Set(normalize_optional_text(Some(category)));
            }
            if let Some(is_checkoutable) = cmd.is_checkoutable {
                active.is_checkoutable = ActiveValue::Set(is_checkoutable);
            }
            if let Some(requires_approval) = cmd.requires_approval {
                active.requires_approval = ActiveValue::Set(requires_approval);
            }
            if let Some(new_total) = cmd.total_quantity {
                if new_total < 0 {
                    return Err(EngineError::Validation(
                        "total_quantity must be >= 0".to_string(),
                    ));
                }
                let reserved = model.total_quantity - model.available_quantity;
                if new_total < reserved {
                    return Err(EngineError::Validation(format!(
                        "total_quantity {new_total} is below the {reserved} currently reserved"
                    )));
                }
                active.total_quantity = ActiveValue::Set(new_total);
                active.available_quantity = ActiveValue::Set(new_total - reserved);
            }

            let updated = active.update(&db_tx).await?;
            Item::try_from(updated)
        })
    }

    /// Change the item lifecycle status (active/inactive/maintenance/retired).
    pub async fn set_item_status(
        &self,
        item_id: Uuid,
        status: ItemStatus,
        user_id: &str,
    ) -> ResultEngine<Item> {
        with_tx!(self, |db_tx| {
            self.require_user_with(&db_tx, user_id, Permission::ManageItems)
                .await?;
            let model = self.require_item(&db_tx, item_id).await?;
            let updated = items::ActiveModel {
                id: ActiveValue::Set(model.id),
                status: ActiveValue::Set(status.as_str().to_string()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Item::try_from(updated)
        })
    }

    /// Delete an item. Refused while open transactions still reference it.
    /// Terminal transaction history is kept and survives the deletion, which
    /// is why `transactions.item_id` carries no foreign key.
    pub async fn delete_item(&self, item_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user_with(&db_tx, user_id, Permission::ManageItems)
                .await?;
            let model = self.require_item(&db_tx, item_id).await?;

            let open = transactions::Entity::find()
                .filter(transactions::Column::ItemId.eq(model.id.clone()))
                .filter(transactions::Column::Status.is_in([
                    TransactionStatus::Pending.as_str(),
                    TransactionStatus::Active.as_str(),
                ]))
                .count(&db_tx)
                .await?;
            if open > 0 {
                return Err(EngineError::Validation(format!(
                    "item \"{}\" has {open} open transactions",
                    model.name
                )));
            }

            items::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Return a single item with its current availability.
    pub async fn item(&self, item_id: Uuid) -> ResultEngine<Item> {
        let model = self.require_item(&self.database, item_id).await?;
        Item::try_from(model)
    }

    /// List items ordered by name.
    pub async fn list_items(&self) -> ResultEngine<Vec<Item>> {
        let models = items::Entity::find()
            .order_by_asc(items::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Item::try_from).collect()
    }
}
