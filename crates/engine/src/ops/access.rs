use sea_orm::{ConnectionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Permission, ResultEngine, items, transactions, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(super) async fn require_user_with<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
        permission: Permission,
    ) -> ResultEngine<users::Model> {
        let user = self.require_user(db, user_id).await?;
        if !user.grants(permission) {
            return Err(EngineError::Forbidden(format!(
                "user {user_id} lacks the {} permission",
                permission.as_str()
            )));
        }
        Ok(user)
    }

    pub(super) async fn require_item<C: ConnectionTrait>(
        &self,
        db: &C,
        item_id: Uuid,
    ) -> ResultEngine<items::Model> {
        items::Entity::find_by_id(item_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))
    }

    pub(super) async fn require_transaction<C: ConnectionTrait>(
        &self,
        db: &C,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
    }
}
