use chrono::{TimeDelta, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CheckoutCmd, Engine, EngineError, ItemStatus, NewItemCmd, TransactionStatus, UpdateItemCmd,
};
use migration::MigratorTrait;

async fn seed_user(
    db: &DatabaseConnection,
    username: &str,
    role: &str,
    can_checkout: bool,
    can_approve: bool,
    can_manage_items: bool,
) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, role, team, can_checkout, can_approve, can_manage_items) \
         VALUES (?, ?, ?, NULL, ?, ?, ?)",
        vec![
            username.into(),
            "password".into(),
            role.into(),
            can_checkout.into(),
            can_approve.into(),
            can_manage_items.into(),
        ],
    ))
    .await
    .unwrap();
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_user(&db, "alice", "user", true, false, false).await;
    seed_user(&db, "meg", "manager", true, true, true).await;
    seed_user(&db, "root", "admin", false, false, false).await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

#[tokio::test]
async fn new_item_starts_fully_available() {
    let (engine, _db) = engine_with_db().await;

    let item = engine
        .new_item(NewItemCmd::new("meg", "Projector", 5).category("av"))
        .await
        .unwrap();
    assert_eq!(item.total_quantity, 5);
    assert_eq!(item.available_quantity, 5);
    assert_eq!(item.status, ItemStatus::Active);
    assert_eq!(item.category.as_deref(), Some("av"));
    assert!(item.is_checkoutable);
    assert!(!item.requires_approval);
}

#[tokio::test]
async fn new_item_requires_manage_permission() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .new_item(NewItemCmd::new("alice", "Projector", 5))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn admin_role_grants_all_permissions() {
    let (engine, _db) = engine_with_db().await;

    // "root" has every flag off but its role covers item management.
    engine
        .new_item(NewItemCmd::new("root", "Projector", 5))
        .await
        .unwrap();
}

#[tokio::test]
async fn duplicate_item_name_rejected() {
    let (engine, _db) = engine_with_db().await;

    engine
        .new_item(NewItemCmd::new("meg", "Projector", 5))
        .await
        .unwrap();
    let err = engine
        .new_item(NewItemCmd::new("meg", " Projector ", 2))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Projector".to_string()));
}

#[tokio::test]
async fn negative_total_quantity_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .new_item(NewItemCmd::new("meg", "Projector", -1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn update_total_preserves_reservations() {
    let (engine, _db) = engine_with_db().await;
    let item = engine
        .new_item(NewItemCmd::new("meg", "Projector", 5))
        .await
        .unwrap();

    let now = Utc::now();
    engine
        .checkout(CheckoutCmd::new(
            item.id,
            "alice",
            3,
            now,
            now + TimeDelta::days(7),
        ))
        .await
        .unwrap();

    // 3 reserved; raising total to 10 leaves 7 available.
    let updated = engine
        .update_item(UpdateItemCmd::new(item.id, "meg").total_quantity(10))
        .await
        .unwrap();
    assert_eq!(updated.total_quantity, 10);
    assert_eq!(updated.available_quantity, 7);

    // Shrinking below the reserved amount is refused.
    let err = engine
        .update_item(UpdateItemCmd::new(item.id, "meg").total_quantity(2))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Shrinking to exactly the reserved amount leaves nothing available.
    let updated = engine
        .update_item(UpdateItemCmd::new(item.id, "meg").total_quantity(3))
        .await
        .unwrap();
    assert_eq!(updated.available_quantity, 0);
}

#[tokio::test]
async fn checkout_refused_for_non_active_item() {
    let (engine, _db) = engine_with_db().await;
    let item = engine
        .new_item(NewItemCmd::new("meg", "Projector", 5))
        .await
        .unwrap();

    engine
        .set_item_status(item.id, ItemStatus::Maintenance, "meg")
        .await
        .unwrap();

    let now = Utc::now();
    let err = engine
        .checkout(CheckoutCmd::new(
            item.id,
            "alice",
            1,
            now,
            now + TimeDelta::days(7),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn checkout_refused_for_non_checkoutable_item() {
    let (engine, _db) = engine_with_db().await;
    let item = engine
        .new_item(NewItemCmd::new("meg", "Server rack", 2).is_checkoutable(false))
        .await
        .unwrap();

    let now = Utc::now();
    let err = engine
        .checkout(CheckoutCmd::new(
            item.id,
            "alice",
            1,
            now,
            now + TimeDelta::days(7),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn delete_refused_with_open_transactions() {
    let (engine, _db) = engine_with_db().await;
    let item = engine
        .new_item(NewItemCmd::new("meg", "Projector", 5))
        .await
        .unwrap();

    let now = Utc::now();
    let tx = engine
        .checkout(CheckoutCmd::new(
            item.id,
            "alice",
            1,
            now,
            now + TimeDelta::days(7),
        ))
        .await
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Active);

    let err = engine.delete_item(item.id, "meg").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    engine.return_item(tx.id, "alice", now).await.unwrap();
    engine.delete_item(item.id, "meg").await.unwrap();

    let err = engine.item(item.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    // Terminal transaction history survives the item deletion.
    let history = engine.transaction(tx.id).await.unwrap();
    assert_eq!(history.status, TransactionStatus::Returned);
}

#[tokio::test]
async fn empty_update_is_a_no_op() {
    let (engine, _db) = engine_with_db().await;
    let item = engine
        .new_item(NewItemCmd::new("meg", "Projector", 5).category("av"))
        .await
        .unwrap();

    let updated = engine
        .update_item(UpdateItemCmd::new(item.id, "meg"))
        .await
        .unwrap();
    assert_eq!(updated.id, item.id);
    assert_eq!(updated.name, item.name);
    assert_eq!(updated.category, item.category);
    assert_eq!(updated.total_quantity, 5);
    assert_eq!(updated.available_quantity, 5);
}

#[tokio::test]
async fn list_items_ordered_by_name() {
    let (engine, _db) = engine_with_db().await;
    engine
        .new_item(NewItemCmd::new("meg", "Whiteboard", 3))
        .await
        .unwrap();
    engine
        .new_item(NewItemCmd::new("meg", "Camera", 2))
        .await
        .unwrap();

    let items = engine.list_items().await.unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Camera", "Whiteboard"]);
}

#[tokio::test]
async fn unknown_user_is_key_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .new_item(NewItemCmd::new("nobody", "Projector", 5))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
