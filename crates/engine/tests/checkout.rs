use chrono::{TimeDelta, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use std::sync::Arc;
use uuid::Uuid;

use engine::{
    BulkCheckoutCmd, CheckoutCmd, CheckoutLine, Engine, EngineError, NewItemCmd,
    TransactionListFilter, TransactionStatus,
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
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, DatabaseConnection) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    // One pooled connection so concurrent tasks contend on the same store.
    let mut options = sea_orm::ConnectOptions::new(url);
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_user(&db, "alice", "user", true, false, false).await;
    seed_user(&db, "bob", "user", true, false, false).await;
    seed_user(&db, "meg", "manager", true, true, true).await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn new_item(engine: &Engine, name: &str, total: i64, requires_approval: bool) -> Uuid {
    engine
        .new_item(
            NewItemCmd::new("meg", name, total)
                .category("tools")
                .requires_approval(requires_approval),
        )
        .await
        .unwrap()
        .id
}

fn checkout_cmd(item_id: Uuid, user: &str, quantity: i64) -> CheckoutCmd {
    let now = Utc::now();
    CheckoutCmd::new(item_id, user, quantity, now, now + TimeDelta::days(7))
        .purpose("field day")
        .destination("north hall")
}

#[tokio::test]
async fn checkout_approve_return_flow() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Projector", 5, true).await;

    let tx = engine
        .checkout(checkout_cmd(item_id, "alice", 3))
        .await
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.quantity, 3);
    assert_eq!(engine.item(item_id).await.unwrap().available_quantity, 2);

    let approved = engine.approve(tx.id, "meg", Some("ok for the event")).await.unwrap();
    assert_eq!(approved.status, TransactionStatus::Active);
    assert_eq!(approved.approved_by.as_deref(), Some("meg"));
    // Approval does not touch the reservation made at creation time.
    assert_eq!(engine.item(item_id).await.unwrap().available_quantity, 2);

    let returned = engine
        .return_item(tx.id, "alice", Utc::now())
        .await
        .unwrap();
    assert_eq!(returned.status, TransactionStatus::Returned);
    assert!(returned.actual_return_date.is_some());
    assert_eq!(engine.item(item_id).await.unwrap().available_quantity, 5);
}

#[tokio::test]
async fn reject_releases_reservation() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Projector", 5, true).await;

    let tx = engine
        .checkout(checkout_cmd(item_id, "alice", 3))
        .await
        .unwrap();
    assert_eq!(engine.item(item_id).await.unwrap().available_quantity, 2);

    let rejected = engine.reject(tx.id, "meg", Some("already booked")).await.unwrap();
    assert_eq!(rejected.status, TransactionStatus::Rejected);
    assert_eq!(engine.item(item_id).await.unwrap().available_quantity, 5);
}

#[tokio::test]
async fn checkout_without_approval_goes_active() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Extension cord", 10, false).await;

    let tx = engine
        .checkout(checkout_cmd(item_id, "alice", 2))
        .await
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Active);
    assert_eq!(engine.item(item_id).await.unwrap().available_quantity, 8);
}

#[tokio::test]
async fn insufficient_quantity_fails_without_mutation() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Projector", 5, true).await;

    let err = engine
        .checkout(checkout_cmd(item_id, "alice", 6))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientQuantity {
            requested: 6,
            available: 5
        }
    );

    assert_eq!(engine.item(item_id).await.unwrap().available_quantity, 5);
    let txs = engine
        .list_transactions(&TransactionListFilter::default())
        .await
        .unwrap();
    assert!(txs.is_empty());
}

#[tokio::test]
async fn double_return_rejected() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Extension cord", 10, false).await;

    let tx = engine
        .checkout(checkout_cmd(item_id, "alice", 2))
        .await
        .unwrap();
    engine.return_item(tx.id, "alice", Utc::now()).await.unwrap();

    let err = engine
        .return_item(tx.id, "alice", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidStateTransition(_)));
    // The quantity was released exactly once.
    assert_eq!(engine.item(item_id).await.unwrap().available_quantity, 10);
}

#[tokio::test]
async fn cancel_only_by_requester() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Projector", 5, true).await;

    let tx = engine
        .checkout(checkout_cmd(item_id, "alice", 1))
        .await
        .unwrap();

    let err = engine.cancel(tx.id, "meg").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let cancelled = engine.cancel(tx.id, "alice").await.unwrap();
    assert_eq!(cancelled.status, TransactionStatus::Cancelled);
    assert_eq!(engine.item(item_id).await.unwrap().available_quantity, 5);
}

#[tokio::test]
async fn approve_requires_permission() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Projector", 5, true).await;

    let tx = engine
        .checkout(checkout_cmd(item_id, "alice", 1))
        .await
        .unwrap();

    let err = engine.approve(tx.id, "alice", None).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn self_approval_forbidden() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Projector", 5, true).await;

    // meg holds the approve permission but is also the requester.
    let tx = engine
        .checkout(checkout_cmd(item_id, "meg", 2))
        .await
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending);

    let err = engine.approve(tx.id, "meg", None).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    // Untouched: still pending, reservation still held.
    let tx = engine.transaction(tx.id).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(engine.item(item_id).await.unwrap().available_quantity, 3);
}

#[tokio::test]
async fn approve_non_pending_is_invalid_transition() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Extension cord", 10, false).await;

    let tx = engine
        .checkout(checkout_cmd(item_id, "alice", 1))
        .await
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Active);

    let err = engine.approve(tx.id, "meg", None).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn overdue_is_reported_by_query_without_mutation() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Extension cord", 10, false).await;

    let now = Utc::now();
    let cmd = CheckoutCmd::new(
        item_id,
        "alice",
        1,
        now - TimeDelta::days(10),
        now - TimeDelta::days(3),
    );
    let tx = engine.checkout(cmd).await.unwrap();

    let overdue = engine.list_overdue(now).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, tx.id);
    assert_eq!(overdue[0].status, TransactionStatus::Overdue);

    // Stored status stays active and still holds the reservation.
    assert_eq!(engine.item(item_id).await.unwrap().available_quantity, 9);

    // An overdue checkout can be returned directly.
    let returned = engine.return_item(tx.id, "alice", now).await.unwrap();
    assert_eq!(returned.status, TransactionStatus::Returned);
    assert_eq!(engine.item(item_id).await.unwrap().available_quantity, 10);
}

#[tokio::test]
async fn overdue_excluded_from_active_listing() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Extension cord", 10, false).await;

    let now = Utc::now();
    engine
        .checkout(CheckoutCmd::new(
            item_id,
            "alice",
            1,
            now - TimeDelta::days(10),
            now - TimeDelta::days(3),
        ))
        .await
        .unwrap();
    engine
        .checkout(CheckoutCmd::new(
            item_id,
            "alice",
            1,
            now,
            now + TimeDelta::days(7),
        ))
        .await
        .unwrap();

    let active = engine
        .list_transactions(&TransactionListFilter {
            status: Some(TransactionStatus::Active),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].status, TransactionStatus::Active);

    let overdue = engine
        .list_transactions(&TransactionListFilter {
            status: Some(TransactionStatus::Overdue),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].status, TransactionStatus::Overdue);
}

#[tokio::test]
async fn bulk_checkout_is_all_or_nothing() {
    let (engine, _db) = engine_with_db().await;
    let projector = new_item(&engine, "Projector", 5, false).await;
    let cord = new_item(&engine, "Extension cord", 2, false).await;

    let now = Utc::now();
    let err = engine
        .bulk_checkout(BulkCheckoutCmd::new(
            "alice",
            vec![
                CheckoutLine {
                    item_id: projector,
                    quantity: 2,
                },
                CheckoutLine {
                    item_id: cord,
                    quantity: 3,
                },
            ],
            now,
            now + TimeDelta::days(7),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientQuantity {
            requested: 3,
            available: 2
        }
    );

    // Nothing was reserved or recorded for either item.
    assert_eq!(engine.item(projector).await.unwrap().available_quantity, 5);
    assert_eq!(engine.item(cord).await.unwrap().available_quantity, 2);
    let txs = engine
        .list_transactions(&TransactionListFilter::default())
        .await
        .unwrap();
    assert!(txs.is_empty());
}

#[tokio::test]
async fn bulk_checkout_creates_one_transaction_per_item() {
    let (engine, _db) = engine_with_db().await;
    let projector = new_item(&engine, "Projector", 5, false).await;
    let cord = new_item(&engine, "Extension cord", 2, false).await;

    let now = Utc::now();
    let txs = engine
        .bulk_checkout(
            BulkCheckoutCmd::new(
                "alice",
                vec![
                    CheckoutLine {
                        item_id: projector,
                        quantity: 2,
                    },
                    CheckoutLine {
                        item_id: cord,
                        quantity: 1,
                    },
                ],
                now,
                now + TimeDelta::days(7),
            )
            .purpose("field day"),
        )
        .await
        .unwrap();

    assert_eq!(txs.len(), 2);
    assert_eq!(engine.item(projector).await.unwrap().available_quantity, 3);
    assert_eq!(engine.item(cord).await.unwrap().available_quantity, 1);
    assert_ne!(txs[0].tx_number, txs[1].tx_number);
}

#[tokio::test]
async fn extend_moves_expected_return_date_forward_only() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Extension cord", 10, false).await;

    let now = Utc::now();
    let tx = engine
        .checkout(CheckoutCmd::new(
            item_id,
            "alice",
            1,
            now,
            now + TimeDelta::days(7),
        ))
        .await
        .unwrap();

    let err = engine
        .extend(tx.id, "alice", now + TimeDelta::days(3))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let extended = engine
        .extend(tx.id, "alice", now + TimeDelta::days(14))
        .await
        .unwrap();
    assert_eq!(extended.expected_return_date, now + TimeDelta::days(14));
}

#[tokio::test]
async fn tx_numbers_are_sequential_per_day() {
    let (engine, _db) = engine_with_db().await;
    let item_id = new_item(&engine, "Extension cord", 10, false).await;

    let now = Utc::now();
    let first = engine
        .checkout(CheckoutCmd::new(
            item_id,
            "alice",
            1,
            now,
            now + TimeDelta::days(7),
        ))
        .await
        .unwrap();
    let second = engine
        .checkout(CheckoutCmd::new(
            item_id,
            "alice",
            1,
            now,
            now + TimeDelta::days(7),
        ))
        .await
        .unwrap();

    let prefix = format!("CO-{}-", now.format("%Y%m%d"));
    assert_eq!(first.tx_number, format!("{prefix}0001"));
    assert_eq!(second.tx_number, format!("{prefix}0002"));
}

#[tokio::test]
async fn concurrent_checkouts_of_last_unit_admit_exactly_one() {
    let (engine, _db) = engine_with_file_db().await;
    let item_id = new_item(&engine, "Generator", 1, false).await;

    let engine = Arc::new(engine);
    let now = Utc::now();

    let task = |user: &'static str| {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine
                .checkout(CheckoutCmd::new(
                    item_id,
                    user,
                    1,
                    now,
                    now + TimeDelta::days(7),
                ))
                .await
        })
    };

    let (first, second) = tokio::join!(task("alice"), task("bob"));
    let results = [first.unwrap(), second.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let failure = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one request must fail");
    assert_eq!(
        *failure,
        EngineError::InsufficientQuantity {
            requested: 1,
            available: 0
        }
    );

    let item = engine.item(item_id).await.unwrap();
    assert_eq!(item.available_quantity, 0);
    assert_eq!(item.total_quantity, 1);
}
