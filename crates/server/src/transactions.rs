//! Transactions API endpoints

use api_types::transaction::{
    ApprovalDecision, BulkCheckoutNew, BulkCheckoutResponse, CheckoutNew, ExtendNew, ReturnNew,
    TransactionKind as ApiKind, TransactionList, TransactionListResponse,
    TransactionStatus as ApiStatus, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::{BulkCheckoutCmd, CheckoutCmd, CheckoutLine, TransactionListFilter};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Checkout => ApiKind::Checkout,
        engine::TransactionKind::Return => ApiKind::Return,
        engine::TransactionKind::Reserve => ApiKind::Reserve,
    }
}

fn map_kind_filter(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Checkout => engine::TransactionKind::Checkout,
        ApiKind::Return => engine::TransactionKind::Return,
        ApiKind::Reserve => engine::TransactionKind::Reserve,
    }
}

fn map_status(status: engine::TransactionStatus) -> ApiStatus {
    match status {
        engine::TransactionStatus::Pending => ApiStatus::Pending,
        engine::TransactionStatus::Active => ApiStatus::Active,
        engine::TransactionStatus::Overdue => ApiStatus::Overdue,
        engine::TransactionStatus::Returned => ApiStatus::Returned,
        engine::TransactionStatus::Cancelled => ApiStatus::Cancelled,
        engine::TransactionStatus::Rejected => ApiStatus::Rejected,
    }
}

fn map_status_filter(status: ApiStatus) -> engine::TransactionStatus {
    match status {
        ApiStatus::Pending => engine::TransactionStatus::Pending,
        ApiStatus::Active => engine::TransactionStatus::Active,
        ApiStatus::Overdue => engine::TransactionStatus::Overdue,
        ApiStatus::Returned => engine::TransactionStatus::Returned,
        ApiStatus::Cancelled => engine::TransactionStatus::Cancelled,
        ApiStatus::Rejected => engine::TransactionStatus::Rejected,
    }
}

fn view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        tx_number: tx.tx_number,
        item_id: tx.item_id,
        user_id: tx.user_id,
        kind: map_kind(tx.kind),
        status: map_status(tx.status),
        quantity: tx.quantity,
        checkout_date: tx.checkout_date,
        expected_return_date: tx.expected_return_date,
        actual_return_date: tx.actual_return_date,
        purpose: tx.purpose,
        destination: tx.destination,
        notes: tx.notes,
        approved_by: tx.approved_by,
        approval_notes: tx.approval_notes,
        approved_at: tx.approved_at,
    }
}

pub async fn checkout(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CheckoutNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = CheckoutCmd::new(
        payload.item_id,
        user.username,
        payload.quantity,
        payload.checkout_date.unwrap_or_else(Utc::now),
        payload.expected_return_date,
    );
    if let Some(purpose) = payload.purpose {
        cmd = cmd.purpose(purpose);
    }
    if let Some(destination) = payload.destination {
        cmd = cmd.destination(destination);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let tx = state.engine.checkout(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn bulk_checkout(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BulkCheckoutNew>,
) -> Result<(StatusCode, Json<BulkCheckoutResponse>), ServerError> {
    let lines = payload
        .lines
        .into_iter()
        .map(|line| CheckoutLine {
            item_id: line.item_id,
            quantity: line.quantity,
        })
        .collect();
    let mut cmd = BulkCheckoutCmd::new(
        user.username,
        lines,
        payload.checkout_date.unwrap_or_else(Utc::now),
        payload.expected_return_date,
    );
    if let Some(purpose) = payload.purpose {
        cmd = cmd.purpose(purpose);
    }
    if let Some(destination) = payload.destination {
        cmd = cmd.destination(destination);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let txs = state.engine.bulk_checkout(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(BulkCheckoutResponse {
            transactions: txs.into_iter().map(view).collect(),
        }),
    ))
}

pub async fn approve(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ApprovalDecision>>,
) -> Result<Json<TransactionView>, ServerError> {
    let notes = payload.and_then(|Json(p)| p.notes);
    let tx = state
        .engine
        .approve(id, &user.username, notes.as_deref())
        .await?;
    Ok(Json(view(tx)))
}

pub async fn reject(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ApprovalDecision>>,
) -> Result<Json<TransactionView>, ServerError> {
    let notes = payload.and_then(|Json(p)| p.notes);
    let tx = state
        .engine
        .reject(id, &user.username, notes.as_deref())
        .await?;
    Ok(Json(view(tx)))
}

pub async fn cancel(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.cancel(id, &user.username).await?;
    Ok(Json(view(tx)))
}

pub async fn return_item(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ReturnNew>>,
) -> Result<Json<TransactionView>, ServerError> {
    let returned_at = payload
        .and_then(|Json(p)| p.returned_at)
        .unwrap_or_else(Utc::now);
    let tx = state
        .engine
        .return_item(id, &user.username, returned_at)
        .await?;
    Ok(Json(view(tx)))
}

pub async fn extend(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExtendNew>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .extend(id, &user.username, payload.expected_return_date)
        .await?;
    Ok(Json(view(tx)))
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(payload): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = TransactionListFilter {
        status: payload.status.map(map_status_filter),
        kind: payload.kind.map(map_kind_filter),
        item_id: payload.item_id,
        user_id: payload.user_id,
        limit: payload.limit,
    };

    let txs = state.engine.list_transactions(&filter).await?;
    Ok(Json(TransactionListResponse {
        transactions: txs.into_iter().map(view).collect(),
    }))
}

pub async fn list_overdue(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let txs = state.engine.list_overdue(Utc::now()).await?;
    Ok(Json(TransactionListResponse {
        transactions: txs.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id).await?;
    Ok(Json(view(tx)))
}
