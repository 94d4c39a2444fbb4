//! Items API endpoints

use api_types::item::{
    ItemListResponse, ItemNew, ItemStatus as ApiStatus, ItemStatusUpdate, ItemUpdate, ItemView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::{ItemStatus, NewItemCmd, UpdateItemCmd};

fn map_status(status: ItemStatus) -> ApiStatus {
    match status {
        ItemStatus::Active => ApiStatus::Active,
        ItemStatus::Inactive => ApiStatus::Inactive,
        ItemStatus::Maintenance => ApiStatus::Maintenance,
        ItemStatus::Retired => ApiStatus::Retired,
    }
}

fn map_status_update(status: ApiStatus) -> ItemStatus {
    match status {
        ApiStatus::Active => ItemStatus::Active,
        ApiStatus::Inactive => ItemStatus::Inactive,
        ApiStatus::Maintenance => ItemStatus::Maintenance,
        ApiStatus::Retired => ItemStatus::Retired,
    }
}

fn view(item: engine::Item) -> ItemView {
    ItemView {
        id: item.id,
        name: item.name,
        category: item.category,
        total_quantity: item.total_quantity,
        available_quantity: item.available_quantity,
        is_checkoutable: item.is_checkoutable,
        requires_approval: item.requires_approval,
        status: map_status(item.status),
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ItemNew>,
) -> Result<(StatusCode, Json<ItemView>), ServerError> {
    let mut cmd = NewItemCmd::new(user.username, payload.name, payload.total_quantity);
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(is_checkoutable) = payload.is_checkoutable {
        cmd = cmd.is_checkoutable(is_checkoutable);
    }
    if let Some(requires_approval) = payload.requires_approval {
        cmd = cmd.requires_approval(requires_approval);
    }

    let item = state.engine.new_item(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(item))))
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ItemListResponse>, ServerError> {
    let items = state.engine.list_items().await?;
    Ok(Json(ItemListResponse {
        items: items.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state.engine.item(id).await?;
    Ok(Json(view(item)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ItemUpdate>,
) -> Result<Json<ItemView>, ServerError> {
    let mut cmd = UpdateItemCmd::new(id, user.username);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(total_quantity) = payload.total_quantity {
        cmd = cmd.total_quantity(total_quantity);
    }
    if let Some(is_checkoutable) = payload.is_checkoutable {
        cmd = cmd.is_checkoutable(is_checkoutable);
    }
    if let Some(requires_approval) = payload.requires_approval {
        cmd = cmd.requires_approval(requires_approval);
    }

    let item = state.engine.update_item(cmd).await?;
    Ok(Json(view(item)))
}

pub async fn set_status(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ItemStatusUpdate>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state
        .engine
        .set_item_status(id, map_status_update(payload.status), &user.username)
        .await?;
    Ok(Json(view(item)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_item(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
