use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::middleware::{AdminUser, CurrentUser};
use crate::types::inventory::{
    Category, InventoryItem, ItemListQuery, ItemPatch, LowStockItem, NewItem,
};
use crate::{HubError, router::HubState};

pub async fn list_items(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path(category): Path<String>,
    Query(params): Query<ItemListQuery>,
) -> Result<Json<Vec<InventoryItem>>, HubError> {
    let category: Category = category.parse()?;
    Ok(Json(state.inventory.list(category, &params).await?))
}

pub async fn get_item(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path((category, id)): Path<(String, String)>,
) -> Result<Json<InventoryItem>, HubError> {
    let category: Category = category.parse()?;
    Ok(Json(state.inventory.get(category, &id).await?))
}

pub async fn create_item(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path(category): Path<String>,
    Json(item): Json<NewItem>,
) -> Result<(StatusCode, Json<InventoryItem>), HubError> {
    let category: Category = category.parse()?;
    let created = state.inventory.create(category, item).await?;
    state.dashboard.invalidate();
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_item(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path((category, id)): Path<(String, String)>,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<InventoryItem>, HubError> {
    let category: Category = category.parse()?;
    let updated = state.inventory.update(category, &id, patch).await?;
    state.dashboard.invalidate();
    Ok(Json(updated))
}

pub async fn delete_item(
    State(state): State<HubState>,
    AdminUser(admin): AdminUser,
    Path((category, id)): Path<(String, String)>,
) -> Result<StatusCode, HubError> {
    let category: Category = category.parse()?;
    state.inventory.delete(category, &id).await?;
    state
        .audit
        .log(&admin, "delete", category.table(), Some(&id), None)
        .await;
    state.dashboard.invalidate();
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/inventory/low-stock -> low-stock items across every category.
pub async fn low_stock(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<Vec<LowStockItem>>, HubError> {
    Ok(Json(state.inventory.low_stock().await?))
}
