use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::middleware::{AdminUser, CurrentUser};
use crate::types::sales::{NewSale, Sale, SalesFilter};
use crate::{HubError, router::HubState};

pub async fn record_sale(
    State(state): State<HubState>,
    CurrentUser(user): CurrentUser,
    Json(sale): Json<NewSale>,
) -> Result<(StatusCode, Json<Sale>), HubError> {
    let recorded = state.sales.record(sale, Some(&user)).await?;
    state.dashboard.invalidate();
    Ok((StatusCode::CREATED, Json(recorded)))
}

pub async fn list_sales(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Query(filter): Query<SalesFilter>,
) -> Result<Json<Vec<Sale>>, HubError> {
    Ok(Json(state.sales.list(&filter).await?))
}

pub async fn get_sale(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Sale>, HubError> {
    Ok(Json(state.sales.get(&id).await?))
}

pub async fn delete_sale(
    State(state): State<HubState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, HubError> {
    state.sales.delete(&id).await?;
    state
        .audit
        .log(&admin, "delete", crate::db::tables::SALES, Some(&id), None)
        .await;
    state.dashboard.invalidate();
    Ok(StatusCode::NO_CONTENT)
}
