use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::db::tables::CUSTOMERS;
use crate::middleware::{AdminUser, CurrentUser};
use crate::types::customer::{Customer, CustomerPatch, NewCustomer};
use crate::{HubError, router::HubState};

#[derive(Debug, Default, Deserialize)]
pub struct CustomerSearch {
    pub search: Option<String>,
}

pub async fn list_customers(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Query(q): Query<CustomerSearch>,
) -> Result<Json<Vec<Customer>>, HubError> {
    Ok(Json(state.customers.list(q.search.as_deref()).await?))
}

pub async fn get_customer(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Customer>, HubError> {
    Ok(Json(state.customers.get(&id).await?))
}

pub async fn create_customer(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Json(customer): Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), HubError> {
    let created = state.customers.create(customer).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_customer(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<CustomerPatch>,
) -> Result<Json<Customer>, HubError> {
    Ok(Json(state.customers.update(&id, patch).await?))
}

pub async fn delete_customer(
    State(state): State<HubState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, HubError> {
    state.customers.delete(&id).await?;
    state
        .audit
        .log(&admin, "delete", CUSTOMERS, Some(&id), None)
        .await;
    Ok(StatusCode::NO_CONTENT)
}
