use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::db::tables::INVOICES;
use crate::format::amount_to_words;
use crate::middleware::{AdminUser, CurrentUser};
use crate::types::invoice::{Invoice, InvoiceFilter, InvoiceStatus, NewInvoice};
use crate::{HubError, router::HubState};

pub async fn create_invoice(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Json(invoice): Json<NewInvoice>,
) -> Result<(StatusCode, Json<Invoice>), HubError> {
    let created = state.invoices.create(invoice).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_invoices(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Query(filter): Query<InvoiceFilter>,
) -> Result<Json<Vec<Invoice>>, HubError> {
    Ok(Json(state.invoices.list(&filter).await?))
}

pub async fn get_invoice(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, HubError> {
    Ok(Json(state.invoices.get(&id).await?))
}

pub async fn issue_invoice(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, HubError> {
    Ok(Json(
        state.invoices.set_status(&id, InvoiceStatus::Issued).await?,
    ))
}

pub async fn pay_invoice(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, HubError> {
    Ok(Json(
        state.invoices.set_status(&id, InvoiceStatus::Paid).await?,
    ))
}

pub async fn cancel_invoice(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, HubError> {
    Ok(Json(
        state
            .invoices
            .set_status(&id, InvoiceStatus::Cancelled)
            .await?,
    ))
}

pub async fn delete_invoice(
    State(state): State<HubState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, HubError> {
    state.invoices.delete(&id).await?;
    state
        .audit
        .log(&admin, "delete", INVOICES, Some(&id), None)
        .await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct WordsQuery {
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct WordsResponse {
    pub amount: f64,
    pub words: String,
}

/// GET /api/utils/amount-in-words?amount=150000
pub async fn amount_in_words(
    State(state): State<HubState>,
    Query(q): Query<WordsQuery>,
) -> Json<WordsResponse> {
    Json(WordsResponse {
        amount: q.amount,
        words: amount_to_words(q.amount, &state.currency),
    })
}
