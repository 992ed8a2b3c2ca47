use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::middleware::CurrentUser;
use crate::types::dashboard::{DashboardStats, ItemRevenue, RevenueReport};
use crate::{HubError, router::HubState};

/// GET /api/dashboard -> cached stats from the dashboard actor.
pub async fn dashboard(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<DashboardStats>, HubError> {
    Ok(Json(state.dashboard.get_stats().await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub async fn revenue_report(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Query(range): Query<ReportRange>,
) -> Result<Json<RevenueReport>, HubError> {
    Ok(Json(state.analytics.report(range.from, range.to).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct TopItemsQuery {
    pub limit: Option<usize>,
}

pub async fn top_items(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Query(q): Query<TopItemsQuery>,
) -> Result<Json<Vec<ItemRevenue>>, HubError> {
    Ok(Json(state.analytics.top_items(q.limit).await?))
}
