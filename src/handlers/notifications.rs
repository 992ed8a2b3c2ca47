use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::middleware::{AdminUser, CurrentUser};
use crate::types::notification::{NewNotification, Notification};
use crate::{HubError, router::HubState};

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread: bool,
    pub limit: Option<usize>,
}

pub async fn list_notifications(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Query(q): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, HubError> {
    Ok(Json(state.notifications.list(q.unread, q.limit).await?))
}

pub async fn unread_count(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<Value>, HubError> {
    let unread = state.notifications.unread_count().await?;
    Ok(Json(json!({ "unread": unread })))
}

pub async fn create_notification(
    State(state): State<HubState>,
    AdminUser(_): AdminUser,
    Json(note): Json<NewNotification>,
) -> Result<(StatusCode, Json<Notification>), HubError> {
    let created = state.notifications.create(note).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn mark_read(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Notification>, HubError> {
    Ok(Json(state.notifications.mark_read(&id).await?))
}

pub async fn mark_all_read(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<Value>, HubError> {
    let updated = state.notifications.mark_all_read().await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn delete_notification(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, HubError> {
    state.notifications.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
