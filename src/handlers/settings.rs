use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::middleware::{AdminUser, CurrentUser};
use crate::types::setting::{Setting, SettingValue};
use crate::{HubError, router::HubState};

pub async fn list_settings(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<Vec<Setting>>, HubError> {
    Ok(Json(state.settings.list().await?))
}

pub async fn get_setting(
    State(state): State<HubState>,
    CurrentUser(_): CurrentUser,
    Path(key): Path<String>,
) -> Result<Json<Setting>, HubError> {
    Ok(Json(state.settings.get(&key).await?))
}

pub async fn put_setting(
    State(state): State<HubState>,
    AdminUser(admin): AdminUser,
    Path(key): Path<String>,
    Json(body): Json<SettingValue>,
) -> Result<Json<Setting>, HubError> {
    let setting = state.settings.put(&key, body.value).await?;
    state
        .audit
        .log(&admin, "put", crate::db::tables::SETTINGS, Some(&key), None)
        .await;
    Ok(Json(setting))
}

pub async fn delete_setting(
    State(state): State<HubState>,
    AdminUser(admin): AdminUser,
    Path(key): Path<String>,
) -> Result<StatusCode, HubError> {
    state.settings.delete(&key).await?;
    state
        .audit
        .log(&admin, "delete", crate::db::tables::SETTINGS, Some(&key), None)
        .await;
    Ok(StatusCode::NO_CONTENT)
}
