use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::middleware::AdminUser;
use crate::types::audit::AuditEntry;
use crate::types::profile::{Profile, RoleUpdate};
use crate::{HubError, router::HubState};

pub async fn list_profiles(
    State(state): State<HubState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<Profile>>, HubError> {
    Ok(Json(state.admin.list_profiles().await?))
}

pub async fn set_role(
    State(state): State<HubState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
    Json(update): Json<RoleUpdate>,
) -> Result<Json<Profile>, HubError> {
    Ok(Json(
        state.admin.set_role(&admin, &user_id, update.role).await?,
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
}

pub async fn audit_log(
    State(state): State<HubState>,
    AdminUser(_): AdminUser,
    Query(q): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, HubError> {
    Ok(Json(state.audit.list(q.limit).await?))
}
