use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::middleware::AdminUser;
use crate::types::backup::{BackupDocument, BackupHistoryEntry, RestoreSummary};
use crate::{HubError, router::HubState};

/// GET /api/backup -> JSON backup document as a download.
pub async fn export_backup(
    State(state): State<HubState>,
    AdminUser(admin): AdminUser,
) -> Result<Response, HubError> {
    let doc = state.backup.export(&admin).await?;
    let filename = format!(
        "attachment; filename=\"point-art-hub-backup-{}.json\"",
        doc.metadata.created_at.format("%Y%m%d-%H%M%S")
    );
    Ok(([(header::CONTENT_DISPOSITION, filename)], Json(doc)).into_response())
}

pub async fn restore_backup(
    State(state): State<HubState>,
    AdminUser(admin): AdminUser,
    Json(doc): Json<BackupDocument>,
) -> Result<Json<RestoreSummary>, HubError> {
    let summary = state.backup.restore(&admin, doc).await?;
    state.dashboard.invalidate();
    Ok(Json(summary))
}

pub async fn backup_history(
    State(state): State<HubState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<BackupHistoryEntry>>, HubError> {
    Ok(Json(state.backup.history().await?))
}
