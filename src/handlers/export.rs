use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::middleware::CurrentUser;
use crate::{HubError, router::HubState};

/// GET /api/export/{table} -> `text/csv` attachment. Admin-only tables answer 403 to users.
pub async fn export_csv(
    State(state): State<HubState>,
    CurrentUser(user): CurrentUser,
    Path(table): Path<String>,
) -> Result<Response, HubError> {
    let body = state.export.table_csv(&user, &table).await?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{table}.csv\""),
        ),
    ];
    Ok((headers, body).into_response())
}
