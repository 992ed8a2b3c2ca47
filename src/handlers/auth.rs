use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

use crate::middleware::{AdminUser, BearerToken, CurrentUser};
use crate::types::profile::{AuthSession, Profile, SignInRequest, SignUpRequest};
use crate::{HubError, router::HubState};

pub async fn sign_up(
    State(state): State<HubState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthSession>), HubError> {
    let session = state.auth.sign_up(req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn sign_in(
    State(state): State<HubState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<AuthSession>, HubError> {
    Ok(Json(state.auth.sign_in(req).await?))
}

pub async fn sign_out(
    State(state): State<HubState>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, HubError> {
    state.auth.sign_out(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn refresh(
    State(state): State<HubState>,
    BearerToken(token): BearerToken,
) -> Result<Json<AuthSession>, HubError> {
    Ok(Json(state.auth.refresh(&token).await?))
}

/// GET /api/auth/session -> profile behind the current token.
pub async fn session(CurrentUser(user): CurrentUser) -> Json<Profile> {
    Json(user)
}

/// GET /api/auth/events -> auth state changes as server-sent events.
pub async fn events(
    State(state): State<HubState>,
    AdminUser(_): AdminUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.auth.subscribe()).filter_map(|msg| {
        let event = match msg {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "auth event subscriber lagged");
                return None;
            }
        };
        match Event::default().event("auth").json_data(&event) {
            Ok(sse) => Some(Ok(sse)),
            Err(e) => {
                warn!(error = %e, "failed to encode auth event");
                None
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
