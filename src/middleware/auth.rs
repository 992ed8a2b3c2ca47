use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::Authorization;
use headers::authorization::Bearer;

use crate::error::HubError;
use crate::router::HubState;
use crate::types::profile::Profile;

/// Raw bearer token from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = HubError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| HubError::Unauthorized("missing bearer token".into()))?;
        Ok(Self(bearer.token().to_string()))
    }
}

/// Signed-in user resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Profile);

impl FromRequestParts<HubState> for CurrentUser {
    type Rejection = HubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HubState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let profile = state.auth.authenticate(&token).await?;
        Ok(Self(profile))
    }
}

/// Like [`CurrentUser`] but rejects role `user` with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Profile);

impl FromRequestParts<HubState> for AdminUser {
    type Rejection = HubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HubState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(profile) = CurrentUser::from_request_parts(parts, state).await?;
        if !profile.is_admin() {
            return Err(HubError::Forbidden("admin role required".into()));
        }
        Ok(Self(profile))
    }
}
