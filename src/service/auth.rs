use crate::config::AuthConfig;
use crate::db::models::{from_record, new_id, timestamp, to_record};
use crate::db::tables::{AUTH_CREDENTIALS, PROFILES, SESSIONS};
use crate::db::{Query, SharedStore, StoreExt};
use crate::error::HubError;
use crate::types::profile::{
    AuthEvent, AuthSession, Profile, Role, SignInRequest, SignUpRequest,
};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use validator::Validate;

const TOKEN_BYTES: usize = 32;
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
struct StoredCredential {
    id: String,
    password_hash: String,
}

#[derive(Debug, Deserialize)]
struct StoredSession {
    id: String,
    user_id: String,
    expires_at: DateTime<Utc>,
}

/// Session auth: argon2 password hashes, opaque bearer tokens stored as digests.
#[derive(Clone)]
pub struct AuthService {
    store: SharedStore,
    cfg: AuthConfig,
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
    events: broadcast::Sender<AuthEvent>,
}

fn hash_password(password: &str) -> Result<String, HubError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool, HubError> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// URL-safe base64 of 32 random bytes.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Storage key of a token; the raw token is never persisted.
pub fn token_digest(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    pub fn new(store: SharedStore, cfg: AuthConfig) -> Self {
        let per_minute = NonZeroU32::new(cfg.sign_in_per_minute).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute)));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            cfg,
            limiter,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn publish(&self, event: AuthEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    pub async fn sign_up(&self, req: SignUpRequest) -> Result<AuthSession, HubError> {
        req.validate()?;
        if (req.password.chars().count() as u64) < self.cfg.min_password_len {
            return Err(HubError::Validation(format!(
                "password must be at least {} characters",
                self.cfg.min_password_len
            )));
        }
        let email = normalize_email(&req.email);
        if self.find_profile_by_email(&email).await?.is_some() {
            return Err(HubError::Conflict(format!("account `{email}` already exists")));
        }

        let role = if self.store.count(&Query::table(PROFILES).limit(1)).await? == 0 {
            Role::Admin
        } else {
            Role::User
        };
        let password = req.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| HubError::PasswordHash(format!("hashing task failed: {e}")))??;

        let user_id = new_id();
        let profile = json!({
            "id": user_id,
            "email": email,
            "full_name": req.full_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            "role": role,
        });
        let stored = self.store.insert(PROFILES, to_record(&profile)?).await?;
        let profile: Profile = from_record(stored)?;
        let credential = json!({
            "id": user_id,
            "email": email,
            "password_hash": password_hash,
        });
        self.store
            .insert(AUTH_CREDENTIALS, to_record(&credential)?)
            .await?;

        info!(user_id = %profile.id, role = ?profile.role, "account created");
        self.publish(AuthEvent::SignedUp {
            user_id: profile.id.clone(),
        });
        self.issue_session(profile).await
    }

    pub async fn sign_in(&self, req: SignInRequest) -> Result<AuthSession, HubError> {
        req.validate()?;
        let email = normalize_email(&req.email);
        if self.limiter.check_key(&email).is_err() {
            warn!(email = %email, "sign-in rate limit hit");
            return Err(HubError::RateLimited);
        }
        let invalid = || HubError::Unauthorized("invalid email or password".into());

        let credential: StoredCredential = self
            .store
            .fetch::<StoredCredential>(
                &Query::table(AUTH_CREDENTIALS)
                    .eq("email", email.as_str())
                    .limit(1),
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(invalid)?;
        let password = req.password;
        let hash = credential.password_hash;
        let ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| HubError::PasswordHash(format!("verify task failed: {e}")))??;
        if !ok {
            debug!(email = %email, "password mismatch");
            return Err(invalid());
        }

        let profile: Profile = self
            .store
            .fetch_by_id(PROFILES, &credential.id)
            .await?
            .ok_or_else(invalid)?;
        self.publish(AuthEvent::SignedIn {
            user_id: profile.id.clone(),
        });
        self.issue_session(profile).await
    }

    /// Resolve a bearer token to its profile. Expired sessions are removed.
    pub async fn authenticate(&self, token: &str) -> Result<Profile, HubError> {
        let session = self.session(token).await?;
        self.store
            .fetch_by_id(PROFILES, &session.user_id)
            .await?
            .ok_or_else(|| HubError::Unauthorized("account no longer exists".into()))
    }

    pub async fn sign_out(&self, token: &str) -> Result<(), HubError> {
        let session = self.session(token).await?;
        self.store.delete_by_id(SESSIONS, &session.id).await?;
        info!(user_id = %session.user_id, "signed out");
        self.publish(AuthEvent::SignedOut {
            user_id: session.user_id,
        });
        Ok(())
    }

    /// Swap a live token for a fresh one with a new expiry.
    pub async fn refresh(&self, token: &str) -> Result<AuthSession, HubError> {
        let profile = self.authenticate(token).await?;
        self.store
            .delete_by_id(SESSIONS, &token_digest(token))
            .await?;
        self.publish(AuthEvent::TokenRefreshed {
            user_id: profile.id.clone(),
        });
        self.issue_session(profile).await
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, HubError> {
        self.store
            .fetch(&Query::table(PROFILES).order_asc("created_at"))
            .await
    }

    /// Delete every session past its expiry; returns how many were removed.
    pub async fn prune_expired_sessions(&self) -> Result<usize, HubError> {
        let expired: Vec<StoredSession> = self
            .store
            .fetch(&Query::table(SESSIONS).lte("expires_at", timestamp(Utc::now())))
            .await?;
        for session in &expired {
            self.store.delete_by_id(SESSIONS, &session.id).await?;
        }
        if !expired.is_empty() {
            debug!(removed = expired.len(), "expired sessions pruned");
        }
        Ok(expired.len())
    }

    async fn session(&self, token: &str) -> Result<StoredSession, HubError> {
        let digest = token_digest(token);
        let session: StoredSession = self
            .store
            .fetch_by_id(SESSIONS, &digest)
            .await?
            .ok_or_else(|| HubError::Unauthorized("invalid or missing session".into()))?;
        if session.expires_at <= Utc::now() {
            self.store.delete_by_id(SESSIONS, &digest).await?;
            return Err(HubError::Unauthorized("session expired".into()));
        }
        Ok(session)
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, HubError> {
        Ok(self
            .store
            .fetch::<Profile>(&Query::table(PROFILES).eq("email", email).limit(1))
            .await?
            .into_iter()
            .next())
    }

    async fn issue_session(&self, profile: Profile) -> Result<AuthSession, HubError> {
        let token = generate_token();
        let expires_at = Utc::now() + ChronoDuration::hours(self.cfg.session_ttl_hours.max(1));
        let session = json!({
            "id": token_digest(&token),
            "user_id": profile.id,
            "expires_at": timestamp(expires_at),
        });
        self.store.insert(SESSIONS, to_record(&session)?).await?;
        Ok(AuthSession {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_at,
            profile,
        })
    }
}
