use crate::db::models::from_record;
use crate::db::tables::PROFILES;
use crate::db::{Query, Record, SharedStore, StoreExt};
use crate::error::HubError;
use crate::service::audit::AuditService;
use crate::service::auth::AuthService;
use crate::types::profile::{AuthEvent, Profile, Role};
use serde_json::json;
use tracing::info;

/// Role management for admins.
#[derive(Clone)]
pub struct AdminService {
    store: SharedStore,
    auth: AuthService,
    audit: AuditService,
}

impl AdminService {
    pub fn new(store: SharedStore, auth: AuthService, audit: AuditService) -> Self {
        Self { store, auth, audit }
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, HubError> {
        self.auth.list_profiles().await
    }

    /// Change a user's role. The last remaining admin cannot be demoted.
    pub async fn set_role(
        &self,
        actor: &Profile,
        user_id: &str,
        role: Role,
    ) -> Result<Profile, HubError> {
        let target: Profile = self
            .store
            .fetch_by_id(PROFILES, user_id)
            .await?
            .ok_or_else(|| HubError::not_found("user", user_id))?;
        if target.role == role {
            return Ok(target);
        }
        if target.is_admin() && role != Role::Admin {
            let admins = self
                .store
                .count(&Query::table(PROFILES).eq("role", "admin"))
                .await?;
            if admins <= 1 {
                return Err(HubError::Conflict(
                    "cannot demote the last remaining admin".into(),
                ));
            }
        }

        let mut patch = Record::new();
        patch.insert("role".to_string(), serde_json::to_value(role)?);
        let updated = self
            .store
            .update_by_id(PROFILES, user_id, patch)
            .await?
            .ok_or_else(|| HubError::not_found("user", user_id))?;
        let updated: Profile = from_record(updated)?;

        info!(actor = %actor.id, user_id, role = ?role, "role changed");
        self.audit
            .log(
                actor,
                "set_role",
                PROFILES,
                Some(user_id),
                Some(json!({ "from": target.role, "to": role })),
            )
            .await;
        self.auth.publish(AuthEvent::RoleChanged {
            user_id: updated.id.clone(),
            role,
        });
        Ok(updated)
    }
}
