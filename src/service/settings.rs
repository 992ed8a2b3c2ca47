use crate::db::models::from_record;
use crate::db::tables::SETTINGS;
use crate::db::{Query, Record, SharedStore, StoreExt};
use crate::error::HubError;
use crate::types::setting::Setting;
use serde_json::Value;
use tracing::debug;

const MAX_KEY_LEN: usize = 64;

/// Keys are `[a-z0-9_]{1,64}`.
pub fn check_key(key: &str) -> Result<&str, HubError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if valid {
        Ok(key)
    } else {
        Err(HubError::Validation(format!(
            "invalid setting key `{key}`: use 1-{MAX_KEY_LEN} of [a-z0-9_]"
        )))
    }
}

#[derive(Clone)]
pub struct SettingsService {
    store: SharedStore,
}

impl SettingsService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Setting>, HubError> {
        self.store
            .fetch(&Query::table(SETTINGS).order_asc("id"))
            .await
    }

    pub async fn find(&self, key: &str) -> Result<Option<Setting>, HubError> {
        self.store.fetch_by_id(SETTINGS, check_key(key)?).await
    }

    pub async fn get(&self, key: &str) -> Result<Setting, HubError> {
        self.find(key)
            .await?
            .ok_or_else(|| HubError::not_found("setting", key))
    }

    /// Upsert: patch the value in place, or insert a new key.
    pub async fn put(&self, key: &str, value: Value) -> Result<Setting, HubError> {
        let key = check_key(key)?;
        let mut patch = Record::new();
        patch.insert("value".to_string(), value);
        if let Some(updated) = self
            .store
            .update_by_id(SETTINGS, key, patch.clone())
            .await?
        {
            debug!(key, "setting updated");
            return from_record(updated);
        }
        patch.insert("id".to_string(), Value::String(key.to_string()));
        let stored = self.store.insert(SETTINGS, patch).await?;
        debug!(key, "setting created");
        from_record(stored)
    }

    pub async fn delete(&self, key: &str) -> Result<(), HubError> {
        match self.store.delete_by_id(SETTINGS, check_key(key)?).await? {
            0 => Err(HubError::not_found("setting", key)),
            _ => Ok(()),
        }
    }
}
