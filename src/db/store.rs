use super::models::{Record, from_record, from_records};
use super::query::Query;
use crate::error::HubError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

pub type SharedStore = Arc<dyn Store>;

/// Table-scoped persistence client. Every backend (sqlite, remote, mock) speaks this.
#[async_trait]
pub trait Store: Send + Sync {
    /// Human-readable backend name for logs.
    fn backend(&self) -> &'static str;

    async fn select(&self, query: &Query) -> Result<Vec<Record>, HubError>;

    /// Insert one record. `id` and `created_at` are generated when absent.
    async fn insert(&self, table: &str, record: Record) -> Result<Record, HubError>;

    /// Merge `patch` into the first record whose `key` equals `value`.
    async fn update(
        &self,
        table: &str,
        key: &str,
        value: &Value,
        patch: Record,
    ) -> Result<Option<Record>, HubError>;

    /// Remove every record whose `key` equals `value`; returns the count removed.
    async fn delete(&self, table: &str, key: &str, value: &Value) -> Result<u64, HubError>;

    /// Remove all records of `table`.
    async fn clear(&self, table: &str) -> Result<u64, HubError>;
}

/// Typed conveniences on top of any [`Store`].
#[async_trait]
pub trait StoreExt: Store {
    async fn fetch<T: DeserializeOwned + Send>(&self, query: &Query) -> Result<Vec<T>, HubError> {
        from_records(self.select(query).await?)
    }

    async fn fetch_by_id<T: DeserializeOwned + Send>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<Option<T>, HubError> {
        let rows = self
            .select(&Query::table(table).eq("id", id).limit(1))
            .await?;
        rows.into_iter().next().map(from_record).transpose()
    }

    async fn update_by_id(
        &self,
        table: &str,
        id: &str,
        patch: Record,
    ) -> Result<Option<Record>, HubError> {
        self.update(table, "id", &Value::String(id.to_string()), patch)
            .await
    }

    async fn delete_by_id(&self, table: &str, id: &str) -> Result<u64, HubError> {
        self.delete(table, "id", &Value::String(id.to_string()))
            .await
    }

    async fn count(&self, query: &Query) -> Result<usize, HubError> {
        Ok(self.select(query).await?.len())
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
