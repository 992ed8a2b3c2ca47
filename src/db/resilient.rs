use crate::db::models::{ID_FIELD, Record, prepare_insert};
use crate::db::query::Query;
use crate::db::store::{SharedStore, Store};
use crate::error::HubError;
use crate::service::retry::{RetryPolicy, retry_with_backoff, with_timeout};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::debug;

/// Wraps a backend so every call is time-bounded and retried with backoff.
pub struct ResilientStore {
    inner: SharedStore,
    policy: RetryPolicy,
    timeout: Duration,
}

impl ResilientStore {
    pub fn new(inner: SharedStore, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            inner,
            policy,
            timeout,
        }
    }
}

#[async_trait]
impl Store for ResilientStore {
    fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    async fn select(&self, query: &Query) -> Result<Vec<Record>, HubError> {
        let inner = &self.inner;
        retry_with_backoff("select", &self.policy, || {
            with_timeout(self.timeout, inner.select(query))
        })
        .await
    }

    /// The id is fixed before the first attempt, so a retry after a lost response
    /// finds the committed row instead of writing a second one.
    async fn insert(&self, table: &str, record: Record) -> Result<Record, HubError> {
        let record = prepare_insert(record);
        let id = record.get(ID_FIELD).cloned().unwrap_or(Value::Null);
        let inner = &self.inner;
        let attempts = AtomicU32::new(0);
        let result = retry_with_backoff("insert", &self.policy, || {
            attempts.fetch_add(1, Ordering::Relaxed);
            with_timeout(self.timeout, inner.insert(table, record.clone()))
        })
        .await;
        match result {
            Err(HubError::Conflict(msg)) if attempts.load(Ordering::Relaxed) > 1 => {
                let committed = self
                    .select(&Query::table(table).eq(ID_FIELD, id).limit(1))
                    .await?;
                match committed.into_iter().next() {
                    Some(row) => {
                        debug!(table, "insert committed by an earlier attempt");
                        Ok(row)
                    }
                    None => Err(HubError::Conflict(msg)),
                }
            }
            other => other,
        }
    }

    async fn update(
        &self,
        table: &str,
        key: &str,
        value: &Value,
        patch: Record,
    ) -> Result<Option<Record>, HubError> {
        let inner = &self.inner;
        retry_with_backoff("update", &self.policy, || {
            with_timeout(self.timeout, inner.update(table, key, value, patch.clone()))
        })
        .await
    }

    async fn delete(&self, table: &str, key: &str, value: &Value) -> Result<u64, HubError> {
        let inner = &self.inner;
        retry_with_backoff("delete", &self.policy, || {
            with_timeout(self.timeout, inner.delete(table, key, value))
        })
        .await
    }

    async fn clear(&self, table: &str) -> Result<u64, HubError> {
        let inner = &self.inner;
        retry_with_backoff("clear", &self.policy, || {
            with_timeout(self.timeout, inner.clear(table))
        })
        .await
    }
}
