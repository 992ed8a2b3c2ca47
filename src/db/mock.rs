//! In-memory stand-in for the hosted data service, for offline development and tests.
//! No durability: everything lives in a process-local map and dies with the process.

use super::models::{Record, apply_patch, prepare_insert};
use super::query::{Filter, FilterOp, Query};
use super::store::Store;
use crate::error::HubError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
pub struct MockStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with records as-is (no id/timestamp generation).
    pub async fn seed(&self, table: &str, records: Vec<Record>) {
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().extend(records);
    }

    pub async fn table_len(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

fn key_filter(key: &str, value: &Value) -> Filter {
    Filter {
        field: key.to_string(),
        op: FilterOp::Eq,
        value: value.clone(),
    }
}

#[async_trait]
impl Store for MockStore {
    fn backend(&self) -> &'static str {
        "mock"
    }

    async fn select(&self, query: &Query) -> Result<Vec<Record>, HubError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&query.table)
            .map(|rows| query.apply(rows.iter()))
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record, HubError> {
        let record = prepare_insert(record);
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.iter().any(|r| r.get("id") == record.get("id")) {
            return Err(HubError::Conflict(format!(
                "duplicate id in table `{table}`"
            )));
        }
        rows.push(record.clone());
        debug!(table, rows = rows.len(), "mock insert");
        Ok(record)
    }

    async fn update(
        &self,
        table: &str,
        key: &str,
        value: &Value,
        patch: Record,
    ) -> Result<Option<Record>, HubError> {
        let filter = key_filter(key, value);
        let mut tables = self.tables.write().await;
        let Some(target) = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| filter.matches(r)))
        else {
            return Ok(None);
        };
        apply_patch(target, patch);
        Ok(Some(target.clone()))
    }

    async fn delete(&self, table: &str, key: &str, value: &Value) -> Result<u64, HubError> {
        let filter = key_filter(key, value);
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !filter.matches(r));
        Ok((before - rows.len()) as u64)
    }

    async fn clear(&self, table: &str) -> Result<u64, HubError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .remove(table)
            .map(|rows| rows.len() as u64)
            .unwrap_or(0))
    }
}
