use crate::db::models::{from_record, to_record};
use crate::db::tables::NOTIFICATIONS;
use crate::db::{Query, Record, SharedStore, StoreExt};
use crate::error::HubError;
use crate::service::inventory::InventoryService;
use crate::types::inventory::{Category, InventoryItem};
use crate::types::notification::{NewNotification, Notification, NotificationKind};
use serde_json::Value;
use tracing::{debug, info};
use validator::Validate;

#[derive(Clone)]
pub struct NotificationService {
    store: SharedStore,
}

impl NotificationService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, note: NewNotification) -> Result<Notification, HubError> {
        note.validate()?;
        let mut record = to_record(&note)?;
        record.insert("read".to_string(), Value::Bool(false));
        let stored = self.store.insert(NOTIFICATIONS, record).await?;
        from_record(stored)
    }

    pub async fn list(
        &self,
        unread_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Notification>, HubError> {
        let mut query = Query::table(NOTIFICATIONS).order_desc("created_at");
        if unread_only {
            query = query.eq("read", false);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        self.store.fetch(&query).await
    }

    pub async fn unread_count(&self) -> Result<usize, HubError> {
        self.store
            .count(&Query::table(NOTIFICATIONS).eq("read", false))
            .await
    }

    pub async fn mark_read(&self, id: &str) -> Result<Notification, HubError> {
        let mut patch = Record::new();
        patch.insert("read".to_string(), Value::Bool(true));
        let updated = self
            .store
            .update_by_id(NOTIFICATIONS, id, patch)
            .await?
            .ok_or_else(|| HubError::not_found("notification", id))?;
        from_record(updated)
    }

    /// Returns how many notifications flipped to read.
    pub async fn mark_all_read(&self) -> Result<usize, HubError> {
        let unread = self.list(true, None).await?;
        for note in &unread {
            let mut patch = Record::new();
            patch.insert("read".to_string(), Value::Bool(true));
            self.store.update_by_id(NOTIFICATIONS, &note.id, patch).await?;
        }
        Ok(unread.len())
    }

    pub async fn delete(&self, id: &str) -> Result<(), HubError> {
        match self.store.delete_by_id(NOTIFICATIONS, id).await? {
            0 => Err(HubError::not_found("notification", id)),
            _ => Ok(()),
        }
    }

    /// Raise a low-stock notice unless one is already unread for this item.
    pub async fn notify_low_stock(
        &self,
        category: Category,
        item: &InventoryItem,
        threshold: i64,
    ) -> Result<Option<Notification>, HubError> {
        let pending = self
            .store
            .count(
                &Query::table(NOTIFICATIONS)
                    .eq("item_id", item.id.as_str())
                    .eq("kind", "low_stock")
                    .eq("read", false)
                    .limit(1),
            )
            .await?;
        if pending > 0 {
            debug!(item_id = %item.id, "low-stock notice already pending");
            return Ok(None);
        }
        let note = self
            .create(NewNotification {
                title: format!("Low stock: {}", item.name),
                message: format!(
                    "{} ({}) is down to {} (threshold {}).",
                    item.name,
                    category.label(),
                    item.quantity,
                    threshold
                ),
                kind: NotificationKind::LowStock,
                item_id: Some(item.id.clone()),
            })
            .await?;
        info!(item_id = %item.id, quantity = item.quantity, "low-stock notification raised");
        Ok(Some(note))
    }

    /// Walk all stocked items and raise any missing low-stock notices.
    pub async fn scan_low_stock(&self, inventory: &InventoryService) -> Result<usize, HubError> {
        let default_threshold = inventory.default_threshold();
        let mut raised = 0;
        for (category, items) in inventory.all_items().await? {
            for item in items
                .iter()
                .filter(|i| i.is_low_stock(category, default_threshold))
            {
                if self
                    .notify_low_stock(category, item, item.threshold(default_threshold))
                    .await?
                    .is_some()
                {
                    raised += 1;
                }
            }
        }
        Ok(raised)
    }
}
