use crate::db::models::{from_record, strip_reserved, to_record};
use crate::db::{Query, Record, SharedStore, StoreExt};
use crate::error::HubError;
use crate::types::inventory::{
    Category, InventoryItem, ItemListQuery, ItemPatch, LowStockItem, NewItem,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};
use validator::Validate;

type ItemLocks = Arc<Mutex<HashMap<(Category, String), Arc<tokio::sync::Mutex<()>>>>>;

#[derive(Clone)]
pub struct InventoryService {
    store: SharedStore,
    default_threshold: i64,
    /// Serializes read-modify-write of one item's quantity.
    locks: ItemLocks,
}

impl InventoryService {
    pub fn new(store: SharedStore, default_threshold: i64) -> Self {
        Self {
            store,
            default_threshold,
            locks: ItemLocks::default(),
        }
    }

    fn item_lock(&self, category: Category, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry((category, id.to_string()))
            .or_default()
            .clone()
    }

    pub fn default_threshold(&self) -> i64 {
        self.default_threshold
    }

    pub async fn list(
        &self,
        category: Category,
        params: &ItemListQuery,
    ) -> Result<Vec<InventoryItem>, HubError> {
        let items: Vec<InventoryItem> = self
            .store
            .fetch(&Query::table(category.table()).order_asc("name"))
            .await?;
        let needle = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        Ok(items
            .into_iter()
            .filter(|item| match &needle {
                Some(n) => {
                    item.name.to_lowercase().contains(n)
                        || item
                            .sku
                            .as_deref()
                            .is_some_and(|sku| sku.to_lowercase().contains(n))
                }
                None => true,
            })
            .filter(|item| !params.low_stock || item.is_low_stock(category, self.default_threshold))
            .collect())
    }

    pub async fn get(&self, category: Category, id: &str) -> Result<InventoryItem, HubError> {
        self.store
            .fetch_by_id(category.table(), id)
            .await?
            .ok_or_else(|| HubError::not_found(category.label(), id))
    }

    pub async fn create(&self, category: Category, item: NewItem) -> Result<InventoryItem, HubError> {
        item.validate()?;
        let mut record = to_record(&item)?;
        strip_reserved(&mut record);
        if !category.is_stocked() {
            record.insert("quantity".to_string(), json!(0));
        }
        let stored = self.store.insert(category.table(), record).await?;
        let created: InventoryItem = from_record(stored)?;
        info!(category = %category, id = %created.id, name = %created.name, "inventory item created");
        Ok(created)
    }

    pub async fn update(
        &self,
        category: Category,
        id: &str,
        patch: ItemPatch,
    ) -> Result<InventoryItem, HubError> {
        patch.validate()?;
        let mut record = to_record(&patch)?;
        strip_reserved(&mut record);
        if !category.is_stocked() && record.remove("quantity").is_some() {
            debug!(category = %category, id, "quantity ignored for unstocked item");
        }
        let lock = self.item_lock(category, id);
        let _guard = lock.lock().await;
        let updated = self
            .store
            .update_by_id(category.table(), id, record)
            .await?
            .ok_or_else(|| HubError::not_found(category.label(), id))?;
        from_record(updated)
    }

    pub async fn delete(&self, category: Category, id: &str) -> Result<(), HubError> {
        let removed = self.store.delete_by_id(category.table(), id).await?;
        if removed == 0 {
            return Err(HubError::not_found(category.label(), id));
        }
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(category, id.to_string()));
        info!(category = %category, id, "inventory item deleted");
        Ok(())
    }

    /// Add `delta` to the on-hand quantity; refuses to go below zero.
    /// Adjustments of the same item run one at a time against a fresh read.
    pub async fn adjust_stock(
        &self,
        category: Category,
        id: &str,
        delta: i64,
    ) -> Result<InventoryItem, HubError> {
        let lock = self.item_lock(category, id);
        let _guard = lock.lock().await;
        let item = self.get(category, id).await?;
        if !category.is_stocked() {
            return Ok(item);
        }
        let next = item.quantity + delta;
        if next < 0 {
            return Err(HubError::Validation(format!(
                "insufficient stock for `{}`: {} available, {} requested",
                item.name,
                item.quantity,
                -delta
            )));
        }
        let mut patch = Record::new();
        patch.insert("quantity".to_string(), Value::from(next));
        let updated = self
            .store
            .update_by_id(category.table(), id, patch)
            .await?
            .ok_or_else(|| HubError::not_found(category.label(), id))?;
        from_record(updated)
    }

    /// Items of every category, for aggregation.
    pub async fn all_items(&self) -> Result<Vec<(Category, Vec<InventoryItem>)>, HubError> {
        let mut out = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let items = self
                .store
                .fetch::<InventoryItem>(&Query::table(category.table()).order_asc("name"))
                .await?;
            out.push((category, items));
        }
        Ok(out)
    }

    pub async fn low_stock(&self) -> Result<Vec<LowStockItem>, HubError> {
        let all = self.all_items().await?;
        Ok(all
            .into_iter()
            .flat_map(|(category, items)| {
                items
                    .into_iter()
                    .filter(move |item| item.is_low_stock(category, self.default_threshold))
                    .map(move |item| LowStockItem {
                        category,
                        threshold: item.threshold(self.default_threshold),
                        item_id: item.id,
                        name: item.name,
                        quantity: item.quantity,
                    })
            })
            .collect())
    }
}
