use crate::db::models::{from_record, timestamp, to_record};
use crate::db::tables::{CUSTOMERS, SALES};
use crate::db::{Query, SharedStore, StoreExt};
use crate::error::HubError;
use crate::service::inventory::InventoryService;
use crate::service::notifications::NotificationService;
use crate::types::profile::Profile;
use crate::types::sales::{NewSale, Sale, SalesFilter};
use serde_json::json;
use tracing::{error, info, warn};
use validator::Validate;

#[derive(Clone)]
pub struct SalesService {
    store: SharedStore,
    inventory: InventoryService,
    notifications: NotificationService,
}

impl SalesService {
    pub fn new(
        store: SharedStore,
        inventory: InventoryService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            store,
            inventory,
            notifications,
        }
    }

    /// Record a sale: check stock, decrement it, persist the sale, raise low-stock notices.
    /// Stock is returned when the sale cannot be stored.
    pub async fn record(&self, sale: NewSale, seller: Option<&Profile>) -> Result<Sale, HubError> {
        sale.validate()?;
        let category = sale.category;
        let item = self.inventory.get(category, &sale.item_id).await?;

        if category.is_stocked() && item.quantity < sale.quantity {
            return Err(HubError::Validation(format!(
                "insufficient stock for `{}`: {} available, {} requested",
                item.name, item.quantity, sale.quantity
            )));
        }
        if let Some(customer_id) = sale.customer_id.as_deref()
            && self
                .store
                .count(&Query::table(CUSTOMERS).eq("id", customer_id).limit(1))
                .await?
                == 0
        {
            return Err(HubError::not_found("customer", customer_id));
        }

        let unit_price = sale.unit_price.unwrap_or(item.selling_price);
        let qty = sale.quantity as f64;
        let record = json!({
            "category": category,
            "item_id": item.id,
            "item_name": item.name,
            "quantity": sale.quantity,
            "unit_price": unit_price,
            "cost_price": item.cost_price,
            "total": unit_price * qty,
            "profit": (unit_price - item.cost_price) * qty,
            "customer_id": sale.customer_id,
            "payment_method": sale.payment_method,
            "sold_by": seller.map(|p| p.id.clone()),
            "notes": sale.notes,
        });

        let record = to_record(&record)?;
        // re-checks stock under the item lock; the pre-check above only fails fast
        let updated = self
            .inventory
            .adjust_stock(category, &item.id, -sale.quantity)
            .await?;
        let stored = match self.store.insert(SALES, record).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(item_id = %item.id, error = %e, "sale insert failed, returning stock");
                if let Err(undo) = self
                    .inventory
                    .adjust_stock(category, &item.id, sale.quantity)
                    .await
                {
                    error!(
                        item_id = %item.id,
                        quantity = sale.quantity,
                        error = %undo,
                        "failed to return stock after a lost sale"
                    );
                }
                return Err(e);
            }
        };
        let recorded: Sale = from_record(stored)?;
        info!(
            sale_id = %recorded.id,
            category = %category,
            item = %recorded.item_name,
            quantity = recorded.quantity,
            total = recorded.total,
            "sale recorded"
        );

        let threshold = updated.threshold(self.inventory.default_threshold());
        if updated.is_low_stock(category, self.inventory.default_threshold())
            && let Err(e) = self
                .notifications
                .notify_low_stock(category, &updated, threshold)
                .await
        {
            warn!(item_id = %updated.id, error = %e, "failed to raise low-stock notification");
        }
        Ok(recorded)
    }

    pub async fn list(&self, filter: &SalesFilter) -> Result<Vec<Sale>, HubError> {
        let mut query = Query::table(SALES).order_desc("created_at");
        if let Some(category) = filter.category {
            query = query.eq("category", category.table());
        }
        if let Some(customer_id) = filter.customer_id.as_deref() {
            query = query.eq("customer_id", customer_id);
        }
        if let Some(from) = filter.from {
            query = query.gte("created_at", timestamp(from));
        }
        if let Some(to) = filter.to {
            query = query.lte("created_at", timestamp(to));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }
        self.store.fetch(&query).await
    }

    pub async fn get(&self, id: &str) -> Result<Sale, HubError> {
        self.store
            .fetch_by_id(SALES, id)
            .await?
            .ok_or_else(|| HubError::not_found("sale", id))
    }

    /// Remove a sale record. Stock is not restored.
    pub async fn delete(&self, id: &str) -> Result<(), HubError> {
        match self.store.delete_by_id(SALES, id).await? {
            0 => Err(HubError::not_found("sale", id)),
            _ => Ok(()),
        }
    }
}
