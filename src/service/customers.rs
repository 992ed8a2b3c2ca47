use crate::db::models::{from_record, to_record};
use crate::db::tables::CUSTOMERS;
use crate::db::{Query, SharedStore, StoreExt};
use crate::error::HubError;
use crate::types::customer::{Customer, CustomerPatch, NewCustomer};
use validator::Validate;

#[derive(Clone)]
pub struct CustomerService {
    store: SharedStore,
}

impl CustomerService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Customer>, HubError> {
        let customers: Vec<Customer> = self
            .store
            .fetch(&Query::table(CUSTOMERS).order_asc("name"))
            .await?;
        let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(customers);
        };
        let needle = needle.to_lowercase();
        Ok(customers
            .into_iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.phone.as_deref().is_some_and(|p| p.contains(&needle))
                    || c
                        .email
                        .as_deref()
                        .is_some_and(|e| e.to_lowercase().contains(&needle))
            })
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<Customer, HubError> {
        self.store
            .fetch_by_id(CUSTOMERS, id)
            .await?
            .ok_or_else(|| HubError::not_found("customer", id))
    }

    pub async fn create(&self, customer: NewCustomer) -> Result<Customer, HubError> {
        customer.validate()?;
        let stored = self.store.insert(CUSTOMERS, to_record(&customer)?).await?;
        from_record(stored)
    }

    pub async fn update(&self, id: &str, patch: CustomerPatch) -> Result<Customer, HubError> {
        patch.validate()?;
        let updated = self
            .store
            .update_by_id(CUSTOMERS, id, to_record(&patch)?)
            .await?
            .ok_or_else(|| HubError::not_found("customer", id))?;
        from_record(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), HubError> {
        match self.store.delete_by_id(CUSTOMERS, id).await? {
            0 => Err(HubError::not_found("customer", id)),
            _ => Ok(()),
        }
    }

    pub async fn count(&self) -> Result<usize, HubError> {
        self.store.count(&Query::table(CUSTOMERS)).await
    }
}
