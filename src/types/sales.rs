use super::inventory::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    MobileMoney,
    Card,
    BankTransfer,
    Credit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    pub id: String,
    pub category: Category,
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub cost_price: f64,
    pub total: f64,
    pub profit: f64,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub sold_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewSale {
    pub category: Category,
    #[validate(length(min = 1, message = "Item is required"))]
    pub item_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
    /// Overrides the item's selling price (e.g. negotiated price).
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Unit price cannot be negative"))]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    #[validate(length(max = 500, message = "Notes too long"))]
    pub notes: Option<String>,
}

/// Listing filters for `GET /api/sales`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesFilter {
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub limit: Option<usize>,
}
