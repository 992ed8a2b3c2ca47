use crate::error::HubError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// The five inventory categories; each lives in its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Stationery,
    GiftStore,
    Embroidery,
    Machines,
    ArtServices,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Stationery,
        Category::GiftStore,
        Category::Embroidery,
        Category::Machines,
        Category::ArtServices,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Category::Stationery => "stationery",
            Category::GiftStore => "gift_store",
            Category::Embroidery => "embroidery",
            Category::Machines => "machines",
            Category::ArtServices => "art_services",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Stationery => "Stationery",
            Category::GiftStore => "Gift Store",
            Category::Embroidery => "Embroidery",
            Category::Machines => "Machines",
            Category::ArtServices => "Art Services",
        }
    }

    /// Services are sold by the job and carry no stock.
    pub fn is_stocked(self) -> bool {
        !matches!(self, Category::ArtServices)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for Category {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Category::ALL
            .into_iter()
            .find(|c| c.table() == normalized)
            .ok_or_else(|| HubError::NotFound(format!("inventory category `{s}`")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    pub cost_price: f64,
    pub selling_price: f64,
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Category-specific columns (e.g. machine serial, embroidery thread colour).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InventoryItem {
    pub fn threshold(&self, default_threshold: i64) -> i64 {
        self.low_stock_threshold.unwrap_or(default_threshold)
    }

    pub fn is_low_stock(&self, category: Category, default_threshold: i64) -> bool {
        category.is_stocked() && self.quantity <= self.threshold(default_threshold)
    }

    pub fn unit_margin(&self) -> f64 {
        self.selling_price - self.cost_price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewItem {
    #[validate(length(min = 1, max = 200, message = "Item name is required"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Description too long"))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i64,
    #[validate(range(min = 0.0, message = "Cost price cannot be negative"))]
    pub cost_price: f64,
    #[validate(range(min = 0.0, message = "Selling price cannot be negative"))]
    pub selling_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "Threshold cannot be negative"))]
    pub low_stock_threshold: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Item name cannot be empty"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Cost price cannot be negative"))]
    pub cost_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Selling price cannot be negative"))]
    pub selling_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the cross-category low-stock listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowStockItem {
    pub category: Category,
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
    pub threshold: i64,
}

/// Query string of `GET /api/inventory/{category}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub low_stock: bool,
}
