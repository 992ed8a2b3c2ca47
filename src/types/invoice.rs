use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Issued,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    /// draft -> issued -> paid, and a draft may be paid directly (walk-in customers).
    /// Anything not yet paid or cancelled may be cancelled.
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Issued) | (Draft, Paid) | (Issued, Paid) | (Draft, Cancelled) | (Issued, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: f64,
    #[serde(default)]
    pub discount: f64,
    pub total: f64,
    pub amount_in_words: String,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewInvoiceLine {
    #[validate(length(min = 1, max = 300, message = "Line description is required"))]
    pub description: String,
    #[validate(range(min = 1, message = "Line quantity must be at least 1"))]
    pub quantity: i64,
    #[validate(range(min = 0.0, message = "Line price cannot be negative"))]
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewInvoice {
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Required unless `customer_id` resolves to a stored customer.
    #[serde(default)]
    pub customer_name: Option<String>,
    #[validate(length(min = 1, message = "An invoice needs at least one line"))]
    #[validate(nested)]
    pub lines: Vec<NewInvoiceLine>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Discount cannot be negative"))]
    pub discount: f64,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Issue immediately instead of saving a draft.
    #[serde(default)]
    pub issue: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceFilter {
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}
