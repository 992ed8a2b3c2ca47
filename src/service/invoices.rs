use crate::config::InvoiceConfig;
use crate::db::models::{from_record, timestamp, to_record};
use crate::db::tables::INVOICES;
use crate::db::{Query, Record, SharedStore, StoreExt};
use crate::error::HubError;
use crate::format::amount_to_words;
use crate::service::customers::CustomerService;
use crate::types::invoice::{Invoice, InvoiceFilter, InvoiceLine, InvoiceStatus, NewInvoice};
use chrono::{DateTime, Days, NaiveTime, Utc};
use serde_json::json;
use tracing::info;
use validator::Validate;

#[derive(Clone)]
pub struct InvoiceService {
    store: SharedStore,
    customers: CustomerService,
    cfg: InvoiceConfig,
}

/// Invoice totals before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceTotals {
    pub lines: Vec<InvoiceLine>,
    pub subtotal: f64,
    pub total: f64,
}

/// Line amounts, subtotal and total; the discount may not exceed the subtotal.
pub fn compute_totals(invoice: &NewInvoice) -> Result<InvoiceTotals, HubError> {
    let lines: Vec<InvoiceLine> = invoice
        .lines
        .iter()
        .map(|l| InvoiceLine {
            description: l.description.trim().to_string(),
            quantity: l.quantity,
            unit_price: l.unit_price,
            amount: l.unit_price * l.quantity as f64,
        })
        .collect();
    let subtotal: f64 = lines.iter().map(|l| l.amount).sum();
    if invoice.discount > subtotal {
        return Err(HubError::Validation(format!(
            "discount {} exceeds subtotal {}",
            invoice.discount, subtotal
        )));
    }
    Ok(InvoiceTotals {
        lines,
        subtotal,
        total: subtotal - invoice.discount,
    })
}

/// `{prefix}-{YYYYMMDD}-{seq:04}`.
pub fn format_invoice_number(prefix: &str, at: DateTime<Utc>, seq: usize) -> String {
    format!("{prefix}-{}-{seq:04}", at.format("%Y%m%d"))
}

/// Sequence part of `number` when it belongs to the day `prefix` (`INV-20240309-`).
pub fn invoice_sequence(number: &str, prefix: &str) -> Option<usize> {
    number.strip_prefix(prefix)?.parse().ok()
}

impl InvoiceService {
    pub fn new(store: SharedStore, customers: CustomerService, cfg: InvoiceConfig) -> Self {
        Self {
            store,
            customers,
            cfg,
        }
    }

    /// Next number for the day containing `at`: one past the highest sequence used that day.
    /// Deleted invoices never free their number.
    pub async fn next_number(&self, at: DateTime<Utc>) -> Result<String, HubError> {
        let day = at.date_naive();
        let start = day.and_time(NaiveTime::MIN).and_utc();
        let end = day
            .checked_add_days(Days::new(1))
            .unwrap_or(day)
            .and_time(NaiveTime::MIN)
            .and_utc();
        let todays: Vec<Invoice> = self
            .store
            .fetch(
                &Query::table(INVOICES)
                    .gte("created_at", timestamp(start))
                    .lt("created_at", timestamp(end)),
            )
            .await?;
        let day_prefix = format!("{}-{}-", self.cfg.number_prefix, at.format("%Y%m%d"));
        let last = todays
            .iter()
            .filter_map(|inv| invoice_sequence(&inv.invoice_number, &day_prefix))
            .max()
            .unwrap_or(0);
        Ok(format_invoice_number(&self.cfg.number_prefix, at, last + 1))
    }

    pub async fn create(&self, invoice: NewInvoice) -> Result<Invoice, HubError> {
        invoice.validate()?;
        let stored_customer = match invoice.customer_id.as_deref() {
            Some(id) => Some(self.customers.get(id).await?),
            None => None,
        };
        let customer_name = invoice
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| stored_customer.map(|c| c.name))
            .ok_or_else(|| {
                HubError::Validation("customer name is required when no customer is selected".into())
            })?;

        let totals = compute_totals(&invoice)?;
        let now = Utc::now();
        let number = self.next_number(now).await?;
        let status = if invoice.issue {
            InvoiceStatus::Issued
        } else {
            InvoiceStatus::Draft
        };
        let record = json!({
            "invoice_number": number,
            "customer_id": invoice.customer_id,
            "customer_name": customer_name,
            "lines": totals.lines,
            "subtotal": totals.subtotal,
            "discount": invoice.discount,
            "total": totals.total,
            "amount_in_words": amount_to_words(totals.total, &self.cfg.currency),
            "status": status,
            "due_date": invoice.due_date,
            "notes": invoice.notes,
            "created_at": timestamp(now),
        });
        let stored = self.store.insert(INVOICES, to_record(&record)?).await?;
        let created: Invoice = from_record(stored)?;
        info!(
            invoice = %created.invoice_number,
            total = created.total,
            "invoice created"
        );
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<Invoice, HubError> {
        self.store
            .fetch_by_id(INVOICES, id)
            .await?
            .ok_or_else(|| HubError::not_found("invoice", id))
    }

    pub async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, HubError> {
        let mut query = Query::table(INVOICES).order_desc("created_at");
        if let Some(status) = filter.status {
            query = query.eq("status", serde_json::to_value(status)?);
        }
        if let Some(customer_id) = filter.customer_id.as_deref() {
            query = query.eq("customer_id", customer_id);
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }
        self.store.fetch(&query).await
    }

    pub async fn set_status(&self, id: &str, next: InvoiceStatus) -> Result<Invoice, HubError> {
        let current = self.get(id).await?;
        if !current.status.can_transition_to(next) {
            return Err(HubError::Conflict(format!(
                "invoice {} cannot move from {:?} to {:?}",
                current.invoice_number, current.status, next
            )));
        }
        let mut patch = Record::new();
        patch.insert("status".to_string(), serde_json::to_value(next)?);
        let updated = self
            .store
            .update_by_id(INVOICES, id, patch)
            .await?
            .ok_or_else(|| HubError::not_found("invoice", id))?;
        info!(invoice = %current.invoice_number, status = ?next, "invoice status changed");
        from_record(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), HubError> {
        match self.store.delete_by_id(INVOICES, id).await? {
            0 => Err(HubError::not_found("invoice", id)),
            _ => Ok(()),
        }
    }
}
