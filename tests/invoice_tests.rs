use chrono::{TimeZone, Utc};
use point_art_hub::HubError;
use point_art_hub::config::InvoiceConfig;
use point_art_hub::db::{MockStore, SharedStore};
use point_art_hub::service::customers::CustomerService;
use point_art_hub::service::invoices::{
    InvoiceService, compute_totals, format_invoice_number, invoice_sequence,
};
use point_art_hub::types::customer::NewCustomer;
use point_art_hub::types::invoice::{InvoiceFilter, InvoiceStatus, NewInvoice};
use serde_json::{Value, json};
use std::sync::Arc;

fn invoices() -> (InvoiceService, CustomerService) {
    let store: SharedStore = Arc::new(MockStore::new());
    let customers = CustomerService::new(store.clone());
    let invoices = InvoiceService::new(store, customers.clone(), InvoiceConfig::default());
    (invoices, customers)
}

fn invoice(body: Value) -> NewInvoice {
    serde_json::from_value(body).expect("valid invoice body")
}

fn banner_order() -> NewInvoice {
    invoice(json!({
        "customer_name": "Kampala Art School",
        "lines": [
            { "description": "Banner print", "quantity": 2, "unit_price": 1500.0 },
            { "description": "Lamination", "quantity": 1, "unit_price": 2000.0 },
        ],
        "discount": 500.0,
    }))
}

#[test]
fn totals_apply_discount() {
    let totals = compute_totals(&banner_order()).expect("totals");
    assert_eq!(totals.lines.len(), 2);
    assert_eq!(totals.lines[0].amount, 3000.0);
    assert_eq!(totals.subtotal, 5000.0);
    assert_eq!(totals.total, 4500.0);
}

#[test]
fn discount_above_subtotal_is_rejected() {
    let mut order = banner_order();
    order.discount = 5000.01;
    assert!(matches!(
        compute_totals(&order),
        Err(HubError::Validation(_))
    ));
}

#[test]
fn number_format() {
    let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 0, 0).single().expect("date");
    assert_eq!(format_invoice_number("INV", at, 7), "INV-20240309-0007");
    assert_eq!(format_invoice_number("PAH", at, 12345), "PAH-20240309-12345");
}

#[tokio::test]
async fn numbers_count_up_within_a_day() {
    let (invoices, _) = invoices();
    let today = Utc::now().format("%Y%m%d").to_string();

    let first = invoices.create(banner_order()).await.expect("first");
    let second = invoices.create(banner_order()).await.expect("second");
    assert_eq!(first.invoice_number, format!("INV-{today}-0001"));
    assert_eq!(second.invoice_number, format!("INV-{today}-0002"));

    assert_eq!(first.total, 4500.0);
    assert_eq!(
        first.amount_in_words,
        "Four Thousand Five Hundred Shillings Only"
    );
    assert_eq!(first.status, InvoiceStatus::Draft);
}

#[tokio::test]
async fn deleted_numbers_are_not_reused() {
    let (invoices, _) = invoices();
    let first = invoices.create(banner_order()).await.expect("first");
    let second = invoices.create(banner_order()).await.expect("second");
    invoices.delete(&first.id).await.expect("delete first");

    let third = invoices.create(banner_order()).await.expect("third");
    assert_ne!(third.invoice_number, second.invoice_number);
    let today = Utc::now().format("%Y%m%d").to_string();
    assert_eq!(third.invoice_number, format!("INV-{today}-0003"));
}

#[test]
fn sequence_parsing() {
    assert_eq!(invoice_sequence("INV-20240310-0042", "INV-20240310-"), Some(42));
    assert_eq!(invoice_sequence("INV-20240310-12345", "INV-20240310-"), Some(12345));
    assert_eq!(invoice_sequence("INV-20240309-0042", "INV-20240310-"), None);
    assert_eq!(invoice_sequence("INV-20240310-draft", "INV-20240310-"), None);
}

#[tokio::test]
async fn customer_name_comes_from_the_customer_record() {
    let (invoices, customers) = invoices();
    let customer: NewCustomer =
        serde_json::from_value(json!({ "name": "Nakato Prints" })).expect("customer");
    let customer = customers.create(customer).await.expect("create customer");

    let created = invoices
        .create(invoice(json!({
            "customer_id": customer.id,
            "lines": [{ "description": "Logo design", "quantity": 1, "unit_price": 80000.0 }],
            "issue": true,
        })))
        .await
        .expect("invoice");
    assert_eq!(created.customer_name, "Nakato Prints");
    assert_eq!(created.status, InvoiceStatus::Issued);

    let listed = invoices
        .list(&InvoiceFilter {
            customer_id: Some(customer.id.clone()),
            ..Default::default()
        })
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn missing_name_and_empty_lines_are_rejected() {
    let (invoices, _) = invoices();
    let nameless = invoices
        .create(invoice(json!({
            "customer_name": "   ",
            "lines": [{ "description": "Mug", "quantity": 1, "unit_price": 100.0 }],
        })))
        .await
        .expect_err("no name");
    assert!(matches!(nameless, HubError::Validation(_)));

    let empty = invoices
        .create(invoice(json!({ "customer_name": "Walk-in", "lines": [] })))
        .await
        .expect_err("no lines");
    assert!(matches!(empty, HubError::Validation(_)));

    let unknown = invoices
        .create(invoice(json!({
            "customer_id": "missing",
            "lines": [{ "description": "Mug", "quantity": 1, "unit_price": 100.0 }],
        })))
        .await
        .expect_err("unknown customer");
    assert!(matches!(unknown, HubError::NotFound(_)));
}

#[tokio::test]
async fn status_transitions() {
    let (invoices, _) = invoices();
    let draft = invoices.create(banner_order()).await.expect("draft");

    let issued = invoices
        .set_status(&draft.id, InvoiceStatus::Issued)
        .await
        .expect("issue");
    assert_eq!(issued.status, InvoiceStatus::Issued);
    let paid = invoices
        .set_status(&draft.id, InvoiceStatus::Paid)
        .await
        .expect("pay");
    assert_eq!(paid.status, InvoiceStatus::Paid);

    let err = invoices
        .set_status(&draft.id, InvoiceStatus::Cancelled)
        .await
        .expect_err("paid invoices stay paid");
    assert!(matches!(err, HubError::Conflict(_)));

    let filtered = invoices
        .list(&InvoiceFilter {
            status: Some(InvoiceStatus::Paid),
            ..Default::default()
        })
        .await
        .expect("list");
    assert_eq!(filtered.len(), 1);

    invoices.delete(&draft.id).await.expect("delete");
    assert!(matches!(
        invoices.get(&draft.id).await,
        Err(HubError::NotFound(_))
    ));
}

#[test]
fn transition_table() {
    use InvoiceStatus::*;
    assert!(Draft.can_transition_to(Issued));
    assert!(Draft.can_transition_to(Paid));
    assert!(Issued.can_transition_to(Cancelled));
    assert!(!Paid.can_transition_to(Cancelled));
    assert!(!Cancelled.can_transition_to(Issued));
    assert!(!Issued.can_transition_to(Draft));
}
