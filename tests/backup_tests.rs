use async_trait::async_trait;
use point_art_hub::HubError;
use point_art_hub::db::models::to_record;
use point_art_hub::db::tables::{AUTH_CREDENTIALS, CUSTOMERS, SESSIONS, public_tables};
use point_art_hub::db::{MockStore, Query, Record, SharedStore, Store};
use point_art_hub::service::audit::AuditService;
use point_art_hub::service::backup::{BackupService, validate_document};
use point_art_hub::service::customers::CustomerService;
use point_art_hub::service::notifications::NotificationService;
use point_art_hub::service::settings::SettingsService;
use point_art_hub::types::backup::BackupAction;
use point_art_hub::types::customer::NewCustomer;
use point_art_hub::types::notification::NotificationKind;
use point_art_hub::types::profile::Profile;
use serde_json::{Value, json};
use std::sync::Arc;

/// Refuses to insert customers named "Broken row"; everything else goes to the mock.
struct PickyStore(MockStore);

#[async_trait]
impl Store for PickyStore {
    fn backend(&self) -> &'static str {
        "picky"
    }

    async fn select(&self, query: &Query) -> Result<Vec<Record>, HubError> {
        self.0.select(query).await
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record, HubError> {
        if table == CUSTOMERS && record.get("name") == Some(&json!("Broken row")) {
            return Err(HubError::Unavailable("write rejected".into()));
        }
        self.0.insert(table, record).await
    }

    async fn update(
        &self,
        table: &str,
        key: &str,
        value: &Value,
        patch: Record,
    ) -> Result<Option<Record>, HubError> {
        self.0.update(table, key, value, patch).await
    }

    async fn delete(&self, table: &str, key: &str, value: &Value) -> Result<u64, HubError> {
        self.0.delete(table, key, value).await
    }

    async fn clear(&self, table: &str) -> Result<u64, HubError> {
        self.0.clear(table).await
    }
}

struct Hub {
    backup: BackupService,
    customers: CustomerService,
    notifications: NotificationService,
    settings: SettingsService,
    audit: AuditService,
}

fn hub() -> Hub {
    hub_over(Arc::new(MockStore::new()))
}

fn hub_over(store: SharedStore) -> Hub {
    let settings = SettingsService::new(store.clone());
    let notifications = NotificationService::new(store.clone());
    let audit = AuditService::new(store.clone());
    let backup = BackupService::new(
        store.clone(),
        settings.clone(),
        notifications.clone(),
        audit.clone(),
    );
    Hub {
        backup,
        customers: CustomerService::new(store),
        notifications,
        settings,
        audit,
    }
}

fn admin() -> Profile {
    serde_json::from_value(json!({
        "id": "admin-1",
        "email": "owner@pointart.test",
        "role": "admin",
        "created_at": "2024-01-01T00:00:00Z",
    }))
    .expect("profile")
}

async fn add_customer(hub: &Hub, name: &str) -> String {
    let customer: NewCustomer = serde_json::from_value(json!({ "name": name })).expect("customer");
    hub.customers.create(customer).await.expect("create").id
}

#[tokio::test]
async fn export_covers_public_tables_only() {
    let hub = hub();
    add_customer(&hub, "Nakato Prints").await;
    add_customer(&hub, "Okello Designs").await;
    hub.settings
        .put("shop_name", json!("Point Art Hub"))
        .await
        .expect("setting");

    let doc = hub.backup.export(&admin()).await.expect("export");
    assert_eq!(doc.data.len(), public_tables().len());
    assert!(!doc.data.contains_key(AUTH_CREDENTIALS));
    assert!(!doc.data.contains_key(SESSIONS));
    assert_eq!(doc.data["customers"].len(), 2);
    assert_eq!(doc.metadata.record_counts["customers"], 2);
    assert_eq!(doc.metadata.record_counts["settings"], 1);
    assert_eq!(doc.total_records(), 3);
    validate_document(&doc).expect("exported documents validate");

    let log = hub.audit.list(None).await.expect("audit");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, "backup_export");
}

#[tokio::test]
async fn restore_brings_back_deleted_rows() {
    let hub = hub();
    let kept = add_customer(&hub, "Nakato Prints").await;
    let doc = hub.backup.export(&admin()).await.expect("export");

    hub.customers.delete(&kept).await.expect("delete");
    add_customer(&hub, "Added after backup").await;

    let summary = hub.backup.restore(&admin(), doc).await.expect("restore");
    assert_eq!(summary.restored["customers"], 1);
    assert_eq!(summary.total, 1);

    let customers = hub.customers.list(None).await.expect("list");
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].id, kept);
    assert_eq!(customers[0].name, "Nakato Prints");

    let notes = hub.notifications.list(false, None).await.expect("notes");
    assert!(notes.iter().any(|n| n.kind == NotificationKind::Backup));
}

#[tokio::test]
async fn history_survives_restore() {
    let hub = hub();
    add_customer(&hub, "Nakato Prints").await;
    let doc = hub.backup.export(&admin()).await.expect("export");
    hub.backup.restore(&admin(), doc).await.expect("restore");

    let history = hub.backup.history().await.expect("history");
    let actions: Vec<BackupAction> = history.iter().map(|h| h.action).collect();
    assert_eq!(actions, [BackupAction::Export, BackupAction::Restore]);
    assert_eq!(history[1].records, 1);
}

#[tokio::test]
async fn inconsistent_documents_are_rejected() {
    let hub = hub();
    let kept = add_customer(&hub, "Nakato Prints").await;
    let doc = hub.backup.export(&admin()).await.expect("export");

    let mut wrong_count = doc.clone();
    wrong_count
        .metadata
        .record_counts
        .insert("customers".to_string(), 5);
    assert!(matches!(
        hub.backup.restore(&admin(), wrong_count).await,
        Err(HubError::Validation(_))
    ));

    let mut private = doc.clone();
    private.data.insert(SESSIONS.to_string(), Vec::new());
    private.metadata.tables.push(SESSIONS.to_string());
    private.metadata.record_counts.insert(SESSIONS.to_string(), 0);
    assert!(matches!(
        validate_document(&private),
        Err(HubError::Validation(_))
    ));

    let mut future = doc.clone();
    future.metadata.version = "9.9".to_string();
    assert!(matches!(
        validate_document(&future),
        Err(HubError::Validation(_))
    ));

    let mut unlisted = doc;
    unlisted.metadata.tables.retain(|t| t != "sales");
    assert!(matches!(
        validate_document(&unlisted),
        Err(HubError::Validation(_))
    ));

    // nothing was touched by the rejected restore
    assert_eq!(hub.customers.get(&kept).await.expect("still there").id, kept);
}

fn customer_row(id: &str, name: &str) -> Record {
    to_record(&json!({ "id": id, "name": name, "created_at": "2024-01-01T00:00:00.000000Z" }))
        .expect("record")
}

#[tokio::test]
async fn repeated_ids_are_rejected_before_anything_is_cleared() {
    let hub = hub();
    let kept = add_customer(&hub, "Keep me").await;
    let mut doc = hub.backup.export(&admin()).await.expect("export");

    let rows = vec![customer_row("dup", "First"), customer_row("dup", "Second")];
    doc.metadata.record_counts.insert("customers".to_string(), rows.len());
    doc.data.insert("customers".to_string(), rows);

    let err = hub
        .backup
        .restore(&admin(), doc)
        .await
        .expect_err("duplicate ids");
    assert!(matches!(err, HubError::Validation(ref m) if m.contains("dup")));

    let customers = hub.customers.list(None).await.expect("list");
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].id, kept);
}

#[tokio::test]
async fn failed_table_restore_puts_previous_rows_back() {
    let hub = hub_over(Arc::new(PickyStore(MockStore::new())));
    let kept = add_customer(&hub, "Keep me").await;
    let mut doc = hub.backup.export(&admin()).await.expect("export");

    let rows = vec![customer_row("c-1", "Fine row"), customer_row("c-2", "Broken row")];
    doc.metadata.record_counts.insert("customers".to_string(), rows.len());
    doc.data.insert("customers".to_string(), rows);

    let err = hub
        .backup
        .restore(&admin(), doc)
        .await
        .expect_err("second row fails");
    assert!(matches!(err, HubError::Unavailable(_)));

    let customers = hub.customers.list(None).await.expect("list");
    let ids: Vec<&str> = customers.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, [kept.as_str()]);
}
