use async_trait::async_trait;
use point_art_hub::db::{
    MockStore, Query, Record, ResilientStore, SqliteStore, Store, StoreExt,
};
use point_art_hub::{HubError, RetryPolicy};
use serde_json::{Value, json};
use std::{
    fs,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn temp_db_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "point-art-hub-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    path
}

async fn sqlite_store(tag: &str) -> (SqliteStore, PathBuf) {
    let path = temp_db_path(tag);
    let url = format!("sqlite:{}", path.display());
    let store = SqliteStore::connect(&url)
        .await
        .expect("failed to open sqlite store");
    (store, path)
}

async fn insert_generates_id_and_timestamp(store: &dyn Store) {
    let stored = store
        .insert("customers", record(json!({"name": "Amina"})))
        .await
        .expect("insert");
    let id = stored.get("id").and_then(Value::as_str).expect("id");
    assert!(!id.is_empty());
    assert!(stored.get("created_at").and_then(Value::as_str).is_some());

    let kept = store
        .insert("customers", record(json!({"id": "fixed", "name": "Baraka"})))
        .await
        .expect("insert with id");
    assert_eq!(kept.get("id"), Some(&json!("fixed")));

    let dup = store
        .insert("customers", record(json!({"id": "fixed", "name": "Again"})))
        .await;
    assert!(matches!(dup, Err(HubError::Conflict(_))));
}

async fn delete_by_key_removes_every_match(store: &dyn Store) {
    for (name, colour) in [("Mug", "red"), ("Frame", "red"), ("Card", "blue")] {
        store
            .insert("gift_store", record(json!({"name": name, "colour": colour})))
            .await
            .expect("insert");
    }
    let removed = store
        .delete("gift_store", "colour", &json!("red"))
        .await
        .expect("delete");
    assert_eq!(removed, 2);
    let left = store
        .select(&Query::table("gift_store"))
        .await
        .expect("select");
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].get("name"), Some(&json!("Card")));

    let none = store
        .delete("gift_store", "colour", &json!("green"))
        .await
        .expect("delete none");
    assert_eq!(none, 0);
}

async fn update_by_key_patches_first_match(store: &dyn Store) {
    for name in ["A", "B"] {
        store
            .insert("machines", record(json!({"name": name, "status": "idle"})))
            .await
            .expect("insert");
    }
    let updated = store
        .update(
            "machines",
            "status",
            &json!("idle"),
            record(json!({"status": "busy", "id": "ignored"})),
        )
        .await
        .expect("update")
        .expect("a match");
    assert_eq!(updated.get("status"), Some(&json!("busy")));
    assert_ne!(updated.get("id"), Some(&json!("ignored")));
    assert!(updated.get("updated_at").and_then(Value::as_str).is_some());

    let busy = store
        .count(&Query::table("machines").eq("status", "busy"))
        .await
        .expect("count");
    assert_eq!(busy, 1);

    let missing = store
        .update("machines", "status", &json!("broken"), Record::new())
        .await
        .expect("update none");
    assert!(missing.is_none());
}

async fn filters_order_and_limit(store: &dyn Store) {
    let rows = [
        json!({"name": "Pencil", "quantity": 40, "price": 50.0, "active": true}),
        json!({"name": "Eraser", "quantity": 3, "price": 20.0, "active": false}),
        json!({"name": "Ruler", "quantity": 12, "price": 80.0, "active": true}),
        json!({"name": "Glue", "price": 120.0, "active": true}),
    ];
    for r in rows {
        store
            .insert("stationery", record(r))
            .await
            .expect("insert");
    }

    let names = |rows: Vec<Record>| -> Vec<String> {
        rows.iter()
            .filter_map(|r| r.get("name").and_then(Value::as_str).map(str::to_string))
            .collect()
    };

    let by_qty = store
        .select(&Query::table("stationery").order_desc("quantity"))
        .await
        .expect("select");
    assert_eq!(names(by_qty), ["Pencil", "Ruler", "Eraser", "Glue"]);

    let by_qty_asc = store
        .select(&Query::table("stationery").order_asc("quantity"))
        .await
        .expect("select");
    assert_eq!(names(by_qty_asc), ["Eraser", "Ruler", "Pencil", "Glue"]);

    let cheap = store
        .select(
            &Query::table("stationery")
                .gte("price", 20.0)
                .lt("price", 80.0)
                .order_asc("price"),
        )
        .await
        .expect("select");
    assert_eq!(names(cheap), ["Eraser", "Pencil"]);

    let active = store
        .select(
            &Query::table("stationery")
                .eq("active", true)
                .order_asc("name")
                .limit(2),
        )
        .await
        .expect("select");
    assert_eq!(names(active), ["Glue", "Pencil"]);

    let not_three = store
        .count(&Query::table("stationery").neq("quantity", 3))
        .await
        .expect("count");
    assert_eq!(not_three, 3, "neq keeps records missing the field");

    let no_quantity = store
        .count(&Query::table("stationery").eq("quantity", Value::Null))
        .await
        .expect("count");
    assert_eq!(no_quantity, 1);

    let cleared = store.clear("stationery").await.expect("clear");
    assert_eq!(cleared, 4);
    assert_eq!(
        store
            .count(&Query::table("stationery"))
            .await
            .expect("count"),
        0
    );
}

#[tokio::test]
async fn mock_insert_generates_id() {
    insert_generates_id_and_timestamp(&MockStore::new()).await;
}

#[tokio::test]
async fn mock_delete_by_key_reports_count() {
    delete_by_key_removes_every_match(&MockStore::new()).await;
}

#[tokio::test]
async fn mock_update_by_key() {
    update_by_key_patches_first_match(&MockStore::new()).await;
}

#[tokio::test]
async fn mock_query_semantics() {
    filters_order_and_limit(&MockStore::new()).await;
}

#[tokio::test]
async fn mock_seed_keeps_records_verbatim() {
    let store = MockStore::new();
    store
        .seed("settings", vec![record(json!({"id": "theme", "value": "dark"}))])
        .await;
    assert_eq!(store.table_len("settings").await, 1);
    let rows = store
        .select(&Query::table("settings"))
        .await
        .expect("select");
    assert!(rows[0].get("created_at").is_none());
}

#[tokio::test]
async fn sqlite_matches_mock_semantics() {
    let (store, path) = sqlite_store("semantics").await;
    insert_generates_id_and_timestamp(&store).await;
    delete_by_key_removes_every_match(&store).await;
    update_by_key_patches_first_match(&store).await;
    filters_order_and_limit(&store).await;
    store.pool().close().await;
    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn sqlite_persists_across_connections() {
    let (store, path) = sqlite_store("reopen").await;
    store
        .insert("customers", record(json!({"id": "c1", "name": "Zawadi"})))
        .await
        .expect("insert");
    store.pool().close().await;

    let url = format!("sqlite:{}", path.display());
    let reopened = SqliteStore::connect(&url).await.expect("reopen");
    let found: Option<Value> = reopened
        .fetch_by_id("customers", "c1")
        .await
        .expect("fetch");
    assert_eq!(
        found.and_then(|v| v.get("name").cloned()),
        Some(json!("Zawadi"))
    );
    reopened.pool().close().await;
    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn unsafe_field_names_are_rejected() {
    let store = MockStore::new();
    let err = Query::table("sales").eq("total; DROP", 1).check();
    assert!(matches!(err, Err(HubError::Validation(_))));

    let (sqlite, path) = sqlite_store("fields").await;
    let res = sqlite
        .select(&Query::table("sales").order_asc("created_at') --"))
        .await;
    assert!(matches!(res, Err(HubError::Validation(_))));
    assert!(store.select(&Query::table("sales")).await.expect("ok").is_empty());
    sqlite.pool().close().await;
    let _ = fs::remove_file(&path);
}

/// Commits the first insert and then reports a timeout, like a response lost in transit.
struct LostResponseStore {
    inner: MockStore,
    lost: AtomicBool,
}

#[async_trait]
impl Store for LostResponseStore {
    fn backend(&self) -> &'static str {
        "lost-response"
    }

    async fn select(&self, query: &Query) -> Result<Vec<Record>, HubError> {
        self.inner.select(query).await
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record, HubError> {
        let stored = self.inner.insert(table, record).await?;
        if !self.lost.swap(true, Ordering::SeqCst) {
            return Err(HubError::Timeout(Duration::from_secs(15)));
        }
        Ok(stored)
    }

    async fn update(
        &self,
        table: &str,
        key: &str,
        value: &Value,
        patch: Record,
    ) -> Result<Option<Record>, HubError> {
        self.inner.update(table, key, value, patch).await
    }

    async fn delete(&self, table: &str, key: &str, value: &Value) -> Result<u64, HubError> {
        self.inner.delete(table, key, value).await
    }

    async fn clear(&self, table: &str) -> Result<u64, HubError> {
        self.inner.clear(table).await
    }
}

#[tokio::test(start_paused = true)]
async fn retried_insert_does_not_duplicate() {
    let store = ResilientStore::new(
        Arc::new(LostResponseStore {
            inner: MockStore::new(),
            lost: AtomicBool::new(false),
        }),
        RetryPolicy::new(3, Duration::from_millis(100)),
        Duration::from_secs(5),
    );

    let stored = store
        .insert("customers", record(json!({ "name": "Nakato Prints" })))
        .await
        .expect("insert succeeds after retry");
    let rows = store
        .select(&Query::table("customers"))
        .await
        .expect("select");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], stored["id"]);
    assert_eq!(stored["name"], "Nakato Prints");
}

#[tokio::test(start_paused = true)]
async fn genuine_conflicts_still_fail() {
    let store = ResilientStore::new(
        Arc::new(MockStore::new()),
        RetryPolicy::new(3, Duration::from_millis(100)),
        Duration::from_secs(5),
    );
    store
        .insert("customers", record(json!({ "id": "c-1", "name": "First" })))
        .await
        .expect("first insert");
    let err = store
        .insert("customers", record(json!({ "id": "c-1", "name": "Second" })))
        .await
        .expect_err("same id");
    assert!(matches!(err, HubError::Conflict(_)));
}
