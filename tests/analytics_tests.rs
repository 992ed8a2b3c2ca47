use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use point_art_hub::HubError;
use point_art_hub::config::AuthConfig;
use point_art_hub::db::{MockStore, SharedStore};
use point_art_hub::service::analytics::{
    AnalyticsService, category_stats, daily_revenue, summarize, top_items,
};
use point_art_hub::service::auth::AuthService;
use point_art_hub::service::customers::CustomerService;
use point_art_hub::service::dashboard_actor::{self, DashboardArgs};
use point_art_hub::service::inventory::InventoryService;
use point_art_hub::service::notifications::NotificationService;
use point_art_hub::service::sales::SalesService;
use point_art_hub::types::inventory::{Category, InventoryItem, NewItem};
use point_art_hub::types::sales::{NewSale, Sale};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().expect("valid time")
}

fn sale(category: Category, item: &str, qty: i64, price: f64, cost: f64, when: DateTime<Utc>) -> Sale {
    serde_json::from_value(json!({
        "id": format!("{item}-{}", when.timestamp()),
        "category": category,
        "item_id": item,
        "item_name": item,
        "quantity": qty,
        "unit_price": price,
        "cost_price": cost,
        "total": price * qty as f64,
        "profit": (price - cost) * qty as f64,
        "created_at": when,
    }))
    .expect("sale")
}

fn stock(name: &str, quantity: i64) -> InventoryItem {
    serde_json::from_value(json!({
        "id": name,
        "name": name,
        "quantity": quantity,
        "cost_price": 1.0,
        "selling_price": 2.0,
        "created_at": at(2024, 1, 1, 0),
    }))
    .expect("item")
}

fn sample_sales() -> Vec<Sale> {
    vec![
        sale(Category::Stationery, "pen", 10, 20.0, 10.0, at(2024, 5, 1, 9)),
        sale(Category::Stationery, "pen", 5, 20.0, 10.0, at(2024, 5, 2, 9)),
        sale(Category::GiftStore, "mug", 1, 250.0, 100.0, at(2024, 5, 2, 15)),
        sale(Category::ArtServices, "mural", 1, 300.0, 0.0, at(2024, 5, 3, 11)),
    ]
}

#[test]
fn every_category_is_reported() {
    let inventory = vec![
        (Category::Stationery, vec![stock("pen", 40), stock("ink", 3)]),
        (Category::ArtServices, vec![stock("mural", 0)]),
    ];
    let stats = category_stats(&sample_sales(), &inventory, 5);
    assert_eq!(stats.len(), 5);

    let stationery = &stats[0];
    assert_eq!(stationery.category, Category::Stationery);
    assert_eq!(stationery.revenue, 300.0);
    assert_eq!(stationery.profit, 150.0);
    assert_eq!(stationery.sales_count, 2);
    assert_eq!(stationery.units_in_stock, 43);
    assert_eq!(stationery.low_stock_items, 1);

    let services = stats
        .iter()
        .find(|s| s.category == Category::ArtServices)
        .expect("services row");
    assert_eq!(services.units_in_stock, 0);
    assert_eq!(services.low_stock_items, 0);

    let machines = stats
        .iter()
        .find(|s| s.category == Category::Machines)
        .expect("machines row");
    assert_eq!(machines.sales_count, 0);
    assert_eq!(machines.item_count, 0);
}

#[test]
fn top_items_rank_by_revenue() {
    let ranked = top_items(&sample_sales(), 2);
    assert_eq!(ranked.len(), 2);
    // pen and mural both made 300; pen moved more units
    assert_eq!(ranked[0].item_id, "pen");
    assert_eq!(ranked[0].units_sold, 15);
    assert_eq!(ranked[0].revenue, 300.0);
    assert_eq!(ranked[1].item_id, "mural");

    let tied = vec![
        sale(Category::Stationery, "b-item", 2, 50.0, 0.0, at(2024, 5, 1, 9)),
        sale(Category::Stationery, "a-item", 1, 100.0, 0.0, at(2024, 5, 1, 9)),
        sale(Category::Stationery, "c-item", 1, 100.0, 0.0, at(2024, 5, 1, 9)),
    ];
    let names: Vec<_> = top_items(&tied, 3).into_iter().map(|i| i.item_name).collect();
    assert_eq!(names, ["b-item", "a-item", "c-item"]);
}

#[test]
fn daily_totals_are_ascending() {
    let mut sales = sample_sales();
    sales.reverse();
    let days = daily_revenue(&sales);
    let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
    assert_eq!(
        dates,
        [
            NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"),
            NaiveDate::from_ymd_opt(2024, 5, 2).expect("date"),
            NaiveDate::from_ymd_opt(2024, 5, 3).expect("date"),
        ]
    );
    assert_eq!(days[1].revenue, 350.0);
    assert_eq!(days[1].sales_count, 2);
}

#[test]
fn summary_counts_today() {
    let stats = summarize(&sample_sales(), &[], 5, 3, at(2024, 5, 2, 20));
    assert_eq!(stats.total_sales, 4);
    assert_eq!(stats.total_revenue, 850.0);
    assert_eq!(stats.today_sales, 2);
    assert_eq!(stats.today_revenue, 350.0);
    assert_eq!(stats.low_stock_count, 0);
    assert_eq!(stats.top_items.len(), 3);
}

struct Shop {
    inventory: InventoryService,
    notifications: NotificationService,
    sales: SalesService,
    analytics: AnalyticsService,
    auth: AuthService,
}

fn shop() -> Shop {
    let store: SharedStore = Arc::new(MockStore::new());
    let inventory = InventoryService::new(store.clone(), 5);
    let notifications = NotificationService::new(store.clone());
    let customers = CustomerService::new(store.clone());
    let sales = SalesService::new(store.clone(), inventory.clone(), notifications.clone());
    let auth = AuthService::new(store.clone(), AuthConfig::default());
    let analytics = AnalyticsService::new(
        store,
        inventory.clone(),
        customers,
        notifications.clone(),
        5,
    );
    Shop {
        inventory,
        notifications,
        sales,
        analytics,
        auth,
    }
}

fn new_item(name: &str, quantity: i64) -> NewItem {
    serde_json::from_value(json!({
        "name": name,
        "quantity": quantity,
        "cost_price": 10.0,
        "selling_price": 25.0,
    }))
    .expect("item")
}

#[tokio::test]
async fn report_range_is_validated() {
    let shop = shop();
    let from = NaiveDate::from_ymd_opt(2024, 6, 2).expect("date");
    let to = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");
    assert!(matches!(
        shop.analytics.report(Some(from), Some(to)).await,
        Err(HubError::Validation(_))
    ));

    let item = shop
        .inventory
        .create(Category::Stationery, new_item("Eraser", 50))
        .await
        .expect("item");
    let sale: NewSale = serde_json::from_value(json!({
        "category": "stationery",
        "item_id": item.id,
        "quantity": 4,
    }))
    .expect("sale");
    shop.sales.record(sale, None).await.expect("record");

    let today = Utc::now().date_naive();
    let report = shop
        .analytics
        .report(Some(today), Some(today))
        .await
        .expect("report");
    assert_eq!(report.sales_count, 1);
    assert_eq!(report.total_revenue, 100.0);
    assert_eq!(report.days.len(), 1);

    let ancient = NaiveDate::from_ymd_opt(2000, 1, 1).expect("date");
    let empty = shop
        .analytics
        .report(None, Some(ancient))
        .await
        .expect("report");
    assert_eq!(empty.sales_count, 0);
    assert!(empty.days.is_empty());
}

#[tokio::test]
async fn dashboard_actor_caches_and_scans() {
    let shop = shop();
    shop.inventory
        .create(Category::Machines, new_item("Cutter blades", 2))
        .await
        .expect("item");

    let dashboard = dashboard_actor::spawn(DashboardArgs {
        analytics: shop.analytics.clone(),
        auth: shop.auth.clone(),
        inventory: shop.inventory.clone(),
        notifications: shop.notifications.clone(),
        refresh_interval: Duration::from_secs(3600),
    })
    .await
    .expect("spawn");

    let first = dashboard.get_stats().await.expect("stats");
    assert_eq!(first.low_stock_count, 1);
    assert_eq!(first.unread_notifications, 0);

    // cached until invalidated
    shop.inventory
        .create(Category::Machines, new_item("Vinyl roll", 1))
        .await
        .expect("item");
    let cached = dashboard.get_stats().await.expect("stats");
    assert_eq!(cached.low_stock_count, 1);

    dashboard.refresh();
    let refreshed = dashboard.get_stats().await.expect("stats");
    assert_eq!(refreshed.low_stock_count, 2);
    assert_eq!(refreshed.unread_notifications, 2);
    assert_eq!(shop.notifications.unread_count().await.expect("count"), 2);

    dashboard.refresh();
    let again = dashboard.get_stats().await.expect("stats");
    assert_eq!(again.unread_notifications, 2);

    dashboard.invalidate();
    shop.notifications.mark_all_read().await.expect("read");
    let fresh = dashboard.get_stats().await.expect("stats");
    assert_eq!(fresh.unread_notifications, 0);
}
