use crate::db::tables::SALES;
use crate::db::{Query, SharedStore, StoreExt};
use crate::error::HubError;
use crate::service::customers::CustomerService;
use crate::service::inventory::InventoryService;
use crate::service::notifications::NotificationService;
use crate::types::dashboard::{
    CategoryStats, DailyRevenue, DashboardStats, ItemRevenue, RevenueReport,
};
use crate::types::inventory::{Category, InventoryItem};
use crate::types::sales::Sale;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};

/// Revenue, profit and stock per category. Categories without activity still appear.
pub fn category_stats(
    sales: &[Sale],
    inventory: &[(Category, Vec<InventoryItem>)],
    default_threshold: i64,
) -> Vec<CategoryStats> {
    Category::ALL
        .iter()
        .map(|&category| {
            let cat_sales = sales.iter().filter(|s| s.category == category);
            let (revenue, profit, sales_count) = cat_sales.fold((0.0, 0.0, 0), |(r, p, n), s| {
                (r + s.total, p + s.profit, n + 1)
            });
            let items: &[InventoryItem] = inventory
                .iter()
                .find(|(c, _)| *c == category)
                .map(|(_, items)| items.as_slice())
                .unwrap_or_default();
            CategoryStats {
                category,
                revenue,
                profit,
                sales_count,
                units_in_stock: if category.is_stocked() {
                    items.iter().map(|i| i.quantity).sum()
                } else {
                    0
                },
                item_count: items.len(),
                low_stock_items: items
                    .iter()
                    .filter(|i| i.is_low_stock(category, default_threshold))
                    .count(),
            }
        })
        .collect()
}

/// Best sellers by revenue, ties broken by units sold.
pub fn top_items(sales: &[Sale], n: usize) -> Vec<ItemRevenue> {
    let mut by_item: HashMap<(Category, &str), ItemRevenue> = HashMap::new();
    for sale in sales {
        let entry = by_item
            .entry((sale.category, sale.item_id.as_str()))
            .or_insert_with(|| ItemRevenue {
                category: sale.category,
                item_id: sale.item_id.clone(),
                item_name: sale.item_name.clone(),
                units_sold: 0,
                revenue: 0.0,
                profit: 0.0,
            });
        entry.units_sold += sale.quantity;
        entry.revenue += sale.total;
        entry.profit += sale.profit;
    }
    let mut ranked: Vec<ItemRevenue> = by_item.into_values().collect();
    ranked.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then(b.units_sold.cmp(&a.units_sold))
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    ranked.truncate(n);
    ranked
}

/// Per-day totals in ascending date order.
pub fn daily_revenue(sales: &[Sale]) -> Vec<DailyRevenue> {
    let mut days: BTreeMap<NaiveDate, DailyRevenue> = BTreeMap::new();
    for sale in sales {
        let date = sale.created_at.date_naive();
        let day = days.entry(date).or_insert(DailyRevenue {
            date,
            revenue: 0.0,
            profit: 0.0,
            sales_count: 0,
        });
        day.revenue += sale.total;
        day.profit += sale.profit;
        day.sales_count += 1;
    }
    days.into_values().collect()
}

/// Everything on the dashboard that derives from sales and stock alone.
pub fn summarize(
    sales: &[Sale],
    inventory: &[(Category, Vec<InventoryItem>)],
    default_threshold: i64,
    top_n: usize,
    now: DateTime<Utc>,
) -> DashboardStats {
    let today = now.date_naive();
    let todays = sales.iter().filter(|s| s.created_at.date_naive() == today);
    let (today_revenue, today_sales) = todays.fold((0.0, 0), |(r, n), s| (r + s.total, n + 1));
    let categories = category_stats(sales, inventory, default_threshold);
    DashboardStats {
        total_revenue: sales.iter().map(|s| s.total).sum(),
        total_profit: sales.iter().map(|s| s.profit).sum(),
        total_sales: sales.len(),
        today_revenue,
        today_sales,
        low_stock_count: categories.iter().map(|c| c.low_stock_items).sum(),
        categories,
        customers_count: 0,
        unread_notifications: 0,
        top_items: top_items(sales, top_n),
        generated_at: now,
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    store: SharedStore,
    inventory: InventoryService,
    customers: CustomerService,
    notifications: NotificationService,
    top_n: usize,
}

impl AnalyticsService {
    pub fn new(
        store: SharedStore,
        inventory: InventoryService,
        customers: CustomerService,
        notifications: NotificationService,
        top_n: usize,
    ) -> Self {
        Self {
            store,
            inventory,
            customers,
            notifications,
            top_n,
        }
    }

    pub async fn dashboard(&self) -> Result<DashboardStats, HubError> {
        let sales: Vec<Sale> = self.store.fetch(&Query::table(SALES)).await?;
        let inventory = self.inventory.all_items().await?;
        let mut stats = summarize(
            &sales,
            &inventory,
            self.inventory.default_threshold(),
            self.top_n,
            Utc::now(),
        );
        stats.customers_count = self.customers.count().await?;
        stats.unread_notifications = self.notifications.unread_count().await?;
        Ok(stats)
    }

    /// Daily revenue between two dates, both inclusive.
    pub async fn report(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<RevenueReport, HubError> {
        if let (Some(f), Some(t)) = (from, to)
            && f > t
        {
            return Err(HubError::Validation(format!(
                "report range starts after it ends ({f} > {t})"
            )));
        }
        let sales: Vec<Sale> = self
            .store
            .fetch::<Sale>(&Query::table(SALES).order_asc("created_at"))
            .await?
            .into_iter()
            .filter(|s| {
                let d = s.created_at.date_naive();
                from.is_none_or(|f| d >= f) && to.is_none_or(|t| d <= t)
            })
            .collect();
        let days = daily_revenue(&sales);
        Ok(RevenueReport {
            from,
            to,
            total_revenue: days.iter().map(|d| d.revenue).sum(),
            total_profit: days.iter().map(|d| d.profit).sum(),
            sales_count: sales.len(),
            days,
        })
    }

    pub async fn top_items(&self, n: Option<usize>) -> Result<Vec<ItemRevenue>, HubError> {
        let sales: Vec<Sale> = self.store.fetch(&Query::table(SALES)).await?;
        Ok(top_items(&sales, n.unwrap_or(self.top_n)))
    }
}
