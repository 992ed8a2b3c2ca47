use super::inventory::Category;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryStats {
    pub category: Category,
    pub revenue: f64,
    pub profit: f64,
    pub sales_count: usize,
    pub units_in_stock: i64,
    pub item_count: usize,
    pub low_stock_items: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemRevenue {
    pub category: Category,
    pub item_id: String,
    pub item_name: String,
    pub units_sold: i64,
    pub revenue: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: f64,
    pub profit: f64,
    pub sales_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub total_revenue: f64,
    pub total_profit: f64,
    pub total_sales: usize,
    pub today_revenue: f64,
    pub today_sales: usize,
    pub categories: Vec<CategoryStats>,
    pub low_stock_count: usize,
    pub customers_count: usize,
    pub unread_notifications: usize,
    pub top_items: Vec<ItemRevenue>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueReport {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub sales_count: usize,
    pub days: Vec<DailyRevenue>,
}
