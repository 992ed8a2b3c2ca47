pub mod admin;
pub mod analytics;
pub mod audit;
pub mod auth;
pub mod backup;
pub mod customers;
pub mod dashboard_actor;
pub mod export;
pub mod inventory;
pub mod invoices;
pub mod notifications;
pub mod retry;
pub mod sales;
pub mod settings;
