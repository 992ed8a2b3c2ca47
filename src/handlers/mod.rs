pub mod admin;
pub mod auth;
pub mod backup;
pub mod customers;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod inventory;
pub mod invoices;
pub mod notifications;
pub mod sales;
pub mod settings;
