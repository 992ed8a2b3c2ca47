//! Table names. Inventory tables come from [`Category::table`].

use crate::types::Category;

pub const SALES: &str = "sales";
pub const CUSTOMERS: &str = "customers";
pub const INVOICES: &str = "invoices";
pub const PROFILES: &str = "profiles";
pub const NOTIFICATIONS: &str = "notifications";
pub const AUDIT_LOG: &str = "audit_log";
pub const SETTINGS: &str = "settings";

// private: never exported, never backed up
pub const AUTH_CREDENTIALS: &str = "auth_credentials";
pub const SESSIONS: &str = "sessions";

/// Every table users may export or back up.
pub fn public_tables() -> Vec<&'static str> {
    let mut tables: Vec<&'static str> = Category::ALL.iter().map(|c| c.table()).collect();
    tables.extend([
        SALES,
        CUSTOMERS,
        INVOICES,
        PROFILES,
        NOTIFICATIONS,
        AUDIT_LOG,
        SETTINGS,
    ]);
    tables
}

pub fn is_public(table: &str) -> bool {
    public_tables().contains(&table)
}

/// Public tables only admins may read in bulk; they mirror the `/api/admin` views.
pub const ADMIN_ONLY: [&str; 3] = [PROFILES, AUDIT_LOG, SETTINGS];

pub fn is_admin_only(table: &str) -> bool {
    ADMIN_ONLY.contains(&table)
}
