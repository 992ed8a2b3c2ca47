use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::SharedStore;
use crate::error::HubError;
use crate::handlers::{
    admin, auth, backup, customers, dashboard, export, health, inventory, invoices, notifications,
    sales, settings,
};
use crate::service::admin::AdminService;
use crate::service::analytics::AnalyticsService;
use crate::service::audit::AuditService;
use crate::service::auth::AuthService;
use crate::service::backup::BackupService;
use crate::service::customers::CustomerService;
use crate::service::dashboard_actor::{self, DashboardArgs, DashboardHandle};
use crate::service::export::ExportService;
use crate::service::inventory::InventoryService;
use crate::service::invoices::InvoiceService;
use crate::service::notifications::NotificationService;
use crate::service::sales::SalesService;
use crate::service::settings::SettingsService;

const RESTORE_BODY_LIMIT: usize = 64 * 1024 * 1024;

#[derive(Clone)]
pub struct HubState {
    pub store: SharedStore,
    pub inventory: InventoryService,
    pub sales: SalesService,
    pub customers: CustomerService,
    pub invoices: InvoiceService,
    pub analytics: AnalyticsService,
    pub notifications: NotificationService,
    pub auth: AuthService,
    pub admin: AdminService,
    pub audit: AuditService,
    pub backup: BackupService,
    pub settings: SettingsService,
    pub export: ExportService,
    pub dashboard: DashboardHandle,
    pub currency: Arc<str>,
}

impl HubState {
    /// Wire every service over one store and start the dashboard actor.
    pub async fn new(store: SharedStore, cfg: &Config) -> Result<Self, HubError> {
        let inventory = InventoryService::new(store.clone(), cfg.dashboard.low_stock_threshold);
        let notifications = NotificationService::new(store.clone());
        let customers = CustomerService::new(store.clone());
        let sales = SalesService::new(store.clone(), inventory.clone(), notifications.clone());
        let invoices = InvoiceService::new(store.clone(), customers.clone(), cfg.invoice.clone());
        let analytics = AnalyticsService::new(
            store.clone(),
            inventory.clone(),
            customers.clone(),
            notifications.clone(),
            cfg.dashboard.top_items,
        );
        let auth = AuthService::new(store.clone(), cfg.auth.clone());
        let audit = AuditService::new(store.clone());
        let admin = AdminService::new(store.clone(), auth.clone(), audit.clone());
        let settings = SettingsService::new(store.clone());
        let backup = BackupService::new(
            store.clone(),
            settings.clone(),
            notifications.clone(),
            audit.clone(),
        );
        let export = ExportService::new(store.clone());
        let dashboard = dashboard_actor::spawn(DashboardArgs {
            analytics: analytics.clone(),
            auth: auth.clone(),
            inventory: inventory.clone(),
            notifications: notifications.clone(),
            refresh_interval: cfg.dashboard.refresh_interval(),
        })
        .await?;

        Ok(Self {
            store,
            inventory,
            sales,
            customers,
            invoices,
            analytics,
            notifications,
            auth,
            admin,
            audit,
            backup,
            settings,
            export,
            dashboard,
            currency: Arc::from(cfg.invoice.currency.as_str()),
        })
    }
}

pub fn hub_router(state: HubState) -> Router {
    let auth_routes = Router::new()
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
        .route("/refresh", post(auth::refresh))
        .route("/session", get(auth::session))
        .route("/events", get(auth::events));

    let inventory_routes = Router::new()
        .route("/low-stock", get(inventory::low_stock))
        .route(
            "/{category}",
            get(inventory::list_items).post(inventory::create_item),
        )
        .route(
            "/{category}/{id}",
            get(inventory::get_item)
                .patch(inventory::update_item)
                .delete(inventory::delete_item),
        );

    let admin_routes = Router::new()
        .route("/profiles", get(admin::list_profiles))
        .route("/profiles/{id}/role", put(admin::set_role))
        .route("/audit", get(admin::audit_log));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/inventory", inventory_routes)
        .route("/sales", get(sales::list_sales).post(sales::record_sale))
        .route(
            "/sales/{id}",
            get(sales::get_sale).delete(sales::delete_sale),
        )
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/{id}",
            get(customers::get_customer)
                .patch(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route(
            "/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route(
            "/invoices/{id}",
            get(invoices::get_invoice).delete(invoices::delete_invoice),
        )
        .route("/invoices/{id}/issue", post(invoices::issue_invoice))
        .route("/invoices/{id}/pay", post(invoices::pay_invoice))
        .route("/invoices/{id}/cancel", post(invoices::cancel_invoice))
        .route("/utils/amount-in-words", get(invoices::amount_in_words))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/analytics/report", get(dashboard::revenue_report))
        .route("/analytics/top-items", get(dashboard::top_items))
        .route(
            "/notifications",
            get(notifications::list_notifications).post(notifications::create_notification),
        )
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route(
            "/notifications/{id}",
            delete(notifications::delete_notification),
        )
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .nest("/admin", admin_routes)
        .route("/backup", get(backup::export_backup))
        .route(
            "/backup/restore",
            post(backup::restore_backup).layer(DefaultBodyLimit::max(RESTORE_BODY_LIMIT)),
        )
        .route("/backup/history", get(backup::backup_history))
        .route("/export/{table}", get(export::export_csv))
        .route("/settings", get(settings::list_settings))
        .route(
            "/settings/{key}",
            get(settings::get_setting)
                .put(settings::put_setting)
                .delete(settings::delete_setting),
        );

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
