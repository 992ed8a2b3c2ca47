//! Persistence: a table-scoped document client with interchangeable backends.
//!
//! Layout:
//! - `models.rs`: the `Record` type plus id/timestamp helpers
//! - `query.rs`: chainable `Query` (equality/range filters, ordering, limit)
//! - `store.rs`: the `Store` trait every backend implements
//! - `sqlite.rs` / `schema.rs`: local SQLite backend (default)
//! - `remote.rs`: REST client for the hosted data service
//! - `mock.rs`: in-memory shim for offline development
//! - `resilient.rs`: timeout + retry wrapper around any backend

pub mod mock;
pub mod models;
pub mod query;
pub mod remote;
pub mod resilient;
pub mod schema;
pub mod sqlite;
pub mod store;
pub mod tables;

pub use mock::MockStore;
pub use models::Record;
pub use query::{Direction, FilterOp, Query};
pub use remote::RemoteStore;
pub use resilient::ResilientStore;
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, SqliteStore};
pub use store::{SharedStore, Store, StoreExt};

use crate::config::{StoreBackend, StoreConfig};
use crate::error::HubError;
use crate::service::retry::RetryPolicy;
use std::sync::Arc;
use tracing::info;

/// Build the configured backend wrapped in [`ResilientStore`].
pub async fn open(cfg: &StoreConfig, policy: RetryPolicy) -> Result<SharedStore, HubError> {
    let backend: SharedStore = match cfg.backend {
        StoreBackend::Sqlite => Arc::new(SqliteStore::connect(&cfg.database_url).await?),
        StoreBackend::Remote => {
            let base = cfg.remote_url.clone().ok_or_else(|| {
                HubError::Validation("store.remote_url is required for the remote backend".into())
            })?;
            Arc::new(RemoteStore::new(
                base,
                &cfg.remote_api_key,
                cfg.request_timeout(),
            )?)
        }
        StoreBackend::Mock => Arc::new(MockStore::new()),
    };
    info!(
        backend = backend.backend(),
        max_attempts = policy.max_attempts,
        "store opened"
    );
    Ok(Arc::new(ResilientStore::new(
        backend,
        policy,
        cfg.request_timeout(),
    )))
}
