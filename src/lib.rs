pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod types;

pub use error::HubError;
pub use format::{amount_to_words, number_to_words};
pub use service::retry::{RetryPolicy, retry_with_backoff};
