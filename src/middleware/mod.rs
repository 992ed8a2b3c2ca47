pub mod auth;

pub use auth::{AdminUser, BearerToken, CurrentUser};
