pub mod audit;
pub mod backup;
pub mod customer;
pub mod dashboard;
pub mod inventory;
pub mod invoice;
pub mod notification;
pub mod profile;
pub mod sales;
pub mod setting;

pub use inventory::Category;
pub use profile::{Profile, Role};
