pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod memory;
pub mod receipt_store;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use memory::{MemoryBookingRepository, MemoryReceiptStore};
pub use receipt_store::DiskReceiptStore;
