pub mod manager;
pub mod receipts;
pub mod revenue;
pub mod visibility;

pub use manager::{BookingManager, BookingUpdate, NewBooking};
pub use receipts::{ReceiptDownload, ReceiptUpload};
pub use revenue::{MonthlyRevenue, PackageRevenue, RevenueOverview};
