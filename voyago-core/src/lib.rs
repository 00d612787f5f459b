pub mod actor;
pub mod booking;
pub mod error;
pub mod repository;

pub use actor::{Actor, Role};
pub use booking::{Assignment, Booking, BookingStatus, PackageMeta};
pub use error::BookingError;
pub use repository::{
    BookingChanges, BookingRepository, BookingScope, DateWindow, PackageRevenueRow, ReceiptStore,
    RepoError, RevenueTotals,
};
