use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::booking::{Booking, BookingStatus, PackageMeta};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Role-derived list filter. Built by the visibility module so list scoping
/// and the point predicate cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    ForCustomer(Uuid),
    ForEmployee(Uuid),
    All,
    Unassigned,
    Assigned,
}

/// Fields a customer may change before assignment. `total_amount` is filled
/// by the manager when a travelers change reprices the booking.
#[derive(Debug, Clone, Default)]
pub struct BookingChanges {
    pub travel_date: Option<DateTime<Utc>>,
    pub travelers: Option<i32>,
    pub total_amount: Option<i64>,
}

/// Inclusive [start, end] window over a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// First day 00:00:00 through last day 23:59:59 UTC of the given month.
    /// Returns `None` for an out-of-range month or year.
    pub fn calendar_month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
        Some(DateWindow {
            start: first.and_hms_opt(0, 0, 0)?.and_utc(),
            end: last.and_hms_opt(23, 59, 59)?.and_utc(),
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RevenueTotals {
    pub total_revenue: i64,
    pub total_bookings: i64,
    pub average_booking_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageRevenueRow {
    pub package_id: Uuid,
    pub total_revenue: i64,
    pub total_bookings: i64,
    pub average_booking_value: f64,
}

/// Persistence collaborator for bookings and package metadata.
///
/// Mutators that carry a state or ownership guard run it inside the update
/// predicate and report whether a row was touched, so a raced-out transition
/// fails at the store rather than between a read and a write.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<(), RepoError>;

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, RepoError>;

    async fn list(&self, scope: BookingScope) -> Result<Vec<Booking>, RepoError>;

    /// Guarded on ownership and a customer-mutable status.
    async fn update_details(
        &self,
        id: Uuid,
        customer_id: Uuid,
        changes: &BookingChanges,
    ) -> Result<bool, RepoError>;

    /// Guarded on ownership and a customer-mutable status.
    async fn delete_for_customer(&self, id: Uuid, customer_id: Uuid) -> Result<bool, RepoError>;

    /// Unconditional delete (admin path).
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;

    /// PENDING -> ASSIGNED plus assignment upsert, atomically.
    async fn assign(&self, id: Uuid, employee_id: Uuid) -> Result<bool, RepoError>;

    /// ASSIGNED -> PAID plus receipt handle, guarded on ownership, one write.
    async fn attach_receipt(
        &self,
        id: Uuid,
        customer_id: Uuid,
        handle: &str,
    ) -> Result<bool, RepoError>;

    /// PAID -> ACCEPTED | REJECTED.
    async fn set_review_status(&self, id: Uuid, status: BookingStatus) -> Result<bool, RepoError>;

    async fn package_meta(&self, ids: &[Uuid]) -> Result<Vec<PackageMeta>, RepoError>;

    /// Sum/count/mean over ACCEPTED bookings, optionally windowed by travel date.
    async fn revenue_totals(&self, window: Option<DateWindow>) -> Result<RevenueTotals, RepoError>;

    /// Same filter, grouped by package.
    async fn revenue_by_package(
        &self,
        window: Option<DateWindow>,
    ) -> Result<Vec<PackageRevenueRow>, RepoError>;

    /// (created_at, total_amount) of every ACCEPTED booking, for monthly bucketing.
    async fn accepted_amounts(&self) -> Result<Vec<(DateTime<Utc>, i64)>, RepoError>;
}

/// File-storage collaborator for receipt bytes. Enforces no policy itself;
/// size and content-type validation happen in the upload handler.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Stores the bytes under a generated opaque handle and returns it.
    async fn store(&self, bytes: &[u8], content_type: &str) -> Result<String, RepoError>;

    async fn retrieve(&self, handle: &str) -> Result<Option<Vec<u8>>, RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn calendar_month_spans_first_to_last_second() {
        let window = DateWindow::calendar_month(2025, 6).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap());
    }

    #[test]
    fn calendar_month_handles_december_rollover() {
        let window = DateWindow::calendar_month(2024, 12).unwrap();
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn calendar_month_handles_leap_february() {
        let window = DateWindow::calendar_month(2024, 2).unwrap();
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap());
    }

    #[test]
    fn calendar_month_rejects_bad_month() {
        assert!(DateWindow::calendar_month(2024, 0).is_none());
        assert!(DateWindow::calendar_month(2024, 13).is_none());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = DateWindow::calendar_month(2025, 1).unwrap();
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.end + chrono::Duration::seconds(1)));
    }
}
