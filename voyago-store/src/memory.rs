//! In-memory collaborators backing the test suites. They implement the same
//! ports and the same guarded-update semantics as the durable backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use voyago_core::{
    Booking, BookingChanges, BookingRepository, BookingScope, BookingStatus, DateWindow,
    PackageMeta, PackageRevenueRow, ReceiptStore, RepoError, RevenueTotals,
};

use crate::receipt_store::extension_for;

#[derive(Default)]
pub struct MemoryBookingRepository {
    bookings: Mutex<HashMap<Uuid, Booking>>,
    packages: Mutex<HashMap<Uuid, PackageMeta>>,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_package(&self, package: PackageMeta) {
        self.packages.lock().unwrap().insert(package.id, package);
    }

    fn accepted_in(&self, window: Option<DateWindow>) -> Vec<Booking> {
        self.bookings
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.status == BookingStatus::Accepted)
            .filter(|b| window.map_or(true, |w| w.contains(b.travel_date)))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), RepoError> {
        self.bookings
            .lock()
            .unwrap()
            .insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        Ok(self.bookings.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self, scope: BookingScope) -> Result<Vec<Booking>, RepoError> {
        let bookings = self.bookings.lock().unwrap();
        let mut out: Vec<Booking> = bookings
            .values()
            .filter(|b| match scope {
                BookingScope::All => true,
                BookingScope::ForCustomer(id) => b.customer_id == id,
                BookingScope::ForEmployee(id) => {
                    b.assignment.as_ref().is_some_and(|a| a.employee_id == id)
                }
                BookingScope::Unassigned => b.assignment.is_none(),
                BookingScope::Assigned => b.assignment.is_some(),
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn update_details(
        &self,
        id: Uuid,
        customer_id: Uuid,
        changes: &BookingChanges,
    ) -> Result<bool, RepoError> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.get_mut(&id) {
            Some(b) if b.customer_id == customer_id && b.status.customer_mutable() => {
                if let Some(date) = changes.travel_date {
                    b.travel_date = date;
                }
                if let Some(travelers) = changes.travelers {
                    b.travelers = travelers;
                }
                if let Some(total) = changes.total_amount {
                    b.total_amount = total;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_for_customer(&self, id: Uuid, customer_id: Uuid) -> Result<bool, RepoError> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.get(&id) {
            Some(b) if b.customer_id == customer_id && b.status.customer_mutable() => {
                bookings.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.bookings.lock().unwrap().remove(&id).is_some())
    }

    async fn assign(&self, id: Uuid, employee_id: Uuid) -> Result<bool, RepoError> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.get_mut(&id) {
            Some(b) if b.status == BookingStatus::Pending => {
                b.status = BookingStatus::Assigned;
                b.assignment = Some(voyago_core::Assignment {
                    employee_id,
                    assigned_at: Utc::now(),
                });
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn attach_receipt(
        &self,
        id: Uuid,
        customer_id: Uuid,
        handle: &str,
    ) -> Result<bool, RepoError> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.get_mut(&id) {
            Some(b) if b.customer_id == customer_id && b.status == BookingStatus::Assigned => {
                b.receipt = Some(handle.to_string());
                b.status = BookingStatus::Paid;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_review_status(&self, id: Uuid, status: BookingStatus) -> Result<bool, RepoError> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.get_mut(&id) {
            Some(b) if b.status == BookingStatus::Paid => {
                b.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn package_meta(&self, ids: &[Uuid]) -> Result<Vec<PackageMeta>, RepoError> {
        let packages = self.packages.lock().unwrap();
        Ok(ids.iter().filter_map(|id| packages.get(id).cloned()).collect())
    }

    async fn revenue_totals(&self, window: Option<DateWindow>) -> Result<RevenueTotals, RepoError> {
        let accepted = self.accepted_in(window);
        let total_revenue: i64 = accepted.iter().map(|b| b.total_amount).sum();
        let total_bookings = accepted.len() as i64;
        let average_booking_value = if total_bookings > 0 {
            total_revenue as f64 / total_bookings as f64
        } else {
            0.0
        };
        Ok(RevenueTotals {
            total_revenue,
            total_bookings,
            average_booking_value,
        })
    }

    async fn revenue_by_package(
        &self,
        window: Option<DateWindow>,
    ) -> Result<Vec<PackageRevenueRow>, RepoError> {
        let mut grouped: HashMap<Uuid, (i64, i64)> = HashMap::new();
        for booking in self.accepted_in(window) {
            let entry = grouped.entry(booking.package_id).or_insert((0, 0));
            entry.0 += booking.total_amount;
            entry.1 += 1;
        }
        let mut rows: Vec<PackageRevenueRow> = grouped
            .into_iter()
            .map(|(package_id, (total_revenue, total_bookings))| PackageRevenueRow {
                package_id,
                total_revenue,
                total_bookings,
                average_booking_value: total_revenue as f64 / total_bookings as f64,
            })
            .collect();
        rows.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
        Ok(rows)
    }

    async fn accepted_amounts(&self) -> Result<Vec<(DateTime<Utc>, i64)>, RepoError> {
        let mut rows: Vec<(DateTime<Utc>, i64)> = self
            .accepted_in(None)
            .into_iter()
            .map(|b| (b.created_at, b.total_amount))
            .collect();
        rows.sort_by_key(|(created_at, _)| *created_at);
        Ok(rows)
    }
}

#[derive(Default)]
pub struct MemoryReceiptStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl ReceiptStore for MemoryReceiptStore {
    async fn store(&self, bytes: &[u8], content_type: &str) -> Result<String, RepoError> {
        let handle = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
        self.files
            .lock()
            .unwrap()
            .insert(handle.clone(), bytes.to_vec());
        Ok(handle)
    }

    async fn retrieve(&self, handle: &str) -> Result<Option<Vec<u8>>, RepoError> {
        Ok(self.files.lock().unwrap().get(handle).cloned())
    }
}
