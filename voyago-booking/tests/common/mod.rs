#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use voyago_booking::{BookingManager, NewBooking, ReceiptUpload};
use voyago_core::{Actor, Booking, BookingRepository, BookingStatus, PackageMeta, ReceiptStore, Role};
use voyago_store::{MemoryBookingRepository, MemoryReceiptStore};

pub struct TestApp {
    pub manager: BookingManager,
    pub repo: Arc<MemoryBookingRepository>,
    pub receipts: Arc<MemoryReceiptStore>,
    pub package_id: Uuid,
}

pub fn setup() -> TestApp {
    let repo = Arc::new(MemoryBookingRepository::new());
    let receipts = Arc::new(MemoryReceiptStore::new());
    let package_id = Uuid::new_v4();
    repo.add_package(PackageMeta {
        id: package_id,
        title: "Bali Highlights".to_string(),
        country: "Indonesia".to_string(),
        package_type: "Beach".to_string(),
        price: 150_00,
    });
    let manager = BookingManager::new(
        repo.clone() as Arc<dyn BookingRepository>,
        receipts.clone() as Arc<dyn ReceiptStore>,
    );
    TestApp {
        manager,
        repo,
        receipts,
        package_id,
    }
}

pub fn customer() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Customer)
}

pub fn employee() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Employee)
}

pub fn admin() -> Actor {
    Actor::new(Uuid::new_v4(), Role::SuperAdmin)
}

pub fn new_booking(package_id: Uuid) -> NewBooking {
    NewBooking {
        package_id,
        travel_date: Utc::now() + Duration::days(30),
        travelers: 2,
    }
}

pub fn upload(len: usize, content_type: &str) -> ReceiptUpload {
    ReceiptUpload {
        bytes: vec![1u8; len],
        content_type: content_type.to_string(),
    }
}

/// An already-ACCEPTED booking, inserted directly for aggregation fixtures.
pub fn accepted_booking(
    package_id: Uuid,
    total_amount: i64,
    travel_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        package_id,
        travel_date,
        travelers: 2,
        total_amount,
        status: BookingStatus::Accepted,
        receipt: Some("fixture.pdf".to_string()),
        assignment: None,
        created_at,
    }
}
