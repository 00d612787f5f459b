use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A customer's reservation against a tour package, carrying a lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub package_id: Uuid,
    pub travel_date: DateTime<Utc>,
    pub travelers: i32,
    /// Minor currency units (cents).
    pub total_amount: i64,
    pub status: BookingStatus,
    /// Opaque stored-file handle, set once a receipt has been uploaded.
    pub receipt: Option<String>,
    pub assignment: Option<Assignment>,
    pub created_at: DateTime<Utc>,
}

/// Links a booking to the employee responsible for processing its payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub employee_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Assigned,
    Paid,
    Accepted,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Assigned => "ASSIGNED",
            BookingStatus::Paid => "PAID",
            BookingStatus::Accepted => "ACCEPTED",
            BookingStatus::Rejected => "REJECTED",
        }
    }

    /// Whether the owning customer may still modify or delete the booking.
    pub fn customer_mutable(&self) -> bool {
        !matches!(
            self,
            BookingStatus::Assigned | BookingStatus::Accepted | BookingStatus::Rejected
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Accepted | BookingStatus::Rejected)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown booking status: {0}")]
pub struct InvalidStatus(pub String);

impl FromStr for BookingStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "ASSIGNED" => Ok(BookingStatus::Assigned),
            "PAID" => Ok(BookingStatus::Paid),
            "ACCEPTED" => Ok(BookingStatus::Accepted),
            "REJECTED" => Ok(BookingStatus::Rejected),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// Read-only tour package metadata: create-time validation, price derivation,
/// and the revenue by-package join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMeta {
    pub id: Uuid,
    pub title: String,
    pub country: String,
    pub package_type: String,
    /// Per-traveler price in minor currency units.
    pub price: i64,
}
