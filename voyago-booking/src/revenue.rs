//! Revenue report shaping over ACCEPTED bookings. Pure aggregation; the
//! heavy lifting (filter + group) is done by the repository.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;
use voyago_core::{PackageMeta, PackageRevenueRow, RevenueTotals};

#[derive(Debug, Serialize, PartialEq)]
pub struct RevenueOverview {
    pub total_revenue: i64,
    pub total_bookings: i64,
    pub average_booking_value: f64,
}

impl From<RevenueTotals> for RevenueOverview {
    fn from(totals: RevenueTotals) -> Self {
        Self {
            total_revenue: totals.total_revenue,
            total_bookings: totals.total_bookings,
            average_booking_value: totals.average_booking_value,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PackageRevenue {
    pub package_id: Uuid,
    pub package_title: String,
    pub country: String,
    pub package_type: String,
    pub total_revenue: i64,
    pub total_bookings: i64,
    pub average_booking_value: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MonthlyRevenue {
    pub month: String,
    pub total_revenue: i64,
}

/// Joins grouped revenue rows with package metadata; packages whose metadata
/// is missing render as "Unknown".
pub fn join_packages(
    rows: Vec<PackageRevenueRow>,
    packages: &[PackageMeta],
) -> Vec<PackageRevenue> {
    rows.into_iter()
        .map(|row| {
            let meta = packages.iter().find(|p| p.id == row.package_id);
            PackageRevenue {
                package_id: row.package_id,
                package_title: meta
                    .map(|m| m.title.clone())
                    .unwrap_or_else(|| "Unknown Package".to_string()),
                country: meta
                    .map(|m| m.country.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                package_type: meta
                    .map(|m| m.package_type.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                total_revenue: row.total_revenue,
                total_bookings: row.total_bookings,
                average_booking_value: row.average_booking_value,
            }
        })
        .collect()
}

/// Buckets (created_at, amount) pairs by calendar month of creation,
/// ascending "YYYY-MM" keys.
pub fn monthly_buckets(rows: Vec<(DateTime<Utc>, i64)>) -> Vec<MonthlyRevenue> {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for (created_at, amount) in rows {
        let key = format!("{:04}-{:02}", created_at.year(), created_at.month());
        *totals.entry(key).or_insert(0) += amount;
    }
    totals
        .into_iter()
        .map(|(month, total_revenue)| MonthlyRevenue {
            month,
            total_revenue,
        })
        .collect()
}
