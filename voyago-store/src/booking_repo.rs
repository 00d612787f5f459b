use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use voyago_core::{
    Assignment, Booking, BookingChanges, BookingRepository, BookingScope, BookingStatus,
    DateWindow, PackageMeta, PackageRevenueRow, RepoError, RevenueTotals,
};

/// Postgres-backed booking store. All transition guards run inside the
/// UPDATE/DELETE predicates so concurrent writers resolve at the database.
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_BOOKING: &str = "SELECT b.id, b.customer_id, b.package_id, b.travel_date, \
     b.travelers, b.total_amount, b.status, b.receipt, b.created_at, \
     a.employee_id, a.assigned_at \
     FROM bookings b LEFT JOIN assignments a ON a.booking_id = b.id";

// Statuses a customer may still mutate away from; used by the modify/delete guards.
const CUSTOMER_MUTABLE_GUARD: &str = "status NOT IN ('ASSIGNED', 'ACCEPTED', 'REJECTED')";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    customer_id: Uuid,
    package_id: Uuid,
    travel_date: DateTime<Utc>,
    travelers: i32,
    total_amount: i64,
    status: String,
    receipt: Option<String>,
    created_at: DateTime<Utc>,
    employee_id: Option<Uuid>,
    assigned_at: Option<DateTime<Utc>>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, RepoError> {
        let status: BookingStatus = self.status.parse()?;
        let assignment = match (self.employee_id, self.assigned_at) {
            (Some(employee_id), Some(assigned_at)) => Some(Assignment {
                employee_id,
                assigned_at,
            }),
            _ => None,
        };
        Ok(Booking {
            id: self.id,
            customer_id: self.customer_id,
            package_id: self.package_id,
            travel_date: self.travel_date,
            travelers: self.travelers,
            total_amount: self.total_amount,
            status,
            receipt: self.receipt,
            assignment,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    title: String,
    country: String,
    package_type: String,
    price: i64,
}

#[derive(sqlx::FromRow)]
struct TotalsRow {
    total_revenue: i64,
    total_bookings: i64,
    average_booking_value: f64,
}

#[derive(sqlx::FromRow)]
struct PackageTotalsRow {
    package_id: Uuid,
    total_revenue: i64,
    total_bookings: i64,
    average_booking_value: f64,
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO bookings \
             (id, customer_id, package_id, travel_date, travelers, total_amount, status, receipt, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(booking.id)
        .bind(booking.customer_id)
        .bind(booking.package_id)
        .bind(booking.travel_date)
        .bind(booking.travelers)
        .bind(booking.total_amount)
        .bind(booking.status.as_str())
        .bind(&booking.receipt)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("{SELECT_BOOKING} WHERE b.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn list(&self, scope: BookingScope) -> Result<Vec<Booking>, RepoError> {
        let order = "ORDER BY b.created_at DESC";
        let rows: Vec<BookingRow> = match scope {
            BookingScope::ForCustomer(customer_id) => {
                sqlx::query_as(&format!("{SELECT_BOOKING} WHERE b.customer_id = $1 {order}"))
                    .bind(customer_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingScope::ForEmployee(employee_id) => {
                sqlx::query_as(&format!("{SELECT_BOOKING} WHERE a.employee_id = $1 {order}"))
                    .bind(employee_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingScope::All => {
                sqlx::query_as(&format!("{SELECT_BOOKING} {order}"))
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingScope::Unassigned => {
                sqlx::query_as(&format!("{SELECT_BOOKING} WHERE a.booking_id IS NULL {order}"))
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingScope::Assigned => {
                sqlx::query_as(&format!(
                    "{SELECT_BOOKING} WHERE a.booking_id IS NOT NULL {order}"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn update_details(
        &self,
        id: Uuid,
        customer_id: Uuid,
        changes: &BookingChanges,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(&format!(
            "UPDATE bookings SET \
             travel_date = COALESCE($3, travel_date), \
             travelers = COALESCE($4, travelers), \
             total_amount = COALESCE($5, total_amount) \
             WHERE id = $1 AND customer_id = $2 AND {CUSTOMER_MUTABLE_GUARD}"
        ))
        .bind(id)
        .bind(customer_id)
        .bind(changes.travel_date)
        .bind(changes.travelers)
        .bind(changes.total_amount)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_customer(&self, id: Uuid, customer_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query(&format!(
            "DELETE FROM bookings WHERE id = $1 AND customer_id = $2 AND {CUSTOMER_MUTABLE_GUARD}"
        ))
        .bind(id)
        .bind(customer_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn assign(&self, id: Uuid, employee_id: Uuid) -> Result<bool, RepoError> {
        let mut tx = self.pool.begin().await?;

        let flipped =
            sqlx::query("UPDATE bookings SET status = 'ASSIGNED' WHERE id = $1 AND status = 'PENDING'")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        if flipped.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO assignments (booking_id, employee_id, assigned_at) VALUES ($1, $2, now()) \
             ON CONFLICT (booking_id) \
             DO UPDATE SET employee_id = EXCLUDED.employee_id, assigned_at = now()",
        )
        .bind(id)
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn attach_receipt(
        &self,
        id: Uuid,
        customer_id: Uuid,
        handle: &str,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "UPDATE bookings SET receipt = $3, status = 'PAID' \
             WHERE id = $1 AND customer_id = $2 AND status = 'ASSIGNED'",
        )
        .bind(id)
        .bind(customer_id)
        .bind(handle)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_review_status(&self, id: Uuid, status: BookingStatus) -> Result<bool, RepoError> {
        let result =
            sqlx::query("UPDATE bookings SET status = $2 WHERE id = $1 AND status = 'PAID'")
                .bind(id)
                .bind(status.as_str())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn package_meta(&self, ids: &[Uuid]) -> Result<Vec<PackageMeta>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<PackageRow> = sqlx::query_as(
            "SELECT id, title, country, package_type, price FROM tour_packages WHERE id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| PackageMeta {
                id: row.id,
                title: row.title,
                country: row.country,
                package_type: row.package_type,
                price: row.price,
            })
            .collect())
    }

    async fn revenue_totals(&self, window: Option<DateWindow>) -> Result<RevenueTotals, RepoError> {
        let select = "SELECT COALESCE(SUM(total_amount), 0)::BIGINT AS total_revenue, \
             COUNT(*) AS total_bookings, \
             COALESCE(AVG(total_amount), 0)::DOUBLE PRECISION AS average_booking_value \
             FROM bookings WHERE status = 'ACCEPTED'";
        let row: TotalsRow = match window {
            Some(window) => {
                sqlx::query_as(&format!("{select} AND travel_date BETWEEN $1 AND $2"))
                    .bind(window.start)
                    .bind(window.end)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => sqlx::query_as(select).fetch_one(&self.pool).await?,
        };
        Ok(RevenueTotals {
            total_revenue: row.total_revenue,
            total_bookings: row.total_bookings,
            average_booking_value: row.average_booking_value,
        })
    }

    async fn revenue_by_package(
        &self,
        window: Option<DateWindow>,
    ) -> Result<Vec<PackageRevenueRow>, RepoError> {
        let select = "SELECT package_id, \
             COALESCE(SUM(total_amount), 0)::BIGINT AS total_revenue, \
             COUNT(*) AS total_bookings, \
             COALESCE(AVG(total_amount), 0)::DOUBLE PRECISION AS average_booking_value \
             FROM bookings WHERE status = 'ACCEPTED'";
        let group = "GROUP BY package_id ORDER BY total_revenue DESC";
        let rows: Vec<PackageTotalsRow> = match window {
            Some(window) => {
                sqlx::query_as(&format!("{select} AND travel_date BETWEEN $1 AND $2 {group}"))
                    .bind(window.start)
                    .bind(window.end)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as(&format!("{select} {group}"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows
            .into_iter()
            .map(|row| PackageRevenueRow {
                package_id: row.package_id,
                total_revenue: row.total_revenue,
                total_bookings: row.total_bookings,
                average_booking_value: row.average_booking_value,
            })
            .collect())
    }

    async fn accepted_amounts(&self) -> Result<Vec<(DateTime<Utc>, i64)>, RepoError> {
        let rows: Vec<(DateTime<Utc>, i64)> = sqlx::query_as(
            "SELECT created_at, total_amount FROM bookings WHERE status = 'ACCEPTED' \
             ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
