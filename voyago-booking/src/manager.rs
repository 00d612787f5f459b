//! The booking lifecycle state machine.
//!
//! Every mutation validates role, ownership, and current status before
//! touching the store, and every store-side transition repeats its status
//! guard inside the update predicate, so two racing actors cannot both win.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use voyago_core::{
    Actor, Booking, BookingChanges, BookingError, BookingRepository, BookingScope, BookingStatus,
    DateWindow, PackageMeta, ReceiptStore, Role,
};

use crate::receipts::{self, ReceiptDownload, ReceiptUpload};
use crate::revenue::{self, MonthlyRevenue, PackageRevenue, RevenueOverview};
use crate::visibility;

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub package_id: Uuid,
    pub travel_date: DateTime<Utc>,
    pub travelers: i32,
}

#[derive(Debug, Clone, Default)]
pub struct BookingUpdate {
    pub travel_date: Option<DateTime<Utc>>,
    pub travelers: Option<i32>,
}

pub struct BookingManager {
    repo: Arc<dyn BookingRepository>,
    receipts: Arc<dyn ReceiptStore>,
}

impl BookingManager {
    pub fn new(repo: Arc<dyn BookingRepository>, receipts: Arc<dyn ReceiptStore>) -> Self {
        Self { repo, receipts }
    }

    // ------------------------------------------------------------------
    // Customer operations
    // ------------------------------------------------------------------

    /// (none) -> PENDING.
    pub async fn create(&self, actor: &Actor, req: NewBooking) -> Result<Booking, BookingError> {
        self.require_role(actor, Role::Customer)?;

        if req.travelers < 1 {
            return Err(BookingError::validation("travelers must be at least 1"));
        }
        if req.travel_date <= Utc::now() {
            return Err(BookingError::validation("travel date must be in the future"));
        }
        let package = self
            .package(req.package_id)
            .await?
            .ok_or_else(|| BookingError::validation("unknown tour package"))?;

        let booking = Booking {
            id: Uuid::new_v4(),
            customer_id: actor.user_id,
            package_id: package.id,
            travel_date: req.travel_date,
            travelers: req.travelers,
            total_amount: package.price * req.travelers as i64,
            status: BookingStatus::Pending,
            receipt: None,
            assignment: None,
            created_at: Utc::now(),
        };
        self.repo
            .insert(&booking)
            .await
            .map_err(BookingError::internal)?;

        info!(booking_id = %booking.id, package_id = %package.id, "booking created");
        Ok(booking)
    }

    /// Role-scoped listing; the scope mirrors the read predicate exactly.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Booking>, BookingError> {
        self.repo
            .list(visibility::scope_for(actor))
            .await
            .map_err(BookingError::internal)
    }

    /// Detail view. Bookings outside the actor's visibility read as absent.
    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Booking, BookingError> {
        let booking = self.find(id).await?.ok_or(BookingError::NotFound)?;
        if !visibility::can_view(actor, &booking) {
            return Err(BookingError::NotFound);
        }
        Ok(booking)
    }

    /// Customer edit of travel date / party size; repriced when travelers
    /// change. Legal only while the booking is still customer-mutable.
    pub async fn modify(
        &self,
        actor: &Actor,
        id: Uuid,
        update: BookingUpdate,
    ) -> Result<Booking, BookingError> {
        self.require_role(actor, Role::Customer)?;
        let booking = self.fetch_owned(actor, id).await?;
        if !booking.status.customer_mutable() {
            return Err(BookingError::invalid_state(booking.status));
        }

        let mut changes = BookingChanges {
            travel_date: update.travel_date,
            travelers: update.travelers,
            total_amount: None,
        };
        if let Some(date) = update.travel_date {
            if date <= Utc::now() {
                return Err(BookingError::validation("travel date must be in the future"));
            }
        }
        if let Some(travelers) = update.travelers {
            if travelers < 1 {
                return Err(BookingError::validation("travelers must be at least 1"));
            }
            let package = self
                .package(booking.package_id)
                .await?
                .ok_or_else(|| BookingError::internal("package metadata missing"))?;
            changes.total_amount = Some(package.price * travelers as i64);
        }
        if changes.travel_date.is_none() && changes.travelers.is_none() {
            return Ok(booking);
        }

        let updated = self
            .repo
            .update_details(id, actor.user_id, &changes)
            .await
            .map_err(BookingError::internal)?;
        if !updated {
            return Err(BookingError::invalid_state(booking.status));
        }
        self.fetch_owned(actor, id).await
    }

    /// Customer delete, legal only while the booking is customer-mutable.
    pub async fn delete_own(&self, actor: &Actor, id: Uuid) -> Result<(), BookingError> {
        self.require_role(actor, Role::Customer)?;
        let booking = self.fetch_owned(actor, id).await?;
        if !booking.status.customer_mutable() {
            return Err(BookingError::invalid_state(booking.status));
        }
        let deleted = self
            .repo
            .delete_for_customer(id, actor.user_id)
            .await
            .map_err(BookingError::internal)?;
        if !deleted {
            return Err(BookingError::invalid_state(booking.status));
        }
        info!(booking_id = %id, "booking deleted by customer");
        Ok(())
    }

    /// ASSIGNED -> PAID. The file is stored first; the receipt handle and
    /// status flip land in a single guarded update. A file stored for an
    /// update that then loses its guard is orphaned and logged.
    pub async fn upload_receipt(
        &self,
        actor: &Actor,
        id: Uuid,
        upload: ReceiptUpload,
    ) -> Result<Booking, BookingError> {
        self.require_role(actor, Role::Customer)?;
        receipts::validate_upload(&upload)?;

        let booking = self.fetch_owned(actor, id).await?;
        if booking.status != BookingStatus::Assigned {
            return Err(BookingError::invalid_state(booking.status));
        }

        let handle = self
            .receipts
            .store(&upload.bytes, &upload.content_type)
            .await
            .map_err(BookingError::internal)?;

        let attached = self
            .repo
            .attach_receipt(id, actor.user_id, &handle)
            .await
            .map_err(|e| {
                warn!(booking_id = %id, %handle, error = %e, "receipt stored but booking update failed; file orphaned");
                BookingError::internal(e)
            })?;
        if !attached {
            warn!(booking_id = %id, %handle, "receipt stored but booking no longer eligible; file orphaned");
            return Err(BookingError::invalid_state(booking.status));
        }

        info!(booking_id = %id, %handle, "receipt uploaded, booking marked PAID");
        self.fetch_owned(actor, id).await
    }

    /// Streams the stored receipt back after re-running the visibility
    /// predicate. Missing booking, missing reference, and missing file are
    /// indistinguishable to the caller.
    pub async fn download_receipt(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<ReceiptDownload, BookingError> {
        let booking = self.find(id).await?.ok_or(BookingError::NotFound)?;
        if !visibility::can_view(actor, &booking) {
            return Err(BookingError::NotFound);
        }
        let handle = booking.receipt.ok_or(BookingError::NotFound)?;
        let bytes = self
            .receipts
            .retrieve(&handle)
            .await
            .map_err(BookingError::internal)?;
        let bytes = match bytes {
            Some(bytes) => bytes,
            None => {
                warn!(booking_id = %id, %handle, "booking references a missing receipt file");
                return Err(BookingError::NotFound);
            }
        };
        Ok(ReceiptDownload {
            content_type: receipts::content_type_for(&handle).to_string(),
            filename: handle,
            bytes,
        })
    }

    // ------------------------------------------------------------------
    // Admin operations
    // ------------------------------------------------------------------

    pub async fn list_unassigned(&self, actor: &Actor) -> Result<Vec<Booking>, BookingError> {
        self.require_role(actor, Role::SuperAdmin)?;
        self.repo
            .list(BookingScope::Unassigned)
            .await
            .map_err(BookingError::internal)
    }

    pub async fn list_assigned(&self, actor: &Actor) -> Result<Vec<Booking>, BookingError> {
        self.require_role(actor, Role::SuperAdmin)?;
        self.repo
            .list(BookingScope::Assigned)
            .await
            .map_err(BookingError::internal)
    }

    /// PENDING -> ASSIGNED plus the assignment record. The store repeats the
    /// PENDING guard inside the update, so of two racing admins only one wins.
    pub async fn assign(
        &self,
        actor: &Actor,
        id: Uuid,
        employee_id: Uuid,
    ) -> Result<Booking, BookingError> {
        self.require_role(actor, Role::SuperAdmin)?;
        let booking = self.find(id).await?.ok_or(BookingError::NotFound)?;
        if booking.status != BookingStatus::Pending {
            return Err(BookingError::invalid_state(booking.status));
        }

        let assigned = self
            .repo
            .assign(id, employee_id)
            .await
            .map_err(BookingError::internal)?;
        if !assigned {
            // Lost the race against another admin.
            return Err(BookingError::invalid_state(BookingStatus::Assigned));
        }

        info!(booking_id = %id, %employee_id, "booking assigned");
        self.find(id).await?.ok_or(BookingError::NotFound)
    }

    /// Admin delete is unconditional.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), BookingError> {
        self.require_role(actor, Role::SuperAdmin)?;
        let deleted = self.repo.delete(id).await.map_err(BookingError::internal)?;
        if !deleted {
            return Err(BookingError::NotFound);
        }
        info!(booking_id = %id, "booking deleted by admin");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Employee operations
    // ------------------------------------------------------------------

    /// PAID -> ACCEPTED | REJECTED, by the assigned employee only.
    pub async fn review(
        &self,
        actor: &Actor,
        id: Uuid,
        decision: BookingStatus,
    ) -> Result<Booking, BookingError> {
        self.require_role(actor, Role::Employee)?;
        if !decision.is_terminal() {
            return Err(BookingError::validation(
                "status must be ACCEPTED or REJECTED",
            ));
        }

        let booking = self.find(id).await?.ok_or(BookingError::NotFound)?;
        let assigned_to_caller = booking
            .assignment
            .as_ref()
            .is_some_and(|a| a.employee_id == actor.user_id);
        if !assigned_to_caller {
            return Err(BookingError::forbidden("booking is not assigned to you"));
        }
        if booking.status != BookingStatus::Paid {
            return Err(BookingError::invalid_state(booking.status));
        }

        let updated = self
            .repo
            .set_review_status(id, decision)
            .await
            .map_err(BookingError::internal)?;
        if !updated {
            return Err(BookingError::invalid_state(booking.status));
        }

        info!(booking_id = %id, status = %decision, "booking reviewed");
        self.find(id).await?.ok_or(BookingError::NotFound)
    }

    // ------------------------------------------------------------------
    // Revenue reports (admin-only, read-only)
    // ------------------------------------------------------------------

    pub async fn revenue_overview(
        &self,
        actor: &Actor,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<RevenueOverview, BookingError> {
        self.require_role(actor, Role::SuperAdmin)?;
        let window = Self::window(month, year)?;
        let totals = self
            .repo
            .revenue_totals(window)
            .await
            .map_err(BookingError::internal)?;
        Ok(totals.into())
    }

    pub async fn revenue_by_package(
        &self,
        actor: &Actor,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<PackageRevenue>, BookingError> {
        self.require_role(actor, Role::SuperAdmin)?;
        let window = Self::window(month, year)?;
        let rows = self
            .repo
            .revenue_by_package(window)
            .await
            .map_err(BookingError::internal)?;
        let ids: Vec<Uuid> = rows.iter().map(|r| r.package_id).collect();
        let packages = self
            .repo
            .package_meta(&ids)
            .await
            .map_err(BookingError::internal)?;
        Ok(revenue::join_packages(rows, &packages))
    }

    pub async fn revenue_by_month(
        &self,
        actor: &Actor,
    ) -> Result<Vec<MonthlyRevenue>, BookingError> {
        self.require_role(actor, Role::SuperAdmin)?;
        let rows = self
            .repo
            .accepted_amounts()
            .await
            .map_err(BookingError::internal)?;
        Ok(revenue::monthly_buckets(rows))
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn require_role(&self, actor: &Actor, role: Role) -> Result<(), BookingError> {
        if actor.role != role {
            return Err(BookingError::forbidden(format!(
                "{} access required",
                role
            )));
        }
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        self.repo.find(id).await.map_err(BookingError::internal)
    }

    /// Owner-scoped fetch. Absent and not-owned collapse to `NotFound` so an
    /// unauthorized caller learns nothing about existence.
    async fn fetch_owned(&self, actor: &Actor, id: Uuid) -> Result<Booking, BookingError> {
        let booking = self.find(id).await?.ok_or(BookingError::NotFound)?;
        if booking.customer_id != actor.user_id {
            return Err(BookingError::NotFound);
        }
        Ok(booking)
    }

    async fn package(&self, id: Uuid) -> Result<Option<PackageMeta>, BookingError> {
        let metas = self
            .repo
            .package_meta(&[id])
            .await
            .map_err(BookingError::internal)?;
        Ok(metas.into_iter().next())
    }

    fn window(month: Option<u32>, year: Option<i32>) -> Result<Option<DateWindow>, BookingError> {
        match (month, year) {
            (Some(month), Some(year)) => DateWindow::calendar_month(year, month)
                .map(Some)
                .ok_or_else(|| BookingError::validation("invalid month/year")),
            _ => Ok(None),
        }
    }
}
