use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use voyago_core::{Actor, Booking};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub employee_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/bookings/unassigned", get(list_unassigned))
        .route("/api/admin/bookings/assigned", get(list_assigned))
        .route("/api/admin/bookings/{booking_id}/assign", post(assign_booking))
        .route("/api/admin/bookings/{booking_id}", delete(delete_booking))
}

async fn list_unassigned(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.manager.list_unassigned(&actor).await?))
}

async fn list_assigned(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.manager.list_assigned(&actor).await?))
}

async fn assign_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .manager
        .assign(&actor, booking_id, req.employee_id)
        .await?;
    Ok(Json(booking))
}

async fn delete_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.manager.delete(&actor, booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
