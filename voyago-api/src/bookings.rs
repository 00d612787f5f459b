use axum::{
    extract::{DefaultBodyLimit, Extension, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use voyago_booking::{BookingUpdate, NewBooking, ReceiptUpload};
use voyago_core::{Actor, Booking};

use crate::error::AppError;
use crate::state::AppState;

// Above the 5 MiB receipt policy so oversize uploads reach the handler and
// fail 400 there instead of 413 in the framework.
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub package_id: Uuid,
    pub travel_date: DateTime<Utc>,
    pub travelers: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub travel_date: Option<DateTime<Utc>>,
    pub travelers: Option<i32>,
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking).get(list_bookings))
        .route(
            "/api/bookings/{booking_id}",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
}

pub fn receipt_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/bookings/{booking_id}/receipt",
            post(upload_receipt).get(download_receipt),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state
        .manager
        .create(
            &actor,
            NewBooking {
                package_id: req.package_id,
                travel_date: req.travel_date,
                travelers: req.travelers,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.manager.list(&actor).await?))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.manager.get(&actor, booking_id).await?))
}

async fn update_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<UpdateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .manager
        .modify(
            &actor,
            booking_id,
            BookingUpdate {
                travel_date: req.travel_date,
                travelers: req.travelers,
            },
        )
        .await?;
    Ok(Json(booking))
}

async fn delete_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.manager.delete_own(&actor, booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_receipt(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Booking>, AppError> {
    let mut upload: Option<ReceiptUpload> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("receipt") {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            upload = Some(ReceiptUpload {
                bytes: bytes.to_vec(),
                content_type,
            });
        }
    }
    let upload =
        upload.ok_or_else(|| AppError::BadRequest("no receipt file uploaded".to_string()))?;

    let booking = state
        .manager
        .upload_receipt(&actor, booking_id, upload)
        .await?;
    Ok(Json(booking))
}

async fn download_receipt(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let receipt = state.manager.download_receipt(&actor, booking_id).await?;
    let headers = [
        (header::CONTENT_TYPE, receipt.content_type),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", receipt.filename),
        ),
    ];
    Ok((headers, receipt.bytes).into_response())
}
