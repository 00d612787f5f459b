use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use voyago_api::middleware::auth::Claims;
use voyago_api::state::{AppState, AuthConfig};
use voyago_booking::BookingManager;
use voyago_core::{BookingRepository, PackageMeta, ReceiptStore, Role};
use voyago_store::{MemoryBookingRepository, MemoryReceiptStore};

const SECRET: &str = "test-secret";

fn test_app() -> (Router, Uuid) {
    let repo = Arc::new(MemoryBookingRepository::new());
    let package_id = Uuid::new_v4();
    repo.add_package(PackageMeta {
        id: package_id,
        title: "Kyoto Classics".to_string(),
        country: "Japan".to_string(),
        package_type: "Cultural".to_string(),
        price: 200_00,
    });
    let receipts = Arc::new(MemoryReceiptStore::new());
    let manager = Arc::new(BookingManager::new(
        repo as Arc<dyn BookingRepository>,
        receipts as Arc<dyn ReceiptStore>,
    ));
    let state = AppState {
        manager,
        auth: AuthConfig {
            secret: SECRET.to_string(),
        },
    };
    (voyago_api::app(state), package_id)
}

fn token(user_id: Uuid, role: Role) -> String {
    let claims = Claims {
        sub: user_id,
        role: role.as_str().to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn json_request(method: &str, uri: &str, bearer: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(uri: &str, bearer: &str, content_type: &str, payload: &[u8]) -> Request<Body> {
    let boundary = "VoyagoTestBoundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"receipt\"; \
             filename=\"receipt\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn create_body(package_id: Uuid) -> Value {
    json!({
        "package_id": package_id,
        "travel_date": (Utc::now() + Duration::days(45)).to_rfc3339(),
        "travelers": 2,
    })
}

#[tokio::test]
async fn rejects_missing_and_invalid_tokens() {
    let (app, _) = test_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/bookings").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/bookings")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_role_is_forbidden() {
    let (app, package_id) = test_app();
    let customer = token(Uuid::new_v4(), Role::Customer);
    let employee = token(Uuid::new_v4(), Role::Employee);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/bookings/unassigned")
                .header(header::AUTHORIZATION, format!("Bearer {customer}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            &employee,
            create_body(package_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn booking_flow_over_http() {
    let (app, package_id) = test_app();
    let alice_id = Uuid::new_v4();
    let eve_id = Uuid::new_v4();
    let alice = token(alice_id, Role::Customer);
    let bob = token(Uuid::new_v4(), Role::Customer);
    let eve = token(eve_id, Role::Employee);
    let boss = token(Uuid::new_v4(), Role::SuperAdmin);

    // Create.
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/bookings", &alice, create_body(package_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let booking = body_json(response).await;
    assert_eq!(booking["status"], "PENDING");
    assert_eq!(booking["total_amount"], 400_00);
    let booking_id = booking["id"].as_str().unwrap().to_string();

    // Assign.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/admin/bookings/{booking_id}/assign"),
            &boss,
            json!({ "employee_id": eve_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ASSIGNED");

    // Upload a 2 MB JPEG.
    let response = app
        .clone()
        .oneshot(multipart_request(
            &format!("/api/bookings/{booking_id}/receipt"),
            &alice,
            "image/jpeg",
            &vec![7u8; 2 * 1024 * 1024],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let paid = body_json(response).await;
    assert_eq!(paid["status"], "PAID");
    assert!(paid["receipt"].as_str().unwrap().ends_with(".jpg"));

    // Another customer cannot even see the booking or its receipt.
    for uri in [
        format!("/api/bookings/{booking_id}"),
        format!("/api/bookings/{booking_id}/receipt"),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri.as_str())
                    .header(header::AUTHORIZATION, format!("Bearer {bob}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // Owner downloads the receipt.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/bookings/{booking_id}/receipt"))
                .header(header::AUTHORIZATION, format!("Bearer {alice}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );

    // Assigned employee accepts.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/employee/bookings/{booking_id}/status"),
            &eve,
            json!({ "status": "ACCEPTED" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ACCEPTED");

    // Terminal: customer delete now conflicts.
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/bookings/{booking_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {alice}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn oversize_upload_is_a_validation_error() {
    let (app, package_id) = test_app();
    let alice_id = Uuid::new_v4();
    let alice = token(alice_id, Role::Customer);
    let boss = token(Uuid::new_v4(), Role::SuperAdmin);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/bookings", &alice, create_body(package_id)))
        .await
        .unwrap();
    let booking_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/admin/bookings/{booking_id}/assign"),
            &boss,
            json!({ "employee_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(multipart_request(
            &format!("/api/bookings/{booking_id}/receipt"),
            &alice,
            "image/jpeg",
            &vec![7u8; 6 * 1024 * 1024],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Booking is untouched.
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/bookings/{booking_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {alice}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let booking = body_json(response).await;
    assert_eq!(booking["status"], "ASSIGNED");
    assert!(booking["receipt"].is_null());
}

#[tokio::test]
async fn unknown_booking_detail_is_not_found() {
    let (app, _) = test_app();
    let alice = token(Uuid::new_v4(), Role::Customer);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/bookings/{}", Uuid::new_v4()))
                .header(header::AUTHORIZATION, format!("Bearer {alice}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
