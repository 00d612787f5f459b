use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod bookings;
pub mod employee;
pub mod error;
pub mod middleware;
pub mod revenue;
pub mod state;

pub use state::AppState;

use crate::middleware::auth;
use axum::middleware::from_fn_with_state;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let customer = bookings::customer_routes()
        .route_layer(from_fn_with_state(state.clone(), auth::customer_auth));
    // Upload/download are shared across roles; ownership is enforced inside
    // the manager against the same predicate the read paths use.
    let receipts = bookings::receipt_routes()
        .route_layer(from_fn_with_state(state.clone(), auth::any_auth));
    let admin = admin::routes().route_layer(from_fn_with_state(state.clone(), auth::admin_auth));
    let employee =
        employee::routes().route_layer(from_fn_with_state(state.clone(), auth::employee_auth));
    let revenue =
        revenue::routes().route_layer(from_fn_with_state(state.clone(), auth::admin_auth));

    Router::new()
        .merge(customer)
        .merge(receipts)
        .merge(admin)
        .merge(employee)
        .merge(revenue)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
