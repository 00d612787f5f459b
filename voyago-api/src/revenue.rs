use axum::{
    extract::{Extension, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use voyago_booking::{MonthlyRevenue, PackageRevenue, RevenueOverview};
use voyago_core::Actor;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/revenue/overview", get(overview))
        .route("/api/admin/revenue/packages", get(by_package))
        .route("/api/admin/revenue/months", get(by_month))
}

async fn overview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<RevenueQuery>,
) -> Result<Json<RevenueOverview>, AppError> {
    let report = state
        .manager
        .revenue_overview(&actor, query.month, query.year)
        .await?;
    Ok(Json(report))
}

async fn by_package(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<RevenueQuery>,
) -> Result<Json<Vec<PackageRevenue>>, AppError> {
    let report = state
        .manager
        .revenue_by_package(&actor, query.month, query.year)
        .await?;
    Ok(Json(report))
}

async fn by_month(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<MonthlyRevenue>>, AppError> {
    Ok(Json(state.manager.revenue_by_month(&actor).await?))
}
