use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use voyago_core::{Actor, Role};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub exp: usize,
}

/// Verifies the bearer token and resolves the acting identity. The token is
/// issued by the external auth service; this side only validates it.
fn authenticate(state: &AppState, req: &Request) -> Result<Actor, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthenticated)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthenticated)?;

    let role: Role = token_data
        .claims
        .role
        .parse()
        .map_err(|_| AppError::Unauthenticated)?;

    Ok(Actor::new(token_data.claims.sub, role))
}

/// Any authenticated role; fine-grained checks happen in the manager.
pub async fn any_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let actor = authenticate(&state, &req)?;
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

pub async fn customer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let actor = authenticate(&state, &req)?;
    if actor.role != Role::Customer {
        return Err(AppError::Forbidden("customer access required".to_string()));
    }
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

pub async fn employee_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let actor = authenticate(&state, &req)?;
    if actor.role != Role::Employee {
        return Err(AppError::Forbidden("employee access required".to_string()));
    }
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

pub async fn admin_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let actor = authenticate(&state, &req)?;
    if actor.role != Role::SuperAdmin {
        return Err(AppError::Forbidden("admin access required".to_string()));
    }
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}
