use std::sync::Arc;
use voyago_booking::BookingManager;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<BookingManager>,
    pub auth: AuthConfig,
}
