use crate::booking::BookingStatus;

/// Outcome taxonomy for booking lifecycle operations.
///
/// `NotFound` covers both genuinely absent bookings and ownership mismatches
/// on read/modify/delete paths, so unauthorized callers cannot probe for
/// existence. Write-guard failures stay distinguishable: wrong role or wrong
/// assignee is `Forbidden`, a legal actor acting from the wrong status is
/// `InvalidState`.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("booking not found")]
    NotFound,

    #[error("action not allowed while booking is {status}")]
    InvalidState { status: BookingStatus },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Internal(String),
}

impl BookingError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        BookingError::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        BookingError::Validation(msg.into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        BookingError::Internal(err.to_string())
    }

    pub fn invalid_state(status: BookingStatus) -> Self {
        BookingError::InvalidState { status }
    }
}
