//! Booking domain errors
//!
//! Every failure of the catalog, ledger, admission controller and projector
//! is a [`BookingError`]; the HTTP layer converts it into
//! [`shared::error::AppError`].

use super::storage::StorageError;
use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),

    #[error("Reservation date {0} is in the past")]
    PastDate(NaiveDate),

    #[error("Timeslot {0} not found")]
    TimeslotNotFound(i64),

    #[error("Timeslot {0} is not active")]
    TimeslotInactive(i64),

    #[error("Timeslot {0} has active reservations")]
    TimeslotInUse(i64),

    #[error("A timeslot already starts at {0}")]
    TimeslotTimeExists(String),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Restaurant configuration not found")]
    ConfigMissing,

    #[error("No active timeslot configured")]
    NoActiveTimeslots,

    #[error("Not enough places available. Available places: {available}")]
    CapacityExceeded { available: u32 },

    #[error("You already have a reservation for this timeslot on this date")]
    DuplicateBooking,

    #[error("Reservation {0} not found")]
    ReservationNotFound(i64),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type BookingResult<T> = Result<T, BookingError>;

impl BookingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::PastDate(_) => ErrorCode::PastDate,
            Self::TimeslotNotFound(_) => ErrorCode::TimeslotNotFound,
            Self::TimeslotInactive(_) => ErrorCode::TimeslotInactive,
            Self::TimeslotInUse(_) => ErrorCode::TimeslotInUse,
            Self::TimeslotTimeExists(_) => ErrorCode::TimeslotTimeExists,
            Self::UserNotFound(_) => ErrorCode::UserNotFound,
            Self::ConfigMissing => ErrorCode::ConfigMissing,
            Self::NoActiveTimeslots => ErrorCode::NoActiveTimeslots,
            Self::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            Self::DuplicateBooking => ErrorCode::DuplicateBooking,
            Self::ReservationNotFound(_) => ErrorCode::ReservationNotFound,
            Self::Storage(e) if e.is_transient() => ErrorCode::StoreBusy,
            Self::Storage(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match &err {
            BookingError::CapacityExceeded { available } => {
                AppError::with_message(code, message).with_detail("available_places", *available)
            }
            BookingError::TimeslotNotFound(id)
            | BookingError::TimeslotInactive(id)
            | BookingError::TimeslotInUse(id) => {
                AppError::with_message(code, message).with_detail("timeslot_id", *id)
            }
            BookingError::ReservationNotFound(id) => {
                AppError::with_message(code, message).with_detail("reservation_id", *id)
            }
            BookingError::Storage(e) => {
                tracing::error!(error = %e, retryable = code.is_retryable(), "Storage failure");
                let app = AppError::new(code);
                // 仅调试构建暴露底层错误
                if cfg!(debug_assertions) {
                    app.with_detail("cause", message)
                } else {
                    app
                }
            }
            _ => AppError::with_message(code, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_capacity_exceeded_reports_remaining() {
        let app: AppError = BookingError::CapacityExceeded { available: 3 }.into();
        assert_eq!(app.code, ErrorCode::CapacityExceeded);
        assert_eq!(app.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            app.message,
            "Not enough places available. Available places: 3"
        );
        assert_eq!(app.details.unwrap().get("available_places").unwrap(), 3);
    }

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(BookingError, StatusCode)> = vec![
            (BookingError::validation("bad"), StatusCode::BAD_REQUEST),
            (BookingError::DuplicateBooking, StatusCode::BAD_REQUEST),
            (BookingError::TimeslotNotFound(1), StatusCode::NOT_FOUND),
            (BookingError::TimeslotInactive(1), StatusCode::NOT_FOUND),
            (BookingError::ReservationNotFound(9), StatusCode::NOT_FOUND),
            (BookingError::TimeslotInUse(1), StatusCode::CONFLICT),
            (BookingError::ConfigMissing, StatusCode::INTERNAL_SERVER_ERROR),
            (
                BookingError::NoActiveTimeslots,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            let app: AppError = err.into();
            assert_eq!(app.http_status(), status, "{:?}", app.code);
        }
    }

    #[test]
    fn test_corrupted_store_is_not_retryable() {
        let err = BookingError::from(StorageError::Storage(redb::StorageError::Corrupted(
            "bad page".into(),
        )));
        assert_eq!(err.code(), ErrorCode::DatabaseError);

        let app: AppError = err.into();
        assert_eq!(app.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!app.code.is_retryable());
    }
}
