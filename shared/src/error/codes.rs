//! Unified error codes for the booking service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Reservation errors
//! - 5xxx: Catalog errors (timeslots, restaurant config, users)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the web client can
/// switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 4xxx: Reservation ====================
    /// Reservation not found
    ReservationNotFound = 4001,
    /// Not enough seats left in the requested slot
    CapacityExceeded = 4002,
    /// User already holds a live reservation for this slot
    DuplicateBooking = 4003,
    /// Reservation date is in the past
    PastDate = 4004,

    // ==================== 5xxx: Catalog ====================
    /// Timeslot not found
    TimeslotNotFound = 5001,
    /// Timeslot exists but is not bookable
    TimeslotInactive = 5002,
    /// Timeslot still has live reservations
    TimeslotInUse = 5003,
    /// Another timeslot already starts at this time
    TimeslotTimeExists = 5004,
    /// Restaurant configuration has not been set up
    ConfigMissing = 5101,
    /// No active timeslot is configured
    NoActiveTimeslots = 5102,
    /// User not known to the directory
    UserNotFound = 5201,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Storage contended or temporarily failing, retry the request
    StoreBusy = 9404,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Whether the client may retry the same request unchanged
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::StoreBusy)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Invalid token",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Admin role required",

            // Reservation
            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::CapacityExceeded => "Not enough places available",
            ErrorCode::DuplicateBooking => {
                "You already have a reservation for this timeslot on this date"
            }
            ErrorCode::PastDate => "Reservation date is in the past",

            // Catalog
            ErrorCode::TimeslotNotFound => "Timeslot not found",
            ErrorCode::TimeslotInactive => "Timeslot is not available",
            ErrorCode::TimeslotInUse => "Timeslot has active reservations",
            ErrorCode::TimeslotTimeExists => "A timeslot already starts at this time",
            ErrorCode::ConfigMissing => "Restaurant configuration not found",
            ErrorCode::NoActiveTimeslots => "No active timeslot configured",
            ErrorCode::UserNotFound => "User not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::StoreBusy => "Storage busy, please retry",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            // Reservation
            4001 => Ok(ErrorCode::ReservationNotFound),
            4002 => Ok(ErrorCode::CapacityExceeded),
            4003 => Ok(ErrorCode::DuplicateBooking),
            4004 => Ok(ErrorCode::PastDate),

            // Catalog
            5001 => Ok(ErrorCode::TimeslotNotFound),
            5002 => Ok(ErrorCode::TimeslotInactive),
            5003 => Ok(ErrorCode::TimeslotInUse),
            5004 => Ok(ErrorCode::TimeslotTimeExists),
            5101 => Ok(ErrorCode::ConfigMissing),
            5102 => Ok(ErrorCode::NoActiveTimeslots),
            5201 => Ok(ErrorCode::UserNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9404 => Ok(ErrorCode::StoreBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::AdminRequired.code(), 2003);
        assert_eq!(ErrorCode::CapacityExceeded.code(), 4002);
        assert_eq!(ErrorCode::DuplicateBooking.code(), 4003);
        assert_eq!(ErrorCode::TimeslotNotFound.code(), 5001);
        assert_eq!(ErrorCode::ConfigMissing.code(), 5101);
        assert_eq!(ErrorCode::StoreBusy.code(), 9404);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1003), Ok(ErrorCode::TokenExpired));
        assert_eq!(ErrorCode::try_from(4001), Ok(ErrorCode::ReservationNotFound));
        assert_eq!(ErrorCode::try_from(5102), Ok(ErrorCode::NoActiveTimeslots));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
        assert_eq!(ErrorCode::try_from(1002), Err(InvalidErrorCode(1002)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::CapacityExceeded).unwrap();
        assert_eq!(json, "4002");

        let json = serde_json::to_string(&ErrorCode::Success).unwrap();
        assert_eq!(json, "0");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("4003").unwrap();
        assert_eq!(code, ErrorCode::DuplicateBooking);

        let result: Result<ErrorCode, _> = serde_json::from_str("4999");
        assert!(result.is_err());
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::StoreBusy.is_retryable());
        assert!(!ErrorCode::CapacityExceeded.is_retryable());
        assert!(!ErrorCode::InternalError.is_retryable());
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(
            ErrorCode::ReservationNotFound.message(),
            "Reservation not found"
        );
        assert_eq!(
            ErrorCode::ConfigMissing.message(),
            "Restaurant configuration not found"
        );
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }
}
