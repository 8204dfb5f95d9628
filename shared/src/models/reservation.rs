//! Reservation Model

use super::timeslot::TimeslotSummary;
use super::user::UserSummary;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reservation entity
///
/// 只有 `is_cancelled == false` 的预订占用容量。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub timeslot_id: i64,
    /// `YYYY-MM-DD`
    pub reservation_date: NaiveDate,
    pub number_of_guests: u32,
    #[serde(default)]
    pub is_cancelled: bool,
    pub created_at: i64,
    pub updated_at: i64,
    /// 预订时的联系人快照
    pub user: UserSummary,
}

impl Reservation {
    #[inline]
    pub fn is_live(&self) -> bool {
        !self.is_cancelled
    }
}

/// Reservation joined with its timeslot (API response shape)
///
/// `timeslot` is `null` only for cancelled history whose timeslot was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationView {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub timeslot: Option<TimeslotSummary>,
}

/// Booking request payload
///
/// All fields are optional at the wire level so that a missing field
/// yields a validation error instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    pub timeslot_id: Option<i64>,
    pub reservation_date: Option<String>,
    pub number_of_guests: Option<i64>,
}

/// Response of the administrative hard delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedReservation {
    pub message: String,
    pub deleted_reservation: ReservationView,
}
