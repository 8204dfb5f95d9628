//! Availability Model (projection, never stored)

use super::timeslot::hhmm;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Remaining seats of one timeslot on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub id: i64,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub total_places: u32,
    pub available_places: u32,
}

/// One day of the rolling availability window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityDay {
    /// `YYYY-MM-DD`
    pub date: NaiveDate,
    /// `DD/MM/YYYY`
    pub display_date: String,
    pub day_name: String,
    pub timeslots: Vec<SlotAvailability>,
}
