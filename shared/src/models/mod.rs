//! Data models
//!
//! Shared between the booking service and its web client (via API).
//! All IDs are `i64`; timestamps are UTC milliseconds.

pub mod availability;
pub mod reservation;
pub mod restaurant;
pub mod timeslot;
pub mod user;

// Re-exports
pub use availability::*;
pub use reservation::*;
pub use restaurant::*;
pub use timeslot::{
    Timeslot, TimeslotCreate, TimeslotSummary, TimeslotUpdate, parse_start_time,
};
pub use user::*;
