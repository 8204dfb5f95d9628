//! Timeslot Model

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Timeslot entity (每日固定的用餐开始时间)
///
/// `start_time` 精确到分钟，序列化为 `HH:MM`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeslot {
    pub id: i64,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create timeslot payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeslotCreate {
    /// `HH:MM` or `HH:MM:SS`
    pub start_time: String,
    pub is_active: Option<bool>,
}

/// Update timeslot payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeslotUpdate {
    pub start_time: Option<String>,
    pub is_active: Option<bool>,
}

/// Timeslot reference embedded in reservation views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeslotSummary {
    pub id: i64,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
}

impl From<&Timeslot> for TimeslotSummary {
    fn from(slot: &Timeslot) -> Self {
        Self {
            id: slot.id,
            start_time: slot.start_time,
        }
    }
}

/// Parse a time of day, accepting `HH:MM` and `HH:MM:SS`; seconds are dropped.
pub fn parse_start_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    let parsed = NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()?;
    parsed.with_second(0)
}

/// `HH:MM` serde adapter for [`NaiveTime`]
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_start_time(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day: {raw}")))
    }
}
