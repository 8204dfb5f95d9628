//! Restaurant Config Model

use serde::{Deserialize, Serialize};

/// Restaurant configuration (单例记录)
///
/// `total_capacity` 是每个 (日期, 时段) 的座位上限。
/// `version` 每次运营方修改时递增。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantConfig {
    pub total_capacity: u32,
    pub restaurant_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub description: Option<String>,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Update restaurant config payload
///
/// When no configuration exists yet, `total_capacity` and `restaurant_name` are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantConfigUpdate {
    pub total_capacity: Option<u32>,
    pub restaurant_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
}
