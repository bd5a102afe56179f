use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct AlarmStatus {
    pub device_id: String,
    pub active_count: u32,

    /// Every known alarm and whether it is active, sorted by name.
    pub all_alarms: BTreeMap<String, bool>,

    pub updated_at: DateTime<Utc>,
}
