use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};

/// Where the history comes from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollectionMode {
    /// Snapshots captured into the local store.
    Browser,

    /// History collected by the backend itself.
    Server,
}

/// Backend collection settings.
#[serde_as]
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionSettings {
    pub collection_mode: CollectionMode,

    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "collection_interval_seconds")]
    pub collection_interval: Duration,

    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub device_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn collection_settings_ok() -> Result {
        // language=json
        let body = r#"{
            "collection_mode": "server",
            "collection_interval_seconds": 5,
            "mqtt_host": "192.168.1.215",
            "mqtt_port": 1883,
            "device_id": "PV001001DEV"
        }"#;
        let settings = serde_json::from_str::<CollectionSettings>(body)?;
        assert_eq!(settings.collection_mode, CollectionMode::Server);
        assert_eq!(settings.collection_interval, Duration::from_secs(5));

        let value = serde_json::to_value(&settings)?;
        assert_eq!(value["collection_mode"], "server");
        assert_eq!(value["collection_interval_seconds"], 5);
        Ok(())
    }
}
