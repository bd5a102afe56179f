use std::time::Duration;

use chrono::SecondsFormat;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::{
    api::{
        alarms::AlarmStatus,
        measurements::{
            CurrentMeasurements,
            GROUPED_METRICS,
            GroupedHistoryRecord,
            HistoryResolution,
        },
        settings::CollectionSettings,
    },
    core::interval::Interval,
    prelude::*,
};

/// PV3 backend HTTP client.
pub struct Client {
    inner: reqwest::Client,
    base_url: Url,
    device_id: String,
}

impl Client {
    #[instrument(skip_all, fields(base_url = %base_url, device_id = %device_id))]
    pub fn new(base_url: Url, device_id: String) -> Result<Self> {
        let inner = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { inner, base_url, device_id })
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::msg(format!("`{}` cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn device_url(&self, suffix: &[&str]) -> Result<Url> {
        let prefix = ["api", "devices", self.device_id.as_str()];
        self.url(prefix.into_iter().chain(suffix.iter().copied()))
    }

    async fn fetch<R: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<R> {
        let response = request.send().await.context("failed to send the request")?;
        let url = response.url().clone();
        response
            .error_for_status()
            .with_context(|| format!("`{url}` responded with an error"))?
            .json()
            .await
            .with_context(|| format!("failed to deserialize the response from `{url}`"))
    }

    #[instrument(skip_all, fields(device_id = %self.device_id))]
    pub async fn get_current(&self) -> Result<CurrentMeasurements> {
        let url = self.device_url(&["current"])?;
        let measurements: CurrentMeasurements = self.fetch(self.inner.get(url)).await?;
        debug!(
            soc = ?measurements.soc,
            soh = ?measurements.soh,
            grid_power = ?measurements.grid_power,
            grid_frequency = ?measurements.grid_frequency,
            "fetched",
        );
        Ok(measurements)
    }

    #[instrument(skip_all, fields(device_id = %self.device_id, ?interval, %resolution))]
    pub async fn get_grouped_history(
        &self,
        interval: Interval,
        resolution: HistoryResolution,
    ) -> Result<Vec<GroupedHistoryRecord>> {
        let url = self.device_url(&["history", "grouped"])?;
        let request = self.inner.get(url).query(&[
            ("metrics", GROUPED_METRICS.join(",")),
            ("start", interval.start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("end", interval.end.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("resolution", resolution.to_string()),
        ]);
        let records: Vec<GroupedHistoryRecord> = self.fetch(request).await?;
        info!(n_records = records.len(), "fetched");
        Ok(records)
    }

    #[instrument(skip_all, fields(device_id = %self.device_id))]
    pub async fn get_alarms(&self) -> Result<AlarmStatus> {
        let url = self.device_url(&["alarms"])?;
        self.fetch(self.inner.get(url)).await
    }

    #[instrument(skip_all)]
    pub async fn get_collection_settings(&self) -> Result<CollectionSettings> {
        let url = self.url(["api", "settings", "collection"])?;
        self.fetch(self.inner.get(url)).await
    }

    #[instrument(skip_all, fields(mode = ?settings.collection_mode))]
    pub async fn put_collection_settings(
        &self,
        settings: &CollectionSettings,
    ) -> Result<CollectionSettings> {
        let url = self.url(["api", "settings", "collection"])?;
        let settings = self.fetch(self.inner.put(url).json(settings)).await?;
        info!("updated");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_url_ok() -> Result {
        let client = Client::new(Url::parse("http://192.168.1.6:8800")?, "PV001001DEV".into())?;
        assert_eq!(
            client.device_url(&["history", "grouped"])?.as_str(),
            "http://192.168.1.6:8800/api/devices/PV001001DEV/history/grouped",
        );
        Ok(())
    }

    #[test]
    fn url_with_prefix_ok() -> Result {
        let client = Client::new(Url::parse("https://example.com/pv3/")?, "PV001001DEV".into())?;
        assert_eq!(
            client.url(["api", "settings", "collection"])?.as_str(),
            "https://example.com/pv3/api/settings/collection",
        );
        Ok(())
    }
}
