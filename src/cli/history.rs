use chrono::Utc;
use clap::Parser;

use crate::{
    api::{backend, settings::CollectionMode},
    cli::{backend::BackendArgs, db::DbArgs, range::RangeArgs},
    core::{interval::Interval, snapshot::Snapshot},
    db::{
        Store,
        export::{export_range, to_csv},
    },
    prelude::*,
};

/// Where and which history to load.
#[derive(Parser)]
pub struct HistoryArgs {
    /// History source. Defaults to the backend collection mode.
    #[clap(long = "mode", env = "COLLECTION_MODE", value_enum)]
    mode: Option<CollectionMode>,

    #[clap(flatten)]
    pub range: RangeArgs,

    #[clap(flatten)]
    db: DbArgs,

    #[clap(flatten)]
    backend: BackendArgs,
}

/// Loaded history of the requested range.
pub struct History {
    pub interval: Interval,
    pub mode: CollectionMode,

    /// Ascending by timestamp.
    pub snapshots: Vec<Snapshot>,
}

impl HistoryArgs {
    #[instrument(skip_all, fields(range = ?self.range.range))]
    pub async fn load(&self) -> Result<History> {
        let interval = self.range.interval(Utc::now())?;
        let client = self.backend.client()?;
        let mode = self.resolve_mode(&client).await;
        let mut snapshots = match mode {
            CollectionMode::Browser => self.db.open()?.query(interval)?,
            CollectionMode::Server => self.fetch_server(&client, interval).await?,
        };
        Snapshot::sort(&mut snapshots);
        info!(?mode, n_snapshots = snapshots.len(), "loaded");
        Ok(History { interval, mode, snapshots })
    }

    /// Export the range as CSV from whichever source is active.
    #[instrument(skip_all, fields(range = ?self.range.range))]
    pub async fn export(&self) -> Result<String> {
        let interval = self.range.interval(Utc::now())?;
        let client = self.backend.client()?;
        match self.resolve_mode(&client).await {
            CollectionMode::Browser => export_range(&self.db.open()?, interval),
            CollectionMode::Server => {
                let mut snapshots = self.fetch_server(&client, interval).await?;
                Snapshot::sort(&mut snapshots);
                to_csv(&snapshots)
            }
        }
    }

    async fn fetch_server(
        &self,
        client: &backend::Client,
        interval: Interval,
    ) -> Result<Vec<Snapshot>> {
        let records = client.get_grouped_history(interval, self.range.resolution()).await?;
        // Grouped buckets may start before the requested range.
        Ok(records
            .into_iter()
            .map(Snapshot::from)
            .filter(|snapshot| interval.contains(snapshot.timestamp))
            .collect())
    }

    async fn resolve_mode(&self, client: &backend::Client) -> CollectionMode {
        if let Some(mode) = self.mode {
            return mode;
        }
        match client.get_collection_settings().await {
            Ok(settings) => settings.collection_mode,
            Err(error) => {
                warn!("failed to fetch the collection mode, using the local store: {error:#}");
                CollectionMode::Browser
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn explicit_mode_wins() -> Result {
        let args = HistoryArgs::try_parse_from(["pv3-monitor", "--mode", "server"])?;
        let client = args.backend.client()?;
        assert_eq!(args.resolve_mode(&client).await, CollectionMode::Server);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_backend_falls_back_to_local_store() -> Result {
        let args = HistoryArgs::try_parse_from(["pv3-monitor", "--api-url", "http://127.0.0.1:9"])?;
        let client = args.backend.client()?;
        assert_eq!(args.resolve_mode(&client).await, CollectionMode::Browser);
        Ok(())
    }
}
