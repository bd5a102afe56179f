mod alarms;
mod backend;
mod capture;
mod db;
mod export;
mod history;
mod hourly;
mod prune;
mod range;
mod settings;
mod storage;
mod summary;
mod tariff;
mod watch;

use clap::{Parser, Subcommand};

use crate::{
    cli::{
        alarms::AlarmsArgs,
        capture::CaptureArgs,
        export::ExportArgs,
        hourly::HourlyArgs,
        prune::PruneArgs,
        settings::SettingsArgs,
        storage::StorageArgs,
        summary::SummaryArgs,
        watch::WatchArgs,
    },
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Periodically capture the current measurements into the local store.
    #[clap(name = "capture")]
    Capture(CaptureArgs),

    /// Energy and cost summary of a time range.
    #[clap(name = "summary")]
    Summary(SummaryArgs),

    /// Export a time range as CSV.
    #[clap(name = "export")]
    Export(ExportArgs),

    /// Show the hourly aggregates of a time range.
    #[clap(name = "hourly")]
    Hourly(HourlyArgs),

    /// Show the local store usage.
    #[clap(name = "storage")]
    Storage(StorageArgs),

    /// Delete the snapshots and aggregates beyond the retention periods.
    #[clap(name = "prune")]
    Prune(PruneArgs),

    /// Show the device alarms.
    #[clap(name = "alarms")]
    Alarms(AlarmsArgs),

    /// Print the push channel events.
    #[clap(name = "watch")]
    Watch(WatchArgs),

    /// Show or update the backend collection settings.
    #[clap(name = "settings")]
    Settings(SettingsArgs),
}

impl Command {
    pub async fn run(self) -> Result {
        match self {
            Self::Capture(args) => args.run().await,
            Self::Summary(args) => args.run().await,
            Self::Export(args) => args.run().await,
            Self::Hourly(args) => args.run(),
            Self::Storage(args) => args.run(),
            Self::Prune(args) => args.run(),
            Self::Alarms(args) => args.run().await,
            Self::Watch(args) => args.run().await,
            Self::Settings(args) => args.run().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_args() {
        Args::command().debug_assert();
    }
}
