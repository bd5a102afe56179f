use clap::Parser;

use crate::{
    cli::{history::HistoryArgs, tariff::TariffArgs},
    prelude::*,
    statistics::summary::summarize,
    tables::build_summary_table,
};

#[derive(Parser)]
pub struct SummaryArgs {
    #[clap(flatten)]
    history: HistoryArgs,

    #[clap(flatten)]
    tariff: TariffArgs,
}

impl SummaryArgs {
    pub async fn run(self) -> Result {
        let tariff = self.tariff.tariff(self.history.range.time_zone);
        let history = self.history.load().await?;
        match summarize(&history.snapshots, &tariff) {
            Some(summary) => {
                info!(n_snapshots = summary.n_snapshots, net = ?summary.costs.net, "summarized");
                println!("{}", build_summary_table(&summary, &tariff, history.mode));
            }
            None => {
                warn!(n_snapshots = history.snapshots.len(), "not enough data for a summary");
                println!("Not enough data for {:?}.", history.interval);
            }
        }
        Ok(())
    }
}
