use chrono::Utc;
use clap::Parser;

use crate::{
    cli::{db::DbArgs, range::RangeArgs, tariff::TariffArgs},
    prelude::*,
    tables::build_hourly_table,
};

#[derive(Parser)]
pub struct HourlyArgs {
    #[clap(flatten)]
    range: RangeArgs,

    #[clap(flatten)]
    db: DbArgs,

    #[clap(flatten)]
    tariff: TariffArgs,
}

impl HourlyArgs {
    pub fn run(&self) -> Result {
        let interval = self.range.interval(Utc::now())?;
        let aggregates = self.db.open()?.query_hourly(interval)?;
        info!(n_aggregates = aggregates.len(), "fetched");
        println!("{}", build_hourly_table(&aggregates, &self.tariff.tariff(self.range.time_zone)));
        Ok(())
    }
}
