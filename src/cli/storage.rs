use clap::Parser;

use crate::{cli::db::DbArgs, db::Store, prelude::*, tables::build_storage_table};

#[derive(Parser)]
pub struct StorageArgs {
    #[clap(flatten)]
    db: DbArgs,
}

impl StorageArgs {
    pub fn run(&self) -> Result {
        let db = self.db.open()?;
        let n_bytes = db.estimate_storage_bytes();
        let n_snapshots = db.count_measurements()?;
        let n_aggregates = db.count_hourly()?;
        let last_timestamp = db.last_timestamp()?;
        println!("{}", build_storage_table(n_bytes, n_snapshots, n_aggregates, last_timestamp));
        Ok(())
    }
}
