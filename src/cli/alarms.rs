use clap::Parser;

use crate::{cli::backend::BackendArgs, prelude::*, tables::build_alarms_table};

#[derive(Parser)]
pub struct AlarmsArgs {
    #[clap(flatten)]
    backend: BackendArgs,
}

impl AlarmsArgs {
    pub async fn run(self) -> Result {
        let status = self.backend.client()?.get_alarms().await?;
        if status.active_count == 0 {
            info!("no active alarms");
        } else {
            let active_alarms = status
                .all_alarms
                .iter()
                .filter(|(_, active)| **active)
                .map(|(name, _)| name)
                .collect::<Vec<_>>();
            warn!(status.active_count, ?active_alarms, "active alarms");
        }
        println!("{}", build_alarms_table(&status));
        Ok(())
    }
}
