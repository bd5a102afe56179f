use std::path::PathBuf;

use clap::Parser;

use crate::{db::Db, prelude::*};

#[derive(Parser)]
pub struct DbArgs {
    /// SQLite database file of the local store.
    #[clap(long = "db-path", env = "DB_PATH", default_value = "pv3-monitor.sqlite3")]
    path: PathBuf,
}

impl DbArgs {
    pub fn open(&self) -> Result<Db> {
        Db::open(&self.path)
    }
}
