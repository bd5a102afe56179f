use std::{fs, path::PathBuf};

use clap::Parser;

use crate::{cli::history::HistoryArgs, prelude::*};

#[derive(Parser)]
pub struct ExportArgs {
    #[clap(flatten)]
    history: HistoryArgs,

    /// Write the CSV into the file instead of the standard output.
    #[clap(long, short = 'o', env = "EXPORT_OUTPUT")]
    output: Option<PathBuf>,
}

impl ExportArgs {
    pub async fn run(self) -> Result {
        let text = self.history.export().await?;
        match self.output {
            Some(path) => {
                fs::write(&path, text)
                    .with_context(|| format!("failed to write `{}`", path.display()))?;
                info!(path = %path.display(), "exported");
            }
            None => print!("{text}"),
        }
        Ok(())
    }
}
