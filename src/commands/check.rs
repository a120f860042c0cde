use anyhow::Result;
use icswatch_core::config::WatchConfig;
use icswatch_core::{CycleOutcome, Reporter};

use crate::render::ConsoleReporter;

pub async fn run(cfg: WatchConfig) -> Result<()> {
    let mut watcher = super::build_watcher(&cfg)?;

    match watcher.run_cycle().await {
        CycleOutcome::Failed(e) => Err(e.into()),
        outcome => {
            ConsoleReporter::new(cfg.max_events).report(&outcome);
            Ok(())
        }
    }
}
