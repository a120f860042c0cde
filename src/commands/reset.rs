use anyhow::{Context, Result};
use icswatch_core::config::WatchConfig;
use icswatch_core::store::FileStore;
use owo_colors::OwoColorize;

pub fn run(cfg: &WatchConfig) -> Result<()> {
    let store = FileStore::new(cfg.state_path());

    let removed = store
        .clear()
        .with_context(|| format!("Failed to remove {}", store.path().display()))?;

    if removed {
        println!("Removed {}", store.path().display());
    } else {
        println!("{}", format!("No stored fingerprint at {}", store.path().display()).dimmed());
    }
    Ok(())
}
