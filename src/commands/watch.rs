use anyhow::Result;
use icswatch_core::config::WatchConfig;
use owo_colors::OwoColorize;
use tokio::sync::watch;

use crate::render::ConsoleReporter;

pub async fn run(cfg: WatchConfig) -> Result<()> {
    let mut watcher = super::build_watcher(&cfg)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received, stopping after the current cycle");
            shutdown_tx.send_replace(true);
        }
    });

    println!(
        "{} {}",
        "🔄 Watching".bold(),
        cfg.feed_url()?.as_str().dimmed()
    );

    let mut reporter = ConsoleReporter::new(cfg.max_events);
    watcher.run(shutdown_rx, &mut reporter).await;

    println!("{}", "Stopped.".dimmed());
    Ok(())
}
