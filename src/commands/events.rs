use std::path::Path;

use anyhow::{Context, Result};
use icswatch_core::ics::extract;
use owo_colors::OwoColorize;

use crate::render::render_events;

pub fn run(file: &Path, limit: Option<usize>) -> Result<()> {
    let payload = std::fs::read(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let document = extract(&payload)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    if let Some(name) = document.name() {
        println!("{}", name.bold());
    }

    let total = document.event_count();
    if total == 0 {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let limit = limit.unwrap_or(total);
    for line in render_events(document.events(), total, limit) {
        println!("{}", line);
    }

    let incomplete = document.events().filter(|e| !e.is_complete()).count();
    if incomplete > 0 {
        println!(
            "{}",
            format!("{} {} missing a title or time", incomplete, pluralize(incomplete)).yellow()
        );
    }

    Ok(())
}

fn pluralize(count: usize) -> &'static str {
    if count == 1 { "event is" } else { "events are" }
}
