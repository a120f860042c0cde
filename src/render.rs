//! Terminal rendering for feed events and cycle outcomes.
//!
//! Extension traits add colored output to icswatch-core types using owo_colors.

use std::time::Duration;

use icswatch_core::{CycleOutcome, EventRecord, EventTime, Reporter, StoreError};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for EventTime {
    fn render(&self) -> String {
        match self {
            EventTime::Date(d) => format!("{} {}", d.format("%Y-%m-%d"), "(all day)".dimmed()),
            other => other.to_string(),
        }
    }
}

/// Absent fields show as `(none)`.
fn render_time(time: Option<&EventTime>) -> String {
    match time {
        Some(t) => t.render(),
        None => "(none)".dimmed().to_string(),
    }
}

impl Render for EventRecord {
    fn render(&self) -> String {
        let title = match &self.title {
            Some(title) => title.bold().to_string(),
            None => "(no title)".dimmed().to_string(),
        };

        format!(
            "📌 {}\n   📅 {} → {}",
            title,
            render_time(self.start.as_ref()),
            render_time(self.end.as_ref())
        )
    }
}

/// Render up to `limit` events, noting how many were left out.
pub fn render_events(
    events: impl Iterator<Item = EventRecord>,
    total: usize,
    limit: usize,
) -> Vec<String> {
    let mut lines: Vec<String> = events.take(limit).map(|e| e.render()).collect();

    let hidden = total.saturating_sub(limit);
    if hidden > 0 {
        lines.push(
            format!("   … and {} more {}", hidden, pluralize("event", hidden))
                .dimmed()
                .to_string(),
        );
    }

    lines
}

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

fn store_warning(e: &StoreError) -> String {
    format!("⚠ Could not save fingerprint: {}", e)
        .yellow()
        .to_string()
}

/// Prints each cycle to stdout.
pub struct ConsoleReporter {
    max_events: usize,
}

impl ConsoleReporter {
    pub fn new(max_events: usize) -> Self {
        ConsoleReporter { max_events }
    }

    fn render_outcome(&self, outcome: &CycleOutcome) -> Vec<String> {
        match outcome {
            CycleOutcome::Unchanged { store_error } => {
                let mut lines = vec!["✅ No changes detected.".dimmed().to_string()];
                if let Some(e) = store_error {
                    lines.push(store_warning(e));
                }
                lines
            }
            CycleOutcome::Changed {
                calendar_name,
                events,
                store_error,
                ..
            } => {
                let mut lines = Vec::new();
                let heading = match calendar_name {
                    Some(name) => format!("📢 {} updated!", name),
                    None => "📢 Calendar updated!".to_string(),
                };
                lines.push(heading.green().bold().to_string());

                if events.is_empty() {
                    lines.push("   No events in feed".dimmed().to_string());
                } else {
                    lines.extend(render_events(
                        events.iter().cloned(),
                        events.len(),
                        self.max_events,
                    ));
                }

                if let Some(e) = store_error {
                    lines.push(store_warning(e));
                }
                lines
            }
            CycleOutcome::Failed(e) => {
                vec![format!("❌ Error ({}): {}", e.stage(), e).red().to_string()]
            }
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, outcome: &CycleOutcome) {
        for line in self.render_outcome(outcome) {
            println!("{}", line);
        }
    }

    fn waiting(&mut self, interval: Duration) {
        println!(
            "{}\n",
            format!("⏳ Waiting {}...", humantime::format_duration(interval)).dimmed()
        );
    }
}
