use std::path::Path;

use anyhow::{Context, Result};
use icswatch_core::fingerprint;

pub fn run(file: &Path) -> Result<()> {
    let payload = std::fs::read(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    println!("{}  {}", fingerprint(&payload), file.display());
    Ok(())
}
