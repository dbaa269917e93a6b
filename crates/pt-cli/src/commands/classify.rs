//! Classify command for rating a single duration.

use std::io::Write;

use anyhow::Result;
use pt_core::OptimalThreshold;

pub fn run<W: Write>(writer: &mut W, elapsed: u64, threshold: OptimalThreshold) -> Result<()> {
    let status = threshold.classify(elapsed);
    writeln!(
        writer,
        "{elapsed}s is {status} (optimal {threshold}, warning from {}s)",
        threshold.warning_seconds()
    )?;
    Ok(())
}
