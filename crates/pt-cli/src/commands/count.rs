//! Count command for showing the number of stored records.

use std::io::Write;

use anyhow::{Context, Result};
use pt_api::Client;

pub async fn run<W: Write>(writer: &mut W, client: &Client) -> Result<()> {
    let total = client
        .count()
        .await
        .with_context(|| format!("failed to fetch record count from {}", client.base_url()))?;
    writeln!(writer, "Total records: {total}")?;
    Ok(())
}
