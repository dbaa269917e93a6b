//! Recreate command for rewriting the record service's storage.

use std::io::Write;

use anyhow::{Context, Result};
use pt_api::Client;

pub async fn run<W: Write>(writer: &mut W, client: &Client) -> Result<()> {
    client
        .recreate()
        .await
        .context("record service failed to recreate its storage")?;
    tracing::info!(api_url = client.base_url(), "record storage recreated");
    writeln!(writer, "Record storage recreated.")?;
    Ok(())
}
