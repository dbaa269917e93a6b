//! Scan command: runs the station on stdin.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use pt_api::Client;
use pt_core::SystemClock;
use tokio::io::{AsyncBufRead, BufReader};

use crate::Config;
use crate::station::{ApiSink, StationOptions, StationSummary, run_station};

/// How long to wait for outstanding record submissions after input ends.
const SUBMIT_GRACE: Duration = Duration::from_secs(5);

pub async fn run(config: &Config, record_on_exit: bool) -> Result<()> {
    let threshold = config
        .threshold()
        .context("invalid optimal_seconds in configuration")?;
    let client = config.client().context("failed to create record client")?;
    tracing::debug!(api_url = client.base_url(), %threshold, "starting scan station");

    let options = StationOptions {
        threshold,
        record_on_exit,
        ..StationOptions::default()
    };
    let input = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let summary = serve(input, &mut stdout, client, options).await?;
    tracing::debug!(?summary, "scan station stopped");
    Ok(())
}

/// Runs the station against the record service.
///
/// Submissions already handed off get their grace period even when the
/// station stops on an error.
async fn serve<R, W>(
    input: R,
    output: &mut W,
    client: Client,
    options: StationOptions,
) -> Result<StationSummary>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut sink = ApiSink::new(client);
    let result = run_station(input, output, &mut sink, &SystemClock, options).await;
    sink.drain(SUBMIT_GRACE).await;
    result
}
