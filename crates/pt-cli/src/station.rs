//! Interactive scan station.
//!
//! Reads decoded barcodes line by line, drives a [`SessionTracker`], refreshes
//! the elapsed display on every ticker message and hands completed records to
//! a [`RecordSink`].
//!
//! Submission is fire-and-forget: the tracker transition is complete before a
//! record reaches the sink, and a failed submission is only logged.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use pt_api::Client;
use pt_core::{Clock, CompletedRecord, OptimalThreshold, SessionTracker, ValidationError};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;

use crate::ticker::{ElapsedTicker, Tick};

/// Destination for completed records.
pub trait RecordSink {
    /// Accepts a record without waiting for it to be persisted.
    fn submit(&mut self, record: CompletedRecord);
}

/// Submits records to the record service in background tasks.
#[derive(Debug)]
pub struct ApiSink {
    client: Client,
    in_flight: JoinSet<()>,
}

impl ApiSink {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            in_flight: JoinSet::new(),
        }
    }

    /// Waits up to `grace` for in-flight submissions, then abandons the rest.
    pub async fn drain(mut self, grace: Duration) {
        let pending = self.in_flight.len();
        if pending == 0 {
            return;
        }
        tracing::debug!(pending, "waiting for record submissions");
        let wait = async { while self.in_flight.join_next().await.is_some() {} };
        if tokio::time::timeout(grace, wait).await.is_err() {
            tracing::warn!(
                abandoned = self.in_flight.len(),
                "gave up waiting for record submissions"
            );
        }
    }
}

impl RecordSink for ApiSink {
    fn submit(&mut self, record: CompletedRecord) {
        // Reap finished submissions so the set does not grow for a long shift.
        while self.in_flight.try_join_next().is_some() {}

        let client = self.client.clone();
        self.in_flight.spawn(async move {
            match client.submit_record(&record).await {
                Ok(()) => tracing::debug!(barcode = %record.barcode, "record stored"),
                Err(err) => tracing::warn!(
                    barcode = %record.barcode,
                    duration_seconds = record.duration_seconds,
                    error = %err,
                    "failed to store record"
                ),
            }
        });
    }
}

/// Station behaviour switches.
#[derive(Debug, Clone, Copy)]
pub struct StationOptions {
    pub threshold: OptimalThreshold,
    /// How often the elapsed display refreshes.
    pub tick_period: Duration,
    /// Close and submit the active product when input ends.
    pub record_on_exit: bool,
}

impl Default for StationOptions {
    fn default() -> Self {
        Self {
            threshold: OptimalThreshold::default(),
            tick_period: Duration::from_secs(1),
            record_on_exit: false,
        }
    }
}

/// Counters reported when the station stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StationSummary {
    pub scans: u64,
    pub records: u64,
    pub rejected: u64,
}

/// Runs the station until `input` reaches end of file.
#[allow(clippy::future_not_send)] // callers may pass non-Send clocks and writers
pub async fn run_station<R, W, S, C>(
    input: R,
    output: &mut W,
    sink: &mut S,
    clock: &C,
    options: StationOptions,
) -> Result<StationSummary>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: RecordSink,
    C: Clock,
{
    let mut input = input;
    let mut line = Vec::new();
    let mut tracker = SessionTracker::new();
    let (mut ticker, mut ticks) = ElapsedTicker::new(options.tick_period);
    let mut summary = StationSummary::default();

    loop {
        tokio::select! {
            biased;

            // Partial reads stay in `line` if a tick wins the race.
            read = input.read_until(b'\n', &mut line) => {
                if read.context("failed to read scanner input")? == 0 {
                    break;
                }
                let now = clock.now();
                let scanned = std::str::from_utf8(&line)
                    .map_err(|_| ScanRejection::NotUtf8)
                    .and_then(|raw| tracker.scan(raw, now).map_err(ScanRejection::Invalid));
                line.clear();

                match scanned {
                    Ok(outcome) => {
                        if let Some(record) = outcome.previous_record {
                            writeln!(output, "{}", render_completed(&record, options.threshold))?;
                            sink.submit(record);
                            summary.records += 1;
                        }
                        writeln!(output, "Active barcode: {}", outcome.new_active_barcode)?;
                        if !ticker.is_running() {
                            ticker.start();
                        }
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "rejected scan");
                        writeln!(output, "Rejected scan: {err}")?;
                        summary.rejected += 1;
                    }
                }
            }

            Some(Tick) = ticks.recv() => {
                let elapsed = tracker.tick(clock.now());
                if let Some(barcode) = tracker.active_barcode() {
                    let status = options.threshold.classify(elapsed);
                    writeln!(output, "{barcode}: {elapsed}s elapsed ({status})")?;
                }
            }
        }
        output.flush()?;
    }

    ticker.cancel();

    if options.record_on_exit && tracker.is_tracking() {
        if let Some(record) = tracker.finish(clock.now()) {
            writeln!(output, "{}", render_completed(&record, options.threshold))?;
            sink.submit(record);
            summary.records += 1;
        }
    }

    summary.scans = tracker.scan_count();
    writeln!(output, "Scanned {} products", summary.scans)?;
    output.flush()?;

    Ok(summary)
}

/// Why a scanned line did not become a scan.
#[derive(Debug, Error)]
enum ScanRejection {
    #[error("scanner input is not valid UTF-8")]
    NotUtf8,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

fn render_completed(record: &CompletedRecord, threshold: OptimalThreshold) -> String {
    format!(
        "Completed {} in {}s ({})",
        record.barcode,
        record.duration_seconds,
        record.status(threshold)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use insta::assert_snapshot;
    use tokio::io::{AsyncWriteExt, BufReader};

    #[derive(Default)]
    struct CollectingSink(Vec<CompletedRecord>);

    impl RecordSink for CollectingSink {
        fn submit(&mut self, record: CompletedRecord) {
            self.0.push(record);
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
    }

    /// Returns the scripted offsets (in seconds from `t0`) in order.
    struct ScriptedClock(RefCell<VecDeque<i64>>);

    impl ScriptedClock {
        fn new(offsets: &[i64]) -> Self {
            Self(RefCell::new(offsets.iter().copied().collect()))
        }
    }

    impl Clock for ScriptedClock {
        fn now(&self) -> DateTime<Utc> {
            let offset = self.0.borrow_mut().pop_front().expect("clock script exhausted");
            t0() + ChronoDuration::seconds(offset)
        }
    }

    /// Follows tokio's (paused) clock from the moment it was created.
    struct RuntimeClock(tokio::time::Instant);

    impl Clock for RuntimeClock {
        fn now(&self) -> DateTime<Utc> {
            t0() + ChronoDuration::from_std(self.0.elapsed()).unwrap()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn scans_close_previous_products() {
        let input = BufReader::new(&b"A\nB\nC\n"[..]);
        let clock = ScriptedClock::new(&[0, 100, 250]);
        let mut sink = CollectingSink::default();
        let mut output = Vec::new();

        let summary = run_station(
            input,
            &mut output,
            &mut sink,
            &clock,
            StationOptions::default(),
        )
        .await
        .unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Active barcode: A
        Completed A in 100s (on_time)
        Active barcode: B
        Completed B in 150s (over_time)
        Active barcode: C
        Scanned 3 products
        ");
        assert_eq!(
            summary,
            StationSummary {
                scans: 3,
                records: 2,
                rejected: 0,
            }
        );
        let durations: Vec<_> = sink.0.iter().map(|r| r.duration_seconds).collect();
        assert_eq!(durations, vec![100, 150]);
        assert_eq!(sink.0[1].completed_at, t0() + ChronoDuration::seconds(250));
    }

    #[tokio::test(start_paused = true)]
    async fn blank_lines_are_rejected_without_closing_product() {
        let input = BufReader::new(&b"A\n\n   \nB\n"[..]);
        let clock = ScriptedClock::new(&[0, 10, 20, 30]);
        let mut sink = CollectingSink::default();
        let mut output = Vec::new();

        let summary = run_station(
            input,
            &mut output,
            &mut sink,
            &clock,
            StationOptions::default(),
        )
        .await
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("Rejected scan: barcode cannot be empty").count(), 2);
        assert_eq!(summary.rejected, 2);
        assert_eq!(sink.0.len(), 1);
        assert_eq!(sink.0[0].barcode.as_str(), "A");
        assert_eq!(sink.0[0].duration_seconds, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn garbled_bytes_are_rejected_and_station_keeps_running() {
        let input = BufReader::new(&b"A\n\xff\xfe\nB\n"[..]);
        let clock = ScriptedClock::new(&[0, 5, 40]);
        let mut sink = CollectingSink::default();
        let mut output = Vec::new();

        let summary = run_station(
            input,
            &mut output,
            &mut sink,
            &clock,
            StationOptions::default(),
        )
        .await
        .unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Active barcode: A
        Rejected scan: scanner input is not valid UTF-8
        Completed A in 40s (on_time)
        Active barcode: B
        Scanned 2 products
        ");
        assert_eq!(
            summary,
            StationSummary {
                scans: 2,
                records: 1,
                rejected: 1,
            }
        );
        assert_eq!(sink.0[0].barcode.as_str(), "A");
    }

    #[tokio::test(start_paused = true)]
    async fn record_on_exit_closes_last_product() {
        let input = BufReader::new(&b"A\nB\n"[..]);
        let clock = ScriptedClock::new(&[0, 50, 160]);
        let mut sink = CollectingSink::default();
        let mut output = Vec::new();
        let options = StationOptions {
            record_on_exit: true,
            ..StationOptions::default()
        };

        let summary = run_station(input, &mut output, &mut sink, &clock, options)
            .await
            .unwrap();

        assert_eq!(summary.records, 2);
        assert_eq!(sink.0[1].barcode.as_str(), "B");
        assert_eq!(sink.0[1].duration_seconds, 110);
        assert!(
            String::from_utf8(output)
                .unwrap()
                .contains("Completed B in 110s (warning)")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_records_nothing() {
        let input = BufReader::new(&b""[..]);
        let clock = ScriptedClock::new(&[]);
        let mut sink = CollectingSink::default();
        let mut output = Vec::new();
        let options = StationOptions {
            record_on_exit: true,
            ..StationOptions::default()
        };

        let summary = run_station(input, &mut output, &mut sink, &clock, options)
            .await
            .unwrap();

        assert_eq!(summary, StationSummary::default());
        assert!(sink.0.is_empty());
        assert_eq!(String::from_utf8(output).unwrap(), "Scanned 0 products\n");
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_refresh_elapsed_display() {
        let (mut scanner, station_input) = tokio::io::duplex(64);
        let clock = RuntimeClock(tokio::time::Instant::now());
        let mut sink = CollectingSink::default();
        let mut output = Vec::new();
        let options = StationOptions {
            threshold: OptimalThreshold::new(2.0).unwrap(),
            ..StationOptions::default()
        };

        let station = run_station(
            BufReader::new(station_input),
            &mut output,
            &mut sink,
            &clock,
            options,
        );
        let operator = async {
            scanner.write_all(b"A\n").await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2_500)).await;
            scanner.write_all(b"B\n").await.unwrap();
            drop(scanner);
        };
        let (summary, ()) = tokio::join!(station, operator);
        summary.unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Active barcode: A
        A: 1s elapsed (on_time)
        A: 2s elapsed (over_time)
        Completed A in 2s (over_time)
        Active barcode: B
        Scanned 2 products
        ");
        assert_eq!(sink.0.len(), 1);
    }
}
