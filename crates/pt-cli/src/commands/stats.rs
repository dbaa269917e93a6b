//! Stats command for showing today's statistics.

use std::io::Write;

use anyhow::{Context, Result};
use pt_api::{Client, DailyStats};

pub async fn run<W: Write>(writer: &mut W, client: &Client, json: bool) -> Result<()> {
    let stats = client
        .stats()
        .await
        .with_context(|| format!("failed to fetch statistics from {}", client.base_url()))?;
    write_stats(writer, &stats, json)
}

fn write_stats<W: Write>(writer: &mut W, stats: &DailyStats, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *writer, stats)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Statistics for {}", stats.today_date)?;
    writeln!(writer, "Products:           {}", stats.total_products)?;
    writeln!(writer, "Average duration:   {:.2}s", stats.average_duration)?;
    writeln!(writer, "Within optimal:     {}", stats.optimal_time_count)?;
    writeln!(writer, "Over optimal:       {}", stats.over_time_count)?;
    if stats.total_products > 0 {
        writeln!(
            writer,
            "On-time rate:       {:.1}%",
            percentage(stats.optimal_time_count, stats.total_products)
        )?;
    }
    Ok(())
}

#[expect(
    clippy::cast_precision_loss,
    reason = "record counts are far below 2^52"
)]
fn percentage(part: u64, total: u64) -> f64 {
    part as f64 * 100.0 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use insta::assert_snapshot;

    fn sample() -> DailyStats {
        DailyStats {
            total_products: 8,
            average_duration: 121.376,
            optimal_time_count: 6,
            over_time_count: 2,
            today_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        }
    }

    fn render(stats: &DailyStats, json: bool) -> String {
        let mut output = Vec::new();
        write_stats(&mut output, stats, json).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn stats_text_output() {
        assert_snapshot!(render(&sample(), false), @r"
        Statistics for 2025-03-10
        Products:           8
        Average duration:   121.38s
        Within optimal:     6
        Over optimal:       2
        On-time rate:       75.0%
        ");
    }

    #[test]
    fn stats_text_output_without_products_skips_rate() {
        let stats = DailyStats {
            total_products: 0,
            average_duration: 0.0,
            optimal_time_count: 0,
            over_time_count: 0,
            ..sample()
        };
        let output = render(&stats, false);
        assert!(output.contains("Products:           0"));
        assert!(!output.contains("On-time rate"));
    }

    #[test]
    fn stats_json_output_uses_service_field_names() {
        let output = render(&sample(), true);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["totalProducts"], 8);
        assert_eq!(value["overTimeCount"], 2);
        assert_eq!(value["todayDate"], "2025-03-10");
    }
}
