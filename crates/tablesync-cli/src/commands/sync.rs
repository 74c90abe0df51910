use tablesync_core::sync::PartitionReport;
use tablesync_core::SyncReport;

use crate::commands::common::App;
use crate::error::CliError;

pub async fn run_sync(app: &App, as_json: bool) -> Result<(), CliError> {
    if app.offline {
        println!("Offline: nothing was sent");
        return Ok(());
    }

    let report = app.synchronizer()?.run().await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for line in format_sync_report(&report) {
        println!("{line}");
    }
    Ok(())
}

pub fn format_sync_report(report: &SyncReport) -> Vec<String> {
    let unreadable = report
        .unreadable
        .iter()
        .map(|partition| format!("Could not read {partition}; its entries were not sent"));
    if report.reviews.attempted + report.favorites.attempted == 0 {
        let lines = unreadable.collect::<Vec<_>>();
        if lines.is_empty() {
            return vec!["Nothing to sync".to_string()];
        }
        return lines;
    }

    let mut lines = vec![
        format_partition("Reviews", &report.reviews),
        format_partition("Favorites", &report.favorites),
    ];
    lines.extend(unreadable);
    if report.is_complete() {
        lines.push("Sync completed".to_string());
    } else if report.remaining() > 0 {
        lines.push(format!(
            "{} entries are still queued; they will be retried on the next sync",
            report.remaining()
        ));
    }
    lines
}

fn format_partition(label: &str, report: &PartitionReport) -> String {
    format!(
        "{label:<10} {} sent, {} failed",
        report.confirmed, report.failed
    )
}
