//! Run report shape plus the human-readable renderings printed to stderr.

use serde::Serialize;

use fieldaudit_recon::insights::Insights;
use fieldaudit_recon::normalize::{NormalizeStats, NormalizedBatch};
use fieldaudit_recon::store::UploadReport;
use fieldaudit_recon::{Metrics, RecordKind};

/// Regions / alerts listed in the human summary before truncating.
const SUMMARY_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct AuditMeta {
    pub name: String,
    pub engine_version: String,
    pub run_at: String,
    /// Store revision the metrics were computed from.
    pub revision: u64,
}

#[derive(Debug, Serialize)]
pub struct IngestSummary {
    pub file: String,
    pub kind: RecordKind,
    pub stats: NormalizeStats,
    pub upload: UploadReport,
}

#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub meta: AuditMeta,
    pub ingest: Vec<IngestSummary>,
    pub metrics: Metrics,
    pub insights: Insights,
}

pub fn print_stats(source: &str, kind: RecordKind, stats: &NormalizeStats) {
    eprintln!(
        "{source}: {kind} — kept {} of {} rows ({} malformed, {} without id)",
        stats.kept, stats.data_rows, stats.malformed, stats.missing_key
    );
}

/// One tab-separated line per record on stdout.
pub fn print_batch(batch: &NormalizedBatch) {
    match batch {
        NormalizedBatch::Route(visits) => {
            for v in visits {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    v.employee_id,
                    v.employee_name.as_deref().unwrap_or("-"),
                    v.region(),
                    v.shop_name.as_deref().unwrap_or("-"),
                    v.date.as_deref().unwrap_or("-"),
                    if v.checked { "checked" } else { "missed" },
                );
            }
        }
        NormalizedBatch::Roster(entries) => {
            for e in entries {
                println!(
                    "{}\t{}\t{}\t{}",
                    e.employee_code,
                    e.employee_name.as_deref().unwrap_or("-"),
                    e.title,
                    e.governorate_name.as_deref().unwrap_or("-"),
                );
            }
        }
    }
}

pub fn print_summary(report: &AuditReport) {
    for ingest in &report.ingest {
        print_stats(&ingest.file, ingest.kind, &ingest.stats);
        if !ingest.upload.is_complete() {
            eprintln!(
                "  stored {} of {} ({} failed)",
                ingest.upload.written, ingest.upload.attempted, ingest.upload.failed
            );
        }
    }

    let m = &report.metrics;
    eprintln!(
        "audit '{}': {} visits — {} completed, {} missed, {}% compliance",
        report.meta.name, m.total_visits, m.completed_visits, m.missed_visits, m.compliance_rate_percent
    );
    eprintln!(
        "staff: {} active, {} expected, {} with zero visits",
        m.active_staff_count,
        m.expected_staff_count,
        m.unreported_coverage_count
    );

    for region in m.regions.iter().take(SUMMARY_LIMIT) {
        eprintln!(
            "  {:<24} {:>5} visits {:>4}%",
            region.name, region.visits, region.compliance_percent
        );
    }

    if m.fraud_alerts.is_empty() {
        eprintln!("no alerts");
        return;
    }
    eprintln!("{} alert(s):", m.fraud_alerts.len());
    for alert in m.fraud_alerts.iter().take(SUMMARY_LIMIT) {
        eprintln!(
            "  [{}] {} ({}) @ {}: {}",
            alert.kind, alert.employee_name, alert.employee_id, alert.location, alert.details
        );
    }
    if m.fraud_alerts.len() > SUMMARY_LIMIT {
        eprintln!("  ... {} more", m.fraud_alerts.len() - SUMMARY_LIMIT);
    }
}
