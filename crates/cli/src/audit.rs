//! `fieldaudit normalize | reconcile | run | validate`.

use std::path::{Path, PathBuf};

use fieldaudit_recon::insights::summarize;
use fieldaudit_recon::normalize::normalize_with;
use fieldaudit_recon::store::{upload_batch, MemoryStore};
use fieldaudit_recon::{AuditConfig, NormalizeOptions, RecordKind};

use crate::exit_codes::{
    EXIT_AUDIT_ALERTS, EXIT_AUDIT_INVALID_CONFIG, EXIT_AUDIT_PARTIAL_UPLOAD, EXIT_AUDIT_RUNTIME,
};
use crate::report::{self, AuditMeta, AuditReport, IngestSummary};
use crate::CliError;

const DEFAULT_UPLOADER: &str = "cli";
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

fn runtime_err(msg: impl Into<String>) -> CliError {
    CliError::new(EXIT_AUDIT_RUNTIME, msg)
}

fn read_csv(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| runtime_err(format!("cannot read {}: {e}", path.display())))
}

// ============================================================================
// normalize
// ============================================================================

pub fn cmd_normalize(file: PathBuf, kind: &str, quote_aware: bool, json: bool) -> Result<(), CliError> {
    let kind: RecordKind = kind
        .parse()
        .map_err(|e: fieldaudit_recon::ReconError| {
            CliError::args(e.to_string()).with_hint("use --kind route or --kind roster")
        })?;

    let text = read_csv(&file)?;
    let out = normalize_with(&text, kind, NormalizeOptions { quote_aware });

    if json {
        let json_str = serde_json::to_string_pretty(&out)
            .map_err(|e| runtime_err(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        report::print_batch(&out.batch);
    }

    report::print_stats(&file.display().to_string(), kind, &out.stats);
    Ok(())
}

// ============================================================================
// reconcile / run
// ============================================================================

struct RunSettings<'a> {
    name: &'a str,
    uploaded_by: &'a str,
    max_attempts: u32,
    options: NormalizeOptions,
}

/// Normalize every upload into a fresh store, then reconcile its snapshot.
fn execute(settings: &RunSettings<'_>, uploads: &[(RecordKind, PathBuf)]) -> Result<AuditReport, CliError> {
    let store = MemoryStore::new();
    let mut ingest = Vec::new();

    for (kind, path) in uploads {
        let text = read_csv(path)?;
        let out = normalize_with(&text, *kind, settings.options);
        if out.batch.is_empty() {
            log::warn!("{}: no valid {kind} records found", path.display());
        }
        let records = out.batch.into_records();
        let upload = upload_batch(&store, &records, settings.uploaded_by, settings.max_attempts);

        ingest.push(IngestSummary {
            file: path.display().to_string(),
            kind: *kind,
            stats: out.stats,
            upload,
        });
    }

    let snapshot = store.snapshot();
    let metrics = snapshot.reconcile();
    let insights = summarize(&snapshot.visits, &snapshot.roster);

    Ok(AuditReport {
        meta: AuditMeta {
            name: settings.name.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            revision: snapshot.revision,
        },
        ingest,
        metrics,
        insights,
    })
}

fn emit(
    result: &AuditReport,
    json_output: bool,
    output_file: Option<&Path>,
    fail_on_alerts: bool,
) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(result)
        .map_err(|e| runtime_err(format!("JSON serialization error: {e}")))?;

    if let Some(path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| runtime_err(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    report::print_summary(result);

    let incomplete: Vec<&IngestSummary> = result
        .ingest
        .iter()
        .filter(|i| !i.upload.is_complete())
        .collect();
    if !incomplete.is_empty() {
        let failed: usize = incomplete.iter().map(|i| i.upload.failed).sum();
        return Err(CliError::new(
            EXIT_AUDIT_PARTIAL_UPLOAD,
            format!("{failed} record(s) could not be stored; metrics reflect the stored subset"),
        ));
    }

    if fail_on_alerts && !result.metrics.fraud_alerts.is_empty() {
        return Err(CliError::new(
            EXIT_AUDIT_ALERTS,
            format!("{} fraud alert(s) raised", result.metrics.fraud_alerts.len()),
        ));
    }

    Ok(())
}

pub fn cmd_reconcile(
    route: Vec<PathBuf>,
    roster: Vec<PathBuf>,
    json_output: bool,
    output_file: Option<PathBuf>,
    fail_on_alerts: bool,
) -> Result<(), CliError> {
    if route.is_empty() && roster.is_empty() {
        return Err(CliError::args("nothing to reconcile")
            .with_hint("pass at least one --route or --roster file"));
    }

    let uploads: Vec<(RecordKind, PathBuf)> = route
        .into_iter()
        .map(|p| (RecordKind::Route, p))
        .chain(roster.into_iter().map(|p| (RecordKind::Roster, p)))
        .collect();

    let settings = RunSettings {
        name: "ad hoc",
        uploaded_by: DEFAULT_UPLOADER,
        max_attempts: DEFAULT_MAX_ATTEMPTS,
        options: NormalizeOptions::default(),
    };

    let result = execute(&settings, &uploads)?;
    emit(&result, json_output, output_file.as_deref(), fail_on_alerts)
}

fn load_config(config_path: &Path) -> Result<AuditConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| runtime_err(format!("cannot read config: {e}")))?;
    AuditConfig::from_toml(&config_str)
        .map_err(|e| CliError::new(EXIT_AUDIT_INVALID_CONFIG, e.to_string()))
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    fail_on_alerts: bool,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let uploads: Vec<(RecordKind, PathBuf)> = config
        .inputs
        .route
        .iter()
        .map(|f| (RecordKind::Route, base_dir.join(f)))
        .chain(config.inputs.roster.iter().map(|f| (RecordKind::Roster, base_dir.join(f))))
        .collect();

    let settings = RunSettings {
        name: &config.name,
        uploaded_by: &config.uploaded_by,
        max_attempts: config.upload.max_attempts,
        options: config.normalize,
    };

    let result = execute(&settings, &uploads)?;

    let output_file = output_file.or_else(|| config.output.json.as_ref().map(|f| base_dir.join(f)));
    emit(&result, json_output, output_file.as_deref(), fail_on_alerts)
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: audit '{}' with {} route file(s), {} roster file(s)",
        config.name,
        config.inputs.route.len(),
        config.inputs.roster.len(),
    );
    Ok(())
}
