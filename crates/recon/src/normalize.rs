//! CSV text → canonical records.
//!
//! Rows that cannot be mapped are dropped, never reported as errors: a row
//! whose cell count differs from the header, or one without the kind's
//! required identifier. [`NormalizeStats`] counts both so callers can show
//! "rows parsed vs rows in source".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::header::{canonical_headers, clean_cell};
use crate::model::{CanonicalRecord, RecordKind, RosterEntry, RouteVisitRecord, UNKNOWN};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct NormalizeOptions {
    /// Split cells with a real CSV reader so quoted fields may contain
    /// commas. Off by default: plain comma splitting.
    #[serde(default)]
    pub quote_aware: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    /// Non-blank lines after the header.
    pub data_rows: usize,
    pub kept: usize,
    /// Cell count differed from the header.
    pub malformed: usize,
    /// Required identifier blank or absent.
    pub missing_key: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum NormalizedBatch {
    Route(Vec<RouteVisitRecord>),
    Roster(Vec<RosterEntry>),
}

impl NormalizedBatch {
    fn empty(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Route => Self::Route(Vec::new()),
            RecordKind::Roster => Self::Roster(Vec::new()),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Route(_) => RecordKind::Route,
            Self::Roster(_) => RecordKind::Roster,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Route(v) => v.len(),
            Self::Roster(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_records(self) -> Vec<CanonicalRecord> {
        match self {
            Self::Route(v) => v.into_iter().map(CanonicalRecord::Route).collect(),
            Self::Roster(v) => v.into_iter().map(CanonicalRecord::Roster).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizeOutput {
    pub batch: NormalizedBatch,
    pub stats: NormalizeStats,
}

/// Normalize with default options.
pub fn normalize(raw_text: &str, kind: RecordKind) -> NormalizeOutput {
    normalize_with(raw_text, kind, NormalizeOptions::default())
}

pub fn normalize_with(raw_text: &str, kind: RecordKind, options: NormalizeOptions) -> NormalizeOutput {
    let mut stats = NormalizeStats::default();
    let mut batch = NormalizedBatch::empty(kind);

    let rows = split_rows(raw_text, options);
    let Some((Some(header), data)) = rows.split_first() else {
        return NormalizeOutput { batch, stats };
    };
    if data.is_empty() {
        return NormalizeOutput { batch, stats };
    }

    let keys = canonical_headers(header.as_slice());
    stats.data_rows = data.len();

    for (i, cells) in data.iter().enumerate() {
        // i + 2: 1-based, header excluded
        let Some(cells) = cells else {
            log::debug!("{kind} row {}: unreadable, skipped", i + 2);
            stats.malformed += 1;
            continue;
        };
        if cells.len() != keys.len() {
            log::debug!(
                "{kind} row {}: {} cells, header has {}, skipped",
                i + 2,
                cells.len(),
                keys.len()
            );
            stats.malformed += 1;
            continue;
        }

        let fields: BTreeMap<String, String> = keys
            .iter()
            .cloned()
            .zip(cells.iter().map(|c| clean_cell(c)))
            .collect();

        let kept = match &mut batch {
            NormalizedBatch::Route(out) => push_some(out, route_record(fields)),
            NormalizedBatch::Roster(out) => push_some(out, roster_entry(fields)),
        };
        if kept {
            stats.kept += 1;
        } else {
            log::debug!("{kind} row {}: no employee identifier, skipped", i + 2);
            stats.missing_key += 1;
        }
    }

    log::info!(
        "normalized {kind}: kept {} of {} rows ({} malformed, {} without id)",
        stats.kept,
        stats.data_rows,
        stats.malformed,
        stats.missing_key
    );

    NormalizeOutput { batch, stats }
}

/// Route-log convenience wrapper returning only the records.
#[cfg(test)]
pub(crate) fn normalize_route(raw_text: &str) -> Vec<RouteVisitRecord> {
    match normalize(raw_text, RecordKind::Route).batch {
        NormalizedBatch::Route(v) => v,
        NormalizedBatch::Roster(_) => Vec::new(),
    }
}

/// Roster convenience wrapper returning only the entries.
#[cfg(test)]
pub(crate) fn normalize_roster(raw_text: &str) -> Vec<RosterEntry> {
    match normalize(raw_text, RecordKind::Roster).batch {
        NormalizedBatch::Roster(v) => v,
        NormalizedBatch::Route(_) => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// Header first, then data rows. `None` marks a row the CSV reader rejected.
///
/// Both modes share one reader; plain mode only turns quote handling off so
/// every comma separates a cell. A line is dropped only when its text is
/// blank, which in both modes reads back as a single blank cell.
fn split_rows(raw_text: &str, options: NormalizeOptions) -> Vec<Option<Vec<String>>> {
    if raw_text.trim().is_empty() {
        return Vec::new();
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(options.quote_aware)
        .from_reader(raw_text.as_bytes());

    reader
        .records()
        .filter_map(|record| match record {
            Ok(record) => {
                if record.len() <= 1 && record.iter().all(|c| c.trim().is_empty()) {
                    return None;
                }
                Some(Some(record.iter().map(str::to_string).collect()))
            }
            Err(e) => {
                log::debug!("csv reader: {e}");
                Some(None)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Kind-specific derivation
// ---------------------------------------------------------------------------

fn push_some<T>(out: &mut Vec<T>, item: Option<T>) -> bool {
    match item {
        Some(item) => {
            out.push(item);
            true
        }
        None => false,
    }
}

/// Remove a mapped column; blank values count as absent. Whatever is left
/// after the named fields are taken becomes the record's `extra`.
fn take(fields: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    fields.remove(key).filter(|v| !v.is_empty())
}

fn route_record(mut fields: BTreeMap<String, String>) -> Option<RouteVisitRecord> {
    let employee_id = take(&mut fields, "Code")?;
    let checked = fields
        .get("checked")
        .is_some_and(|v| v.to_lowercase() == "true");
    let shop_name = take(&mut fields, "ShopName")
        .or_else(|| fields.get("ShopName2").filter(|v| !v.is_empty()).cloned());
    let employee_name = take(&mut fields, "Name");
    let governorate = take(&mut fields, "Governorate");
    let district = take(&mut fields, "District");
    let date = take(&mut fields, "date");
    fields.remove("checked");

    Some(RouteVisitRecord {
        employee_id,
        employee_name,
        governorate,
        district,
        shop_name,
        date,
        checked,
        extra: fields,
    })
}

fn roster_entry(mut fields: BTreeMap<String, String>) -> Option<RosterEntry> {
    let employee_code = take(&mut fields, "EMPLOYEECODE")?;
    let employee_name = take(&mut fields, "EMPLOYEENAME");
    let title = take(&mut fields, "TITLE").unwrap_or_else(|| UNKNOWN.to_string());
    let governorate_name = take(&mut fields, "GOVERNORATENAME");

    Some(RosterEntry {
        employee_code,
        employee_name,
        title,
        governorate_name,
        extra: fields,
    })
}
