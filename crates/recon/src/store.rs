//! Record storage seam.
//!
//! Normalized records are appended, never edited. The store owns identity:
//! it assigns the id, stamps the uploader and the creation time. Batches are
//! written record by record with no rollback, so a partial failure shows up
//! as `written < attempted` in the [`UploadReport`].

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::reconcile;
use crate::error::ReconError;
use crate::model::{CanonicalRecord, Metrics, RosterEntry, RouteVisitRecord};

/// A record as persisted: the canonical shape plus storage metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRecord {
    pub id: String,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
    pub record: CanonicalRecord,
}

pub trait RecordStore {
    /// Append one record, returning the id the store assigned.
    fn append(&self, record: &CanonicalRecord, uploaded_by: &str) -> Result<String, ReconError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub attempted: usize,
    pub written: usize,
    pub failed: usize,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.written == self.attempted
    }
}

/// Write every record independently, retrying each up to `max_attempts`
/// times. Failures are counted, not rolled back.
pub fn upload_batch<S: RecordStore + ?Sized>(
    store: &S,
    records: &[CanonicalRecord],
    uploaded_by: &str,
    max_attempts: u32,
) -> UploadReport {
    let mut report = UploadReport {
        attempted: records.len(),
        ..UploadReport::default()
    };

    for (i, record) in records.iter().enumerate() {
        let mut attempt = 1;
        loop {
            match store.append(record, uploaded_by) {
                Ok(_) => {
                    report.written += 1;
                    break;
                }
                Err(e) if attempt < max_attempts => {
                    log::debug!("record {i}: attempt {attempt} failed: {e}");
                    attempt += 1;
                }
                Err(e) => {
                    log::warn!("record {i}: giving up after {attempt} attempt(s): {e}");
                    report.failed += 1;
                    break;
                }
            }
        }
    }

    if !report.is_complete() {
        log::warn!(
            "upload incomplete: {} of {} records written",
            report.written,
            report.attempted
        );
    }
    report
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable view of both collections at one revision.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub revision: u64,
    pub visits: Arc<Vec<RouteVisitRecord>>,
    pub roster: Arc<Vec<RosterEntry>>,
}

impl Snapshot {
    pub fn reconcile(&self) -> Metrics {
        reconcile(&self.visits, &self.roster)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Collections {
    revision: u64,
    records: Vec<StoredRecord>,
}

/// Process-local store. Every append bumps the revision so callers can tell
/// whether a previously reconciled snapshot is stale.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.inner.read().map(|c| c.revision).unwrap_or_default()
    }

    pub fn records(&self) -> Vec<StoredRecord> {
        self.inner
            .read()
            .map(|c| c.records.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Snapshot {
        let Ok(inner) = self.inner.read() else {
            return Snapshot::default();
        };
        let mut visits = Vec::new();
        let mut roster = Vec::new();
        for stored in &inner.records {
            match &stored.record {
                CanonicalRecord::Route(v) => visits.push(v.clone()),
                CanonicalRecord::Roster(e) => roster.push(e.clone()),
            }
        }
        Snapshot {
            revision: inner.revision,
            visits: Arc::new(visits),
            roster: Arc::new(roster),
        }
    }
}

impl RecordStore for MemoryStore {
    fn append(&self, record: &CanonicalRecord, uploaded_by: &str) -> Result<String, ReconError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ReconError::Store("memory store lock poisoned".into()))?;
        let id = uuid::Uuid::new_v4().to_string();
        inner.records.push(StoredRecord {
            id: id.clone(),
            uploaded_by: uploaded_by.to_string(),
            created_at: Utc::now(),
            record: record.clone(),
        });
        inner.revision += 1;
        Ok(id)
    }
}
