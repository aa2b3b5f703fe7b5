use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Region / location label used when the source leaves a field blank.
pub const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Record kind
// ---------------------------------------------------------------------------

/// Which report a CSV upload is interpreted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Field-visit route log.
    Route,
    /// Expected-coverage roster.
    Roster,
}

impl FromStr for RecordKind {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "route" => Ok(Self::Route),
            "roster" => Ok(Self::Roster),
            other => Err(ReconError::InvalidKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Route => write!(f, "route"),
            Self::Roster => write!(f, "roster"),
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

/// One logged or expected site visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteVisitRecord {
    pub employee_id: String,
    pub employee_name: Option<String>,
    pub governorate: Option<String>,
    pub district: Option<String>,
    pub shop_name: Option<String>,
    pub date: Option<String>,
    pub checked: bool,
    /// Every other mapped column, keyed by canonical header.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl RouteVisitRecord {
    /// Region key used for breakdowns: governorate, or `"Unknown"`.
    pub fn region(&self) -> &str {
        self.governorate.as_deref().unwrap_or(UNKNOWN)
    }
}

/// One employee expected to produce visits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub employee_code: String,
    pub employee_name: Option<String>,
    pub title: String,
    pub governorate_name: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

/// A single normalized record of either kind, as handed to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanonicalRecord {
    Route(RouteVisitRecord),
    Roster(RosterEntry),
}

impl CanonicalRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Route(_) => RecordKind::Route,
            Self::Roster(_) => RecordKind::Roster,
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    VisitGap,
    UnreportedCoverage,
    DualReportingRisk,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VisitGap => write!(f, "VISIT_GAP"),
            Self::UnreportedCoverage => write!(f, "UNREPORTED_COVERAGE"),
            Self::DualReportingRisk => write!(f, "DUAL_REPORTING_RISK"),
        }
    }
}

/// Derived per reconciliation pass; never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FraudAlert {
    pub employee_id: String,
    pub employee_name: String,
    pub kind: AlertKind,
    pub details: String,
    pub location: String,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionBreakdown {
    pub name: String,
    pub visits: usize,
    pub compliance_percent: u32,
}

/// Everything the presentation layer renders, recomputed on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub total_visits: usize,
    pub completed_visits: usize,
    pub missed_visits: usize,
    pub compliance_rate_percent: u32,
    pub active_staff_count: usize,
    pub expected_staff_count: usize,
    pub regions: Vec<RegionBreakdown>,
    pub fraud_alerts: Vec<FraudAlert>,
    pub unreported_coverage_count: usize,
    pub employees_only_in_roster: Vec<RosterEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_str() {
        assert_eq!("route".parse::<RecordKind>().unwrap(), RecordKind::Route);
        assert_eq!("roster".parse::<RecordKind>().unwrap(), RecordKind::Roster);
    }

    #[test]
    fn kind_rejects_unknown_tag() {
        let err = "missing".parse::<RecordKind>().unwrap_err();
        assert!(matches!(err, ReconError::InvalidKind(ref t) if t == "missing"));
        assert!(err.to_string().contains("'missing'"));
        assert!("Route".parse::<RecordKind>().is_err());
    }

    #[test]
    fn alert_kind_serializes_screaming() {
        let json = serde_json::to_string(&AlertKind::UnreportedCoverage).unwrap();
        assert_eq!(json, "\"UNREPORTED_COVERAGE\"");
        assert_eq!(AlertKind::DualReportingRisk.to_string(), "DUAL_REPORTING_RISK");
    }

    #[test]
    fn canonical_record_tagged_by_kind() {
        let rec = CanonicalRecord::Roster(RosterEntry {
            employee_code: "A-1001".into(),
            employee_name: None,
            title: UNKNOWN.into(),
            governorate_name: None,
            extra: BTreeMap::new(),
        });
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["kind"], "roster");
        assert_eq!(value["employee_code"], "A-1001");
        assert_eq!(rec.kind(), RecordKind::Roster);
    }
}
