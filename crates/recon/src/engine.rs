use std::collections::HashSet;

use crate::aggregate::{percent, RegionTallies};
use crate::model::{AlertKind, FraudAlert, Metrics, RosterEntry, RouteVisitRecord, UNKNOWN};

/// Reconcile the current visit log against the roster.
///
/// Pure: no I/O, never fails, inputs untouched. Empty inputs yield zeroed
/// metrics and no alerts. Alerts come back with every unreported-coverage
/// alert first, otherwise in the order they were raised.
pub fn reconcile(visits: &[RouteVisitRecord], roster: &[RosterEntry]) -> Metrics {
    let mut regions = RegionTallies::new();
    let mut recorded: HashSet<&str> = HashSet::new();
    let mut alerts: Vec<FraudAlert> = Vec::new();
    let mut completed_visits = 0;

    for visit in visits {
        let region = visit.region();
        regions.record(region, visit.checked);
        recorded.insert(visit.employee_id.as_str());

        if visit.checked {
            completed_visits += 1;
        } else {
            alerts.push(visit_gap(visit, region));
        }
    }

    let employees_only_in_roster: Vec<RosterEntry> = roster
        .iter()
        .filter(|e| !recorded.contains(e.employee_code.as_str()))
        .cloned()
        .collect();

    let mut alerted: HashSet<&str> = HashSet::new();
    for entry in &employees_only_in_roster {
        if alerted.insert(entry.employee_code.as_str()) {
            alerts.push(unreported_coverage(entry));
        }
    }

    let in_both_count = roster
        .iter()
        .filter(|e| recorded.contains(e.employee_code.as_str()))
        .count();
    if in_both_count > 0 {
        alerts.push(dual_reporting_risk(in_both_count));
    }

    // Stable: false sorts before true.
    alerts.sort_by_key(|a| a.kind != AlertKind::UnreportedCoverage);

    let expected_staff_count = roster
        .iter()
        .map(|e| e.employee_code.as_str())
        .collect::<HashSet<_>>()
        .len();

    let total_visits = visits.len();
    let metrics = Metrics {
        total_visits,
        completed_visits,
        missed_visits: total_visits - completed_visits,
        compliance_rate_percent: percent(completed_visits, total_visits),
        active_staff_count: recorded.len(),
        expected_staff_count,
        regions: regions.into_breakdown(),
        unreported_coverage_count: employees_only_in_roster.len(),
        fraud_alerts: alerts,
        employees_only_in_roster,
    };

    log::info!(
        "reconciled {} visits against {} roster rows: {}% compliance, {} alerts",
        metrics.total_visits,
        roster.len(),
        metrics.compliance_rate_percent,
        metrics.fraud_alerts.len()
    );

    metrics
}

fn visit_gap(visit: &RouteVisitRecord, region: &str) -> FraudAlert {
    let shop = visit.shop_name.as_deref().unwrap_or("an unnamed shop");
    FraudAlert {
        employee_id: visit.employee_id.clone(),
        employee_name: visit.employee_name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        kind: AlertKind::VisitGap,
        details: format!("Did not check in at {shop} (route map failure)."),
        location: format!("{}, {region}", visit.district.as_deref().unwrap_or(UNKNOWN)),
    }
}

fn unreported_coverage(entry: &RosterEntry) -> FraudAlert {
    FraudAlert {
        employee_id: entry.employee_code.clone(),
        employee_name: entry.employee_name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        kind: AlertKind::UnreportedCoverage,
        details: "Employee was expected to execute routes but reported zero visits in the route map."
            .to_string(),
        location: entry.governorate_name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
    }
}

fn dual_reporting_risk(in_both_count: usize) -> FraudAlert {
    FraudAlert {
        employee_id: "Multiple".to_string(),
        employee_name: "System Flag".to_string(),
        kind: AlertKind::DualReportingRisk,
        details: format!(
            "{in_both_count} employees appear in both lists. Needs audit for conflicting records."
        ),
        location: "Multiple Regions".to_string(),
    }
}
