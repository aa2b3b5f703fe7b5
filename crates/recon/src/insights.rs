//! Secondary breakdowns shown next to the core metrics: who logged the most
//! visits, which job titles are on the route, how compliance moves day to
//! day, and where the roster sits.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::aggregate::{percent, ranked_counts};
use crate::model::{RosterEntry, RouteVisitRecord, UNKNOWN};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeVisits {
    pub employee_id: String,
    pub employee_name: Option<String>,
    pub visits: usize,
}

/// Visits logged on one date. Rows without a date share the `Unknown` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateCompliance {
    pub date: String,
    pub visits: usize,
    pub completed: usize,
    pub compliance_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insights {
    /// Distinct (shop code, shop name) pairs in the visit log.
    pub unique_shops: usize,
    pub visits_per_employee: Vec<EmployeeVisits>,
    pub visits_by_job: Vec<LabelCount>,
    /// First-appearance order of the date column.
    pub visits_by_date: Vec<DateCompliance>,
    pub roster_by_title: Vec<LabelCount>,
    pub roster_by_governorate: Vec<LabelCount>,
}

pub fn summarize(visits: &[RouteVisitRecord], roster: &[RosterEntry]) -> Insights {
    let unique_shops = visits
        .iter()
        .map(|v| {
            (
                v.extra.get("ShopCode").map(String::as_str).unwrap_or(""),
                v.shop_name.as_deref().unwrap_or(""),
            )
        })
        .filter(|(code, name)| !code.is_empty() || !name.is_empty())
        .collect::<HashSet<_>>()
        .len();

    let visits_per_employee = ranked_counts(visits.iter().map(|v| v.employee_id.as_str()))
        .into_iter()
        .map(|(employee_id, count)| EmployeeVisits {
            employee_name: visits
                .iter()
                .find(|v| v.employee_id == employee_id)
                .and_then(|v| v.employee_name.clone()),
            employee_id,
            visits: count,
        })
        .collect();

    let visits_by_job = label_counts(
        visits
            .iter()
            .map(|v| v.extra.get("Job").map(String::as_str).filter(|s| !s.is_empty()).unwrap_or(UNKNOWN)),
    );
    let visits_by_date = date_trend(visits);
    let roster_by_title = label_counts(roster.iter().map(|e| e.title.as_str()));
    let roster_by_governorate = label_counts(
        roster
            .iter()
            .map(|e| e.governorate_name.as_deref().unwrap_or(UNKNOWN)),
    );

    Insights {
        unique_shops,
        visits_per_employee,
        visits_by_job,
        visits_by_date,
        roster_by_title,
        roster_by_governorate,
    }
}

fn date_trend(visits: &[RouteVisitRecord]) -> Vec<DateCompliance> {
    let mut trend: Vec<DateCompliance> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for v in visits {
        let date = v.date.as_deref().unwrap_or(UNKNOWN);
        let slot = *index.entry(date).or_insert_with(|| {
            trend.push(DateCompliance {
                date: date.to_string(),
                visits: 0,
                completed: 0,
                compliance_percent: 0,
            });
            trend.len() - 1
        });
        trend[slot].visits += 1;
        if v.checked {
            trend[slot].completed += 1;
        }
    }

    for day in &mut trend {
        day.compliance_percent = percent(day.completed, day.visits);
    }
    trend
}

fn label_counts<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<LabelCount> {
    ranked_counts(labels)
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect()
}
