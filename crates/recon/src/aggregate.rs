use std::collections::HashMap;

use crate::model::RegionBreakdown;

/// Integer percentage of `part / whole`, rounded half-up. Zero when `whole` is zero.
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part * 200 + whole) / (whole * 2)) as u32
}

#[derive(Debug, Clone)]
struct RegionTally {
    name: String,
    visits: usize,
    completed: usize,
}

/// Per-region visit counters, kept in order of first appearance.
#[derive(Debug, Default)]
pub struct RegionTallies {
    tallies: Vec<RegionTally>,
    index: HashMap<String, usize>,
}

impl RegionTallies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, region: &str, completed: bool) {
        let slot = match self.index.get(region) {
            Some(&i) => i,
            None => {
                self.tallies.push(RegionTally {
                    name: region.to_string(),
                    visits: 0,
                    completed: 0,
                });
                self.index.insert(region.to_string(), self.tallies.len() - 1);
                self.tallies.len() - 1
            }
        };
        let tally = &mut self.tallies[slot];
        tally.visits += 1;
        if completed {
            tally.completed += 1;
        }
    }

    /// Breakdown sorted by visit count descending; ties keep first-appearance order.
    pub fn into_breakdown(self) -> Vec<RegionBreakdown> {
        let mut out: Vec<RegionBreakdown> = self
            .tallies
            .into_iter()
            .map(|t| RegionBreakdown {
                compliance_percent: percent(t.completed, t.visits),
                name: t.name,
                visits: t.visits,
            })
            .collect();
        out.sort_by(|a, b| b.visits.cmp(&a.visits));
        out
    }
}

/// Count occurrences per label, sorted by count descending with ties in
/// first-appearance order.
pub fn ranked_counts<'a, I>(labels: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for label in labels {
        match index.get(label) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(label, counts.len());
                counts.push((label.to_string(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
