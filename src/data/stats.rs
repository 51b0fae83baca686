use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::filter::FilteredView;

// ---------------------------------------------------------------------------
// Summary statistics (KPI tiles)
// ---------------------------------------------------------------------------

/// Mean/median/max/min of `salary_in_usd` over one filtered view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalarySummary {
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
}

/// Compute the four summary scalars, or `None` when the view has no rows.
///
/// An empty view is a normal state (the user can deselect everything), so
/// it is reported as "no summary" rather than as NaN.
pub fn summarize(view: &FilteredView) -> Option<SalarySummary> {
    let mut salaries: Vec<f64> = view.records().map(|r| r.salary_in_usd).collect();
    if salaries.is_empty() {
        return None;
    }
    salaries.sort_by(f64::total_cmp);

    let mean = salaries.iter().sum::<f64>() / salaries.len() as f64;
    Some(SalarySummary {
        mean,
        median: median_of_sorted(&salaries),
        max: salaries[salaries.len() - 1],
        min: salaries[0],
    })
}

/// Median of a sorted sample; the two middle values are averaged for even
/// counts.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Grouped aggregates (chart inputs)
// ---------------------------------------------------------------------------

/// Mean salary per job title, highest first, truncated to `n` titles.
///
/// Groups keep their first-encountered order and the sort is stable, so
/// titles with equal means stay in row order.
pub fn top_titles_by_salary(view: &FilteredView, n: usize) -> Vec<(String, f64)> {
    let mut groups: IndexMap<String, (f64, usize)> = IndexMap::new();
    for rec in view.records() {
        let entry = groups.entry(rec.job_title.clone()).or_insert((0.0, 0));
        entry.0 += rec.salary_in_usd;
        entry.1 += 1;
    }

    let mut means: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(title, (sum, count))| (title, sum / count as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1));
    means.truncate(n);
    means
}

/// Mean salary per year, ascending by year.
pub fn salary_by_year(view: &FilteredView) -> Vec<(i32, f64)> {
    let mut groups: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for rec in view.records() {
        let entry = groups.entry(rec.work_year).or_insert((0.0, 0));
        entry.0 += rec.salary_in_usd;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(year, (sum, count))| (year, sum / count as f64))
        .collect()
}

/// Salary samples per experience level, in view order. Quartiles are left
/// to the chart layer.
pub fn distribution_by_experience(view: &FilteredView) -> BTreeMap<String, Vec<f64>> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for rec in view.records() {
        groups
            .entry(rec.experience_level.clone())
            .or_default()
            .push(rec.salary_in_usd);
    }
    groups
}

/// Row count per distinct remote-work category, largest first. Ties keep
/// first-encountered order.
pub fn remote_ratio_breakdown(view: &FilteredView) -> Vec<(String, usize)> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for rec in view.records() {
        *counts.entry(rec.remote_ratio.clone()).or_insert(0) += 1;
    }

    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// ---------------------------------------------------------------------------
// Aggregates – everything the charts read, computed in one place
// ---------------------------------------------------------------------------

/// All chart inputs derived from one filtered view. Recomputed from scratch
/// whenever a selection changes; the table is small enough that a full pass
/// beats incremental bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    pub summary: Option<SalarySummary>,
    pub top_titles: Vec<(String, f64)>,
    pub by_year: Vec<(i32, f64)>,
    pub by_level: BTreeMap<String, Vec<f64>>,
    pub remote_breakdown: Vec<(String, usize)>,
}

impl Aggregates {
    /// Number of titles shown in the bar chart.
    pub const TOP_TITLES: usize = 10;

    pub fn compute(view: &FilteredView) -> Self {
        Aggregates {
            summary: summarize(view),
            top_titles: top_titles_by_salary(view, Self::TOP_TITLES),
            by_year: salary_by_year(view),
            by_level: distribution_by_experience(view),
            remote_breakdown: remote_ratio_breakdown(view),
        }
    }
}
