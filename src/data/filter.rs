use std::collections::BTreeSet;

use super::model::{SalaryDataset, SalaryRecord};

// ---------------------------------------------------------------------------
// Selection state: which values are selected per filter dimension
// ---------------------------------------------------------------------------

/// Job titles pre-selected when the dashboard starts.
pub const DEFAULT_TITLES: [&str; 3] = [
    "Data Scientist",
    "Data Engineer",
    "Machine Learning Engineer",
];

/// The four selection sets driving the dashboard.
///
/// An empty set means "nothing selected": it hides every row. It is not a
/// wildcard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub years: BTreeSet<i32>,
    pub titles: BTreeSet<String>,
    pub levels: BTreeSet<String>,
    pub locations: BTreeSet<String>,
}

impl SelectionState {
    /// Initial selections: every year, level and location, plus the core
    /// data roles among the titles. Falls back to all titles when none of
    /// the defaults occur in the data.
    pub fn defaults(dataset: &SalaryDataset) -> Self {
        let titles: BTreeSet<String> = dataset
            .titles
            .iter()
            .filter(|t| DEFAULT_TITLES.contains(&t.as_str()))
            .cloned()
            .collect();
        let titles = if titles.is_empty() {
            dataset.titles.clone()
        } else {
            titles
        };

        SelectionState {
            years: dataset.years.clone(),
            titles,
            levels: dataset.levels.clone(),
            locations: dataset.locations.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

fn matches(record: &SalaryRecord, selection: &SelectionState) -> bool {
    selection.years.contains(&record.work_year)
        && selection.titles.contains(&record.job_title)
        && selection.levels.contains(&record.experience_level)
        && selection.locations.contains(&record.company_location)
}

/// Return indices of rows that pass all four filters, in original row
/// order.
///
/// The conditions are conjunctive on purpose: a row must satisfy every
/// dimension, so emptying one selection set empties the whole view.
pub fn filtered_indices(dataset: &SalaryDataset, selection: &SelectionState) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| matches(rec, selection))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView – a borrowed subset of the dataset
// ---------------------------------------------------------------------------

/// A filtered subset of the dataset, represented as row indices into it.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    dataset: &'a SalaryDataset,
    indices: &'a [usize],
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a SalaryDataset, indices: &'a [usize]) -> Self {
        FilteredView { dataset, indices }
    }

    /// Iterate the selected rows in original dataset order.
    pub fn records(&self) -> impl Iterator<Item = &'a SalaryRecord> + 'a {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
