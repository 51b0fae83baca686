use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// SalaryRecord – one row of the salary table
// ---------------------------------------------------------------------------

/// A single salary observation (one row of the source CSV).
///
/// Only the columns the dashboard filters or aggregates on are kept; the
/// source file carries a few more (currency, employment type, company size)
/// that no widget reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryRecord {
    /// Calendar year the salary was reported for.
    pub work_year: i32,
    /// Job title as published, e.g. "Data Scientist".
    pub job_title: String,
    /// Seniority code. The published data uses EN/MI/SE/EX but the set is
    /// treated as open.
    pub experience_level: String,
    /// Country/region code of the employing company, e.g. "US".
    pub company_location: String,
    /// Salary converted to USD.
    pub salary_in_usd: f64,
    /// Remote-work share as a raw token ("0", "50", "100").
    pub remote_ratio: String,
}

// ---------------------------------------------------------------------------
// SalaryDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed value sets for the filter
/// widgets. Immutable after load; every derived view is a fresh index list.
#[derive(Debug, Clone, Default)]
pub struct SalaryDataset {
    /// All rows in original file order.
    pub records: Vec<SalaryRecord>,
    /// Distinct `work_year` values, ascending.
    pub years: BTreeSet<i32>,
    /// Distinct `job_title` values, sorted.
    pub titles: BTreeSet<String>,
    /// Distinct `experience_level` values, sorted.
    pub levels: BTreeSet<String>,
    /// Distinct `company_location` values, sorted.
    pub locations: BTreeSet<String>,
    /// Distinct `remote_ratio` tokens, sorted. Not a filter dimension; used
    /// to assign stable pie-slice colors.
    pub remote_ratios: BTreeSet<String>,
    /// Rows dropped at parse time because a required field was missing or
    /// unreadable. Kept for the status line.
    pub skipped_rows: usize,
}

impl SalaryDataset {
    /// Build the per-column value sets from the loaded rows.
    pub fn from_records(records: Vec<SalaryRecord>, skipped_rows: usize) -> Self {
        let mut years = BTreeSet::new();
        let mut titles = BTreeSet::new();
        let mut levels = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut remote_ratios = BTreeSet::new();

        for rec in &records {
            years.insert(rec.work_year);
            titles.insert(rec.job_title.clone());
            levels.insert(rec.experience_level.clone());
            locations.insert(rec.company_location.clone());
            remote_ratios.insert(rec.remote_ratio.clone());
        }

        SalaryDataset {
            records,
            years,
            titles,
            levels,
            locations,
            remote_ratios,
            skipped_rows,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Test fixtures shared by the data-layer tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    pub fn record(
        year: i32,
        title: &str,
        level: &str,
        location: &str,
        salary: f64,
    ) -> SalaryRecord {
        record_with_remote(year, title, level, location, salary, "100")
    }

    pub fn record_with_remote(
        year: i32,
        title: &str,
        level: &str,
        location: &str,
        salary: f64,
        remote: &str,
    ) -> SalaryRecord {
        SalaryRecord {
            work_year: year,
            job_title: title.to_string(),
            experience_level: level.to_string(),
            company_location: location.to_string(),
            salary_in_usd: salary,
            remote_ratio: remote.to_string(),
        }
    }

    /// Three rows spanning two years, two titles, two levels and two
    /// locations; the basis for the end-to-end filter scenarios.
    pub fn scenario_dataset() -> SalaryDataset {
        SalaryDataset::from_records(
            vec![
                record(2023, "Data Scientist", "SE", "US", 150_000.0),
                record(2023, "Data Engineer", "MI", "US", 120_000.0),
                record(2022, "Data Scientist", "SE", "DE", 100_000.0),
            ],
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::record;
    use super::*;

    #[test]
    fn from_records_builds_distinct_value_sets() {
        let ds = testutil::scenario_dataset();

        assert_eq!(ds.len(), 3);
        assert!(!ds.is_empty());
        assert_eq!(ds.years.iter().copied().collect::<Vec<_>>(), vec![2022, 2023]);
        assert_eq!(
            ds.titles.iter().cloned().collect::<Vec<_>>(),
            vec!["Data Engineer".to_string(), "Data Scientist".to_string()]
        );
        assert_eq!(ds.levels.len(), 2);
        assert_eq!(ds.locations.len(), 2);
        assert_eq!(ds.remote_ratios.len(), 1);
        assert_eq!(ds.skipped_rows, 0);
    }

    #[test]
    fn skipped_row_count_is_carried() {
        let ds = SalaryDataset::from_records(vec![record(2023, "Analyst", "EN", "US", 1.0)], 7);
        assert_eq!(ds.skipped_rows, 7);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn empty_dataset_reports_empty() {
        let ds = SalaryDataset::from_records(Vec::new(), 0);
        assert!(ds.is_empty());
        assert!(ds.years.is_empty());
        assert!(ds.titles.is_empty());
    }
}
