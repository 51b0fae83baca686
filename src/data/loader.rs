use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use thiserror::Error;

use super::model::{SalaryDataset, SalaryRecord};

/// The published salary table this dashboard is built around.
pub const DATA_URL: &str =
    "https://raw.githubusercontent.com/guilhermeonrails/data-jobs/refs/heads/main/salaries.csv";

/// Columns the dashboard cannot work without. The source file may carry
/// more; extras are ignored.
const REQUIRED_COLUMNS: [&str; 6] = [
    "work_year",
    "job_title",
    "experience_level",
    "company_location",
    "salary_in_usd",
    "remote_ratio",
];

const FETCH_TIMEOUT: Duration = Duration::from_secs(300);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why the dataset is unavailable. Either variant is fatal: without the
/// table there is nothing to filter or chart.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch {url}: {cause:#}")]
    Fetch { url: String, cause: anyhow::Error },
    #[error("failed to parse salary data: {cause:#}")]
    Parse { cause: anyhow::Error },
}

// ---------------------------------------------------------------------------
// DatasetCache – fetch once, share for the process lifetime
// ---------------------------------------------------------------------------

/// Memoizes the loaded dataset. The first successful load wins and every
/// later call returns the same snapshot without touching the network; a
/// failed load is not cached, so the owner may try again.
#[derive(Debug, Default)]
pub struct DatasetCache {
    cell: OnceCell<Arc<SalaryDataset>>,
}

impl DatasetCache {
    pub const fn new() -> Self {
        DatasetCache {
            cell: OnceCell::new(),
        }
    }

    /// Fetch and parse `url`, or return the already-cached snapshot.
    pub fn get_or_fetch(&self, url: &str) -> Result<Arc<SalaryDataset>, LoadError> {
        self.get_or_load_with(|| {
            let bytes = fetch_csv(url)?;
            parse_salary_csv(bytes.as_slice())
        })
    }

    /// Same memoization with the load step swapped out. `load` runs at most
    /// once across all successful calls.
    pub fn get_or_load_with<F>(&self, load: F) -> Result<Arc<SalaryDataset>, LoadError>
    where
        F: FnOnce() -> Result<SalaryDataset, LoadError>,
    {
        self.cell
            .get_or_try_init(|| load().map(Arc::new))
            .map(Arc::clone)
    }
}

// ---------------------------------------------------------------------------
// HTTP fetch
// ---------------------------------------------------------------------------

/// Fetch the raw CSV bytes, blocking until the transfer completes.
fn fetch_csv(url: &str) -> Result<Vec<u8>, LoadError> {
    fetch_impl(url).map_err(|cause| LoadError::Fetch {
        url: url.to_string(),
        cause,
    })
}

fn fetch_impl(url: &str) -> anyhow::Result<Vec<u8>> {
    let runtime = tokio::runtime::Runtime::new().context("starting I/O runtime")?;
    runtime.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("building HTTP client")?;

        let response = client
            .get(url)
            .send()
            .await
            .context("sending request")?
            .error_for_status()
            .context("server returned an error status")?;

        let bytes = response.bytes().await.context("reading response body")?;
        Ok(bytes.to_vec())
    })
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// One CSV row before validation. Everything is optional so a single bad
/// row never aborts the whole parse.
#[derive(Debug, Deserialize)]
struct RawRow {
    work_year: Option<i32>,
    job_title: Option<String>,
    experience_level: Option<String>,
    company_location: Option<String>,
    salary_in_usd: Option<f64>,
    remote_ratio: Option<String>,
}

impl RawRow {
    /// Promote to a full record, or `None` when a required field is missing,
    /// empty, or (for the salary) not a finite number.
    fn into_record(self) -> Option<SalaryRecord> {
        Some(SalaryRecord {
            work_year: self.work_year?,
            job_title: non_empty(self.job_title)?,
            experience_level: non_empty(self.experience_level)?,
            company_location: non_empty(self.company_location)?,
            salary_in_usd: self.salary_in_usd.filter(|s| s.is_finite())?,
            remote_ratio: non_empty(self.remote_ratio)?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse the salary table. Rows with unreadable required fields are skipped
/// and counted; a missing column or zero usable rows fails the whole load.
pub fn parse_salary_csv<R: Read>(input: R) -> Result<SalaryDataset, LoadError> {
    parse_impl(input).map_err(|cause| LoadError::Parse { cause })
}

fn parse_impl<R: Read>(input: R) -> anyhow::Result<SalaryDataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);

    let headers = reader.headers().context("reading CSV headers")?.clone();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            bail!("missing required column '{required}'");
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (row_no, row) in reader.deserialize::<RawRow>().enumerate() {
        match row {
            Ok(raw) => match raw.into_record() {
                Some(record) => records.push(record),
                None => skipped += 1,
            },
            Err(err) => {
                log::debug!("row {row_no}: {err}");
                skipped += 1;
            }
        }
    }

    if records.is_empty() {
        bail!("no usable rows ({skipped} skipped)");
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} malformed rows");
    }

    Ok(SalaryDataset::from_records(records, skipped))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::data::model::testutil::record;

    const FULL_HEADER: &str = "work_year,experience_level,employment_type,job_title,salary,\
                               salary_currency,salary_in_usd,employee_residence,remote_ratio,\
                               company_size,company_location";

    #[test]
    fn parses_rows_and_ignores_extra_columns() {
        let csv = format!(
            "{FULL_HEADER}\n\
             2023,SE,FT,Data Scientist,160000,USD,150000,US,100,M,US\n\
             2023,MI,FT,Data Engineer,120000,USD,120000,US,0,L,US\n\
             2022,SE,CT,Data Scientist,90000,EUR,100000,DE,50,S,DE\n"
        );

        let ds = parse_salary_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.skipped_rows, 0);
        assert_eq!(ds.records[0].job_title, "Data Scientist");
        assert_eq!(ds.records[0].salary_in_usd, 150_000.0);
        assert_eq!(ds.records[1].remote_ratio, "0");
        assert_eq!(ds.years.iter().copied().collect::<Vec<_>>(), vec![2022, 2023]);
    }

    #[test]
    fn skips_malformed_rows_but_keeps_the_rest() {
        let csv = "\
work_year,job_title,experience_level,company_location,salary_in_usd,remote_ratio
2023,Data Scientist,SE,US,150000,100
2023,,SE,US,120000,100
not-a-year,Data Engineer,MI,US,110000,0
2022,Data Engineer,MI,DE,,50
2022,Data Analyst,EN,GB,90000,0
";
        let ds = parse_salary_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped_rows, 3);
        assert_eq!(ds.records[0].job_title, "Data Scientist");
        assert_eq!(ds.records[1].job_title, "Data Analyst");
    }

    #[test]
    fn short_rows_are_skipped_not_fatal() {
        let csv = "\
work_year,job_title,experience_level,company_location,salary_in_usd,remote_ratio
2023,Data Scientist,SE,US,150000,100
2023,Data Engineer
";
        let ds = parse_salary_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped_rows, 1);
    }

    #[test]
    fn missing_required_column_fails_and_names_it() {
        let csv = "\
work_year,experience_level,company_location,salary_in_usd,remote_ratio
2023,SE,US,150000,100
";
        let err = parse_salary_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains("job_title"), "got: {err}");
    }

    #[test]
    fn zero_usable_rows_fails() {
        let csv = "\
work_year,job_title,experience_level,company_location,salary_in_usd,remote_ratio
,,,,,
bad,,,,,a
";
        let err = parse_salary_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("no usable rows"), "got: {err}");
    }

    #[test]
    fn non_finite_salaries_are_skipped() {
        let csv = "\
work_year,job_title,experience_level,company_location,salary_in_usd,remote_ratio
2023,Data Scientist,SE,US,NaN,100
2023,Data Engineer,MI,US,120000,0
";
        let ds = parse_salary_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped_rows, 1);
        assert_eq!(ds.records[0].job_title, "Data Engineer");
    }

    #[test]
    fn cache_loads_at_most_once() {
        let cache = DatasetCache::new();
        let loads = AtomicUsize::new(0);

        let load = |salary: f64| {
            let loads = &loads;
            move || {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(SalaryDataset::from_records(
                    vec![record(2023, "Data Scientist", "SE", "US", salary)],
                    0,
                ))
            }
        };

        let first = cache.get_or_load_with(load(150_000.0)).unwrap();
        let second = cache.get_or_load_with(load(1.0)).unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.records[0].salary_in_usd, 150_000.0);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let cache = DatasetCache::new();

        let err = cache.get_or_load_with(|| {
            Err(LoadError::Parse {
                cause: anyhow::anyhow!("boom"),
            })
        });
        assert!(err.is_err());

        let ok = cache.get_or_load_with(|| {
            Ok(SalaryDataset::from_records(
                vec![record(2023, "Data Scientist", "SE", "US", 150_000.0)],
                0,
            ))
        });
        assert!(ok.is_ok());
    }
}
