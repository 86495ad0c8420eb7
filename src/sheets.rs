//! Spreadsheet debt lookup
//!
//! Fetches each fixed subject sheet through the Google Sheets `values.get`
//! API and extracts the row keyed by the student's display name (column 1).
//! Row 1 holds the topic headers; the matched row holds the scores, aligned
//! positionally with the headers. Subjects with no matching row are simply
//! omitted from the result.
//!
//! The transport is blocking HTTP and runs under `spawn_blocking`, gated by a
//! semaphore so concurrent lookups cannot exhaust the blocking thread pool.
//! There is no caching: every request builds a fresh client and re-fetches.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Fixed subject list; one worksheet per subject, in this order.
pub const SUBJECTS: [&str; 3] = ["Coding", "Math", "English"];

/// Headers and scores for one student row on one subject sheet.
///
/// `headers` and `scores` are positionally aligned. Scores are kept as the
/// raw cell strings; the controller decides what counts as a debt.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectReport {
    pub subject: String,
    pub headers: Vec<String>,
    pub scores: Vec<String>,
}

/// Per-subject report lookup by display name. Missing subjects are omitted,
/// not errors; `Err` means the backend itself was unreachable.
#[async_trait]
pub trait DebtLookup: Send + Sync {
    async fn lookup(&self, display_name: &str) -> Result<HashMap<String, SubjectReport>>;
}

/// Sheets `values.get` response body
#[derive(Debug, Deserialize, Default)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Google Sheets backed lookup
pub struct GoogleSheetsLookup {
    spreadsheet_id: String,
    api_key: String,
    timeout: Duration,
    workers: Arc<Semaphore>,
}

impl GoogleSheetsLookup {
    pub fn new(spreadsheet_id: &str, api_key: &str, timeout: Duration, workers: usize) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.to_string(),
            api_key: api_key.to_string(),
            timeout,
            workers: Arc::new(Semaphore::new(workers.max(1))),
        }
    }
}

#[async_trait]
impl DebtLookup for GoogleSheetsLookup {
    async fn lookup(&self, display_name: &str) -> Result<HashMap<String, SubjectReport>> {
        let _permit = self
            .workers
            .acquire()
            .await
            .map_err(|_| anyhow::anyhow!("Lookup worker pool closed"))?;

        let spreadsheet_id = self.spreadsheet_id.clone();
        let api_key = self.api_key.clone();
        let name = display_name.to_string();

        let handle =
            tokio::task::spawn_blocking(move || fetch_reports(&spreadsheet_id, &api_key, &name));

        tokio::time::timeout(self.timeout, handle)
            .await
            .context("Spreadsheet lookup timed out")?
            .context("Spreadsheet lookup worker panicked")?
    }
}

/// Fetch every subject sheet and pick out the student's row. Blocking.
fn fetch_reports(
    spreadsheet_id: &str,
    api_key: &str,
    display_name: &str,
) -> Result<HashMap<String, SubjectReport>> {
    let client = reqwest::blocking::Client::new();

    let mut reports = HashMap::new();
    for subject in SUBJECTS {
        let url = format!("{}/{}/values/{}", SHEETS_API_URL, spreadsheet_id, subject);
        let range: ValueRange = client
            .get(&url)
            .query(&[("key", api_key)])
            .send()
            .with_context(|| format!("Sheets request failed for {}", subject))?
            .error_for_status()
            .with_context(|| format!("Sheets API rejected request for {}", subject))?
            .json()
            .with_context(|| format!("Malformed Sheets response for {}", subject))?;

        match find_report(subject, &range.values, display_name) {
            Some(report) => {
                debug!(
                    "Sheet {}: found row for {:?} ({} topics)",
                    subject,
                    display_name,
                    report.headers.len()
                );
                reports.insert(subject.to_string(), report);
            }
            None => debug!("Sheet {}: no row for {:?}", subject, display_name),
        }
    }

    Ok(reports)
}

/// Extract a [`SubjectReport`] from a sheet grid.
///
/// Row 1 is the header row; the first column of every row is the display-name
/// key and is dropped from both headers and scores.
fn find_report(subject: &str, rows: &[Vec<String>], display_name: &str) -> Option<SubjectReport> {
    let headers = rows.first()?;
    let row = rows
        .iter()
        .skip(1)
        .find(|row| row.first().map(String::as_str) == Some(display_name))?;

    Some(SubjectReport {
        subject: subject.to_string(),
        headers: headers.iter().skip(1).cloned().collect(),
        scores: row.iter().skip(1).cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_find_report_matches_first_cell() {
        let rows = grid(&[
            &["Name", "Algebra", "Geometry"],
            &["Boris", "90", "85"],
            &["Anna", "30", "70"],
        ]);

        let report = find_report("Math", &rows, "Anna").unwrap();
        assert_eq!(report.subject, "Math");
        assert_eq!(report.headers, vec!["Algebra", "Geometry"]);
        assert_eq!(report.scores, vec!["30", "70"]);
    }

    #[test]
    fn test_find_report_no_row() {
        let rows = grid(&[&["Name", "Algebra"], &["Boris", "90"]]);
        assert!(find_report("Math", &rows, "Anna").is_none());
    }

    #[test]
    fn test_find_report_empty_grid() {
        assert!(find_report("Math", &[], "Anna").is_none());
    }

    #[test]
    fn test_find_report_header_row_not_matched_as_student() {
        // A student literally named like the key header must not match row 1.
        let rows = grid(&[&["Name", "Algebra"], &["Name", "10"]]);
        let report = find_report("Math", &rows, "Name").unwrap();
        assert_eq!(report.scores, vec!["10"]);
    }

    #[test]
    fn test_find_report_short_row_keeps_raw_lengths() {
        // Alignment gaps are the controller's problem, not the adapter's.
        let rows = grid(&[&["Name", "Algebra", "Geometry"], &["Anna", "30"]]);
        let report = find_report("Math", &rows, "Anna").unwrap();
        assert_eq!(report.headers.len(), 2);
        assert_eq!(report.scores.len(), 1);
    }
}
