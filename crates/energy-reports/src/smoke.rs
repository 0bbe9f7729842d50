//! Freshness check over the weekly inventory CSVs

use crate::error::{ReportError, Result};
use crate::series::parse_csv_date;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::path::Path;
use tracing::debug;

/// Oldest acceptable latest reading, in days
pub const MAX_AGE_DAYS: i64 = 45;

/// Check one CSV: it has rows, and when it has a `date` column the newest
/// date is at most [`MAX_AGE_DAYS`] old at `now`
///
/// Returns the newest date, if any.
pub fn check_csv(path: &Path, now: DateTime<Utc>) -> Result<Option<NaiveDate>> {
    let shown = path.display();
    let mut reader = csv::Reader::from_path(path)?;
    let date_idx = reader.headers()?.iter().position(|h| h.trim() == "date");

    let mut rows = 0usize;
    let mut latest: Option<NaiveDate> = None;
    for record in reader.records() {
        let record = record?;
        rows += 1;
        if let Some(date) = date_idx.and_then(|i| record.get(i)).and_then(parse_csv_date) {
            latest = latest.max(Some(date));
        }
    }

    if rows == 0 {
        return Err(ReportError::Other(format!("No data in {shown}")));
    }
    if date_idx.is_none() {
        return Ok(None);
    }

    let latest = latest.ok_or_else(|| ReportError::Other(format!("No valid date in {shown}")))?;
    let cutoff = now - Duration::days(MAX_AGE_DAYS);
    if latest.and_time(chrono::NaiveTime::MIN).and_utc() < cutoff {
        return Err(ReportError::Other(format!(
            "Latest date in {shown} is too old: {latest}"
        )));
    }

    debug!("{} is fresh (latest {})", shown, latest);
    Ok(Some(latest))
}

/// Check every CSV in order, stopping at the first failure
pub fn run<P: AsRef<Path>>(paths: &[P], now: DateTime<Utc>) -> Result<()> {
    for path in paths {
        check_csv(path.as_ref(), now)?;
    }
    Ok(())
}
