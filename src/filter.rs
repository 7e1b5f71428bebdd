use chrono::NaiveDate;
use tracing::{info, warn};

use crate::dates;
use crate::model::ScanRecord;

/// Keep the records whose date falls on `today`.
///
/// `today` is computed once by the caller, so every comparison within a run
/// uses the same day even if the run straddles midnight. Records with an
/// empty or unusable date are dropped without aborting the filter. Input
/// order is preserved.
pub fn filter_today(records: Vec<ScanRecord>, today: NaiveDate) -> Vec<ScanRecord> {
    let total = records.len();
    let kept: Vec<ScanRecord> = records
        .into_iter()
        .filter(|record| {
            if record.date.trim().is_empty() {
                return false;
            }
            match dates::normalize(&record.date) {
                Ok(date) => date == today,
                Err(err) => {
                    warn!(raw = %record.date, %err, "skipping record with unusable date");
                    false
                }
            }
        })
        .collect();
    info!(kept = kept.len(), total, %today, "filtered feed to the current day");
    kept
}
