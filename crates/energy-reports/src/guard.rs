//! Once-a-day send guard and report counters
//!
//! Both are small JSON files rewritten in place. Jobs run once a day from
//! cron, so there is no locking.

use crate::error::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const BRT: FixedOffset = match FixedOffset::west_opt(3 * 3600) {
    Some(offset) => offset,
    None => panic!("UTC-3 is a valid offset"),
};

/// Calendar "today" in a fixed UTC offset (UTC−3 unless configured)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrtClock {
    offset: FixedOffset,
}

impl Default for BrtClock {
    fn default() -> Self {
        Self { offset: BRT }
    }
}

impl BrtClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub const fn brt_offset() -> FixedOffset {
        BRT
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Local calendar date of a UTC instant
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SentinelFile {
    last_sent: String,
}

/// Parse the `last_sent` field of a sentinel document
///
/// Accepts a bare `YYYY-MM-DD` or a full ISO timestamp.
pub fn parse_last_sent(content: &str) -> Option<NaiveDate> {
    let file: SentinelFile = serde_json::from_str(content).ok()?;
    let raw = file.last_sent.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Marker file recording the last day a job delivered its report
#[derive(Debug, Clone)]
pub struct Sentinel {
    path: PathBuf,
}

impl Sentinel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Day recorded in the file; missing or malformed files read as `None`
    pub fn last_sent(&self) -> Option<NaiveDate> {
        let content = fs::read_to_string(&self.path).ok()?;
        let parsed = parse_last_sent(&content);
        if parsed.is_none() {
            debug!("Ignoring unreadable sentinel {}", self.path.display());
        }
        parsed
    }

    pub fn is_sent_on(&self, date: NaiveDate) -> bool {
        self.last_sent() == Some(date)
    }

    /// Record `date` as sent, creating parent directories
    pub fn mark_sent(&self, date: NaiveDate) -> Result<()> {
        ensure_parent(&self.path)?;
        let body = serde_json::to_string(&SentinelFile {
            last_sent: date.format("%Y-%m-%d").to_string(),
        })?;
        fs::write(&self.path, body)?;
        debug!("Sentinel {} set to {}", self.path.display(), date);
        Ok(())
    }
}

/// Per-report sequence numbers ("Nº 42") kept in one JSON object
#[derive(Debug, Clone)]
pub struct Counter {
    path: PathBuf,
}

impl Counter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> BTreeMap<String, Value> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Counter file {} is not valid JSON ({}); starting over", self.path.display(), e);
            BTreeMap::new()
        })
    }

    /// Current value of `key`, 0 when absent
    pub fn current(&self, key: &str) -> u64 {
        self.load().get(key).map_or(0, as_count)
    }

    /// Increment `key`, persist, and return the new value
    pub fn next(&self, key: &str) -> Result<u64> {
        let mut data = self.load();
        let value = data.get(key).map_or(0, as_count) + 1;
        data.insert(key.to_string(), Value::from(value));

        ensure_parent(&self.path)?;
        fs::write(&self.path, serde_json::to_string_pretty(&data)?)?;
        Ok(value)
    }
}

fn as_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_brt_date_boundary() {
        let clock = BrtClock::default();
        // 02:30 UTC is still the previous evening in UTC-3
        let instant = Utc.with_ymd_and_hms(2025, 3, 10, 2, 30, 0).unwrap();
        assert_eq!(clock.date_of(instant), day(2025, 3, 9));

        let instant = Utc.with_ymd_and_hms(2025, 3, 10, 3, 0, 0).unwrap();
        assert_eq!(clock.date_of(instant), day(2025, 3, 10));
    }

    #[test]
    fn test_parse_last_sent() {
        assert_eq!(parse_last_sent(r#"{"last_sent":"2025-01-31"}"#), Some(day(2025, 1, 31)));
        assert_eq!(
            parse_last_sent(r#"{"last_sent":"2025-01-31T09:12:00-03:00"}"#),
            Some(day(2025, 1, 31))
        );
        assert_eq!(parse_last_sent("not json"), None);
        assert_eq!(parse_last_sent(r#"{"other":"x"}"#), None);
    }

    #[test]
    fn test_sentinel_roundtrip() {
        let dir = tempdir().unwrap();
        let sentinel = Sentinel::new(dir.path().join("nested/sentinels/gas_daily.sent"));

        assert!(!sentinel.is_sent_on(day(2025, 6, 2)));

        sentinel.mark_sent(day(2025, 6, 2)).unwrap();
        assert!(sentinel.is_sent_on(day(2025, 6, 2)));
        assert!(!sentinel.is_sent_on(day(2025, 6, 3)));

        let raw = fs::read_to_string(sentinel.path()).unwrap();
        assert_eq!(raw, r#"{"last_sent":"2025-06-02"}"#);
    }

    #[test]
    fn test_corrupt_sentinel_reads_as_not_sent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("oil_daily.sent");
        fs::write(&path, "{{{").unwrap();

        let sentinel = Sentinel::new(&path);
        assert_eq!(sentinel.last_sent(), None);
    }

    #[test]
    fn test_counter_increments_per_key() {
        let dir = tempdir().unwrap();
        let counter = Counter::new(dir.path().join("counters.json"));

        assert_eq!(counter.next("diario_gas").unwrap(), 1);
        assert_eq!(counter.next("diario_gas").unwrap(), 2);
        assert_eq!(counter.next("oil_daily").unwrap(), 1);
        assert_eq!(counter.current("diario_gas"), 2);
        assert_eq!(counter.current("missing"), 0);
    }

    #[test]
    fn test_counter_keeps_other_keys_and_recovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counters.json");
        fs::write(&path, r#"{"diario_ulsd": "41", "note": "keep"}"#).unwrap();

        let counter = Counter::new(&path);
        assert_eq!(counter.next("diario_ulsd").unwrap(), 42);

        let saved: BTreeMap<String, Value> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["note"], Value::from("keep"));

        fs::write(&path, "garbage").unwrap();
        assert_eq!(counter.next("diario_ulsd").unwrap(), 1);
    }
}
