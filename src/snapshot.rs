use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::MonitorError;
use crate::models::{fold_balances, Balances, SnapshotEntry};

const PERIOD_FORMAT: &str = "%Y-%m-%d";

/// Observation period of a snapshot: one calendar day in the monitor's
/// reporting timezone. Orders the same way as its `YYYY-MM-DD` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PeriodKey(NaiveDate);

impl PeriodKey {
    /// Period containing `now` as seen from `offset`.
    pub fn at(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self(now.with_timezone(&offset).date_naive())
    }

    fn file_name(&self) -> String {
        format!("{self}.json")
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(PERIOD_FORMAT))
    }
}

impl FromStr for PeriodKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, PERIOD_FORMAT).map(Self)
    }
}

/// Owner of the per-period snapshot artifacts in the data directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Persisted periods, oldest first. Files whose name is not a
    /// `YYYY-MM-DD.json` period are not snapshots and are skipped.
    pub fn list_snapshots(&self) -> Result<Vec<PeriodKey>, MonitorError> {
        let dir = match fs::read_dir(&self.dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MonitorError::io(&self.dir, e)),
        };

        let mut periods = Vec::new();
        for entry in dir {
            let entry = entry.map_err(|e| MonitorError::io(&self.dir, e))?;
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            match stem.parse::<PeriodKey>() {
                // re-check the round trip so "2024-1-5.json" does not alias "2024-01-05.json"
                Ok(period) if period.to_string() == stem => periods.push(period),
                _ => debug!("Skipping non-snapshot file {:?}", name),
            }
        }
        periods.sort();
        Ok(periods)
    }

    pub fn read_snapshot(&self, period: PeriodKey) -> Result<Balances, MonitorError> {
        let path = self.path_for(period);
        let raw = fs::read(&path).map_err(|e| MonitorError::io(&path, e))?;
        let corrupt = |reason: String| MonitorError::CorruptSnapshot { period, reason };

        let entries: Vec<SnapshotEntry> =
            serde_json::from_slice(&raw).map_err(|e| corrupt(e.to_string()))?;
        if let Some(bad) = entries.iter().find(|e| e.current_amount < Decimal::ZERO) {
            return Err(corrupt(format!(
                "negative balance {} for {}",
                bad.current_amount, bad.address
            )));
        }

        Ok(fold_balances(
            entries.into_iter().map(|e| (e.address, e.current_amount)),
        ))
    }

    /// Persists the snapshot for `period`, replacing any earlier artifact for
    /// the same period. The file is renamed into place once fully written.
    pub fn write_snapshot(&self, period: PeriodKey, balances: &Balances) -> Result<(), MonitorError> {
        fs::create_dir_all(&self.dir).map_err(|e| MonitorError::io(&self.dir, e))?;

        let entries: Vec<SnapshotEntry> = balances
            .iter()
            .map(|(address, amount)| SnapshotEntry {
                address: address.clone(),
                current_amount: *amount,
            })
            .collect();
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| MonitorError::io(&self.dir, e.into()))?;

        let path = self.path_for(period);
        let tmp = self.dir.join(format!("{}.tmp", period.file_name()));
        fs::write(&tmp, json).map_err(|e| MonitorError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| MonitorError::io(&path, e))?;

        info!("💾 Saved snapshot {} ({} holders)", period, entries.len());
        Ok(())
    }

    fn path_for(&self, period: PeriodKey) -> PathBuf {
        self.dir.join(period.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn period(s: &str) -> PeriodKey {
        s.parse().unwrap()
    }

    #[test]
    fn period_is_taken_in_reporting_timezone() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 17, 30, 0).unwrap();
        let beijing = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(PeriodKey::at(now, beijing), period("2025-03-02"));
        assert_eq!(PeriodKey::at(now, FixedOffset::east_opt(0).unwrap()), period("2025-03-01"));
    }

    #[test]
    fn list_is_chronological_and_filtered() {
        let dir = tempdir().unwrap();
        for name in [
            "2025-03-10.json",
            "2024-12-31.json",
            "2025-03-02.json",
            "initial.json",
            "report.json",
            "2025-03-11.json.tmp",
            "2025-3-4.json",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), "[]").unwrap();
        }

        let periods = SnapshotStore::new(dir.path()).list_snapshots().unwrap();
        assert_eq!(
            periods,
            vec![period("2024-12-31"), period("2025-03-02"), period("2025-03-10")]
        );
    }

    #[test]
    fn list_of_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("absent"));
        assert!(store.list_snapshots().unwrap().is_empty());
    }

    #[test]
    fn write_then_read_and_overwrite_same_period() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let day = period("2025-03-02");

        let first = Balances::from([("bc1pa".to_string(), dec!(10))]);
        store.write_snapshot(day, &first).unwrap();
        let second = Balances::from([
            ("bc1pa".to_string(), dec!(7)),
            ("bc1pb".to_string(), dec!(3.5)),
        ]);
        store.write_snapshot(day, &second).unwrap();

        assert_eq!(store.list_snapshots().unwrap(), vec![day]);
        assert_eq!(store.read_snapshot(day).unwrap(), second);
        assert!(!dir.path().join("2025-03-02.json.tmp").exists());
    }

    #[test]
    fn duplicate_rows_on_disk_fold_to_last() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("2025-03-02.json"),
            r#"[{"address":"a","current_amount":1},{"address":"a","current_amount":2}]"#,
        )
        .unwrap();

        let balances = SnapshotStore::new(dir.path())
            .read_snapshot(period("2025-03-02"))
            .unwrap();
        assert_eq!(balances, Balances::from([("a".to_string(), dec!(2))]));
    }

    #[test]
    fn corrupt_snapshot_reports_its_period() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("2025-03-02.json"), "[{").unwrap();

        let err = SnapshotStore::new(dir.path())
            .read_snapshot(period("2025-03-02"))
            .unwrap_err();
        match err {
            MonitorError::CorruptSnapshot { period: p, .. } => assert_eq!(p, period("2025-03-02")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_utf8_snapshot_is_corrupt() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("2025-03-02.json"), [0xff, 0xfe, 0x5b]).unwrap();

        let err = SnapshotStore::new(dir.path())
            .read_snapshot(period("2025-03-02"))
            .unwrap_err();
        assert!(matches!(err, MonitorError::CorruptSnapshot { .. }));
    }

    #[test]
    fn identical_balances_give_identical_bytes() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let balances = Balances::from([
            ("bc1pz".to_string(), dec!(1)),
            ("bc1pa".to_string(), dec!(2)),
        ]);

        store.write_snapshot(period("2025-03-01"), &balances).unwrap();
        store.write_snapshot(period("2025-03-02"), &balances).unwrap();
        assert_eq!(
            fs::read(dir.path().join("2025-03-01.json")).unwrap(),
            fs::read(dir.path().join("2025-03-02.json")).unwrap()
        );
    }
}
