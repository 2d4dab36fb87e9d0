use std::{fs, path::Path};

use eyre::Result;
use serde::Serialize;
use tracing::info;

use crate::models::HolderRecord;
use crate::snapshot::PeriodKey;

/// Everything a renderer needs for one run: ranked rows plus header figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub project: String,
    pub generated_at: String, // local time, "%Y-%m-%d %H:%M:%S"
    pub period: PeriodKey,
    pub active_holders: usize,
    pub holders: Vec<HolderRecord>,
}

impl Report {
    pub fn holder(&self, address: &str) -> Option<&HolderRecord> {
        self.holders.iter().find(|r| r.address == address)
    }
}

/// Write the report as pretty JSON, renamed into place once complete
pub fn write_report(path: &Path, report: &Report) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    info!(
        "📝 Report for {} written to {:?} ({} active holders)",
        report.period, path, report.active_holders
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Change, Classification};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn sample() -> Report {
        Report {
            project: "ZZZZZZZ".to_string(),
            generated_at: "2025-03-02 09:00:00".to_string(),
            period: "2025-03-02".parse().unwrap(),
            active_holders: 1,
            holders: vec![HolderRecord {
                address: "bc1pholder".to_string(),
                initial_amount: dec!(100),
                previous_amount: dec!(100),
                current_amount: dec!(80),
                delta: dec!(-20),
                change: Change::Down,
                trend: vec![dec!(100), dec!(80)],
                classification: Classification::Original,
                sold_out: false,
            }],
        }
    }

    #[test]
    fn report_json_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("report.json");
        write_report(&path, &sample()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["period"], "2025-03-02");
        assert_eq!(value["active_holders"], 1);
        let row = &value["holders"][0];
        assert_eq!(row["classification"], "ORIGINAL");
        assert_eq!(row["change"], "down");
        assert_eq!(row["delta"], "-20");
        assert_eq!(row["trend"], serde_json::json!(["100", "80"]));
    }

    #[test]
    fn holder_lookup() {
        let report = sample();
        assert!(report.holder("bc1pholder").is_some());
        assert!(report.holder("BC1PHOLDER").is_none());
    }
}
