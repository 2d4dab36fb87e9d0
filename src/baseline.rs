use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::MonitorError;
use crate::models::{fold_balances, Balances, BaselineEntry};

pub const BASELINE_FILE: &str = "initial.json";

/// Read-only access to the one-time baseline captured before monitoring began.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    path: PathBuf,
}

impl BaselineStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(BASELINE_FILE),
        }
    }

    /// Loads the baseline mapping. A missing artifact yields an empty mapping;
    /// an unreadable one is fatal, nothing partial is returned.
    pub fn load_baseline(&self) -> Result<Balances, MonitorError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("No baseline at {:?}, every holder will be NEW", self.path);
                return Ok(Balances::new());
            }
            Err(e) => return Err(MonitorError::io(&self.path, e)),
        };

        let entries: Vec<BaselineEntry> =
            serde_json::from_slice(&raw).map_err(|e| self.corrupt(e.to_string()))?;

        if let Some(bad) = entries.iter().find(|e| e.amount < Decimal::ZERO) {
            return Err(self.corrupt(format!(
                "negative amount {} for {}",
                bad.amount, bad.address
            )));
        }

        let rows = entries.len();
        let baseline = fold_balances(entries.into_iter().map(|e| (e.address, e.amount)));
        info!(
            "Loaded baseline: {} addresses ({} rows)",
            baseline.len(),
            rows
        );
        Ok(baseline)
    }

    fn corrupt(&self, reason: String) -> MonitorError {
        MonitorError::CorruptBaseline {
            path: self.path.clone(),
            reason,
        }
    }
}
