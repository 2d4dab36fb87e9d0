use std::path::PathBuf;

use thiserror::Error;

use crate::snapshot::PeriodKey;

/// Fatal conditions of a monitoring run. Any of these aborts the cycle
/// before a snapshot is written.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("baseline {path:?} is corrupt: {reason}")]
    CorruptBaseline { path: PathBuf, reason: String },
    #[error("snapshot for {period} is corrupt: {reason}")]
    CorruptSnapshot { period: PeriodKey, reason: String },
    #[error("no current balances to reconcile")]
    EmptyCurrentBalances,
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MonitorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
