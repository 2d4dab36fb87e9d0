use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::baseline::BaselineStore;
use crate::error::MonitorError;
use crate::history::build_history;
use crate::models::{fold_balances, Address, Balances};
use crate::ranking::{active_holder_count, assemble};
use crate::reconcile::{reconcile, select_current, ReconcileOptions};
use crate::report::Report;
use crate::snapshot::{PeriodKey, SnapshotStore};

/// Inputs of one run besides the stores.
#[derive(Debug, Clone)]
pub struct Cycle {
    pub project: String,
    pub period: PeriodKey,
    pub generated_at: String,
    pub options: ReconcileOptions,
}

/// One fetch → persist → reconcile → assemble pass over already fetched balances.
///
/// Every persisted snapshot is validated before the current one is written, so
/// a fatal error leaves the data directory as it was.
pub fn run_cycle(
    baseline_store: &BaselineStore,
    snapshots: &SnapshotStore,
    cycle: &Cycle,
    fetched: Vec<(Address, Decimal)>,
) -> Result<Report, MonitorError> {
    let baseline = baseline_store.load_baseline()?;

    let fetched_rows = fetched.len();
    let current = select_current(fold_balances(fetched), cycle.options);
    if current.is_empty() {
        return Err(MonitorError::EmptyCurrentBalances);
    }
    info!(
        "Current balances: {} holders ({} rows fetched)",
        current.len(),
        fetched_rows
    );

    // The current period's artifact, if any, is about to be replaced.
    let mut persisted: Vec<(PeriodKey, Balances)> = Vec::new();
    for period in snapshots.list_snapshots()? {
        if period == cycle.period {
            debug!("Replacing earlier snapshot for {}", period);
            continue;
        }
        persisted.push((period, snapshots.read_snapshot(period)?));
    }

    snapshots.write_snapshot(cycle.period, &current)?;

    // persisted is sorted; everything before `split` precedes the current period
    let split = persisted.partition_point(|(period, _)| *period < cycle.period);
    let previous = match persisted[..split].last() {
        Some((period, balances)) => {
            info!("Comparing against snapshot {}", period);
            Some(balances)
        }
        None => {
            info!("No previous snapshot, comparing against baseline");
            None
        }
    };

    let ordered = persisted[..split]
        .iter()
        .map(|(period, balances)| (*period, balances))
        .chain(std::iter::once((cycle.period, &current)))
        .chain(persisted[split..].iter().map(|(period, balances)| (*period, balances)));
    let history = build_history(ordered);
    debug!(
        "History rebuilt for {} addresses over {} snapshots",
        history.len(),
        persisted.len() + 1
    );

    let holders = assemble(reconcile(&current, &baseline, &history, previous));
    let active_holders = active_holder_count(&holders);

    Ok(Report {
        project: cycle.project.clone(),
        generated_at: cycle.generated_at.clone(),
        period: cycle.period,
        active_holders,
        holders,
    })
}
