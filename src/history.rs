use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::{Address, Balances};
use crate::snapshot::PeriodKey;

/// Per-address balances in chronological order, one point per snapshot the
/// address appears in.
pub type History = HashMap<Address, Vec<Decimal>>;

/// Replays `snapshots` (already sorted by period) into trend series.
/// A period in which an address is absent leaves no point, it is not zero-filled.
pub fn build_history<'a, I>(snapshots: I) -> History
where
    I: IntoIterator<Item = (PeriodKey, &'a Balances)>,
{
    let mut history = History::new();
    let mut last: Option<PeriodKey> = None;
    for (period, balances) in snapshots {
        debug_assert!(last.map_or(true, |p| p < period), "snapshots out of order");
        last = Some(period);
        for (address, balance) in balances {
            history.entry(address.clone()).or_default().push(*balance);
        }
    }
    history
}
