use rust_decimal::Decimal;

use crate::history::History;
use crate::models::{Balances, Change, Classification, HolderRecord};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Keep addresses whose current balance is zero and report them as sold out.
    pub include_zero_balances: bool,
}

/// Applies the zero-balance policy to the folded current balances.
/// Negative balances are never reportable.
pub fn select_current(current: Balances, options: ReconcileOptions) -> Balances {
    current
        .into_iter()
        .filter(|(_, amount)| {
            *amount > Decimal::ZERO || (options.include_zero_balances && amount.is_zero())
        })
        .collect()
}

/// Builds one record per address in `current`. Baseline-only and
/// history-only addresses are not reported.
///
/// The previous amount comes from `previous` when the address appears there and
/// falls back to the baseline amount otherwise, so a holder first seen today
/// is not shown as a jump from zero.
pub fn reconcile(
    current: &Balances,
    baseline: &Balances,
    history: &History,
    previous: Option<&Balances>,
) -> Vec<HolderRecord> {
    current
        .iter()
        .map(|(address, &current_amount)| {
            let initial_amount = baseline.get(address).copied().unwrap_or(Decimal::ZERO);
            let previous_amount = previous
                .and_then(|p| p.get(address))
                .copied()
                .unwrap_or(initial_amount);
            let delta = current_amount - previous_amount;
            let trend = history
                .get(address)
                .cloned()
                .unwrap_or_else(|| vec![current_amount]);

            HolderRecord {
                address: address.clone(),
                initial_amount,
                previous_amount,
                current_amount,
                delta,
                change: Change::of(delta),
                trend,
                classification: Classification::from_initial(initial_amount),
                sold_out: current_amount.is_zero(),
            }
        })
        .collect()
}
