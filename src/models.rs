// src/models.rs
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Holder address, compared byte for byte (no case folding).
pub type Address = String;

/// One balance per address. Ordered by address so every iteration over a
/// snapshot is deterministic.
pub type Balances = BTreeMap<Address, Decimal>;

/// Folds `(address, amount)` pairs into a mapping in a single pass.
/// A repeated address keeps the amount of its last occurrence.
pub fn fold_balances<I>(entries: I) -> Balances
where
    I: IntoIterator<Item = (Address, Decimal)>,
{
    entries
        .into_iter()
        .fold(Balances::new(), |mut acc, (address, amount)| {
            acc.insert(address, amount);
            acc
        })
}

/// Row of the baseline artifact (`initial.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub address: Address,
    pub amount: Decimal,
}

/// Row of a snapshot artifact (`YYYY-MM-DD.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub address: Address,
    pub current_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    /// Held a positive amount in the baseline.
    Original,
    New,
}

impl Classification {
    pub fn from_initial(initial_amount: Decimal) -> Self {
        if initial_amount > Decimal::ZERO {
            Self::Original
        } else {
            Self::New
        }
    }
}

/// Sign of the period-over-period delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    Up,
    Down,
    Flat,
}

impl Change {
    pub fn of(delta: Decimal) -> Self {
        if delta > Decimal::ZERO {
            Self::Up
        } else if delta < Decimal::ZERO {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

/// Fully computed report row for one currently observed address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolderRecord {
    pub address: Address,
    pub initial_amount: Decimal,
    pub previous_amount: Decimal,
    pub current_amount: Decimal,
    pub delta: Decimal,
    pub change: Change,
    pub trend: Vec<Decimal>,
    pub classification: Classification,
    pub sold_out: bool,
}
