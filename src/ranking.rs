use rust_decimal::Decimal;

use crate::models::HolderRecord;

/// Orders records by current balance, largest first. The sort is stable so
/// equal balances keep their input order.
pub fn assemble(mut records: Vec<HolderRecord>) -> Vec<HolderRecord> {
    records.sort_by(|a, b| b.current_amount.cmp(&a.current_amount));
    records
}

/// Number of holders with a strictly positive current balance.
pub fn active_holder_count(records: &[HolderRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.current_amount > Decimal::ZERO)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;
    use crate::models::Balances;
    use crate::reconcile::reconcile;
    use rust_decimal_macros::dec;

    fn records(pairs: &[(&str, Decimal)]) -> Vec<HolderRecord> {
        let current: Balances = pairs.iter().map(|(a, b)| (a.to_string(), *b)).collect();
        reconcile(&current, &Balances::new(), &History::new(), None)
    }

    #[test]
    fn sorted_by_current_descending() {
        let ranked = assemble(records(&[("A", dec!(80)), ("C", dec!(10)), ("B", dec!(50))]));
        let order: Vec<&str> = ranked.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(order, ["A", "B", "C"]);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].current_amount >= w[1].current_amount));
    }

    #[test]
    fn ties_keep_input_order() {
        // reconcile emits records in address order
        let ranked = assemble(records(&[
            ("d", dec!(5)),
            ("b", dec!(5)),
            ("top", dec!(9)),
            ("a", dec!(5)),
        ]));
        let order: Vec<&str> = ranked.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(order, ["top", "a", "b", "d"]);
    }

    #[test]
    fn active_count_skips_zero_rows() {
        let ranked = assemble(records(&[("a", dec!(1)), ("b", dec!(0)), ("c", dec!(2))]));
        assert_eq!(active_holder_count(&ranked), 2);
        assert_eq!(ranked.last().unwrap().address, "b");
    }
}
