use ledger_desk::stat::{Amount, LedgerEntry, TOTAL_LABEL, build_table};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn amount(v: Option<i64>) -> Option<Amount> {
    v.map(|n| Amount::parse(&n.to_string()).unwrap())
}

proptest! {
    #[test]
    fn totals_are_sums_of_present_amounts(
        lines in prop::collection::vec(
            (prop::option::of(-1_000_000i64..1_000_000), prop::option::of(-1_000_000i64..1_000_000)),
            0..40,
        )
    ) {
        let entries: Vec<LedgerEntry> = lines
            .iter()
            .enumerate()
            .map(|(i, (d, c))| LedgerEntry::new(i.to_string(), "科目", "", amount(*d), amount(*c)))
            .collect();
        let table = build_table(&entries).unwrap();

        let debit: i64 = lines.iter().filter_map(|(d, _)| *d).sum();
        let credit: i64 = lines.iter().filter_map(|(_, c)| *c).sum();
        prop_assert_eq!(table.totals.debit_total, Decimal::from(debit));
        prop_assert_eq!(table.totals.credit_total, Decimal::from(credit));
        prop_assert_eq!(table.rows.len(), entries.len() + 1);

        let summary = table.rows.last().unwrap();
        prop_assert_eq!(summary.id.as_str(), TOTAL_LABEL);
        prop_assert_eq!(&summary.debit, &debit.to_string());
        prop_assert_eq!(&summary.credit, &credit.to_string());
    }
}
