use super::datatype::*;
use crate::error::LedgerError;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Label used for the summary row of every table.
pub const TOTAL_LABEL: &str = "合计";

/// Ordered entries aggregated from one or more voucher files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerBatch {
    pub entries: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub debit_total: Decimal,
    pub credit_total: Decimal,
}

/// One rendered table line. Amount cells are empty when the source had none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub id: String,
    pub account: String,
    pub description: String,
    pub debit: String,
    pub credit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerTable {
    /// Entry rows followed by exactly one summary row.
    pub rows: Vec<DisplayRow>,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRow {
    pub account: String,
    pub debit_total: Decimal,
    pub credit_total: Decimal,
    pub entry_count: usize,
}

fn add(acc: Decimal, value: Decimal) -> Result<Decimal, LedgerError> {
    acc.checked_add(value).ok_or(LedgerError::Overflow)
}

/// Sum of the absolute debit and credit values of `entries`, or `None` when
/// it leaves the decimal range. Every total, per-account sum and difference
/// over these entries is bounded by it.
pub fn magnitude(entries: &[LedgerEntry]) -> Option<Decimal> {
    entries.iter().try_fold(Decimal::ZERO, |acc, e| {
        acc.checked_add(e.debit_value().abs())?
            .checked_add(e.credit_value().abs())
    })
}

impl Totals {
    pub fn from_entries(entries: &[LedgerEntry]) -> Result<Self, LedgerError> {
        entries.iter().try_fold(Totals::default(), |acc, e| {
            Ok(Totals {
                debit_total: add(acc.debit_total, e.debit_value())?,
                credit_total: add(acc.credit_total, e.credit_value())?,
            })
        })
    }
    /// Advisory only; an imbalanced batch is still a valid batch.
    pub fn is_balanced(&self) -> bool {
        self.debit_total == self.credit_total
    }
    /// `None` when debit and credit sit at opposite ends of the decimal range.
    pub fn difference(&self) -> Option<Decimal> {
        self.debit_total.checked_sub(self.credit_total)
    }
}

impl DisplayRow {
    pub fn from_entry(entry: &LedgerEntry) -> Self {
        Self {
            id: entry.id.clone(),
            account: entry.account.clone(),
            description: entry.description.clone(),
            debit: entry
                .debit
                .as_ref()
                .map(|a| a.as_str().to_string())
                .unwrap_or_default(),
            credit: entry
                .credit
                .as_ref()
                .map(|a| a.as_str().to_string())
                .unwrap_or_default(),
        }
    }
    pub fn summary(totals: &Totals) -> Self {
        Self {
            id: TOTAL_LABEL.to_string(),
            account: String::new(),
            description: String::new(),
            debit: totals.debit_total.to_string(),
            credit: totals.credit_total.to_string(),
        }
    }
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.id,
            &self.account,
            &self.description,
            &self.debit,
            &self.credit,
        ]
    }
}

/// Entry rows plus one `合计` row. Fails only when a total leaves the
/// decimal range.
pub fn build_table(entries: &[LedgerEntry]) -> Result<LedgerTable, LedgerError> {
    let totals = Totals::from_entries(entries)?;
    let mut rows: Vec<DisplayRow> = entries.iter().map(DisplayRow::from_entry).collect();
    rows.push(DisplayRow::summary(&totals));
    Ok(LedgerTable { rows, totals })
}

/// Per-account debit/credit sums in first-appearance order, closed by a
/// `合计` row carrying the voucher totals.
pub fn account_summary(entries: &[LedgerEntry]) -> Result<Vec<AccountRow>, LedgerError> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<AccountRow> = Vec::new();
    for e in entries {
        let pos = *index.entry(e.account.as_str()).or_insert_with(|| {
            rows.push(AccountRow {
                account: e.account.clone(),
                debit_total: Decimal::ZERO,
                credit_total: Decimal::ZERO,
                entry_count: 0,
            });
            rows.len() - 1
        });
        let row = &mut rows[pos];
        row.debit_total = add(row.debit_total, e.debit_value())?;
        row.credit_total = add(row.credit_total, e.credit_value())?;
        row.entry_count += 1;
    }
    let totals = Totals::from_entries(entries)?;
    rows.push(AccountRow {
        account: TOTAL_LABEL.to_string(),
        debit_total: totals.debit_total,
        credit_total: totals.credit_total,
        entry_count: entries.len(),
    });
    Ok(rows)
}

impl LedgerBatch {
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }
    pub fn extend(&mut self, entries: impl IntoIterator<Item = LedgerEntry>) {
        self.entries.extend(entries);
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn totals(&self) -> Result<Totals, LedgerError> {
        Totals::from_entries(&self.entries)
    }
    pub fn table(&self) -> Result<LedgerTable, LedgerError> {
        build_table(&self.entries)
    }
    pub fn account_summary(&self) -> Result<Vec<AccountRow>, LedgerError> {
        account_summary(&self.entries)
    }
}
