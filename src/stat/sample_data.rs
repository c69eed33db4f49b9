use rust_decimal::Decimal;

use super::datatype::{Amount, LedgerEntry};
use super::ledger::LedgerBatch;

/// Voucher shown when the ledger directory holds no usable data.
pub fn sample_voucher() -> LedgerBatch {
    let amount = Amount::from(Decimal::from(52_100));
    LedgerBatch::new(vec![
        LedgerEntry::new(
            "1",
            "银行存款",
            "收回维力贸易公司前欠购货款",
            Some(amount.clone()),
            None,
        ),
        LedgerEntry::new(
            "2",
            "应收账款-维力贸易公司",
            "收回前欠购货款",
            None,
            Some(amount),
        ),
    ])
}
