use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Top-level key holding the entry list of a voucher file.
pub const DETAIL_KEY: &str = "明细";

/// Amount as written in the voucher: the literal text is kept for display,
/// the decimal value is used for totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    raw: String,
    value: Decimal,
}

/// Optional `-`, digits, and an optional `.` followed by digits. Rejects the
/// extra forms `Decimal::from_str` takes (`_` separators, exponents, `+`).
fn is_plain_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    match unsigned.split_once('.') {
        Some((int, frac)) => digits(int) && digits(frac),
        None => digits(unsigned),
    }
}

impl Amount {
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        let text = raw.trim();
        let invalid = || LedgerError::InvalidAmount(raw.to_string());
        if !is_plain_decimal(text) {
            return Err(invalid());
        }
        let value = Decimal::from_str(text).map_err(|_| invalid())?;
        Ok(Self {
            raw: raw.to_string(),
            value,
        })
    }
    pub fn as_str(&self) -> &str {
        &self.raw
    }
    pub fn value(&self) -> Decimal {
        self.value
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self {
            raw: value.to_string(),
            value,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Number(serde_json::Number),
}

impl RawScalar {
    fn into_text(self) -> String {
        match self {
            RawScalar::Text(s) => s,
            RawScalar::Number(n) => n.to_string(),
        }
    }
}

// null, "" and a missing key all mean "no amount"
fn de_amount<'de, D>(deserializer: D) -> Result<Option<Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawScalar> = Option::deserialize(deserializer)?;
    let text = match raw {
        Some(v) => v.into_text(),
        None => return Ok(None),
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    Amount::parse(&text)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

fn ser_amount<S>(amount: &Option<Amount>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match amount {
        Some(a) => serializer.serialize_str(a.as_str()),
        None => serializer.serialize_none(),
    }
}

fn de_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawScalar> = Option::deserialize(deserializer)?;
    Ok(raw.map(RawScalar::into_text).unwrap_or_default())
}

/// One line of an accounting voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "编号", default, deserialize_with = "de_label")]
    pub id: String,
    #[serde(rename = "科目", default, deserialize_with = "de_label")]
    pub account: String,
    #[serde(rename = "摘要", default, deserialize_with = "de_label")]
    pub description: String,
    #[serde(
        rename = "借方金额",
        default,
        deserialize_with = "de_amount",
        serialize_with = "ser_amount"
    )]
    pub debit: Option<Amount>,
    #[serde(
        rename = "贷方金额",
        default,
        deserialize_with = "de_amount",
        serialize_with = "ser_amount"
    )]
    pub credit: Option<Amount>,
}

impl LedgerEntry {
    pub fn new(
        id: impl Into<String>,
        account: impl Into<String>,
        description: impl Into<String>,
        debit: Option<Amount>,
        credit: Option<Amount>,
    ) -> Self {
        Self {
            id: id.into(),
            account: account.into(),
            description: description.into(),
            debit,
            credit,
        }
    }
    pub fn debit_value(&self) -> Decimal {
        self.debit.as_ref().map_or(Decimal::ZERO, Amount::value)
    }
    pub fn credit_value(&self) -> Decimal {
        self.credit.as_ref().map_or(Decimal::ZERO, Amount::value)
    }
}

/// On-disk shape of a voucher file. Keys other than `明细` are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoucherFile {
    #[serde(rename = "明细", default)]
    pub entries: Vec<LedgerEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_amount_shapes() {
        let json = r#"{
            "凭证号": "记-001",
            "明细": [
                {"编号": "1", "科目": "银行存款", "摘要": "收回货款", "借方金额": "52100", "贷方金额": ""},
                {"编号": 2, "科目": "应收账款", "摘要": "收回货款", "借方金额": null, "贷方金额": 52100},
                {"编号": "3", "科目": "库存现金"}
            ]
        }"#;
        let file: VoucherFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.entries.len(), 3);

        let first = &file.entries[0];
        assert_eq!(first.debit.as_ref().map(Amount::as_str), Some("52100"));
        assert!(first.credit.is_none());

        let second = &file.entries[1];
        assert_eq!(second.id, "2");
        assert!(second.debit.is_none());
        assert_eq!(second.credit_value(), Decimal::from(52100));

        let third = &file.entries[2];
        assert_eq!(third.description, "");
        assert_eq!(third.debit_value(), Decimal::ZERO);
    }

    #[test]
    fn rejects_non_numeric_amount() {
        let json = r#"{"明细": [{"编号": "1", "借方金额": "五千"}]}"#;
        let err = serde_json::from_str::<VoucherFile>(json).unwrap_err();
        assert!(err.to_string().contains("invalid amount"));

        for raw in ["1_000", "1e3", "1E3", "+5", "1.", ".5", "-", "1.2.3", "0x10", "1 000"] {
            assert!(
                matches!(Amount::parse(raw), Err(LedgerError::InvalidAmount(_))),
                "{raw:?} should be rejected"
            );
        }
        let json = r#"{"明细": [{"编号": "1", "借方金额": "1e3"}]}"#;
        assert!(serde_json::from_str::<VoucherFile>(json).is_err());
    }

    #[test]
    fn accepts_plain_decimals() {
        for (raw, value) in [
            ("52100", Decimal::from(52100)),
            ("-300", Decimal::from(-300)),
            (" 12.50 ", Decimal::new(1250, 2)),
            ("007", Decimal::from(7)),
        ] {
            assert_eq!(Amount::parse(raw).unwrap().value(), value);
        }
    }

    #[test]
    fn keeps_literal_text() {
        let amount = Amount::parse("1200.50").unwrap();
        assert_eq!(amount.to_string(), "1200.50");
        assert_eq!(amount.value(), Decimal::new(120050, 2));
    }

    #[test]
    fn serializes_with_domain_labels() {
        let entry = LedgerEntry::new("1", "银行存款", "存入", Amount::parse("300").ok(), None);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["编号"], "1");
        assert_eq!(value["借方金额"], "300");
        assert!(value["贷方金额"].is_null());
    }

    #[test]
    fn missing_detail_key_is_empty() {
        let file: VoucherFile = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert!(file.entries.is_empty());
    }
}
