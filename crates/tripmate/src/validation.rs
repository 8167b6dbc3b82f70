//! Typed tool arguments.
//!
//! Every tool deserializes its JSON arguments into a struct built from these
//! types before touching the network, so malformed input from the model turns
//! into a `ToolError::InvalidParameters` it can read and fix.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use crate::errors::{ToolError, ToolResult};

lazy_static! {
    static ref AMOUNT_TOKEN: Regex = Regex::new(r"-?\d[\d,]*(?:\.\d+)?").unwrap();
    static ref GROUPED_AMOUNT: Regex = Regex::new(r"^-?\d{1,3}(?:,\d{3})+(?:\.\d+)?$").unwrap();
    static ref ISO_4217: HashSet<&'static str> = [
        "AED", "AFN", "ALL", "AMD", "ANG", "AOA", "ARS", "AUD", "AWG", "AZN", "BAM", "BBD", "BDT",
        "BGN", "BHD", "BIF", "BMD", "BND", "BOB", "BRL", "BSD", "BTN", "BWP", "BYN", "BZD", "CAD",
        "CDF", "CHF", "CLP", "CNY", "COP", "CRC", "CUP", "CVE", "CZK", "DJF", "DKK", "DOP", "DZD",
        "EGP", "ERN", "ETB", "EUR", "FJD", "FKP", "GBP", "GEL", "GHS", "GIP", "GMD", "GNF", "GTQ",
        "GYD", "HKD", "HNL", "HTG", "HUF", "IDR", "ILS", "INR", "IQD", "IRR", "ISK", "JMD", "JOD",
        "JPY", "KES", "KGS", "KHR", "KMF", "KPW", "KRW", "KWD", "KYD", "KZT", "LAK", "LBP", "LKR",
        "LRD", "LSL", "LYD", "MAD", "MDL", "MGA", "MKD", "MMK", "MNT", "MOP", "MRU", "MUR", "MVR",
        "MWK", "MXN", "MYR", "MZN", "NAD", "NGN", "NIO", "NOK", "NPR", "NZD", "OMR", "PAB", "PEN",
        "PGK", "PHP", "PKR", "PLN", "PYG", "QAR", "RON", "RSD", "RUB", "RWF", "SAR", "SBD", "SCR",
        "SDG", "SEK", "SGD", "SHP", "SLE", "SOS", "SRD", "SSP", "STN", "SVC", "SYP", "SZL", "THB",
        "TJS", "TMT", "TND", "TOP", "TRY", "TTD", "TWD", "TZS", "UAH", "UGX", "USD", "UYU", "UZS",
        "VES", "VND", "VUV", "WST", "XAF", "XCD", "XOF", "XPF", "YER", "ZAR", "ZMW", "ZWL",
    ]
    .into_iter()
    .collect();
}

/// Deserialize tool arguments, naming the tool in the error
pub fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> ToolResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::InvalidParameters(format!("{}: {}", tool, e)))
}

/// Read a number out of free text such as `"$120"`, `"Rs. 500"` or `"1,200.50 EUR"`.
///
/// The text must hold exactly one number. Commas are only accepted as
/// thousands separators, so `"1.234,50"` or `"1,5"` are rejected.
pub fn parse_amount(raw: &str) -> Result<f64, String> {
    let unreadable = || format!("could not read an amount from {:?}", raw);

    let mut numbers = AMOUNT_TOKEN.find_iter(raw);
    let token = numbers.next().ok_or_else(unreadable)?.as_str();
    if numbers.next().is_some() {
        return Err(format!(
            "{:?} is ambiguous; give a single number such as 1200.50",
            raw
        ));
    }
    if token.contains(',') && !GROUPED_AMOUNT.is_match(token) {
        return Err(format!(
            "{:?} is ambiguous; use ',' only between thousands, e.g. 1,200.50",
            raw
        ));
    }

    token.replace(',', "").parse::<f64>().map_err(|_| unreadable())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

/// A money amount or count supplied either as a JSON number or as text
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "RawAmount")]
pub struct Amount(pub f64);

impl TryFrom<RawAmount> for Amount {
    type Error = String;

    fn try_from(raw: RawAmount) -> Result<Self, Self::Error> {
        match raw {
            RawAmount::Number(n) => Ok(Amount(n)),
            RawAmount::Text(s) => parse_amount(&s).map(Amount),
        }
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount(value)
    }
}

/// A calendar date in `YYYY-MM-DD` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct IsoDate(pub NaiveDate);

impl TryFrom<String> for IsoDate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map(IsoDate)
            .map_err(|_| format!("{:?} is not an ISO calendar date (YYYY-MM-DD)", value))
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A recognized ISO-4217 currency code, stored upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let code = value.trim().to_ascii_uppercase();
        if ISO_4217.contains(code.as_str()) {
            Ok(CurrencyCode(code))
        } else {
            Err(format!("{:?} is not a recognized 3-letter currency code", value))
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A three-letter IATA city or airport code, stored upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct IataCode(String);

impl IataCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IataCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let code = value.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(IataCode(code.to_ascii_uppercase()))
        } else {
            Err(format!(
                "{:?} is not a 3-letter IATA code (for example PAR, LON, NYC)",
                value
            ))
        }
    }
}

impl fmt::Display for IataCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reject dates before `today`
pub fn ensure_not_past(field: &str, date: IsoDate, today: NaiveDate) -> ToolResult<()> {
    if date.0 < today {
        return Err(ToolError::InvalidParameters(format!(
            "{} {} is in the past; ask the user for a future date",
            field, date
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct ConvertArgs {
        amount: Amount,
        from_currency: CurrencyCode,
        to_currency: CurrencyCode,
    }

    #[derive(Debug, Deserialize)]
    struct DateArgs {
        date: IsoDate,
    }

    #[test]
    fn test_parse_amount_strips_symbols() {
        assert_eq!(parse_amount("$120"), Ok(120.0));
        assert_eq!(parse_amount("₹20"), Ok(20.0));
        assert_eq!(parse_amount("1,200.50 EUR"), Ok(1200.5));
        assert_eq!(parse_amount("-15"), Ok(-15.0));
        assert!(parse_amount("free").is_err());
        assert!(parse_amount("1.2.3").is_err());
    }

    #[test]
    fn test_parse_amount_ignores_currency_prefixes() {
        assert_eq!(parse_amount("Rs. 500"), Ok(500.0));
        assert_eq!(parse_amount("USD 1,200.50"), Ok(1200.5));
        assert_eq!(parse_amount("1,000,000"), Ok(1_000_000.0));
        assert_eq!(parse_amount("€ 45.90 per night"), Ok(45.9));
    }

    #[test]
    fn test_parse_amount_rejects_ambiguous_text() {
        assert!(parse_amount("EUR 1.234,50").is_err());
        assert!(parse_amount("1,5").is_err());
        assert!(parse_amount("100-200").is_err());
        assert!(parse_amount("2 nights at 80").is_err());
    }

    #[test]
    fn test_currency_arguments_normalize_case() {
        let args: ConvertArgs = parse_arguments(
            "convert_currency",
            json!({"amount": "$100", "from_currency": "usd", "to_currency": "EUR"}),
        )
        .unwrap();
        assert_eq!(args.amount, Amount(100.0));
        assert_eq!(args.from_currency.as_str(), "USD");
        assert_eq!(args.to_currency.to_string(), "EUR");
    }

    #[test]
    fn test_unknown_currency_is_invalid_parameters() {
        let err = parse_arguments::<ConvertArgs>(
            "convert_currency",
            json!({"amount": 5, "from_currency": "USD", "to_currency": "XYZ"}),
        )
        .unwrap_err();
        match err {
            ToolError::InvalidParameters(msg) => {
                assert!(msg.starts_with("convert_currency:"));
                assert!(msg.contains("\"XYZ\" is not a recognized 3-letter currency code"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_is_invalid_parameters() {
        let err = parse_arguments::<ConvertArgs>("convert_currency", json!({"amount": 5}))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters(msg) if msg.contains("missing field")));
    }

    #[test]
    fn test_iso_date() {
        let args: DateArgs = parse_arguments("t", json!({"date": "2025-07-14"})).unwrap();
        assert_eq!(args.date.to_string(), "2025-07-14");

        assert!(parse_arguments::<DateArgs>("t", json!({"date": "14/07/2025"})).is_err());
        assert!(parse_arguments::<DateArgs>("t", json!({"date": "2025-02-30"})).is_err());
    }

    #[test]
    fn test_iata_code() {
        assert_eq!(IataCode::try_from("par".to_string()).unwrap().as_str(), "PAR");
        assert!(IataCode::try_from("Paris".to_string()).is_err());
        assert!(IataCode::try_from("P4R".to_string()).is_err());
    }

    #[test]
    fn test_ensure_not_past() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let yesterday = IsoDate(NaiveDate::from_ymd_opt(2025, 5, 31).unwrap());
        assert!(ensure_not_past("departure_date", yesterday, today).is_err());
        assert!(ensure_not_past("departure_date", IsoDate(today), today).is_ok());
    }
}
