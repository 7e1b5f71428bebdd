use serde::{Deserialize, Serialize};
use std::fmt;

/// One scanned-barcode entry as delivered by the upstream feed.
///
/// The feed is loosely shaped: fields go missing between feed versions,
/// `date` arrives in several formats, and `qty` is sometimes a number and
/// sometimes a numeric string. Everything is coerced here at the
/// deserialization boundary so the rest of the pipeline works with one
/// explicit type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub qty: Quantity,
    #[serde(default)]
    pub barcode: Option<String>,
}

/// Quantity exactly as the feed provided it; rendered verbatim in the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Quantity {
    Count(i64),
    Fraction(f64),
    Text(String),
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::Text(String::new())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Count(n) => write!(f, "{n}"),
            Quantity::Fraction(x) => write!(f, "{x}"),
            Quantity::Text(s) => f.write_str(s),
        }
    }
}
