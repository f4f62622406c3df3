use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal operand of a comparison predicate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Literal::Date(_) | Literal::Timestamp(_))
    }

    /// Calendar date carried by this literal, if any.
    ///
    /// Strings count when they hold an ISO `YYYY-MM-DD` date or an
    /// RFC 3339 timestamp.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Literal::Date(d) => Some(*d),
            Literal::Timestamp(ts) => Some(ts.date_naive()),
            Literal::String(s) => parse_date_like(s),
            Literal::Integer(_) | Literal::Float(_) | Literal::Boolean(_) => None,
        }
    }

    /// Compact `YYYYMMDD` rendering used by range queries.
    pub fn compact_date(&self) -> Option<String> {
        self.as_date().map(|d| d.format("%Y%m%d").to_string())
    }
}

fn parse_date_like(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|ts| ts.with_timezone(&Utc).date_naive())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(v) => write!(f, "{v}"),
            Literal::Integer(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::Boolean(v) => write!(f, "{v}"),
            Literal::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Literal::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<NaiveDate> for Literal {
    fn from(value: NaiveDate) -> Self {
        Literal::Date(value)
    }
}
