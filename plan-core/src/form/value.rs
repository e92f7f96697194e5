use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde_json::Value;
use tracing::warn;

/// Children of a map node, ordered by key.
pub type FormMap = BTreeMap<String, FormValue>;

/// A single answer, or a group of answers, in the questionnaire tree.
///
/// Map nodes are reference counted. Cloning a map node is cheap and two
/// trees produced by [`FormData::set`](super::FormData::set) share every
/// map that the write did not touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Bool(bool),
    Number(Decimal),
    Text(String),
    List(Vec<FormValue>),
    Map(Arc<FormMap>),
}

impl FormValue {
    /// Builds a map node from key/value pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FormValue)>,
    {
        Self::Map(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Short name of the variant, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    pub fn as_map(&self) -> Option<&FormMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FormValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Strict numeric reading of the value.
    ///
    /// Numbers are returned as-is. Text is trimmed, comma thousands
    /// separators are dropped and the rest must parse as a decimal.
    /// Everything else, and blank or unparseable text, is `None`.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => {
                let normalized = normalize_decimal_input(text);
                if normalized.is_empty() {
                    return None;
                }
                Decimal::from_str(&normalized).ok()
            }
            _ => None,
        }
    }

    /// Returns `true` when the answer carries nothing: blank text or an
    /// empty list or map. Booleans and numbers are never blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Converts a JSON value. `null` has no counterpart and yields `None`;
    /// nulls inside objects and arrays are dropped.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(b)),
            Value::Number(n) => {
                let parsed = Decimal::from_str(&n.to_string())
                    .ok()
                    .or_else(|| Decimal::from_scientific(&n.to_string()).ok())
                    .or_else(|| n.as_f64().and_then(Decimal::from_f64));
                if parsed.is_none() {
                    warn!(number = %n, "dropping JSON number outside decimal range");
                }
                parsed.map(Self::Number)
            }
            Value::String(s) => Some(Self::Text(s)),
            Value::Array(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_json).collect(),
            )),
            Value::Object(entries) => Some(Self::Map(Arc::new(
                entries
                    .into_iter()
                    .filter_map(|(k, v)| Self::from_json(v).map(|v| (k, v)))
                    .collect(),
            ))),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => decimal_to_json(*n),
            Self::Text(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn decimal_to_json(n: Decimal) -> Value {
    if n.fract().is_zero() {
        if let Some(i) = n.to_i64() {
            return Value::from(i);
        }
    }
    n.to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(n.to_string()))
}

/// Trims whitespace and removes commas used as thousands separators.
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Lenient numeric reading used by the calculation engine.
///
/// Missing answers and anything that is not a number coerce to zero so a
/// half-filled questionnaire still produces a result. Non-empty text that
/// fails to parse is logged.
pub fn coerce_decimal(value: Option<&FormValue>) -> Decimal {
    let Some(value) = value else {
        return Decimal::ZERO;
    };
    match value.to_decimal() {
        Some(n) => n,
        None => {
            if let FormValue::Text(text) = value {
                if !text.trim().is_empty() {
                    warn!(input = %text, "non-numeric answer treated as zero");
                }
            }
            Decimal::ZERO
        }
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Decimal> for FormValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<u32> for FormValue {
    fn from(value: u32) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<FormValue>> for FormValue {
    fn from(value: Vec<FormValue>) -> Self {
        Self::List(value)
    }
}

impl From<FormMap> for FormValue {
    fn from(value: FormMap) -> Self {
        Self::Map(Arc::new(value))
    }
}
