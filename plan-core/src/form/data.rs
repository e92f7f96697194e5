use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

use super::path::{FieldPath, FormError};
use super::value::{FormMap, FormValue, coerce_decimal};

/// The questionnaire answers: an immutable tree addressed by [`FieldPath`]s.
///
/// Every write returns a new `FormData`. Maps along the written path are
/// shallow-copied; every other map is shared with the previous tree.
///
/// ```
/// use plan_core::{FieldPath, FormData, FormValue};
/// use rust_decimal::Decimal;
///
/// let before = FormData::new();
/// let path = FieldPath::parse("parent1_income.gross_monthly").unwrap();
/// let after = before.set(&path, FormValue::from(5000_i64));
///
/// assert!(before.get("parent1_income.gross_monthly").is_none());
/// assert_eq!(after.number("parent1_income.gross_monthly"), Decimal::from(5000));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    root: Arc<FormMap>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: FormMap) -> Self {
        Self {
            root: Arc::new(map),
        }
    }

    pub fn root(&self) -> &FormMap {
        &self.root
    }

    /// Looks up a value by path string. Malformed paths and missing
    /// segments resolve to `None`.
    pub fn get(
        &self,
        path: &str,
    ) -> Option<&FormValue> {
        let path = FieldPath::parse(path).ok()?;
        self.get_path(&path)
    }

    pub fn get_path(
        &self,
        path: &FieldPath,
    ) -> Option<&FormValue> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = self.root.get(first)?;
        for segment in rest {
            current = child(current, segment)?;
        }
        Some(current)
    }

    /// Numeric value at `path`, with missing or non-numeric answers read as zero.
    pub fn number(
        &self,
        path: &str,
    ) -> Decimal {
        coerce_decimal(self.get(path))
    }

    /// Strict numeric value at `path`; `None` when absent, blank or non-numeric.
    pub fn optional_number(
        &self,
        path: &str,
    ) -> Option<Decimal> {
        self.get(path).and_then(FormValue::to_decimal)
    }

    /// Returns a new tree with `value` stored at `path`.
    ///
    /// Intermediate maps are created when missing. A numeric segment writes
    /// into an existing list when the index is in bounds. Any other
    /// non-map value in the way is replaced by an empty map, discarding it.
    pub fn set(
        &self,
        path: &FieldPath,
        value: FormValue,
    ) -> Self {
        let Some((head, rest)) = path.segments().split_first() else {
            return self.clone();
        };
        let child = write(self.root.get(head), head, rest, value, path);
        let mut root = FormMap::clone(&self.root);
        root.insert(head.clone(), child);
        Self {
            root: Arc::new(root),
        }
    }

    /// Returns a new tree without the value at `path`. When nothing lives at
    /// `path` the returned tree shares its root with `self`.
    pub fn remove(
        &self,
        path: &FieldPath,
    ) -> Self {
        let Some((head, rest)) = path.segments().split_first() else {
            return self.clone();
        };
        let mut root = FormMap::clone(&self.root);
        if rest.is_empty() {
            if root.remove(head).is_none() {
                return self.clone();
            }
        } else {
            let Some(updated) = self.root.get(head).and_then(|v| remove(v, rest)) else {
                return self.clone();
            };
            root.insert(head.clone(), updated);
        }
        Self {
            root: Arc::new(root),
        }
    }

    /// Returns `true` if both trees share the same root allocation.
    pub fn ptr_eq(
        &self,
        other: &FormData,
    ) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    pub fn to_json(&self) -> Value {
        FormValue::Map(Arc::clone(&self.root)).to_json()
    }
}

impl TryFrom<Value> for FormData {
    type Error = FormError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match FormValue::from_json(value) {
            Some(FormValue::Map(root)) => Ok(Self { root }),
            Some(other) => Err(FormError::RootNotMap(other.kind())),
            None => Err(FormError::RootNotMap("null")),
        }
    }
}

fn list_index(
    items: &[FormValue],
    segment: &str,
) -> Option<usize> {
    segment.parse::<usize>().ok().filter(|&i| i < items.len())
}

fn child<'a>(
    value: &'a FormValue,
    segment: &str,
) -> Option<&'a FormValue> {
    match value {
        FormValue::Map(map) => map.get(segment),
        FormValue::List(items) => list_index(items, segment).map(|i| &items[i]),
        _ => None,
    }
}

/// Produces the new value for the node at `segment`, given what was there before.
fn write(
    existing: Option<&FormValue>,
    segment: &str,
    rest: &[String],
    value: FormValue,
    path: &FieldPath,
) -> FormValue {
    let Some((next, remaining)) = rest.split_first() else {
        return value;
    };
    match existing {
        Some(FormValue::Map(map)) => {
            let child = write(map.get(next), next, remaining, value, path);
            let mut copy = FormMap::clone(map);
            copy.insert(next.clone(), child);
            FormValue::Map(Arc::new(copy))
        }
        Some(FormValue::List(items)) if list_index(items, next).is_some() => {
            let mut copy = items.clone();
            if let Some(index) = list_index(items, next) {
                copy[index] = write(Some(&items[index]), next, remaining, value, path);
            }
            FormValue::List(copy)
        }
        other => {
            if let Some(discarded) = other {
                warn!(
                    path = %path,
                    segment = segment,
                    discarded = discarded.kind(),
                    "replacing non-map value on write path"
                );
            }
            let mut fresh = FormMap::new();
            fresh.insert(next.clone(), write(None, next, remaining, value, path));
            FormValue::Map(Arc::new(fresh))
        }
    }
}

/// Returns the updated node, or `None` when nothing under it was removed.
fn remove(
    existing: &FormValue,
    rest: &[String],
) -> Option<FormValue> {
    let (next, remaining) = rest.split_first()?;
    match existing {
        FormValue::Map(map) => {
            let mut copy = FormMap::clone(map);
            if remaining.is_empty() {
                copy.remove(next)?;
            } else {
                let updated = remove(map.get(next)?, remaining)?;
                copy.insert(next.clone(), updated);
            }
            Some(FormValue::Map(Arc::new(copy)))
        }
        FormValue::List(items) => {
            let index = list_index(items, next)?;
            let mut copy = items.clone();
            if remaining.is_empty() {
                copy.remove(index);
            } else {
                copy[index] = remove(&items[index], remaining)?;
            }
            Some(FormValue::List(copy))
        }
        _ => None,
    }
}
