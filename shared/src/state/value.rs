use std::{collections::BTreeMap, sync::Arc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub type StateTable = BTreeMap<String, StateValue>;

/// Dynamic state tree held by every shared instance.
///
/// Lists and tables are reference counted, so a state produced by
/// [`reconcile`](crate::reconcile) or [`apply_patch`](crate::apply_patch)
/// shares every untouched sub-tree with the state it was derived from.
/// [`StateValue::same`] compares those sub-trees by identity.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Always finite. The wire encodes NaN and infinities as `null`, and NaN
    /// never equals itself, so `From<f64>` stores them as [`StateValue::Null`].
    Float(f64),
    Text(Arc<str>),
    List(Arc<Vec<StateValue>>),
    Table(Arc<StateTable>),
}

impl StateValue {
    pub fn table<K: Into<String>, I: IntoIterator<Item = (K, StateValue)>>(entries: I) -> Self {
        StateValue::Table(Arc::new(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        ))
    }

    pub fn empty_table() -> Self {
        StateValue::Table(Arc::new(StateTable::new()))
    }

    pub fn list<I: IntoIterator<Item = StateValue>>(items: I) -> Self {
        StateValue::List(Arc::new(items.into_iter().collect()))
    }

    /// Identity comparison: tables and lists must be the same allocation,
    /// scalars compare by value.
    pub fn same(&self, other: &StateValue) -> bool {
        match (self, other) {
            (StateValue::Table(a), StateValue::Table(b)) => Arc::ptr_eq(a, b),
            (StateValue::List(a), StateValue::List(b)) => Arc::ptr_eq(a, b),
            (StateValue::Table(_), _) | (StateValue::List(_), _) => false,
            (a, b) => a == b,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StateValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StateValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StateValue::Int(value) => Some(*value as f64),
            StateValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::Text(value) => Some(value.as_ref()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[StateValue]> {
        match self {
            StateValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&StateTable> {
        match self {
            StateValue::Table(table) => Some(table.as_ref()),
            _ => None,
        }
    }

    /// Looks up a key when this value is a table
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.as_table().and_then(|table| table.get(key))
    }

    /// Returns a copy of this table with `key` set to `value`. Sibling values
    /// are shared with `self`. A non-table value is treated as an empty table.
    pub fn with(&self, key: impl Into<String>, value: StateValue) -> StateValue {
        let mut table = match self {
            StateValue::Table(table) => table.as_ref().clone(),
            _ => StateTable::new(),
        };
        table.insert(key.into(), value);
        StateValue::Table(Arc::new(table))
    }

    /// Returns a copy of this table without `key`. Sibling values are shared
    /// with `self`.
    pub fn without(&self, key: &str) -> StateValue {
        match self {
            StateValue::Table(table) if table.contains_key(key) => {
                let mut table = table.as_ref().clone();
                table.remove(key);
                StateValue::Table(Arc::new(table))
            }
            other => other.clone(),
        }
    }

    /// Converts any serializable application state into a state tree
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(StateValue::from)
    }

    /// Converts this state tree back into an application type
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let json = serde_json::to_value(self)?;
        serde_json::from_value(json)
    }
}

impl PartialEq for StateValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StateValue::Null, StateValue::Null) => true,
            (StateValue::Bool(a), StateValue::Bool(b)) => a == b,
            (StateValue::Int(a), StateValue::Int(b)) => a == b,
            (StateValue::Float(a), StateValue::Float(b)) => a == b,
            (StateValue::Text(a), StateValue::Text(b)) => a == b,
            (StateValue::List(a), StateValue::List(b)) => Arc::ptr_eq(a, b) || a == b,
            (StateValue::Table(a), StateValue::Table(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Bool(value)
    }
}

impl From<i32> for StateValue {
    fn from(value: i32) -> Self {
        StateValue::Int(value as i64)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Int(value)
    }
}

impl From<u32> for StateValue {
    fn from(value: u32) -> Self {
        StateValue::Int(value as i64)
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            StateValue::Float(value)
        } else {
            StateValue::Null
        }
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Text(Arc::from(value))
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Text(Arc::from(value))
    }
}

impl From<Vec<StateValue>> for StateValue {
    fn from(value: Vec<StateValue>) -> Self {
        StateValue::List(Arc::new(value))
    }
}

impl From<StateTable> for StateValue {
    fn from(value: StateTable) -> Self {
        StateValue::Table(Arc::new(value))
    }
}

impl From<serde_json::Value> for StateValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => StateValue::Null,
            serde_json::Value::Bool(value) => StateValue::Bool(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => StateValue::Int(value),
                None => number.as_f64().map_or(StateValue::Null, StateValue::from),
            },
            serde_json::Value::String(value) => StateValue::from(value),
            serde_json::Value::Array(items) => {
                StateValue::list(items.into_iter().map(StateValue::from))
            }
            serde_json::Value::Object(entries) => StateValue::table(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, StateValue::from(value))),
            ),
        }
    }
}
