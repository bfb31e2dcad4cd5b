//! Insertion-ordered table of parameters bound while compiling a query.

use crate::cypher::{ParamRef, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Parameters referenced by a compiled predicate.
///
/// Names are unique within one table; the table is owned by the
/// [`ExecutionContext`](crate::where_clause::ExecutionContext) that produced them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamTable {
    entries: Vec<(String, Value)>,
}

impl ParamTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: String, value: Value) -> ParamRef {
        debug_assert!(self.get(&name).is_none(), "duplicate parameter {name}");
        self.entries.push((name.clone(), value));
        ParamRef(name)
    }

    /// Looks up the value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Value bound to a parameter reference.
    pub fn value(&self, param: &ParamRef) -> Option<&Value> {
        self.get(param.name())
    }

    /// Iterates parameters in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing was bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON object suitable for a driver call.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for ParamTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
