//! Nested Data Model
//!
//! The converter's view of Elixir data: text scalars, null, ordered maps
//! and lists. Maps may carry position keys alongside names, which is how
//! an element holding both text and attributes comes back from a tree.

use indexmap::IndexMap;
use std::fmt;

/// Map key: a node name (or `@attr`, or any single path fragment) or a
/// zero-based list position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Name(String),
    Index(usize),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// Nested data value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    List(Vec<Value>),
    Map(IndexMap<Key, Value>),
}

impl Value {
    /// Text scalar
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Build a map from `(key, value)` entries, keeping their order
    pub fn map<K: Into<Key>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// True for containers with no entries
    pub fn is_empty_container(&self) -> bool {
        match self {
            Value::List(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }

    /// Recursively turn maps whose keys are exactly positions `0..n`, in
    /// order, into lists
    pub fn normalize(self) -> Self {
        match self {
            Value::List(items) => Value::List(items.into_iter().map(Value::normalize).collect()),
            Value::Map(entries) => {
                let is_list = !entries.is_empty()
                    && entries
                        .keys()
                        .enumerate()
                        .all(|(i, k)| *k == Key::Index(i));
                if is_list {
                    Value::List(entries.into_values().map(Value::normalize).collect())
                } else {
                    Value::Map(
                        entries
                            .into_iter()
                            .map(|(k, v)| (k, v.normalize()))
                            .collect(),
                    )
                }
            }
            scalar => scalar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_index_map_to_list() {
        let value = Value::map([(0usize, Value::text("a")), (1usize, Value::text("b"))]);
        assert_eq!(
            value.normalize(),
            Value::List(vec![Value::text("a"), Value::text("b")])
        );
    }

    #[test]
    fn test_normalize_keeps_mixed_and_gapped_maps() {
        let mixed = Value::Map(IndexMap::from([
            (Key::Index(0), Value::text("t")),
            (Key::from("@id"), Value::text("x")),
        ]));
        assert_eq!(mixed.clone().normalize(), mixed);

        let gapped = Value::map([(1usize, Value::text("b"))]);
        assert_eq!(gapped.clone().normalize(), gapped);

        let out_of_order = Value::map([(1usize, Value::text("b")), (0usize, Value::text("a"))]);
        assert_eq!(out_of_order.clone().normalize(), out_of_order);
    }

    #[test]
    fn test_normalize_recurses() {
        let value = Value::map([(
            "items",
            Value::map([(0usize, Value::map([("a", Value::Null)]))]),
        )]);
        let expected = Value::map([(
            "items",
            Value::List(vec![Value::map([("a", Value::Null)])]),
        )]);
        assert_eq!(value.normalize(), expected);
    }

    #[test]
    fn test_empty_map_stays_map() {
        assert_eq!(Value::Map(IndexMap::new()).normalize(), Value::Map(IndexMap::new()));
        assert!(Value::List(vec![]).is_empty_container());
        assert!(!Value::Null.is_empty_container());
    }
}
