//! Reconstruction
//!
//! Ordered `(path, value)` pairs → nested data. Numeric path segments are
//! 1-based list positions; everything else is a map key.

use super::value::{Key, Value};
use crate::core::names::is_numeric;
use crate::error::ConvertError;
use crate::path::PathPair;
use indexmap::IndexMap;
use tracing::{trace, warn};

/// Rebuild nested data from pairs, then normalize index-only maps into lists
pub fn reconstruct(pairs: &[PathPair]) -> Result<Value, ConvertError> {
    let mut root: IndexMap<Key, Value> = IndexMap::new();
    for (path, value) in pairs {
        insert(&mut root, path, value.as_deref())?;
    }
    Ok(Value::Map(root).normalize())
}

fn parse_key(segment: &str) -> Key {
    if is_numeric(segment) {
        if let Some(index) = segment.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
            return Key::Index(index);
        }
    }
    Key::Name(segment.to_string())
}

fn insert(
    root: &mut IndexMap<Key, Value>,
    path: &str,
    value: Option<&str>,
) -> Result<(), ConvertError> {
    let keys: Vec<Key> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(parse_key)
        .collect();
    if keys.is_empty() {
        trace!(path, "skipping pair without a path");
        return Ok(());
    }
    insert_at(root, &keys, path, value)
}

/// Walk `keys` below `map`; every intermediate slot is turned into a map
/// before descending into it
fn insert_at(
    map: &mut IndexMap<Key, Value>,
    keys: &[Key],
    path: &str,
    value: Option<&str>,
) -> Result<(), ConvertError> {
    let Some((key, rest)) = keys.split_first() else {
        return Ok(());
    };
    if rest.is_empty() {
        return assign(map, key, path, value);
    }

    let slot = map.entry(key.clone()).or_insert(Value::Null);
    let mut entries = into_container(std::mem::take(slot), path);
    let result = insert_at(&mut entries, rest, path, value);
    *slot = Value::Map(entries);
    result
}

/// Apply a value on the final segment of a path
fn assign(
    map: &mut IndexMap<Key, Value>,
    key: &Key,
    path: &str,
    value: Option<&str>,
) -> Result<(), ConvertError> {
    match map.get_mut(key) {
        None => {
            map.insert(key.clone(), scalar(value));
        }
        Some(existing) => match existing {
            Value::Null | Value::Text(_) => *existing = scalar(value),
            // A bare element seen after its own children adds nothing
            _ if value.is_none() => {}
            _ if existing.is_empty_container() => *existing = scalar(value),
            _ => {
                return Err(ConvertError::StructuralConflict {
                    path: path.to_string(),
                })
            }
        },
    }
    Ok(())
}

fn scalar(value: Option<&str>) -> Value {
    match value {
        Some(text) => Value::text(text),
        None => Value::Null,
    }
}

/// Turn whatever sits on an intermediate segment into a map to descend into
fn into_container(value: Value, path: &str) -> IndexMap<Key, Value> {
    match value {
        Value::Map(entries) => entries,
        Value::Null => IndexMap::new(),
        Value::Text(text) => {
            warn!(path, "promoting text value to a container");
            IndexMap::from([(Key::Index(0), Value::Text(text))])
        }
        Value::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Key::Index(i), v))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(pairs: &[(&str, Option<&str>)]) -> Result<Value, ConvertError> {
        let owned: Vec<PathPair> = pairs
            .iter()
            .map(|(p, v)| (p.to_string(), v.map(str::to_string)))
            .collect();
        reconstruct(&owned)
    }

    #[test]
    fn test_nested_maps() {
        let value = build(&[("a/b", Some("1")), ("a/c", Some("2"))]).unwrap();
        assert_eq!(
            value,
            Value::map([(
                "a",
                Value::map([("b", Value::text("1")), ("c", Value::text("2"))])
            )])
        );
    }

    #[test]
    fn test_positions_become_lists() {
        let value = build(&[
            ("books/book/1/title", Some("Dune")),
            ("books/book/2/title", Some("Emma")),
        ])
        .unwrap();
        assert_eq!(
            value,
            Value::map([(
                "books",
                Value::map([(
                    "book",
                    Value::List(vec![
                        Value::map([("title", Value::text("Dune"))]),
                        Value::map([("title", Value::text("Emma"))]),
                    ])
                )])
            )])
        );
    }

    #[test]
    fn test_null_replaced_by_container() {
        let value = build(&[("foo", None), ("foo/@id", Some("bar"))]).unwrap();
        assert_eq!(
            value,
            Value::map([("foo", Value::map([("@id", Value::text("bar"))]))])
        );
    }

    #[test]
    fn test_text_promoted_to_mixed_map() {
        let value = build(&[("foo", Some("text")), ("foo/@id", Some("x"))]).unwrap();
        let expected = Value::map([(
            "foo",
            Value::Map(IndexMap::from([
                (Key::Index(0), Value::text("text")),
                (Key::from("@id"), Value::text("x")),
            ])),
        )]);
        assert_eq!(value, expected);
    }

    #[test]
    fn test_final_segment_rules() {
        // scalar overwritten
        let value = build(&[("a", Some("1")), ("a", Some("2"))]).unwrap();
        assert_eq!(value, Value::map([("a", Value::text("2"))]));

        // None over a container is a no-op
        let value = build(&[("a/b", Some("1")), ("a", None)]).unwrap();
        assert_eq!(value, Value::map([("a", Value::map([("b", Value::text("1"))]))]));

        // text over a populated container conflicts
        assert_eq!(
            build(&[("a/b", Some("1")), ("a", Some("x"))]),
            Err(ConvertError::StructuralConflict {
                path: "a".to_string()
            })
        );
    }

    #[test]
    fn test_deep_walk_keeps_earlier_entries() {
        let value = build(&[
            ("a/b/c", Some("1")),
            ("a/b/d", Some("2")),
            ("a/e", Some("3")),
        ])
        .unwrap();
        assert_eq!(
            value,
            Value::map([(
                "a",
                Value::map([
                    ("b", Value::map([("c", Value::text("1")), ("d", Value::text("2"))])),
                    ("e", Value::text("3")),
                ])
            )])
        );

        // revisiting an earlier position lands in the same entry
        let value = build(&[("a/1/b", Some("x")), ("a/2/b", Some("y")), ("a/1/c", Some("z"))]).unwrap();
        assert_eq!(
            value,
            Value::map([(
                "a",
                Value::List(vec![
                    Value::map([("b", Value::text("x")), ("c", Value::text("z"))]),
                    Value::map([("b", Value::text("y"))]),
                ])
            )])
        );
    }

    #[test]
    fn test_conflict_below_promoted_text() {
        assert_eq!(
            build(&[("a", Some("t")), ("a/b/c", Some("1")), ("a/b", Some("x"))]),
            Err(ConvertError::StructuralConflict {
                path: "a/b".to_string()
            })
        );
    }

    #[test]
    fn test_zero_is_a_name() {
        let value = build(&[("a/0", Some("x"))]).unwrap();
        assert_eq!(value, Value::map([("a", Value::map([("0", Value::text("x"))]))]));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(build(&[]).unwrap(), Value::Map(IndexMap::new()));
    }
}
