//! Flattening
//!
//! Nested data → ordered `(path, value)` pairs, one per scalar leaf.

use super::value::{Key, Value};
use crate::error::ConvertError;
use crate::path::segment::is_single_fragment;
use crate::path::PathPair;

/// Flatten nested data into write pairs, maps in insertion order and lists
/// in index order. Empty containers produce nothing.
pub fn flatten(value: &Value) -> Result<Vec<PathPair>, ConvertError> {
    let mut pairs = Vec::new();
    match value {
        // Nothing to write for a bare null
        Value::Null => {}
        _ => flatten_into(value, "", &mut pairs)?,
    }
    Ok(pairs)
}

fn flatten_into(value: &Value, prefix: &str, out: &mut Vec<PathPair>) -> Result<(), ConvertError> {
    match value {
        Value::Null => out.push((prefix.to_string(), None)),
        Value::Text(text) => out.push((prefix.to_string(), Some(text.clone()))),
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(item, &position_path(prefix, i), out)?;
            }
        }
        Value::Map(entries) => {
            for (key, item) in entries {
                let path = match key {
                    Key::Index(i) => position_path(prefix, *i),
                    Key::Name(name) => name_path(prefix, name)?,
                };
                flatten_into(item, &path, out)?;
            }
        }
    }
    Ok(())
}

/// `prefix[i+1]`, or `prefix` unchanged when it already ends in a position
fn position_path(prefix: &str, index: usize) -> String {
    if prefix.ends_with(']') {
        prefix.to_string()
    } else {
        format!("{}[{}]", prefix, index + 1)
    }
}

/// `prefix/name`, or `name` at the top level
fn name_path(prefix: &str, name: &str) -> Result<String, ConvertError> {
    if !is_single_fragment(name) {
        return Err(ConvertError::invalid_tag(name));
    }
    Ok(if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(expected: &[(&str, Option<&str>)]) -> Vec<PathPair> {
        expected
            .iter()
            .map(|(p, v)| (p.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_flatten_nested_maps() {
        let data = Value::map([(
            "foo",
            Value::map([("@id", Value::text("bar")), ("baz", Value::text("qux"))]),
        )]);
        assert_eq!(
            flatten(&data).unwrap(),
            pairs(&[("foo/@id", Some("bar")), ("foo/baz", Some("qux"))])
        );
    }

    #[test]
    fn test_flatten_lists() {
        let data = Value::map([(
            "books",
            Value::map([(
                "book",
                Value::List(vec![
                    Value::map([("title", Value::text("Dune"))]),
                    Value::map([("title", Value::text("Emma"))]),
                ]),
            )]),
        )]);
        assert_eq!(
            flatten(&data).unwrap(),
            pairs(&[
                ("books/book[1]/title", Some("Dune")),
                ("books/book[2]/title", Some("Emma")),
            ])
        );
    }

    #[test]
    fn test_position_reuses_bracketed_prefix() {
        let data = Value::map([(
            "a",
            Value::List(vec![Value::List(vec![Value::text("x"), Value::text("y")])]),
        )]);
        assert_eq!(
            flatten(&data).unwrap(),
            pairs(&[("a[1]", Some("x")), ("a[1]", Some("y"))])
        );
    }

    #[test]
    fn test_nulls_and_empty_containers() {
        let data = Value::map([
            ("empty", Value::Null),
            ("list", Value::List(vec![])),
            ("map", Value::map::<&str>([])),
        ]);
        assert_eq!(flatten(&data).unwrap(), pairs(&[("empty", None)]));
        assert!(flatten(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_fragment_keys_pass_through() {
        let data = Value::map([
            ("item[2]", Value::text("b")),
            ("book[title=\"Dune\"]", Value::map([("year", Value::text("1965"))])),
        ]);
        assert_eq!(
            flatten(&data).unwrap(),
            pairs(&[("item[2]", Some("b")), ("book[title=\"Dune\"]/year", Some("1965"))])
        );
    }

    #[test]
    fn test_invalid_tag_names() {
        for key in ["1abc", "a/b", "has space", ""] {
            let data = Value::map([("root", Value::map([(key, Value::text("v"))]))]);
            assert_eq!(flatten(&data), Err(ConvertError::invalid_tag(key)), "{key:?}");
        }
    }
}
