//! Path Fragments
//!
//! A write path is split on `/` into fragments, and each fragment is
//! classified once into a `Segment`. Classification order is fixed:
//! attribute, child predicate, indexed, plain.

use crate::core::names::{is_name_byte, is_numeric, is_valid_name};
use crate::error::ConvertError;
use std::fmt;

/// Target of a child predicate: `name[child="v"]` or `name[@child="v"]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateTarget {
    Element(String),
    Attribute(String),
}

/// One classified path fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `@name`
    Attribute(String),
    /// `name[count]`, count >= 1
    Indexed { name: String, count: usize },
    /// `parent[child = "value"]`
    ChildPredicate {
        parent: String,
        target: PredicateTarget,
        value: String,
    },
    /// `name`, same as `name[1]`
    Plain(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Attribute(name) => write!(f, "@{}", name),
            Segment::Indexed { name, count } => write!(f, "{}[{}]", name, count),
            Segment::ChildPredicate {
                parent,
                target,
                value,
            } => {
                let (at, child) = match target {
                    PredicateTarget::Element(c) => ("", c),
                    PredicateTarget::Attribute(c) => ("@", c),
                };
                write!(f, "{}[{}{}=\"{}\"]", parent, at, child, value)
            }
            Segment::Plain(name) => f.write_str(name),
        }
    }
}

/// Classify one fragment. `path` is the full path it came from and is what
/// an error reports.
pub fn parse_segment(fragment: &str, path: &str) -> Result<Segment, ConvertError> {
    let invalid = || ConvertError::invalid_path(path);

    if let Some(name) = fragment.strip_prefix('@') {
        return if is_valid_name(name) {
            Ok(Segment::Attribute(name.to_string()))
        } else {
            Err(invalid())
        };
    }

    let Some(open) = fragment.find('[') else {
        return if is_valid_name(fragment) {
            Ok(Segment::Plain(fragment.to_string()))
        } else {
            Err(invalid())
        };
    };

    let name = &fragment[..open];
    let inner = fragment[open + 1..].strip_suffix(']').ok_or_else(invalid)?;
    if !is_valid_name(name) {
        return Err(invalid());
    }

    if let Some((target, value)) = parse_predicate(inner) {
        return Ok(Segment::ChildPredicate {
            parent: name.to_string(),
            target,
            value: value.to_string(),
        });
    }

    if is_numeric(inner) {
        let count: usize = inner.parse().map_err(|_| invalid())?;
        if count == 0 {
            return Err(invalid());
        }
        return Ok(Segment::Indexed {
            name: name.to_string(),
            count,
        });
    }

    Err(invalid())
}

/// Parse `child OP "value"` (or `@child`). OP is `=`; the legacy `<` and
/// `>` forms are accepted and construct as `=`. The value runs up to the
/// last quote, which must close the predicate.
fn parse_predicate(inner: &str) -> Option<(PredicateTarget, &str)> {
    let (is_attr, rest) = match inner.strip_prefix('@') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    let name_len = rest.bytes().take_while(|&b| is_name_byte(b)).count();
    let child = &rest[..name_len];
    if !is_valid_name(child) {
        return None;
    }

    let rest = rest[name_len..].trim_start_matches([' ', '\t']);
    let rest = rest.strip_prefix(['=', '<', '>'])?;
    let rest = rest.trim_start_matches([' ', '\t']);

    let quote = rest.chars().next().filter(|&c| c == '"' || c == '\'')?;
    let value = rest[1..].strip_suffix(quote)?;

    let target = if is_attr {
        PredicateTarget::Attribute(child.to_string())
    } else {
        PredicateTarget::Element(child.to_string())
    };
    Some((target, value))
}

/// Split a path into fragments, dropping empty ones. A `/` inside brackets
/// or quotes does not split.
pub fn split_fragments(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    if memchr::memchr3(b'[', b'"', b'\'', bytes).is_none() {
        return path.split('/').filter(|f| !f.is_empty()).collect();
    }

    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' if depth > 0 => quote = Some(b),
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'/' if depth == 0 => {
                    if i > start {
                        fragments.push(&path[start..i]);
                    }
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    if start < path.len() {
        fragments.push(&path[start..]);
    }
    fragments
}

/// Parse every fragment of a path
pub fn parse_path(path: &str) -> Result<Vec<Segment>, ConvertError> {
    split_fragments(path)
        .into_iter()
        .map(|fragment| parse_segment(fragment, path))
        .collect()
}

/// True when `key` is exactly one well-formed fragment
pub fn is_single_fragment(key: &str) -> bool {
    !key.contains('/') && parse_segment(key, key).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(fragment: &str) -> Segment {
        parse_segment(fragment, fragment).unwrap()
    }

    #[test]
    fn test_plain_and_attribute() {
        assert_eq!(seg("book"), Segment::Plain("book".to_string()));
        assert_eq!(seg("@id"), Segment::Attribute("id".to_string()));
    }

    #[test]
    fn test_indexed() {
        assert_eq!(
            seg("item[3]"),
            Segment::Indexed {
                name: "item".to_string(),
                count: 3
            }
        );
    }

    #[test]
    fn test_child_predicate() {
        assert_eq!(
            seg("book[title = \"Dune\"]"),
            Segment::ChildPredicate {
                parent: "book".to_string(),
                target: PredicateTarget::Element("title".to_string()),
                value: "Dune".to_string(),
            }
        );
        assert_eq!(
            seg("book[@lang='en']"),
            Segment::ChildPredicate {
                parent: "book".to_string(),
                target: PredicateTarget::Attribute("lang".to_string()),
                value: "en".to_string(),
            }
        );
    }

    #[test]
    fn test_predicate_value_is_greedy() {
        let segment = seg("a[b=\"x\"y\"]");
        assert!(matches!(segment, Segment::ChildPredicate { value, .. } if value == "x\"y"));
    }

    #[test]
    fn test_legacy_operators_construct_as_equality() {
        let segment = seg("a[b<\"1\"]");
        assert!(matches!(segment, Segment::ChildPredicate { value, .. } if value == "1"));
    }

    #[test]
    fn test_invalid_fragments_report_full_path() {
        for fragment in ["1abc", "a[0]", "a[x]", "a[1", "@", "@1", "a b", "[1]", "a[b=c]"] {
            let err = parse_segment(fragment, "whole/path").unwrap_err();
            assert_eq!(err, ConvertError::invalid_path("whole/path"), "{fragment}");
        }
    }

    #[test]
    fn test_display() {
        for fragment in ["a", "@b", "c[2]", "d[e=\"f\"]", "g[@h=\"i\"]"] {
            assert_eq!(seg(fragment).to_string(), fragment);
        }
    }

    #[test]
    fn test_split_fragments() {
        assert_eq!(split_fragments("/a//b/c/"), vec!["a", "b", "c"]);
        assert_eq!(
            split_fragments("a/b[c=\"x/y\"]/d"),
            vec!["a", "b[c=\"x/y\"]", "d"]
        );
        assert!(split_fragments("///").is_empty());
    }

    #[test]
    fn test_single_fragment() {
        assert!(is_single_fragment("item[2]"));
        assert!(is_single_fragment("@id"));
        assert!(!is_single_fragment("a/b"));
        assert!(!is_single_fragment("has space"));
    }
}
