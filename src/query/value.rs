//! Query Value Types
//!
//! Predicate expressions work with four data types: node-set, boolean,
//! number, and string.

use crate::dom::NodeId;

/// Intermediate value produced while evaluating a predicate
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum QueryValue {
    /// A set of nodes in document order
    NodeSet(Vec<NodeId>),
    /// Boolean value
    Boolean(bool),
    /// Floating-point number
    Number(f64),
    /// String value
    String(String),
}

impl QueryValue {
    /// Convert to boolean (`boolean()` semantics)
    pub fn to_boolean(&self) -> bool {
        match self {
            QueryValue::NodeSet(nodes) => !nodes.is_empty(),
            QueryValue::Boolean(b) => *b,
            QueryValue::Number(n) => *n != 0.0 && !n.is_nan(),
            QueryValue::String(s) => !s.is_empty(),
        }
    }

    /// Convert a non-node-set value to a number (`number()` semantics).
    /// Node sets need document access and are converted by the evaluator.
    pub fn to_number(&self) -> f64 {
        match self {
            QueryValue::NodeSet(_) => f64::NAN,
            QueryValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            QueryValue::Number(n) => *n,
            QueryValue::String(s) => parse_number(s),
        }
    }

    /// Convert a non-node-set value to a string (`string()` semantics)
    pub fn to_string_value(&self) -> String {
        match self {
            QueryValue::NodeSet(_) => String::new(),
            QueryValue::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            QueryValue::Number(n) => {
                if n.is_nan() {
                    "NaN".to_string()
                } else if n.is_infinite() {
                    if *n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
                } else if *n == n.trunc() && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            QueryValue::String(s) => s.clone(),
        }
    }
}

/// Parse a string the way `number()` does: surrounding whitespace is
/// ignored and anything unparsable is NaN
pub fn parse_number(s: &str) -> f64 {
    s.trim().parse().unwrap_or(f64::NAN)
}
