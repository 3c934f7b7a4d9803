//! Structural Query Engine
//!
//! Location-path subset used to validate write paths, find existing nodes
//! to overwrite, and serve reads:
//! - Absolute, relative and `//` paths, unions with `|`
//! - Child, attribute (`@`), self (`.`) and parent (`..`) steps
//! - Predicates: positions, comparisons, `and`/`or`, `not()`, `position()`,
//!   `last()`, `count()`
//! - Per-session LRU cache of compiled queries

pub mod cache;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use cache::QueryCache;
pub use eval::select;
pub use parser::Query;

use thiserror::Error;

/// Query compilation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid query {expr:?}: {reason}")]
    Syntax { expr: String, reason: String },
}

/// Compile a query expression
pub fn compile(expr: &str) -> Result<Query, QueryError> {
    parser::parse(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::XmlTree;

    fn evaluate(tree: &XmlTree, expr: &str) -> Vec<u32> {
        select(tree, &compile(expr).unwrap(), XmlTree::DOCUMENT)
    }

    #[test]
    fn test_relative_paths_start_at_document() {
        let mut tree = XmlTree::new();
        let foo = tree.create_element("foo");
        tree.append_child(XmlTree::DOCUMENT, foo).unwrap();
        assert_eq!(evaluate(&tree, "foo"), vec![foo]);
        assert_eq!(evaluate(&tree, "/foo"), vec![foo]);
        assert!(evaluate(&tree, "bar").is_empty());
    }

    #[test]
    fn test_syntax_error_message() {
        let err = compile("[1]/foo").unwrap_err();
        assert!(err.to_string().starts_with("invalid query \"[1]/foo\""));
    }
}
