//! Query Evaluation Engine
//!
//! Evaluates parsed queries against any `DocumentAccess` tree. Node ids
//! are allocation order, not document order, so results are ordered with
//! an explicit document-order index built on first use.

use super::parser::{Axis, CompareOp, Expr, LocationPath, NodeTest, Query, Step};
use super::value::{parse_number, QueryValue};
use crate::dom::{DocumentAccess, NodeId, NodeKind};
use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};

/// Evaluation context - generic over document type
pub struct Evaluator<'a, D: DocumentAccess> {
    doc: &'a D,
    order: OnceCell<HashMap<NodeId, usize>>,
}

/// Evaluate a query from a context node; results are in document order
/// with duplicates removed
#[must_use = "query result should be used"]
pub fn select<D: DocumentAccess>(doc: &D, query: &Query, context: NodeId) -> Vec<NodeId> {
    Evaluator::new(doc).select(query, context)
}

impl<'a, D: DocumentAccess> Evaluator<'a, D> {
    pub fn new(doc: &'a D) -> Self {
        Evaluator {
            doc,
            order: OnceCell::new(),
        }
    }

    pub fn select(&self, query: &Query, context: NodeId) -> Vec<NodeId> {
        match query.paths.as_slice() {
            [single] => self.eval_path(single, context),
            paths => {
                let mut seen = HashSet::new();
                let mut result = Vec::new();
                for path in paths {
                    for node in self.eval_path(path, context) {
                        if seen.insert(node) {
                            result.push(node);
                        }
                    }
                }
                self.sort_document_order(&mut result);
                result
            }
        }
    }

    fn eval_path(&self, path: &LocationPath, context: NodeId) -> Vec<NodeId> {
        let start = if path.absolute {
            self.doc.document_node_id()
        } else {
            context
        };

        let mut current = vec![start];
        for step in &path.steps {
            let mut seen = HashSet::with_capacity(current.len());
            let mut next = Vec::with_capacity(current.len());
            for &node in &current {
                for candidate in self.eval_step(step, node) {
                    if seen.insert(candidate) {
                        next.push(candidate);
                    }
                }
            }
            // A single context node already yields document order
            if current.len() > 1 {
                self.sort_document_order(&mut next);
            }
            current = next;
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Apply one step to one context node, predicates included
    fn eval_step(&self, step: &Step, node: NodeId) -> Vec<NodeId> {
        let mut candidates = self.navigate(step, node);
        for predicate in &step.predicates {
            let size = candidates.len();
            let mut filtered = Vec::with_capacity(size);
            for (i, &candidate) in candidates.iter().enumerate() {
                let include = match self.eval_expr(predicate, candidate, i + 1, size) {
                    QueryValue::Number(n) => (i + 1) as f64 == n,
                    other => other.to_boolean(),
                };
                if include {
                    filtered.push(candidate);
                }
            }
            candidates = filtered;
        }
        candidates
    }

    /// Nodes on the step's axis that pass its node test
    fn navigate(&self, step: &Step, node: NodeId) -> Vec<NodeId> {
        match step.axis {
            Axis::Attribute => self
                .doc
                .attributes(node)
                .iter()
                .copied()
                .filter(|&attr| match &step.node_test {
                    NodeTest::Any | NodeTest::Node => true,
                    NodeTest::Name(name) => self.doc.node_name(attr) == Some(name.as_str()),
                    NodeTest::Text => false,
                })
                .collect(),
            Axis::Child => self
                .doc
                .children_vec(node)
                .into_iter()
                .filter(|&c| self.matches(c, &step.node_test))
                .collect(),
            Axis::DescendantOrSelf => std::iter::once(node)
                .chain(self.doc.descendants_vec(node))
                .filter(|&c| self.matches(c, &step.node_test))
                .collect(),
            Axis::Self_ => Some(node)
                .filter(|&c| self.matches(c, &step.node_test))
                .into_iter()
                .collect(),
            Axis::Parent => self
                .doc
                .parent_of(node)
                .filter(|&c| self.matches(c, &step.node_test))
                .into_iter()
                .collect(),
        }
    }

    /// Node test for every axis but the attribute axis
    fn matches(&self, id: NodeId, test: &NodeTest) -> bool {
        let Some(node) = self.doc.get_node(id) else {
            return false;
        };
        match test {
            NodeTest::Node => true,
            NodeTest::Any => node.is_element(),
            NodeTest::Name(name) => {
                node.is_element() && self.doc.node_name(id) == Some(name.as_str())
            }
            NodeTest::Text => node.is_text(),
        }
    }

    fn eval_expr(&self, expr: &Expr, node: NodeId, position: usize, size: usize) -> QueryValue {
        match expr {
            Expr::Or(lhs, rhs) => QueryValue::Boolean(
                self.eval_expr(lhs, node, position, size).to_boolean()
                    || self.eval_expr(rhs, node, position, size).to_boolean(),
            ),
            Expr::And(lhs, rhs) => QueryValue::Boolean(
                self.eval_expr(lhs, node, position, size).to_boolean()
                    && self.eval_expr(rhs, node, position, size).to_boolean(),
            ),
            Expr::Compare(lhs, op, rhs) => {
                let left = self.eval_expr(lhs, node, position, size);
                let right = self.eval_expr(rhs, node, position, size);
                QueryValue::Boolean(self.compare(&left, *op, &right))
            }
            Expr::Path(path) => QueryValue::NodeSet(self.eval_path(path, node)),
            Expr::Number(n) => QueryValue::Number(*n),
            Expr::Literal(s) => QueryValue::String(s.clone()),
            Expr::Not(inner) => {
                QueryValue::Boolean(!self.eval_expr(inner, node, position, size).to_boolean())
            }
            Expr::Position => QueryValue::Number(position as f64),
            Expr::Last => QueryValue::Number(size as f64),
            Expr::Count(path) => QueryValue::Number(self.eval_path(path, node).len() as f64),
        }
    }

    /// String-value of a node: text content for elements, value for attributes
    fn string_value(&self, id: NodeId) -> String {
        self.doc.value_of(id).unwrap_or_default()
    }

    /// Comparison with node-set existential semantics
    fn compare(&self, left: &QueryValue, op: CompareOp, right: &QueryValue) -> bool {
        match (left, right) {
            (QueryValue::NodeSet(a), QueryValue::NodeSet(b)) => {
                let right_values: Vec<QueryValue> = b
                    .iter()
                    .map(|&n| QueryValue::String(self.string_value(n)))
                    .collect();
                a.iter().any(|&n| {
                    let lv = QueryValue::String(self.string_value(n));
                    right_values.iter().any(|rv| compare_atomic(&lv, op, rv))
                })
            }
            (QueryValue::NodeSet(a), QueryValue::Boolean(_)) => {
                compare_atomic(&QueryValue::Boolean(!a.is_empty()), op, right)
            }
            (QueryValue::Boolean(_), QueryValue::NodeSet(b)) => {
                compare_atomic(left, op, &QueryValue::Boolean(!b.is_empty()))
            }
            (QueryValue::NodeSet(a), _) => a.iter().any(|&n| {
                compare_atomic(&QueryValue::String(self.string_value(n)), op, right)
            }),
            (_, QueryValue::NodeSet(b)) => b.iter().any(|&n| {
                compare_atomic(left, op, &QueryValue::String(self.string_value(n)))
            }),
            _ => compare_atomic(left, op, right),
        }
    }

    /// Sort node ids into document order
    fn sort_document_order(&self, nodes: &mut [NodeId]) {
        let order = self.order.get_or_init(|| self.build_order());
        nodes.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
    }

    /// Document order: a node, then its attributes, then its children
    fn build_order(&self) -> HashMap<NodeId, usize> {
        let mut order = HashMap::new();
        let mut stack = vec![self.doc.document_node_id()];
        while let Some(id) = stack.pop() {
            order.insert(id, order.len());
            if self.doc.get_node(id).is_some_and(|n| n.kind == NodeKind::Element) {
                for &attr in self.doc.attributes(id) {
                    order.insert(attr, order.len());
                }
            }
            for child in self.doc.children_vec(id).into_iter().rev() {
                stack.push(child);
            }
        }
        order
    }
}

/// Compare two non-node-set values
fn compare_atomic(left: &QueryValue, op: CompareOp, right: &QueryValue) -> bool {
    match op {
        CompareOp::Eq | CompareOp::NotEq => {
            let equal = match (left, right) {
                (QueryValue::Boolean(_), _) | (_, QueryValue::Boolean(_)) => {
                    left.to_boolean() == right.to_boolean()
                }
                (QueryValue::Number(_), _) | (_, QueryValue::Number(_)) => {
                    left.to_number() == right.to_number()
                }
                _ => left.to_string_value() == right.to_string_value(),
            };
            equal == (op == CompareOp::Eq)
        }
        CompareOp::Lt => number_of(left) < number_of(right),
        CompareOp::LtEq => number_of(left) <= number_of(right),
        CompareOp::Gt => number_of(left) > number_of(right),
        CompareOp::GtEq => number_of(left) >= number_of(right),
    }
}

fn number_of(value: &QueryValue) -> f64 {
    match value {
        QueryValue::String(s) => parse_number(s),
        other => other.to_number(),
    }
}
