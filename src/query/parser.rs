//! Path Query Parser
//!
//! Recursive descent parser for the location-path subset: unions of
//! absolute or relative paths whose steps may carry predicates.

use super::lexer::{Lexer, Token};
use super::QueryError;

/// A parsed query: one or more location paths joined by `|`
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub paths: Vec<LocationPath>,
}

/// A location path
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// Starts at the document node rather than the context node
    pub absolute: bool,
    pub steps: Vec<Step>,
}

/// Location step in a path
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    fn descendant_or_self() -> Self {
        Step {
            axis: Axis::DescendantOrSelf,
            node_test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }
}

/// Supported axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Attribute,
    DescendantOrSelf,
    Self_,
    Parent,
}

/// Node test in a location step
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    /// Matches any element (or any attribute on the attribute axis)
    Any,
    /// Matches elements or attributes with name
    Name(String),
    /// node() - matches any node
    Node,
    /// text() - matches text and CDATA nodes
    Text,
}

/// Predicate expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Compare(Box<Expr>, CompareOp, Box<Expr>),
    /// Node-set produced by a path from the context node
    Path(LocationPath),
    Number(f64),
    Literal(String),
    /// not(expr)
    Not(Box<Expr>),
    /// position()
    Position,
    /// last()
    Last,
    /// count(path)
    Count(LocationPath),
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// Query parser
pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    /// Create a new parser
    pub fn new(input: &'a str) -> Result<Self, QueryError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser {
            input,
            lexer,
            current,
            peeked: None,
        })
    }

    /// Parse a complete query; trailing input is an error
    pub fn parse(&mut self) -> Result<Query, QueryError> {
        let mut paths = vec![self.parse_location_path()?];
        while matches!(self.current, Token::Pipe) {
            self.advance()?;
            paths.push(self.parse_location_path()?);
        }
        if !matches!(self.current, Token::Eof) {
            return Err(self.unexpected());
        }
        Ok(Query { paths })
    }

    fn error(&self, reason: impl Into<String>) -> QueryError {
        QueryError::Syntax {
            expr: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn unexpected(&self) -> QueryError {
        self.error(format!("unexpected token {:?}", self.current))
    }

    /// Advance to next token
    fn advance(&mut self) -> Result<(), QueryError> {
        self.current = match self.peeked.take() {
            Some(t) => t,
            None => self.lexer.next_token()?,
        };
        Ok(())
    }

    /// Peek at next token
    fn peek(&mut self) -> Result<&Token, QueryError> {
        let token = match self.peeked.take() {
            Some(t) => t,
            None => self.lexer.next_token()?,
        };
        Ok(self.peeked.insert(token))
    }

    fn expect(&mut self, token: Token) -> Result<(), QueryError> {
        if self.current != token {
            return Err(self.error(format!("expected {:?}, found {:?}", token, self.current)));
        }
        self.advance()
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.current,
            Token::Dot | Token::DoubleDot | Token::At | Token::Star | Token::Name(_)
        )
    }

    /// Parse location path
    fn parse_location_path(&mut self) -> Result<LocationPath, QueryError> {
        let mut steps = Vec::new();
        let absolute = match self.current {
            Token::Slash => {
                self.advance()?;
                if !self.starts_step() {
                    // Just /
                    return Ok(LocationPath {
                        absolute: true,
                        steps,
                    });
                }
                true
            }
            Token::DoubleSlash => {
                self.advance()?;
                steps.push(Step::descendant_or_self());
                true
            }
            _ => false,
        };

        if !self.starts_step() {
            return Err(self.error(format!("expected location step, found {:?}", self.current)));
        }

        loop {
            steps.push(self.parse_step()?);
            match self.current {
                Token::Slash => self.advance()?,
                Token::DoubleSlash => {
                    self.advance()?;
                    steps.push(Step::descendant_or_self());
                }
                _ => break,
            }
            if !self.starts_step() {
                return Err(self.error("path ends with a separator"));
            }
        }

        Ok(LocationPath { absolute, steps })
    }

    /// Parse a single location step
    fn parse_step(&mut self) -> Result<Step, QueryError> {
        let (axis, node_test) = match self.current.clone() {
            Token::Dot => {
                self.advance()?;
                return Ok(Step {
                    axis: Axis::Self_,
                    node_test: NodeTest::Node,
                    predicates: Vec::new(),
                });
            }
            Token::DoubleDot => {
                self.advance()?;
                return Ok(Step {
                    axis: Axis::Parent,
                    node_test: NodeTest::Node,
                    predicates: Vec::new(),
                });
            }
            Token::At => {
                self.advance()?;
                let test = match self.current.clone() {
                    Token::Star => NodeTest::Any,
                    Token::Name(name) => NodeTest::Name(name),
                    _ => return Err(self.error("expected attribute name after @")),
                };
                self.advance()?;
                (Axis::Attribute, test)
            }
            _ => (Axis::Child, self.parse_node_test()?),
        };

        let mut predicates = Vec::new();
        while matches!(self.current, Token::LeftBracket) {
            self.advance()?;
            predicates.push(self.parse_or_expr()?);
            self.expect(Token::RightBracket)?;
        }

        Ok(Step {
            axis,
            node_test,
            predicates,
        })
    }

    /// Parse node test on the child axis
    fn parse_node_test(&mut self) -> Result<NodeTest, QueryError> {
        match self.current.clone() {
            Token::Star => {
                self.advance()?;
                Ok(NodeTest::Any)
            }
            Token::Name(name) => {
                if matches!(self.peek()?, Token::LeftParen) {
                    let test = match name.as_str() {
                        "node" => NodeTest::Node,
                        "text" => NodeTest::Text,
                        _ => return Err(self.error(format!("{}() is not a node test", name))),
                    };
                    self.advance()?;
                    self.expect(Token::LeftParen)?;
                    self.expect(Token::RightParen)?;
                    Ok(test)
                } else {
                    self.advance()?;
                    Ok(NodeTest::Name(name))
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Parse or expression
    fn parse_or_expr(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_and_expr()?;

        while matches!(self.current, Token::Or) {
            self.advance()?;
            let right = self.parse_and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    /// Parse and expression
    fn parse_and_expr(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_equality_expr()?;

        while matches!(self.current, Token::And) {
            self.advance()?;
            let right = self.parse_equality_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    /// Parse equality expression
    fn parse_equality_expr(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_relational_expr()?;

        loop {
            let op = match &self.current {
                Token::Eq => CompareOp::Eq,
                Token::NotEq => CompareOp::NotEq,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_relational_expr()?;
            left = Expr::Compare(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    /// Parse relational expression
    fn parse_relational_expr(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_primary_expr()?;

        loop {
            let op = match &self.current {
                Token::Lt => CompareOp::Lt,
                Token::LtEq => CompareOp::LtEq,
                Token::Gt => CompareOp::Gt,
                Token::GtEq => CompareOp::GtEq,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_primary_expr()?;
            left = Expr::Compare(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    /// Parse primary expression
    fn parse_primary_expr(&mut self) -> Result<Expr, QueryError> {
        match self.current.clone() {
            Token::Number(n) => {
                self.advance()?;
                Ok(Expr::Number(n))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Expr::Literal(s))
            }
            Token::LeftParen => {
                self.advance()?;
                let expr = self.parse_or_expr()?;
                self.expect(Token::RightParen)?;
                Ok(expr)
            }
            Token::Name(name)
                if name != "node" && name != "text" && matches!(self.peek()?, Token::LeftParen) =>
            {
                self.parse_function_call(&name)
            }
            Token::Slash | Token::DoubleSlash => Ok(Expr::Path(self.parse_location_path()?)),
            _ if self.starts_step() => Ok(Expr::Path(self.parse_location_path()?)),
            _ => Err(self.unexpected()),
        }
    }

    /// Parse function call; the current token is the function name
    fn parse_function_call(&mut self, name: &str) -> Result<Expr, QueryError> {
        self.advance()?; // name
        self.expect(Token::LeftParen)?;

        let expr = match name {
            "not" => Expr::Not(Box::new(self.parse_or_expr()?)),
            "position" => Expr::Position,
            "last" => Expr::Last,
            "count" => Expr::Count(self.parse_location_path()?),
            _ => return Err(self.error(format!("unknown function {}()", name))),
        };

        self.expect(Token::RightParen)?;
        Ok(expr)
    }
}

/// Parse a query expression
pub fn parse(input: &str) -> Result<Query, QueryError> {
    Parser::new(input)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(expr: &str) -> Vec<Step> {
        let query = parse(expr).unwrap();
        assert_eq!(query.paths.len(), 1);
        query.paths.into_iter().next().unwrap().steps
    }

    #[test]
    fn test_parse_relative_path() {
        let steps = steps("foo/bar");
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].axis, Axis::Child);
        assert_eq!(steps[1].node_test, NodeTest::Name("bar".to_string()));
    }

    #[test]
    fn test_parse_absolute_and_root() {
        let query = parse("/").unwrap();
        assert!(query.paths[0].absolute);
        assert!(query.paths[0].steps.is_empty());

        let query = parse("//item").unwrap();
        assert!(query.paths[0].absolute);
        assert_eq!(query.paths[0].steps[0].axis, Axis::DescendantOrSelf);
    }

    #[test]
    fn test_parse_attribute_step() {
        let steps = steps("foo/@id");
        assert_eq!(steps[1].axis, Axis::Attribute);
        assert_eq!(steps[1].node_test, NodeTest::Name("id".to_string()));
    }

    #[test]
    fn test_parse_predicates() {
        let indexed = steps("item[2]");
        assert_eq!(indexed[0].predicates, vec![Expr::Number(2.0)]);

        let compared = steps("item[name = \"x\"]");
        assert!(matches!(
            &compared[0].predicates[0],
            Expr::Compare(_, CompareOp::Eq, rhs) if **rhs == Expr::Literal("x".to_string())
        ));

        let chained = steps("item[@id and not(child)][last()]");
        assert_eq!(chained[0].predicates.len(), 2);
        assert_eq!(chained[0].predicates[1], Expr::Last);
    }

    #[test]
    fn test_parse_union() {
        let query = parse("a | b/@c").unwrap();
        assert_eq!(query.paths.len(), 2);
    }

    #[test]
    fn test_parse_node_type_tests() {
        let steps = steps("a/text()");
        assert_eq!(steps[1].node_test, NodeTest::Text);
    }

    #[test]
    fn test_parse_errors() {
        for expr in ["", "[1]/foo", "foo/", "foo[", "foo[1", "foo]", "foo bar", "foo[bogus()]", "@"] {
            assert!(parse(expr).is_err(), "{:?} should not parse", expr);
        }
    }
}
