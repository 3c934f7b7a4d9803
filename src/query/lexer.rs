//! Path Query Lexer
//!
//! Tokenizes location-path expressions into tokens.

use super::QueryError;

/// Query token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Operators
    Slash,       // /
    DoubleSlash, // //
    Dot,         // .
    DoubleDot,   // ..
    At,          // @
    Pipe,        // |
    Star,        // *
    Eq,          // =
    NotEq,       // !=
    Lt,          // <
    LtEq,        // <=
    Gt,          // >
    GtEq,        // >=
    And,         // and
    Or,          // or

    // Brackets
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Comma,        // ,

    // Literals
    Number(f64),
    String(String),

    // Names
    Name(String),

    // End of input
    Eof,
}

/// Query lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Whether the previous token ends an operand, which makes a following
    /// `and`/`or` an operator rather than an element name
    after_operand: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            after_operand: false,
        }
    }

    /// Get the remaining input
    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Peek at current character
    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Peek at character at offset
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Advance by n bytes
    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Skip whitespace
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
    }

    fn error(&self, reason: impl Into<String>) -> QueryError {
        QueryError::Syntax {
            expr: self.input.to_string(),
            reason: reason.into(),
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token, QueryError> {
        let token = self.scan()?;
        self.after_operand = matches!(
            token,
            Token::Name(_)
                | Token::Star
                | Token::Dot
                | Token::DoubleDot
                | Token::Number(_)
                | Token::String(_)
                | Token::RightParen
                | Token::RightBracket
        );
        Ok(token)
    }

    fn scan(&mut self) -> Result<Token, QueryError> {
        self.skip_whitespace();

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let token = match c {
            '/' => {
                self.advance(1);
                if self.peek() == Some('/') {
                    self.advance(1);
                    Token::DoubleSlash
                } else {
                    Token::Slash
                }
            }
            '.' => {
                if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                    return Ok(self.read_number());
                }
                self.advance(1);
                if self.peek() == Some('.') {
                    self.advance(1);
                    Token::DoubleDot
                } else {
                    Token::Dot
                }
            }
            '@' => {
                self.advance(1);
                Token::At
            }
            '|' => {
                self.advance(1);
                Token::Pipe
            }
            '*' => {
                self.advance(1);
                Token::Star
            }
            '=' => {
                self.advance(1);
                Token::Eq
            }
            '!' => {
                if self.peek_at(1) != Some('=') {
                    return Err(self.error("expected != operator"));
                }
                self.advance(2);
                Token::NotEq
            }
            '<' => {
                self.advance(1);
                if self.peek() == Some('=') {
                    self.advance(1);
                    Token::LtEq
                } else {
                    Token::Lt
                }
            }
            '>' => {
                self.advance(1);
                if self.peek() == Some('=') {
                    self.advance(1);
                    Token::GtEq
                } else {
                    Token::Gt
                }
            }
            '(' => {
                self.advance(1);
                Token::LeftParen
            }
            ')' => {
                self.advance(1);
                Token::RightParen
            }
            '[' => {
                self.advance(1);
                Token::LeftBracket
            }
            ']' => {
                self.advance(1);
                Token::RightBracket
            }
            ',' => {
                self.advance(1);
                Token::Comma
            }
            '"' | '\'' => self.read_string(c)?,
            '0'..='9' => self.read_number(),
            _ if is_name_start_char(c) => self.read_name_or_keyword(),
            _ => return Err(self.error(format!("unexpected character {:?}", c))),
        };
        Ok(token)
    }

    /// Read a number literal
    fn read_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(1);
        }

        // Decimal part
        if self.peek() == Some('.') {
            self.advance(1);
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance(1);
            }
        }

        let num_str = &self.input[start..self.pos];
        Token::Number(num_str.parse().unwrap_or(f64::NAN))
    }

    /// Read a string literal
    fn read_string(&mut self, quote: char) -> Result<Token, QueryError> {
        self.advance(1); // Skip opening quote
        let start = self.pos;

        match self.remaining().find(quote) {
            Some(len) => {
                let value = self.input[start..start + len].to_string();
                self.advance(len + 1);
                Ok(Token::String(value))
            }
            None => Err(self.error("unterminated string literal")),
        }
    }

    /// Read a name or keyword
    fn read_name_or_keyword(&mut self) -> Token {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if is_name_char(c) {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }

        let name = &self.input[start..self.pos];
        match name {
            "and" if self.after_operand => Token::And,
            "or" if self.after_operand => Token::Or,
            _ => Token::Name(name.to_string()),
        }
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            match lexer.next_token()? {
                Token::Eof => return Ok(tokens),
                token => tokens.push(token),
            }
        }
    }

    #[test]
    fn test_simple_path() {
        let mut lexer = Lexer::new("/root/child");
        assert_eq!(lexer.next_token().unwrap(), Token::Slash);
        assert_eq!(lexer.next_token().unwrap(), Token::Name("root".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Slash);
        assert_eq!(lexer.next_token().unwrap(), Token::Name("child".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_predicate() {
        let tokens = tokenize("item[@id = \"a/b\"]").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Name("item".to_string()),
                Token::LeftBracket,
                Token::At,
                Token::Name("id".to_string()),
                Token::Eq,
                Token::String("a/b".to_string()),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn test_keywords_depend_on_position() {
        let tokens = tokenize("or[a and b]").unwrap();
        assert_eq!(tokens[0], Token::Name("or".to_string()));
        assert_eq!(tokens[3], Token::And);
    }

    #[test]
    fn test_number() {
        let tokens = tokenize("item[3]").unwrap();
        assert!(matches!(tokens[2], Token::Number(n) if n == 3.0));
    }

    #[test]
    fn test_errors() {
        assert!(tokenize("a[b=\"x]").is_err());
        assert!(tokenize("a!b").is_err());
        assert!(tokenize("a#b").is_err());
    }
}
