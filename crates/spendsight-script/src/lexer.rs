//! Lexer: tokenizes scriptlet source
//!
//! Produces a stream of tokens that the parser consumes. Statements are
//! newline-separated, so newlines at bracket depth zero are significant and
//! emitted as tokens; inside (), [], or {} they are plain whitespace.

use crate::errors::{ScriptError, ScriptResult};

/// A token produced by the lexer
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The raw text of the token
    pub text: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            col,
        }
    }
}

/// Token types
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    If,
    Else,
    For,
    In,
    And,
    Or,
    Not,
    True,
    False,

    // Identifiers and literals
    Identifier,
    Number,
    Str,

    // Operators
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Structural
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Comma,
    Colon,
    Dot,

    // Statement separator (bracket depth zero only)
    Newline,

    // End of input
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::If => write!(f, "if"),
            Self::Else => write!(f, "else"),
            Self::For => write!(f, "for"),
            Self::In => write!(f, "in"),
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Not => write!(f, "not"),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Identifier => write!(f, "identifier"),
            Self::Number => write!(f, "number"),
            Self::Str => write!(f, "string literal"),
            Self::Assign => write!(f, "="),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::EqEq => write!(f, "=="),
            Self::NotEq => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::LtEq => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::GtEq => write!(f, ">="),
            Self::OpenParen => write!(f, "("),
            Self::CloseParen => write!(f, ")"),
            Self::OpenBracket => write!(f, "["),
            Self::CloseBracket => write!(f, "]"),
            Self::OpenBrace => write!(f, "{{"),
            Self::CloseBrace => write!(f, "}}"),
            Self::Comma => write!(f, ","),
            Self::Colon => write!(f, ":"),
            Self::Dot => write!(f, "."),
            Self::Newline => write!(f, "end of line"),
            Self::Eof => write!(f, "end of script"),
        }
    }
}

/// Lexer for scriptlet source
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    depth: usize,
}

impl Lexer {
    /// Create a new lexer from script text
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            depth: 0,
        }
    }

    /// Tokenize the entire script
    pub fn tokenize(&mut self) -> ScriptResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            if let Some(newline) = self.skip_blank() {
                tokens.push(newline);
                continue;
            }

            if self.pos >= self.input.len() {
                tokens.push(Token::new(TokenKind::Eof, "", self.line, self.col));
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> ScriptResult<Token> {
        let ch = self.input[self.pos];
        let line = self.line;
        let col = self.col;

        match ch {
            '=' if self.peek_at(1) == Some('=') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenKind::EqEq, "==", line, col))
            }
            '=' => {
                self.advance();
                Ok(Token::new(TokenKind::Assign, "=", line, col))
            }
            '!' if self.peek_at(1) == Some('=') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenKind::NotEq, "!=", line, col))
            }
            '<' if self.peek_at(1) == Some('=') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenKind::LtEq, "<=", line, col))
            }
            '<' => {
                self.advance();
                Ok(Token::new(TokenKind::Lt, "<", line, col))
            }
            '>' if self.peek_at(1) == Some('=') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenKind::GtEq, ">=", line, col))
            }
            '>' => {
                self.advance();
                Ok(Token::new(TokenKind::Gt, ">", line, col))
            }
            '+' => {
                self.advance();
                Ok(Token::new(TokenKind::Plus, "+", line, col))
            }
            '-' => {
                self.advance();
                Ok(Token::new(TokenKind::Minus, "-", line, col))
            }
            '*' => {
                self.advance();
                Ok(Token::new(TokenKind::Star, "*", line, col))
            }
            '/' => {
                self.advance();
                Ok(Token::new(TokenKind::Slash, "/", line, col))
            }
            '%' => {
                self.advance();
                Ok(Token::new(TokenKind::Percent, "%", line, col))
            }
            '(' => {
                self.depth += 1;
                self.advance();
                Ok(Token::new(TokenKind::OpenParen, "(", line, col))
            }
            ')' => {
                self.depth = self.depth.saturating_sub(1);
                self.advance();
                Ok(Token::new(TokenKind::CloseParen, ")", line, col))
            }
            '[' => {
                self.depth += 1;
                self.advance();
                Ok(Token::new(TokenKind::OpenBracket, "[", line, col))
            }
            ']' => {
                self.depth = self.depth.saturating_sub(1);
                self.advance();
                Ok(Token::new(TokenKind::CloseBracket, "]", line, col))
            }
            '{' => {
                self.depth += 1;
                self.advance();
                Ok(Token::new(TokenKind::OpenBrace, "{", line, col))
            }
            '}' => {
                self.depth = self.depth.saturating_sub(1);
                self.advance();
                Ok(Token::new(TokenKind::CloseBrace, "}", line, col))
            }
            ',' => {
                self.advance();
                Ok(Token::new(TokenKind::Comma, ",", line, col))
            }
            ':' => {
                self.advance();
                Ok(Token::new(TokenKind::Colon, ":", line, col))
            }
            '.' => {
                self.advance();
                Ok(Token::new(TokenKind::Dot, ".", line, col))
            }
            '"' => self.read_string_literal(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_identifier_or_keyword(),
            _ => Err(ScriptError::Parse {
                line,
                col,
                message: format!("Unexpected character: '{}'", ch),
            }),
        }
    }

    fn read_string_literal(&mut self) -> ScriptResult<Token> {
        let line = self.line;
        let col = self.col;
        self.advance(); // skip opening quote

        let mut text = String::new();
        while self.pos < self.input.len() && self.input[self.pos] != '"' {
            if self.input[self.pos] == '\\' && self.peek_at(1) == Some('"') {
                self.advance();
                text.push('"');
            } else {
                text.push(self.input[self.pos]);
            }
            self.advance();
        }

        if self.pos >= self.input.len() {
            return Err(ScriptError::Parse {
                line,
                col,
                message: "Unterminated string literal".into(),
            });
        }

        self.advance(); // skip closing quote
        Ok(Token::new(TokenKind::Str, text, line, col))
    }

    fn read_number(&mut self) -> ScriptResult<Token> {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();

        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            text.push(self.input[self.pos]);
            self.advance();
        }

        // Fraction part only when a digit follows the dot, so a trailing
        // dot is left for the parser to reject.
        if self.pos < self.input.len()
            && self.input[self.pos] == '.'
            && self.peek_at(1).map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            text.push('.');
            self.advance();
            while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
                text.push(self.input[self.pos]);
                self.advance();
            }
        }

        Ok(Token::new(TokenKind::Number, text, line, col))
    }

    fn read_identifier_or_keyword(&mut self) -> ScriptResult<Token> {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();

        while self.pos < self.input.len()
            && (self.input[self.pos].is_ascii_alphanumeric() || self.input[self.pos] == '_')
        {
            text.push(self.input[self.pos]);
            self.advance();
        }

        let kind = match text.as_str() {
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Identifier,
        };

        Ok(Token::new(kind, text, line, col))
    }

    /// Skip spaces, comments, and bracketed newlines. Returns a Newline
    /// token when one or more separator newlines were crossed.
    fn skip_blank(&mut self) -> Option<Token> {
        let mut newline: Option<Token> = None;

        while self.pos < self.input.len() {
            let ch = self.input[self.pos];
            if ch == '\n' {
                if self.depth == 0 && newline.is_none() {
                    newline = Some(Token::new(TokenKind::Newline, "\n", self.line, self.col));
                }
                self.advance();
            } else if ch.is_whitespace() {
                self.advance();
            } else if ch == '#' {
                // Line comment
                while self.pos < self.input.len() && self.input[self.pos] != '\n' {
                    self.advance();
                }
            } else {
                break;
            }
        }

        newline
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            if self.input[self.pos] == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }
}
