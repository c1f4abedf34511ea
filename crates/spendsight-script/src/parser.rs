//! Parser: recursive descent parser for scriptlet source
//!
//! Consumes tokens from the lexer and produces a [`Program`] the evaluator
//! walks. A program is a flat list of `name = expr` statements; everything
//! interesting lives on the expression side.
//!
//! Call syntax is closed at this level: only a bare name or a `math.name`
//! path can appear before `(`, so arbitrary expressions are never callable.
//! Expression nesting is capped at [`MAX_EXPR_DEPTH`]: the cap bounds both
//! the parser's own recursion and the depth of the tree handed to the
//! evaluator, so a script can never grow either without bound.

use crate::errors::{ScriptError, ScriptResult};
use crate::lexer::{Lexer, Token, TokenKind};

/// Nesting budget for a single expression. Every construct that deepens the
/// expression tree charges one level against it, including the chained forms
/// the parser itself builds iteratively.
pub(crate) const MAX_EXPR_DEPTH: usize = 64;

/// A parsed scriptlet
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// A single `name = expr` statement
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub name: String,
    pub expr: Expr,
    /// Source line, for evaluation error reporting
    pub line: usize,
}

/// Expression tree
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Name(String),
    List(Vec<Expr>),
    Map(Vec<(Expr, Expr)>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `then if cond else otherwise`
    Conditional {
        then: Box<Expr>,
        cond: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Field {
        target: Box<Expr>,
        field: String,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    /// Call to a named builtin (`len`, ...) or math function (`math.sqrt`)
    Call {
        function: String,
        args: Vec<Expr>,
    },
    /// `[element for var in iterable if filter]`
    ListComp {
        element: Box<Expr>,
        var: String,
        iterable: Box<Expr>,
        filter: Option<Box<Expr>>,
    },
    /// `{key: value for var in iterable if filter}`
    MapComp {
        key: Box<Expr>,
        value: Box<Expr>,
        var: String,
        iterable: Box<Expr>,
        filter: Option<Box<Expr>>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    /// Operator spelling used in error messages
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Parser for scriptlet source
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Expression nesting currently in flight, charged against
    /// [`MAX_EXPR_DEPTH`]
    depth: usize,
}

impl Parser {
    /// Parse script text into a Program
    pub fn parse(input: &str) -> ScriptResult<Program> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;
        let mut parser = Self {
            tokens,
            pos: 0,
            depth: 0,
        };
        parser.parse_program()
    }

    fn parse_program(&mut self) -> ScriptResult<Program> {
        let mut statements = Vec::new();

        self.skip_newlines();
        while !self.check(TokenKind::Eof) {
            statements.push(self.parse_statement()?);

            if self.check(TokenKind::Newline) {
                self.skip_newlines();
            } else if !self.check(TokenKind::Eof) {
                let tok = self.peek();
                return Err(ScriptError::Parse {
                    line: tok.line,
                    col: tok.col,
                    message: format!("Expected end of statement, found '{}'", tok.text),
                });
            }
        }

        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> ScriptResult<Statement> {
        let (name, line) = {
            let tok = self.expect(TokenKind::Identifier)?;
            (tok.text.clone(), tok.line)
        };
        self.expect(TokenKind::Assign)?;
        let expr = self.parse_expr()?;
        Ok(Statement { name, expr, line })
    }

    fn parse_expr(&mut self) -> ScriptResult<Expr> {
        self.parse_conditional()
    }

    /// `then if cond else otherwise`, right-associative. The condition is an
    /// or-expression so a comprehension's trailing `if` is never captured.
    fn parse_conditional(&mut self) -> ScriptResult<Expr> {
        let then = self.parse_or()?;

        if self.check(TokenKind::If) {
            self.advance();
            let cond = self.parse_or()?;
            self.expect(TokenKind::Else)?;
            self.descend()?;
            let otherwise = self.parse_conditional()?;
            self.ascend();
            return Ok(Expr::Conditional {
                then: Box::new(then),
                cond: Box::new(cond),
                otherwise: Box::new(otherwise),
            });
        }

        Ok(then)
    }

    fn parse_or(&mut self) -> ScriptResult<Expr> {
        let mut expr = self.parse_and()?;
        let start = self.depth;
        while self.check(TokenKind::Or) {
            self.advance();
            self.descend()?;
            let right = self.parse_and()?;
            expr = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        self.depth = start;
        Ok(expr)
    }

    fn parse_and(&mut self) -> ScriptResult<Expr> {
        let mut expr = self.parse_not()?;
        let start = self.depth;
        while self.check(TokenKind::And) {
            self.advance();
            self.descend()?;
            let right = self.parse_not()?;
            expr = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        self.depth = start;
        Ok(expr)
    }

    fn parse_not(&mut self) -> ScriptResult<Expr> {
        if self.check(TokenKind::Not) {
            self.advance();
            self.descend()?;
            let operand = self.parse_not()?;
            self.ascend();
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ScriptResult<Expr> {
        let mut expr = self.parse_additive()?;
        let start = self.depth;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.parse_additive()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        self.depth = start;
        Ok(expr)
    }

    fn parse_additive(&mut self) -> ScriptResult<Expr> {
        let mut expr = self.parse_multiplicative()?;
        let start = self.depth;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.parse_multiplicative()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        self.depth = start;
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> ScriptResult<Expr> {
        let mut expr = self.parse_unary()?;
        let start = self.depth;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.parse_unary()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        self.depth = start;
        Ok(expr)
    }

    fn parse_unary(&mut self) -> ScriptResult<Expr> {
        if self.check(TokenKind::Minus) {
            self.advance();
            self.descend()?;
            let operand = self.parse_unary()?;
            self.ascend();
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    /// Field access, indexing, and calls bind tightest
    fn parse_postfix(&mut self) -> ScriptResult<Expr> {
        let mut expr = self.parse_primary()?;
        let start = self.depth;

        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    self.descend()?;
                    let field = self.expect_identifier()?;
                    expr = Expr::Field {
                        target: Box::new(expr),
                        field,
                    };
                }
                TokenKind::OpenBracket => {
                    self.advance();
                    self.descend()?;
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::CloseBracket)?;
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::OpenParen => {
                    let function = match &expr {
                        Expr::Name(name) => name.clone(),
                        Expr::Field { target, field }
                            if matches!(target.as_ref(), Expr::Name(n) if n == "math") =>
                        {
                            format!("math.{}", field)
                        }
                        _ => {
                            let tok = self.peek();
                            return Err(ScriptError::Parse {
                                line: tok.line,
                                col: tok.col,
                                message: "Only named builtin functions can be called".into(),
                            });
                        }
                    };
                    self.advance();
                    self.descend()?;
                    let args = self.parse_call_args()?;
                    expr = Expr::Call { function, args };
                }
                _ => break,
            }
        }

        self.depth = start;
        Ok(expr)
    }

    fn parse_call_args(&mut self) -> ScriptResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(TokenKind::CloseParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.check(TokenKind::Comma) {
                    self.advance();
                    if self.check(TokenKind::CloseParen) {
                        break;
                    }
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> ScriptResult<Expr> {
        match self.peek_kind() {
            TokenKind::Number => {
                let (text, line, col) = {
                    let tok = self.advance();
                    (tok.text.clone(), tok.line, tok.col)
                };
                let value = text.parse::<f64>().map_err(|_| ScriptError::Parse {
                    line,
                    col,
                    message: format!("'{}' is not a valid number", text),
                })?;
                Ok(Expr::Number(value))
            }
            TokenKind::Str => {
                let text = self.advance().text.clone();
                Ok(Expr::Str(text))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Identifier => {
                let name = self.advance().text.clone();
                Ok(Expr::Name(name))
            }
            TokenKind::OpenParen => {
                self.advance();
                self.descend()?;
                let expr = self.parse_expr()?;
                self.ascend();
                self.expect(TokenKind::CloseParen)?;
                Ok(expr)
            }
            TokenKind::OpenBracket => self.parse_list_or_comprehension(),
            TokenKind::OpenBrace => self.parse_map_or_comprehension(),
            TokenKind::Eof => Err(ScriptError::UnexpectedEof("an expression".into())),
            _ => {
                let tok = self.peek();
                Err(ScriptError::UnexpectedToken {
                    expected: "an expression".into(),
                    found: tok.text.clone(),
                })
            }
        }
    }

    fn parse_list_or_comprehension(&mut self) -> ScriptResult<Expr> {
        self.expect(TokenKind::OpenBracket)?;
        self.descend()?;
        let expr = self.parse_list_items()?;
        self.ascend();
        Ok(expr)
    }

    fn parse_list_items(&mut self) -> ScriptResult<Expr> {
        if self.check(TokenKind::CloseBracket) {
            self.advance();
            return Ok(Expr::List(Vec::new()));
        }

        let first = self.parse_expr()?;

        if self.check(TokenKind::For) {
            let (var, iterable, filter) = self.parse_comprehension_tail()?;
            self.expect(TokenKind::CloseBracket)?;
            return Ok(Expr::ListComp {
                element: Box::new(first),
                var,
                iterable: Box::new(iterable),
                filter,
            });
        }

        let mut items = vec![first];
        while self.check(TokenKind::Comma) {
            self.advance();
            if self.check(TokenKind::CloseBracket) {
                break;
            }
            items.push(self.parse_expr()?);
        }
        self.expect(TokenKind::CloseBracket)?;
        Ok(Expr::List(items))
    }

    fn parse_map_or_comprehension(&mut self) -> ScriptResult<Expr> {
        self.expect(TokenKind::OpenBrace)?;
        self.descend()?;
        let expr = self.parse_map_entries()?;
        self.ascend();
        Ok(expr)
    }

    fn parse_map_entries(&mut self) -> ScriptResult<Expr> {
        if self.check(TokenKind::CloseBrace) {
            self.advance();
            return Ok(Expr::Map(Vec::new()));
        }

        let key = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let value = self.parse_expr()?;

        if self.check(TokenKind::For) {
            let (var, iterable, filter) = self.parse_comprehension_tail()?;
            self.expect(TokenKind::CloseBrace)?;
            return Ok(Expr::MapComp {
                key: Box::new(key),
                value: Box::new(value),
                var,
                iterable: Box::new(iterable),
                filter,
            });
        }

        let mut entries = vec![(key, value)];
        while self.check(TokenKind::Comma) {
            self.advance();
            if self.check(TokenKind::CloseBrace) {
                break;
            }
            let key = self.parse_expr()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expr()?;
            entries.push((key, value));
        }
        self.expect(TokenKind::CloseBrace)?;
        Ok(Expr::Map(entries))
    }

    /// `for var in iterable [if filter]`. The iterable and filter are
    /// or-expressions, which keeps the trailing `if` unambiguous.
    fn parse_comprehension_tail(&mut self) -> ScriptResult<(String, Expr, Option<Box<Expr>>)> {
        self.expect(TokenKind::For)?;
        let var = self.expect_identifier()?;
        self.expect(TokenKind::In)?;
        let iterable = self.parse_or()?;
        let filter = if self.check(TokenKind::If) {
            self.advance();
            Some(Box::new(self.parse_or()?))
        } else {
            None
        };
        Ok((var, iterable, filter))
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Charge one nesting level against [`MAX_EXPR_DEPTH`]
    fn descend(&mut self) -> ScriptResult<()> {
        if self.depth >= MAX_EXPR_DEPTH {
            return Err(ScriptError::NestingTooDeep(MAX_EXPR_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind.clone()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> ScriptResult<&Token> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else if self.check(TokenKind::Eof) {
            Err(ScriptError::UnexpectedEof(format!("{}", kind)))
        } else {
            let tok = self.peek();
            Err(ScriptError::UnexpectedToken {
                expected: format!("{}", kind),
                found: tok.text.clone(),
            })
        }
    }

    fn expect_identifier(&mut self) -> ScriptResult<String> {
        let tok = self.expect(TokenKind::Identifier)?;
        Ok(tok.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_assignment_with_precedence() {
        let program = Parser::parse("x = 1 + 2 * 3").unwrap();
        assert_eq!(program.statements.len(), 1);
        assert_eq!(program.statements[0].name, "x");

        match &program.statements[0].expr {
            Expr::Binary { op, right, .. } => {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(
                    right.as_ref(),
                    Expr::Binary {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("expected binary add, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_refinement_shaped_script() {
        let input = "\
scores = [abs(t.amount) for t in transactions]
threshold = max(scores) * 0.8 if scores else 0
flags = [s >= threshold for s in scores]
";
        let program = Parser::parse(input).unwrap();
        let names: Vec<&str> = program
            .statements
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["scores", "threshold", "flags"]);

        assert!(matches!(program.statements[0].expr, Expr::ListComp { .. }));
        assert!(matches!(
            program.statements[1].expr,
            Expr::Conditional { .. }
        ));
    }

    #[test]
    fn test_parse_conditional_groups_left_of_if() {
        let program = Parser::parse("t = max(xs) * 0.8 if xs else 0").unwrap();
        match &program.statements[0].expr {
            Expr::Conditional {
                then,
                cond,
                otherwise,
            } => {
                assert!(matches!(
                    then.as_ref(),
                    Expr::Binary {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
                assert!(matches!(cond.as_ref(), Expr::Name(n) if n == "xs"));
                assert!(matches!(otherwise.as_ref(), Expr::Number(n) if *n == 0.0));
            }
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_comprehension_with_filter() {
        let program = Parser::parse("big = [t.amount for t in transactions if t.amount > 100]")
            .unwrap();
        match &program.statements[0].expr {
            Expr::ListComp {
                var,
                filter,
                element,
                ..
            } => {
                assert_eq!(var, "t");
                assert!(filter.is_some());
                assert!(matches!(element.as_ref(), Expr::Field { field, .. } if field == "amount"));
            }
            other => panic!("expected list comprehension, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_map_comprehension() {
        let program = Parser::parse("by_name = {s: 0 for s in names}").unwrap();
        assert!(matches!(program.statements[0].expr, Expr::MapComp { .. }));
    }

    #[test]
    fn test_parse_map_literal() {
        let program = Parser::parse(r#"m = {"a": 1, "b": 2}"#).unwrap();
        match &program.statements[0].expr {
            Expr::Map(entries) => assert_eq!(entries.len(), 2),
            other => panic!("expected map literal, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_math_namespace_call() {
        let program = Parser::parse("r = math.sqrt(2)").unwrap();
        match &program.statements[0].expr {
            Expr::Call { function, args } => {
                assert_eq!(function, "math.sqrt");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_call_on_arbitrary_expression() {
        let err = Parser::parse("x = (f)(1)").unwrap_err();
        assert!(err
            .to_string()
            .contains("Only named builtin functions can be called"));
    }

    #[test]
    fn test_parse_index_and_field_chain() {
        let program = Parser::parse("a = xs[0].amount").unwrap();
        match &program.statements[0].expr {
            Expr::Field { target, field } => {
                assert_eq!(field, "amount");
                assert!(matches!(target.as_ref(), Expr::Index { .. }));
            }
            other => panic!("expected field access, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_boolean_precedence() {
        let program = Parser::parse("f = a or b and not c").unwrap();
        match &program.statements[0].expr {
            Expr::Binary {
                op: BinaryOp::Or,
                right,
                ..
            } => {
                assert!(matches!(
                    right.as_ref(),
                    Expr::Binary {
                        op: BinaryOp::And,
                        ..
                    }
                ));
            }
            other => panic!("expected or-expression, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unary_minus_binds_tighter_than_addition() {
        let program = Parser::parse("y = -x + 1").unwrap();
        match &program.statements[0].expr {
            Expr::Binary {
                op: BinaryOp::Add,
                left,
                ..
            } => {
                assert!(matches!(
                    left.as_ref(),
                    Expr::Unary {
                        op: UnaryOp::Neg,
                        ..
                    }
                ));
            }
            other => panic!("expected addition, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_multiline_list_literal() {
        let program = Parser::parse("xs = [\n    1,\n    2,\n]").unwrap();
        match &program.statements[0].expr {
            Expr::List(items) => assert_eq!(items.len(), 2),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_and_comment_only_scripts() {
        assert!(Parser::parse("").unwrap().statements.is_empty());
        assert!(Parser::parse("\n# notes only\n\n").unwrap().statements.is_empty());
    }

    #[test]
    fn test_parse_statement_requires_assignment() {
        assert!(Parser::parse("x 1").is_err());
        assert!(Parser::parse("1 = 2").is_err());
    }

    #[test]
    fn test_parse_trailing_tokens_after_expression() {
        let err = Parser::parse("x = 1 2").unwrap_err();
        assert!(err.to_string().contains("Expected end of statement"));
    }

    #[test]
    fn test_parse_statement_line_numbers() {
        let program = Parser::parse("a = 1\nb = 2\nc = 3").unwrap();
        let lines: Vec<usize> = program.statements.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_rejects_nesting_beyond_the_depth_cap() {
        let parens = format!("x = {}1{}", "(".repeat(200), ")".repeat(200));
        assert!(matches!(
            Parser::parse(&parens).unwrap_err(),
            ScriptError::NestingTooDeep(limit) if limit == MAX_EXPR_DEPTH
        ));

        let lists = format!("x = {}1{}", "[".repeat(200), "]".repeat(200));
        assert!(matches!(
            Parser::parse(&lists).unwrap_err(),
            ScriptError::NestingTooDeep(_)
        ));

        let nots = format!("x = {}y", "not ".repeat(200));
        assert!(matches!(
            Parser::parse(&nots).unwrap_err(),
            ScriptError::NestingTooDeep(_)
        ));
    }

    #[test]
    fn test_parse_rejects_unbounded_chains() {
        // Chained operators and postfix accessors deepen the tree one level
        // per step even though the parser consumes them in a loop.
        let sums = format!("x = {}1", "1 + ".repeat(200));
        assert!(matches!(
            Parser::parse(&sums).unwrap_err(),
            ScriptError::NestingTooDeep(_)
        ));

        let fields = format!("x = y{}", ".f".repeat(200));
        assert!(matches!(
            Parser::parse(&fields).unwrap_err(),
            ScriptError::NestingTooDeep(_)
        ));
    }

    #[test]
    fn test_parse_accepts_nesting_under_the_cap() {
        let parens = format!("x = {}1{}", "(".repeat(40), ")".repeat(40));
        assert!(Parser::parse(&parens).is_ok());

        let sums = format!("x = {}1", "1 + ".repeat(40));
        assert!(Parser::parse(&sums).is_ok());
    }
}
