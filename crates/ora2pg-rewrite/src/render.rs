//! Visitor that emits PostgreSQL text from a parsed `SELECT`. Reads the
//! type cache the inference pass populated and falls back to the
//! heuristics in `date`/`strings` on a cache miss.
//!
//! Identifier quoting is a known simplification: the lexer distinguishes a
//! quoted identifier from a bare one (`TokenKind::QuotedIdent`), but that
//! bit isn't threaded into `ExprKind::Column`/`FromItem`, so every
//! identifier is folded as if it were unquoted. A quoted, case-sensitive
//! identifier therefore gets lowercased here same as a bare one.

use std::collections::HashMap;

use ora2pg_dialect::normalize_identifier;
use ora2pg_model::{QualifiedName, TypeCategory};
use ora2pg_parser::{BinaryOp, Expr, ExprKind, Literal, SelectStmt, UnaryOp};
use ora2pg_typeinfer::TypeCache;

use crate::{date, strings, RewriteError};

/// Schema context a `SELECT` is rewritten under: the current schema for
/// unqualified table references, and the synonym map (`synonym name` ->
/// the table it actually points at) metadata indices would have supplied.
pub struct RenderContext<'a> {
    pub current_schema: String,
    pub synonyms: &'a HashMap<String, QualifiedName>,
}

impl RenderContext<'_> {
    fn resolve_table(&self, schema: Option<&str>, name: &str) -> (String, String) {
        if let Some(s) = schema {
            return (normalize_identifier(s), normalize_identifier(name));
        }
        if let Some(q) = self.synonyms.get(&name.to_ascii_lowercase()) {
            return (normalize_identifier(&q.schema), normalize_identifier(&q.name));
        }
        (normalize_identifier(&self.current_schema), normalize_identifier(name))
    }
}

fn flatten_and<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match &expr.kind {
        ExprKind::Binary { op: BinaryOp::And, left, right } => {
            flatten_and(left, out);
            flatten_and(right, out);
        }
        _ => out.push(expr),
    }
}

/// `ROWNUM <= N` / `ROWNUM < N` as a `LIMIT` argument, or `None` if `expr`
/// isn't one of those two shapes.
fn rownum_limit(expr: &Expr) -> Option<String> {
    let ExprKind::Binary { op, left, right } = &expr.kind else {
        return None;
    };
    if !matches!(left.kind, ExprKind::Rownum) {
        return None;
    }
    let ExprKind::Literal(Literal::Integer(n)) = &right.kind else {
        return None;
    };
    match op {
        BinaryOp::Le => Some(n.to_string()),
        BinaryOp::Lt => {
            let n: i64 = n.parse().ok()?;
            Some((n - 1).to_string())
        }
        _ => None,
    }
}

/// Renders a full `SELECT`: select list, `FROM` (with `DUAL` dropped),
/// any leftover `WHERE` conjuncts once a `ROWNUM` bound has been pulled
/// into `LIMIT`.
pub fn render_select(stmt: &SelectStmt, ctx: &RenderContext<'_>, cache: &TypeCache) -> Result<String, RewriteError> {
    let mut conjuncts = Vec::new();
    if let Some(w) = &stmt.where_clause {
        flatten_and(w, &mut conjuncts);
    }

    let mut limit = None;
    let mut remaining = Vec::new();
    for c in conjuncts {
        if limit.is_none() {
            if let Some(n) = rownum_limit(c) {
                limit = Some(n);
                continue;
            }
        }
        remaining.push(c);
    }

    let mut out = String::from("SELECT ");
    if stmt.distinct {
        out.push_str("DISTINCT ");
    }

    let items: Vec<String> = stmt
        .items
        .iter()
        .map(|item| -> Result<String, RewriteError> {
            let rendered = render_expr(&item.expr, ctx, cache)?;
            Ok(match &item.alias {
                Some(a) => format!("{rendered} AS {}", normalize_identifier(a)),
                None => rendered,
            })
        })
        .collect::<Result<_, _>>()?;
    out.push_str(&items.join(", "));

    let from_items: Vec<_> = stmt.from.iter().filter(|f| !f.is_dual).collect();
    if !from_items.is_empty() {
        out.push_str(" FROM ");
        let rendered_from: Vec<String> = from_items
            .iter()
            .map(|f| {
                let (schema, table) = ctx.resolve_table(f.schema.as_deref(), &f.name);
                match &f.alias {
                    Some(a) => format!("{schema}.{table} {}", normalize_identifier(a)),
                    None => format!("{schema}.{table}"),
                }
            })
            .collect();
        out.push_str(&rendered_from.join(", "));
    }

    if !remaining.is_empty() {
        let rendered: Vec<String> =
            remaining.iter().map(|e| render_expr(e, ctx, cache)).collect::<Result<_, _>>()?;
        out.push_str(" WHERE ");
        out.push_str(&rendered.join(" AND "));
    }

    if let Some(n) = limit {
        out.push_str(&format!(" LIMIT {n}"));
    }

    Ok(out)
}

pub fn render_expr(expr: &Expr, ctx: &RenderContext<'_>, cache: &TypeCache) -> Result<String, RewriteError> {
    match &expr.kind {
        ExprKind::Column { qualifier, name } => Ok(render_column(qualifier.as_deref(), name)),
        ExprKind::Literal(lit) => Ok(render_literal(lit)),
        ExprKind::Rownum => Ok("ROWNUM".to_string()),
        ExprKind::Unary { op, expr: inner } => {
            let inner_text = render_expr(inner, ctx, cache)?;
            Ok(match op {
                UnaryOp::Neg => format!("-{inner_text}"),
                UnaryOp::Not => format!("NOT {inner_text}"),
            })
        }
        ExprKind::Paren(inner) => Ok(format!("({})", render_expr(inner, ctx, cache)?)),
        ExprKind::Binary { op, left, right } => render_binary(*op, left, right, ctx, cache),
        ExprKind::FunctionCall { name, args } => render_function_call(name, args, ctx, cache),
        ExprKind::Case { operand, whens, else_branch } => {
            render_case(operand.as_deref(), whens, else_branch.as_deref(), ctx, cache)
        }
    }
}

fn render_column(qualifier: Option<&str>, name: &str) -> String {
    if name == "*" {
        return "*".to_string();
    }
    if qualifier.is_none() && name.eq_ignore_ascii_case("SYSDATE") {
        return "CURRENT_TIMESTAMP".to_string();
    }
    match qualifier {
        Some(q) => format!("{}.{}", normalize_identifier(q), normalize_identifier(name)),
        None => normalize_identifier(name),
    }
}

fn render_literal(lit: &Literal) -> String {
    match lit {
        Literal::Integer(s) | Literal::Decimal(s) => s.to_string(),
        Literal::String(s) => format!("'{s}'"),
        Literal::Null => "NULL".to_string(),
        Literal::Date(s) => format!("DATE '{s}'"),
        Literal::Timestamp(s) => format!("TIMESTAMP '{s}'"),
        Literal::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
    }
}

fn binary_op_text(op: BinaryOp) -> &'static str {
    use BinaryOp::*;
    match op {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Pow => "^",
        Mod => "%",
        Concat => "||",
        Eq => "=",
        NotEq => "<>",
        Lt => "<",
        Gt => ">",
        Le => "<=",
        Ge => ">=",
        And => "AND",
        Or => "OR",
        Like => "LIKE",
    }
}

fn render_binary(op: BinaryOp, left: &Expr, right: &Expr, ctx: &RenderContext<'_>, cache: &TypeCache) -> Result<String, RewriteError> {
    let left_text = render_expr(left, ctx, cache)?;
    let right_text = render_expr(right, ctx, cache)?;

    if matches!(op, BinaryOp::Add | BinaryOp::Sub) {
        let left_cat = cache.get_or_unknown(left.id);
        let right_cat = cache.get_or_unknown(right.id);
        if let Some(rewritten) = date::rewrite_date_binary(op, left, right, &left_text, &right_text, &left_cat, &right_cat) {
            return Ok(rewritten);
        }
    }

    Ok(format!("{left_text} {} {right_text}", binary_op_text(op)))
}

fn render_case(
    operand: Option<&Expr>,
    whens: &[(Expr, Expr)],
    else_branch: Option<&Expr>,
    ctx: &RenderContext<'_>,
    cache: &TypeCache,
) -> Result<String, RewriteError> {
    let mut out = String::from("CASE");
    if let Some(op) = operand {
        out.push_str(&format!(" {}", render_expr(op, ctx, cache)?));
    }
    for (cond, result) in whens {
        out.push_str(&format!(" WHEN {} THEN {}", render_expr(cond, ctx, cache)?, render_expr(result, ctx, cache)?));
    }
    if let Some(e) = else_branch {
        out.push_str(&format!(" ELSE {}", render_expr(e, ctx, cache)?));
    }
    out.push_str(" END");
    Ok(out)
}

fn require_arity(name: &str, args: &[Expr], n: usize) -> Result<(), RewriteError> {
    if args.len() == n {
        Ok(())
    } else {
        Err(RewriteError::UnsupportedArity { function: name.to_string(), found: args.len() })
    }
}

fn render_function_call(name: &str, args: &[Expr], ctx: &RenderContext<'_>, cache: &TypeCache) -> Result<String, RewriteError> {
    let arg_texts: Vec<String> = args.iter().map(|a| render_expr(a, ctx, cache)).collect::<Result<_, _>>()?;
    let upper = name.to_ascii_uppercase();

    match upper.as_str() {
        "ADD_MONTHS" => {
            require_arity("ADD_MONTHS", args, 2)?;
            Ok(date::rewrite_add_months(&arg_texts))
        }
        "MONTHS_BETWEEN" => {
            require_arity("MONTHS_BETWEEN", args, 2)?;
            Ok(date::rewrite_months_between(&arg_texts))
        }
        "LAST_DAY" => {
            require_arity("LAST_DAY", args, 1)?;
            Ok(date::rewrite_last_day(&arg_texts))
        }
        "TRUNC" => {
            let arg_cats: Vec<TypeCategory> = args.iter().map(|a| cache.get_or_unknown(a.id)).collect();
            Ok(date::rewrite_trunc(args, &arg_texts, &arg_cats))
        }
        "ROUND" => {
            let arg_cats: Vec<TypeCategory> = args.iter().map(|a| cache.get_or_unknown(a.id)).collect();
            Ok(date::rewrite_round(args, &arg_texts, &arg_cats))
        }
        "INSTR" => strings::rewrite_instr(args, &arg_texts),
        "SUBSTR" => strings::rewrite_substr(args, &arg_texts),
        "NVL" => {
            require_arity("NVL", args, 2)?;
            Ok(format!("COALESCE({}, {})", arg_texts[0], arg_texts[1]))
        }
        "RAWTOHEX" => Ok(strings::rewrite_rawtohex(&arg_texts)),
        "REGEXP_REPLACE" => strings::rewrite_regexp_replace(args, &arg_texts),
        "REGEXP_SUBSTR" => strings::rewrite_regexp_substr(args, &arg_texts),
        "REGEXP_INSTR" => Err(strings::rewrite_regexp_instr()),
        _ => Ok(format!("{name}({})", arg_texts.join(", "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ora2pg_parser::parse_select;
    use ora2pg_typeinfer::infer_select;

    fn render(sql: &str) -> String {
        let stmt = parse_select(sql).unwrap();
        let synonyms = HashMap::new();
        let ctx = RenderContext { current_schema: "s".to_string(), synonyms: &synonyms };
        let index = ora2pg_typeinfer::MetadataIndex::new(&[], &[]);
        let cache = infer_select(&stmt, &index, "s");
        render_select(&stmt, &ctx, &cache).unwrap()
    }

    #[test]
    fn rewrites_rownum_predicate_to_limit() {
        assert_eq!(render("SELECT * FROM t WHERE ROWNUM <= 10"), "SELECT * FROM s.t LIMIT 10");
    }

    #[test]
    fn drops_dual_and_rewrites_sysdate_and_last_day() {
        assert_eq!(
            render("SELECT LAST_DAY(SYSDATE) FROM dual"),
            "SELECT (DATE_TRUNC('MONTH', CURRENT_TIMESTAMP) + INTERVAL '1 month' - INTERVAL '1 day')::DATE"
        );
    }

    #[test]
    fn keeps_non_rownum_where_clause_intact() {
        assert_eq!(render("SELECT name FROM t WHERE name = 'x'"), "SELECT name FROM s.t WHERE name = 'x'");
    }

    #[test]
    fn qualifies_table_with_current_schema() {
        assert_eq!(render("SELECT id FROM employees e"), "SELECT id FROM s.employees e");
    }

    #[test]
    fn rejects_unsupported_regexp_instr() {
        let stmt = parse_select("SELECT REGEXP_INSTR(name, 'x') FROM t").unwrap();
        let synonyms = HashMap::new();
        let ctx = RenderContext { current_schema: "s".to_string(), synonyms: &synonyms };
        let index = ora2pg_typeinfer::MetadataIndex::new(&[], &[]);
        let cache = infer_select(&stmt, &index, "s");
        assert!(render_select(&stmt, &ctx, &cache).is_err());
    }
}
