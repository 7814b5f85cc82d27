use std::collections::HashMap;

use ora2pg_model::TypeCategory;
use ora2pg_parser::{BinaryOp, Expr, ExprKind, FromItem, Literal, SelectStmt};

use crate::builtins::{builtin_return_category, is_conditional_function, result_arg_indices};
use crate::cache::TypeCache;
use crate::index::MetadataIndex;

fn fold(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// Maps an alias or bare table name, as it would appear qualifying a
/// column in this statement, to the `(schema, table)` it designates.
struct FromResolution {
    resolved: Vec<(String, String)>,
    by_alias: HashMap<String, usize>,
}

impl FromResolution {
    fn build(items: &[FromItem], current_schema: &str) -> Self {
        let mut resolved = Vec::with_capacity(items.len());
        let mut by_alias = HashMap::new();
        for (i, item) in items.iter().enumerate() {
            let schema = item.schema.clone().map(|s| s.to_string()).unwrap_or_else(|| current_schema.to_string());
            resolved.push((schema, item.name.to_string()));
            let key = item.alias.as_deref().unwrap_or(item.name.as_str());
            by_alias.insert(fold(key), i);
            // An exposed table name resolves even when a different alias is also present.
            by_alias.entry(fold(item.name.as_str())).or_insert(i);
        }
        Self { resolved, by_alias }
    }

    fn resolve_qualified(&self, qualifier: &str) -> Option<&(String, String)> {
        self.by_alias.get(&fold(qualifier)).map(|&i| &self.resolved[i])
    }
}

/// Runs the first-pass type inference visitor over `stmt`, returning a
/// populated cache. `current_schema` is used to resolve unqualified table
/// references in the FROM list against `index`.
pub fn infer_select(stmt: &SelectStmt, index: &MetadataIndex<'_>, current_schema: &str) -> TypeCache {
    let mut cache = TypeCache::new();
    let from = FromResolution::build(&stmt.from, current_schema);

    for item in &stmt.items {
        infer_expr(&item.expr, &from, index, &mut cache);
    }
    if let Some(w) = &stmt.where_clause {
        infer_expr(w, &from, index, &mut cache);
    }
    cache
}

fn infer_expr(expr: &Expr, from: &FromResolution, index: &MetadataIndex<'_>, cache: &mut TypeCache) -> TypeCategory {
    let category = match &expr.kind {
        ExprKind::Literal(lit) => literal_category(lit),
        ExprKind::Rownum => TypeCategory::Numeric,
        ExprKind::Column { qualifier, name } => resolve_column(qualifier.as_deref(), name, from, index),
        ExprKind::Binary { op, left, right } => {
            let l = infer_expr(left, from, index, cache);
            let r = infer_expr(right, from, index, cache);
            binary_category(*op, &l, &r)
        }
        ExprKind::Unary { expr: inner, .. } => infer_expr(inner, from, index, cache),
        ExprKind::Paren(inner) => infer_expr(inner, from, index, cache),
        ExprKind::FunctionCall { name, args } => {
            let arg_categories: Vec<TypeCategory> = args.iter().map(|a| infer_expr(a, from, index, cache)).collect();
            function_call_category(name, &arg_categories, index)
        }
        ExprKind::Case { operand, whens, else_branch } => {
            if let Some(op) = operand {
                infer_expr(op, from, index, cache);
            }
            let mut branch_categories = Vec::new();
            for (cond, result) in whens {
                infer_expr(cond, from, index, cache);
                branch_categories.push(infer_expr(result, from, index, cache));
            }
            if let Some(e) = else_branch {
                branch_categories.push(infer_expr(e, from, index, cache));
            }
            merge_conditional(branch_categories.into_iter())
        }
    };
    cache.insert(expr.id, category.clone());
    category
}

fn literal_category(lit: &Literal) -> TypeCategory {
    match lit {
        Literal::Integer(_) | Literal::Decimal(_) => TypeCategory::Numeric,
        Literal::String(_) => TypeCategory::Text,
        Literal::Null => TypeCategory::Null,
        Literal::Date(_) => TypeCategory::Date,
        Literal::Timestamp(_) => TypeCategory::Timestamp,
        Literal::Bool(_) => TypeCategory::Boolean,
    }
}

fn resolve_column(qualifier: Option<&str>, name: &str, from: &FromResolution, index: &MetadataIndex<'_>) -> TypeCategory {
    if name == "*" {
        return TypeCategory::Unknown;
    }
    if let Some(q) = qualifier {
        return match from.resolve_qualified(q) {
            Some((schema, table)) => index.column_category(schema, table, name).unwrap_or_else(|| {
                tracing::debug!(qualifier = q, column = name, "column not found under resolved table");
                TypeCategory::Unknown
            }),
            None => {
                tracing::debug!(qualifier = q, column = name, "qualifier did not resolve against FROM list");
                TypeCategory::Unknown
            }
        };
    }
    for (schema, table) in &from.resolved {
        if let Some(cat) = index.column_category(schema, table, name) {
            return cat;
        }
    }
    TypeCategory::Unknown
}

fn binary_category(op: BinaryOp, l: &TypeCategory, r: &TypeCategory) -> TypeCategory {
    use BinaryOp::*;

    if matches!(l, TypeCategory::Null) || matches!(r, TypeCategory::Null) {
        return TypeCategory::Null;
    }

    match op {
        Add | Sub => {
            let l_date = l.is_date_like();
            let r_date = r.is_date_like();
            match (l_date, r_date, op) {
                (true, false, _) => l.clone(),
                (false, true, Add) => r.clone(),
                (true, true, Sub) => TypeCategory::Numeric,
                (true, true, Add) => TypeCategory::Unknown,
                _ => TypeCategory::Numeric,
            }
        }
        Mul | Div | Pow | Mod => TypeCategory::Numeric,
        Concat => TypeCategory::Text,
        Eq | NotEq | Lt | Gt | Le | Ge | And | Or | Like => TypeCategory::Boolean,
    }
}

fn function_call_category(name: &str, args: &[TypeCategory], index: &MetadataIndex<'_>) -> TypeCategory {
    if is_conditional_function(name) {
        let picks = result_arg_indices(name, args.len());
        let categories = picks.into_iter().filter_map(|i| args.get(i).cloned());
        return merge_conditional(categories);
    }
    if let Some(cat) = builtin_return_category(name) {
        return cat;
    }
    if let Some(cat) = index.function_return_category(name) {
        return cat;
    }
    TypeCategory::Unknown
}

/// The category of a multi-branch conditional expression: the first
/// non-`Null` branch category, or `Unknown` if branches disagree.
fn merge_conditional(categories: impl Iterator<Item = TypeCategory>) -> TypeCategory {
    let mut result: Option<TypeCategory> = None;
    for c in categories {
        if matches!(c, TypeCategory::Null) {
            continue;
        }
        match &result {
            None => result = Some(c),
            Some(r) if *r == c => {}
            Some(_) => return TypeCategory::Unknown,
        }
    }
    result.unwrap_or(TypeCategory::Null)
}
