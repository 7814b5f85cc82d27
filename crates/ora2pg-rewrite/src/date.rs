use ora2pg_model::TypeCategory;
use ora2pg_parser::{BinaryOp, Expr, ExprKind, Literal};

const DATE_FUNCTION_MARKERS: &[&str] =
    &["SYSDATE", "TO_DATE", "ADD_MONTHS", "LAST_DAY", "DATE_TRUNC", "TO_TIMESTAMP"];
const DATE_NAME_PREFIXES: &[&str] = &["CREATED", "MODIFIED", "UPDATED", "BIRTH", "HIRE", "START", "END"];
const DATE_NAME_SUFFIXES: &[&str] = &["_AT", "_ON"];

/// Textual fallback used only when an operand's category couldn't be
/// determined from metadata: does it look, by name or by calling a known
/// date function, like a date-valued expression?
pub fn looks_like_date_text(text: &str) -> bool {
    let upper = text.to_uppercase();
    if upper.starts_with("CURRENT_") {
        return true;
    }
    if DATE_FUNCTION_MARKERS.iter().any(|m| upper.contains(m)) {
        return true;
    }
    if upper.contains("DATE") || upper.contains("TIME") || upper.contains("TIMESTAMP") {
        return true;
    }
    if DATE_NAME_PREFIXES.iter().any(|p| upper.starts_with(p)) {
        return true;
    }
    if DATE_NAME_SUFFIXES.iter().any(|s| upper.ends_with(s)) {
        return true;
    }
    false
}

fn is_date_side(cat: &TypeCategory, expr: &Expr) -> bool {
    cat.is_date_like() || (matches!(cat, TypeCategory::Unknown) && looks_like_date_text(&expr.approx_text()))
}

/// Rewrites `left op right` when one side is date-valued, returning `None`
/// when neither side looks like a date (the caller should then fall back
/// to plain arithmetic rendering).
pub fn rewrite_date_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    left_text: &str,
    right_text: &str,
    left_cat: &TypeCategory,
    right_cat: &TypeCategory,
) -> Option<String> {
    if !matches!(op, BinaryOp::Add | BinaryOp::Sub) {
        return None;
    }
    let left_is_date = is_date_side(left_cat, left);
    let right_is_date = is_date_side(right_cat, right);

    match (left_is_date, right_is_date, op) {
        (true, false, BinaryOp::Add) => Some(format!("{left_text} + ({right_text} * INTERVAL '1 day')")),
        (false, true, BinaryOp::Add) => Some(format!("{right_text} + ({left_text} * INTERVAL '1 day')")),
        (true, false, BinaryOp::Sub) => Some(format!("{left_text} - ({right_text} * INTERVAL '1 day')")),
        (true, true, BinaryOp::Sub) => Some(format!("{left_text} - {right_text}")),
        (true, true, BinaryOp::Add) => None,
        _ => None,
    }
}

const DATE_FORMAT_CODES: &[&str] = &[
    "DD", "DDD", "J", "MM", "MON", "MONTH", "YYYY", "YEAR", "YY", "RR", "RRRR", "Q", "HH", "HH12", "HH24", "MI", "SS",
];

fn literal_string(expr: &Expr) -> Option<String> {
    match &expr.kind {
        ExprKind::Literal(Literal::String(s)) => Some(s.to_string()),
        _ => None,
    }
}

fn date_format_code(expr: &Expr) -> Option<String> {
    let s = literal_string(expr)?;
    let upper = s.to_uppercase();
    DATE_FORMAT_CODES.contains(&upper.as_str()).then_some(upper)
}

fn pg_trunc_unit(code: &str) -> &'static str {
    match code {
        "DD" | "DDD" | "J" => "day",
        "MM" | "MON" | "MONTH" => "month",
        "YYYY" | "YEAR" | "YY" | "RR" | "RRRR" => "year",
        "Q" => "quarter",
        "HH" | "HH12" | "HH24" => "hour",
        "MI" => "minute",
        "SS" => "second",
        _ => "day",
    }
}

/// `TRUNC(x[, fmt])`: dispatches to date truncation or numeric truncation
/// depending on whether `fmt` names a date format or `x` looks date-valued.
pub fn rewrite_trunc(args: &[Expr], arg_texts: &[String], arg_cats: &[TypeCategory]) -> String {
    let x_text = &arg_texts[0];
    let fmt_expr = args.get(1);
    let date_code = fmt_expr.and_then(date_format_code);
    let treat_as_date = date_code.is_some() || (fmt_expr.is_none() && is_date_side(&arg_cats[0], &args[0]));

    if treat_as_date {
        let unit = pg_trunc_unit(date_code.as_deref().unwrap_or("DD"));
        format!("DATE_TRUNC('{unit}', {x_text})::DATE")
    } else {
        let cast = if !matches!(arg_cats[0], TypeCategory::Numeric) { "::numeric" } else { "" };
        match arg_texts.get(1) {
            Some(n) => format!("TRUNC({x_text}{cast}, {n})"),
            None => format!("TRUNC({x_text}{cast})"),
        }
    }
}

/// `ROUND(x[, fmt])`: same date/numeric dispatch as `TRUNC`, but dates
/// round via a threshold `CASE` rather than truncating outright.
pub fn rewrite_round(args: &[Expr], arg_texts: &[String], arg_cats: &[TypeCategory]) -> String {
    let x_text = &arg_texts[0];
    let fmt_expr = args.get(1);
    let date_code = fmt_expr.and_then(date_format_code);
    let treat_as_date = date_code.is_some() || (fmt_expr.is_none() && is_date_side(&arg_cats[0], &args[0]));

    if treat_as_date {
        let unit = pg_trunc_unit(date_code.as_deref().unwrap_or("DD"));
        let (field, threshold) = match unit {
            "day" => ("HOUR", 12),
            "month" => ("DAY", 16),
            "year" => ("MONTH", 7),
            "quarter" => ("MONTH", 2),
            "hour" => ("MINUTE", 30),
            "minute" => ("SECOND", 30),
            _ => ("HOUR", 12),
        };
        format!(
            "CASE WHEN EXTRACT({field} FROM {x_text}) >= {threshold} THEN DATE_TRUNC('{unit}', {x_text}) + INTERVAL '1 {unit}' ELSE DATE_TRUNC('{unit}', {x_text}) END::DATE"
        )
    } else {
        let cast = if !matches!(arg_cats[0], TypeCategory::Numeric) { "::numeric" } else { "" };
        match arg_texts.get(1) {
            Some(n) => format!("ROUND({x_text}{cast}, {n})"),
            None => format!("ROUND({x_text}{cast})"),
        }
    }
}

pub fn rewrite_add_months(arg_texts: &[String]) -> String {
    format!("{} + INTERVAL '{} months'", arg_texts[0], arg_texts[1])
}

pub fn rewrite_months_between(arg_texts: &[String]) -> String {
    let (a, b) = (&arg_texts[0], &arg_texts[1]);
    format!("(EXTRACT(YEAR FROM AGE({a},{b}))*12 + EXTRACT(MONTH FROM AGE({a},{b})))")
}

pub fn rewrite_last_day(arg_texts: &[String]) -> String {
    format!("(DATE_TRUNC('MONTH', {d}) + INTERVAL '1 month' - INTERVAL '1 day')::DATE", d = arg_texts[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_date_marker_functions() {
        assert!(looks_like_date_text("SYSDATE"));
        assert!(looks_like_date_text("TO_DATE('2024-01-01','YYYY-MM-DD')"));
    }

    #[test]
    fn detects_date_like_column_names() {
        assert!(looks_like_date_text("hire_date"));
        assert!(looks_like_date_text("created_at"));
        assert!(!looks_like_date_text("employee_name"));
    }

    #[test]
    fn add_months_renders_interval() {
        assert_eq!(rewrite_add_months(&["hire_date".into(), "3".into()]), "hire_date + INTERVAL '3 months'");
    }
}
