use ora2pg_parser::{Expr, ExprKind, Literal};

use crate::RewriteError;

fn literal_int(expr: &Expr) -> Option<i64> {
    match &expr.kind {
        ExprKind::Literal(Literal::Integer(s)) => s.parse().ok(),
        _ => None,
    }
}

fn literal_str(expr: &Expr) -> Option<String> {
    match &expr.kind {
        ExprKind::Literal(Literal::String(s)) => Some(s.to_string()),
        _ => None,
    }
}

pub fn rewrite_instr(args: &[Expr], texts: &[String]) -> Result<String, RewriteError> {
    match args.len() {
        2 => Ok(format!("POSITION({} IN {})", texts[1], texts[0])),
        3 => {
            let p = &texts[2];
            if literal_int(&args[2]) == Some(1) {
                Ok(format!("POSITION({} IN {})", texts[1], texts[0]))
            } else {
                Ok(format!(
                    "CASE WHEN {p} > 0 AND {p} <= LENGTH({s}) THEN POSITION({t} IN SUBSTRING({s} FROM {p})) + ({p} - 1) ELSE 0 END",
                    s = texts[0],
                    t = texts[1],
                ))
            }
        }
        4 => {
            if literal_int(&args[2]) == Some(1) && literal_int(&args[3]) == Some(1) {
                Ok(format!("POSITION({} IN {})", texts[1], texts[0]))
            } else {
                Ok(format!("instr_with_occurrence({}, {}, {}, {})", texts[0], texts[1], texts[2], texts[3]))
            }
        }
        n => Err(RewriteError::UnsupportedArity { function: "INSTR".into(), found: n }),
    }
}

pub fn rewrite_substr(args: &[Expr], texts: &[String]) -> Result<String, RewriteError> {
    match args.len() {
        2 => Ok(format!("SUBSTRING({} FROM {})", texts[0], texts[1])),
        3 => Ok(format!("SUBSTRING({} FROM {} FOR {})", texts[0], texts[1], texts[2])),
        n => Err(RewriteError::UnsupportedArity { function: "SUBSTR".into(), found: n }),
    }
}

pub fn rewrite_rawtohex(texts: &[String]) -> String {
    format!("UPPER(ENCODE({}::bytea, 'hex'))", texts[0])
}

pub fn rewrite_regexp_replace(args: &[Expr], texts: &[String]) -> Result<String, RewriteError> {
    if args.len() < 3 {
        return Err(RewriteError::UnsupportedArity { function: "REGEXP_REPLACE".into(), found: args.len() });
    }
    let position = args.get(3).and_then(literal_int).unwrap_or(1);
    if position != 1 {
        return Err(RewriteError::UnsupportedRegexPosition { function: "REGEXP_REPLACE".into(), position });
    }
    let occurrence = args.get(4).and_then(literal_int).unwrap_or(0);
    if occurrence > 1 {
        return Err(RewriteError::UnsupportedRegexOccurrence { function: "REGEXP_REPLACE".into(), occurrence });
    }
    let mut flags = args.get(5).and_then(literal_str).unwrap_or_default();
    if occurrence == 0 && !flags.contains('g') {
        flags.push('g');
    }
    let base = format!("REGEXP_REPLACE({}, {}, {}", texts[0], texts[1], texts[2]);
    if flags.is_empty() {
        Ok(format!("{base})"))
    } else {
        Ok(format!("{base}, '{flags}')"))
    }
}

pub fn rewrite_regexp_substr(args: &[Expr], texts: &[String]) -> Result<String, RewriteError> {
    if args.len() < 2 {
        return Err(RewriteError::UnsupportedArity { function: "REGEXP_SUBSTR".into(), found: args.len() });
    }
    let position = args.get(2).and_then(literal_int).unwrap_or(1);
    if position != 1 {
        return Err(RewriteError::UnsupportedRegexPosition { function: "REGEXP_SUBSTR".into(), position });
    }
    let occurrence = args.get(3).and_then(literal_int).unwrap_or(1);
    if occurrence != 1 {
        return Err(RewriteError::UnsupportedRegexOccurrence { function: "REGEXP_SUBSTR".into(), occurrence });
    }
    match args.get(4).and_then(literal_str) {
        Some(flags) => Ok(format!("(REGEXP_MATCH({}, {}, '{flags}'))[1]", texts[0], texts[1])),
        None => Ok(format!("(REGEXP_MATCH({}, {}))[1]", texts[0], texts[1])),
    }
}

pub fn rewrite_regexp_instr() -> RewriteError {
    RewriteError::Unsupported {
        function: "REGEXP_INSTR".into(),
        suggestion: "rewrite using POSITION over REGEXP_MATCH, or a target-side helper function".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ora2pg_parser::parse_expr;

    fn call_args(src: &str) -> Vec<Expr> {
        match parse_expr(src).unwrap().kind {
            ExprKind::FunctionCall { args, .. } => args,
            other => panic!("expected a function call, got {other:?}"),
        }
    }

    #[test]
    fn instr_two_args_is_position() {
        let args = call_args("INSTR(s, t)");
        let texts: Vec<String> = args.iter().map(|a| a.approx_text()).collect();
        assert_eq!(rewrite_instr(&args, &texts).unwrap(), "POSITION(t IN s)");
    }

    #[test]
    fn instr_with_start_position_uses_case() {
        let args = call_args("INSTR(s, t, 2)");
        let texts: Vec<String> = args.iter().map(|a| a.approx_text()).collect();
        let out = rewrite_instr(&args, &texts).unwrap();
        assert!(out.starts_with("CASE WHEN"));
    }

    #[test]
    fn regexp_replace_refuses_non_default_position() {
        let args = call_args("REGEXP_REPLACE(s, p, r, 2)");
        let texts: Vec<String> = args.iter().map(|a| a.approx_text()).collect();
        assert!(rewrite_regexp_replace(&args, &texts).is_err());
    }

    #[test]
    fn regexp_replace_appends_g_flag_by_default() {
        let args = call_args("REGEXP_REPLACE(s, p, r)");
        let texts: Vec<String> = args.iter().map(|a| a.approx_text()).collect();
        assert_eq!(rewrite_regexp_replace(&args, &texts).unwrap(), "REGEXP_REPLACE(s, p, r, 'g')");
    }
}
