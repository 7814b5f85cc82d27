//! Regex-driven textual rewrite of Oracle `CHECK` constraint expressions,
//! used only when the expression was harvested as raw text rather than
//! parsed as part of a larger statement. A tactical fallback: prefer
//! AST-based rewriting whenever the expression is embedded in code that
//! gets parsed anyway (routine bodies, views). Does not handle nested
//! parentheses — a `SUBSTR(UPPER(x), 1, 3)` will not match the `SUBSTR`
//! pattern below, since its first argument itself contains parens.

use fancy_regex::Regex;
use std::sync::OnceLock;

fn nvl_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bNVL\s*\(").unwrap())
}

fn substr_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bSUBSTR\s*\(\s*([^,()]+?)\s*,\s*([^,()]+?)\s*(?:,\s*([^,()]+?)\s*)?\)").unwrap())
}

fn instr_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bINSTR\s*\(\s*([^,()]+?)\s*,\s*([^,()]+?)\s*\)").unwrap())
}

fn rawtohex_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bRAWTOHEX\s*\(\s*([^,()]+?)\s*\)").unwrap())
}

/// Applies the known substitution families in sequence over `raw`.
pub fn rewrite_check_expression(raw: &str) -> String {
    let mut text = nvl_pattern().replace_all(raw, "COALESCE(").into_owned();

    text = substr_pattern()
        .replace_all(&text, |caps: &fancy_regex::Captures<'_>| match caps.get(3) {
            Some(n) => format!("SUBSTRING({} FROM {} FOR {})", &caps[1], &caps[2], n.as_str()),
            None => format!("SUBSTRING({} FROM {})", &caps[1], &caps[2]),
        })
        .into_owned();

    text = instr_pattern().replace_all(&text, "POSITION($2 IN $1)").into_owned();

    text = rawtohex_pattern().replace_all(&text, "UPPER(ENCODE($1::bytea, 'hex'))").into_owned();

    text
}
