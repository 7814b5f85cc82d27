use ora2pg_model::TypeCategory;

/// Return category for built-in functions whose result category doesn't
/// depend on its arguments' categories. Functions whose result follows
/// "first non-null branch" semantics (`NVL`, `COALESCE`, `DECODE`) are
/// handled separately in `infer`, not here. `TRUNC`/`ROUND` are
/// deliberately absent: their category depends on a format-literal
/// argument the rewriter inspects textually, so inference leaves them as
/// a cache miss and lets the rewriter's own heuristic decide.
const BUILTIN_RETURN_CATEGORY: &[(&str, TypeCategory)] = &[
    ("TO_CHAR", TypeCategory::Text),
    ("RAWTOHEX", TypeCategory::Text),
    ("SUBSTR", TypeCategory::Text),
    ("LPAD", TypeCategory::Text),
    ("RPAD", TypeCategory::Text),
    ("TRANSLATE", TypeCategory::Text),
    ("REGEXP_REPLACE", TypeCategory::Text),
    ("REGEXP_SUBSTR", TypeCategory::Text),
    ("UPPER", TypeCategory::Text),
    ("LOWER", TypeCategory::Text),
    ("TO_NUMBER", TypeCategory::Numeric),
    ("INSTR", TypeCategory::Numeric),
    ("REGEXP_INSTR", TypeCategory::Numeric),
    ("LENGTH", TypeCategory::Numeric),
    ("MONTHS_BETWEEN", TypeCategory::Numeric),
    ("TO_DATE", TypeCategory::Date),
    ("ADD_MONTHS", TypeCategory::Date),
    ("LAST_DAY", TypeCategory::Date),
    ("SYSDATE", TypeCategory::Date),
];

pub fn builtin_return_category(name: &str) -> Option<TypeCategory> {
    let upper = name.to_ascii_uppercase();
    BUILTIN_RETURN_CATEGORY.iter().find(|(n, _)| *n == upper).map(|(_, c)| c.clone())
}

/// Function names whose result is the first non-`Null` category among a
/// subset of their arguments, rather than a fixed return type.
pub fn is_conditional_function(name: &str) -> bool {
    matches!(name.to_ascii_uppercase().as_str(), "NVL" | "COALESCE" | "DECODE" | "NVL2")
}

/// Picks out which argument positions of a conditional function are
/// "result" branches (as opposed to comparison/search values). `DECODE`
/// alternates `search, result` pairs after the leading expression, with an
/// optional trailing default.
pub fn result_arg_indices(name: &str, arg_count: usize) -> Vec<usize> {
    match name.to_ascii_uppercase().as_str() {
        "NVL" | "COALESCE" => (0..arg_count).collect(),
        "NVL2" => (1..arg_count.min(3)).collect(),
        "DECODE" => {
            let mut idx = Vec::new();
            let mut i = 2;
            while i < arg_count {
                idx.push(i);
                i += 2;
            }
            if arg_count >= 2 && (arg_count - 1) % 2 == 1 {
                // an odd number of args after the subject means a trailing default is present
                idx.push(arg_count - 1);
            }
            idx
        }
        _ => Vec::new(),
    }
}
