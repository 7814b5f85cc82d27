use ora2pg_model::TypeCategory;

/// Splits `NAME(args)` into `(NAME, Some("args"))`, or `(NAME, None)` when
/// there are no parens. Matching is done on the uppercased name.
fn split_name_args(decl: &str) -> (String, Option<String>) {
    let trimmed = decl.trim();
    if let Some(open) = trimmed.find('(') {
        if let Some(close) = trimmed.rfind(')') {
            if close > open {
                let name = trimmed[..open].trim().to_uppercase();
                let args = trimmed[open + 1..close].trim().to_string();
                return (name, Some(args));
            }
        }
    }
    (trimmed.to_uppercase(), None)
}

fn split_args(args: &str) -> Vec<String> {
    args.split(',').map(|s| s.trim().to_string()).collect()
}

/// Category inference used by the type inference visitor. Unknown base
/// types yield `Unknown`.
pub fn category_of(base_type: &str) -> TypeCategory {
    let (name, _) = split_name_args(base_type);
    let upper = name.to_uppercase();
    let rest = base_type.to_uppercase();
    match upper.as_str() {
        "NUMBER" | "INTEGER" | "INT" | "BINARY_FLOAT" | "BINARY_DOUBLE" | "FLOAT" | "NUMERIC"
        | "DECIMAL" | "REAL" | "DOUBLE" => TypeCategory::Numeric,
        "VARCHAR2" | "NVARCHAR2" | "CHAR" | "NCHAR" | "CLOB" | "NCLOB" | "VARCHAR" | "TEXT"
        | "LONG" => TypeCategory::Text,
        "DATE" => TypeCategory::Date,
        "TIMESTAMP" => TypeCategory::Timestamp,
        "BOOLEAN" | "BOOL" => TypeCategory::Boolean,
        _ if rest.contains("TIMESTAMP") => TypeCategory::Timestamp,
        _ => TypeCategory::Unknown,
    }
}

/// The pure Oracle-to-PostgreSQL type mapping function. Unrecognized
/// complex system types fall back to `jsonb`; truly unknown declarations
/// fall back to `text` and are logged (callers should surface this as a
/// `DialectUnsupported` warning — see `ora2pg-pipeline`).
pub fn oracle_to_pg(type_decl: &str) -> String {
    let (name, args) = split_name_args(type_decl);
    let full_upper = type_decl.to_uppercase();

    match name.as_str() {
        "NUMBER" => match args {
            None => "numeric".to_string(),
            Some(a) => {
                let parts = split_args(&a);
                match parts.as_slice() {
                    [p] => format!("numeric({p})"),
                    [p, s] => format!("numeric({p},{s})"),
                    _ => "numeric".to_string(),
                }
            }
        },
        "INTEGER" | "INT" => "numeric".to_string(),
        "BINARY_FLOAT" => "real".to_string(),
        "BINARY_DOUBLE" => "double precision".to_string(),
        "FLOAT" => match args {
            Some(p) => format!("numeric({p})"),
            None => "double precision".to_string(),
        },
        "VARCHAR2" | "NVARCHAR2" => match args {
            Some(n) => format!("varchar({n})"),
            None => "varchar".to_string(),
        },
        "CHAR" | "NCHAR" => match args {
            Some(n) => format!("char({n})"),
            None => "char(1)".to_string(),
        },
        "CLOB" | "NCLOB" => "text".to_string(),
        "RAW" | "BLOB" => "bytea".to_string(),
        "DATE" => "timestamp".to_string(),
        "TIMESTAMP" => {
            let with_tz = full_upper.contains("WITH TIME ZONE") || full_upper.contains("WITH LOCAL TIME ZONE");
            match (args, with_tz) {
                (Some(f), true) => format!("timestamp({f}) with time zone"),
                (Some(f), false) => format!("timestamp({f})"),
                (None, true) => "timestamp with time zone".to_string(),
                (None, false) => "timestamp".to_string(),
            }
        }
        "BOOLEAN" => "boolean".to_string(),
        "XMLTYPE" => "xml".to_string(),
        other => {
            // Composite user type `OWNER.T` arrives with a dot; lowercase
            // and pass through verbatim — the destination type must already
            // exist (created earlier in the pipeline).
            if other.contains('.') {
                return other.to_lowercase();
            }
            if looks_like_complex_system_type(other) {
                tracing::warn!(target: "ora2pg_dialect", oracle_type = %type_decl, "unrecognized complex system type, falling back to jsonb");
                "jsonb".to_string()
            } else {
                tracing::warn!(target: "ora2pg_dialect", oracle_type = %type_decl, "unknown Oracle type, falling back to text");
                "text".to_string()
            }
        }
    }
}

/// Heuristic for Oracle's built-in "complex" system types (spatial, media,
/// XML variants not already handled above) versus a genuinely-unknown
/// declaration. Anything ending in `TYPE` or matching a known Oracle
/// system-type family name is treated as complex.
fn looks_like_complex_system_type(upper_name: &str) -> bool {
    upper_name.ends_with("TYPE")
        || matches!(
            upper_name,
            "SDO_GEOMETRY" | "ORDAUDIO" | "ORDIMAGE" | "ORDVIDEO" | "ORDDOC" | "URITYPE" | "ANYDATA"
        )
}

/// Inverse mapping used only by verification when reporting a mismatch;
/// this is a reporting hint, not a round-trip guarantee.
pub fn pg_to_oracle_hint(pg_type: &str) -> String {
    let (name, args) = split_name_args(pg_type);
    match name.as_str() {
        "NUMERIC" => match args {
            Some(a) => format!("NUMBER({a})"),
            None => "NUMBER".to_string(),
        },
        "REAL" => "BINARY_FLOAT".to_string(),
        "DOUBLE PRECISION" => "BINARY_DOUBLE".to_string(),
        "VARCHAR" | "CHARACTER VARYING" => match args {
            Some(n) => format!("VARCHAR2({n})"),
            None => "VARCHAR2".to_string(),
        },
        "CHAR" | "CHARACTER" => match args {
            Some(n) => format!("CHAR({n})"),
            None => "CHAR(1)".to_string(),
        },
        "TEXT" => "CLOB".to_string(),
        "BYTEA" => "BLOB".to_string(),
        "TIMESTAMP" => "DATE or TIMESTAMP".to_string(),
        "BOOLEAN" => "BOOLEAN".to_string(),
        "XML" => "XMLTYPE".to_string(),
        "JSONB" => "(unrecognized complex system type)".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_with_precision_and_scale() {
        assert_eq!(oracle_to_pg("NUMBER(10,2)"), "numeric(10,2)");
        assert_eq!(oracle_to_pg("NUMBER(10)"), "numeric(10)");
        assert_eq!(oracle_to_pg("NUMBER"), "numeric");
    }

    #[test]
    fn varchar_and_char_variants() {
        assert_eq!(oracle_to_pg("VARCHAR2(50)"), "varchar(50)");
        assert_eq!(oracle_to_pg("NVARCHAR2(50)"), "varchar(50)");
        assert_eq!(oracle_to_pg("CHAR(10)"), "char(10)");
        assert_eq!(oracle_to_pg("NCHAR(10)"), "char(10)");
    }

    #[test]
    fn lob_and_raw() {
        assert_eq!(oracle_to_pg("CLOB"), "text");
        assert_eq!(oracle_to_pg("NCLOB"), "text");
        assert_eq!(oracle_to_pg("RAW(16)"), "bytea");
        assert_eq!(oracle_to_pg("BLOB"), "bytea");
    }

    #[test]
    fn dates_and_timestamps() {
        assert_eq!(oracle_to_pg("DATE"), "timestamp");
        assert_eq!(oracle_to_pg("TIMESTAMP"), "timestamp");
        assert_eq!(oracle_to_pg("TIMESTAMP(6)"), "timestamp(6)");
        assert_eq!(oracle_to_pg("TIMESTAMP(6) WITH TIME ZONE"), "timestamp(6) with time zone");
        assert_eq!(oracle_to_pg("TIMESTAMP WITH TIME ZONE"), "timestamp with time zone");
    }

    #[test]
    fn composite_and_fallbacks() {
        assert_eq!(oracle_to_pg("HR.ADDRESS_T"), "hr.address_t");
        assert_eq!(oracle_to_pg("SDO_GEOMETRY"), "jsonb");
        assert_eq!(oracle_to_pg("SOME_MADE_UP_TYPE_NAME"), "text");
    }

    #[test]
    fn category_inference() {
        assert_eq!(category_of("NUMBER(10,2)"), TypeCategory::Numeric);
        assert_eq!(category_of("VARCHAR2(50)"), TypeCategory::Text);
        assert_eq!(category_of("DATE"), TypeCategory::Date);
        assert_eq!(category_of("TIMESTAMP(6)"), TypeCategory::Timestamp);
        assert_eq!(category_of("BOOLEAN"), TypeCategory::Boolean);
        assert_eq!(category_of("HR.ADDRESS_T"), TypeCategory::Unknown);
    }
}
