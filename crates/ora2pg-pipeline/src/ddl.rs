//! Pure DDL-text builders. Each function takes already-normalized metadata
//! and returns the exact statement text a write job executes; none of them
//! touch the state store or a connection, which keeps them trivially
//! testable against literal expected strings.

use ora2pg_dialect::{normalize_identifier, oracle_to_pg};
use ora2pg_model::{ColumnMetadata, ConstraintKind, ConstraintMetadata, DeleteRule, FunctionMetadata, ObjectDataType, ProcedureMetadata, QualifiedName, Schema, TableMetadata, ViewMetadata};

fn qualify(name: &QualifiedName) -> String {
    format!("{}.{}", normalize_identifier(&name.schema), normalize_identifier(&name.name))
}

pub(crate) fn create_schema_ddl(schema: &Schema) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", normalize_identifier(&schema.name))
}

fn column_ddl(column: &ColumnMetadata) -> String {
    let pg_type = oracle_to_pg(&column.base_type);
    let mut out = format!("{} {}", normalize_identifier(&column.name), pg_type);
    if !column.nullable {
        out.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default_expr {
        out.push_str(&format!(" DEFAULT {default}"));
    }
    out
}

/// `CREATE TABLE` with `NOT NULL` embedded per column; all other
/// constraints (PK, UNIQUE, FK, CHECK) are emitted separately once the
/// dependency analyzer has ordered them.
pub(crate) fn create_table_ddl(table: &TableMetadata) -> String {
    let columns: Vec<String> = table.columns.iter().map(column_ddl).collect();
    format!("CREATE TABLE {} ({})", qualify(&table.name), columns.join(", "))
}

/// `CREATE TYPE ... AS (...)` for a user-defined composite type. Runs
/// before table creation, since a table column can reference one.
pub(crate) fn create_object_type_ddl(object_type: &ObjectDataType) -> String {
    let attrs: Vec<String> = object_type
        .attributes
        .iter()
        .map(|a| format!("{} {}", normalize_identifier(&a.name), oracle_to_pg(&a.type_decl)))
        .collect();
    format!("CREATE TYPE {} AS ({})", qualify(&object_type.name), attrs.join(", "))
}

fn delete_rule_sql(rule: DeleteRule) -> &'static str {
    match rule {
        DeleteRule::NoAction => "NO ACTION",
        DeleteRule::Restrict => "RESTRICT",
        DeleteRule::Cascade => "CASCADE",
        DeleteRule::SetNull => "SET NULL",
        DeleteRule::SetDefault => "SET DEFAULT",
    }
}

fn column_list(columns: &[String]) -> String {
    columns.iter().map(|c| normalize_identifier(c)).collect::<Vec<_>>().join(", ")
}

/// `ALTER TABLE ... ADD CONSTRAINT ...` for one already-ordered constraint.
/// `CHECK` expressions are rewritten via the regex-driven fallback
/// translator, since by the time a constraint reaches DDL emission it is
/// carried as raw harvested text, not a parsed AST.
pub(crate) fn create_constraint_ddl(constraint: &ConstraintMetadata) -> String {
    let table = qualify(&constraint.table);
    let name = normalize_identifier(&constraint.name);
    let body = match &constraint.kind {
        ConstraintKind::PrimaryKey => format!("PRIMARY KEY ({})", column_list(&constraint.columns)),
        ConstraintKind::Unique => format!("UNIQUE ({})", column_list(&constraint.columns)),
        ConstraintKind::ForeignKey { referenced_table, referenced_columns, delete_rule } => format!(
            "FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {}",
            column_list(&constraint.columns),
            qualify(referenced_table),
            column_list(referenced_columns),
            delete_rule_sql(*delete_rule)
        ),
        ConstraintKind::Check { expression } => format!("CHECK ({})", ora2pg_rewrite::rewrite_check_expression(expression)),
        ConstraintKind::NotNull => return String::new(), // embedded at column creation, never emitted here
    };
    format!("ALTER TABLE {table} ADD CONSTRAINT {name} {body}")
}

/// `CREATE INDEX` backing a foreign key, or `None` for constraint kinds
/// that don't get one.
pub(crate) fn create_fk_index_ddl(constraint: &ConstraintMetadata) -> Option<String> {
    let ConstraintKind::ForeignKey { .. } = &constraint.kind else {
        return None;
    };
    let table = qualify(&constraint.table);
    let index_name = normalize_identifier(&format!("idx_{}", constraint.name));
    Some(format!("CREATE INDEX IF NOT EXISTS {index_name} ON {table} ({})", column_list(&constraint.columns)))
}

/// A stub view: syntactically valid, typed, and guaranteed empty, so that
/// objects which reference it can be created before its real body is known.
pub(crate) fn create_view_stub_ddl(view: &ViewMetadata) -> String {
    let cols: Vec<String> = view
        .columns
        .iter()
        .map(|c| format!("NULL::{} AS {}", oracle_to_pg(&c.type_decl), normalize_identifier(&c.name)))
        .collect();
    format!("CREATE VIEW {} AS SELECT {} WHERE FALSE", qualify(&view.name), cols.join(", "))
}

/// Wraps `transpiled_select` in a position-based cast so the view's column
/// types exactly match the stub's declared types regardless of what the
/// transpiled query itself infers — required for `CREATE OR REPLACE` to
/// succeed against the stub already in place.
pub(crate) fn create_view_impl_ddl(view: &ViewMetadata, transpiled_select: &str) -> String {
    let subq_cols: Vec<String> = (0..view.columns.len()).map(|i| format!("c{i}")).collect();
    let cast_cols: Vec<String> = view
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("c{i}::{} AS {}", oracle_to_pg(&c.type_decl), normalize_identifier(&c.name)))
        .collect();
    format!(
        "CREATE OR REPLACE VIEW {} AS SELECT {} FROM ( {} ) AS subq({})",
        qualify(&view.name),
        cast_cols.join(", "),
        transpiled_select,
        subq_cols.join(", ")
    )
}

fn parameter_list(parameters: &[ora2pg_model::Parameter]) -> String {
    parameters
        .iter()
        .map(|p| format!("{} {}", normalize_identifier(&p.name), oracle_to_pg(&p.declared_type)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn create_function_stub_ddl(function: &FunctionMetadata) -> String {
    format!(
        "CREATE FUNCTION {}({}) RETURNS {} AS $$ BEGIN RETURN NULL; END; $$ LANGUAGE plpgsql",
        qualify(&function.name),
        parameter_list(&function.parameters),
        oracle_to_pg(&function.return_type)
    )
}

pub(crate) fn create_procedure_stub_ddl(procedure: &ProcedureMetadata) -> String {
    format!(
        "CREATE PROCEDURE {}({}) AS $$ BEGIN END; $$ LANGUAGE plpgsql",
        qualify(&procedure.name),
        parameter_list(&procedure.parameters)
    )
}

pub(crate) fn create_function_impl_ddl(function: &FunctionMetadata, body: &str) -> String {
    format!(
        "CREATE OR REPLACE FUNCTION {}({}) RETURNS {} AS $$\nBEGIN\n  {}\nEND;\n$$ LANGUAGE plpgsql",
        qualify(&function.name),
        parameter_list(&function.parameters),
        oracle_to_pg(&function.return_type),
        body
    )
}

pub(crate) fn create_procedure_impl_ddl(procedure: &ProcedureMetadata, body: &str) -> String {
    format!(
        "CREATE OR REPLACE PROCEDURE {}({}) AS $$\nBEGIN\n  {}\nEND;\n$$ LANGUAGE plpgsql",
        qualify(&procedure.name),
        parameter_list(&procedure.parameters),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ora2pg_model::{ColumnMetadata, SchemaClass, ViewColumn};

    #[test]
    fn schema_ddl_is_idempotent_create() {
        assert_eq!(create_schema_ddl(&Schema::new("HR", SchemaClass::User)), "CREATE SCHEMA IF NOT EXISTS hr");
    }

    #[test]
    fn table_ddl_embeds_not_null() {
        let name = QualifiedName::new("hr", "employees");
        let cols = vec![
            ColumnMetadata::new(&name, "id", "NUMBER(10)", None, None, Some(10), Some(0), false, None).unwrap(),
            ColumnMetadata::new(&name, "nickname", "VARCHAR2(50)", None, Some(50), None, None, true, None).unwrap(),
        ];
        let table = TableMetadata::new(name, cols, vec![], None).unwrap();
        assert_eq!(
            create_table_ddl(&table),
            "CREATE TABLE hr.employees (id numeric(10) NOT NULL, nickname varchar(50))"
        );
    }

    #[test]
    fn foreign_key_ddl_includes_delete_rule() {
        let c = ConstraintMetadata::new(
            "fk_b_a",
            QualifiedName::new("s", "b"),
            vec!["a_id".into()],
            ConstraintKind::ForeignKey {
                referenced_table: QualifiedName::new("s", "a"),
                referenced_columns: vec!["id".into()],
                delete_rule: DeleteRule::Cascade,
            },
        )
        .unwrap();
        assert_eq!(
            create_constraint_ddl(&c),
            "ALTER TABLE s.b ADD CONSTRAINT fk_b_a FOREIGN KEY (a_id) REFERENCES s.a (id) ON DELETE CASCADE"
        );
        assert_eq!(create_fk_index_ddl(&c).unwrap(), "CREATE INDEX IF NOT EXISTS idx_fk_b_a ON s.b (a_id)");
    }

    #[test]
    fn check_constraint_ddl_runs_through_regex_translator() {
        let c = ConstraintMetadata::new(
            "chk_status",
            QualifiedName::new("s", "t"),
            vec!["status".into()],
            ConstraintKind::Check { expression: "NVL(status, 'ACTIVE') = 'ACTIVE'".into() },
        )
        .unwrap();
        assert_eq!(
            create_constraint_ddl(&c),
            "ALTER TABLE s.t ADD CONSTRAINT chk_status CHECK (COALESCE(status, 'ACTIVE') = 'ACTIVE')"
        );
    }

    #[test]
    fn view_stub_then_impl_matches_worked_example() {
        let view = ViewMetadata::new(
            QualifiedName::new("s", "v"),
            vec![ViewColumn { name: "c".into(), type_decl: "NUMBER".into() }],
            None,
        );
        assert_eq!(create_view_stub_ddl(&view), "CREATE VIEW s.v AS SELECT NULL::numeric AS c WHERE FALSE");
        assert_eq!(
            create_view_impl_ddl(&view, "SELECT 1"),
            "CREATE OR REPLACE VIEW s.v AS SELECT c0::numeric AS c FROM ( SELECT 1 ) AS subq(c0)"
        );
    }
}
