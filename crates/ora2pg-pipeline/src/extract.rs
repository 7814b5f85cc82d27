//! Maps raw dictionary-view rows (`ora2pg_connectors::Row`) onto the typed
//! metadata records `ora2pg-model` defines. Each function corresponds to
//! one Oracle data dictionary view (or the small join a record needs), not
//! to a whole extraction stage — stage wiring lives in `stages.rs`.

use std::collections::BTreeMap;

use ora2pg_connectors::{Row, Value};
use ora2pg_model::{
    ColumnMetadata, ConstraintKind, ConstraintMetadata, DeleteRule, FunctionMetadata, ObjectAttribute,
    ObjectDataType, Parameter, ProcedureMetadata, QualifiedName, Schema, SchemaClass, TableMetadata,
    ViewColumn, ViewMetadata,
};
use ora2pg_parser::{scan_routines, RoutineKind};

fn text(row: &Row, column: &str) -> String {
    row.get(column).and_then(Value::as_text).unwrap_or_default().to_string()
}

fn opt_text(row: &Row, column: &str) -> Option<String> {
    row.get(column).and_then(Value::as_text).map(str::to_string)
}

fn opt_u32(row: &Row, column: &str) -> Option<u32> {
    row.get(column).and_then(Value::as_int).map(|n| n as u32)
}

fn opt_i32(row: &Row, column: &str) -> Option<i32> {
    row.get(column).and_then(Value::as_int).map(|n| n as i32)
}

/// `ALL_USERS` rows (`USERNAME`) classified against the merged system-owner
/// exclude list.
pub(crate) fn schemas_from_rows(rows: &[Row], exclude_list: &[String]) -> Vec<Schema> {
    rows.iter()
        .map(|r| {
            let name = text(r, "USERNAME");
            Schema::new(name.clone(), ora2pg_model::classify(&name, exclude_list))
        })
        .collect()
}

/// `ALL_TYPES` joined with `ALL_TYPE_ATTRS`, one row per attribute
/// (`OWNER`, `TYPE_NAME`, `ATTR_NAME`, `ATTR_TYPE_NAME`), grouped by type.
pub(crate) fn object_types_from_rows(rows: &[Row]) -> Vec<ObjectDataType> {
    let mut grouped: BTreeMap<QualifiedName, Vec<ObjectAttribute>> = BTreeMap::new();
    for r in rows {
        let name = QualifiedName::new(text(r, "OWNER"), text(r, "TYPE_NAME"));
        grouped.entry(name).or_default().push(ObjectAttribute {
            name: text(r, "ATTR_NAME"),
            type_decl: text(r, "ATTR_TYPE_NAME"),
        });
    }
    grouped.into_iter().map(|(name, attrs)| ObjectDataType::new(name, attrs)).collect()
}

/// `ALL_TAB_COLUMNS` rows, one per column, grouped into a `TableMetadata`
/// per `(OWNER, TABLE_NAME)`. Constraints are extracted and emitted
/// separately (`constraints_from_rows`, `CreateTargetConstraints`) rather
/// than embedded here — `CREATE TABLE` only ever carries column-level
/// `NOT NULL`.
pub(crate) fn tables_from_rows(rows: &[Row]) -> Result<Vec<TableMetadata>, ora2pg_model::ModelError> {
    let mut grouped: BTreeMap<QualifiedName, Vec<Row>> = BTreeMap::new();
    for r in rows {
        let table = QualifiedName::new(text(r, "OWNER"), text(r, "TABLE_NAME"));
        grouped.entry(table).or_default().push(r.clone());
    }

    let mut tables = Vec::with_capacity(grouped.len());
    for (name, col_rows) in grouped {
        let mut columns = Vec::with_capacity(col_rows.len());
        for r in &col_rows {
            let nullable = text(r, "NULLABLE").eq_ignore_ascii_case("Y");
            columns.push(ColumnMetadata::new(
                &name,
                text(r, "COLUMN_NAME"),
                text(r, "DATA_TYPE"),
                opt_text(r, "DATA_TYPE_OWNER"),
                opt_u32(r, "DATA_LENGTH"),
                opt_u32(r, "DATA_PRECISION"),
                opt_i32(r, "DATA_SCALE"),
                nullable,
                opt_text(r, "DATA_DEFAULT"),
            )?);
        }
        tables.push(TableMetadata::new(name, columns, Vec::new(), None)?);
    }
    Ok(tables)
}

fn delete_rule_from_text(s: &str) -> DeleteRule {
    match s.to_ascii_uppercase().as_str() {
        "CASCADE" => DeleteRule::Cascade,
        "SET NULL" => DeleteRule::SetNull,
        "SET DEFAULT" => DeleteRule::SetDefault,
        "RESTRICT" => DeleteRule::Restrict,
        _ => DeleteRule::NoAction,
    }
}

/// `ALL_CONSTRAINTS` joined with `ALL_CONS_COLUMNS`, one row per
/// constrained column in position order, carrying the referenced
/// table/columns already resolved for foreign keys (`R_OWNER`,
/// `R_TABLE_NAME`, `R_COLUMN_NAME`) and the raw `SEARCH_CONDITION` text for
/// checks.
pub(crate) fn constraints_from_rows(rows: &[Row]) -> Result<Vec<ConstraintMetadata>, ora2pg_model::ModelError> {
    struct Group {
        table: QualifiedName,
        kind_code: String,
        columns: Vec<String>,
        r_table: Option<QualifiedName>,
        r_columns: Vec<String>,
        delete_rule: DeleteRule,
        search_condition: Option<String>,
    }

    let mut grouped: BTreeMap<String, Group> = BTreeMap::new();
    for r in rows {
        let name = text(r, "CONSTRAINT_NAME");
        let entry = grouped.entry(name).or_insert_with(|| Group {
            table: QualifiedName::new(text(r, "OWNER"), text(r, "TABLE_NAME")),
            kind_code: text(r, "CONSTRAINT_TYPE"),
            columns: Vec::new(),
            r_table: opt_text(r, "R_OWNER")
                .zip(opt_text(r, "R_TABLE_NAME"))
                .map(|(o, t)| QualifiedName::new(o, t)),
            r_columns: Vec::new(),
            delete_rule: opt_text(r, "DELETE_RULE").map(|s| delete_rule_from_text(&s)).unwrap_or(DeleteRule::NoAction),
            search_condition: opt_text(r, "SEARCH_CONDITION"),
        });
        if let Some(col) = opt_text(r, "COLUMN_NAME") {
            entry.columns.push(col);
        }
        if let Some(col) = opt_text(r, "R_COLUMN_NAME") {
            entry.r_columns.push(col);
        }
    }

    let mut out = Vec::with_capacity(grouped.len());
    for (name, g) in grouped {
        let kind = match g.kind_code.as_str() {
            "P" => ConstraintKind::PrimaryKey,
            "U" => ConstraintKind::Unique,
            "R" => ConstraintKind::ForeignKey {
                referenced_table: g.r_table.unwrap_or_else(|| QualifiedName::new("", "")),
                referenced_columns: g.r_columns,
                delete_rule: g.delete_rule,
            },
            "C" => ConstraintKind::Check { expression: g.search_condition.unwrap_or_default() },
            _ => continue,
        };
        out.push(ConstraintMetadata::new(name, g.table, g.columns, kind)?);
    }
    Ok(out)
}

/// `ALL_VIEWS` (`OWNER`, `VIEW_NAME`, `TEXT`) joined with the view's column
/// list from `ALL_TAB_COLUMNS` (views appear there too, with the same
/// `DATA_TYPE` shape as tables).
pub(crate) fn views_from_rows(view_rows: &[Row], column_rows: &[Row]) -> Vec<ViewMetadata> {
    let mut columns_by_view: BTreeMap<QualifiedName, Vec<ViewColumn>> = BTreeMap::new();
    for r in column_rows {
        let name = QualifiedName::new(text(r, "OWNER"), text(r, "TABLE_NAME"));
        columns_by_view.entry(name).or_default().push(ViewColumn { name: text(r, "COLUMN_NAME"), type_decl: text(r, "DATA_TYPE") });
    }

    view_rows
        .iter()
        .map(|r| {
            let name = QualifiedName::new(text(r, "OWNER"), text(r, "VIEW_NAME"));
            let columns = columns_by_view.get(&name).cloned().unwrap_or_default();
            ViewMetadata::new(name, columns, opt_text(r, "TEXT"))
        })
        .collect()
}

/// `ALL_SOURCE`: one row per Oracle object (`OWNER`, `NAME`, `OBJECT_TYPE`,
/// `IS_FUNCTION`, `RETURN_TYPE`, `SOURCE`). `OBJECT_TYPE` is `"FUNCTION"` or
/// `"PROCEDURE"` for a standalone routine, whose `SOURCE` is taken as-is,
/// or `"PACKAGE BODY"`, whose `SOURCE` is the entire package body text and
/// is decomposed into one routine per member by the boundary scanner
/// (`ora2pg_parser::scan_routines`). Forward declarations (members with no
/// body — the package spec's own signature list) are discarded, since the
/// body-bearing definition in the package body supplies the
/// implementation. Parameter extraction from `ALL_ARGUMENTS` is not
/// implemented; every routine is recorded with an empty parameter list,
/// which only affects the stub/implementation signature, not the
/// translated body. A package member's return type additionally isn't
/// recovered (the boundary scanner locates spans, not signatures), so
/// package functions carry an empty `return_type`.
pub(crate) fn routines_from_rows(rows: &[Row]) -> (Vec<FunctionMetadata>, Vec<ProcedureMetadata>) {
    let mut functions = Vec::new();
    let mut procedures = Vec::new();
    for r in rows {
        let owner = text(r, "OWNER");
        let source_text = text(r, "SOURCE");
        if text(r, "OBJECT_TYPE") == "PACKAGE BODY" {
            let package = text(r, "NAME");
            for span in scan_routines(&source_text) {
                if span.is_forward_declaration {
                    continue;
                }
                let name = QualifiedName::new(&owner, span.name.as_str());
                let member_source = source_text[span.signature_start..span.body_end].to_string();
                if span.kind == RoutineKind::Procedure {
                    procedures.push(ProcedureMetadata {
                        name,
                        package: Some(package.clone()),
                        parameters: Vec::new(),
                        source_text: member_source,
                    });
                } else {
                    functions.push(FunctionMetadata {
                        name,
                        package: Some(package.clone()),
                        parameters: Vec::new(),
                        return_type: String::new(),
                        source_text: member_source,
                    });
                }
            }
            continue;
        }

        let name = QualifiedName::new(&owner, text(r, "NAME"));
        let parameters: Vec<Parameter> = Vec::new();
        if r.get("IS_FUNCTION").and_then(Value::as_bool).unwrap_or(false) {
            functions.push(FunctionMetadata { name, package: None, parameters, return_type: text(r, "RETURN_TYPE"), source_text });
        } else {
            procedures.push(ProcedureMetadata { name, package: None, parameters, source_text });
        }
    }
    (functions, procedures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemas_classify_against_exclude_list() {
        let rows = vec![Row::new(vec![("USERNAME", Value::Text("HR".into()))]), Row::new(vec![("USERNAME", Value::Text("SYS".into()))])];
        let schemas = schemas_from_rows(&rows, &ora2pg_model::default_system_schemas());
        assert_eq!(schemas[0].class, SchemaClass::User);
        assert_eq!(schemas[1].class, SchemaClass::System);
    }

    #[test]
    fn tables_group_columns_by_owner_and_name() {
        let rows = vec![
            Row::new(vec![
                ("OWNER", Value::Text("hr".into())),
                ("TABLE_NAME", Value::Text("employees".into())),
                ("COLUMN_NAME", Value::Text("id".into())),
                ("DATA_TYPE", Value::Text("NUMBER".into())),
                ("NULLABLE", Value::Text("N".into())),
                ("DATA_PRECISION", Value::Int(10)),
                ("DATA_SCALE", Value::Int(0)),
            ]),
            Row::new(vec![
                ("OWNER", Value::Text("hr".into())),
                ("TABLE_NAME", Value::Text("employees".into())),
                ("COLUMN_NAME", Value::Text("name".into())),
                ("DATA_TYPE", Value::Text("VARCHAR2".into())),
                ("NULLABLE", Value::Text("Y".into())),
                ("DATA_LENGTH", Value::Int(50)),
            ]),
        ];
        let tables = tables_from_rows(&rows).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns.len(), 2);
        assert!(!tables[0].column("id").unwrap().nullable);
    }

    #[test]
    fn constraints_group_multi_column_foreign_key() {
        let rows = vec![
            Row::new(vec![
                ("OWNER", Value::Text("s".into())),
                ("TABLE_NAME", Value::Text("b".into())),
                ("CONSTRAINT_NAME", Value::Text("fk_b_a".into())),
                ("CONSTRAINT_TYPE", Value::Text("R".into())),
                ("COLUMN_NAME", Value::Text("a_id".into())),
                ("R_OWNER", Value::Text("s".into())),
                ("R_TABLE_NAME", Value::Text("a".into())),
                ("R_COLUMN_NAME", Value::Text("id".into())),
                ("DELETE_RULE", Value::Text("CASCADE".into())),
            ]),
        ];
        let constraints = constraints_from_rows(&rows).unwrap();
        assert_eq!(constraints.len(), 1);
        assert!(constraints[0].is_foreign_key());
    }

    #[test]
    fn routines_split_into_functions_and_procedures() {
        let rows = vec![
            Row::new(vec![
                ("OWNER", Value::Text("hr".into())),
                ("NAME", Value::Text("calc_bonus".into())),
                ("OBJECT_TYPE", Value::Text("FUNCTION".into())),
                ("IS_FUNCTION", Value::Bool(true)),
                ("RETURN_TYPE", Value::Text("NUMBER".into())),
                ("SOURCE", Value::Text("RETURN 1;".into())),
            ]),
            Row::new(vec![
                ("OWNER", Value::Text("hr".into())),
                ("NAME", Value::Text("do_thing".into())),
                ("OBJECT_TYPE", Value::Text("PROCEDURE".into())),
                ("IS_FUNCTION", Value::Bool(false)),
                ("SOURCE", Value::Text("NULL;".into())),
            ]),
        ];
        let (functions, procedures) = routines_from_rows(&rows);
        assert_eq!(functions.len(), 1);
        assert_eq!(procedures.len(), 1);
        assert!(functions[0].package.is_none());
    }

    #[test]
    fn package_body_is_decomposed_into_one_routine_per_member() {
        let source = "FUNCTION calc_bonus(x NUMBER) RETURN NUMBER IS BEGIN RETURN x * 2; END calc_bonus; \
                       PROCEDURE log_it IS BEGIN NULL; END log_it;";
        let rows = vec![Row::new(vec![
            ("OWNER", Value::Text("hr".into())),
            ("NAME", Value::Text("payroll_pkg".into())),
            ("OBJECT_TYPE", Value::Text("PACKAGE BODY".into())),
            ("SOURCE", Value::Text(source.into())),
        ])];
        let (functions, procedures) = routines_from_rows(&rows);
        assert_eq!(functions.len(), 1);
        assert_eq!(procedures.len(), 1);
        assert_eq!(functions[0].name.name, "calc_bonus");
        assert_eq!(functions[0].package.as_deref(), Some("payroll_pkg"));
        assert!(functions[0].source_text.starts_with("FUNCTION calc_bonus"));
        assert_eq!(procedures[0].name.name, "log_it");
        assert_eq!(procedures[0].package.as_deref(), Some("payroll_pkg"));
    }

    #[test]
    fn package_body_forward_declarations_are_discarded() {
        let source = "FUNCTION a RETURN NUMBER; FUNCTION a RETURN NUMBER IS BEGIN RETURN 1; END a;";
        let rows = vec![Row::new(vec![
            ("OWNER", Value::Text("hr".into())),
            ("NAME", Value::Text("pkg".into())),
            ("OBJECT_TYPE", Value::Text("PACKAGE BODY".into())),
            ("SOURCE", Value::Text(source.into())),
        ])];
        let (functions, _) = routines_from_rows(&rows);
        assert_eq!(functions.len(), 1);
    }
}
