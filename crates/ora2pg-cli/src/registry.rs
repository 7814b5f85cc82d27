//! The Job RPC surface: `create_job(database, operation_type)` resolves one
//! of the closed set of operation types onto the stage that implements it,
//! and `submit_job` runs it and shapes the result into the documented
//! `{status, jobId, message}` response.
//!
//! Several Postgres-side verification operation types
//! (`CONSTRAINT_VERIFICATION`, `VIEW_VERIFICATION`,
//! `VIEW_IMPLEMENTATION_VERIFICATION`, `ROUTINE_VERIFICATION`) have no
//! stage of their own to run — `ora2pg-verify` classifies every object in
//! one pass — so all four resolve to `VerifyAll`.

use ora2pg_pipeline::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Database {
    Oracle,
    Postgres,
}

impl Database {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ORACLE" => Some(Database::Oracle),
            "POSTGRES" => Some(Database::Postgres),
            _ => None,
        }
    }
}

/// Resolves `(database, operation_type)` onto the stage that implements
/// it, or `None` if the pair isn't in the closed operation-type set.
pub(crate) fn create_job(database: Database, operation_type: &str) -> Option<Stage> {
    use Database::{Oracle, Postgres};
    use Stage::*;
    match (database, operation_type) {
        (Oracle, "SCHEMA") => Some(ExtractSourceSchemas),
        (Oracle, "OBJECT_DATATYPE") => Some(ExtractSourceTypes),
        (Oracle, "TABLE") => Some(ExtractSourceTables),
        (Oracle, "CONSTRAINT_SOURCE_STATE") => Some(ExtractSourceConstraints),
        (Oracle, "VIEW") => Some(ExtractSourceViews),
        (Oracle, "FUNCTION" | "PROCEDURE" | "PACKAGE") => Some(ExtractSourceRoutines),
        (Postgres, "SCHEMA_CREATION") => Some(CreateTargetSchemas),
        (Postgres, "OBJECT_TYPE_CREATION") => Some(CreateTargetTypes),
        (Postgres, "TABLE_CREATION") => Some(CreateTargetTables),
        (Postgres, "CONSTRAINT_CREATION") => Some(CreateTargetConstraints),
        (Postgres, "FK_INDEX_CREATION") => Some(CreateFkIndexes),
        (Postgres, "VIEW_STUB_CREATION") => Some(CreateViewStubs),
        (Postgres, "VIEW_IMPLEMENTATION") => Some(ImplementViews),
        (Postgres, "ROUTINE_STUB_CREATION") => Some(CreateRoutineStubs),
        (Postgres, "ROUTINE_IMPLEMENTATION") => Some(ImplementRoutines),
        (
            Postgres,
            "CONSTRAINT_VERIFICATION" | "VIEW_VERIFICATION" | "VIEW_IMPLEMENTATION_VERIFICATION"
            | "ROUTINE_VERIFICATION",
        ) => Some(VerifyAll),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_every_oracle_operation_type() {
        for op in ["SCHEMA", "OBJECT_DATATYPE", "TABLE", "CONSTRAINT_SOURCE_STATE", "VIEW", "FUNCTION", "PROCEDURE", "PACKAGE"] {
            assert!(create_job(Database::Oracle, op).is_some(), "{op} did not resolve");
        }
    }

    #[test]
    fn resolves_every_postgres_operation_type() {
        for op in [
            "SCHEMA_CREATION", "OBJECT_TYPE_CREATION", "TABLE_CREATION", "CONSTRAINT_CREATION",
            "FK_INDEX_CREATION", "CONSTRAINT_VERIFICATION", "VIEW_STUB_CREATION", "VIEW_IMPLEMENTATION",
            "VIEW_VERIFICATION", "VIEW_IMPLEMENTATION_VERIFICATION", "ROUTINE_STUB_CREATION",
            "ROUTINE_IMPLEMENTATION", "ROUTINE_VERIFICATION",
        ] {
            assert!(create_job(Database::Postgres, op).is_some(), "{op} did not resolve");
        }
    }

    #[test]
    fn unknown_operation_type_resolves_to_nothing() {
        assert!(create_job(Database::Oracle, "NOT_A_REAL_TYPE").is_none());
    }

    #[test]
    fn operation_type_from_the_wrong_database_resolves_to_nothing() {
        assert!(create_job(Database::Postgres, "SCHEMA").is_none());
        assert!(create_job(Database::Oracle, "SCHEMA_CREATION").is_none());
    }

    #[test]
    fn database_name_is_parsed_case_insensitively() {
        assert_eq!(Database::parse("oracle"), Some(Database::Oracle));
        assert_eq!(Database::parse("Postgres"), Some(Database::Postgres));
        assert_eq!(Database::parse("mysql"), None);
    }
}
