//! Sequential orchestration of the sixteen declared stages over a shared
//! `StateStore`. Every stage is run in `ORDERED_STAGES` order; a stage that
//! fails with anything other than `Infrastructure`/`Cancelled` is recorded
//! as failed and the pipeline moves on to the next stage, per the "only
//! infrastructural errors abort" rule.

use std::collections::{HashMap, HashSet};

use ora2pg_connectors::{Connection, Connector, Param};
use ora2pg_dialect::normalize_identifier;
use ora2pg_jobs::{CancelToken, ExtractionJob, Job, ProgressSink, WriteJob, WriteOutcome};
use ora2pg_model::{ConstraintMetadata, FunctionMetadata, ObjectError, ProcedureMetadata, QualifiedName, Schema, TableMetadata, ViewMetadata, WriteResult};
use ora2pg_parser::parse_select;
use ora2pg_rewrite::{render_select, RenderContext};
use ora2pg_store::{Artifact, DatabaseSide, ObjectKind, StateStore, StoreKey};
use ora2pg_typeinfer::{infer_select, MetadataIndex};

use crate::ddl;
use crate::error::MigrationError;
use crate::extract;
use crate::stages::{Stage, ORDERED_STAGES};

const SCHEMAS_QUERY: &str = "SELECT username FROM all_users";
const TYPES_QUERY: &str = "SELECT owner, type_name, attr_name, attr_type_name FROM all_types JOIN all_type_attrs USING (owner, type_name)";
const TABLES_QUERY: &str = "SELECT owner, table_name, column_name, data_type, nullable, data_length, data_precision, data_scale, data_default FROM all_tab_columns";
const CONSTRAINTS_QUERY: &str = "SELECT owner, table_name, constraint_name, constraint_type, column_name, r_owner, r_table_name, r_column_name, delete_rule, search_condition FROM all_constraints JOIN all_cons_columns USING (owner, constraint_name)";
const VIEWS_QUERY: &str = "SELECT owner, view_name, text FROM all_views";
const VIEW_COLUMNS_QUERY: &str = "SELECT owner, table_name, column_name, data_type FROM all_tab_columns WHERE table_name IN (SELECT view_name FROM all_views)";
const ROUTINES_QUERY: &str = "SELECT owner, name, object_type, is_function, return_type, source FROM all_source";
const EXISTING_TARGET_CONSTRAINTS_QUERY: &str = "SELECT conrelid::regclass::text AS table_name, conname FROM pg_constraint";

#[derive(Debug)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: StageOutcome,
}

#[derive(Debug)]
pub enum StageOutcome {
    Completed(String),
    Failed(MigrationError),
}

/// Everything a pipeline run needs that isn't a stage's own input/output:
/// the schema a synonym-free table reference resolves against, and the
/// synonym map itself.
pub struct RenderConfig {
    pub current_schema: String,
    pub synonyms: HashMap<String, QualifiedName>,
}

pub struct MigrationPipeline {
    store: StateStore,
    source: Box<dyn Connector>,
    target: Box<dyn Connector>,
    progress: Box<dyn ProgressSink>,
    cancel: CancelToken,
    render: RenderConfig,
    exclude_list: Vec<String>,
    dry_run: bool,
}

impl MigrationPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn Connector>,
        target: Box<dyn Connector>,
        progress: Box<dyn ProgressSink>,
        cancel: CancelToken,
        render: RenderConfig,
        exclude_list: Vec<String>,
        dry_run: bool,
    ) -> Self {
        Self { store: StateStore::new(), source, target, progress, cancel, render, exclude_list, dry_run }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn run(&self) -> Result<Vec<StageReport>, MigrationError> {
        let mut reports = Vec::with_capacity(ORDERED_STAGES.len());
        for &stage in ORDERED_STAGES {
            if self.cancel.is_cancelled() {
                return Err(MigrationError::Cancelled);
            }
            match self.run_stage(stage) {
                Ok(summary) => reports.push(StageReport { stage, outcome: StageOutcome::Completed(summary) }),
                Err(e @ MigrationError::Infrastructure(_)) | Err(e @ MigrationError::Cancelled) => return Err(e),
                Err(e) => reports.push(StageReport { stage, outcome: StageOutcome::Failed(e) }),
            }
        }
        Ok(reports)
    }

    /// Runs a single stage in isolation, for a caller (the Job RPC surface)
    /// that submits one operation at a time rather than a whole pipeline
    /// run. Infrastructural/cancelled failures are reported as `Failed`
    /// here rather than propagated, since there is no later stage to abort.
    pub fn run_one(&self, stage: Stage) -> StageReport {
        if self.cancel.is_cancelled() {
            return StageReport { stage, outcome: StageOutcome::Failed(MigrationError::Cancelled) };
        }
        match self.run_stage(stage) {
            Ok(summary) => StageReport { stage, outcome: StageOutcome::Completed(summary) },
            Err(e) => StageReport { stage, outcome: StageOutcome::Failed(e) },
        }
    }

    fn run_stage(&self, stage: Stage) -> Result<String, MigrationError> {
        match stage {
            Stage::ExtractSourceSchemas => self.extract_schemas(),
            Stage::CreateTargetSchemas => self.create_target_schemas(),
            Stage::ExtractSourceTypes => self.extract_types(),
            Stage::CreateTargetTypes => self.create_target_types(),
            Stage::ExtractSourceTables => self.extract_tables(),
            Stage::CreateTargetTables => self.create_target_tables(),
            Stage::ExtractSourceConstraints => self.extract_constraints(),
            Stage::CreateTargetConstraints => self.create_target_constraints(),
            Stage::CreateFkIndexes => self.create_fk_indexes(),
            Stage::ExtractSourceViews => self.extract_views(),
            Stage::CreateViewStubs => self.create_view_stubs(),
            Stage::ExtractSourceRoutines => self.extract_routines(),
            Stage::CreateRoutineStubs => self.create_routine_stubs(),
            Stage::ImplementViews => self.implement_views(),
            Stage::ImplementRoutines => self.implement_routines(),
            Stage::VerifyAll => self.verify_all(),
        }
    }

    fn source_connection(&self) -> Result<Box<dyn Connection>, MigrationError> {
        if !self.source.is_configured() {
            return Err(MigrationError::NotConfigured);
        }
        Ok(self.source.connect()?)
    }

    fn target_connection(&self) -> Result<Box<dyn Connection>, MigrationError> {
        if !self.target.is_configured() {
            return Err(MigrationError::NotConfigured);
        }
        Ok(self.target.connect()?)
    }

    // --- schemas -----------------------------------------------------

    fn extract_schemas(&self) -> Result<String, MigrationError> {
        let conn = self.source_connection()?;
        let job = ExtractionJob::new(
            "extract-source-schemas",
            Stage::ExtractSourceSchemas.name(),
            "extracts schemas from ALL_USERS",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Schemas),
            |_sink, _cancel| {
                let result = conn.execute(SCHEMAS_QUERY, &[]).map_err(|e| ora2pg_jobs::JobError::Failed(e.to_string()))?;
                Ok(extract::schemas_from_rows(&result.rows, &self.exclude_list))
            },
            Artifact::Schemas,
            |schemas: &[Schema]| format!("{} schema(s)", schemas.len()),
        );
        let out = job.execute(&*self.progress, &self.cancel)?;
        Ok(format!("extracted {} schema(s)", out.len()))
    }

    fn create_target_schemas(&self) -> Result<String, MigrationError> {
        let conn = self.target_connection()?;
        let job = WriteJob::new(
            "create-target-schemas",
            Stage::CreateTargetSchemas.name(),
            "creates user schemas on the target",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Schemas),
            StoreKey::new(DatabaseSide::Target, ObjectKind::Result(Stage::CreateTargetSchemas.name().into())),
            |artifact| match artifact {
                Artifact::Schemas(v) => Some(v.into_iter().filter(Schema::is_user).collect()),
                _ => None,
            },
            |s: &Schema| s.name.clone(),
            |s: &Schema| execute_ddl(&*conn, self.dry_run, &ddl::create_schema_ddl(s), &s.name),
        );
        let result = job.execute(&*self.progress, &self.cancel)?;
        Ok(summarize(&result))
    }

    // --- object types --------------------------------------------------

    fn extract_types(&self) -> Result<String, MigrationError> {
        let conn = self.source_connection()?;
        let job = ExtractionJob::new(
            "extract-source-types",
            Stage::ExtractSourceTypes.name(),
            "extracts composite types from ALL_TYPES/ALL_TYPE_ATTRS",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::ObjectTypes),
            |_sink, _cancel| {
                let result = conn.execute(TYPES_QUERY, &[]).map_err(|e| ora2pg_jobs::JobError::Failed(e.to_string()))?;
                Ok(extract::object_types_from_rows(&result.rows))
            },
            Artifact::ObjectTypes,
            |types: &[ora2pg_model::ObjectDataType]| format!("{} type(s)", types.len()),
        );
        let out = job.execute(&*self.progress, &self.cancel)?;
        Ok(format!("extracted {} object type(s)", out.len()))
    }

    fn create_target_types(&self) -> Result<String, MigrationError> {
        let conn = self.target_connection()?;
        let job = WriteJob::new(
            "create-target-types",
            Stage::CreateTargetTypes.name(),
            "creates composite types on the target",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::ObjectTypes),
            StoreKey::new(DatabaseSide::Target, ObjectKind::Result(Stage::CreateTargetTypes.name().into())),
            |artifact| match artifact {
                Artifact::ObjectTypes(v) => Some(v),
                _ => None,
            },
            |t: &ora2pg_model::ObjectDataType| t.name.display(),
            |t: &ora2pg_model::ObjectDataType| execute_ddl(&*conn, self.dry_run, &ddl::create_object_type_ddl(t), &t.name.display()),
        );
        let result = job.execute(&*self.progress, &self.cancel)?;
        Ok(summarize(&result))
    }

    // --- tables ----------------------------------------------------------

    fn extract_tables(&self) -> Result<String, MigrationError> {
        let conn = self.source_connection()?;
        let job = ExtractionJob::new(
            "extract-source-tables",
            Stage::ExtractSourceTables.name(),
            "extracts tables and columns from ALL_TAB_COLUMNS",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Tables),
            |_sink, _cancel| {
                let result = conn.execute(TABLES_QUERY, &[]).map_err(|e| ora2pg_jobs::JobError::Failed(e.to_string()))?;
                extract::tables_from_rows(&result.rows).map_err(|e| ora2pg_jobs::JobError::Invalid(e.to_string()))
            },
            Artifact::Tables,
            |tables: &[TableMetadata]| format!("{} table(s)", tables.len()),
        );
        let out = job.execute(&*self.progress, &self.cancel)?;
        Ok(format!("extracted {} table(s)", out.len()))
    }

    fn create_target_tables(&self) -> Result<String, MigrationError> {
        let conn = self.target_connection()?;
        let job = WriteJob::new(
            "create-target-tables",
            Stage::CreateTargetTables.name(),
            "creates tables on the target, with NOT NULL embedded",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Tables),
            StoreKey::new(DatabaseSide::Target, ObjectKind::Result(Stage::CreateTargetTables.name().into())),
            |artifact| match artifact {
                Artifact::Tables(v) => Some(v),
                _ => None,
            },
            |t: &TableMetadata| t.name.display(),
            |t: &TableMetadata| execute_ddl(&*conn, self.dry_run, &ddl::create_table_ddl(t), &t.name.display()),
        );
        let result = job.execute(&*self.progress, &self.cancel)?;
        Ok(summarize(&result))
    }

    // --- constraints and FK indexes --------------------------------------

    fn extract_constraints(&self) -> Result<String, MigrationError> {
        let conn = self.source_connection()?;
        let job = ExtractionJob::new(
            "extract-source-constraints",
            Stage::ExtractSourceConstraints.name(),
            "extracts constraints from ALL_CONSTRAINTS/ALL_CONS_COLUMNS",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Constraints),
            |_sink, _cancel| {
                let result = conn.execute(CONSTRAINTS_QUERY, &[]).map_err(|e| ora2pg_jobs::JobError::Failed(e.to_string()))?;
                extract::constraints_from_rows(&result.rows).map_err(|e| ora2pg_jobs::JobError::Invalid(e.to_string()))
            },
            Artifact::Constraints,
            |cs: &[ConstraintMetadata]| format!("{} constraint(s)", cs.len()),
        );
        let out = job.execute(&*self.progress, &self.cancel)?;
        Ok(format!("extracted {} constraint(s)", out.len()))
    }

    /// Orders the extracted constraint list (PK, UNIQUE, FK topological,
    /// CHECK last) and replaces the stored list with that order before
    /// writing, then reads both sides: skips any constraint already present
    /// on the same qualified table on the target.
    fn create_target_constraints(&self) -> Result<String, MigrationError> {
        let key = StoreKey::new(DatabaseSide::Source, ObjectKind::Constraints);
        let raw = match self.store.get(&key)? {
            Some(Artifact::Constraints(v)) => v,
            _ => {
                tracing::warn!(target: "ora2pg_pipeline", "CreateTargetConstraints has no input; skipping");
                return Ok("no constraints to create".to_string());
            }
        };
        let ordering = ora2pg_depgraph::order_constraints(&raw);
        for w in &ordering.warnings {
            tracing::warn!(target: "ora2pg_pipeline", warning = %w, "dependency analyzer warning");
        }
        self.store.put(key.clone(), Artifact::Constraints(ordering.constraints))?;

        let conn = self.target_connection()?;
        let existing = existing_target_constraints(&*conn)?;

        let job = WriteJob::new(
            "create-target-constraints",
            Stage::CreateTargetConstraints.name(),
            "creates constraints on the target in dependency order",
            self.store.clone(),
            key,
            StoreKey::new(DatabaseSide::Target, ObjectKind::Result(Stage::CreateTargetConstraints.name().into())),
            |artifact| match artifact {
                Artifact::Constraints(v) => Some(v),
                _ => None,
            },
            |c: &ConstraintMetadata| format!("{}.{}", c.table.display(), c.name),
            move |c: &ConstraintMetadata| {
                if existing.contains(&(c.table.display(), normalize_identifier(&c.name))) {
                    return Ok(WriteOutcome::Skipped);
                }
                execute_ddl(&*conn, self.dry_run, &ddl::create_constraint_ddl(c), &format!("{}.{}", c.table.display(), c.name))
            },
        );
        let result = job.execute(&*self.progress, &self.cancel)?;
        Ok(summarize(&result))
    }

    fn create_fk_indexes(&self) -> Result<String, MigrationError> {
        let conn = self.target_connection()?;
        let job = WriteJob::new(
            "create-fk-indexes",
            Stage::CreateFkIndexes.name(),
            "creates indexes backing foreign keys",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Constraints),
            StoreKey::new(DatabaseSide::Target, ObjectKind::Result(Stage::CreateFkIndexes.name().into())),
            |artifact| match artifact {
                Artifact::Constraints(v) => Some(v.into_iter().filter(ConstraintMetadata::is_foreign_key).collect()),
                _ => None,
            },
            |c: &ConstraintMetadata| format!("idx_{}", c.name),
            |c: &ConstraintMetadata| {
                let Some(ddl_text) = ddl::create_fk_index_ddl(c) else {
                    return Ok(WriteOutcome::Skipped);
                };
                execute_ddl(&*conn, self.dry_run, &ddl_text, &format!("idx_{}", c.name))
            },
        );
        let result = job.execute(&*self.progress, &self.cancel)?;
        Ok(summarize(&result))
    }

    // --- views -------------------------------------------------------------

    fn extract_views(&self) -> Result<String, MigrationError> {
        let conn = self.source_connection()?;
        let job = ExtractionJob::new(
            "extract-source-views",
            Stage::ExtractSourceViews.name(),
            "extracts views from ALL_VIEWS and their columns from ALL_TAB_COLUMNS",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Views),
            |_sink, _cancel| {
                let views = conn.execute(VIEWS_QUERY, &[]).map_err(|e| ora2pg_jobs::JobError::Failed(e.to_string()))?;
                let columns = conn.execute(VIEW_COLUMNS_QUERY, &[]).map_err(|e| ora2pg_jobs::JobError::Failed(e.to_string()))?;
                Ok(extract::views_from_rows(&views.rows, &columns.rows))
            },
            Artifact::Views,
            |views: &[ViewMetadata]| format!("{} view(s)", views.len()),
        );
        let out = job.execute(&*self.progress, &self.cancel)?;
        Ok(format!("extracted {} view(s)", out.len()))
    }

    fn create_view_stubs(&self) -> Result<String, MigrationError> {
        let conn = self.target_connection()?;
        let job = WriteJob::new(
            "create-view-stubs",
            Stage::CreateViewStubs.name(),
            "creates typed, empty view stubs so cyclic references resolve",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Views),
            StoreKey::new(DatabaseSide::Target, ObjectKind::Result(Stage::CreateViewStubs.name().into())),
            |artifact| match artifact {
                Artifact::Views(v) => Some(v),
                _ => None,
            },
            |v: &ViewMetadata| v.name.display(),
            |v: &ViewMetadata| execute_ddl(&*conn, self.dry_run, &ddl::create_view_stub_ddl(v), &v.name.display()),
        );
        let result = job.execute(&*self.progress, &self.cancel)?;
        Ok(summarize(&result))
    }

    fn implement_views(&self) -> Result<String, MigrationError> {
        let conn = self.target_connection()?;
        let tables = match self.store.get(&StoreKey::new(DatabaseSide::Source, ObjectKind::Tables))? {
            Some(Artifact::Tables(v)) => v,
            _ => Vec::new(),
        };
        let functions = match self.store.get(&StoreKey::new(DatabaseSide::Source, ObjectKind::Functions))? {
            Some(Artifact::Functions(v)) => v,
            _ => Vec::new(),
        };
        let index = MetadataIndex::new(&tables, &functions);
        let ctx = RenderContext { current_schema: self.render.current_schema.clone(), synonyms: &self.render.synonyms };

        let job = WriteJob::new(
            "implement-views",
            Stage::ImplementViews.name(),
            "replaces view stubs with their transpiled implementation",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Views),
            StoreKey::new(DatabaseSide::Target, ObjectKind::Result(Stage::ImplementViews.name().into())),
            |artifact| match artifact {
                Artifact::Views(v) => Some(v),
                _ => None,
            },
            |v: &ViewMetadata| v.name.display(),
            |v: &ViewMetadata| {
                let name = v.name.display();
                let source = v.source_sql.as_deref().ok_or_else(|| {
                    ObjectError::new(name.clone(), "view has no source SQL to transpile", None)
                })?;
                let stmt = parse_select(source).map_err(|e| ObjectError::new(name.clone(), e.to_string(), None))?;
                let cache = infer_select(&stmt, &index, &self.render.current_schema);
                let transpiled = render_select(&stmt, &ctx, &cache).map_err(|e| ObjectError::new(name.clone(), e.to_string(), None))?;
                let ddl_text = ddl::create_view_impl_ddl(v, &transpiled);
                execute_ddl(&*conn, self.dry_run, &ddl_text, &name)
            },
        );
        let result = job.execute(&*self.progress, &self.cancel)?;
        Ok(summarize(&result))
    }

    // --- routines ------------------------------------------------------

    fn extract_routines(&self) -> Result<String, MigrationError> {
        let conn = self.source_connection()?;
        let result = conn.execute(ROUTINES_QUERY, &[])?;
        let (functions, procedures) = extract::routines_from_rows(&result.rows);
        let fn_count = functions.len();
        let proc_count = procedures.len();
        self.store.put(StoreKey::new(DatabaseSide::Source, ObjectKind::Functions), Artifact::Functions(functions))?;
        self.store.put(StoreKey::new(DatabaseSide::Source, ObjectKind::Procedures), Artifact::Procedures(procedures))?;
        self.progress.report(ora2pg_jobs::ProgressUpdate::new(
            100,
            Stage::ExtractSourceRoutines.name(),
            format!("{fn_count} function(s), {proc_count} procedure(s)"),
        ));
        Ok(format!("extracted {fn_count} function(s), {proc_count} procedure(s)"))
    }

    fn create_routine_stubs(&self) -> Result<String, MigrationError> {
        let conn = self.target_connection()?;

        let function_job = WriteJob::new(
            "create-function-stubs",
            Stage::CreateRoutineStubs.name(),
            "creates empty, typed function stubs",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Functions),
            StoreKey::new(DatabaseSide::Target, ObjectKind::Result(format!("{}:functions", Stage::CreateRoutineStubs.name()))),
            |artifact| match artifact {
                Artifact::Functions(v) => Some(v),
                _ => None,
            },
            |f: &FunctionMetadata| f.name.display(),
            |f: &FunctionMetadata| execute_ddl(&*conn, self.dry_run, &ddl::create_function_stub_ddl(f), &f.name.display()),
        );
        let mut result = function_job.execute(&*self.progress, &self.cancel)?;

        let conn = self.target_connection()?;
        let procedure_job = WriteJob::new(
            "create-procedure-stubs",
            Stage::CreateRoutineStubs.name(),
            "creates empty procedure stubs",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Procedures),
            StoreKey::new(DatabaseSide::Target, ObjectKind::Result(format!("{}:procedures", Stage::CreateRoutineStubs.name()))),
            |artifact| match artifact {
                Artifact::Procedures(v) => Some(v),
                _ => None,
            },
            |p: &ProcedureMetadata| p.name.display(),
            |p: &ProcedureMetadata| execute_ddl(&*conn, self.dry_run, &ddl::create_procedure_stub_ddl(p), &p.name.display()),
        );
        result.merge(procedure_job.execute(&*self.progress, &self.cancel)?);
        Ok(summarize(&result))
    }

    /// Replaces routine stub bodies with the harvested source. Full PL/SQL
    /// control-flow translation is out of scope, so the body is carried
    /// through as opaque text.
    fn implement_routines(&self) -> Result<String, MigrationError> {
        let conn = self.target_connection()?;
        let function_job = WriteJob::new(
            "implement-functions",
            Stage::ImplementRoutines.name(),
            "replaces function stub bodies with their harvested source",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Functions),
            StoreKey::new(DatabaseSide::Target, ObjectKind::Result(format!("{}:functions", Stage::ImplementRoutines.name()))),
            |artifact| match artifact {
                Artifact::Functions(v) => Some(v),
                _ => None,
            },
            |f: &FunctionMetadata| f.name.display(),
            |f: &FunctionMetadata| execute_ddl(&*conn, self.dry_run, &ddl::create_function_impl_ddl(f, &f.source_text), &f.name.display()),
        );
        let mut result = function_job.execute(&*self.progress, &self.cancel)?;

        let conn = self.target_connection()?;
        let procedure_job = WriteJob::new(
            "implement-procedures",
            Stage::ImplementRoutines.name(),
            "replaces procedure stub bodies with their harvested source",
            self.store.clone(),
            StoreKey::new(DatabaseSide::Source, ObjectKind::Procedures),
            StoreKey::new(DatabaseSide::Target, ObjectKind::Result(format!("{}:procedures", Stage::ImplementRoutines.name()))),
            |artifact| match artifact {
                Artifact::Procedures(v) => Some(v),
                _ => None,
            },
            |p: &ProcedureMetadata| p.name.display(),
            |p: &ProcedureMetadata| execute_ddl(&*conn, self.dry_run, &ddl::create_procedure_impl_ddl(p, &p.source_text), &p.name.display()),
        );
        result.merge(procedure_job.execute(&*self.progress, &self.cancel)?);
        Ok(summarize(&result))
    }

    fn verify_all(&self) -> Result<String, MigrationError> {
        let conn = self.target_connection()?;
        let report = ora2pg_verify::verify_all(&*conn)?;
        Ok(report.summary())
    }
}

fn execute_ddl(conn: &dyn Connection, dry_run: bool, statement: &str, object: &str) -> Result<WriteOutcome, ObjectError> {
    if dry_run {
        tracing::info!(target: "ora2pg_pipeline", object, statement, "dry-run: DDL not executed");
        return Ok(WriteOutcome::Skipped);
    }
    match conn.execute(statement, &[] as &[Param]) {
        Ok(_) => Ok(WriteOutcome::Created),
        Err(e) => Err(ObjectError::new(object, e.to_string(), Some(statement.to_string()))),
    }
}

fn existing_target_constraints(conn: &dyn Connection) -> Result<HashSet<(String, String)>, MigrationError> {
    let result = conn.execute(EXISTING_TARGET_CONSTRAINTS_QUERY, &[])?;
    Ok(result
        .rows
        .iter()
        .filter_map(|r| {
            let table = r.get("table_name").and_then(ora2pg_connectors::Value::as_text)?;
            let name = r.get("conname").and_then(ora2pg_connectors::Value::as_text)?;
            Some((table.to_string(), normalize_identifier(name)))
        })
        .collect())
}

fn summarize(result: &WriteResult) -> String {
    format!("{} created, {} skipped, {} error(s)", result.created, result.skipped, result.errors.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ora2pg_connectors::{InMemoryConnector, QueryResult, Row, Value};
    use ora2pg_jobs::NullProgressSink;
    use std::collections::HashMap as Map;

    fn pipeline(source_responses: Map<String, QueryResult>, target_responses: Map<String, QueryResult>) -> MigrationPipeline {
        MigrationPipeline::new(
            Box::new(InMemoryConnector::new(source_responses)),
            Box::new(InMemoryConnector::new(target_responses)),
            Box::new(NullProgressSink),
            CancelToken::new(),
            RenderConfig { current_schema: "hr".to_string(), synonyms: Map::new() },
            ora2pg_model::default_system_schemas(),
            false,
        )
    }

    #[test]
    fn schemas_extract_then_create_round_trip() {
        let mut source = Map::new();
        source.insert(
            SCHEMAS_QUERY.to_string(),
            QueryResult::new(vec![
                Row::new(vec![("USERNAME", Value::Text("HR".into()))]),
                Row::new(vec![("USERNAME", Value::Text("SYS".into()))]),
            ]),
        );
        let mut target = Map::new();
        target.insert("CREATE SCHEMA IF NOT EXISTS hr".to_string(), QueryResult::new(vec![]));
        let pipeline = pipeline(source, target);

        assert!(pipeline.run_stage(Stage::ExtractSourceSchemas).is_ok());
        let summary = pipeline.run_stage(Stage::CreateTargetSchemas).unwrap();
        assert_eq!(summary, "1 created, 0 skipped, 0 error(s)");
    }

    #[test]
    fn missing_source_connector_is_not_configured() {
        let pipeline = MigrationPipeline::new(
            Box::new(InMemoryConnector::unconfigured()),
            Box::new(InMemoryConnector::unconfigured()),
            Box::new(NullProgressSink),
            CancelToken::new(),
            RenderConfig { current_schema: "hr".to_string(), synonyms: Map::new() },
            ora2pg_model::default_system_schemas(),
            false,
        );
        assert!(matches!(pipeline.run_stage(Stage::ExtractSourceSchemas), Err(MigrationError::NotConfigured)));
    }

    #[test]
    fn non_infrastructure_stage_failure_does_not_abort_the_run() {
        // Both sides unconfigured: every stage fails with `NotConfigured`,
        // which is not in the abort set, so the run still visits all
        // sixteen stages instead of stopping at the first failure.
        let pipeline = MigrationPipeline::new(
            Box::new(InMemoryConnector::unconfigured()),
            Box::new(InMemoryConnector::unconfigured()),
            Box::new(NullProgressSink),
            CancelToken::new(),
            RenderConfig { current_schema: "hr".to_string(), synonyms: Map::new() },
            ora2pg_model::default_system_schemas(),
            false,
        );
        let reports = pipeline.run().unwrap();
        assert!(reports.iter().any(|r| matches!(r.outcome, StageOutcome::Failed(MigrationError::NotConfigured))));
        assert_eq!(reports.len(), ORDERED_STAGES.len());
    }

    #[test]
    fn infrastructure_error_aborts_the_whole_run() {
        // Connectors configured but the canned-response map has nothing
        // registered: the first query surfaces as `Infrastructure`, which
        // must stop the run immediately rather than recording a failure
        // and continuing.
        let pipeline = pipeline(Map::new(), Map::new());
        let err = pipeline.run().unwrap_err();
        assert!(matches!(err, MigrationError::Infrastructure(_)));
    }

    #[test]
    fn malformed_constraint_row_fails_its_stage_without_aborting_the_run() {
        // A primary key row with no COLUMN_NAME fails model validation. That
        // must be recorded as a `Failed` stage outcome, not treated the same
        // as a connector/infrastructure error that stops the whole run.
        let mut source = Map::new();
        source.insert(SCHEMAS_QUERY.to_string(), QueryResult::new(vec![]));
        source.insert(TYPES_QUERY.to_string(), QueryResult::new(vec![]));
        source.insert(TABLES_QUERY.to_string(), QueryResult::new(vec![]));
        source.insert(
            CONSTRAINTS_QUERY.to_string(),
            QueryResult::new(vec![Row::new(vec![
                ("OWNER", Value::Text("hr".into())),
                ("TABLE_NAME", Value::Text("employees".into())),
                ("CONSTRAINT_NAME", Value::Text("pk_employees".into())),
                ("CONSTRAINT_TYPE", Value::Text("P".into())),
            ])]),
        );
        source.insert(VIEWS_QUERY.to_string(), QueryResult::new(vec![]));
        source.insert(VIEW_COLUMNS_QUERY.to_string(), QueryResult::new(vec![]));
        source.insert(ROUTINES_QUERY.to_string(), QueryResult::new(vec![]));
        let mut target = Map::new();
        target.insert(
            "SELECT n.nspname AS schema, c.relname AS name, pg_get_viewdef(c.oid, true) AS definition \
             FROM pg_class c JOIN pg_namespace n ON n.oid = c.relnamespace WHERE c.relkind = 'v'"
                .to_string(),
            QueryResult::new(vec![]),
        );
        target.insert(
            "SELECT n.nspname AS schema, p.proname AS name, pg_get_functiondef(p.oid) AS definition \
             FROM pg_proc p JOIN pg_namespace n ON n.oid = p.pronamespace"
                .to_string(),
            QueryResult::new(vec![]),
        );
        let pipeline = pipeline(source, target);
        let reports = pipeline.run().unwrap();
        let constraints_report =
            reports.iter().find(|r| r.stage == Stage::ExtractSourceConstraints).expect("stage ran");
        assert!(matches!(
            constraints_report.outcome,
            StageOutcome::Failed(MigrationError::ModelValidation(_))
        ));
        assert_eq!(reports.len(), ORDERED_STAGES.len());
    }

    #[test]
    fn dry_run_records_created_objects_as_skipped_without_querying_the_target() {
        let mut source = Map::new();
        source.insert(
            SCHEMAS_QUERY.to_string(),
            QueryResult::new(vec![Row::new(vec![("USERNAME", Value::Text("HR".into()))])]),
        );
        let target = InMemoryConnector::new(Map::new());
        let pipeline = MigrationPipeline::new(
            Box::new(InMemoryConnector::new(source)),
            Box::new(target.clone()),
            Box::new(NullProgressSink),
            CancelToken::new(),
            RenderConfig { current_schema: "hr".to_string(), synonyms: Map::new() },
            ora2pg_model::default_system_schemas(),
            true,
        );
        pipeline.run_stage(Stage::ExtractSourceSchemas).unwrap();
        let summary = pipeline.run_stage(Stage::CreateTargetSchemas).unwrap();
        assert_eq!(summary, "0 created, 1 skipped, 0 error(s)");
        assert!(target.executed().is_empty());
    }
}
