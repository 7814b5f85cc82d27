//! Typed metadata records describing schemas, columns, tables, constraints,
//! views, composite types, and functions/procedures, plus the per-operation
//! result records each write phase produces.
//!
//! Records are created by Extraction jobs and handed by value to the state
//! store; every accessor that would otherwise return a reference to shared
//! state instead returns an owned clone so that a reader can never observe a
//! mutation made after hand-off (see `ora2pg-store`).

mod column;
mod constraint;
mod object_type;
mod result;
mod routine;
mod schema;
mod table;
mod type_info;
mod view;

pub use column::ColumnMetadata;
pub use constraint::{ConstraintKind, ConstraintMetadata, DeleteRule};
pub use object_type::{ObjectAttribute, ObjectDataType};
pub use result::{ObjectError, WriteResult};
pub use routine::{Direction, FunctionMetadata, Parameter, ProcedureMetadata};
pub use schema::{classify, default_system_schemas, Schema, SchemaClass};
pub use table::TableMetadata;
pub use type_info::TypeCategory;
pub use view::ViewMetadata;

/// Errors raised while constructing a metadata record whose invariant would
/// otherwise be violated. These never cross an I/O boundary: they are raised
/// by constructors/builders only, so a record in circulation is always valid.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("constraint on {table} references unknown column(s): {columns:?}")]
    UnknownConstraintColumns { table: String, columns: Vec<String> },

    #[error("foreign key on {table} has {local} local column(s) but {referenced} referenced column(s)")]
    ForeignKeyArityMismatch {
        table: String,
        local: usize,
        referenced: usize,
    },

    #[error("{kind} constraint on {table} must reference at least one column")]
    EmptyColumnList { table: String, kind: &'static str },

    #[error("column {column} on {table} declares both char_length and precision/scale")]
    ConflictingLengthAndPrecision { table: String, column: String },
}

/// A fully-qualified `schema.object` name. Normalization (case-folding,
/// quoting) happens only at SQL-emission time (`ora2pg-dialect`); this is a
/// plain carrier used throughout the metadata model and state store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub schema: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    pub fn display(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
