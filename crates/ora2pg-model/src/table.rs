use crate::{ColumnMetadata, ConstraintMetadata, ModelError, QualifiedName};

/// A table as extracted from the source (or mirrored on the target).
/// Invariant: every constraint's column names are a subset of the table's
/// own column names — enforced in `new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub name: QualifiedName,
    pub columns: Vec<ColumnMetadata>,
    pub constraints: Vec<ConstraintMetadata>,
    /// Free-form storage hints (tablespace, partitioning), opaque to the
    /// core — carried through to DDL emission verbatim when present.
    pub storage_hints: Option<String>,
}

impl TableMetadata {
    pub fn new(
        name: QualifiedName,
        columns: Vec<ColumnMetadata>,
        constraints: Vec<ConstraintMetadata>,
        storage_hints: Option<String>,
    ) -> Result<Self, ModelError> {
        for c in &constraints {
            let unknown: Vec<String> = c
                .columns
                .iter()
                .filter(|col| !columns.iter().any(|known| &known.name == *col))
                .cloned()
                .collect();
            if !unknown.is_empty() {
                return Err(ModelError::UnknownConstraintColumns {
                    table: name.display(),
                    columns: unknown,
                });
            }
        }
        Ok(Self { name, columns, constraints, storage_hints })
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }
}
