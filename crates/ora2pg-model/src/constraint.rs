use crate::{ModelError, QualifiedName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeleteRule {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey {
        referenced_table: QualifiedName,
        referenced_columns: Vec<String>,
        delete_rule: DeleteRule,
    },
    Unique,
    Check {
        expression: String,
    },
    NotNull,
}

impl ConstraintKind {
    pub fn label(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::ForeignKey { .. } => "FOREIGN KEY",
            ConstraintKind::Unique => "UNIQUE",
            ConstraintKind::Check { .. } => "CHECK",
            ConstraintKind::NotNull => "NOT NULL",
        }
    }
}

/// A single constraint on a table. Invariants (enforced in `new`):
/// FK column count equals referenced-column count; Unique/PK column tuples
/// are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMetadata {
    pub name: String,
    pub table: QualifiedName,
    pub columns: Vec<String>,
    pub kind: ConstraintKind,
}

impl ConstraintMetadata {
    pub fn new(
        name: impl Into<String>,
        table: QualifiedName,
        columns: Vec<String>,
        kind: ConstraintKind,
    ) -> Result<Self, ModelError> {
        match &kind {
            ConstraintKind::PrimaryKey | ConstraintKind::Unique if columns.is_empty() => {
                return Err(ModelError::EmptyColumnList {
                    table: table.display(),
                    kind: kind.label(),
                });
            }
            ConstraintKind::ForeignKey { referenced_columns, .. }
                if referenced_columns.len() != columns.len() =>
            {
                return Err(ModelError::ForeignKeyArityMismatch {
                    table: table.display(),
                    local: columns.len(),
                    referenced: referenced_columns.len(),
                });
            }
            _ => {}
        }
        Ok(Self {
            name: name.into(),
            table,
            columns,
            kind,
        })
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::ForeignKey { .. })
    }

    /// The table this FK points at, if this is a foreign key.
    pub fn fk_target(&self) -> Option<&QualifiedName> {
        match &self.kind {
            ConstraintKind::ForeignKey { referenced_table, .. } => Some(referenced_table),
            _ => None,
        }
    }

    pub fn is_self_referencing(&self) -> bool {
        self.fk_target().is_some_and(|t| t == &self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(n: &str) -> QualifiedName {
        QualifiedName::new("s", n)
    }

    #[test]
    fn rejects_empty_pk_columns() {
        let err = ConstraintMetadata::new("pk_a", t("a"), vec![], ConstraintKind::PrimaryKey).unwrap_err();
        assert_eq!(
            err,
            ModelError::EmptyColumnList { table: "s.a".into(), kind: "PRIMARY KEY" }
        );
    }

    #[test]
    fn rejects_fk_arity_mismatch() {
        let err = ConstraintMetadata::new(
            "fk_b_a",
            t("b"),
            vec!["a_id".into(), "a_sub".into()],
            ConstraintKind::ForeignKey {
                referenced_table: t("a"),
                referenced_columns: vec!["id".into()],
                delete_rule: DeleteRule::NoAction,
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::ForeignKeyArityMismatch { table: "s.b".into(), local: 2, referenced: 1 }
        );
    }

    #[test]
    fn self_reference_detected() {
        let fk = ConstraintMetadata::new(
            "fk_c_parent",
            t("c"),
            vec!["parent_id".into()],
            ConstraintKind::ForeignKey {
                referenced_table: t("c"),
                referenced_columns: vec!["id".into()],
                delete_rule: DeleteRule::Cascade,
            },
        )
        .unwrap();
        assert!(fk.is_self_referencing());
    }
}
