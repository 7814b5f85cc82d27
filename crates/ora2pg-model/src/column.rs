use crate::{ModelError, QualifiedName};

/// A single column of a table. Invariant: at most one of `char_length` /
/// `(precision, scale)` is meaningful for a given base type — enforced at
/// construction, not by downstream readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    pub base_type: String,
    pub type_owner: Option<String>,
    pub char_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<i32>,
    pub nullable: bool,
    pub default_expr: Option<String>,
}

impl ColumnMetadata {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        table: &QualifiedName,
        name: impl Into<String>,
        base_type: impl Into<String>,
        type_owner: Option<String>,
        char_length: Option<u32>,
        precision: Option<u32>,
        scale: Option<i32>,
        nullable: bool,
        default_expr: Option<String>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if char_length.is_some() && (precision.is_some() || scale.is_some()) {
            return Err(ModelError::ConflictingLengthAndPrecision {
                table: table.display(),
                column: name,
            });
        }
        Ok(Self {
            name,
            base_type: base_type.into(),
            type_owner,
            char_length,
            precision,
            scale,
            nullable,
            default_expr,
        })
    }

    /// The custom type's qualified name, when `base_type` refers to a
    /// user-defined composite (`type_owner` is set).
    pub fn custom_type(&self) -> Option<QualifiedName> {
        self.type_owner
            .as_ref()
            .map(|owner| QualifiedName::new(owner.clone(), self.base_type.clone()))
    }
}
