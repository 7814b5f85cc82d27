/// Abstract category assigned to an expression, column, or declared type.
/// Used uniformly by the type inference visitor (`ora2pg-typeinfer`) and the
/// dialect mapper (`ora2pg-dialect`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Numeric,
    Text,
    Date,
    Timestamp,
    Boolean,
    Null,
    Unknown,
    Custom { schema: String, name: String },
}

impl TypeCategory {
    pub fn is_date_like(&self) -> bool {
        matches!(self, TypeCategory::Date | TypeCategory::Timestamp)
    }
}
