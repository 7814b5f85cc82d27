/// Classification of an Oracle schema: only `User` schemas flow through the
/// migration pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaClass {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Schema {
    pub name: String,
    pub class: SchemaClass,
}

impl Schema {
    pub fn new(name: impl Into<String>, class: SchemaClass) -> Self {
        Self { name: name.into(), class }
    }

    pub fn is_user(&self) -> bool {
        matches!(self.class, SchemaClass::User)
    }
}

/// Classifies a schema name given the configured exclude-list. Oracle's
/// builtin system owners plus `PUBLIC` are excluded by default; callers
/// pass the merged set.
pub fn classify(name: &str, exclude_list: &[String]) -> SchemaClass {
    let upper = name.to_ascii_uppercase();
    if exclude_list.iter().any(|s| s.eq_ignore_ascii_case(&upper)) {
        SchemaClass::System
    } else {
        SchemaClass::User
    }
}

/// The default Oracle system-owner set, merged with `PUBLIC`, used when
/// `system-schemas.exclude-list` is not overridden by configuration.
pub fn default_system_schemas() -> Vec<String> {
    [
        "SYS", "SYSTEM", "OUTLN", "DBSNMP", "APPQOSSYS", "GSMADMIN_INTERNAL", "GSMCATUSER",
        "GSMUSER", "MDSYS", "OLAPSYS", "ORDDATA", "ORDSYS", "CTXSYS", "XDB", "WMSYS", "ANONYMOUS",
        "APEX_PUBLIC_USER", "DIP", "FLOWS_FILES", "ORACLE_OCM", "XS$NULL", "PUBLIC",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_schema_not_in_exclude_list() {
        let excl = default_system_schemas();
        assert_eq!(classify("HR", &excl), SchemaClass::User);
        assert_eq!(classify("sys", &excl), SchemaClass::System);
        assert_eq!(classify("PUBLIC", &excl), SchemaClass::System);
    }
}
