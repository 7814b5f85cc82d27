//! Layered configuration: a TOML file overridable by `ORA2PG_`-prefixed
//! environment variables. Connection parameters are opaque maps, passed
//! straight through to whichever connector the caller wires up.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct DoConfig {
    #[serde(rename = "all-schemas")]
    pub(crate) all_schemas: bool,
    #[serde(rename = "only-test-schema")]
    pub(crate) only_test_schema: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct SystemSchemasConfig {
    #[serde(rename = "exclude-list")]
    pub(crate) exclude_list: Vec<String>,
}

impl Default for SystemSchemasConfig {
    fn default() -> Self {
        Self { exclude_list: ora2pg_model::default_system_schemas() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct MigrationConfig {
    #[serde(default)]
    pub(crate) r#do: DoConfig,
    #[serde(default)]
    pub(crate) system_schemas: SystemSchemasConfig,
    #[serde(default)]
    pub(crate) source: HashMap<String, String>,
    #[serde(default)]
    pub(crate) target: HashMap<String, String>,
}

impl MigrationConfig {
    pub(crate) fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Applies `ORA2PG_<SECTION>_<KEY>` overrides on top of the file-loaded
    /// config. Only the scalar `do.*` fields and the opaque connection maps
    /// are override targets; the exclude list is file-only.
    pub(crate) fn apply_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("ORA2PG_DO_ALL_SCHEMAS") {
            self.r#do.all_schemas = v.eq_ignore_ascii_case("true") || v == "1";
        }
        if let Ok(v) = std::env::var("ORA2PG_DO_ONLY_TEST_SCHEMA") {
            self.r#do.only_test_schema = Some(v);
        }
        for (side, map) in [("SOURCE", &mut self.source), ("TARGET", &mut self.target)] {
            let prefix = format!("ORA2PG_{side}_");
            for (key, value) in std::env::vars() {
                if let Some(param) = key.strip_prefix(&prefix) {
                    map.insert(param.to_ascii_lowercase(), value);
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_exclude_list_matches_the_oracle_system_owner_set() {
        let config = MigrationConfig::default();
        assert_eq!(config.system_schemas.exclude_list, ora2pg_model::default_system_schemas());
    }

    #[test]
    fn parses_a_minimal_toml_document() {
        let toml = r#"
            [do]
            all-schemas = false
            only-test-schema = "HR"

            [source]
            host = "oracle.internal"

            [target]
            host = "postgres.internal"
        "#;
        let config: MigrationConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.r#do.only_test_schema.as_deref(), Some("HR"));
        assert_eq!(config.source.get("host").map(String::as_str), Some("oracle.internal"));
    }
}
