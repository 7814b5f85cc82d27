use crate::value::{Param, QueryResult};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("connector is not configured")]
    NotConfigured,

    #[error("query failed: {0}")]
    Query(String),
}

/// A live connection: the thing a job actually issues queries against.
/// Borrowed per job from the connector, never shared between jobs.
pub trait Connection: Send {
    fn execute(&self, sql: &str, params: &[Param]) -> Result<QueryResult, ConnectorError>;
}

/// A connector to one side of the migration (Oracle source or PostgreSQL
/// target). `is_configured` lets a pipeline stage distinguish "connector
/// absent, fail fast with `NotConfigured`" from a transient connect
/// failure.
pub trait Connector: Send + Sync {
    fn is_configured(&self) -> bool;
    fn connect(&self) -> Result<Box<dyn Connection>, ConnectorError>;
}

/// Oracle data dictionary views the source connector's cursors query
/// against.
pub const ORACLE_DICTIONARY_VIEWS: &[&str] = &[
    "ALL_USERS",
    "ALL_OBJECTS",
    "ALL_TAB_COLUMNS",
    "ALL_CONSTRAINTS",
    "ALL_CONS_COLUMNS",
    "ALL_VIEWS",
    "ALL_TYPES",
    "ALL_TYPE_ATTRS",
    "ALL_SOURCE",
];

/// PostgreSQL catalogs/views the target connector's cursors query against.
pub const POSTGRES_CATALOG_VIEWS: &[&str] = &[
    "pg_namespace",
    "pg_class",
    "pg_attribute",
    "pg_type",
    "pg_constraint",
    "pg_index",
    "information_schema.columns",
    "information_schema.table_constraints",
];
