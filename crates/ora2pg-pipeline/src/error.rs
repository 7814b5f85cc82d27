/// The closed error-kind set every stage's failures are classified into.
/// Only `Cancelled` and `Infrastructure` ever abort a stage; every other
/// variant is recorded against the offending object and the stage
/// continues with the next one.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("connector is not configured")]
    NotConfigured,

    #[error("prerequisite metadata absent in the state store: {detail}")]
    DependencyMissing { detail: String },

    #[error("source object could not be parsed: {message}")]
    ParseError { message: String },

    #[error("extracted metadata failed validation: {0}")]
    ModelValidation(String),

    #[error("translation rule refused: {message}")]
    TranslationError { message: String },

    #[error("type or construct has no PostgreSQL mapping: {detail}")]
    DialectUnsupported { detail: String },

    #[error("target rejected statement: {message}")]
    DdlExecutionError { message: String, statement: String },

    #[error("target already has an object named {object}")]
    AlreadyExists { object: String },

    #[error("job was cancelled")]
    Cancelled,

    #[error("infrastructural failure: {0}")]
    Infrastructure(String),
}

impl From<ora2pg_connectors::ConnectorError> for MigrationError {
    fn from(e: ora2pg_connectors::ConnectorError) -> Self {
        match e {
            ora2pg_connectors::ConnectorError::NotConfigured => MigrationError::NotConfigured,
            ora2pg_connectors::ConnectorError::Query(msg) => MigrationError::Infrastructure(msg),
        }
    }
}

impl From<ora2pg_jobs::JobError> for MigrationError {
    fn from(e: ora2pg_jobs::JobError) -> Self {
        match e {
            ora2pg_jobs::JobError::Cancelled => MigrationError::Cancelled,
            ora2pg_jobs::JobError::MissingInput { key } => MigrationError::DependencyMissing { detail: key },
            ora2pg_jobs::JobError::Store(e) => MigrationError::Infrastructure(e.to_string()),
            ora2pg_jobs::JobError::Failed(msg) => MigrationError::Infrastructure(msg),
            ora2pg_jobs::JobError::Invalid(msg) => MigrationError::ModelValidation(msg),
        }
    }
}

impl From<ora2pg_parser::ParseErrors> for MigrationError {
    fn from(e: ora2pg_parser::ParseErrors) -> Self {
        MigrationError::ParseError { message: e.to_string() }
    }
}

impl From<ora2pg_rewrite::RewriteError> for MigrationError {
    fn from(e: ora2pg_rewrite::RewriteError) -> Self {
        MigrationError::TranslationError { message: e.to_string() }
    }
}

impl From<ora2pg_model::ModelError> for MigrationError {
    fn from(e: ora2pg_model::ModelError) -> Self {
        MigrationError::ModelValidation(e.to_string())
    }
}

impl From<ora2pg_store::StoreError> for MigrationError {
    fn from(e: ora2pg_store::StoreError) -> Self {
        MigrationError::Infrastructure(e.to_string())
    }
}

impl From<ora2pg_verify::VerifyError> for MigrationError {
    fn from(e: ora2pg_verify::VerifyError) -> Self {
        match e {
            ora2pg_verify::VerifyError::Connector(c) => c.into(),
        }
    }
}
