use ora2pg_model::{ObjectError, WriteResult};
use ora2pg_store::{Artifact, StateStore, StoreKey};

use crate::cancel::CancelToken;
use crate::job::{Job, JobError};
use crate::progress::{ProgressSink, ProgressUpdate};

/// What happened when a single object's DDL was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Skipped,
}

/// Reads a list of `T` from the state store, attempts one write per object,
/// and persists the accumulated `WriteResult`. Never retries an object: a
/// logical failure (duplicate object, invalid expression) is recorded and
/// the job moves on to the next one.
pub struct WriteJob<T, FromArtifact, ObjectName, ApplyOne>
where
    FromArtifact: Fn(Artifact) -> Option<Vec<T>>,
    ObjectName: Fn(&T) -> String,
    ApplyOne: Fn(&T) -> Result<WriteOutcome, ObjectError>,
{
    id: String,
    kind: &'static str,
    description: String,
    store: StateStore,
    input_key: StoreKey,
    result_key: StoreKey,
    from_artifact: FromArtifact,
    object_name: ObjectName,
    apply_one: ApplyOne,
}

impl<T, FromArtifact, ObjectName, ApplyOne> WriteJob<T, FromArtifact, ObjectName, ApplyOne>
where
    FromArtifact: Fn(Artifact) -> Option<Vec<T>>,
    ObjectName: Fn(&T) -> String,
    ApplyOne: Fn(&T) -> Result<WriteOutcome, ObjectError>,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        kind: &'static str,
        description: impl Into<String>,
        store: StateStore,
        input_key: StoreKey,
        result_key: StoreKey,
        from_artifact: FromArtifact,
        object_name: ObjectName,
        apply_one: ApplyOne,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            description: description.into(),
            store,
            input_key,
            result_key,
            from_artifact,
            object_name,
            apply_one,
        }
    }
}

impl<T, FromArtifact, ObjectName, ApplyOne> Job for WriteJob<T, FromArtifact, ObjectName, ApplyOne>
where
    FromArtifact: Fn(Artifact) -> Option<Vec<T>>,
    ObjectName: Fn(&T) -> String,
    ApplyOne: Fn(&T) -> Result<WriteOutcome, ObjectError>,
{
    type Output = WriteResult;

    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        self.kind
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn execute(self, sink: &dyn ProgressSink, cancel: &CancelToken) -> Result<WriteResult, JobError> {
        let input = match self.store.get(&self.input_key)? {
            Some(artifact) => (self.from_artifact)(artifact).unwrap_or_default(),
            None => {
                tracing::warn!(key = ?self.input_key, "write job has no input at this key; treating as empty");
                Vec::new()
            }
        };

        let mut result = WriteResult::new();
        let total = input.len();

        for (i, obj) in input.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(JobError::Cancelled);
            }
            let name = (self.object_name)(obj);
            let percent = if total == 0 { 100 } else { ((i * 100) / total) as i8 };
            sink.report(ProgressUpdate::new(percent, self.kind, name));

            match (self.apply_one)(obj) {
                Ok(WriteOutcome::Created) => result.record_created(),
                Ok(WriteOutcome::Skipped) => result.record_skipped(),
                Err(e) => result.record_error(e),
            }
        }

        self.store.put(self.result_key, Artifact::Result(result.clone()))?;
        sink.report(ProgressUpdate::new(
            100,
            self.kind,
            format!("{} created, {} skipped, {} error(s)", result.created, result.skipped, result.errors.len()),
        ));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ora2pg_store::{DatabaseSide, ObjectKind};

    #[test]
    fn accumulates_created_skipped_and_errors_without_retry() {
        let store = StateStore::new();
        let input_key = StoreKey::new(DatabaseSide::Target, ObjectKind::Tables);
        let result_key = StoreKey::new(DatabaseSide::Target, ObjectKind::Result("CreateTargetTables".into()));

        let t = ora2pg_model::QualifiedName::new("hr", "employees");
        let tables = vec![
            ora2pg_model::TableMetadata::new(t.clone(), vec![], vec![], None).unwrap(),
            ora2pg_model::TableMetadata::new(ora2pg_model::QualifiedName::new("hr", "duplicate"), vec![], vec![], None).unwrap(),
        ];
        store.put(input_key.clone(), Artifact::Tables(tables)).unwrap();

        let job = WriteJob::new(
            "create-tables",
            "CreateTargetTables",
            "creates tables on the target",
            store.clone(),
            input_key,
            result_key.clone(),
            |artifact| match artifact {
                Artifact::Tables(v) => Some(v),
                _ => None,
            },
            |t: &ora2pg_model::TableMetadata| t.name.display(),
            |t: &ora2pg_model::TableMetadata| {
                if t.name.name == "duplicate" {
                    Err(ObjectError::new(t.name.display(), "duplicate object", Some("CREATE TABLE hr.duplicate (...)".into())))
                } else {
                    Ok(WriteOutcome::Created)
                }
            },
        );

        let result = job.execute(&crate::progress::NullProgressSink, &CancelToken::new()).unwrap();
        assert_eq!(result.created, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(store.get(&result_key).unwrap(), Some(Artifact::Result(r)) if r.created == 1));
    }

    #[test]
    fn missing_input_is_treated_as_empty_not_an_error() {
        let store = StateStore::new();
        let input_key = StoreKey::new(DatabaseSide::Target, ObjectKind::Tables);
        let result_key = StoreKey::new(DatabaseSide::Target, ObjectKind::Result("CreateTargetTables".into()));

        let job: WriteJob<ora2pg_model::TableMetadata, _, _, _> = WriteJob::new(
            "create-tables",
            "CreateTargetTables",
            "creates tables on the target",
            store,
            input_key,
            result_key,
            |artifact| match artifact {
                Artifact::Tables(v) => Some(v),
                _ => None,
            },
            |t| t.name.display(),
            |_t| Ok(WriteOutcome::Created),
        );

        let result = job.execute(&crate::progress::NullProgressSink, &CancelToken::new()).unwrap();
        assert_eq!(result.total(), 0);
    }
}
