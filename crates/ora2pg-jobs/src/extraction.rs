use ora2pg_store::{Artifact, StateStore, StoreKey};

use crate::cancel::CancelToken;
use crate::job::{Job, JobError};
use crate::progress::{ProgressSink, ProgressUpdate};

/// Reads a list of `T` from source, persists it to the state store under a
/// declared key, and reports a one-line summary at completion.
///
/// Idempotent by construction: `StateStore::put` always replaces whatever
/// was at `key`, so re-running this job simply overwrites the previous
/// extraction rather than appending to it.
pub struct ExtractionJob<T, Extract, ToArtifact, Summarize>
where
    Extract: FnOnce(&dyn ProgressSink, &CancelToken) -> Result<Vec<T>, JobError>,
    ToArtifact: FnOnce(Vec<T>) -> Artifact,
    Summarize: Fn(&[T]) -> String,
{
    id: String,
    kind: &'static str,
    description: String,
    store: StateStore,
    key: StoreKey,
    extract: Extract,
    to_artifact: ToArtifact,
    summarize: Summarize,
}

impl<T, Extract, ToArtifact, Summarize> ExtractionJob<T, Extract, ToArtifact, Summarize>
where
    T: Clone,
    Extract: FnOnce(&dyn ProgressSink, &CancelToken) -> Result<Vec<T>, JobError>,
    ToArtifact: FnOnce(Vec<T>) -> Artifact,
    Summarize: Fn(&[T]) -> String,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        kind: &'static str,
        description: impl Into<String>,
        store: StateStore,
        key: StoreKey,
        extract: Extract,
        to_artifact: ToArtifact,
        summarize: Summarize,
    ) -> Self {
        Self { id: id.into(), kind, description: description.into(), store, key, extract, to_artifact, summarize }
    }
}

impl<T, Extract, ToArtifact, Summarize> Job for ExtractionJob<T, Extract, ToArtifact, Summarize>
where
    T: Clone,
    Extract: FnOnce(&dyn ProgressSink, &CancelToken) -> Result<Vec<T>, JobError>,
    ToArtifact: FnOnce(Vec<T>) -> Artifact,
    Summarize: Fn(&[T]) -> String,
{
    type Output = Vec<T>;

    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        self.kind
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn execute(self, sink: &dyn ProgressSink, cancel: &CancelToken) -> Result<Vec<T>, JobError> {
        sink.report(ProgressUpdate::new(0, self.kind, "extracting"));
        if cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let items = (self.extract)(sink, cancel)?;

        if cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let summary = (self.summarize)(&items);
        self.store.put(self.key, (self.to_artifact)(items.clone()))?;
        sink.report(ProgressUpdate::new(100, self.kind, summary));
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ora2pg_store::DatabaseSide;

    #[test]
    fn persists_extracted_items_and_replaces_on_rerun() {
        let store = StateStore::new();
        let key = StoreKey::new(DatabaseSide::Source, ora2pg_store::ObjectKind::Schemas);

        let job = ExtractionJob::new(
            "extract-schemas",
            "ExtractSourceSchemas",
            "extracts schemas from the source",
            store.clone(),
            key.clone(),
            |_sink, _cancel| Ok(vec!["A".to_string()]),
            |names: Vec<String>| Artifact::Schemas(names.into_iter().map(|n| ora2pg_model::Schema::new(n, ora2pg_model::SchemaClass::User)).collect()),
            |items: &[String]| format!("{} schema(s)", items.len()),
        );
        let out = job.execute(&crate::progress::NullProgressSink, &CancelToken::new()).unwrap();
        assert_eq!(out, vec!["A".to_string()]);
        assert!(matches!(store.get(&key).unwrap(), Some(Artifact::Schemas(v)) if v.len() == 1));

        let job2 = ExtractionJob::new(
            "extract-schemas",
            "ExtractSourceSchemas",
            "extracts schemas from the source",
            store.clone(),
            key.clone(),
            |_sink, _cancel| Ok(Vec::<String>::new()),
            |names: Vec<String>| Artifact::Schemas(names.into_iter().map(|n| ora2pg_model::Schema::new(n, ora2pg_model::SchemaClass::User)).collect()),
            |items: &[String]| format!("{} schema(s)", items.len()),
        );
        job2.execute(&crate::progress::NullProgressSink, &CancelToken::new()).unwrap();
        assert!(matches!(store.get(&key).unwrap(), Some(Artifact::Schemas(v)) if v.is_empty()));
    }

    #[test]
    fn cancellation_before_extraction_short_circuits() {
        let store = StateStore::new();
        let key = StoreKey::new(DatabaseSide::Source, ora2pg_store::ObjectKind::Schemas);
        let cancel = CancelToken::new();
        cancel.cancel();

        let job = ExtractionJob::new(
            "extract-schemas",
            "ExtractSourceSchemas",
            "extracts schemas from the source",
            store,
            key,
            |_sink, _cancel| Ok(vec!["A".to_string()]),
            |names: Vec<String>| Artifact::Schemas(names.into_iter().map(|n| ora2pg_model::Schema::new(n, ora2pg_model::SchemaClass::User)).collect()),
            |items: &[String]| format!("{} schema(s)", items.len()),
        );
        assert!(matches!(job.execute(&crate::progress::NullProgressSink, &cancel), Err(JobError::Cancelled)));
    }
}
