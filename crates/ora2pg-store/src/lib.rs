//! Process-wide state store: the single shared surface through which
//! extraction jobs publish metadata and write jobs consume it.
//!
//! Keyed by `(DatabaseSide, ObjectKind)`. A single reader-writer discipline
//! applies per key: many concurrent readers, at most one writer. Every read
//! returns a deep copy, so callers can never observe — let alone corrupt —
//! shared state after hand-off. Subscribers run synchronously inside the
//! writer's critical section, in registration order, and a subscriber that
//! errors is logged and skipped; it neither rolls back the write nor stops
//! later subscribers from running.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ora2pg_model::{
    ConstraintMetadata, FunctionMetadata, ObjectDataType, ProcedureMetadata, Schema, TableMetadata,
    ViewMetadata, WriteResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseSide {
    Source,
    Target,
}

/// The object kind half of a store key. `Result(stage)` keys are produced
/// per pipeline stage (e.g. `"CreateTargetTables"`) and are never replaced
/// once written — each stage has its own unique key, so "append only" at
/// the store level falls out of "each write uses a fresh key".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Schemas,
    ObjectTypes,
    Tables,
    Constraints,
    Views,
    Functions,
    Procedures,
    Result(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub side: DatabaseSide,
    pub kind: ObjectKind,
}

impl StoreKey {
    pub fn new(side: DatabaseSide, kind: ObjectKind) -> Self {
        Self { side, kind }
    }
}

/// The value half of an entry. One variant per kind of artifact the
/// pipeline ever produces.
#[derive(Debug, Clone)]
pub enum Artifact {
    Schemas(Vec<Schema>),
    ObjectTypes(Vec<ObjectDataType>),
    Tables(Vec<TableMetadata>),
    Constraints(Vec<ConstraintMetadata>),
    Views(Vec<ViewMetadata>),
    Functions(Vec<FunctionMetadata>),
    Procedures(Vec<ProcedureMetadata>),
    Result(WriteResult),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state store lock was poisoned by a panicking holder")]
    Poisoned,
}

/// A subscriber notified synchronously after a successful `put`. Errors
/// returned from `on_put` are logged and swallowed — see module docs.
pub trait Observer: Send + Sync {
    fn on_put(&self, key: &StoreKey, value: &Artifact) -> Result<(), String>;
}

struct Entry {
    /// `None` until the first `put` — a key that only exists because
    /// something `subscribe`d to it before any writer published to it.
    value: Option<Artifact>,
    observers: Vec<Arc<dyn Observer>>,
}

/// The process-wide store. Cheap to clone (an `Arc` internally), so it can
/// be handed to every job without lifetime gymnastics.
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<RwLock<HashMap<StoreKey, Entry>>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Replace the artifact at `key`, then notify subscribers registered
    /// for that key, in registration order, swallowing individual errors.
    pub fn put(&self, key: StoreKey, value: Artifact) -> Result<(), StoreError> {
        let mut guard = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let observers = guard.get(&key).map(|e| e.observers.clone()).unwrap_or_default();
        guard.insert(
            key.clone(),
            Entry { value: Some(value.clone()), observers: observers.clone() },
        );
        // Run observers while still holding the write lock so subscribers
        // observe the update before the writer releases the lock, and
        // updates to a given key stay totally ordered.
        for obs in &observers {
            if let Err(e) = obs.on_put(&key, &value) {
                tracing::warn!(target: "ora2pg_store", key = ?key, error = %e, "state store observer failed; continuing");
            }
        }
        Ok(())
    }

    /// A deep copy of the current value at `key`, or `None` if nothing has
    /// been published there yet.
    pub fn get(&self, key: &StoreKey) -> Result<Option<Artifact>, StoreError> {
        let guard = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.get(key).and_then(|e| e.value.clone()))
    }

    /// Register `observer` to be run (synchronously, inside the writer's
    /// critical section) after every future `put` at `key`. Registering does
    /// not retroactively fire for the current value, and does not make
    /// `get` return `Some` before a real `put` happens.
    pub fn subscribe(&self, key: StoreKey, observer: Arc<dyn Observer>) -> Result<(), StoreError> {
        let mut guard = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        guard.entry(key).or_insert_with(|| Entry { value: None, observers: Vec::new() }).observers.push(observer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver {
        hits: Arc<AtomicUsize>,
    }

    impl Observer for CountingObserver {
        fn on_put(&self, _key: &StoreKey, _value: &Artifact) -> Result<(), String> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingObserver;

    impl Observer for FailingObserver {
        fn on_put(&self, _key: &StoreKey, _value: &Artifact) -> Result<(), String> {
            Err("boom".into())
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = StateStore::new();
        let key = StoreKey::new(DatabaseSide::Source, ObjectKind::Schemas);
        store.put(key.clone(), Artifact::Schemas(vec![])).unwrap();
        assert!(matches!(store.get(&key).unwrap(), Some(Artifact::Schemas(v)) if v.is_empty()));
    }

    #[test]
    fn get_on_absent_key_is_none() {
        let store = StateStore::new();
        let key = StoreKey::new(DatabaseSide::Target, ObjectKind::Tables);
        assert!(store.get(&key).unwrap().is_none());
    }

    #[test]
    fn observer_runs_on_put_and_failure_does_not_block_others() {
        let store = StateStore::new();
        let key = StoreKey::new(DatabaseSide::Source, ObjectKind::Tables);
        let hits = Arc::new(AtomicUsize::new(0));
        store.subscribe(key.clone(), Arc::new(FailingObserver)).unwrap();
        store
            .subscribe(key.clone(), Arc::new(CountingObserver { hits: hits.clone() }))
            .unwrap();
        store.put(key, Artifact::Tables(vec![])).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscribing_to_an_unwritten_key_does_not_fabricate_a_value() {
        let store = StateStore::new();
        let key = StoreKey::new(DatabaseSide::Source, ObjectKind::Tables);
        let hits = Arc::new(AtomicUsize::new(0));
        store.subscribe(key.clone(), Arc::new(CountingObserver { hits })).unwrap();
        assert!(store.get(&key).unwrap().is_none());
    }

    #[test]
    fn later_put_replaces_earlier_value() {
        let store = StateStore::new();
        let key = StoreKey::new(DatabaseSide::Source, ObjectKind::Schemas);
        store
            .put(key.clone(), Artifact::Schemas(vec![Schema::new("A", ora2pg_model::SchemaClass::User)]))
            .unwrap();
        store.put(key.clone(), Artifact::Schemas(vec![])).unwrap();
        assert!(matches!(store.get(&key).unwrap(), Some(Artifact::Schemas(v)) if v.is_empty()));
    }
}
