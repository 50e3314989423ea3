use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::{
    errors::StoreError,
    keys::{CollectionPath, DocPath},
    store::{Document, DocumentStore, Query, Write, WriteBatch, format_timestamp},
};

/// Failure a [`MemoryStore`] can be told to raise for a path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    PermissionDenied,
    IndexMissing,
    Unavailable,
}

impl InjectedFailure {
    fn to_error(self, path: &str) -> StoreError {
        match self {
            InjectedFailure::PermissionDenied => StoreError::PermissionDenied {
                message: format!("Missing or insufficient permissions for {path}"),
            },
            InjectedFailure::IndexMissing => StoreError::IndexMissing {
                message: format!("The query on {path} requires an index"),
            },
            InjectedFailure::Unavailable => StoreError::Unavailable {
                message: format!("backend unreachable while accessing {path}"),
            },
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: BTreeMap<String, Map<String, Value>>,
    last_commit_micros: i64,
    failures: Vec<(String, InjectedFailure)>,
}

impl MemoryState {
    fn check(&self, path: &str) -> Result<(), StoreError> {
        match self.failures.iter().find(|(prefix, _)| path.starts_with(prefix.as_str())) {
            Some((_, failure)) => Err(failure.to_error(path)),
            None => Ok(()),
        }
    }

    /// Commit timestamps strictly increase so ordering by `createdAt` is total.
    fn next_timestamp(&mut self) -> String {
        let now = Utc::now().timestamp_micros();
        let next = now.max(self.last_commit_micros + 1);
        self.last_commit_micros = next;
        let stamp = DateTime::<Utc>::from_timestamp_micros(next).unwrap_or_else(Utc::now);
        format_timestamp(stamp)
    }

    fn collection_docs(&self, collection: &CollectionPath) -> Vec<Document> {
        let prefix = format!("{collection}/");
        self.documents
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter(|(path, _)| !path[prefix.len()..].contains('/'))
            .map(|(path, fields)| Document::new(collection.doc(&path[prefix.len()..]), fields.clone()))
            .collect()
    }
}

/// In-process document store for tests and local runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes every read and write touching `prefix` fail with `failure`.
    pub fn fail_path(&self, prefix: impl Into<String>, failure: InjectedFailure) {
        self.lock().failures.push((prefix.into(), failure));
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Total number of stored documents.
    pub fn len(&self) -> usize {
        self.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of documents whose path starts with `prefix`.
    pub fn count_under(&self, prefix: &str) -> usize {
        self.lock().documents.keys().filter(|path| path.starts_with(prefix)).count()
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let state = self.lock();
        state.check(path.as_str())?;
        Ok(state
            .documents
            .get(path.as_str())
            .map(|fields| Document::new(path.clone(), fields.clone())))
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        query.validate()?;
        let state = self.lock();
        state.check(query.collection.as_str())?;
        Ok(query.apply(state.collection_docs(&query.collection)))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut state = self.lock();

        for write in batch.writes() {
            state.check(write.path().as_str())?;
            if let Write::Update { path, .. } = write
                && !state.documents.contains_key(path.as_str())
            {
                return Err(StoreError::NotFound { path: path.to_string() });
            }
        }

        let timestamp = state.next_timestamp();
        for write in batch.into_writes() {
            match write {
                Write::Set { path, fields } => {
                    state.documents.insert(path.to_string(), fields.resolve(&timestamp));
                }
                Write::Merge { path, fields } | Write::Update { path, fields } => {
                    let entry = state.documents.entry(path.to_string()).or_default();
                    entry.extend(fields.resolve(&timestamp));
                }
                Write::Delete { path } => {
                    state.documents.remove(path.as_str());
                }
            }
        }
        Ok(())
    }
}
