use std::sync::LazyLock;

use chrono::Utc;
use redis::{AsyncCommands, Script, aio::ConnectionManager};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    errors::StoreError,
    keys::{DocPath, KeyContext},
    store::{Document, DocumentStore, Query, Write, WriteBatch, format_timestamp},
};

pub const BATCH_COMMIT_SCRIPT_BODY: &str = include_str!("../../lua/batch_commit.lua");

pub static BATCH_COMMIT_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(BATCH_COMMIT_SCRIPT_BODY));

#[derive(Debug, Serialize)]
struct CommitPayload {
    writes: Vec<WritePayload>,
}

#[derive(Debug, Serialize)]
struct WritePayload {
    op: &'static str,
    key: String,
    collection_key: String,
    id: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

/// Document store backed by Redis.
///
/// Each document is a JSON string under `{prefix}:doc:{path}`; each
/// collection keeps a set of member ids under `{prefix}:col:{path}`. Batches
/// run inside one Lua script, so they are applied atomically. Queries load
/// the collection and evaluate filters locally.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn, prefix))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Clone of the connection manager for advanced operations.
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    fn keys(&self) -> KeyContext<'_> {
        KeyContext::new(&self.prefix)
    }

    /// Deletes every key in this store's namespace.
    ///
    /// Uses SCAN + DEL so Redis is not blocked on large namespaces.
    pub async fn cleanup(&self) -> Result<u64, StoreError> {
        const SCAN_COUNT: usize = 1000;
        let mut conn = self.conn.clone();
        let pattern = self.keys().namespace_pattern();
        let mut cursor: u64 = 0;
        let mut total_deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let deleted: u64 = redis::cmd("DEL").arg(&keys).query_async(&mut conn).await?;
                total_deleted += deleted;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(total_deleted)
    }

    fn decode(path: DocPath, raw: &str) -> Result<Document, StoreError> {
        let fields: Map<String, Value> = serde_json::from_str(raw)?;
        Ok(Document::new(path, fields))
    }

    fn write_payload(&self, write: Write, timestamp: &str) -> Result<WritePayload, StoreError> {
        let keys = self.keys();
        let (op, path, data) = match write {
            Write::Set { path, fields } => ("set", path, Some(fields.resolve(timestamp))),
            Write::Merge { path, fields } => ("merge", path, Some(fields.resolve(timestamp))),
            Write::Update { path, fields } => ("update", path, Some(fields.resolve(timestamp))),
            Write::Delete { path } => ("delete", path, None),
        };
        let data = match data {
            Some(fields) => Some(serde_json::to_string(&Value::Object(fields))?),
            None => None,
        };
        Ok(WritePayload {
            op,
            key: keys.document(&path),
            collection_key: keys.collection(&path.parent()),
            id: path.id().to_string(),
            path: path.to_string(),
            data,
        })
    }
}

impl DocumentStore for RedisStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let mut conn = self.conn.clone();
        let raw = conn.get::<_, Option<String>>(self.keys().document(path)).await?;
        raw.map(|raw| Self::decode(path.clone(), &raw)).transpose()
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        query.validate()?;
        let mut conn = self.conn.clone();
        let keys = self.keys();

        let mut ids = match query.id_lookup() {
            Some(ids) => ids,
            None => conn.smembers::<_, Vec<String>>(keys.collection(&query.collection)).await?,
        };
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        ids.sort();
        ids.dedup();

        let paths: Vec<DocPath> = ids.iter().map(|id| query.collection.doc(id)).collect();
        let redis_keys: Vec<String> = paths.iter().map(|path| keys.document(path)).collect();
        let raws: Vec<Option<String>> = redis::cmd("MGET").arg(&redis_keys).query_async(&mut conn).await?;

        let mut docs = Vec::with_capacity(raws.len());
        for (path, raw) in paths.into_iter().zip(raws) {
            if let Some(raw) = raw {
                docs.push(Self::decode(path, &raw)?);
            }
        }
        Ok(query.apply(docs))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let timestamp = format_timestamp(Utc::now());
        let writes = batch
            .into_writes()
            .into_iter()
            .map(|write| self.write_payload(write, &timestamp))
            .collect::<Result<Vec<_>, _>>()?;
        let payload = serde_json::to_string(&CommitPayload { writes })?;

        let mut conn = self.conn.clone();
        let mut invocation = BATCH_COMMIT_SCRIPT.prepare_invoke();
        invocation.arg(payload);
        let raw: String = invocation.invoke_async(&mut conn).await?;

        let response: Value = serde_json::from_str(&raw)?;
        match response.get("error").and_then(Value::as_str) {
            Some("not_found") => Err(StoreError::NotFound {
                path: response
                    .get("path")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            Some(other) => Err(StoreError::Unavailable {
                message: format!("batch script failed: {other}"),
            }),
            None => Ok(()),
        }
    }
}
