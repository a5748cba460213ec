//! Semantic-record persistence
//!
//! [`PersistenceAdapter`] exposes CREATE/READ/UPDATE/DELETE/LIST over records
//! keyed by semantic ID, backed by any [`RecordStorage`]. Arguments are
//! validated before the backend is touched. Absence and kind conflicts are
//! reported as `false`/`None`, never as errors.
//!
//! Operations are individually atomic at the storage call level only:
//! concurrent writers to one ID race, and the last `set` wins.
//!
//! With a timeout budget an operation runs as a spawned task. On expiry the
//! caller gets [`AdapterError::Timeout`] while the task keeps running to
//! completion unless it had not yet reached the backend.

pub mod mapping;
pub mod record;
pub mod storage;
pub mod timeout;

pub use mapping::RecordMapper;
pub use record::{PredicateValue, Primitive, Record, RecordError, RecordResult, RESOURCE_TYPE};
pub use storage::{MemoryStorage, RecordStorage};
pub use timeout::{with_timeout, CancelToken, CancelTrigger, TimeoutError};

use crate::rdf::{PrefixMap, QuadStore};
use crate::semantic_id::is_semantic_id;
use record::{ID_KEY, TYPE_KEY};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::debug;

/// Adapter errors
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Malformed argument, rejected before any backend access
    #[error("{operation}: invalid {argument}: {value}")]
    Validation {
        operation: &'static str,
        argument: &'static str,
        value: String,
    },

    /// Budget elapsed; the underlying work may still complete
    #[error("{operation} timed out after {budget:?}")]
    Timeout {
        operation: &'static str,
        budget: Duration,
    },

    /// Spawned operation panicked or was aborted
    #[error("{operation} failed: {source}")]
    TaskFailed {
        operation: &'static str,
        #[source]
        source: JoinError,
    },
}

impl AdapterError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AdapterError::Timeout { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AdapterError::Validation { .. })
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;

/// Adapter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Budget for every operation in milliseconds; `None` runs inline
    pub default_timeout_ms: Option<u64>,
}

impl AdapterConfig {
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_ms.map(Duration::from_millis)
    }
}

fn invalid(operation: &'static str, argument: &'static str, value: impl fmt::Display) -> AdapterError {
    AdapterError::Validation {
        operation,
        argument,
        value: value.to_string(),
    }
}

fn check_id(operation: &'static str, argument: &'static str, value: &str) -> AdapterResult<()> {
    if is_semantic_id(value) {
        Ok(())
    } else {
        Err(invalid(operation, argument, format!("{:?}", value)))
    }
}

fn check_key(operation: &'static str, key: &str) -> AdapterResult<()> {
    if key.is_empty() {
        Err(invalid(operation, "key", "\"\""))
    } else {
        Ok(())
    }
}

fn check_primitive(operation: &'static str, value: Value) -> AdapterResult<Primitive> {
    Primitive::try_from(value).map_err(|e| match e {
        RecordError::NotPrimitive(v) => invalid(operation, "value", v),
        other => invalid(operation, "value", other),
    })
}

/// CRUD surface over semantic records
#[derive(Clone)]
pub struct PersistenceAdapter {
    storage: Arc<dyn RecordStorage>,
    timeout: Option<Duration>,
}

impl fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl PersistenceAdapter {
    pub fn new(storage: Arc<dyn RecordStorage>, config: &AdapterConfig) -> Self {
        Self {
            storage,
            timeout: config.default_timeout(),
        }
    }

    /// Adapter over a fresh [`MemoryStorage`] without a timeout
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), &AdapterConfig::default())
    }

    /// Same backend, every operation bounded by `budget`
    pub fn with_timeout(&self, budget: Duration) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            timeout: Some(budget),
        }
    }

    /// Same backend, operations run inline
    pub fn without_timeout(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            timeout: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn storage(&self) -> &Arc<dyn RecordStorage> {
        &self.storage
    }

    async fn run<T, F>(&self, operation: &'static str, work: F) -> AdapterResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn RecordStorage) -> T + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        let Some(budget) = self.timeout else {
            return Ok(work(storage.as_ref()));
        };

        let outcome = with_timeout(
            move |token| async move {
                if token.is_cancelled() {
                    debug!("{} cancelled before reaching storage", operation);
                    return None;
                }
                Some(work(storage.as_ref()))
            },
            budget,
        )
        .await;

        match outcome {
            Ok(Some(value)) => Ok(value),
            Ok(None) | Err(TimeoutError::Elapsed(_)) => Err(AdapterError::Timeout { operation, budget }),
            Err(TimeoutError::Join(source)) => Err(AdapterError::TaskFailed { operation, source }),
        }
    }

    /// EXIST(id)
    pub async fn exist(&self, id: &str) -> AdapterResult<bool> {
        check_id("EXIST", "id", id)?;
        let id = id.to_string();
        self.run("EXIST", move |s| s.has(&id)).await
    }

    /// CREATE(id): insert `{@id, @type: [rdfs:Resource]}` unless present
    pub async fn create(&self, id: &str) -> AdapterResult<bool> {
        check_id("CREATE", "id", id)?;
        let id = id.to_string();
        self.run("CREATE", move |s| {
            if s.has(&id) {
                return false;
            }
            s.set(&id, Record::new(id.as_str()));
            debug!("Created record {}", id);
            true
        })
        .await
    }

    /// READ(id): a deep copy of the record
    pub async fn read(&self, id: &str) -> AdapterResult<Option<Record>> {
        check_id("READ", "id", id)?;
        let id = id.to_string();
        self.run("READ", move |s| s.get(&id)).await
    }

    /// READ(id, key). `@type` reads as the edge set of types.
    ///
    /// `None` when the record or the key is absent.
    pub async fn read_key(&self, id: &str, key: &str) -> AdapterResult<Option<PredicateValue>> {
        check_id("READ", "id", id)?;
        check_key("READ", key)?;
        let (id, key) = (id.to_string(), key.to_string());
        self.run("READ", move |s| s.get(&id).and_then(|r| r.value(&key)))
            .await
    }

    /// READ(id, [keys]): values in key order, `None` when the record is absent
    pub async fn read_keys<K: AsRef<str>>(
        &self,
        id: &str,
        keys: &[K],
    ) -> AdapterResult<Option<Vec<Option<PredicateValue>>>> {
        check_id("READ", "id", id)?;
        let keys = keys
            .iter()
            .map(|k| {
                check_key("READ", k.as_ref())?;
                Ok(k.as_ref().to_string())
            })
            .collect::<AdapterResult<Vec<_>>>()?;
        let id = id.to_string();
        self.run("READ", move |s| {
            s.get(&id)
                .map(|record| keys.iter().map(|k| record.value(k)).collect())
        })
        .await
    }

    /// UPDATE(id, "@type", types): union into the type set
    pub async fn update_types<T: AsRef<str>>(&self, id: &str, types: &[T]) -> AdapterResult<bool> {
        check_id("UPDATE", "id", id)?;
        let types = types
            .iter()
            .map(|t| {
                check_id("UPDATE", "@type", t.as_ref())?;
                Ok(t.as_ref().to_string())
            })
            .collect::<AdapterResult<Vec<_>>>()?;
        let id = id.to_string();
        self.run("UPDATE", move |s| {
            let Some(mut record) = s.get(&id) else {
                return false;
            };
            record.add_types(types);
            s.set(&id, record);
            true
        })
        .await
    }

    /// UPDATE(id, predicate, object): add `object` to the edge set.
    ///
    /// `false` if the record is absent or `predicate` holds a literal.
    pub async fn update_edge(&self, id: &str, predicate: &str, object: &str) -> AdapterResult<bool> {
        check_id("UPDATE", "id", id)?;
        check_id("UPDATE", "predicate", predicate)?;
        check_id("UPDATE", "object", object)?;
        let (id, predicate, object) = (id.to_string(), predicate.to_string(), object.to_string());
        self.run("UPDATE", move |s| insert_edge(s, &id, &predicate, &object))
            .await
    }

    /// UPDATE(id, key, primitive): overwrite the literal under `key`.
    ///
    /// `false` if the record is absent or `key` holds an edge set.
    pub async fn update_literal(&self, id: &str, key: &str, value: Value) -> AdapterResult<bool> {
        check_id("UPDATE", "id", id)?;
        check_key("UPDATE", key)?;
        if key == ID_KEY || key == TYPE_KEY {
            return Err(invalid("UPDATE", "key", key));
        }
        let value = check_primitive("UPDATE", value)?;
        let (id, key) = (id.to_string(), key.to_string());
        self.run("UPDATE", move |s| {
            let Some(mut record) = s.get(&id) else {
                return false;
            };
            if !record.set_literal(&key, value) {
                debug!("Refusing literal on edge key {} of {}", key, id);
                return false;
            }
            s.set(&id, record);
            true
        })
        .await
    }

    /// UPDATE(id, key, value) dispatching on the value:
    /// - `@type` takes a type or an array of types
    /// - a string that is a semantic ID is an edge target when the key is a
    ///   semantic ID; under any other key it is stored as a literal only if
    ///   the key is still unset, otherwise `false`
    /// - anything else must be a primitive literal
    pub async fn update(&self, id: &str, key: &str, value: Value) -> AdapterResult<bool> {
        check_id("UPDATE", "id", id)?;
        check_key("UPDATE", key)?;
        match key {
            ID_KEY => Err(invalid("UPDATE", "key", key)),
            TYPE_KEY => {
                let types: Vec<String> = match value {
                    Value::String(t) => vec![t],
                    Value::Array(items) => items
                        .iter()
                        .map(|t| t.as_str().map(str::to_string))
                        .collect::<Option<_>>()
                        .ok_or_else(|| invalid("UPDATE", "@type", Value::Array(items.clone())))?,
                    other => return Err(invalid("UPDATE", "@type", other)),
                };
                self.update_types(id, &types).await
            }
            _ => match value {
                Value::String(target) if is_semantic_id(&target) => {
                    if is_semantic_id(key) {
                        return self.update_edge(id, key, &target).await;
                    }
                    let (id, key) = (id.to_string(), key.to_string());
                    self.run("UPDATE", move |s| {
                        let Some(mut record) = s.get(&id) else {
                            return false;
                        };
                        if record.get(&key).is_some() {
                            debug!("Edge target {} under literal key {} of {} ignored", target, key, id);
                            return false;
                        }
                        record.set_literal(&key, Primitive::String(target));
                        s.set(&id, record);
                        true
                    })
                    .await
                }
                other => self.update_literal(id, key, other).await,
            },
        }
    }

    /// DELETE(id): remove the whole record
    pub async fn delete(&self, id: &str) -> AdapterResult<bool> {
        check_id("DELETE", "id", id)?;
        let id = id.to_string();
        self.run("DELETE", move |s| s.delete(&id)).await
    }

    /// DELETE(id, predicate, object): remove one edge; true if it was present
    pub async fn delete_edge(&self, id: &str, predicate: &str, object: &str) -> AdapterResult<bool> {
        check_id("DELETE", "id", id)?;
        check_id("DELETE", "predicate", predicate)?;
        check_id("DELETE", "object", object)?;
        let (id, predicate, object) = (id.to_string(), predicate.to_string(), object.to_string());
        self.run("DELETE", move |s| {
            let Some(mut record) = s.get(&id) else {
                return false;
            };
            if !record.remove_edge(&predicate, &object) {
                return false;
            }
            s.set(&id, record);
            true
        })
        .await
    }

    /// LIST(id, predicate): edge targets in insertion order; `None` if the
    /// record is absent or the key is not an edge set
    pub async fn list(&self, id: &str, predicate: &str) -> AdapterResult<Option<Vec<String>>> {
        check_id("LIST", "id", id)?;
        check_id("LIST", "predicate", predicate)?;
        let (id, predicate) = (id.to_string(), predicate.to_string());
        self.run("LIST", move |s| {
            s.get(&id).and_then(|record| {
                record
                    .get(&predicate)
                    .and_then(PredicateValue::as_edges)
                    .map(|edges| edges.iter().cloned().collect())
            })
        })
        .await
    }

    /// Every record as quads, IDs expanded through `prefixes`
    pub async fn export_quads(&self, prefixes: &PrefixMap) -> AdapterResult<QuadStore> {
        let prefixes = prefixes.clone();
        self.run("EXPORT", move |s| {
            let records = s.records();
            let store = RecordMapper::new(&prefixes).to_quads(&records);
            debug!("Exported {} records as {} quads", records.len(), store.len());
            store
        })
        .await
    }
}

fn insert_edge(storage: &dyn RecordStorage, id: &str, predicate: &str, object: &str) -> bool {
    let Some(mut record) = storage.get(id) else {
        return false;
    };
    if !record.insert_edge(predicate, object) {
        debug!("Refusing edge on literal key {} of {}", predicate, id);
        return false;
    }
    storage.set(id, record);
    true
}
