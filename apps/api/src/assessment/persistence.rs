//! Persistence Manager — durable storage of in-progress and completed assessments.
//!
//! Each session uses three well-known keys:
//!   career_assessment:{session_id}:answers
//!   career_assessment:{session_id}:active_step
//!   career_assessment:{session_id}:result
//!
//! `save` writes all three in one atomic batch. `load` never fails: anything it
//! cannot fully parse is logged as corruption and reported as "no saved state".

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::answers::{AnswerStore, Answers};
use super::catalog::{QuestionCatalog, Step};
use super::models::{AssessmentResult, AssessmentState};

const KEY_PREFIX: &str = "career_assessment";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One write in an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    Set { key: String, value: String },
    Remove { key: String },
}

/// Generic string-keyed durable store holding JSON string values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    // Single-key writes; `PersistenceManager` itself only writes in batches.
    #[allow(dead_code)]
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    #[allow(dead_code)]
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Applies every write or none.
    async fn write_batch(&self, writes: Vec<StoreWrite>) -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Backends
// ────────────────────────────────────────────────────────────────────────────

/// Process-local store. Batches are atomic under a single write lock.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn write_batch(&self, writes: Vec<StoreWrite>) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        for write in writes {
            match write {
                StoreWrite::Set { key, value } => {
                    entries.insert(key, value);
                }
                StoreWrite::Remove { key } => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// Redis-backed store. Batches run as MULTI/EXEC.
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        info!("Redis assessment store connected");
        Ok(Self { connection })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn write_batch(&self, writes: Vec<StoreWrite>) -> Result<(), StoreError> {
        if writes.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        pipe.atomic();
        for write in &writes {
            match write {
                StoreWrite::Set { key, value } => {
                    pipe.set(key, value).ignore();
                }
                StoreWrite::Remove { key } => {
                    pipe.del(key).ignore();
                }
            }
        }
        let mut conn = self.connection.clone();
        pipe.query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence Manager
// ────────────────────────────────────────────────────────────────────────────

/// The three well-known keys of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateKeys {
    pub answers: String,
    pub active_step: String,
    pub result: String,
}

impl StateKeys {
    pub fn for_session(session_id: Uuid) -> Self {
        Self {
            answers: format!("{KEY_PREFIX}:{session_id}:answers"),
            active_step: format!("{KEY_PREFIX}:{session_id}:active_step"),
            result: format!("{KEY_PREFIX}:{session_id}:result"),
        }
    }
}

#[derive(Debug, Error)]
enum Corruption {
    #[error("{key} is not valid JSON: {source}")]
    Unparseable {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error("{0} is missing")]
    Missing(&'static str),
    #[error("active step {0} is out of range")]
    StepOutOfRange(usize),
    #[error("answers rejected: {0}")]
    InvalidAnswers(String),
}

#[derive(Clone)]
pub struct PersistenceManager {
    store: std::sync::Arc<dyn KeyValueStore>,
    catalog: QuestionCatalog,
}

impl PersistenceManager {
    pub fn new(store: std::sync::Arc<dyn KeyValueStore>, catalog: QuestionCatalog) -> Self {
        Self { store, catalog }
    }

    /// Writes answers, step and result (or removes a stale result) atomically.
    pub async fn save(&self, session_id: Uuid, state: &AssessmentState) -> Result<(), StoreError> {
        let keys = StateKeys::for_session(session_id);
        let mut writes = vec![
            StoreWrite::Set {
                key: keys.answers,
                value: serde_json::to_string(&state.answers)?,
            },
            StoreWrite::Set {
                key: keys.active_step,
                value: serde_json::to_string(&state.active_step)?,
            },
        ];
        writes.push(match &state.result {
            Some(result) => StoreWrite::Set {
                key: keys.result,
                value: serde_json::to_string(result)?,
            },
            None => StoreWrite::Remove { key: keys.result },
        });
        self.store.write_batch(writes).await?;
        debug!("Saved assessment state for session {session_id}");
        Ok(())
    }

    /// Stores only the completed result, dropping in-progress keys.
    pub async fn save_result_only(
        &self,
        session_id: Uuid,
        result: &AssessmentResult,
    ) -> Result<(), StoreError> {
        let keys = StateKeys::for_session(session_id);
        self.store
            .write_batch(vec![
                StoreWrite::Remove { key: keys.answers },
                StoreWrite::Remove {
                    key: keys.active_step,
                },
                StoreWrite::Set {
                    key: keys.result,
                    value: serde_json::to_string(result)?,
                },
            ])
            .await?;
        Ok(())
    }

    /// Reads back saved state. Missing, partial or malformed data yields `None`.
    pub async fn load(&self, session_id: Uuid) -> Option<AssessmentState> {
        let keys = StateKeys::for_session(session_id);
        let (answers, step, result) = match self.read_raw(&keys).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not read assessment state for session {session_id}: {e}");
                return None;
            }
        };

        if answers.is_none() && step.is_none() && result.is_none() {
            return None;
        }

        match self.decode(answers, step, result) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Discarding corrupt assessment state for session {session_id}: {e}");
                None
            }
        }
    }

    /// Removes every key of the session.
    pub async fn reset(&self, session_id: Uuid) -> Result<(), StoreError> {
        let keys = StateKeys::for_session(session_id);
        self.store
            .write_batch(vec![
                StoreWrite::Remove { key: keys.answers },
                StoreWrite::Remove {
                    key: keys.active_step,
                },
                StoreWrite::Remove { key: keys.result },
            ])
            .await?;
        info!("Cleared persisted assessment state for session {session_id}");
        Ok(())
    }

    async fn read_raw(
        &self,
        keys: &StateKeys,
    ) -> Result<(Option<String>, Option<String>, Option<String>), StoreError> {
        Ok((
            self.store.get(&keys.answers).await?,
            self.store.get(&keys.active_step).await?,
            self.store.get(&keys.result).await?,
        ))
    }

    fn decode(
        &self,
        answers: Option<String>,
        step: Option<String>,
        result: Option<String>,
    ) -> Result<AssessmentState, Corruption> {
        let result: Option<AssessmentResult> = result
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|source| Corruption::Unparseable {
                    key: "result",
                    source,
                })
            })
            .transpose()?;

        // A completed result stands on its own; in-progress keys may have been cleared.
        let completed = result.is_some();

        let answers: Answers = match answers {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| Corruption::Unparseable {
                key: "answers",
                source,
            })?,
            None if completed => Answers::new(),
            None => return Err(Corruption::Missing("answers")),
        };

        let active_step: usize = match step {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| Corruption::Unparseable {
                key: "active_step",
                source,
            })?,
            None if completed => Step::LAST.index(),
            None => return Err(Corruption::Missing("active_step")),
        };
        if Step::from_index(active_step).is_none() {
            return Err(Corruption::StepOutOfRange(active_step));
        }

        let answers = AnswerStore::from_answers(self.catalog, answers)
            .map_err(|e| Corruption::InvalidAnswers(e.to_string()))?
            .snapshot();

        Ok(AssessmentState {
            answers,
            active_step,
            result,
        })
    }
}
