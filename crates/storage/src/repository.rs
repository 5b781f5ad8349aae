use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tipswalk_core::WeekKey;
use tipswalk_core::model::{Trophy, WalkSummary};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted summary together with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSummaryRow {
    pub id: i64,
    pub summary: WalkSummary,
}

impl WalkSummaryRow {
    #[must_use]
    pub fn new(id: i64, summary: WalkSummary) -> Self {
        Self { id, summary }
    }
}

/// Flat key-value store for player profile fields.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Read a single value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[async_trait]
pub trait TrophyRepository: Send + Sync {
    /// Store a trophy. Returns `false` when the week already has one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the trophy cannot be stored.
    async fn award(&self, trophy: &Trophy) -> Result<bool, StorageError>;

    /// All trophies, oldest week first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or mapping failures.
    async fn list_trophies(&self) -> Result<Vec<Trophy>, StorageError>;
}

#[async_trait]
pub trait WalkSummaryRepository: Send + Sync {
    /// Append a finished walk and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the walk was already stored.
    async fn append_summary(&self, summary: &WalkSummary) -> Result<i64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no row has the given id.
    async fn get_summary(&self, id: i64) -> Result<WalkSummary, StorageError>;

    /// Most recently completed walks first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or mapping failures.
    async fn list_summaries(&self, limit: u32) -> Result<Vec<WalkSummaryRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    profile: Arc<Mutex<HashMap<String, String>>>,
    trophies: Arc<Mutex<BTreeMap<WeekKey, Trophy>>>,
    summaries: Arc<Mutex<Vec<WalkSummaryRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: ToString>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.profile.lock().map_err(poisoned)?;
        Ok(guard.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.profile.lock().map_err(poisoned)?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl TrophyRepository for InMemoryRepository {
    async fn award(&self, trophy: &Trophy) -> Result<bool, StorageError> {
        let mut guard = self.trophies.lock().map_err(poisoned)?;
        if guard.contains_key(&trophy.week()) {
            return Ok(false);
        }
        guard.insert(trophy.week(), trophy.clone());
        Ok(true)
    }

    async fn list_trophies(&self) -> Result<Vec<Trophy>, StorageError> {
        let guard = self.trophies.lock().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }
}

#[async_trait]
impl WalkSummaryRepository for InMemoryRepository {
    async fn append_summary(&self, summary: &WalkSummary) -> Result<i64, StorageError> {
        let mut guard = self.summaries.lock().map_err(poisoned)?;
        if guard
            .iter()
            .any(|row| row.summary.walk_id() == summary.walk_id())
        {
            return Err(StorageError::Conflict);
        }
        let id = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("summary id overflow".into()))?
            + 1;
        guard.push(WalkSummaryRow::new(id, summary.clone()));
        Ok(id)
    }

    async fn get_summary(&self, id: i64) -> Result<WalkSummary, StorageError> {
        let guard = self.summaries.lock().map_err(poisoned)?;
        guard
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.summary.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_summaries(&self, limit: u32) -> Result<Vec<WalkSummaryRow>, StorageError> {
        let guard = self.summaries.lock().map_err(poisoned)?;
        let mut rows = guard.clone();
        rows.sort_by(|a, b| {
            b.summary
                .completed_at()
                .cmp(&a.summary.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub profile: Arc<dyn ProfileRepository>,
    pub trophies: Arc<dyn TrophyRepository>,
    pub summaries: Arc<dyn WalkSummaryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let profile: Arc<dyn ProfileRepository> = Arc::new(repo.clone());
        let trophies: Arc<dyn TrophyRepository> = Arc::new(repo.clone());
        let summaries: Arc<dyn WalkSummaryRepository> = Arc::new(repo);
        Self {
            profile,
            trophies,
            summaries,
        }
    }
}
