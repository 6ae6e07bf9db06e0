//! Reading progress persistence.
//!
//! Checkpoints are keyed by document id and stored as
//! `{"currentSectionIndex": n, "status": "in_progress"}`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;

use super::config::PersistenceSettings;
use crate::reading::{Checkpoint, DocumentId, SavedProgress};

/// Errors talking to the progress store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersistenceError {
    #[error("Progress store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Progress API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Trait for reading progress backends
pub trait ProgressStore: Send + Sync {
    /// Saved progress for a document, `None` when there is none.
    fn fetch(
        &self,
        document_id: &DocumentId,
    ) -> impl std::future::Future<Output = Result<Option<SavedProgress>, PersistenceError>> + Send;

    /// Store a checkpoint, replacing any earlier one.
    fn save(
        &self,
        document_id: &DocumentId,
        checkpoint: Checkpoint,
    ) -> impl std::future::Future<Output = Result<(), PersistenceError>> + Send;
}

/// Progress store backed by the reading progress HTTP API.
pub struct HttpProgressStore {
    /// HTTP client
    http: reqwest::Client,
    /// Base URL, without a trailing slash
    base_url: String,
}

impl HttpProgressStore {
    /// Create a store for `base_url`; requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PersistenceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PersistenceError::Network(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::info!("Progress store at {}", base_url);

        Ok(Self { http, base_url })
    }

    pub fn from_settings(settings: &PersistenceSettings) -> Result<Self, PersistenceError> {
        Self::new(settings.base_url.clone(), settings.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn progress_url(&self, document_id: &DocumentId) -> String {
        format!("{}/progress/{}", self.base_url, document_id)
    }
}

fn request_error(e: reqwest::Error) -> PersistenceError {
    if e.is_decode() {
        PersistenceError::Serialization(e.to_string())
    } else {
        PersistenceError::Network(e.to_string())
    }
}

async fn api_error(response: reqwest::Response) -> PersistenceError {
    let status = response.status();
    let message = response
        .text()
        .await
        .ok()
        .filter(|body| !body.trim().is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

    PersistenceError::Api {
        status: status.as_u16(),
        message,
    }
}

impl ProgressStore for HttpProgressStore {
    async fn fetch(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<SavedProgress>, PersistenceError> {
        let response = self
            .http
            .get(self.progress_url(document_id))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::NO_CONTENT {
            tracing::debug!("No saved progress for {}", document_id);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        let body = response.text().await.map_err(request_error)?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }

        let saved: SavedProgress = serde_json::from_str(&body)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        tracing::debug!(
            "Fetched progress for {}: section {}",
            document_id,
            saved.current_section_index
        );
        Ok(Some(saved))
    }

    async fn save(
        &self,
        document_id: &DocumentId,
        checkpoint: Checkpoint,
    ) -> Result<(), PersistenceError> {
        let response = self
            .http
            .post(self.progress_url(document_id))
            .json(&checkpoint)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        tracing::debug!(
            "Saved progress for {}: section {} ({})",
            document_id,
            checkpoint.current_section_index,
            checkpoint.status
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    checkpoints: HashMap<DocumentId, SavedProgress>,
    saves: Vec<(DocumentId, Checkpoint)>,
}

/// In-memory progress store.
///
/// Clones share state. Can be switched offline to make every call fail, and
/// given a latency to exercise timeouts.
#[derive(Debug, Clone)]
pub struct MemoryProgressStore {
    state: Arc<Mutex<MemoryState>>,
    online: Arc<AtomicBool>,
    latency: Option<Duration>,
}

impl Default for MemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            online: Arc::new(AtomicBool::new(true)),
            latency: None,
        }
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    /// Set online status. Offline calls fail with a network error.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }

    /// Seed saved progress without recording a save.
    pub async fn insert(&self, document_id: impl Into<DocumentId>, saved: SavedProgress) {
        self.state
            .lock()
            .await
            .checkpoints
            .insert(document_id.into(), saved);
    }

    pub async fn get(&self, document_id: &DocumentId) -> Option<SavedProgress> {
        self.state.lock().await.checkpoints.get(document_id).copied()
    }

    /// Every successful save, oldest first.
    pub async fn saves(&self) -> Vec<(DocumentId, Checkpoint)> {
        self.state.lock().await.saves.clone()
    }

    /// Successful saves for one document, oldest first.
    pub async fn saves_for(&self, document_id: &DocumentId) -> Vec<Checkpoint> {
        self.state
            .lock()
            .await
            .saves
            .iter()
            .filter(|(id, _)| id == document_id)
            .map(|(_, checkpoint)| *checkpoint)
            .collect()
    }

    async fn simulate_call(&self) -> Result<(), PersistenceError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if !self.is_online() {
            return Err(PersistenceError::Network("progress store offline".to_string()));
        }
        Ok(())
    }
}

impl ProgressStore for MemoryProgressStore {
    async fn fetch(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<SavedProgress>, PersistenceError> {
        self.simulate_call().await?;
        Ok(self.get(document_id).await)
    }

    async fn save(
        &self,
        document_id: &DocumentId,
        checkpoint: Checkpoint,
    ) -> Result<(), PersistenceError> {
        self.simulate_call().await?;

        let mut state = self.state.lock().await;
        state
            .checkpoints
            .insert(document_id.clone(), SavedProgress::from(checkpoint));
        state.saves.push((document_id.clone(), checkpoint));
        Ok(())
    }
}
