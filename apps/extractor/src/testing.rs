//! In-memory stand-ins for the pipeline's collaborators. Test builds only.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::extraction::{ExtractionModel, ModelError, ModelReply, ModelRequest};
use crate::fetcher::{DocumentFetcher, RetrievalError};
use crate::models::analysis::StoredAnalysis;
use crate::store::{PersistenceError, ResultStore};

/// Owned copy of a `ModelRequest`.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub document: Vec<u8>,
    pub document_name: String,
    pub prompt: String,
    pub tool_name: String,
}

/// Answers every call with the same scripted outcome.
pub struct ScriptedModel {
    outcome: Result<ModelReply, ModelError>,
    calls: AtomicUsize,
    last: Mutex<Option<Recorded>>,
}

impl ScriptedModel {
    pub fn replying(reply: ModelReply) -> Self {
        Self::with_outcome(Ok(reply))
    }

    pub fn failing(error: ModelError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<ModelReply, ModelError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<Recorded> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtractionModel for ScriptedModel {
    fn model_id(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, request: ModelRequest<'_>) -> Result<ModelReply, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(Recorded {
            document: request.document.to_vec(),
            document_name: request.document_name.to_string(),
            prompt: request.prompt.to_string(),
            tool_name: request.tool.name.to_string(),
        });
        self.outcome.clone()
    }
}

/// Serves objects from a map keyed by `(bucket, key)`.
#[derive(Default)]
pub struct MemoryFetcher {
    objects: HashMap<(String, String), Bytes>,
    delay: Option<Duration>,
    requested: Mutex<Vec<(String, String)>>,
}

impl MemoryFetcher {
    pub fn with_object(mut self, bucket: &str, key: &str, body: &'static [u8]) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), Bytes::from_static(body));
        self
    }

    /// Sleeps before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn requested(&self) -> Vec<(String, String)> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for MemoryFetcher {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes, RetrievalError> {
        self.requested
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| RetrievalError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}

/// Collects written analyses, or rejects every write with a fixed message.
#[derive(Default)]
pub struct MemoryStore {
    failure: Option<String>,
    calls: AtomicUsize,
    written: Mutex<Vec<StoredAnalysis>>,
}

impl MemoryStore {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> Vec<StoredAnalysis> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    fn table(&self) -> &str {
        "memory"
    }

    async fn put(&self, analysis: &StoredAnalysis) -> Result<(), PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(PersistenceError::Write {
                table: self.table().to_string(),
                message: message.clone(),
            });
        }
        self.written.lock().unwrap().push(analysis.clone());
        Ok(())
    }
}
