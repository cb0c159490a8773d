use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::envelope::ResponseEnvelope;
use crate::errors::PipelineError;
use crate::event::{first_object, ObjectRef, S3Event};
use crate::extraction::Extractor;
use crate::fetcher::DocumentFetcher;
use crate::models::candidate::CandidateRecord;
use crate::store::{store_analysis, ResultStore};

/// Where a run currently is. `Failed` is reachable from every stage before
/// `Stored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Fetched,
    Extracted,
    Stored,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Fetched => "fetched",
            PipelineStage::Extracted => "extracted",
            PipelineStage::Stored => "stored",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Progress of one run, kept outside the run future so it survives a timeout.
#[derive(Debug)]
struct RunTrace {
    stage: PipelineStage,
    object: Option<ObjectRef>,
}

impl RunTrace {
    fn advance(&mut self, to: PipelineStage) {
        debug!("Pipeline stage {} -> {}", self.stage, to);
        self.stage = to;
    }
}

/// Fetch, extract, store. One instance serves every event; a run owns nothing
/// beyond its own event.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Extractor,
    store: Arc<dyn ResultStore>,
    expected_bucket: Option<String>,
    timeout: Duration,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        extractor: Extractor,
        store: Arc<dyn ResultStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
            expected_bucket: None,
            timeout,
        }
    }

    /// Events from any other bucket are still processed, with a warning.
    pub fn with_expected_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.expected_bucket = Some(bucket.into());
        self
    }

    /// Runs the event to completion and translates the outcome into an envelope.
    pub async fn process(&self, event: &S3Event) -> ResponseEnvelope {
        let envelope = match self.run(event).await {
            Ok(record) => ResponseEnvelope::success(record),
            Err(err) => ResponseEnvelope::failure(&err),
        };
        if envelope.is_success() {
            info!("CV processed successfully");
        }
        envelope
    }

    /// Like `process`, but hands back the error instead of an envelope.
    pub async fn run(&self, event: &S3Event) -> Result<CandidateRecord, PipelineError> {
        let mut trace = RunTrace {
            stage: PipelineStage::Received,
            object: None,
        };

        let outcome = match tokio::time::timeout(self.timeout, self.run_stages(event, &mut trace))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout(self.timeout)),
        };

        if let Err(err) = &outcome {
            let failed_at = trace.stage;
            trace.advance(PipelineStage::Failed);
            let (bucket, key) = trace
                .object
                .as_ref()
                .map(|o| (o.bucket.as_str(), o.key.as_str()))
                .unwrap_or(("-", "-"));
            error!(
                stage = %failed_at,
                kind = err.kind(),
                bucket,
                key,
                "CV pipeline failed: {err}"
            );
        }
        outcome
    }

    async fn run_stages(
        &self,
        event: &S3Event,
        trace: &mut RunTrace,
    ) -> Result<CandidateRecord, PipelineError> {
        let object = first_object(event)?;
        trace.object = Some(object.clone());
        info!("Received s3://{}/{}", object.bucket, object.key);

        if let Some(expected) = &self.expected_bucket {
            if expected != &object.bucket {
                warn!(
                    "Event bucket '{}' differs from configured bucket '{}'",
                    object.bucket, expected
                );
            }
        }

        let document = self.fetcher.fetch(&object.bucket, &object.key).await?;
        trace.advance(PipelineStage::Fetched);
        info!("Fetched {} bytes from s3://{}/{}", document.len(), object.bucket, object.key);

        let record = self.extractor.extract(&document).await?;
        trace.advance(PipelineStage::Extracted);
        info!(
            "Extracted CV data for '{}' with {}",
            object.key,
            self.extractor.model_id()
        );

        store_analysis(self.store.as_ref(), &object.key, &record).await?;
        trace.advance(PipelineStage::Stored);

        Ok(record)
    }
}
