//! In-process de-identification service.
//!
//! Lifecycle: `Uninitialized → Loading → Ready | Error`. The model is loaded
//! once; a load failure leaves the service in `Error` for good.

pub mod wire;

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::config::ResolvedConfig;
use crate::core::Pipeline;
use crate::signals::ModelLoader;

pub use wire::{DocItem, DocResponse, DocsRequest, DocsResponse, IdentifyResponse, ReadyResponse};

/// Document processed once during loading
pub const WARMUP_TEXT: &str =
    "גדעון לבנה הגיע ב16.1.2022 לבית החולים שערי צדק עם תלונות על כאבים בחזה";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Uninitialized,
    Loading,
    Ready,
    Error,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Uninitialized => "uninitialized",
            ServiceStatus::Loading => "loading",
            ServiceStatus::Ready => "ready",
            ServiceStatus::Error => "error",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned to service callers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Service is not ready (status: {0})")]
    NotReady(ServiceStatus),

    #[error("Bad response: {0}")]
    Query(String),
}

impl ServiceError {
    /// HTTP-style status code
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::NotReady(ServiceStatus::Error) => 500,
            ServiceError::NotReady(_) => 503,
            ServiceError::Query(_) => 400,
        }
    }
}

struct State {
    status: ServiceStatus,
    pipeline: Option<Arc<Pipeline>>,
}

/// Readiness-gated wrapper around the pipeline
#[derive(Clone)]
pub struct SafeHarborService {
    config: Arc<ResolvedConfig>,
    loader: Arc<dyn ModelLoader>,
    state: Arc<RwLock<State>>,
}

impl SafeHarborService {
    pub fn new(config: ResolvedConfig, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            config: Arc::new(config),
            loader,
            state: Arc::new(RwLock::new(State {
                status: ServiceStatus::Uninitialized,
                pipeline: None,
            })),
        }
    }

    pub async fn status(&self) -> ServiceStatus {
        self.state.read().await.status
    }

    /// Move Uninitialized → Loading; false when loading already started
    async fn begin_loading(&self) -> bool {
        let mut state = self.state.write().await;
        if state.status != ServiceStatus::Uninitialized {
            return false;
        }
        state.status = ServiceStatus::Loading;
        info!(status = %state.status, "Service status changed");
        true
    }

    /// Start loading in a background task.
    ///
    /// Returns `None` when loading was already started.
    pub async fn load_async(&self) -> Option<JoinHandle<()>> {
        if !self.begin_loading().await {
            return None;
        }

        let service = self.clone();
        Some(tokio::spawn(async move {
            // failure is recorded in the status
            let _ = service.finish_loading().await;
        }))
    }

    /// Load and wait for the outcome. No-op once loading has started.
    pub async fn load(&self) -> Result<()> {
        if !self.begin_loading().await {
            return Ok(());
        }
        self.finish_loading().await
    }

    #[instrument(skip(self), fields(model = %self.loader.name()))]
    async fn finish_loading(&self) -> Result<()> {
        let outcome = self.initialize().await;

        let mut state = self.state.write().await;
        match outcome {
            Ok(pipeline) => {
                state.pipeline = Some(Arc::new(pipeline));
                state.status = ServiceStatus::Ready;
                info!(status = %state.status, "Hebrew Safe Harbor service is up and ready to serve");
                Ok(())
            }
            Err(e) => {
                state.status = ServiceStatus::Error;
                error!(status = %state.status, error = %format!("{:#}", e), "Service failed to load");
                Err(e)
            }
        }
    }

    async fn initialize(&self) -> Result<Pipeline> {
        let model = self
            .loader
            .load()
            .await
            .with_context(|| format!("Failed to load model {}", self.loader.name()))?;

        let pipeline = self.config.build_pipeline(model)?;
        info!(recognizers = ?pipeline.recognizer_names(), "Pipeline assembled");
        pipeline
            .process(Some("warmup".to_string()), WARMUP_TEXT, Vec::new())
            .context("Warm-up document failed")?;

        Ok(pipeline)
    }

    /// Readiness body and status code (200 / 503 / 500)
    pub async fn ready(&self) -> (ReadyResponse, u16) {
        let (readiness, code) = match self.status().await {
            ServiceStatus::Ready => ("ready", 200),
            ServiceStatus::Uninitialized | ServiceStatus::Loading => ("unready", 503),
            ServiceStatus::Error => ("unready", 500),
        };
        (
            ReadyResponse {
                service: wire::SERVICE_NAME.to_string(),
                status: readiness.to_string(),
            },
            code,
        )
    }

    async fn pipeline(&self) -> Result<Arc<Pipeline>, ServiceError> {
        let state = self.state.read().await;
        match (&state.pipeline, state.status) {
            (Some(pipeline), ServiceStatus::Ready) => Ok(Arc::clone(pipeline)),
            (_, status) => Err(ServiceError::NotReady(status)),
        }
    }

    /// Identify and anonymize a batch. Any failure fails the whole request.
    pub async fn query(&self, request: DocsRequest) -> Result<DocsResponse, ServiceError> {
        let pipeline = self.pipeline().await?;

        let docs = tokio::task::spawn_blocking(move || pipeline.process_batch(request.docs))
            .await
            .map_err(|e| ServiceError::Query(e.to_string()))?
            .map_err(|e| ServiceError::Query(e.to_string()))?;

        Ok(DocsResponse {
            docs: docs.iter().map(DocResponse::from).collect(),
        })
    }

    /// Run the identification stages only and report every span list
    pub async fn identify(&self, request: DocsRequest) -> Result<Vec<IdentifyResponse>, ServiceError> {
        let pipeline = self.pipeline().await?;

        let docs = tokio::task::spawn_blocking(move || pipeline.process_batch(request.docs))
            .await
            .map_err(|e| ServiceError::Query(e.to_string()))?
            .map_err(|e| ServiceError::Query(e.to_string()))?;

        Ok(docs.iter().map(IdentifyResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::PreloadedModel;

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::NotReady(ServiceStatus::Loading).status_code(), 503);
        assert_eq!(ServiceError::NotReady(ServiceStatus::Uninitialized).status_code(), 503);
        assert_eq!(ServiceError::NotReady(ServiceStatus::Error).status_code(), 500);
        assert_eq!(ServiceError::Query("x".into()).status_code(), 400);
    }

    #[tokio::test]
    async fn test_query_before_load() {
        let service = SafeHarborService::new(
            ResolvedConfig::builtin().unwrap(),
            Arc::new(PreloadedModel::default()),
        );

        let err = service.query(DocsRequest::default()).await.unwrap_err();
        assert_eq!(err, ServiceError::NotReady(ServiceStatus::Uninitialized));
        assert_eq!(service.ready().await.1, 503);
    }
}
