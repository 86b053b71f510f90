//! Service Integration Tests
//!
//! Readiness state machine and batch queries.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Notify;

use hebsafeharbor::config::ResolvedConfig;
use hebsafeharbor::service::DocsRequest;
use hebsafeharbor::signals::{ModelLoader, PreloadedModel, Recognizer};
use hebsafeharbor::text::DocText;
use hebsafeharbor::{DocInput, SafeHarborService, ServiceError, ServiceStatus, Span};

/// Tags every occurrence of one name as PERS
struct NameModel(&'static str);

impl Recognizer for NameModel {
    fn name(&self) -> &str {
        "HebSpacy"
    }

    fn analyze(&self, text: &DocText) -> Vec<Span> {
        text.as_str()
            .match_indices(self.0)
            .map(|(byte, name)| {
                let start = text.char_offset(byte);
                let end = text.char_offset(byte + name.len());
                Span::new(start, end, "PERS", 0.85, "HebSpacy")
            })
            .collect()
    }
}

struct FailingLoader;

#[async_trait]
impl ModelLoader for FailingLoader {
    fn name(&self) -> &str {
        "broken"
    }

    async fn load(&self) -> Result<Arc<dyn Recognizer>> {
        anyhow::bail!("model files missing")
    }
}

/// Blocks until released
struct GatedLoader(Arc<Notify>);

#[async_trait]
impl ModelLoader for GatedLoader {
    fn name(&self) -> &str {
        "gated"
    }

    async fn load(&self) -> Result<Arc<dyn Recognizer>> {
        self.0.notified().await;
        Ok(Arc::new(NameModel("גדעון לבנה")))
    }
}

fn service(loader: Arc<dyn ModelLoader>) -> SafeHarborService {
    SafeHarborService::new(ResolvedConfig::builtin().unwrap(), loader)
}

fn request(docs: Vec<DocInput>) -> DocsRequest {
    DocsRequest { docs }
}

#[tokio::test]
async fn test_load_then_ready() {
    let service = service(Arc::new(PreloadedModel::new(Arc::new(NameModel("גדעון לבנה")))));
    assert_eq!(service.status().await, ServiceStatus::Uninitialized);

    service.load().await.unwrap();

    assert_eq!(service.status().await, ServiceStatus::Ready);
    let (body, code) = service.ready().await;
    assert_eq!(code, 200);
    assert_eq!(body.status, "ready");
    assert_eq!(body.service, "Hebrew Safe Harbor");
}

#[tokio::test]
async fn test_load_async_runs_once() {
    let gate = Arc::new(Notify::new());
    let service = service(Arc::new(GatedLoader(Arc::clone(&gate))));

    let handle = service.load_async().await.expect("first load starts");
    assert_eq!(service.status().await, ServiceStatus::Loading);
    assert_eq!(service.ready().await.1, 503);
    assert!(service.load_async().await.is_none());

    let err = service.query(request(vec![])).await.unwrap_err();
    assert_eq!(err, ServiceError::NotReady(ServiceStatus::Loading));
    assert_eq!(err.status_code(), 503);

    gate.notify_one();
    handle.await.unwrap();
    assert_eq!(service.status().await, ServiceStatus::Ready);
}

#[tokio::test]
async fn test_load_failure_is_permanent() {
    let service = service(Arc::new(FailingLoader));

    let err = service.load().await.unwrap_err();
    assert!(format!("{:#}", err).contains("model files missing"));
    assert_eq!(service.status().await, ServiceStatus::Error);

    let (body, code) = service.ready().await;
    assert_eq!(code, 500);
    assert_eq!(body.status, "unready");

    // no retry
    service.load().await.unwrap();
    assert!(service.load_async().await.is_none());
    assert_eq!(service.status().await, ServiceStatus::Error);

    let err = service.query(request(vec![])).await.unwrap_err();
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_query_masks_documents() {
    let service = service(Arc::new(PreloadedModel::new(Arc::new(NameModel("גדעון לבנה")))));
    service.load().await.unwrap();

    let response = service
        .query(request(vec![
            DocInput::new("doc_1", "גדעון לבנה הגיע לביקורת"),
            DocInput::new("doc_2", "אין כאן פרטים מזהים"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.docs.len(), 2);
    let first = &response.docs[0];
    assert_eq!(first.id, "doc_1");
    assert_eq!(first.text, "<שם_> הגיע לביקורת");
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.items[0].text, "גדעון לבנה");
    assert_eq!(first.items[0].text_entity_type, "PERS");
    assert_eq!(first.items[0].explanation, "HebSpacy");
    assert_eq!(first.items[0].mask_operator, "replace_in_hebrew");

    assert_eq!(response.docs[1].text, "אין כאן פרטים מזהים");
    assert!(response.docs[1].items.is_empty());
}

#[tokio::test]
async fn test_query_error_is_bad_request() {
    let service = service(Arc::new(PreloadedModel::default()));
    service.load().await.unwrap();

    let bad = DocInput::new("bad", "קצר").with_spans(vec![Span::new(0, 40, "PERS", 0.9, "HebSpacy")]);
    let err = service.query(request(vec![bad])).await.unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().starts_with("Bad response:"));
}

#[tokio::test]
async fn test_identify_reports_stages() {
    let service = service(Arc::new(PreloadedModel::default()));
    service.load().await.unwrap();

    let spans = vec![Span::new(6, 15, "DATE", 0.8, "HebSpacy")];
    let docs = service
        .identify(request(vec![DocInput::new("1", "נולדה 16.1.2022").with_spans(spans)]))
        .await
        .unwrap();

    assert_eq!(docs[0].recognized.len(), 1);
    assert_eq!(docs[0].consolidated[0].entity_type, "DATE");
    assert_eq!(docs[0].granular[0].entity_type, "BIRTH_DATE");
}
