//! Signal recognizers.
//!
//! Recognizers scan a document and emit candidate spans independently of
//! each other. Conflicts between them are resolved later by the identifier
//! stages. The statistical NER model is a black box behind `ModelLoader`.

pub mod israeli_id;
pub mod lexicon;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::Span;
use crate::text::DocText;

pub use israeli_id::IsraeliIdRecognizer;
pub use lexicon::LexiconRecognizer;

/// Trait for span recognizers
pub trait Recognizer: Send + Sync {
    /// Name recorded on every emitted span
    fn name(&self) -> &str;

    /// Scan the text and return candidate spans
    fn analyze(&self, text: &DocText) -> Vec<Span>;
}

/// Loads the statistical recognizer once at service start
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Human-readable model name
    fn name(&self) -> &str;

    /// Load the model
    async fn load(&self) -> Result<Arc<dyn Recognizer>>;
}

/// Recognizer that emits nothing.
///
/// Used when statistical spans arrive with the request instead of being
/// computed in process.
#[derive(Debug, Clone, Default)]
pub struct NoopRecognizer;

impl Recognizer for NoopRecognizer {
    fn name(&self) -> &str {
        "noop"
    }

    fn analyze(&self, _text: &DocText) -> Vec<Span> {
        Vec::new()
    }
}

/// Loader for a recognizer that is already in memory
pub struct PreloadedModel {
    recognizer: Arc<dyn Recognizer>,
}

impl PreloadedModel {
    pub fn new(recognizer: Arc<dyn Recognizer>) -> Self {
        Self { recognizer }
    }
}

impl Default for PreloadedModel {
    fn default() -> Self {
        Self::new(Arc::new(NoopRecognizer))
    }
}

#[async_trait]
impl ModelLoader for PreloadedModel {
    fn name(&self) -> &str {
        self.recognizer.name()
    }

    async fn load(&self) -> Result<Arc<dyn Recognizer>> {
        Ok(Arc::clone(&self.recognizer))
    }
}

/// Run every recognizer and collect spans sorted by (start, end)
pub fn analyze_all(recognizers: &[Arc<dyn Recognizer>], text: &DocText) -> Vec<Span> {
    let mut spans: Vec<Span> = recognizers.iter().flat_map(|r| r.analyze(text)).collect();
    crate::domain::sort_by_offsets(&mut spans);
    spans
}
