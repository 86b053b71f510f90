//! Pipeline driver.
//!
//! Runs one document through every stage in order:
//! signals → smoother → filter → consolidator → city/country rule →
//! medical rule → date splitter → anonymizer.
//!
//! Each stage is a pure function over span lists; the driver only threads
//! the lists through, validates the span contract at the stage boundaries,
//! and records every intermediate list on the `Document`.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::anonymizer::Anonymizer;
use crate::domain::{sort_by_offsets, Document, Span};
use crate::identifier::{
    apply_city_country, apply_medical, consolidate, filter, smooth, split_dates,
};
use crate::signals::{analyze_all, Recognizer};

use super::limits::{LimitViolation, Limits};
use super::tables::Tables;
use super::validate::{validate_bounds, validate_disjoint, SpanContractViolation};

/// Errors that abort processing of a request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Contract(#[from] SpanContractViolation),

    #[error(transparent)]
    Limit(#[from] LimitViolation),
}

/// One input document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocInput {
    /// Caller-supplied identifier
    #[serde(default)]
    pub id: Option<String>,

    /// Raw text
    pub text: String,

    /// Spans from an upstream NER model
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl DocInput {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
            spans: Vec::new(),
        }
    }

    pub fn with_spans(mut self, spans: Vec<Span>) -> Self {
        self.spans = spans;
        self
    }
}

/// Identification and anonymization pipeline over shared read-only tables
#[derive(Clone)]
pub struct Pipeline {
    tables: Arc<Tables>,
    recognizers: Vec<Arc<dyn Recognizer>>,
    anonymizer: Arc<Anonymizer>,
    limits: Limits,
    today: Option<NaiveDate>,
}

impl Pipeline {
    /// Create a pipeline with no recognizers; spans must come with the request
    pub fn new(tables: Arc<Tables>, anonymizer: Arc<Anonymizer>) -> Self {
        Self {
            tables,
            recognizers: Vec::new(),
            anonymizer,
            limits: Limits::default(),
            today: None,
        }
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn Recognizer>) -> Self {
        self.recognizers.push(recognizer);
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Fix the reference date used for birth-date age estimation
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Names of the in-process recognizers
    pub fn recognizer_names(&self) -> Vec<&str> {
        self.recognizers.iter().map(|r| r.name()).collect()
    }

    fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Identify and anonymize one document
    pub fn process(
        &self,
        id: Option<String>,
        text: impl Into<String>,
        external_spans: Vec<Span>,
    ) -> Result<Document, PipelineError> {
        let mut doc = Document::new(id, text);
        self.identify(&mut doc, external_spans)?;
        self.anonymize(&mut doc);
        Ok(doc)
    }

    /// Run the identification stages, filling every span list of `doc`
    #[instrument(
        skip(self, doc, external_spans),
        fields(doc_id = %doc.id, chars = doc.text.char_len())
    )]
    pub fn identify(&self, doc: &mut Document, external_spans: Vec<Span>) -> Result<(), PipelineError> {
        let len = doc.text.char_len();
        self.limits.validate_text(&doc.id, len)?;
        validate_bounds("input", &external_spans, len)?;

        let mut recognized = analyze_all(&self.recognizers, &doc.text);
        validate_bounds("signals", &recognized, len)?;
        recognized.extend(external_spans);
        sort_by_offsets(&mut recognized);
        debug!(spans = recognized.len(), "Recognized");

        let smoothed = smooth(&recognized, &doc.text, &self.tables.settings().smoother);
        debug!(spans = smoothed.len(), "Smoothed");

        let filtered = filter(&smoothed, &doc.text, &self.tables);
        debug!(spans = filtered.len(), "Filtered");

        let consolidated = consolidate(&filtered, &doc.text, &self.tables);
        validate_disjoint("consolidator", &consolidated, len)?;
        debug!(spans = consolidated.len(), "Consolidated");

        let consolidated = apply_city_country(&consolidated, &smoothed, &doc.text, &self.tables);
        validate_disjoint("city_country", &consolidated, len)?;

        let consolidated = apply_medical(&consolidated, &smoothed, &doc.text, &self.tables);
        validate_disjoint("medical", &consolidated, len)?;
        debug!(spans = consolidated.len(), "Post-consolidated");

        let granular = split_dates(&consolidated, &doc.text, &self.tables);
        validate_disjoint("splitter", &granular, len)?;

        doc.recognized = recognized;
        doc.smoothed = smoothed;
        doc.consolidated = consolidated;
        doc.granular = granular;
        Ok(())
    }

    /// Mask the granular spans of an identified document
    pub fn anonymize(&self, doc: &mut Document) {
        let anonymized = self
            .anonymizer
            .anonymize(&doc.text, &doc.granular, &self.tables, self.today());
        debug!(doc_id = %doc.id, items = anonymized.items.len(), "Anonymized");
        doc.anonymized = Some(anonymized);
    }

    /// Process documents independently, preserving order.
    ///
    /// Fails the whole batch on the first error.
    #[instrument(skip(self, docs), fields(docs = docs.len()))]
    pub fn process_batch(&self, docs: Vec<DocInput>) -> Result<Vec<Document>, PipelineError> {
        self.limits.validate_batch(docs.len())?;

        let processed = docs
            .into_iter()
            .map(|doc| self.process(doc.id, doc.text, doc.spans))
            .collect::<Result<Vec<_>, _>>()?;

        info!(docs = processed.len(), "Batch processed");
        Ok(processed)
    }
}
