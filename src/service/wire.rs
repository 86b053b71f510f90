//! JSON request and response bodies.

use serde::{Deserialize, Serialize};

use crate::core::DocInput;
use crate::domain::{Document, Span};

/// Service name reported by the readiness check
pub const SERVICE_NAME: &str = "Hebrew Safe Harbor";

/// `{"docs": [{"id", "text", "spans"?}, ...]}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocsRequest {
    pub docs: Vec<DocInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsResponse {
    pub docs: Vec<DocResponse>,
}

/// One anonymized document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocResponse {
    pub id: String,
    /// Masked text
    pub text: String,
    pub items: Vec<DocItem>,
}

/// One masked entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocItem {
    pub text: String,
    pub text_start_position: usize,
    pub text_end_position: usize,
    pub text_entity_type: String,
    /// Recognizer that produced the span
    pub explanation: String,
    pub mask: String,
    pub mask_start_position: usize,
    pub mask_end_position: usize,
    pub mask_operator: String,
}

impl From<&Document> for DocResponse {
    fn from(doc: &Document) -> Self {
        let (text, items) = match &doc.anonymized {
            Some(anonymized) => (
                anonymized.text.clone(),
                anonymized
                    .items
                    .iter()
                    .map(|item| DocItem {
                        text: doc.span_text(&item.span).to_string(),
                        text_start_position: item.span.start,
                        text_end_position: item.span.end,
                        text_entity_type: item.span.entity_type.clone(),
                        explanation: item.span.recognizer.clone(),
                        mask: item.mask.clone(),
                        mask_start_position: item.mask_start,
                        mask_end_position: item.mask_end,
                        mask_operator: item.operator.clone(),
                    })
                    .collect(),
            ),
            None => (doc.text.as_str().to_string(), Vec::new()),
        };

        Self {
            id: doc.id.clone(),
            text,
            items,
        }
    }
}

/// Every stage's span list for one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifyResponse {
    pub id: String,
    pub recognized: Vec<Span>,
    pub smoothed: Vec<Span>,
    pub consolidated: Vec<Span>,
    pub granular: Vec<Span>,
}

impl From<&Document> for IdentifyResponse {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            recognized: doc.recognized.clone(),
            smoothed: doc.smoothed.clone(),
            consolidated: doc.consolidated.clone(),
            granular: doc.granular.clone(),
        }
    }
}

/// `{"service", "status"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub service: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnonymizedText, MaskedItem};

    #[test]
    fn test_request_without_spans() {
        let request: DocsRequest =
            serde_json::from_str(r#"{"docs": [{"id": "doc_1", "text": "טקסט"}, {"text": "עוד"}]}"#)
                .unwrap();

        assert_eq!(request.docs.len(), 2);
        assert_eq!(request.docs[0].id.as_deref(), Some("doc_1"));
        assert!(request.docs[0].spans.is_empty());
        assert!(request.docs[1].id.is_none());
    }

    #[test]
    fn test_request_with_spans() {
        let request: DocsRequest = serde_json::from_str(
            r#"{"docs": [{"id": "a", "text": "גדעון לבנה", "spans": [
                {"start": 0, "end": 10, "entity_type": "PERS", "score": 0.85, "recognizer": "HebSpacy"}
            ]}]}"#,
        )
        .unwrap();

        let span = &request.docs[0].spans[0];
        assert_eq!(span.boundaries(), (0, 10));
        assert_eq!(span.recognizer, "HebSpacy");
    }

    #[test]
    fn test_item_field_names() {
        let mut doc = Document::new(Some("doc_1".to_string()), "גדעון לבנה הגיע");
        let span = Span::new(0, 10, "PERS", 0.9, "HebSpacy");
        doc.anonymized = Some(AnonymizedText {
            text: "<שם_> הגיע".to_string(),
            items: vec![MaskedItem {
                span,
                mask: "<שם_>".to_string(),
                mask_start: 0,
                mask_end: 5,
                operator: "replace_in_hebrew".to_string(),
            }],
        });

        let json = serde_json::to_value(DocResponse::from(&doc)).unwrap();
        let item = &json["items"][0];
        assert_eq!(json["id"], "doc_1");
        assert_eq!(json["text"], "<שם_> הגיע");
        assert_eq!(item["text"], "גדעון לבנה");
        assert_eq!(item["textStartPosition"], 0);
        assert_eq!(item["textEndPosition"], 10);
        assert_eq!(item["textEntityType"], "PERS");
        assert_eq!(item["explanation"], "HebSpacy");
        assert_eq!(item["maskEndPosition"], 5);
        assert_eq!(item["maskOperator"], "replace_in_hebrew");
    }
}
