use crate::discovery::DiscoveryDocument;
use crate::frame::EncodedPayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("Annotation request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Annotation response carried no entries")]
    EmptyResponse,
}

/// The feature kinds requested for every frame. The set is fixed at
/// construction and never changes while the session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    FaceDetection,
    LabelDetection,
    LandmarkDetection,
    LogoDetection,
    TextDetection,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 5] = [
        FeatureKind::FaceDetection,
        FeatureKind::LabelDetection,
        FeatureKind::LandmarkDetection,
        FeatureKind::LogoDetection,
        FeatureKind::TextDetection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::FaceDetection => "FACE_DETECTION",
            FeatureKind::LabelDetection => "LABEL_DETECTION",
            FeatureKind::LandmarkDetection => "LANDMARK_DETECTION",
            FeatureKind::LogoDetection => "LOGO_DETECTION",
            FeatureKind::TextDetection => "TEXT_DETECTION",
        }
    }
}

#[derive(Serialize)]
struct BatchAnnotateRequest<'a> {
    requests: Vec<AnnotateImageRequest<'a>>,
}

#[derive(Serialize)]
struct AnnotateImageRequest<'a> {
    image: ImageSource<'a>,
    features: Vec<FeatureSpec>,
}

#[derive(Serialize)]
struct ImageSource<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct FeatureSpec {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

#[derive(Deserialize)]
struct BatchAnnotateResponse {
    #[serde(default)]
    responses: Vec<Value>,
}

/// The first response entry, verbatim: a mapping of feature-kind name to
/// annotation lists, or an embedded error object.
#[derive(Debug, Clone)]
pub struct AnnotationResult {
    entry: Value,
}

impl AnnotationResult {
    pub fn new(entry: Value) -> Self {
        Self { entry }
    }

    pub fn as_value(&self) -> &Value {
        &self.entry
    }

    /// The service-reported error field, when present and non-null.
    pub fn error(&self) -> Option<&Value> {
        self.entry.get("error").filter(|error| !error.is_null())
    }

    /// The top-ranked detected text. The field is absent whenever no text was
    /// detected, which is normal.
    pub fn top_text_description(&self) -> Option<&str> {
        self.entry
            .get("textAnnotations")?
            .get(0)?
            .get("description")?
            .as_str()
    }
}

/// Seam between the session and the remote service.
#[async_trait]
pub trait Annotate: Send + Sync {
    async fn annotate(&self, payload: &EncodedPayload)
        -> Result<AnnotationResult, AnnotationError>;
}

/// HTTPS client for the batch-annotation endpoint. No retries, no backoff,
/// transport-default timeouts.
pub struct AnnotationClient {
    http: reqwest::Client,
    endpoint: String,
    features: Vec<FeatureKind>,
    max_results: u32,
}

impl AnnotationClient {
    pub fn new(document: &DiscoveryDocument, api_key: &str, max_results: u32) -> Self {
        // The key rides as a query parameter, so the endpoint must never be logged.
        let endpoint = format!("{}?key={}", document.annotate_endpoint(), api_key);
        Self {
            http: reqwest::Client::new(),
            endpoint,
            features: FeatureKind::ALL.to_vec(),
            max_results,
        }
    }

    fn build_request<'a>(&self, payload: &'a EncodedPayload) -> BatchAnnotateRequest<'a> {
        BatchAnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageSource {
                    content: payload.as_str(),
                },
                features: self
                    .features
                    .iter()
                    .map(|kind| FeatureSpec {
                        kind: kind.as_str(),
                        max_results: self.max_results,
                    })
                    .collect(),
            }],
        }
    }
}

#[async_trait]
impl Annotate for AnnotationClient {
    async fn annotate(
        &self,
        payload: &EncodedPayload,
    ) -> Result<AnnotationResult, AnnotationError> {
        let body = self.build_request(payload);
        tracing::debug!("requesting annotations for {} payload bytes", payload.as_str().len());

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let batch: BatchAnnotateResponse = response.json().await?;
        batch
            .responses
            .into_iter()
            .next()
            .map(AnnotationResult::new)
            .ok_or(AnnotationError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_client(max_results: u32) -> AnnotationClient {
        let document = DiscoveryDocument::parse(
            r#"{
                "rootUrl": "https://vision.example.com/",
                "servicePath": "v1/",
                "resources": {
                    "images": {"methods": {"annotate": {"path": "images:annotate"}}}
                }
            }"#,
        )
        .unwrap();
        AnnotationClient::new(&document, "secret", max_results)
    }

    #[test]
    fn request_body_matches_the_wire_shape() {
        let client = test_client(10);
        let payload = EncodedPayload::new("aW1hZ2U=".to_string());
        let body = serde_json::to_value(client.build_request(&payload)).unwrap();

        assert_eq!(
            body,
            json!({
                "requests": [{
                    "image": {"content": "aW1hZ2U="},
                    "features": [
                        {"type": "FACE_DETECTION", "maxResults": 10},
                        {"type": "LABEL_DETECTION", "maxResults": 10},
                        {"type": "LANDMARK_DETECTION", "maxResults": 10},
                        {"type": "LOGO_DETECTION", "maxResults": 10},
                        {"type": "TEXT_DETECTION", "maxResults": 10}
                    ]
                }]
            })
        );
    }

    #[test]
    fn max_results_cap_is_applied_to_every_feature() {
        let client = test_client(3);
        let payload = EncodedPayload::new("eA==".to_string());
        let body = serde_json::to_value(client.build_request(&payload)).unwrap();

        let features = body["requests"][0]["features"].as_array().unwrap();
        assert_eq!(features.len(), 5);
        assert!(features.iter().all(|f| f["maxResults"] == 3));
    }

    #[test]
    fn endpoint_carries_the_api_key() {
        let client = test_client(10);
        assert_eq!(
            client.endpoint,
            "https://vision.example.com/v1/images:annotate?key=secret"
        );
    }

    #[test]
    fn error_field_is_detected() {
        let result = AnnotationResult::new(json!({
            "error": {"code": 403, "message": "permission denied"}
        }));
        assert!(result.error().is_some());
    }

    #[test]
    fn null_error_field_is_not_an_error() {
        let result = AnnotationResult::new(json!({"labelAnnotations": [], "error": null}));
        assert!(result.error().is_none());
    }

    #[test]
    fn top_text_description_is_extracted() {
        let result = AnnotationResult::new(json!({
            "textAnnotations": [
                {"description": "STOP", "score": 0.98},
                {"description": "S", "score": 0.91}
            ]
        }));
        assert_eq!(result.top_text_description(), Some("STOP"));
    }

    #[test]
    fn missing_text_annotations_yield_none() {
        let result = AnnotationResult::new(json!({
            "labelAnnotations": [{"description": "cat", "score": 0.9}]
        }));
        assert_eq!(result.top_text_description(), None);
    }

    #[test]
    fn empty_response_batch_is_rejected() {
        let batch: BatchAnnotateResponse = serde_json::from_str(r#"{"responses": []}"#).unwrap();
        let first = batch
            .responses
            .into_iter()
            .next()
            .map(AnnotationResult::new)
            .ok_or(AnnotationError::EmptyResponse);
        assert!(matches!(first, Err(AnnotationError::EmptyResponse)));
    }
}
