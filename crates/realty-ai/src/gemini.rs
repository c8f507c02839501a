//! Gemini `generateContent` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{GenerateError, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Text generation over the Gemini REST API.
///
/// The API key travels as the `key` query parameter and is never logged.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

// ── Wire types ──

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at another endpoint root (no trailing slash needed).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(prompt: &str) -> GenerateRequest<'_> {
        GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        }
    }
}

/// Concatenated text parts of the first candidate.
fn parse_response(body: &str) -> Result<String, GenerateError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerateError::Response("no candidates in response".into()))?;
    let content = candidate
        .content
        .ok_or_else(|| GenerateError::Response("candidate has no content".into()))?;
    Ok(content.parts.into_iter().filter_map(|p| p.text).collect())
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = self.endpoint_url();
        debug!(url = %url, prompt_chars = prompt.len(), "calling gemini");

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(redacted)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerateError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(redacted)?;
        parse_response(&body)
    }
}

/// Transport errors carry the request URL, which holds the API key.
fn redacted(e: reqwest::Error) -> GenerateError {
    GenerateError::Http(e.without_url())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SummaryGenerator, mock_summary};
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use realty_core::StatsSummary;
    use serde_json::{Value, json};
    use std::collections::HashMap;

    #[test]
    fn client_trims_trailing_slash() {
        let client = GeminiClient::new("k").with_base_url("http://localhost:9000/v1beta/");
        assert_eq!(
            client.endpoint_url(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn default_endpoint_and_model_override() {
        let client = GeminiClient::new("k").with_model("gemini-2.0-pro");
        assert_eq!(client.model(), "gemini-2.0-pro");
        assert_eq!(
            client.endpoint_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-pro:generateContent"
        );
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(GeminiClient::request_body("hello")).unwrap();
        assert_eq!(
            body,
            json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn parse_joins_text_parts_of_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Prices rose. "}, {"text": "Demand held."}]}},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"totalTokenCount": 42}
        }"#;
        assert_eq!(parse_response(body).unwrap(), "Prices rose. Demand held.");
    }

    #[test]
    fn parse_rejects_missing_candidates() {
        assert!(matches!(
            parse_response(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#),
            Err(GenerateError::Response(_))
        ));
        assert!(matches!(
            parse_response(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#),
            Err(GenerateError::Response(_))
        ));
        assert!(matches!(parse_response("not json"), Err(GenerateError::Json(_))));
    }

    #[test]
    fn parse_candidate_without_text_is_empty() {
        let body = r#"{"candidates": [{"content": {"parts": [{"inlineData": {}}]}}]}"#;
        assert_eq!(parse_response(body).unwrap(), "");
    }

    // ── Local stub server ──

    async fn stub_server(status: StatusCode, reply: Value) -> String {
        let app = Router::new().route(
            "/models/{call}",
            post(
                move |Path(call): Path<String>,
                      Query(params): Query<HashMap<String, String>>,
                      Json(body): Json<Value>| async move {
                    assert_eq!(call, "gemini-2.5-flash:generateContent");
                    assert_eq!(params.get("key").map(String::as_str), Some("test-key"));
                    assert!(body["contents"][0]["parts"][0]["text"].is_string());
                    (status, Json(reply))
                },
            ),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn stats() -> StatsSummary {
        StatsSummary {
            areas: vec!["Wakad".into()],
            min_year: Some(2020),
            max_year: Some(2024),
            avg_price: Some(7150.0),
            avg_demand: Some(900.0),
            price_per_year: vec![],
            demand_per_year: vec![],
        }
    }

    #[tokio::test]
    async fn generate_against_stub() {
        let base = stub_server(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "Wakad is steady."}]}}]}),
        )
        .await;
        let client = GeminiClient::new("test-key").with_base_url(&base);
        assert_eq!(client.generate("prompt").await.unwrap(), "Wakad is steady.");
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let base = stub_server(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": {"message": "backend unavailable"}}),
        )
        .await;
        let client = GeminiClient::new("test-key").with_base_url(&base);
        match client.generate("prompt").await {
            Err(GenerateError::Server { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("backend unavailable"));
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn summarizer_falls_back_when_gemini_fails() {
        let base = stub_server(StatusCode::TOO_MANY_REQUESTS, json!({})).await;
        let summarizer =
            SummaryGenerator::configured(GeminiClient::new("test-key").with_base_url(&base));
        let text = summarizer.summarize("Wakad", &stats()).await;
        assert_eq!(text, mock_summary("Wakad", &stats()));
    }

    #[tokio::test]
    async fn summarizer_uses_gemini_text() {
        let base = stub_server(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "  Demand in Wakad grew.  "}]}}]}),
        )
        .await;
        let summarizer =
            SummaryGenerator::configured(GeminiClient::new("test-key").with_base_url(&base));
        assert_eq!(
            summarizer.summarize("Wakad", &stats()).await,
            "Demand in Wakad grew."
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_http_error_without_key() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = GeminiClient::new("SECRET-KEY-123").with_base_url(&format!("http://{addr}"));
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerateError::Http(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!format!("{err:?}").contains("SECRET-KEY-123"));
    }
}
