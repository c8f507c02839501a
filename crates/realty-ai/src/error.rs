use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[cfg(feature = "gemini")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response: {0}")]
    Response(String),

    #[error("model returned no text")]
    Empty,
}
