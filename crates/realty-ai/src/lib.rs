//! Narrative generation: remote LLM summaries with a deterministic template fallback.

mod error;
mod prompt;
mod summary;

#[cfg(feature = "gemini")]
mod gemini;

pub use error::GenerateError;
pub use prompt::{build_prompt, mock_summary};
pub use summary::{SummaryGenerator, SummaryMode, TextGenerator};

#[cfg(feature = "gemini")]
pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient};
