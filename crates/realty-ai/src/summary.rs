//! Summary generation strategy.
//!
//! [`SummaryGenerator`] is fixed when the process starts: without a model
//! credential every call returns the template from [`mock_summary`]; with one,
//! each call makes a single remote request and falls back to the same template
//! on any error or blank reply. Callers always get a narrative.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use realty_core::StatsSummary;
use serde::Serialize;
use tracing::{debug, warn};

use crate::GenerateError;
use crate::prompt::{build_prompt, mock_summary};

/// A remote text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Generate text for a single prompt. One attempt, no retries.
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Which path summaries take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    Mock,
    Remote,
}

#[derive(Clone)]
pub enum SummaryGenerator {
    /// No credential: template narratives only.
    Unconfigured,
    /// Remote generation with template fallback.
    Configured(Arc<dyn TextGenerator>),
}

impl fmt::Debug for SummaryGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => f.write_str("SummaryGenerator::Unconfigured"),
            Self::Configured(g) => write!(f, "SummaryGenerator::Configured({})", g.name()),
        }
    }
}

impl SummaryGenerator {
    pub fn configured(generator: impl TextGenerator + 'static) -> Self {
        Self::Configured(Arc::new(generator))
    }

    pub fn mode(&self) -> SummaryMode {
        match self {
            Self::Unconfigured => SummaryMode::Mock,
            Self::Configured(_) => SummaryMode::Remote,
        }
    }

    /// Narrative for `query` over `stats`. Never fails.
    pub async fn summarize(&self, query: &str, stats: &StatsSummary) -> String {
        let generator = match self {
            Self::Unconfigured => return mock_summary(query, stats),
            Self::Configured(generator) => generator.as_ref(),
        };

        match remote_summary(generator, query, stats).await {
            Ok(text) => {
                debug!(generator = generator.name(), chars = text.len(), "remote summary generated");
                text
            }
            Err(e) => {
                warn!(
                    generator = generator.name(),
                    error = %e,
                    "summary generation failed, using template"
                );
                mock_summary(query, stats)
            }
        }
    }
}

async fn remote_summary(
    generator: &dyn TextGenerator,
    query: &str,
    stats: &StatsSummary,
) -> Result<String, GenerateError> {
    let prompt = build_prompt(query, stats)?;
    let text = generator.generate(&prompt).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(GenerateError::Empty);
    }
    Ok(text.to_string())
}
