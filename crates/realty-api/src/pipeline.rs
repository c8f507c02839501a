//! Query pipeline: match localities, aggregate, summarise.
//!
//! Each call is independent. The dataset is shared read-only, so requests run
//! concurrently without locking.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use realty_ai::{SummaryGenerator, SummaryMode};
use realty_core::{
    ALL_AREAS, AnalyticsError, ColumnNames, MatchedAreas, YearSeries, build_stats,
    match_localities, year_series,
};
use realty_store::{Dataset, JsonRow, StoreError, sample_rows};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Maximum number of rows returned in an analysis table.
pub const TABLE_ROW_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Dataset not loaded on server.")]
    DatasetUnavailable,

    #[error("Query is required.")]
    EmptyQuery,

    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    #[error("Expected column '{0}' not found in dataset.")]
    MissingColumn(String),

    #[error("No data found for given query/area.")]
    NoMatchingRows,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AnalyticsError> for PipelineError {
    fn from(e: AnalyticsError) -> Self {
        match e {
            AnalyticsError::MissingColumn(name) => Self::MissingColumn(name),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Analytics(inner) => inner.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Successful answer to one query.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub summary: String,
    pub chart: YearSeries,
    pub table: Vec<JsonRow>,
    pub meta: AnalysisMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisMeta {
    pub areas: Vec<String>,
    pub rows_returned: usize,
}

/// One area's series in a comparison, with its own capped row sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaSeries {
    pub area: String,
    pub chart: YearSeries,
    pub table: Vec<JsonRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub dataset_loaded: bool,
    pub rows: usize,
    pub columns: Vec<String>,
    pub loaded_at: Option<String>,
    pub summary_mode: SummaryMode,
}

/// Matched areas and their rows.
struct Selection<'a> {
    dataset: &'a Dataset,
    areas: MatchedAreas,
    rows: RecordBatch,
}

#[derive(Debug)]
pub struct Pipeline {
    dataset: Option<Arc<Dataset>>,
    columns: ColumnNames,
    summarizer: SummaryGenerator,
}

impl Pipeline {
    /// `dataset` is `None` when loading failed at startup; every query then
    /// reports [`PipelineError::DatasetUnavailable`].
    pub fn new(
        dataset: Option<Arc<Dataset>>,
        columns: ColumnNames,
        summarizer: SummaryGenerator,
    ) -> Self {
        Self {
            dataset,
            columns,
            summarizer,
        }
    }

    pub fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    pub fn summary_mode(&self) -> SummaryMode {
        self.summarizer.mode()
    }

    /// Full analysis: narrative, per-year chart, row sample and metadata.
    pub async fn analyze(&self, query: &str) -> Result<Analysis, PipelineError> {
        let Selection {
            dataset: _,
            areas,
            rows,
        } = self.select(query)?;

        let chart = year_series(&rows, &self.columns)?;
        let labels = areas.labels();
        let stats = build_stats(labels.clone(), &rows, &chart, &self.columns)?;
        let table = sample_rows(&rows, TABLE_ROW_LIMIT)?;
        let summary = self.summarizer.summarize(query, &stats).await;

        info!(
            areas = ?labels,
            matched_rows = rows.num_rows(),
            years = chart.len(),
            rows_returned = table.len(),
            "analyzed query"
        );
        Ok(Analysis {
            summary,
            chart,
            meta: AnalysisMeta {
                areas: labels,
                rows_returned: table.len(),
            },
            table,
        })
    }

    /// One year series and row sample per matched area, in match order.
    ///
    /// A query that names no locality yields a single "All Areas" entry.
    pub fn compare(&self, query: &str) -> Result<Vec<AreaSeries>, PipelineError> {
        let Selection {
            dataset,
            areas,
            rows,
        } = self.select(query)?;

        let series = match &areas {
            MatchedAreas::All => vec![AreaSeries {
                area: ALL_AREAS.to_string(),
                chart: year_series(&rows, &self.columns)?,
                table: sample_rows(&rows, TABLE_ROW_LIMIT)?,
            }],
            MatchedAreas::Named(names) => names
                .iter()
                .map(|name| -> Result<AreaSeries, PipelineError> {
                    let single = MatchedAreas::Named(vec![name.clone()]);
                    let subset = dataset.rows_for_areas(&self.columns.area, &single)?;
                    Ok(AreaSeries {
                        area: name.clone(),
                        chart: year_series(&subset, &self.columns)?,
                        table: sample_rows(&subset, TABLE_ROW_LIMIT)?,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        info!(areas = series.len(), "compared areas");
        Ok(series)
    }

    /// Distinct localities in the dataset, in dataset order.
    pub fn areas(&self) -> Result<Vec<String>, PipelineError> {
        let dataset = self.dataset()?;
        require_column(dataset, &self.columns.area)?;
        Ok(dataset.localities(&self.columns.area)?)
    }

    pub fn health(&self) -> Health {
        let (rows, columns, loaded_at) = match &self.dataset {
            Some(ds) => (
                ds.num_rows(),
                ds.column_names(),
                Some(ds.loaded_at().to_rfc3339()),
            ),
            None => (0, Vec::new(), None),
        };
        Health {
            status: if self.dataset.is_some() { "ok" } else { "degraded" },
            dataset_loaded: self.dataset.is_some(),
            rows,
            columns,
            loaded_at,
            summary_mode: self.summarizer.mode(),
        }
    }

    fn dataset(&self) -> Result<&Dataset, PipelineError> {
        self.dataset
            .as_deref()
            .ok_or(PipelineError::DatasetUnavailable)
    }

    /// Validation and row selection shared by `analyze` and `compare`.
    ///
    /// Check order matters: dataset, query, area column, rows, year column.
    fn select(&self, query: &str) -> Result<Selection<'_>, PipelineError> {
        let dataset = self.dataset()?;
        if query.trim().is_empty() {
            return Err(PipelineError::EmptyQuery);
        }
        require_column(dataset, &self.columns.area)?;

        let known = dataset.localities(&self.columns.area)?;
        let areas = MatchedAreas::from_matches(match_localities(query, &known));
        let rows = dataset.rows_for_areas(&self.columns.area, &areas)?;
        if rows.num_rows() == 0 {
            return Err(PipelineError::NoMatchingRows);
        }
        require_column(dataset, &self.columns.year)?;

        Ok(Selection {
            dataset,
            areas,
            rows,
        })
    }
}

fn require_column(dataset: &Dataset, name: &str) -> Result<(), PipelineError> {
    if dataset.has_column(name) {
        Ok(())
    } else {
        Err(PipelineError::MissingColumn(name.to_string()))
    }
}
