//! The dataset snapshot every request reads from.

use std::collections::HashSet;
use std::fs::File;
use std::io::Seek;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::BooleanArray;
use arrow::compute::{concat_batches, filter_record_batch};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use realty_core::MatchedAreas;
use realty_core::columns::{distinct_strings, string_column};
use tracing::info;

use crate::StoreError;

/// Immutable in-memory dataset, loaded once and shared behind an `Arc`.
///
/// All rows live in a single [`RecordBatch`] so that row indices are stable
/// and subsets keep dataset order. Column names are trimmed on construction;
/// spreadsheet exports often carry trailing spaces in headers.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
    source: Option<PathBuf>,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Load a dataset file, choosing the reader by extension.
    ///
    /// Supported: `.parquet` / `.pq` and `.csv` (header row, inferred types).
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let batch = match ext.as_str() {
            "parquet" | "pq" => read_parquet(path)?,
            "csv" => read_csv(path)?,
            _ => return Err(StoreError::UnsupportedFormat(path.to_path_buf())),
        };

        let mut dataset = Self::from_batch(batch)?;
        dataset.source = Some(path.to_path_buf());
        info!(
            path = %path.display(),
            rows = dataset.num_rows(),
            columns = ?dataset.column_names(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Wrap an existing batch (fixtures, or data produced elsewhere).
    pub fn from_batch(batch: RecordBatch) -> Result<Self, StoreError> {
        Ok(Self {
            batch: trim_column_names(batch)?,
            source: None,
            loaded_at: Utc::now(),
        })
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    /// File the dataset was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Distinct non-null values of `column`, in first-appearance order.
    pub fn localities(&self, column: &str) -> Result<Vec<String>, StoreError> {
        let names = string_column(&self.batch, column)?;
        Ok(distinct_strings(&names))
    }

    /// Rows whose `column` value is one of the matched areas, in dataset order.
    ///
    /// [`MatchedAreas::All`] returns the whole dataset.
    pub fn rows_for_areas(
        &self,
        column: &str,
        areas: &MatchedAreas,
    ) -> Result<RecordBatch, StoreError> {
        let names = match areas {
            MatchedAreas::All => return Ok(self.batch.clone()),
            MatchedAreas::Named(names) => names,
        };
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        let values = string_column(&self.batch, column)?;
        let mask: BooleanArray = values
            .iter()
            .map(|v| Some(v.is_some_and(|s| wanted.contains(s))))
            .collect();
        Ok(filter_record_batch(&self.batch, &mask)?)
    }
}

/// Read a Parquet file into a single batch.
pub fn read_parquet(path: &Path) -> Result<RecordBatch, StoreError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let batches = builder.build()?.collect::<Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Read a CSV file with a header row into a single batch.
///
/// Column types are inferred from every row, so a decimal late in a column of
/// whole numbers widens it to `Float64` instead of failing the load.
pub fn read_csv(path: &Path) -> Result<RecordBatch, StoreError> {
    let mut file = File::open(path)?;
    let format = Format::default().with_header(true);
    let (schema, _) = format.infer_schema(&mut file, None)?;
    file.rewind()?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .build(file)?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

fn trim_column_names(batch: RecordBatch) -> Result<RecordBatch, StoreError> {
    let schema = batch.schema();
    if schema.fields().iter().all(|f| f.name().trim() == f.name()) {
        return Ok(batch);
    }
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| f.as_ref().clone().with_name(f.name().trim()))
        .collect();
    let trimmed = Schema::new_with_metadata(fields, schema.metadata().clone());
    Ok(RecordBatch::try_new(
        Arc::new(trimmed),
        batch.columns().to_vec(),
    )?)
}
