//! Arrow column extraction with explicit missing values.
//!
//! Every numeric read goes through [`floats`], which casts whatever the loader
//! produced (integers, floats, numeric strings) to `Float64` and turns nulls and
//! non-finite values into `None`. Nothing downstream ever sees a NaN.

use std::collections::HashSet;

use arrow::array::{Array, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;

use crate::AnalyticsError;

/// Read a numeric column. Returns `Ok(None)` when the column is absent.
pub fn float_column(
    batch: &RecordBatch,
    name: &str,
) -> Result<Option<Vec<Option<f64>>>, AnalyticsError> {
    match batch.column_by_name(name) {
        Some(col) => Ok(Some(floats(col.as_ref())?)),
        None => Ok(None),
    }
}

/// Read the year column, which must exist.
pub fn year_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<i64>>, AnalyticsError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| AnalyticsError::MissingColumn(name.to_string()))?;
    let years = floats(col.as_ref())?
        .into_iter()
        .map(|v| v.map(|y| y as i64))
        .collect();
    Ok(years)
}

/// Read a text column as a `StringArray`, casting from any string or scalar type.
pub fn string_column(batch: &RecordBatch, name: &str) -> Result<StringArray, AnalyticsError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| AnalyticsError::MissingColumn(name.to_string()))?;
    let utf8 = cast(col.as_ref(), &DataType::Utf8)?;
    Ok(utf8.as_string::<i32>().clone())
}

/// Distinct non-null values in first-appearance order.
pub fn distinct_strings(arr: &StringArray) -> Vec<String> {
    let mut seen = HashSet::new();
    arr.iter()
        .flatten()
        .filter(|s| seen.insert(*s))
        .map(str::to_string)
        .collect()
}

/// Cast any numeric-like array to `Float64`, normalising null/NaN/inf to `None`.
pub fn floats(col: &dyn Array) -> Result<Vec<Option<f64>>, AnalyticsError> {
    let cast_col = cast(col, &DataType::Float64)?;
    let arr = cast_col.as_primitive::<Float64Type>();
    Ok(arr.iter().map(|v| v.filter(|x| x.is_finite())).collect())
}

/// Arithmetic mean of the present values; `None` when nothing is present.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0_f64, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        return None;
    }
    let m = sum / count as f64;
    m.is_finite().then_some(m)
}
