//! Row sampling for transport: Arrow cells to JSON values.
//!
//! Nulls, NaN and infinities all become JSON `null`. Strings, booleans and
//! numbers map to their JSON counterparts; any other type (dates, timestamps,
//! decimals with odd scales, nested values) is rendered with Arrow's display
//! formatter.

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Int64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use realty_core::columns::floats;
use serde_json::{Map, Value};

use crate::StoreError;

/// One dataset row keyed by column name, in dataset column order.
pub type JsonRow = Map<String, Value>;

/// The first `limit` rows of `batch` as JSON objects, in batch order.
pub fn sample_rows(batch: &RecordBatch, limit: usize) -> Result<Vec<JsonRow>, StoreError> {
    let head = batch.slice(0, limit.min(batch.num_rows()));
    let schema = head.schema();
    let mut rows = vec![JsonRow::new(); head.num_rows()];

    for (field, col) in schema.fields().iter().zip(head.columns()) {
        let values = column_values(col.as_ref())?;
        for (row, value) in rows.iter_mut().zip(values) {
            row.insert(field.name().clone(), value);
        }
    }
    Ok(rows)
}

fn column_values(col: &dyn Array) -> Result<Vec<Value>, StoreError> {
    let dt = col.data_type();

    if dt.is_integer() {
        let ints = cast(col, &DataType::Int64)?;
        return Ok(ints
            .as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect());
    }
    if dt.is_floating() || matches!(dt, DataType::Decimal128(..) | DataType::Decimal256(..)) {
        return Ok(floats(col)?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect());
    }

    match dt {
        DataType::Null => Ok(vec![Value::Null; col.len()]),
        DataType::Boolean => Ok(col
            .as_boolean()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect()),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let utf8 = cast(col, &DataType::Utf8)?;
            Ok(utf8
                .as_string::<i32>()
                .iter()
                .map(|v| v.map_or(Value::Null, |s| Value::String(s.to_string())))
                .collect())
        }
        _ => {
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(col, &options)?;
            Ok((0..col.len())
                .map(|i| {
                    if col.is_null(i) {
                        Value::Null
                    } else {
                        Value::String(formatter.value(i).to_string())
                    }
                })
                .collect())
        }
    }
}
