//! Year-wise aggregation of price and demand.

use std::collections::BTreeMap;

use arrow::record_batch::RecordBatch;
use tracing::debug;

use crate::columns::{float_column, mean, year_column};
use crate::{AnalyticsError, ColumnNames, YearSeries};

/// Group `subset` by year and average price and demand within each year.
///
/// Rows with a missing year are left out. Within a year, missing prices and
/// demands are ignored; a year with none present gets `None`. When the price
/// or demand column is not in the schema its list is empty. A missing year
/// column is an error.
pub fn year_series(
    subset: &RecordBatch,
    columns: &ColumnNames,
) -> Result<YearSeries, AnalyticsError> {
    let years = year_column(subset, &columns.year)?;
    let prices = float_column(subset, &columns.price)?;
    let demands = float_column(subset, &columns.demand)?;

    // year → row indices, ascending by year.
    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    let mut skipped = 0usize;
    for (row, year) in years.iter().enumerate() {
        match year {
            Some(y) => groups.entry(*y).or_default().push(row),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "rows without a year left out of aggregation");
    }

    let group_means = |values: &Option<Vec<Option<f64>>>| -> Vec<Option<f64>> {
        match values {
            Some(values) => groups
                .values()
                .map(|rows| mean(rows.iter().map(|&r| values[r])))
                .collect(),
            None => Vec::new(),
        }
    };

    Ok(YearSeries {
        years: groups.keys().copied().collect(),
        price: group_means(&prices),
        demand: group_means(&demands),
    })
}
