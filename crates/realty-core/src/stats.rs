//! Scalar summary statistics for a matched row subset.

use arrow::record_batch::RecordBatch;

use crate::columns::{float_column, mean, year_column};
use crate::{AnalyticsError, ColumnNames, StatsSummary, YearSeries};

/// Build the [`StatsSummary`] for `subset`.
///
/// Averages are taken over every row of the subset, not over the per-year
/// means in `series`, so years with more rows weigh more. Per-year lists are
/// copied from `series`.
pub fn build_stats(
    areas: Vec<String>,
    subset: &RecordBatch,
    series: &YearSeries,
    columns: &ColumnNames,
) -> Result<StatsSummary, AnalyticsError> {
    let years = year_column(subset, &columns.year)?;
    let min_year = years.iter().flatten().min().copied();
    let max_year = years.iter().flatten().max().copied();

    let avg_price = float_column(subset, &columns.price)?.and_then(mean);
    let avg_demand = float_column(subset, &columns.demand)?.and_then(mean);

    Ok(StatsSummary {
        areas,
        min_year,
        max_year,
        avg_price,
        avg_demand,
        price_per_year: series.price_per_year(),
        demand_per_year: series.demand_per_year(),
    })
}
