//! Column layout of the real-estate dataset.

use serde::{Deserialize, Serialize};

/// Names of the four columns the analytics pipeline reads.
///
/// Every other column in the dataset is carried through opaquely into the
/// table sample. Defaults match the column headers of the published
/// locality-wise sales export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub area: String,
    pub year: String,
    pub price: String,
    pub demand: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            area: "final location".into(),
            year: "year".into(),
            price: "flat - weighted average rate".into(),
            demand: "total units".into(),
        }
    }
}
