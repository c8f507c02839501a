pub mod aggregate;
pub mod columns;
pub mod error;
pub mod matcher;
pub mod schema;
pub mod stats;
pub mod types;

pub use aggregate::year_series;
pub use error::AnalyticsError;
pub use matcher::match_localities;
pub use schema::ColumnNames;
pub use stats::build_stats;
pub use types::{ALL_AREAS, MatchedAreas, StatsSummary, YearSeries, YearValue};
