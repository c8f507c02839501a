//! Request-scoped analytics values shared by the pipeline, summariser and API.

use serde::{Deserialize, Serialize};

/// Area label used when a query names no known locality.
pub const ALL_AREAS: &str = "All Areas";

/// Localities referenced by a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchedAreas {
    /// One or more known localities appear in the query.
    Named(Vec<String>),
    /// Nothing matched; the whole dataset is in scope.
    All,
}

impl MatchedAreas {
    /// Wrap a matcher result, falling back to [`MatchedAreas::All`] when empty.
    pub fn from_matches(matches: Vec<String>) -> Self {
        if matches.is_empty() {
            Self::All
        } else {
            Self::Named(matches)
        }
    }

    /// Labels reported to callers: the names, or `["All Areas"]`.
    pub fn labels(&self) -> Vec<String> {
        match self {
            Self::Named(names) => names.clone(),
            Self::All => vec![ALL_AREAS.to_string()],
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Per-year means for a row subset, as three parallel lists.
///
/// `years` is strictly ascending. `price` and `demand` have the same length as
/// `years`, or are empty when the dataset has no such column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearSeries {
    pub years: Vec<i64>,
    pub price: Vec<Option<f64>>,
    pub demand: Vec<Option<f64>>,
}

impl YearSeries {
    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn price_per_year(&self) -> Vec<YearValue> {
        pair_with_years(&self.years, &self.price)
    }

    pub fn demand_per_year(&self) -> Vec<YearValue> {
        pair_with_years(&self.years, &self.demand)
    }
}

fn pair_with_years(years: &[i64], values: &[Option<f64>]) -> Vec<YearValue> {
    years
        .iter()
        .zip(values)
        .map(|(&year, &value)| YearValue { year, value })
        .collect()
}

/// One year's aggregated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i64,
    pub value: Option<f64>,
}

/// Scalar statistics for one query's matched rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub areas: Vec<String>,
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,
    pub avg_price: Option<f64>,
    pub avg_demand: Option<f64>,
    pub price_per_year: Vec<YearValue>,
    pub demand_per_year: Vec<YearValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_become_all_areas() {
        let areas = MatchedAreas::from_matches(vec![]);
        assert!(areas.is_all());
        assert_eq!(areas.labels(), vec!["All Areas"]);
    }

    #[test]
    fn named_matches_keep_order() {
        let areas = MatchedAreas::from_matches(vec!["Wakad".into(), "Aundh".into()]);
        assert!(!areas.is_all());
        assert_eq!(areas.labels(), vec!["Wakad", "Aundh"]);
    }

    #[test]
    fn per_year_lists_follow_series() {
        let series = YearSeries {
            years: vec![2019, 2020],
            price: vec![Some(5000.0), None],
            demand: vec![],
        };
        assert_eq!(
            series.price_per_year(),
            vec![
                YearValue { year: 2019, value: Some(5000.0) },
                YearValue { year: 2020, value: None },
            ]
        );
        assert!(series.demand_per_year().is_empty());
    }

    #[test]
    fn missing_values_serialize_as_null() {
        let series = YearSeries {
            years: vec![2021],
            price: vec![None],
            demand: vec![Some(12.0)],
        };
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"years": [2021], "price": [null], "demand": [12.0]})
        );
    }
}
