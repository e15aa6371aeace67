// Dataset + configuration -> series pipeline

use crate::coerce::clean_rows;
use crate::config::Configuration;
use crate::filter::filter_rows;
use crate::series::{assemble, Series};
use crate::value::Record;

/// Outcome of one pipeline run, with the row counts at each stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Rows that passed the presence filter
    pub filtered_rows: usize,
    /// Rows left after numeric coercion
    pub cleaned_rows: usize,
    pub series: Vec<Series>,
}

/// Turn a dataset and configuration into zero or one series.
///
/// Pure: the inputs are only read and identical inputs always produce an
/// identical result. Missing or unusable data yields an empty collection.
pub fn evaluate(dataset: Option<&[Record]>, config: &Configuration) -> Vec<Series> {
    evaluate_detailed(dataset, config).series
}

/// Same as [`evaluate`], keeping the intermediate row counts so callers can
/// explain an empty result.
pub fn evaluate_detailed(dataset: Option<&[Record]>, config: &Configuration) -> Evaluation {
    let filtered = filter_rows(dataset, config);
    let cleaned = clean_rows(&filtered, config);
    let series = assemble(&cleaned, config.chart_kind);

    Evaluation {
        filtered_rows: filtered.len(),
        cleaned_rows: cleaned.len(),
        series,
    }
}
