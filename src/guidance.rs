use std::fmt;

use crate::config::{ChartKind, Configuration};
use crate::engine::Evaluation;

/// Why an evaluation produced nothing to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guidance {
    NoDataset,
    MissingX,
    MissingY,
    NoValidRows,
    /// Rows survived cleaning but every categorical magnitude was zero
    NothingToShow,
}

impl fmt::Display for Guidance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Guidance::NoDataset => "Select or upload a spreadsheet to begin.",
            Guidance::MissingX => "Please select an X axis.",
            Guidance::MissingY => "Please select a Y axis.",
            Guidance::NoValidRows => {
                "No valid rows found for the selected axes; check for empty or non-numeric values."
            }
            Guidance::NothingToShow => "All values for the selected axes sum to zero; nothing to show.",
        };
        f.write_str(msg)
    }
}

/// Explain an empty result. Returns `None` when there is a series to draw.
pub fn explain(has_dataset: bool, config: &Configuration, eval: &Evaluation) -> Option<Guidance> {
    if !eval.series.is_empty() {
        return None;
    }
    let guidance = if !has_dataset {
        Guidance::NoDataset
    } else if !config.has_x() {
        Guidance::MissingX
    } else if config.chart_kind != ChartKind::Categorical && !config.has_y() {
        Guidance::MissingY
    } else if eval.cleaned_rows == 0 {
        Guidance::NoValidRows
    } else {
        Guidance::NothingToShow
    };
    Some(guidance)
}
