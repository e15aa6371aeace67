// Chart-ready series and their assembly from cleaned rows

use serde::Serialize;

use crate::aggregate::aggregate_by_label;
use crate::coerce::CleanedRow;
use crate::config::ChartKind;
use crate::dispatch::{select_strategy, Strategy};
use crate::value::Value;

/// x/y pairs in row order. `xs.len() == ys.len()` always.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedSeries {
    pub xs: Vec<Value>,
    pub ys: Vec<f64>,
}

/// Unique labels with their summed magnitudes, in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSeries {
    pub labels: Vec<String>,
    pub magnitudes: Vec<f64>,
}

/// Paired series with `zs[i] == i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumetricSeries {
    pub xs: Vec<Value>,
    pub ys: Vec<f64>,
    pub zs: Vec<usize>,
}

/// One renderable series; the variant is the chart kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Series {
    Point(PairedSeries),
    Line(PairedSeries),
    Bar(PairedSeries),
    Categorical(CategoricalSeries),
    Volumetric(VolumetricSeries),
}

impl Series {
    pub fn kind(&self) -> ChartKind {
        match self {
            Series::Point(_) => ChartKind::Point,
            Series::Line(_) => ChartKind::Line,
            Series::Bar(_) => ChartKind::Bar,
            Series::Categorical(_) => ChartKind::Categorical,
            Series::Volumetric(_) => ChartKind::Volumetric,
        }
    }

    /// Number of plotted entries (points, bars or slices).
    pub fn len(&self) -> usize {
        match self {
            Series::Point(s) | Series::Line(s) | Series::Bar(s) => s.xs.len(),
            Series::Categorical(s) => s.labels.len(),
            Series::Volumetric(s) => s.xs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shape cleaned rows into the series for `kind`.
///
/// Returns an empty collection when there are no rows, or when categorical
/// aggregation has nothing to show; otherwise exactly one series.
pub fn assemble(rows: &[CleanedRow<'_>], kind: ChartKind) -> Vec<Series> {
    if rows.is_empty() {
        return Vec::new();
    }

    let series = match select_strategy(kind) {
        Strategy::Paired(kind) => {
            let paired = pair(rows);
            match kind {
                ChartKind::Line => Series::Line(paired),
                ChartKind::Bar => Series::Bar(paired),
                _ => Series::Point(paired),
            }
        }
        Strategy::Volumetric => {
            let PairedSeries { xs, ys } = pair(rows);
            let zs = (0..xs.len()).collect();
            Series::Volumetric(VolumetricSeries { xs, ys, zs })
        }
        Strategy::Aggregated => match aggregate_by_label(rows) {
            Some((labels, magnitudes)) => Series::Categorical(CategoricalSeries { labels, magnitudes }),
            None => return Vec::new(),
        },
    };

    vec![series]
}

fn pair(rows: &[CleanedRow<'_>]) -> PairedSeries {
    let (xs, ys) = rows.iter().map(|r| (r.x.clone(), r.y)).unzip();
    PairedSeries { xs, ys }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows<'a>(pairs: &'a [(Value, f64)]) -> Vec<CleanedRow<'a>> {
        pairs.iter().map(|(x, y)| CleanedRow { x, y: *y }).collect()
    }

    #[test]
    fn test_paired_keeps_duplicates_and_order() {
        let data = [
            (Value::from(3.0), 1.0),
            (Value::from(1.0), 2.0),
            (Value::from(3.0), 5.0),
        ];
        let out = assemble(&rows(&data), ChartKind::Bar);
        assert_eq!(out.len(), 1);
        let Series::Bar(s) = &out[0] else { panic!("expected bar series") };
        assert_eq!(s.xs, vec![Value::from(3.0), Value::from(1.0), Value::from(3.0)]);
        assert_eq!(s.ys, vec![1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_volumetric_ordinals() {
        let data = [(Value::from("a"), 1.0), (Value::from("b"), 2.0)];
        let out = assemble(&rows(&data), ChartKind::Volumetric);
        let Series::Volumetric(s) = &out[0] else { panic!("expected volumetric series") };
        assert_eq!(s.zs, vec![0, 1]);
        assert_eq!(s.xs.len(), s.ys.len());
    }

    #[test]
    fn test_empty_rows_give_no_series() {
        for kind in ChartKind::ALL {
            assert!(assemble(&[], kind).is_empty());
        }
    }

    #[test]
    fn test_serialized_shape() {
        let data = [(Value::from(5.0), 10.0)];
        let out = assemble(&rows(&data), ChartKind::Line);
        let json = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "line", "xs": [5.0], "ys": [10.0]}));

        let out = assemble(&rows(&data), ChartKind::Categorical);
        let json = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "categorical", "labels": ["5"], "magnitudes": [10.0]})
        );
    }
}
