// Chart configuration: which fields to plot and how

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of supported chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Plotted markers
    #[default]
    Point,
    /// Markers joined by a smoothed path
    Line,
    /// Bars at categorical x positions (no label aggregation)
    Bar,
    /// Label/magnitude aggregation, drawn as a pie
    Categorical,
    /// Point series with a synthetic ordinal z axis
    Volumetric,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Point,
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Categorical,
        ChartKind::Volumetric,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Point => "point",
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Categorical => "categorical",
            ChartKind::Volumetric => "volumetric",
        }
    }

    /// Parse a kind name, falling back to `Point` for anything unrecognized.
    pub fn from_name_lenient(name: &str) -> ChartKind {
        name.parse().unwrap_or_else(|_| {
            log::debug!("Unrecognized chart kind '{}', using point", name);
            ChartKind::Point
        })
    }
}

impl FromStr for ChartKind {
    type Err = anyhow::Error;

    /// Strict parsing. Accepts the canonical names plus the aliases
    /// `scatter`, `pie` and `3d`, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" | "scatter" => Ok(ChartKind::Point),
            "line" => Ok(ChartKind::Line),
            "bar" => Ok(ChartKind::Bar),
            "categorical" | "pie" => Ok(ChartKind::Categorical),
            "volumetric" | "3d" => Ok(ChartKind::Volumetric),
            other => Err(anyhow!(
                "Unknown chart kind '{}' (expected point, line, bar, categorical or volumetric)",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for ChartKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(ChartKind::from_name_lenient(&name))
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The user's current axis and chart-kind selection.
///
/// An empty field name means "not selected". Unknown fields in a JSON
/// configuration are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    pub x_field: String,
    pub y_field: String,
    pub chart_kind: ChartKind,
}

impl Configuration {
    pub fn new(x_field: impl Into<String>, chart_kind: ChartKind) -> Self {
        Self {
            x_field: x_field.into(),
            y_field: String::new(),
            chart_kind,
        }
    }

    pub fn with_y(mut self, y_field: impl Into<String>) -> Self {
        self.y_field = y_field.into();
        self
    }

    pub fn has_x(&self) -> bool {
        !self.x_field.is_empty()
    }

    pub fn has_y(&self) -> bool {
        !self.y_field.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_parse() {
        assert_eq!("pie".parse::<ChartKind>().unwrap(), ChartKind::Categorical);
        assert_eq!("3D".parse::<ChartKind>().unwrap(), ChartKind::Volumetric);
        assert_eq!("scatter".parse::<ChartKind>().unwrap(), ChartKind::Point);
        assert!("histogram".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_lenient_parse_defaults_to_point() {
        assert_eq!(ChartKind::from_name_lenient("histogram"), ChartKind::Point);
        assert_eq!(ChartKind::from_name_lenient(""), ChartKind::Point);
        assert_eq!(ChartKind::from_name_lenient("line"), ChartKind::Line);
    }

    #[test]
    fn test_names_round_trip() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.name().parse::<ChartKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_configuration_from_json() {
        let json = r#"{"xField": "region", "chartKind": "pie", "colour": "red"}"#;
        let config: Configuration = serde_json::from_str(json).unwrap();
        assert_eq!(config.x_field, "region");
        assert!(!config.has_y());
        assert_eq!(config.chart_kind, ChartKind::Categorical);
    }

    #[test]
    fn test_configuration_unknown_kind() {
        let json = r#"{"xField": "a", "yField": "b", "chartKind": "radar"}"#;
        let config: Configuration = serde_json::from_str(json).unwrap();
        assert_eq!(config.chart_kind, ChartKind::Point);
    }
}
