// Library exports for chartprep

pub mod value;
pub mod data;
pub mod config;

// Series engine
pub mod catalog;
pub mod filter;
pub mod coerce;
pub mod dispatch;
pub mod aggregate;
pub mod series;
pub mod engine;

// Caller-side helpers
pub mod cache;
pub mod guidance;

// Rendering
pub mod palette;
pub mod graph;

pub use config::{ChartKind, Configuration};
pub use engine::{evaluate, evaluate_detailed, Evaluation};
pub use series::Series;
pub use value::{Dataset, Record, Value};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::Png,
        }
    }
}
