use anyhow::{Context, Result};
use chartprep::guidance;
use chartprep::{catalog, data, graph, ChartKind, Configuration, Dataset, OutputFormat, RenderOptions};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "chartprep")]
#[command(about = "Turn spreadsheet rows into chart-ready series", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the fields available for axis selection
    Fields {
        /// Input file (.xlsx/.xls workbook, .json array of objects, otherwise CSV); CSV from stdin when omitted
        input: Option<PathBuf>,
    },
    /// Print the series for a selection as JSON
    Series {
        input: Option<PathBuf>,
        #[command(flatten)]
        selection: Selection,
    },
    /// Render the series as PNG or SVG
    Render {
        input: Option<PathBuf>,
        #[command(flatten)]
        selection: Selection,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[arg(long, value_parser = ["png", "svg"])]
        format: Option<String>,
        /// JSON file with width, height and type
        #[arg(long)]
        options: Option<PathBuf>,
        /// Output file; image bytes go to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct Selection {
    /// Field for the x axis, or the category labels of a pie
    #[arg(short, long)]
    x: Option<String>,
    /// Field for the y axis, or the slice sizes of a pie
    #[arg(short, long)]
    y: Option<String>,
    /// Chart kind: point, line, bar, categorical (pie) or volumetric (3d)
    #[arg(short, long)]
    kind: Option<String>,
    /// Reject an unknown --kind instead of drawing points
    #[arg(long)]
    strict_kind: bool,
    /// JSON file with xField, yField and chartKind; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Selection {
    fn resolve(&self) -> Result<Configuration> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => Configuration::default(),
        };

        if let Some(x) = &self.x {
            config.x_field = x.clone();
        }
        if let Some(y) = &self.y {
            config.y_field = y.clone();
        }
        if let Some(kind) = &self.kind {
            config.chart_kind = if self.strict_kind {
                kind.parse::<ChartKind>()?
            } else {
                ChartKind::from_name_lenient(kind)
            };
        }
        Ok(config)
    }
}

fn init_logging() {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if std::env::var("RUST_LOG").is_err() {
        builder.filter_module("chartprep", LevelFilter::Info);
    }
    let _ = builder.format_timestamp_millis().try_init();
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    match args.command {
        Command::Fields { input } => {
            let dataset = load_input(input.as_deref())?;
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            for field in catalog::field_names(Some(dataset.as_slice())) {
                writeln!(handle, "{}", field).context("Failed to write to stdout")?;
            }
        }
        Command::Series { input, selection } => {
            let config = selection.resolve()?;
            let dataset = load_input(input.as_deref())?;
            let eval = chartprep::evaluate_detailed(Some(dataset.as_slice()), &config);
            if let Some(hint) = guidance::explain(true, &config, &eval) {
                eprintln!("Warning: {}", hint);
            }
            let json = serde_json::to_string_pretty(&eval.series).context("Failed to serialize series")?;
            println!("{}", json);
        }
        Command::Render { input, selection, width, height, format, options, output } => {
            let config = selection.resolve()?;
            let mut render_options = match options {
                Some(path) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read options {}", path.display()))?;
                    serde_json::from_str(&text)
                        .with_context(|| format!("Failed to parse options {}", path.display()))?
                }
                None => RenderOptions::default(),
            };
            if let Some(width) = width {
                render_options.width = width;
            }
            if let Some(height) = height {
                render_options.height = height;
            }
            if let Some(format) = format.as_deref() {
                render_options.format = match format {
                    "svg" => OutputFormat::Svg,
                    _ => OutputFormat::Png,
                };
            }

            let dataset = load_input(input.as_deref())?;
            let eval = chartprep::evaluate_detailed(Some(dataset.as_slice()), &config);
            if let Some(hint) = guidance::explain(true, &config, &eval) {
                anyhow::bail!("{}", hint);
            }

            let bytes = graph::render(&eval.series, &config, &render_options)
                .context("Failed to render chart")?;
            write_output(output.as_deref(), &bytes)?;
        }
    }

    Ok(())
}

fn load_input(input: Option<&Path>) -> Result<Dataset> {
    match input {
        Some(path) => data::load_path(path),
        None => data::load_csv(io::stdin().lock()).context("Failed to read CSV from stdin"),
    }
}

fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            file.write_all(bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(bytes).context("Failed to write image to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }
    Ok(())
}
