//! pcs-metrics - Response aggregation
//!
//! **Usage:**
//! ```bash
//! pcs-metrics --responses responses/ --fields config/table_fields.json --output metrics.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use pcs_common::config::ConfigResolver;
use pcs_common::json_io::write_json_atomic;
use pcs_common::labels::Labels;
use pcs_common::logging;
use pcs_ev::{aggregate, FieldCatalog, SummaryFormatter};
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for pcs-metrics
#[derive(Parser, Debug)]
#[command(name = "pcs-metrics")]
#[command(about = "Compute controllability and realism scores from participant responses")]
#[command(version)]
struct Args {
    /// Directory containing downloaded response *.json files
    #[arg(long, value_name = "DIR")]
    responses: PathBuf,

    /// Field-definition file
    #[arg(long, default_value = "config/table_fields.json")]
    fields: PathBuf,

    /// Write the aggregated metrics as JSON
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter (e.g. "debug")
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;
    logging::init(args.log_level.as_deref(), &config.logging)
        .context("Failed to initialize logging")?;

    info!(
        "Starting pcs-metrics v{} ({})",
        env!("CARGO_PKG_VERSION"),
        source.describe()
    );

    let catalog = FieldCatalog::load(&args.fields)
        .with_context(|| format!("Failed to load fields from {}", args.fields.display()))?;
    info!("Loaded {} fields", catalog.len());

    let report = aggregate(&args.responses, &catalog, &config.reference_method)?;

    if let Some(output) = &args.output {
        write_json_atomic(&report, output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("Wrote metrics to {}", output.display());
    }

    let labels = Labels::from_config(&config.labels);
    print!("{}", SummaryFormatter::format_summary(&report, &labels));
    Ok(())
}
