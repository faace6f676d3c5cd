//! pcs-packs - Balanced participant pack sampler
//!
//! For every table field, draws the same number of questions from the
//! field's bank for each participant.
//!
//! **Usage:**
//! ```bash
//! pcs-packs --fields config/table_fields.json --count 12
//! pcs-packs --participants alice bob --questions-per-field 3
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use pcs_common::config::ConfigResolver;
use pcs_common::{logging, rng};
use pcs_ev::sampler::{
    build_pools, pack_size, participant_ids, sample_packs, write_packs, BankRegistry,
    DEFAULT_PREFIX,
};
use pcs_ev::FieldCatalog;
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for pcs-packs
#[derive(Parser, Debug)]
#[command(name = "pcs-packs")]
#[command(about = "Generate per-participant question packs covering every table field")]
#[command(version)]
struct Args {
    /// Field-definition file
    #[arg(long, default_value = "config/table_fields.json")]
    fields: PathBuf,

    /// Directory holding the question banks (default: from config)
    #[arg(long, env = "PCS_DATA_ROOT")]
    data_root: Option<PathBuf>,

    /// Folder to write participant packs into
    #[arg(long, default_value = "data/packs")]
    output_dir: PathBuf,

    /// Explicit participant ids
    #[arg(long, num_args = 0..)]
    participants: Vec<String>,

    /// Number of packs to generate (ignored when --participants is given)
    #[arg(long, default_value_t = 0)]
    count: usize,

    /// Prefix for generated participant ids
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Override every field's question count
    #[arg(long)]
    questions_per_field: Option<usize>,

    /// Random seed (default: from config)
    #[arg(long)]
    seed: Option<u64>,

    /// Config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter (e.g. "debug")
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;
    logging::init(args.log_level.as_deref(), &config.logging)
        .context("Failed to initialize logging")?;

    info!(
        "Starting pcs-packs v{} ({})",
        env!("CARGO_PKG_VERSION"),
        source.describe()
    );

    if let Some(data_root) = &args.data_root {
        config.data_root = data_root.clone();
    }

    let catalog = FieldCatalog::load(&args.fields)
        .with_context(|| format!("Failed to load fields from {}", args.fields.display()))?;
    let participants = participant_ids(&args.participants, args.count, &args.prefix)?;

    let mut banks = BankRegistry::from_config(&config);
    let pools = build_pools(&catalog, &mut banks, args.questions_per_field)?;

    let seed = args.seed.unwrap_or(config.seeds.packs);
    let mut rng = rng::seeded(seed);
    let packs = sample_packs(&participants, &pools, &mut rng);

    let written = write_packs(&packs, &args.output_dir)?;
    for ((_, pack), path) in packs.iter().zip(&written) {
        println!("Wrote {} questions to {}", pack.len(), path.display());
    }

    info!(
        fields = pools.len(),
        seed,
        "Each participant receives {} questions",
        pack_size(&pools)
    );
    Ok(())
}
