//! pcs-qs - Question bank synthesizer
//!
//! Scans `<root>/<method>/<attribute>/` asset folders and writes one
//! question bank per run.
//!
//! **Usage:**
//! ```bash
//! pcs-qs control-fidelity --methods physpropprior cosmos2B --attributes friction
//! pcs-qs force-direction --methods physpropprior
//! pcs-qs force-baseline --baselines cosmos2B force_prompting
//! pcs-qs physical-plausibility --baselines cosmos2B --variant single-clip
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pcs_common::config::{ConfigResolver, StudyConfig};
use pcs_common::json_io::write_json_atomic;
use pcs_common::labels::Labels;
use pcs_common::{logging, rng, Dataset};
use pcs_qs::synth::{
    ControlFidelity, ForceBaseline, ForceDirection, PhysicalPlausibility, PlausibilityVariant,
};
use pcs_qs::{synthesize, QuestionPolicy, SynthContext};
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for pcs-qs
#[derive(Parser, Debug)]
#[command(name = "pcs-qs")]
#[command(about = "Build forced-choice question banks from rendered study assets")]
#[command(version)]
struct Args {
    /// Config file (TOML); falls back to $PCS_CONFIG, ./pcs.toml, then the user config dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (e.g. "debug", "pcs_qs=trace")
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Root directory containing the method folders
    #[arg(long, global = true, env = "PCS_ROOT")]
    root: Option<PathBuf>,

    /// Destination JSON file (default: <data_root>/<dataset>_questions.json)
    #[arg(long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Random seed (default: per-dataset seed from config)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// HIGH/LOW target matching within one method
    ControlFidelity {
        /// Method folders to process
        #[arg(long, num_args = 1.., required = true)]
        methods: Vec<String>,

        /// Attribute subfolders to include
        #[arg(long, num_args = 1.., required = true)]
        attributes: Vec<String>,
    },

    /// Target vs distractor angle within one method
    ForceDirection {
        /// Method folders to process
        #[arg(long, num_args = 1.., required = true)]
        methods: Vec<String>,

        /// Method folder holding the force diagrams (default: from config)
        #[arg(long)]
        context_method: Option<String>,
    },

    /// Reference method vs baseline at the same scenario and angle
    ForceBaseline {
        /// Baseline method folders
        #[arg(long, num_args = 1.., required = true)]
        baselines: Vec<String>,
    },

    /// Reference method vs baseline on attribute realism
    PhysicalPlausibility {
        /// Baseline method folders
        #[arg(long, num_args = 1.., required = true)]
        baselines: Vec<String>,

        /// Attribute subfolders to include
        #[arg(long, num_args = 1.., default_values = ["friction", "deformation", "restitution"])]
        attributes: Vec<String>,

        /// Question shape
        #[arg(long, value_enum, default_value_t = PlausibilityVariant::Bundle)]
        variant: PlausibilityVariant,
    },
}

impl Command {
    fn into_policy(self, config: &StudyConfig) -> Box<dyn QuestionPolicy> {
        match self {
            Command::ControlFidelity {
                methods,
                attributes,
            } => Box::new(ControlFidelity {
                methods,
                attributes,
            }),
            Command::ForceDirection {
                methods,
                context_method,
            } => Box::new(ForceDirection {
                methods,
                context_method: context_method.unwrap_or_else(|| config.context_method.clone()),
            }),
            Command::ForceBaseline { baselines } => Box::new(ForceBaseline {
                reference_method: config.reference_method.clone(),
                baselines,
                context_method: config.context_method.clone(),
            }),
            Command::PhysicalPlausibility {
                baselines,
                attributes,
                variant,
            } => Box::new(PhysicalPlausibility {
                reference_method: config.reference_method.clone(),
                baselines,
                attributes,
                variant,
            }),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;
    logging::init(args.log_level.as_deref(), &config.logging)
        .context("Failed to initialize logging")?;

    info!(
        "Starting pcs-qs v{} ({})",
        env!("CARGO_PKG_VERSION"),
        source.describe()
    );

    let root = args.root.clone().unwrap_or_else(|| config.root.clone());
    let policy = args.command.into_policy(&config);
    let dataset: Dataset = policy.dataset();
    let seed = args.seed.unwrap_or_else(|| config.seeds.for_dataset(dataset));
    let output = args.output.clone().unwrap_or_else(|| config.bank_path(dataset));

    info!(root = %root.display(), seed, "Synthesizing {} questions", dataset);

    let ctx = SynthContext::new(root, Labels::from_config(&config.labels));
    let mut rng = rng::seeded(seed);
    let questions = synthesize(policy.as_ref(), &ctx, &mut rng)?;

    write_json_atomic(&questions, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote {} questions to {}", questions.len(), output.display());
    Ok(())
}
