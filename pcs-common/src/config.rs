//! Configuration loading and resolution
//!
//! Every value has a compiled default, so the config file is optional.
//! The file is located in priority order:
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`PCS_CONFIG`)
//! 3. `./pcs.toml` in the working directory
//! 4. `<user config dir>/pcs/config.toml`
//! 5. Compiled defaults (no file)
//!
//! An explicitly named file (1 or 2) must exist. A discovered file (3 or 4)
//! is only used if present. A file that exists but does not parse is a
//! configuration error in every case.

use crate::schema::Dataset;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "PCS_CONFIG";

/// Config filename looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "pcs.toml";

/// Study configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Root containing `<method>/<attribute>/` asset folders
    pub root: PathBuf,

    /// Directory holding question banks
    pub data_root: PathBuf,

    /// Method whose clips count as the correct option
    pub reference_method: String,

    /// Method folder storing the force diagrams
    pub context_method: String,

    pub seeds: SeedConfig,

    /// Dataset name → bank filename overrides (merged over defaults)
    pub datasets: BTreeMap<String, String>,

    pub labels: LabelConfig,

    pub logging: LoggingConfig,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            data_root: PathBuf::from("data"),
            reference_method: "physpropprior".to_string(),
            context_method: "physpropprior".to_string(),
            seeds: SeedConfig::default(),
            datasets: BTreeMap::new(),
            labels: LabelConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl StudyConfig {
    /// Known question banks: defaults for every dataset plus overrides
    pub fn dataset_files(&self) -> BTreeMap<String, String> {
        let mut files: BTreeMap<String, String> = Dataset::ALL
            .iter()
            .map(|d| (d.as_str().to_string(), d.default_bank_file()))
            .collect();
        files.extend(self.datasets.iter().map(|(k, v)| (k.clone(), v.clone())));
        files
    }

    /// Default output path for a synthesized bank
    pub fn bank_path(&self, dataset: Dataset) -> PathBuf {
        let files = self.dataset_files();
        let file = files
            .get(dataset.as_str())
            .cloned()
            .unwrap_or_else(|| dataset.default_bank_file());
        self.data_root.join(file)
    }
}

/// Per-run random seeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub control_fidelity: u64,
    pub force_direction: u64,
    pub force_baseline: u64,
    pub physical_plausibility: u64,
    pub packs: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            control_fidelity: 42,
            force_direction: 7,
            force_baseline: 11,
            physical_plausibility: 2024,
            packs: 42,
        }
    }
}

impl SeedConfig {
    pub fn for_dataset(&self, dataset: Dataset) -> u64 {
        match dataset {
            Dataset::ControlFidelity => self.control_fidelity,
            Dataset::ForceDirection => self.force_direction,
            Dataset::ForceBaseline => self.force_baseline,
            Dataset::PhysicalPlausibility => self.physical_plausibility,
        }
    }
}

/// Label overrides (merged over compiled defaults by [`crate::labels::Labels`])
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub attributes: BTreeMap<String, String>,
    pub methods: BTreeMap<String, String>,
    pub aliases: BTreeMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    WorkingDirectory(PathBuf),
    UserConfigDir(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::CommandLine(p)
            | ConfigSource::Environment(p)
            | ConfigSource::WorkingDirectory(p)
            | ConfigSource::UserConfigDir(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ConfigSource::CommandLine(p) => format!("{} (command line)", p.display()),
            ConfigSource::Environment(p) => format!("{} (${})", p.display(), CONFIG_ENV_VAR),
            ConfigSource::WorkingDirectory(p) => format!("{} (working directory)", p.display()),
            ConfigSource::UserConfigDir(p) => format!("{} (user config)", p.display()),
            ConfigSource::Defaults => "compiled defaults".to_string(),
        }
    }
}

/// Config file resolution following the priority order in the module docs
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Locate the config file without reading it
    pub fn locate(&self) -> ConfigSource {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return ConfigSource::CommandLine(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        // Priority 3: Working directory
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return ConfigSource::WorkingDirectory(local);
        }

        // Priority 4: User config directory
        if let Some(user) = dirs::config_dir().map(|d| d.join("pcs").join("config.toml")) {
            if user.is_file() {
                return ConfigSource::UserConfigDir(user);
            }
        }

        ConfigSource::Defaults
    }

    /// Locate and load the configuration
    pub fn load(&self) -> Result<(StudyConfig, ConfigSource)> {
        let source = self.locate();
        debug!(source = %source.describe(), "Resolved configuration file");
        let config = match source.path() {
            Some(path) => load_config_file(path)?,
            None => StudyConfig::default(),
        };
        Ok((config, source))
    }
}

/// Parse a TOML config file
pub fn load_config_file(path: &Path) -> Result<StudyConfig> {
    if !path.is_file() {
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = content.len(), "Parsing config file");
    toml::from_str(&content).map_err(|source| Error::Toml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StudyConfig::default();
        assert_eq!(config.reference_method, "physpropprior");
        assert_eq!(config.seeds.for_dataset(Dataset::ForceDirection), 7);
        assert_eq!(config.seeds.for_dataset(Dataset::PhysicalPlausibility), 2024);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_dataset_files_merge_overrides() {
        let mut config = StudyConfig::default();
        config
            .datasets
            .insert("force_baseline".to_string(), "fb_v2.json".to_string());
        config
            .datasets
            .insert("pp_single".to_string(), "pp_single.json".to_string());

        let files = config.dataset_files();
        assert_eq!(files["force_baseline"], "fb_v2.json");
        assert_eq!(files["control_fidelity"], "control_fidelity_questions.json");
        assert_eq!(files["pp_single"], "pp_single.json");
        assert_eq!(
            config.bank_path(Dataset::ForceBaseline),
            PathBuf::from("data").join("fb_v2.json")
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: StudyConfig = toml::from_str(
            r#"
            reference_method = "ours"

            [seeds]
            packs = 99

            [labels.methods]
            ours = "Ours"
            "#,
        )
        .unwrap();
        assert_eq!(config.reference_method, "ours");
        assert_eq!(config.context_method, "physpropprior");
        assert_eq!(config.seeds.packs, 99);
        assert_eq!(config.seeds.control_fidelity, 42);
        assert_eq!(config.labels.methods["ours"], "Ours");
    }

    #[test]
    fn test_cli_path_wins() {
        let resolver = ConfigResolver::new(Some(PathBuf::from("/tmp/explicit.toml")));
        assert_eq!(
            resolver.locate(),
            ConfigSource::CommandLine(PathBuf::from("/tmp/explicit.toml"))
        );
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let resolver = ConfigResolver::new(Some(PathBuf::from("/nonexistent/pcs.toml")));
        match resolver.load() {
            Err(Error::Config(msg)) => assert!(msg.contains("not found")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }
}
